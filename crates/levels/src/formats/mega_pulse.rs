//! Mega Pulse EX
//!
//! ```text
//! +-------+--------+------------------------+-----------+--------------------+
//! | w (1) | h (1)  | tiles (w * h, raw ids) | count u16 | records (16 each)  |
//! +-------+--------+------------------------+-----------+--------------------+
//! ```
//!
//! Tiles come from the layer named `tiles` and entities from the object
//! layer named `entities`. Warp markers stay inline; the game reads the
//! entity count straight after the tiles, so it is written even when the
//! level has no entities layer.

use swlevel_protocol::{write_u16_le, TileGridCodec};
use tracing::{debug, info};

use super::{FormatOptions, MapFormat};
use crate::document::LevelDocument;
use crate::entities::EntityLayerCodec;
use crate::tiles::extract_grid;
use crate::{LevelError, Result};

pub const TILES_LAYER: &str = "tiles";
pub const ENTITIES_LAYER: &str = "entities";

const CODEC: TileGridCodec = TileGridCodec::explicit();

pub fn write(doc: &dyn LevelDocument, _options: &FormatOptions) -> Result<Vec<u8>> {
    let layer = doc.tile_layer_named(TILES_LAYER).ok_or_else(|| {
        LevelError::MissingLayer(format!(
            "{} needs a tile layer named {:?}",
            MapFormat::MegaPulseEx,
            TILES_LAYER
        ))
    })?;
    let grid = extract_grid(layer, &CODEC)?;
    let mut buf = CODEC.encode(&grid)?;

    let entity_count = match doc.object_layer_named(ENTITIES_LAYER) {
        Some(entities) => {
            EntityLayerCodec::encode(entities, &mut buf)?;
            entities.objects.len()
        }
        None => {
            debug!("No {:?} layer, writing an empty entity list", ENTITIES_LAYER);
            write_u16_le(&mut buf, 0);
            0
        }
    };

    info!(
        "Wrote Mega Pulse EX level {}x{} with {} entities ({} bytes)",
        grid.width(),
        grid.height(),
        entity_count,
        buf.len()
    );
    Ok(buf.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Document, Layer, MapObject, ObjectLayer, PropertyValue, TileLayer};
    use swlevel_protocol::ENTITY_RECORD_LEN;

    fn tiles() -> Layer {
        let mut layer = TileLayer::filled(TILES_LAYER, 2, 2, 1);
        layer.set_tile(0, 0, Some(5));
        Layer::Tile(layer)
    }

    #[test]
    fn test_tiles_only() {
        // marker 5 above tile 1 would be deferred in Swadge Land
        let doc = Document::new(2, 2).with_layer(tiles());
        let bytes = write(&doc, &FormatOptions::default()).unwrap();
        assert_eq!(bytes, vec![2, 2, 5, 1, 1, 1, 0, 0]);
    }

    #[test]
    fn test_with_entities() {
        let entities = ObjectLayer::new(
            ENTITIES_LAYER,
            vec![
                MapObject::new(1, "", 40.0, 16.0)
                    .with_property("type", PropertyValue::Number(7.0))
                    .with_property("linkedEntitySpawn", PropertyValue::Object { id: 2 }),
                MapObject::new(2, "", 0.0, 0.0),
            ],
        );
        let doc = Document::new(2, 2)
            .with_layer(Layer::Object(entities))
            .with_layer(tiles());

        let bytes = write(&doc, &FormatOptions::default()).unwrap();
        assert_eq!(bytes.len(), 6 + 2 + 2 * ENTITY_RECORD_LEN);
        assert_eq!(&bytes[6..8], &[2, 0]);

        let first = &bytes[8..8 + ENTITY_RECORD_LEN];
        assert_eq!(&first[..5], &[7, 2, 1, 8, 0]);
        assert_eq!(&first[14..], &[1, 0]);
    }

    #[test]
    fn test_requires_named_tiles_layer() {
        let layer = TileLayer::filled("Main", 2, 2, 1);
        let doc = Document::new(2, 2).with_layer(Layer::Tile(layer));
        let err = write(&doc, &FormatOptions::default()).unwrap_err();
        assert!(matches!(err, LevelError::MissingLayer(_)));
    }
}
