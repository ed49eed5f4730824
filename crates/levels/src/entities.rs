//! Entity layer packing
//!
//! Each object of an entity layer becomes one 16-byte record in authoring
//! order. Links between entities are stored as the linked object's index in
//! the same layer.

use bytes::BytesMut;
use swlevel_protocol::{EntityLayer, EntityRecord, WireSerializable, ENTITY_PARAM_COUNT};
use tracing::{debug, warn};

use crate::document::{MapObject, ObjectLayer};
use crate::{LevelError, Result};

/// Property holding the entity type byte
pub const TYPE_PROPERTY: &str = "type";

/// Property referencing the entity this one spawns
pub const LINK_PROPERTY: &str = "linkedEntitySpawn";

/// Packs object layers into entity records
pub struct EntityLayerCodec;

impl EntityLayerCodec {
    /// Build the record for one object
    pub fn record(layer: &ObjectLayer, object: &MapObject) -> Result<EntityRecord> {
        let (pixel_x, pixel_y) = object.position().floor();
        if pixel_x < 0 || pixel_y < 0 {
            return Err(LevelError::InvalidObject {
                id: object.id,
                message: format!("negative position ({}, {})", object.x, object.y),
            });
        }

        let kind = object
            .number(TYPE_PROPERTY)
            .map(|value| value.floor() as i64 as u8)
            .unwrap_or(0);

        let mut params = [0u8; ENTITY_PARAM_COUNT];
        for (slot, param) in params.iter_mut().enumerate() {
            if let Some(value) = object.number(&format!("special{}", slot)) {
                *param = value.floor() as i64 as u8;
            }
        }

        let link = match object.property(LINK_PROPERTY) {
            None => None,
            Some(value) => {
                let index = value
                    .as_object()
                    .and_then(|target| layer.index_of(target))
                    .and_then(|index| u16::try_from(index).ok());
                if index.is_none() {
                    warn!(
                        "Entity {}: {} {:?} is not in layer '{}'",
                        object.id, LINK_PROPERTY, value, layer.name
                    );
                }
                index
            }
        };

        Ok(EntityRecord::at_pixel(kind, pixel_x, pixel_y)
            .with_flip(object.flip)
            .with_params(params)
            .with_link(link))
    }

    /// Build every record of a layer
    pub fn records(layer: &ObjectLayer) -> Result<EntityLayer> {
        let records = layer
            .objects
            .iter()
            .map(|object| Self::record(layer, object))
            .collect::<Result<Vec<_>>>()?;
        debug!("Packed {} entities from layer '{}'", records.len(), layer.name);
        Ok(EntityLayer::new(records)?)
    }

    /// Count followed by the records
    pub fn encode(layer: &ObjectLayer, buf: &mut BytesMut) -> Result<()> {
        Self::records(layer)?.write_wire(buf);
        Ok(())
    }

    /// Parse a count-prefixed record list
    pub fn decode(input: &[u8]) -> Result<(&[u8], EntityLayer)> {
        Ok(EntityLayer::read_wire(input)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::PropertyValue;
    use swlevel_core::{Flip, ObjectId};
    use swlevel_protocol::WireError;

    fn entity(id: u32, x: f64, y: f64) -> MapObject {
        MapObject::new(id, "entity", x, y)
    }

    #[test]
    fn test_record_fields() {
        let object = entity(1, 37.9, 70.2)
            .with_flip(Flip::new(true, false))
            .with_property("type", PropertyValue::Number(12.0))
            .with_property("special0", PropertyValue::Number(3.9))
            .with_property("special7", PropertyValue::Number(255.0));
        let layer = ObjectLayer::new("entities", vec![object.clone()]);

        let record = EntityLayerCodec::record(&layer, &object).unwrap();
        assert_eq!(record.kind, 12);
        assert_eq!((record.tile_x, record.tile_y), (2, 4));
        assert_eq!((record.sub_x, record.sub_y), (5, 6));
        assert_eq!(record.flip.bits(), 1);
        assert_eq!(record.params, [3, 0, 0, 0, 0, 0, 0, 255]);
        assert_eq!(record.linked(), None);
    }

    #[test]
    fn test_link_resolved_by_layer_index() {
        let spawner = entity(10, 0.0, 0.0)
            .with_property(LINK_PROPERTY, PropertyValue::Object { id: 30 });
        let layer = ObjectLayer::new(
            "entities",
            vec![spawner, entity(20, 16.0, 0.0), entity(30, 32.0, 0.0)],
        );

        let encoded = EntityLayerCodec::records(&layer).unwrap();
        assert_eq!(encoded.records()[0].link, 2);
        assert_eq!(encoded.records()[1].link, 0xFFFF);
    }

    #[test]
    fn test_dangling_link_is_unlinked() {
        let spawner = entity(10, 0.0, 0.0)
            .with_property(LINK_PROPERTY, PropertyValue::Object { id: 99 });
        let layer = ObjectLayer::new("entities", vec![spawner]);

        let encoded = EntityLayerCodec::records(&layer).unwrap();
        assert_eq!(encoded.records()[0].link, 0xFFFF);
    }

    #[test]
    fn test_encode_layout() {
        let layer = ObjectLayer::new("entities", vec![entity(1, 16.0, 32.0)]);
        let mut buf = BytesMut::new();
        EntityLayerCodec::encode(&layer, &mut buf).unwrap();

        assert_eq!(buf.len(), 2 + 16);
        assert_eq!(&buf[0..2], &[1, 0]);
        assert_eq!(&buf[buf.len() - 2..], &[0xFF, 0xFF]);

        let (rest, decoded) = EntityLayerCodec::decode(&buf).unwrap();
        assert!(rest.is_empty());
        assert_eq!(decoded.records().len(), 1);
        assert_eq!(decoded.records()[0].pixel_position(), (16, 32));
    }

    #[test]
    fn test_encode_rejects_oversized_layer() {
        let objects = (0..=u16::MAX as u32).map(|id| entity(id, 0.0, 0.0)).collect();
        let layer = ObjectLayer::new("entities", objects);
        let mut buf = BytesMut::new();

        let err = EntityLayerCodec::encode(&layer, &mut buf).unwrap_err();
        assert!(matches!(
            err,
            LevelError::Wire(WireError::TooManyRecords { count: 65536, .. })
        ));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_negative_position_rejected() {
        let object = entity(4, -1.0, 0.0);
        let layer = ObjectLayer::new("entities", vec![object.clone()]);
        let err = EntityLayerCodec::record(&layer, &object).unwrap_err();
        assert!(matches!(err, LevelError::InvalidObject { id: ObjectId(4), .. }));
    }
}
