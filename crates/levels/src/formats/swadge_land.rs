//! Super Swadge Land
//!
//! ```text
//! +-------+--------+-------------------------+------------------+
//! | w (1) | h (1)  | tiles (w * h, raw ids)  | warp table (32)  |
//! +-------+--------+-------------------------+------------------+
//! ```
//!
//! Warp markers (ids 1..=16) stand above a warp tile in the editor. Unless
//! the tile below is an anchor, the marker is cleared from the body and its
//! coordinate written to the warp table instead.

use bytes::BytesMut;
use swlevel_protocol::{TileGridCodec, WarpTable, WireSerializable};
use tracing::{debug, info};

use super::{required_tile_layer, FormatOptions, MapFormat};
use crate::document::{Document, LevelDocument};
use crate::tiles::{extract_grid, grid_to_layer};
use crate::Result;

const CODEC: TileGridCodec = TileGridCodec::explicit();

pub fn write(doc: &dyn LevelDocument, options: &FormatOptions) -> Result<Vec<u8>> {
    let layer = required_tile_layer(doc, MapFormat::SwadgeLand)?;
    let grid = extract_grid(layer, &CODEC)?;

    let (body, table) = options.warp_resolver().defer_markers(&grid);
    let mut buf = BytesMut::with_capacity(2 + body.len() + table.slots().len() * 2);
    CODEC.encode_header(&body, &mut buf)?;
    CODEC.encode_body(&body, &mut buf);
    table.write_wire(&mut buf);

    info!(
        "Wrote Swadge Land level {}x{} ({} bytes, {} warps)",
        body.width(),
        body.height(),
        buf.len(),
        table.markers().count()
    );
    Ok(buf.to_vec())
}

pub fn read(bytes: &[u8], options: &FormatOptions) -> Result<Document> {
    let (rest, mut grid) = CODEC.decode(bytes)?;
    let (rest, table) = WarpTable::read_wire(rest)?;
    if !rest.is_empty() {
        debug!("Ignoring {} trailing bytes", rest.len());
    }

    options.warp_resolver().restore_markers(&mut grid, &table);
    info!("Read Swadge Land level {}x{}", grid.width(), grid.height());

    let layer = grid_to_layer(&grid, &CODEC, "Main");
    Ok(options.decoded_document(layer, MapFormat::SwadgeLand.tileset()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Layer, TileLayer};
    use crate::LevelError;
    use swlevel_protocol::WireError;

    /// 4x3 level: warp marker 3 at (1,0) standing on tile 50
    fn level(below_marker: Option<u32>) -> Document {
        let mut layer = TileLayer::new("Main", 4, 3);
        layer.set_tile(1, 0, Some(3));
        layer.set_tile(1, 1, below_marker);
        for x in 0..4 {
            layer.set_tile(x, 2, Some(10));
        }
        Document::new(4, 3).with_layer(Layer::Tile(layer))
    }

    #[test]
    fn test_plain_grid() {
        let doc = Document::new(4, 3).with_layer(Layer::Tile(TileLayer::filled("Main", 4, 3, 5)));
        let bytes = write(&doc, &FormatOptions::default()).unwrap();

        let mut expected = vec![4, 3];
        expected.extend_from_slice(&[5; 12]);
        expected.extend_from_slice(&[0; 32]);
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_marker_at_origin_is_lost() {
        let mut layer = TileLayer::filled("Main", 4, 3, 5);
        layer.set_tile(0, 0, Some(1));
        layer.set_tile(0, 1, Some(99));
        let doc = Document::new(4, 3).with_layer(Layer::Tile(layer));

        let options = FormatOptions::default();
        let bytes = write(&doc, &options).unwrap();
        assert_eq!(bytes[2], 0);
        assert_eq!(&bytes[14..16], &[0, 0]);

        // an unused slot and a marker at (0, 0) look the same
        let back = read(&bytes, &options).unwrap();
        assert_eq!(back.first_tile_layer().unwrap().tile_at(0, 0), None);
    }

    #[test]
    fn test_write_deferred_warp() {
        let bytes = write(&level(Some(50)), &FormatOptions::default()).unwrap();

        assert_eq!(bytes.len(), 2 + 12 + 32);
        assert_eq!(&bytes[..2], &[4, 3]);
        assert_eq!(&bytes[2..14], &[0, 0, 0, 0, 0, 50, 0, 0, 10, 10, 10, 10]);

        // Marker 3 lives in slot 2
        let table = &bytes[14..];
        assert_eq!(&table[4..6], &[1, 0]);
        assert!(table[..4].iter().chain(&table[6..]).all(|b| *b == 0));
    }

    #[test]
    fn test_write_anchor_keeps_marker() {
        let bytes = write(&level(Some(34)), &FormatOptions::default()).unwrap();
        assert_eq!(bytes[2 + 1], 3);
        assert!(bytes[14..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_write_marker_over_empty_cell() {
        let bytes = write(&level(None), &FormatOptions::default()).unwrap();
        assert_eq!(bytes[2 + 1], 0);
        assert_eq!(&bytes[14 + 4..14 + 6], &[1, 0]);
    }

    #[test]
    fn test_round_trip_restores_markers() {
        let options = FormatOptions::default();
        let doc = level(Some(50));
        let bytes = write(&doc, &options).unwrap();
        let back = read(&bytes, &options).unwrap();

        let layer = back.first_tile_layer().unwrap();
        assert_eq!(layer.tile_at(1, 0), Some(3));
        assert_eq!(layer.tile_at(1, 1), Some(50));
        assert_eq!(layer.tile_at(0, 0), None);
        assert_eq!(back.tileset.as_ref().unwrap().name, "swadge-land-tileset.tsx");
        assert_eq!(back.tile_size(), (16, 16));
    }

    #[test]
    fn test_read_requires_table() {
        let err = read(&[1, 1, 5], &FormatOptions::default()).unwrap_err();
        assert!(matches!(err, LevelError::Wire(WireError::Truncated { .. })));
    }
}
