//! Conversion between editor tile layers and wire grids

use swlevel_protocol::{TileGridCodec, TileMap};

use crate::document::TileLayer;
use crate::Result;

/// Pack a tile layer into a byte grid
///
/// Dimensions above 255 and tile ids that do not fit a byte after the
/// codec's offset are rejected before anything is written.
pub fn extract_grid(layer: &TileLayer, codec: &TileGridCodec) -> Result<TileMap> {
    let mut grid = TileMap::with_dimensions(layer.width, layer.height)?;
    for y in 0..layer.height {
        for x in 0..layer.width {
            let byte = codec.encode_cell(layer.tile_at(x, y), x, y)?;
            grid.set(x, y, byte);
        }
    }
    Ok(grid)
}

/// Unpack a byte grid into a tile layer
pub fn grid_to_layer(grid: &TileMap, codec: &TileGridCodec, name: &str) -> TileLayer {
    let mut layer = TileLayer::new(name, grid.width() as usize, grid.height() as usize);
    for (x, y, byte) in grid.cells() {
        layer.set_tile(x, y, codec.decode_cell(byte));
    }
    layer
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LevelError;
    use swlevel_protocol::WireError;

    #[test]
    fn test_extract_raw_ids() {
        let mut layer = TileLayer::filled("Main", 2, 2, 7);
        layer.set_tile(1, 0, None);

        let grid = extract_grid(&layer, &TileGridCodec::explicit()).unwrap();
        assert_eq!(grid.tiles(), &[7, 0, 7, 7]);
    }

    #[test]
    fn test_extract_offset_ids() {
        let mut layer = TileLayer::filled("Main", 2, 1, 0);
        layer.set_tile(1, 0, None);

        let codec = TileGridCodec::explicit().with_id_offset(1);
        let grid = extract_grid(&layer, &codec).unwrap();
        assert_eq!(grid.tiles(), &[1, 0]);

        let back = grid_to_layer(&grid, &codec, "Main");
        assert_eq!(back, layer);
    }

    #[test]
    fn test_extract_rejects_large_levels() {
        let layer = TileLayer::new("Main", 300, 1);
        let err = extract_grid(&layer, &TileGridCodec::explicit()).unwrap_err();
        assert!(matches!(err, LevelError::Wire(WireError::Dimension(_))));
    }

    #[test]
    fn test_extract_rejects_wide_tile_ids() {
        let layer = TileLayer::filled("Main", 1, 1, 300);
        let err = extract_grid(&layer, &TileGridCodec::explicit()).unwrap_err();
        assert!(matches!(
            err,
            LevelError::Wire(WireError::TileOutOfRange { id: 300, x: 0, y: 0 })
        ));
    }
}
