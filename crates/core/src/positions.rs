//! Position types for level objects

use serde::{Deserialize, Serialize};

/// Default tile edge in pixels (tiles are 16x16 on the Swadge)
pub const TILE_SIZE_PX: u32 = 16;

/// log2 of [`TILE_SIZE_PX`], used by the fixed-point entity coordinates
pub const TILE_SIZE_SHIFT: u32 = 4;

/// Tile-based position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TilePosition {
    pub x: i64,
    pub y: i64,
}

impl TilePosition {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Narrow to a byte coordinate pair, if both axes fit
    pub fn to_bytes(self) -> Option<(u8, u8)> {
        let x = u8::try_from(self.x).ok()?;
        let y = u8::try_from(self.y).ok()?;
        Some((x, y))
    }
}

/// Pixel-based position as authored in the editor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelPosition {
    pub x: f64,
    pub y: f64,
}

impl PixelPosition {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Tile containing this pixel for the given tile size
    pub fn to_tiles(self, tile_width: u32, tile_height: u32) -> TilePosition {
        TilePosition {
            x: (self.x / tile_width.max(1) as f64).floor() as i64,
            y: (self.y / tile_height.max(1) as f64).floor() as i64,
        }
    }

    /// Tile an object occupies; objects are anchored at their bottom edge
    pub fn to_object_tile(self, tile_width: u32, tile_height: u32) -> TilePosition {
        let tile = self.to_tiles(tile_width, tile_height);
        TilePosition::new(tile.x, tile.y - 1)
    }

    /// Whole-pixel position, floored
    pub fn floor(self) -> (i64, i64) {
        (self.x.floor() as i64, self.y.floor() as i64)
    }
}

/// Split a whole-pixel coordinate into (tile, remainder) with 16px tiles
///
/// Both parts are truncated to a byte the same way the runtime reads them.
pub fn fixed_point_split(pixel: i64) -> (u8, u8) {
    let tile = (pixel >> TILE_SIZE_SHIFT) as u8;
    let sub = (pixel % TILE_SIZE_PX as i64) as u8;
    (tile, sub)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_to_tile_conversion() {
        let pixel_pos = PixelPosition::new(32.0, 48.0);
        let tile_pos = pixel_pos.to_tiles(16, 16);
        assert_eq!(tile_pos.x, 2);
        assert_eq!(tile_pos.y, 3);
    }

    #[test]
    fn test_object_tile_is_one_row_up() {
        // bottom-left anchored sprite sitting on row 3
        let pos = PixelPosition::new(40.0, 64.0);
        assert_eq!(pos.to_object_tile(16, 16), TilePosition::new(2, 3));
    }

    #[test]
    fn test_fixed_point_split() {
        assert_eq!(fixed_point_split(0), (0, 0));
        assert_eq!(fixed_point_split(37), (2, 5));
        assert_eq!(fixed_point_split(255), (15, 15));
        assert_eq!(fixed_point_split(4096 + 3), (0, 3));
    }

    #[test]
    fn test_tile_position_to_bytes() {
        assert_eq!(TilePosition::new(3, 4).to_bytes(), Some((3, 4)));
        assert_eq!(TilePosition::new(-1, 4).to_bytes(), None);
        assert_eq!(TilePosition::new(3, 256).to_bytes(), None);
    }
}
