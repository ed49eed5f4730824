//! Warp marker deferral
//!
//! Tile ids 1 through 16 are warp markers. A marker sitting on an anchor
//! tile (brick, container or checkpoint) is a warp that lives inside that
//! block and is written into the tile body as-is. Any other marker is
//! pulled out of the body and its coordinate is stored in a fixed 16-slot
//! table appended after the tiles.
//!
//! # Table layout
//! ```text
//! [x0][y0][x1][y1] ... [x15][y15]     32 bytes, slot = marker id - 1
//! ```
//! Unused slots are `(0, 0)`.

use bytes::BytesMut;
use swlevel_core::{TileId, EMPTY_TILE};
use tracing::{debug, warn};

use crate::codecs::{take_bytes, WireSerializable};
use crate::error::Result;
use crate::tilegrid::TileMap;

/// Number of warp slots
pub const WARP_SLOTS: usize = 16;

/// Size of the encoded table in bytes
pub const WARP_TABLE_LEN: usize = WARP_SLOTS * 2;

/// Lowest warp marker id
pub const FIRST_WARP_MARKER: TileId = 1;

/// Highest warp marker id
pub const LAST_WARP_MARKER: TileId = WARP_SLOTS as TileId;

/// Brick block, container and checkpoint
pub const DEFAULT_ANCHOR_TILES: [TileId; 3] = [34, 64, 158];

/// Fixed table of deferred warp coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WarpTable {
    slots: [(u8, u8); WARP_SLOTS],
}

impl WarpTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the coordinate of `marker`; the last write for a slot wins
    pub fn set(&mut self, marker: TileId, x: u8, y: u8) {
        if let Some(slot) = Self::slot_of(marker) {
            self.slots[slot] = (x, y);
        }
    }

    /// Coordinate stored for `marker`, `(0, 0)` when unused
    pub fn get(&self, marker: TileId) -> (u8, u8) {
        Self::slot_of(marker)
            .map(|slot| self.slots[slot])
            .unwrap_or((0, 0))
    }

    /// Raw slots in order
    pub fn slots(&self) -> &[(u8, u8); WARP_SLOTS] {
        &self.slots
    }

    /// True when no slot holds a coordinate
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|&slot| slot == (0, 0))
    }

    /// Occupied slots as `(marker, x, y)`
    ///
    /// The marker id is recovered from the slot's byte offset in the table
    /// as `(offset + 2) >> 1`, i.e. `slot + 1`.
    pub fn markers(&self) -> impl Iterator<Item = (TileId, u8, u8)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|&(_, &slot)| slot != (0, 0))
            .map(|(slot, &(x, y))| {
                let offset = slot * 2;
                (((offset + 2) >> 1) as TileId, x, y)
            })
    }

    fn slot_of(marker: TileId) -> Option<usize> {
        if (FIRST_WARP_MARKER..=LAST_WARP_MARKER).contains(&marker) {
            Some((marker - 1) as usize)
        } else {
            None
        }
    }
}

impl WireSerializable for WarpTable {
    fn write_wire(&self, buf: &mut BytesMut) {
        for &(x, y) in &self.slots {
            buf.extend_from_slice(&[x, y]);
        }
    }

    fn read_wire(input: &[u8]) -> Result<(&[u8], Self)> {
        let (rest, raw) = take_bytes(input, WARP_TABLE_LEN, "warp table")?;
        let mut table = Self::new();
        for (slot, pair) in raw.chunks_exact(2).enumerate() {
            table.slots[slot] = (pair[0], pair[1]);
        }
        Ok((rest, table))
    }
}

/// Decides inline versus deferred encoding for every warp marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarpResolver {
    anchors: Vec<TileId>,
}

impl Default for WarpResolver {
    fn default() -> Self {
        Self::new(DEFAULT_ANCHOR_TILES.to_vec())
    }
}

impl WarpResolver {
    pub fn new(anchors: Vec<TileId>) -> Self {
        Self { anchors }
    }

    pub fn anchors(&self) -> &[TileId] {
        &self.anchors
    }

    #[inline]
    pub fn is_marker(tile: TileId) -> bool {
        (FIRST_WARP_MARKER..=LAST_WARP_MARKER).contains(&tile)
    }

    #[inline]
    pub fn is_anchor(&self, tile: TileId) -> bool {
        self.anchors.contains(&tile)
    }

    /// Strip deferred markers out of `grid`
    ///
    /// Returns the rewritten grid and the table that restores it. Markers on
    /// the bottom row have no tile below them and always stay inline.
    pub fn defer_markers(&self, grid: &TileMap) -> (TileMap, WarpTable) {
        let mut body = grid.clone();
        let mut table = WarpTable::new();
        let bottom = grid.height().saturating_sub(1) as usize;

        for (x, y, tile) in grid.cells() {
            if y >= bottom || !Self::is_marker(tile) {
                continue;
            }

            let below = grid.get(x, y + 1);
            if self.is_anchor(below) {
                debug!("Warp {} at ({}, {}) sits on anchor {}, kept inline", tile, x, y, below);
                continue;
            }

            let previous = table.get(tile);
            if previous != (0, 0) {
                debug!(
                    "Warp {} at ({}, {}) replaces earlier entry at {:?}",
                    tile, x, y, previous
                );
            }
            // x and y come from a grid whose dimensions fit in a byte
            table.set(tile, x as u8, y as u8);
            body.set(x, y, EMPTY_TILE);
        }

        (body, table)
    }

    /// Put every table entry back into `grid`
    pub fn restore_markers(&self, grid: &mut TileMap, table: &WarpTable) {
        for (marker, x, y) in table.markers() {
            if grid.contains(x as usize, y as usize) {
                grid.set(x as usize, y as usize, marker);
            } else {
                warn!("Warp {} points outside the level at ({}, {})", marker, x, y);
            }
        }
    }
}
