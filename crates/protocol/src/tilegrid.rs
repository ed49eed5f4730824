//! Tile grid packing
//!
//! A level's tile layer travels as a short header followed by one byte per
//! tile in row-major order.
//!
//! # Header variants
//! ```text
//! Explicit:    [width] [height] [tile(0,0)] [tile(1,0)] ... [tile(w-1,h-1)]
//! FixedWidth:  [height] ...format specific bytes... [tiles]
//! ```
//!
//! The fixed-width variant only stores the height; the width is implied by
//! the format (Lumber Jacks levels are always 18 tiles wide).

use bytes::BytesMut;
use swlevel_core::{TileId, EMPTY_TILE};

use crate::codecs::{read_u8, take_bytes, write_u8};
use crate::error::{Result, WireError};

/// Largest width or height a one-byte header can describe
pub const MAX_DIMENSION: usize = u8::MAX as usize;

/// A rectangular grid of single-byte tile ids
///
/// Tiles are stored row-major and `tiles.len() == width * height` always
/// holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileMap {
    width: u8,
    height: u8,
    tiles: Vec<TileId>,
}

impl TileMap {
    /// Create an empty grid
    pub fn new(width: u8, height: u8) -> Self {
        Self {
            width,
            height,
            tiles: vec![EMPTY_TILE; width as usize * height as usize],
        }
    }

    /// Create a grid from row-major tile data
    pub fn from_tiles(width: u8, height: u8, tiles: Vec<TileId>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if tiles.len() != expected {
            return Err(WireError::ShapeMismatch(format!(
                "{}x{} grid needs {} tiles, got {}",
                width,
                height,
                expected,
                tiles.len()
            )));
        }
        Ok(Self { width, height, tiles })
    }

    /// Create an empty grid from editor dimensions, rejecting anything
    /// a one-byte header cannot hold
    pub fn with_dimensions(width: usize, height: usize) -> Result<Self> {
        let w = u8::try_from(width)
            .map_err(|_| WireError::Dimension(format!("width {} exceeds {}", width, MAX_DIMENSION)))?;
        let h = u8::try_from(height)
            .map_err(|_| WireError::Dimension(format!("height {} exceeds {}", height, MAX_DIMENSION)))?;
        Ok(Self::new(w, h))
    }

    #[inline]
    pub fn width(&self) -> u8 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u8 {
        self.height
    }

    /// Number of cells
    #[inline]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Linear index of (x, y)
    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.width as usize + x
    }

    #[inline]
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x < self.width as usize && y < self.height as usize
    }

    /// Tile at (x, y), or empty outside the grid
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> TileId {
        if self.contains(x, y) {
            self.tiles[self.index(x, y)]
        } else {
            EMPTY_TILE
        }
    }

    /// Set tile at (x, y); writes outside the grid are ignored
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, tile: TileId) {
        if self.contains(x, y) {
            let index = self.index(x, y);
            self.tiles[index] = tile;
        }
    }

    /// Raw row-major tile data
    #[inline]
    pub fn tiles(&self) -> &[TileId] {
        &self.tiles
    }

    /// Iterate over `(x, y, tile)` in row-major order
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, TileId)> + '_ {
        let width = self.width.max(1) as usize;
        self.tiles
            .iter()
            .enumerate()
            .map(move |(i, &tile)| (i % width, i / width, tile))
    }
}

/// How the grid dimensions are stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridHeader {
    /// `[width, height]`
    Explicit,
    /// `[height]` with a width implied by the format
    FixedWidth { width: u8 },
}

/// Encoder/decoder for the header and body of a tile grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileGridCodec {
    header: GridHeader,
    id_offset: u8,
}

impl TileGridCodec {
    /// `[width, height]` header, tile ids written unchanged
    pub const fn explicit() -> Self {
        Self {
            header: GridHeader::Explicit,
            id_offset: 0,
        }
    }

    /// `[height]` header with an implied width
    pub const fn fixed_width(width: u8) -> Self {
        Self {
            header: GridHeader::FixedWidth { width },
            id_offset: 0,
        }
    }

    /// Add `offset` to every present tile so 0 can stay reserved for empty
    pub const fn with_id_offset(mut self, offset: u8) -> Self {
        self.id_offset = offset;
        self
    }

    pub fn header(&self) -> GridHeader {
        self.header
    }

    pub fn id_offset(&self) -> u8 {
        self.id_offset
    }

    /// Map an editor cell to its wire byte
    ///
    /// Empty cells always become 0. Present cells get the id offset added
    /// and must still fit in a byte.
    pub fn encode_cell(&self, cell: Option<u32>, x: usize, y: usize) -> Result<TileId> {
        match cell {
            None => Ok(EMPTY_TILE),
            Some(id) => {
                let shifted = id.saturating_add(self.id_offset as u32);
                u8::try_from(shifted).map_err(|_| WireError::TileOutOfRange { id, x, y })
            }
        }
    }

    /// Map a wire byte back to an editor cell
    pub fn decode_cell(&self, byte: TileId) -> Option<u32> {
        if self.id_offset > 0 {
            byte.checked_sub(self.id_offset).map(u32::from)
        } else if byte == EMPTY_TILE {
            None
        } else {
            Some(byte as u32)
        }
    }

    /// Check the grid fits this header before anything is written
    pub fn validate(&self, grid: &TileMap) -> Result<()> {
        if let GridHeader::FixedWidth { width } = self.header {
            if grid.width() != width {
                return Err(WireError::ShapeMismatch(format!(
                    "format requires width {}, level is {} wide",
                    width,
                    grid.width()
                )));
            }
        }
        Ok(())
    }

    /// Write the dimension header
    pub fn encode_header(&self, grid: &TileMap, buf: &mut BytesMut) -> Result<()> {
        self.validate(grid)?;
        match self.header {
            GridHeader::Explicit => {
                write_u8(buf, grid.width());
                write_u8(buf, grid.height());
            }
            GridHeader::FixedWidth { .. } => write_u8(buf, grid.height()),
        }
        Ok(())
    }

    /// Write the row-major body
    pub fn encode_body(&self, grid: &TileMap, buf: &mut BytesMut) {
        buf.extend_from_slice(grid.tiles());
    }

    /// Header followed directly by the body
    pub fn encode(&self, grid: &TileMap) -> Result<BytesMut> {
        let mut buf = BytesMut::with_capacity(2 + grid.len());
        self.encode_header(grid, &mut buf)?;
        self.encode_body(grid, &mut buf);
        Ok(buf)
    }

    /// Parse the dimension header
    pub fn decode_header<'a>(&self, input: &'a [u8]) -> Result<(&'a [u8], (u8, u8))> {
        match self.header {
            GridHeader::Explicit => {
                let (input, width) = read_u8(input, "grid width")?;
                let (input, height) = read_u8(input, "grid height")?;
                Ok((input, (width, height)))
            }
            GridHeader::FixedWidth { width } => {
                let (input, height) = read_u8(input, "grid height")?;
                Ok((input, (width, height)))
            }
        }
    }

    /// Parse a `width * height` body
    ///
    /// A short body is an error; the grid is never padded.
    pub fn decode_body<'a>(
        &self,
        input: &'a [u8],
        width: u8,
        height: u8,
    ) -> Result<(&'a [u8], TileMap)> {
        let count = width as usize * height as usize;
        let (input, body) = take_bytes(input, count, "tile body")?;
        let grid = TileMap::from_tiles(width, height, body.to_vec())?;
        Ok((input, grid))
    }

    /// Parse header and body, returning whatever follows the body
    pub fn decode<'a>(&self, input: &'a [u8]) -> Result<(&'a [u8], TileMap)> {
        let (input, (width, height)) = self.decode_header(input)?;
        self.decode_body(input, width, height)
    }
}
