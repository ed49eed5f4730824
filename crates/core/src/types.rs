//! Core type definitions

use serde::{Deserialize, Serialize};

/// Authoring identifier assigned to an object by the level editor
///
/// Never written to a level file; it is always resolved to a tile
/// coordinate or an array index first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub u32);

impl ObjectId {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl From<u32> for ObjectId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Single-byte tile identifier (0 = empty)
pub type TileId = u8;

/// Empty tile value
pub const EMPTY_TILE: TileId = 0;

/// Tile flip flags as stored in entity records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flip {
    pub horizontal: bool,
    pub vertical: bool,
}

impl Flip {
    pub const fn new(horizontal: bool, vertical: bool) -> Self {
        Self { horizontal, vertical }
    }

    /// Packed flag byte: bit1 = vertical, bit0 = horizontal
    pub fn bits(&self) -> u8 {
        ((self.vertical as u8) << 1) | (self.horizontal as u8)
    }

    pub fn from_bits(bits: u8) -> Self {
        Self {
            horizontal: bits & 0b01 != 0,
            vertical: bits & 0b10 != 0,
        }
    }
}

/// Cardinal direction used by laser objects
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Up = 0,
    Down = 1,
    Right = 2,
    Left = 3,
}

impl Direction {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Up),
            1 => Some(Self::Down),
            2 => Some(Self::Right),
            3 => Some(Self::Left),
            _ => None,
        }
    }

    /// Parse the editor's enum spelling (`UP`, `down`, ...)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "UP" => Some(Self::Up),
            "DOWN" => Some(Self::Down),
            "RIGHT" => Some(Self::Right),
            "LEFT" => Some(Self::Left),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "UP",
            Self::Down => "DOWN",
            Self::Right => "RIGHT",
            Self::Left => "LEFT",
        }
    }
}
