//! # Swadge Level Export
//!
//! This crate turns editor level documents into the binary level files the
//! Swadge games load, and reads back the formats that support it.
//!
//! ## Features
//! - Editor document model (tile layers, object layers, properties) in JSON
//! - Tile layer to byte grid conversion with per-format id offsets
//! - Warp marker deferral for Super Swadge Land
//! - Entity record layers for Mega Pulse EX
//! - Object reference resolution and stacked object frames for Sokobon
//! - Format registry with writers for every game and readers where possible
//!
//! ## Formats
//!
//! | Format        | Header   | Tiles    | Trailer                       |
//! |---------------|----------|----------|-------------------------------|
//! | Swadge Land   | `[w, h]` | raw ids  | 32-byte warp table            |
//! | Breakout      | `[w, h]` | raw ids  | u16 target block count        |
//! | Lumber Jacks  | `[h]`    | id + 1   | spawn point and switches      |
//! | Mega Pulse EX | `[w, h]` | raw ids  | counted entity records        |
//! | Soko          | `[w, h]` | id + 1   | none, frames follow each tile |

pub mod document;
pub mod entities;
pub mod error;
pub mod formats;
pub mod graph;
pub mod objects;
pub mod tiles;

pub use document::{
    Document, Layer, LevelDocument, MapObject, ObjectLayer, PropertyValue, TileLayer, Tileset,
};
pub use entities::EntityLayerCodec;
pub use error::{LevelError, Result};
pub use formats::{FormatOptions, MapFormat};
pub use graph::ObjectGraph;
pub use objects::{collect_descriptors, GameMode, ObjectDescriptor, ObjectKind};
