//! # Swadge Level Wire Format
//!
//! Byte-level building blocks shared by every Swadge level format.
//!
//! ## Layers
//!
//! ### 1. Codecs ([`codecs`])
//! Single bytes and little-endian u16 values, with `nom` based readers that
//! report short input as [`WireError::Truncated`].
//!
//! ### 2. Tile grids ([`tilegrid`])
//! Row-major single-byte tile bodies behind an explicit `[w, h]` header or a
//! height-only header with an implied width.
//!
//! ### 3. Warp markers ([`warp`])
//! Deferral of warp marker tiles into the fixed 32-byte warp table.
//!
//! ### 4. Entity records ([`entity`])
//! Counted lists of 16-byte entity records.
//!
//! ### 5. Stacked objects ([`stack`])
//! Object frames spliced into the tile stream in descending position order.
//!
//! ## Usage Example
//!
//! ```rust
//! use swlevel_protocol::{TileGridCodec, TileMap, WarpResolver, WireSerializable};
//!
//! let grid = TileMap::from_tiles(2, 2, vec![3, 0, 99, 99]).unwrap();
//! let codec = TileGridCodec::explicit();
//!
//! let (body, table) = WarpResolver::default().defer_markers(&grid);
//! let mut buf = codec.encode(&body).unwrap();
//! table.write_wire(&mut buf);
//!
//! assert_eq!(&buf[..6], &[2, 2, 0, 0, 99, 99]);
//! assert_eq!(buf.len(), 6 + 32);
//! ```

pub mod codecs;
pub mod entity;
pub mod error;
pub mod stack;
pub mod tilegrid;
pub mod warp;

// Re-export commonly used items
pub use codecs::*;
pub use entity::*;
pub use error::{Result, WireError};
pub use stack::*;
pub use tilegrid::*;
pub use warp::*;
