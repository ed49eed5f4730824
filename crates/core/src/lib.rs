//! Swadge level core - shared types for the level codecs

mod error;
mod types;
mod positions;

pub use error::*;
pub use types::*;
pub use positions::*;
