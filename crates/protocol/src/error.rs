//! Error types for the wire layer

use swlevel_core::CoreError;

/// Byte-level encode/decode errors
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// Input ended before a fixed-size section was complete
    #[error("Truncated {what}: expected {expected} bytes, got {actual}")]
    Truncated {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Grid dimension does not fit the one-byte header
    #[error("Dimension out of range: {0}")]
    Dimension(String),

    /// Grid does not match the fixed layout of a format
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Tile id does not fit in a byte after offsetting
    #[error("Tile id {id} at ({x}, {y}) does not fit in one byte")]
    TileOutOfRange { id: u32, x: usize, y: usize },

    /// Record list longer than its 16-bit count field
    #[error("{count} records do not fit a count field of at most {max}")]
    TooManyRecords { count: usize, max: usize },

    /// Object frame cannot be placed in the tile stream
    #[error("Stack position {pos} outside tile stream of {tiles} tiles")]
    StackPosition { pos: usize, tiles: usize },
}

impl From<WireError> for CoreError {
    fn from(err: WireError) -> Self {
        CoreError::Wire(err.to_string())
    }
}

/// Result type for wire operations
pub type Result<T> = std::result::Result<T, WireError>;
