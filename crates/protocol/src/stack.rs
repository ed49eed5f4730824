//! Object frames stacked into the tile stream
//!
//! Soko levels carry no separate object section. Each object becomes a
//! frame spliced into the tile body right after the tile it stands on:
//!
//! ```text
//! [w][h] [t0] [t1] ... [tN] [201][class][payload...][230] [tN+1] ...
//! ```

use tracing::trace;

use crate::error::{Result, WireError};

/// Opens a stacked object frame
pub const STACK_IN_PLACE: u8 = 201;

/// Run-length marker reserved by the runtime; never emitted here
pub const STACK_COMPRESS: u8 = 202;

/// Closes a stacked object frame
pub const STACK_OBJ_END: u8 = 230;

/// Bytes a frame adds on top of its payload (open, class, close)
pub const FRAME_OVERHEAD: usize = 3;

/// Semantic class of a level object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectClass {
    Player,
    Crate,
    WarpInternal,
    WarpInternalExit,
    WarpExternal,
    Button,
    LaserEmitUp,
    LaserReceiveOmni,
    LaserReceiveUp,
    Laser90Right,
    GhostBlock,
}

impl ObjectClass {
    pub const ALL: [ObjectClass; 11] = [
        Self::Player,
        Self::Crate,
        Self::WarpInternal,
        Self::WarpInternalExit,
        Self::WarpExternal,
        Self::Button,
        Self::LaserEmitUp,
        Self::LaserReceiveOmni,
        Self::LaserReceiveUp,
        Self::Laser90Right,
        Self::GhostBlock,
    ];

    /// Class byte written after [`STACK_IN_PLACE`]
    pub fn signature(&self) -> u8 {
        match self {
            Self::Player => 203,
            Self::Crate => 204,
            Self::WarpInternal => 205,
            Self::WarpInternalExit => 206,
            Self::WarpExternal => 207,
            Self::Button => 208,
            Self::LaserEmitUp => 209,
            Self::LaserReceiveOmni => 210,
            Self::LaserReceiveUp => 211,
            Self::Laser90Right => 212,
            Self::GhostBlock => 213,
        }
    }

    pub fn from_signature(sig: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|class| class.signature() == sig)
    }

    /// Class name as used by the editor's tileset
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::Crate => "crate",
            Self::WarpInternal => "warpinternal",
            Self::WarpInternalExit => "warpinternalexit",
            Self::WarpExternal => "warpexternal",
            Self::Button => "button",
            Self::LaserEmitUp => "laserEmitUp",
            Self::LaserReceiveOmni => "laserReceiveOmni",
            Self::LaserReceiveUp => "laserReceiveUp",
            Self::Laser90Right => "laser90Right",
            Self::GhostBlock => "ghostblock",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|class| class.as_str() == name)
    }

    /// Classes an internal warp may target
    pub fn is_warp_destination(&self) -> bool {
        matches!(self, Self::WarpInternal | Self::WarpInternalExit)
    }
}

impl std::fmt::Display for ObjectClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One object's frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFrame {
    pub class: ObjectClass,
    pub payload: Vec<u8>,
}

impl StackFrame {
    pub fn new(class: ObjectClass, payload: Vec<u8>) -> Self {
        Self { class, payload }
    }

    /// Encoded size
    pub fn len(&self) -> usize {
        self.payload.len() + FRAME_OVERHEAD
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.len());
        bytes.push(STACK_IN_PLACE);
        bytes.push(self.class.signature());
        bytes.extend_from_slice(&self.payload);
        bytes.push(STACK_OBJ_END);
        bytes
    }
}

/// A frame and the tile it belongs after
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insertion {
    /// Linear tile index `x + y * width`
    pub pos: usize,
    /// Authoring order, used to keep objects on the same tile in order
    pub order: usize,
    pub frame: StackFrame,
}

/// Splices frames into a header-prefixed tile stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackedObjectInjector {
    header_len: usize,
}

impl Default for StackedObjectInjector {
    fn default() -> Self {
        Self::new(2)
    }
}

impl StackedObjectInjector {
    pub fn new(header_len: usize) -> Self {
        Self { header_len }
    }

    /// Insert every frame right after its tile
    ///
    /// Insertions are applied from the highest tile position down. A splice
    /// only shifts bytes after its own insertion point, so every position
    /// still waiting to be processed (all of them lower) keeps its original
    /// offset `pos + header_len + 1`. Objects sharing a tile are applied in
    /// reverse authoring order, which leaves them in authoring order in the
    /// output.
    pub fn inject(&self, mut stream: Vec<u8>, mut insertions: Vec<Insertion>) -> Result<Vec<u8>> {
        let tiles = stream.len().saturating_sub(self.header_len);
        if let Some(bad) = insertions.iter().find(|ins| ins.pos >= tiles) {
            return Err(WireError::StackPosition { pos: bad.pos, tiles });
        }

        insertions.sort_by(|a, b| b.pos.cmp(&a.pos).then(b.order.cmp(&a.order)));

        let extra: usize = insertions.iter().map(|ins| ins.frame.len()).sum();
        stream.reserve(extra);

        for insertion in &insertions {
            let at = insertion.pos + self.header_len + 1;
            trace!(
                "Stacking {} (object {}) at tile {} -> offset {}",
                insertion.frame.class,
                insertion.order,
                insertion.pos,
                at
            );
            stream.splice(at..at, insertion.frame.to_bytes());
        }

        Ok(stream)
    }
}
