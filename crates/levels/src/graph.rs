//! Object reference resolution and property packing
//!
//! Authoring ids never reach the level file. Internal warps and buttons
//! store the tile coordinate of the object they point at instead, and a
//! reference that cannot be resolved is dropped rather than failing the
//! export. Payload lengths therefore vary per object; a reader recovers the
//! length from the flag and count bits, never from a fixed size.

use std::collections::HashMap;

use swlevel_core::ObjectId;
use swlevel_protocol::ObjectClass;
use tracing::{debug, warn};

use crate::document::{LevelDocument, ObjectLayer};
use crate::objects::{ObjectDescriptor, ObjectKind};

/// Crate variant bits
pub mod crate_flags {
    pub const STICKY: u8 = 0b1;
    pub const TRAIL: u8 = 0b10;
}

/// Internal warp variant bits
pub mod warp_internal_flags {
    pub const ALLOW_CRATES: u8 = 0b1;
}

/// External warp variant bits
pub mod warp_external_flags {
    pub const MANUAL_INDEX: u8 = 0b1;
}

/// Button variant bits; the top three bits hold the target count
pub mod button_flags {
    pub const CRATE_PRESS: u8 = 0b1;
    pub const PLAYER_PRESS: u8 = 0b10;
    pub const INVERT_ACTION: u8 = 0b100;
    pub const STAY_DOWN_ON_PRESS: u8 = 0b1000;
    pub const FLAG_MASK: u8 = 0b1_1111;
    pub const COUNT_SHIFT: u8 = 5;
}

/// Laser variant bits; emitters and receivers keep a direction in bits 6-7
pub mod laser_flags {
    pub const EMIT_DIRECTION: u8 = 0b1;
    pub const PLAYER_MOVE: u8 = 0b10;
    pub const DIRECTION_SHIFT: u8 = 6;
}

/// Ghost block variant bits
pub mod ghost_flags {
    pub const PLAYER_MOVE: u8 = 0b10;
    pub const INVERTED: u8 = 0b100;
}

/// Where an object ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphEntry {
    pub id: ObjectId,
    /// `None` for objects that are referenced but emit no frame
    pub class: Option<ObjectClass>,
    pub x: u8,
    pub y: u8,
    /// Position in the layer's object list
    pub index: usize,
}

/// Lookup from authoring id to resolved position
#[derive(Debug, Clone, Default)]
pub struct ObjectGraph {
    entries: Vec<GraphEntry>,
    by_id: HashMap<ObjectId, usize>,
}

impl ObjectGraph {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            by_id: HashMap::with_capacity(capacity),
        }
    }

    fn insert(&mut self, entry: GraphEntry) {
        let slot = self.entries.len();
        if self.by_id.insert(entry.id, slot).is_some() {
            warn!("Duplicate object id {}, later object wins", entry.id);
        }
        self.entries.push(entry);
    }

    /// Index every descriptor; with duplicate ids the later object wins
    pub fn build(descriptors: &[ObjectDescriptor]) -> Self {
        let mut graph = Self::with_capacity(descriptors.len());
        for descriptor in descriptors {
            graph.insert(GraphEntry {
                id: descriptor.id,
                class: Some(descriptor.class()),
                x: descriptor.x,
                y: descriptor.y,
                index: descriptor.index,
            });
        }
        graph
    }

    /// Index every object of `layer`, classified or not
    ///
    /// References may point at any object in the layer, so objects that
    /// emit no frame of their own are still resolvable. An unclassified
    /// object whose tile does not fit in a byte cannot be referenced and is
    /// left out with a warning.
    pub fn from_layer(doc: &dyn LevelDocument, layer: &ObjectLayer) -> Self {
        let (tile_width, tile_height) = doc.tile_size();
        let mut graph = Self::with_capacity(layer.objects.len());

        for (index, object) in layer.objects.iter().enumerate() {
            let tile = object.position().to_object_tile(tile_width, tile_height);
            let Some((x, y)) = tile.to_bytes() else {
                warn!(
                    "Object {}: tile ({}, {}) cannot be referenced",
                    object.id, tile.x, tile.y
                );
                continue;
            };
            graph.insert(GraphEntry {
                id: object.id,
                class: doc.object_class(object).and_then(ObjectClass::from_name),
                x,
                y,
                index,
            });
        }

        graph
    }

    /// Entries in authoring order
    pub fn entries(&self) -> &[GraphEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an authoring id
    pub fn resolve(&self, id: ObjectId) -> Option<&GraphEntry> {
        self.by_id.get(&id).map(|&slot| &self.entries[slot])
    }

    /// Class payload bytes for one object
    pub fn encode_payload(&self, descriptor: &ObjectDescriptor) -> Vec<u8> {
        match &descriptor.kind {
            ObjectKind::Player { mode } => vec![*mode as u8],
            ObjectKind::Crate { sticky, trail } => {
                let mut variant = 0;
                if *sticky {
                    variant |= crate_flags::STICKY;
                }
                if *trail {
                    variant |= crate_flags::TRAIL;
                }
                vec![variant]
            }
            ObjectKind::WarpInternal {
                allow_crates,
                hp,
                target,
            } => {
                let mut variant = 0;
                if *allow_crates {
                    variant |= warp_internal_flags::ALLOW_CRATES;
                }
                let mut payload = vec![variant, *hp];
                match target.and_then(|id| self.resolve(id)) {
                    Some(exit) if exit.class.is_some_and(|c| c.is_warp_destination()) => {
                        debug!(
                            "Warp {} targets {} at ({}, {})",
                            descriptor.id, exit.id, exit.x, exit.y
                        );
                        payload.push(exit.x);
                        payload.push(exit.y);
                    }
                    Some(other) => warn!(
                        "Warp {}: target {} ({:?}) is not a warp exit",
                        descriptor.id, other.id, other.class
                    ),
                    None => warn!("Warp {}: no valid warp exit at target_id", descriptor.id),
                }
                payload
            }
            ObjectKind::WarpInternalExit | ObjectKind::LaserReceiveOmni => Vec::new(),
            ObjectKind::WarpExternal {
                manual_index,
                target_index,
            } => {
                let variant = if *manual_index {
                    warp_external_flags::MANUAL_INDEX
                } else {
                    0
                };
                vec![variant, *target_index]
            }
            ObjectKind::Button {
                crate_press,
                player_press,
                invert_action,
                stay_down_on_press,
                targets,
            } => {
                let mut variant = 0;
                if *crate_press {
                    variant |= button_flags::CRATE_PRESS;
                }
                if *player_press {
                    variant |= button_flags::PLAYER_PRESS;
                }
                if *invert_action {
                    variant |= button_flags::INVERT_ACTION;
                }
                if *stay_down_on_press {
                    variant |= button_flags::STAY_DOWN_ON_PRESS;
                }

                let mut coords = Vec::with_capacity(targets.len() * 2);
                let mut count = targets.len() as u8;
                for (slot, target) in targets.iter().enumerate() {
                    match target.and_then(|id| self.resolve(id)) {
                        Some(entry) => {
                            debug!(
                                "Button {} slot {} -> {} at ({}, {})",
                                descriptor.id,
                                slot + 1,
                                entry.id,
                                entry.x,
                                entry.y
                            );
                            coords.push(entry.x);
                            coords.push(entry.y);
                        }
                        None => {
                            warn!(
                                "Button {}: target{}id {:?} not found, dropped",
                                descriptor.id,
                                slot + 1,
                                target
                            );
                            count -= 1;
                        }
                    }
                }

                let mut payload = Vec::with_capacity(1 + coords.len());
                payload.push((variant & button_flags::FLAG_MASK) | (count << button_flags::COUNT_SHIFT));
                payload.extend_from_slice(&coords);
                payload
            }
            ObjectKind::LaserEmitUp {
                player_move,
                direction,
            } => {
                let mut variant = 0;
                if *player_move {
                    variant |= laser_flags::PLAYER_MOVE;
                }
                variant |= (*direction as u8 & 0b11) << laser_flags::DIRECTION_SHIFT;
                vec![variant]
            }
            ObjectKind::LaserReceiveUp { direction } => {
                vec![(*direction as u8 & 0b11) << laser_flags::DIRECTION_SHIFT]
            }
            ObjectKind::Laser90Right {
                emit_direction,
                player_move,
            } => {
                let mut variant = 0;
                if *emit_direction {
                    variant |= laser_flags::EMIT_DIRECTION;
                }
                if *player_move {
                    variant |= laser_flags::PLAYER_MOVE;
                }
                vec![variant]
            }
            ObjectKind::GhostBlock {
                inverted,
                player_move,
            } => {
                let mut variant = 0;
                if *inverted {
                    variant |= ghost_flags::INVERTED;
                }
                if *player_move {
                    variant |= ghost_flags::PLAYER_MOVE;
                }
                vec![variant]
            }
        }
    }
}
