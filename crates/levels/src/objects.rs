//! Typed object descriptors
//!
//! Every object of a stacked-object level is read once into an
//! [`ObjectDescriptor`]: its authoring id, tile coordinate, authoring order
//! and an [`ObjectKind`] holding only the fields its class uses.

use swlevel_core::{Direction, ObjectId};
use swlevel_protocol::ObjectClass;
use tracing::{debug, warn};

use crate::document::{LevelDocument, MapObject, ObjectLayer};
use crate::{LevelError, Result};

/// Most targets a button can address (three count bits)
pub const MAX_BUTTON_TARGETS: usize = 7;

/// Game mode selected by the player object
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GameMode {
    Overworld = 0,
    #[default]
    Classic = 1,
    Euler = 2,
    LaserBounce = 3,
}

impl GameMode {
    /// Parse the editor spelling, with or without the `SOKO_` prefix
    pub fn from_name(name: &str) -> Option<Self> {
        let upper = name.trim().to_ascii_uppercase();
        match upper.strip_prefix("SOKO_").unwrap_or(&upper) {
            "OVERWORLD" => Some(Self::Overworld),
            "CLASSIC" => Some(Self::Classic),
            "EULER" => Some(Self::Euler),
            "LASER" | "LASERBOUNCE" => Some(Self::LaserBounce),
            _ => None,
        }
    }
}

/// Class-specific fields of an object
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectKind {
    Player {
        mode: GameMode,
    },
    Crate {
        sticky: bool,
        trail: bool,
    },
    WarpInternal {
        allow_crates: bool,
        hp: u8,
        target: Option<ObjectId>,
    },
    WarpInternalExit,
    WarpExternal {
        manual_index: bool,
        target_index: u8,
    },
    Button {
        crate_press: bool,
        player_press: bool,
        invert_action: bool,
        stay_down_on_press: bool,
        /// Authored target slots; `None` when the slot property is unset
        targets: Vec<Option<ObjectId>>,
    },
    LaserEmitUp {
        player_move: bool,
        direction: Direction,
    },
    LaserReceiveOmni,
    LaserReceiveUp {
        direction: Direction,
    },
    Laser90Right {
        emit_direction: bool,
        player_move: bool,
    },
    GhostBlock {
        inverted: bool,
        player_move: bool,
    },
}

/// Numeric property floored and wrapped into a byte, 0 when unset
fn byte_property(object: &MapObject, name: &str) -> u8 {
    object
        .number(name)
        .map(|value| value.floor() as i64 as u8)
        .unwrap_or(0)
}

fn direction_property(object: &MapObject, name: &str) -> Direction {
    match object.property(name) {
        None => Direction::default(),
        Some(value) => value
            .as_str()
            .and_then(Direction::from_name)
            .or_else(|| value.as_number().and_then(|n| Direction::from_u8(n as u8 & 0b11)))
            .unwrap_or_else(|| {
                warn!("Object {}: unknown {} {:?}, using UP", object.id, name, value);
                Direction::default()
            }),
    }
}

impl ObjectKind {
    /// Read the fields of `class` from an object's properties
    pub fn from_object(class: ObjectClass, object: &MapObject) -> Self {
        match class {
            ObjectClass::Player => {
                let mode = match object.property("gamemode").and_then(|v| v.as_str()) {
                    Some(name) => GameMode::from_name(name).unwrap_or_else(|| {
                        warn!("Object {}: unknown gamemode {:?}, using CLASSIC", object.id, name);
                        GameMode::Classic
                    }),
                    None => {
                        warn!("Object {}: no gamemode set, using CLASSIC", object.id);
                        GameMode::Classic
                    }
                };
                Self::Player { mode }
            }
            ObjectClass::Crate => Self::Crate {
                sticky: object.flag("sticky"),
                trail: object.flag("trail"),
            },
            ObjectClass::WarpInternal => Self::WarpInternal {
                allow_crates: object.flag("allow_crates"),
                hp: byte_property(object, "hp"),
                target: object.property("target_id").and_then(|v| v.as_object()),
            },
            ObjectClass::WarpInternalExit => Self::WarpInternalExit,
            ObjectClass::WarpExternal => Self::WarpExternal {
                manual_index: object.flag("manualIndex"),
                target_index: byte_property(object, "target_id"),
            },
            ObjectClass::Button => {
                let authored = byte_property(object, "numTargets") as usize & MAX_BUTTON_TARGETS;
                let targets = (1..=authored)
                    .map(|slot| {
                        object
                            .property(&format!("target{}id", slot))
                            .and_then(|v| v.as_object())
                    })
                    .collect();
                Self::Button {
                    crate_press: object.flag("cratePress"),
                    player_press: object.flag("playerPress"),
                    invert_action: object.flag("invertAction"),
                    stay_down_on_press: object.flag("stayDownOnPress"),
                    targets,
                }
            }
            ObjectClass::LaserEmitUp => Self::LaserEmitUp {
                player_move: object.flag("playerMove"),
                direction: direction_property(object, "emitDirection"),
            },
            ObjectClass::LaserReceiveOmni => Self::LaserReceiveOmni,
            ObjectClass::LaserReceiveUp => Self::LaserReceiveUp {
                direction: direction_property(object, "emitDirection"),
            },
            ObjectClass::Laser90Right => Self::Laser90Right {
                emit_direction: object.flag("emitDirection"),
                player_move: object.flag("playerMove"),
            },
            ObjectClass::GhostBlock => Self::GhostBlock {
                inverted: object.flag("inverted"),
                player_move: object.flag("playerMove"),
            },
        }
    }

    pub fn class(&self) -> ObjectClass {
        match self {
            Self::Player { .. } => ObjectClass::Player,
            Self::Crate { .. } => ObjectClass::Crate,
            Self::WarpInternal { .. } => ObjectClass::WarpInternal,
            Self::WarpInternalExit => ObjectClass::WarpInternalExit,
            Self::WarpExternal { .. } => ObjectClass::WarpExternal,
            Self::Button { .. } => ObjectClass::Button,
            Self::LaserEmitUp { .. } => ObjectClass::LaserEmitUp,
            Self::LaserReceiveOmni => ObjectClass::LaserReceiveOmni,
            Self::LaserReceiveUp { .. } => ObjectClass::LaserReceiveUp,
            Self::Laser90Right { .. } => ObjectClass::Laser90Right,
            Self::GhostBlock { .. } => ObjectClass::GhostBlock,
        }
    }
}

/// An object ready for reference resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectDescriptor {
    /// Authoring id
    pub id: ObjectId,

    /// Class-specific fields
    pub kind: ObjectKind,

    /// Tile the object stands on
    pub x: u8,
    pub y: u8,

    /// Position in the layer's object list
    pub index: usize,
}

impl ObjectDescriptor {
    pub fn class(&self) -> ObjectClass {
        self.kind.class()
    }
}

/// Read every classifiable object of `layer`
///
/// Objects without a known class are skipped with a warning. An object
/// whose tile coordinate does not fit in a byte is an error.
pub fn collect_descriptors(
    doc: &dyn LevelDocument,
    layer: &ObjectLayer,
) -> Result<Vec<ObjectDescriptor>> {
    let (tile_width, tile_height) = doc.tile_size();
    let mut descriptors = Vec::with_capacity(layer.objects.len());

    for (index, object) in layer.objects.iter().enumerate() {
        let class = match doc.object_class(object) {
            Some(name) => match ObjectClass::from_name(name) {
                Some(class) => class,
                None => {
                    warn!("Object {}: class {:?} has no stack signature, skipped", object.id, name);
                    continue;
                }
            },
            None => {
                warn!("Object {}: no class, skipped", object.id);
                continue;
            }
        };

        let tile = object.position().to_object_tile(tile_width, tile_height);
        let (x, y) = tile.to_bytes().ok_or_else(|| LevelError::InvalidObject {
            id: object.id,
            message: format!("tile ({}, {}) is outside the level", tile.x, tile.y),
        })?;

        debug!("Object {} ({}) at ({}, {}), index {}", object.id, class, x, y, index);
        descriptors.push(ObjectDescriptor {
            id: object.id,
            kind: ObjectKind::from_object(class, object),
            x,
            y,
            index,
        });
    }

    Ok(descriptors)
}
