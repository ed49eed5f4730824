//! Map format registry
//!
//! Each Swadge game reads its own `.bin` layout. [`MapFormat`] names them
//! and dispatches to the matching writer and, where one exists, reader.

pub mod breakout;
pub mod lumber_jacks;
pub mod mega_pulse;
pub mod soko;
pub mod swadge_land;

use std::str::FromStr;

use swlevel_core::{TileId, TILE_SIZE_PX};
use swlevel_protocol::{WarpResolver, DEFAULT_ANCHOR_TILES};

use crate::document::{Document, Layer, LevelDocument, TileLayer, Tileset};
use crate::{LevelError, Result};

/// File extension every format registers under
pub const LEVEL_EXTENSION: &str = "bin";

/// Tunables shared by the format drivers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOptions {
    /// Tiles that keep a warp marker above them inline
    pub anchor_tiles: Vec<TileId>,

    /// Tile edge in pixels for decoded documents
    pub tile_size: u32,

    /// Implied width of Lumber Jacks levels
    pub lumber_jacks_width: u8,

    /// Level timer written when the map has no `time` property
    pub lumber_jacks_time: u8,

    /// Lowest tile id counted as a breakable target block
    pub breakout_target_min: TileId,

    /// Highest tile id counted as a breakable target block
    pub breakout_target_max: TileId,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            anchor_tiles: DEFAULT_ANCHOR_TILES.to_vec(),
            tile_size: TILE_SIZE_PX,
            lumber_jacks_width: 18,
            lumber_jacks_time: 30,
            breakout_target_min: 16,
            breakout_target_max: 127,
        }
    }
}

impl FormatOptions {
    pub fn warp_resolver(&self) -> WarpResolver {
        WarpResolver::new(self.anchor_tiles.clone())
    }

    /// Build the document a reader returns: one `Main` tile layer
    pub(crate) fn decoded_document(&self, layer: TileLayer, tileset: Option<&str>) -> Document {
        let mut doc = Document::new(layer.width, layer.height);
        doc.tile_width = self.tile_size;
        doc.tile_height = self.tile_size;
        doc.tileset = tileset.map(Tileset::new);
        doc.layers.push(Layer::Tile(layer));
        doc
    }
}

/// A registered level format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapFormat {
    SwadgeLand,
    Breakout,
    LumberJacks,
    MegaPulseEx,
    Soko,
}

impl MapFormat {
    pub const ALL: [MapFormat; 5] = [
        Self::SwadgeLand,
        Self::Breakout,
        Self::LumberJacks,
        Self::MegaPulseEx,
        Self::Soko,
    ];

    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::SwadgeLand => "Swadge Land",
            Self::Breakout => "Breakout",
            Self::LumberJacks => "Lumber Jacks",
            Self::MegaPulseEx => "Mega Pulse EX",
            Self::Soko => "Soko",
        }
    }

    /// Short name used on the command line and in config files
    pub fn key(&self) -> &'static str {
        match self {
            Self::SwadgeLand => "swadge-land",
            Self::Breakout => "breakout",
            Self::LumberJacks => "lumber-jacks",
            Self::MegaPulseEx => "mega-pulse-ex",
            Self::Soko => "soko",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::SwadgeLand => "Super Swadge Land map format",
            Self::Breakout => "Breakout map format",
            Self::LumberJacks => "Lumber Jacks map format",
            Self::MegaPulseEx => "Mega Pulse EX map format",
            Self::Soko => "Swadge Sokobon level format",
        }
    }

    pub fn extension(&self) -> &'static str {
        LEVEL_EXTENSION
    }

    /// Tileset a decoded level refers to
    pub fn tileset(&self) -> Option<&'static str> {
        match self {
            Self::SwadgeLand => Some("swadge-land-tileset.tsx"),
            Self::Breakout => Some("breakout-tileset.tsx"),
            Self::LumberJacks => Some("lumberjacks.tsx"),
            Self::MegaPulseEx | Self::Soko => None,
        }
    }

    /// Look up by key or display name, ignoring case, spaces and dashes
    pub fn from_name(name: &str) -> Option<Self> {
        let wanted = normalize(name);
        Self::ALL.into_iter().find(|format| {
            normalize(format.key()) == wanted
                || normalize(format.name()) == wanted
                || (*format == Self::Soko && wanted == "sokomap")
        })
    }

    pub fn can_read(&self) -> bool {
        matches!(self, Self::SwadgeLand | Self::Breakout | Self::LumberJacks)
    }

    /// Encode a document
    pub fn write(&self, doc: &dyn LevelDocument, options: &FormatOptions) -> Result<Vec<u8>> {
        match self {
            Self::SwadgeLand => swadge_land::write(doc, options),
            Self::Breakout => breakout::write(doc, options),
            Self::LumberJacks => lumber_jacks::write(doc, options),
            Self::MegaPulseEx => mega_pulse::write(doc, options),
            Self::Soko => soko::write(doc, options),
        }
    }

    /// Decode a level file
    pub fn read(&self, bytes: &[u8], options: &FormatOptions) -> Result<Document> {
        match self {
            Self::SwadgeLand => swadge_land::read(bytes, options),
            Self::Breakout => breakout::read(bytes, options),
            Self::LumberJacks => lumber_jacks::read(bytes, options),
            Self::MegaPulseEx | Self::Soko => Err(LevelError::Unsupported(format!(
                "{} files cannot be read back",
                self.name()
            ))),
        }
    }
}

impl std::fmt::Display for MapFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MapFormat {
    type Err = LevelError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s).ok_or_else(|| LevelError::UnknownFormat(s.to_string()))
    }
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// First tile layer, or an error naming the format
pub(crate) fn required_tile_layer<'a>(
    doc: &'a dyn LevelDocument,
    format: MapFormat,
) -> Result<&'a TileLayer> {
    doc.first_tile_layer()
        .ok_or_else(|| LevelError::MissingLayer(format!("{} needs a tile layer", format)))
}

/// Numeric map property as a wrapped byte, 0 when unset
pub(crate) fn map_byte(doc: &dyn LevelDocument, name: &str) -> u8 {
    doc.number_property(name)
        .map(|value| value.floor() as i64 as u8)
        .unwrap_or(0)
}
