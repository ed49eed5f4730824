//! Authoring document model
//!
//! The exporters only ever read a level through the [`LevelDocument`]
//! trait: map size, ordered tile and object layers, a tileset class lookup
//! and map properties. [`Document`] is the in-memory implementation; it
//! (de)serializes as JSON so editor exports can be fed to the CLI.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use swlevel_core::{Flip, ObjectId, PixelPosition, TILE_SIZE_PX};

use crate::Result;

/// A free-form object or map property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Number(f64),
    /// Reference to another object in the same map
    Object { id: u32 },
    String(String),
}

impl PropertyValue {
    /// Truthiness as the editor scripts see it
    pub fn truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::Object { id } => *id != 0,
            Self::String(s) => !s.is_empty(),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Self::String(s) => s.trim().parse().ok(),
            Self::Object { .. } => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Object reference, also accepting a plain numeric id
    pub fn as_object(&self) -> Option<ObjectId> {
        match self {
            Self::Object { id } => Some(ObjectId(*id)),
            Self::Number(n) if *n >= 0.0 && n.fract() == 0.0 && *n <= u32::MAX as f64 => {
                Some(ObjectId(*n as u32))
            }
            Self::String(s) => s.trim().parse().ok().map(ObjectId),
            _ => None,
        }
    }
}

/// Properties keyed by name
pub type Properties = BTreeMap<String, PropertyValue>;

/// A grid of tileset ids (`None` = no tile)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileLayer {
    /// Layer name (e.g., "Main", "tiles")
    pub name: String,

    /// Width in tiles
    pub width: usize,

    /// Height in tiles
    pub height: usize,

    /// Row-major cells
    pub tiles: Vec<Option<u32>>,
}

impl TileLayer {
    /// Create an empty tile layer
    pub fn new(name: impl Into<String>, width: usize, height: usize) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            tiles: vec![None; width * height],
        }
    }

    /// Create a tile layer filled with one tile
    pub fn filled(name: impl Into<String>, width: usize, height: usize, tile: u32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            tiles: vec![Some(tile); width * height],
        }
    }

    /// Tile at (x, y), `None` when empty or outside the layer
    pub fn tile_at(&self, x: usize, y: usize) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.tiles.get(y * self.width + x).copied().flatten()
    }

    /// Set tile at (x, y); writes outside the layer are ignored
    pub fn set_tile(&mut self, x: usize, y: usize, tile: Option<u32>) {
        if x < self.width && y < self.height {
            let index = y * self.width + x;
            if let Some(cell) = self.tiles.get_mut(index) {
                *cell = tile;
            }
        }
    }
}

/// A positioned object placed in the editor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapObject {
    /// Authoring id, unique per map
    pub id: ObjectId,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// Explicit class; falls back to the tileset class of `tile`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,

    /// Tileset id of the object's sprite
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tile: Option<u32>,

    /// X position (pixels)
    pub x: f64,

    /// Y position (pixels, bottom edge of the sprite)
    pub y: f64,

    /// Width (pixels)
    #[serde(default)]
    pub width: f64,

    /// Height (pixels)
    #[serde(default)]
    pub height: f64,

    /// Sprite flip flags
    #[serde(default)]
    pub flip: Flip,

    /// Custom properties
    #[serde(default)]
    pub properties: Properties,
}

impl MapObject {
    /// Create an object of the given class at a pixel position
    pub fn new(id: u32, class: &str, x: f64, y: f64) -> Self {
        Self {
            id: ObjectId(id),
            name: String::new(),
            class: Some(class.to_string()),
            tile: None,
            x,
            y,
            width: TILE_SIZE_PX as f64,
            height: TILE_SIZE_PX as f64,
            flip: Flip::default(),
            properties: Properties::new(),
        }
    }

    /// Add a property
    pub fn with_property(mut self, name: &str, value: PropertyValue) -> Self {
        self.properties.insert(name.to_string(), value);
        self
    }

    pub fn with_flip(mut self, flip: Flip) -> Self {
        self.flip = flip;
        self
    }

    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    /// True when the property exists and is truthy
    pub fn flag(&self, name: &str) -> bool {
        self.property(name).map(PropertyValue::truthy).unwrap_or(false)
    }

    /// Numeric property, if present
    pub fn number(&self, name: &str) -> Option<f64> {
        self.property(name).and_then(PropertyValue::as_number)
    }

    pub fn position(&self) -> PixelPosition {
        PixelPosition::new(self.x, self.y)
    }
}

/// An ordered list of objects
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectLayer {
    pub name: String,
    pub objects: Vec<MapObject>,
}

impl ObjectLayer {
    pub fn new(name: impl Into<String>, objects: Vec<MapObject>) -> Self {
        Self {
            name: name.into(),
            objects,
        }
    }

    /// Array index of the object with the given authoring id
    pub fn index_of(&self, id: ObjectId) -> Option<usize> {
        self.objects.iter().position(|object| object.id == id)
    }
}

/// One document layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Layer {
    Tile(TileLayer),
    Object(ObjectLayer),
}

impl Layer {
    pub fn name(&self) -> &str {
        match self {
            Self::Tile(layer) => &layer.name,
            Self::Object(layer) => &layer.name,
        }
    }
}

/// Tileset reference with the class of each tile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tileset {
    /// Tileset file name (e.g., "swadge-land-tileset.tsx")
    pub name: String,

    /// Semantic class per tile id
    #[serde(default)]
    pub classes: BTreeMap<u32, String>,
}

impl Tileset {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            classes: BTreeMap::new(),
        }
    }
}

/// Read-only view of an authoring document
pub trait LevelDocument {
    /// Map width in tiles
    fn width(&self) -> usize;

    /// Map height in tiles
    fn height(&self) -> usize;

    /// Tile edge in pixels as (width, height)
    fn tile_size(&self) -> (u32, u32);

    /// Layers in document order
    fn layers(&self) -> &[Layer];

    /// Semantic class of a tileset tile
    fn tile_class(&self, tile: u32) -> Option<&str>;

    /// Map-level property
    fn property(&self, name: &str) -> Option<&PropertyValue>;

    /// First tile layer in document order
    fn first_tile_layer(&self) -> Option<&TileLayer> {
        self.layers().iter().find_map(|layer| match layer {
            Layer::Tile(tiles) => Some(tiles),
            Layer::Object(_) => None,
        })
    }

    /// Tile layer with the given name
    fn tile_layer_named(&self, name: &str) -> Option<&TileLayer> {
        self.layers().iter().find_map(|layer| match layer {
            Layer::Tile(tiles) if tiles.name == name => Some(tiles),
            _ => None,
        })
    }

    /// First object layer in document order
    fn first_object_layer(&self) -> Option<&ObjectLayer> {
        self.layers().iter().find_map(|layer| match layer {
            Layer::Object(objects) => Some(objects),
            Layer::Tile(_) => None,
        })
    }

    /// Object layer with the given name
    fn object_layer_named(&self, name: &str) -> Option<&ObjectLayer> {
        self.layers().iter().find_map(|layer| match layer {
            Layer::Object(objects) if objects.name == name => Some(objects),
            _ => None,
        })
    }

    /// Class of an object: explicit class first, then its tile's class
    fn object_class<'a>(&'a self, object: &'a MapObject) -> Option<&'a str> {
        object
            .class
            .as_deref()
            .or_else(|| object.tile.and_then(|tile| self.tile_class(tile)))
    }

    /// Numeric map property
    fn number_property(&self, name: &str) -> Option<f64> {
        self.property(name).and_then(PropertyValue::as_number)
    }
}

fn default_tile_size() -> u32 {
    TILE_SIZE_PX
}

/// In-memory level document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Width in tiles
    pub width: usize,

    /// Height in tiles
    pub height: usize,

    /// Tile width in pixels
    #[serde(default = "default_tile_size")]
    pub tile_width: u32,

    /// Tile height in pixels
    #[serde(default = "default_tile_size")]
    pub tile_height: u32,

    /// Layers in document order
    #[serde(default)]
    pub layers: Vec<Layer>,

    /// Tileset used by tile layers and tile objects
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tileset: Option<Tileset>,

    /// Map properties
    #[serde(default)]
    pub properties: Properties,
}

impl Document {
    /// Create an empty document with 16px tiles
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            tile_width: TILE_SIZE_PX,
            tile_height: TILE_SIZE_PX,
            layers: Vec::new(),
            tileset: None,
            properties: Properties::new(),
        }
    }

    /// Append a layer
    pub fn with_layer(mut self, layer: Layer) -> Self {
        self.layers.push(layer);
        self
    }

    pub fn with_tileset(mut self, tileset: Tileset) -> Self {
        self.tileset = Some(tileset);
        self
    }

    pub fn set_property(&mut self, name: &str, value: PropertyValue) {
        self.properties.insert(name.to_string(), value);
    }

    /// Parse a JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize as pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a JSON document from disk
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    /// Write the document as JSON
    pub fn save_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

impl LevelDocument for Document {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn tile_size(&self) -> (u32, u32) {
        (self.tile_width, self.tile_height)
    }

    fn layers(&self) -> &[Layer] {
        &self.layers
    }

    fn tile_class(&self, tile: u32) -> Option<&str> {
        self.tileset
            .as_ref()
            .and_then(|tileset| tileset.classes.get(&tile))
            .map(String::as_str)
    }

    fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_layer_access() {
        let mut layer = TileLayer::new("Main", 3, 2);
        assert_eq!(layer.tile_at(1, 1), None);

        layer.set_tile(1, 1, Some(40));
        assert_eq!(layer.tile_at(1, 1), Some(40));
        assert_eq!(layer.tile_at(3, 0), None);

        layer.set_tile(9, 9, Some(1)); // ignored
        assert_eq!(layer.tiles.len(), 6);
    }

    #[test]
    fn test_property_conversions() {
        assert!(PropertyValue::Bool(true).truthy());
        assert!(!PropertyValue::Number(0.0).truthy());
        assert_eq!(PropertyValue::Number(4.0).as_object(), Some(ObjectId(4)));
        assert_eq!(PropertyValue::Number(4.5).as_object(), None);
        assert_eq!(PropertyValue::Object { id: 9 }.as_object(), Some(ObjectId(9)));
        assert_eq!(PropertyValue::String("12".into()).as_number(), Some(12.0));
    }

    #[test]
    fn test_layer_lookup() {
        let doc = Document::new(4, 4)
            .with_layer(Layer::Object(ObjectLayer::new("entities", vec![])))
            .with_layer(Layer::Tile(TileLayer::new("background", 4, 4)))
            .with_layer(Layer::Tile(TileLayer::new("tiles", 4, 4)));

        assert_eq!(doc.first_tile_layer().map(|l| l.name.as_str()), Some("background"));
        assert_eq!(doc.tile_layer_named("tiles").map(|l| l.name.as_str()), Some("tiles"));
        assert!(doc.tile_layer_named("entities").is_none());
        assert_eq!(doc.first_object_layer().map(|l| l.name.as_str()), Some("entities"));
    }

    #[test]
    fn test_object_class_falls_back_to_tileset() {
        let mut tileset = Tileset::new("soko.tsx");
        tileset.classes.insert(3, "crate".to_string());
        let doc = Document::new(1, 1).with_tileset(tileset);

        let mut object = MapObject::new(1, "player", 0.0, 16.0);
        assert_eq!(doc.object_class(&object), Some("player"));

        object.class = None;
        object.tile = Some(3);
        assert_eq!(doc.object_class(&object), Some("crate"));

        object.tile = Some(4);
        assert_eq!(doc.object_class(&object), None);
    }

    #[test]
    fn test_json_round_trip() {
        let mut doc = Document::new(2, 1).with_layer(Layer::Tile(TileLayer::filled("Main", 2, 1, 5)));
        doc.set_property("time", PropertyValue::Number(30.0));
        doc.layers.push(Layer::Object(ObjectLayer::new(
            "entities",
            vec![MapObject::new(7, "button", 16.0, 16.0)
                .with_property("target1id", PropertyValue::Object { id: 3 })],
        )));

        let json = doc.to_json().unwrap();
        let parsed = Document::from_json(&json).unwrap();
        assert_eq!(parsed, doc);
    }

    #[test]
    fn test_json_defaults() {
        let json = r#"{
            "width": 2,
            "height": 2,
            "layers": [
                {"type": "tile", "name": "Main", "width": 2, "height": 2, "tiles": [1, null, 3, 4]}
            ]
        }"#;
        let doc = Document::from_json(json).unwrap();
        assert_eq!(doc.tile_size(), (16, 16));
        assert_eq!(doc.first_tile_layer().unwrap().tile_at(1, 0), None);
        assert_eq!(doc.first_tile_layer().unwrap().tile_at(0, 1), Some(3));
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("level.json");
        let doc = Document::new(1, 1).with_layer(Layer::Tile(TileLayer::filled("Main", 1, 1, 2)));

        doc.save_file(&path).unwrap();
        assert_eq!(Document::load_file(&path).unwrap(), doc);
    }
}
