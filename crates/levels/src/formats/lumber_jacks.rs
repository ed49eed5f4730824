//! Lumber Jacks
//!
//! ```text
//! +-------+-------------+-----------+---+----------+---------------------+
//! | h (1) | enemies (8) | ghost (1) | 0 | time (1) | tiles (18 * h)      |
//! +-------+-------------+-----------+---+----------+---------------------+
//! | spawn x (1) | spawn y (u16) | switches (5)                           |
//! +-------------+---------------+----------------------------------------+
//! ```
//!
//! Width is implied. Tiles are stored as `id + 1` with 0 for empty cells,
//! and the level parameters come from map properties.

use bytes::BytesMut;
use swlevel_protocol::{read_u16_le, read_u8, take_bytes, write_u16_le, write_u8, TileGridCodec};
use tracing::{debug, info};

use super::{map_byte, required_tile_layer, FormatOptions, MapFormat};
use crate::document::{Document, LevelDocument, PropertyValue};
use crate::tiles::{extract_grid, grid_to_layer};
use crate::Result;

/// Enemy slots in the header
pub const ENEMY_SLOTS: usize = 8;

/// Header bytes after the height
pub const PARAMS_LEN: usize = ENEMY_SLOTS + 3;

/// Trailer bytes after the body
pub const TRAILER_LEN: usize = 8;

pub const GHOST_SPAWN_PROPERTY: &str = "ghost spawn time";
pub const TIME_PROPERTY: &str = "time";
pub const SPAWN_X_PROPERTY: &str = "spawnx";
pub const SPAWN_Y_PROPERTY: &str = "spawny";
pub const SWITCHES_PROPERTY: &str = "switches";

/// Spawn x wraps at the screen width in pixels
const SPAWN_X_WRAP: i64 = 240;

/// Switch block written after the spawn point
const SWITCH_BLOCK: [u8; 5] = [2, 8, 9, 8, 4];

fn codec(options: &FormatOptions) -> TileGridCodec {
    TileGridCodec::fixed_width(options.lumber_jacks_width).with_id_offset(1)
}

fn enemy_property(slot: usize) -> String {
    format!("enemy{}", slot + 1)
}

pub fn write(doc: &dyn LevelDocument, options: &FormatOptions) -> Result<Vec<u8>> {
    let layer = required_tile_layer(doc, MapFormat::LumberJacks)?;
    let codec = codec(options);
    let grid = extract_grid(layer, &codec)?;
    codec.validate(&grid)?;

    let mut buf = BytesMut::with_capacity(1 + PARAMS_LEN + grid.len() + TRAILER_LEN);
    codec.encode_header(&grid, &mut buf)?;

    for slot in 0..ENEMY_SLOTS {
        write_u8(&mut buf, map_byte(doc, &enemy_property(slot)));
    }
    write_u8(&mut buf, map_byte(doc, GHOST_SPAWN_PROPERTY));
    write_u8(&mut buf, 0);
    let time = doc
        .number_property(TIME_PROPERTY)
        .map(|_| map_byte(doc, TIME_PROPERTY))
        .unwrap_or(options.lumber_jacks_time);
    write_u8(&mut buf, time);

    codec.encode_body(&grid, &mut buf);

    let spawn_x = doc.number_property(SPAWN_X_PROPERTY).unwrap_or(0.0).floor() as i64;
    let spawn_y = doc.number_property(SPAWN_Y_PROPERTY).unwrap_or(0.0).floor() as i64;
    write_u8(&mut buf, (spawn_x % SPAWN_X_WRAP) as u8);
    write_u16_le(&mut buf, spawn_y as u16);
    buf.extend_from_slice(&SWITCH_BLOCK);

    info!(
        "Wrote Lumber Jacks level of {} rows ({} bytes)",
        grid.height(),
        buf.len()
    );
    Ok(buf.to_vec())
}

pub fn read(bytes: &[u8], options: &FormatOptions) -> Result<Document> {
    let codec = codec(options);
    let (input, (width, height)) = codec.decode_header(bytes)?;
    let (input, params) = take_bytes(input, PARAMS_LEN, "level parameters")?;
    let (input, grid) = codec.decode_body(input, width, height)?;
    let (input, spawn_x) = read_u8(input, "spawn x")?;
    let (input, spawn_y) = read_u16_le(input, "spawn y")?;
    let (input, switches) = read_u8(input, "switch count")?;
    debug!("{} bytes after the switch count", input.len());

    let layer = grid_to_layer(&grid, &codec, "Main");
    let mut doc = options.decoded_document(layer, MapFormat::LumberJacks.tileset());
    let number = |value: u8| PropertyValue::Number(value as f64);

    for slot in 0..ENEMY_SLOTS {
        doc.set_property(&enemy_property(slot), number(params[slot]));
    }
    doc.set_property(GHOST_SPAWN_PROPERTY, number(params[ENEMY_SLOTS]));
    doc.set_property(TIME_PROPERTY, number(params[ENEMY_SLOTS + 2]));
    doc.set_property(SPAWN_X_PROPERTY, number(spawn_x));
    doc.set_property(SPAWN_Y_PROPERTY, PropertyValue::Number(spawn_y as f64));
    doc.set_property(SWITCHES_PROPERTY, number(switches));

    info!("Read Lumber Jacks level of {} rows", height);
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Layer, TileLayer};
    use crate::LevelError;
    use swlevel_protocol::WireError;

    fn level(width: usize) -> Document {
        let mut layer = TileLayer::new("Main", width, 2);
        layer.set_tile(0, 0, Some(0));
        layer.set_tile(1, 0, Some(4));
        layer.set_tile(width - 1, 1, Some(254));

        let mut doc = Document::new(width, 2).with_layer(Layer::Tile(layer));
        doc.set_property("enemy1", PropertyValue::Number(3.0));
        doc.set_property("enemy8", PropertyValue::Number(9.0));
        doc.set_property(GHOST_SPAWN_PROPERTY, PropertyValue::Number(12.0));
        doc.set_property(SPAWN_X_PROPERTY, PropertyValue::Number(250.0));
        doc.set_property(SPAWN_Y_PROPERTY, PropertyValue::Number(300.0));
        doc
    }

    #[test]
    fn test_write_layout() {
        let bytes = write(&level(18), &FormatOptions::default()).unwrap();
        assert_eq!(bytes.len(), 20 + 18 * 2);

        assert_eq!(bytes[0], 2);
        assert_eq!(&bytes[1..9], &[3, 0, 0, 0, 0, 0, 0, 9]);
        assert_eq!(&bytes[9..12], &[12, 0, 30]);

        let body = &bytes[12..12 + 36];
        assert_eq!(&body[..3], &[1, 5, 0]);
        assert_eq!(body[35], 255);

        let trailer = &bytes[48..];
        assert_eq!(trailer, &[10, 44, 1, 2, 8, 9, 8, 4]);
    }

    #[test]
    fn test_time_property_overrides_default() {
        let mut doc = level(18);
        doc.set_property(TIME_PROPERTY, PropertyValue::Number(45.0));
        let bytes = write(&doc, &FormatOptions::default()).unwrap();
        assert_eq!(bytes[11], 45);
    }

    #[test]
    fn test_wrong_width_rejected() {
        let err = write(&level(17), &FormatOptions::default()).unwrap_err();
        assert!(matches!(err, LevelError::Wire(WireError::ShapeMismatch(_))));
    }

    #[test]
    fn test_round_trip() {
        let options = FormatOptions::default();
        let doc = level(18);
        let back = read(&write(&doc, &options).unwrap(), &options).unwrap();

        assert_eq!(back.first_tile_layer(), doc.first_tile_layer());
        assert_eq!(back.number_property("enemy1"), Some(3.0));
        assert_eq!(back.number_property("enemy8"), Some(9.0));
        assert_eq!(back.number_property(GHOST_SPAWN_PROPERTY), Some(12.0));
        assert_eq!(back.number_property(TIME_PROPERTY), Some(30.0));
        assert_eq!(back.number_property(SPAWN_X_PROPERTY), Some(10.0));
        assert_eq!(back.number_property(SPAWN_Y_PROPERTY), Some(300.0));
        assert_eq!(back.number_property(SWITCHES_PROPERTY), Some(2.0));
        assert_eq!(back.tileset.as_ref().unwrap().name, "lumberjacks.tsx");
    }

    #[test]
    fn test_read_truncated_trailer() {
        let options = FormatOptions::default();
        let bytes = write(&level(18), &options).unwrap();
        let err = read(&bytes[..bytes.len() - 6], &options).unwrap_err();
        assert!(matches!(err, LevelError::Wire(WireError::Truncated { .. })));
    }
}
