//! Breakout
//!
//! ```text
//! +-------+--------+-------------------------+---------------------+
//! | w (1) | h (1)  | tiles (w * h, raw ids)  | target count (u16)  |
//! +-------+--------+-------------------------+---------------------+
//! ```
//!
//! The trailer counts breakable blocks so the game knows when a level is
//! cleared.

use swlevel_protocol::{read_u16_le, write_u16_le, TileGridCodec, TileMap};
use tracing::{info, warn};

use super::{required_tile_layer, FormatOptions, MapFormat};
use crate::document::{Document, LevelDocument};
use crate::tiles::{extract_grid, grid_to_layer};
use crate::Result;

const CODEC: TileGridCodec = TileGridCodec::explicit();

/// Number of tiles counting as target blocks
pub fn count_targets(grid: &TileMap, options: &FormatOptions) -> u16 {
    let range = options.breakout_target_min..=options.breakout_target_max;
    let count = grid.tiles().iter().filter(|tile| range.contains(tile)).count();
    u16::try_from(count).unwrap_or(u16::MAX)
}

pub fn write(doc: &dyn LevelDocument, options: &FormatOptions) -> Result<Vec<u8>> {
    let layer = required_tile_layer(doc, MapFormat::Breakout)?;
    let grid = extract_grid(layer, &CODEC)?;
    let targets = count_targets(&grid, options);

    let mut buf = CODEC.encode(&grid)?;
    write_u16_le(&mut buf, targets);

    info!(
        "Wrote Breakout level {}x{} with {} target blocks",
        grid.width(),
        grid.height(),
        targets
    );
    Ok(buf.to_vec())
}

/// Decode a level; a missing or stale target count only warns
pub fn read(bytes: &[u8], options: &FormatOptions) -> Result<Document> {
    let (rest, grid) = CODEC.decode(bytes)?;
    let expected = count_targets(&grid, options);

    match read_u16_le(rest, "target count") {
        Ok((_, stored)) if stored != expected => {
            warn!("Stored target count {} does not match level ({})", stored, expected)
        }
        Ok(_) => {}
        Err(_) => warn!("Level has no target count"),
    }

    info!("Read Breakout level {}x{}", grid.width(), grid.height());
    let layer = grid_to_layer(&grid, &CODEC, "Main");
    Ok(options.decoded_document(layer, MapFormat::Breakout.tileset()))
}
