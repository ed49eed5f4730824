//! Swadge Sokobon
//!
//! ```text
//! +-------+--------+----------------------------------------------------+
//! | w (1) | h (1)  | tiles (id + 1), each optionally followed by frames |
//! +-------+--------+----------------------------------------------------+
//!
//! frame: | 201 | signature | payload ... | 230 |
//! ```
//!
//! Objects are read from the first object layer, their references
//! resolved through an [`ObjectGraph`], and each frame is spliced in right
//! after the tile the object stands on.

use swlevel_protocol::{Insertion, StackFrame, StackedObjectInjector, TileGridCodec};
use tracing::{debug, info};

use super::{required_tile_layer, FormatOptions, MapFormat};
use crate::document::LevelDocument;
use crate::graph::ObjectGraph;
use crate::objects::collect_descriptors;
use crate::tiles::extract_grid;
use crate::{LevelError, Result};

const CODEC: TileGridCodec = TileGridCodec::explicit().with_id_offset(1);

pub fn write(doc: &dyn LevelDocument, _options: &FormatOptions) -> Result<Vec<u8>> {
    let layer = required_tile_layer(doc, MapFormat::Soko)?;
    let grid = extract_grid(layer, &CODEC)?;
    let stream = CODEC.encode(&grid)?.to_vec();

    // references resolve against every object, frames only for classified ones
    let (descriptors, graph) = match doc.first_object_layer() {
        Some(objects) => (
            collect_descriptors(doc, objects)?,
            ObjectGraph::from_layer(doc, objects),
        ),
        None => {
            debug!("No object layer, writing tiles only");
            (Vec::new(), ObjectGraph::default())
        }
    };

    let width = grid.width() as usize;
    let mut insertions = Vec::with_capacity(descriptors.len());
    for descriptor in &descriptors {
        if !grid.contains(descriptor.x as usize, descriptor.y as usize) {
            return Err(LevelError::InvalidObject {
                id: descriptor.id,
                message: format!(
                    "tile ({}, {}) is outside the {}x{} level",
                    descriptor.x,
                    descriptor.y,
                    grid.width(),
                    grid.height()
                ),
            });
        }
        insertions.push(Insertion {
            pos: descriptor.x as usize + descriptor.y as usize * width,
            order: descriptor.index,
            frame: StackFrame::new(descriptor.class(), graph.encode_payload(descriptor)),
        });
    }

    let bytes = StackedObjectInjector::default().inject(stream, insertions)?;
    info!(
        "Wrote Soko level {}x{} with {} objects ({} bytes)",
        grid.width(),
        grid.height(),
        descriptors.len(),
        bytes.len()
    );
    Ok(bytes)
}
