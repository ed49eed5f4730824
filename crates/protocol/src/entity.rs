//! Fixed-size entity records
//!
//! # Layout
//! ```text
//! [count lo][count hi]                      object count, u16 LE
//! per entity (16 bytes):
//!   [type]
//!   [tile x][tile y]                        pixel >> 4
//!   [sub x][sub y]                          pixel % 16
//!   [flip]                                  bit1 vertical, bit0 horizontal
//!   [special0] ... [special7]
//!   [link lo][link hi]                      index into this layer, 0xFFFF = none
//! ```

use bytes::BytesMut;
use swlevel_core::{fixed_point_split, Flip};

use crate::codecs::{read_u16_le, read_u8, take_bytes, write_u16_le, write_u8, WireSerializable};
use crate::error::{Result, WireError};

/// Encoded size of one record
pub const ENTITY_RECORD_LEN: usize = 16;

/// Number of parameter bytes per record
pub const ENTITY_PARAM_COUNT: usize = 8;

/// Link value for an entity that spawns nothing
pub const LINK_NONE: u16 = 0xFFFF;

/// One serialized entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityRecord {
    pub kind: u8,
    pub tile_x: u8,
    pub tile_y: u8,
    pub sub_x: u8,
    pub sub_y: u8,
    pub flip: Flip,
    pub params: [u8; ENTITY_PARAM_COUNT],
    pub link: u16,
}

impl EntityRecord {
    /// Build a record from whole-pixel coordinates
    pub fn at_pixel(kind: u8, pixel_x: i64, pixel_y: i64) -> Self {
        let (tile_x, sub_x) = fixed_point_split(pixel_x);
        let (tile_y, sub_y) = fixed_point_split(pixel_y);
        Self {
            kind,
            tile_x,
            tile_y,
            sub_x,
            sub_y,
            flip: Flip::default(),
            params: [0; ENTITY_PARAM_COUNT],
            link: LINK_NONE,
        }
    }

    pub fn with_flip(mut self, flip: Flip) -> Self {
        self.flip = flip;
        self
    }

    pub fn with_params(mut self, params: [u8; ENTITY_PARAM_COUNT]) -> Self {
        self.params = params;
        self
    }

    pub fn with_link(mut self, link: Option<u16>) -> Self {
        self.link = link.unwrap_or(LINK_NONE);
        self
    }

    /// Linked entity index, if any
    pub fn linked(&self) -> Option<u16> {
        (self.link != LINK_NONE).then_some(self.link)
    }

    /// Pixel position the record encodes
    pub fn pixel_position(&self) -> (u32, u32) {
        (
            ((self.tile_x as u32) << 4) + self.sub_x as u32,
            ((self.tile_y as u32) << 4) + self.sub_y as u32,
        )
    }
}

impl WireSerializable for EntityRecord {
    fn write_wire(&self, buf: &mut BytesMut) {
        write_u8(buf, self.kind);
        write_u8(buf, self.tile_x);
        write_u8(buf, self.tile_y);
        write_u8(buf, self.sub_x);
        write_u8(buf, self.sub_y);
        write_u8(buf, self.flip.bits());
        buf.extend_from_slice(&self.params);
        write_u16_le(buf, self.link);
    }

    fn read_wire(input: &[u8]) -> Result<(&[u8], Self)> {
        // check the whole record up front so the error reports its size
        take_bytes(input, ENTITY_RECORD_LEN, "entity record")?;

        let (input, kind) = read_u8(input, "entity type")?;
        let (input, tile_x) = read_u8(input, "entity tile x")?;
        let (input, tile_y) = read_u8(input, "entity tile y")?;
        let (input, sub_x) = read_u8(input, "entity sub x")?;
        let (input, sub_y) = read_u8(input, "entity sub y")?;
        let (input, flip) = read_u8(input, "entity flip")?;
        let (input, raw_params) = take_bytes(input, ENTITY_PARAM_COUNT, "entity params")?;
        let (input, link) = read_u16_le(input, "entity link")?;

        let mut params = [0u8; ENTITY_PARAM_COUNT];
        params.copy_from_slice(raw_params);

        Ok((
            input,
            Self {
                kind,
                tile_x,
                tile_y,
                sub_x,
                sub_y,
                flip: Flip::from_bits(flip),
                params,
                link,
            },
        ))
    }
}

/// A counted list of entity records, at most `u16::MAX` long
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityLayer {
    records: Vec<EntityRecord>,
}

impl EntityLayer {
    pub fn new(records: Vec<EntityRecord>) -> Result<Self> {
        if records.len() > u16::MAX as usize {
            return Err(WireError::TooManyRecords {
                count: records.len(),
                max: u16::MAX as usize,
            });
        }
        Ok(Self { records })
    }

    pub fn records(&self) -> &[EntityRecord] {
        &self.records
    }

    /// Encoded size including the count
    pub fn wire_len(&self) -> usize {
        2 + self.records.len() * ENTITY_RECORD_LEN
    }
}

impl WireSerializable for EntityLayer {
    fn write_wire(&self, buf: &mut BytesMut) {
        // length is capped by `new`
        write_u16_le(buf, self.records.len() as u16);
        for record in &self.records {
            record.write_wire(buf);
        }
    }

    fn read_wire(input: &[u8]) -> Result<(&[u8], Self)> {
        let (mut input, count) = read_u16_le(input, "entity count")?;
        let mut records = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let (rest, record) = EntityRecord::read_wire(input)?;
            records.push(record);
            input = rest;
        }
        Ok((input, Self { records }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_layout() {
        let record = EntityRecord::at_pixel(7, 37, 70)
            .with_flip(Flip::new(true, true))
            .with_params([1, 2, 3, 4, 5, 6, 7, 8])
            .with_link(Some(0x0102));

        let mut buf = BytesMut::new();
        record.write_wire(&mut buf);
        assert_eq!(
            &buf[..],
            &[7, 2, 4, 5, 6, 3, 1, 2, 3, 4, 5, 6, 7, 8, 0x02, 0x01]
        );
        assert_eq!(record.pixel_position(), (37, 70));
    }

    #[test]
    fn test_unlinked_sentinel() {
        let record = EntityRecord::at_pixel(1, 0, 0);
        let mut buf = BytesMut::new();
        record.write_wire(&mut buf);
        assert_eq!(buf.len(), ENTITY_RECORD_LEN);
        assert_eq!(&buf[14..16], &[0xFF, 0xFF]);
        assert_eq!(record.linked(), None);
    }

    #[test]
    fn test_layer_read_back() {
        let layer = EntityLayer::new(vec![
            EntityRecord::at_pixel(1, 16, 32),
            EntityRecord::at_pixel(2, 48, 64).with_link(Some(0)),
        ])
        .unwrap();
        let mut buf = BytesMut::new();
        layer.write_wire(&mut buf);
        assert_eq!(buf.len(), layer.wire_len());
        assert_eq!(&buf[0..2], &[2, 0]);

        let (rest, decoded) = EntityLayer::read_wire(&buf).unwrap();
        assert!(rest.is_empty());
        assert_eq!(decoded, layer);
    }

    #[test]
    fn test_layer_count_limit() {
        let record = EntityRecord::at_pixel(1, 0, 0);
        let full = EntityLayer::new(vec![record; u16::MAX as usize]).unwrap();
        let mut buf = BytesMut::new();
        full.write_wire(&mut buf);
        assert_eq!(&buf[0..2], &[0xFF, 0xFF]);
        assert_eq!(buf.len(), full.wire_len());

        let err = EntityLayer::new(vec![record; u16::MAX as usize + 1]).unwrap_err();
        assert!(matches!(err, WireError::TooManyRecords { count: 65536, max: 65535 }));
    }

    #[test]
    fn test_truncated_record() {
        let err = EntityLayer::read_wire(&[1, 0, 5, 5, 5]).unwrap_err();
        assert!(matches!(
            err,
            WireError::Truncated { what: "entity record", expected: 16, actual: 3 }
        ));
    }
}
