//! Byte primitives shared by every level format
//!
//! All multi-byte values are little-endian. Readers are thin wrappers over
//! `nom` complete parsers that turn a short buffer into
//! [`WireError::Truncated`] instead of a parser error.

use bytes::{BufMut, BytesMut};
use nom::bytes::complete::take;
use nom::number::complete::{le_u16, u8 as byte};
use nom::IResult;

use crate::error::{Result, WireError};

/// Types with a fixed binary layout
pub trait WireSerializable: Sized {
    /// Append the binary form to `buf`
    fn write_wire(&self, buf: &mut BytesMut);

    /// Parse one value from the front of `input`, returning the rest
    fn read_wire(input: &[u8]) -> Result<(&[u8], Self)>;
}

/// Write a single byte
#[inline]
pub fn write_u8(buf: &mut BytesMut, val: u8) {
    buf.put_u8(val);
}

/// Write a little-endian u16
#[inline]
pub fn write_u16_le(buf: &mut BytesMut, val: u16) {
    buf.put_u16_le(val);
}

/// Read a single byte
#[inline]
pub fn read_u8<'a>(input: &'a [u8], what: &'static str) -> Result<(&'a [u8], u8)> {
    let parsed: IResult<&[u8], u8> = byte(input);
    parsed.map_err(|_| WireError::Truncated {
        what,
        expected: 1,
        actual: input.len(),
    })
}

/// Read a little-endian u16
#[inline]
pub fn read_u16_le<'a>(input: &'a [u8], what: &'static str) -> Result<(&'a [u8], u16)> {
    let parsed: IResult<&[u8], u16> = le_u16(input);
    parsed.map_err(|_| WireError::Truncated {
        what,
        expected: 2,
        actual: input.len(),
    })
}

/// Split off exactly `count` bytes
#[inline]
pub fn take_bytes<'a>(
    input: &'a [u8],
    count: usize,
    what: &'static str,
) -> Result<(&'a [u8], &'a [u8])> {
    let parsed: IResult<&[u8], &[u8]> = take(count)(input);
    parsed.map_err(|_| WireError::Truncated {
        what,
        expected: count,
        actual: input.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u16_little_endian() {
        let mut buf = BytesMut::new();
        write_u16_le(&mut buf, 0x1234);
        assert_eq!(&buf[..], &[0x34, 0x12]);

        let (rest, val) = read_u16_le(&buf, "value").unwrap();
        assert_eq!(val, 0x1234);
        assert!(rest.is_empty());
    }

    #[test]
    fn test_read_u8_empty() {
        let err = read_u8(&[], "header").unwrap_err();
        assert!(matches!(
            err,
            WireError::Truncated { what: "header", expected: 1, actual: 0 }
        ));
    }

    #[test]
    fn test_take_bytes_short() {
        let data = [1u8, 2, 3];
        let (rest, head) = take_bytes(&data, 2, "body").unwrap();
        assert_eq!(head, &[1, 2]);
        assert_eq!(rest, &[3]);

        let err = take_bytes(&data, 4, "body").unwrap_err();
        assert!(matches!(err, WireError::Truncated { expected: 4, actual: 3, .. }));
    }
}
