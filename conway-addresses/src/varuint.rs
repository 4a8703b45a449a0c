//! Decode / encode variable-length uints

use std::io::{Cursor, Read};

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("variable-length uint overflow")]
    VarUintOverflow,

    #[error("unexpected end-of-buffer")]
    UnexpectedEof,

    #[error("variable-length uint has a redundant leading zero group")]
    NonMinimal,
}

/// Reads one big-endian base-128 number, the high bit of each byte flags a
/// continuation. Only the shortest form is accepted, so that decoding and
/// re-encoding gives back the same bytes.
pub fn read(cursor: &mut Cursor<&[u8]>) -> Result<u64, Error> {
    let mut output = 0u128;
    let mut buf = [0u8; 1];
    let mut first = true;

    loop {
        cursor
            .read_exact(&mut buf)
            .map_err(|_| Error::UnexpectedEof)?;

        let byte = buf[0];

        if first && byte == 0x80 {
            return Err(Error::NonMinimal);
        }
        first = false;

        output = (output << 7) | (byte & 0x7F) as u128;

        if output > u64::MAX.into() {
            return Err(Error::VarUintOverflow);
        }

        if (byte & 0x80) == 0 {
            return Ok(output as u64);
        }
    }
}

pub fn write(out: &mut Vec<u8>, mut num: u64) {
    let mut chunk = vec![num as u8 & 0x7F];
    num /= 128;

    while num > 0 {
        chunk.push((num & 0x7F) as u8 | 0x80);
        num /= 128;
    }

    chunk.reverse();
    out.extend(chunk);
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(0, &[0x00])]
    #[test_case(127, &[0x7f])]
    #[test_case(128, &[0x81, 0x00])]
    #[test_case(2498243, &[0x81, 0x98, 0xbd, 0x43])]
    fn known_encodings(value: u64, expected: &[u8]) {
        let mut out = vec![];
        write(&mut out, value);
        assert_eq!(out, expected);

        let mut cursor = Cursor::new(expected);
        assert_eq!(read(&mut cursor), Ok(value));
    }

    #[test]
    fn u64_max_roundtrips() {
        let mut out = vec![];
        write(&mut out, u64::MAX);

        let mut cursor = Cursor::new(out.as_slice());
        assert_eq!(read(&mut cursor), Ok(u64::MAX));
    }

    #[test]
    fn truncated_and_oversized_input() {
        let mut cursor = Cursor::new(&[0x81u8][..]);
        assert_eq!(read(&mut cursor), Err(Error::UnexpectedEof));

        let long = [0xffu8; 10];
        let mut cursor = Cursor::new(&long[..]);
        assert_eq!(read(&mut cursor), Err(Error::VarUintOverflow));
    }

    #[test_case(&[0x80, 0x01])]
    #[test_case(&[0x80, 0x80, 0x00])]
    #[test_case(&[0x80, 0x81, 0x00])]
    fn padded_encodings_are_rejected(bytes: &[u8]) {
        let mut cursor = Cursor::new(bytes);
        assert_eq!(read(&mut cursor), Err(Error::NonMinimal));
    }
}
