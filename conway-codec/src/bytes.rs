//! Byte / hex primitives shared by every fixed and bounded length type
//!
//! Hex is always lowercase without prefix or separators, so two equal byte
//! arrays always render to the same string.

use crate::Error;

pub fn encode_hex(bytes: impl AsRef<[u8]>) -> String {
    hex::encode(bytes)
}

pub fn decode_hex(value: &str) -> Result<Vec<u8>, Error> {
    Ok(hex::decode(value)?)
}

/// Copies a slice into an array, failing unless it is exactly `N` bytes long
pub fn copy_fixed<const N: usize>(bytes: &[u8]) -> Result<[u8; N], Error> {
    <[u8; N]>::try_from(bytes).map_err(|_| Error::InvalidLength {
        expected: N,
        actual: bytes.len(),
    })
}

pub fn decode_hex_fixed<const N: usize>(value: &str) -> Result<[u8; N], Error> {
    let bytes = decode_hex(value)?;
    copy_fixed(&bytes)
}

pub fn check_bounded(bytes: &[u8], max: usize) -> Result<(), Error> {
    if bytes.len() > max {
        return Err(Error::TooLong {
            max,
            actual: bytes.len(),
        });
    }

    Ok(())
}

pub fn decode_hex_bounded(value: &str, max: usize) -> Result<Vec<u8>, Error> {
    let bytes = decode_hex(value)?;
    check_bounded(&bytes, max)?;
    Ok(bytes)
}
