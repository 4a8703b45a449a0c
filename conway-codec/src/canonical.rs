use crate::options::{CodecOptions, EncodingMode};
use crate::value::Cbor;
use crate::Error;

/// Re-encodes an arbitrary cbor item in RFC 8949 core deterministic form
///
/// Only the depth limit and the bignum policy of `options` are honored, the
/// output is always canonical.
pub fn canonical_bytes(bytes: &[u8], options: &CodecOptions) -> Result<Vec<u8>, Error> {
    let received = CodecOptions {
        mode: EncodingMode::AsReceived,
        ..options.clone()
    };

    let value = Cbor::from_bytes_with(bytes, &received)?;

    tracing::debug!(len = bytes.len(), "re-encoding cbor in canonical form");

    value.to_bytes_with(&CodecOptions {
        mode: EncodingMode::Canonical,
        ..options.clone()
    })
}

/// Tells if the bytes are already a canonical encoding of themselves
pub fn is_canonical(bytes: &[u8], options: &CodecOptions) -> Result<bool, Error> {
    Ok(canonical_bytes(bytes, options)? == bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_is_idempotent() {
        // {_ 10: 1, 1: "\0"}
        let bytes = hex::decode("bf0a01016100ff").unwrap();
        let options = CodecOptions::default();

        let once = canonical_bytes(&bytes, &options).unwrap();
        let twice = canonical_bytes(&once, &options).unwrap();

        assert_eq!(hex::encode(&once), "a20161000a01");
        assert_eq!(once, twice);
        assert!(is_canonical(&once, &options).unwrap());
        assert!(!is_canonical(&bytes, &options).unwrap());
    }
}
