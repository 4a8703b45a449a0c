//! Arbitrary precision integers on the wire
//!
//! ```cddl
//! big_int = int / big_uint / big_nint
//! big_uint = #6.2(bounded_bytes)
//! big_nint = #6.3(bounded_bytes)
//! ```
//!
//! A `big_nint` payload `n` stands for the value `-(n + 1)` (RFC 8949 §3.4.3).

use minicbor::data::{Int, Tag, Type};
use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{ToPrimitive, Zero};

pub const POS_BIGNUM_TAG: u64 = 2;
pub const NEG_BIGNUM_TAG: u64 = 3;

/// Plutus (and the ledger) cap byte string chunks at this size
pub const BOUNDED_BYTES_CHUNK: usize = 64;

/// Returns the machine integer for values that fit a cbor major type 0 / 1
/// argument, ie: the range `[-2^64, 2^64 - 1]`
pub fn as_cbor_int(value: &BigInt) -> Option<Int> {
    value.to_i128().and_then(|x| Int::try_from(x).ok())
}

/// Splits an integer into its bignum tag and minimal big-endian magnitude
pub fn bignum_bytes(value: &BigInt) -> (u64, Vec<u8>) {
    let (tag, magnitude) = match value.sign() {
        Sign::Minus => {
            let magnitude: BigInt = -value - 1;
            (NEG_BIGNUM_TAG, magnitude)
        }
        _ => (POS_BIGNUM_TAG, value.clone()),
    };

    let bytes = match magnitude.to_biguint() {
        Some(x) if !x.is_zero() => x.to_bytes_be(),
        _ => vec![],
    };

    (tag, bytes)
}

/// Inverse of [`bignum_bytes`]
pub fn from_bignum_bytes(tag: u64, bytes: &[u8]) -> Option<BigInt> {
    let magnitude = BigInt::from(BigUint::from_bytes_be(bytes));

    match tag {
        POS_BIGNUM_TAG => Some(magnitude),
        NEG_BIGNUM_TAG => Some(-magnitude - 1),
        _ => None,
    }
}

fn write_bounded<W: minicbor::encode::Write>(
    e: &mut minicbor::Encoder<W>,
    bytes: &[u8],
) -> Result<(), minicbor::encode::Error<W::Error>> {
    if bytes.len() <= BOUNDED_BYTES_CHUNK {
        e.bytes(bytes)?;
    } else {
        e.begin_bytes()?;
        for chunk in bytes.chunks(BOUNDED_BYTES_CHUNK) {
            e.bytes(chunk)?;
        }
        e.end()?;
    }

    Ok(())
}

fn write_bignum<W: minicbor::encode::Write>(
    e: &mut minicbor::Encoder<W>,
    value: &BigInt,
    chunked: bool,
) -> Result<(), minicbor::encode::Error<W::Error>> {
    let (tag, bytes) = bignum_bytes(value);
    e.tag(Tag::new(tag))?;

    if chunked {
        write_bounded(e, &bytes)
    } else {
        e.bytes(&bytes)?;
        Ok(())
    }
}

fn write_bigint<W: minicbor::encode::Write>(
    e: &mut minicbor::Encoder<W>,
    value: &BigInt,
    chunked: bool,
) -> Result<(), minicbor::encode::Error<W::Error>> {
    match as_cbor_int(value) {
        Some(x) => {
            e.int(x)?;
            Ok(())
        }
        None => write_bignum(e, value, chunked),
    }
}

/// Writes the value as a tag 2 / 3 bignum regardless of its size
pub fn encode_bignum<W: minicbor::encode::Write>(
    e: &mut minicbor::Encoder<W>,
    value: &BigInt,
) -> Result<(), minicbor::encode::Error<W::Error>> {
    write_bignum(e, value, true)
}

/// Writes the value using the shortest representation: a plain cbor integer
/// when it fits, a bignum otherwise
pub fn encode_bigint<W: minicbor::encode::Write>(
    e: &mut minicbor::Encoder<W>,
    value: &BigInt,
) -> Result<(), minicbor::encode::Error<W::Error>> {
    write_bigint(e, value, true)
}

/// Like [`encode_bignum`], but the payload is always one definite byte string
/// as deterministic encoding requires
pub fn encode_bignum_definite<W: minicbor::encode::Write>(
    e: &mut minicbor::Encoder<W>,
    value: &BigInt,
) -> Result<(), minicbor::encode::Error<W::Error>> {
    write_bignum(e, value, false)
}

/// Like [`encode_bigint`], but a bignum payload is never chunked
pub fn encode_bigint_definite<W: minicbor::encode::Write>(
    e: &mut minicbor::Encoder<W>,
    value: &BigInt,
) -> Result<(), minicbor::encode::Error<W::Error>> {
    write_bigint(e, value, false)
}

pub(crate) fn read_chunked<'b>(
    d: &mut minicbor::Decoder<'b>,
) -> Result<Vec<u8>, minicbor::decode::Error> {
    let mut out = Vec::new();
    for chunk in d.bytes_iter()? {
        out.extend_from_slice(chunk?);
    }
    Ok(out)
}

/// Reads either a plain cbor integer or a tag 2 / 3 bignum
pub fn decode_bigint(d: &mut minicbor::Decoder<'_>) -> Result<BigInt, minicbor::decode::Error> {
    match d.datatype()? {
        Type::U8
        | Type::U16
        | Type::U32
        | Type::U64
        | Type::I8
        | Type::I16
        | Type::I32
        | Type::I64
        | Type::Int => {
            let x = d.int()?;
            Ok(BigInt::from(i128::from(x)))
        }
        Type::Tag => {
            let position = d.position();
            let tag = d.tag()?;

            if !matches!(tag.as_u64(), POS_BIGNUM_TAG | NEG_BIGNUM_TAG) {
                return Err(minicbor::decode::Error::message(format!(
                    "invalid cbor tag {} for big int",
                    tag.as_u64()
                ))
                .at(position));
            }

            match d.datatype()? {
                Type::Bytes | Type::BytesIndef => {}
                other => {
                    return Err(minicbor::decode::Error::message(format!(
                        "bignum tag must wrap a byte string, found {other}"
                    ))
                    .at(d.position()))
                }
            }

            let bytes = read_chunked(d)?;

            from_bignum_bytes(tag.as_u64(), &bytes).ok_or_else(|| {
                minicbor::decode::Error::message("invalid bignum tag").at(position)
            })
        }
        other => Err(minicbor::decode::Error::message(format!(
            "invalid cbor data type ({other}) for big int"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_case::test_case;

    fn encode_with(f: impl Fn(&mut minicbor::Encoder<&mut Vec<u8>>)) -> Vec<u8> {
        let mut buf = Vec::new();
        let mut e = minicbor::Encoder::new(&mut buf);
        f(&mut e);
        buf
    }

    #[test]
    fn minus_256_is_tag_3_over_255() {
        let value = BigInt::from(-256);
        assert_eq!(bignum_bytes(&value), (NEG_BIGNUM_TAG, vec![0xff]));

        let cbor = encode_with(|e| encode_bignum(e, &value).unwrap());
        assert_eq!(hex::encode(&cbor), "c341ff");

        let back = decode_bigint(&mut minicbor::Decoder::new(&cbor)).unwrap();
        assert_eq!(back, value);
    }

    #[test_case(0, (2, vec![]))]
    #[test_case(-1, (3, vec![]))]
    #[test_case(1, (2, vec![1]))]
    #[test_case(256, (2, vec![1, 0]))]
    #[test_case(-257, (3, vec![1, 0]))]
    fn bignum_layout(value: i64, expected: (u64, Vec<u8>)) {
        assert_eq!(bignum_bytes(&BigInt::from(value)), expected);
    }

    #[test]
    fn small_values_use_major_types() {
        let cbor = encode_with(|e| encode_bigint(e, &BigInt::from(-256)).unwrap());
        assert_eq!(hex::encode(cbor), "38ff");

        let cbor = encode_with(|e| encode_bigint(e, &BigInt::from(u64::MAX)).unwrap());
        assert_eq!(hex::encode(cbor), "1bffffffffffffffff");

        let min = -BigInt::from(u64::MAX) - 1;
        let cbor = encode_with(|e| encode_bigint(e, &min).unwrap());
        assert_eq!(hex::encode(cbor), "3bffffffffffffffff");
    }

    #[test]
    fn values_past_64_bits_use_tags() {
        let big = BigInt::from(u64::MAX) + 1;
        let cbor = encode_with(|e| encode_bigint(e, &big).unwrap());
        assert_eq!(hex::encode(&cbor), "c249010000000000000000");

        let small = -BigInt::from(u64::MAX) - 2;
        let cbor = encode_with(|e| encode_bigint(e, &small).unwrap());
        assert_eq!(hex::encode(&cbor), "c349010000000000000000");
    }

    #[test]
    fn long_bignums_are_chunked() {
        let big = BigInt::from(1) << 600usize;
        let cbor = encode_with(|e| encode_bigint(e, &big).unwrap());

        // tag 2 followed by an indefinite byte string
        assert_eq!(&cbor[..2], &[0xc2, 0x5f]);
        let back = decode_bigint(&mut minicbor::Decoder::new(&cbor)).unwrap();
        assert_eq!(back, big);
    }

    #[test]
    fn definite_bignums_are_never_chunked() {
        let big = BigInt::from(1) << 600usize;
        let cbor = encode_with(|e| encode_bigint_definite(e, &big).unwrap());

        // tag 2, then a 76 byte string with a one byte length argument
        assert_eq!(&cbor[..4], &[0xc2, 0x58, 0x4c, 0x01]);
        assert_eq!(cbor.len(), 4 + 75);
        let back = decode_bigint(&mut minicbor::Decoder::new(&cbor)).unwrap();
        assert_eq!(back, big);

        let cbor = encode_with(|e| encode_bignum_definite(e, &BigInt::from(-256)).unwrap());
        assert_eq!(hex::encode(cbor), "c341ff");
    }

    #[test]
    fn rejects_bignum_over_non_bytes() {
        // tag 2 wrapping the integer 1
        let cbor = hex::decode("c201").unwrap();
        assert!(decode_bigint(&mut minicbor::Decoder::new(&cbor)).is_err());
    }

    #[test]
    fn rejects_unknown_tag() {
        let cbor = hex::decode("c441ff").unwrap();
        assert!(decode_bigint(&mut minicbor::Decoder::new(&cbor)).is_err());
    }

    proptest! {
        #[test]
        fn bignum_roundtrip(bytes in prop::collection::vec(any::<u8>(), 0..80), negative: bool) {
            let magnitude = BigInt::from(BigUint::from_bytes_be(&bytes));
            let value = if negative { -magnitude - 1 } else { magnitude };

            let cbor = encode_with(|e| encode_bignum(e, &value).unwrap());
            let back = decode_bigint(&mut minicbor::Decoder::new(&cbor)).unwrap();
            prop_assert_eq!(back, value.clone());

            let cbor = encode_with(|e| encode_bigint(e, &value).unwrap());
            let back = decode_bigint(&mut minicbor::Decoder::new(&cbor)).unwrap();
            prop_assert_eq!(back, value);
        }
    }
}
