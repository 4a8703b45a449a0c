//! Generic, schema-less CBOR value tree
//!
//! Every well-formed CBOR item can be decoded into a [`Cbor`] and written back
//! out. Decoding keeps map order, container framing and byte / text chunking so
//! that an as-received re-encode reproduces the original layout (integers and
//! floats excepted, those are always written in their shortest form).

use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use minicbor::data::{Tag, Type};
use minicbor::{Decoder, Encoder};
use num_bigint::BigInt;
use num_traits::ToPrimitive;

use crate::bigint::{self, NEG_BIGNUM_TAG, POS_BIGNUM_TAG};
use crate::options::{BignumPolicy, CodecOptions, DEFAULT_MAX_DEPTH};
use crate::{scan, Error};

#[derive(Debug, Clone)]
pub enum Cbor {
    Int(BigInt),
    Bytes(Vec<u8>),
    BytesIndef(Vec<Vec<u8>>),
    Text(String),
    TextIndef(Vec<String>),
    Array(Vec<Cbor>),
    ArrayIndef(Vec<Cbor>),
    Map(Vec<(Cbor, Cbor)>),
    MapIndef(Vec<(Cbor, Cbor)>),
    Tag(u64, Box<Cbor>),
    Bool(bool),
    Null,
    Undefined,
    Simple(u8),
    Float(f64),
}

impl PartialEq for Cbor {
    fn eq(&self, other: &Self) -> bool {
        use Cbor::*;

        match (self, other) {
            (Int(a), Int(b)) => a == b,
            (Bytes(a), Bytes(b)) => a == b,
            (BytesIndef(a), BytesIndef(b)) => a == b,
            (Text(a), Text(b)) => a == b,
            (TextIndef(a), TextIndef(b)) => a == b,
            (Array(a), Array(b)) => a == b,
            (ArrayIndef(a), ArrayIndef(b)) => a == b,
            (Map(a), Map(b)) => a == b,
            (MapIndef(a), MapIndef(b)) => a == b,
            (Tag(ta, a), Tag(tb, b)) => ta == tb && a == b,
            (Bool(a), Bool(b)) => a == b,
            (Null, Null) => true,
            (Undefined, Undefined) => true,
            (Simple(a), Simple(b)) => a == b,
            // bit equality keeps NaN keys usable and Eq lawful
            (Float(a), Float(b)) => a.to_bits() == b.to_bits(),
            _ => false,
        }
    }
}

impl Eq for Cbor {}

impl Hash for Cbor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);

        match self {
            Cbor::Int(x) => x.hash(state),
            Cbor::Bytes(x) => x.hash(state),
            Cbor::BytesIndef(x) => x.hash(state),
            Cbor::Text(x) => x.hash(state),
            Cbor::TextIndef(x) => x.hash(state),
            Cbor::Array(x) | Cbor::ArrayIndef(x) => x.hash(state),
            Cbor::Map(x) | Cbor::MapIndef(x) => x.hash(state),
            Cbor::Tag(t, x) => {
                t.hash(state);
                x.hash(state);
            }
            Cbor::Bool(x) => x.hash(state),
            Cbor::Null | Cbor::Undefined => (),
            Cbor::Simple(x) => x.hash(state),
            Cbor::Float(x) => x.to_bits().hash(state),
        }
    }
}

impl Cbor {
    pub fn as_int(&self) -> Option<&BigInt> {
        match self {
            Cbor::Int(x) => Some(x),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        self.as_int().and_then(|x| x.to_u64())
    }

    /// Byte string content, with chunks joined
    pub fn as_bytes(&self) -> Option<Vec<u8>> {
        match self {
            Cbor::Bytes(x) => Some(x.clone()),
            Cbor::BytesIndef(chunks) => Some(chunks.concat()),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Cbor]> {
        match self {
            Cbor::Array(x) | Cbor::ArrayIndef(x) => Some(x),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&[(Cbor, Cbor)]> {
        match self {
            Cbor::Map(x) | Cbor::MapIndef(x) => Some(x),
            _ => None,
        }
    }

    /// Looks up a map entry by key
    pub fn get(&self, key: &Cbor) -> Option<&Cbor> {
        self.as_map()?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Decodes a single item, rejecting trailing bytes
    ///
    /// The input is first scanned without recursion so that adversarial
    /// nesting is rejected before the tree is built. With
    /// [`EncodingMode::Canonical`](crate::options::EncodingMode) the input must
    /// already be in canonical form.
    pub fn from_bytes_with(bytes: &[u8], options: &CodecOptions) -> Result<Self, Error> {
        let end = scan::check_nesting(bytes, options.depth_limit())?;

        if end != bytes.len() {
            return Err(Error::TrailingBytes {
                offset: end,
                count: bytes.len() - end,
            });
        }

        let mut d = Decoder::new(bytes);
        let value = decode_value(&mut d, options.depth_limit())
            .map_err(|e| Error::decode(e.position().unwrap_or(0), e))?;

        if options.is_canonical() && value.to_bytes_with(options)? != bytes {
            return Err(Error::NotCanonical);
        }

        Ok(value)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        Self::from_bytes_with(bytes, &CodecOptions::default())
    }

    pub fn to_bytes_with(&self, options: &CodecOptions) -> Result<Vec<u8>, Error> {
        if options.is_canonical() {
            self.clone()
                .canonicalize_with(options.bignum)?
                .write_vec(options.bignum, true)
        } else {
            self.write_vec(options.bignum, false)
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        self.to_bytes_with(&CodecOptions::default())
    }

    /// Rewrites the tree into RFC 8949 core deterministic shape
    ///
    /// Chunked strings are joined, indefinite containers become definite and
    /// map entries are sorted by the bytewise order of their encoded keys.
    /// Entries whose keys encode identically collapse, the last one wins.
    pub fn canonicalize(self) -> Result<Self, Error> {
        self.canonicalize_with(BignumPolicy::Minimal)
    }

    pub fn canonicalize_with(self, policy: BignumPolicy) -> Result<Self, Error> {
        let out = match self {
            Cbor::BytesIndef(chunks) => Cbor::Bytes(chunks.concat()),
            Cbor::TextIndef(chunks) => Cbor::Text(chunks.concat()),
            Cbor::Array(items) | Cbor::ArrayIndef(items) => Cbor::Array(
                items
                    .into_iter()
                    .map(|x| x.canonicalize_with(policy))
                    .collect::<Result<_, _>>()?,
            ),
            Cbor::Map(entries) | Cbor::MapIndef(entries) => {
                let mut keyed = Vec::with_capacity(entries.len());

                for (k, v) in entries {
                    let k = k.canonicalize_with(policy)?;
                    let v = v.canonicalize_with(policy)?;
                    keyed.push((k.write_vec(policy, true)?, k, v));
                }

                keyed.sort_by(|a, b| a.0.cmp(&b.0));

                let mut sorted: Vec<(Vec<u8>, Cbor, Cbor)> = Vec::with_capacity(keyed.len());
                for entry in keyed {
                    match sorted.last_mut() {
                        Some(last) if last.0 == entry.0 => *last = entry,
                        _ => sorted.push(entry),
                    }
                }

                Cbor::Map(sorted.into_iter().map(|(_, k, v)| (k, v)).collect())
            }
            Cbor::Tag(tag, inner) => Cbor::Tag(tag, Box::new(inner.canonicalize_with(policy)?)),
            other => other,
        };

        Ok(out)
    }

    fn write_vec(&self, policy: BignumPolicy, canonical: bool) -> Result<Vec<u8>, Error> {
        let mut buf = Vec::new();
        let mut e = Encoder::new(&mut buf);
        self.write(&mut e, policy, canonical)?;
        Ok(buf)
    }

    /// `canonical` keeps bignum payloads in one definite byte string, the
    /// as-received path splits long ones into 64 byte chunks
    fn write<W: minicbor::encode::Write>(
        &self,
        e: &mut Encoder<W>,
        policy: BignumPolicy,
        canonical: bool,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        match self {
            Cbor::Int(x) => match (policy, canonical) {
                (BignumPolicy::Minimal, false) => bigint::encode_bigint(e, x)?,
                (BignumPolicy::Minimal, true) => bigint::encode_bigint_definite(e, x)?,
                (BignumPolicy::Always, false) => bigint::encode_bignum(e, x)?,
                (BignumPolicy::Always, true) => bigint::encode_bignum_definite(e, x)?,
            },
            Cbor::Bytes(x) => {
                e.bytes(x)?;
            }
            Cbor::BytesIndef(chunks) => {
                e.begin_bytes()?;
                for chunk in chunks {
                    e.bytes(chunk)?;
                }
                e.end()?;
            }
            Cbor::Text(x) => {
                e.str(x)?;
            }
            Cbor::TextIndef(chunks) => {
                e.begin_str()?;
                for chunk in chunks {
                    e.str(chunk)?;
                }
                e.end()?;
            }
            Cbor::Array(items) => {
                e.array(items.len() as u64)?;
                for item in items {
                    item.write(e, policy, canonical)?;
                }
            }
            Cbor::ArrayIndef(items) => {
                e.begin_array()?;
                for item in items {
                    item.write(e, policy, canonical)?;
                }
                e.end()?;
            }
            Cbor::Map(entries) => {
                e.map(entries.len() as u64)?;
                for (k, v) in entries {
                    k.write(e, policy, canonical)?;
                    v.write(e, policy, canonical)?;
                }
            }
            Cbor::MapIndef(entries) => {
                e.begin_map()?;
                for (k, v) in entries {
                    k.write(e, policy, canonical)?;
                    v.write(e, policy, canonical)?;
                }
                e.end()?;
            }
            Cbor::Tag(tag, inner) => {
                e.tag(Tag::new(*tag))?;
                inner.write(e, policy, canonical)?;
            }
            Cbor::Bool(x) => {
                e.bool(*x)?;
            }
            Cbor::Null => {
                e.null()?;
            }
            Cbor::Undefined => {
                e.undefined()?;
            }
            Cbor::Simple(x) => {
                e.simple(*x)?;
            }
            Cbor::Float(x) => {
                let narrow = *x as f32;
                if fits_f16(*x) {
                    e.f16(narrow)?;
                } else if f64::from(narrow) == *x {
                    e.f32(narrow)?;
                } else {
                    e.f64(*x)?;
                }
            }
        }

        Ok(())
    }
}

/// Whether a half precision float holds the value exactly
///
/// NaN counts as fitting, it is always written as the quiet `f97e00`.
fn fits_f16(x: f64) -> bool {
    if x.is_nan() || x.is_infinite() || x == 0.0 {
        return true;
    }

    let bits = x.abs().to_bits();
    let exponent = ((bits >> 52) & 0x7ff) as i32 - 1023;
    let mantissa = bits & ((1u64 << 52) - 1);

    // normal halves keep 10 fraction bits, subnormals down to 2^-24 keep fewer
    let kept = match exponent {
        -14..=15 => 10,
        -24..=-15 => exponent + 24,
        _ => return false,
    };

    mantissa.trailing_zeros() as i32 >= 52 - kept
}

fn remaining(d: &Decoder<'_>) -> usize {
    d.input().len().saturating_sub(d.position())
}

/// Consumes the break byte that closes an indefinite container, returns false
/// if the next item is something else
fn take_break(d: &mut Decoder<'_>) -> Result<bool, minicbor::decode::Error> {
    if matches!(d.datatype()?, Type::Break) {
        d.set_position(d.position() + 1);
        Ok(true)
    } else {
        Ok(false)
    }
}

fn decode_value(d: &mut Decoder<'_>, depth: usize) -> Result<Cbor, minicbor::decode::Error> {
    let position = d.position();

    let datatype = d.datatype()?;

    let value = match datatype {
        Type::U8
        | Type::U16
        | Type::U32
        | Type::U64
        | Type::I8
        | Type::I16
        | Type::I32
        | Type::I64
        | Type::Int => Cbor::Int(BigInt::from(i128::from(d.int()?))),
        Type::Bytes => Cbor::Bytes(d.bytes()?.to_vec()),
        Type::BytesIndef => {
            let mut chunks = Vec::new();
            for chunk in d.bytes_iter()? {
                chunks.push(chunk?.to_vec());
            }
            Cbor::BytesIndef(chunks)
        }
        Type::String => Cbor::Text(d.str()?.to_owned()),
        Type::StringIndef => {
            let mut chunks = Vec::new();
            for chunk in d.str_iter()? {
                chunks.push(chunk?.to_owned());
            }
            Cbor::TextIndef(chunks)
        }
        Type::Array | Type::ArrayIndef | Type::Map | Type::MapIndef | Type::Tag if depth == 0 => {
            return Err(
                minicbor::decode::Error::message("nesting depth limit reached").at(position)
            );
        }
        Type::Array | Type::ArrayIndef => match d.array()? {
            Some(len) => {
                let mut items = Vec::with_capacity((len as usize).min(remaining(d)));
                for _ in 0..len {
                    items.push(decode_value(d, depth - 1)?);
                }
                Cbor::Array(items)
            }
            None => {
                let mut items = Vec::new();
                while !take_break(d)? {
                    items.push(decode_value(d, depth - 1)?);
                }
                Cbor::ArrayIndef(items)
            }
        },
        Type::Map | Type::MapIndef => match d.map()? {
            Some(len) => {
                let mut entries = MapBuilder::with_capacity((len as usize).min(remaining(d)));
                for _ in 0..len {
                    let k = decode_value(d, depth - 1)?;
                    let v = decode_value(d, depth - 1)?;
                    entries.insert(k, v);
                }
                Cbor::Map(entries.finish())
            }
            None => {
                let mut entries = MapBuilder::with_capacity(0);
                while !take_break(d)? {
                    let k = decode_value(d, depth - 1)?;
                    let v = decode_value(d, depth - 1)?;
                    entries.insert(k, v);
                }
                Cbor::MapIndef(entries.finish())
            }
        },
        Type::Tag => {
            let tag = d.tag()?.as_u64();

            match tag {
                POS_BIGNUM_TAG | NEG_BIGNUM_TAG => {
                    if !matches!(d.datatype()?, Type::Bytes | Type::BytesIndef) {
                        return Err(minicbor::decode::Error::message(
                            "bignum tag must wrap a byte string",
                        )
                        .at(position));
                    }

                    let bytes = bigint::read_chunked(d)?;
                    let value = bigint::from_bignum_bytes(tag, &bytes).ok_or_else(|| {
                        minicbor::decode::Error::message("invalid bignum tag").at(position)
                    })?;

                    Cbor::Int(value)
                }
                _ => Cbor::Tag(tag, Box::new(decode_value(d, depth - 1)?)),
            }
        }
        Type::Bool => Cbor::Bool(d.bool()?),
        Type::Null => {
            d.null()?;
            Cbor::Null
        }
        Type::Undefined => {
            d.undefined()?;
            Cbor::Undefined
        }
        Type::Simple => Cbor::Simple(d.simple()?),
        Type::F16 => Cbor::Float(f64::from(d.f16()?)),
        Type::F32 => Cbor::Float(f64::from(d.f32()?)),
        Type::F64 => Cbor::Float(d.f64()?),
        Type::Break => {
            return Err(minicbor::decode::Error::message("unexpected break").at(position));
        }
        other => {
            return Err(
                minicbor::decode::Error::message(format!("unsupported cbor item {other}"))
                    .at(position),
            );
        }
    };

    Ok(value)
}

/// Collects map entries, a repeated key overwrites the value of its first
/// occurrence
struct MapBuilder {
    entries: Vec<(Cbor, Cbor)>,
    index: HashMap<Cbor, usize>,
}

impl MapBuilder {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    fn insert(&mut self, key: Cbor, value: Cbor) {
        match self.index.get(&key) {
            Some(&i) => self.entries[i].1 = value,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
            }
        }
    }

    fn finish(self) -> Vec<(Cbor, Cbor)> {
        self.entries
    }
}

impl<'b, C> minicbor::Decode<'b, C> for Cbor {
    fn decode(d: &mut Decoder<'b>, _ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
        decode_value(d, DEFAULT_MAX_DEPTH)
    }
}

impl<C> minicbor::Encode<C> for Cbor {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut Encoder<W>,
        _ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        self.write(e, BignumPolicy::Minimal, false)
    }
}

impl From<u64> for Cbor {
    fn from(value: u64) -> Self {
        Cbor::Int(BigInt::from(value))
    }
}

impl From<i64> for Cbor {
    fn from(value: i64) -> Self {
        Cbor::Int(BigInt::from(value))
    }
}

impl From<BigInt> for Cbor {
    fn from(value: BigInt) -> Self {
        Cbor::Int(value)
    }
}

impl From<Vec<u8>> for Cbor {
    fn from(value: Vec<u8>) -> Self {
        Cbor::Bytes(value)
    }
}

impl From<&str> for Cbor {
    fn from(value: &str) -> Self {
        Cbor::Text(value.to_owned())
    }
}

impl From<String> for Cbor {
    fn from(value: String) -> Self {
        Cbor::Text(value)
    }
}

impl From<bool> for Cbor {
    fn from(value: bool) -> Self {
        Cbor::Bool(value)
    }
}

impl From<Vec<Cbor>> for Cbor {
    fn from(value: Vec<Cbor>) -> Self {
        Cbor::Array(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::EncodingMode;

    fn decode_hex(hex: &str) -> Cbor {
        Cbor::from_bytes(&hex::decode(hex).unwrap()).unwrap()
    }

    #[test]
    fn decodes_ints_of_every_width() {
        assert_eq!(decode_hex("17"), Cbor::from(23u64));
        assert_eq!(decode_hex("1818"), Cbor::from(24u64));
        assert_eq!(decode_hex("3903e7"), Cbor::from(-1000i64));
        assert_eq!(
            decode_hex("c249010000000000000000"),
            Cbor::Int(BigInt::from(u64::MAX) + 1)
        );
    }

    #[test]
    fn bignum_over_non_bytes_fails() {
        let cbor = hex::decode("c301").unwrap();
        assert!(matches!(
            Cbor::from_bytes(&cbor),
            Err(Error::Decode { offset: 0, .. })
        ));
    }

    #[test]
    fn always_policy_tags_every_int() {
        let options = CodecOptions::default().with_bignum(BignumPolicy::Always);
        let value = Cbor::from(-256i64);
        assert_eq!(hex::encode(value.to_bytes_with(&options).unwrap()), "c341ff");
        assert_eq!(hex::encode(value.to_bytes().unwrap()), "38ff");
    }

    // {_ "b": 1, "a": [_ 2], "c": (_ h'01', h'02')}
    const INDEFINITE_MAP: &str = "bf61620161619f02ff61635f41014102ffff";

    #[test]
    fn as_received_keeps_layout() {
        let bytes = hex::decode(INDEFINITE_MAP).unwrap();

        let value = Cbor::from_bytes(&bytes).unwrap();
        assert!(matches!(value, Cbor::MapIndef(_)));
        assert_eq!(value.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn canonical_sorts_and_flattens() {
        let value = decode_hex(INDEFINITE_MAP);
        let canonical = value.to_bytes_with(&CodecOptions::canonical()).unwrap();

        // {"a": [2], "b": 1, "c": h'0102'}
        assert_eq!(hex::encode(canonical), "a3616181026162016163420102");
    }

    #[test]
    fn canonical_orders_by_encoded_key() {
        // keys: 10, -1, "z", 100 -> 0a, 20, 1864, 617a
        let value = Cbor::Map(vec![
            (Cbor::from("z"), Cbor::Null),
            (Cbor::from(100u64), Cbor::Null),
            (Cbor::from(-1i64), Cbor::Null),
            (Cbor::from(10u64), Cbor::Null),
        ]);

        let bytes = value.to_bytes_with(&CodecOptions::canonical()).unwrap();
        assert_eq!(hex::encode(bytes), "a40af61864f620f6617af6");
    }

    #[test]
    fn duplicate_keys_last_write_wins() {
        // {1: 1, 2: 2, 1: 3}
        let value = decode_hex("a3010102020103");
        assert_eq!(
            value,
            Cbor::Map(vec![
                (Cbor::from(1u64), Cbor::from(3u64)),
                (Cbor::from(2u64), Cbor::from(2u64)),
            ])
        );
    }

    #[test]
    fn canonical_decode_rejects_unsorted_input() {
        let options = CodecOptions {
            mode: EncodingMode::Canonical,
            ..Default::default()
        };

        // {2: 0, 1: 0}
        let unsorted = hex::decode("a202000100").unwrap();
        assert!(matches!(
            Cbor::from_bytes_with(&unsorted, &options),
            Err(Error::NotCanonical)
        ));

        // 1 written with a one byte argument
        let wide = hex::decode("1801").unwrap();
        assert!(matches!(
            Cbor::from_bytes_with(&wide, &options),
            Err(Error::NotCanonical)
        ));

        let sorted = hex::decode("a201000200").unwrap();
        assert!(Cbor::from_bytes_with(&sorted, &options).is_ok());
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let bytes = hex::decode("0101").unwrap();
        assert!(matches!(
            Cbor::from_bytes(&bytes),
            Err(Error::TrailingBytes {
                offset: 1,
                count: 1
            })
        ));
    }

    #[test]
    fn truncated_input_fails() {
        let bytes = hex::decode("830102").unwrap();
        assert!(matches!(Cbor::from_bytes(&bytes), Err(Error::Decode { .. })));
    }

    #[test]
    fn deep_nesting_is_rejected() {
        let mut bytes = vec![0x81; 1000];
        bytes.push(0x00);

        assert!(matches!(Cbor::from_bytes(&bytes), Err(Error::TooDeep(256))));

        // a larger limit is clamped rather than trusted
        let options = CodecOptions::default().with_max_depth(2000);
        assert!(matches!(
            Cbor::from_bytes_with(&bytes, &options),
            Err(Error::TooDeep(256))
        ));

        let options = CodecOptions {
            max_depth: 2000,
            ..CodecOptions::default()
        };
        assert!(matches!(
            Cbor::from_bytes_with(&bytes, &options),
            Err(Error::TooDeep(256))
        ));

        let shallow: Vec<u8> = [vec![0x81; 200], vec![0x00]].concat();
        assert!(Cbor::from_bytes(&shallow).is_ok());
    }

    #[test]
    fn floats_compare_by_bits() {
        assert_eq!(Cbor::Float(f64::NAN), Cbor::Float(f64::NAN));
        assert_ne!(Cbor::Float(0.0), Cbor::Float(-0.0));
    }

    #[test]
    fn floats_use_shortest_lossless_width() {
        assert_eq!(hex::encode(Cbor::Float(1.5).to_bytes().unwrap()), "f93e00");
        assert_eq!(hex::encode(Cbor::Float(65504.0).to_bytes().unwrap()), "f97bff");
        assert_eq!(hex::encode(Cbor::Float(65536.0).to_bytes().unwrap()), "fa47800000");
        assert_eq!(
            hex::encode(Cbor::Float(5.960464477539063e-8).to_bytes().unwrap()),
            "f90001"
        );
        assert_eq!(hex::encode(Cbor::Float(100000.0).to_bytes().unwrap()), "fa47c35000");
        assert_eq!(
            hex::encode(Cbor::Float(1.1).to_bytes().unwrap()),
            "fb3ff199999999999a"
        );
    }

    #[test]
    fn canonical_accepts_half_floats() {
        let options = CodecOptions::canonical();

        // 1.0 as a half
        let half = hex::decode("f93c00").unwrap();
        assert_eq!(
            Cbor::from_bytes_with(&half, &options).unwrap(),
            Cbor::Float(1.0)
        );

        // 1.0 as a single is not the shortest form
        let single = hex::decode("fa3f800000").unwrap();
        assert!(matches!(
            Cbor::from_bytes_with(&single, &options),
            Err(Error::NotCanonical)
        ));
    }

    #[test]
    fn canonical_bignums_are_definite() {
        let options = CodecOptions::canonical();
        let big = Cbor::Int(BigInt::from(1) << 600usize);

        let bytes = big.to_bytes_with(&options).unwrap();
        assert_eq!(&bytes[..3], &[0xc2, 0x58, 0x4c]);
        assert_eq!(Cbor::from_bytes_with(&bytes, &options).unwrap(), big);

        // the as-received form is chunked and so not canonical
        let chunked = big.to_bytes().unwrap();
        assert_eq!(&chunked[..2], &[0xc2, 0x5f]);
        assert!(matches!(
            Cbor::from_bytes_with(&chunked, &options),
            Err(Error::NotCanonical)
        ));
    }

    #[test]
    fn tags_keep_their_number() {
        let value = decode_hex("d9010283010203");
        assert_eq!(
            value,
            Cbor::Tag(
                258,
                Box::new(Cbor::Array(vec![
                    Cbor::from(1u64),
                    Cbor::from(2u64),
                    Cbor::from(3u64)
                ]))
            )
        );
    }
}
