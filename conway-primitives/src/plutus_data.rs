use crate::KeyValuePairs;
use conway_codec::{
    bigint,
    minicbor::{
        self,
        data::{Tag, Type},
        Encode,
    },
    utils::MaybeIndefArray,
};
use serde::{Deserialize, Serialize};
use std::{fmt, ops::Deref};

pub use num_bigint::BigInt;

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, PartialOrd, Ord, Clone)]
pub enum PlutusData {
    Constr(Constr<PlutusData>),
    Map(KeyValuePairs<PlutusData, PlutusData>),
    BigInt(BigInt),
    BoundedBytes(BoundedBytes),
    Array(MaybeIndefArray<PlutusData>),
}

impl<'b, C> minicbor::decode::Decode<'b, C> for PlutusData {
    fn decode(d: &mut minicbor::Decoder<'b>, ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
        let type_ = d.datatype()?;

        match type_ {
            Type::Tag => {
                let position = d.position();
                let tag = d.probe().tag()?.as_u64();

                match tag {
                    bigint::POS_BIGNUM_TAG | bigint::NEG_BIGNUM_TAG => {
                        Ok(Self::BigInt(bigint::decode_bigint(d)?))
                    }
                    CONSTR_GENERAL_TAG | 121..=127 | 1280..=1400 => {
                        Ok(Self::Constr(d.decode_with(ctx)?))
                    }
                    other => Err(minicbor::decode::Error::message(format!(
                        "PlutusData: unknown tag {other}"
                    ))
                    .at(position)),
                }
            }
            Type::U8
            | Type::U16
            | Type::U32
            | Type::U64
            | Type::I8
            | Type::I16
            | Type::I32
            | Type::I64
            | Type::Int => Ok(Self::BigInt(bigint::decode_bigint(d)?)),
            Type::Map | Type::MapIndef => Ok(Self::Map(d.decode_with(ctx)?)),
            Type::Bytes | Type::BytesIndef => Ok(Self::BoundedBytes(d.decode_with(ctx)?)),
            Type::Array | Type::ArrayIndef => Ok(Self::Array(d.decode_with(ctx)?)),
            any => Err(minicbor::decode::Error::message(format!(
                "PlutusData: unexpected cbor type {any}"
            ))
            .at(d.position())),
        }
    }
}

impl<C> minicbor::encode::Encode<C> for PlutusData {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        match self {
            Self::Constr(a) => {
                e.encode_with(a, ctx)?;
            }
            Self::Map(a) => {
                e.encode_with(a, ctx)?;
            }
            Self::BigInt(a) => {
                bigint::encode_bigint(e, a)?;
            }
            Self::BoundedBytes(a) => {
                e.encode_with(a, ctx)?;
            }
            Self::Array(a) => {
                e.encode_with(a, ctx)?;
            }
        };

        Ok(())
    }
}

impl From<BigInt> for PlutusData {
    fn from(value: BigInt) -> Self {
        PlutusData::BigInt(value)
    }
}

impl From<i64> for PlutusData {
    fn from(value: i64) -> Self {
        PlutusData::BigInt(value.into())
    }
}

impl From<Vec<u8>> for PlutusData {
    fn from(value: Vec<u8>) -> Self {
        PlutusData::BoundedBytes(value.into())
    }
}

/// Tag of the general constructor form `#6.102([index, fields])`
pub const CONSTR_GENERAL_TAG: u64 = 102;

/// Wire tag used by the compact form of constructor `index`
///
/// Indexes 0 to 6 map onto tags 121 to 127, indexes 7 to 127 onto tags 1280
/// to 1400. Every other index has no compact tag and goes through the general
/// form.
pub fn compact_constr_tag(index: u64) -> Option<u64> {
    match index {
        0..=6 => Some(121 + index),
        7..=127 => Some(1280 + index - 7),
        _ => None,
    }
}

/// Constructor index carried by a compact tag, inverse of [`compact_constr_tag`]
pub fn compact_constr_index(tag: u64) -> Option<u64> {
    match tag {
        121..=127 => Some(tag - 121),
        1280..=1400 => Some(tag - 1280 + 7),
        _ => None,
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, PartialOrd, Ord, Clone)]
pub struct Constr<A: Clone> {
    pub index: u64,
    pub fields: MaybeIndefArray<A>,
}

impl<A: Clone> Constr<A> {
    pub fn new(index: u64, fields: Vec<A>) -> Self {
        Self {
            index,
            fields: MaybeIndefArray::Def(fields),
        }
    }

    /// The tag this constructor is written with
    pub fn tag(&self) -> u64 {
        compact_constr_tag(self.index).unwrap_or(CONSTR_GENERAL_TAG)
    }
}

impl<'b, C, A> minicbor::decode::Decode<'b, C> for Constr<A>
where
    A: minicbor::decode::Decode<'b, C> + Clone,
{
    fn decode(d: &mut minicbor::Decoder<'b>, ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
        let position = d.position();
        let tag = d.tag()?.as_u64();

        if let Some(index) = compact_constr_index(tag) {
            return Ok(Constr {
                index,
                fields: d.decode_with(ctx)?,
            });
        }

        if tag != CONSTR_GENERAL_TAG {
            return Err(minicbor::decode::Error::message(format!(
                "Constr: tag {tag} is not a constructor tag"
            ))
            .at(position));
        }

        let position = d.position();

        match d.array()? {
            Some(2) => Ok(Constr {
                index: d.u64()?,
                fields: d.decode_with(ctx)?,
            }),
            _ => Err(minicbor::decode::Error::message(
                "Constr: general form must be a 2-element array [index, fields]",
            )
            .at(position)),
        }
    }
}

impl<C, A> minicbor::encode::Encode<C> for Constr<A>
where
    A: minicbor::encode::Encode<C> + Clone,
{
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        match compact_constr_tag(self.index) {
            Some(tag) => {
                e.tag(Tag::new(tag))?;
                e.encode_with(&self.fields, ctx)?;
            }
            None => {
                e.tag(Tag::new(CONSTR_GENERAL_TAG))?;
                e.array(2)?;
                e.u64(self.index)?;
                e.encode_with(&self.fields, ctx)?;
            }
        }

        Ok(())
    }
}

/// Defined to encode PlutusData bytestring as it is done in the canonical
/// plutus implementation
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[serde(into = "String")]
#[serde(try_from = "String")]
pub struct BoundedBytes(Vec<u8>);

impl From<Vec<u8>> for BoundedBytes {
    fn from(xs: Vec<u8>) -> Self {
        BoundedBytes(xs)
    }
}

impl From<BoundedBytes> for Vec<u8> {
    fn from(b: BoundedBytes) -> Self {
        b.0
    }
}

impl Deref for BoundedBytes {
    type Target = Vec<u8>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl TryFrom<String> for BoundedBytes {
    type Error = hex::FromHexError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let v = hex::decode(value)?;
        Ok(BoundedBytes(v))
    }
}

impl From<BoundedBytes> for String {
    fn from(b: BoundedBytes) -> Self {
        hex::encode(b.deref())
    }
}

impl fmt::Display for BoundedBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

impl<C> Encode<C> for BoundedBytes {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        // bytestrings longer than 64 bytes go out as indefinite lists of
        // 64-byte chunks
        let bs: &Vec<u8> = self.deref();

        if bs.len() <= bigint::BOUNDED_BYTES_CHUNK {
            e.bytes(bs)?;
        } else {
            e.begin_bytes()?;
            for b in bs.chunks(bigint::BOUNDED_BYTES_CHUNK) {
                e.bytes(b)?;
            }
            e.end()?;
        }

        Ok(())
    }
}

impl<'b, C> minicbor::decode::Decode<'b, C> for BoundedBytes {
    fn decode(d: &mut minicbor::Decoder<'b>, _: &mut C) -> Result<Self, minicbor::decode::Error> {
        let mut res = Vec::new();
        for chunk in d.bytes_iter()? {
            let bs = chunk?;
            res.extend_from_slice(bs);
        }
        Ok(BoundedBytes::from(res))
    }
}
