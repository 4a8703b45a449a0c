//! Ledger primitives and cbor codec for the Conway era

mod error;
mod framework;
mod plutus_data;

pub mod conway;

pub use error::Error;
pub use framework::{KeyOrder, ToHash};
pub use plutus_data::*;

pub(crate) use framework::{encode_record, Fields, Tuple};

pub use conway_codec::utils::{
    Bytes, CborWrap, Int, KeepRaw, KeyValuePairs, MaybeIndefArray, NonEmptyKeyValuePairs,
    NonEmptySet, NonZeroInt, Nullable, PositiveCoin, Set,
};
pub use conway_codec::Fragment;
pub use conway_crypto::hash::Hash;

use conway_codec::codec_by_datatype;
use conway_codec::minicbor::{self, data::Tag, Decode, Encode};
use serde::{Deserialize, Serialize};
use std::{fmt, ops::Deref};

// ----- Common type definitions

pub type AddrKeyhash = Hash<28>;

pub type Coin = u64;

pub type CostModel = Vec<i64>;

pub type DatumHash = Hash<32>;

pub type DnsName = String;

pub type Epoch = u64;

#[derive(Serialize, Deserialize, Encode, Decode, Debug, PartialEq, Eq, Clone, Copy)]
pub struct ExUnits {
    #[n(0)]
    pub mem: u64,
    #[n(1)]
    pub steps: u64,
}

#[derive(Serialize, Deserialize, Encode, Decode, Debug, PartialEq, Eq, Clone)]
pub struct ExUnitPrices {
    #[n(0)]
    pub mem_price: RationalNumber,

    #[n(1)]
    pub step_price: RationalNumber,
}

pub type Genesishash = Hash<28>;

pub type IPv4 = Bytes;

pub type IPv6 = Bytes;

pub type Metadata = KeyValuePairs<MetadatumLabel, Metadatum>;

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, PartialOrd, Ord, Clone)]
pub enum Metadatum {
    Int(Int),
    Bytes(Bytes),
    Text(String),
    Array(Vec<Metadatum>),
    Map(KeyValuePairs<Metadatum, Metadatum>),
}

codec_by_datatype! {
    Metadatum,
    U8 | U16 | U32 | U64 | I8 | I16 | I32 | I64 | Int => Int,
    Bytes => Bytes,
    String => Text,
    Array | ArrayIndef => Array,
    Map | MapIndef => Map,
    ()
}

pub type MetadatumLabel = u64;

#[derive(
    Serialize, Deserialize, Encode, Decode, Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy,
)]
#[cbor(index_only)]
pub enum NetworkId {
    #[n(0)]
    Testnet,
    #[n(1)]
    Mainnet,
}

impl From<NetworkId> for u8 {
    fn from(network_id: NetworkId) -> u8 {
        match network_id {
            NetworkId::Testnet => 0,
            NetworkId::Mainnet => 1,
        }
    }
}

impl TryFrom<u8> for NetworkId {
    type Error = u8;

    fn try_from(i: u8) -> Result<Self, Self::Error> {
        match i {
            0 => Ok(Self::Testnet),
            1 => Ok(Self::Mainnet),
            other => Err(other),
        }
    }
}

#[derive(Serialize, Deserialize, Encode, Decode, Debug, PartialEq, Eq, Clone)]
#[cbor(transparent)]
pub struct PlutusScript<const VERSION: usize>(#[n(0)] pub Bytes);

impl<const VERSION: usize> AsRef<[u8]> for PlutusScript<VERSION> {
    fn as_ref(&self) -> &[u8] {
        self.0.as_slice()
    }
}

pub type PolicyId = Hash<28>;

pub type PoolKeyhash = Hash<28>;

#[derive(Serialize, Deserialize, Encode, Decode, Debug, PartialEq, Eq, Clone)]
pub struct PoolMetadata {
    #[n(0)]
    pub url: String,

    #[n(1)]
    pub hash: PoolMetadataHash,
}

pub type PoolMetadataHash = Hash<32>;

pub type Port = u32;

pub type ProtocolVersion = (u64, u64);

/// Name of a native asset under a policy, at most 32 bytes
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "Bytes", into = "Bytes")]
pub struct AssetName(Bytes);

impl AssetName {
    pub const MAX_LEN: usize = 32;

    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, Error> {
        let bytes = bytes.into();

        if bytes.len() > Self::MAX_LEN {
            return Err(Error::AssetNameTooLong {
                max: Self::MAX_LEN,
                actual: bytes.len(),
            });
        }

        Ok(Self(bytes.into()))
    }
}

impl Deref for AssetName {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        self.0.as_slice()
    }
}

impl TryFrom<Bytes> for AssetName {
    type Error = Error;

    fn try_from(value: Bytes) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AssetName> for Bytes {
    fn from(value: AssetName) -> Self {
        value.0
    }
}

impl fmt::Display for AssetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl<C> minicbor::Encode<C> for AssetName {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        e.bytes(self)?.ok()
    }
}

impl<'b, C> minicbor::Decode<'b, C> for AssetName {
    fn decode(d: &mut minicbor::Decoder<'b>, _ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
        let position = d.position();

        AssetName::new(d.bytes()?)
            .map_err(|e| minicbor::decode::Error::message(e.to_string()).at(position))
    }
}

const RATIONAL_TAG: u64 = 30;

fn decode_rational(
    d: &mut minicbor::Decoder<'_>,
    schema: &'static str,
) -> Result<(u64, u64), minicbor::decode::Error> {
    let position = d.position();
    let tag = d.tag()?;

    if tag.as_u64() != RATIONAL_TAG {
        return Err(minicbor::decode::Error::message(format!(
            "{schema}: expected tag {RATIONAL_TAG}, found {}",
            tag.as_u64()
        ))
        .at(position));
    }

    let tuple = Tuple::begin(d, schema)?;
    tuple.arity(2)?;
    let numerator = d.u64()?;
    let position = d.position();
    let denominator = d.u64()?;
    tuple.end(d)?;

    if denominator == 0 {
        return Err(minicbor::decode::Error::message(format!(
            "{schema}: denominator must not be zero"
        ))
        .at(position));
    }

    Ok((numerator, denominator))
}

fn encode_rational<W: minicbor::encode::Write>(
    numerator: u64,
    denominator: u64,
    e: &mut minicbor::Encoder<W>,
) -> Result<(), minicbor::encode::Error<W::Error>> {
    e.tag(Tag::new(RATIONAL_TAG))?;
    e.array(2)?;
    e.u64(numerator)?;
    e.u64(denominator)?;
    Ok(())
}

/// A non-negative rational, `#6.30([uint, positive_int])`
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
pub struct RationalNumber {
    pub numerator: u64,
    pub denominator: u64,
}

impl<'b, C> minicbor::decode::Decode<'b, C> for RationalNumber {
    fn decode(d: &mut minicbor::Decoder<'b>, _ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
        let (numerator, denominator) = decode_rational(d, "RationalNumber")?;

        Ok(RationalNumber {
            numerator,
            denominator,
        })
    }
}

impl<C> minicbor::encode::Encode<C> for RationalNumber {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        encode_rational(self.numerator, self.denominator, e)
    }
}

pub type PositiveInterval = RationalNumber;

/// A rational in `[0, 1]`
///
/// Only reachable through [`UnitInterval::new`] (or decoding, which runs the
/// same check), so a value in hand always has `0 < denominator` and
/// `numerator <= denominator`.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy)]
#[serde(try_from = "RationalNumber", into = "RationalNumber")]
pub struct UnitInterval {
    numerator: u64,
    denominator: u64,
}

impl UnitInterval {
    pub fn new(numerator: u64, denominator: u64) -> Result<Self, Error> {
        if denominator == 0 || numerator > denominator {
            return Err(Error::IntervalOutOfRange {
                numerator,
                denominator,
            });
        }

        Ok(Self {
            numerator,
            denominator,
        })
    }

    pub fn numerator(&self) -> u64 {
        self.numerator
    }

    pub fn denominator(&self) -> u64 {
        self.denominator
    }
}

impl TryFrom<RationalNumber> for UnitInterval {
    type Error = Error;

    fn try_from(value: RationalNumber) -> Result<Self, Self::Error> {
        Self::new(value.numerator, value.denominator)
    }
}

impl From<UnitInterval> for RationalNumber {
    fn from(value: UnitInterval) -> Self {
        RationalNumber {
            numerator: value.numerator,
            denominator: value.denominator,
        }
    }
}

impl<'b, C> minicbor::decode::Decode<'b, C> for UnitInterval {
    fn decode(d: &mut minicbor::Decoder<'b>, _ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
        let position = d.position();
        let (numerator, denominator) = decode_rational(d, "UnitInterval")?;

        UnitInterval::new(numerator, denominator)
            .map_err(|e| minicbor::decode::Error::message(e.to_string()).at(position))
    }
}

impl<C> minicbor::encode::Encode<C> for UnitInterval {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        encode_rational(self.numerator, self.denominator, e)
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
pub enum Relay {
    SingleHostAddr(Nullable<Port>, Nullable<IPv4>, Nullable<IPv6>),
    SingleHostName(Nullable<Port>, DnsName),
    MultiHostName(DnsName),
}

impl<'b, C> minicbor::decode::Decode<'b, C> for Relay {
    fn decode(d: &mut minicbor::Decoder<'b>, ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
        let tuple = Tuple::begin(d, "Relay")?;

        let relay = match tuple.discriminant(d)? {
            0 => {
                tuple.arity(4)?;
                Relay::SingleHostAddr(
                    d.decode_with(ctx)?,
                    d.decode_with(ctx)?,
                    d.decode_with(ctx)?,
                )
            }
            1 => {
                tuple.arity(3)?;
                Relay::SingleHostName(d.decode_with(ctx)?, d.decode_with(ctx)?)
            }
            2 => {
                tuple.arity(2)?;
                Relay::MultiHostName(d.decode_with(ctx)?)
            }
            x => return Err(tuple.unknown(x)),
        };

        tuple.end(d)?;
        Ok(relay)
    }
}

impl<C> minicbor::encode::Encode<C> for Relay {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        match self {
            Relay::SingleHostAddr(a, b, c) => {
                e.array(4)?;
                e.encode_with(0, ctx)?;
                e.encode_with(a, ctx)?;
                e.encode_with(b, ctx)?;
                e.encode_with(c, ctx)?;

                Ok(())
            }
            Relay::SingleHostName(a, b) => {
                e.array(3)?;
                e.encode_with(1, ctx)?;
                e.encode_with(a, ctx)?;
                e.encode_with(b, ctx)?;

                Ok(())
            }
            Relay::MultiHostName(a) => {
                e.array(2)?;
                e.encode_with(2, ctx)?;
                e.encode_with(a, ctx)?;

                Ok(())
            }
        }
    }
}

pub type RewardAccount = Bytes;

pub type ScriptHash = Hash<28>;

/// Authority behind an address part, a stake right or a governance role
///
/// Wire form is `[0, addr_keyhash] / [1, script_hash]`.
#[derive(Serialize, Deserialize, Debug, PartialEq, PartialOrd, Eq, Ord, Clone, Hash)]
// !! NOTE / IMPORTANT !!
// It is tempting to swap the order of the two constructors so that KeyHash
// comes first. This indeed nicely maps the binary representation which
// associates 0 to KeyHash and 1 to ScriptHash.
//
// However, the ledger declares the ScriptHash variant first and derives its
// ordering from that declaration; maps indexed by credentials are sorted with
// it. Keep this order so both sides agree.
pub enum Credential {
    ScriptHash(ScriptHash),
    KeyHash(AddrKeyhash),
}

pub type StakeCredential = Credential;

impl Credential {
    pub fn hash(&self) -> &Hash<28> {
        match self {
            Credential::ScriptHash(x) | Credential::KeyHash(x) => x,
        }
    }

    pub fn is_script(&self) -> bool {
        matches!(self, Credential::ScriptHash(_))
    }
}

impl<'b, C> minicbor::decode::Decode<'b, C> for Credential {
    fn decode(d: &mut minicbor::Decoder<'b>, ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
        let tuple = Tuple::begin(d, "Credential")?;

        let credential = match tuple.discriminant(d)? {
            0 => {
                tuple.arity(2)?;
                Credential::KeyHash(d.decode_with(ctx)?)
            }
            1 => {
                tuple.arity(2)?;
                Credential::ScriptHash(d.decode_with(ctx)?)
            }
            x => return Err(tuple.unknown(x)),
        };

        tuple.end(d)?;
        Ok(credential)
    }
}

impl<C> minicbor::encode::Encode<C> for Credential {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        e.array(2)?;

        match self {
            Credential::KeyHash(x) => e.encode_with(0, ctx)?.encode_with(x, ctx)?,
            Credential::ScriptHash(x) => e.encode_with(1, ctx)?.encode_with(x, ctx)?,
        };

        Ok(())
    }
}

pub type TransactionIndex = u32;

#[derive(
    Serialize,
    Deserialize,
    Encode,
    Decode,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Clone,
    std::hash::Hash,
)]
pub struct TransactionInput {
    #[n(0)]
    pub transaction_id: Hash<32>,

    #[n(1)]
    pub index: u64,
}

pub type VrfKeyhash = Hash<32>;
