//! Ledger primitives and cbor codec for the Conway era
//!
//! Handcrafted, idiomatic rust artifacts based on the [Conway CDDL](https://github.com/IntersectMBO/cardano-ledger/blob/master/eras/conway/impl/cddl-files/conway.cddl) file in IntersectMBO repo.

mod auxiliary;
mod certs;
mod governance;
mod scripts;
mod transaction;
mod value;
mod witness;

pub mod crypto;
pub mod script_data;

pub use auxiliary::*;
pub use certs::*;
pub use governance::*;
pub use scripts::*;
pub use transaction::*;
pub use value::*;
pub use witness::*;

pub use crate::{
    plutus_data::*, AddrKeyhash, AssetName, Bytes, CborWrap, Coin, CostModel, Credential,
    DatumHash, DnsName, Epoch, ExUnitPrices, ExUnits, Genesishash, Hash, IPv4, IPv6, Int,
    KeyValuePairs, MaybeIndefArray, Metadata, Metadatum, MetadatumLabel, NetworkId,
    NonEmptyKeyValuePairs, NonEmptySet, NonZeroInt, Nullable, PlutusScript, PolicyId,
    PoolKeyhash, PoolMetadata, PoolMetadataHash, Port, PositiveCoin, PositiveInterval,
    ProtocolVersion, RationalNumber, Relay, RewardAccount, ScriptHash, Set, StakeCredential,
    TransactionIndex, TransactionInput, UnitInterval, VrfKeyhash,
};
