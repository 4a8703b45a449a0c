use conway_crypto::hash::{Hash, Hasher};

use super::{AuxiliaryData, DatumOption, NativeScript, TransactionBody};
use crate::{KeepRaw, PlutusData, PlutusScript, ToHash};

impl ToHash<32> for TransactionBody {
    fn to_hash(&self) -> Result<Hash<32>, conway_codec::Error> {
        Hasher::<256>::hash_cbor(self)
    }
}

/// The transaction id, taken over the body bytes exactly as received
impl ToHash<32> for KeepRaw<TransactionBody> {
    fn to_hash(&self) -> Result<Hash<32>, conway_codec::Error> {
        Ok(Hasher::<256>::hash(self.raw_cbor()))
    }
}

impl ToHash<32> for AuxiliaryData {
    fn to_hash(&self) -> Result<Hash<32>, conway_codec::Error> {
        Hasher::<256>::hash_cbor(self)
    }
}

impl ToHash<32> for KeepRaw<AuxiliaryData> {
    fn to_hash(&self) -> Result<Hash<32>, conway_codec::Error> {
        Ok(Hasher::<256>::hash(self.raw_cbor()))
    }
}

impl ToHash<28> for NativeScript {
    fn to_hash(&self) -> Result<Hash<28>, conway_codec::Error> {
        Hasher::<224>::hash_tagged_cbor(self, 0)
    }
}

impl<const VERSION: usize> ToHash<28> for PlutusScript<VERSION> {
    fn to_hash(&self) -> Result<Hash<28>, conway_codec::Error> {
        Ok(Hasher::<224>::hash_tagged(&self.0, VERSION as u8))
    }
}

impl ToHash<32> for PlutusData {
    fn to_hash(&self) -> Result<Hash<32>, conway_codec::Error> {
        Hasher::<256>::hash_cbor(self)
    }
}

impl ToHash<32> for DatumOption {
    fn to_hash(&self) -> Result<Hash<32>, conway_codec::Error> {
        match self {
            DatumOption::Hash(x) => Ok(*x),
            DatumOption::Data(x) => x.0.to_hash(),
        }
    }
}
