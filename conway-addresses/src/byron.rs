use conway_codec::minicbor::{self, Decode, Encode};
use conway_codec::utils::{Bytes, KeyValuePairs, TagWrap};
use conway_crypto::hash::Hash;

use crate::Error;

pub type AddressId = Hash<28>;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum AddrType {
    PubKey,
    Script,
    Redeem,
    Other(u64),
}

impl<'b, C> minicbor::Decode<'b, C> for AddrType {
    fn decode(
        d: &mut minicbor::Decoder<'b>,
        _ctx: &mut C,
    ) -> Result<Self, minicbor::decode::Error> {
        let variant = d.u64()?;

        match variant {
            0 => Ok(AddrType::PubKey),
            1 => Ok(AddrType::Script),
            2 => Ok(AddrType::Redeem),
            x => Ok(AddrType::Other(x)),
        }
    }
}

impl<C> minicbor::Encode<C> for AddrType {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        match self {
            AddrType::PubKey => e.u64(0)?,
            AddrType::Script => e.u64(1)?,
            AddrType::Redeem => e.u64(2)?,
            AddrType::Other(x) => e.u64(*x)?,
        };

        Ok(())
    }
}

/// Attribute values are themselves cbor, kept as the bytes they arrived in
pub type AddrAttrs = KeyValuePairs<u32, Bytes>;

#[derive(Debug, Encode, Decode, Clone, PartialEq, Eq)]
pub struct AddressPayload {
    #[n(0)]
    pub root: AddressId,

    #[n(1)]
    pub attributes: AddrAttrs,

    #[n(2)]
    pub addrtype: AddrType,
}

#[derive(Encode, Decode)]
struct Envelope {
    #[n(0)]
    payload: TagWrap<Bytes, 24>,

    #[n(1)]
    crc: u64,
}

/// A Byron address: `[#6.24(bytes .cbor payload), crc32]`
///
/// The checksum is carried as found, it isn't recomputed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ByronAddress {
    payload: Bytes,
    crc: u64,
    raw: Vec<u8>,
}

impl ByronAddress {
    pub fn new(payload: &[u8], crc: u64) -> Result<Self, Error> {
        let envelope = Envelope {
            payload: TagWrap::new(Bytes::from(payload.to_vec())),
            crc,
        };

        let raw = minicbor::to_vec(&envelope).map_err(|e| Error::InvalidByronCbor(e.to_string()))?;

        Ok(Self {
            payload: envelope.payload.0,
            crc,
            raw,
        })
    }

    pub fn from_bytes(value: &[u8]) -> Result<Self, Error> {
        let envelope: Envelope =
            minicbor::decode(value).map_err(|e| Error::InvalidByronCbor(e.to_string()))?;

        Ok(Self {
            payload: envelope.payload.0,
            crc: envelope.crc,
            raw: value.to_vec(),
        })
    }

    /// Tries to decode an address from its base58 representation
    pub fn from_base58(value: &str) -> Result<Self, Error> {
        let bytes = base58::FromBase58::from_base58(value).map_err(Error::BadBase58)?;
        Self::from_bytes(&bytes)
    }

    /// Gets a numeric id describing the type of the address
    pub fn typeid(&self) -> u8 {
        0b1000
    }

    pub fn crc(&self) -> u64 {
        self.crc
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.raw.clone()
    }

    pub fn to_base58(&self) -> String {
        base58::ToBase58::to_base58(self.raw.as_slice())
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.raw)
    }

    pub fn decode(&self) -> Result<AddressPayload, Error> {
        minicbor::decode(&self.payload).map_err(|e| Error::InvalidByronCbor(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_VECTOR: &str = "37btjrVyb4KDXBNC4haBVPCrro8AQPHwvCMp3RFhhSVWwfFmZ6wwzSK6JK1hY6wHNmtrpTf1kdbva8TCneM2YsiXT7mrzT21EacHnPpz5YyUdj64na";

    const ROOT_HASH: &str = "7e9ee4a9527dea9091e2d580edd6716888c42f75d96276290f98fe0b";

    #[test]
    fn roundtrip_base58() {
        let addr = ByronAddress::from_base58(TEST_VECTOR).unwrap();
        let ours = addr.to_base58();
        assert_eq!(TEST_VECTOR, ours);
    }

    #[test]
    fn payload_matches() {
        let addr = ByronAddress::from_base58(TEST_VECTOR).unwrap();
        let payload = addr.decode().unwrap();
        assert_eq!(payload.root.to_string(), ROOT_HASH);
        assert_eq!(payload.addrtype, AddrType::PubKey);
    }

    #[test]
    fn rebuilt_from_parts() {
        let addr = ByronAddress::from_base58(TEST_VECTOR).unwrap();
        let rebuilt = ByronAddress::new(&addr.payload, addr.crc()).unwrap();
        assert_eq!(rebuilt, addr);
    }

    #[test]
    fn rejects_untagged_payload() {
        // [h'00', 0]
        assert!(ByronAddress::from_bytes(&[0x82, 0x41, 0x00, 0x00]).is_err());
        assert!(matches!(
            ByronAddress::from_base58("0OIl"),
            Err(Error::BadBase58(_))
        ));
    }
}
