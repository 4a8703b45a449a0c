//! Interact with Cardano addresses of any type
//!
//! This crate contains utilities to decode / encode Cardano addresses from /
//! to different formats. The entry point to most of the methods is the
//! [Address] enum, which holds the decoded values of a Base, Pointer,
//! Enterprise, Reward or Byron address.
//!
//! For more information regarding Cardano addresses and their formats, please refer to [CIP-19](https://cips.cardano.org/cips/cip19/).

pub mod byron;
pub mod varuint;

use std::{fmt, io::Cursor, str::FromStr};

use conway_codec::minicbor;
use conway_crypto::hash::Hash;
use conway_primitives::{Credential, StakeCredential};
use thiserror::Error;

pub use byron::ByronAddress;

#[derive(Error, Debug)]
pub enum Error {
    #[error("error converting from/to bech32 {0}")]
    BadBech32(bech32::Error),

    #[error("error decoding base58 value {0:?}")]
    BadBase58(base58::FromBase58Error),

    #[error("error decoding hex value {0}")]
    BadHex(hex::FromHexError),

    #[error("address header not found")]
    MissingHeader,

    #[error("address header is invalid {0:08b}")]
    InvalidHeader(u8),

    #[error("address of type {typeid} must be {expected} bytes, found {actual}")]
    InvalidLength {
        typeid: u8,
        expected: usize,
        actual: usize,
    },

    #[error("invalid operation for Byron address")]
    InvalidForByron,

    #[error("unknown hrp for network {0:08b}")]
    UnknownNetworkHrp(u8),

    #[error("invalid pointer data")]
    InvalidPointerData,

    #[error("variable-length uint error: {0}")]
    VarUintError(varuint::Error),

    #[error("invalid cbor for Byron address {0}")]
    InvalidByronCbor(String),

    #[error("unrecognized address text {0}")]
    UnknownFormat(String),
}

pub type Slot = u64;
pub type TxIdx = u64;
pub type CertIdx = u64;

const HEADER_SIZE: usize = 1;
const HASH_SIZE: usize = 28;

/// An on-chain pointer to a stake registration certificate
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pointer(Slot, TxIdx, CertIdx);

impl Pointer {
    pub fn new(slot: Slot, tx_idx: TxIdx, cert_idx: CertIdx) -> Self {
        Pointer(slot, tx_idx, cert_idx)
    }

    /// Parses the three varuints, which must take up the whole slice
    pub fn parse(bytes: &[u8]) -> Result<Self, Error> {
        let mut cursor = Cursor::new(bytes);
        let a = varuint::read(&mut cursor).map_err(Error::VarUintError)?;
        let b = varuint::read(&mut cursor).map_err(Error::VarUintError)?;
        let c = varuint::read(&mut cursor).map_err(Error::VarUintError)?;

        if cursor.position() as usize != bytes.len() {
            return Err(Error::InvalidPointerData);
        }

        Ok(Pointer(a, b, c))
    }

    pub fn to_vec(&self) -> Vec<u8> {
        let mut out = vec![];
        varuint::write(&mut out, self.0);
        varuint::write(&mut out, self.1);
        varuint::write(&mut out, self.2);
        out
    }

    pub fn slot(&self) -> u64 {
        self.0
    }

    pub fn tx_idx(&self) -> u64 {
        self.1
    }

    pub fn cert_idx(&self) -> u64 {
        self.2
    }
}

/// The network tag of an address
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Network {
    Testnet,
    Mainnet,
    Other(u8),
}

impl Network {
    pub fn is_mainnet(&self) -> bool {
        matches!(self, Network::Mainnet)
    }

    pub fn value(&self) -> u8 {
        match self {
            Network::Testnet => 0,
            Network::Mainnet => 1,
            Network::Other(x) => *x,
        }
    }
}

impl From<u8> for Network {
    fn from(id: u8) -> Self {
        match id {
            0 => Network::Testnet,
            1 => Network::Mainnet,
            x => Network::Other(x),
        }
    }
}

/// Payment and stake credentials, header types 0-3
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BaseAddress {
    pub network: Network,
    pub payment: Credential,
    pub stake: StakeCredential,
}

/// Payment credential and a pointer to a stake registration, header types 4-5
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PointerAddress {
    pub network: Network,
    pub payment: Credential,
    pub pointer: Pointer,
}

/// Payment credential without stake rights, header types 6-7
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EnterpriseAddress {
    pub network: Network,
    pub payment: Credential,
}

/// Stake credential alone, used for reward withdrawals, header types 14-15
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RewardAddress {
    pub network: Network,
    pub stake: StakeCredential,
}

/// A decoded Cardano address of any type
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Address {
    Base(BaseAddress),
    Pointer(PointerAddress),
    Enterprise(EnterpriseAddress),
    Reward(RewardAddress),
    Byron(ByronAddress),
}

fn encode_bech32(addr: &[u8], hrp: &str) -> Result<String, Error> {
    let base32 = bech32::ToBase32::to_base32(&addr);
    bech32::encode(hrp, base32, bech32::Variant::Bech32).map_err(Error::BadBech32)
}

fn decode_bech32(bech32: &str) -> Result<(String, Vec<u8>), Error> {
    let (hrp, addr, _) = bech32::decode(bech32).map_err(Error::BadBech32)?;
    let base10 = bech32::FromBase32::from_base32(&addr).map_err(Error::BadBech32)?;
    Ok((hrp, base10))
}

fn credential(is_script: bool, bytes: &[u8]) -> Credential {
    let mut sized = [0u8; HASH_SIZE];
    sized.copy_from_slice(bytes);

    if is_script {
        Credential::ScriptHash(Hash::new(sized))
    } else {
        Credential::KeyHash(Hash::new(sized))
    }
}

fn check_length(typeid: u8, expected: usize, actual: usize) -> Result<(), Error> {
    if expected != actual {
        return Err(Error::InvalidLength {
            typeid,
            expected,
            actual,
        });
    }

    Ok(())
}

fn header(typeid: u8, network: Network) -> u8 {
    (typeid << 4) | (network.value() & 0b0000_1111)
}

impl BaseAddress {
    pub fn typeid(&self) -> u8 {
        (self.payment.is_script() as u8) | ((self.stake.is_script() as u8) << 1)
    }

    pub fn to_vec(&self) -> Vec<u8> {
        [
            &[header(self.typeid(), self.network)][..],
            self.payment.hash().as_ref(),
            self.stake.hash().as_ref(),
        ]
        .concat()
    }
}

impl PointerAddress {
    pub fn typeid(&self) -> u8 {
        0b0100 | self.payment.is_script() as u8
    }

    pub fn to_vec(&self) -> Vec<u8> {
        [
            &[header(self.typeid(), self.network)][..],
            self.payment.hash().as_ref(),
            &self.pointer.to_vec(),
        ]
        .concat()
    }
}

impl EnterpriseAddress {
    pub fn typeid(&self) -> u8 {
        0b0110 | self.payment.is_script() as u8
    }

    pub fn to_vec(&self) -> Vec<u8> {
        [
            &[header(self.typeid(), self.network)][..],
            self.payment.hash().as_ref(),
        ]
        .concat()
    }
}

impl RewardAddress {
    pub fn typeid(&self) -> u8 {
        0b1110 | self.stake.is_script() as u8
    }

    pub fn to_vec(&self) -> Vec<u8> {
        [
            &[header(self.typeid(), self.network)][..],
            self.stake.hash().as_ref(),
        ]
        .concat()
    }
}

impl Address {
    /// Decodes the raw bytes of an address, as found in transaction outputs
    /// and reward accounts
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let header = *bytes.first().ok_or(Error::MissingHeader)?;
        let typeid = header >> 4;
        let network = Network::from(header & 0b0000_1111);

        let payment_end = HEADER_SIZE + HASH_SIZE;

        match typeid {
            0b0000..=0b0011 => {
                check_length(typeid, payment_end + HASH_SIZE, bytes.len())?;

                Ok(Address::Base(BaseAddress {
                    network,
                    payment: credential(typeid & 0b01 != 0, &bytes[HEADER_SIZE..payment_end]),
                    stake: credential(typeid & 0b10 != 0, &bytes[payment_end..]),
                }))
            }
            0b0100 | 0b0101 => {
                if bytes.len() <= payment_end {
                    return Err(Error::InvalidPointerData);
                }

                Ok(Address::Pointer(PointerAddress {
                    network,
                    payment: credential(typeid & 0b01 != 0, &bytes[HEADER_SIZE..payment_end]),
                    pointer: Pointer::parse(&bytes[payment_end..])?,
                }))
            }
            0b0110 | 0b0111 => {
                check_length(typeid, payment_end, bytes.len())?;

                Ok(Address::Enterprise(EnterpriseAddress {
                    network,
                    payment: credential(typeid & 0b01 != 0, &bytes[HEADER_SIZE..]),
                }))
            }
            0b1000 => ByronAddress::from_bytes(bytes).map(Address::Byron),
            0b1110 | 0b1111 => {
                check_length(typeid, payment_end, bytes.len())?;

                Ok(Address::Reward(RewardAddress {
                    network,
                    stake: credential(typeid & 0b01 != 0, &bytes[HEADER_SIZE..]),
                }))
            }
            _ => Err(Error::InvalidHeader(header)),
        }
    }

    pub fn to_vec(&self) -> Vec<u8> {
        match self {
            Address::Base(x) => x.to_vec(),
            Address::Pointer(x) => x.to_vec(),
            Address::Enterprise(x) => x.to_vec(),
            Address::Reward(x) => x.to_vec(),
            Address::Byron(x) => x.to_vec(),
        }
    }

    /// Tries to parse a bech32 address into an Address
    pub fn from_bech32(bech32: &str) -> Result<Self, Error> {
        let (_, bytes) = decode_bech32(bech32)?;
        Self::from_bytes(&bytes)
    }

    /// Tries to encode an Address into a bech32 string
    pub fn to_bech32(&self) -> Result<String, Error> {
        let hrp = self.hrp()?;
        encode_bech32(&self.to_vec(), hrp)
    }

    pub fn from_hex(value: &str) -> Result<Self, Error> {
        let bytes = hex::decode(value).map_err(Error::BadHex)?;
        Self::from_bytes(&bytes)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_vec())
    }

    /// Parses the base58 text form that Byron addresses use
    pub fn from_base58(value: &str) -> Result<Self, Error> {
        ByronAddress::from_base58(value).map(Address::Byron)
    }

    /// Gets the network assoaciated with this address
    pub fn network(&self) -> Option<Network> {
        match self {
            Address::Base(x) => Some(x.network),
            Address::Pointer(x) => Some(x.network),
            Address::Enterprise(x) => Some(x.network),
            Address::Reward(x) => Some(x.network),
            Address::Byron(_) => None,
        }
    }

    /// Gets a numeric id describing the type of the address
    pub fn typeid(&self) -> u8 {
        match self {
            Address::Base(x) => x.typeid(),
            Address::Pointer(x) => x.typeid(),
            Address::Enterprise(x) => x.typeid(),
            Address::Reward(x) => x.typeid(),
            Address::Byron(x) => x.typeid(),
        }
    }

    pub fn payment_credential(&self) -> Option<&Credential> {
        match self {
            Address::Base(x) => Some(&x.payment),
            Address::Pointer(x) => Some(&x.payment),
            Address::Enterprise(x) => Some(&x.payment),
            Address::Reward(_) | Address::Byron(_) => None,
        }
    }

    /// The stake credential carried inline; pointers need a ledger lookup
    /// and yield `None`
    pub fn stake_credential(&self) -> Option<&StakeCredential> {
        match self {
            Address::Base(x) => Some(&x.stake),
            Address::Reward(x) => Some(&x.stake),
            _ => None,
        }
    }

    /// Gets the bech32 human-readable-part for this address
    pub fn hrp(&self) -> Result<&'static str, Error> {
        let network = self.network().ok_or(Error::InvalidForByron)?;

        match (self, network) {
            (Address::Reward(_), Network::Testnet) => Ok("stake_test"),
            (Address::Reward(_), Network::Mainnet) => Ok("stake"),
            (_, Network::Testnet) => Ok("addr_test"),
            (_, Network::Mainnet) => Ok("addr"),
            (_, Network::Other(x)) => Err(Error::UnknownNetworkHrp(x)),
        }
    }

    /// Indicates if this is address includes a script hash
    pub fn has_script(&self) -> bool {
        self.payment_credential().is_some_and(Credential::is_script)
            || self.stake_credential().is_some_and(Credential::is_script)
    }

    /// Indicates if this is an enterpise address
    pub fn is_enterprise(&self) -> bool {
        matches!(self, Address::Enterprise(_))
    }
}

impl From<ByronAddress> for Address {
    fn from(addr: ByronAddress) -> Self {
        Address::Byron(addr)
    }
}

impl From<BaseAddress> for Address {
    fn from(addr: BaseAddress) -> Self {
        Address::Base(addr)
    }
}

impl From<PointerAddress> for Address {
    fn from(addr: PointerAddress) -> Self {
        Address::Pointer(addr)
    }
}

impl From<EnterpriseAddress> for Address {
    fn from(addr: EnterpriseAddress) -> Self {
        Address::Enterprise(addr)
    }
}

impl From<RewardAddress> for Address {
    fn from(addr: RewardAddress) -> Self {
        Address::Reward(addr)
    }
}

impl TryFrom<&[u8]> for Address {
    type Error = Error;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        Self::from_bytes(value)
    }
}

impl FromStr for Address {
    type Err = Error;

    /// Accepts bech32, then base58 (Byron), then hex
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(x) = Address::from_bech32(s) {
            return Ok(x);
        }

        if let Ok(x) = Address::from_base58(s) {
            return Ok(x);
        }

        if let Ok(x) = Address::from_hex(s) {
            return Ok(x);
        }

        Err(Error::UnknownFormat(s.to_string()))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Byron(x) => f.write_str(&x.to_base58()),
            _ => match self.to_bech32() {
                Ok(x) => f.write_str(&x),
                Err(_) => f.write_str(&self.to_hex()),
            },
        }
    }
}

impl<C> minicbor::Encode<C> for Address {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        e.bytes(&self.to_vec())?;
        Ok(())
    }
}

impl<'b, C> minicbor::Decode<'b, C> for Address {
    fn decode(d: &mut minicbor::Decoder<'b>, _ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
        let position = d.position();
        let bytes = d.bytes()?;

        Address::from_bytes(bytes).map_err(|e| {
            minicbor::decode::Error::message(format!("Address: {e}")).at(position)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conway_codec::Fragment;
    use conway_crypto::hash::Hasher;
    use test_case::test_case;

    const MAINNET_TEST_VECTORS: &[(&str, u8)] = &[
        ("addr1qx2fxv2umyhttkxyxp8x0dlpdt3k6cwng5pxj3jhsydzer3n0d3vllmyqwsx5wktcd8cc3sq835lu7drv2xwl2wywfgse35a3x", 00u8),
        ("addr1z8phkx6acpnf78fuvxn0mkew3l0fd058hzquvz7w36x4gten0d3vllmyqwsx5wktcd8cc3sq835lu7drv2xwl2wywfgs9yc0hh", 01u8),
        ("addr1yx2fxv2umyhttkxyxp8x0dlpdt3k6cwng5pxj3jhsydzerkr0vd4msrxnuwnccdxlhdjar77j6lg0wypcc9uar5d2shs2z78ve", 02u8),
        ("addr1x8phkx6acpnf78fuvxn0mkew3l0fd058hzquvz7w36x4gt7r0vd4msrxnuwnccdxlhdjar77j6lg0wypcc9uar5d2shskhj42g", 03u8),
        ("addr1gx2fxv2umyhttkxyxp8x0dlpdt3k6cwng5pxj3jhsydzer5pnz75xxcrzqf96k", 04u8),
        ("addr128phkx6acpnf78fuvxn0mkew3l0fd058hzquvz7w36x4gtupnz75xxcrtw79hu", 05u8),
        ("addr1vx2fxv2umyhttkxyxp8x0dlpdt3k6cwng5pxj3jhsydzers66hrl8", 06u8),
        ("addr1w8phkx6acpnf78fuvxn0mkew3l0fd058hzquvz7w36x4gtcyjy7wx", 07u8),
        ("stake1uyehkck0lajq8gr28t9uxnuvgcqrc6070x3k9r8048z8y5gh6ffgw", 14u8),
        ("stake178phkx6acpnf78fuvxn0mkew3l0fd058hzquvz7w36x4gtcccycj5", 15u8),
    ];

    const PAYMENT_PUBLIC_KEY: &str =
        "addr_vk1w0l2sr2zgfm26ztc6nl9xy8ghsk5sh6ldwemlpmp9xylzy4dtf7st80zhd";
    const STAKE_PUBLIC_KEY: &str =
        "stake_vk1px4j0r2fk7ux5p23shz8f3y5y2qam7s954rgf3lg5merqcj6aetsft99wu";
    const SCRIPT_HASH: &str = "script1cda3khwqv60360rp5m7akt50m6ttapacs8rqhn5w342z7r35m37";

    const BYRON_VECTOR: &str = "37btjrVyb4KDXBNC4haBVPCrro8AQPHwvCMp3RFhhSVWwfFmZ6wwzSK6JK1hY6wHNmtrpTf1kdbva8TCneM2YsiXT7mrzT21EacHnPpz5YyUdj64na";

    fn hash_vector_key(key: &str) -> Hash<28> {
        let (_, x) = decode_bech32(key).unwrap();
        Hasher::<224>::hash(&x)
    }

    fn script_hash() -> Hash<28> {
        let (_, x) = decode_bech32(SCRIPT_HASH).unwrap();
        Hash::try_from(x.as_slice()).unwrap()
    }

    fn check_credential(credential: &Credential, key: &str) {
        match credential {
            Credential::KeyHash(hash) => assert_eq!(hash, &hash_vector_key(key)),
            Credential::ScriptHash(hash) => assert_eq!(hash, &script_hash()),
        }
    }

    #[test]
    fn roundtrip_bech32() {
        for vector in MAINNET_TEST_VECTORS {
            let original = vector.0;
            let addr = Address::from_bech32(original).unwrap();
            let ours = addr.to_bech32().unwrap();
            assert_eq!(original, ours);
        }
    }

    #[test]
    fn typeid_matches() {
        for vector in MAINNET_TEST_VECTORS {
            let addr = Address::from_bech32(vector.0).unwrap();
            assert_eq!(addr.typeid(), vector.1);
            assert_eq!(addr.to_vec()[0] >> 4, vector.1);
        }
    }

    #[test]
    fn network_matches() {
        for vector in MAINNET_TEST_VECTORS {
            let addr = Address::from_bech32(vector.0).unwrap();
            assert!(matches!(addr.network(), Some(Network::Mainnet)));
        }
    }

    #[test]
    fn payload_matches() {
        for vector in MAINNET_TEST_VECTORS {
            let addr = Address::from_bech32(vector.0).unwrap();

            if let Some(payment) = addr.payment_credential() {
                check_credential(payment, PAYMENT_PUBLIC_KEY);
            }

            if let Some(stake) = addr.stake_credential() {
                check_credential(stake, STAKE_PUBLIC_KEY);
            }

            if let Address::Pointer(x) = &addr {
                assert_eq!(x.pointer.slot(), 2498243);
                assert_eq!(x.pointer.tx_idx(), 27);
                assert_eq!(x.pointer.cert_idx(), 3);
            }
        }
    }

    #[test]
    fn variant_accessors() {
        let base = Address::from_bech32(MAINNET_TEST_VECTORS[0].0).unwrap();
        assert!(matches!(base, Address::Base(_)));
        assert!(!base.has_script());

        let enterprise = Address::from_bech32(MAINNET_TEST_VECTORS[7].0).unwrap();
        assert!(enterprise.is_enterprise());
        assert!(enterprise.has_script());
        assert_eq!(enterprise.stake_credential(), None);

        let reward = Address::from_bech32(MAINNET_TEST_VECTORS[8].0).unwrap();
        assert_eq!(reward.payment_credential(), None);
        assert_eq!(reward.hrp().unwrap(), "stake");
    }

    #[test]
    fn testnet_hrp() {
        let addr = Address::Enterprise(EnterpriseAddress {
            network: Network::Testnet,
            payment: Credential::KeyHash(Hash::new([7; 28])),
        });

        let text = addr.to_bech32().unwrap();
        assert!(text.starts_with("addr_test1"));
        assert_eq!(Address::from_bech32(&text).unwrap(), addr);
        assert_eq!(addr.to_vec()[0], 0b0110_0000);

        let other = Address::Enterprise(EnterpriseAddress {
            network: Network::Other(3),
            payment: Credential::KeyHash(Hash::new([7; 28])),
        });
        assert!(matches!(other.to_bech32(), Err(Error::UnknownNetworkHrp(3))));
    }

    #[test_case(0x01, 29 ; "base with enterprise length")]
    #[test_case(0x61, 57 ; "enterprise with base length")]
    #[test_case(0xe1, 30 ; "reward with trailing byte")]
    #[test_case(0x11, 56 ; "truncated base")]
    fn header_and_length_must_agree(header: u8, len: usize) {
        let mut bytes = vec![0u8; len];
        bytes[0] = header;

        assert!(matches!(
            Address::from_bytes(&bytes),
            Err(Error::InvalidLength { .. })
        ));
    }

    #[test]
    fn reject_bad_headers_and_pointers() {
        assert!(matches!(Address::from_bytes(&[]), Err(Error::MissingHeader)));

        let mut unknown = vec![0u8; 29];
        unknown[0] = 0b1001_0001;
        assert!(matches!(
            Address::from_bytes(&unknown),
            Err(Error::InvalidHeader(0b1001_0001))
        ));

        // pointer with a truncated varuint, then one with a trailing byte
        let mut pointer = vec![0x41];
        pointer.extend([0u8; 28]);
        pointer.extend([0x01, 0x02, 0x83]);
        assert!(Address::from_bytes(&pointer).is_err());

        pointer.pop();
        pointer.extend([0x03, 0x04]);
        assert!(matches!(
            Address::from_bytes(&pointer),
            Err(Error::InvalidPointerData)
        ));
        // slot 1 written with a redundant zero group
        let mut padded = vec![0x41];
        padded.extend([0u8; 28]);
        padded.extend([0x80, 0x01, 0x02, 0x03]);
        assert!(matches!(
            Address::from_bytes(&padded),
            Err(Error::VarUintError(varuint::Error::NonMinimal))
        ));
    }

    #[test]
    fn byron_through_the_common_api() {
        let addr = Address::from_base58(BYRON_VECTOR).unwrap();

        assert_eq!(addr.typeid(), 0b1000);
        assert_eq!(addr.network(), None);
        assert!(matches!(addr.to_bech32(), Err(Error::InvalidForByron)));

        // bytes dispatch on the 0x82 cbor header
        let again = Address::from_bytes(&addr.to_vec()).unwrap();
        assert_eq!(again, addr);
        assert_eq!(again.to_string(), BYRON_VECTOR);
    }

    #[test]
    fn parse_any_text_form() {
        let bech32 = MAINNET_TEST_VECTORS[6].0;
        let addr: Address = bech32.parse().unwrap();

        assert_eq!(addr.to_string(), bech32);
        assert_eq!(Address::from_str(&addr.to_hex()).unwrap(), addr);
        assert!(matches!(BYRON_VECTOR.parse::<Address>(), Ok(Address::Byron(_))));
        assert!(matches!(
            "not an address".parse::<Address>(),
            Err(Error::UnknownFormat(_))
        ));
    }

    #[test]
    fn cbor_is_a_byte_string() {
        let addr = Address::from_bech32(MAINNET_TEST_VECTORS[6].0).unwrap();
        let bytes = addr.to_cbor_bytes().unwrap();

        assert_eq!(&bytes[..2], &[0x58, 29]);
        assert_eq!(Address::from_cbor_bytes(&bytes).unwrap(), addr);

        let err = Address::from_cbor_hex("4161").unwrap_err();
        assert!(err.to_string().contains("Address: address of type 6 must be 29 bytes"));
    }
}
