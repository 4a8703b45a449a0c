use std::collections::BTreeMap;

use conway_codec::codec_by_datatype;
use conway_codec::minicbor::{self, Decode, Encode};
use conway_crypto::hash::Hasher;
use conway_crypto::key::ed25519::{PublicKey, SecretKey, Signature};
use conway_crypto::key::{Signer, Verifier};
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::NativeScript;
use crate::{
    encode_record, AddrKeyhash, Bytes, ExUnits, Fields, Hash, KeyOrder, KeyValuePairs,
    MaybeIndefArray, NonEmptySet, PlutusData, PlutusScript,
};

#[derive(Serialize, Deserialize, Encode, Decode, Debug, PartialEq, Eq, Clone)]
pub struct VKeyWitness {
    #[n(0)]
    pub vkey: PublicKey,

    #[n(1)]
    pub signature: Signature,
}

impl VKeyWitness {
    /// Signs the hash of a transaction body
    pub fn sign(key: &SecretKey, tx_hash: &Hash<32>) -> Self {
        Self {
            vkey: key.public_key(),
            signature: Signer::sign(key, tx_hash.as_ref()),
        }
    }

    pub fn verify(&self, tx_hash: &Hash<32>) -> bool {
        Verifier::verify(&self.vkey, tx_hash.as_ref(), &self.signature)
    }

    /// The key hash that required-signers and addresses refer to
    pub fn key_hash(&self) -> AddrKeyhash {
        Hasher::<224>::hash(self.vkey.as_ref())
    }
}

/* bootstrap_witness =
[ public_key : $vkey
, signature  : $signature
, chain_code : bytes .size 32
, attributes : bytes
] */

#[derive(Serialize, Deserialize, Encode, Decode, Debug, PartialEq, Eq, Clone)]
pub struct BootstrapWitness {
    #[n(0)]
    pub public_key: PublicKey,

    #[n(1)]
    pub signature: Signature,

    #[n(2)]
    pub chain_code: Bytes,

    #[n(3)]
    pub attributes: Bytes,
}

#[derive(
    Serialize, Deserialize, Encode, Decode, Debug, PartialEq, Eq, Clone, Copy, PartialOrd, Ord,
)]
#[cbor(index_only)]
pub enum RedeemerTag {
    #[n(0)]
    Spend,
    #[n(1)]
    Mint,
    #[n(2)]
    Cert,
    #[n(3)]
    Reward,
    #[n(4)]
    Vote,
    #[n(5)]
    Propose,
}

#[derive(Serialize, Deserialize, Encode, Decode, Debug, PartialEq, Eq, Clone)]
pub struct Redeemer {
    #[n(0)]
    pub tag: RedeemerTag,

    #[n(1)]
    pub index: u32,

    #[n(2)]
    pub data: PlutusData,

    #[n(3)]
    pub ex_units: ExUnits,
}

#[derive(Serialize, Deserialize, Encode, Decode, Debug, PartialEq, Eq, Clone, PartialOrd, Ord)]
pub struct RedeemersKey {
    #[n(0)]
    pub tag: RedeemerTag,
    #[n(1)]
    pub index: u32,
}

#[derive(Serialize, Deserialize, Encode, Decode, Debug, PartialEq, Eq, Clone)]
pub struct RedeemersValue {
    #[n(0)]
    pub data: PlutusData,
    #[n(1)]
    pub ex_units: ExUnits,
}

/// Redeemers in either the legacy list form or the Conway map form
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum Redeemers {
    List(MaybeIndefArray<Redeemer>),
    Map(KeyValuePairs<RedeemersKey, RedeemersValue>),
}

codec_by_datatype! {
    Redeemers,
    Array | ArrayIndef => List,
    Map | MapIndef => Map,
    ()
}

impl Redeemers {
    pub fn len(&self) -> usize {
        match self {
            Redeemers::List(x) => x.len(),
            Redeemers::Map(x) => x.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every redeemer flattened into the list form, whatever the wire form was
    pub fn to_list(&self) -> Vec<Redeemer> {
        match self {
            Redeemers::List(x) => x.iter().cloned().collect(),
            Redeemers::Map(x) => x
                .iter()
                .map(|(k, v)| Redeemer {
                    tag: k.tag,
                    index: k.index,
                    data: v.data.clone(),
                    ex_units: v.ex_units,
                })
                .collect(),
        }
    }
}

impl From<BTreeMap<RedeemersKey, RedeemersValue>> for Redeemers {
    fn from(value: BTreeMap<RedeemersKey, RedeemersValue>) -> Self {
        Redeemers::Map(KeyValuePairs::from(value.into_iter().collect::<Vec<_>>()))
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Default)]
pub struct WitnessSet {
    pub vkeywitness: Option<NonEmptySet<VKeyWitness>>,

    pub native_script: Option<NonEmptySet<NativeScript>>,

    pub bootstrap_witness: Option<NonEmptySet<BootstrapWitness>>,

    pub plutus_v1_script: Option<NonEmptySet<PlutusScript<1>>>,

    pub plutus_data: Option<NonEmptySet<PlutusData>>,

    pub redeemer: Option<Redeemers>,

    pub plutus_v2_script: Option<NonEmptySet<PlutusScript<2>>>,

    pub plutus_v3_script: Option<NonEmptySet<PlutusScript<3>>>,

    #[serde(skip)]
    pub layout: KeyOrder,
}

impl WitnessSet {
    fn present_keys(&self) -> Vec<u64> {
        [
            (0, self.vkeywitness.is_some()),
            (1, self.native_script.is_some()),
            (2, self.bootstrap_witness.is_some()),
            (3, self.plutus_v1_script.is_some()),
            (4, self.plutus_data.is_some()),
            (5, self.redeemer.is_some()),
            (6, self.plutus_v2_script.is_some()),
            (7, self.plutus_v3_script.is_some()),
        ]
        .iter()
        .filter(|(_, set)| *set)
        .map(|(key, _)| *key)
        .collect()
    }
}

impl<C> minicbor::Encode<C> for WitnessSet {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        encode_record(e, &self.layout, &self.present_keys(), |key, e| {
            match key {
                0 => e.encode_with(&self.vkeywitness, ctx)?,
                1 => e.encode_with(&self.native_script, ctx)?,
                2 => e.encode_with(&self.bootstrap_witness, ctx)?,
                3 => e.encode_with(&self.plutus_v1_script, ctx)?,
                4 => e.encode_with(&self.plutus_data, ctx)?,
                5 => e.encode_with(&self.redeemer, ctx)?,
                6 => e.encode_with(&self.plutus_v2_script, ctx)?,
                7 => e.encode_with(&self.plutus_v3_script, ctx)?,
                _ => return Ok(()),
            };

            Ok(())
        })
    }
}

impl<'b, C> minicbor::Decode<'b, C> for WitnessSet {
    fn decode(d: &mut minicbor::Decoder<'b>, ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
        let mut fields = Fields::begin(d, "WitnessSet")?;
        let mut out = WitnessSet::default();

        while let Some(key) = fields.next_key(d)? {
            trace!(key, "decoding witness set field");

            match key {
                0 => out.vkeywitness = Some(d.decode_with(ctx)?),
                1 => out.native_script = Some(d.decode_with(ctx)?),
                2 => out.bootstrap_witness = Some(d.decode_with(ctx)?),
                3 => out.plutus_v1_script = Some(d.decode_with(ctx)?),
                4 => out.plutus_data = Some(d.decode_with(ctx)?),
                5 => out.redeemer = Some(d.decode_with(ctx)?),
                6 => out.plutus_v2_script = Some(d.decode_with(ctx)?),
                7 => out.plutus_v3_script = Some(d.decode_with(ctx)?),
                x => return Err(fields.unknown(x)),
            }
        }

        out.layout = fields.layout();

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Fragment;

    fn witness_hex() -> String {
        format!("825820{}5840{}", "01".repeat(32), "02".repeat(64))
    }

    fn expected() -> VKeyWitness {
        VKeyWitness {
            vkey: PublicKey::from([1; 32]),
            signature: Signature::from([2; 64]),
        }
    }

    #[test]
    fn decode_empty_witness_set() {
        let ws = WitnessSet::from_cbor_hex("a0").unwrap();
        assert_eq!(ws.vkeywitness, None);
        assert_eq!(ws, WitnessSet::default());
    }

    #[test]
    fn decode_witness_set_having_vkeywitness_untagged_must_be_nonempty() {
        let err = WitnessSet::from_cbor_hex("a10080").unwrap_err();
        assert!(err.to_string().contains("decoding empty set as NonEmptySet"));
    }

    #[test]
    fn decode_witness_set_having_vkeywitness_untagged_singleton() {
        let hex = format!("a10081{}", witness_hex());
        let ws = WitnessSet::from_cbor_hex(&hex).unwrap();

        let witnesses = ws.vkeywitness.clone().unwrap();
        assert!(!witnesses.is_tagged());
        assert_eq!(witnesses.to_vec(), vec![expected()]);

        // the set is written back without the tag it didn't have
        assert_eq!(ws.to_cbor_hex().unwrap(), hex);
    }

    #[test]
    fn decode_witness_set_having_vkeywitness_conwaystyle_singleton() {
        let hex = format!("a100d9010281{}", witness_hex());
        let ws = WitnessSet::from_cbor_hex(&hex).unwrap();

        assert_eq!(ws.vkeywitness.map(|s| s.to_vec()), Some(vec![expected()]));
    }

    #[test]
    fn decode_witness_set_having_vkeywitness_conwaystyle_must_be_nonempty() {
        let err = WitnessSet::from_cbor_hex("a100d9010280").unwrap_err();
        assert!(err.to_string().contains("decoding empty set as NonEmptySet"));
    }

    #[test]
    fn decode_witness_set_having_vkeywitness_reject_nonsense_tag() {
        let hex = format!("a100d9010381{}", witness_hex());
        let err = WitnessSet::from_cbor_hex(&hex).unwrap_err();
        assert!(err.to_string().contains("expected cbor tag 258, found 259"));
    }

    // the ledger collapses duplicates into a single element, here they're kept
    // as received so that re-encoding is byte exact
    #[test]
    fn decode_witness_set_having_vkeywitness_duplicate_entries() {
        let hex = format!("a100d9010282{}{}", witness_hex(), witness_hex());
        let ws = WitnessSet::from_cbor_hex(&hex).unwrap();

        assert_eq!(
            ws.vkeywitness.map(|s| s.to_vec()),
            Some(vec![expected(), expected()])
        );
    }

    #[test]
    fn witness_set_keeps_received_key_order() {
        // {5: {}, 0: [witness]} written as an indefinite map
        let hex = format!("bf05a00081{}ff", witness_hex());
        let ws = WitnessSet::from_cbor_hex(&hex).unwrap();

        assert!(ws.layout.is_indefinite());
        assert_eq!(ws.to_cbor_hex().unwrap(), hex);

        let fresh = WitnessSet {
            vkeywitness: ws.vkeywitness.clone(),
            redeemer: ws.redeemer.clone(),
            ..Default::default()
        };
        assert_eq!(fresh, ws);
        assert_eq!(fresh.to_cbor_hex().unwrap(), format!("a20081{}05a0", witness_hex()));
    }

    #[test]
    fn reject_short_vkey() {
        let hex = format!("a10081825820{}5840{}", "01".repeat(31), "02".repeat(64));
        assert!(WitnessSet::from_cbor_hex(&hex).is_err());
    }

    #[test]
    fn reject_duplicate_and_unknown_keys() {
        let err = WitnessSet::from_cbor_hex("a205a005a0").unwrap_err();
        assert!(err.to_string().contains("WitnessSet: duplicate key 5"));

        let err = WitnessSet::from_cbor_hex("a108a0").unwrap_err();
        assert!(err.to_string().contains("WitnessSet: unknown key 8"));
    }

    #[test]
    fn signed_witness_verifies() {
        let key = SecretKey::from([7u8; 32]);
        let tx_hash = Hash::new([0x5a; 32]);

        let witness = VKeyWitness::sign(&key, &tx_hash);
        assert!(witness.verify(&tx_hash));
        assert!(!witness.verify(&Hash::new([0x5b; 32])));
        assert_eq!(witness.key_hash(), Hasher::<224>::hash(key.public_key().as_ref()));

        let ws = WitnessSet {
            vkeywitness: NonEmptySet::from_vec(vec![witness]),
            ..Default::default()
        };

        let bytes = ws.to_cbor_bytes().unwrap();
        assert_eq!(WitnessSet::from_cbor_bytes(&bytes).unwrap(), ws);
    }

    #[test]
    fn redeemers_in_both_forms() {
        let data = PlutusData::from(vec![0xca, 0xfe]);
        let ex_units = ExUnits { mem: 10, steps: 20 };

        // [[0, 1, h'cafe', [10, 20]]]
        let list = Redeemers::from_cbor_hex("8184000142cafe820a14").unwrap();

        // {[0, 1]: [h'cafe', [10, 20]]}
        let map = Redeemers::from_cbor_hex("a18200018242cafe820a14").unwrap();

        assert!(matches!(list, Redeemers::List(_)));
        assert!(matches!(map, Redeemers::Map(_)));
        assert_eq!(list.to_list(), map.to_list());
        assert_eq!(
            map.to_list(),
            vec![Redeemer {
                tag: RedeemerTag::Spend,
                index: 1,
                data,
                ex_units
            }]
        );

        let from_btree = Redeemers::from(BTreeMap::from([(
            RedeemersKey {
                tag: RedeemerTag::Spend,
                index: 1,
            },
            RedeemersValue {
                data: PlutusData::from(vec![0xca, 0xfe]),
                ex_units,
            },
        )]));
        assert_eq!(from_btree.to_cbor_hex().unwrap(), "a18200018242cafe820a14");
    }

    #[test]
    fn redeemer_tags_cover_governance() {
        assert_eq!(RedeemerTag::from_cbor_hex("04").unwrap(), RedeemerTag::Vote);
        assert_eq!(RedeemerTag::from_cbor_hex("05").unwrap(), RedeemerTag::Propose);
        assert!(RedeemerTag::from_cbor_hex("06").is_err());
    }
}
