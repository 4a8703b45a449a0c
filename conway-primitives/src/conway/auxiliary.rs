use conway_codec::codec_by_datatype;
use conway_codec::minicbor::{self, Decode, Encode};
use serde::{Deserialize, Serialize};

use super::NativeScript;
use crate::{MaybeIndefArray, Metadata, PlutusScript};

#[derive(Serialize, Deserialize, Encode, Decode, Debug, PartialEq, Eq, Clone)]
pub struct ShelleyMaAuxiliaryData {
    #[n(0)]
    pub transaction_metadata: Metadata,

    #[n(1)]
    pub auxiliary_scripts: MaybeIndefArray<NativeScript>,
}

#[derive(Serialize, Deserialize, Encode, Decode, Debug, PartialEq, Eq, Clone, Default)]
#[cbor(map, tag(259))]
pub struct PostAlonzoAuxiliaryData {
    #[n(0)]
    pub metadata: Option<Metadata>,

    #[n(1)]
    pub native_scripts: Option<Vec<NativeScript>>,

    #[n(2)]
    pub plutus_v1_scripts: Option<Vec<PlutusScript<1>>>,

    #[n(3)]
    pub plutus_v2_scripts: Option<Vec<PlutusScript<2>>>,

    #[n(4)]
    pub plutus_v3_scripts: Option<Vec<PlutusScript<3>>>,
}

/// Transaction metadata in any of the three historical layouts
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
pub enum AuxiliaryData {
    Shelley(Metadata),
    ShelleyMa(ShelleyMaAuxiliaryData),
    PostAlonzo(PostAlonzoAuxiliaryData),
}

codec_by_datatype! {
    AuxiliaryData,
    Map | MapIndef => Shelley,
    Array | ArrayIndef => ShelleyMa,
    Tag => PostAlonzo,
    ()
}

impl AuxiliaryData {
    pub fn metadata(&self) -> Option<&Metadata> {
        match self {
            AuxiliaryData::Shelley(x) => Some(x),
            AuxiliaryData::ShelleyMa(x) => Some(&x.transaction_metadata),
            AuxiliaryData::PostAlonzo(x) => x.metadata.as_ref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Bytes, Fragment, Int, KeyValuePairs, Metadatum};

    #[test]
    fn decode_auxdata_shelley_format_empty() {
        match AuxiliaryData::from_cbor_hex("a0").unwrap() {
            AuxiliaryData::Shelley(s) => assert!(s.is_empty()),
            _ => panic!("Unexpected variant"),
        }
    }

    #[test]
    fn decode_auxdata_shelley_ma_format_empty() {
        match AuxiliaryData::from_cbor_hex("82a080").unwrap() {
            AuxiliaryData::ShelleyMa(s) => {
                assert!(s.transaction_metadata.is_empty());
                assert!(s.auxiliary_scripts.is_empty());
            }
            _ => panic!("Unexpected variant"),
        }
    }

    #[test]
    fn decode_auxdata_alonzo_format_empty() {
        match AuxiliaryData::from_cbor_hex("d90103a0").unwrap() {
            AuxiliaryData::PostAlonzo(a) => assert_eq!(a, PostAlonzoAuxiliaryData::default()),
            _ => panic!("Unexpected variant"),
        }
    }

    #[test]
    fn shelley_ma_requires_scripts() {
        assert!(AuxiliaryData::from_cbor_hex("81a0").is_err());
    }

    #[test]
    fn unknown_layout_is_rejected() {
        assert!(AuxiliaryData::from_cbor_hex("00").is_err());
    }

    #[test]
    fn post_alonzo_roundtrip() {
        let metadata = KeyValuePairs::from(vec![
            (674, Metadatum::Text("hello".into())),
            (1, Metadatum::Int(Int::from(-5))),
        ]);

        let aux = AuxiliaryData::PostAlonzo(PostAlonzoAuxiliaryData {
            metadata: Some(metadata.clone()),
            native_scripts: Some(vec![NativeScript::InvalidBefore(7)]),
            plutus_v3_scripts: Some(vec![PlutusScript(Bytes::from(vec![0x4d, 0x01]))]),
            ..Default::default()
        });

        let hex = aux.to_cbor_hex().unwrap();
        assert!(hex.starts_with("d90103a3"));

        let decoded = AuxiliaryData::from_cbor_hex(&hex).unwrap();
        assert_eq!(decoded.metadata(), Some(&metadata));
        assert_eq!(decoded, aux);
    }
}
