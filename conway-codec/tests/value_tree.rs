use conway_codec::{canonical::canonical_bytes, Cbor, CodecOptions};
use num_bigint::BigInt;
use proptest::prelude::*;

fn leaf() -> impl Strategy<Value = Cbor> {
    prop_oneof![
        any::<i64>().prop_map(|x| Cbor::Int(BigInt::from(x))),
        any::<u64>().prop_map(|x| Cbor::Int(BigInt::from(x))),
        prop::collection::vec(any::<u8>(), 0..40).prop_map(Cbor::Bytes),
        "[a-z]{0,12}".prop_map(Cbor::Text),
        any::<bool>().prop_map(Cbor::Bool),
        Just(Cbor::Null),
    ]
}

fn tree() -> impl Strategy<Value = Cbor> {
    leaf().prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Cbor::Array),
            prop::collection::vec(inner, 0..6).prop_map(Cbor::ArrayIndef),
        ]
    })
}

proptest! {
    #[test]
    fn as_received_roundtrip(value in tree()) {
        let bytes = value.to_bytes().unwrap();
        let decoded = Cbor::from_bytes(&bytes).unwrap();

        prop_assert_eq!(&decoded, &value);
        prop_assert_eq!(decoded.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn canonical_is_idempotent(value in tree()) {
        let options = CodecOptions::canonical();
        let bytes = value.to_bytes().unwrap();

        let once = canonical_bytes(&bytes, &options).unwrap();
        let twice = canonical_bytes(&once, &options).unwrap();
        prop_assert_eq!(once, twice);
    }
}

#[test]
fn depth_limit_applies_to_untrusted_input() {
    // 10 nested single-element arrays around a zero
    let mut bytes = vec![0x81; 10];
    bytes.push(0x00);

    let shallow = CodecOptions::default().with_max_depth(4);
    assert!(Cbor::from_bytes_with(&bytes, &shallow).is_err());
    assert!(Cbor::from_bytes(&bytes).is_ok());
}
