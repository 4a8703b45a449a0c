use std::collections::{BTreeMap, BTreeSet};

use conway_codec::minicbor::{self, data::Type};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{AssetName, Coin, Error, KeyValuePairs, NonZeroInt, PolicyId, PositiveCoin, Tuple};

pub type AssetMap<A> = BTreeMap<AssetName, A>;

type Policies<A> = KeyValuePairs<PolicyId, KeyValuePairs<AssetName, A>>;

/// Native assets grouped by minting policy
///
/// Neither the outer map nor any of the per-policy maps can be empty; the
/// constructors, the arithmetic and the decoder all keep it that way. Entries
/// keep the order (and map framing) they were decoded with, equality ignores
/// both.
#[derive(Debug, Clone)]
pub struct Multiasset<A: Clone>(Policies<A>);

pub type Mint = Multiasset<NonZeroInt>;

// the ledger's `isMultiAssetSmallEnough`
const PER_ASSET_SIZE: usize = 44;
const PER_POLICY_SIZE: usize = 28;
const MAX_SIZE: usize = 65535;

fn entries_mut<K: Clone, V: Clone>(pairs: &mut KeyValuePairs<K, V>) -> &mut Vec<(K, V)> {
    match pairs {
        KeyValuePairs::Def(x) | KeyValuePairs::Indef(x) => x,
    }
}

impl<A: Clone> Multiasset<A> {
    pub fn singleton(policy: PolicyId, asset: AssetName, amount: A) -> Self {
        Multiasset(KeyValuePairs::Def(vec![(
            policy,
            KeyValuePairs::Def(vec![(asset, amount)]),
        )]))
    }

    pub fn from_map(policies: BTreeMap<PolicyId, AssetMap<A>>) -> Result<Self, Error> {
        if policies.is_empty() || policies.values().any(BTreeMap::is_empty) {
            return Err(Error::EmptyMultiasset);
        }

        let policies = policies
            .into_iter()
            .map(|(policy, assets)| (policy, KeyValuePairs::Def(assets.into_iter().collect())))
            .collect();

        Ok(Multiasset(KeyValuePairs::Def(policies)))
    }

    fn assets_of(&self, policy: &PolicyId) -> Option<&KeyValuePairs<AssetName, A>> {
        self.0.iter().find(|(p, _)| p == policy).map(|(_, assets)| assets)
    }

    pub fn get(&self, policy: &PolicyId, asset: &AssetName) -> Option<&A> {
        self.assets_of(policy)
            .and_then(|assets| assets.iter().find(|(name, _)| name == asset))
            .map(|(_, x)| x)
    }

    pub fn policies(&self) -> impl Iterator<Item = &PolicyId> {
        self.0.iter().map(|(policy, _)| policy)
    }

    /// Entries in the order they are encoded
    pub fn iter(&self) -> impl Iterator<Item = (&PolicyId, &AssetName, &A)> {
        self.0
            .iter()
            .flat_map(|(policy, assets)| assets.iter().map(move |(name, x)| (policy, name, x)))
    }

    /// Number of (policy, asset) entries
    pub fn len(&self) -> usize {
        self.0.iter().map(|(_, assets)| assets.len()).sum()
    }

    /// The entries as sorted maps, whatever their wire order
    pub fn to_map(&self) -> BTreeMap<PolicyId, AssetMap<A>> {
        self.0
            .iter()
            .map(|(policy, assets)| (*policy, assets.iter().cloned().collect()))
            .collect()
    }

    fn is_small_enough(&self) -> bool {
        PER_ASSET_SIZE * self.len() + PER_POLICY_SIZE * self.0.len() <= MAX_SIZE
    }
}

impl<A: Clone + PartialEq> PartialEq for Multiasset<A> {
    fn eq(&self, other: &Self) -> bool {
        self.to_map() == other.to_map()
    }
}

impl<A: Clone + Eq> Eq for Multiasset<A> {}

fn checked_add(
    policy: &PolicyId,
    asset: &AssetName,
    a: PositiveCoin,
    b: PositiveCoin,
) -> Result<PositiveCoin, Error> {
    a.get()
        .checked_add(b.get())
        .and_then(PositiveCoin::new)
        .ok_or_else(|| Error::AssetOverflow {
            policy: *policy,
            asset: asset.clone(),
        })
}

impl Multiasset<PositiveCoin> {
    /// Adds `amount` of the asset, appending the policy and asset entries when
    /// missing
    pub fn add(
        &mut self,
        policy: PolicyId,
        asset: AssetName,
        amount: PositiveCoin,
    ) -> Result<(), Error> {
        let policies = entries_mut(&mut self.0);

        let assets = match policies.iter().position(|(p, _)| *p == policy) {
            Some(i) => entries_mut(&mut policies[i].1),
            None => {
                policies.push((policy, KeyValuePairs::Def(vec![(asset, amount)])));
                return Ok(());
            }
        };

        match assets.iter_mut().find(|(name, _)| *name == asset) {
            Some((_, existing)) => *existing = checked_add(&policy, &asset, *existing, amount)?,
            None => assets.push((asset, amount)),
        }

        Ok(())
    }

    /// Every entry of `other` added into `self`
    pub fn merge(mut self, other: &Self) -> Result<Self, Error> {
        for (policy, asset, amount) in other.iter() {
            self.add(*policy, asset.clone(), *amount)?;
        }

        Ok(self)
    }

    /// Entry-wise difference; entries that reach zero or below are dropped,
    /// and so are policies left without assets
    ///
    /// Fails with [`Error::EmptyMultiasset`] when nothing is left.
    pub fn subtract(&self, other: &Self) -> Result<Self, Error> {
        let mut policies = Vec::new();

        for (policy, assets) in self.0.iter() {
            let remaining: Vec<(AssetName, PositiveCoin)> = assets
                .iter()
                .filter_map(|(name, amount)| {
                    let taken = other.get(policy, name).map(PositiveCoin::get).unwrap_or(0);
                    let left = amount.get().saturating_sub(taken);
                    PositiveCoin::new(left).map(|x| (name.clone(), x))
                })
                .collect();

            if !remaining.is_empty() {
                policies.push((*policy, KeyValuePairs::Def(remaining)));
            }
        }

        if policies.is_empty() {
            return Err(Error::EmptyMultiasset);
        }

        Ok(Multiasset(KeyValuePairs::Def(policies)))
    }
}

impl<A: Clone + Serialize> Serialize for Multiasset<A> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_map().serialize(serializer)
    }
}

impl<'de, A: Clone + Deserialize<'de>> Deserialize<'de> for Multiasset<A> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let policies = BTreeMap::<PolicyId, AssetMap<A>>::deserialize(deserializer)?;
        Multiasset::from_map(policies).map_err(serde::de::Error::custom)
    }
}

impl<C, A: minicbor::Encode<C> + Clone> minicbor::Encode<C> for Multiasset<A> {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        e.encode_with(&self.0, ctx)?;
        Ok(())
    }
}

fn check_policies<A: Clone>(policies: &Policies<A>) -> Result<(), String> {
    if policies.is_empty() {
        return Err("must not be empty".into());
    }

    let mut seen = BTreeSet::new();

    for (policy, assets) in policies.iter() {
        if !seen.insert(policy) {
            return Err(format!("duplicate policy {policy}"));
        }

        if assets.is_empty() {
            return Err(format!("policy {policy} must not be empty"));
        }

        let mut names = BTreeSet::new();

        if let Some((name, _)) = assets.iter().find(|(name, _)| !names.insert(name)) {
            return Err(format!("duplicate asset {name} under policy {policy}"));
        }
    }

    Ok(())
}

impl<'b, C, A> minicbor::Decode<'b, C> for Multiasset<A>
where
    A: minicbor::Decode<'b, C> + Clone,
{
    fn decode(d: &mut minicbor::Decoder<'b>, ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
        let position = d.position();
        let policies: Policies<A> = d.decode_with(ctx)?;

        check_policies(&policies).map_err(|msg| {
            minicbor::decode::Error::message(format!("Multiasset: {msg}")).at(position)
        })?;

        let result = Multiasset(policies);

        if !result.is_small_enough() {
            return Err(
                minicbor::decode::Error::message("Multiasset: must not exceed size limit")
                    .at(position),
            );
        }

        Ok(result)
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
pub enum Value {
    Coin(Coin),
    Multiasset(Coin, Multiasset<PositiveCoin>),
}

impl Value {
    pub fn coin(&self) -> Coin {
        match self {
            Value::Coin(x) | Value::Multiasset(x, _) => *x,
        }
    }

    pub fn assets(&self) -> Option<&Multiasset<PositiveCoin>> {
        match self {
            Value::Coin(_) => None,
            Value::Multiasset(_, x) => Some(x),
        }
    }

    pub fn add(&self, other: &Value) -> Result<Value, Error> {
        let coin = self
            .coin()
            .checked_add(other.coin())
            .ok_or(Error::CoinOverflow)?;

        let assets = match (self.assets(), other.assets()) {
            (None, None) => None,
            (Some(x), None) | (None, Some(x)) => Some(x.clone()),
            (Some(x), Some(y)) => Some(x.clone().merge(y)?),
        };

        Ok(Value::from_parts(coin, assets))
    }

    /// Coin difference must not underflow; assets follow
    /// [`Multiasset::subtract`], an emptied asset bundle collapses into a
    /// plain coin value
    pub fn checked_sub(&self, other: &Value) -> Result<Value, Error> {
        let coin = self
            .coin()
            .checked_sub(other.coin())
            .ok_or(Error::CoinOverflow)?;

        let assets = match (self.assets(), other.assets()) {
            (None, _) => None,
            (Some(x), None) => Some(x.clone()),
            (Some(x), Some(y)) => match x.subtract(y) {
                Ok(left) => Some(left),
                Err(Error::EmptyMultiasset) => None,
                Err(e) => return Err(e),
            },
        };

        Ok(Value::from_parts(coin, assets))
    }

    fn from_parts(coin: Coin, assets: Option<Multiasset<PositiveCoin>>) -> Value {
        match assets {
            Some(assets) => Value::Multiasset(coin, assets),
            None => Value::Coin(coin),
        }
    }
}

impl From<Coin> for Value {
    fn from(value: Coin) -> Self {
        Value::Coin(value)
    }
}

impl<C> minicbor::Encode<C> for Value {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        match self {
            Value::Coin(coin) => {
                e.encode_with(coin, ctx)?;
            }
            Value::Multiasset(coin, ma) => {
                e.array(2)?;
                e.encode_with(coin, ctx)?;
                e.encode_with(ma, ctx)?;
            }
        }

        Ok(())
    }
}

impl<'b, C> minicbor::Decode<'b, C> for Value {
    fn decode(d: &mut minicbor::Decoder<'b>, ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
        match d.datatype()? {
            Type::U8 | Type::U16 | Type::U32 | Type::U64 => Ok(Value::Coin(d.decode_with(ctx)?)),
            Type::Array | Type::ArrayIndef => {
                let tuple = Tuple::begin(d, "Value")?;
                tuple.arity(2)?;
                let coin = d.decode_with(ctx)?;
                let multiasset = d.decode_with(ctx)?;
                tuple.end(d)?;

                Ok(Value::Multiasset(coin, multiasset))
            }
            t => Err(minicbor::decode::Error::message(format!(
                "Value: unexpected cbor type {t}"
            ))
            .at(d.position())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Fragment, Hash};
    use proptest::prelude::*;

    fn policy(n: u8) -> PolicyId {
        Hash::new([n; 28])
    }

    fn asset(name: &str) -> AssetName {
        AssetName::new(name.as_bytes()).unwrap()
    }

    fn coin(n: u64) -> PositiveCoin {
        PositiveCoin::new(n).unwrap()
    }

    // a value can have zero coins and omit the multiasset
    #[test]
    fn decode_zero_value() {
        assert_eq!(Value::from_cbor_hex("00").unwrap(), Value::Coin(0));
    }

    #[test]
    fn reject_empty_multiasset() {
        let err = Value::from_cbor_hex("8200a0").unwrap_err();
        assert!(err.to_string().contains("Multiasset: must not be empty"));

        assert!(Value::from_cbor_hex("9f00a0ff").is_err());
    }

    #[test]
    fn permit_indefinite_value() {
        let hex = format!("9f00a1581c{}a1400aff", "00".repeat(28));
        let value = Value::from_cbor_hex(&hex).unwrap();

        assert_eq!(value.coin(), 0);
        assert_eq!(
            value.assets().unwrap().get(&policy(0), &asset("")),
            Some(&coin(10))
        );
    }

    // the asset sub-map of a policy map in a multiasset must not be empty
    #[test]
    fn reject_null_tokens() {
        let hex = format!("8200a1581c{}a0", "00".repeat(28));
        let err = Value::from_cbor_hex(&hex).unwrap_err();

        assert!(err.to_string().contains("must not be empty"));
        assert!(Mint::from_cbor_hex(&hex[4..]).is_err());
    }

    // the asset sub-map of a policy map in a multiasset must not have any zero values
    #[test]
    fn reject_zero_tokens() {
        let hex = format!("8200a1581c{}a14000", "00".repeat(28));
        let err = Value::from_cbor_hex(&hex).unwrap_err();

        assert!(err.to_string().contains("positive coin must not be zero"));

        let mint = format!("a1581c{}a14000", "00".repeat(28));
        assert!(Mint::from_cbor_hex(&mint).is_err());
    }

    // the ledger rejects bundles that are "too big" as defined by
    // `isMultiAssetSmallEnough`
    #[test]
    fn multiasset_not_too_big() {
        // 1500 policies with one asset each, 1500 * (44 + 28) > 65535
        let mut s: String = "b905dc".to_owned();
        for i in 0..1500u16 {
            s += "581c0000000000000000000000000000000000000000000000000000";
            s += &hex::encode(i.to_be_bytes());
            s += "a14001";
        }

        let err = Mint::from_cbor_hex(&s).unwrap_err();
        assert!(err.to_string().contains("must not exceed size limit"));
    }

    #[test]
    fn mint_accepts_negative_amounts() {
        let hex = format!("a1581c{}a1416120", "00".repeat(28));
        let mint = Mint::from_cbor_hex(&hex).unwrap();

        assert_eq!(
            mint.get(&policy(0), &asset("a")).map(|x| x.get()),
            Some(-1)
        );
        assert_eq!(mint.to_cbor_hex().unwrap(), hex);
    }

    #[test]
    fn multiasset_keeps_wire_order() {
        // assets "b" then "aa", not in canonical order
        let hex = format!("a1581c{}a241620142616102", "00".repeat(28));
        let ma = Multiasset::<PositiveCoin>::from_cbor_hex(&hex).unwrap();

        assert_eq!(ma.to_cbor_hex().unwrap(), hex);
        assert_eq!(
            ma.iter().map(|(_, name, _)| name.clone()).collect::<Vec<_>>(),
            vec![asset("b"), asset("aa")]
        );

        let mut sorted = Multiasset::singleton(policy(0), asset("aa"), coin(2));
        sorted.add(policy(0), asset("b"), coin(1)).unwrap();
        assert_eq!(sorted, ma);
        assert_ne!(sorted.to_cbor_hex().unwrap(), hex);

        // an indefinite policy map stays indefinite
        let hex = format!("bf581c{}a1410101ff", "00".repeat(28));
        let ma = Multiasset::<PositiveCoin>::from_cbor_hex(&hex).unwrap();
        assert_eq!(ma.to_cbor_hex().unwrap(), hex);
    }

    #[test]
    fn multiasset_rejects_duplicates() {
        let hex = format!("a1581c{}a2416101416102", "00".repeat(28));
        let err = Multiasset::<PositiveCoin>::from_cbor_hex(&hex).unwrap_err();
        assert!(err.to_string().contains("duplicate asset"));

        let hex = format!("a2581c{}a1416101581c{}a1416102", "00".repeat(28), "00".repeat(28));
        let err = Multiasset::<PositiveCoin>::from_cbor_hex(&hex).unwrap_err();
        assert!(err.to_string().contains("duplicate policy"));
    }

    #[test]
    fn add_creates_and_accumulates() {
        let mut ma = Multiasset::singleton(policy(1), asset("a"), coin(5));
        ma.add(policy(1), asset("a"), coin(7)).unwrap();
        ma.add(policy(1), asset("b"), coin(1)).unwrap();
        ma.add(policy(2), asset("a"), coin(2)).unwrap();

        assert_eq!(ma.get(&policy(1), &asset("a")), Some(&coin(12)));
        assert_eq!(ma.len(), 3);
        assert_eq!(ma.policies().count(), 2);
    }

    #[test]
    fn add_reports_overflow() {
        let mut ma = Multiasset::singleton(policy(1), asset("a"), coin(u64::MAX));

        assert_eq!(
            ma.add(policy(1), asset("a"), coin(1)),
            Err(Error::AssetOverflow {
                policy: policy(1),
                asset: asset("a")
            })
        );
    }

    #[test]
    fn subtract_drops_exhausted_entries() {
        let mut a = Multiasset::singleton(policy(1), asset("a"), coin(5));
        a.add(policy(1), asset("b"), coin(3)).unwrap();
        a.add(policy(2), asset("c"), coin(4)).unwrap();

        let mut b = Multiasset::singleton(policy(1), asset("a"), coin(9));
        b.add(policy(2), asset("c"), coin(1)).unwrap();
        b.add(policy(3), asset("z"), coin(1)).unwrap();

        let diff = a.subtract(&b).unwrap();

        assert_eq!(diff.get(&policy(1), &asset("a")), None);
        assert_eq!(diff.get(&policy(1), &asset("b")), Some(&coin(3)));
        assert_eq!(diff.get(&policy(2), &asset("c")), Some(&coin(3)));
        assert_eq!(diff.len(), 2);
    }

    #[test]
    fn subtract_to_nothing_fails() {
        let a = Multiasset::singleton(policy(1), asset("a"), coin(5));
        assert_eq!(a.subtract(&a), Err(Error::EmptyMultiasset));
    }

    #[test]
    fn from_map_rejects_empty_parts() {
        assert_eq!(
            Multiasset::<PositiveCoin>::from_map(BTreeMap::new()),
            Err(Error::EmptyMultiasset)
        );
        assert_eq!(
            Multiasset::<PositiveCoin>::from_map(BTreeMap::from([(policy(1), BTreeMap::new())])),
            Err(Error::EmptyMultiasset)
        );
    }

    #[test]
    fn value_arithmetic() {
        let a = Value::Multiasset(10, Multiasset::singleton(policy(1), asset("a"), coin(5)));
        let b = Value::Multiasset(4, Multiasset::singleton(policy(1), asset("a"), coin(5)));

        assert_eq!(a.checked_sub(&b).unwrap(), Value::Coin(6));
        assert_eq!(
            a.add(&Value::Coin(1)).unwrap(),
            Value::Multiasset(11, Multiasset::singleton(policy(1), asset("a"), coin(5)))
        );
        assert_eq!(b.checked_sub(&a), Err(Error::CoinOverflow));
    }

    #[test]
    fn serde_rejects_empty_bundles() {
        let ma = Multiasset::singleton(policy(1), asset("a"), coin(5));
        let json = serde_json::to_string(&ma).unwrap();
        let back: Multiasset<PositiveCoin> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ma);

        let empty: Result<Multiasset<PositiveCoin>, _> = serde_json::from_str("{}");
        assert!(empty.is_err());
    }

    prop_compose! {
        fn any_multiasset()(
            entries in prop::collection::vec((0u8..4, 0u8..4, 1u64..1_000_000), 1..8),
        ) -> Multiasset<PositiveCoin> {
            let (p, a, x) = entries[0];
            let mut ma = Multiasset::singleton(policy(p), asset(&a.to_string()), coin(x));
            for (p, a, x) in entries.into_iter().skip(1) {
                ma.add(policy(p), asset(&a.to_string()), coin(x)).unwrap();
            }
            ma
        }
    }

    proptest! {
        #[test]
        fn subtract_never_leaves_empty_parts(a in any_multiasset(), b in any_multiasset()) {
            match a.subtract(&b) {
                Ok(diff) => {
                    prop_assert!(diff.to_map().values().all(|assets| !assets.is_empty()));
                    prop_assert!(diff.len() > 0);
                }
                Err(e) => prop_assert_eq!(e, Error::EmptyMultiasset),
            }
        }

        #[test]
        fn merge_then_subtract_restores(a in any_multiasset(), b in any_multiasset()) {
            let merged = a.clone().merge(&b).unwrap();
            prop_assert_eq!(merged.subtract(&b).unwrap(), a);
        }

        #[test]
        fn multiasset_cbor_roundtrip(a in any_multiasset()) {
            let bytes = a.to_cbor_bytes().unwrap();
            prop_assert_eq!(Multiasset::<PositiveCoin>::from_cbor_bytes(&bytes).unwrap(), a);
        }
    }
}
