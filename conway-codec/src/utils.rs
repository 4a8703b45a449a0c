use minicbor::{
    data::{Tag, Type},
    Decode, Encode,
};
use serde::{Deserialize, Serialize};
use std::{fmt, num::NonZeroU64, ops::Deref};

use crate::DEFAULT_MAX_DEPTH;

/// CBOR tag used by the ledger to mark set-like arrays
pub const SET_TAG: u64 = 258;

/// CBOR tag for an embedded cbor data item (RFC 8949 §3.4.5.1)
pub const ENCODED_CBOR_TAG: u64 = 24;

fn expect_tag(d: &mut minicbor::Decoder<'_>, expected: u64) -> Result<(), minicbor::decode::Error> {
    let position = d.position();
    let tag = d.tag()?;

    if tag.as_u64() != expected {
        return Err(minicbor::decode::Error::message(format!(
            "expected cbor tag {expected}, found {}",
            tag.as_u64()
        ))
        .at(position));
    }

    Ok(())
}

/// Custom collection to ensure ordered pairs of values
///
/// Since the ordering of the entries requires a particular order to maintain
/// canonicalization for isomorphic decoding / encoding operators, we use a Vec
/// as the underlaying struct for storage of the items (as opposed to a BTreeMap
/// or HashMap).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(from = "Vec::<(K, V)>", into = "Vec::<(K, V)>")]
pub enum KeyValuePairs<K, V>
where
    K: Clone,
    V: Clone,
{
    Def(Vec<(K, V)>),
    Indef(Vec<(K, V)>),
}

impl<K, V> KeyValuePairs<K, V>
where
    K: Clone,
    V: Clone,
{
    pub fn to_vec(self) -> Vec<(K, V)> {
        self.into()
    }
}

impl<K, V> From<KeyValuePairs<K, V>> for Vec<(K, V)>
where
    K: Clone,
    V: Clone,
{
    fn from(other: KeyValuePairs<K, V>) -> Self {
        match other {
            KeyValuePairs::Def(x) => x,
            KeyValuePairs::Indef(x) => x,
        }
    }
}

impl<K, V> From<Vec<(K, V)>> for KeyValuePairs<K, V>
where
    K: Clone,
    V: Clone,
{
    fn from(other: Vec<(K, V)>) -> Self {
        KeyValuePairs::Def(other)
    }
}

impl<K, V> Deref for KeyValuePairs<K, V>
where
    K: Clone,
    V: Clone,
{
    type Target = Vec<(K, V)>;

    fn deref(&self) -> &Self::Target {
        match self {
            KeyValuePairs::Def(x) => x,
            KeyValuePairs::Indef(x) => x,
        }
    }
}

impl<'b, C, K, V> minicbor::decode::Decode<'b, C> for KeyValuePairs<K, V>
where
    K: Decode<'b, C> + Clone,
    V: Decode<'b, C> + Clone,
{
    fn decode(d: &mut minicbor::Decoder<'b>, ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
        let datatype = d.datatype()?;

        let items: Result<Vec<_>, _> = d.map_iter_with::<C, K, V>(ctx)?.collect();
        let items = items?;

        match datatype {
            Type::Map => Ok(KeyValuePairs::Def(items)),
            Type::MapIndef => Ok(KeyValuePairs::Indef(items)),
            _ => Err(minicbor::decode::Error::message(
                "invalid data type for keyvaluepairs",
            )),
        }
    }
}

fn encode_pairs<C, K, V, W>(
    pairs: &[(K, V)],
    indefinite: bool,
    e: &mut minicbor::Encoder<W>,
    ctx: &mut C,
) -> Result<(), minicbor::encode::Error<W::Error>>
where
    K: Encode<C>,
    V: Encode<C>,
    W: minicbor::encode::Write,
{
    if indefinite {
        e.begin_map()?;
    } else {
        e.map(pairs.len() as u64)?;
    }

    for (k, v) in pairs {
        k.encode(e, ctx)?;
        v.encode(e, ctx)?;
    }

    if indefinite {
        e.end()?;
    }

    Ok(())
}

impl<C, K, V> minicbor::encode::Encode<C> for KeyValuePairs<K, V>
where
    K: Encode<C> + Clone,
    V: Encode<C> + Clone,
{
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        match self {
            KeyValuePairs::Def(x) => encode_pairs(x, false, e, ctx),
            KeyValuePairs::Indef(x) => encode_pairs(x, true, e, ctx),
        }
    }
}

/// Same as [`KeyValuePairs`] but it can never be empty
///
/// Values are only built through [`NonEmptyKeyValuePairs::from_vec`] or by
/// decoding, both of which reject an empty map.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "Vec::<(K, V)>", into = "Vec::<(K, V)>")]
pub enum NonEmptyKeyValuePairs<K, V>
where
    K: Clone,
    V: Clone,
{
    Def(Vec<(K, V)>),
    Indef(Vec<(K, V)>),
}

impl<K, V> NonEmptyKeyValuePairs<K, V>
where
    K: Clone,
    V: Clone,
{
    pub fn from_vec(x: Vec<(K, V)>) -> Option<Self> {
        if x.is_empty() {
            None
        } else {
            Some(NonEmptyKeyValuePairs::Def(x))
        }
    }

    pub fn to_vec(self) -> Vec<(K, V)> {
        self.into()
    }
}

impl<K, V> From<NonEmptyKeyValuePairs<K, V>> for Vec<(K, V)>
where
    K: Clone,
    V: Clone,
{
    fn from(other: NonEmptyKeyValuePairs<K, V>) -> Self {
        match other {
            NonEmptyKeyValuePairs::Def(x) => x,
            NonEmptyKeyValuePairs::Indef(x) => x,
        }
    }
}

impl<K, V> TryFrom<Vec<(K, V)>> for NonEmptyKeyValuePairs<K, V>
where
    K: Clone,
    V: Clone,
{
    type Error = String;

    fn try_from(value: Vec<(K, V)>) -> Result<Self, Self::Error> {
        Self::from_vec(value).ok_or_else(|| "map must not be empty".to_string())
    }
}

impl<K, V> Deref for NonEmptyKeyValuePairs<K, V>
where
    K: Clone,
    V: Clone,
{
    type Target = Vec<(K, V)>;

    fn deref(&self) -> &Self::Target {
        match self {
            NonEmptyKeyValuePairs::Def(x) => x,
            NonEmptyKeyValuePairs::Indef(x) => x,
        }
    }
}

impl<'b, C, K, V> minicbor::decode::Decode<'b, C> for NonEmptyKeyValuePairs<K, V>
where
    K: Decode<'b, C> + Clone,
    V: Decode<'b, C> + Clone,
{
    fn decode(d: &mut minicbor::Decoder<'b>, ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
        let position = d.position();

        let inner: KeyValuePairs<K, V> = d.decode_with(ctx)?;

        if inner.is_empty() {
            return Err(
                minicbor::decode::Error::message("decoding empty map as NonEmptyKeyValuePairs")
                    .at(position),
            );
        }

        Ok(match inner {
            KeyValuePairs::Def(x) => Self::Def(x),
            KeyValuePairs::Indef(x) => Self::Indef(x),
        })
    }
}

impl<C, K, V> minicbor::encode::Encode<C> for NonEmptyKeyValuePairs<K, V>
where
    K: Encode<C> + Clone,
    V: Encode<C> + Clone,
{
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        match self {
            NonEmptyKeyValuePairs::Def(x) => encode_pairs(x, false, e, ctx),
            NonEmptyKeyValuePairs::Indef(x) => encode_pairs(x, true, e, ctx),
        }
    }
}

/// A struct that maintains a reference to whether a cbor array was indef or not
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Hash)]
#[serde(from = "Vec::<A>", into = "Vec::<A>")]
pub enum MaybeIndefArray<A: Clone> {
    Def(Vec<A>),
    Indef(Vec<A>),
}

impl<A: Clone> MaybeIndefArray<A> {
    pub fn to_vec(self) -> Vec<A> {
        self.into()
    }
}

impl<A: Clone> Deref for MaybeIndefArray<A> {
    type Target = Vec<A>;

    fn deref(&self) -> &Self::Target {
        match self {
            MaybeIndefArray::Def(x) => x,
            MaybeIndefArray::Indef(x) => x,
        }
    }
}

impl<A: Clone> From<MaybeIndefArray<A>> for Vec<A> {
    fn from(other: MaybeIndefArray<A>) -> Self {
        match other {
            MaybeIndefArray::Def(x) => x,
            MaybeIndefArray::Indef(x) => x,
        }
    }
}

impl<A: Clone> From<Vec<A>> for MaybeIndefArray<A> {
    fn from(other: Vec<A>) -> Self {
        MaybeIndefArray::Def(other)
    }
}

impl<'b, C, A> minicbor::decode::Decode<'b, C> for MaybeIndefArray<A>
where
    A: minicbor::decode::Decode<'b, C> + Clone,
{
    fn decode(d: &mut minicbor::Decoder<'b>, ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
        let datatype = d.datatype()?;

        match datatype {
            Type::Array => Ok(Self::Def(d.decode_with(ctx)?)),
            Type::ArrayIndef => Ok(Self::Indef(d.decode_with(ctx)?)),
            _ => Err(minicbor::decode::Error::message(
                "unknown data type of maybe indef array",
            )),
        }
    }
}

impl<C, A> minicbor::encode::Encode<C> for MaybeIndefArray<A>
where
    A: minicbor::encode::Encode<C> + Clone,
{
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        match self {
            MaybeIndefArray::Def(x) => {
                e.encode_with(x, ctx)?;
            }
            MaybeIndefArray::Indef(x) => {
                e.begin_array()?;

                for v in x.iter() {
                    e.encode_with(v, ctx)?;
                }

                e.end()?;
            }
        };

        Ok(())
    }
}

/// How a set arrived on the wire, kept so it can be written back unchanged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SetFraming {
    tagged: bool,
    indefinite: bool,
}

impl SetFraming {
    const PREFERRED: Self = Self {
        tagged: true,
        indefinite: false,
    };
}

fn decode_set_items<'b, C, T>(
    d: &mut minicbor::Decoder<'b>,
    ctx: &mut C,
) -> Result<(Vec<T>, SetFraming), minicbor::decode::Error>
where
    T: Decode<'b, C> + Clone,
{
    let tagged = matches!(d.datatype()?, Type::Tag);

    if tagged {
        expect_tag(d, SET_TAG)?;
    }

    let (items, indefinite) = match d.decode_with(ctx)? {
        MaybeIndefArray::Def(items) => (items, false),
        MaybeIndefArray::Indef(items) => (items, true),
    };

    Ok((items, SetFraming { tagged, indefinite }))
}

fn encode_set_items<C, T, W>(
    items: &[T],
    framing: SetFraming,
    e: &mut minicbor::Encoder<W>,
    ctx: &mut C,
) -> Result<(), minicbor::encode::Error<W::Error>>
where
    T: Encode<C>,
    W: minicbor::encode::Write,
{
    if framing.tagged {
        e.tag(Tag::new(SET_TAG))?;
    }

    if framing.indefinite {
        e.begin_array()?;
    } else {
        e.array(items.len() as u64)?;
    }

    for item in items {
        item.encode(e, ctx)?;
    }

    if framing.indefinite {
        e.end()?;
    }

    Ok(())
}

/// Set semantics on the wire: `#6.258([* a]) / [* a]`
///
/// Whether the tag was present, and whether the array was of indefinite length,
/// is remembered so that received data is written back the way it came. Values
/// built locally are tagged definite arrays, which is what the Conway CDDL
/// prefers. Equality only looks at the elements.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(from = "Vec::<T>", into = "Vec::<T>")]
pub struct Set<T: Clone> {
    items: Vec<T>,
    framing: SetFraming,
}

impl<T: Clone> Set<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            framing: SetFraming::PREFERRED,
        }
    }

    /// A set written as a bare array, as pre-Conway eras do
    pub fn untagged(items: Vec<T>) -> Self {
        Self {
            items,
            framing: SetFraming {
                tagged: false,
                indefinite: false,
            },
        }
    }

    pub fn is_tagged(&self) -> bool {
        self.framing.tagged
    }

    pub fn is_indefinite(&self) -> bool {
        self.framing.indefinite
    }

    pub fn to_vec(self) -> Vec<T> {
        self.items
    }
}

impl<T: Clone + PartialEq> PartialEq for Set<T> {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl<T: Clone + Eq> Eq for Set<T> {}

impl<T: Clone> Deref for Set<T> {
    type Target = Vec<T>;

    fn deref(&self) -> &Self::Target {
        &self.items
    }
}

impl<T: Clone> From<Vec<T>> for Set<T> {
    fn from(value: Vec<T>) -> Self {
        Set::new(value)
    }
}

impl<T: Clone> From<Set<T>> for Vec<T> {
    fn from(value: Set<T>) -> Self {
        value.items
    }
}

impl<'a, T: Clone> IntoIterator for &'a Set<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<'b, C, T> minicbor::decode::Decode<'b, C> for Set<T>
where
    T: Decode<'b, C> + Clone,
{
    fn decode(d: &mut minicbor::Decoder<'b>, ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
        let (items, framing) = decode_set_items(d, ctx)?;
        Ok(Self { items, framing })
    }
}

impl<C, T> minicbor::encode::Encode<C> for Set<T>
where
    T: Encode<C> + Clone,
{
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        encode_set_items(&self.items, self.framing, e, ctx)
    }
}

/// A [`Set`] holding at least one element: `#6.258([+ a]) / [+ a]`
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(try_from = "Vec::<T>", into = "Vec::<T>")]
pub struct NonEmptySet<T: Clone> {
    items: Vec<T>,
    framing: SetFraming,
}

impl<T: Clone> NonEmptySet<T> {
    pub fn from_vec(items: Vec<T>) -> Option<Self> {
        if items.is_empty() {
            None
        } else {
            Some(Self {
                items,
                framing: SetFraming::PREFERRED,
            })
        }
    }

    pub fn is_tagged(&self) -> bool {
        self.framing.tagged
    }

    pub fn is_indefinite(&self) -> bool {
        self.framing.indefinite
    }

    pub fn to_vec(self) -> Vec<T> {
        self.items
    }
}

impl<T: Clone + PartialEq> PartialEq for NonEmptySet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl<T: Clone + Eq> Eq for NonEmptySet<T> {}

impl<T: Clone> Deref for NonEmptySet<T> {
    type Target = Vec<T>;

    fn deref(&self) -> &Self::Target {
        &self.items
    }
}

impl<T: Clone> TryFrom<Vec<T>> for NonEmptySet<T> {
    type Error = String;

    fn try_from(value: Vec<T>) -> Result<Self, Self::Error> {
        Self::from_vec(value).ok_or_else(|| "set must not be empty".to_string())
    }
}

impl<T: Clone> From<NonEmptySet<T>> for Vec<T> {
    fn from(value: NonEmptySet<T>) -> Self {
        value.items
    }
}

impl<'a, T: Clone> IntoIterator for &'a NonEmptySet<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<'b, C, T> minicbor::decode::Decode<'b, C> for NonEmptySet<T>
where
    T: Decode<'b, C> + Clone,
{
    fn decode(d: &mut minicbor::Decoder<'b>, ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
        let position = d.position();
        let (items, framing) = decode_set_items(d, ctx)?;

        if items.is_empty() {
            return Err(
                minicbor::decode::Error::message("decoding empty set as NonEmptySet").at(position),
            );
        }

        Ok(Self { items, framing })
    }
}

impl<C, T> minicbor::encode::Encode<C> for NonEmptySet<T>
where
    T: Encode<C> + Clone,
{
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        encode_set_items(&self.items, self.framing, e, ctx)
    }
}

/// Decoded value that keeps the exact bytes it was read from
///
/// Encoding writes those bytes back untouched, so hashes and signatures over
/// received data stay valid even when the bytes aren't how this crate would
/// have written them. Values built locally are encoded once by [`KeepRaw::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeepRaw<T> {
    raw: Vec<u8>,
    inner: T,
}

impl<T> KeepRaw<T> {
    pub fn new(inner: T) -> Result<Self, minicbor::encode::Error<std::convert::Infallible>>
    where
        T: Encode<()>,
    {
        let raw = minicbor::to_vec(&inner)?;
        Ok(Self { raw, inner })
    }

    pub fn raw_cbor(&self) -> &[u8] {
        &self.raw
    }

    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T> Deref for KeepRaw<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<'b, C, T> minicbor::Decode<'b, C> for KeepRaw<T>
where
    T: minicbor::Decode<'b, C>,
{
    fn decode(d: &mut minicbor::Decoder<'b>, ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
        let all = d.input();
        let start = d.position();
        let inner: T = d.decode_with(ctx)?;
        let end = d.position();

        Ok(Self {
            raw: all[start..end].to_vec(),
            inner,
        })
    }
}

impl<C, T> minicbor::Encode<C> for KeepRaw<T> {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        e.writer_mut()
            .write_all(&self.raw)
            .map_err(minicbor::encode::Error::write)
    }
}

impl<T: Serialize> Serialize for KeepRaw<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.inner.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for KeepRaw<T>
where
    T: Deserialize<'de> + Encode<()>,
{
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let inner = T::deserialize(deserializer)?;
        KeepRaw::new(inner).map_err(serde::de::Error::custom)
    }
}

/// Wraps a struct so that it is encoded/decoded as a cbor bytes
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, PartialOrd)]
#[serde(transparent)]
pub struct CborWrap<T>(pub T);

impl<'b, C, T> minicbor::Decode<'b, C> for CborWrap<T>
where
    T: minicbor::Decode<'b, C>,
{
    fn decode(d: &mut minicbor::Decoder<'b>, ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
        expect_tag(d, ENCODED_CBOR_TAG)?;

        let position = d.position();
        let cbor = d.bytes()?;

        let invalid = |reason: String| {
            minicbor::decode::Error::message(format!("invalid embedded cbor: {reason}")).at(position)
        };

        // the payload is a fresh item, the outer depth check never saw inside it
        crate::scan::check_nesting(cbor, DEFAULT_MAX_DEPTH).map_err(|e| invalid(e.to_string()))?;

        let mut inner = minicbor::Decoder::new(cbor);
        let wrapped = inner.decode_with(ctx).map_err(|e| invalid(e.to_string()))?;

        if inner.position() != cbor.len() {
            return Err(invalid(format!(
                "{} trailing bytes",
                cbor.len() - inner.position()
            )));
        }

        Ok(CborWrap(wrapped))
    }
}

impl<C, T> minicbor::Encode<C> for CborWrap<T>
where
    T: minicbor::Encode<C>,
{
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        let buf = minicbor::to_vec_with(&self.0, ctx).map_err(|_| {
            minicbor::encode::Error::message("error encoding cbor-wrapped structure")
        })?;

        e.tag(Tag::new(ENCODED_CBOR_TAG))?;
        e.bytes(&buf)?;

        Ok(())
    }
}

impl<T> Deref for CborWrap<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// A value preceded by the semantic tag `T`, decoding fails on any other tag
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct TagWrap<I, const T: u64>(pub I);

impl<I, const T: u64> TagWrap<I, T> {
    pub fn new(inner: I) -> Self {
        TagWrap(inner)
    }
}

impl<'b, C, I, const T: u64> minicbor::Decode<'b, C> for TagWrap<I, T>
where
    I: minicbor::Decode<'b, C>,
{
    fn decode(d: &mut minicbor::Decoder<'b>, ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
        expect_tag(d, T)?;

        Ok(TagWrap(d.decode_with(ctx)?))
    }
}

impl<C, I, const T: u64> minicbor::Encode<C> for TagWrap<I, T>
where
    I: minicbor::Encode<C>,
{
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        e.tag(Tag::new(T))?;
        e.encode_with(&self.0, ctx)?;

        Ok(())
    }
}

impl<I, const T: u64> Deref for TagWrap<I, T> {
    type Target = I;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(from = "Option::<T>", into = "Option::<T>")]
pub enum Nullable<T>
where
    T: std::clone::Clone,
{
    Some(T),
    Null,
    Undefined,
}

impl<T> Nullable<T>
where
    T: std::clone::Clone,
{
    pub fn map<F, O>(self, f: F) -> Nullable<O>
    where
        O: std::clone::Clone,
        F: Fn(T) -> O,
    {
        match self {
            Nullable::Some(x) => Nullable::Some(f(x)),
            Nullable::Null => Nullable::Null,
            Nullable::Undefined => Nullable::Undefined,
        }
    }

    pub fn as_option(&self) -> Option<&T> {
        match self {
            Nullable::Some(x) => Some(x),
            _ => None,
        }
    }
}

impl<'b, C, T> minicbor::Decode<'b, C> for Nullable<T>
where
    T: minicbor::Decode<'b, C> + std::clone::Clone,
{
    fn decode(d: &mut minicbor::Decoder<'b>, ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
        match d.datatype()? {
            Type::Null => {
                d.null()?;
                Ok(Self::Null)
            }
            Type::Undefined => {
                d.undefined()?;
                Ok(Self::Undefined)
            }
            _ => {
                let x = d.decode_with(ctx)?;
                Ok(Self::Some(x))
            }
        }
    }
}

impl<C, T> minicbor::Encode<C> for Nullable<T>
where
    T: minicbor::Encode<C> + std::clone::Clone,
{
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        match self {
            Nullable::Some(x) => {
                e.encode_with(x, ctx)?;
            }
            Nullable::Null => {
                e.null()?;
            }
            Nullable::Undefined => {
                e.undefined()?;
            }
        }

        Ok(())
    }
}

impl<T> From<Option<T>> for Nullable<T>
where
    T: std::clone::Clone,
{
    fn from(x: Option<T>) -> Self {
        match x {
            Some(x) => Nullable::Some(x),
            None => Nullable::Null,
        }
    }
}

impl<T> From<Nullable<T>> for Option<T>
where
    T: std::clone::Clone,
{
    fn from(other: Nullable<T>) -> Self {
        match other {
            Nullable::Some(x) => Some(x),
            _ => None,
        }
    }
}

#[derive(
    Serialize, Deserialize, Clone, Encode, Decode, Debug, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[cbor(transparent)]
#[serde(into = "String")]
#[serde(try_from = "String")]
pub struct Bytes(#[n(0)] minicbor::bytes::ByteVec);

impl From<Vec<u8>> for Bytes {
    fn from(xs: Vec<u8>) -> Self {
        Bytes(minicbor::bytes::ByteVec::from(xs))
    }
}

impl From<Bytes> for Vec<u8> {
    fn from(b: Bytes) -> Self {
        b.0.into()
    }
}

impl Deref for Bytes {
    type Target = Vec<u8>;

    fn deref(&self) -> &Self::Target {
        self.0.deref()
    }
}

impl TryFrom<String> for Bytes {
    type Error = hex::FromHexError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let v = hex::decode(value)?;
        Ok(Bytes(minicbor::bytes::ByteVec::from(v)))
    }
}

impl From<Bytes> for String {
    fn from(b: Bytes) -> Self {
        hex::encode(b.deref())
    }
}

impl fmt::Display for Bytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.deref()))
    }
}

#[derive(
    Serialize, Deserialize, Clone, Copy, Encode, Decode, Debug, PartialEq, Eq, PartialOrd, Ord,
)]
#[cbor(transparent)]
#[serde(into = "i128")]
#[serde(try_from = "i128")]
pub struct Int(#[n(0)] pub minicbor::data::Int);

impl Deref for Int {
    type Target = minicbor::data::Int;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Int> for i128 {
    fn from(value: Int) -> Self {
        i128::from(value.0)
    }
}

impl From<i64> for Int {
    fn from(x: i64) -> Self {
        let inner = minicbor::data::Int::from(x);
        Self(inner)
    }
}

impl TryFrom<i128> for Int {
    type Error = minicbor::data::TryFromIntError;

    fn try_from(value: i128) -> Result<Self, Self::Error> {
        let inner = minicbor::data::Int::try_from(value)?;
        Ok(Self(inner))
    }
}

/// A coin amount strictly greater than zero
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(into = "u64", try_from = "u64")]
pub struct PositiveCoin(NonZeroU64);

impl PositiveCoin {
    pub fn new(value: u64) -> Option<Self> {
        NonZeroU64::new(value).map(Self)
    }

    pub fn get(&self) -> u64 {
        self.0.get()
    }
}

impl TryFrom<u64> for PositiveCoin {
    type Error = String;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| "positive coin must be greater than zero".to_string())
    }
}

impl From<PositiveCoin> for u64 {
    fn from(value: PositiveCoin) -> Self {
        value.get()
    }
}

impl From<&PositiveCoin> for u64 {
    fn from(value: &PositiveCoin) -> Self {
        value.get()
    }
}

impl fmt::Display for PositiveCoin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl<'b, C> minicbor::Decode<'b, C> for PositiveCoin {
    fn decode(d: &mut minicbor::Decoder<'b>, _ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
        let position = d.position();
        let value = d.u64()?;

        Self::new(value).ok_or_else(|| {
            minicbor::decode::Error::message("positive coin must not be zero").at(position)
        })
    }
}

impl<C> minicbor::Encode<C> for PositiveCoin {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        e.u64(self.get())?;
        Ok(())
    }
}

/// A signed 64-bit integer that is never zero
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(into = "i64", try_from = "i64")]
pub struct NonZeroInt(i64);

impl NonZeroInt {
    pub fn new(value: i64) -> Option<Self> {
        if value == 0 {
            None
        } else {
            Some(Self(value))
        }
    }

    pub fn get(&self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for NonZeroInt {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| "non-zero int must not be zero".to_string())
    }
}

impl From<NonZeroInt> for i64 {
    fn from(value: NonZeroInt) -> Self {
        value.0
    }
}

impl fmt::Display for NonZeroInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl<'b, C> minicbor::Decode<'b, C> for NonZeroInt {
    fn decode(d: &mut minicbor::Decoder<'b>, _ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
        let position = d.position();
        let value = d.i64()?;

        Self::new(value).ok_or_else(|| {
            minicbor::decode::Error::message("non-zero int must not be zero").at(position)
        })
    }
}

impl<C> minicbor::Encode<C> for NonZeroInt {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        e.i64(self.0)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn set_remembers_tag() {
        let tagged = hex::decode("d90102820102").unwrap();
        let bare = hex::decode("820102").unwrap();

        let a: Set<u64> = minicbor::decode(&tagged).unwrap();
        let b: Set<u64> = minicbor::decode(&bare).unwrap();

        assert!(a.is_tagged());
        assert!(!b.is_tagged());
        assert_eq!(a, b);

        assert_eq!(minicbor::to_vec(&a).unwrap(), tagged);
        assert_eq!(minicbor::to_vec(&b).unwrap(), bare);
    }

    #[test]
    fn set_remembers_indefinite_framing() {
        let tagged = hex::decode("d901029f0102ff").unwrap();
        let bare = hex::decode("9f0102ff").unwrap();

        let a: Set<u64> = minicbor::decode(&tagged).unwrap();
        let b: Set<u64> = minicbor::decode(&bare).unwrap();

        assert!(a.is_tagged() && a.is_indefinite());
        assert!(!b.is_tagged() && b.is_indefinite());
        assert_eq!(a.as_slice(), &[1, 2]);

        assert_eq!(minicbor::to_vec(&a).unwrap(), tagged);
        assert_eq!(minicbor::to_vec(&b).unwrap(), bare);

        let non_empty: NonEmptySet<u64> = minicbor::decode(&tagged).unwrap();
        assert!(non_empty.is_indefinite());
        assert_eq!(minicbor::to_vec(&non_empty).unwrap(), tagged);

        let empty = hex::decode("d901029fff").unwrap();
        assert!(minicbor::decode::<NonEmptySet<u64>>(&empty).is_err());
    }

    #[test]
    fn new_sets_are_tagged() {
        let set = Set::from(vec![1u64]);
        assert_eq!(hex::encode(minicbor::to_vec(&set).unwrap()), "d901028101");
    }

    #[test]
    fn set_rejects_other_tags() {
        let cbor = hex::decode("d90103820102").unwrap();
        assert!(minicbor::decode::<Set<u64>>(&cbor).is_err());
    }

    #[test]
    fn non_empty_set_rejects_empty() {
        assert!(NonEmptySet::<u64>::from_vec(vec![]).is_none());

        let cbor = hex::decode("d9010280").unwrap();
        assert!(minicbor::decode::<NonEmptySet<u64>>(&cbor).is_err());

        let cbor = hex::decode("80").unwrap();
        assert!(minicbor::decode::<NonEmptySet<u64>>(&cbor).is_err());
    }

    #[test]
    fn non_empty_pairs_rejects_empty() {
        let cbor = hex::decode("a0").unwrap();
        assert!(minicbor::decode::<NonEmptyKeyValuePairs<u64, u64>>(&cbor).is_err());

        let cbor = hex::decode("bf0102ff").unwrap();
        let pairs: NonEmptyKeyValuePairs<u64, u64> = minicbor::decode(&cbor).unwrap();
        assert!(matches!(pairs, NonEmptyKeyValuePairs::Indef(_)));
        assert_eq!(minicbor::to_vec(&pairs).unwrap(), cbor);
    }

    #[test]
    fn maybe_indef_array_keeps_framing() {
        let cbor = hex::decode("9f0102ff").unwrap();
        let array: MaybeIndefArray<u64> = minicbor::decode(&cbor).unwrap();
        assert!(matches!(array, MaybeIndefArray::Indef(_)));
        assert_eq!(minicbor::to_vec(&array).unwrap(), cbor);
    }

    #[test]
    fn tag_wrap_checks_tag() {
        let cbor = hex::decode("d81e820102").unwrap();
        assert!(minicbor::decode::<TagWrap<(u64, u64), 30>>(&cbor).is_ok());
        assert!(minicbor::decode::<TagWrap<(u64, u64), 31>>(&cbor).is_err());
    }

    #[test]
    fn cbor_wrap_roundtrip() {
        let value = CborWrap(vec![1u64, 2]);
        let cbor = minicbor::to_vec(&value).unwrap();
        assert_eq!(hex::encode(&cbor), "d81843820102");

        let back: CborWrap<Vec<u64>> = minicbor::decode(&cbor).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn keep_raw_writes_received_bytes() {
        // a non-minimal head for 1, which a fresh encoding would shorten
        let cbor = hex::decode("82180102").unwrap();
        let kept: KeepRaw<Vec<u64>> = minicbor::decode(&cbor).unwrap();

        assert_eq!(*kept, vec![1, 2]);
        assert_eq!(kept.raw_cbor(), cbor.as_slice());
        assert_eq!(minicbor::to_vec(&kept).unwrap(), cbor);

        let fresh = KeepRaw::new(vec![1u64, 2]).unwrap();
        assert_eq!(fresh.raw_cbor(), hex::decode("820102").unwrap().as_slice());
        assert_eq!(fresh.into_inner(), vec![1, 2]);
    }

    #[test]
    fn cbor_wrap_rejects_trailing_payload_bytes() {
        // [1, 24(h'42cafe0102')], the payload holds h'cafe' followed by 01 02
        let cbor = hex::decode("8201d8184542cafe0102").unwrap();

        let err = minicbor::decode::<(u64, CborWrap<minicbor::bytes::ByteVec>)>(&cbor).unwrap_err();
        assert!(err.to_string().contains("2 trailing bytes"));
    }

    #[test]
    fn cbor_wrap_limits_payload_nesting() {
        let mut payload = vec![0x81; 1000];
        payload.push(0x00);

        let mut e = minicbor::Encoder::new(Vec::new());
        e.tag(Tag::new(ENCODED_CBOR_TAG)).unwrap();
        e.bytes(&payload).unwrap();
        let cbor = e.into_writer();

        let err = minicbor::decode::<CborWrap<crate::Cbor>>(&cbor).unwrap_err();
        assert!(err.to_string().contains("invalid embedded cbor"));

        let mut payload = vec![0x81; 10];
        payload.push(0x00);
        let mut e = minicbor::Encoder::new(Vec::new());
        e.tag(Tag::new(ENCODED_CBOR_TAG)).unwrap();
        e.bytes(&payload).unwrap();
        let cbor = e.into_writer();
        assert!(minicbor::decode::<CborWrap<crate::Cbor>>(&cbor).is_ok());
    }

    #[test_case("00", false ; "zero")]
    #[test_case("01", true ; "one")]
    #[test_case("1bffffffffffffffff", true ; "max")]
    #[test_case("20", false ; "negative")]
    fn positive_coin_decoding(hex: &str, ok: bool) {
        let cbor = hex::decode(hex).unwrap();
        assert_eq!(minicbor::decode::<PositiveCoin>(&cbor).is_ok(), ok);
    }

    #[test_case("00", false ; "zero")]
    #[test_case("01", true ; "one")]
    #[test_case("20", true ; "minus one")]
    #[test_case("3b7fffffffffffffff", true ; "i64 min")]
    #[test_case("1b8000000000000000", false ; "above i64 max")]
    fn non_zero_int_decoding(hex: &str, ok: bool) {
        let cbor = hex::decode(hex).unwrap();
        assert_eq!(minicbor::decode::<NonZeroInt>(&cbor).is_ok(), ok);
    }

    #[test]
    fn positive_coin_serde() {
        let coin: PositiveCoin = serde_json::from_str("5").unwrap();
        assert_eq!(coin.get(), 5);
        assert!(serde_json::from_str::<PositiveCoin>("0").is_err());
    }

    #[test]
    fn nullable_roundtrip() {
        let null: Nullable<u64> = minicbor::decode(&[0xf6]).unwrap();
        assert_eq!(null, Nullable::Null);

        let undefined: Nullable<u64> = minicbor::decode(&[0xf7]).unwrap();
        assert_eq!(minicbor::to_vec(&undefined).unwrap(), vec![0xf7]);
    }
}
