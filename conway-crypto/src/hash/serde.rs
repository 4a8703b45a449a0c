//! Digests are hex strings in human readable formats and raw bytes elsewhere

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::Hash;

impl<const BYTES: usize> Serialize for Hash<BYTES> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_hex())
        } else {
            serializer.serialize_bytes(self.as_ref())
        }
    }
}

struct Digest<const BYTES: usize>;

impl<'de, const BYTES: usize> Visitor<'de> for Digest<BYTES> {
    type Value = Hash<BYTES>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{BYTES} bytes or their hex encoding")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        Hash::from_hex(value).map_err(E::custom)
    }

    fn visit_bytes<E: de::Error>(self, value: &[u8]) -> Result<Self::Value, E> {
        Hash::try_from(value).map_err(E::custom)
    }
}

impl<'de, const BYTES: usize> Deserialize<'de> for Hash<BYTES> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            deserializer.deserialize_str(Digest::<BYTES>)
        } else {
            deserializer.deserialize_bytes(Digest::<BYTES>)
        }
    }
}
