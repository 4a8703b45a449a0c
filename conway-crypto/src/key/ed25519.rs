//! Ed25519 asymmetric keys
//!
//! [`PublicKey`] and [`Signature`] are plain byte wrappers with the exact
//! length checks the ledger expects (32 and 64 bytes). [`SecretKey`] exists so
//! that witnesses can be produced end to end in tests and tooling.

use conway_codec::{bytes, minicbor, Error};
use cryptoxide::ed25519::{self, PRIVATE_KEY_LENGTH, PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH};
use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};

use super::{Signer, Verifier};

/// Ed25519 Secret Key
#[derive(Clone)]
pub struct SecretKey([u8; Self::SIZE]);

/// Ed25519 Public Key. Can be used to verify a [`Signature`]. A [`PublicKey`]
/// is associated to a [`SecretKey`]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PublicKey([u8; Self::SIZE]);

/// Ed25519 Signature. Is created by a [`SecretKey`] and is verified
/// with a [`PublicKey`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Signature([u8; Self::SIZE]);

macro_rules! impl_size {
    ($Type:ty, $Size:expr) => {
        impl $Type {
            /// This is the size of the type in bytes.
            pub const SIZE: usize = $Size;
        }
    };
}

impl_size!(SecretKey, PRIVATE_KEY_LENGTH);
impl_size!(PublicKey, PUBLIC_KEY_LENGTH);
impl_size!(Signature, SIGNATURE_LENGTH);

/// overwrite secret material in a way the compiler can't elide
fn scrub(bytes: &mut [u8]) {
    for byte in bytes.iter_mut() {
        // SAFETY: `byte` is a valid, aligned and exclusive reference
        unsafe { std::ptr::write_volatile(byte, 0) };
    }
}

impl SecretKey {
    /// generate a new [`SecretKey`] with the given random number generator
    pub fn new<Rng>(mut rng: Rng) -> Self
    where
        Rng: RngCore + CryptoRng,
    {
        let mut bytes = [0; Self::SIZE];
        rng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// get the [`PublicKey`] associated to this key
    pub fn public_key(&self) -> PublicKey {
        let (mut sk, pk) = ed25519::keypair(&self.0);
        scrub(&mut sk);
        PublicKey(pk)
    }

    /// create a [`Signature`] for the given message with this [`SecretKey`].
    pub fn sign<T>(&self, msg: T) -> Signature
    where
        T: AsRef<[u8]>,
    {
        let (mut sk, _) = ed25519::keypair(&self.0);
        let signature = ed25519::signature(msg.as_ref(), &sk);
        scrub(&mut sk);

        Signature(signature)
    }
}

impl PublicKey {
    /// verify the cryptographic [`Signature`] against the `message` and the
    /// [`PublicKey`] `self`.
    #[inline]
    pub fn verify<T>(&self, message: T, signature: &Signature) -> bool
    where
        T: AsRef<[u8]>,
    {
        ed25519::verify(message.as_ref(), &self.0, &signature.0)
    }
}

impl Signer for SecretKey {
    type Signature = Signature;

    fn sign(&self, message: &[u8]) -> Signature {
        SecretKey::sign(self, message)
    }
}

impl Verifier for PublicKey {
    type Signature = Signature;

    fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        PublicKey::verify(self, message, signature)
    }
}

impl Drop for SecretKey {
    fn drop(&mut self) {
        scrub(&mut self.0)
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretKey<Ed25519>").finish_non_exhaustive()
    }
}

impl From<[u8; Self::SIZE]> for SecretKey {
    fn from(bytes: [u8; Self::SIZE]) -> Self {
        Self(bytes)
    }
}

macro_rules! impl_public_bytes {
    ($Type:ident, $label:literal) => {
        impl fmt::Display for $Type {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&hex::encode(self.as_ref()))
            }
        }

        impl fmt::Debug for $Type {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_tuple($label)
                    .field(&hex::encode(self.as_ref()))
                    .finish()
            }
        }

        impl AsRef<[u8]> for $Type {
            fn as_ref(&self) -> &[u8] {
                self.0.as_ref()
            }
        }

        impl From<[u8; Self::SIZE]> for $Type {
            fn from(bytes: [u8; Self::SIZE]) -> Self {
                Self(bytes)
            }
        }

        impl From<$Type> for [u8; $Type::SIZE] {
            fn from(value: $Type) -> Self {
                value.0
            }
        }

        impl<'a> TryFrom<&'a [u8]> for $Type {
            type Error = Error;

            fn try_from(value: &'a [u8]) -> Result<Self, Self::Error> {
                bytes::copy_fixed(value).map(Self)
            }
        }

        impl FromStr for $Type {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                bytes::decode_hex_fixed(s).map(Self)
            }
        }

        impl Serialize for $Type {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $Type {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }

        impl<C> minicbor::Encode<C> for $Type {
            fn encode<W: minicbor::encode::Write>(
                &self,
                e: &mut minicbor::Encoder<W>,
                _ctx: &mut C,
            ) -> Result<(), minicbor::encode::Error<W::Error>> {
                e.bytes(&self.0)?.ok()
            }
        }

        impl<'b, C> minicbor::Decode<'b, C> for $Type {
            fn decode(
                d: &mut minicbor::Decoder<'b>,
                _ctx: &mut C,
            ) -> Result<Self, minicbor::decode::Error> {
                let position = d.position();

                $Type::try_from(d.bytes()?).map_err(|e| {
                    minicbor::decode::Error::message(format!("{}: {e}", $label)).at(position)
                })
            }
        }
    };
}

impl_public_bytes!(PublicKey, "PublicKey<Ed25519>");
impl_public_bytes!(Signature, "Signature<Ed25519>");
