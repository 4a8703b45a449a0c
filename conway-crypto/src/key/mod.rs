//! Signing keys
//!
//! The codec only moves key and signature bytes around. Producing and checking
//! signatures is delegated to whatever implements [`Signer`] / [`Verifier`],
//! [`ed25519`] ships the default implementation on top of `cryptoxide`.

pub mod ed25519;

/// Something able to produce a signature over an arbitrary message
pub trait Signer {
    type Signature;

    fn sign(&self, message: &[u8]) -> Self::Signature;
}

/// Something able to check a signature produced by a matching [`Signer`]
pub trait Verifier {
    type Signature;

    fn verify(&self, message: &[u8], signature: &Self::Signature) -> bool;
}
