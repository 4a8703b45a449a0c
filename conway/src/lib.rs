//! Rust-native codec for Cardano Conway-era ledger data
//!
//! This crate doesn't provide any particular application, it bundles the
//! building blocks needed to decode, inspect, re-encode and hash the CBOR
//! artifacts of the Conway ledger: transactions, witnesses, certificates,
//! governance actions, Plutus data and addresses.

#![warn(missing_docs)]

#[doc(inline)]
pub use conway_codec as codec;

#[doc(inline)]
pub use conway_crypto as crypto;

pub mod ledger {
    //! Ledger primitives and address formats of the Conway era

    #[doc(inline)]
    pub use conway_primitives as primitives;

    #[doc(inline)]
    pub use conway_addresses as addresses;
}
