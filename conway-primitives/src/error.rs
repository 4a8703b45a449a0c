use thiserror::Error;

use crate::{AssetName, PolicyId};

/// Domain invariant violations raised while building ledger values
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("interval {numerator}/{denominator} is outside of [0, 1]")]
    IntervalOutOfRange { numerator: u64, denominator: u64 },

    #[error("multiasset would be empty")]
    EmptyMultiasset,

    #[error("amount overflow for asset {asset} of policy {policy}")]
    AssetOverflow { policy: PolicyId, asset: AssetName },

    #[error("coin amount overflow")]
    CoinOverflow,

    #[error("asset name must be at most {max} bytes, got {actual}")]
    AssetNameTooLong { max: usize, actual: usize },
}
