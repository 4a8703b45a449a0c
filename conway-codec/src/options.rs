use serde::{Deserialize, Serialize};

/// Default nesting limit applied when decoding untrusted input
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Ceiling for [`CodecOptions::max_depth`]
///
/// Decoders and the value tree recurse once per nesting level, deeper input
/// would exhaust the stack of a default thread.
pub const MAX_DEPTH_LIMIT: usize = 256;

/// How a value is laid out on the wire
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum EncodingMode {
    /// Keep map order, definite / indefinite framing and byte-string chunking
    /// exactly as the value describes them. This is what re-serializing data
    /// received from the chain requires.
    #[default]
    AsReceived,

    /// RFC 8949 core deterministic encoding: definite lengths only, shortest
    /// heads, map keys sorted by the bytewise order of their encodings. Use it
    /// for anything that gets hashed.
    Canonical,
}

/// How the generic value encoder writes integers
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BignumPolicy {
    /// major type 0 / 1 whenever the value fits a 64-bit argument, tag 2 / 3
    /// otherwise
    #[default]
    Minimal,

    /// every integer as a tag 2 / 3 bignum
    Always,
}

/// Explicit configuration threaded through every encode / decode call
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", default)]
pub struct CodecOptions {
    pub mode: EncodingMode,
    pub bignum: BignumPolicy,
    pub max_depth: usize,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            mode: EncodingMode::AsReceived,
            bignum: BignumPolicy::Minimal,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl CodecOptions {
    pub fn canonical() -> Self {
        Self {
            mode: EncodingMode::Canonical,
            ..Default::default()
        }
    }

    pub fn as_received() -> Self {
        Self::default()
    }

    /// Values above [`MAX_DEPTH_LIMIT`] are clamped to it
    pub fn with_max_depth(self, max_depth: usize) -> Self {
        Self {
            max_depth: max_depth.min(MAX_DEPTH_LIMIT),
            ..self
        }
    }

    /// The nesting limit actually enforced, `max_depth` may have been loaded
    /// from a config file above the ceiling
    pub fn depth_limit(&self) -> usize {
        self.max_depth.min(MAX_DEPTH_LIMIT)
    }

    pub fn with_bignum(self, bignum: BignumPolicy) -> Self {
        Self { bignum, ..self }
    }

    pub fn is_canonical(&self) -> bool {
        matches!(self.mode, EncodingMode::Canonical)
    }
}
