use thiserror::Error;

/// Failures of the codec layer
///
/// Every decoding or encoding step of this workspace ends up in one of these
/// variants. Domain level entry points wrap them in a [`SchemaError`] that
/// names the type being processed.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid hex string: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("invalid length, expected {expected} bytes but got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("value too long, expected at most {max} bytes but got {actual}")]
    TooLong { max: usize, actual: usize },

    #[error("malformed cbor at offset {offset}: {source}")]
    Decode {
        offset: usize,
        #[source]
        source: minicbor::decode::Error,
    },

    #[error("error encoding cbor: {0}")]
    Encode(String),

    #[error("unexpected {count} trailing bytes at offset {offset}")]
    TrailingBytes { offset: usize, count: usize },

    #[error("nesting depth exceeds the limit of {0}")]
    TooDeep(usize),

    #[error("input is not canonical cbor")]
    NotCanonical,

    #[error("{0}")]
    Invariant(String),
}

impl Error {
    pub fn decode(offset: usize, source: minicbor::decode::Error) -> Self {
        Error::Decode { offset, source }
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Error::Invariant(msg.into())
    }
}

impl<E: std::fmt::Display> From<minicbor::encode::Error<E>> for Error {
    fn from(value: minicbor::encode::Error<E>) -> Self {
        Error::Encode(value.to_string())
    }
}

/// An [`Error`] tagged with the name of the schema that produced it
///
/// This is what callers of the high-level `Fragment` API see: the `schema`
/// field tells which domain type failed (eg: `TransactionBody`) while the
/// source keeps the underlying cause.
#[derive(Debug, Error)]
#[error("{schema}: {source}")]
pub struct SchemaError {
    pub schema: &'static str,
    #[source]
    pub source: Error,
}

impl SchemaError {
    pub fn new(schema: &'static str, source: Error) -> Self {
        Self { schema, source }
    }

    /// Builds the error for type `T`, using the last segment of its type name
    pub fn of<T: ?Sized>(source: Error) -> Self {
        Self::new(schema_name::<T>(), source)
    }
}

/// Short, human-friendly name of a type (without module path or generics)
pub fn schema_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Dummy;

    #[test]
    fn schema_name_is_short() {
        assert_eq!(schema_name::<Dummy>(), "Dummy");
        assert_eq!(schema_name::<Vec<u8>>(), "Vec");
    }

    #[test]
    fn schema_error_display_carries_schema() {
        let err = SchemaError::of::<Dummy>(Error::InvalidLength {
            expected: 28,
            actual: 27,
        });

        assert_eq!(
            err.to_string(),
            "Dummy: invalid length, expected 28 bytes but got 27"
        );
    }
}
