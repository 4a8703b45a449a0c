/// Shared re-export of minicbor lib across all crates of the workspace
pub use minicbor;

/// Round-trip friendly common helper structs
pub mod utils;

/// Fixed and bounded length byte / hex helpers
pub mod bytes;

/// Arbitrary precision integers (tags 2 and 3)
pub mod bigint;

/// Schema-less cbor value tree
pub mod value;

/// Deterministic re-encoding
pub mod canonical;

/// Non-recursive validation of untrusted input
pub mod scan;

mod error;
mod options;

pub use error::{schema_name, Error, SchemaError};
pub use options::{BignumPolicy, CodecOptions, EncodingMode, DEFAULT_MAX_DEPTH, MAX_DEPTH_LIMIT};
pub use value::Cbor;

fn encode_fragment<T>(value: &T, options: &CodecOptions) -> Result<Vec<u8>, Error>
where
    T: minicbor::Encode<()>,
{
    let raw = minicbor::to_vec(value)?;

    if !options.is_canonical() {
        return Ok(raw);
    }

    // integer shapes are pinned by the schemas, the bignum policy only
    // applies to the generic value encoder
    let options = options.clone().with_bignum(BignumPolicy::Minimal);
    canonical::canonical_bytes(&raw, &options)
}

fn decode_fragment<T>(bytes: &[u8], options: &CodecOptions) -> Result<T, Error>
where
    T: for<'b> minicbor::Decode<'b, ()>,
{
    let end = scan::check_nesting(bytes, options.depth_limit())?;

    if end != bytes.len() {
        return Err(Error::TrailingBytes {
            offset: end,
            count: bytes.len() - end,
        });
    }

    if options.is_canonical() {
        let options = options.clone().with_bignum(BignumPolicy::Minimal);

        if !canonical::is_canonical(bytes, &options)? {
            return Err(Error::NotCanonical);
        }
    }

    let mut d = minicbor::Decoder::new(bytes);

    let value = match d.decode::<T>() {
        Ok(x) => x,
        Err(e) => {
            let offset = e.position().unwrap_or_else(|| d.position());
            return Err(Error::decode(offset, e));
        }
    };

    if d.position() != bytes.len() {
        return Err(Error::TrailingBytes {
            offset: d.position(),
            count: bytes.len() - d.position(),
        });
    }

    Ok(value)
}

/// Uniform encode / decode surface shared by every domain type
///
/// Every method returns a `Result`. Callers wanting the failing behavior of a
/// "throwing" api apply `?` (or `expect`) on top; both views carry the exact
/// same [`SchemaError`].
pub trait Fragment: Sized + for<'b> minicbor::Decode<'b, ()> + minicbor::Encode<()> {
    fn to_cbor_bytes(&self) -> Result<Vec<u8>, SchemaError> {
        self.to_cbor_bytes_with(&CodecOptions::default())
    }

    fn to_cbor_bytes_with(&self, options: &CodecOptions) -> Result<Vec<u8>, SchemaError> {
        encode_fragment(self, options).map_err(SchemaError::of::<Self>)
    }

    fn to_cbor_hex(&self) -> Result<String, SchemaError> {
        self.to_cbor_hex_with(&CodecOptions::default())
    }

    fn to_cbor_hex_with(&self, options: &CodecOptions) -> Result<String, SchemaError> {
        self.to_cbor_bytes_with(options).map(bytes::encode_hex)
    }

    fn from_cbor_bytes(bytes: &[u8]) -> Result<Self, SchemaError> {
        Self::from_cbor_bytes_with(bytes, &CodecOptions::default())
    }

    fn from_cbor_bytes_with(bytes: &[u8], options: &CodecOptions) -> Result<Self, SchemaError> {
        decode_fragment(bytes, options).map_err(SchemaError::of::<Self>)
    }

    fn from_cbor_hex(hex: &str) -> Result<Self, SchemaError> {
        Self::from_cbor_hex_with(hex, &CodecOptions::default())
    }

    fn from_cbor_hex_with(hex: &str, options: &CodecOptions) -> Result<Self, SchemaError> {
        let bytes = bytes::decode_hex(hex).map_err(SchemaError::of::<Self>)?;
        Self::from_cbor_bytes_with(&bytes, options)
    }
}

impl<T> Fragment for T where T: for<'b> minicbor::Decode<'b, ()> + minicbor::Encode<()> + Sized {}

#[macro_export]
macro_rules! codec_by_datatype {
    (
        $enum_name:ident $( < $lifetime:lifetime > )?,
        $( $( $cbortype:ident )|* => $one_f:ident ),*,
        ($( $( $vars:ident ),+ => $many_f:ident )?)
    ) => {
        impl<$( $lifetime, )? '__b $(:$lifetime)?,  C> minicbor::decode::Decode<'__b, C> for $enum_name $(<$lifetime>)? {
            fn decode(d: &mut minicbor::Decoder<'__b>, ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
                match d.datatype()? {
                    $( minicbor::data::Type::Array => {
                        d.array()?;
                        // Using the identifiers trivially to ensure repetition.
                        Ok($enum_name::$many_f($({ let $vars = d.decode_with(ctx)?; $vars }, )+ ))
                    }, )?
                    $( $( minicbor::data::Type::$cbortype )|* => Ok($enum_name::$one_f(d.decode_with(ctx)?)), )*
                    other => Err(minicbor::decode::Error::message(format!(
                        "unexpected cbor type {} for {}",
                        other,
                        stringify!($enum_name)
                    ))),
                }
            }
        }

        impl< $( $lifetime, )? C> minicbor::encode::Encode<C> for $enum_name $(<$lifetime>)?  {
            fn encode<W: minicbor::encode::Write>(
                &self,
                e: &mut minicbor::Encoder<W>,
                ctx: &mut C,
            ) -> Result<(), minicbor::encode::Error<W::Error>> {
                match self {
                    $( $enum_name::$many_f ($( $vars ),+) => {
                        e.array(2)?;
                        $( e.encode_with($vars, ctx)?; )+
                    }, )?
                    $( $enum_name::$one_f(__x666) => {
                        e.encode_with(__x666, ctx)?;
                    } )*
                };

                Ok(())
            }
        }
    }
}
