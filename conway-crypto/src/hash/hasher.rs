use crate::hash::Hash;
use conway_codec::minicbor;
use cryptoxide::blake2b::Blake2b;
use cryptoxide::digest::Digest as _;

/// Streaming Blake2b with a digest of `BITS` bits
///
/// The ledger uses two sizes: 224 bits for key hashes, script hashes and
/// policy ids; 256 bits for transaction ids, datum hashes and auxiliary data
/// hashes. Cbor values can be hashed without materializing their encoding,
/// the encoder writes straight into the hasher.
///
/// ```
/// # use conway_crypto::hash::Hasher;
/// let mut hasher = Hasher::<256>::new();
/// hasher.input(b"header");
/// hasher.input(b"body");
///
/// assert_eq!(hasher.finalize(), Hasher::<256>::hash(b"headerbody"));
/// ```
pub struct Hasher<const BITS: usize>(Blake2b);

impl<const BITS: usize> Hasher<BITS> {
    #[inline]
    pub fn input(&mut self, bytes: &[u8]) {
        self.0.input(bytes);
    }
}

macro_rules! digest_size {
    ($bits:literal) => {
        impl Hasher<$bits> {
            #[inline]
            pub fn new() -> Self {
                Self(Blake2b::new($bits / 8))
            }

            pub fn finalize(mut self) -> Hash<{ $bits / 8 }> {
                let mut digest = [0; $bits / 8];
                self.0.result(&mut digest);
                Hash::new(digest)
            }

            pub fn hash(bytes: &[u8]) -> Hash<{ $bits / 8 }> {
                let mut hasher = Self::new();
                hasher.input(bytes);
                hasher.finalize()
            }

            /// Digest of `tag ‖ bytes`, script hashes are built this way
            pub fn hash_tagged(bytes: &[u8], tag: u8) -> Hash<{ $bits / 8 }> {
                let mut hasher = Self::new();
                hasher.input(&[tag]);
                hasher.input(bytes);
                hasher.finalize()
            }

            /// Digest of the cbor encoding of `data`
            pub fn hash_cbor(
                data: &impl minicbor::Encode<()>,
            ) -> Result<Hash<{ $bits / 8 }>, conway_codec::Error> {
                let mut hasher = Self::new();
                minicbor::encode(data, &mut hasher)?;
                Ok(hasher.finalize())
            }

            /// Digest of `tag ‖ cbor(data)`
            pub fn hash_tagged_cbor(
                data: &impl minicbor::Encode<()>,
                tag: u8,
            ) -> Result<Hash<{ $bits / 8 }>, conway_codec::Error> {
                let mut hasher = Self::new();
                hasher.input(&[tag]);
                minicbor::encode(data, &mut hasher)?;
                Ok(hasher.finalize())
            }
        }

        impl Default for Hasher<$bits> {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

digest_size!(224);
digest_size!(256);

impl<const BITS: usize> minicbor::encode::Write for &mut Hasher<BITS> {
    type Error = std::convert::Infallible;

    fn write_all(&mut self, buf: &[u8]) -> Result<(), Self::Error> {
        self.input(buf);
        Ok(())
    }
}
