use conway_codec::minicbor;
use serde::{Deserialize, Serialize};

use crate::{AddrKeyhash, CborWrap, DatumHash, MaybeIndefArray, PlutusData, PlutusScript, Tuple};

/*
native_script =
  [ script_pubkey
  // script_all
  // script_any
  // script_n_of_k
  // invalid_before
  // invalid_hereafter
  ]
*/
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
pub enum NativeScript {
    ScriptPubkey(AddrKeyhash),
    ScriptAll(MaybeIndefArray<NativeScript>),
    ScriptAny(MaybeIndefArray<NativeScript>),
    ScriptNOfK(u32, MaybeIndefArray<NativeScript>),
    InvalidBefore(u64),
    InvalidHereafter(u64),
}

impl<'b, C> minicbor::Decode<'b, C> for NativeScript {
    fn decode(d: &mut minicbor::Decoder<'b>, ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
        let tuple = Tuple::begin(d, "NativeScript")?;

        let script = match tuple.discriminant(d)? {
            0 => {
                tuple.arity(2)?;
                NativeScript::ScriptPubkey(d.decode_with(ctx)?)
            }
            1 => {
                tuple.arity(2)?;
                NativeScript::ScriptAll(d.decode_with(ctx)?)
            }
            2 => {
                tuple.arity(2)?;
                NativeScript::ScriptAny(d.decode_with(ctx)?)
            }
            3 => {
                tuple.arity(3)?;
                NativeScript::ScriptNOfK(d.decode_with(ctx)?, d.decode_with(ctx)?)
            }
            4 => {
                tuple.arity(2)?;
                NativeScript::InvalidBefore(d.decode_with(ctx)?)
            }
            5 => {
                tuple.arity(2)?;
                NativeScript::InvalidHereafter(d.decode_with(ctx)?)
            }
            x => return Err(tuple.unknown(x)),
        };

        tuple.end(d)?;
        Ok(script)
    }
}

impl<C> minicbor::Encode<C> for NativeScript {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        match self {
            NativeScript::ScriptPubkey(x) => e.encode_with((0, x), ctx)?,
            NativeScript::ScriptAll(x) => e.encode_with((1, x), ctx)?,
            NativeScript::ScriptAny(x) => e.encode_with((2, x), ctx)?,
            NativeScript::ScriptNOfK(n, x) => e.encode_with((3, n, x), ctx)?,
            NativeScript::InvalidBefore(x) => e.encode_with((4, x), ctx)?,
            NativeScript::InvalidHereafter(x) => e.encode_with((5, x), ctx)?,
        };

        Ok(())
    }
}

// script = [ 0, native_script // 1, plutus_v1_script // 2, plutus_v2_script //
// 3, plutus_v3_script ]
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
pub enum Script {
    NativeScript(NativeScript),
    PlutusV1Script(PlutusScript<1>),
    PlutusV2Script(PlutusScript<2>),
    PlutusV3Script(PlutusScript<3>),
}

impl<'b, C> minicbor::Decode<'b, C> for Script {
    fn decode(d: &mut minicbor::Decoder<'b>, ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
        let tuple = Tuple::begin(d, "Script")?;
        let discriminant = tuple.discriminant(d)?;
        tuple.arity(2)?;

        let script = match discriminant {
            0 => Script::NativeScript(d.decode_with(ctx)?),
            1 => Script::PlutusV1Script(d.decode_with(ctx)?),
            2 => Script::PlutusV2Script(d.decode_with(ctx)?),
            3 => Script::PlutusV3Script(d.decode_with(ctx)?),
            x => return Err(tuple.unknown(x)),
        };

        tuple.end(d)?;
        Ok(script)
    }
}

impl<C> minicbor::Encode<C> for Script {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        match self {
            Script::NativeScript(x) => e.encode_with((0, x), ctx)?,
            Script::PlutusV1Script(x) => e.encode_with((1, x), ctx)?,
            Script::PlutusV2Script(x) => e.encode_with((2, x), ctx)?,
            Script::PlutusV3Script(x) => e.encode_with((3, x), ctx)?,
        };

        Ok(())
    }
}

// script_ref = #6.24(bytes .cbor script)
pub type ScriptRef = CborWrap<Script>;

pub type Data = CborWrap<PlutusData>;

// datum_option = [ 0, $hash32 // 1, data ]
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
pub enum DatumOption {
    Hash(DatumHash),
    Data(Data),
}

impl<'b, C> minicbor::Decode<'b, C> for DatumOption {
    fn decode(d: &mut minicbor::Decoder<'b>, ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
        let tuple = Tuple::begin(d, "DatumOption")?;
        let discriminant = tuple.discriminant(d)?;
        tuple.arity(2)?;

        let datum = match discriminant {
            0 => Self::Hash(d.decode_with(ctx)?),
            1 => Self::Data(d.decode_with(ctx)?),
            x => return Err(tuple.unknown(x)),
        };

        tuple.end(d)?;
        Ok(datum)
    }
}

impl<C> minicbor::Encode<C> for DatumOption {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        match self {
            Self::Hash(x) => e.encode_with((0, x), ctx)?,
            Self::Data(x) => e.encode_with((1, x), ctx)?,
        };

        Ok(())
    }
}
