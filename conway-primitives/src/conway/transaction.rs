use conway_codec::codec_by_datatype;
use conway_codec::minicbor::{self, Decode, Encode};
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use super::{
    AuxiliaryData, Certificate, DatumOption, Mint, ProposalProcedure, ScriptRef, Value,
    VotingProcedures, WitnessSet,
};
use crate::{
    encode_record, AddrKeyhash, Bytes, Coin, DatumHash, Fields, Hash, KeepRaw, KeyOrder,
    NetworkId, NonEmptyKeyValuePairs, NonEmptySet, Nullable, PositiveCoin, RewardAccount, Set,
    TransactionInput,
};

pub type Withdrawals = NonEmptyKeyValuePairs<RewardAccount, Coin>;

pub type RequiredSigners = NonEmptySet<AddrKeyhash>;

#[derive(Serialize, Deserialize, Encode, Decode, Debug, PartialEq, Eq, Clone)]
pub struct LegacyTransactionOutput {
    #[n(0)]
    pub address: Bytes,

    #[n(1)]
    pub amount: Value,

    #[n(2)]
    pub datum_hash: Option<DatumHash>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
pub struct PostAlonzoTransactionOutput {
    pub address: Bytes,

    pub value: Value,

    pub datum_option: Option<DatumOption>,

    pub script_ref: Option<ScriptRef>,

    #[serde(skip)]
    pub layout: KeyOrder,
}

impl PostAlonzoTransactionOutput {
    pub fn new(address: Bytes, value: Value) -> Self {
        Self {
            address,
            value,
            datum_option: None,
            script_ref: None,
            layout: KeyOrder::default(),
        }
    }

    fn present_keys(&self) -> Vec<u64> {
        let mut keys = vec![0, 1];

        if self.datum_option.is_some() {
            keys.push(2);
        }

        if self.script_ref.is_some() {
            keys.push(3);
        }

        keys
    }
}

impl<'b, C> minicbor::Decode<'b, C> for PostAlonzoTransactionOutput {
    fn decode(d: &mut minicbor::Decoder<'b>, ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
        let mut fields = Fields::begin(d, "TransactionOutput")?;

        let mut address = None;
        let mut value = None;
        let mut datum_option = None;
        let mut script_ref = None;

        while let Some(key) = fields.next_key(d)? {
            match key {
                0 => address = Some(d.decode_with(ctx)?),
                1 => value = Some(d.decode_with(ctx)?),
                2 => datum_option = Some(d.decode_with(ctx)?),
                3 => script_ref = Some(d.decode_with(ctx)?),
                x => return Err(fields.unknown(x)),
            }
        }

        Ok(Self {
            address: fields.required(address, "address")?,
            value: fields.required(value, "value")?,
            datum_option,
            script_ref,
            layout: fields.layout(),
        })
    }
}

impl<C> minicbor::Encode<C> for PostAlonzoTransactionOutput {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        encode_record(e, &self.layout, &self.present_keys(), |key, e| {
            match key {
                0 => e.encode_with(&self.address, ctx)?,
                1 => e.encode_with(&self.value, ctx)?,
                2 => e.encode_with(&self.datum_option, ctx)?,
                3 => e.encode_with(&self.script_ref, ctx)?,
                _ => return Ok(()),
            };

            Ok(())
        })
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
pub enum TransactionOutput {
    Legacy(LegacyTransactionOutput),
    PostAlonzo(PostAlonzoTransactionOutput),
}

codec_by_datatype! {
    TransactionOutput,
    Array | ArrayIndef => Legacy,
    Map | MapIndef => PostAlonzo,
    ()
}

impl TransactionOutput {
    /// Raw address bytes, see the addresses crate to interpret them
    pub fn address(&self) -> &Bytes {
        match self {
            TransactionOutput::Legacy(x) => &x.address,
            TransactionOutput::PostAlonzo(x) => &x.address,
        }
    }

    pub fn value(&self) -> &Value {
        match self {
            TransactionOutput::Legacy(x) => &x.amount,
            TransactionOutput::PostAlonzo(x) => &x.value,
        }
    }

    pub fn datum(&self) -> Option<DatumOption> {
        match self {
            TransactionOutput::Legacy(x) => x.datum_hash.map(DatumOption::Hash),
            TransactionOutput::PostAlonzo(x) => x.datum_option.clone(),
        }
    }
}

/// Body of a transaction, a sparse map keyed by field number
///
/// Decoding remembers the received key order and map framing in `layout`, so
/// that a received body encodes back to its original bytes.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
pub struct TransactionBody {
    pub inputs: Set<TransactionInput>,

    pub outputs: Vec<TransactionOutput>,

    pub fee: Coin,

    pub ttl: Option<u64>,

    pub certificates: Option<NonEmptySet<Certificate>>,

    pub withdrawals: Option<Withdrawals>,

    pub auxiliary_data_hash: Option<Hash<32>>,

    pub validity_interval_start: Option<u64>,

    pub mint: Option<Mint>,

    pub script_data_hash: Option<Hash<32>>,

    pub collateral: Option<NonEmptySet<TransactionInput>>,

    pub required_signers: Option<RequiredSigners>,

    pub network_id: Option<NetworkId>,

    pub collateral_return: Option<TransactionOutput>,

    pub total_collateral: Option<Coin>,

    pub reference_inputs: Option<NonEmptySet<TransactionInput>>,

    pub voting_procedures: Option<VotingProcedures>,

    pub proposal_procedures: Option<NonEmptySet<ProposalProcedure>>,

    pub treasury_value: Option<Coin>,

    pub donation: Option<PositiveCoin>,

    #[serde(skip)]
    pub layout: KeyOrder,
}

impl TransactionBody {
    /// A body with only the required fields set
    pub fn new(inputs: Vec<TransactionInput>, outputs: Vec<TransactionOutput>, fee: Coin) -> Self {
        Self {
            inputs: Set::new(inputs),
            outputs,
            fee,
            ttl: None,
            certificates: None,
            withdrawals: None,
            auxiliary_data_hash: None,
            validity_interval_start: None,
            mint: None,
            script_data_hash: None,
            collateral: None,
            required_signers: None,
            network_id: None,
            collateral_return: None,
            total_collateral: None,
            reference_inputs: None,
            voting_procedures: None,
            proposal_procedures: None,
            treasury_value: None,
            donation: None,
            layout: KeyOrder::default(),
        }
    }

    fn present_keys(&self) -> Vec<u64> {
        let optional = [
            (3, self.ttl.is_some()),
            (4, self.certificates.is_some()),
            (5, self.withdrawals.is_some()),
            (7, self.auxiliary_data_hash.is_some()),
            (8, self.validity_interval_start.is_some()),
            (9, self.mint.is_some()),
            (11, self.script_data_hash.is_some()),
            (13, self.collateral.is_some()),
            (14, self.required_signers.is_some()),
            (15, self.network_id.is_some()),
            (16, self.collateral_return.is_some()),
            (17, self.total_collateral.is_some()),
            (18, self.reference_inputs.is_some()),
            (19, self.voting_procedures.is_some()),
            (20, self.proposal_procedures.is_some()),
            (21, self.treasury_value.is_some()),
            (22, self.donation.is_some()),
        ];

        let mut keys = vec![0, 1, 2];
        keys.extend(optional.iter().filter(|(_, set)| *set).map(|(key, _)| *key));
        keys
    }

    /// False when the ttl falls before the start of the validity interval,
    /// which leaves no slot where the transaction could be included
    pub fn has_consistent_validity_interval(&self) -> bool {
        match (self.ttl, self.validity_interval_start) {
            (Some(ttl), Some(start)) => ttl >= start,
            _ => true,
        }
    }
}

impl<'b, C> minicbor::Decode<'b, C> for TransactionBody {
    fn decode(d: &mut minicbor::Decoder<'b>, ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
        let mut fields = Fields::begin(d, "TransactionBody")?;

        let mut inputs = None;
        let mut outputs = None;
        let mut fee = None;
        let mut ttl = None;
        let mut certificates = None;
        let mut withdrawals = None;
        let mut auxiliary_data_hash = None;
        let mut validity_interval_start = None;
        let mut mint = None;
        let mut script_data_hash = None;
        let mut collateral = None;
        let mut required_signers = None;
        let mut network_id = None;
        let mut collateral_return = None;
        let mut total_collateral = None;
        let mut reference_inputs = None;
        let mut voting_procedures = None;
        let mut proposal_procedures = None;
        let mut treasury_value = None;
        let mut donation = None;

        while let Some(key) = fields.next_key(d)? {
            trace!(key, "decoding transaction body field");

            match key {
                0 => inputs = Some(d.decode_with(ctx)?),
                1 => outputs = Some(d.decode_with(ctx)?),
                2 => fee = Some(d.decode_with(ctx)?),
                3 => ttl = Some(d.decode_with(ctx)?),
                4 => certificates = Some(d.decode_with(ctx)?),
                5 => withdrawals = Some(d.decode_with(ctx)?),
                7 => auxiliary_data_hash = Some(d.decode_with(ctx)?),
                8 => validity_interval_start = Some(d.decode_with(ctx)?),
                9 => mint = Some(d.decode_with(ctx)?),
                11 => script_data_hash = Some(d.decode_with(ctx)?),
                13 => collateral = Some(d.decode_with(ctx)?),
                14 => required_signers = Some(d.decode_with(ctx)?),
                15 => network_id = Some(d.decode_with(ctx)?),
                16 => collateral_return = Some(d.decode_with(ctx)?),
                17 => total_collateral = Some(d.decode_with(ctx)?),
                18 => reference_inputs = Some(d.decode_with(ctx)?),
                19 => voting_procedures = Some(d.decode_with(ctx)?),
                20 => proposal_procedures = Some(d.decode_with(ctx)?),
                21 => treasury_value = Some(d.decode_with(ctx)?),
                22 => donation = Some(d.decode_with(ctx)?),
                x => return Err(fields.unknown(x)),
            }
        }

        let body = TransactionBody {
            inputs: fields.required(inputs, "inputs")?,
            outputs: fields.required(outputs, "outputs")?,
            fee: fields.required(fee, "fee")?,
            ttl,
            certificates,
            withdrawals,
            auxiliary_data_hash,
            validity_interval_start,
            mint,
            script_data_hash,
            collateral,
            required_signers,
            network_id,
            collateral_return,
            total_collateral,
            reference_inputs,
            voting_procedures,
            proposal_procedures,
            treasury_value,
            donation,
            layout: fields.layout(),
        };

        if !body.has_consistent_validity_interval() {
            warn!(
                ttl = ?body.ttl,
                validity_interval_start = ?body.validity_interval_start,
                "transaction ttl is before the start of its validity interval"
            );
        }

        Ok(body)
    }
}

impl<C> minicbor::Encode<C> for TransactionBody {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        encode_record(e, &self.layout, &self.present_keys(), |key, e| {
            match key {
                0 => e.encode_with(&self.inputs, ctx)?,
                1 => e.encode_with(&self.outputs, ctx)?,
                2 => e.encode_with(self.fee, ctx)?,
                3 => e.encode_with(self.ttl, ctx)?,
                4 => e.encode_with(&self.certificates, ctx)?,
                5 => e.encode_with(&self.withdrawals, ctx)?,
                7 => e.encode_with(self.auxiliary_data_hash, ctx)?,
                8 => e.encode_with(self.validity_interval_start, ctx)?,
                9 => e.encode_with(&self.mint, ctx)?,
                11 => e.encode_with(self.script_data_hash, ctx)?,
                13 => e.encode_with(&self.collateral, ctx)?,
                14 => e.encode_with(&self.required_signers, ctx)?,
                15 => e.encode_with(self.network_id, ctx)?,
                16 => e.encode_with(&self.collateral_return, ctx)?,
                17 => e.encode_with(self.total_collateral, ctx)?,
                18 => e.encode_with(&self.reference_inputs, ctx)?,
                19 => e.encode_with(&self.voting_procedures, ctx)?,
                20 => e.encode_with(&self.proposal_procedures, ctx)?,
                21 => e.encode_with(self.treasury_value, ctx)?,
                22 => e.encode_with(&self.donation, ctx)?,
                _ => return Ok(()),
            };

            Ok(())
        })
    }
}

/* transaction =
[ transaction_body
, transaction_witness_set
, bool
, auxiliary_data / null
] */

/// A full transaction
///
/// The body and the auxiliary data keep the bytes they were decoded from,
/// their hashes are taken over those bytes.
#[derive(Serialize, Deserialize, Encode, Decode, Debug, PartialEq, Eq, Clone)]
pub struct Tx {
    #[n(0)]
    pub transaction_body: KeepRaw<TransactionBody>,

    #[n(1)]
    pub transaction_witness_set: WitnessSet,

    #[n(2)]
    pub success: bool,

    #[n(3)]
    pub auxiliary_data: Nullable<KeepRaw<AuxiliaryData>>,
}
