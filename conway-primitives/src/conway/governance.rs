use std::collections::BTreeMap;

use conway_codec::minicbor::{self, Decode, Encode};
use serde::{Deserialize, Serialize};

use super::CommitteeColdCredential;
use crate::{
    encode_record, AddrKeyhash, Coin, CostModel, Epoch, ExUnitPrices, ExUnits, Fields, Hash,
    KeyOrder, KeyValuePairs, NonEmptyKeyValuePairs, ProtocolVersion, RationalNumber,
    RewardAccount, ScriptHash, Set, Tuple, UnitInterval,
};

#[derive(Serialize, Deserialize, Encode, Decode, Debug, PartialEq, PartialOrd, Eq, Ord, Clone)]
pub struct Anchor {
    #[n(0)]
    pub url: String,
    #[n(1)]
    pub content_hash: Hash<32>,
}

#[derive(
    Serialize, Deserialize, Encode, Decode, Debug, PartialEq, Eq, Clone, Copy, PartialOrd, Ord, Hash,
)]
pub struct GovActionId {
    #[n(0)]
    pub transaction_id: Hash<32>,
    #[n(1)]
    pub action_index: u16,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
pub struct Constitution {
    pub anchor: Anchor,
    pub guardrail_script: Option<ScriptHash>,
}

// the guardrail is `script_hash / null`, never omitted
impl<'b, C> minicbor::Decode<'b, C> for Constitution {
    fn decode(d: &mut minicbor::Decoder<'b>, ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
        let tuple = Tuple::begin(d, "Constitution")?;
        tuple.arity(2)?;

        let constitution = Constitution {
            anchor: d.decode_with(ctx)?,
            guardrail_script: d.decode_with(ctx)?,
        };

        tuple.end(d)?;
        Ok(constitution)
    }
}

impl<C> minicbor::Encode<C> for Constitution {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        e.encode_with((&self.anchor, &self.guardrail_script), ctx)?;
        Ok(())
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
pub enum GovAction {
    ParameterChange(Option<GovActionId>, Box<ProtocolParamUpdate>, Option<ScriptHash>),
    HardForkInitiation(Option<GovActionId>, ProtocolVersion),
    TreasuryWithdrawals(KeyValuePairs<RewardAccount, Coin>, Option<ScriptHash>),
    NoConfidence(Option<GovActionId>),
    UpdateCommittee(
        Option<GovActionId>,
        Set<CommitteeColdCredential>,
        KeyValuePairs<CommitteeColdCredential, Epoch>,
        UnitInterval,
    ),
    NewConstitution(Option<GovActionId>, Constitution),
    Information,
}

impl GovAction {
    /// The action this one builds upon, if its kind is chained
    pub fn previous(&self) -> Option<&GovActionId> {
        match self {
            GovAction::ParameterChange(x, ..)
            | GovAction::HardForkInitiation(x, _)
            | GovAction::NoConfidence(x)
            | GovAction::UpdateCommittee(x, ..)
            | GovAction::NewConstitution(x, _) => x.as_ref(),
            GovAction::TreasuryWithdrawals(..) | GovAction::Information => None,
        }
    }
}

impl<'b, C> minicbor::Decode<'b, C> for GovAction {
    fn decode(d: &mut minicbor::Decoder<'b>, ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
        let tuple = Tuple::begin(d, "GovAction")?;

        let action = match tuple.discriminant(d)? {
            0 => {
                tuple.arity(4)?;
                GovAction::ParameterChange(
                    d.decode_with(ctx)?,
                    d.decode_with(ctx)?,
                    d.decode_with(ctx)?,
                )
            }
            1 => {
                tuple.arity(3)?;
                GovAction::HardForkInitiation(d.decode_with(ctx)?, d.decode_with(ctx)?)
            }
            2 => {
                tuple.arity(3)?;
                GovAction::TreasuryWithdrawals(d.decode_with(ctx)?, d.decode_with(ctx)?)
            }
            3 => {
                tuple.arity(2)?;
                GovAction::NoConfidence(d.decode_with(ctx)?)
            }
            4 => {
                tuple.arity(5)?;
                GovAction::UpdateCommittee(
                    d.decode_with(ctx)?,
                    d.decode_with(ctx)?,
                    d.decode_with(ctx)?,
                    d.decode_with(ctx)?,
                )
            }
            5 => {
                tuple.arity(3)?;
                GovAction::NewConstitution(d.decode_with(ctx)?, d.decode_with(ctx)?)
            }
            6 => {
                tuple.arity(1)?;
                GovAction::Information
            }
            x => return Err(tuple.unknown(x)),
        };

        tuple.end(d)?;
        Ok(action)
    }
}

impl<C> minicbor::Encode<C> for GovAction {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        match self {
            GovAction::ParameterChange(a, b, c) => e.encode_with((0, a, b, c), ctx)?,
            GovAction::HardForkInitiation(a, b) => e.encode_with((1, a, b), ctx)?,
            GovAction::TreasuryWithdrawals(a, b) => e.encode_with((2, a, b), ctx)?,
            GovAction::NoConfidence(a) => e.encode_with((3, a), ctx)?,
            GovAction::UpdateCommittee(a, b, c, d) => e.encode_with((4, a, b, c, d), ctx)?,
            GovAction::NewConstitution(a, b) => e.encode_with((5, a, b), ctx)?,
            GovAction::Information => e.array(1)?.u8(6)?,
        };

        Ok(())
    }
}

#[derive(Encode, Decode, Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
pub struct ProposalProcedure {
    #[n(0)]
    pub deposit: Coin,
    #[n(1)]
    pub reward_account: RewardAccount,
    #[n(2)]
    pub gov_action: GovAction,
    #[n(3)]
    pub anchor: Anchor,
}

#[derive(Encode, Decode, Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy)]
#[cbor(index_only)]
pub enum Vote {
    #[n(0)]
    No,
    #[n(1)]
    Yes,
    #[n(2)]
    Abstain,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
pub struct VotingProcedure {
    pub vote: Vote,
    pub anchor: Option<Anchor>,
}

impl<'b, C> minicbor::Decode<'b, C> for VotingProcedure {
    fn decode(d: &mut minicbor::Decoder<'b>, ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
        let tuple = Tuple::begin(d, "VotingProcedure")?;
        tuple.arity(2)?;

        let procedure = VotingProcedure {
            vote: d.decode_with(ctx)?,
            anchor: d.decode_with(ctx)?,
        };

        tuple.end(d)?;
        Ok(procedure)
    }
}

impl<C> minicbor::Encode<C> for VotingProcedure {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        e.encode_with((self.vote, &self.anchor), ctx)?;
        Ok(())
    }
}

pub type VotingProcedures =
    NonEmptyKeyValuePairs<Voter, NonEmptyKeyValuePairs<GovActionId, VotingProcedure>>;

#[derive(Serialize, Deserialize, Debug, PartialEq, PartialOrd, Eq, Ord, Clone, Hash)]
pub enum Voter {
    ConstitutionalCommitteeScript(ScriptHash),
    ConstitutionalCommitteeKey(AddrKeyhash),
    DRepScript(ScriptHash),
    DRepKey(AddrKeyhash),
    StakePoolKey(AddrKeyhash),
}

impl<'b, C> minicbor::Decode<'b, C> for Voter {
    fn decode(d: &mut minicbor::Decoder<'b>, ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
        let tuple = Tuple::begin(d, "Voter")?;
        let discriminant = tuple.discriminant(d)?;
        tuple.arity(2)?;

        let voter = match discriminant {
            0 => Voter::ConstitutionalCommitteeKey(d.decode_with(ctx)?),
            1 => Voter::ConstitutionalCommitteeScript(d.decode_with(ctx)?),
            2 => Voter::DRepKey(d.decode_with(ctx)?),
            3 => Voter::DRepScript(d.decode_with(ctx)?),
            4 => Voter::StakePoolKey(d.decode_with(ctx)?),
            x => return Err(tuple.unknown(x)),
        };

        tuple.end(d)?;
        Ok(voter)
    }
}

impl<C> minicbor::Encode<C> for Voter {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        match self {
            Voter::ConstitutionalCommitteeKey(x) => e.encode_with((0, x), ctx)?,
            Voter::ConstitutionalCommitteeScript(x) => e.encode_with((1, x), ctx)?,
            Voter::DRepKey(x) => e.encode_with((2, x), ctx)?,
            Voter::DRepScript(x) => e.encode_with((3, x), ctx)?,
            Voter::StakePoolKey(x) => e.encode_with((4, x), ctx)?,
        };

        Ok(())
    }
}

#[derive(
    Serialize, Deserialize, Encode, Decode, Debug, PartialEq, Eq, Clone, Copy, PartialOrd, Ord, Hash,
)]
#[cbor(index_only)]
pub enum Language {
    #[n(0)]
    PlutusV1,

    #[n(1)]
    PlutusV2,

    #[n(2)]
    PlutusV3,
}

/// Cost models indexed by language
///
/// Languages this crate doesn't know about are kept in `unknown` so that a
/// parameter update can be re-encoded without losing them.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Default)]
pub struct CostModels {
    pub plutus_v1: Option<CostModel>,
    pub plutus_v2: Option<CostModel>,
    pub plutus_v3: Option<CostModel>,
    pub unknown: BTreeMap<u64, CostModel>,
}

impl CostModels {
    pub fn get(&self, language: Language) -> Option<&CostModel> {
        match language {
            Language::PlutusV1 => self.plutus_v1.as_ref(),
            Language::PlutusV2 => self.plutus_v2.as_ref(),
            Language::PlutusV3 => self.plutus_v3.as_ref(),
        }
    }
}

impl<'b, C> minicbor::Decode<'b, C> for CostModels {
    fn decode(d: &mut minicbor::Decoder<'b>, ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
        let models: BTreeMap<u64, CostModel> = d.decode_with(ctx)?;

        let mut out = CostModels::default();

        for (k, v) in models.into_iter() {
            match k {
                0 => out.plutus_v1 = Some(v),
                1 => out.plutus_v2 = Some(v),
                2 => out.plutus_v3 = Some(v),
                _ => {
                    out.unknown.insert(k, v);
                }
            }
        }

        Ok(out)
    }
}

impl<C> minicbor::Encode<C> for CostModels {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        let known = [&self.plutus_v1, &self.plutus_v2, &self.plutus_v3];
        let len = known.iter().filter(|x| x.is_some()).count() + self.unknown.len();

        e.map(len as u64)?;

        for (k, model) in known.into_iter().enumerate() {
            if let Some(model) = model {
                e.u64(k as u64)?;
                e.encode_with(model, ctx)?;
            }
        }

        for (k, model) in self.unknown.iter() {
            e.u64(*k)?;
            e.encode_with(model, ctx)?;
        }

        Ok(())
    }
}

/// Proposed protocol parameter changes, a sparse map where every key is
/// optional
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Default)]
pub struct ProtocolParamUpdate {
    pub minfee_a: Option<u64>,
    pub minfee_b: Option<u64>,
    pub max_block_body_size: Option<u64>,
    pub max_transaction_size: Option<u64>,
    pub max_block_header_size: Option<u64>,
    pub key_deposit: Option<Coin>,
    pub pool_deposit: Option<Coin>,
    pub maximum_epoch: Option<Epoch>,
    pub desired_number_of_stake_pools: Option<u64>,
    pub pool_pledge_influence: Option<RationalNumber>,
    pub expansion_rate: Option<UnitInterval>,
    pub treasury_growth_rate: Option<UnitInterval>,

    pub min_pool_cost: Option<Coin>,
    pub ada_per_utxo_byte: Option<Coin>,
    pub cost_models_for_script_languages: Option<CostModels>,
    pub execution_costs: Option<ExUnitPrices>,
    pub max_tx_ex_units: Option<ExUnits>,
    pub max_block_ex_units: Option<ExUnits>,
    pub max_value_size: Option<u64>,
    pub collateral_percentage: Option<u64>,
    pub max_collateral_inputs: Option<u64>,

    pub pool_voting_thresholds: Option<PoolVotingThresholds>,
    pub drep_voting_thresholds: Option<DRepVotingThresholds>,
    pub min_committee_size: Option<u64>,
    pub committee_term_limit: Option<Epoch>,
    pub governance_action_validity_period: Option<Epoch>,
    pub governance_action_deposit: Option<Coin>,
    pub drep_deposit: Option<Coin>,
    pub drep_inactivity_period: Option<Epoch>,
    pub minfee_refscript_cost_per_byte: Option<RationalNumber>,

    #[serde(skip)]
    pub layout: KeyOrder,
}

/// Codec for a record whose fields are all optional, keyed as listed
macro_rules! sparse_record {
    ($name:ident, { $($key:literal => $field:ident),* $(,)? }) => {
        impl $name {
            fn present_keys(&self) -> Vec<u64> {
                let mut keys = Vec::new();
                $(
                    if self.$field.is_some() {
                        keys.push($key);
                    }
                )*
                keys
            }
        }

        impl<'b, C> minicbor::Decode<'b, C> for $name {
            fn decode(
                d: &mut minicbor::Decoder<'b>,
                ctx: &mut C,
            ) -> Result<Self, minicbor::decode::Error> {
                let mut fields = Fields::begin(d, stringify!($name))?;
                let mut out = $name::default();

                while let Some(key) = fields.next_key(d)? {
                    match key {
                        $($key => out.$field = Some(d.decode_with(ctx)?),)*
                        x => return Err(fields.unknown(x)),
                    }
                }

                out.layout = fields.layout();

                Ok(out)
            }
        }

        impl<C> minicbor::Encode<C> for $name {
            fn encode<W: minicbor::encode::Write>(
                &self,
                e: &mut minicbor::Encoder<W>,
                ctx: &mut C,
            ) -> Result<(), minicbor::encode::Error<W::Error>> {
                encode_record(e, &self.layout, &self.present_keys(), |key, e| {
                    match key {
                        $($key => {
                            e.encode_with(&self.$field, ctx)?;
                        })*
                        _ => (),
                    }

                    Ok(())
                })
            }
        }
    };
}

sparse_record!(ProtocolParamUpdate, {
        0 => minfee_a,
        1 => minfee_b,
        2 => max_block_body_size,
        3 => max_transaction_size,
        4 => max_block_header_size,
        5 => key_deposit,
        6 => pool_deposit,
        7 => maximum_epoch,
        8 => desired_number_of_stake_pools,
        9 => pool_pledge_influence,
        10 => expansion_rate,
        11 => treasury_growth_rate,
        16 => min_pool_cost,
        17 => ada_per_utxo_byte,
        18 => cost_models_for_script_languages,
        19 => execution_costs,
        20 => max_tx_ex_units,
        21 => max_block_ex_units,
        22 => max_value_size,
        23 => collateral_percentage,
        24 => max_collateral_inputs,
        25 => pool_voting_thresholds,
        26 => drep_voting_thresholds,
        27 => min_committee_size,
        28 => committee_term_limit,
        29 => governance_action_validity_period,
        30 => governance_action_deposit,
        31 => drep_deposit,
        32 => drep_inactivity_period,
        33 => minfee_refscript_cost_per_byte,
});

#[derive(Encode, Decode, Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
pub struct PoolVotingThresholds {
    #[n(0)]
    pub motion_no_confidence: UnitInterval,
    #[n(1)]
    pub committee_normal: UnitInterval,
    #[n(2)]
    pub committee_no_confidence: UnitInterval,
    #[n(3)]
    pub hard_fork_initiation: UnitInterval,
    #[n(4)]
    pub security_voting_threshold: UnitInterval,
}

#[derive(Encode, Decode, Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
pub struct DRepVotingThresholds {
    #[n(0)]
    pub motion_no_confidence: UnitInterval,
    #[n(1)]
    pub committee_normal: UnitInterval,
    #[n(2)]
    pub committee_no_confidence: UnitInterval,
    #[n(3)]
    pub update_constitution: UnitInterval,
    #[n(4)]
    pub hard_fork_initiation: UnitInterval,
    #[n(5)]
    pub pp_network_group: UnitInterval,
    #[n(6)]
    pub pp_economic_group: UnitInterval,
    #[n(7)]
    pub pp_technical_group: UnitInterval,
    #[n(8)]
    pub pp_governance_group: UnitInterval,
    #[n(9)]
    pub treasury_withdrawal: UnitInterval,
}
