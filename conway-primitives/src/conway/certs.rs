use conway_codec::minicbor;
use serde::{Deserialize, Serialize};

use super::Anchor;
use crate::{
    AddrKeyhash, Coin, Epoch, PoolKeyhash, PoolMetadata, Relay, RewardAccount, ScriptHash, Set,
    StakeCredential, Tuple, UnitInterval, VrfKeyhash,
};

pub type DRepCredential = StakeCredential;

pub type CommitteeColdCredential = StakeCredential;

pub type CommitteeHotCredential = StakeCredential;

/*
pool_params =
  ( operator       : pool_keyhash
  , vrf_keyhash    : vrf_keyhash
  , pledge         : coin
  , cost           : coin
  , margin         : unit_interval
  , reward_account : reward_account
  , pool_owners    : set<addr_keyhash>
  , relays         : [* relay]
  , pool_metadata  : pool_metadata / null
  )
*/
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
pub struct PoolParams {
    pub operator: PoolKeyhash,
    pub vrf_keyhash: VrfKeyhash,
    pub pledge: Coin,
    pub cost: Coin,
    pub margin: UnitInterval,
    pub reward_account: RewardAccount,
    pub pool_owners: Set<AddrKeyhash>,
    pub relays: Vec<Relay>,
    pub pool_metadata: Option<PoolMetadata>,
}

impl PoolParams {
    // a group, inlined into the enclosing certificate array
    const FIELDS: u64 = 9;

    fn decode_fields<C>(
        d: &mut minicbor::Decoder<'_>,
        ctx: &mut C,
    ) -> Result<Self, minicbor::decode::Error> {
        Ok(Self {
            operator: d.decode_with(ctx)?,
            vrf_keyhash: d.decode_with(ctx)?,
            pledge: d.decode_with(ctx)?,
            cost: d.decode_with(ctx)?,
            margin: d.decode_with(ctx)?,
            reward_account: d.decode_with(ctx)?,
            pool_owners: d.decode_with(ctx)?,
            relays: d.decode_with(ctx)?,
            pool_metadata: d.decode_with(ctx)?,
        })
    }

    fn encode_fields<C, W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        e.encode_with(self.operator, ctx)?;
        e.encode_with(self.vrf_keyhash, ctx)?;
        e.encode_with(self.pledge, ctx)?;
        e.encode_with(self.cost, ctx)?;
        e.encode_with(self.margin, ctx)?;
        e.encode_with(&self.reward_account, ctx)?;
        e.encode_with(&self.pool_owners, ctx)?;
        e.encode_with(&self.relays, ctx)?;
        e.encode_with(&self.pool_metadata, ctx)?;

        Ok(())
    }
}

/// Conway certificates
///
/// The Shelley genesis delegation (5) and MIR (6) certificates were removed
/// in Conway and fail to decode.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
pub enum Certificate {
    StakeRegistration(StakeCredential),
    StakeDeregistration(StakeCredential),
    StakeDelegation(StakeCredential, PoolKeyhash),
    PoolRegistration(PoolParams),
    PoolRetirement(PoolKeyhash, Epoch),

    Reg(StakeCredential, Coin),
    UnReg(StakeCredential, Coin),
    VoteDeleg(StakeCredential, DRep),
    StakeVoteDeleg(StakeCredential, PoolKeyhash, DRep),
    StakeRegDeleg(StakeCredential, PoolKeyhash, Coin),
    VoteRegDeleg(StakeCredential, DRep, Coin),
    StakeVoteRegDeleg(StakeCredential, PoolKeyhash, DRep, Coin),

    AuthCommitteeHot(CommitteeColdCredential, CommitteeHotCredential),
    ResignCommitteeCold(CommitteeColdCredential, Option<Anchor>),
    RegDRepCert(DRepCredential, Coin, Option<Anchor>),
    UnRegDRepCert(DRepCredential, Coin),
    UpdateDRepCert(DRepCredential, Option<Anchor>),
}

impl Certificate {
    pub fn discriminant(&self) -> u64 {
        match self {
            Certificate::StakeRegistration(..) => 0,
            Certificate::StakeDeregistration(..) => 1,
            Certificate::StakeDelegation(..) => 2,
            Certificate::PoolRegistration(..) => 3,
            Certificate::PoolRetirement(..) => 4,
            Certificate::Reg(..) => 7,
            Certificate::UnReg(..) => 8,
            Certificate::VoteDeleg(..) => 9,
            Certificate::StakeVoteDeleg(..) => 10,
            Certificate::StakeRegDeleg(..) => 11,
            Certificate::VoteRegDeleg(..) => 12,
            Certificate::StakeVoteRegDeleg(..) => 13,
            Certificate::AuthCommitteeHot(..) => 14,
            Certificate::ResignCommitteeCold(..) => 15,
            Certificate::RegDRepCert(..) => 16,
            Certificate::UnRegDRepCert(..) => 17,
            Certificate::UpdateDRepCert(..) => 18,
        }
    }
}

impl<'b, C> minicbor::Decode<'b, C> for Certificate {
    fn decode(d: &mut minicbor::Decoder<'b>, ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
        let tuple = Tuple::begin(d, "Certificate")?;

        let certificate = match tuple.discriminant(d)? {
            0 => {
                tuple.arity(2)?;
                Certificate::StakeRegistration(d.decode_with(ctx)?)
            }
            1 => {
                tuple.arity(2)?;
                Certificate::StakeDeregistration(d.decode_with(ctx)?)
            }
            2 => {
                tuple.arity(3)?;
                Certificate::StakeDelegation(d.decode_with(ctx)?, d.decode_with(ctx)?)
            }
            3 => {
                tuple.arity(1 + PoolParams::FIELDS)?;
                Certificate::PoolRegistration(PoolParams::decode_fields(d, ctx)?)
            }
            4 => {
                tuple.arity(3)?;
                Certificate::PoolRetirement(d.decode_with(ctx)?, d.decode_with(ctx)?)
            }
            7 => {
                tuple.arity(3)?;
                Certificate::Reg(d.decode_with(ctx)?, d.decode_with(ctx)?)
            }
            8 => {
                tuple.arity(3)?;
                Certificate::UnReg(d.decode_with(ctx)?, d.decode_with(ctx)?)
            }
            9 => {
                tuple.arity(3)?;
                Certificate::VoteDeleg(d.decode_with(ctx)?, d.decode_with(ctx)?)
            }
            10 => {
                tuple.arity(4)?;
                Certificate::StakeVoteDeleg(
                    d.decode_with(ctx)?,
                    d.decode_with(ctx)?,
                    d.decode_with(ctx)?,
                )
            }
            11 => {
                tuple.arity(4)?;
                Certificate::StakeRegDeleg(
                    d.decode_with(ctx)?,
                    d.decode_with(ctx)?,
                    d.decode_with(ctx)?,
                )
            }
            12 => {
                tuple.arity(4)?;
                Certificate::VoteRegDeleg(
                    d.decode_with(ctx)?,
                    d.decode_with(ctx)?,
                    d.decode_with(ctx)?,
                )
            }
            13 => {
                tuple.arity(5)?;
                Certificate::StakeVoteRegDeleg(
                    d.decode_with(ctx)?,
                    d.decode_with(ctx)?,
                    d.decode_with(ctx)?,
                    d.decode_with(ctx)?,
                )
            }
            14 => {
                tuple.arity(3)?;
                Certificate::AuthCommitteeHot(d.decode_with(ctx)?, d.decode_with(ctx)?)
            }
            15 => {
                tuple.arity(3)?;
                Certificate::ResignCommitteeCold(d.decode_with(ctx)?, d.decode_with(ctx)?)
            }
            16 => {
                tuple.arity(4)?;
                Certificate::RegDRepCert(
                    d.decode_with(ctx)?,
                    d.decode_with(ctx)?,
                    d.decode_with(ctx)?,
                )
            }
            17 => {
                tuple.arity(3)?;
                Certificate::UnRegDRepCert(d.decode_with(ctx)?, d.decode_with(ctx)?)
            }
            18 => {
                tuple.arity(3)?;
                Certificate::UpdateDRepCert(d.decode_with(ctx)?, d.decode_with(ctx)?)
            }
            x => return Err(tuple.unknown(x)),
        };

        tuple.end(d)?;
        Ok(certificate)
    }
}

impl<C> minicbor::Encode<C> for Certificate {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        let tag = self.discriminant();

        match self {
            Certificate::StakeRegistration(a) | Certificate::StakeDeregistration(a) => {
                e.encode_with((tag, a), ctx)?;
            }
            Certificate::StakeDelegation(a, b) => {
                e.encode_with((tag, a, b), ctx)?;
            }
            Certificate::PoolRegistration(params) => {
                e.array(1 + PoolParams::FIELDS)?;
                e.u64(tag)?;
                params.encode_fields(e, ctx)?;
            }
            Certificate::PoolRetirement(a, b) => {
                e.encode_with((tag, a, b), ctx)?;
            }
            Certificate::Reg(a, b) | Certificate::UnReg(a, b) | Certificate::UnRegDRepCert(a, b) => {
                e.encode_with((tag, a, b), ctx)?;
            }
            Certificate::VoteDeleg(a, b) => {
                e.encode_with((tag, a, b), ctx)?;
            }
            Certificate::StakeVoteDeleg(a, b, c) => {
                e.encode_with((tag, a, b, c), ctx)?;
            }
            Certificate::StakeRegDeleg(a, b, c) => {
                e.encode_with((tag, a, b, c), ctx)?;
            }
            Certificate::VoteRegDeleg(a, b, c) => {
                e.encode_with((tag, a, b, c), ctx)?;
            }
            Certificate::StakeVoteRegDeleg(a, b, c, d) => {
                e.encode_with((tag, a, b, c, d), ctx)?;
            }
            Certificate::AuthCommitteeHot(a, b) => {
                e.encode_with((tag, a, b), ctx)?;
            }
            Certificate::ResignCommitteeCold(a, b) | Certificate::UpdateDRepCert(a, b) => {
                e.encode_with((tag, a, b), ctx)?;
            }
            Certificate::RegDRepCert(a, b, c) => {
                e.encode_with((tag, a, b, c), ctx)?;
            }
        }

        Ok(())
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, PartialOrd, Eq, Ord, Clone, Hash)]
pub enum DRep {
    Key(AddrKeyhash),
    Script(ScriptHash),
    Abstain,
    NoConfidence,
}

impl<'b, C> minicbor::Decode<'b, C> for DRep {
    fn decode(d: &mut minicbor::Decoder<'b>, ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
        let tuple = Tuple::begin(d, "DRep")?;

        let drep = match tuple.discriminant(d)? {
            0 => {
                tuple.arity(2)?;
                DRep::Key(d.decode_with(ctx)?)
            }
            1 => {
                tuple.arity(2)?;
                DRep::Script(d.decode_with(ctx)?)
            }
            2 => {
                tuple.arity(1)?;
                DRep::Abstain
            }
            3 => {
                tuple.arity(1)?;
                DRep::NoConfidence
            }
            x => return Err(tuple.unknown(x)),
        };

        tuple.end(d)?;
        Ok(drep)
    }
}

impl<C> minicbor::Encode<C> for DRep {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        match self {
            DRep::Key(x) => e.encode_with((0, x), ctx)?,
            DRep::Script(x) => e.encode_with((1, x), ctx)?,
            DRep::Abstain => e.array(1)?.u8(2)?,
            DRep::NoConfidence => e.array(1)?.u8(3)?,
        };

        Ok(())
    }
}
