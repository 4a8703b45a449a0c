use std::collections::BTreeMap;

use conway_codec::minicbor::{self, Encode};
use conway_crypto::hash::{Hash, Hasher};
use serde::{Deserialize, Serialize};

use super::{CostModels, Language, Redeemers, WitnessSet};
use crate::{CostModel, NonEmptySet, PlutusData, ToHash};

/// Cost models of the languages a transaction uses, as they enter the script
/// data hash
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LanguageViews(pub BTreeMap<Language, CostModel>);

impl LanguageViews {
    /// Picks the cost models of `languages` out of the protocol parameters,
    /// skipping those that have none
    pub fn for_languages(
        cost_models: &CostModels,
        languages: impl IntoIterator<Item = Language>,
    ) -> Self {
        languages
            .into_iter()
            .filter_map(|lang| cost_models.get(lang).map(|model| (lang, model.clone())))
            .collect()
    }
}

impl FromIterator<(Language, CostModel)> for LanguageViews {
    fn from_iter<I: IntoIterator<Item = (Language, CostModel)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// PlutusV1 views keep the historical quirk: the key is the serialized
// language id and the model is an indefinite array, both wrapped in bytes
struct LegacyCostModel<'a>(&'a CostModel);

impl<C> Encode<C> for LegacyCostModel<'_> {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        e.begin_array()?;

        for v in self.0.iter() {
            e.encode_with(v, ctx)?;
        }

        e.end()?;
        Ok(())
    }
}

impl<C> Encode<C> for LanguageViews {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        e.map(self.0.len() as u64)?;

        // canonical key order: integer keys first, V1's 0x4100 last
        let modern = self.0.iter().filter(|(lang, _)| **lang != Language::PlutusV1);

        for (lang, model) in modern {
            e.encode_with(lang, ctx)?;
            e.encode_with(model, ctx)?;
        }

        if let Some(model) = self.0.get(&Language::PlutusV1) {
            let inner = minicbor::to_vec(LegacyCostModel(model))
                .map_err(|err| minicbor::encode::Error::message(err.to_string()))?;

            e.bytes(&[0x00])?;
            e.bytes(&inner)?;
        }

        Ok(())
    }
}

/// Everything the `script_data_hash` of a transaction body commits to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptData {
    pub redeemers: Option<Redeemers>,
    pub datums: Option<NonEmptySet<PlutusData>>,
    pub language_views: Option<LanguageViews>,
}

impl ScriptData {
    pub fn build_for(witness: &WitnessSet, language_views: &Option<LanguageViews>) -> Option<Self> {
        let redeemers = witness.redeemer.clone();
        let datums = witness.plutus_data.clone();

        if redeemers.is_none() && datums.is_none() {
            return None;
        }

        let language_views = match redeemers {
            Some(_) => language_views.clone(),
            None => None,
        };

        Some(ScriptData {
            redeemers,
            datums,
            language_views,
        })
    }
}

impl ToHash<32> for ScriptData {
    fn to_hash(&self) -> Result<Hash<32>, conway_codec::Error> {
        let mut buf = vec![];

        match &self.redeemers {
            Some(redeemers) => minicbor::encode(redeemers, &mut buf)?,
            None => buf.push(0xa0),
        }

        if let Some(datums) = &self.datums {
            minicbor::encode(datums, &mut buf)?;
        }

        match &self.language_views {
            Some(views) => minicbor::encode(views, &mut buf)?,
            None => buf.push(0xa0),
        }

        Ok(Hasher::<256>::hash(&buf))
    }
}
