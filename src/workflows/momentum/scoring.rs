use super::deals::{SignalScores, ValidatedDeal};
use super::framework::{BandLookupError, MomentumFramework, ScoreBand};
use super::signals::MomentumSignal;
use serde::Serialize;
use std::collections::BTreeMap;

/// A validated deal with its total, band and weakest-signal diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredDeal {
    pub line: u64,
    pub deal_id: String,
    pub deal_name: String,
    pub scores: SignalScores,
    pub total_score: i32,
    pub band: ScoreBand,
    pub weakest_signals: Vec<MomentumSignal>,
    pub weakest_score: u8,
}

impl ScoredDeal {
    /// Weakest signal keys joined the way the results table and report print them.
    pub fn weakest_signals_joined(&self) -> String {
        self.weakest_signals
            .iter()
            .map(|signal| signal.key())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn view(&self) -> ScoredDealView {
        ScoredDealView {
            deal_id: self.deal_id.clone(),
            deal_name: self.deal_name.clone(),
            scores: self.scores.iter().collect(),
            total_score: self.total_score,
            band_id: self.band.id.clone(),
            band_label: self.band.label.clone(),
            weakest_signals: self.weakest_signals.clone(),
            weakest_score: self.weakest_score,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoredDealView {
    pub deal_id: String,
    pub deal_name: String,
    pub scores: BTreeMap<MomentumSignal, u8>,
    pub total_score: i32,
    pub band_id: String,
    pub band_label: String,
    pub weakest_signals: Vec<MomentumSignal>,
    pub weakest_score: u8,
}

/// Stateless scorer that applies a framework's band table to validated deals.
#[derive(Debug, Clone)]
pub struct MomentumEngine {
    framework: MomentumFramework,
}

impl MomentumEngine {
    pub fn new(framework: MomentumFramework) -> Self {
        Self { framework }
    }

    pub fn framework(&self) -> &MomentumFramework {
        &self.framework
    }

    pub fn score(&self, deal: ValidatedDeal) -> Result<ScoredDeal, BandLookupError> {
        let total_score = deal.scores.total();
        let band = self.framework.band_for_score(total_score)?.clone();
        let (weakest_signals, weakest_score) = deal.scores.weakest();

        Ok(ScoredDeal {
            line: deal.line,
            deal_id: deal.deal_id,
            deal_name: deal.deal_name,
            scores: deal.scores,
            total_score,
            band,
            weakest_signals,
            weakest_score,
        })
    }
}
