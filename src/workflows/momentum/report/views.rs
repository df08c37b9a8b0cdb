use super::super::scoring::ScoredDealView;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrequencyEntry {
    pub key: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MomentumSummaryView {
    pub total_deals: usize,
    pub lowest_total: i32,
    pub highest_total: i32,
    pub band_counts: Vec<FrequencyEntry>,
    pub weakest_signal_counts: Vec<FrequencyEntry>,
}

/// Machine-readable rendition of a full run for `--format json`.
#[derive(Debug, Clone, Serialize)]
pub struct MomentumReportView {
    pub framework_name: String,
    pub summary: MomentumSummaryView,
    pub at_risk: Vec<ScoredDealView>,
    pub deals: Vec<ScoredDealView>,
}
