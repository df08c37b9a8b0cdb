use super::super::scoring::ScoredDeal;
use super::views::{FrequencyEntry, MomentumSummaryView};
use std::collections::HashMap;

/// Insertion-ordered tally whose ranking breaks count ties by first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    entries: Vec<(String, usize)>,
    positions: HashMap<String, usize>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, key: &str) {
        match self.positions.get(key) {
            Some(&position) => self.entries[position].1 += 1,
            None => {
                self.positions.insert(key.to_string(), self.entries.len());
                self.entries.push((key.to_string(), 1));
            }
        }
    }

    pub fn count(&self, key: &str) -> usize {
        self.positions
            .get(key)
            .map(|&position| self.entries[position].1)
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries by descending count; equal counts keep first-seen order.
    pub fn most_common(&self) -> Vec<(&str, usize)> {
        let mut ranked: Vec<(&str, usize)> = self
            .entries
            .iter()
            .map(|(key, count)| (key.as_str(), *count))
            .collect();
        ranked.sort_by(|left, right| right.1.cmp(&left.1));
        ranked
    }

    pub fn to_entries(&self) -> Vec<FrequencyEntry> {
        self.most_common()
            .into_iter()
            .map(|(key, count)| FrequencyEntry {
                key: key.to_string(),
                count,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReportError {
    #[error("cannot summarize an empty set of scored deals")]
    EmptyInput,
}

/// Corpus-level statistics over every scored deal in a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MomentumSummary {
    pub total_deals: usize,
    pub band_counts: FrequencyTable,
    pub weakest_signal_counts: FrequencyTable,
    pub lowest_total: i32,
    pub highest_total: i32,
}

impl MomentumSummary {
    pub fn view(&self) -> MomentumSummaryView {
        MomentumSummaryView {
            total_deals: self.total_deals,
            lowest_total: self.lowest_total,
            highest_total: self.highest_total,
            band_counts: self.band_counts.to_entries(),
            weakest_signal_counts: self.weakest_signal_counts.to_entries(),
        }
    }
}

pub fn summarize(deals: &[ScoredDeal]) -> Result<MomentumSummary, ReportError> {
    let (first, rest) = deals.split_first().ok_or(ReportError::EmptyInput)?;

    let mut band_counts = FrequencyTable::new();
    let mut weakest_signal_counts = FrequencyTable::new();
    let mut lowest_total = first.total_score;
    let mut highest_total = first.total_score;

    for deal in std::iter::once(first).chain(rest) {
        band_counts.record(&deal.band.label);
        for signal in &deal.weakest_signals {
            weakest_signal_counts.record(signal.key());
        }
        lowest_total = lowest_total.min(deal.total_score);
        highest_total = highest_total.max(deal.total_score);
    }

    Ok(MomentumSummary {
        total_deals: deals.len(),
        band_counts,
        weakest_signal_counts,
        lowest_total,
        highest_total,
    })
}
