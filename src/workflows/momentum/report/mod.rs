mod document;
mod ranking;
mod summary;
pub mod views;

pub use document::MomentumReport;
pub use ranking::{rank_at_risk, TOP_AT_RISK};
pub use summary::{summarize, FrequencyTable, MomentumSummary, ReportError};

#[cfg(test)]
mod tests;
