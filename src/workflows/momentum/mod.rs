//! Pipeline momentum scoring: five buyer-side signals summed into a health band.

pub mod deals;
pub mod export;
pub mod framework;
mod pipeline;
pub mod report;
mod scoring;
mod signals;

pub use deals::{DealRow, DealSourceError, RowValidationError, SignalScores, ValidatedDeal};
pub use framework::{BandLookupError, FrameworkLoadError, MomentumFramework, ScoreBand};
pub use pipeline::{
    run_pipeline, MomentumPipeline, PipelineError, PipelineOutcome, PipelinePaths,
    RowErrorPolicy, RowValidationErrors, REPORT_FILE_NAME, RESULTS_FILE_NAME,
};
pub use report::{MomentumReport, MomentumSummary};
pub use scoring::{MomentumEngine, ScoredDeal, ScoredDealView};
pub use signals::{MomentumSignal, SIGNAL_MAX, SIGNAL_MIN};
