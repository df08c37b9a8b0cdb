use super::deals::{load_deal_rows, validate_row, DealRow, DealSourceError, RowValidationError};
use super::export::{write_report, write_results_csv, ExportError};
use super::framework::{BandLookupError, FrameworkLoadError, MomentumFramework};
use super::report::{MomentumReport, ReportError};
use super::scoring::{MomentumEngine, ScoredDeal};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const RESULTS_FILE_NAME: &str = "pipeline_momentum_results.csv";
pub const REPORT_FILE_NAME: &str = "pipeline_momentum_report.md";

/// What to do when a deal row fails validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowErrorPolicy {
    /// Abort on the first invalid row.
    #[default]
    FailFast,
    /// Validate every row, then abort with all failures together.
    CollectAll,
}

impl RowErrorPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "fail-fast" | "fail_fast" | "failfast" => Some(Self::FailFast),
            "collect" | "collect-all" | "collect_all" => Some(Self::CollectAll),
            _ => None,
        }
    }
}

/// Every invalid row found under [`RowErrorPolicy::CollectAll`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowValidationErrors(pub Vec<RowValidationError>);

impl fmt::Display for RowValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} invalid deal row(s)", self.0.len())?;
        for err in &self.0 {
            write!(f, "\n  {err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for RowValidationErrors {}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Framework(#[from] FrameworkLoadError),
    #[error(transparent)]
    Deals(#[from] DealSourceError),
    #[error("invalid deal row: {0}")]
    Row(#[from] RowValidationError),
    #[error(transparent)]
    Rows(#[from] RowValidationErrors),
    #[error("broken framework bands: {0}")]
    Bands(#[from] BandLookupError),
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Input and output locations for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelinePaths {
    pub framework: PathBuf,
    pub deals: PathBuf,
    pub output_dir: PathBuf,
}

impl PipelinePaths {
    pub fn results_path(&self) -> PathBuf {
        self.output_dir.join(RESULTS_FILE_NAME)
    }

    pub fn report_path(&self) -> PathBuf {
        self.output_dir.join(REPORT_FILE_NAME)
    }
}

/// Everything a run produced, kept for console rendering after the files are written.
#[derive(Debug)]
pub struct PipelineOutcome {
    pub framework_name: String,
    pub deals: Vec<ScoredDeal>,
    pub results_path: PathBuf,
    pub report_path: PathBuf,
}

impl PipelineOutcome {
    pub fn report(&self) -> Result<MomentumReport<'_>, ReportError> {
        MomentumReport::build(&self.framework_name, &self.deals)
    }
}

/// One-pass scoring pipeline: validate, score, summarize, write.
#[derive(Debug, Clone)]
pub struct MomentumPipeline {
    engine: MomentumEngine,
    policy: RowErrorPolicy,
}

impl MomentumPipeline {
    pub fn new(framework: MomentumFramework, policy: RowErrorPolicy) -> Self {
        Self {
            engine: MomentumEngine::new(framework),
            policy,
        }
    }

    pub fn from_framework_path(
        path: &Path,
        policy: RowErrorPolicy,
    ) -> Result<Self, PipelineError> {
        let framework = MomentumFramework::from_path(path)?;
        info!(
            framework = framework.name(),
            bands = framework.bands().len(),
            path = %path.display(),
            "loaded momentum framework"
        );
        Ok(Self::new(framework, policy))
    }

    pub fn framework(&self) -> &MomentumFramework {
        self.engine.framework()
    }

    /// Validate and score every row; no deal is returned unless all rows pass.
    pub fn score_rows(&self, rows: &[DealRow]) -> Result<Vec<ScoredDeal>, PipelineError> {
        let validated = match self.policy {
            RowErrorPolicy::FailFast => rows
                .iter()
                .map(validate_row)
                .collect::<Result<Vec<_>, _>>()?,
            RowErrorPolicy::CollectAll => {
                let (valid, invalid): (Vec<_>, Vec<_>) =
                    rows.iter().map(validate_row).partition(Result::is_ok);
                let errors: Vec<RowValidationError> =
                    invalid.into_iter().filter_map(Result::err).collect();
                if !errors.is_empty() {
                    return Err(RowValidationErrors(errors).into());
                }
                valid.into_iter().filter_map(Result::ok).collect()
            }
        };

        let mut scored = Vec::with_capacity(validated.len());
        for deal in validated {
            let deal = self.engine.score(deal)?;
            debug!(
                deal_id = %deal.deal_id,
                line = deal.line,
                total = deal.total_score,
                band = %deal.band.id,
                "scored deal"
            );
            scored.push(deal);
        }

        Ok(scored)
    }

    /// Render both outputs fully in memory before touching the filesystem.
    pub fn write_outputs(
        &self,
        deals: &[ScoredDeal],
        paths: &PipelinePaths,
    ) -> Result<(PathBuf, PathBuf), PipelineError> {
        let report = MomentumReport::build(self.framework().name(), deals)?;
        let markdown = report.to_markdown();

        let results_path = paths.results_path();
        let report_path = paths.report_path();
        write_results_csv(deals, &results_path)?;
        write_report(&markdown, &report_path)?;
        info!(
            results = %results_path.display(),
            report = %report_path.display(),
            "wrote momentum outputs"
        );

        Ok((results_path, report_path))
    }

    pub fn run(&self, paths: &PipelinePaths) -> Result<PipelineOutcome, PipelineError> {
        let rows = load_deal_rows(&paths.deals)?;
        info!(rows = rows.len(), path = %paths.deals.display(), "read deal rows");

        let deals = self.score_rows(&rows)?;
        info!(deals = deals.len(), "scored deals");

        let (results_path, report_path) = self.write_outputs(&deals, paths)?;

        Ok(PipelineOutcome {
            framework_name: self.framework().name().to_string(),
            deals,
            results_path,
            report_path,
        })
    }
}

/// Load the framework named in `paths` and run the whole pipeline.
pub fn run_pipeline(
    paths: &PipelinePaths,
    policy: RowErrorPolicy,
) -> Result<PipelineOutcome, PipelineError> {
    MomentumPipeline::from_framework_path(&paths.framework, policy)?.run(paths)
}
