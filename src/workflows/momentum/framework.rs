use super::signals::MomentumSignal;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const DEFAULT_FRAMEWORK_NAME: &str = "pipeline-momentum";
const INLINE_SOURCE: &str = "<inline>";

/// Inclusive score range mapped to a named health band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBand {
    pub id: String,
    pub label: String,
    pub min: i32,
    pub max: i32,
}

impl ScoreBand {
    pub fn contains(&self, score: i32) -> bool {
        self.min <= score && score <= self.max
    }
}

/// Failure to obtain a usable framework document.
#[derive(Debug, thiserror::Error)]
pub enum FrameworkLoadError {
    #[error("failed to read framework document {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed framework document {source_name}: {source}")]
    Parse {
        source_name: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("framework document defines no score bands")]
    NoBands,
}

/// The band table does not partition the score being looked up.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BandLookupError {
    #[error("score {score} matched no band; the framework has a gap")]
    Gap { score: i32 },
    #[error(
        "score {score} matched {} bands ({}); the framework has overlapping ranges",
        .band_ids.len(),
        .band_ids.join(", ")
    )]
    Overlap { score: i32, band_ids: Vec<String> },
}

#[derive(Debug, Deserialize)]
struct FrameworkDocument {
    #[serde(default)]
    framework_name: Option<String>,
    #[serde(default)]
    momentum_signals: Vec<SignalDeclaration>,
    scoring_model: ScoringModel,
}

#[derive(Debug, Deserialize)]
struct ScoringModel {
    total_score_interpretation: Vec<ScoreBand>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignalDeclaration {
    Name(String),
    Detailed {
        #[serde(default)]
        id: Option<String>,
        #[serde(default)]
        name: Option<String>,
    },
}

impl SignalDeclaration {
    fn into_name(self) -> Option<String> {
        match self {
            SignalDeclaration::Name(name) => Some(name),
            SignalDeclaration::Detailed { id, name } => id.or(name),
        }
    }
}

/// Immutable rubric definition: framework name, declared signals and score bands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MomentumFramework {
    name: String,
    declared_signals: Vec<String>,
    bands: Vec<ScoreBand>,
}

impl MomentumFramework {
    pub fn new(name: impl Into<String>, bands: Vec<ScoreBand>) -> Self {
        Self {
            name: name.into(),
            declared_signals: MomentumSignal::ordered()
                .iter()
                .map(|signal| signal.key().to_string())
                .collect(),
            bands,
        }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, FrameworkLoadError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| FrameworkLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file, &path.display().to_string())
    }

    /// Parse a framework document; `source_name` only labels parse errors.
    pub fn from_reader<R: Read>(reader: R, source_name: &str) -> Result<Self, FrameworkLoadError> {
        let document = serde_json::from_reader(reader).map_err(parse_error(source_name))?;
        Self::from_document(document)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, FrameworkLoadError> {
        let document = serde_json::from_str(raw).map_err(parse_error(INLINE_SOURCE))?;
        Self::from_document(document)
    }

    fn from_document(document: FrameworkDocument) -> Result<Self, FrameworkLoadError> {
        let bands = document.scoring_model.total_score_interpretation;
        if bands.is_empty() {
            return Err(FrameworkLoadError::NoBands);
        }

        let framework = Self {
            name: document
                .framework_name
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_FRAMEWORK_NAME.to_string()),
            declared_signals: document
                .momentum_signals
                .into_iter()
                .filter_map(SignalDeclaration::into_name)
                .collect(),
            bands,
        };
        framework.warn_on_signal_mismatch();

        Ok(framework)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bands(&self) -> &[ScoreBand] {
        &self.bands
    }

    pub fn declared_signals(&self) -> &[String] {
        &self.declared_signals
    }

    /// Declared names that are not one of the fixed signals.
    pub fn unknown_signals(&self) -> Vec<&str> {
        self.declared_signals
            .iter()
            .map(String::as_str)
            .filter(|name| MomentumSignal::from_key(name).is_none())
            .collect()
    }

    /// Fixed signals absent from a non-empty declaration list.
    pub fn undeclared_signals(&self) -> Vec<MomentumSignal> {
        if self.declared_signals.is_empty() {
            return Vec::new();
        }

        MomentumSignal::ordered()
            .into_iter()
            .filter(|signal| {
                !self
                    .declared_signals
                    .iter()
                    .any(|name| name.trim() == signal.key())
            })
            .collect()
    }

    fn warn_on_signal_mismatch(&self) {
        for name in self.unknown_signals() {
            warn!(
                framework = %self.name,
                signal = name,
                "framework declares an unknown momentum signal"
            );
        }
        for signal in self.undeclared_signals() {
            warn!(
                framework = %self.name,
                signal = signal.key(),
                "framework does not declare a scored momentum signal"
            );
        }
    }

    /// Resolve the single band whose inclusive range contains `score`.
    pub fn band_for_score(&self, score: i32) -> Result<&ScoreBand, BandLookupError> {
        let mut matches = self.bands.iter().filter(|band| band.contains(score));

        match (matches.next(), matches.next()) {
            (Some(band), None) => Ok(band),
            (None, _) => Err(BandLookupError::Gap { score }),
            (Some(first), Some(second)) => {
                let band_ids = [first, second]
                    .into_iter()
                    .chain(matches)
                    .map(|band| band.id.clone())
                    .collect();
                Err(BandLookupError::Overlap { score, band_ids })
            }
        }
    }

    /// Check that every score in `range` resolves to exactly one band.
    pub fn verify_partition(&self, range: RangeInclusive<i32>) -> Result<(), BandLookupError> {
        for score in range {
            self.band_for_score(score)?;
        }
        Ok(())
    }

    pub fn verify_reachable_partition(&self) -> Result<(), BandLookupError> {
        let (lowest, highest) = MomentumSignal::reachable_totals();
        self.verify_partition(lowest..=highest)
    }
}

fn parse_error(source_name: &str) -> impl FnOnce(serde_json::Error) -> FrameworkLoadError {
    let source_name = source_name.to_string();
    move |source| FrameworkLoadError::Parse {
        source_name,
        source,
    }
}

#[cfg(test)]
pub(crate) fn reference_framework() -> MomentumFramework {
    MomentumFramework::from_json_str(include_str!(
        "../../../json/pipeline-momentum-framework.json"
    ))
    .expect("reference framework parses")
}
