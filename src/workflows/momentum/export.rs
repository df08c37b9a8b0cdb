use super::scoring::ScoredDeal;
use super::signals::MomentumSignal;
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to {operation} {}: {source}", .path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode results table: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Serialize)]
struct ResultRow<'a> {
    deal_id: &'a str,
    deal_name: &'a str,
    engagement_depth: u8,
    stakeholder_expansion: u8,
    internal_activity: u8,
    reciprocity: u8,
    organizational_energy: u8,
    total_score: i32,
    band_id: &'a str,
    band_label: &'a str,
    weakest_signals: String,
    weakest_score: u8,
}

impl<'a> ResultRow<'a> {
    fn from_deal(deal: &'a ScoredDeal) -> Self {
        let scores = &deal.scores;
        Self {
            deal_id: &deal.deal_id,
            deal_name: &deal.deal_name,
            engagement_depth: scores.get(MomentumSignal::EngagementDepth),
            stakeholder_expansion: scores.get(MomentumSignal::StakeholderExpansion),
            internal_activity: scores.get(MomentumSignal::InternalActivity),
            reciprocity: scores.get(MomentumSignal::Reciprocity),
            organizational_energy: scores.get(MomentumSignal::OrganizationalEnergy),
            total_score: deal.total_score,
            band_id: &deal.band.id,
            band_label: &deal.band.label,
            weakest_signals: deal.weakest_signals_joined(),
            weakest_score: deal.weakest_score,
        }
    }
}

/// Encode scored deals as the results table, header row included.
pub fn results_csv(deals: &[ScoredDeal]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(Vec::new());
    for deal in deals {
        writer.serialize(ResultRow::from_deal(deal))?;
    }
    writer
        .into_inner()
        .map_err(|err| ExportError::Csv(csv::Error::from(err.into_error())))
}

pub fn write_results_csv(deals: &[ScoredDeal], path: &Path) -> Result<(), ExportError> {
    let bytes = results_csv(deals)?;
    write_atomic(path, &bytes)
}

pub fn write_report(markdown: &str, path: &Path) -> Result<(), ExportError> {
    write_atomic(path, markdown.as_bytes())
}

/// Write the whole payload to a sibling temp file, then rename it over `path`.
/// The temp file is removed again if any step fails.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), ExportError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error("create directory", parent))?;
    }

    let tmp_path = temp_path_for(path);
    let result = write_then_rename(&tmp_path, path, contents);
    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}

fn write_then_rename(tmp_path: &Path, path: &Path, contents: &[u8]) -> Result<(), ExportError> {
    let mut file = File::create(tmp_path).map_err(io_error("create", tmp_path))?;
    file.write_all(contents)
        .and_then(|()| file.sync_all())
        .map_err(io_error("write", tmp_path))?;
    drop(file);

    fs::rename(tmp_path, path).map_err(io_error("replace", path))
}

fn io_error(operation: &'static str, path: &Path) -> impl FnOnce(std::io::Error) -> ExportError {
    let path = path.to_path_buf();
    move |source| ExportError::Io {
        operation,
        path,
        source,
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::momentum::deals::{deal_row, validate_row};
    use crate::workflows::momentum::framework::reference_framework;
    use crate::workflows::momentum::scoring::MomentumEngine;

    fn scored_deal(id: &str, values: [&str; MomentumSignal::COUNT]) -> ScoredDeal {
        let engine = MomentumEngine::new(reference_framework());
        engine
            .score(validate_row(&deal_row(2, id, values)).expect("row validates"))
            .expect("deal scores")
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "pipeline-momentum-export-{name}-{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn results_table_has_fixed_columns() {
        let deals = vec![
            scored_deal("D-1", ["4", "2", "3", "4", "3"]),
            scored_deal("D-2", ["2", "2", "5", "5", "5"]),
        ];

        let csv = String::from_utf8(results_csv(&deals).expect("csv encodes")).expect("utf8");
        let lines: Vec<&str> = csv.split_terminator("\r\n").collect();

        assert_eq!(
            lines[0],
            "deal_id,deal_name,engagement_depth,stakeholder_expansion,internal_activity,\
             reciprocity,organizational_energy,total_score,band_id,band_label,\
             weakest_signals,weakest_score"
        );
        assert_eq!(
            lines[1],
            "D-1,Deal D-1,4,2,3,4,3,16,conditional,Conditional,stakeholder_expansion,2"
        );
        assert_eq!(
            lines[2],
            "D-2,Deal D-2,2,2,5,5,5,19,conditional,Conditional,\
             \"engagement_depth, stakeholder_expansion\",2"
        );
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn atomic_write_creates_directories_and_leaves_no_temp_file() {
        let dir = scratch_dir("atomic");
        let target = dir.join("nested").join("report.md");

        write_report("first\n", &target).expect("first write");
        write_report("second\n", &target).expect("overwrite");

        assert_eq!(fs::read_to_string(&target).expect("read back"), "second\n");
        assert!(!temp_path_for(&target).exists());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn failed_replace_removes_temp_file() {
        let dir = scratch_dir("failed-replace");
        let target = dir.join("results.csv");
        fs::create_dir_all(target.join("occupied")).expect("directory in the way");

        let err = write_report("payload\n", &target).expect_err("cannot replace a directory");
        assert!(matches!(err, ExportError::Io { operation: "replace", .. }));
        assert!(!temp_path_for(&target).exists());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn temp_path_is_a_sibling() {
        assert_eq!(
            temp_path_for(Path::new("output/results.csv")),
            PathBuf::from("output/results.csv.tmp")
        );
    }
}
