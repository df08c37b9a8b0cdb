use super::signals::{MomentumSignal, SIGNAL_MAX, SIGNAL_MIN};
use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};

pub const DEAL_ID_COLUMN: &str = "deal_id";
pub const DEAL_NAME_COLUMN: &str = "deal_name";

/// Untrusted deal record exactly as read from the input table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DealRow {
    line: u64,
    fields: BTreeMap<String, String>,
}

impl DealRow {
    pub fn new(line: u64, fields: BTreeMap<String, String>) -> Self {
        Self { line, fields }
    }

    pub fn from_pairs<K, V, I>(line: u64, pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self::new(
            line,
            pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }

    pub fn line(&self) -> u64 {
        self.line
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    pub fn deal_id(&self) -> &str {
        self.get(DEAL_ID_COLUMN).unwrap_or_default().trim()
    }

    pub fn deal_name(&self) -> &str {
        self.get(DEAL_NAME_COLUMN).unwrap_or_default().trim()
    }
}

impl fmt::Display for DealRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (position, (key, value)) in self.fields.iter().enumerate() {
            if position > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{key}: {value:?}")?;
        }
        write!(f, "}}")
    }
}

/// Failure to read the deal table itself, as opposed to a bad row.
#[derive(Debug, thiserror::Error)]
pub enum DealSourceError {
    #[error("failed to open deal table {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid deal table {source_name}: {source}")]
    Csv {
        source_name: String,
        #[source]
        source: csv::Error,
    },
    #[error("no deal rows found in {source_name}")]
    Empty { source_name: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalValueProblem {
    Missing,
    NotInteger { raw: String },
    OutOfRange { value: i64 },
}

impl fmt::Display for SignalValueProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalValueProblem::Missing => write!(f, "value is missing"),
            SignalValueProblem::NotInteger { raw } => write!(f, "{raw:?} is not an integer"),
            SignalValueProblem::OutOfRange { value } => {
                write!(f, "must be {SIGNAL_MIN}-{SIGNAL_MAX}, got {value}")
            }
        }
    }
}

/// A single deal row carried a missing, non-numeric or out-of-range signal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: invalid value for '{}': {problem} in row {row}", .signal.key())]
pub struct RowValidationError {
    pub line: u64,
    pub signal: MomentumSignal,
    pub problem: SignalValueProblem,
    pub row: String,
}

/// Validated signal values indexed by [`MomentumSignal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalScores([u8; MomentumSignal::COUNT]);

impl SignalScores {
    /// Build from values in canonical signal order, rejecting anything outside 1-5.
    pub fn new(values: [u8; MomentumSignal::COUNT]) -> Option<Self> {
        values
            .iter()
            .all(|value| (SIGNAL_MIN..=SIGNAL_MAX).contains(value))
            .then_some(Self(values))
    }

    pub fn get(&self, signal: MomentumSignal) -> u8 {
        self.0[signal.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (MomentumSignal, u8)> + '_ {
        MomentumSignal::ordered()
            .into_iter()
            .map(move |signal| (signal, self.get(signal)))
    }

    pub fn total(&self) -> i32 {
        self.0.iter().map(|value| i32::from(*value)).sum()
    }

    /// Minimum value and every signal that reaches it, in canonical order.
    pub fn weakest(&self) -> (Vec<MomentumSignal>, u8) {
        let min = self.0.iter().copied().min().unwrap_or(SIGNAL_MIN);
        let signals = self
            .iter()
            .filter(|(_, value)| *value == min)
            .map(|(signal, _)| signal)
            .collect();
        (signals, min)
    }
}

/// Trusted deal data produced by [`validate_row`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedDeal {
    pub line: u64,
    pub deal_id: String,
    pub deal_name: String,
    pub scores: SignalScores,
}

pub fn validate_row(row: &DealRow) -> Result<ValidatedDeal, RowValidationError> {
    let mut values = [0u8; MomentumSignal::COUNT];

    for signal in MomentumSignal::ordered() {
        values[signal.index()] =
            parse_signal(row.get(signal.key())).map_err(|problem| RowValidationError {
                line: row.line(),
                signal,
                problem,
                row: row.to_string(),
            })?;
    }

    Ok(ValidatedDeal {
        line: row.line(),
        deal_id: row.deal_id().to_string(),
        deal_name: row.deal_name().to_string(),
        scores: SignalScores(values),
    })
}

fn parse_signal(raw: Option<&str>) -> Result<u8, SignalValueProblem> {
    let raw = raw.ok_or(SignalValueProblem::Missing)?;
    let value = raw
        .trim()
        .parse::<i64>()
        .map_err(|_| SignalValueProblem::NotInteger {
            raw: raw.to_string(),
        })?;

    if value < i64::from(SIGNAL_MIN) || value > i64::from(SIGNAL_MAX) {
        return Err(SignalValueProblem::OutOfRange { value });
    }

    Ok(value as u8)
}

pub fn load_deal_rows<P: AsRef<Path>>(path: P) -> Result<Vec<DealRow>, DealSourceError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|source| DealSourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_deal_rows(file, &path.display().to_string())
}

pub fn read_deal_rows<R: Read>(
    reader: R,
    source_name: &str,
) -> Result<Vec<DealRow>, DealSourceError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let csv_error = |source| DealSourceError::Csv {
        source_name: source_name.to_string(),
        source,
    };

    let headers: Vec<String> = csv_reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(|header| header.trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut rows = Vec::new();
    for (position, record) in csv_reader.records().enumerate() {
        let record = record.map_err(csv_error)?;
        let line = record
            .position()
            .map(|pos| pos.line())
            .unwrap_or(position as u64 + 2);
        let fields = headers
            .iter()
            .zip(record.iter())
            .map(|(header, value)| (header.clone(), value.to_string()))
            .collect();
        rows.push(DealRow::new(line, fields));
    }

    if rows.is_empty() {
        return Err(DealSourceError::Empty {
            source_name: source_name.to_string(),
        });
    }

    Ok(rows)
}

#[cfg(test)]
pub(crate) fn deal_row(line: u64, id: &str, values: [&str; MomentumSignal::COUNT]) -> DealRow {
    let mut fields = BTreeMap::new();
    fields.insert(DEAL_ID_COLUMN.to_string(), id.to_string());
    fields.insert(DEAL_NAME_COLUMN.to_string(), format!("Deal {id}"));
    for (signal, value) in MomentumSignal::ordered().into_iter().zip(values) {
        fields.insert(signal.key().to_string(), value.to_string());
    }
    DealRow::new(line, fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const HEADER: &str = "deal_id,deal_name,engagement_depth,stakeholder_expansion,internal_activity,reciprocity,organizational_energy";

    #[test]
    fn accepts_boundary_values() {
        let row = deal_row(2, "D-1", ["1", "5", "1", "5", "3"]);
        let deal = validate_row(&row).expect("boundaries accepted");
        assert_eq!(deal.scores.get(MomentumSignal::EngagementDepth), 1);
        assert_eq!(deal.scores.get(MomentumSignal::StakeholderExpansion), 5);
        assert_eq!(deal.scores.total(), 15);
    }

    #[test]
    fn rejects_out_of_range_and_non_numeric_values() {
        for (raw, expected) in [
            ("0", SignalValueProblem::OutOfRange { value: 0 }),
            ("6", SignalValueProblem::OutOfRange { value: 6 }),
            (
                "abc",
                SignalValueProblem::NotInteger {
                    raw: "abc".to_string(),
                },
            ),
            (
                "",
                SignalValueProblem::NotInteger {
                    raw: String::new(),
                },
            ),
            (
                "3.5",
                SignalValueProblem::NotInteger {
                    raw: "3.5".to_string(),
                },
            ),
        ] {
            let row = deal_row(4, "D-bad", ["3", "3", raw, "3", "3"]);
            let err = validate_row(&row).expect_err("invalid value rejected");
            assert_eq!(err.signal, MomentumSignal::InternalActivity, "raw {raw:?}");
            assert_eq!(err.problem, expected, "raw {raw:?}");
            assert_eq!(err.line, 4);
        }
    }

    #[test]
    fn rejects_missing_signal_column() {
        let mut row = deal_row(7, "D-miss", ["3", "3", "3", "3", "3"]);
        row.fields.remove("reciprocity");

        let err = validate_row(&row).expect_err("missing field rejected");
        assert_eq!(err.signal, MomentumSignal::Reciprocity);
        assert_eq!(err.problem, SignalValueProblem::Missing);
        let message = err.to_string();
        assert!(message.contains("line 7"));
        assert!(message.contains("'reciprocity'"));
        assert!(message.contains("D-miss"));
    }

    #[test]
    fn surrounding_whitespace_is_tolerated() {
        let row = deal_row(2, "  D-2  ", [" 4", "2 ", "3", "4", "3"]);
        let deal = validate_row(&row).expect("whitespace trimmed");
        assert_eq!(deal.deal_id, "D-2");
        assert_eq!(deal.scores.total(), 16);
    }

    #[test]
    fn weakest_preserves_ties_in_signal_order() {
        let scores = SignalScores::new([2, 4, 2, 5, 3]).expect("valid scores");
        let (signals, min) = scores.weakest();
        assert_eq!(min, 2);
        assert_eq!(
            signals,
            vec![
                MomentumSignal::EngagementDepth,
                MomentumSignal::InternalActivity
            ]
        );
        assert!(SignalScores::new([0, 4, 2, 5, 3]).is_none());
    }

    #[test]
    fn reads_rows_with_bom_and_short_records() {
        let csv = format!("\u{feff}{HEADER}\nD-1, Alpha ,4,2,3,4,3\nD-2,Beta,1,1\n");
        let rows = read_deal_rows(Cursor::new(csv), "inline").expect("rows parse");

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].deal_id(), "D-1");
        assert_eq!(rows[0].deal_name(), "Alpha");
        assert_eq!(rows[0].line(), 2);
        assert_eq!(rows[1].line(), 3);
        assert_eq!(rows[1].get("reciprocity"), None);
        assert!(validate_row(&rows[1]).is_err());
    }

    #[test]
    fn header_only_table_is_empty_input() {
        let err = read_deal_rows(Cursor::new(format!("{HEADER}\n")), "deals.csv")
            .expect_err("no rows");
        assert!(matches!(err, DealSourceError::Empty { .. }));
        assert_eq!(err.to_string(), "no deal rows found in deals.csv");
    }

    #[test]
    fn undecodable_record_names_the_source() {
        let mut bytes = format!("{HEADER}\nD-1,").into_bytes();
        bytes.extend_from_slice(&[0xFF, 0xFE]);
        bytes.extend_from_slice(b",3,3,3,3,3\n");

        let err = read_deal_rows(Cursor::new(bytes), "q3-deals.csv").expect_err("invalid utf-8");
        assert!(matches!(err, DealSourceError::Csv { .. }));
        assert!(err.to_string().starts_with("invalid deal table q3-deals.csv:"));
    }
}
