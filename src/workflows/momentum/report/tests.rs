use super::*;
use crate::workflows::momentum::deals::{deal_row, validate_row};
use crate::workflows::momentum::framework::reference_framework;
use crate::workflows::momentum::scoring::{MomentumEngine, ScoredDeal};
use crate::workflows::momentum::signals::MomentumSignal;

fn scored(rows: &[(&str, [&str; MomentumSignal::COUNT])]) -> Vec<ScoredDeal> {
    let engine = MomentumEngine::new(reference_framework());
    rows.iter()
        .enumerate()
        .map(|(position, (id, values))| {
            let deal = validate_row(&deal_row(position as u64 + 2, id, *values))
                .expect("row validates");
            engine.score(deal).expect("deal scores")
        })
        .collect()
}

#[test]
fn summarize_counts_bands_and_extremes() {
    let deals = scored(&[
        ("A", ["2", "2", "2", "2", "2"]),
        ("B", ["1", "3", "2", "2", "2"]),
        ("C", ["5", "5", "4", "4", "4"]),
    ]);
    assert_eq!(
        deals.iter().map(|deal| deal.total_score).collect::<Vec<_>>(),
        vec![10, 10, 22]
    );

    let summary = summarize(&deals).expect("summary builds");

    assert_eq!(summary.total_deals, 3);
    assert_eq!(summary.band_counts.count("At Risk"), 2);
    assert_eq!(summary.band_counts.count("Strong Positive"), 1);
    assert_eq!(summary.band_counts.len(), 2);
    assert_eq!(summary.lowest_total, 10);
    assert_eq!(summary.highest_total, 22);
}

#[test]
fn tied_weakest_signals_each_count_once_per_deal() {
    let deals = scored(&[
        ("A", ["2", "2", "3", "3", "3"]),
        ("B", ["4", "1", "4", "4", "4"]),
    ]);

    let summary = summarize(&deals).expect("summary builds");
    let counts = &summary.weakest_signal_counts;

    assert_eq!(counts.count("stakeholder_expansion"), 2);
    assert_eq!(counts.count("engagement_depth"), 1);
    assert_eq!(counts.count("reciprocity"), 0);
    assert_eq!(
        counts.most_common(),
        vec![("stakeholder_expansion", 2), ("engagement_depth", 1)]
    );
}

#[test]
fn summarize_rejects_empty_input() {
    assert_eq!(summarize(&[]), Err(ReportError::EmptyInput));
}

#[test]
fn most_common_breaks_ties_by_first_seen() {
    let mut table = FrequencyTable::new();
    for key in ["beta", "alpha", "gamma", "alpha", "gamma", "delta"] {
        table.record(key);
    }

    assert_eq!(
        table.most_common(),
        vec![("alpha", 2), ("gamma", 2), ("beta", 1), ("delta", 1)]
    );
}

#[test]
fn ranking_orders_by_total_then_weakest_and_is_stable() {
    let deals = scored(&[
        ("first-tie", ["3", "3", "3", "3", "2"]),
        ("strong", ["5", "5", "5", "5", "5"]),
        ("low-weakest", ["1", "3", "3", "3", "4"]),
        ("second-tie", ["2", "3", "3", "3", "3"]),
        ("lowest", ["1", "1", "1", "1", "1"]),
    ]);

    let ranked: Vec<&str> = rank_at_risk(&deals, TOP_AT_RISK)
        .into_iter()
        .map(|deal| deal.deal_id.as_str())
        .collect();

    assert_eq!(
        ranked,
        vec!["lowest", "low-weakest", "first-tie", "second-tie", "strong"]
    );
}

#[test]
fn ranking_truncates_and_tolerates_short_input() {
    let rows: Vec<(String, [&str; MomentumSignal::COUNT])> = (0..7)
        .map(|index| (format!("D-{index}"), ["3", "3", "3", "3", "3"]))
        .collect();
    let borrowed: Vec<(&str, [&str; MomentumSignal::COUNT])> = rows
        .iter()
        .map(|(id, values)| (id.as_str(), *values))
        .collect();
    let deals = scored(&borrowed);

    let ranked = rank_at_risk(&deals, TOP_AT_RISK);
    assert_eq!(ranked.len(), TOP_AT_RISK);
    assert_eq!(ranked[0].deal_id, "D-0");
    assert_eq!(ranked[4].deal_id, "D-4");

    assert_eq!(rank_at_risk(&deals[..2], TOP_AT_RISK).len(), 2);
}

#[test]
fn markdown_report_lists_sections_in_order() {
    let deals = scored(&[
        ("D-1", ["4", "2", "3", "4", "3"]),
        ("D-2", ["1", "1", "2", "1", "1"]),
    ]);
    let report = MomentumReport::build("pipeline-momentum", &deals).expect("report builds");

    let expected = "\
# Pipeline Momentum Report
Framework: **pipeline-momentum**
Deals analyzed: **2**
Score range: **6 to 16**
## Deals by band
- Conditional: 1
- Stalled: 1

## Most common weakest signals
- stakeholder_expansion: 2
- engagement_depth: 1
- reciprocity: 1
- organizational_energy: 1

## Top 5 at-risk deals (lowest total first)
- **D-2 | Deal D-2**  (Total 6, Band Stalled, Weakest engagement_depth, stakeholder_expansion, reciprocity, organizational_energy=1)
- **D-1 | Deal D-1**  (Total 16, Band Conditional, Weakest stakeholder_expansion=2)
";

    assert_eq!(report.to_markdown(), expected);
}

#[test]
fn report_view_serializes_signal_keys() {
    let deals = scored(&[("D-1", ["4", "2", "3", "4", "3"])]);
    let report = MomentumReport::build("pipeline-momentum", &deals).expect("report builds");

    let json = serde_json::to_value(report.view()).expect("view serializes");

    assert_eq!(json["framework_name"], "pipeline-momentum");
    assert_eq!(json["summary"]["total_deals"], 1);
    assert_eq!(json["deals"][0]["scores"]["stakeholder_expansion"], 2);
    assert_eq!(json["at_risk"][0]["weakest_signals"][0], "stakeholder_expansion");
}
