use super::super::scoring::ScoredDeal;
use super::ranking::{rank_at_risk, TOP_AT_RISK};
use super::summary::{summarize, MomentumSummary, ReportError};
use super::views::MomentumReportView;

/// Summary statistics plus the at-risk ranking for one run.
#[derive(Debug, Clone)]
pub struct MomentumReport<'a> {
    pub framework_name: &'a str,
    pub deals: &'a [ScoredDeal],
    pub summary: MomentumSummary,
    pub at_risk: Vec<&'a ScoredDeal>,
}

impl<'a> MomentumReport<'a> {
    pub fn build(framework_name: &'a str, deals: &'a [ScoredDeal]) -> Result<Self, ReportError> {
        let summary = summarize(deals)?;
        let at_risk = rank_at_risk(deals, TOP_AT_RISK);

        Ok(Self {
            framework_name,
            deals,
            summary,
            at_risk,
        })
    }

    pub fn to_markdown(&self) -> String {
        let summary = &self.summary;
        let mut lines = vec![
            "# Pipeline Momentum Report\n".to_string(),
            format!("Framework: **{}**\n", self.framework_name),
            format!("Deals analyzed: **{}**\n", summary.total_deals),
            format!(
                "Score range: **{} to {}**\n",
                summary.lowest_total, summary.highest_total
            ),
        ];

        lines.push("## Deals by band\n".to_string());
        for (label, count) in summary.band_counts.most_common() {
            lines.push(format!("- {label}: {count}\n"));
        }

        lines.push("\n## Most common weakest signals\n".to_string());
        for (signal, count) in summary.weakest_signal_counts.most_common() {
            lines.push(format!("- {signal}: {count}\n"));
        }

        lines.push(format!(
            "\n## Top {TOP_AT_RISK} at-risk deals (lowest total first)\n"
        ));
        for deal in &self.at_risk {
            lines.push(format!(
                "- **{} | {}**  (Total {}, Band {}, Weakest {}={})\n",
                deal.deal_id,
                deal.deal_name,
                deal.total_score,
                deal.band.label,
                deal.weakest_signals_joined(),
                deal.weakest_score
            ));
        }

        lines.concat()
    }

    pub fn view(&self) -> MomentumReportView {
        MomentumReportView {
            framework_name: self.framework_name.to_string(),
            summary: self.summary.view(),
            at_risk: self.at_risk.iter().map(|deal| deal.view()).collect(),
            deals: self.deals.iter().map(ScoredDeal::view).collect(),
        }
    }
}
