use super::super::scoring::ScoredDeal;

/// Number of deals listed in the report's at-risk section.
pub const TOP_AT_RISK: usize = 5;

/// Lowest totals first, then lowest weakest score; equal keys keep input order.
pub fn rank_at_risk(deals: &[ScoredDeal], limit: usize) -> Vec<&ScoredDeal> {
    let mut ranked: Vec<&ScoredDeal> = deals.iter().collect();
    ranked.sort_by_key(|deal| (deal.total_score, deal.weakest_score));
    ranked.truncate(limit);
    ranked
}
