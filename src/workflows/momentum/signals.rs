use serde::{Deserialize, Serialize};

/// Lowest value a signal may carry.
pub const SIGNAL_MIN: u8 = 1;
/// Highest value a signal may carry.
pub const SIGNAL_MAX: u8 = 5;

/// The five buyer-side momentum signals every deal is scored on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MomentumSignal {
    EngagementDepth,
    StakeholderExpansion,
    InternalActivity,
    Reciprocity,
    OrganizationalEnergy,
}

impl MomentumSignal {
    pub const COUNT: usize = 5;

    pub const fn ordered() -> [Self; Self::COUNT] {
        [
            Self::EngagementDepth,
            Self::StakeholderExpansion,
            Self::InternalActivity,
            Self::Reciprocity,
            Self::OrganizationalEnergy,
        ]
    }

    /// Column name in the deal table and key used in reports.
    pub const fn key(self) -> &'static str {
        match self {
            Self::EngagementDepth => "engagement_depth",
            Self::StakeholderExpansion => "stakeholder_expansion",
            Self::InternalActivity => "internal_activity",
            Self::Reciprocity => "reciprocity",
            Self::OrganizationalEnergy => "organizational_energy",
        }
    }

    /// Display name used by the `check` command.
    pub const fn label(self) -> &'static str {
        match self {
            Self::EngagementDepth => "Engagement Depth",
            Self::StakeholderExpansion => "Stakeholder Expansion",
            Self::InternalActivity => "Internal Activity",
            Self::Reciprocity => "Reciprocity",
            Self::OrganizationalEnergy => "Organizational Energy",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|signal| signal.key() == key.trim())
    }

    pub(crate) const fn index(self) -> usize {
        self as usize
    }

    /// Smallest and largest totals a fully validated deal can reach.
    pub const fn reachable_totals() -> (i32, i32) {
        (
            SIGNAL_MIN as i32 * Self::COUNT as i32,
            SIGNAL_MAX as i32 * Self::COUNT as i32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_round_trip_through_lookup() {
        for signal in MomentumSignal::ordered() {
            assert_eq!(MomentumSignal::from_key(signal.key()), Some(signal));
        }
        assert_eq!(MomentumSignal::from_key("budget"), None);
    }

    #[test]
    fn ordered_matches_index() {
        for (position, signal) in MomentumSignal::ordered().into_iter().enumerate() {
            assert_eq!(signal.index(), position);
        }
    }

    #[test]
    fn labels_title_case_the_keys() {
        for signal in MomentumSignal::ordered() {
            assert_eq!(
                signal.label().to_lowercase().replace(' ', "_"),
                signal.key()
            );
        }
    }

    #[test]
    fn reachable_totals_span_five_to_twenty_five() {
        assert_eq!(MomentumSignal::reachable_totals(), (5, 25));
    }
}
