//! Venue rule sets.
//!
//! Regulatory criteria change over time, so which rules apply to which venue
//! is configuration rather than branching inside the engine. A [`RuleSet`]
//! maps each venue to its [`VenueRules`]: the clause groups that do not count
//! as a strike, the ordered trigger rules, and whether the venue defers a
//! ledger exclusion while the prior month's results are still pending.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{ClauseGroup, Venue};

/// Default number of distinct notice dates in the recency window.
pub const DEFAULT_RECENCY_DAYS: usize = 6;

/// Default strike threshold inside the recency window.
pub const DEFAULT_STRIKE_THRESHOLD: usize = 3;

/// A rule evaluated against one (venue, code) group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum TriggerRule {
    /// Fire when at least `threshold` counted notices fall in the window.
    StrikeCount { threshold: usize },
    /// Fire when a notice on the venue's latest date cites `group`.
    LatestDayClause { group: ClauseGroup },
    /// Arm the clause 9–13 fallback tier when a latest-date notice cites
    /// `group` and the strike count reaches `threshold`.
    LatestDayClauseWithStrikes { group: ClauseGroup, threshold: usize },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueRules {
    /// Notices citing any of these groups are not counted as strikes.
    pub uncounted: Vec<ClauseGroup>,
    pub triggers: Vec<TriggerRule>,
    /// Month-2 results do not exclude a security while month-1 is missing.
    pub defer_on_pending_prior_month: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    pub name: String,
    pub recency_days: usize,
    pub venues: BTreeMap<Venue, VenueRules>,
}

impl RuleSet {
    /// Current criteria. The strike count alone flags only OTC securities;
    /// listed securities are flagged by the clauses cited on their latest
    /// notice date.
    pub fn current() -> Self {
        let mut venues = BTreeMap::new();
        venues.insert(
            Venue::Primary,
            VenueRules {
                uncounted: vec![ClauseGroup::Clause10],
                triggers: vec![
                    TriggerRule::LatestDayClause {
                        group: ClauseGroup::Clause1To8,
                    },
                    TriggerRule::LatestDayClauseWithStrikes {
                        group: ClauseGroup::Clause9To13,
                        threshold: DEFAULT_STRIKE_THRESHOLD,
                    },
                ],
                defer_on_pending_prior_month: false,
            },
        );
        venues.insert(
            Venue::Secondary,
            VenueRules {
                uncounted: Vec::new(),
                triggers: vec![TriggerRule::StrikeCount {
                    threshold: DEFAULT_STRIKE_THRESHOLD,
                }],
                defer_on_pending_prior_month: true,
            },
        );
        Self {
            name: "current".to_string(),
            recency_days: DEFAULT_RECENCY_DAYS,
            venues,
        }
    }

    /// Earlier criteria: strike count on both venues plus clauses 1–3 and 5
    /// on the latest listed notice date.
    pub fn legacy() -> Self {
        let mut venues = BTreeMap::new();
        venues.insert(
            Venue::Primary,
            VenueRules {
                uncounted: vec![ClauseGroup::Clause10],
                triggers: vec![
                    TriggerRule::StrikeCount {
                        threshold: DEFAULT_STRIKE_THRESHOLD,
                    },
                    TriggerRule::LatestDayClause {
                        group: ClauseGroup::Clause1To3And5,
                    },
                ],
                defer_on_pending_prior_month: false,
            },
        );
        venues.insert(
            Venue::Secondary,
            VenueRules {
                uncounted: Vec::new(),
                triggers: vec![TriggerRule::StrikeCount {
                    threshold: DEFAULT_STRIKE_THRESHOLD,
                }],
                defer_on_pending_prior_month: false,
            },
        );
        Self {
            name: "legacy".to_string(),
            recency_days: DEFAULT_RECENCY_DAYS,
            venues,
        }
    }

    /// Look up a rule set by name.
    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "current" => Some(Self::current()),
            "legacy" => Some(Self::legacy()),
            _ => None,
        }
    }

    /// Rules for `venue`; a venue without an entry has no rules.
    pub fn for_venue(&self, venue: Venue) -> VenueRules {
        self.venues.get(&venue).cloned().unwrap_or_default()
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::current()
    }
}
