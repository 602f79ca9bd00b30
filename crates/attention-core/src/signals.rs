//! Signal extraction from notice free text.
//!
//! The regulator's reason text embeds volume multiples, percentage rises and
//! citations of numbered clauses. Which patterns recognise them is data: a
//! [`PatternTable`] is built from a JSON document, and the zh-TW table is
//! embedded at compile time. The classification engine only sees the
//! [`SignalExtractor`] trait, so a new locale or a revised clause scheme is a
//! new table, not a code change.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::types::{AttentionError, AttentionResult, ClauseGroup};

/// Pattern table for zh-TW notice text, embedded at compile time.
const ZH_TW_PATTERNS_JSON: &str = include_str!("patterns/zh_tw.json");

/// Signals derived from one notice's free text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedSignals {
    /// Largest "N times average volume" figure.
    pub volume_multiplier: Option<f64>,
    /// Largest percentage rise figure.
    pub percent_change: Option<f64>,
    /// Cites clause 1 or a cumulative close-price rise.
    pub first_clause: bool,
    pub clauses: BTreeSet<ClauseGroup>,
}

impl ExtractedSignals {
    pub fn has(&self, group: ClauseGroup) -> bool {
        self.clauses.contains(&group)
    }

    pub fn has_any(&self, groups: &[ClauseGroup]) -> bool {
        groups.iter().any(|g| self.has(*g))
    }
}

/// Turns notice text into [`ExtractedSignals`].
pub trait SignalExtractor: Send + Sync {
    fn extract(&self, text: &str) -> ExtractedSignals;
}

#[derive(Debug, Deserialize)]
struct PatternConfig {
    locale: String,
    volume_multiplier: String,
    percent_change: String,
    first_clause: String,
    clauses: BTreeMap<String, String>,
}

/// Compiled regex patterns for one locale.
#[derive(Debug, Clone)]
pub struct PatternTable {
    locale: String,
    volume_multiplier: Regex,
    percent_change: Regex,
    first_clause: Regex,
    clauses: Vec<(ClauseGroup, Regex)>,
}

fn compile(name: &str, pattern: &str) -> AttentionResult<Regex> {
    Regex::new(pattern).map_err(|e| AttentionError::Patterns(format!("{name}: {e}")))
}

impl PatternTable {
    /// Build a table from its JSON description.
    pub fn from_json(json: &str) -> AttentionResult<Self> {
        let config: PatternConfig = serde_json::from_str(json)?;

        let mut clauses = Vec::with_capacity(config.clauses.len());
        for (key, pattern) in &config.clauses {
            let group = ClauseGroup::from_key(key)
                .ok_or_else(|| AttentionError::Patterns(format!("unknown clause group: {key}")))?;
            clauses.push((group, compile(key, pattern)?));
        }

        Ok(Self {
            volume_multiplier: compile("volume_multiplier", &config.volume_multiplier)?,
            percent_change: compile("percent_change", &config.percent_change)?,
            first_clause: compile("first_clause", &config.first_clause)?,
            locale: config.locale,
            clauses,
        })
    }

    /// The embedded zh-TW table.
    pub fn builtin() -> &'static PatternTable {
        static TABLE: OnceLock<PatternTable> = OnceLock::new();
        TABLE.get_or_init(|| {
            PatternTable::from_json(ZH_TW_PATTERNS_JSON).expect("embedded pattern table is valid")
        })
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }
}

/// Largest number captured by the first group of `re` in `text`.
fn max_capture(re: &Regex, text: &str) -> Option<f64> {
    re.captures_iter(text)
        .filter_map(|caps| caps.get(1)?.as_str().parse::<f64>().ok())
        .fold(None, |best, v| Some(best.map_or(v, |b: f64| b.max(v))))
}

impl SignalExtractor for PatternTable {
    fn extract(&self, text: &str) -> ExtractedSignals {
        ExtractedSignals {
            volume_multiplier: max_capture(&self.volume_multiplier, text),
            percent_change: max_capture(&self.percent_change, text),
            first_clause: self.first_clause.is_match(text),
            clauses: self
                .clauses
                .iter()
                .filter(|(_, re)| re.is_match(text))
                .map(|(group, _)| *group)
                .collect(),
        }
    }
}
