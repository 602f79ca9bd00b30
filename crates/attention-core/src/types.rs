//! Core data types for attention notices, the earnings ledger, and verdicts.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Exchange venue that published an attention notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Venue {
    /// Centralized market (TWSE).
    Primary,
    /// Over-the-counter market (TPEx).
    Secondary,
}

impl Venue {
    /// Short market tag used in reports.
    pub fn tag(&self) -> &'static str {
        match self {
            Venue::Primary => "TSE",
            Venue::Secondary => "OTC",
        }
    }
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// One venue's attention flag for one security on one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoticeRow {
    pub venue: Venue,
    pub code: String,
    pub name: String,
    pub date: NaiveDate,
    /// The regulator's stated reason.
    pub info: String,
}

/// A calendar year-month, written as `YYYYMM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The month `n` months before this one.
    pub fn minus(self, n: u32) -> Self {
        let index = self.year * 12 + self.month as i32 - 1 - n as i32;
        Self {
            year: index.div_euclid(12),
            month: index.rem_euclid(12) as u32 + 1,
        }
    }

    /// Whether `date` falls inside this month.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = AttentionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() != 6 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AttentionError::InvalidMonth(s.to_string()));
        }
        let year: i32 = s[..4]
            .parse()
            .map_err(|_| AttentionError::InvalidMonth(s.to_string()))?;
        let month: u32 = s[4..]
            .parse()
            .map_err(|_| AttentionError::InvalidMonth(s.to_string()))?;
        YearMonth::new(year, month).ok_or_else(|| AttentionError::InvalidMonth(s.to_string()))
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A self-disclosed earnings announcement recorded in the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarningsRecord {
    pub code: String,
    /// Which month's results were disclosed.
    pub earnings_month: YearMonth,
    pub announcement_date: NaiveDate,
}

/// Regulatory clause groups recognised in notice text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ClauseGroup {
    #[serde(rename = "clause_1_7")]
    Clause1To7,
    #[serde(rename = "clause_1_8")]
    Clause1To8,
    #[serde(rename = "clause_9_13")]
    Clause9To13,
    #[serde(rename = "clause_10")]
    Clause10,
    #[serde(rename = "clause_1_3_5")]
    Clause1To3And5,
}

impl ClauseGroup {
    /// Key used in pattern tables.
    pub fn key(&self) -> &'static str {
        match self {
            ClauseGroup::Clause1To7 => "clause_1_7",
            ClauseGroup::Clause1To8 => "clause_1_8",
            ClauseGroup::Clause9To13 => "clause_9_13",
            ClauseGroup::Clause10 => "clause_10",
            ClauseGroup::Clause1To3And5 => "clause_1_3_5",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "clause_1_7" => Some(ClauseGroup::Clause1To7),
            "clause_1_8" => Some(ClauseGroup::Clause1To8),
            "clause_9_13" => Some(ClauseGroup::Clause9To13),
            "clause_10" => Some(ClauseGroup::Clause10),
            "clause_1_3_5" => Some(ClauseGroup::Clause1To3And5),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ClauseGroup::Clause1To7 => "第一至第七款",
            ClauseGroup::Clause1To8 => "第一至第八款",
            ClauseGroup::Clause9To13 => "第九至第十三款",
            ClauseGroup::Clause10 => "第十款",
            ClauseGroup::Clause1To3And5 => "第一到第三、五款",
        }
    }
}

/// Why a security made it into the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "group", rename_all = "snake_case")]
pub enum TriggerReason {
    /// Enough counted notices inside the recency window.
    StrikeCount,
    /// A notice on the venue's latest date cites the clause group.
    LatestDayClause(ClauseGroup),
    /// Month-3 results were announced last month.
    Month3DisclosedLastMonth,
    /// Month-2 results were announced last month.
    Month2DisclosedLastMonth,
    /// OTC: month-2 results announced last month, month-1 still outstanding.
    OtcMonth2DisclosedLastMonth,
    /// OTC: month-2 results announced this month, month-1 still outstanding.
    OtcMonth2DisclosedThisMonth,
    /// Primary: clause 9–13 on the latest date with enough strikes.
    Clause9To13,
}

impl fmt::Display for TriggerReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerReason::StrikeCount => f.write_str("近六日三次注意"),
            TriggerReason::LatestDayClause(group) => write!(f, "昨日{}", group.label()),
            TriggerReason::Month3DisclosedLastMonth => f.write_str("上月公布上上上月自結"),
            TriggerReason::Month2DisclosedLastMonth => f.write_str("上月公布上上月自結"),
            TriggerReason::OtcMonth2DisclosedLastMonth => {
                f.write_str("上月公布上上月自結(上月未公布)")
            }
            TriggerReason::OtcMonth2DisclosedThisMonth => {
                f.write_str("本月公布上上月自結(上月未公布)")
            }
            TriggerReason::Clause9To13 => f.write_str("上市第九至第十三款"),
        }
    }
}

/// Final risk tier assigned to a security group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    HighRisk,
    UncertainMonth3,
    UncertainMonth2,
    UncertainOtcThisMonth,
    UncertainOtcLastMonth,
    UncertainClause9To13,
    LowRiskExcluded,
}

impl Classification {
    pub fn is_excluded(&self) -> bool {
        matches!(self, Classification::LowRiskExcluded)
    }

    pub fn is_tagged(&self) -> bool {
        self.uncertain_type().is_some()
    }

    /// Sub-type tag for the uncertain tiers.
    pub fn uncertain_type(&self) -> Option<&'static str> {
        match self {
            Classification::UncertainMonth3 => Some("month-3"),
            Classification::UncertainMonth2 => Some("month-2"),
            Classification::UncertainOtcThisMonth => Some("otc-month-2-this-month"),
            Classification::UncertainOtcLastMonth => Some("otc-month-2-last-month"),
            Classification::UncertainClause9To13 => Some("tse-clause-9-13"),
            Classification::HighRisk | Classification::LowRiskExcluded => None,
        }
    }

    /// Report ordering: high risk first, exclusions last.
    pub fn rank(&self) -> u8 {
        if self.is_excluded() {
            2
        } else if self.is_tagged() {
            1
        } else {
            0
        }
    }

    pub fn risk_label(&self) -> &'static str {
        match self {
            Classification::HighRisk => "高風險",
            Classification::LowRiskExcluded => "低風險",
            Classification::UncertainClause9To13 => "不一定公布",
            _ => "不確定公布",
        }
    }
}

/// The ledger entry that justified a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerReference {
    pub announcement_date: NaiveDate,
    pub earnings_month: YearMonth,
}

/// One classified (venue, code) group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedResult {
    pub venue: Venue,
    pub code: String,
    pub name: String,
    pub last_notice_date: NaiveDate,
    pub reasons: Vec<TriggerReason>,
    /// Reasons joined for display.
    pub reason: String,
    pub classification: Classification,
    pub volume_multiplier: Option<f64>,
    pub percent_change: Option<f64>,
    /// Any notice in the group cites clause 1 or a cumulative-rise phrase.
    pub first_clause: bool,
    pub reference: Option<LedgerReference>,
}

impl AggregatedResult {
    pub fn is_excluded(&self) -> bool {
        self.classification.is_excluded()
    }

    pub fn is_tagged(&self) -> bool {
        self.classification.is_tagged()
    }

    pub fn uncertain_type(&self) -> Option<&'static str> {
        self.classification.uncertain_type()
    }

    /// Sort key for reports: risk rank, referenced announcement, venue, code.
    pub fn report_key(&self) -> (u8, NaiveDate, Venue, &str) {
        (
            self.classification.rank(),
            self.reference
                .map(|r| r.announcement_date)
                .unwrap_or(NaiveDate::MIN),
            self.venue,
            self.code.as_str(),
        )
    }
}

/// Errors that can occur while extracting or classifying notices.
#[derive(thiserror::Error, Debug)]
pub enum AttentionError {
    #[error("No structural table located")]
    NoTable,

    #[error("Header row not found")]
    HeaderNotFound,

    #[error("Required column missing: {0}")]
    MissingColumn(&'static str),

    #[error("Invalid local date: {0}")]
    InvalidDate(String),

    #[error("Invalid earnings month: {0}")]
    InvalidMonth(String),

    #[error("Pattern table error: {0}")]
    Patterns(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience result type.
pub type AttentionResult<T> = Result<T, AttentionError>;
