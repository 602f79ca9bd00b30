//! Temporal rule classification.
//!
//! Notices are grouped per (venue, code), evaluated against the venue's
//! trigger rules, then cross-referenced with the earnings ledger to place
//! each group in a risk tier. The pass is synchronous and pure: window
//! statistics are computed once and every group reads them, the ledger
//! snapshot and the signal extractor.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::ledger::LedgerSnapshot;
use crate::rules::{RuleSet, TriggerRule, VenueRules};
use crate::signals::{ExtractedSignals, PatternTable, SignalExtractor};
use crate::text::is_derivative_code;
use crate::types::{
    AggregatedResult, Classification, ClauseGroup, LedgerReference, NoticeRow, TriggerReason,
    Venue, YearMonth,
};
use crate::window::WindowStats;

const REASON_SEPARATOR: &str = "；";

/// A notice row with its extracted signals.
struct ScoredRow<'r> {
    row: &'r NoticeRow,
    signals: ExtractedSignals,
}

/// Outcome of the trigger rules for one group.
#[derive(Debug, Default)]
struct TriggerOutcome {
    reasons: Vec<TriggerReason>,
    clause_9_13_armed: bool,
}

/// Ledger verdict for one group.
#[derive(Debug, Clone, Copy, PartialEq)]
enum LedgerVerdict {
    None,
    Excluded(LedgerReference),
    Tagged {
        tier: Classification,
        reason: TriggerReason,
        reference: LedgerReference,
    },
}

/// The months that matter relative to a reference date.
#[derive(Debug, Clone, Copy)]
struct MonthFrame {
    this: YearMonth,
    last: YearMonth,
    minus_2: YearMonth,
    minus_3: YearMonth,
}

impl MonthFrame {
    fn at(reference: NaiveDate) -> Self {
        let this = YearMonth::of(reference);
        Self {
            this,
            last: this.minus(1),
            minus_2: this.minus(2),
            minus_3: this.minus(3),
        }
    }
}

/// Classifies notice rows under one rule set and one signal extractor.
pub struct Classifier<'a> {
    rules: &'a RuleSet,
    signals: &'a dyn SignalExtractor,
}

impl<'a> Classifier<'a> {
    pub fn new(rules: &'a RuleSet, signals: &'a dyn SignalExtractor) -> Self {
        Self { rules, signals }
    }

    /// Classify `rows` as of `reference`. Output is ordered by (venue, code).
    pub fn classify(
        &self,
        rows: &[NoticeRow],
        ledger: &LedgerSnapshot,
        reference: NaiveDate,
    ) -> Vec<AggregatedResult> {
        if rows.is_empty() {
            return Vec::new();
        }

        let stats = WindowStats::compute(rows, self.rules.recency_days);
        let frame = MonthFrame::at(reference);

        let mut groups: BTreeMap<(Venue, &str), Vec<ScoredRow<'_>>> = BTreeMap::new();
        for row in rows {
            if is_derivative_code(&row.code) {
                continue;
            }
            groups
                .entry((row.venue, row.code.as_str()))
                .or_default()
                .push(ScoredRow {
                    row,
                    signals: self.signals.extract(&row.info),
                });
        }

        let mut results = Vec::new();
        for ((venue, code), items) in &groups {
            let venue_rules = self.rules.for_venue(*venue);
            let outcome = evaluate_triggers(&venue_rules, &stats, *venue, items);
            let verdict = ledger_verdict(&venue_rules, ledger, code, reference, frame);

            match assemble(*venue, code, items, outcome, verdict) {
                Some(result) => {
                    tracing::debug!(
                        "{venue} {code}: {:?} ({})",
                        result.classification,
                        result.reason
                    );
                    results.push(result);
                }
                None => tracing::trace!("{venue} {code}: dropped"),
            }
        }

        tracing::info!(
            "Classified {} groups, {} reported",
            groups.len(),
            results.len()
        );
        results
    }
}

fn evaluate_triggers(
    rules: &VenueRules,
    stats: &WindowStats,
    venue: Venue,
    items: &[ScoredRow<'_>],
) -> TriggerOutcome {
    let strikes = items
        .iter()
        .filter(|item| stats.in_recency(item.row.date) && !item.signals.has_any(&rules.uncounted))
        .count();
    let latest = stats.latest_for(venue);
    let on_latest_day = |group: ClauseGroup| {
        latest.is_some_and(|day| {
            items
                .iter()
                .any(|item| item.row.date == day && item.signals.has(group))
        })
    };

    let mut outcome = TriggerOutcome::default();
    for rule in &rules.triggers {
        match *rule {
            TriggerRule::StrikeCount { threshold } => {
                if strikes >= threshold {
                    outcome.reasons.push(TriggerReason::StrikeCount);
                }
            }
            TriggerRule::LatestDayClause { group } => {
                if on_latest_day(group) {
                    outcome.reasons.push(TriggerReason::LatestDayClause(group));
                }
            }
            TriggerRule::LatestDayClauseWithStrikes { group, threshold } => {
                if strikes >= threshold && on_latest_day(group) {
                    outcome.clause_9_13_armed = true;
                }
            }
        }
    }
    outcome
}

fn ledger_verdict(
    rules: &VenueRules,
    ledger: &LedgerSnapshot,
    code: &str,
    reference: NaiveDate,
    frame: MonthFrame,
) -> LedgerVerdict {
    let entries = ledger.announced_as_of(code, reference);
    if entries.is_empty() {
        return LedgerVerdict::None;
    }
    let prior_month_pending = rules.defer_on_pending_prior_month
        && !entries.iter().any(|e| e.earnings_month == frame.last);

    if let Some(entry) = entries
        .iter()
        .find(|e| frame.this.contains(e.announcement_date))
    {
        let reference = LedgerReference {
            announcement_date: entry.announcement_date,
            earnings_month: entry.earnings_month,
        };
        if prior_month_pending && entry.earnings_month == frame.minus_2 {
            return LedgerVerdict::Tagged {
                tier: Classification::UncertainOtcThisMonth,
                reason: TriggerReason::OtcMonth2DisclosedThisMonth,
                reference,
            };
        }
        return LedgerVerdict::Excluded(reference);
    }

    let Some(entry) = entries.iter().find(|e| {
        frame.last.contains(e.announcement_date)
            && (e.earnings_month == frame.minus_3 || e.earnings_month == frame.minus_2)
    }) else {
        return LedgerVerdict::None;
    };
    let reference = LedgerReference {
        announcement_date: entry.announcement_date,
        earnings_month: entry.earnings_month,
    };
    let (tier, reason) = if entry.earnings_month == frame.minus_3 {
        (
            Classification::UncertainMonth3,
            TriggerReason::Month3DisclosedLastMonth,
        )
    } else if prior_month_pending {
        (
            Classification::UncertainOtcLastMonth,
            TriggerReason::OtcMonth2DisclosedLastMonth,
        )
    } else {
        (
            Classification::UncertainMonth2,
            TriggerReason::Month2DisclosedLastMonth,
        )
    };
    LedgerVerdict::Tagged {
        tier,
        reason,
        reference,
    }
}

/// Decide the tier and build the emitted result, or `None` when dropped.
fn assemble(
    venue: Venue,
    code: &str,
    items: &[ScoredRow<'_>],
    outcome: TriggerOutcome,
    verdict: LedgerVerdict,
) -> Option<AggregatedResult> {
    let TriggerOutcome {
        mut reasons,
        clause_9_13_armed,
    } = outcome;
    let fired = !reasons.is_empty();

    let (classification, reference) = match verdict {
        LedgerVerdict::Excluded(reference) => {
            if !fired && !clause_9_13_armed {
                return None;
            }
            (Classification::LowRiskExcluded, Some(reference))
        }
        LedgerVerdict::Tagged {
            tier,
            reason,
            reference,
        } => {
            reasons.push(reason);
            (tier, Some(reference))
        }
        LedgerVerdict::None if fired => (Classification::HighRisk, None),
        LedgerVerdict::None if clause_9_13_armed => (Classification::UncertainClause9To13, None),
        LedgerVerdict::None => return None,
    };

    if clause_9_13_armed && reasons.is_empty() {
        reasons.push(TriggerReason::Clause9To13);
    }

    // First row holding the latest date supplies the name.
    let mut last = items.first()?.row;
    for item in items.iter().skip(1) {
        if item.row.date > last.date {
            last = item.row;
        }
    }

    Some(AggregatedResult {
        venue,
        code: code.to_string(),
        name: last.name.clone(),
        last_notice_date: last.date,
        reason: reasons
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(REASON_SEPARATOR),
        reasons,
        classification,
        volume_multiplier: max_signal(items, |s| s.volume_multiplier),
        percent_change: max_signal(items, |s| s.percent_change),
        first_clause: items.iter().any(|item| item.signals.first_clause),
        reference,
    })
}

fn max_signal(
    items: &[ScoredRow<'_>],
    pick: impl Fn(&ExtractedSignals) -> Option<f64>,
) -> Option<f64> {
    items
        .iter()
        .filter_map(|item| pick(&item.signals))
        .fold(None, |best, v| Some(best.map_or(v, |b: f64| b.max(v))))
}

/// Classify with the current rule set and the built-in zh-TW patterns.
///
/// The reference date defaults to today.
pub fn build_report(
    rows: &[NoticeRow],
    ledger: &LedgerSnapshot,
    reference: Option<NaiveDate>,
) -> Vec<AggregatedResult> {
    let reference = reference.unwrap_or_else(|| chrono::Local::now().date_naive());
    let rules = RuleSet::current();
    Classifier::new(&rules, PatternTable::builtin()).classify(rows, ledger, reference)
}

/// Keep only results whose last notice date is the latest among them.
pub fn retain_latest(results: Vec<AggregatedResult>) -> Vec<AggregatedResult> {
    let Some(latest) = results.iter().map(|r| r.last_notice_date).max() else {
        return results;
    };
    results
        .into_iter()
        .filter(|r| r.last_notice_date == latest)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ClauseGroup, EarningsRecord};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn row(venue: Venue, code: &str, date: NaiveDate, info: &str) -> NoticeRow {
        NoticeRow {
            venue,
            code: code.to_string(),
            name: format!("name-{code}"),
            date,
            info: info.to_string(),
        }
    }

    fn entry(code: &str, month: &str, announced: NaiveDate) -> EarningsRecord {
        EarningsRecord {
            code: code.to_string(),
            earnings_month: month.parse().unwrap(),
            announcement_date: announced,
        }
    }

    /// Six trading days ending 2026-01-09.
    fn six_days() -> Vec<NaiveDate> {
        [2, 5, 6, 7, 8, 9].iter().map(|d| date(2026, 1, *d)).collect()
    }

    fn classify(rows: &[NoticeRow], records: Vec<EarningsRecord>) -> Vec<AggregatedResult> {
        let ledger = LedgerSnapshot::from_records(records);
        build_report(rows, &ledger, Some(date(2026, 1, 10)))
    }

    fn find<'r>(results: &'r [AggregatedResult], code: &str) -> &'r AggregatedResult {
        results.iter().find(|r| r.code == code).unwrap()
    }

    #[test]
    fn test_empty_input() {
        assert!(classify(&[], vec![]).is_empty());
    }

    #[test]
    fn test_primary_latest_day_clause_is_high_risk() {
        let mut rows: Vec<NoticeRow> = six_days()
            .into_iter()
            .map(|d| row(Venue::Primary, "2330", d, "成交量放大為5倍"))
            .collect();
        rows.last_mut().unwrap().info = "符合第一款，漲幅達32.5%".to_string();

        let results = classify(&rows, vec![]);
        let r = find(&results, "2330");
        assert_eq!(r.classification, Classification::HighRisk);
        assert_eq!(
            r.reasons,
            vec![TriggerReason::LatestDayClause(ClauseGroup::Clause1To8)]
        );
        assert_eq!(r.reason, "昨日第一至第八款");
        assert_eq!(r.volume_multiplier, Some(5.0));
        assert_eq!(r.percent_change, Some(32.5));
        assert!(r.first_clause);
        assert_eq!(r.last_notice_date, date(2026, 1, 9));
    }

    #[test]
    fn test_primary_strikes_alone_do_not_fire() {
        let rows: Vec<NoticeRow> = six_days()
            .into_iter()
            .map(|d| row(Venue::Primary, "2317", d, "成交量放大"))
            .collect();
        assert!(classify(&rows, vec![]).is_empty());
    }

    #[test]
    fn test_secondary_strike_count() {
        let days = six_days();
        let rows = vec![
            row(Venue::Secondary, "6488", days[1], "a"),
            row(Venue::Secondary, "6488", days[3], "b"),
            row(Venue::Secondary, "6488", days[5], "c"),
            row(Venue::Secondary, "5483", days[4], "a"),
            row(Venue::Secondary, "5483", days[5], "b"),
        ];
        let results = classify(&rows, vec![]);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].code, "6488");
        assert_eq!(results[0].reasons, vec![TriggerReason::StrikeCount]);
        assert_eq!(results[0].classification, Classification::HighRisk);
    }

    #[test]
    fn test_strikes_outside_window_not_counted() {
        let rows = vec![
            row(Venue::Secondary, "6488", date(2025, 12, 29), "a"),
            row(Venue::Secondary, "6488", date(2025, 12, 30), "a"),
            row(Venue::Secondary, "6488", date(2026, 1, 9), "a"),
            row(Venue::Primary, "2330", date(2026, 1, 2), "x"),
            row(Venue::Primary, "2330", date(2026, 1, 5), "x"),
            row(Venue::Primary, "2330", date(2026, 1, 6), "x"),
            row(Venue::Primary, "2330", date(2026, 1, 7), "x"),
            row(Venue::Primary, "2330", date(2026, 1, 8), "x"),
        ];
        let results = classify(&rows, vec![]);
        assert!(results.iter().all(|r| r.code != "6488"));
    }

    #[test]
    fn test_ledger_exclusion_this_month() {
        let mut rows: Vec<NoticeRow> = six_days()
            .into_iter()
            .map(|d| row(Venue::Primary, "3034", d, "x"))
            .collect();
        rows.last_mut().unwrap().info = "第二款".to_string();

        let results = classify(&rows, vec![entry("3034", "202512", date(2026, 1, 7))]);
        let r = find(&results, "3034");
        assert_eq!(r.classification, Classification::LowRiskExcluded);
        assert!(r.is_excluded());
        assert_eq!(
            r.reference.map(|x| x.announcement_date),
            Some(date(2026, 1, 7))
        );
        assert_eq!(r.reason, "昨日第一至第八款");
    }

    #[test]
    fn test_exclusion_without_reason_is_dropped() {
        let rows = vec![row(Venue::Secondary, "6488", date(2026, 1, 9), "x")];
        let results = classify(&rows, vec![entry("6488", "202512", date(2026, 1, 5))]);
        assert!(results.is_empty());
    }

    #[test]
    fn test_future_ledger_entries_are_ignored() {
        let rows = vec![row(Venue::Primary, "2330", date(2026, 1, 9), "第三款")];
        let results = classify(&rows, vec![entry("2330", "202512", date(2026, 1, 12))]);
        assert_eq!(find(&results, "2330").classification, Classification::HighRisk);
        assert!(find(&results, "2330").reference.is_none());
    }

    #[test]
    fn test_month3_and_month2_tags_without_reasons() {
        let rows = vec![
            row(Venue::Primary, "1101", date(2026, 1, 9), "x"),
            row(Venue::Primary, "1102", date(2026, 1, 9), "x"),
        ];
        let results = classify(
            &rows,
            vec![
                entry("1101", "202510", date(2025, 12, 5)),
                entry("1102", "202511", date(2025, 12, 18)),
            ],
        );
        let r = find(&results, "1101");
        assert_eq!(r.classification, Classification::UncertainMonth3);
        assert_eq!(r.uncertain_type(), Some("month-3"));
        assert_eq!(r.reason, "上月公布上上上月自結");
        let r = find(&results, "1102");
        assert_eq!(r.classification, Classification::UncertainMonth2);
        assert_eq!(r.reference.unwrap().earnings_month.to_string(), "202511");
    }

    #[test]
    fn test_ledger_tag_beats_high_risk() {
        let rows = vec![row(Venue::Primary, "1101", date(2026, 1, 9), "第一款")];
        let results = classify(&rows, vec![entry("1101", "202511", date(2025, 12, 18))]);
        let r = find(&results, "1101");
        assert_eq!(r.classification, Classification::UncertainMonth2);
        assert_eq!(r.reason, "昨日第一至第八款；上月公布上上月自結");
    }

    #[test]
    fn test_last_month_entry_for_other_month_is_ignored() {
        let rows = vec![row(Venue::Primary, "1101", date(2026, 1, 9), "x")];
        let results = classify(&rows, vec![entry("1101", "202512", date(2025, 12, 30))]);
        assert!(results.is_empty());
    }

    #[test]
    fn test_secondary_deferral_this_month() {
        let days = six_days();
        let rows: Vec<NoticeRow> = days[3..]
            .iter()
            .map(|d| row(Venue::Secondary, "6488", *d, "x"))
            .collect();
        let results = classify(&rows, vec![entry("6488", "202511", date(2026, 1, 6))]);
        let r = find(&results, "6488");
        assert_eq!(r.classification, Classification::UncertainOtcThisMonth);
        assert_eq!(r.uncertain_type(), Some("otc-month-2-this-month"));
        assert_eq!(r.reason, "近六日三次注意；本月公布上上月自結(上月未公布)");
    }

    #[test]
    fn test_secondary_deferral_ends_once_prior_month_disclosed() {
        let days = six_days();
        let rows: Vec<NoticeRow> = days[3..]
            .iter()
            .map(|d| row(Venue::Secondary, "6488", *d, "x"))
            .collect();
        let results = classify(
            &rows,
            vec![
                entry("6488", "202511", date(2026, 1, 6)),
                entry("6488", "202512", date(2026, 1, 8)),
            ],
        );
        assert_eq!(
            find(&results, "6488").classification,
            Classification::LowRiskExcluded
        );
    }

    #[test]
    fn test_primary_never_defers() {
        let rows = vec![row(Venue::Primary, "2330", date(2026, 1, 9), "第一款")];
        let results = classify(&rows, vec![entry("2330", "202511", date(2026, 1, 6))]);
        assert_eq!(
            find(&results, "2330").classification,
            Classification::LowRiskExcluded
        );
    }

    #[test]
    fn test_secondary_deferral_last_month() {
        let rows = vec![row(Venue::Secondary, "5483", date(2026, 1, 9), "x")];
        let results = classify(&rows, vec![entry("5483", "202511", date(2025, 12, 20))]);
        let r = find(&results, "5483");
        assert_eq!(r.classification, Classification::UncertainOtcLastMonth);
        assert_eq!(r.reason, "上月公布上上月自結(上月未公布)");
    }

    #[test]
    fn test_clause_9_to_13_fallback_tier() {
        let mut rows: Vec<NoticeRow> = six_days()[3..]
            .iter()
            .map(|d| row(Venue::Primary, "2603", *d, "週轉率過高"))
            .collect();
        rows.last_mut().unwrap().info = "符合第十一款".to_string();

        let results = classify(&rows, vec![]);
        let r = find(&results, "2603");
        assert_eq!(r.classification, Classification::UncertainClause9To13);
        assert_eq!(r.uncertain_type(), Some("tse-clause-9-13"));
        assert_eq!(r.reasons, vec![TriggerReason::Clause9To13]);
    }

    fn clause_9_13_rows(code: &str) -> Vec<NoticeRow> {
        let mut rows: Vec<NoticeRow> = six_days()[3..]
            .iter()
            .map(|d| row(Venue::Primary, code, *d, "週轉率過高"))
            .collect();
        rows.last_mut().unwrap().info = "符合第十二款".to_string();
        rows
    }

    #[test]
    fn test_ledger_tag_suppresses_clause_9_to_13_fallback() {
        let mut rows = clause_9_13_rows("2603");
        rows.extend(clause_9_13_rows("2609"));
        let results = classify(
            &rows,
            vec![
                entry("2603", "202511", date(2025, 12, 18)),
                entry("2609", "202510", date(2025, 12, 5)),
            ],
        );

        let r = find(&results, "2603");
        assert_eq!(r.classification, Classification::UncertainMonth2);
        assert_eq!(r.reasons, vec![TriggerReason::Month2DisclosedLastMonth]);
        assert_eq!(r.reason, "上月公布上上月自結");

        let r = find(&results, "2609");
        assert_eq!(r.classification, Classification::UncertainMonth3);
        assert_eq!(r.reasons, vec![TriggerReason::Month3DisclosedLastMonth]);
    }

    #[test]
    fn test_excluded_group_kept_by_clause_9_to_13() {
        let rows = clause_9_13_rows("2603");
        let results = classify(&rows, vec![entry("2603", "202512", date(2026, 1, 6))]);
        let r = find(&results, "2603");
        assert_eq!(r.classification, Classification::LowRiskExcluded);
        assert_eq!(r.reasons, vec![TriggerReason::Clause9To13]);
        assert_eq!(r.reason, "上市第九至第十三款");
        assert_eq!(
            r.reference.map(|x| x.announcement_date),
            Some(date(2026, 1, 6))
        );
    }

    #[test]
    fn test_clause_10_rows_are_not_strikes() {
        let mut rows: Vec<NoticeRow> = six_days()[3..]
            .iter()
            .map(|d| row(Venue::Primary, "2603", *d, "第十款"))
            .collect();
        rows.last_mut().unwrap().info = "符合第十一款".to_string();
        assert!(classify(&rows, vec![]).is_empty());
    }

    #[test]
    fn test_derivatives_are_skipped() {
        let rows = vec![
            row(Venue::Primary, "030012", date(2026, 1, 9), "第一款"),
            row(Venue::Primary, "00632R", date(2026, 1, 9), "第一款"),
        ];
        assert!(classify(&rows, vec![]).is_empty());
    }

    #[test]
    fn test_latest_day_is_per_venue() {
        let rows = vec![
            row(Venue::Primary, "2330", date(2026, 1, 8), "第一款"),
            row(Venue::Secondary, "6488", date(2026, 1, 9), "x"),
        ];
        let results = classify(&rows, vec![]);
        assert_eq!(find(&results, "2330").classification, Classification::HighRisk);
    }

    #[test]
    fn test_output_ordered_by_venue_then_code() {
        let rows = vec![
            row(Venue::Secondary, "1234", date(2026, 1, 9), "a"),
            row(Venue::Secondary, "1234", date(2026, 1, 8), "a"),
            row(Venue::Secondary, "1234", date(2026, 1, 7), "a"),
            row(Venue::Primary, "2330", date(2026, 1, 9), "第一款"),
            row(Venue::Primary, "1101", date(2026, 1, 9), "第二款"),
        ];
        let results = classify(&rows, vec![]);
        let keys: Vec<(Venue, &str)> = results.iter().map(|r| (r.venue, r.code.as_str())).collect();
        assert_eq!(
            keys,
            vec![
                (Venue::Primary, "1101"),
                (Venue::Primary, "2330"),
                (Venue::Secondary, "1234"),
            ]
        );
    }

    #[test]
    fn test_name_from_first_latest_row() {
        let mut a = row(Venue::Primary, "2330", date(2026, 1, 9), "第一款");
        a.name = "台積電".to_string();
        let mut b = row(Venue::Primary, "2330", date(2026, 1, 9), "x");
        b.name = "TSMC".to_string();
        let mut c = row(Venue::Primary, "2330", date(2026, 1, 8), "x");
        c.name = "old".to_string();
        let results = classify(&[c, a, b], vec![]);
        assert_eq!(results[0].name, "台積電");
    }

    #[test]
    fn test_legacy_rules() {
        let days = six_days();
        let rows: Vec<NoticeRow> = days[3..]
            .iter()
            .map(|d| row(Venue::Primary, "2317", *d, "成交量放大"))
            .chain(std::iter::once(row(Venue::Primary, "2454", days[5], "第五款")))
            .collect();
        let rules = RuleSet::legacy();
        let ledger = LedgerSnapshot::default();
        let results = Classifier::new(&rules, PatternTable::builtin()).classify(
            &rows,
            &ledger,
            date(2026, 1, 10),
        );
        assert_eq!(find(&results, "2317").reasons, vec![TriggerReason::StrikeCount]);
        assert_eq!(
            find(&results, "2454").reasons,
            vec![TriggerReason::LatestDayClause(ClauseGroup::Clause1To3And5)]
        );
    }

    #[test]
    fn test_retain_latest() {
        let rows = vec![
            row(Venue::Primary, "2330", date(2026, 1, 9), "第一款"),
            row(Venue::Primary, "1101", date(2026, 1, 9), "第二款"),
            row(Venue::Primary, "1102", date(2026, 1, 9), "x"),
        ];
        let mut results = classify(&rows, vec![]);
        results[0].last_notice_date = date(2026, 1, 8);
        let kept = retain_latest(results);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].code, "2330");
        assert!(retain_latest(Vec::new()).is_empty());
    }
}
