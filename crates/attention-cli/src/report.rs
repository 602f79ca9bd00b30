//! Report rendering: status messages, ordering, text, CSV and JSON output.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Serialize;

use attention_core::{AggregatedResult, Classification};

/// Column headings shared by the text and CSV reports.
pub const COLUMNS: [&str; 7] = [
    "市場",
    "代號",
    "名稱",
    "風險評級",
    "觸發原因",
    "最後注意日",
    "狀態",
];

/// An uncertain result whose referenced announcement is older than this is
/// reported as probably due.
pub const STALE_ANNOUNCEMENT_DAYS: i64 = 30;

const DATE_FORMAT: &str = "%Y-%m-%d";

fn announced(result: &AggregatedResult) -> String {
    match result.reference {
        Some(r) => format!(
            "[{}月自結於{}公布]",
            r.earnings_month,
            r.announcement_date.format(DATE_FORMAT)
        ),
        None => String::new(),
    }
}

/// Status message and risk label for one result, as of `reference`.
pub fn status_and_risk(result: &AggregatedResult, reference: NaiveDate) -> (String, &'static str) {
    match result.classification {
        Classification::LowRiskExcluded => {
            let status = if result.reference.is_some() {
                format!("(已){}", announced(result))
            } else {
                "(已) 已公告 (排除)".to_string()
            };
            (status, result.classification.risk_label())
        }
        Classification::HighRisk => (
            "(未) 未公告 (高風險)".to_string(),
            result.classification.risk_label(),
        ),
        Classification::UncertainClause9To13 => (
            "(?) 不一定公布 (TSE第九-第十三款)".to_string(),
            result.classification.risk_label(),
        ),
        _ => {
            let stale = result.reference.is_some_and(|r| {
                (reference - r.announcement_date).num_days() > STALE_ANNOUNCEMENT_DAYS
            });
            let (prefix, risk) = if stale {
                ("(!) 可能公布", "可能公布")
            } else {
                ("(?) 不確定", result.classification.risk_label())
            };
            let status = match result.reference {
                Some(_) => format!("{prefix} {}", announced(result)),
                None => prefix.to_string(),
            };
            (status, risk)
        }
    }
}

/// Sort into report order: high risk first, oldest referenced announcement
/// first within a tier.
pub fn sort_for_report(results: &mut [AggregatedResult]) {
    results.sort_by(|a, b| a.report_key().cmp(&b.report_key()));
}

/// One rendered report line, in [`COLUMNS`] order.
pub fn report_row(result: &AggregatedResult, reference: NaiveDate) -> [String; 7] {
    let (status, risk) = status_and_risk(result, reference);
    [
        result.venue.tag().to_string(),
        result.code.clone(),
        result.name.clone(),
        risk.to_string(),
        result.reason.clone(),
        result.last_notice_date.format(DATE_FORMAT).to_string(),
        status,
    ]
}

/// Tab-separated text report with a heading line.
pub fn render_text(results: &[AggregatedResult], reference: NaiveDate) -> String {
    let mut out = COLUMNS.join("\t");
    out.push('\n');
    for result in results {
        out.push_str(&report_row(result, reference).join("\t"));
        out.push('\n');
    }
    out
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Spreadsheet-friendly CSV: UTF-8 BOM, codes written as `="code"` so
/// leading zeros survive.
pub fn render_csv(results: &[AggregatedResult], reference: NaiveDate) -> String {
    let mut out = String::from('\u{feff}');
    out.push_str(&COLUMNS.join(","));
    out.push('\n');
    for result in results {
        let mut row = report_row(result, reference);
        row[1] = format!("=\"{}\"", row[1]);
        let line: Vec<String> = row.iter().map(|f| csv_field(f)).collect();
        out.push_str(&line.join(","));
        out.push('\n');
    }
    out
}

/// Write the CSV report, creating parent directories.
pub fn write_csv(
    path: &Path,
    results: &[AggregatedResult],
    reference: NaiveDate,
) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, render_csv(results, reference))
}

/// Directory the CSV report goes to when no path is given.
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Default CSV file name for a notice-date window.
pub fn default_csv_name(window: &[NaiveDate]) -> Option<String> {
    let start = window.iter().min()?;
    let end = window.iter().max()?;
    Some(format!(
        "attention_{}_{}.csv",
        start.format("%Y%m%d"),
        end.format("%Y%m%d")
    ))
}

/// CSV report path: `explicit` if given, else `output/attention_<start>_<end>.csv`.
pub fn csv_report_path(explicit: Option<PathBuf>, window: &[NaiveDate]) -> Option<PathBuf> {
    explicit.or_else(|| {
        default_csv_name(window).map(|name| Path::new(DEFAULT_OUTPUT_DIR).join(name))
    })
}

#[derive(Debug, Serialize)]
pub struct ReportEntry<'a> {
    #[serde(flatten)]
    pub result: &'a AggregatedResult,
    pub risk: &'static str,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub reference_date: NaiveDate,
    pub window: &'a [NaiveDate],
    pub rules: &'a str,
    pub results: Vec<ReportEntry<'a>>,
}

pub fn render_json(
    results: &[AggregatedResult],
    reference: NaiveDate,
    window: &[NaiveDate],
    rules: &str,
) -> serde_json::Result<String> {
    let report = JsonReport {
        reference_date: reference,
        window,
        rules,
        results: results
            .iter()
            .map(|result| {
                let (status, risk) = status_and_risk(result, reference);
                ReportEntry {
                    result,
                    risk,
                    status,
                }
            })
            .collect(),
    };
    serde_json::to_string_pretty(&report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use attention_core::{LedgerReference, TriggerReason, Venue};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn result(
        code: &str,
        classification: Classification,
        announced: Option<NaiveDate>,
    ) -> AggregatedResult {
        AggregatedResult {
            venue: Venue::Primary,
            code: code.to_string(),
            name: "台積電".to_string(),
            last_notice_date: date(2026, 1, 9),
            reasons: vec![TriggerReason::StrikeCount],
            reason: "近六日三次注意".to_string(),
            classification,
            volume_multiplier: None,
            percent_change: None,
            first_clause: false,
            reference: announced.map(|d| LedgerReference {
                announcement_date: d,
                earnings_month: "202512".parse().unwrap(),
            }),
        }
    }

    #[test]
    fn test_status_messages() {
        let today = date(2026, 1, 10);
        let (s, r) = status_and_risk(&result("1", Classification::HighRisk, None), today);
        assert_eq!((s.as_str(), r), ("(未) 未公告 (高風險)", "高風險"));

        let (s, r) = status_and_risk(
            &result("1", Classification::LowRiskExcluded, Some(date(2026, 1, 7))),
            today,
        );
        assert_eq!(s, "(已)[202512月自結於2026-01-07公布]");
        assert_eq!(r, "低風險");

        let (s, r) = status_and_risk(
            &result("1", Classification::UncertainMonth2, Some(date(2025, 12, 20))),
            today,
        );
        assert_eq!(s, "(?) 不確定 [202512月自結於2025-12-20公布]");
        assert_eq!(r, "不確定公布");

        let (s, r) = status_and_risk(
            &result("1", Classification::UncertainMonth3, Some(date(2025, 12, 1))),
            today,
        );
        assert!(s.starts_with("(!) 可能公布"));
        assert_eq!(r, "可能公布");

        let (s, r) = status_and_risk(&result("1", Classification::UncertainClause9To13, None), today);
        assert_eq!(s, "(?) 不一定公布 (TSE第九-第十三款)");
        assert_eq!(r, "不一定公布");
    }

    #[test]
    fn test_sort_for_report() {
        let mut results = vec![
            result("3", Classification::LowRiskExcluded, Some(date(2026, 1, 2))),
            result("2", Classification::UncertainMonth2, Some(date(2025, 12, 20))),
            result("4", Classification::UncertainMonth3, Some(date(2025, 12, 5))),
            result("1", Classification::HighRisk, None),
        ];
        sort_for_report(&mut results);
        let codes: Vec<&str> = results.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["1", "4", "2", "3"]);
    }

    #[test]
    fn test_render_text_is_tab_separated() {
        let text = render_text(&[result("2330", Classification::HighRisk, None)], date(2026, 1, 10));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].split('\t').count(), 7);
        assert_eq!(
            lines[1],
            "TSE\t2330\t台積電\t高風險\t近六日三次注意\t2026-01-09\t(未) 未公告 (高風險)"
        );
    }

    #[test]
    fn test_render_csv_escapes() {
        let mut r = result("0050", Classification::HighRisk, None);
        r.name = "元大,台灣50".to_string();
        let csv = render_csv(&[r], date(2026, 1, 10));
        assert!(csv.starts_with('\u{feff}'));
        assert!(csv.contains("\"=\"\"0050\"\"\""));
        assert!(csv.contains("\"元大,台灣50\""));
    }

    #[test]
    fn test_default_csv_name() {
        assert_eq!(
            default_csv_name(&[date(2026, 1, 2), date(2026, 1, 9)]).as_deref(),
            Some("attention_20260102_20260109.csv")
        );
        assert!(default_csv_name(&[]).is_none());
    }

    #[test]
    fn test_csv_report_path() {
        let window = [date(2026, 1, 8), date(2026, 1, 9)];
        assert_eq!(
            csv_report_path(None, &window),
            Some(PathBuf::from("output").join("attention_20260108_20260109.csv"))
        );
        assert_eq!(
            csv_report_path(Some(PathBuf::from("mine.csv")), &window),
            Some(PathBuf::from("mine.csv"))
        );
        assert!(csv_report_path(None, &[]).is_none());
    }

    #[test]
    fn test_render_json() {
        let json = render_json(
            &[result("2330", Classification::HighRisk, None)],
            date(2026, 1, 10),
            &[date(2026, 1, 9)],
            "current",
        )
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["results"][0]["code"], "2330");
        assert_eq!(value["results"][0]["risk"], "高風險");
        assert_eq!(value["window"][0], "2026-01-09");
    }
}
