//! The `classify` command: load listings, window them, classify.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use chrono::NaiveDate;

use attention_core::{
    extract_first_usable, filter_by_latest_dates, retain_latest, AggregatedResult, Classifier,
    LedgerSnapshot, NoticeRow, PatternTable, RuleSet, SourceFormat, Venue, VenueExtraction,
};

/// Input files for one venue. The delimited export is tried before HTML.
#[derive(Debug, Clone, Default)]
pub struct VenueInputs {
    pub csv: Option<PathBuf>,
    pub html: Option<PathBuf>,
}

impl VenueInputs {
    pub fn is_empty(&self) -> bool {
        self.csv.is_none() && self.html.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct ClassifyOptions {
    pub primary: VenueInputs,
    pub secondary: VenueInputs,
    pub ledger: PathBuf,
    pub reference: NaiveDate,
    pub days: usize,
    pub rules: RuleSet,
    pub all_dates: bool,
}

#[derive(Debug, Clone)]
pub struct ClassifyOutcome {
    pub results: Vec<AggregatedResult>,
    /// Notice dates kept by the window pre-filter, oldest first.
    pub window: Vec<NaiveDate>,
    pub warnings: Vec<String>,
    pub ledger_records: usize,
}

fn read_attempt(path: &Path, format: SourceFormat) -> anyhow::Result<(String, SourceFormat)> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let text = String::from_utf8(bytes)
        .with_context(|| format!("{} is not valid UTF-8", path.display()))?;
    Ok((text, format))
}

/// Extract one venue's rows from whichever of its inputs parses first.
pub fn load_venue(venue: Venue, inputs: &VenueInputs) -> VenueExtraction {
    let mut warnings = Vec::new();
    let mut attempts = Vec::new();
    let candidates = [
        (inputs.csv.as_deref(), SourceFormat::Delimited),
        (inputs.html.as_deref(), SourceFormat::Html),
    ];
    for (path, format) in candidates {
        let Some(path) = path else {
            continue;
        };
        match read_attempt(path, format) {
            Ok(attempt) => attempts.push(attempt),
            Err(e) => {
                tracing::warn!("{venue} {}: {e:#}", format.as_str());
                warnings.push(format!("{venue} {}: {e:#}", format.as_str()));
            }
        }
    }

    if inputs.is_empty() {
        warnings.push(format!("{venue}: no input files given"));
    }

    let borrowed: Vec<(&str, SourceFormat)> = attempts
        .iter()
        .map(|(text, format)| (text.as_str(), *format))
        .collect();
    let mut extraction = extract_first_usable(venue, &borrowed);
    warnings.append(&mut extraction.warnings);
    extraction.warnings = warnings;
    extraction
}

pub fn run(options: &ClassifyOptions) -> anyhow::Result<ClassifyOutcome> {
    let (ledger, skipped) = LedgerSnapshot::load(&options.ledger)
        .with_context(|| format!("loading ledger {}", options.ledger.display()))?;
    let mut warnings = Vec::new();
    if skipped > 0 {
        warnings.push(format!(
            "{skipped} malformed ledger lines skipped in {}",
            options.ledger.display()
        ));
    }

    let mut rows: Vec<NoticeRow> = Vec::new();
    for (venue, inputs) in [
        (Venue::Primary, &options.primary),
        (Venue::Secondary, &options.secondary),
    ] {
        let mut extraction = load_venue(venue, inputs);
        tracing::info!("{venue}: {} notice rows", extraction.rows.len());
        warnings.append(&mut extraction.warnings);
        rows.append(&mut extraction.rows);
    }

    if rows.is_empty() {
        bail!("No notice rows from either venue");
    }

    let (rows, window) = filter_by_latest_dates(&rows, options.days);
    if rows.is_empty() {
        bail!("No rows found within the requested date window");
    }

    let classifier = Classifier::new(&options.rules, PatternTable::builtin());
    let mut results = classifier.classify(&rows, &ledger, options.reference);
    if !options.all_dates {
        results = retain_latest(results);
    }

    Ok(ClassifyOutcome {
        results,
        window,
        warnings,
        ledger_records: ledger.len(),
    })
}
