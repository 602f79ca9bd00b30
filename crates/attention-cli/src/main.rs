//! Attention Watch CLI: entry point.

use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use attention_cli::commands::{self, AddOutcome, ClassifyOptions, VenueInputs};
use attention_cli::config::resolve_ledger_path;
use attention_cli::report;
use attention_core::RuleSet;

#[derive(Parser)]
#[command(
    name = "attention",
    about = "Classify TWSE/TPEx attention notices against self-disclosed earnings",
    version
)]
struct Cli {
    /// Path to the earnings ledger CSV.
    #[arg(short, long, global = true)]
    ledger: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum RulesArg {
    Current,
    Legacy,
}

impl RulesArg {
    fn rule_set(self) -> RuleSet {
        match self {
            RulesArg::Current => RuleSet::current(),
            RulesArg::Legacy => RuleSet::legacy(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Classify attention notices and print the risk report.
    Classify {
        /// Primary venue (TWSE) CSV export.
        #[arg(long)]
        primary_csv: Option<PathBuf>,

        /// Primary venue (TWSE) HTML listing.
        #[arg(long)]
        primary_html: Option<PathBuf>,

        /// Secondary venue (TPEx) CSV export.
        #[arg(long)]
        secondary_csv: Option<PathBuf>,

        /// Secondary venue (TPEx) HTML listing.
        #[arg(long)]
        secondary_html: Option<PathBuf>,

        /// Reference date (YYYY-MM-DD), default today.
        #[arg(long)]
        date: Option<String>,

        /// Number of most recent notice dates to analyse.
        #[arg(long, default_value_t = 6, value_parser = clap::value_parser!(u64).range(1..))]
        days: u64,

        /// Rule set version.
        #[arg(long, value_enum, default_value = "current")]
        rules: RulesArg,

        /// Report every date, not only the latest notice date.
        #[arg(long)]
        all_dates: bool,

        /// Print JSON instead of the text table.
        #[arg(long)]
        json: bool,

        /// Spreadsheet CSV report path, default output/attention_<start>_<end>.csv.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Manage the earnings ledger.
    Ledger {
        #[command(subcommand)]
        action: LedgerAction,
    },

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   attention completions bash > ~/.local/share/bash-completion/completions/attention
    ///   attention completions zsh > ~/.zfunc/_attention
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum LedgerAction {
    /// Record a self-disclosed earnings announcement.
    Add {
        /// Security code.
        code: String,
        /// Earnings month (YYYYMM).
        month: String,
        /// Announcement date (YYYY-MM-DD).
        date: String,
    },

    /// Load the ledger and report record and malformed-line counts.
    Check,
}

fn parse_reference(date: Option<&str>) -> anyhow::Result<NaiveDate> {
    match date {
        Some(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .with_context(|| format!("Invalid date format: {raw}. Use YYYY-MM-DD.")),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let ledger_path = resolve_ledger_path(cli.ledger.as_deref());

    match cli.command {
        Commands::Classify {
            primary_csv,
            primary_html,
            secondary_csv,
            secondary_html,
            date,
            days,
            rules,
            all_dates,
            json,
            output,
        } => {
            let options = ClassifyOptions {
                primary: VenueInputs {
                    csv: primary_csv,
                    html: primary_html,
                },
                secondary: VenueInputs {
                    csv: secondary_csv,
                    html: secondary_html,
                },
                ledger: ledger_path,
                reference: parse_reference(date.as_deref())?,
                days: usize::try_from(days).context("--days is too large")?,
                rules: rules.rule_set(),
                all_dates,
            };

            let mut outcome = commands::classify::run(&options)?;
            eprintln!("Loaded {} earnings records.", outcome.ledger_records);
            for warning in &outcome.warnings {
                eprintln!("Warning: {warning}");
            }
            report::sort_for_report(&mut outcome.results);

            if json {
                println!(
                    "{}",
                    report::render_json(
                        &outcome.results,
                        options.reference,
                        &outcome.window,
                        &options.rules.name,
                    )?
                );
            } else {
                if let Some(latest) = outcome.results.iter().map(|r| r.last_notice_date).max() {
                    eprintln!("Showing report for latest date: {latest}");
                }
                print!("{}", report::render_text(&outcome.results, options.reference));
            }

            if let Some(path) = report::csv_report_path(output, &outcome.window) {
                report::write_csv(&path, &outcome.results, options.reference)
                    .with_context(|| format!("writing {}", path.display()))?;
                eprintln!("CSV saved to {}", path.display());
            }
        }

        Commands::Ledger { action } => match action {
            LedgerAction::Add { code, month, date } => {
                match commands::ledger::add(&ledger_path, &code, &month, &date)? {
                    AddOutcome::Added(r) => println!(
                        "Added record: {} {} {}",
                        r.code, r.earnings_month, r.announcement_date
                    ),
                    AddOutcome::AlreadyRecorded(r) => println!(
                        "[Skip] {} {} {} already recorded",
                        r.code, r.earnings_month, r.announcement_date
                    ),
                }
            }
            LedgerAction::Check => {
                let check = commands::ledger::check(&ledger_path)?;
                if !check.exists {
                    println!("No ledger at {}", ledger_path.display());
                }
                println!(
                    "{}: {} records, {} malformed lines skipped",
                    ledger_path.display(),
                    check.records,
                    check.skipped
                );
            }
        },

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "attention", &mut std::io::stdout());
        }
    }

    Ok(())
}
