//! Configuration loading and resolution.

use std::path::{Path, PathBuf};

/// Environment variable naming the ledger file.
pub const LEDGER_ENV: &str = "ATTENTION_LEDGER";

const CWD_LEDGER: &str = "data/earnings_records.csv";

/// Resolve the earnings ledger path.
///
/// Order: explicit flag, `ATTENTION_LEDGER`, `./data/earnings_records.csv` if
/// present, then `$HOME/.attention/earnings_records.csv`.
pub fn resolve_ledger_path(explicit: Option<&str>) -> PathBuf {
    resolve_ledger_path_in(
        explicit,
        std::env::var(LEDGER_ENV).ok(),
        Path::new("."),
        home_dir(),
    )
}

/// Resolution against explicit inputs instead of the process environment.
pub fn resolve_ledger_path_in(
    explicit: Option<&str>,
    env_value: Option<String>,
    cwd: &Path,
    home: Option<String>,
) -> PathBuf {
    if let Some(path) = explicit {
        return PathBuf::from(path);
    }

    if let Some(env_path) = env_value.filter(|v| !v.trim().is_empty()) {
        return PathBuf::from(env_path);
    }

    let cwd_ledger = cwd.join(CWD_LEDGER);
    if cwd_ledger.exists() {
        return cwd_ledger;
    }

    default_ledger_path(home)
}

fn home_dir() -> Option<String> {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .ok()
}

fn default_ledger_path(home: Option<String>) -> PathBuf {
    let home = home.unwrap_or_else(|| ".".to_string());
    PathBuf::from(format!("{home}/.attention/earnings_records.csv"))
}
