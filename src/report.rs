//! Appends a fixed-layout text report of the ledger summary to a file.
//!
//! Each export adds one block:
//!
//! ```text
//! MicroSaver Financial Report
//! Total Income: RWF 500,000
//! Total Expenses: RWF 280,000
//! Current Balance: RWF 220,000
//! Savings Goal: RWF 400,000
//! Goal Achievement: 55.00%
//! Summary done on 2025-07-28
//! -----------------------------------------
//! ```
//!
//! Earlier blocks are never rewritten.

use crate::error::{ErrorType, IntoResult};
use crate::progress::Progress;
use crate::summary::Summary;
use crate::{utils, Result};
use anyhow::Context;
use chrono::NaiveDate;
use std::ffi::OsString;
use std::fmt::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The report file name used when none is configured.
pub const DEFAULT_REPORT_FILE: &str = "report.txt";

const HEADER: &str = "MicroSaver Financial Report";
const SEPARATOR: &str = "-----------------------------------------";

/// Renders one report block, including the trailing separator line and newline.
pub fn render(summary: &Summary, date: NaiveDate, currency: &str) -> String {
    let progress = Progress::new(
        "Goal Achievement",
        summary.balance(),
        summary.goal_amount(),
        currency,
    );
    let achievement = if summary.goal_amount().is_zero() {
        "No goal set.".to_string()
    } else {
        format!("{:.2}%", progress.percentage())
    };

    let mut block = String::new();
    // Writing to a String cannot fail
    let _ = writeln!(block, "{HEADER}");
    let _ = writeln!(block, "Total Income: {currency} {}", summary.total_income());
    let _ = writeln!(block, "Total Expenses: {currency} {}", summary.total_expenses());
    let _ = writeln!(block, "Current Balance: {currency} {}", summary.balance());
    let _ = writeln!(block, "Savings Goal: {currency} {}", summary.goal_amount());
    let _ = writeln!(block, "Goal Achievement: {achievement}");
    let _ = writeln!(block, "Summary done on {}", date.format("%Y-%m-%d"));
    let _ = writeln!(block, "{SEPARATOR}");
    block
}

/// Appends a report block for `summary` to `path`, creating the file if needed. Returns the path
/// actually written, which has `.txt` appended if `path` did not already end with it.
///
/// The block is written with a single append, so a failure does not leave part of a block behind.
///
/// # Errors
/// - `ExportFailed` if the file cannot be opened or written.
pub async fn export(
    path: &Path,
    summary: &Summary,
    date: NaiveDate,
    currency: &str,
) -> Result<PathBuf> {
    let path = with_txt_extension(path);
    let block = render(summary, date, currency);
    utils::append(&path, &block)
        .await
        .context("Unable to export the report")
        .pub_result(ErrorType::ExportFailed)?;
    debug!("Appended report block to {}", path.display());
    Ok(path)
}

/// `report` becomes `report.txt`; `report.csv` becomes `report.csv.txt`.
fn with_txt_extension(path: &Path) -> PathBuf {
    if path.extension().is_some_and(|ext| ext == "txt") {
        return path.to_path_buf();
    }
    let mut name = OsString::from(path.as_os_str());
    name.push(".txt");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Amount;
    use std::str::FromStr;
    use tempfile::TempDir;

    fn amount(s: &str) -> Amount {
        Amount::from_str(s).unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 28).unwrap()
    }

    fn scenario() -> Summary {
        let goal = crate::model::SavingsGoal {
            amount: amount("400000"),
            description: "motorbike".to_string(),
            target_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            created_at: date().and_hms_opt(8, 0, 0).unwrap(),
        };
        Summary::new(amount("500000"), amount("280000"), Some(&goal)).unwrap()
    }

    #[test]
    fn test_render_scenario() {
        let block = render(&scenario(), date(), "RWF");
        let expected = "MicroSaver Financial Report\n\
            Total Income: RWF 500,000\n\
            Total Expenses: RWF 280,000\n\
            Current Balance: RWF 220,000\n\
            Savings Goal: RWF 400,000\n\
            Goal Achievement: 55.00%\n\
            Summary done on 2025-07-28\n\
            -----------------------------------------\n";
        assert_eq!(block, expected);
    }

    #[test]
    fn test_render_without_goal() {
        let summary = Summary::new(amount("10"), amount("15"), None).unwrap();
        let block = render(&summary, date(), "RWF");
        assert!(block.contains("Current Balance: RWF -5\n"), "{block}");
        assert!(block.contains("Savings Goal: RWF 0\n"), "{block}");
        assert!(block.contains("Goal Achievement: No goal set.\n"), "{block}");
        assert_eq!(block.lines().count(), 8);
    }

    #[tokio::test]
    async fn test_export_appends_after_existing_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.txt");
        std::fs::write(&path, "notes from last week\n").unwrap();

        let written = export(&path, &scenario(), date(), "RWF").await.unwrap();
        assert_eq!(written, path);

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("notes from last week\nMicroSaver Financial Report\n"));
        assert!(contents.contains("Current Balance: RWF 220,000\n"));
        assert!(contents.contains("Goal Achievement: 55.00%\n"));
    }

    #[tokio::test]
    async fn test_export_twice_appends_two_blocks() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.txt");

        export(&path, &scenario(), date(), "RWF").await.unwrap();
        export(&path, &scenario(), date(), "RWF").await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.matches(HEADER).count(), 2);
        assert_eq!(contents.matches(SEPARATOR).count(), 2);
        assert_eq!(contents, render(&scenario(), date(), "RWF").repeat(2));
    }

    #[tokio::test]
    async fn test_export_adds_txt_extension() {
        let dir = TempDir::new().unwrap();
        let written = export(&dir.path().join("summary"), &scenario(), date(), "RWF")
            .await
            .unwrap();
        assert_eq!(written, dir.path().join("summary.txt"));
        assert!(written.is_file());
    }

    #[tokio::test]
    async fn test_export_to_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("no").join("such").join("report.txt");
        let err = export(&path, &scenario(), date(), "RWF")
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::ExportFailed);
        assert!(!path.exists());
    }

    #[test]
    fn test_with_txt_extension() {
        assert_eq!(
            with_txt_extension(Path::new("a/report.txt")),
            PathBuf::from("a/report.txt")
        );
        assert_eq!(
            with_txt_extension(Path::new("report.csv")),
            PathBuf::from("report.csv.txt")
        );
        assert_eq!(
            with_txt_extension(Path::new("report")),
            PathBuf::from("report.txt")
        );
    }
}
