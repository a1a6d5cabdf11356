//! These structs provide the CLI interface for the microsave CLI.

use crate::model::Amount;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// microsave: record your income and expenses and track progress toward a savings goal.
///
/// Run without a subcommand to start the interactive menu. The subcommands perform the same
/// operations non-interactively, which is handy for scripts.
#[derive(Debug, Parser, Clone)]
#[command(version)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Args {
    pub fn new(common: Common, command: Option<Command>) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    /// The subcommand to run. The interactive shell is the default.
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Shell)
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the home directory, its config.json and an empty ledger.
    Init,
    /// Start the interactive menu. This is the default when no subcommand is given.
    Shell,
    /// Record an income entry.
    AddIncome(AddIncomeArgs),
    /// Record an expense entry.
    AddExpense(AddExpenseArgs),
    /// Set the savings goal, replacing any existing goal.
    SetGoal(SetGoalArgs),
    /// Print totals, balance and progress toward the savings goal.
    Summary(SummaryArgs),
    /// Append a summary block to the report file.
    Export(ExportArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::WARN)]
    log_level: LevelFilter,

    /// The directory where microsave data and configuration is held. Defaults to ~/microsave
    #[arg(long, env = "MICROSAVE_HOME", default_value_t = default_microsave_home())]
    microsave_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, microsave_home: PathBuf) -> Self {
        Self {
            log_level,
            microsave_home: microsave_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn microsave_home(&self) -> &DisplayPath {
        &self.microsave_home
    }
}

/// Args for the `microsave add-income` command.
#[derive(Debug, Parser, Clone)]
pub struct AddIncomeArgs {
    /// Where the money came from, e.g. job or hustle.
    #[arg(long)]
    source: String,

    /// The amount received. Must not be negative.
    #[arg(long, allow_hyphen_values = true)]
    amount: Amount,

    /// The date received, as YYYY-MM-DD. Defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,
}

impl AddIncomeArgs {
    pub fn new(source: impl Into<String>, amount: Amount, date: Option<NaiveDate>) -> Self {
        Self {
            source: source.into(),
            amount,
            date,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }
}

/// Args for the `microsave add-expense` command.
#[derive(Debug, Parser, Clone)]
pub struct AddExpenseArgs {
    /// What the money was spent on, e.g. food or transport.
    #[arg(long)]
    category: String,

    /// The amount spent. Must not be negative.
    #[arg(long, allow_hyphen_values = true)]
    amount: Amount,

    /// The date spent, as YYYY-MM-DD. Defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,
}

impl AddExpenseArgs {
    pub fn new(category: impl Into<String>, amount: Amount, date: Option<NaiveDate>) -> Self {
        Self {
            category: category.into(),
            amount,
            date,
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }
}

/// Args for the `microsave set-goal` command.
#[derive(Debug, Parser, Clone)]
pub struct SetGoalArgs {
    /// The amount to save. Must not be negative.
    #[arg(long, allow_hyphen_values = true)]
    amount: Amount,

    /// A short description of what the savings are for.
    #[arg(long, default_value = "")]
    description: String,

    /// When the goal should be reached, as YYYY-MM-DD.
    #[arg(long)]
    target_date: NaiveDate,
}

impl SetGoalArgs {
    pub fn new(amount: Amount, description: impl Into<String>, target_date: NaiveDate) -> Self {
        Self {
            amount,
            description: description.into(),
            target_date,
        }
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn target_date(&self) -> NaiveDate {
        self.target_date
    }
}

/// Args for the `microsave summary` command.
#[derive(Debug, Default, Parser, Clone)]
pub struct SummaryArgs {
    /// Also list every expense.
    #[arg(long)]
    long: bool,
}

impl SummaryArgs {
    pub fn new(long: bool) -> Self {
        Self { long }
    }

    pub fn long(&self) -> bool {
        self.long
    }
}

/// Args for the `microsave export` command.
#[derive(Debug, Default, Parser, Clone)]
pub struct ExportArgs {
    /// The report file to append to. Relative paths are resolved against the microsave home.
    /// Defaults to the report_path in config.json.
    #[arg(long)]
    file: Option<PathBuf>,
}

impl ExportArgs {
    pub fn new(file: Option<PathBuf>) -> Self {
        Self { file }
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }
}

fn default_microsave_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("microsave"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --microsave-home or MICROSAVE_HOME instead of relying on the \
                default home directory. If you continue using the program right now, you may \
                have problems!",
            );
            PathBuf::from("microsave")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_defaults_to_shell() {
        let args = Args::try_parse_from(["microsave", "--microsave-home", "/tmp/ms"]).unwrap();
        assert!(matches!(args.command(), Command::Shell));
        assert_eq!(args.common().microsave_home().path(), Path::new("/tmp/ms"));
        assert_eq!(args.common().log_level(), LevelFilter::WARN);
    }

    #[test]
    fn test_parse_add_income() {
        let args = Args::try_parse_from([
            "microsave",
            "add-income",
            "--source",
            "job",
            "--amount",
            "RWF 150,000",
            "--date",
            "2025-07-28",
        ])
        .unwrap();
        let Command::AddIncome(add) = args.command() else {
            panic!("expected add-income");
        };
        assert_eq!(add.source(), "job");
        assert_eq!(add.amount(), Amount::from_str("150000").unwrap());
        assert_eq!(add.date(), NaiveDate::from_ymd_opt(2025, 7, 28));
    }

    #[test]
    fn test_parse_negative_amount_reaches_validation() {
        // Negative amounts must parse so that the store can reject them with a clear message
        let args =
            Args::try_parse_from(["microsave", "add-expense", "--category", "food", "--amount", "-5"])
                .unwrap();
        let Command::AddExpense(add) = args.command() else {
            panic!("expected add-expense");
        };
        assert!(add.amount().is_negative());
        assert_eq!(add.date(), None);
    }

    #[test]
    fn test_parse_set_goal_requires_date() {
        assert!(Args::try_parse_from(["microsave", "set-goal", "--amount", "100"]).is_err());
        assert!(Args::try_parse_from([
            "microsave",
            "set-goal",
            "--amount",
            "100",
            "--target-date",
            "2026-13-01"
        ])
        .is_err());
    }

    #[test]
    fn test_parse_summary_and_export() {
        let args = Args::try_parse_from(["microsave", "summary", "--long"]).unwrap();
        assert!(matches!(args.command(), Command::Summary(s) if s.long()));

        let args = Args::try_parse_from(["microsave", "export", "--file", "out.txt"]).unwrap();
        let Command::Export(export) = args.command() else {
            panic!("expected export");
        };
        assert_eq!(export.file(), Some(Path::new("out.txt")));
    }
}
