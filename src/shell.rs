//! The interactive, numbered-menu front end.
//!
//! The shell reads from any `BufRead` and writes to any `Write`, so the binary hands it the
//! terminal while tests hand it a script. Every failure other than a broken terminal is reported
//! and the menu is shown again.
//!
//! The welcome prompt defaults to yes: pressing Enter continues, as do `y` and `yes` in any case.
//! Anything else, or end of input, says goodbye.

use crate::args::{AddExpenseArgs, AddIncomeArgs, ExportArgs, SetGoalArgs, SummaryArgs};
use crate::error::{Error, ErrorType, IntoResult};
use crate::model::Amount;
use crate::{commands, Config, Result};
use chrono::NaiveDate;
use std::fmt::Display;
use std::io::{BufRead, Write};
use std::str::FromStr;
use tracing::{debug, warn};

const MENU: &str = "\n-----Main Menu-----\n\
    1. Add Income\n\
    2. Add Expense\n\
    3. Set Savings Goal\n\
    4. View Summary\n\
    5. View Long Summary\n\
    6. Export Report\n\
    7. Exit";

/// An entry of the main menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuChoice {
    AddIncome,
    AddExpense,
    SetGoal,
    Summary,
    LongSummary,
    Export,
    Exit,
}

impl FromStr for MenuChoice {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s.trim() {
            "1" => MenuChoice::AddIncome,
            "2" => MenuChoice::AddExpense,
            "3" => MenuChoice::SetGoal,
            "4" => MenuChoice::Summary,
            "5" => MenuChoice::LongSummary,
            "6" => MenuChoice::Export,
            "7" => MenuChoice::Exit,
            _ => return Err(()),
        })
    }
}

/// An interactive session against one `Config`.
pub struct Shell<R, W> {
    config: Config,
    input: R,
    output: W,
}

impl<R, W> Shell<R, W>
where
    R: BufRead,
    W: Write,
{
    pub fn new(config: Config, input: R, output: W) -> Self {
        Self {
            config,
            input,
            output,
        }
    }

    /// Shows the welcome screen and then the menu until the user exits or input ends.
    ///
    /// # Errors
    /// - `Io` if the terminal cannot be read or written. All other failures are shown to the user
    ///   and the session continues.
    pub async fn run(&mut self) -> Result<()> {
        if !self.welcome()? {
            self.say("Goodbye!")?;
            return Ok(());
        }

        loop {
            self.say(MENU)?;
            let Some(line) = self.prompt("Choose an option [1-7]: ")? else {
                break;
            };
            let Ok(choice) = line.parse::<MenuChoice>() else {
                self.say("Invalid choice. Try again.")?;
                continue;
            };
            debug!("Menu choice {choice:?}");
            if choice == MenuChoice::Exit {
                break;
            }

            match self.dispatch(choice).await {
                Ok(Some(message)) => self.say(message)?,
                // Input ended part way through an operation
                Ok(None) => break,
                Err(e) if e.error_type() == ErrorType::Io => return Err(e),
                Err(e) => {
                    warn!("{choice:?} failed: {e}");
                    self.say(format!("{}: {e}", e.heading()))?;
                }
            }
        }

        self.say("Thank you for using MicroSaver. Goodbye!")
    }

    /// Runs one menu operation. Returns the message to show, or `None` if input ended.
    async fn dispatch(&mut self, choice: MenuChoice) -> Result<Option<String>> {
        match choice {
            MenuChoice::AddIncome => self.add_income().await,
            MenuChoice::AddExpense => self.add_expense().await,
            MenuChoice::SetGoal => self.set_goal().await,
            MenuChoice::Summary => self.summary(false).await,
            MenuChoice::LongSummary => self.summary(true).await,
            MenuChoice::Export => {
                let out = commands::export(&self.config, ExportArgs::default()).await?;
                Ok(Some(out.message().to_string()))
            }
            MenuChoice::Exit => Ok(None),
        }
    }

    fn welcome(&mut self) -> Result<bool> {
        self.say(">>> Welcome to MicroSaver!")?;
        self.say("Your app to track your finances properly.")?;
        let answer = self.prompt("Do you wish to continue? [Y/n]: ")?;
        Ok(match answer {
            Some(answer) => matches!(answer.to_lowercase().as_str(), "" | "y" | "yes"),
            None => false,
        })
    }

    async fn add_income(&mut self) -> Result<Option<String>> {
        let Some(source) = self.prompt("Enter income source (e.g., job, hustle): ")? else {
            return Ok(None);
        };
        let Some(amount) = self.prompt_amount()? else {
            return Ok(None);
        };
        let args = AddIncomeArgs::new(source, amount, None);
        let out = commands::add_income(&self.config, args).await?;
        Ok(Some(out.message().to_string()))
    }

    async fn add_expense(&mut self) -> Result<Option<String>> {
        let Some(category) = self.prompt("Enter expense category (e.g., food, transport): ")?
        else {
            return Ok(None);
        };
        let Some(amount) = self.prompt_amount()? else {
            return Ok(None);
        };
        let args = AddExpenseArgs::new(category, amount, None);
        let out = commands::add_expense(&self.config, args).await?;
        Ok(Some(out.message().to_string()))
    }

    async fn set_goal(&mut self) -> Result<Option<String>> {
        let label = format!(
            "Enter your savings goal amount ({}): ",
            self.config.currency()
        );
        let Some(amount) = self.prompt_amount_with(&label)? else {
            return Ok(None);
        };
        let Some(description) = self.prompt("Short description for this goal: ")? else {
            return Ok(None);
        };
        let Some(target_date) = self.prompt("Enter Target Date (YYYY-MM-DD): ")? else {
            return Ok(None);
        };
        let target_date = NaiveDate::parse_from_str(&target_date, "%Y-%m-%d").map_err(|_| {
            Error::validation(format!(
                "'{target_date}' is not a date. The target date should be in YYYY-MM-DD format."
            ))
        })?;
        let args = SetGoalArgs::new(amount, description, target_date);
        let out = commands::set_goal(&self.config, args).await?;
        Ok(Some(out.message().to_string()))
    }

    async fn summary(&mut self, long: bool) -> Result<Option<String>> {
        let out = commands::summary(&self.config, SummaryArgs::new(long)).await?;
        Ok(Some(out.message().to_string()))
    }

    fn prompt_amount(&mut self) -> Result<Option<Amount>> {
        let label = format!("Enter amount ({}): ", self.config.currency());
        self.prompt_amount_with(&label)
    }

    /// Reads an amount, rejecting non-numeric and negative input before anything else is asked.
    fn prompt_amount_with(&mut self, label: &str) -> Result<Option<Amount>> {
        let Some(text) = self.prompt(label)? else {
            return Ok(None);
        };
        let amount = Amount::from_str(&text)
            .map_err(|e| Error::validation(format!("Invalid amount. {e}")))?;
        if amount.is_negative() {
            return Err(Error::validation("Amount cannot be negative."));
        }
        Ok(Some(amount))
    }

    /// Writes `label` without a newline and reads one line. Returns `None` at end of input.
    fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.output, "{label}").pub_result(ErrorType::Io)?;
        self.output.flush().pub_result(ErrorType::Io)?;
        let mut line = String::new();
        let read = self.input.read_line(&mut line).pub_result(ErrorType::Io)?;
        if read == 0 {
            // Keep the transcript tidy when input is not a terminal
            writeln!(self.output).pub_result(ErrorType::Io)?;
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn say(&mut self, text: impl Display) -> Result<()> {
        writeln!(self.output, "{text}").pub_result(ErrorType::Io)
    }
}
