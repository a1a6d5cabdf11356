//! Command handlers for the microsave CLI.
//!
//! Each handler implements one user operation. The CLI subcommands and the interactive shell both
//! call into these, so an operation behaves the same no matter how it was invoked.

mod export;
mod init;
mod ledger;
mod summary;

use serde::Serialize;
use std::fmt::Debug;
use tracing::debug;

pub use export::export;
pub use init::init;
pub use ledger::{add_expense, add_income, set_goal};
pub use summary::{summary, SummaryOut};

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data to both the command line and the interactive shell.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to stdout and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        println!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}
