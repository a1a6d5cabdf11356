use crate::commands::Out;
use crate::{Config, Result};
use std::path::Path;

/// Creates the home directory and:
/// - Creates an initial `config.json` file with default settings
/// - Creates an empty ledger store with the income, expenses and savings_goal tables
///
/// # Arguments
/// - `microsave_home` - The directory that will be the root of data directory, e.g.
///   `$HOME/microsave`
///
/// # Errors
/// - Returns a `Config` error if the directory already holds a configuration or if any file
///   operations fail.
pub async fn init(microsave_home: &Path) -> Result<Out<()>> {
    let config = Config::create(microsave_home).await?;
    Ok(format!(
        "Successfully created the microsave directory at {}",
        config.root().display()
    )
    .into())
}
