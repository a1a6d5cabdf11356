use crate::args::ExportArgs;
use crate::commands::Out;
use crate::summary::Summary;
use crate::{report, utils, Config, Result};
use std::path::PathBuf;

/// Appends a summary block dated today to the report file. The file is `args.file()` when given,
/// otherwise the configured report path.
///
/// # Returns
///
/// On success, returns an `Out` with a confirmation message and the path that was written.
///
/// # Errors
///
/// - `Connection` or `DataUnavailable` if the ledger cannot be summarized. Nothing is written.
/// - `ExportFailed` if the report file cannot be appended to.
pub async fn export(config: &Config, args: ExportArgs) -> Result<Out<PathBuf>> {
    let summary = Summary::load(config.db()).await?;
    let path = match args.file() {
        Some(file) => config.resolve(file),
        None => config.report_path(),
    };
    let written = report::export(&path, &summary, utils::today(), config.currency()).await?;
    Ok(Out::new(
        format!("Report exported successfully to {}.", written.display()),
        written,
    ))
}
