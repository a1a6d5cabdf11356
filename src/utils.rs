use anyhow::Context;
use chrono::{Local, NaiveDate, NaiveDateTime, Timelike};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Write a file.
pub(crate) async fn write(path: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> anyhow::Result<()> {
    let path = path.as_ref();
    tokio::fs::write(path, contents)
        .await
        .context(format!("Unable to write to {}", path.to_string_lossy()))
}

/// Read a file to a `String`.
pub(crate) async fn read(path: &Path) -> anyhow::Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read file at {}", path.display()))
}

/// Appends `contents` to the file at `path` with a single write, creating the file if needed.
pub(crate) async fn append(path: &Path, contents: &str) -> anyhow::Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .with_context(|| format!("Unable to open {} for appending", path.display()))?;
    file.write_all(contents.as_bytes())
        .await
        .with_context(|| format!("Unable to append to {}", path.display()))?;
    file.flush()
        .await
        .with_context(|| format!("Unable to flush {}", path.display()))
}

/// Create a directory and all of its parents.
pub(crate) async fn make_dir(path: &Path) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(path)
        .await
        .with_context(|| format!("Unable to create directory at {}", path.display()))
}

pub(crate) async fn canonicalize(path: &Path) -> anyhow::Result<PathBuf> {
    tokio::fs::canonicalize(path)
        .await
        .with_context(|| format!("Unable to canonicalize the path {}", path.display()))
}

/// Today's date in local time.
pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// The current local time, truncated to whole seconds.
pub(crate) fn now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}
