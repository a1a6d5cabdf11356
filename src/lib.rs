pub mod args;
pub mod commands;
mod config;
mod db;
mod error;
pub mod model;
pub mod progress;
pub mod report;
mod shell;
pub mod summary;
#[cfg(test)]
mod test;
mod utils;

pub use config::Config;
pub use db::Db;
pub use error::Error;
pub use error::ErrorType;
pub use error::Result;
pub use shell::Shell;
