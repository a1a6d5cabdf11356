//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::db::Db;
use crate::model::Amount;
use crate::Config;
use chrono::NaiveDate;
use std::str::FromStr;
use tempfile::TempDir;

/// Test environment that sets up a microsave home directory with Config and database.
/// Holds TempDir to keep the directory alive for the duration of the test.
pub(crate) struct TestEnv {
    _temp_dir: TempDir,
    config: Config,
}

impl TestEnv {
    /// Creates a test environment with Config and an initialized, empty database.
    pub(crate) async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("microsave");
        let config = Config::create(&root).await.unwrap();
        Self {
            _temp_dir: temp_dir,
            config,
        }
    }

    pub(crate) fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn db(&self) -> &Db {
        self.config.db()
    }

    /// Seeds the ledger with income totaling 500,000, expenses totaling 280,000 (rent 200,000 on
    /// 2025-07-01 then food 80,000 on 2025-07-15) and a savings goal of 400,000.
    pub(crate) async fn seed_scenario(&self) {
        let db = self.db();
        db.insert_income("job", amount("350000"), date("2025-07-01"))
            .await
            .unwrap();
        db.insert_income("hustle", amount("150000"), date("2025-07-20"))
            .await
            .unwrap();
        db.insert_expense("rent", amount("200000"), date("2025-07-01"))
            .await
            .unwrap();
        db.insert_expense("food", amount("80000"), date("2025-07-15"))
            .await
            .unwrap();
        db.upsert_savings_goal(amount("400000"), "motorbike", date("2026-06-30"))
            .await
            .unwrap();
    }
}

fn amount(s: &str) -> Amount {
    Amount::from_str(s).unwrap()
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::from_str(s).unwrap()
}
