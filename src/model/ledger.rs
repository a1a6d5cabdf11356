use crate::model::Amount;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A row of the `income` table, as listed by the long summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct IncomeRecord {
    /// Assigned by the store on insert.
    pub id: i64,
    /// Where the money came from, e.g. "job" or "hustle".
    pub source: String,
    pub amount: Amount,
    pub date: NaiveDate,
}

/// A row of the `expenses` table, as listed by the long summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ExpenseRecord {
    /// Assigned by the store on insert.
    pub id: i64,
    /// What the money was spent on, e.g. "food" or "transport".
    pub category: String,
    pub amount: Amount,
    pub date: NaiveDate,
}
