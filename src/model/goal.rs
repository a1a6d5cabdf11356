use crate::model::Amount;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// The fixed identity of the one and only savings goal row. The `savings_goal` table enforces
/// `id = GOAL_ID` with a `CHECK` constraint, so there can never be more than one goal.
pub const GOAL_ID: i64 = 1;

/// The savings goal. Setting a new goal replaces the previous one entirely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SavingsGoal {
    pub amount: Amount,
    pub description: String,
    pub target_date: NaiveDate,
    /// When this goal was set.
    pub created_at: NaiveDateTime,
}
