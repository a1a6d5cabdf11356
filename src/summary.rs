//! Aggregates the ledger into the four figures every summary and report is built from.

use crate::db::Db;
use crate::error::{ErrorType, IntoResult};
use crate::model::{Amount, SavingsGoal};
use crate::Result;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Totals for the whole ledger and the current savings goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Summary {
    total_income: Amount,
    total_expenses: Amount,
    balance: Amount,
    goal_amount: Amount,
}

impl Summary {
    /// Computes the summary from the income and expense totals and the goal, if any. The balance
    /// is `total_income - total_expenses` and may be negative. With no goal, the goal amount is 0.
    ///
    /// # Errors
    /// - `DataUnavailable` if the balance does not fit in a `Decimal`.
    pub fn new(
        total_income: Amount,
        total_expenses: Amount,
        goal: Option<&SavingsGoal>,
    ) -> Result<Self> {
        let balance = total_income
            .checked_sub(total_expenses)
            .with_context(|| {
                format!("The balance of {total_income} less {total_expenses} is out of range")
            })
            .pub_result(ErrorType::DataUnavailable)?;
        Ok(Self {
            total_income,
            total_expenses,
            balance,
            goal_amount: goal.map(|g| g.amount).unwrap_or_default(),
        })
    }

    /// Reads the current contents of the store and summarizes them.
    pub async fn load(db: &Db) -> Result<Self> {
        let total_income = Amount::new(db.sum_income().await?);
        let total_expenses = Amount::new(db.sum_expenses().await?);
        let goal = db.get_savings_goal().await?;
        let summary = Self::new(total_income, total_expenses, goal.as_ref())?;
        debug!("{summary:?}");
        Ok(summary)
    }

    pub fn total_income(&self) -> Amount {
        self.total_income
    }

    pub fn total_expenses(&self) -> Amount {
        self.total_expenses
    }

    pub fn balance(&self) -> Amount {
        self.balance
    }

    pub fn goal_amount(&self) -> Amount {
        self.goal_amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn amount(s: &str) -> Amount {
        Amount::from_str(s).unwrap()
    }

    fn goal(a: &str) -> SavingsGoal {
        SavingsGoal {
            amount: amount(a),
            description: "motorbike".to_string(),
            target_date: NaiveDate::from_ymd_opt(2026, 6, 30).unwrap(),
            created_at: NaiveDate::from_ymd_opt(2025, 7, 1)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
        }
    }

    #[test]
    fn test_empty_ledger() {
        let summary = Summary::new(Amount::ZERO, Amount::ZERO, None).unwrap();
        assert!(summary.balance().is_zero());
        assert!(summary.goal_amount().is_zero());
        assert_eq!(summary, Summary::default());
    }

    #[test]
    fn test_balance_is_income_minus_expenses() {
        let summary =
            Summary::new(amount("500000"), amount("280000"), Some(&goal("400000"))).unwrap();
        assert_eq!(summary.balance(), amount("220000"));
        assert_eq!(summary.goal_amount(), amount("400000"));
    }

    #[test]
    fn test_balance_can_be_negative() {
        let summary = Summary::new(amount("100"), amount("120.50"), None).unwrap();
        assert_eq!(summary.balance(), amount("-20.50"));
        assert!(summary.balance().is_negative());
    }

    #[test]
    fn test_balance_out_of_range() {
        let max = Amount::new(rust_decimal::Decimal::MAX);
        let min = Amount::new(rust_decimal::Decimal::MIN);
        let err = Summary::new(max, min, None).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::DataUnavailable);

        // The largest totals the store allows still have a balance
        let summary = Summary::new(max, max, None).unwrap();
        assert!(summary.balance().is_zero());
        let summary = Summary::new(Amount::ZERO, max, None).unwrap();
        assert_eq!(summary.balance(), min);
    }

    #[tokio::test]
    async fn test_load_from_store() {
        let env = TestEnv::new().await;
        env.seed_scenario().await;

        let summary = Summary::load(env.db()).await.unwrap();
        assert_eq!(summary.total_income(), amount("500000"));
        assert_eq!(summary.total_expenses(), amount("280000"));
        assert_eq!(summary.balance(), amount("220000"));
        assert_eq!(summary.goal_amount(), amount("400000"));
    }

    #[tokio::test]
    async fn test_load_from_empty_store() {
        let env = TestEnv::new().await;
        let summary = Summary::load(env.db()).await.unwrap();
        assert_eq!(summary, Summary::default());
    }
}
