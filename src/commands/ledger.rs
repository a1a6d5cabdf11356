//! Handlers that write to the ledger: income, expenses and the savings goal.

use crate::args::{AddExpenseArgs, AddIncomeArgs, SetGoalArgs};
use crate::commands::Out;
use crate::{utils, Config, Result};

/// Records an income entry, dated today unless `args` gives a date.
///
/// # Returns
///
/// On success, returns an `Out` containing a confirmation message and the new record's id.
///
/// # Errors
///
/// - `Validation` if the amount is negative. Nothing is written.
/// - `Connection` if the store cannot be reached.
pub async fn add_income(config: &Config, args: AddIncomeArgs) -> Result<Out<i64>> {
    let date = args.date().unwrap_or_else(utils::today);
    let id = config
        .db()
        .insert_income(args.source(), args.amount(), date)
        .await?;
    let message = format!(
        "Income of {} {} from {} recorded.",
        config.currency(),
        args.amount(),
        args.source()
    );
    Ok(Out::new(message, id))
}

/// Records an expense entry, dated today unless `args` gives a date.
///
/// # Errors
///
/// - `Validation` if the amount is negative. Nothing is written.
/// - `Connection` if the store cannot be reached.
pub async fn add_expense(config: &Config, args: AddExpenseArgs) -> Result<Out<i64>> {
    let date = args.date().unwrap_or_else(utils::today);
    let id = config
        .db()
        .insert_expense(args.category(), args.amount(), date)
        .await?;
    let message = format!(
        "Expense of {} {} for {} recorded.",
        config.currency(),
        args.amount(),
        args.category()
    );
    Ok(Out::new(message, id))
}

/// Sets the savings goal, replacing the previous goal if there was one.
///
/// # Errors
///
/// - `Validation` if the amount is negative. The previous goal is left untouched.
/// - `Connection` if the store cannot be reached.
pub async fn set_goal(config: &Config, args: SetGoalArgs) -> Result<Out<()>> {
    config
        .db()
        .upsert_savings_goal(args.amount(), args.description(), args.target_date())
        .await?;
    Ok(format!(
        "Savings goal of {} {} by {} set.",
        config.currency(),
        args.amount(),
        args.target_date()
    )
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorType;
    use crate::model::Amount;
    use crate::test::TestEnv;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn amount(s: &str) -> Amount {
        Amount::from_str(s).unwrap()
    }

    #[tokio::test]
    async fn test_add_income() {
        let env = TestEnv::new().await;
        let args = AddIncomeArgs::new("job", amount("150000"), None);

        let out = add_income(env.config(), args).await.unwrap();

        assert_eq!(out.message(), "Income of RWF 150,000 from job recorded.");
        assert_eq!(out.structure(), Some(&1));
        assert_eq!(
            env.db().sum_income().await.unwrap(),
            Decimal::from(150_000)
        );
    }

    #[tokio::test]
    async fn test_add_expense_with_date() {
        let env = TestEnv::new().await;
        let date = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
        let args = AddExpenseArgs::new("transport", amount("2500.75"), Some(date));

        let out = add_expense(env.config(), args).await.unwrap();
        assert_eq!(
            out.message(),
            "Expense of RWF 2,500.75 for transport recorded."
        );

        let expenses = env.db().list_expenses().await.unwrap();
        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0].date, date);
    }

    #[tokio::test]
    async fn test_add_negative_expense_is_rejected() {
        let env = TestEnv::new().await;
        let args = AddExpenseArgs::new("food", amount("-1"), None);
        let err = add_expense(env.config(), args).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Validation);
        assert!(env.db().list_expenses().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_set_goal_replaces_previous() {
        let env = TestEnv::new().await;
        let first = SetGoalArgs::new(
            amount("100"),
            "phone",
            NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
        );
        let second = SetGoalArgs::new(
            amount("400000"),
            "motorbike",
            NaiveDate::from_ymd_opt(2026, 6, 30).unwrap(),
        );
        set_goal(env.config(), first).await.unwrap();
        let out = set_goal(env.config(), second).await.unwrap();
        assert_eq!(
            out.message(),
            "Savings goal of RWF 400,000 by 2026-06-30 set."
        );

        let goal = env.db().get_savings_goal().await.unwrap().unwrap();
        assert_eq!(goal.description, "motorbike");
        assert_eq!(goal.amount, amount("400000"));
    }

    #[tokio::test]
    async fn test_set_negative_goal_keeps_previous() {
        let env = TestEnv::new().await;
        let target = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        set_goal(env.config(), SetGoalArgs::new(amount("500"), "rent", target))
            .await
            .unwrap();

        let err = set_goal(env.config(), SetGoalArgs::new(amount("-500"), "oops", target))
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Validation);

        let goal = env.db().get_savings_goal().await.unwrap().unwrap();
        assert_eq!(goal.description, "rent");
    }
}
