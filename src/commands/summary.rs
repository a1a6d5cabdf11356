use crate::args::SummaryArgs;
use crate::commands::Out;
use crate::model::{ExpenseRecord, IncomeRecord};
use crate::progress::Progress;
use crate::summary::Summary;
use crate::{Config, Result};
use serde::Serialize;
use std::fmt::Write;

/// The structured output of the `summary` command.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryOut {
    pub summary: Summary,
    pub progress: Progress,
    /// Every income entry in insertion order, present only for the long summary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub income: Option<Vec<IncomeRecord>>,
    /// Every expense in insertion order, present only for the long summary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expenses: Option<Vec<ExpenseRecord>>,
}

/// Summarizes the ledger: total income, total expenses, balance, the savings goal, and progress
/// toward it. With `--long`, every income entry and every expense is listed as well.
///
/// # Errors
///
/// - `Connection` if the store cannot be reached.
/// - `DataUnavailable` if the store cannot be read.
pub async fn summary(config: &Config, args: SummaryArgs) -> Result<Out<SummaryOut>> {
    let summary = Summary::load(config.db()).await?;
    let (income, expenses) = if args.long() {
        (
            Some(config.db().list_income().await?),
            Some(config.db().list_expenses().await?),
        )
    } else {
        (None, None)
    };
    let cur = config.currency();
    let progress = Progress::new("Goal Achieved", summary.balance(), summary.goal_amount(), cur);

    let mut message = String::new();
    // Writing to a String cannot fail
    let _ = writeln!(message, "Financial Summary");
    let _ = writeln!(message, "Total Income: {cur} {}", summary.total_income());
    if let Some(income) = &income {
        let _ = writeln!(message, "Income list:");
        for entry in income {
            let _ = writeln!(
                message,
                "    {}: {cur} {} on {}",
                entry.source, entry.amount, entry.date
            );
        }
    }
    if let Some(expenses) = &expenses {
        let _ = writeln!(message, "Expenses list:");
        for expense in expenses {
            let _ = writeln!(
                message,
                "    {}: {cur} {} on {}",
                expense.category, expense.amount, expense.date
            );
        }
    }
    let _ = writeln!(message, "Total Expenses: {cur} {}", summary.total_expenses());
    let _ = writeln!(message, "Current Balance: {cur} {}", summary.balance());
    let _ = writeln!(message, "Savings Goal: {cur} {}", summary.goal_amount());
    let _ = write!(message, "{progress}");

    Ok(Out::new(
        message,
        SummaryOut {
            summary,
            progress,
            income,
            expenses,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::Standing;
    use crate::test::TestEnv;
    use std::str::FromStr;

    #[tokio::test]
    async fn test_summary_scenario() {
        let env = TestEnv::new().await;
        env.seed_scenario().await;

        let out = summary(env.config(), SummaryArgs::new(false)).await.unwrap();
        let message = out.message();
        assert!(message.starts_with("Financial Summary\n"), "{message}");
        assert!(message.contains("Total Income: RWF 500,000\n"), "{message}");
        assert!(message.contains("Total Expenses: RWF 280,000\n"), "{message}");
        assert!(message.contains("Current Balance: RWF 220,000\n"), "{message}");
        assert!(message.contains("Savings Goal: RWF 400,000\n"), "{message}");
        assert!(message.contains("Goal Achieved: 55.00%"), "{message}");
        assert!(message.contains("RWF 180,000 away"), "{message}");
        assert!(!message.contains("Expenses list:"), "{message}");

        let structure = out.structure().unwrap();
        assert!(structure.expenses.is_none());
        assert!(structure.income.is_none());
        assert!(matches!(
            structure.progress.standing(),
            Standing::Remaining { .. }
        ));
    }

    #[tokio::test]
    async fn test_long_summary_lists_expenses() {
        let env = TestEnv::new().await;
        env.seed_scenario().await;

        let out = summary(env.config(), SummaryArgs::new(true)).await.unwrap();
        let message = out.message();
        assert!(message.contains("Expenses list:\n"), "{message}");
        assert!(
            message.contains("    rent: RWF 200,000 on 2025-07-01\n"),
            "{message}"
        );
        assert!(
            message.contains("    food: RWF 80,000 on 2025-07-15\n"),
            "{message}"
        );
        let listed = message.find("rent:").unwrap();
        let total = message.find("Total Expenses").unwrap();
        assert!(listed < total);
        assert_eq!(out.structure().unwrap().expenses.as_ref().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_long_summary_lists_income() {
        let env = TestEnv::new().await;
        env.seed_scenario().await;

        let out = summary(env.config(), SummaryArgs::new(true)).await.unwrap();
        let message = out.message();
        assert!(message.contains("Income list:\n"), "{message}");
        assert!(
            message.contains("    job: RWF 350,000 on 2025-07-01\n"),
            "{message}"
        );
        assert!(
            message.contains("    hustle: RWF 150,000 on 2025-07-20\n"),
            "{message}"
        );
        let listed = message.find("hustle:").unwrap();
        let expenses = message.find("Expenses list:").unwrap();
        assert!(listed < expenses);
        assert_eq!(out.structure().unwrap().income.as_ref().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_summary_of_huge_balance_against_tiny_goal() {
        let env = TestEnv::new().await;
        let date = chrono::NaiveDate::from_ymd_opt(2025, 7, 28).unwrap();
        let huge = crate::model::Amount::new(
            rust_decimal::Decimal::from_str("1000000000000000000000000000").unwrap(),
        );
        let one = crate::model::Amount::new(rust_decimal::Decimal::ONE);
        env.db().insert_income("lottery", huge, date).await.unwrap();
        env.db()
            .upsert_savings_goal(one, "snack", date)
            .await
            .unwrap();

        let out = summary(env.config(), SummaryArgs::new(true)).await.unwrap();
        let message = out.message();
        assert!(
            message.contains("Total Income: RWF 1,000,000,000,000,000,000,000,000,000\n"),
            "{message}"
        );
        assert!(message.contains("Goal Achieved: "), "{message}");
        assert!(message.contains("more than your goal."), "{message}");
    }

    #[tokio::test]
    async fn test_summary_of_empty_ledger() {
        let env = TestEnv::new().await;
        let out = summary(env.config(), SummaryArgs::default()).await.unwrap();
        assert!(out.message().contains("Current Balance: RWF 0\n"));
        assert!(out.message().contains("No goal set."));
    }
}
