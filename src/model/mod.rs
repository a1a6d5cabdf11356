//! Types that represent the core data model: `IncomeRecord`, `ExpenseRecord` and `SavingsGoal`.
mod amount;
mod goal;
mod ledger;

pub use amount::{Amount, AmountError};
pub use goal::{SavingsGoal, GOAL_ID};
pub use ledger::{ExpenseRecord, IncomeRecord};
