//! Renders progress toward the savings goal as a percentage with a line of context: how far past
//! the goal the balance is, how deep in debt it is, or how much is still needed.

use crate::model::Amount;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt::{self, Display, Formatter};

/// Width the `"{label}: {percentage}%"` line is padded to.
const LABEL_WIDTH: usize = 25;

/// Where the value stands relative to the goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "standing")]
pub enum Standing {
    /// The goal amount is zero, so there is nothing to measure against.
    NoGoal,
    /// Past the goal by `extra`.
    Surplus { extra: Amount },
    /// The value is negative: `debt` is owed and `needed` must be saved to reach the goal.
    Deficit { debt: Amount, needed: Amount },
    /// Between zero and the goal, with `remaining` left to save.
    Remaining { remaining: Amount },
}

/// Progress of `value` toward `total`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Progress {
    label: String,
    currency: String,
    percentage: Decimal,
    standing: Standing,
}

impl Progress {
    pub fn new(
        label: impl Into<String>,
        value: Amount,
        total: Amount,
        currency: impl Into<String>,
    ) -> Self {
        let (percentage, standing) = if total.is_zero() {
            (Decimal::ZERO, Standing::NoGoal)
        } else {
            // A percentage too large for a Decimal is clamped to the end of the range
            let percentage = value
                .value()
                .checked_div(total.value())
                .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
                .unwrap_or(if value.is_negative() {
                    Decimal::MIN
                } else {
                    Decimal::MAX
                });
            let standing = if value > total {
                Standing::Surplus {
                    extra: value.saturating_sub(total),
                }
            } else if value.is_negative() {
                Standing::Deficit {
                    debt: value.abs(),
                    needed: value.abs().saturating_add(total),
                }
            } else {
                Standing::Remaining {
                    remaining: total.saturating_sub(value),
                }
            };
            (percentage, standing)
        };
        Self {
            label: label.into(),
            currency: currency.into(),
            percentage,
            standing,
        }
    }

    /// The percentage of the goal reached, rounded to two decimal places.
    pub fn percentage(&self) -> Decimal {
        self.percentage.round_dp(2)
    }

    pub fn standing(&self) -> Standing {
        self.standing
    }
}

impl Display for Progress {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let headline = format!("{}: {:.2}%", self.label, self.percentage());
        writeln!(f, "{headline:<width$}", width = LABEL_WIDTH)?;
        let cur = &self.currency;
        match self.standing {
            Standing::NoGoal => write!(f, " No goal set. Set a savings goal to track progress."),
            Standing::Surplus { extra } => write!(
                f,
                " Goal Achieved! You've saved {cur} {extra} more than your goal."
            ),
            Standing::Deficit { debt, needed } => {
                writeln!(f, " Below Zero! You're in debt by {cur} {debt}.")?;
                write!(f, " You still need {cur} {needed} to reach your goal.")
            }
            Standing::Remaining { remaining } => write!(
                f,
                " You're {cur} {remaining} away from reaching your goal."
            ),
        }
    }
}
