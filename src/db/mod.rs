//! This module is responsible for reading, writing and managing the SQLite ledger store.
//!
//! `Db` owns only the connection options. Every operation opens its own connection, uses it, and
//! closes it again, so no connection outlives the operation that needed it.

mod migrations;

use crate::error::{Error, ErrorType, IntoResult};
use crate::model::{Amount, ExpenseRecord, IncomeRecord, SavingsGoal, GOAL_ID};
use crate::{utils, Result};
use anyhow::{bail, Context};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqliteRow};
use sqlx::{ConnectOptions, Connection, Row, SqliteConnection};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, trace};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const INCOME_AMOUNTS: &str = "SELECT amount FROM income";
const EXPENSE_AMOUNTS: &str = "SELECT amount FROM expenses";

/// A handle to the SQLite ledger store.
#[derive(Debug, Clone)]
pub struct Db {
    path: PathBuf,
    options: SqliteConnectOptions,
}

impl Db {
    /// - Validates that no file currently exists at `path`
    /// - Creates a new SQLite file at `path`
    /// - Initializes the database schema
    /// - Returns a constructed `Db` object for further operations
    pub(crate) async fn init(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            return Err(anyhow::anyhow!(
                "A database already exists at '{}'",
                path.display()
            ))
            .pub_result(ErrorType::Config);
        }
        let db = Self::new(path, true);
        db.bootstrap().await?;
        debug!("Created ledger store at {}", path.display());
        Ok(db)
    }

    /// - Validates that there is a SQLite file at `path`
    /// - Updates the database schema if it is out-of-date
    /// - Returns a constructed `Db` object for further operations
    pub(crate) async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(anyhow::anyhow!(
                "The database file is missing '{}'",
                path.display()
            ))
            .pub_result(ErrorType::Connection);
        }
        let db = Self::new(path, false);
        db.bootstrap().await?;
        Ok(db)
    }

    fn new(path: &Path, create: bool) -> Self {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(create);
        Self {
            path: path.to_path_buf(),
            options,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Brings the schema up to the current version.
    async fn bootstrap(&self) -> Result<()> {
        let mut conn = self.connect().await?;
        let result = async {
            let current = migrations::schema_version(&mut conn).await?;
            migrations::run(&mut conn, current, migrations::CURRENT_VERSION).await
        }
        .await
        .context("Unable to prepare the database schema")
        .pub_result(ErrorType::Connection);
        close(conn).await;
        result
    }

    /// Opens a fresh connection to the store.
    async fn connect(&self) -> Result<SqliteConnection> {
        trace!("Opening connection to {}", self.path.display());
        self.options
            .connect()
            .await
            .with_context(|| format!("Unable to open the database at {}", self.path.display()))
            .pub_result(ErrorType::Connection)
    }

    /// Records an income entry and returns its id.
    ///
    /// # Errors
    /// - `Validation` if `amount` is negative, or if it would push the income total past the
    ///   largest representable amount. Nothing is written.
    /// - `Connection` if the store cannot be opened or written.
    pub async fn insert_income(&self, source: &str, amount: Amount, date: NaiveDate) -> Result<i64> {
        ensure_non_negative(amount)?;
        let mut conn = self.connect().await?;
        let result = async {
            ensure_total_fits(&mut conn, INCOME_AMOUNTS, "income", amount).await?;
            sqlx::query("INSERT INTO income (source, amount, date) VALUES (?, ?, ?)")
                .bind(source)
                .bind(amount.value().to_string())
                .bind(date.format(DATE_FORMAT).to_string())
                .execute(&mut conn)
                .await
                .context("Failed to insert income")
                .pub_result(ErrorType::Connection)
        }
        .await;
        close(conn).await;
        let id = result?.last_insert_rowid();
        debug!("Inserted income {id}: {amount} from {source}");
        Ok(id)
    }

    /// Records an expense entry and returns its id.
    ///
    /// # Errors
    /// - `Validation` if `amount` is negative, or if it would push the expense total past the
    ///   largest representable amount. Nothing is written.
    /// - `Connection` if the store cannot be opened or written.
    pub async fn insert_expense(
        &self,
        category: &str,
        amount: Amount,
        date: NaiveDate,
    ) -> Result<i64> {
        ensure_non_negative(amount)?;
        let mut conn = self.connect().await?;
        let result = async {
            ensure_total_fits(&mut conn, EXPENSE_AMOUNTS, "expense", amount).await?;
            sqlx::query("INSERT INTO expenses (category, amount, date) VALUES (?, ?, ?)")
                .bind(category)
                .bind(amount.value().to_string())
                .bind(date.format(DATE_FORMAT).to_string())
                .execute(&mut conn)
                .await
                .context("Failed to insert expense")
                .pub_result(ErrorType::Connection)
        }
        .await;
        close(conn).await;
        let id = result?.last_insert_rowid();
        debug!("Inserted expense {id}: {amount} for {category}");
        Ok(id)
    }

    /// Sets the savings goal, replacing any existing goal entirely. `created_at` is reset to now.
    ///
    /// # Errors
    /// - `Validation` if `amount` is negative. Nothing is written.
    /// - `Connection` if the store cannot be opened or written.
    pub async fn upsert_savings_goal(
        &self,
        amount: Amount,
        description: &str,
        target_date: NaiveDate,
    ) -> Result<()> {
        ensure_non_negative(amount)?;
        let mut conn = self.connect().await?;
        let result = sqlx::query(
            "INSERT INTO savings_goal (id, amount, description, target_date, created_at) \
            VALUES (?, ?, ?, ?, ?) \
            ON CONFLICT(id) DO UPDATE SET \
                amount = excluded.amount, \
                description = excluded.description, \
                target_date = excluded.target_date, \
                created_at = excluded.created_at",
        )
        .bind(GOAL_ID)
        .bind(amount.value().to_string())
        .bind(description)
        .bind(target_date.format(DATE_FORMAT).to_string())
        .bind(utils::now().format(TIMESTAMP_FORMAT).to_string())
        .execute(&mut conn)
        .await
        .context("Failed to save the savings goal")
        .pub_result(ErrorType::Connection);
        close(conn).await;
        result?;
        debug!("Savings goal set to {amount} by {target_date}");
        Ok(())
    }

    /// Returns the sum of all income amounts, or zero when there are none.
    ///
    /// # Errors
    /// - `DataUnavailable` if the store cannot be read or the total is out of range.
    pub async fn sum_income(&self) -> Result<Decimal> {
        self.sum_amounts(INCOME_AMOUNTS).await
    }

    /// Returns the sum of all expense amounts, or zero when there are none.
    ///
    /// # Errors
    /// - `DataUnavailable` if the store cannot be read or the total is out of range.
    pub async fn sum_expenses(&self) -> Result<Decimal> {
        self.sum_amounts(EXPENSE_AMOUNTS).await
    }

    async fn sum_amounts(&self, sql: &'static str) -> Result<Decimal> {
        let mut conn = self.connect().await?;
        let total = sum_rows(&mut conn, sql)
            .await
            .pub_result(ErrorType::DataUnavailable);
        close(conn).await;
        total
    }

    /// Returns the savings goal, if one has been set.
    pub async fn get_savings_goal(&self) -> Result<Option<SavingsGoal>> {
        let mut conn = self.connect().await?;
        let row = sqlx::query(
            "SELECT amount, description, target_date, created_at FROM savings_goal WHERE id = ?",
        )
        .bind(GOAL_ID)
        .fetch_optional(&mut conn)
        .await
        .context("Failed to read the savings goal")
        .pub_result(ErrorType::DataUnavailable);
        close(conn).await;
        row?.map(|row| goal_from_row(&row))
            .transpose()
            .pub_result(ErrorType::DataUnavailable)
    }

    /// Returns every income entry in insertion order.
    pub async fn list_income(&self) -> Result<Vec<IncomeRecord>> {
        let mut conn = self.connect().await?;
        let rows = sqlx::query("SELECT id, source, amount, date FROM income ORDER BY id")
            .fetch_all(&mut conn)
            .await
            .context("Failed to list income")
            .pub_result(ErrorType::DataUnavailable);
        close(conn).await;
        rows?
            .iter()
            .map(income_from_row)
            .collect::<anyhow::Result<Vec<_>>>()
            .pub_result(ErrorType::DataUnavailable)
    }

    /// Returns every expense in insertion order.
    pub async fn list_expenses(&self) -> Result<Vec<ExpenseRecord>> {
        let mut conn = self.connect().await?;
        let rows = sqlx::query("SELECT id, category, amount, date FROM expenses ORDER BY id")
            .fetch_all(&mut conn)
            .await
            .context("Failed to list expenses")
            .pub_result(ErrorType::DataUnavailable);
        close(conn).await;
        rows?
            .iter()
            .map(expense_from_row)
            .collect::<anyhow::Result<Vec<_>>>()
            .pub_result(ErrorType::DataUnavailable)
    }

    /// Returns the number of rows in `table`. Used by tests to observe side effects.
    #[cfg(test)]
    pub(crate) async fn count_rows(&self, table: &str) -> Result<i64> {
        let mut conn = self.connect().await?;
        let row: Result<(i64,)> = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&mut conn)
            .await
            .context("Failed to count rows")
            .pub_result(ErrorType::DataUnavailable);
        close(conn).await;
        Ok(row?.0)
    }
}

fn ensure_non_negative(amount: Amount) -> Result<()> {
    if amount.is_negative() {
        return Err(Error::validation("Amount cannot be negative."));
    }
    Ok(())
}

/// Amounts are stored as decimal text, so the sum is taken here rather than with SQL `SUM`,
/// which would go through floating point.
async fn sum_rows(conn: &mut SqliteConnection, sql: &'static str) -> anyhow::Result<Decimal> {
    let rows: Vec<(String,)> = sqlx::query_as(sql)
        .fetch_all(&mut *conn)
        .await
        .with_context(|| format!("Failed to run '{sql}'"))?;
    rows.iter().try_fold(Decimal::ZERO, |total, (text,)| {
        total
            .checked_add(parse_decimal(text)?)
            .with_context(|| format!("The total of '{sql}' is too large to represent"))
    })
}

/// Rejects `amount` if adding it to the current total of `sql` would overflow.
async fn ensure_total_fits(
    conn: &mut SqliteConnection,
    sql: &'static str,
    kind: &str,
    amount: Amount,
) -> Result<()> {
    let total = sum_rows(conn, sql)
        .await
        .pub_result(ErrorType::Connection)?;
    if total.checked_add(amount.value()).is_none() {
        return Err(Error::validation(format!(
            "Amount is too large. The {kind} total cannot exceed {}.",
            Amount::new(Decimal::MAX)
        )));
    }
    Ok(())
}

/// Closes a connection, logging rather than failing if SQLite reports a problem.
async fn close(conn: SqliteConnection) {
    if let Err(e) = conn.close().await {
        debug!("Error while closing database connection: {e}");
    }
}

fn parse_decimal(text: &str) -> anyhow::Result<Decimal> {
    Decimal::from_str(text).with_context(|| format!("Invalid amount '{text}' in the database"))
}

fn parse_date(text: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(text, DATE_FORMAT)
        .with_context(|| format!("Invalid date '{text}' in the database"))
}

fn income_from_row(row: &SqliteRow) -> anyhow::Result<IncomeRecord> {
    let amount: String = row.try_get("amount")?;
    let date: String = row.try_get("date")?;
    Ok(IncomeRecord {
        id: row.try_get("id")?,
        source: row.try_get("source")?,
        amount: Amount::new(parse_decimal(&amount)?),
        date: parse_date(&date)?,
    })
}

fn expense_from_row(row: &SqliteRow) -> anyhow::Result<ExpenseRecord> {
    let amount: String = row.try_get("amount")?;
    let date: String = row.try_get("date")?;
    Ok(ExpenseRecord {
        id: row.try_get("id")?,
        category: row.try_get("category")?,
        amount: Amount::new(parse_decimal(&amount)?),
        date: parse_date(&date)?,
    })
}

fn goal_from_row(row: &SqliteRow) -> anyhow::Result<SavingsGoal> {
    let amount: String = row.try_get("amount")?;
    let target_date: String = row.try_get("target_date")?;
    let created_at: String = row.try_get("created_at")?;
    let created_at = NaiveDateTime::parse_from_str(&created_at, TIMESTAMP_FORMAT)
        .with_context(|| format!("Invalid timestamp '{created_at}' in the database"))?;
    let amount = Amount::new(parse_decimal(&amount)?);
    if amount.is_negative() {
        bail!("The stored savings goal has a negative amount");
    }
    Ok(SavingsGoal {
        amount,
        description: row.try_get("description")?,
        target_date: parse_date(&target_date)?,
        created_at,
    })
}
