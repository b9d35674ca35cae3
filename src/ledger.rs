//! Persistence for expense, income and investment entries.
//!
//! The three kinds share one code path; `TransactionKind::table` selects the
//! table, so each kind keeps its own storage.

use libsql::{Connection, Value};
use uuid::Uuid;

use crate::currencies::is_valid_currency;
use crate::error::LedgerError;
use crate::models::{DateRange, NewTransaction, TaggedRow, TransactionKind, TransactionRecord};
use crate::utils::{
    amount_from_minor_units, amount_to_minor_units, timestamp_from_storage, timestamp_to_storage,
};
use crate::{Db, with_transaction};

/// Column values of a row about to be inserted
struct PreparedRow {
    id: String,
    user_id: String,
    amount_cents: i64,
    currency: String,
    date: String,
    description: Option<String>,
}

pub async fn user_exists(conn: &Connection, user_id: &str) -> Result<bool, LedgerError> {
    let mut rows = conn
        .query("SELECT id FROM users WHERE id = ?", [user_id])
        .await?;
    Ok(rows.next().await?.is_some())
}

async fn insert_prepared(
    conn: &Connection,
    kind: TransactionKind,
    row: &PreparedRow,
) -> Result<(), LedgerError> {
    if !user_exists(conn, &row.user_id).await? {
        return Err(LedgerError::not_found("User not found"));
    }
    if !is_valid_currency(conn, &row.currency).await? {
        return Err(LedgerError::validation(format!(
            "Selected currency not available: {}",
            row.currency
        )));
    }

    let description = match &row.description {
        Some(d) => Value::from(d.clone()),
        None => Value::Null,
    };
    let sql = format!(
        "INSERT INTO {} (id, user_id, amount_cents, currency, date, description) VALUES (?, ?, ?, ?, ?, ?)",
        kind.table()
    );
    conn.execute(
        &sql,
        (
            row.id.as_str(),
            row.user_id.as_str(),
            row.amount_cents,
            row.currency.as_str(),
            row.date.as_str(),
            description,
        ),
    )
    .await?;
    Ok(())
}

/// Persist one entry of `kind`.
///
/// The owner and currency are checked inside the same database transaction as the
/// insert; on any error nothing is written.
pub async fn insert_transaction(
    db: &Db,
    kind: TransactionKind,
    entry: NewTransaction,
) -> Result<TransactionRecord, LedgerError> {
    let amount_cents = amount_to_minor_units(entry.amount)?;
    let prepared = PreparedRow {
        id: Uuid::new_v4().to_string(),
        user_id: entry.user_id,
        amount_cents,
        currency: entry.currency,
        date: timestamp_to_storage(entry.date)?,
        description: entry.description,
    };

    let prepared = with_transaction(db, move |conn| {
        Box::pin(async move {
            insert_prepared(conn, kind, &prepared).await?;
            Ok::<PreparedRow, LedgerError>(prepared)
        })
    })
    .await?;

    tracing::info!(
        kind = %kind,
        id = %prepared.id,
        user_id = %prepared.user_id,
        "transaction recorded"
    );

    Ok(TransactionRecord {
        id: prepared.id,
        kind,
        amount: amount_from_minor_units(prepared.amount_cents),
        currency: prepared.currency,
        date: entry.date,
        description: prepared.description,
    })
}

/// Sum of `kind` amounts for the user in the inclusive range, in minor units.
/// No matching rows sum to zero.
pub async fn sum_minor_units(
    conn: &Connection,
    kind: TransactionKind,
    user_id: &str,
    range: DateRange,
) -> Result<i64, LedgerError> {
    let start = timestamp_to_storage(range.start)?;
    let end = timestamp_to_storage(range.end)?;
    let sql = format!(
        "SELECT COALESCE(SUM(amount_cents), 0) FROM {} WHERE user_id = ? AND date >= ? AND date <= ?",
        kind.table()
    );

    let mut rows = conn
        .query(&sql, (user_id, start.as_str(), end.as_str()))
        .await?;
    match rows.next().await? {
        Some(row) => Ok(row.get(0)?),
        None => Ok(0),
    }
}

/// Rows of one kind for the user in the inclusive range, oldest first and in
/// insertion order for equal timestamps.
pub async fn list_kind(
    conn: &Connection,
    kind: TransactionKind,
    user_id: &str,
    range: DateRange,
) -> Result<Vec<TaggedRow>, LedgerError> {
    let start = timestamp_to_storage(range.start)?;
    let end = timestamp_to_storage(range.end)?;
    let sql = format!(
        "SELECT date, amount_cents, currency FROM {} WHERE user_id = ? AND date >= ? AND date <= ? ORDER BY date, rowid",
        kind.table()
    );

    let mut rows = conn
        .query(&sql, (user_id, start.as_str(), end.as_str()))
        .await?;

    let mut tagged = Vec::new();
    while let Some(row) = rows.next().await? {
        let date: String = row.get(0)?;
        let amount_cents: i64 = row.get(1)?;
        tagged.push(TaggedRow {
            date: timestamp_from_storage(&date)?,
            amount: amount_from_minor_units(amount_cents),
            currency: row.get(2)?,
            kind,
        });
    }
    Ok(tagged)
}
