use libsql::Connection;

use crate::error::LedgerError;
use crate::ledger::list_kind;
use crate::models::{DateRange, TaggedRow, TransactionKind};

/// Every expense, income and investment of the user within the inclusive range,
/// merged into one list ordered by date.
///
/// Rows sharing a timestamp are ordered by kind (expense, income, investment),
/// then by insertion order.
pub async fn unified_history(
    conn: &Connection,
    user_id: &str,
    range: DateRange,
) -> Result<Vec<TaggedRow>, LedgerError> {
    let mut merged = Vec::new();
    for kind in TransactionKind::ALL {
        merged.extend(list_kind(conn, kind, user_id, range).await?);
    }
    sort_chronologically(&mut merged);
    Ok(merged)
}

/// Stable sort by date; input is expected in kind order.
pub fn sort_chronologically(rows: &mut [TaggedRow]) {
    rows.sort_by_key(|row| row.date);
}
