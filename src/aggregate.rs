use libsql::Connection;
use rust_decimal::Decimal;

use crate::error::LedgerError;
use crate::ledger::sum_minor_units;
use crate::models::{DateRange, TransactionKind};
use crate::utils::amount_from_minor_units;

/// Total amount of `kind` recorded by the user within the inclusive range.
///
/// Sums integer minor units in the database so the result is exact to the cent.
/// An unknown user, or one without matching rows, totals zero.
pub async fn total_amount(
    conn: &Connection,
    kind: TransactionKind,
    user_id: &str,
    range: DateRange,
) -> Result<Decimal, LedgerError> {
    let minor_units = sum_minor_units(conn, kind, user_id, range).await?;
    Ok(amount_from_minor_units(minor_units))
}
