use axum::{Json, extract::State, http::StatusCode};
use libsql::Connection;

use crate::AppState;
use crate::error::LedgerError;
use crate::models::Currency;

/// Whether `code` is present in the currency registry
pub async fn is_valid_currency(conn: &Connection, code: &str) -> Result<bool, LedgerError> {
    let mut rows = conn
        .query("SELECT id FROM currencies WHERE code = ?", [code])
        .await?;
    Ok(rows.next().await?.is_some())
}

pub async fn list_currencies(conn: &Connection) -> Result<Vec<Currency>, LedgerError> {
    let mut rows = conn
        .query("SELECT id, code FROM currencies ORDER BY code", ())
        .await?;

    let mut currencies = Vec::new();
    while let Some(row) = rows.next().await? {
        currencies.push(Currency {
            id: row.get(0)?,
            code: row.get(1)?,
        });
    }
    Ok(currencies)
}

pub async fn get_currencies(
    State(app_state): State<AppState>,
) -> Result<(StatusCode, Json<Vec<Currency>>), (StatusCode, String)> {
    let conn = app_state.main_db.read().await;
    let currencies = list_currencies(&conn).await?;
    Ok((StatusCode::OK, Json(currencies)))
}
