use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use rust_decimal::Decimal;
use tower_sessions::Session;

use crate::AppState;
use crate::aggregate::total_amount;
use crate::auth::get_current_user;
use crate::error::LedgerError;
use crate::history::unified_history;
use crate::ledger::insert_transaction;
use crate::models::{
    AggregateResponse, CreateTransactionPayload, DateRange, DateRangeQuery, NewTransaction,
    TaggedRow, TransactionKind, TransactionRecord,
};
use crate::utils::{
    normalize_currency_code, normalize_description, parse_date_range, parse_timestamp,
};

/// Validate a raw payload into a transaction owned by `user_id`. A missing
/// amount is recorded as zero.
pub fn prepare_transaction(
    kind: TransactionKind,
    user_id: &str,
    payload: CreateTransactionPayload,
) -> Result<NewTransaction, LedgerError> {
    let currency = normalize_currency_code(payload.currency.as_deref())?;
    let date = match payload.date.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => parse_timestamp(raw)?,
        _ => {
            return Err(LedgerError::validation(format!(
                "Date of {} is required",
                kind
            )));
        }
    };

    Ok(NewTransaction {
        user_id: user_id.to_string(),
        amount: payload.amount.unwrap_or(Decimal::ZERO),
        currency,
        date,
        description: normalize_description(payload.description.as_deref())?,
    })
}

pub async fn add_transaction(
    app_state: &AppState,
    kind: TransactionKind,
    user_id: &str,
    payload: CreateTransactionPayload,
) -> Result<TransactionRecord, LedgerError> {
    let entry = prepare_transaction(kind, user_id, payload)?;
    insert_transaction(&app_state.main_db, kind, entry).await
}

pub async fn get_aggregate(
    app_state: &AppState,
    kind: TransactionKind,
    user_id: &str,
    range: DateRange,
) -> Result<AggregateResponse, LedgerError> {
    let conn = app_state.main_db.read().await;
    let total = total_amount(&conn, kind, user_id, range).await?;
    Ok(AggregateResponse {
        user_id: user_id.to_string(),
        kind,
        total_amount: total,
    })
}

pub async fn get_unified_history(
    app_state: &AppState,
    user_id: &str,
    range: DateRange,
) -> Result<Vec<TaggedRow>, LedgerError> {
    let conn = app_state.main_db.read().await;
    unified_history(&conn, user_id, range).await
}

pub async fn create_transaction(
    State(app_state): State<AppState>,
    session: Session,
    Path(kind): Path<TransactionKind>,
    payload: Result<Json<CreateTransactionPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<TransactionRecord>), (StatusCode, String)> {
    let user = get_current_user(&session).await?;
    // Wrong-typed or oversized fields are input errors like any other.
    let Json(payload) = payload.map_err(|rejection| {
        LedgerError::validation(format!("Invalid request body: {}", rejection.body_text()))
    })?;
    let record = add_transaction(&app_state, kind, &user.id, payload).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn get_total(
    State(app_state): State<AppState>,
    session: Session,
    Path(kind): Path<TransactionKind>,
    Query(query): Query<DateRangeQuery>,
) -> Result<(StatusCode, Json<AggregateResponse>), (StatusCode, String)> {
    let user = get_current_user(&session).await?;
    let range = parse_date_range(&query)?;
    let aggregate = get_aggregate(&app_state, kind, &user.id, range).await?;
    Ok((StatusCode::OK, Json(aggregate)))
}

pub async fn get_history(
    State(app_state): State<AppState>,
    session: Session,
    Query(query): Query<DateRangeQuery>,
) -> Result<(StatusCode, Json<Vec<TaggedRow>>), (StatusCode, String)> {
    let user = get_current_user(&session).await?;
    let range = parse_date_range(&query)?;
    let rows = get_unified_history(&app_state, &user.id, range).await?;
    Ok((StatusCode::OK, Json(rows)))
}
