use axum::http::StatusCode;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serializer;
use time::format_description::BorrowedFormatItem;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, UtcOffset};

use crate::constants::*;
use crate::error::LedgerError;
use crate::models::{DateRange, DateRangeQuery};

pub fn db_error() -> (StatusCode, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        ERR_DATABASE_OPERATION.to_string(),
    )
}

pub fn db_error_with_context(context: &str) -> (StatusCode, String) {
    tracing::error!(context, "database error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Database error: {}", context),
    )
}

pub fn validate_string_length(
    value: &str,
    field_name: &str,
    max_length: usize,
) -> Result<(), (StatusCode, String)> {
    if value.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("{} cannot be empty", field_name),
        ));
    }
    if value.chars().count() > max_length {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("{} must be less than {} characters", field_name, max_length),
        ));
    }
    Ok(())
}

/// Parse an ISO-8601 date or date-time.
///
/// Date-only input is read as midnight. Input carrying a UTC offset is
/// converted to UTC and stored without the offset.
pub fn parse_timestamp(value: &str) -> Result<PrimitiveDateTime, LedgerError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(LedgerError::validation("Date cannot be empty"));
    }

    if let Ok(date) = Date::parse(value, format_description!("[year]-[month]-[day]")) {
        return Ok(date.midnight());
    }

    let local_formats: [&[BorrowedFormatItem<'_>]; 6] = [
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
        format_description!("[year]-[month]-[day]T[hour]:[minute]"),
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"),
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
        format_description!("[year]-[month]-[day] [hour]:[minute]"),
    ];
    for format in local_formats {
        if let Ok(timestamp) = PrimitiveDateTime::parse(value, format) {
            return Ok(truncate_to_micros(timestamp));
        }
    }

    if let Ok(timestamp) = OffsetDateTime::parse(value, &Rfc3339) {
        return Ok(to_utc(timestamp));
    }

    // RFC 3339 requires seconds; ISO-8601 also allows minute precision.
    let with_offset = match value.strip_suffix(['Z', 'z']) {
        Some(rest) => format!("{}+00:00", rest),
        None => value.to_string(),
    };
    let offset_formats: [&[BorrowedFormatItem<'_>]; 2] = [
        format_description!(
            "[year]-[month]-[day]T[hour]:[minute][offset_hour sign:mandatory]:[offset_minute]"
        ),
        format_description!(
            "[year]-[month]-[day] [hour]:[minute][offset_hour sign:mandatory]:[offset_minute]"
        ),
    ];
    for format in offset_formats {
        if let Ok(timestamp) = OffsetDateTime::parse(&with_offset, format) {
            return Ok(to_utc(timestamp));
        }
    }

    Err(LedgerError::validation(format!(
        "Invalid date format: {}",
        value
    )))
}

fn to_utc(timestamp: OffsetDateTime) -> PrimitiveDateTime {
    let utc = timestamp.to_offset(UtcOffset::UTC);
    truncate_to_micros(PrimitiveDateTime::new(utc.date(), utc.time()))
}

// Storage keeps six sub-second digits.
fn truncate_to_micros(timestamp: PrimitiveDateTime) -> PrimitiveDateTime {
    let micros = timestamp.microsecond();
    timestamp.replace_microsecond(micros).unwrap_or(timestamp)
}

/// Both bounds are required and inclusive.
pub fn parse_date_range(query: &DateRangeQuery) -> Result<DateRange, LedgerError> {
    let (Some(start), Some(end)) = (query.start_date.as_deref(), query.end_date.as_deref()) else {
        return Err(LedgerError::validation(
            "Start date and end date are required",
        ));
    };

    Ok(DateRange {
        start: parse_timestamp(start)?,
        end: parse_timestamp(end)?,
    })
}

/// Fixed-width text form used in the database; sorts chronologically.
pub fn timestamp_to_storage(timestamp: PrimitiveDateTime) -> Result<String, LedgerError> {
    timestamp
        .format(format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:6]"
        ))
        .map_err(|e| LedgerError::internal(format!("failed to format timestamp: {}", e)))
}

pub fn timestamp_from_storage(value: &str) -> Result<PrimitiveDateTime, LedgerError> {
    PrimitiveDateTime::parse(
        value,
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:6]"),
    )
    .map_err(|_| LedgerError::internal("invalid timestamp in database"))
}

/// ISO-8601 rendering; sub-seconds are only shown when present.
pub fn timestamp_to_display(timestamp: PrimitiveDateTime) -> Result<String, time::error::Format> {
    if timestamp.nanosecond() == 0 {
        timestamp.format(format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second]"
        ))
    } else {
        timestamp.format(format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:6]"
        ))
    }
}

pub fn serialize_timestamp<S>(timestamp: &PrimitiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let text = timestamp_to_display(*timestamp).map_err(serde::ser::Error::custom)?;
    serializer.serialize_str(&text)
}

/// Convert an amount to integer minor units (cents), rounding to two places.
pub fn amount_to_minor_units(amount: Decimal) -> Result<i64, LedgerError> {
    let rounded =
        amount.round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointAwayFromZero);
    if rounded.abs() > amount_from_minor_units(MAX_AMOUNT_MINOR_UNITS) {
        return Err(LedgerError::validation("Amount is out of range"));
    }

    let mut scaled = rounded;
    scaled.rescale(AMOUNT_SCALE);
    i64::try_from(scaled.mantissa()).map_err(|_| LedgerError::validation("Amount is out of range"))
}

pub fn amount_from_minor_units(minor_units: i64) -> Decimal {
    Decimal::new(minor_units, AMOUNT_SCALE)
}

/// Trimmed, upper-cased currency code; absence is a validation error.
pub fn normalize_currency_code(code: Option<&str>) -> Result<String, LedgerError> {
    let code = code
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| LedgerError::validation("Currency is required"))?;

    if code.chars().count() != CURRENCY_CODE_LENGTH || !code.chars().all(|c| c.is_ascii_alphabetic())
    {
        return Err(LedgerError::validation(format!(
            "Invalid currency code: {}",
            code
        )));
    }
    Ok(code.to_ascii_uppercase())
}

/// Empty descriptions are dropped; long ones are rejected.
pub fn normalize_description(description: Option<&str>) -> Result<Option<String>, LedgerError> {
    match description.map(str::trim).filter(|d| !d.is_empty()) {
        None => Ok(None),
        Some(d) if d.chars().count() > MAX_DESCRIPTION_LENGTH => Err(LedgerError::validation(
            format!(
                "Description must be at most {} characters",
                MAX_DESCRIPTION_LENGTH
            ),
        )),
        Some(d) => Ok(Some(d.to_string())),
    }
}
