use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use time::PrimitiveDateTime;

use crate::utils::serialize_timestamp;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
}

#[derive(Deserialize)]
pub struct RegisterPayload {
    pub username: String,
    pub password: String,
}

/// User identity as returned to clients and kept in the session
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PublicUser {
    pub id: String,
    pub username: String,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
        }
    }
}

#[derive(Deserialize)]
pub struct LoginPayload {
    pub username: String,
    pub password: String,
}

/// Category of a ledger entry. Each kind is persisted in its own table.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Expense,
    Income,
    Investment,
}

impl TransactionKind {
    /// All kinds, in the order used to break timestamp ties in the unified view.
    pub const ALL: [TransactionKind; 3] = [
        TransactionKind::Expense,
        TransactionKind::Income,
        TransactionKind::Investment,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TransactionKind::Expense => "expense",
            TransactionKind::Income => "income",
            TransactionKind::Investment => "investment",
        }
    }

    pub fn table(self) -> &'static str {
        match self {
            TransactionKind::Expense => "expenses",
            TransactionKind::Income => "incomes",
            TransactionKind::Investment => "investments",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Currency {
    pub id: i64,
    pub code: String,
}

/// Body of `POST /transactions/{kind}`. Every field is optional at the wire level
/// so that missing values surface as validation errors instead of JSON rejections.
#[derive(Deserialize, Debug, Default)]
pub struct CreateTransactionPayload {
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
    pub date: Option<String>,
    pub description: Option<String>,
}

/// A validated transaction ready to be written by the ledger store
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub user_id: String,
    pub amount: Decimal,
    pub currency: String,
    pub date: PrimitiveDateTime,
    pub description: Option<String>,
}

#[derive(Serialize, Debug, Clone)]
pub struct TransactionRecord {
    pub id: String,
    pub kind: TransactionKind,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub currency: String,
    #[serde(serialize_with = "serialize_timestamp")]
    pub date: PrimitiveDateTime,
    pub description: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct DateRangeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Inclusive, already parsed date range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: PrimitiveDateTime,
    pub end: PrimitiveDateTime,
}

#[derive(Serialize, Debug)]
pub struct AggregateResponse {
    pub user_id: String,
    pub kind: TransactionKind,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
}

/// One row of the unified history, tagged with the kind it was read from
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TaggedRow {
    #[serde(serialize_with = "serialize_timestamp")]
    pub date: PrimitiveDateTime,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub currency: String,
    pub kind: TransactionKind,
}
