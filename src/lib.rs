pub mod aggregate;
pub mod auth;
pub mod config;
pub mod constants;
pub mod currencies;
pub mod database;
pub mod db_tx;
pub mod error;
pub mod history;
pub mod ledger;
pub mod models;
pub mod transactions;
pub mod utils;

use axum::{
    Router,
    routing::{get, post},
};

// Re-export types at crate root for convenient importing
pub use crate::database::Db;
pub use crate::db_tx::{TransactionError, with_transaction};
pub use crate::error::LedgerError;

/// Application state shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    /// Ledger database: users, currencies and the three transaction tables
    pub main_db: Db,
}

/// All API routes. Session and CORS layers are added by the caller.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        .route("/auth/logout", post(auth::logout))
        .route("/currencies", get(currencies::get_currencies))
        .route("/transactions", get(transactions::get_history))
        .route("/transactions/{kind}", post(transactions::create_transaction))
        .route("/transactions/{kind}/total", get(transactions::get_total))
}
