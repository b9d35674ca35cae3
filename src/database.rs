use anyhow::Result;
use libsql::{Builder, Connection};
use std::{path::Path, sync::Arc};
use tokio::sync::RwLock;

use crate::constants::{DATABASE_FILE, SEED_CURRENCIES};
use crate::models::TransactionKind;

const CREATE_USERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id             TEXT    PRIMARY KEY,
    name           TEXT    UNIQUE NOT NULL,
    password_hash  TEXT    NOT NULL
);
"#;

const CREATE_CURRENCIES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS currencies (
    id    INTEGER PRIMARY KEY AUTOINCREMENT,
    code  TEXT    UNIQUE NOT NULL
);
"#;

pub type Db = Arc<RwLock<Connection>>;

/// The three transaction tables share one layout; only the name differs.
fn create_transaction_table(kind: TransactionKind) -> String {
    let table = kind.table();
    format!(
        r#"
CREATE TABLE IF NOT EXISTS {table} (
    id            TEXT    PRIMARY KEY,
    user_id       TEXT    NOT NULL,
    amount_cents  INTEGER NOT NULL,
    currency      TEXT    NOT NULL,
    date          TEXT    NOT NULL,
    description   TEXT,
    FOREIGN KEY (user_id) REFERENCES users(id),
    FOREIGN KEY (currency) REFERENCES currencies(code)
);
"#
    )
}

fn create_transaction_index(kind: TransactionKind) -> String {
    let table = kind.table();
    format!("CREATE INDEX IF NOT EXISTS idx_{table}_user_date ON {table}(user_id, date);")
}

async fn seed_currencies(conn: &Connection) -> Result<()> {
    for code in SEED_CURRENCIES {
        conn.execute(
            "INSERT OR IGNORE INTO currencies (code) VALUES (?)",
            [*code],
        )
        .await?;
    }
    Ok(())
}

/// Open (or create) the ledger database at `data_dir/ledger.db`
pub async fn init_main_db(data_dir: &str) -> Result<Db> {
    tokio::fs::create_dir_all(data_dir).await?;
    let path = Path::new(data_dir).join(DATABASE_FILE);
    let db = Builder::new_local(path).build().await?;
    let conn = db.connect()?;

    conn.execute("PRAGMA foreign_keys = ON", ()).await?;
    conn.execute(CREATE_USERS_TABLE, ()).await?;
    conn.execute(CREATE_CURRENCIES_TABLE, ()).await?;
    for kind in TransactionKind::ALL {
        conn.execute(&create_transaction_table(kind), ()).await?;
        conn.execute(&create_transaction_index(kind), ()).await?;
    }
    seed_currencies(&conn).await?;

    tracing::debug!(data_dir, "ledger database ready");
    Ok(Arc::new(RwLock::new(conn)))
}
