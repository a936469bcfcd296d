pub mod models;
pub mod test_utils;

use sea_orm::{Database, DatabaseConnection};
use std::path::Path;
use util::config;

/// Turns `DATABASE_PATH` into a connection URL. A value that already looks
/// like a DSN passes through untouched; anything else is treated as a
/// SQLite file path, creating missing parent directories on the way.
fn connection_url() -> String {
    let raw = config::database_path();
    if raw.contains("://") || raw.starts_with("sqlite:") {
        return raw;
    }

    // SQLite creates the file but not intermediate directories.
    if let Some(parent) = Path::new(&raw).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    format!("sqlite://{raw}?mode=rwc")
}

pub async fn connect() -> DatabaseConnection {
    Database::connect(connection_url())
        .await
        .expect("Failed to connect to database")
}
