use sitewatch_core::models::{DetailFields, ListingRecord, YearMonth};
use sitewatch_db::{Database, DatabaseConfig};
use tempfile::TempDir;

/// Opens a migrated in-memory database.
pub async fn setup_test_db() -> Database {
    Database::open(&DatabaseConfig::in_memory())
        .await
        .expect("Failed to open in-memory database")
}

/// Opens a migrated file-backed database with a multi-connection pool.
///
/// The `TempDir` must be kept in scope for the test duration.
pub async fn setup_file_db() -> (Database, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = DatabaseConfig {
        url: format!("sqlite://{}", dir.path().join("listings.db").display()),
        max_connections: 4,
    };
    let db = Database::open(&config)
        .await
        .expect("Failed to open file database");
    (db, dir)
}

pub fn listing(id: i64, title: &str, price: i64) -> ListingRecord {
    ListingRecord {
        id,
        title: title.into(),
        price,
        details: DetailFields {
            engine: "Dízel".into(),
            year_month: YearMonth {
                year: 2015,
                month: Some(3),
            },
            engine_size_cc: 1598,
            power_kw: 81,
            power_hp: 110,
            kilometers: 152_000,
        },
    }
}
