use sitewatch_core::error::AppError;
use sitewatch_core::models::YearMonth;
use sitewatch_core::traits::ListingStore;

use crate::integration::common::{listing, setup_file_db, setup_test_db};

#[tokio::test]
async fn upsert_and_get_listing() {
    let db = setup_test_db().await;
    let repo = db.listing_repo();

    let record = listing(15838406, "Skoda Octavia", 3_290_000);
    repo.upsert(&record).await.unwrap();

    let stored = repo
        .get(15838406)
        .await
        .unwrap()
        .expect("Should find the listing");
    assert_eq!(stored, record);
    assert_eq!(repo.count().await.unwrap(), 1);
}

#[tokio::test]
async fn get_missing_listing_is_none() {
    let db = setup_test_db().await;
    assert!(db.listing_repo().get(1).await.unwrap().is_none());
}

#[tokio::test]
async fn upsert_same_record_twice_is_idempotent() {
    let db = setup_test_db().await;
    let repo = db.listing_repo();

    let record = listing(7, "Opel Astra", 990_000);
    repo.upsert(&record).await.unwrap();
    repo.upsert(&record).await.unwrap();

    assert_eq!(repo.count().await.unwrap(), 1);
    assert_eq!(repo.get(7).await.unwrap(), Some(record));
}

#[tokio::test]
async fn upsert_overwrites_every_field() {
    let db = setup_test_db().await;
    let repo = db.listing_repo();

    repo.upsert(&listing(7, "Opel Astra", 990_000)).await.unwrap();

    let mut updated = listing(7, "Opel Astra 1.4", 890_000);
    updated.details.engine = "Benzin".into();
    updated.details.kilometers = 201_000;
    repo.upsert(&updated).await.unwrap();

    assert_eq!(repo.count().await.unwrap(), 1);
    assert_eq!(repo.get(7).await.unwrap(), Some(updated));
}

#[tokio::test]
async fn missing_month_persists_as_zero() {
    let db = setup_test_db().await;
    let repo = db.listing_repo();

    let mut record = listing(9, "Fiat Punto", 450_000);
    record.details.year_month = YearMonth {
        year: 1999,
        month: None,
    };
    repo.upsert(&record).await.unwrap();

    let result = repo.query("SELECT year, month FROM listings").await.unwrap();
    assert_eq!(result.rows, vec![vec!["1999".to_string(), "0".to_string()]]);
    assert_eq!(repo.get(9).await.unwrap(), Some(record));
}

#[tokio::test]
async fn query_returns_header_and_rows_as_text() {
    let db = setup_test_db().await;
    let repo = db.listing_repo();
    repo.upsert(&listing(2, "B", 200)).await.unwrap();
    repo.upsert(&listing(1, "A", 100)).await.unwrap();

    let result = ListingStore::query(
        &repo,
        "SELECT id, name, price, price / 3.0 AS third, NULL AS nothing FROM listings ORDER BY id",
    )
    .await
    .unwrap();

    assert_eq!(result.columns, ["id", "name", "price", "third", "nothing"]);
    assert_eq!(result.rows.len(), 2);
    assert_eq!(result.rows[0][..3], ["1", "A", "100"]);
    assert!(result.rows[0][3].starts_with("33.3"));
    assert_eq!(result.rows[0][4], "");
}

#[tokio::test]
async fn empty_query_result_keeps_column_names() {
    let db = setup_test_db().await;

    let result = db
        .listing_repo()
        .query("SELECT id, powerKW FROM listings WHERE price > 0")
        .await
        .unwrap();

    assert!(result.is_empty());
    assert_eq!(result.columns, ["id", "powerKW"]);
}

#[tokio::test]
async fn bad_query_is_store_error() {
    let db = setup_test_db().await;

    let err = db
        .listing_repo()
        .query("SELEKT * FROM nowhere")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Store(_)));
}

#[tokio::test]
async fn in_memory_data_survives_across_calls() {
    let db = setup_test_db().await;
    let repo = db.listing_repo();
    repo.upsert(&listing(1, "A", 1)).await.unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    assert_eq!(db.listing_repo().count().await.unwrap(), 1);
    db.listing_repo().health_check().await.unwrap();
}

#[tokio::test]
async fn concurrent_upserts_against_file_database() {
    let (db, _dir) = setup_file_db().await;
    let repo = db.listing_repo();

    let mut handles = Vec::new();
    for worker in 0..4i64 {
        let repo = repo.clone();
        handles.push(tokio::spawn(async move {
            for id in 0..25i64 {
                // Every worker writes the same ids to exercise the conflict path.
                repo.upsert(&listing(id, &format!("worker {worker}"), id * 10))
                    .await
                    .unwrap();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(repo.count().await.unwrap(), 25);
    let stored = repo.get(24).await.unwrap().unwrap();
    assert_eq!(stored.price, 240);
    assert!(stored.title.starts_with("worker "));
}

#[tokio::test]
async fn file_database_persists_after_reopen() {
    let (db, dir) = setup_file_db().await;
    db.listing_repo()
        .upsert(&listing(5, "Kept", 5))
        .await
        .unwrap();
    db.pool().close().await;

    let config = sitewatch_db::DatabaseConfig {
        url: format!("sqlite://{}", dir.path().join("listings.db").display()),
        max_connections: 1,
    };
    let reopened = sitewatch_db::Database::open(&config).await.unwrap();
    assert_eq!(reopened.listing_repo().count().await.unwrap(), 1);
}
