use sitewatch_core::error::AppError;
use sitewatch_core::models::{DetailFields, ListingRecord, QueryResult, YearMonth};
use sitewatch_core::traits::ListingStore;
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Executor, Row, SqlitePool, Statement};

/// Repository for listing persistence in SQLite.
#[derive(Clone)]
pub struct ListingRepository {
    pool: SqlitePool,
}

impl ListingRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a listing, or overwrite every column but the id when it
    /// already exists.
    pub async fn upsert(&self, record: &ListingRecord) -> Result<(), AppError> {
        let details = &record.details;
        sqlx::query(
            r#"
            INSERT INTO listings
                (id, name, price, engine, year, month, enginesize, powerKW, powerHP, kilometers)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                price = excluded.price,
                engine = excluded.engine,
                year = excluded.year,
                month = excluded.month,
                enginesize = excluded.enginesize,
                powerKW = excluded.powerKW,
                powerHP = excluded.powerHP,
                kilometers = excluded.kilometers
            "#,
        )
        .bind(record.id)
        .bind(&record.title)
        .bind(record.price)
        .bind(&details.engine)
        .bind(details.year_month.year)
        .bind(i64::from(details.year_month.month.unwrap_or(0)))
        .bind(details.engine_size_cc)
        .bind(details.power_kw)
        .bind(details.power_hp)
        .bind(details.kilometers)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Store(e.to_string()))?;

        Ok(())
    }

    /// Fetch one listing by id.
    pub async fn get(&self, id: i64) -> Result<Option<ListingRecord>, AppError> {
        let row = sqlx::query_as::<_, ListingRow>(
            r#"
            SELECT id, name, price, engine, year, month, enginesize, powerKW, powerHP, kilometers
            FROM listings
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Store(e.to_string()))?;

        Ok(row.map(Into::into))
    }

    /// Number of stored listings.
    pub async fn count(&self) -> Result<i64, AppError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM listings")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Store(e.to_string()))?;

        Ok(count)
    }

    /// Run raw SQL and render every cell as text. NULL renders empty.
    pub async fn query(&self, text: &str) -> Result<QueryResult, AppError> {
        let rows = sqlx::query(text)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Store(e.to_string()))?;

        let columns = match rows.first() {
            Some(row) => row.columns().iter().map(|c| c.name().to_string()).collect(),
            None => {
                let statement = (&self.pool)
                    .prepare(text)
                    .await
                    .map_err(|e| AppError::Store(e.to_string()))?;
                statement
                    .columns()
                    .iter()
                    .map(|c| c.name().to_string())
                    .collect()
            }
        };

        let rows = rows
            .iter()
            .map(render_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::Store(e.to_string()))?;

        Ok(QueryResult { columns, rows })
    }

    /// Check database connectivity.
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Store(e.to_string()))?;
        Ok(())
    }
}

fn render_row(row: &SqliteRow) -> Result<Vec<String>, sqlx::Error> {
    (0..row.len()).map(|idx| render_cell(row, idx)).collect()
}

// SQLite is dynamically typed, so each cell is read by its storage class.
fn render_cell(row: &SqliteRow, idx: usize) -> Result<String, sqlx::Error> {
    if let Ok(value) = row.try_get::<Option<i64>, _>(idx) {
        return Ok(value.map(|v| v.to_string()).unwrap_or_default());
    }
    if let Ok(value) = row.try_get::<Option<f64>, _>(idx) {
        return Ok(value.map(|v| v.to_string()).unwrap_or_default());
    }
    if let Ok(value) = row.try_get::<Option<String>, _>(idx) {
        return Ok(value.unwrap_or_default());
    }
    let bytes: Option<Vec<u8>> = row.try_get(idx)?;
    Ok(bytes
        .map(|b| String::from_utf8_lossy(&b).into_owned())
        .unwrap_or_default())
}

// -- Internal row type for sqlx deserialization --

#[derive(sqlx::FromRow)]
struct ListingRow {
    id: i64,
    name: String,
    price: i64,
    engine: String,
    year: i32,
    month: i64,
    enginesize: i64,
    #[sqlx(rename = "powerKW")]
    power_kw: i64,
    #[sqlx(rename = "powerHP")]
    power_hp: i64,
    kilometers: i64,
}

impl From<ListingRow> for ListingRecord {
    fn from(row: ListingRow) -> Self {
        ListingRecord {
            id: row.id,
            title: row.name,
            price: row.price,
            details: DetailFields {
                engine: row.engine,
                year_month: YearMonth {
                    year: row.year,
                    month: u32::try_from(row.month).ok().filter(|m| *m != 0),
                },
                engine_size_cc: row.enginesize,
                power_kw: row.power_kw,
                power_hp: row.power_hp,
                kilometers: row.kilometers,
            },
        }
    }
}

// -- Trait implementation --

impl ListingStore for ListingRepository {
    async fn upsert(&self, record: &ListingRecord) -> Result<(), AppError> {
        ListingRepository::upsert(self, record).await
    }

    async fn query(&self, text: &str) -> Result<QueryResult, AppError> {
        ListingRepository::query(self, text).await
    }
}
