use std::{future::Future, str::FromStr};

use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Sqlite,
};
use tokio::runtime::{Handle, RuntimeFlavor};

use crate::core::{
    codec::SpecimenId,
    store::{BatchRef, IdRecord, IdStore, StoreError, StoreResult},
};

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS specimen_ids (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        specimen_id TEXT NOT NULL UNIQUE,
        batch_ref TEXT,
        created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    )
"#;

/// A store backed by a SQLite table with a UNIQUE constraint on the identifier.
///
/// The constraint is what makes concurrent generators safe: when two of them pick the
/// same candidate, exactly one `INSERT` succeeds and the other is reported as
/// [`StoreError::UniquenessViolation`].
///
/// # Runtime
///
/// [`IdStore`] is synchronous. Its methods run the async queries with
/// `tokio::task::block_in_place`, so they must be called from a multi-threaded Tokio
/// runtime. Elsewhere they fail with [`StoreError::Other`] instead of blocking.
///
/// # Examples
///
/// ```no_run
/// use specimen_id::core::generator::BatchGeneratorBuilder;
/// use specimen_id::store::sqlite::SqliteStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = SqliteStore::connect("sqlite://specimens.db").await?;
/// let generator = BatchGeneratorBuilder::new().store(&store).build()?;
///
/// let ids = generator.generate_batch(100)?;
/// # Ok(())
/// # }
/// ```
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    /// Opens (creating if missing) the database at `url` and makes sure the table exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Other`] if the URL is invalid or the database cannot be
    /// opened or migrated.
    pub async fn connect(url: &str) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| StoreError::Other(format!("Invalid SQLite URL {}: {}", url, e)))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Other(format!("SQLite connection failed: {}", e)))?;

        let store = Self::new(pool);
        store.init_schema().await?;

        log::debug!("SQLite store ready at {}", url);

        Ok(store)
    }

    /// Wraps an existing pool. Call [`init_schema`](Self::init_schema) unless the table
    /// is managed elsewhere.
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn init_schema(&self) -> StoreResult<()> {
        sqlx::query(CREATE_TABLE)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Other(format!("SQLite schema creation failed: {}", e)))?;
        Ok(())
    }

    pub async fn exists_async(&self, id: &SpecimenId) -> StoreResult<bool> {
        let found: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM specimen_ids WHERE specimen_id = ?")
                .bind(id.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| to_store_error(e, id))?;

        Ok(found.is_some())
    }

    pub async fn save_async(&self, record: &IdRecord) -> StoreResult<()> {
        sqlx::query("INSERT INTO specimen_ids (specimen_id, batch_ref) VALUES (?, ?)")
            .bind(record.id.as_str())
            .bind(record.batch_ref.as_ref().map(BatchRef::as_str))
            .execute(&self.pool)
            .await
            .map_err(|e| to_store_error(e, &record.id))?;

        Ok(())
    }

    /// Reads back the record of an issued identifier.
    pub async fn find(&self, id: &SpecimenId) -> StoreResult<Option<IdRecord>> {
        let row: Option<(Option<String>,)> =
            sqlx::query_as("SELECT batch_ref FROM specimen_ids WHERE specimen_id = ?")
                .bind(id.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| to_store_error(e, id))?;

        Ok(row.map(|(batch_ref,)| IdRecord {
            id: id.clone(),
            batch_ref: batch_ref.map(BatchRef::new),
        }))
    }

    /// Number of identifiers ever issued into this database.
    pub async fn count(&self) -> StoreResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM specimen_ids")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::Other(format!("SQLite count failed: {}", e)))
    }
}

impl IdStore for SqliteStore {
    fn exists(&self, id: &SpecimenId) -> StoreResult<bool> {
        block_on(self.exists_async(id))?
    }

    fn save(&self, record: &IdRecord) -> StoreResult<()> {
        block_on(self.save_async(record))?
    }
}

fn block_on<F: Future>(future: F) -> StoreResult<F::Output> {
    let handle = Handle::try_current()
        .map_err(|e| StoreError::Other(format!("SQLite store needs a Tokio runtime: {}", e)))?;

    if handle.runtime_flavor() == RuntimeFlavor::CurrentThread {
        return Err(StoreError::Other(
            "SQLite store needs a multi-threaded Tokio runtime".to_owned(),
        ));
    }

    Ok(tokio::task::block_in_place(|| handle.block_on(future)))
}

fn to_store_error(error: sqlx::Error, id: &SpecimenId) -> StoreError {
    match &error {
        sqlx::Error::Database(db_error) if db_error.is_unique_violation() => {
            StoreError::UniquenessViolation(id.to_string())
        }
        _ => StoreError::Other(format!("SQLite operation failed: {}", error)),
    }
}
