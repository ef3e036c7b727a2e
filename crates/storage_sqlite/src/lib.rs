use std::future::Future;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use core_types::KeyValueStore;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use tokio::runtime::{Builder, Runtime};
use tracing::info;

pub const CURRENT_DB_SCHEMA_VERSION: u32 = 1;

#[derive(Debug)]
pub struct SqliteKvStore {
    runtime: Runtime,
    pool: SqlitePool,
}

impl SqliteKvStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create parent dir for {}", path.display()))?;
        }

        let runtime = build_runtime()?;
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = runtime
            .block_on(
                SqlitePoolOptions::new()
                    .max_connections(1)
                    .connect_with(options),
            )
            .with_context(|| format!("failed to open sqlite db {}", path.display()))?;

        let store = Self { runtime, pool };
        store.migrate()?;
        info!(path = %path.display(), "sqlite key-value store ready");
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        let runtime = build_runtime()?;
        // One connection that never idles out, otherwise the database vanishes.
        let pool = runtime.block_on(
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect("sqlite::memory:"),
        )?;
        let store = Self { runtime, pool };
        store.migrate()?;
        Ok(store)
    }

    fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    fn migrate(&self) -> Result<()> {
        self.block_on(async {
            sqlx::query(
                r#"
                CREATE TABLE IF NOT EXISTS metadata (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );
                "#,
            )
            .execute(&self.pool)
            .await?;

            sqlx::query(
                r#"
                CREATE TABLE IF NOT EXISTS kv (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );
                "#,
            )
            .execute(&self.pool)
            .await?;

            sqlx::query(
                r#"
                INSERT INTO metadata(key, value)
                VALUES ('schema_version', ?1)
                ON CONFLICT(key) DO UPDATE SET value = excluded.value
                "#,
            )
            .bind(CURRENT_DB_SCHEMA_VERSION.to_string())
            .execute(&self.pool)
            .await?;

            Ok::<_, sqlx::Error>(())
        })
        .context("failed to migrate sqlite schema")
    }

    pub fn schema_version(&self) -> Result<u32> {
        let row = self.block_on(
            sqlx::query("SELECT value FROM metadata WHERE key = 'schema_version'")
                .fetch_one(&self.pool),
        )?;
        let version = row.get::<String, _>("value").parse::<u32>()?;
        Ok(version)
    }
}

impl KeyValueStore for SqliteKvStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let row = self
            .block_on(
                sqlx::query("SELECT value FROM kv WHERE key = ?1")
                    .bind(key)
                    .fetch_optional(&self.pool),
            )
            .with_context(|| format!("failed to read key `{key}`"))?;
        Ok(row.map(|row| row.get::<String, _>("value")))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.block_on(
            sqlx::query(
                r#"
                INSERT INTO kv(key, value, updated_at) VALUES (?1, ?2, ?3)
                ON CONFLICT(key) DO UPDATE SET
                  value = excluded.value,
                  updated_at = excluded.updated_at
                "#,
            )
            .bind(key)
            .bind(value)
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool),
        )
        .with_context(|| format!("failed to write key `{key}`"))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.block_on(
            sqlx::query("DELETE FROM kv WHERE key = ?1")
                .bind(key)
                .execute(&self.pool),
        )
        .with_context(|| format!("failed to remove key `{key}`"))?;
        Ok(())
    }
}

impl Drop for SqliteKvStore {
    fn drop(&mut self) {
        self.runtime.block_on(self.pool.close());
    }
}

fn build_runtime() -> Result<Runtime> {
    Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build sqlite runtime")
}
