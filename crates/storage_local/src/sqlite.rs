use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use async_trait::async_trait;
use core_types::{NOTES_KEY, Note, PersistenceGateway, decode_notes, encode_notes};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use tracing::warn;

use crate::StorageError;

pub const CURRENT_DB_SCHEMA_VERSION: u32 = 1;

/// Key-value table in a SQLite database; the note collection is one row.
#[derive(Debug, Clone)]
pub struct SqliteGateway {
    pool: SqlitePool,
}

impl SqliteGateway {
    pub async fn connect(path: impl AsRef<Path>) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&format!(
            "sqlite://{}",
            path.as_ref().to_string_lossy()
        ))?
        .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .with_context(|| format!("failed to open sqlite db {}", path.as_ref().display()))?;
        let gateway = Self { pool };
        gateway.migrate().await?;
        Ok(gateway)
    }

    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        let gateway = Self { pool };
        gateway.migrate().await?;
        Ok(gateway)
    }

    async fn migrate(&self) -> Result<()> {
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

        if let Some(found) = self.stored_schema_version().await? {
            if found > CURRENT_DB_SCHEMA_VERSION {
                return Err(StorageError::SchemaTooNew {
                    found,
                    supported: CURRENT_DB_SCHEMA_VERSION,
                }
                .into());
            }
        }

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
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

        Ok(())
    }

    async fn stored_schema_version(&self) -> Result<Option<u32>> {
        let row = sqlx::query("SELECT value FROM metadata WHERE key = 'schema_version'")
            .fetch_optional(&self.pool)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        let version = row
            .get::<String, _>("value")
            .parse::<u32>()
            .context("invalid schema_version in metadata")?;
        Ok(Some(version))
    }

    pub async fn schema_version(&self) -> Result<u32> {
        self.stored_schema_version()
            .await?
            .context("schema_version missing from metadata")
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM kv WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|row| row.get::<String, _>("value")))
    }

    pub async fn put(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO kv(key, value) VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl PersistenceGateway for SqliteGateway {
    async fn load(&self) -> Result<Option<Vec<Note>>> {
        let Some(raw) = self.get(NOTES_KEY).await? else {
            return Ok(None);
        };
        let notes = decode_notes(&raw);
        if notes.is_none() {
            warn!(key = NOTES_KEY, "stored note blob is not a valid collection");
        }
        Ok(notes)
    }

    async fn save(&self, notes: &[Note]) -> Result<()> {
        let raw = encode_notes(notes).context("failed to serialize notes")?;
        self.put(NOTES_KEY, &raw).await
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[tokio::test]
    async fn stores_collection_under_fixed_key() {
        let gateway = SqliteGateway::in_memory().await.expect("gateway");
        let schema_version = gateway.schema_version().await.expect("schema version");
        assert_eq!(schema_version, CURRENT_DB_SCHEMA_VERSION);
        assert!(gateway.load().await.expect("load").is_none());

        let notes = vec![Note::new(2, "second", "b"), Note::new(1, "first", "a")];
        gateway.save(&notes).await.expect("save");
        assert!(gateway.get(NOTES_KEY).await.expect("get").is_some());
        assert_eq!(gateway.load().await.expect("load"), Some(notes));

        gateway.save(&[]).await.expect("overwrite");
        assert_eq!(gateway.load().await.expect("load"), Some(Vec::new()));
    }

    #[tokio::test]
    async fn malformed_blob_loads_as_absent() {
        let gateway = SqliteGateway::in_memory().await.expect("gateway");
        gateway.put(NOTES_KEY, "42").await.expect("put");
        assert!(gateway.load().await.expect("load").is_none());
    }

    #[tokio::test]
    async fn reopening_file_keeps_collection() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("notes.db");
        let notes = vec![Note::new(5, "persisted", "")];
        {
            let gateway = SqliteGateway::connect(&path).await.expect("connect");
            gateway.save(&notes).await.expect("save");
        }
        let gateway = SqliteGateway::connect(&path).await.expect("reconnect");
        assert_eq!(gateway.load().await.expect("load"), Some(notes));
    }

    #[tokio::test]
    async fn refuses_newer_schema() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("notes.db");
        {
            let gateway = SqliteGateway::connect(&path).await.expect("connect");
            sqlx::query("UPDATE metadata SET value = '99' WHERE key = 'schema_version'")
                .execute(&gateway.pool)
                .await
                .expect("bump version");
        }
        let err = SqliteGateway::connect(&path).await.expect_err("must fail");
        assert!(
            err.to_string().contains("newer than supported"),
            "unexpected error: {err}"
        );
    }
}
