use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::debug;

use shared::{domain::FormId, protocol::FormDocument};

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

#[derive(Debug, Clone)]
pub struct StoredForm {
    pub document: FormDocument,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct StoredFormSummary {
    pub id: FormId,
    pub title: String,
    pub updated_at: DateTime<Utc>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        // every connection to an in-memory url opens its own empty database
        let max_connections = if is_memory_url(database_url) { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    /// Inserts or replaces a form. A document without an id gets a fresh one;
    /// the stored document, id included, is returned. Last write wins.
    pub async fn save_form(&self, document: &FormDocument) -> Result<FormDocument> {
        let mut stored = document.clone();
        let form_id = stored.id.get_or_insert_with(FormId::random).clone();
        let body = serde_json::to_string(&stored).context("failed to encode form document")?;
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO forms (id, title, document, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET title=excluded.title, document=excluded.document, updated_at=excluded.updated_at",
        )
        .bind(form_id.as_str())
        .bind(&stored.title)
        .bind(body)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to store form {form_id}"))?;

        debug!(%form_id, questions = stored.question_fields.len(), "form stored");
        Ok(stored)
    }

    pub async fn get_form(&self, form_id: &FormId) -> Result<Option<StoredForm>> {
        let row = sqlx::query("SELECT document, created_at, updated_at FROM forms WHERE id = ?")
            .bind(form_id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| {
            let raw: String = r.get(0);
            let document = serde_json::from_str::<FormDocument>(&raw)
                .with_context(|| format!("stored form {form_id} is not a valid document"))?;
            Ok(StoredForm {
                document,
                created_at: r.get::<DateTime<Utc>, _>(1),
                updated_at: r.get::<DateTime<Utc>, _>(2),
            })
        })
        .transpose()
    }

    /// Most recently updated first.
    pub async fn list_forms(&self) -> Result<Vec<StoredFormSummary>> {
        let rows = sqlx::query(
            "SELECT id, title, updated_at FROM forms ORDER BY updated_at DESC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| StoredFormSummary {
                id: FormId(r.get::<String, _>(0)),
                title: r.get::<String, _>(1),
                updated_at: r.get::<DateTime<Utc>, _>(2),
            })
            .collect())
    }

    pub async fn delete_form(&self, form_id: &FormId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM forms WHERE id = ?")
            .bind(form_id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn is_memory_url(database_url: &str) -> bool {
    database_url.starts_with("sqlite::memory:") || database_url.contains("mode=memory")
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if is_memory_url(database_url) || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
