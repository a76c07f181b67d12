use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};
use std::str::FromStr;
use tracing::debug;

mod sqlite_url;

pub use sqlite_url::normalize_database_url;

use shared::{
    domain::{Product, ProductId},
    error::StoreError,
};

/// Persistence contract for inventory rows.
///
/// Every mutation commits on its own. None of them validate their inputs:
/// empty names and negative quantities are accepted as given, and an unknown
/// id is a silent no-op. The returned `bool` reports whether a row changed.
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn list_all(&self) -> Result<Vec<Product>>;
    async fn insert(&self, name: &str, quantity: i64) -> Result<Product>;
    async fn set_quantity(&self, id: ProductId, quantity: i64) -> Result<bool>;
    async fn increment(&self, id: ProductId) -> Result<bool>;
    /// Lowers the quantity by one unless it is already zero or below.
    async fn decrement(&self, id: ProductId) -> Result<bool>;
    async fn rename(&self, id: ProductId, name: &str) -> Result<bool>;
    async fn delete(&self, id: ProductId) -> Result<bool>;
}

/// SQLite-backed product store.
///
/// The pool holds a single long-lived connection so that every statement is
/// serialized through one handle, and so that `sqlite::memory:` databases
/// survive for the lifetime of the store.
#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        sqlite_url::create_parent_dir(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(connect_options)
            .await
            .with_context(|| format!("failed to open sqlite database '{database_url}'"))?;
        let storage = Self { pool };
        storage.ensure_products_table().await?;
        Ok(storage)
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    async fn ensure_products_table(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS products (
                id       INTEGER PRIMARY KEY AUTOINCREMENT,
                name     TEXT NOT NULL,
                quantity INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("failed to ensure products table exists")?;
        Ok(())
    }

    async fn execute_update(&self, statement: &'static str, id: ProductId) -> Result<bool> {
        let updated = sqlx::query(statement)
            .bind(id.0)
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to update product {id}"))?
            .rows_affected();
        Ok(updated > 0)
    }
}

#[async_trait]
impl ProductStore for Storage {
    async fn list_all(&self) -> Result<Vec<Product>> {
        let rows = sqlx::query("SELECT id, name, quantity FROM products")
            .fetch_all(&self.pool)
            .await
            .context("failed to list products")?;
        Ok(rows
            .into_iter()
            .map(|r| Product {
                id: ProductId(r.get::<i64, _>(0)),
                name: r.get::<String, _>(1),
                quantity: r.get::<i64, _>(2),
            })
            .collect())
    }

    async fn insert(&self, name: &str, quantity: i64) -> Result<Product> {
        let rec = sqlx::query(
            "INSERT INTO products (name, quantity) VALUES (?, ?) RETURNING id, name, quantity",
        )
        .bind(name)
        .bind(quantity)
        .fetch_one(&self.pool)
        .await
        .context("failed to insert product")?;
        let product = Product {
            id: ProductId(rec.get::<i64, _>(0)),
            name: rec.get::<String, _>(1),
            quantity: rec.get::<i64, _>(2),
        };
        debug!(product_id = product.id.0, quantity, "inserted product");
        Ok(product)
    }

    async fn set_quantity(&self, id: ProductId, quantity: i64) -> Result<bool> {
        let updated = sqlx::query("UPDATE products SET quantity = ? WHERE id = ?")
            .bind(quantity)
            .bind(id.0)
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to set quantity of product {id}"))?
            .rows_affected();
        debug!(product_id = id.0, quantity, updated, "set product quantity");
        Ok(updated > 0)
    }

    async fn increment(&self, id: ProductId) -> Result<bool> {
        let changed = self
            .execute_update("UPDATE products SET quantity = quantity + 1 WHERE id = ?", id)
            .await?;
        debug!(product_id = id.0, changed, "incremented product");
        Ok(changed)
    }

    async fn decrement(&self, id: ProductId) -> Result<bool> {
        // The floor check rides in the WHERE clause so it sees the committed value.
        let changed = self
            .execute_update(
                "UPDATE products SET quantity = quantity - 1 WHERE id = ? AND quantity > 0",
                id,
            )
            .await?;
        debug!(product_id = id.0, changed, "decremented product");
        Ok(changed)
    }

    async fn rename(&self, id: ProductId, name: &str) -> Result<bool> {
        let updated = sqlx::query("UPDATE products SET name = ? WHERE id = ?")
            .bind(name)
            .bind(id.0)
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to rename product {id}"))?
            .rows_affected();
        debug!(product_id = id.0, updated, "renamed product");
        Ok(updated > 0)
    }

    async fn delete(&self, id: ProductId) -> Result<bool> {
        let changed = self
            .execute_update("DELETE FROM products WHERE id = ?", id)
            .await?;
        debug!(product_id = id.0, changed, "deleted product");
        Ok(changed)
    }
}

/// Sorts an opaque store failure into the two kinds the request boundary reports.
pub fn classify_failure(error: &anyhow::Error) -> StoreError {
    let message = format!("{error:#}");
    let schema_missing = error
        .chain()
        .filter_map(|cause| cause.downcast_ref::<sqlx::Error>())
        .any(|cause| match cause {
            sqlx::Error::Database(db) => db.message().contains("no such table"),
            _ => false,
        });

    if schema_missing {
        StoreError::SchemaMissing(message)
    } else {
        StoreError::Unavailable(message)
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
