// src/common/migrations.rs
//! Database schema management and optional demo data

use sqlx::SqlitePool;
use tracing::{info, warn};

/// Create the catalog schema.
///
/// With `reset` set every table is dropped first; otherwise existing data is kept
/// and tables are only created when missing.
pub async fn run_migrations(pool: &SqlitePool, reset: bool) -> Result<(), sqlx::Error> {
    if reset {
        warn!("RESET_DB=true - Dropping all tables and recreating schema...");
        drop_all_tables(pool).await?;
    } else {
        info!("Skipping table drop (RESET_DB not set). Tables will be created if they don't exist.");
    }

    create_identity_tables(pool).await?;
    create_catalog_tables(pool).await?;

    info!("Database migration completed successfully");
    Ok(())
}

async fn drop_all_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // Reverse dependency order
    for table in ["items", "categories", "users"] {
        sqlx::query(&format!("DROP TABLE IF EXISTS {}", table))
            .execute(pool)
            .await?;
    }
    Ok(())
}

async fn create_identity_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            picture TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Email is the join key for external identities; find-or-create relies on it.
    sqlx::query("CREATE UNIQUE INDEX IF NOT EXISTS idx_users_email ON users(email)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_catalog_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            description TEXT NOT NULL,
            category_id INTEGER NOT NULL REFERENCES categories(id),
            user_id INTEGER NOT NULL REFERENCES users(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_items_category ON items(category_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_items_user ON items(user_id)")
        .execute(pool)
        .await?;

    Ok(())
}

const DEMO_OWNER: (&str, &str) = ("Matt-Bott", "heddy@ahed.com");

const DEMO_CATALOG: &[(&str, &[(&str, &str)])] = &[
    (
        "Computer Processors",
        &[
            (
                "Intel i7-7700K",
                "4 cores, 8 threads running at base-clock of 4.2GHz",
            ),
            (
                "Intel i5-7600K",
                "4 cores, 4 threads running at base-clock of 3.8GHz",
            ),
        ],
    ),
    (
        "Graphics Cards",
        &[
            (
                "Nvidia GTX 1080",
                "Nvidia GPU built on the Pascal architecture, has 2560 CUDA cores, and 8GB of GDDR5X Memory",
            ),
            (
                "AMD RX 580 8GB",
                "AMD GPU built on the Polaris architecture, has 2304 stream processors, and 8GB of GDDR5 Memory",
            ),
        ],
    ),
    (
        "Computer Monitors",
        &[
            (
                "ASUS VN248H-P",
                "24 inch 1080p IPS monitor with built in speakers, a VESA mounting point, and 2 HDMI inputs",
            ),
            (
                "HP OMEN 25",
                "24.5 inch 1080p TN monitor with a 144Hz refresh rate and HDMI & Displayport inputs",
            ),
        ],
    ),
];

/// Load the demo categories and items, but only into an empty catalog.
pub async fn seed_demo_catalog(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let (existing,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM categories")
        .fetch_one(pool)
        .await?;
    if existing > 0 {
        info!(categories = existing, "Catalog already populated, skipping demo seed");
        return Ok(());
    }

    let mut tx = pool.begin().await?;

    sqlx::query("INSERT INTO users (name, email, picture) VALUES (?, ?, NULL) ON CONFLICT(email) DO NOTHING")
        .bind(DEMO_OWNER.0)
        .bind(DEMO_OWNER.1)
        .execute(&mut *tx)
        .await?;
    let (owner_id,): (i64,) = sqlx::query_as("SELECT id FROM users WHERE email = ?")
        .bind(DEMO_OWNER.1)
        .fetch_one(&mut *tx)
        .await?;

    for (category, items) in DEMO_CATALOG {
        let category_id = sqlx::query("INSERT INTO categories (name) VALUES (?)")
            .bind(*category)
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();

        for (name, description) in items.iter() {
            sqlx::query(
                "INSERT INTO items (name, description, category_id, user_id) VALUES (?, ?, ?, ?)",
            )
            .bind(*name)
            .bind(*description)
            .bind(category_id)
            .bind(owner_id)
            .execute(&mut *tx)
            .await?;
        }
    }

    tx.commit().await?;
    info!(categories = DEMO_CATALOG.len(), "Seeded demo catalog");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn memory_pool() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let pool = memory_pool().await;
        run_migrations(&pool, false).await.unwrap();
        run_migrations(&pool, false).await.unwrap();

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name IN ('users', 'categories', 'items') ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();
        assert_eq!(tables.len(), 3);
    }

    #[tokio::test]
    async fn test_email_is_unique() {
        let pool = memory_pool().await;
        run_migrations(&pool, false).await.unwrap();

        sqlx::query("INSERT INTO users (name, email) VALUES ('A', 'a@example.com')")
            .execute(&pool)
            .await
            .unwrap();
        let duplicate = sqlx::query("INSERT INTO users (name, email) VALUES ('B', 'a@example.com')")
            .execute(&pool)
            .await;
        assert!(duplicate.is_err());
    }

    #[tokio::test]
    async fn test_seed_only_fills_empty_catalog() {
        let pool = memory_pool().await;
        run_migrations(&pool, false).await.unwrap();

        seed_demo_catalog(&pool).await.unwrap();
        seed_demo_catalog(&pool).await.unwrap();

        let (categories,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM categories")
            .fetch_one(&pool)
            .await
            .unwrap();
        let (items,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM items")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(categories, 3);
        assert_eq!(items, 6);
    }
}
