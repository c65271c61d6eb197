use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::password::hash_password;
use crate::error::{DbError, DbResult};
use crate::model::role::Role;
use crate::repository::categories::CategoriesRepository;
use crate::repository::positions::PositionsRepository;
use crate::repository::products::ProductsRepository;
use crate::repository::salaries::SalariesRepository;
use crate::repository::sales::SalesRepository;
use crate::repository::users::UsersRepository;

/// Default administrator account, inserted on first creation.
const SEED_ADMIN_USERNAME: &str = "sa";
const SEED_ADMIN_PASSWORD: &str = "123qwe";
const SEED_POSITION_NAME: &str = "Administrator";
const SEED_POSITION_RATE: f64 = 250.0;

/// Schema is declared directly at startup; there is no migration framework.
/// Statements are idempotent, so `ensure_created` is safe to run on every
/// start.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS roles (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL UNIQUE
    )",
    "CREATE TABLE IF NOT EXISTS positions (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        hourly_rate REAL NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        username TEXT NOT NULL UNIQUE,
        password TEXT NOT NULL,
        full_name TEXT NOT NULL,
        role_id INTEGER NOT NULL REFERENCES roles (id),
        position_id TEXT REFERENCES positions (id) ON DELETE SET NULL
    )",
    "CREATE TABLE IF NOT EXISTS salaries (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL REFERENCES users (id) ON DELETE CASCADE,
        year INTEGER NOT NULL,
        month INTEGER NOT NULL,
        hours_worked REAL NOT NULL DEFAULT 0,
        bonus REAL NOT NULL DEFAULT 0,
        deductions REAL NOT NULL DEFAULT 0,
        amount REAL NOT NULL DEFAULT 0,
        UNIQUE (user_id, year, month)
    )",
    "CREATE TABLE IF NOT EXISTS categories (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL UNIQUE
    )",
    "CREATE TABLE IF NOT EXISTS products (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        price REAL NOT NULL,
        category_id TEXT NOT NULL REFERENCES categories (id)
    )",
    "CREATE TABLE IF NOT EXISTS sales (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL REFERENCES users (id),
        date_added TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS sale_products (
        sale_id TEXT NOT NULL REFERENCES sales (id) ON DELETE CASCADE,
        product_id TEXT NOT NULL REFERENCES products (id) ON DELETE CASCADE,
        quantity INTEGER NOT NULL,
        unit_price REAL NOT NULL,
        PRIMARY KEY (sale_id, product_id)
    )",
];

/// Session/context handle: owns the pool and hands out repositories.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens (creating if absent) the database file, declares the schema and
    /// applies the initial seed.
    pub async fn connect(database_path: &str) -> DbResult<Self> {
        info!(path = %database_path, "Initializing database");

        let options = SqliteConnectOptions::new()
            .filename(database_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        let db = Database { pool };
        db.ensure_created().await?;

        Ok(db)
    }

    /// Isolated in-memory database for tests. A single connection keeps the
    /// database alive for the pool's lifetime.
    pub async fn in_memory() -> DbResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        let db = Database { pool };
        db.ensure_created().await?;

        Ok(db)
    }

    /// Creates the schema if it does not exist yet, then seeds initial data.
    /// The seed is guarded by the presence of users, so re-running on every
    /// start inserts nothing new.
    pub async fn ensure_created(&self) -> DbResult<()> {
        for stmt in SCHEMA {
            sqlx::query(stmt).execute(&self.pool).await?;
        }
        debug!("Schema ensured");

        self.seed().await
    }

    async fn seed(&self) -> DbResult<()> {
        let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        if users > 0 {
            return Ok(());
        }

        info!("Seeding initial roles, position and administrator account");

        for role in [Role::Administrator, Role::User] {
            sqlx::query("INSERT INTO roles (id, name) VALUES (?, ?)")
                .bind(role.id())
                .bind(role.name())
                .execute(&self.pool)
                .await?;
        }

        let position_id = Uuid::new_v4().to_string();
        sqlx::query("INSERT INTO positions (id, name, hourly_rate) VALUES (?, ?, ?)")
            .bind(&position_id)
            .bind(SEED_POSITION_NAME)
            .bind(SEED_POSITION_RATE)
            .execute(&self.pool)
            .await?;

        // The role_id column is the role assignment for the account.
        sqlx::query(
            "INSERT INTO users (id, username, password, full_name, role_id, position_id)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(SEED_ADMIN_USERNAME)
        .bind(hash_password(SEED_ADMIN_PASSWORD))
        .bind("Administrator")
        .bind(Role::Administrator.id())
        .bind(&position_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// For queries not covered by the repositories (tests, diagnostics).
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn users(&self) -> UsersRepository {
        UsersRepository::new(self.pool.clone())
    }

    pub fn positions(&self) -> PositionsRepository {
        PositionsRepository::new(self.pool.clone())
    }

    pub fn salaries(&self) -> SalariesRepository {
        SalariesRepository::new(self.pool.clone())
    }

    pub fn categories(&self) -> CategoriesRepository {
        CategoriesRepository::new(self.pool.clone())
    }

    pub fn products(&self) -> ProductsRepository {
        ProductsRepository::new(self.pool.clone())
    }

    pub fn sales(&self) -> SalesRepository {
        SalesRepository::new(self.pool.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::verify_password;

    #[actix_web::test]
    async fn creates_schema_and_seed() {
        let db = Database::in_memory().await.unwrap();

        let admin = db
            .users()
            .get_by_username(SEED_ADMIN_USERNAME)
            .await
            .unwrap()
            .expect("seeded administrator");
        assert_eq!(admin.role_id, Role::Administrator.id());
        assert!(verify_password(SEED_ADMIN_PASSWORD, &admin.password).is_ok());

        let position = db
            .positions()
            .get_by_name(SEED_POSITION_NAME)
            .await
            .unwrap()
            .expect("seeded position");
        assert_eq!(position.hourly_rate, SEED_POSITION_RATE);
        assert_eq!(admin.position_id.as_deref(), Some(position.id.as_str()));
    }

    #[actix_web::test]
    async fn seed_is_applied_exactly_once() {
        let db = Database::in_memory().await.unwrap();

        // Second start against the same database.
        db.ensure_created().await.unwrap();

        let admins: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role_id = ?")
                .bind(Role::Administrator.id())
                .fetch_one(db.pool())
                .await
                .unwrap();
        assert_eq!(admins, 1);

        let positions = db.positions().get_all().await.unwrap();
        assert_eq!(positions.len(), 1);
    }
}
