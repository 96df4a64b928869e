//! PostgreSQL store implementations
//!
//! Both tables are created on first use. A failed bootstrap is retried by the
//! next query, so a database that comes up after the process recovers without
//! a restart.
//!
//! Inserts into one table are serialized by an advisory lock and stamped by
//! the database, so creation times are strictly increasing per table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::error::{DeskError, Result};
use crate::store::traits::{MessageStore, OrderStore};
use crate::types::{ContactMessage, NewContactMessage, Order, OrderDetails};

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

// Advisory lock keys, one per table
const ORDERS_LOCK: i64 = 0x6f72_6465_7273;
const MESSAGES_LOCK: i64 = 0x6d73_6773;

const CREATE_ORDERS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS orders (
        seq BIGSERIAL UNIQUE,
        id UUID PRIMARY KEY,
        student_name TEXT,
        institute_name TEXT,
        mobile TEXT,
        email TEXT,
        city TEXT,
        education_level TEXT,
        project_serial TEXT,
        ordered_from_idea TEXT,
        project_title TEXT,
        project_domain TEXT,
        project_concept TEXT,
        project_description TEXT,
        deadline TEXT,
        budget TEXT,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )
"#;

const CREATE_ORDERS_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS orders_created_at_idx ON orders (created_at)";

const CREATE_MESSAGES_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS contact_messages (
        seq BIGSERIAL UNIQUE,
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        mobile TEXT NOT NULL,
        message TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )
"#;

const CREATE_MESSAGES_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS contact_messages_created_at_idx ON contact_messages (created_at)";

/// Lazily connecting pool plus the schema bootstrap state
#[derive(Debug)]
pub struct PgDatabase {
    pool: PgPool,
    schema: OnceCell<()>,
}

impl PgDatabase {
    /// Create a lazily connecting pool
    ///
    /// No connection is opened here, so an unreachable database does not stop
    /// startup; queries fail until it becomes reachable.
    pub fn connect_lazy(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect_lazy(database_url)
            .map_err(|e| DeskError::Storage(format!("Invalid database URL: {}", e)))?;

        Ok(Self {
            pool,
            schema: OnceCell::new(),
        })
    }

    /// Whether the tables are known to exist
    pub fn is_ready(&self) -> bool {
        self.schema.initialized()
    }

    /// Create both tables if they do not exist yet
    ///
    /// Runs at most once successfully; a failure leaves the next call to try
    /// again.
    pub async fn ensure_schema(&self) -> Result<()> {
        self.schema
            .get_or_try_init(|| async {
                for statement in [
                    CREATE_ORDERS_TABLE,
                    CREATE_ORDERS_INDEX,
                    CREATE_MESSAGES_TABLE,
                    CREATE_MESSAGES_INDEX,
                ] {
                    sqlx::query(statement).execute(&self.pool).await?;
                }
                tracing::info!("Database schema ready");
                Ok::<(), DeskError>(())
            })
            .await?;
        Ok(())
    }

    async fn ready_pool(&self) -> Result<&PgPool> {
        self.ensure_schema().await?;
        Ok(&self.pool)
    }
}

const INSERT_ORDER: &str = r#"
    WITH stamp AS (
        SELECT GREATEST(
            clock_timestamp(),
            COALESCE(MAX(created_at), '-infinity'::timestamptz) + interval '1 microsecond'
        ) AS at
        FROM orders
    )
    INSERT INTO orders (
        id, student_name, institute_name, mobile, email, city,
        education_level, project_serial, ordered_from_idea, project_title,
        project_domain, project_concept, project_description, deadline,
        budget, created_at, updated_at
    )
    SELECT $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, stamp.at, stamp.at
    FROM stamp
    RETURNING created_at
"#;

const INSERT_MESSAGE: &str = r#"
    WITH stamp AS (
        SELECT GREATEST(
            clock_timestamp(),
            COALESCE(MAX(created_at), '-infinity'::timestamptz) + interval '1 microsecond'
        ) AS at
        FROM contact_messages
    )
    INSERT INTO contact_messages (id, name, mobile, message, created_at, updated_at)
    SELECT $1, $2, $3, $4, stamp.at, stamp.at
    FROM stamp
    RETURNING created_at
"#;

/// PostgreSQL order store
pub struct PostgresOrderStore {
    db: Arc<PgDatabase>,
}

impl PostgresOrderStore {
    /// Create a new PostgreSQL order store
    pub fn new(db: Arc<PgDatabase>) -> Self {
        Self { db }
    }

    fn row_to_order(row: &PgRow) -> Result<Order> {
        let text = |column: &str| -> Result<Option<String>> { Ok(row.try_get(column)?) };

        let details = OrderDetails {
            student_name: text("student_name")?,
            institute_name: text("institute_name")?,
            mobile: text("mobile")?,
            email: text("email")?,
            city: text("city")?,
            education_level: text("education_level")?,
            project_serial: text("project_serial")?,
            ordered_from_idea: text("ordered_from_idea")?,
            project_title: text("project_title")?,
            project_domain: text("project_domain")?,
            project_concept: text("project_concept")?,
            project_description: text("project_description")?,
            deadline: text("deadline")?,
            budget: text("budget")?,
        };

        Ok(Order {
            id: row.try_get("id")?,
            details,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    async fn create(&self, details: OrderDetails) -> Result<Order> {
        let id = Uuid::new_v4();
        let mut tx = self.db.ready_pool().await?.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(ORDERS_LOCK)
            .execute(&mut *tx)
            .await?;

        let row = sqlx::query(INSERT_ORDER)
            .bind(id)
            .bind(&details.student_name)
            .bind(&details.institute_name)
            .bind(&details.mobile)
            .bind(&details.email)
            .bind(&details.city)
            .bind(&details.education_level)
            .bind(&details.project_serial)
            .bind(&details.ordered_from_idea)
            .bind(&details.project_title)
            .bind(&details.project_domain)
            .bind(&details.project_concept)
            .bind(&details.project_description)
            .bind(&details.deadline)
            .bind(&details.budget)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        let created_at: DateTime<Utc> = row.try_get("created_at")?;
        Ok(Order::new(id, details, created_at))
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<Order>> {
        let rows = sqlx::query("SELECT * FROM orders ORDER BY created_at DESC, seq DESC LIMIT $1")
            .bind(i64::from(limit))
            .fetch_all(self.db.ready_pool().await?)
            .await?;

        rows.iter().map(Self::row_to_order).collect()
    }
}

/// PostgreSQL contact message store
pub struct PostgresMessageStore {
    db: Arc<PgDatabase>,
}

impl PostgresMessageStore {
    pub fn new(db: Arc<PgDatabase>) -> Self {
        Self { db }
    }

    fn row_to_message(row: &PgRow) -> Result<ContactMessage> {
        let created_at: DateTime<Utc> = row.try_get("created_at")?;
        Ok(ContactMessage {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            mobile: row.try_get("mobile")?,
            message: row.try_get("message")?,
            created_at,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl MessageStore for PostgresMessageStore {
    async fn create(&self, message: NewContactMessage) -> Result<ContactMessage> {
        let id = Uuid::new_v4();
        let mut tx = self.db.ready_pool().await?.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(MESSAGES_LOCK)
            .execute(&mut *tx)
            .await?;

        let row = sqlx::query(INSERT_MESSAGE)
            .bind(id)
            .bind(&message.name)
            .bind(&message.mobile)
            .bind(&message.message)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        let created_at: DateTime<Utc> = row.try_get("created_at")?;
        Ok(ContactMessage::new(id, message, created_at))
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<ContactMessage>> {
        let rows = sqlx::query(
            "SELECT * FROM contact_messages ORDER BY created_at DESC, seq DESC LIMIT $1",
        )
        .bind(i64::from(limit))
        .fetch_all(self.db.ready_pool().await?)
        .await?;

        rows.iter().map(Self::row_to_message).collect()
    }
}
