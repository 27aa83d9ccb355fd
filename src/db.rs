//! Database module
//!
//! Schema bootstrap. The server owns its schema and brings it up to
//! date at startup, so a fresh database needs no separate migration
//! step. Every statement is idempotent.

use sqlx::PgPool;

/// Create any missing tables and indexes.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id UUID PRIMARY KEY,
            email TEXT NOT NULL,
            password_hash TEXT NOT NULL,
            name TEXT,
            is_active BOOLEAN NOT NULL DEFAULT TRUE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Uniqueness is on the lowercased address; lookups match the index.
    sqlx::query(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS users_email_lower_key
        ON users (LOWER(email))
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS bills (
            id UUID PRIMARY KEY,
            user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            amount NUMERIC(10, 2) NOT NULL,
            due_date DATE NOT NULL,
            frequency TEXT NOT NULL DEFAULT 'one-time',
            category TEXT,
            notes TEXT,
            is_paid BOOLEAN NOT NULL DEFAULT FALSE,
            paid_date DATE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS bills_user_due_idx
        ON bills (user_id, due_date)
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS rate_limit_windows (
            client_key TEXT NOT NULL,
            window_start TIMESTAMPTZ NOT NULL,
            request_count INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (client_key, window_start)
        )
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Database schema verified");
    Ok(())
}
