use crate::config::DatabaseConfig;
use sqlx::{postgres::PgPoolOptions, PgPool};

pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url())
        .await
}

pub async fn health_check(pool: &PgPool) -> Result<String, sqlx::Error> {
    let row: (String,) = sqlx::query_as("SELECT version()").fetch_one(pool).await?;
    Ok(row.0)
}

/// Additive schema setup. Safe to run on every start.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Running schema migrations");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            id BIGSERIAL PRIMARY KEY,
            session_id TEXT NOT NULL,
            face_encoding JSONB,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_sessions_session_id ON sessions (session_id)")
        .execute(pool)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user_sessions (
            session_id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            closed_at TIMESTAMPTZ
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_user_sessions_user_id ON user_sessions (user_id)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Drops both tables. Destructive; only reachable through the server's
/// explicit `--reset-db` flag, never run implicitly at startup.
pub async fn reset_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::warn!("Dropping sessions and user_sessions tables");

    sqlx::query("DROP TABLE IF EXISTS sessions").execute(pool).await?;
    sqlx::query("DROP TABLE IF EXISTS user_sessions")
        .execute(pool)
        .await?;

    Ok(())
}
