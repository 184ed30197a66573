//! Schema setup for the site tables

use sqlx::{PgConnection, PgPool};

/// Advisory lock key held while the schema is created
const MIGRATION_LOCK: i64 = 0x636c_7562_686f_7573;

/// Create all tables and indexes. Safe to run on every start, including
/// from several processes at once.
pub async fn run(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Running migrations...");

    let mut tx = pool.begin().await?;
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(MIGRATION_LOCK)
        .execute(&mut *tx)
        .await?;

    create_tables(&mut tx).await?;
    create_indexes(&mut tx).await?;
    tx.commit().await?;

    tracing::info!("Migrations complete");
    Ok(())
}

async fn create_tables(conn: &mut PgConnection) -> Result<(), sqlx::Error> {

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id BIGSERIAL PRIMARY KEY,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL DEFAULT '',
            email TEXT NOT NULL,
            phone_number TEXT,
            password TEXT NOT NULL,
            role TEXT DEFAULT 'Member',
            team TEXT,
            profile_image TEXT NOT NULL DEFAULT 'profile.jpg',
            bio TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(&mut *conn)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            token UUID PRIMARY KEY,
            user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            expires_at TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(&mut *conn)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS events (
            id BIGSERIAL PRIMARY KEY,
            title TEXT NOT NULL,
            date_str TEXT,
            category TEXT,
            description TEXT,
            content TEXT,
            image TEXT NOT NULL DEFAULT 'default_event.jpg',
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(&mut *conn)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS articles (
            id BIGSERIAL PRIMARY KEY,
            title TEXT NOT NULL,
            author TEXT,
            subject TEXT,
            image TEXT NOT NULL DEFAULT 'default_article.jpg',
            summary TEXT,
            content TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(&mut *conn)
    .await?;

    Ok(())
}

async fn create_indexes(conn: &mut PgConnection) -> Result<(), sqlx::Error> {
    // One account per address regardless of case; also serves login lookups.
    // Older schemas carried a case-sensitive column constraint and a plain index.
    sqlx::query("ALTER TABLE users DROP CONSTRAINT IF EXISTS users_email_key")
        .execute(&mut *conn)
        .await?;
    sqlx::query("DROP INDEX IF EXISTS idx_users_email_lower")
        .execute(&mut *conn)
        .await?;
    sqlx::query(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_users_email_unique ON users(LOWER(email))",
    )
    .execute(&mut *conn)
    .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_users_team_role ON users(team, role) WHERE team IS NOT NULL",
    )
    .execute(&mut *conn)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id)")
        .execute(&mut *conn)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_sessions_expires ON sessions(expires_at)")
        .execute(&mut *conn)
        .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_articles_created ON articles(created_at DESC)",
    )
    .execute(&mut *conn)
    .await?;

    Ok(())
}
