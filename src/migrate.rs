use anyhow::Result;
use sqlx::sqlite::SqlitePool;

use crate::config::Config;
use crate::db;

/// Create the club tables. Idempotent; shapes must stay in lockstep with
/// the text in [`crate::schema`].
pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    apply(&pool).await?;
    pool.close().await;
    Ok(())
}

/// Apply the table definitions to an already-open pool.
pub async fn apply(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS members (
            member_id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT UNIQUE NOT NULL,
            phone TEXT,
            membership_tier TEXT,
            join_date DATE NOT NULL,
            status TEXT DEFAULT 'active'
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS courts (
            court_id INTEGER PRIMARY KEY,
            court_name TEXT NOT NULL,
            surface_type TEXT,
            indoor INTEGER DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS coaches (
            coach_id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            specialty TEXT,
            hourly_rate REAL,
            weekly_available_hours INTEGER
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS bookings (
            booking_id INTEGER PRIMARY KEY,
            member_id INTEGER NOT NULL,
            coach_id INTEGER,
            court_id INTEGER NOT NULL,
            lesson_type TEXT,
            booking_date DATE NOT NULL,
            start_time TEXT,
            end_time TEXT,
            duration_minutes INTEGER,
            price REAL,
            status TEXT DEFAULT 'scheduled',
            cancellation_reason TEXT,
            created_at TEXT,
            FOREIGN KEY (member_id) REFERENCES members(member_id),
            FOREIGN KEY (coach_id) REFERENCES coaches(coach_id),
            FOREIGN KEY (court_id) REFERENCES courts(court_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_bookings_date ON bookings(booking_date)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_bookings_member ON bookings(member_id)")
        .execute(pool)
        .await?;

    Ok(())
}
