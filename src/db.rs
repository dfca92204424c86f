use poise::serenity_prelude::UserId;
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use tracing::info;

use crate::models::BirthdayRecord;

/// Database connection pool wrapper
///
/// Handles all persistence for the bot: one table of per-user birthdays.
/// Range validation of day/month is the caller's job; the store accepts
/// whatever it is handed (day=31/month=2 is stored verbatim and simply
/// never matches a real date).
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if needed) the database and run migrations
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        let db = Self { pool };
        db.run_migrations().await?;

        info!("Database connected and migrations completed");
        Ok(db)
    }

    /// Run database migrations to create tables
    async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS birthdays (
                user_id INTEGER PRIMARY KEY,
                day INTEGER NOT NULL,
                month INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Save or update a user's birthday
    pub async fn upsert_birthday(
        &self,
        user_id: UserId,
        day: i32,
        month: i32,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO birthdays (user_id, day, month)
            VALUES (?, ?, ?)
            ON CONFLICT(user_id)
            DO UPDATE SET day = excluded.day, month = excluded.month
            "#,
        )
        .bind(user_id.get() as i64)
        .bind(day)
        .bind(month)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Remove a user's birthday; removing an absent record is not an error
    pub async fn remove_birthday(&self, user_id: UserId) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM birthdays WHERE user_id = ?")
            .bind(user_id.get() as i64)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Get all stored birthdays ordered by (month, day)
    pub async fn list_birthdays(&self) -> Result<Vec<BirthdayRecord>, sqlx::Error> {
        let rows: Vec<(i64, i32, i32)> =
            sqlx::query_as("SELECT user_id, day, month FROM birthdays ORDER BY month, day")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows
            .into_iter()
            .map(|(user_id, day, month)| BirthdayRecord {
                user_id: UserId::new(user_id as u64),
                day,
                month,
            })
            .collect())
    }

    /// Get all users whose stored birthday is exactly (day, month)
    pub async fn birthdays_on_date(&self, day: i32, month: i32) -> Result<Vec<UserId>, sqlx::Error> {
        let rows: Vec<(i64,)> =
            sqlx::query_as("SELECT user_id FROM birthdays WHERE day = ? AND month = ?")
                .bind(day)
                .bind(month)
                .fetch_all(&self.pool)
                .await?;

        Ok(rows
            .into_iter()
            .map(|(user_id,)| UserId::new(user_id as u64))
            .collect())
    }
}
