use poise::serenity_prelude::UserId;

use crate::db::Database;

/// A user's stored birthday
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BirthdayRecord {
    pub user_id: UserId,
    pub day: i32,
    pub month: i32,
}

/// Bot state shared across all command handlers and the scheduler
#[derive(Clone)]
pub struct Data {
    /// Database connection
    pub db: Database,
}

impl Data {
    /// Create a new Data instance with the given database connection
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;
