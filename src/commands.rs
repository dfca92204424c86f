use tracing::{error, info};

use crate::{
    messages::{
        build_database_error, build_saved_confirmation, format_error, format_info,
        render_birthday_list,
    },
    models::{Context, Error},
};

/// Validation error types
#[derive(Debug, PartialEq, Eq)]
pub enum ValidationError {
    DayOutOfRange(u32),
    MonthOutOfRange(u32),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::DayOutOfRange(day) => {
                write!(f, "Invalid day: {}. Expected 1-31. Example: `/set_birthday 15 8`", day)
            }
            ValidationError::MonthOutOfRange(month) => {
                write!(f, "Invalid month: {}. Expected 1-12. Example: `/set_birthday 15 8`", month)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate a (day, month) pair before it reaches the store
pub fn validate_birthday(day: u32, month: u32) -> Result<(), ValidationError> {
    if !(1..=31).contains(&day) {
        return Err(ValidationError::DayOutOfRange(day));
    }
    if !(1..=12).contains(&month) {
        return Err(ValidationError::MonthOutOfRange(month));
    }
    Ok(())
}

/// Build an ephemeral reply so birthday chatter stays out of the channel
fn ephemeral(content: String) -> poise::CreateReply {
    poise::CreateReply::default().content(content).ephemeral(true)
}

/// Save your birthday (day and month). Example: 15 8
#[poise::command(slash_command)]
pub async fn set_birthday(
    ctx: Context<'_>,
    #[description = "Day (1-31)"] day: u32,
    #[description = "Month (1-12)"] month: u32,
) -> Result<(), Error> {
    if let Err(e) = validate_birthday(day, month) {
        ctx.send(ephemeral(format_error(&e.to_string()))).await?;
        return Ok(());
    }

    let user_id = ctx.author().id;
    match ctx
        .data()
        .db
        .upsert_birthday(user_id, day as i32, month as i32)
        .await
    {
        Ok(()) => {
            ctx.send(ephemeral(build_saved_confirmation(day as i32, month as i32)))
                .await?;
            info!("Saved birthday {:02}/{:02} for user {}", day, month, user_id);
        }
        Err(e) => {
            error!("Failed to save birthday for user {}: {}", user_id, e);
            ctx.send(ephemeral(build_database_error())).await?;
        }
    }

    Ok(())
}

/// Remove your saved birthday
#[poise::command(slash_command)]
pub async fn remove_birthday(ctx: Context<'_>) -> Result<(), Error> {
    let user_id = ctx.author().id;
    match ctx.data().db.remove_birthday(user_id).await {
        Ok(()) => {
            // Deleting an unset birthday still confirms; there is nothing
            // actionable to tell the user apart from "it is gone now".
            ctx.send(ephemeral("🗑️ Birthday removed.".to_string())).await?;
            info!("Removed birthday for user {}", user_id);
        }
        Err(e) => {
            error!("Failed to remove birthday for user {}: {}", user_id, e);
            ctx.send(ephemeral(build_database_error())).await?;
        }
    }

    Ok(())
}

/// Show all saved birthdays
#[poise::command(slash_command)]
pub async fn list_birthdays(ctx: Context<'_>) -> Result<(), Error> {
    match ctx.data().db.list_birthdays().await {
        Ok(records) if records.is_empty() => {
            ctx.send(ephemeral(format_info("No birthdays saved yet.")))
                .await?;
        }
        Ok(records) => {
            ctx.send(ephemeral(render_birthday_list(&records))).await?;
        }
        Err(e) => {
            error!("Failed to list birthdays: {}", e);
            ctx.send(ephemeral(build_database_error())).await?;
        }
    }

    Ok(())
}
