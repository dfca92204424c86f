/// Pure functions for formatting replies and announcements (Discord-agnostic)
use poise::serenity_prelude::UserId;

use crate::constants::LIST_BYTE_BUDGET;
use crate::models::BirthdayRecord;

/// Marker appended when the birthday list exceeds the byte budget
const TRUNCATION_MARKER: &str = "\n... (list too long)";

/// Format a validation error message with emoji
pub fn format_error(message: &str) -> String {
    format!("❌ {}", message)
}

/// Format a success message with emoji
pub fn format_success(message: &str) -> String {
    format!("✅ {}", message)
}

/// Format an info message with emoji
pub fn format_info(message: &str) -> String {
    format!("ℹ️ {}", message)
}

/// Build a database error message (generic, doesn't expose internals)
pub fn build_database_error() -> String {
    format_error("A database error occurred. Please try again later.")
}

/// Confirmation text for a saved birthday
pub fn build_saved_confirmation(day: i32, month: i32) -> String {
    format_success(&format!("Saved: **{:02}/{:02}**", day, month))
}

/// Render the full birthday list as one `<@user_id> — DD/MM` line per record,
/// truncated to the byte budget with a marker if it runs over.
pub fn render_birthday_list(records: &[BirthdayRecord]) -> String {
    let text = records
        .iter()
        .map(|r| format!("<@{}> — {:02}/{:02}", r.user_id, r.day, r.month))
        .collect::<Vec<_>>()
        .join("\n");

    if text.len() <= LIST_BYTE_BUDGET {
        return text;
    }

    let mut cut = LIST_BYTE_BUDGET;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}{}", &text[..cut], TRUNCATION_MARKER)
}

/// Build the daily announcement mentioning every user with a birthday today
pub fn build_birthday_announcement(user_ids: &[UserId]) -> String {
    let mentions = user_ids
        .iter()
        .map(|id| format!("<@{}>", id))
        .collect::<Vec<_>>()
        .join(" ");

    format!("🎉 Happy birthday {} 🥳🎂", mentions)
}
