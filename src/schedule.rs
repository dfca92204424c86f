use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Timelike, Utc};
use poise::serenity_prelude::{self as serenity, ChannelId, CreateMessage};
use std::sync::Arc;
use tokio::time::{Duration, sleep};
use tracing::{error, info, warn};

use crate::constants::TICK_INTERVAL_SECS;
use crate::db::Database;
use crate::messages::build_birthday_announcement;
use crate::models::Data;

/// Delivery seam for the daily announcement
///
/// The production implementation talks to Discord; tests substitute
/// recording or failing implementations.
trait Announcer {
    async fn send(&self, channel_id: ChannelId, text: String) -> Result<(), serenity::Error>;
}

/// Announcer backed by the Discord HTTP client
struct DiscordAnnouncer {
    http: Arc<serenity::Http>,
}

impl Announcer for DiscordAnnouncer {
    async fn send(&self, channel_id: ChannelId, text: String) -> Result<(), serenity::Error> {
        let message = CreateMessage::new().content(text);
        channel_id.send_message(&self.http, message).await?;
        Ok(())
    }
}

/// Once-per-day trigger latch
///
/// Owns the date of the last fired announcement. Ticks within the configured
/// local hour fire at most once per calendar day; a tick on a new date
/// re-evaluates from scratch. Local time is UTC plus a fixed offset, no DST.
pub struct DailyTrigger {
    announce_hour: u32,
    offset: FixedOffset,
    last_fired: Option<NaiveDate>,
}

impl DailyTrigger {
    /// Create a trigger for the given local hour and UTC offset in hours.
    /// The offset must be within -23..=23 (enforced by config loading).
    pub fn new(announce_hour: u32, utc_offset_hours: i32) -> Self {
        let offset =
            FixedOffset::east_opt(utc_offset_hours * 3600).expect("offset within +/-23 hours");
        Self {
            announce_hour,
            offset,
            last_fired: None,
        }
    }

    /// Evaluate one tick at the given instant. Returns the local date to
    /// announce for when this tick crosses the trigger window, advancing
    /// the latch as a side effect.
    pub fn due(&mut self, now_utc: DateTime<Utc>) -> Option<NaiveDate> {
        let local = now_utc.with_timezone(&self.offset);
        if local.hour() != self.announce_hour {
            return None;
        }

        let today = local.date_naive();
        if self.last_fired == Some(today) {
            return None;
        }

        // Marked before delivery: a failed send does not re-arm the day
        self.last_fired = Some(today);
        Some(today)
    }

    /// Local date of the last fired announcement, if any
    pub fn last_fired(&self) -> Option<NaiveDate> {
        self.last_fired
    }
}

/// Run one scheduler tick at the given instant
async fn run_tick<A: Announcer>(
    trigger: &mut DailyTrigger,
    db: &Database,
    announcer: &A,
    channel_id: ChannelId,
    now_utc: DateTime<Utc>,
) {
    let Some(today) = trigger.due(now_utc) else {
        return;
    };

    let user_ids = match db
        .birthdays_on_date(today.day() as i32, today.month() as i32)
        .await
    {
        Ok(ids) => ids,
        Err(e) => {
            // The day stays marked fired; storage errors are not retried
            error!("Failed to look up birthdays for {}: {}", today, e);
            return;
        }
    };

    if user_ids.is_empty() {
        info!("No birthdays today ({})", today);
        return;
    }

    info!("Announcing {} birthday(s) for {}", user_ids.len(), today);

    let text = build_birthday_announcement(&user_ids);
    if let Err(e) = announcer.send(channel_id, text).await {
        // The day still counts as handled, no retry
        warn!("Failed to deliver birthday announcement for {}: {}", today, e);
    }
}

/// Start the announcement loop as a background task
///
/// Called from the framework setup callback, so no tick can run before the
/// gateway connection is ready. Ticks never overlap: each sleep starts only
/// after the previous tick has fully completed.
pub fn start_announcement_loop(
    http: Arc<serenity::Http>,
    data: Arc<Data>,
    channel_id: ChannelId,
    announce_hour: u32,
    utc_offset_hours: i32,
) {
    tokio::spawn(async move {
        info!(
            "Birthday scheduler started (announcing at {:02}:00 local, UTC{:+})",
            announce_hour, utc_offset_hours
        );

        let announcer = DiscordAnnouncer { http };
        let mut trigger = DailyTrigger::new(announce_hour, utc_offset_hours);

        loop {
            sleep(Duration::from_secs(TICK_INTERVAL_SECS)).await;
            run_tick(&mut trigger, &data.db, &announcer, channel_id, Utc::now()).await;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use poise::serenity_prelude::UserId;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    static DB_COUNTER: AtomicU32 = AtomicU32::new(0);

    fn temp_db() -> (String, PathBuf) {
        let n = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "cumplebot-sched-test-{}-{}.sqlite",
            std::process::id(),
            n
        ));
        (format!("sqlite://{}?mode=rwc", path.display()), path)
    }

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    struct RecordingAnnouncer {
        sent: Mutex<Vec<(ChannelId, String)>>,
    }

    impl RecordingAnnouncer {
        fn new() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
            }
        }

        fn messages(&self) -> Vec<(ChannelId, String)> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl Announcer for RecordingAnnouncer {
        async fn send(&self, channel_id: ChannelId, text: String) -> Result<(), serenity::Error> {
            self.sent.lock().unwrap().push((channel_id, text));
            Ok(())
        }
    }

    struct FailingAnnouncer;

    impl Announcer for FailingAnnouncer {
        async fn send(&self, _: ChannelId, _: String) -> Result<(), serenity::Error> {
            Err(serenity::Error::Other("channel unavailable"))
        }
    }

    #[test]
    fn test_due_ignores_wrong_hour() {
        let mut trigger = DailyTrigger::new(9, 0);
        assert_eq!(trigger.due(utc(2024, 8, 15, 8, 59)), None);
        assert_eq!(trigger.due(utc(2024, 8, 15, 10, 0)), None);
        assert_eq!(trigger.last_fired(), None);
    }

    #[test]
    fn test_due_fires_once_per_day() {
        let mut trigger = DailyTrigger::new(9, 0);
        let date = NaiveDate::from_ymd_opt(2024, 8, 15).unwrap();

        assert_eq!(trigger.due(utc(2024, 8, 15, 9, 0)), Some(date));
        // Later ticks in the same window are no-ops
        assert_eq!(trigger.due(utc(2024, 8, 15, 9, 1)), None);
        assert_eq!(trigger.due(utc(2024, 8, 15, 9, 59)), None);
        assert_eq!(trigger.last_fired(), Some(date));
    }

    #[test]
    fn test_due_rearms_on_next_day() {
        let mut trigger = DailyTrigger::new(9, 0);
        assert!(trigger.due(utc(2024, 8, 15, 9, 0)).is_some());

        let next = NaiveDate::from_ymd_opt(2024, 8, 16).unwrap();
        assert_eq!(trigger.due(utc(2024, 8, 16, 9, 0)), Some(next));
        assert_eq!(trigger.last_fired(), Some(next));
    }

    #[test]
    fn test_due_applies_fixed_offset() {
        // 15:00 UTC is 09:00 local at UTC-6
        let mut trigger = DailyTrigger::new(9, -6);
        assert_eq!(trigger.due(utc(2024, 8, 15, 9, 0)), None);
        assert_eq!(
            trigger.due(utc(2024, 8, 15, 15, 0)),
            Some(NaiveDate::from_ymd_opt(2024, 8, 15).unwrap())
        );
    }

    #[test]
    fn test_due_uses_local_date_across_midnight() {
        // 02:00 UTC on the 16th is still 20:00 on the 15th at UTC-6,
        // so a midnight announce hour at that offset fires on the 16th
        // only once UTC reaches 06:00.
        let mut trigger = DailyTrigger::new(0, -6);
        assert_eq!(trigger.due(utc(2024, 8, 16, 2, 0)), None);
        assert_eq!(
            trigger.due(utc(2024, 8, 16, 6, 0)),
            Some(NaiveDate::from_ymd_opt(2024, 8, 16).unwrap())
        );
    }

    #[tokio::test]
    async fn test_tick_announces_all_matching_users_once() {
        let (url, path) = temp_db();
        let db = Database::new(&url).await.expect("open db");
        db.upsert_birthday(UserId::new(1), 15, 8).await.unwrap();
        db.upsert_birthday(UserId::new(2), 15, 8).await.unwrap();

        let announcer = RecordingAnnouncer::new();
        let channel = ChannelId::new(555);
        let mut trigger = DailyTrigger::new(9, -6);

        // Local 2024-08-15 09:00 -> one combined announcement
        run_tick(&mut trigger, &db, &announcer, channel, utc(2024, 8, 15, 15, 0)).await;
        let sent = announcer.messages();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, channel);
        assert!(sent[0].1.contains("<@1>"));
        assert!(sent[0].1.contains("<@2>"));

        // Local 09:01 the same day -> nothing
        run_tick(&mut trigger, &db, &announcer, channel, utc(2024, 8, 15, 15, 1)).await;
        assert_eq!(announcer.messages().len(), 1);

        // Next day at 09:00 local with no matching users -> nothing sent,
        // but the fired date still advances
        run_tick(&mut trigger, &db, &announcer, channel, utc(2024, 8, 16, 15, 0)).await;
        assert_eq!(announcer.messages().len(), 1);
        assert_eq!(
            trigger.last_fired(),
            Some(NaiveDate::from_ymd_opt(2024, 8, 16).unwrap())
        );

        std::fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn test_tick_with_no_birthdays_still_marks_day_fired() {
        let (url, path) = temp_db();
        let db = Database::new(&url).await.expect("open db");

        let announcer = RecordingAnnouncer::new();
        let mut trigger = DailyTrigger::new(9, 0);

        run_tick(&mut trigger, &db, &announcer, ChannelId::new(1), utc(2024, 3, 3, 9, 0)).await;
        assert!(announcer.messages().is_empty());
        assert_eq!(
            trigger.last_fired(),
            Some(NaiveDate::from_ymd_opt(2024, 3, 3).unwrap())
        );

        std::fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn test_delivery_failure_does_not_rearm_the_day() {
        let (url, path) = temp_db();
        let db = Database::new(&url).await.expect("open db");
        db.upsert_birthday(UserId::new(9), 1, 6).await.unwrap();

        let channel = ChannelId::new(1);
        let mut trigger = DailyTrigger::new(9, 0);

        run_tick(&mut trigger, &db, &FailingAnnouncer, channel, utc(2024, 6, 1, 9, 0)).await;
        assert_eq!(
            trigger.last_fired(),
            Some(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap())
        );

        // A later tick the same day stays silent even though delivery failed
        let recorder = RecordingAnnouncer::new();
        run_tick(&mut trigger, &db, &recorder, channel, utc(2024, 6, 1, 9, 30)).await;
        assert!(recorder.messages().is_empty());

        std::fs::remove_file(&path).ok();
    }
}
