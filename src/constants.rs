/// Hour of the local day (0-23) at which birthdays are announced by default
pub const DEFAULT_ANNOUNCE_HOUR: u32 = 9;

/// Default UTC offset in hours (Costa Rica, no DST)
pub const DEFAULT_TZ_OFFSET_HOURS: i32 = -6;

/// Seconds between scheduler ticks
pub const TICK_INTERVAL_SECS: u64 = 60;

/// Maximum byte length of the /list_birthdays reply body
pub const LIST_BYTE_BUDGET: usize = 1800;

/// Default port for the health-check server
pub const DEFAULT_HEALTH_PORT: u16 = 10000;

/// Default database location
pub const DEFAULT_DATABASE_URL: &str = "sqlite://birthdays.sqlite?mode=rwc";

/// Log directive for the application
pub const LOG_DIRECTIVE: &str = "cumplebot=info";
