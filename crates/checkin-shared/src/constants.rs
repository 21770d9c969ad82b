/// File name of the persisted ledger document
pub const DATA_FILE_NAME: &str = "checkin_data.json";

/// Default data directory (relative to the working directory)
pub const DEFAULT_DATA_DIR: &str = "data/plugin-data/checkin";

/// Data directory used by earlier deployments
pub const LEGACY_DATA_DIR: &str = "data/plugins/checkin";

/// Default HTTP API port
pub const DEFAULT_HTTP_PORT: u16 = 8080;

/// Reward defaults
pub const DEFAULT_POINTS_PROB: f64 = 0.5;
pub const DEFAULT_POINTS_MIN: u64 = 10;
pub const DEFAULT_POINTS_MAX: u64 = 50;
pub const DEFAULT_INGOT_MIN: u64 = 5;
pub const DEFAULT_INGOT_MAX: u64 = 30;

/// Leaderboard length when not configured
pub const DEFAULT_MAX_RANK_LIST_SIZE: usize = 10;

/// Free-text keyword selecting the weekly leaderboard
pub const DEFAULT_WEEK_KEYWORD: &str = "week";

/// Shortest digit run treated as a user id rather than an amount
pub const MIN_ID_DIGITS: usize = 5;
