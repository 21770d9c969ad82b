use thiserror::Error;

/// Business-rule rejections surfaced to the chat adapter as reason codes.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    #[error("already checked in today")]
    AlreadyCheckedIn,

    #[error("amount must be a positive integer")]
    InvalidAmount,

    #[error("insufficient balance")]
    InsufficientFunds,

    #[error("not authorized")]
    NotAuthorized,

    #[error("no record found")]
    NotFound,
}

impl Rejection {
    /// Stable reason code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::AlreadyCheckedIn => "already_checked_in",
            Self::InvalidAmount => "invalid_amount",
            Self::InsufficientFunds => "insufficient_funds",
            Self::NotAuthorized => "not_authorized",
            Self::NotFound => "not_found",
        }
    }
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("reward_points_prob must be within [0, 1], got {0}")]
    Probability(f64),

    #[error("empty {name} range: min {min} > max {max}")]
    EmptyRange { name: &'static str, min: u64, max: u64 },

    #[error("rank_week_keyword must not be empty")]
    EmptyKeyword,

    #[error("Settings file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
