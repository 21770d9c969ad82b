//! # checkin-shared
//!
//! Types shared by the check-in store and server: context identifiers,
//! reason codes, calendar period tags, the reward draw and operator settings.

pub mod constants;
pub mod error;
pub mod period;
pub mod reward;
pub mod settings;
pub mod types;

pub use error::{Rejection, SettingsError};
pub use period::{periods, Clock, Periods};
pub use reward::{RewardConfig, RewardSource};
pub use settings::{LedgerSettings, Templates};
pub use types::*;
