//! Domain model persisted in the ledger document.
//!
//! Field names on disk follow the document layout written by earlier
//! deployments (`username`, `last_checkin`), so old files load unchanged.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use checkin_shared::{ContextId, CurrencyKind, Periods, RankPeriod};

// ---------------------------------------------------------------------------
// UserRecord
// ---------------------------------------------------------------------------

/// Current-state aggregates of one user inside one context.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct UserRecord {
    pub user_id: String,
    /// Last observed display name.
    #[serde(rename = "username")]
    pub display_name: String,
    pub total_days: u64,
    pub month_days: u64,
    pub week_days: u64,
    pub points: u64,
    pub ingots: u64,
    /// `YYYY-MM` of the last reconciliation.
    pub month_tag: String,
    /// `YYYY-WW` (ISO) of the last reconciliation.
    pub week_tag: String,
    /// `YYYY-MM-DD` of the last successful check-in, empty if none.
    #[serde(rename = "last_checkin")]
    pub last_checkin_date: String,
}

impl UserRecord {
    /// A fresh record: zero counters, empty tags.
    pub fn new(user_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: display_name.into(),
            ..Default::default()
        }
    }

    /// Zero the month/week counters whose stored tag no longer matches.
    pub fn reconcile(&mut self, periods: &Periods) {
        if self.month_tag != periods.month {
            self.month_tag = periods.month.clone();
            self.month_days = 0;
        }
        if self.week_tag != periods.week {
            self.week_tag = periods.week.clone();
            self.week_days = 0;
        }
    }

    pub fn balance(&self, kind: CurrencyKind) -> u64 {
        match kind {
            CurrencyKind::Points => self.points,
            CurrencyKind::Ingots => self.ingots,
        }
    }

    pub fn balance_mut(&mut self, kind: CurrencyKind) -> &mut u64 {
        match kind {
            CurrencyKind::Points => &mut self.points,
            CurrencyKind::Ingots => &mut self.ingots,
        }
    }

    pub fn days(&self, period: RankPeriod) -> u64 {
        match period {
            RankPeriod::Week => self.week_days,
            RankPeriod::Month => self.month_days,
        }
    }

    /// A fresh record for the same user that keeps only the display name.
    pub fn cleared(&self) -> Self {
        Self::new(self.user_id.clone(), self.display_name.clone())
    }

    /// Display name, or the user id when no name was ever observed.
    pub fn label(&self) -> &str {
        if self.display_name.is_empty() {
            &self.user_id
        } else {
            &self.display_name
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset
// ---------------------------------------------------------------------------

/// All records of one context, in insertion order.
pub type Bucket = IndexMap<String, UserRecord>;

/// The whole ledger: `ContextId -> (user id -> UserRecord)`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Dataset {
    contexts: IndexMap<ContextId, Bucket>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bucket(&self, ctx: &ContextId) -> Option<&Bucket> {
        self.contexts.get(ctx)
    }

    pub fn record(&self, ctx: &ContextId, user_id: &str) -> Option<&UserRecord> {
        self.contexts.get(ctx).and_then(|b| b.get(user_id))
    }

    pub fn record_mut(&mut self, ctx: &ContextId, user_id: &str) -> Option<&mut UserRecord> {
        self.contexts.get_mut(ctx).and_then(|b| b.get_mut(user_id))
    }

    /// Fetch or create the record, creating the bucket as needed.
    pub fn entry(&mut self, ctx: &ContextId, user_id: &str, display_name: &str) -> &mut UserRecord {
        self.contexts
            .entry(ctx.clone())
            .or_default()
            .entry(user_id.to_string())
            .or_insert_with(|| UserRecord::new(user_id, display_name))
    }

    /// Number of contexts.
    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    /// Total number of records across all contexts.
    pub fn record_count(&self) -> usize {
        self.contexts.values().map(|b| b.len()).sum()
    }
}
