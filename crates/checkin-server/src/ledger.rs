//! The check-in ledger state machine.
//!
//! [`Ledger`] is the single owner of the in-memory [`Dataset`]. State-changing
//! operations hold the write lock for the whole dataset, apply their change to
//! a copy, persist that copy, and only then swap it in. A failed write
//! therefore leaves both memory and disk at the previous state. Read-only
//! operations share the read lock and never persist.

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

use checkin_shared::{
    periods, ContextId, CurrencyKind, RankPeriod, Rejection, Reward, RewardConfig, RewardSource,
    RoleMode,
};
use checkin_store::{Dataset, JsonStore, StoreError, UserRecord};

use crate::authz::{self, BucketScope};

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("rejected: {0}")]
    Rejected(#[from] Rejection),

    #[error("failed to persist ledger: {0}")]
    Persistence(#[from] StoreError),
}

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Outcome of a successful check-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckIn {
    pub record: UserRecord,
    pub reward: Reward,
}

/// A redemption request, already parsed by the adapter.
#[derive(Debug, Clone)]
pub struct RedeemRequest<'a> {
    /// Context selected by the storage scope.
    pub context: &'a ContextId,
    /// Physical group bucket of the same event.
    pub group_context: &'a ContextId,
    pub actor_id: &'a str,
    pub actor_name: &'a str,
    pub target: Option<&'a str>,
    pub amount: i64,
    pub is_admin: bool,
    pub role_mode: RoleMode,
    pub kind: CurrencyKind,
}

/// Outcome of a successful redemption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Redemption {
    pub user_id: String,
    pub display_name: String,
    pub kind: CurrencyKind,
    pub amount: u64,
    pub remaining: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankEntry {
    pub position: usize,
    pub user_id: String,
    pub display_name: String,
    pub days: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Leaderboard {
    /// The context has no records at all.
    NoData,
    Ranked {
        period: RankPeriod,
        entries: Vec<RankEntry>,
    },
}

/// Outcome of an admin reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reset {
    pub user_id: String,
    pub display_name: String,
}

pub struct Ledger {
    data: RwLock<Dataset>,
    store: JsonStore,
    rewards: Box<dyn RewardSource>,
}

impl Ledger {
    pub fn new(store: JsonStore, data: Dataset, rewards: Box<dyn RewardSource>) -> Self {
        Self {
            data: RwLock::new(data),
            store,
            rewards,
        }
    }

    /// Run `op` against a copy of the dataset and commit it once persisted.
    async fn transact<T, F>(&self, name: &'static str, op: F) -> LedgerResult<T>
    where
        F: FnOnce(&mut Dataset) -> Result<T, Rejection>,
    {
        let mut current = self.data.write().await;
        let mut next = current.clone();

        let out = match op(&mut next) {
            Ok(out) => out,
            Err(reason) => {
                debug!(op = name, reason = reason.code(), "operation rejected");
                return Err(reason.into());
            }
        };

        if let Err(e) = self.store.save(&next).await {
            error!(op = name, error = %e, "failed to persist ledger, change discarded");
            return Err(e.into());
        }

        *current = next;
        Ok(out)
    }

    /// Record today's check-in and credit a random reward.
    pub async fn check_in(
        &self,
        context: &ContextId,
        user_id: &str,
        display_name: &str,
        today: NaiveDate,
        reward_cfg: &RewardConfig,
    ) -> LedgerResult<CheckIn> {
        let periods = periods(today);

        let outcome = self
            .transact("check_in", |data| {
                let record = data.entry(context, user_id, display_name);
                record.display_name = display_name.to_string();
                record.reconcile(&periods);

                if record.last_checkin_date == periods.day {
                    return Err(Rejection::AlreadyCheckedIn);
                }

                let reward = self.rewards.draw(reward_cfg);
                record.total_days += 1;
                record.month_days += 1;
                record.week_days += 1;
                let balance = record.balance_mut(reward.kind);
                *balance = balance.saturating_add(reward.amount);
                record.last_checkin_date = periods.day.clone();

                Ok(CheckIn {
                    record: record.clone(),
                    reward,
                })
            })
            .await?;

        info!(
            context = %context,
            user = user_id,
            kind = %outcome.reward.kind,
            amount = outcome.reward.amount,
            total_days = outcome.record.total_days,
            "check-in recorded"
        );
        Ok(outcome)
    }

    /// The acting user's record as of `today`, without persisting anything.
    pub async fn assets(
        &self,
        context: &ContextId,
        user_id: &str,
        display_name: &str,
        today: NaiveDate,
    ) -> UserRecord {
        let data = self.data.read().await;
        let mut record = data
            .record(context, user_id)
            .cloned()
            .unwrap_or_else(|| UserRecord::new(user_id, display_name));
        record.display_name = display_name.to_string();
        record.reconcile(&periods(today));
        debug!(context = %context, user = user_id, "assets read");
        record
    }

    /// Debit `amount` from the resolved target's balance.
    pub async fn redeem(&self, req: &RedeemRequest<'_>) -> LedgerResult<Redemption> {
        if req.amount <= 0 {
            return Err(Rejection::InvalidAmount.into());
        }
        let amount = req.amount.unsigned_abs();
        let target =
            authz::resolve_redemption(req.role_mode, req.actor_id, req.is_admin, req.target)?;

        let outcome = self
            .transact("redeem", |data| {
                let context = match target.scope {
                    BucketScope::Logical => req.context,
                    BucketScope::Group => req.group_context,
                };
                let initial_name = if target.is_actor { req.actor_name } else { "" };
                let record = data.entry(context, &target.user_id, initial_name);
                if target.is_actor {
                    record.display_name = req.actor_name.to_string();
                }

                let balance = record.balance_mut(req.kind);
                if *balance < amount {
                    return Err(Rejection::InsufficientFunds);
                }
                *balance -= amount;

                Ok(Redemption {
                    user_id: record.user_id.clone(),
                    display_name: record.display_name.clone(),
                    kind: req.kind,
                    amount,
                    remaining: record.balance(req.kind),
                })
            })
            .await?;

        info!(
            actor = req.actor_id,
            target = %outcome.user_id,
            kind = %outcome.kind,
            amount = outcome.amount,
            remaining = outcome.remaining,
            "redemption committed"
        );
        Ok(outcome)
    }

    /// Leaderboard of `context` by the selected period counter.
    ///
    /// Counters are read as stored; records untouched since a rollover keep
    /// their previous-period count until their owner interacts again.
    pub async fn rank(&self, context: &ContextId, period: RankPeriod, limit: usize) -> Leaderboard {
        let data = self.data.read().await;
        let Some(bucket) = data.bucket(context).filter(|b| !b.is_empty()) else {
            debug!(context = %context, "rank requested for empty context");
            return Leaderboard::NoData;
        };

        let mut records: Vec<&UserRecord> = bucket.values().collect();
        // stable: ties keep insertion order
        records.sort_by(|a, b| b.days(period).cmp(&a.days(period)));

        let entries = records
            .into_iter()
            .take(limit.max(1))
            .enumerate()
            .map(|(i, r)| RankEntry {
                position: i + 1,
                user_id: r.user_id.clone(),
                display_name: r.label().to_string(),
                days: r.days(period),
            })
            .collect();

        Leaderboard::Ranked { period, entries }
    }

    /// Admin reset of one member of the group bucket.
    pub async fn reset(
        &self,
        group_context: &ContextId,
        target_id: &str,
        is_admin: bool,
    ) -> LedgerResult<Reset> {
        authz::require_admin(is_admin)?;

        let outcome = self
            .transact("reset", |data| clear_record(data, group_context, target_id))
            .await?;

        info!(context = %group_context, user = target_id, "record reset");
        Ok(outcome)
    }

    /// Reset a member who left the group.
    ///
    /// Returns `Ok(false)` when the member had no record. Callers treat any
    /// error as best-effort housekeeping and discard it after logging.
    pub async fn member_left(
        &self,
        group_context: &ContextId,
        user_id: &str,
    ) -> LedgerResult<bool> {
        match self
            .transact("member_left", |data| clear_record(data, group_context, user_id))
            .await
        {
            Ok(_) => {
                info!(context = %group_context, user = user_id, "record reset after member left");
                Ok(true)
            }
            Err(LedgerError::Rejected(Rejection::NotFound)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

fn clear_record(
    data: &mut Dataset,
    context: &ContextId,
    user_id: &str,
) -> Result<Reset, Rejection> {
    let record = data
        .record_mut(context, user_id)
        .ok_or(Rejection::NotFound)?;
    *record = record.cleared();
    Ok(Reset {
        user_id: record.user_id.clone(),
        display_name: record.label().to_string(),
    })
}
