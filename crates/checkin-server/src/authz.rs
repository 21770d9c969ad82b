//! Decides which record an operation applies to, and whether it may run.
//!
//! Inputs are already structured: the adapter has parsed mentions and digit
//! runs out of the message before anything here is called.

use checkin_shared::{Rejection, RoleMode};

/// Which bucket a resolved target lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketScope {
    /// The context selected by the configured storage scope.
    Logical,
    /// The physical group bucket, regardless of storage scope.
    Group,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub user_id: String,
    pub scope: BucketScope,
    /// Whether the target is the acting user.
    pub is_actor: bool,
}

impl Target {
    fn actor(actor_id: &str, scope: BucketScope) -> Self {
        Self {
            user_id: actor_id.to_string(),
            scope,
            is_actor: true,
        }
    }

    fn member(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            scope: BucketScope::Group,
            is_actor: false,
        }
    }
}

/// Resolve the record a redemption debits.
///
/// `admin_only` always works on the group bucket. In the other modes
/// non-admins are pinned to their own record and any explicit target is
/// ignored; admins may name someone else, whose record is then looked up in
/// the group bucket.
pub fn resolve_redemption(
    mode: RoleMode,
    actor_id: &str,
    is_admin: bool,
    explicit: Option<&str>,
) -> Result<Target, Rejection> {
    let explicit = explicit.filter(|t| !t.is_empty());

    match mode {
        RoleMode::AdminOnly => {
            if !is_admin {
                return Err(Rejection::NotAuthorized);
            }
            Ok(match explicit {
                Some(target) if target != actor_id => Target::member(target),
                _ => Target::actor(actor_id, BucketScope::Group),
            })
        }
        RoleMode::SelfOrAdmin | RoleMode::Anyone => Ok(match explicit {
            Some(target) if is_admin && target != actor_id => Target::member(target),
            _ => Target::actor(actor_id, BucketScope::Logical),
        }),
    }
}

pub fn require_admin(is_admin: bool) -> Result<(), Rejection> {
    if is_admin {
        Ok(())
    } else {
        Err(Rejection::NotAuthorized)
    }
}

/// Reset target: mention, then the numeric argument, then the actor.
pub fn reset_target(actor_id: &str, mention: Option<&str>, numeric_arg: Option<&str>) -> String {
    mention
        .filter(|m| !m.is_empty())
        .or_else(|| numeric_arg.filter(|d| !d.is_empty() && d.bytes().all(|b| b.is_ascii_digit())))
        .unwrap_or(actor_id)
        .to_string()
}
