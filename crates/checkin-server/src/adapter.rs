//! Normalized inbound events and the best-effort parsing done on them.
//!
//! Everything that looks at free text lives here. The ledger only ever sees
//! the structured values produced by these helpers.

use serde::Deserialize;
use serde_json::Value;

use checkin_shared::constants::MIN_ID_DIGITS;
use checkin_shared::{RankPeriod, ScopeInputs};

/// A chat command as delivered by the platform adapter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundEvent {
    #[serde(flatten)]
    pub scope: ScopeInputs,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub is_admin: bool,
    /// OneBot v11 `sender.role` (`owner`, `admin`, `member`).
    #[serde(default)]
    pub sender_role: Option<String>,
    /// User ids mentioned in the message, in message order.
    #[serde(default)]
    pub mentions: Vec<String>,
    /// The command's trailing text.
    #[serde(default)]
    pub text: String,
}

/// Amount and target candidates of a redemption command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedeemArgs {
    /// `0` when no number was found.
    pub amount: i64,
    pub target: Option<String>,
}

impl InboundEvent {
    pub fn user_id(&self) -> &str {
        &self.scope.user_id
    }

    /// Platform admin flag, or a group owner/admin role.
    pub fn is_admin(&self) -> bool {
        self.is_admin
            || self
                .sender_role
                .as_deref()
                .map(|role| matches!(role.to_ascii_lowercase().as_str(), "owner" | "admin"))
                .unwrap_or(false)
    }

    pub fn first_mention(&self) -> Option<&str> {
        self.mentions.iter().map(String::as_str).find(|m| !m.is_empty())
    }

    pub fn numeric_tokens(&self) -> Vec<&str> {
        digit_runs(&self.text)
    }

    /// The smallest number is the amount. A mention is the target; without
    /// one, the first run of at least [`MIN_ID_DIGITS`] digits is.
    ///
    /// The same run can end up as both amount and target. Runs too large for
    /// an `i64` count as `i64::MAX`.
    pub fn redeem_args(&self) -> RedeemArgs {
        let runs = self.numeric_tokens();
        let amount = runs
            .iter()
            .map(|run| run.parse::<i64>().unwrap_or(i64::MAX))
            .min()
            .unwrap_or(0);
        let target = self
            .first_mention()
            .or_else(|| runs.iter().copied().find(|run| run.len() >= MIN_ID_DIGITS))
            .map(String::from);
        RedeemArgs { amount, target }
    }

    /// All digits of the argument joined, if any.
    pub fn numeric_argument(&self) -> Option<String> {
        let digits: String = self.text.chars().filter(char::is_ascii_digit).collect();
        (!digits.is_empty()).then_some(digits)
    }

    pub fn rank_period(&self, week_keyword: &str) -> RankPeriod {
        let keyword = week_keyword.trim().to_lowercase();
        if !keyword.is_empty() && self.text.to_lowercase().contains(&keyword) {
            RankPeriod::Week
        } else {
            RankPeriod::Month
        }
    }
}

/// Maximal runs of ASCII digits in `text`.
pub fn digit_runs(text: &str) -> Vec<&str> {
    text.split(|c: char| !c.is_ascii_digit())
        .filter(|run| !run.is_empty())
        .collect()
}

/// A member leaving a group, normalized from a platform notice.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LeaveNotice {
    pub group_id: String,
    pub user_id: String,
}

impl LeaveNotice {
    /// Normalize a OneBot v11 `group_decrease` style notice.
    ///
    /// `fallback_group` is used when the notice itself carries no group id.
    /// Returns `None` for anything that is not a member-decrease notice.
    pub fn from_onebot(raw: &Value, fallback_group: Option<&str>) -> Option<Self> {
        let notice_type = raw
            .get("notice_type")
            .or_else(|| raw.get("event"))
            .and_then(Value::as_str)
            .unwrap_or_default();
        if !notice_type.contains("decrease") {
            return None;
        }

        let group_id = raw
            .get("group_id")
            .and_then(id_string)
            .or_else(|| fallback_group.map(String::from))
            .filter(|g| !g.is_empty())?;
        let user_id = raw.get("user_id").and_then(id_string).filter(|u| !u.is_empty())?;

        Some(Self { group_id, user_id })
    }
}

/// OneBot ids arrive as numbers or strings.
fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(text: &str, mentions: &[&str]) -> InboundEvent {
        InboundEvent {
            scope: ScopeInputs {
                platform: "qq".into(),
                group_id: Some("500".into()),
                session_id: None,
                user_id: "10001".into(),
            },
            display_name: "alice".into(),
            mentions: mentions.iter().map(|m| m.to_string()).collect(),
            text: text.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_deserialize_flat_event() {
        let e: InboundEvent = serde_json::from_value(json!({
            "platform": "qq", "group_id": "500", "user_id": "1",
            "display_name": "bob", "sender_role": "Owner", "text": "week"
        }))
        .unwrap();
        assert_eq!(e.scope.group_id.as_deref(), Some("500"));
        assert_eq!(e.user_id(), "1");
        assert!(e.is_admin());
        assert!(e.mentions.is_empty());
    }

    #[test]
    fn test_member_role_is_not_admin() {
        let mut e = event("", &[]);
        e.sender_role = Some("member".into());
        assert!(!e.is_admin());
        e.is_admin = true;
        assert!(e.is_admin());
    }

    #[test]
    fn test_digit_runs() {
        assert_eq!(digit_runs("redeem 20 for 123456!7"), ["20", "123456", "7"]);
        assert!(digit_runs("no numbers").is_empty());
    }

    #[test]
    fn test_redeem_args_smallest_amount_long_target() {
        let args = event("123456 20", &[]).redeem_args();
        assert_eq!(
            args,
            RedeemArgs {
                amount: 20,
                target: Some("123456".into()),
            }
        );
    }

    #[test]
    fn test_redeem_args_mention_wins() {
        let args = event("15 99999", &["20002"]).redeem_args();
        assert_eq!(
            args,
            RedeemArgs {
                amount: 15,
                target: Some("20002".into()),
            }
        );
    }

    #[test]
    fn test_redeem_args_single_long_run_is_both() {
        let args = event("123456", &[]).redeem_args();
        assert_eq!(
            args,
            RedeemArgs {
                amount: 123456,
                target: Some("123456".into()),
            }
        );
    }

    #[test]
    fn test_redeem_args_huge_amount_saturates() {
        let args = event("99999999999999999999", &[]).redeem_args();
        assert_eq!(args.amount, i64::MAX);
        let args = event("99999999999999999999 30", &[]).redeem_args();
        assert_eq!(args.amount, 30);
    }

    #[test]
    fn test_redeem_args_without_numbers() {
        let args = event("all of it", &[]).redeem_args();
        assert_eq!(
            args,
            RedeemArgs {
                amount: 0,
                target: None,
            }
        );
    }

    #[test]
    fn test_numeric_argument_joins_digits() {
        assert_eq!(event("qq: 12-34", &[]).numeric_argument().as_deref(), Some("1234"));
        assert_eq!(event("me", &[]).numeric_argument(), None);
    }

    #[test]
    fn test_rank_period_keyword() {
        assert_eq!(event("this Week please", &[]).rank_period("week"), RankPeriod::Week);
        assert_eq!(event("", &[]).rank_period("week"), RankPeriod::Month);
        assert_eq!(event("本周", &[]).rank_period("周"), RankPeriod::Week);
    }

    #[test]
    fn test_leave_notice_from_onebot() {
        let raw = json!({
            "post_type": "notice", "notice_type": "group_decrease",
            "sub_type": "leave", "group_id": 500, "user_id": 20002
        });
        assert_eq!(
            LeaveNotice::from_onebot(&raw, None),
            Some(LeaveNotice {
                group_id: "500".into(),
                user_id: "20002".into(),
            })
        );
    }

    #[test]
    fn test_leave_notice_uses_event_field_and_fallback_group() {
        let raw = json!({ "event": "member_decrease", "user_id": "3" });
        let notice = LeaveNotice::from_onebot(&raw, Some("77")).unwrap();
        assert_eq!(notice.group_id, "77");
    }

    #[test]
    fn test_leave_notice_ignores_other_notices() {
        let raw = json!({
            "post_type": "notice",
            "notice_type": "group_increase",
            "group_id": 1,
            "user_id": 2
        });
        assert_eq!(LeaveNotice::from_onebot(&raw, None), None);
        let raw = json!({ "notice_type": "group_decrease", "group_id": 1 });
        assert_eq!(LeaveNotice::from_onebot(&raw, None), None);
    }
}
