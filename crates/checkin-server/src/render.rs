//! User-facing text built from the operator's templates.

use checkin_shared::{CurrencyKind, RankPeriod, Rejection, Templates};
use checkin_store::UserRecord;

use crate::ledger::{CheckIn, Leaderboard, Redemption};

pub const TRY_AGAIN_LATER: &str = "Something went wrong, please try again later";

/// Substitute `{name}` placeholders.
pub fn fill(template: &str, values: &[(&str, String)]) -> String {
    values.iter().fold(template.to_string(), |text, (name, value)| {
        text.replace(&format!("{{{name}}}"), value)
    })
}

pub fn check_in(t: &Templates, outcome: &CheckIn) -> String {
    let record = &outcome.record;
    let reward = outcome.reward;
    let gain_label = match reward.kind {
        CurrencyKind::Points => &t.label_gain_points,
        CurrencyKind::Ingots => &t.label_gain_ingots,
    };

    [
        format!("{}, ✅ checked in", record.label()),
        t.message_separator.clone(),
        format!("{}{}", t.label_id, record.user_id),
        format!("{}{} days", t.label_days, record.total_days),
        format!("{}{} {}", gain_label, reward.amount, reward.kind.as_str()),
        format!("{}{} points", t.label_total_points, record.points),
        format!("{}{} ingots", t.label_total_ingots, record.ingots),
        t.message_separator.clone(),
    ]
    .join("\n")
}

pub fn redemption(t: &Templates, r: &Redemption) -> String {
    let template = match r.kind {
        CurrencyKind::Points => &t.exchange_points_success_tpl,
        CurrencyKind::Ingots => &t.exchange_ingots_success_tpl,
    };
    fill(
        template,
        &[
            ("amount", r.amount.to_string()),
            (r.kind.as_str(), r.remaining.to_string()),
        ],
    )
}

pub fn assets(t: &Templates, record: &UserRecord) -> String {
    [
        "📊 Check-in assets".to_string(),
        t.message_separator.clone(),
        format!("💎 Points: {}", record.points),
        format!("🪙 Ingots: {}", record.ingots),
        format!("📅 Total: {} days", record.total_days),
        format!("🗓️ This month: {} days", record.month_days),
        format!("📆 This week: {} days", record.week_days),
        t.message_separator.clone(),
    ]
    .join("\n")
}

pub fn leaderboard(board: &Leaderboard) -> String {
    let Leaderboard::Ranked { period, entries } = board else {
        return "No check-in data yet".to_string();
    };
    let title = match period {
        RankPeriod::Week => "Weekly ranking (days checked in)",
        RankPeriod::Month => "Monthly ranking (days checked in)",
    };
    std::iter::once(title.to_string())
        .chain(
            entries
                .iter()
                .map(|e| format!("{}. {} - {} days", e.position, e.display_name, e.days)),
        )
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn reset(label: &str) -> String {
    format!("Check-in data of {label} has been reset")
}

/// Message for a rejected operation; `kind` names the balance involved.
pub fn rejection(reason: Rejection, kind: Option<CurrencyKind>) -> String {
    match (reason, kind) {
        (Rejection::AlreadyCheckedIn, _) => "Already checked in today, see you tomorrow".into(),
        (Rejection::InvalidAmount, _) => "The amount must be a positive integer".into(),
        (Rejection::InsufficientFunds, Some(kind)) => {
            format!("Not enough {} to redeem", kind.as_str())
        }
        (Rejection::InsufficientFunds, None) => "Insufficient balance".into(),
        (Rejection::NotAuthorized, Some(kind)) => {
            format!("Only admins can redeem {}", kind.as_str())
        }
        (Rejection::NotAuthorized, None) => "Only group admins can do this".into(),
        (Rejection::NotFound, _) => "No check-in data found for that member".into(),
    }
}
