//! Ledger settings as edited by operators.
//!
//! The document is flat JSON; every key is optional and falls back to its
//! default, so an empty object is a valid settings file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_INGOT_MAX, DEFAULT_INGOT_MIN, DEFAULT_MAX_RANK_LIST_SIZE, DEFAULT_POINTS_MAX,
    DEFAULT_POINTS_MIN, DEFAULT_POINTS_PROB, DEFAULT_WEEK_KEYWORD,
};
use crate::error::SettingsError;
use crate::reward::RewardConfig;
use crate::types::{RoleMode, StorageScope};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerSettings {
    pub storage_scope: StorageScope,
    pub reward_points_prob: f64,
    pub reward_points_min: u64,
    pub reward_points_max: u64,
    pub reward_ingot_min: u64,
    pub reward_ingot_max: u64,
    pub exchange_roles: RoleMode,
    pub max_rank_list_size: usize,
    pub rank_week_keyword: String,
    #[serde(flatten)]
    pub templates: Templates,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            storage_scope: StorageScope::Group,
            reward_points_prob: DEFAULT_POINTS_PROB,
            reward_points_min: DEFAULT_POINTS_MIN,
            reward_points_max: DEFAULT_POINTS_MAX,
            reward_ingot_min: DEFAULT_INGOT_MIN,
            reward_ingot_max: DEFAULT_INGOT_MAX,
            exchange_roles: RoleMode::SelfOrAdmin,
            max_rank_list_size: DEFAULT_MAX_RANK_LIST_SIZE,
            rank_week_keyword: DEFAULT_WEEK_KEYWORD.to_string(),
            templates: Templates::default(),
        }
    }
}

impl LedgerSettings {
    pub fn reward(&self) -> RewardConfig {
        RewardConfig {
            points_prob: self.reward_points_prob,
            points_min: self.reward_points_min,
            points_max: self.reward_points_max,
            ingot_min: self.reward_ingot_min,
            ingot_max: self.reward_ingot_max,
        }
    }

    /// Leaderboard length, never below one.
    pub fn rank_limit(&self) -> usize {
        self.max_rank_list_size.max(1)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        self.reward().validate()?;
        if self.rank_week_keyword.trim().is_empty() {
            return Err(SettingsError::EmptyKeyword);
        }
        Ok(())
    }

    /// Parse and validate a settings file.
    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let raw = std::fs::read_to_string(path)?;
        let settings: Self = serde_json::from_str(&raw)?;
        settings.validate()?;
        Ok(settings)
    }
}

/// Presentation strings handed through to the rendering layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Templates {
    pub message_separator: String,
    pub label_id: String,
    pub label_days: String,
    pub label_gain_points: String,
    pub label_gain_ingots: String,
    pub label_total_points: String,
    pub label_total_ingots: String,
    /// Placeholders: `{amount}`, `{points}`
    pub exchange_points_success_tpl: String,
    /// Placeholders: `{amount}`, `{ingots}`
    pub exchange_ingots_success_tpl: String,
}

impl Default for Templates {
    fn default() -> Self {
        Self {
            message_separator: "-------------------------".to_string(),
            label_id: "● ID: ".to_string(),
            label_days: "● Days checked in: ".to_string(),
            label_gain_points: "● Points earned: ".to_string(),
            label_gain_ingots: "● Ingots earned: ".to_string(),
            label_total_points: "● Points: ".to_string(),
            label_total_ingots: "● Ingots: ".to_string(),
            exchange_points_success_tpl: "Redeemed {amount} points, {points} points left"
                .to_string(),
            exchange_ingots_success_tpl: "Redeemed {amount} ingots, {ingots} ingots left"
                .to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_object_yields_defaults() {
        let s: LedgerSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(s, LedgerSettings::default());
        assert_eq!(s.reward(), RewardConfig::default());
    }

    #[test]
    fn test_flat_keys_override_defaults() {
        let s: LedgerSettings = serde_json::from_str(
            r#"{"storage_scope":"user","exchange_roles":"admin_only",
                "reward_points_min":1,"max_rank_list_size":0,
                "message_separator":"==="}"#,
        )
        .unwrap();
        assert_eq!(s.storage_scope, StorageScope::User);
        assert_eq!(s.exchange_roles, RoleMode::AdminOnly);
        assert_eq!(s.reward_points_min, 1);
        assert_eq!(s.rank_limit(), 1);
        assert_eq!(s.templates.message_separator, "===");
        assert_eq!(s.templates.label_id, Templates::default().label_id);
    }

    #[test]
    fn test_from_file_validates() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"reward_points_min":60}}"#).unwrap();
        assert!(matches!(
            LedgerSettings::from_file(file.path()),
            Err(SettingsError::EmptyRange { .. })
        ));
    }

    #[test]
    fn test_from_file_reports_parse_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            LedgerSettings::from_file(file.path()),
            Err(SettingsError::Parse(_))
        ));
    }
}
