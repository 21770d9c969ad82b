use serde::{Deserialize, Serialize};

/// Isolation scope key: `{platform}:GLOBAL`, `{platform}:U:{user}` or
/// `{platform}:G:{group}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ContextId(pub String);

impl ContextId {
    pub fn global(platform: &str) -> Self {
        Self(format!("{platform}:GLOBAL"))
    }

    pub fn user(platform: &str, user_id: &str) -> Self {
        Self(format!("{platform}:U:{user_id}"))
    }

    pub fn group(platform: &str, group_key: &str) -> Self {
        Self(format!("{platform}:G:{group_key}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContextId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContextId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Which logical bucket check-in data lives in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageScope {
    #[default]
    Group,
    User,
    Global,
}

/// Who may redeem currency, and for whom.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleMode {
    AdminOnly,
    #[default]
    SelfOrAdmin,
    Anyone,
}

/// The two independent balances of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurrencyKind {
    Points,
    Ingots,
}

impl CurrencyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Points => "points",
            Self::Ingots => "ingots",
        }
    }
}

impl std::fmt::Display for CurrencyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Leaderboard window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankPeriod {
    Week,
    #[default]
    Month,
}

/// A single reward draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    pub kind: CurrencyKind,
    pub amount: u64,
}

/// Platform-side identifiers used to derive a [`ContextId`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ScopeInputs {
    pub platform: String,
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    pub user_id: String,
}

impl ScopeInputs {
    /// Group id, else session id, else `default`.
    fn group_key(&self) -> &str {
        self.group_id
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.session_id.as_deref().filter(|s| !s.is_empty()))
            .unwrap_or("default")
    }

    /// The logical context selected by `scope`.
    pub fn context_id(&self, scope: StorageScope) -> ContextId {
        match scope {
            StorageScope::Global => ContextId::global(&self.platform),
            StorageScope::User => ContextId::user(&self.platform, &self.user_id),
            StorageScope::Group => self.group_context_id(),
        }
    }

    /// The physical group bucket, independent of the configured scope.
    pub fn group_context_id(&self) -> ContextId {
        ContextId::group(&self.platform, self.group_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(group: Option<&str>, session: Option<&str>) -> ScopeInputs {
        ScopeInputs {
            platform: "qq".into(),
            group_id: group.map(String::from),
            session_id: session.map(String::from),
            user_id: "10001".into(),
        }
    }

    #[test]
    fn test_context_ids_per_scope() {
        let i = inputs(Some("777"), Some("s1"));
        assert_eq!(i.context_id(StorageScope::Group).as_str(), "qq:G:777");
        assert_eq!(i.context_id(StorageScope::User).as_str(), "qq:U:10001");
        assert_eq!(i.context_id(StorageScope::Global).as_str(), "qq:GLOBAL");
    }

    #[test]
    fn test_group_context_ignores_scope() {
        let i = inputs(Some("777"), None);
        assert_eq!(i.group_context_id().as_str(), "qq:G:777");
    }

    #[test]
    fn test_group_key_fallbacks() {
        assert_eq!(inputs(None, Some("s1")).group_context_id().as_str(), "qq:G:s1");
        assert_eq!(inputs(Some(""), None).group_context_id().as_str(), "qq:G:default");
    }

    #[test]
    fn test_scope_modes_deserialize_snake_case() {
        let mode: RoleMode = serde_json::from_str("\"admin_only\"").unwrap();
        assert_eq!(mode, RoleMode::AdminOnly);
        let scope: StorageScope = serde_json::from_str("\"global\"").unwrap();
        assert_eq!(scope, StorageScope::Global);
    }
}
