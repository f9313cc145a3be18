use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A recorded user action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Activity {
    pub id: String,
    pub user_id: String,
    pub company_id: Option<String>,
    #[serde(rename = "type")]
    pub activity_type: String,
    pub description: String,
    pub timestamp: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NewActivity {
    pub user_id: String,
    pub company_id: Option<String>,
    pub kind: ActivityKind,
    pub description: String,
}

impl NewActivity {
    pub fn new(
        user_id: impl Into<String>,
        company_id: Option<String>,
        kind: ActivityKind,
        description: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            company_id,
            kind,
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ActivityList {
    pub items: Vec<Activity>,
    pub total: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Signup,
    Login,
    Logout,
    PasswordChange,
    PasswordReset,
    ProfileUpdate,
    AccountUpdate,
    MemberInvited,
    MemberRemoved,
    UserDeleted,
    AssetCreated,
    AssetDeleted,
    DiscoveryCreated,
    DiscoveryDeleted,
    ScanCreated,
    SettingsUpdated,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::Signup => "signup",
            ActivityKind::Login => "login",
            ActivityKind::Logout => "logout",
            ActivityKind::PasswordChange => "password_change",
            ActivityKind::PasswordReset => "password_reset",
            ActivityKind::ProfileUpdate => "profile_update",
            ActivityKind::AccountUpdate => "account_update",
            ActivityKind::MemberInvited => "member_invited",
            ActivityKind::MemberRemoved => "member_removed",
            ActivityKind::UserDeleted => "user_deleted",
            ActivityKind::AssetCreated => "asset_created",
            ActivityKind::AssetDeleted => "asset_deleted",
            ActivityKind::DiscoveryCreated => "discovery_created",
            ActivityKind::DiscoveryDeleted => "discovery_deleted",
            ActivityKind::ScanCreated => "scan_created",
            ActivityKind::SettingsUpdated => "settings_updated",
        }
    }
}

impl FromStr for ActivityKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(s.to_string()))
            .map_err(|_| format!("Unknown activity type: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_string_forms_agree_with_serde() {
        for kind in [
            ActivityKind::Login,
            ActivityKind::PasswordChange,
            ActivityKind::DiscoveryCreated,
        ] {
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, kind.as_str());
            assert_eq!(ActivityKind::from_str(kind.as_str()).unwrap(), kind);
        }
        assert!(ActivityKind::from_str("nope").is_err());
    }

    #[test]
    fn activity_serializes_type_field() {
        let activity = Activity {
            id: "a1".into(),
            user_id: "u1".into(),
            company_id: None,
            activity_type: "login".into(),
            description: "User logged in".into(),
            timestamp: chrono::Utc::now().naive_utc(),
        };
        let json = serde_json::to_value(&activity).unwrap();
        assert_eq!(json["type"], "login");
    }
}
