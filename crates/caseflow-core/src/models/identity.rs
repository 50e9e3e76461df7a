//! Authenticated user profile as returned by `GET /users/me`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Access role assigned to a user by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Tester,
    Readonly,
    /// Roles added server-side after this client was built
    #[serde(untagged)]
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => "admin",
            Role::Tester => "tester",
            Role::Readonly => "readonly",
            Role::Other(s) => s,
        }
    }
}

/// The signed-in user's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Identity {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_superuser: bool,
    #[serde(default)]
    #[cfg_attr(feature = "ts", ts(type = "string"))]
    pub role: Role,
    #[serde(default)]
    #[cfg_attr(feature = "ts", ts(type = "string | null"))]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    #[cfg_attr(feature = "ts", ts(type = "string | null"))]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}

impl Identity {
    /// Full name when the profile has one, otherwise the e-mail address.
    pub fn display_name(&self) -> &str {
        match self.full_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.email,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.is_superuser || self.role == Role::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_users_me_response() {
        let json = r#"{"id": 7, "email": "a@b.com", "full_name": "Ada Byron", "is_active": true, "is_superuser": false, "role": "tester", "created_at": "2024-03-01T10:00:00Z"}"#;
        let identity: Identity = serde_json::from_str(json).expect("valid profile");

        assert_eq!(identity.id, 7);
        assert_eq!(identity.role, Role::Tester);
        assert_eq!(identity.display_name(), "Ada Byron");
        assert!(identity.created_at.is_some());
        assert!(identity.updated_at.is_none());
        assert!(!identity.is_admin());
    }

    #[test]
    fn test_minimal_profile_uses_defaults() {
        let identity: Identity =
            serde_json::from_str(r#"{"id": 1, "email": "root@example.com"}"#).expect("valid profile");

        assert!(identity.is_active);
        assert_eq!(identity.role, Role::Tester);
        assert_eq!(identity.display_name(), "root@example.com");
    }

    #[test]
    fn test_unknown_role_is_preserved() {
        let identity: Identity =
            serde_json::from_str(r#"{"id": 1, "email": "x@y.z", "role": "auditor"}"#).expect("valid profile");
        assert_eq!(identity.role, Role::Other("auditor".to_string()));
        assert_eq!(identity.role.as_str(), "auditor");
    }

    #[test]
    fn test_superuser_is_admin() {
        let identity: Identity = serde_json::from_str(
            r#"{"id": 1, "email": "x@y.z", "role": "readonly", "is_superuser": true}"#,
        )
        .expect("valid profile");
        assert!(identity.is_admin());
    }

    #[test]
    fn test_blank_full_name_falls_back_to_email() {
        let identity: Identity =
            serde_json::from_str(r#"{"id": 1, "email": "x@y.z", "full_name": "  "}"#).expect("valid profile");
        assert_eq!(identity.display_name(), "x@y.z");
    }
}
