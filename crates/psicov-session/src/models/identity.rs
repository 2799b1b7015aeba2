//! Signed-in principal as reported by the identity provider

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role assigned to a principal by the identity provider.
///
/// The role is immutable for the lifetime of a session and decides which
/// dashboard the application routes the principal to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Patient,
    Therapist,
}

impl UserRole {
    /// Dashboard entry point for this role
    pub fn dashboard_path(&self) -> &'static str {
        match self {
            UserRole::Patient => "/patient-dashboard",
            UserRole::Therapist => "/therapist-dashboard",
        }
    }
}

/// The signed-in principal.
///
/// Created by the identity provider on sign-in, read-only to this crate,
/// discarded on sign-out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

impl Identity {
    /// Human-readable name: "first last" when available, the email otherwise
    pub fn display_name(&self) -> String {
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(first), None) => first.to_string(),
            (None, Some(last)) => last.to_string(),
            (None, None) => self.email.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(first: Option<&str>, last: Option<&str>) -> Identity {
        Identity {
            id: Uuid::new_v4(),
            email: "maria@example.com".to_string(),
            first_name: first.map(String::from),
            last_name: last.map(String::from),
            role: UserRole::Patient,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_role_serde_snake_case() {
        assert_eq!(
            serde_json::to_string(&UserRole::Therapist).unwrap(),
            "\"therapist\""
        );
        let role: UserRole = serde_json::from_str("\"patient\"").unwrap();
        assert_eq!(role, UserRole::Patient);
    }

    #[test]
    fn test_dashboard_path_by_role() {
        assert_eq!(UserRole::Patient.dashboard_path(), "/patient-dashboard");
        assert_eq!(UserRole::Therapist.dashboard_path(), "/therapist-dashboard");
    }

    #[test]
    fn test_display_name_full() {
        assert_eq!(
            identity(Some("Maria"), Some("Rossi")).display_name(),
            "Maria Rossi"
        );
    }

    #[test]
    fn test_display_name_partial() {
        assert_eq!(identity(Some("Maria"), None).display_name(), "Maria");
        assert_eq!(identity(None, Some("Rossi")).display_name(), "Rossi");
    }

    #[test]
    fn test_display_name_falls_back_to_email() {
        assert_eq!(identity(None, None).display_name(), "maria@example.com");
    }

    #[test]
    fn test_identity_deserialization_without_names() {
        let json = r#"{
            "id": "7f5f1a5e-5b2a-4c8e-9d15-3a2b1c0d9e8f",
            "email": "maria@example.com",
            "role": "therapist",
            "created_at": "2025-03-01T10:00:00Z"
        }"#;

        let identity: Identity = serde_json::from_str(json).unwrap();
        assert_eq!(identity.role, UserRole::Therapist);
        assert!(identity.first_name.is_none());
        assert!(identity.last_name.is_none());
    }
}
