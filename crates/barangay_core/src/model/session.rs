//! Authenticated session passed explicitly into store handles.
//!
//! # Invariants
//! - Store writes are only issued for sessions whose role can write.
//! - A session is immutable once constructed.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Access role assigned to a dashboard user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full access, including user management.
    Admin,
    /// Day-to-day records maintenance.
    Staff,
    /// Read-only access.
    Viewer,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Staff => "staff",
            Self::Viewer => "viewer",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Some(Self::Admin),
            "staff" => Some(Self::Staff),
            "viewer" => Some(Self::Viewer),
            _ => None,
        }
    }
}

/// Credentials scoping every store call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    user_id: Uuid,
    role: Role,
}

impl Session {
    pub fn new(user_id: Uuid, role: Role) -> Self {
        Self { user_id, role }
    }

    /// Session for local tooling that owns the database file.
    pub fn local_admin() -> Self {
        Self::new(Uuid::nil(), Role::Admin)
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn can_write(&self) -> bool {
        matches!(self.role, Role::Admin | Role::Staff)
    }
}

#[cfg(test)]
mod tests {
    use super::{Role, Session};
    use uuid::Uuid;

    #[test]
    fn viewer_cannot_write() {
        assert!(!Session::new(Uuid::new_v4(), Role::Viewer).can_write());
        assert!(Session::new(Uuid::new_v4(), Role::Staff).can_write());
        assert!(Session::local_admin().can_write());
    }

    #[test]
    fn role_parse_is_case_insensitive() {
        assert_eq!(Role::parse(" Staff "), Some(Role::Staff));
        assert_eq!(Role::parse("root"), None);
    }
}
