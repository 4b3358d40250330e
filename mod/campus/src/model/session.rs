use serde::{Deserialize, Serialize};

use campus_core::ServiceError;

use crate::model::Role;

/// A JWT issuance record, used for revocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Session id (UUIDv4, no dashes).
    pub id: String,

    /// User id that owns this session.
    pub user_id: String,

    /// RFC 3339 timestamp when the token was issued.
    pub issued_at: String,

    /// RFC 3339 timestamp when the token expires.
    pub expires_at: String,

    /// Whether this session has been revoked.
    #[serde(default)]
    pub revoked: bool,
}

/// JWT claims payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: user id.
    pub sub: String,

    /// User display name.
    pub name: String,

    /// Role at issuance time. Handlers re-fetch the user where the
    /// current alumni flag matters.
    pub role: Role,

    /// Session id (for revocation).
    pub sid: String,

    /// Issued at (unix timestamp).
    pub iat: i64,

    /// Expiration (unix timestamp).
    pub exp: i64,
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Gate an admin-only handler.
    pub fn require_admin(&self) -> Result<(), ServiceError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ServiceError::PermissionDenied("admin access required".into()))
        }
    }

    /// Gate a student-only handler.
    pub fn require_student(&self) -> Result<(), ServiceError> {
        if self.role == Role::Student {
            Ok(())
        } else {
            Err(ServiceError::PermissionDenied("student access required".into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims_with_role(role: Role) -> Claims {
        Claims {
            sub: "u1".into(),
            name: "Test".into(),
            role,
            sid: "s1".into(),
            iat: 0,
            exp: i64::MAX,
        }
    }

    #[test]
    fn role_gates() {
        let admin = claims_with_role(Role::Admin);
        assert!(admin.require_admin().is_ok());
        assert!(admin.require_student().is_err());

        let student = claims_with_role(Role::Student);
        assert!(student.require_admin().is_err());
        assert!(student.require_student().is_ok());
    }
}
