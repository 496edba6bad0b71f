use crate::{OrgId, Role, UserId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Authorization failures raised before any storage access.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum AuthError {
    #[error("session is not bound to an organization")]
    NoOrganization,
    #[error("operation requires admin privileges")]
    AdminRequired,
}

pub type AuthResult<T> = Result<T, AuthError>;

/// An authenticated caller, produced by the auth collaborator.
///
/// The engines never look up the caller themselves; they trust this token
/// and gate on it before touching storage. `organization_id` is `None` for
/// accounts that were never attached to a tenant, and every tenant-scoped
/// operation rejects such sessions up front.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: UserId,
    pub role: Role,
    pub organization_id: Option<OrgId>,
}

impl Session {
    pub fn new(user_id: UserId, role: Role, organization_id: Option<OrgId>) -> Self {
        Self { user_id, role, organization_id }
    }

    /// The caller's organization, or a rejection for org-less sessions.
    pub fn require_org(&self) -> AuthResult<OrgId> {
        self.organization_id.ok_or(AuthError::NoOrganization)
    }

    /// The caller's organization, additionally requiring an admin role.
    pub fn require_admin(&self) -> AuthResult<OrgId> {
        let org = self.require_org()?;
        if self.role.is_admin() {
            Ok(org)
        } else {
            Err(AuthError::AdminRequired)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_sessions_fail_admin_gate() {
        let session = Session::new(UserId::new(), Role::Member, Some(OrgId::new()));
        assert!(session.require_org().is_ok());
        assert_eq!(session.require_admin(), Err(AuthError::AdminRequired));
    }

    #[test]
    fn orgless_sessions_fail_both_gates() {
        let session = Session::new(UserId::new(), Role::Admin, None);
        assert_eq!(session.require_org(), Err(AuthError::NoOrganization));
        assert_eq!(session.require_admin(), Err(AuthError::NoOrganization));
    }
}
