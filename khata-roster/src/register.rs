use chrono::Utc;
use khata_core::{OrgId, Role, Session, UserId};
use khata_store::{Database, Organization, User};
use rust_decimal::Decimal;
use tracing::info;

use crate::validate::{validate_email, validate_name};
use crate::{RosterError, RosterResult};

const ORGANIZATION_KINDS: [&str; 3] = ["mess", "hostel", "restaurant"];
const DEFAULT_KIND: &str = "mess";

/// Input for creating a new tenant with its first admin.
#[derive(Clone, Debug)]
pub struct Registration {
    pub organization_name: String,
    /// One of `mess`, `hostel`, `restaurant`; empty picks the default.
    pub organization_kind: Option<String>,
    pub admin_name: String,
    pub admin_email: String,
}

/// What registration created.
#[derive(Clone, Debug)]
pub struct Registered {
    pub organization: Organization,
    pub admin: User,
}

/// Creates the organization and its first admin in one transaction.
///
/// A duplicate admin email answers `Conflict` whether it is caught by the
/// pre-check or by the unique index under a racing registration.
pub fn register_organization(db: &Database, reg: &Registration) -> RosterResult<Registered> {
    let org_name = validate_name(&reg.organization_name, "organization name")?;
    let admin_name = validate_name(&reg.admin_name, "admin name")?;
    let email = validate_email(&reg.admin_email)?;
    let kind = match reg.organization_kind.as_deref().map(str::trim) {
        None | Some("") => DEFAULT_KIND.to_string(),
        Some(k) if ORGANIZATION_KINDS.contains(&k) => k.to_string(),
        Some(other) => {
            return Err(RosterError::Invalid(format!(
                "unknown organization kind: {other}"
            )))
        }
    };

    let organization = Organization {
        id: OrgId::new(),
        name: org_name.to_string(),
        kind,
        created_at: Utc::now(),
    };
    let admin = User {
        id: UserId::new(),
        org_id: organization.id,
        name: admin_name.to_string(),
        email,
        role: Role::Admin,
        is_active: true,
        wallet_balance: Decimal::ZERO,
        created_at: Utc::now(),
    };

    db.with_global_tx(|tx| {
        if tx.user_by_email(&admin.email)?.is_some() {
            return Err(RosterError::Conflict("email already registered".to_string()));
        }
        tx.insert_organization(&organization)?;
        tx.insert_user(&admin)?;
        Ok(())
    })
    .map_err(|err: RosterError| err.on_conflict("email already registered"))?;

    info!(org = %organization.id, admin = %admin.id, "organization registered");
    Ok(Registered { organization, admin })
}

/// Builds a session for the account behind `email`.
///
/// Stands in for the credential layer, which is out of scope here; disabled
/// accounts are refused the same way missing ones are.
pub fn session_for_email(db: &Database, email: &str) -> RosterResult<(Session, User)> {
    let user = db
        .user_by_email(email.trim())?
        .filter(|user| user.is_active)
        .ok_or_else(|| RosterError::NotFound(format!("no active account for {email}")))?;
    let session = Session::new(user.id, user.role, Some(user.org_id));
    Ok((session, user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn registration(email: &str) -> Registration {
        Registration {
            organization_name: "Green Hostel Mess".to_string(),
            organization_kind: None,
            admin_name: "Asha".to_string(),
            admin_email: email.to_string(),
        }
    }

    #[test]
    fn registers_org_with_admin() {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("khata.db")).unwrap();
        let registered = register_organization(&db, &registration("asha@example.com")).unwrap();
        assert_eq!(registered.organization.kind, "mess");
        assert_eq!(registered.admin.role, Role::Admin);
        assert_eq!(registered.admin.org_id, registered.organization.id);

        let (session, user) = session_for_email(&db, "asha@example.com").unwrap();
        assert_eq!(session.user_id, user.id);
        assert_eq!(session.organization_id, Some(registered.organization.id));
    }

    #[test]
    fn second_registration_with_same_email_conflicts() {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("khata.db")).unwrap();
        register_organization(&db, &registration("asha@example.com")).unwrap();
        let err = register_organization(&db, &registration("asha@example.com")).unwrap_err();
        assert!(matches!(err, RosterError::Conflict(_)));
    }

    #[test]
    fn unknown_kind_is_invalid() {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("khata.db")).unwrap();
        let mut reg = registration("asha@example.com");
        reg.organization_kind = Some("food-truck".to_string());
        assert!(matches!(
            register_organization(&db, &reg),
            Err(RosterError::Invalid(_))
        ));
    }
}
