//! Seeded fixtures for testing Khata engines end to end.
//!
//! Test-support code only; setup failures panic.

use khata_core::{OrgId, Session};
use khata_roster::{register_organization, Registration, Roster};
use khata_store::{Database, TenantStore, User};
use tempfile::TempDir;

/// A freshly registered organization backed by a temporary database file.
///
/// The temp directory lives as long as the fixture; dropping it deletes the
/// database.
pub struct TestOrg {
    pub db: Database,
    pub org: OrgId,
    pub admin: User,
    _dir: TempDir,
}

impl TestOrg {
    /// Registers "Test Mess" with one admin (`asha@example.com`).
    pub fn new() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let db = Database::open(dir.path().join("khata.db")).expect("open database");
        let registered = register_organization(
            &db,
            &Registration {
                organization_name: "Test Mess".to_string(),
                organization_kind: None,
                admin_name: "Asha".to_string(),
                admin_email: "asha@example.com".to_string(),
            },
        )
        .expect("register organization");
        Self {
            db,
            org: registered.organization.id,
            admin: registered.admin,
            _dir: dir,
        }
    }

    pub fn store(&self) -> TenantStore {
        self.db.tenant(self.org)
    }

    pub fn admin_session(&self) -> Session {
        Session::new(self.admin.id, self.admin.role, Some(self.org))
    }

    pub fn session_for(&self, user: &User) -> Session {
        Session::new(user.id, user.role, Some(user.org_id))
    }

    /// Adds an active member through the roster engine.
    pub fn add_member(&self, name: &str, email: &str) -> User {
        Roster::new(self.admin_session(), self.store())
            .add_member(name, email)
            .expect("add member")
    }
}

impl Default for TestOrg {
    fn default() -> Self {
        Self::new()
    }
}
