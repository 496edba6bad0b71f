use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use khata_core::OrgId;
use rusqlite::{params, Connection, TransactionBehavior};

use crate::model::{Organization, User};
use crate::tenant::{self, TenantStore};
use crate::{StoreError, StoreResult};

/// Busy timeout for ordinary single-row operations.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);
/// Widened busy timeout for the attendance batch, which holds its write
/// transaction across many statements.
pub const DEFAULT_BATCH_BUSY_TIMEOUT: Duration = Duration::from_secs(30);

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS organizations (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    kind TEXT NOT NULL,
    created_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    org_id TEXT NOT NULL REFERENCES organizations(id),
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    role TEXT NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 1,
    wallet_balance TEXT NOT NULL,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS users_idx_org ON users(org_id);
CREATE TABLE IF NOT EXISTS wallet_transactions (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    org_id TEXT NOT NULL REFERENCES organizations(id),
    user_id TEXT NOT NULL REFERENCES users(id),
    kind TEXT NOT NULL,
    amount TEXT NOT NULL,
    description TEXT NOT NULL,
    entry_date TEXT NOT NULL,
    balance_after TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS wallet_tx_idx_user_date
    ON wallet_transactions(user_id, entry_date);
CREATE INDEX IF NOT EXISTS wallet_tx_idx_org_date
    ON wallet_transactions(org_id, entry_date);
CREATE TABLE IF NOT EXISTS meal_schedules (
    id TEXT PRIMARY KEY,
    org_id TEXT NOT NULL REFERENCES organizations(id),
    date TEXT NOT NULL,
    slot TEXT NOT NULL,
    menu TEXT,
    price TEXT
);
CREATE UNIQUE INDEX IF NOT EXISTS meal_schedules_idx_org_date_slot
    ON meal_schedules(org_id, date, slot);
CREATE TABLE IF NOT EXISTS meal_records (
    id TEXT NOT NULL UNIQUE,
    user_id TEXT NOT NULL REFERENCES users(id),
    schedule_id TEXT NOT NULL REFERENCES meal_schedules(id),
    date TEXT NOT NULL,
    slot TEXT NOT NULL,
    count TEXT NOT NULL,
    status TEXT NOT NULL,
    marked_by TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    PRIMARY KEY (user_id, schedule_id)
);
CREATE INDEX IF NOT EXISTS meal_records_idx_date ON meal_records(date, status);
CREATE TABLE IF NOT EXISTS expenses (
    id TEXT PRIMARY KEY,
    org_id TEXT NOT NULL REFERENCES organizations(id),
    date TEXT NOT NULL,
    category TEXT NOT NULL,
    description TEXT NOT NULL,
    amount TEXT NOT NULL,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS expenses_idx_org_date ON expenses(org_id, date);
"#;

/// Handle on the SQLite file.
///
/// Connections are opened per operation, the approach that keeps WAL readers
/// and the single writer from ever sharing a connection. Cloning is cheap;
/// clones point at the same file.
#[derive(Clone, Debug)]
pub struct Database {
    path: PathBuf,
    busy_timeout: Duration,
    batch_busy_timeout: Duration,
}

impl Database {
    /// Opens the database, creating the file and schema when missing.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let db = Self {
            path: path.into(),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
            batch_busy_timeout: DEFAULT_BATCH_BUSY_TIMEOUT,
        };
        db.initialize_schema()?;
        Ok(db)
    }

    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub fn with_batch_busy_timeout(mut self, timeout: Duration) -> Self {
        self.batch_busy_timeout = timeout;
        self
    }

    /// The organization-scoped query surface for one tenant.
    pub fn tenant(&self, org: OrgId) -> TenantStore {
        TenantStore::new(self.clone(), org)
    }

    fn initialize_schema(&self) -> StoreResult<()> {
        let conn = self.connect()?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    pub(crate) fn connect(&self) -> StoreResult<Connection> {
        self.connect_with(self.busy_timeout)
    }

    pub(crate) fn connect_batch(&self) -> StoreResult<Connection> {
        self.connect_with(self.batch_busy_timeout)
    }

    fn connect_with(&self, timeout: Duration) -> StoreResult<Connection> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(&self.path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL; PRAGMA foreign_keys = ON;",
        )?;
        conn.busy_timeout(timeout)?;
        Ok(conn)
    }

    /// Cross-tenant lookup used by the auth collaborator to build sessions.
    /// Emails are globally unique, so this is the one read that may not be
    /// organization-filtered.
    pub fn user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let conn = self.connect()?;
        tenant::find_user_by_email(&conn, email)
    }

    /// Runs `f` inside one immediate transaction without tenant scoping.
    /// Only registration, which creates the tenant itself, should need this.
    pub fn with_global_tx<T, E>(
        &self,
        f: impl FnOnce(&GlobalTx<'_>) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<StoreError>,
    {
        let mut conn = self.connect().map_err(E::from)?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(StoreError::from)
            .map_err(E::from)?;
        let scope = GlobalTx { tx };
        let out = f(&scope)?;
        scope.tx.commit().map_err(StoreError::from).map_err(E::from)?;
        Ok(out)
    }
}

/// Write scope for the pre-tenant registration path.
pub struct GlobalTx<'c> {
    tx: rusqlite::Transaction<'c>,
}

impl GlobalTx<'_> {
    pub fn insert_organization(&self, org: &Organization) -> StoreResult<()> {
        self.tx.execute(
            "INSERT INTO organizations (id, name, kind, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                org.id.to_string(),
                org.name,
                org.kind,
                org.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn insert_user(&self, user: &User) -> StoreResult<()> {
        tenant::insert_user_row(&self.tx, user)
    }

    pub fn user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        tenant::find_user_by_email(&self.tx, email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use khata_core::{Role, UserId};
    use rust_decimal::Decimal;
    use tempfile::tempdir;

    fn sample_user(org: OrgId, email: &str) -> User {
        User {
            id: UserId::new(),
            org_id: org,
            name: "Asha".to_string(),
            email: email.to_string(),
            role: Role::Admin,
            is_active: true,
            wallet_balance: Decimal::ZERO,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn registration_and_session_lookup() {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("khata.db")).unwrap();
        let org = OrgId::new();
        db.with_global_tx::<_, StoreError>(|tx| {
            tx.insert_organization(&Organization {
                id: org,
                name: "Green Hostel Mess".to_string(),
                kind: "mess".to_string(),
                created_at: Utc::now(),
            })?;
            tx.insert_user(&sample_user(org, "asha@example.com"))?;
            Ok(())
        })
        .unwrap();

        let found = db.user_by_email("asha@example.com").unwrap().unwrap();
        assert_eq!(found.org_id, org);
        assert_eq!(found.role, Role::Admin);
        assert!(db.user_by_email("nobody@example.com").unwrap().is_none());
    }

    #[test]
    fn duplicate_email_maps_to_constraint() {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("khata.db")).unwrap();
        let org = OrgId::new();
        db.with_global_tx::<_, StoreError>(|tx| {
            tx.insert_organization(&Organization {
                id: org,
                name: "Mess".to_string(),
                kind: "mess".to_string(),
                created_at: Utc::now(),
            })?;
            tx.insert_user(&sample_user(org, "dup@example.com"))?;
            Ok(())
        })
        .unwrap();

        let err = db
            .with_global_tx::<_, StoreError>(|tx| {
                tx.insert_user(&sample_user(org, "dup@example.com"))?;
                Ok(())
            })
            .unwrap_err();
        assert!(matches!(err, StoreError::Constraint(_)));
    }

    #[test]
    fn failed_global_tx_rolls_back() {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("khata.db")).unwrap();
        let org = OrgId::new();
        let result: Result<(), StoreError> = db.with_global_tx(|tx| {
            tx.insert_organization(&Organization {
                id: org,
                name: "Mess".to_string(),
                kind: "mess".to_string(),
                created_at: Utc::now(),
            })?;
            tx.insert_user(&sample_user(org, "gone@example.com"))?;
            Err(StoreError::Storage("forced failure".to_string()))
        });
        assert!(result.is_err());
        assert!(db.user_by_email("gone@example.com").unwrap().is_none());
    }
}
