use chrono::Utc;
use khata_core::{Role, Session, UserId};
use khata_store::{TenantStore, User};
use rust_decimal::Decimal;
use tracing::info;

use crate::validate::{validate_email, validate_name};
use crate::{RosterError, RosterResult};

/// Admin-supplied replacement for a member's editable fields.
#[derive(Clone, Debug)]
pub struct MemberUpdate {
    pub name: String,
    pub email: String,
    pub is_active: bool,
}

/// Member management for one organization.
///
/// Every operation checks the session first; ids from other tenants answer
/// `NotFound` because the underlying store cannot see them.
pub struct Roster {
    session: Session,
    store: TenantStore,
}

impl Roster {
    pub fn new(session: Session, store: TenantStore) -> Self {
        Self { session, store }
    }

    /// Admin: create a member account with a zero wallet.
    pub fn add_member(&self, name: &str, email: &str) -> RosterResult<User> {
        self.session.require_admin()?;
        let name = validate_name(name, "member name")?;
        let email = validate_email(email)?;
        let member = User {
            id: UserId::new(),
            org_id: self.store.org(),
            name: name.to_string(),
            email,
            role: Role::Member,
            is_active: true,
            wallet_balance: Decimal::ZERO,
            created_at: Utc::now(),
        };
        self.store
            .with_tx(|tx| tx.insert_user(&member).map_err(RosterError::from))
            .map_err(|err| err.on_conflict("email already exists"))?;
        info!(member = %member.id, "member added");
        Ok(member)
    }

    /// Admin: replace a member's name, email and active flag.
    pub fn update_member(&self, user: UserId, update: &MemberUpdate) -> RosterResult<()> {
        self.session.require_admin()?;
        let name = validate_name(&update.name, "member name")?;
        let email = validate_email(&update.email)?;
        self.store
            .with_tx(|tx| {
                if !tx.update_user_profile(user, name, &email, update.is_active)? {
                    return Err(RosterError::NotFound(format!("member {user}")));
                }
                Ok(())
            })
            .map_err(|err: RosterError| err.on_conflict("email already exists"))?;
        info!(member = %user, active = update.is_active, "member updated");
        Ok(())
    }

    /// Admin: soft-disable; history and the wallet survive.
    pub fn deactivate_member(&self, user: UserId) -> RosterResult<()> {
        self.session.require_admin()?;
        self.store.with_tx::<_, RosterError>(|tx| {
            let current = tx
                .user(user)?
                .ok_or_else(|| RosterError::NotFound(format!("member {user}")))?;
            tx.update_user_profile(user, &current.name, &current.email, false)?;
            Ok(())
        })?;
        info!(member = %user, "member deactivated");
        Ok(())
    }

    /// Admin: physically delete a member.
    ///
    /// Refused while any wallet transaction or meal record references the
    /// account; billing history must stay replayable. Deactivate instead.
    pub fn remove_member(&self, user: UserId) -> RosterResult<()> {
        self.session.require_admin()?;
        self.store.with_tx(|tx| {
            if tx.user(user)?.is_none() {
                return Err(RosterError::NotFound(format!("member {user}")));
            }
            if tx.has_history(user)? {
                return Err(RosterError::Conflict(
                    "member has ledger or meal history; deactivate instead".to_string(),
                ));
            }
            tx.delete_user(user)?;
            Ok(())
        })?;
        info!(member = %user, "member removed");
        Ok(())
    }

    /// Any signed-in user: rename their own account.
    pub fn update_own_name(&self, name: &str) -> RosterResult<()> {
        self.session.require_org()?;
        let name = validate_name(name, "name")?;
        let user = self.session.user_id;
        self.store.with_tx(|tx| {
            let current = tx
                .user(user)?
                .ok_or_else(|| RosterError::NotFound(format!("user {user}")))?;
            tx.update_user_profile(user, name, &current.email, current.is_active)?;
            Ok(())
        })
    }

    /// Admin: every account in the organization, name order.
    pub fn members(&self) -> RosterResult<Vec<User>> {
        self.session.require_admin()?;
        Ok(self.store.users()?)
    }

    /// The caller's own row.
    pub fn profile(&self) -> RosterResult<User> {
        self.session.require_org()?;
        self.store
            .user(self.session.user_id)?
            .ok_or_else(|| RosterError::NotFound("own account".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::register::{register_organization, Registration};
    use chrono::NaiveDate;
    use khata_core::{
        AuthError, MarkedBy, MealCount, MealSlot, MealStatus, RecordId, ScheduleId, TxId, TxKind,
    };
    use khata_store::{Database, MealRecord, MealSchedule, StoreError, WalletTx};
    use rust_decimal_macros::dec;
    use tempfile::{tempdir, TempDir};

    fn setup() -> (TempDir, Database, Roster) {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("khata.db")).unwrap();
        let registered = register_organization(
            &db,
            &Registration {
                organization_name: "Mess".to_string(),
                organization_kind: None,
                admin_name: "Asha".to_string(),
                admin_email: "asha@example.com".to_string(),
            },
        )
        .unwrap();
        let session = Session::new(
            registered.admin.id,
            registered.admin.role,
            Some(registered.organization.id),
        );
        let store = db.tenant(registered.organization.id);
        let roster = Roster::new(session, store);
        (dir, db, roster)
    }

    #[test]
    fn add_and_list_members() {
        let (_dir, _db, roster) = setup();
        let member = roster.add_member("Rafi", "rafi@example.com").unwrap();
        assert_eq!(member.role, Role::Member);
        assert_eq!(member.wallet_balance, Decimal::ZERO);

        let members = roster.members().unwrap();
        assert_eq!(members.len(), 2);
        assert!(members.iter().any(|u| u.id == member.id));
    }

    #[test]
    fn duplicate_member_email_conflicts() {
        let (_dir, _db, roster) = setup();
        roster.add_member("Rafi", "rafi@example.com").unwrap();
        let err = roster.add_member("Other", "rafi@example.com").unwrap_err();
        assert!(matches!(err, RosterError::Conflict(_)));
    }

    #[test]
    fn member_session_cannot_manage_roster() {
        let (_dir, db, roster) = setup();
        let member = roster.add_member("Rafi", "rafi@example.com").unwrap();
        let member_roster = Roster::new(
            Session::new(member.id, member.role, Some(member.org_id)),
            db.tenant(member.org_id),
        );
        let err = member_roster.add_member("X", "x@example.com").unwrap_err();
        assert!(matches!(
            err,
            RosterError::Unauthorized(AuthError::AdminRequired)
        ));
    }

    #[test]
    fn remove_is_refused_once_history_exists() {
        let (_dir, db, roster) = setup();
        let member = roster.add_member("Rafi", "rafi@example.com").unwrap();
        let store = db.tenant(member.org_id);
        store
            .with_tx::<_, StoreError>(|tx| {
                tx.insert_wallet_tx(&WalletTx {
                    seq: 0,
                    id: TxId::new(),
                    org_id: member.org_id,
                    user_id: member.id,
                    kind: TxKind::Credit,
                    amount: dec!(100),
                    description: "deposit".to_string(),
                    entry_date: Utc::now(),
                    balance_after: dec!(100),
                })?;
                Ok(())
            })
            .unwrap();

        let err = roster.remove_member(member.id).unwrap_err();
        assert!(matches!(err, RosterError::Conflict(_)));

        // Deactivation still works and keeps the row.
        roster.deactivate_member(member.id).unwrap();
        let listed = roster.members().unwrap();
        let row = listed.iter().find(|u| u.id == member.id).unwrap();
        assert!(!row.is_active);
    }

    #[test]
    fn remove_without_history_deletes_the_row() {
        let (_dir, _db, roster) = setup();
        let member = roster.add_member("Rafi", "rafi@example.com").unwrap();
        roster.remove_member(member.id).unwrap();
        assert_eq!(roster.members().unwrap().len(), 1);
    }

    #[test]
    fn own_profile_reflects_a_rename() {
        let (_dir, db, roster) = setup();
        let member = roster.add_member("Rafi", "rafi@example.com").unwrap();
        let own = Roster::new(
            Session::new(member.id, member.role, Some(member.org_id)),
            db.tenant(member.org_id),
        );
        own.update_own_name("Rafiul").unwrap();
        let profile = own.profile().unwrap();
        assert_eq!(profile.name, "Rafiul");
        assert_eq!(profile.email, "rafi@example.com");
    }

    #[test]
    fn meal_history_also_blocks_removal() {
        let (_dir, db, roster) = setup();
        let member = roster.add_member("Rafi", "rafi@example.com").unwrap();
        let store = db.tenant(member.org_id);
        let date = NaiveDate::from_ymd_opt(2026, 8, 20).unwrap();
        store
            .with_tx::<_, StoreError>(|tx| {
                let schedule = MealSchedule {
                    id: ScheduleId::new(),
                    org_id: member.org_id,
                    date,
                    slot: MealSlot::Lunch,
                    menu: None,
                    price: None,
                };
                tx.insert_schedule(&schedule)?;
                tx.upsert_record(&MealRecord {
                    id: RecordId::new(),
                    user_id: member.id,
                    schedule_id: schedule.id,
                    date,
                    slot: MealSlot::Lunch,
                    count: MealCount::ONE,
                    status: MealStatus::Confirmed,
                    marked_by: MarkedBy::Admin,
                    updated_at: Utc::now(),
                })?;
                Ok(())
            })
            .unwrap();
        assert!(matches!(
            roster.remove_member(member.id).unwrap_err(),
            RosterError::Conflict(_)
        ));
    }
}
