use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use khata_core::{ExpenseId, MealSlot, OrgId, Period, ScheduleId, TxId, UserId};
use rusqlite::{params, Connection, Params, Row, Statement, TransactionBehavior};
use rust_decimal::Decimal;

use crate::db::Database;
use crate::model::{Expense, MealRecord, MealSchedule, Organization, TxWindow, User, WalletTx};
use crate::{StoreError, StoreResult};

const USER_COLS: &str = "id, org_id, name, email, role, is_active, wallet_balance, created_at";
const TX_COLS: &str = "seq, id, org_id, user_id, kind, amount, description, entry_date, balance_after";
const SCHEDULE_COLS: &str = "id, org_id, date, slot, menu, price";
const RECORD_COLS: &str = "id, user_id, schedule_id, date, slot, count, status, marked_by, updated_at";
const EXPENSE_COLS: &str = "id, org_id, date, category, description, amount, created_at";

/// Organization-scoped query surface.
///
/// Constructed once per request via [`Database::tenant`]; every method binds
/// the captured organization id, so a handle for one tenant cannot read or
/// write another tenant's rows.
#[derive(Clone, Debug)]
pub struct TenantStore {
    db: Database,
    org: OrgId,
}

impl TenantStore {
    pub(crate) fn new(db: Database, org: OrgId) -> Self {
        Self { db, org }
    }

    pub fn org(&self) -> OrgId {
        self.org
    }

    pub fn organization(&self) -> StoreResult<Option<Organization>> {
        let conn = self.db.connect()?;
        fetch_optional(
            &conn,
            "SELECT id, name, kind, created_at FROM organizations WHERE id = ?1",
            params![self.org.to_string()],
            row_to_organization,
        )
    }

    pub fn user(&self, id: UserId) -> StoreResult<Option<User>> {
        let conn = self.db.connect()?;
        fetch_user(&conn, self.org, id)
    }

    /// Org-scoped email lookup; other tenants' accounts are invisible here.
    pub fn user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let conn = self.db.connect()?;
        let sql =
            format!("SELECT {USER_COLS} FROM users WHERE email = ?1 AND org_id = ?2");
        fetch_optional(
            &conn,
            &sql,
            params![email, self.org.to_string()],
            row_to_user,
        )
    }

    /// Every account in the organization, name order.
    pub fn users(&self) -> StoreResult<Vec<User>> {
        let conn = self.db.connect()?;
        let sql = format!(
            "SELECT {USER_COLS} FROM users WHERE org_id = ?1
             ORDER BY name COLLATE NOCASE ASC, created_at ASC"
        );
        let mut stmt = conn.prepare(&sql)?;
        collect_rows(&mut stmt, params![self.org.to_string()], row_to_user)
    }

    /// One user's transactions, newest first, optionally windowed.
    pub fn wallet_txs_for_user(
        &self,
        user: UserId,
        window: Option<TxWindow>,
    ) -> StoreResult<Vec<WalletTx>> {
        let conn = self.db.connect()?;
        let sql = format!(
            "SELECT {TX_COLS} FROM wallet_transactions
             WHERE org_id = ?1 AND user_id = ?2
               AND (?3 IS NULL OR entry_date >= ?3)
               AND (?4 IS NULL OR entry_date < ?4)
             ORDER BY entry_date DESC, seq DESC"
        );
        let mut stmt = conn.prepare(&sql)?;
        collect_rows(
            &mut stmt,
            params![
                self.org.to_string(),
                user.to_string(),
                window.map(|w| w.start.to_rfc3339()),
                window.map(|w| w.end_exclusive.to_rfc3339()),
            ],
            row_to_wallet_tx,
        )
    }

    /// All transactions in the window across the organization, applied order.
    pub fn wallet_txs_in(&self, window: TxWindow) -> StoreResult<Vec<WalletTx>> {
        let conn = self.db.connect()?;
        let sql = format!(
            "SELECT {TX_COLS} FROM wallet_transactions
             WHERE org_id = ?1 AND entry_date >= ?2 AND entry_date < ?3
             ORDER BY seq ASC"
        );
        let mut stmt = conn.prepare(&sql)?;
        collect_rows(
            &mut stmt,
            params![
                self.org.to_string(),
                window.start.to_rfc3339(),
                window.end_exclusive.to_rfc3339(),
            ],
            row_to_wallet_tx,
        )
    }

    /// One user's full history in `seq` order, the order snapshots replay in.
    pub fn wallet_txs_applied(&self, user: UserId) -> StoreResult<Vec<WalletTx>> {
        let conn = self.db.connect()?;
        fetch_applied_txs(&conn, self.org, user)
    }

    pub fn expense(&self, id: ExpenseId) -> StoreResult<Option<Expense>> {
        let conn = self.db.connect()?;
        let sql = format!("SELECT {EXPENSE_COLS} FROM expenses WHERE id = ?1 AND org_id = ?2");
        fetch_optional(
            &conn,
            &sql,
            params![id.to_string(), self.org.to_string()],
            row_to_expense,
        )
    }

    /// Expenses dated inside the period, newest first.
    pub fn expenses_in(&self, period: Period) -> StoreResult<Vec<Expense>> {
        let conn = self.db.connect()?;
        let sql = format!(
            "SELECT {EXPENSE_COLS} FROM expenses
             WHERE org_id = ?1 AND date >= ?2 AND date <= ?3
             ORDER BY date DESC, created_at DESC"
        );
        let mut stmt = conn.prepare(&sql)?;
        collect_rows(
            &mut stmt,
            params![
                self.org.to_string(),
                period.start.to_string(),
                period.end.to_string(),
            ],
            row_to_expense,
        )
    }

    pub fn schedule(&self, date: NaiveDate, slot: MealSlot) -> StoreResult<Option<MealSchedule>> {
        let conn = self.db.connect()?;
        fetch_schedule(&conn, self.org, date, slot)
    }

    pub fn schedule_by_id(&self, id: ScheduleId) -> StoreResult<Option<MealSchedule>> {
        let conn = self.db.connect()?;
        fetch_schedule_by_id(&conn, self.org, id)
    }

    pub fn schedules_on(&self, date: NaiveDate) -> StoreResult<Vec<MealSchedule>> {
        let conn = self.db.connect()?;
        let sql = format!(
            "SELECT {SCHEDULE_COLS} FROM meal_schedules
             WHERE org_id = ?1 AND date = ?2 ORDER BY slot ASC"
        );
        let mut stmt = conn.prepare(&sql)?;
        collect_rows(
            &mut stmt,
            params![self.org.to_string(), date.to_string()],
            row_to_schedule,
        )
    }

    /// Meal records dated inside the period, all members.
    pub fn records_in(&self, period: Period) -> StoreResult<Vec<MealRecord>> {
        let conn = self.db.connect()?;
        let sql = record_select(
            "u.org_id = ?1 AND r.date >= ?2 AND r.date <= ?3",
            "ORDER BY r.date ASC, r.slot ASC",
        );
        let mut stmt = conn.prepare(&sql)?;
        collect_rows(
            &mut stmt,
            params![
                self.org.to_string(),
                period.start.to_string(),
                period.end.to_string(),
            ],
            row_to_record,
        )
    }

    /// One member's meal records inside the period, oldest first.
    pub fn records_for_user_in(
        &self,
        user: UserId,
        period: Period,
    ) -> StoreResult<Vec<MealRecord>> {
        let conn = self.db.connect()?;
        let sql = record_select(
            "u.org_id = ?1 AND r.user_id = ?2 AND r.date >= ?3 AND r.date <= ?4",
            "ORDER BY r.date ASC, r.slot ASC",
        );
        let mut stmt = conn.prepare(&sql)?;
        collect_rows(
            &mut stmt,
            params![
                self.org.to_string(),
                user.to_string(),
                period.start.to_string(),
                period.end.to_string(),
            ],
            row_to_record,
        )
    }

    /// Runs `f` inside one immediate transaction; commit on `Ok`, rollback
    /// on any error.
    pub fn with_tx<T, E>(&self, f: impl FnOnce(&TenantTx<'_>) -> Result<T, E>) -> Result<T, E>
    where
        E: From<StoreError>,
    {
        let conn = self.db.connect().map_err(E::from)?;
        self.run_tx(conn, f)
    }

    /// Same as [`TenantStore::with_tx`] but with the widened busy timeout for
    /// the attendance batch, which holds the write lock across many rows.
    pub fn with_batch_tx<T, E>(&self, f: impl FnOnce(&TenantTx<'_>) -> Result<T, E>) -> Result<T, E>
    where
        E: From<StoreError>,
    {
        let conn = self.db.connect_batch().map_err(E::from)?;
        self.run_tx(conn, f)
    }

    fn run_tx<T, E>(
        &self,
        mut conn: Connection,
        f: impl FnOnce(&TenantTx<'_>) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<StoreError>,
    {
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(StoreError::from)
            .map_err(E::from)?;
        let scope = TenantTx { tx, org: self.org };
        let out = f(&scope)?;
        scope.tx.commit().map_err(StoreError::from).map_err(E::from)?;
        Ok(out)
    }
}

/// Write scope handed to [`TenantStore::with_tx`] closures. Dropping without
/// commit rolls everything back.
pub struct TenantTx<'c> {
    tx: rusqlite::Transaction<'c>,
    org: OrgId,
}

impl TenantTx<'_> {
    pub fn org(&self) -> OrgId {
        self.org
    }

    pub fn user(&self, id: UserId) -> StoreResult<Option<User>> {
        fetch_user(&self.tx, self.org, id)
    }

    pub fn wallet_tx(&self, id: TxId) -> StoreResult<Option<WalletTx>> {
        let sql = format!(
            "SELECT {TX_COLS} FROM wallet_transactions WHERE id = ?1 AND org_id = ?2"
        );
        fetch_optional(
            &self.tx,
            &sql,
            params![id.to_string(), self.org.to_string()],
            row_to_wallet_tx,
        )
    }

    pub fn wallet_txs_applied(&self, user: UserId) -> StoreResult<Vec<WalletTx>> {
        fetch_applied_txs(&self.tx, self.org, user)
    }

    pub fn schedule(&self, date: NaiveDate, slot: MealSlot) -> StoreResult<Option<MealSchedule>> {
        fetch_schedule(&self.tx, self.org, date, slot)
    }

    pub fn schedule_by_id(&self, id: ScheduleId) -> StoreResult<Option<MealSchedule>> {
        fetch_schedule_by_id(&self.tx, self.org, id)
    }

    pub fn record_for(
        &self,
        user: UserId,
        schedule: ScheduleId,
    ) -> StoreResult<Option<MealRecord>> {
        let sql = format!(
            "SELECT {RECORD_COLS} FROM meal_records WHERE user_id = ?1 AND schedule_id = ?2"
        );
        fetch_optional(
            &self.tx,
            &sql,
            params![user.to_string(), schedule.to_string()],
            row_to_record,
        )
    }

    pub fn expense(&self, id: ExpenseId) -> StoreResult<Option<Expense>> {
        let sql = format!("SELECT {EXPENSE_COLS} FROM expenses WHERE id = ?1 AND org_id = ?2");
        fetch_optional(
            &self.tx,
            &sql,
            params![id.to_string(), self.org.to_string()],
            row_to_expense,
        )
    }

    /// Whether any ledger or meal row still references the user.
    pub fn has_history(&self, user: UserId) -> StoreResult<bool> {
        let exists: bool = self.tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM wallet_transactions WHERE user_id = ?1)
                 OR EXISTS(SELECT 1 FROM meal_records WHERE user_id = ?1)",
            params![user.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    pub fn insert_user(&self, user: &User) -> StoreResult<()> {
        insert_user_row(&self.tx, user)
    }

    pub fn update_user_profile(
        &self,
        id: UserId,
        name: &str,
        email: &str,
        is_active: bool,
    ) -> StoreResult<bool> {
        let n = self.tx.execute(
            "UPDATE users SET name = ?1, email = ?2, is_active = ?3
             WHERE id = ?4 AND org_id = ?5",
            params![
                name,
                email,
                is_active,
                id.to_string(),
                self.org.to_string()
            ],
        )?;
        Ok(n > 0)
    }

    pub fn set_wallet_balance(&self, id: UserId, balance: Decimal) -> StoreResult<bool> {
        let n = self.tx.execute(
            "UPDATE users SET wallet_balance = ?1 WHERE id = ?2 AND org_id = ?3",
            params![balance.to_string(), id.to_string(), self.org.to_string()],
        )?;
        Ok(n > 0)
    }

    pub fn delete_user(&self, id: UserId) -> StoreResult<bool> {
        let n = self.tx.execute(
            "DELETE FROM users WHERE id = ?1 AND org_id = ?2",
            params![id.to_string(), self.org.to_string()],
        )?;
        Ok(n > 0)
    }

    /// Inserts the row and returns the storage-assigned `seq`.
    pub fn insert_wallet_tx(&self, tx: &WalletTx) -> StoreResult<i64> {
        self.tx.execute(
            "INSERT INTO wallet_transactions
                 (id, org_id, user_id, kind, amount, description, entry_date, balance_after)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                tx.id.to_string(),
                self.org.to_string(),
                tx.user_id.to_string(),
                tx.kind.as_str(),
                tx.amount.to_string(),
                tx.description,
                tx.entry_date.to_rfc3339(),
                tx.balance_after.to_string(),
            ],
        )?;
        Ok(self.tx.last_insert_rowid())
    }

    /// Rewrites the editable fields of one transaction row.
    pub fn update_wallet_tx(&self, tx: &WalletTx) -> StoreResult<bool> {
        let n = self.tx.execute(
            "UPDATE wallet_transactions
             SET amount = ?1, description = ?2, entry_date = ?3, balance_after = ?4
             WHERE id = ?5 AND org_id = ?6",
            params![
                tx.amount.to_string(),
                tx.description,
                tx.entry_date.to_rfc3339(),
                tx.balance_after.to_string(),
                tx.id.to_string(),
                self.org.to_string(),
            ],
        )?;
        Ok(n > 0)
    }

    pub fn set_balance_after(&self, seq: i64, balance_after: Decimal) -> StoreResult<bool> {
        let n = self.tx.execute(
            "UPDATE wallet_transactions SET balance_after = ?1 WHERE seq = ?2 AND org_id = ?3",
            params![balance_after.to_string(), seq, self.org.to_string()],
        )?;
        Ok(n > 0)
    }

    pub fn delete_wallet_tx(&self, id: TxId) -> StoreResult<bool> {
        let n = self.tx.execute(
            "DELETE FROM wallet_transactions WHERE id = ?1 AND org_id = ?2",
            params![id.to_string(), self.org.to_string()],
        )?;
        Ok(n > 0)
    }

    pub fn insert_schedule(&self, schedule: &MealSchedule) -> StoreResult<()> {
        self.tx.execute(
            "INSERT INTO meal_schedules (id, org_id, date, slot, menu, price)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                schedule.id.to_string(),
                self.org.to_string(),
                schedule.date.to_string(),
                schedule.slot.as_str(),
                schedule.menu,
                schedule.price.map(|p| p.to_string()),
            ],
        )?;
        Ok(())
    }

    /// Full-replace upsert keyed on `(user, schedule)`.
    pub fn upsert_record(&self, record: &MealRecord) -> StoreResult<()> {
        self.tx.execute(
            "INSERT INTO meal_records
                 (id, user_id, schedule_id, date, slot, count, status, marked_by, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(user_id, schedule_id) DO UPDATE SET
                 count = excluded.count,
                 status = excluded.status,
                 marked_by = excluded.marked_by,
                 updated_at = excluded.updated_at",
            params![
                record.id.to_string(),
                record.user_id.to_string(),
                record.schedule_id.to_string(),
                record.date.to_string(),
                record.slot.as_str(),
                record.count.to_string(),
                record.status.as_str(),
                record.marked_by.as_str(),
                record.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn insert_expense(&self, expense: &Expense) -> StoreResult<()> {
        self.tx.execute(
            "INSERT INTO expenses (id, org_id, date, category, description, amount, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                expense.id.to_string(),
                self.org.to_string(),
                expense.date.to_string(),
                expense.category,
                expense.description,
                expense.amount.to_string(),
                expense.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn update_expense(&self, expense: &Expense) -> StoreResult<bool> {
        let n = self.tx.execute(
            "UPDATE expenses SET date = ?1, category = ?2, description = ?3, amount = ?4
             WHERE id = ?5 AND org_id = ?6",
            params![
                expense.date.to_string(),
                expense.category,
                expense.description,
                expense.amount.to_string(),
                expense.id.to_string(),
                self.org.to_string(),
            ],
        )?;
        Ok(n > 0)
    }

    pub fn delete_expense(&self, id: ExpenseId) -> StoreResult<bool> {
        let n = self.tx.execute(
            "DELETE FROM expenses WHERE id = ?1 AND org_id = ?2",
            params![id.to_string(), self.org.to_string()],
        )?;
        Ok(n > 0)
    }
}

fn record_select(filter: &str, order: &str) -> String {
    format!(
        "SELECT r.id, r.user_id, r.schedule_id, r.date, r.slot, r.count,
                r.status, r.marked_by, r.updated_at
         FROM meal_records r JOIN users u ON u.id = r.user_id
         WHERE {filter} {order}"
    )
}

fn fetch_user(conn: &Connection, org: OrgId, id: UserId) -> StoreResult<Option<User>> {
    let sql = format!("SELECT {USER_COLS} FROM users WHERE id = ?1 AND org_id = ?2");
    fetch_optional(
        conn,
        &sql,
        params![id.to_string(), org.to_string()],
        row_to_user,
    )
}

pub(crate) fn find_user_by_email(conn: &Connection, email: &str) -> StoreResult<Option<User>> {
    let sql = format!("SELECT {USER_COLS} FROM users WHERE email = ?1");
    fetch_optional(conn, &sql, params![email], row_to_user)
}

fn fetch_schedule(
    conn: &Connection,
    org: OrgId,
    date: NaiveDate,
    slot: MealSlot,
) -> StoreResult<Option<MealSchedule>> {
    let sql = format!(
        "SELECT {SCHEDULE_COLS} FROM meal_schedules
         WHERE org_id = ?1 AND date = ?2 AND slot = ?3"
    );
    fetch_optional(
        conn,
        &sql,
        params![org.to_string(), date.to_string(), slot.as_str()],
        row_to_schedule,
    )
}

fn fetch_schedule_by_id(
    conn: &Connection,
    org: OrgId,
    id: ScheduleId,
) -> StoreResult<Option<MealSchedule>> {
    let sql = format!("SELECT {SCHEDULE_COLS} FROM meal_schedules WHERE id = ?1 AND org_id = ?2");
    fetch_optional(
        conn,
        &sql,
        params![id.to_string(), org.to_string()],
        row_to_schedule,
    )
}

fn fetch_applied_txs(conn: &Connection, org: OrgId, user: UserId) -> StoreResult<Vec<WalletTx>> {
    let sql = format!(
        "SELECT {TX_COLS} FROM wallet_transactions
         WHERE org_id = ?1 AND user_id = ?2 ORDER BY seq ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    collect_rows(
        &mut stmt,
        params![org.to_string(), user.to_string()],
        row_to_wallet_tx,
    )
}

pub(crate) fn insert_user_row(conn: &Connection, user: &User) -> StoreResult<()> {
    conn.execute(
        "INSERT INTO users (id, org_id, name, email, role, is_active, wallet_balance, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            user.id.to_string(),
            user.org_id.to_string(),
            user.name,
            user.email,
            user.role.as_str(),
            user.is_active,
            user.wallet_balance.to_string(),
            user.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

fn collect_rows<T>(
    stmt: &mut Statement<'_>,
    params: impl Params,
    map: fn(&Row<'_>) -> StoreResult<T>,
) -> StoreResult<Vec<T>> {
    let mut rows = stmt.query(params)?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        out.push(map(row)?);
    }
    Ok(out)
}

fn fetch_optional<T>(
    conn: &Connection,
    sql: &str,
    params: impl Params,
    map: fn(&Row<'_>) -> StoreResult<T>,
) -> StoreResult<Option<T>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params)?;
    match rows.next()? {
        Some(row) => Ok(Some(map(row)?)),
        None => Ok(None),
    }
}

fn parse_field<T>(raw: &str, what: &str) -> StoreResult<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    raw.parse()
        .map_err(|err| StoreError::Serialization(format!("invalid {what} {raw}: {err}")))
}

fn row_to_organization(row: &Row<'_>) -> StoreResult<Organization> {
    let id: String = row.get(0)?;
    let name: String = row.get(1)?;
    let kind: String = row.get(2)?;
    let created_at: String = row.get(3)?;
    Ok(Organization {
        id: parse_field(&id, "organization id")?,
        name,
        kind,
        created_at: parse_field(&created_at, "timestamp")?,
    })
}

fn row_to_user(row: &Row<'_>) -> StoreResult<User> {
    let id: String = row.get(0)?;
    let org_id: String = row.get(1)?;
    let name: String = row.get(2)?;
    let email: String = row.get(3)?;
    let role: String = row.get(4)?;
    let is_active: bool = row.get(5)?;
    let wallet_balance: String = row.get(6)?;
    let created_at: String = row.get(7)?;
    Ok(User {
        id: parse_field(&id, "user id")?,
        org_id: parse_field(&org_id, "organization id")?,
        name,
        email,
        role: parse_field(&role, "role")?,
        is_active,
        wallet_balance: parse_field(&wallet_balance, "decimal")?,
        created_at: parse_field(&created_at, "timestamp")?,
    })
}

fn row_to_wallet_tx(row: &Row<'_>) -> StoreResult<WalletTx> {
    let seq: i64 = row.get(0)?;
    let id: String = row.get(1)?;
    let org_id: String = row.get(2)?;
    let user_id: String = row.get(3)?;
    let kind: String = row.get(4)?;
    let amount: String = row.get(5)?;
    let description: String = row.get(6)?;
    let entry_date: String = row.get(7)?;
    let balance_after: String = row.get(8)?;
    Ok(WalletTx {
        seq,
        id: parse_field(&id, "transaction id")?,
        org_id: parse_field(&org_id, "organization id")?,
        user_id: parse_field(&user_id, "user id")?,
        kind: parse_field(&kind, "transaction kind")?,
        amount: parse_field(&amount, "decimal")?,
        description,
        entry_date: parse_field(&entry_date, "timestamp")?,
        balance_after: parse_field(&balance_after, "decimal")?,
    })
}

fn row_to_schedule(row: &Row<'_>) -> StoreResult<MealSchedule> {
    let id: String = row.get(0)?;
    let org_id: String = row.get(1)?;
    let date: String = row.get(2)?;
    let slot: String = row.get(3)?;
    let menu: Option<String> = row.get(4)?;
    let price: Option<String> = row.get(5)?;
    Ok(MealSchedule {
        id: parse_field(&id, "schedule id")?,
        org_id: parse_field(&org_id, "organization id")?,
        date: parse_field(&date, "date")?,
        slot: parse_field(&slot, "meal slot")?,
        menu,
        price: price.as_deref().map(|p| parse_field(p, "decimal")).transpose()?,
    })
}

fn row_to_record(row: &Row<'_>) -> StoreResult<MealRecord> {
    let id: String = row.get(0)?;
    let user_id: String = row.get(1)?;
    let schedule_id: String = row.get(2)?;
    let date: String = row.get(3)?;
    let slot: String = row.get(4)?;
    let count: String = row.get(5)?;
    let status: String = row.get(6)?;
    let marked_by: String = row.get(7)?;
    let updated_at: String = row.get(8)?;
    Ok(MealRecord {
        id: parse_field(&id, "record id")?,
        user_id: parse_field(&user_id, "user id")?,
        schedule_id: parse_field(&schedule_id, "schedule id")?,
        date: parse_field(&date, "date")?,
        slot: parse_field(&slot, "meal slot")?,
        count: parse_field(&count, "meal count")?,
        status: parse_field(&status, "meal status")?,
        marked_by: parse_field(&marked_by, "marker")?,
        updated_at: parse_field(&updated_at, "timestamp")?,
    })
}

fn row_to_expense(row: &Row<'_>) -> StoreResult<Expense> {
    let id: String = row.get(0)?;
    let org_id: String = row.get(1)?;
    let date: String = row.get(2)?;
    let category: String = row.get(3)?;
    let description: String = row.get(4)?;
    let amount: String = row.get(5)?;
    let created_at: String = row.get(6)?;
    Ok(Expense {
        id: parse_field(&id, "expense id")?,
        org_id: parse_field(&org_id, "organization id")?,
        date: parse_field(&date, "date")?,
        category,
        description,
        amount: parse_field(&amount, "decimal")?,
        created_at: parse_field(&created_at, "timestamp")?,
    })
}
