use chrono::{DateTime, NaiveDate, Utc};
use khata_core::{
    ExpenseId, MarkedBy, MealCount, MealSlot, MealStatus, OrgId, Period, RecordId, Role,
    ScheduleId, TxId, TxKind, UserId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A tenant. Every other row carries or joins to its id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: OrgId,
    pub name: String,
    pub kind: String,
    pub created_at: DateTime<Utc>,
}

/// A member or admin account inside one organization.
///
/// `wallet_balance` is a denormalized running total owned by the ledger
/// engine; the signed sum of the user's wallet transactions must always
/// equal it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub org_id: OrgId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
    pub wallet_balance: Decimal,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Whether this user participates in billing views and settlement.
    pub fn is_billable(&self) -> bool {
        self.is_active && self.role.is_billable()
    }
}

/// One signed wallet movement.
///
/// `seq` is assigned by storage on insert and fixes the chronological
/// application order; `entry_date` is the economically relevant instant and
/// may be backdated. `balance_after` snapshots the owner's balance right
/// after this row applied in `seq` order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WalletTx {
    pub seq: i64,
    pub id: TxId,
    pub org_id: OrgId,
    pub user_id: UserId,
    pub kind: TxKind,
    pub amount: Decimal,
    pub description: String,
    pub entry_date: DateTime<Utc>,
    pub balance_after: Decimal,
}

impl WalletTx {
    /// The amount with the kind's sign applied.
    pub fn signed_amount(&self) -> Decimal {
        self.kind.signed(self.amount)
    }
}

/// One served meal slot on one day, unique per `(org, date, slot)`.
///
/// `price` is a legacy column retained for imported data; billing never
/// reads it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MealSchedule {
    pub id: ScheduleId,
    pub org_id: OrgId,
    pub date: NaiveDate,
    pub slot: MealSlot,
    pub menu: Option<String>,
    pub price: Option<Decimal>,
}

/// One user's participation in one schedule, unique per `(user, schedule)`.
///
/// `date` and `slot` are denormalized from the schedule so period queries
/// never need the join.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MealRecord {
    pub id: RecordId,
    pub user_id: UserId,
    pub schedule_id: ScheduleId,
    pub date: NaiveDate,
    pub slot: MealSlot,
    pub count: MealCount,
    pub status: MealStatus,
    pub marked_by: MarkedBy,
    pub updated_at: DateTime<Utc>,
}

impl MealRecord {
    /// Whether this record contributes meal units to billing.
    pub fn is_billable(&self) -> bool {
        self.status == MealStatus::Confirmed && !self.count.is_zero()
    }
}

/// A shared expense; the meal-rate numerator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,
    pub org_id: OrgId,
    pub date: NaiveDate,
    pub category: String,
    pub description: String,
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Half-open instant window `[start, end_exclusive)` for wallet queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TxWindow {
    pub start: DateTime<Utc>,
    pub end_exclusive: DateTime<Utc>,
}

impl From<Period> for TxWindow {
    fn from(period: Period) -> Self {
        Self {
            start: period.start_at(),
            end_exclusive: period.end_exclusive_at(),
        }
    }
}
