//! Billing math and reports for shared meals.
//!
//! Everything here is read-only except expense CRUD; settlement never
//! touches wallet balances. All rate-bearing views go through one
//! aggregation pair, [`Billing::period_totals`], so the rate shown on a
//! dashboard, in a history view and in a settlement export for the same
//! period is always the same number.

mod error;
mod expense;
mod history;
mod rate;
mod settlement;
mod stats;

pub use error::{BillingError, BillingResult};
pub use expense::ExpenseUpdate;
pub use history::MealHistory;
pub use rate::PeriodTotals;
pub use settlement::{Settlement, SettlementRow, SettlementTotals};
pub use stats::{AdminDashboard, LowBalance, MemberDashboard, WalletOverview};

use khata_core::Session;
use khata_store::TenantStore;

/// Billing operations bound to one caller and one organization.
pub struct Billing {
    session: Session,
    store: TenantStore,
}

impl Billing {
    pub fn new(session: Session, store: TenantStore) -> Self {
        Self { session, store }
    }
}
