//! SQLite persistence for Khata.
//!
//! The crate exposes two surfaces: [`Database`], which owns the file path and
//! the handful of cross-tenant operations (registration, session lookup), and
//! [`TenantStore`], the per-request capability object every engine works
//! through. A `TenantStore` is constructed with an organization id baked in
//! and filters every query by it, so cross-tenant reads are impossible to
//! express rather than merely forbidden.

mod db;
mod error;
mod model;
mod tenant;

pub use db::{Database, GlobalTx, DEFAULT_BATCH_BUSY_TIMEOUT, DEFAULT_BUSY_TIMEOUT};
pub use error::{StoreError, StoreResult};
pub use model::{Expense, MealRecord, MealSchedule, Organization, TxWindow, User, WalletTx};
pub use tenant::{TenantStore, TenantTx};
