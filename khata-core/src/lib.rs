//! Shared domain types for the Khata mess billing engine.

mod ids;
mod meal;
mod period;
mod role;
mod session;
mod wallet;

pub use ids::{ExpenseId, OrgId, RecordId, ScheduleId, TxId, UserId};
pub use meal::{CountError, MarkedBy, MealCount, MealSlot, MealStatus};
pub use period::Period;
pub use role::Role;
pub use session::{AuthError, AuthResult, Session};
pub use wallet::TxKind;
