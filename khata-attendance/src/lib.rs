//! Attendance tracking for shared meals.
//!
//! Two write paths exist. [`Attendance::batch_mark`] is the admin
//! reconciliation flow: one day, many members, full-replace counts.
//! [`Attendance::mark_participation`] is member self-service against an
//! already published schedule and only flips status. Both paths are
//! idempotent, so re-submitting a form after a timeout cannot double
//! count anyone.

mod batch;
mod error;
mod participation;

pub use batch::{BatchEntry, BatchOutcome};
pub use error::{AttendanceError, AttendanceResult};
pub use participation::{slot_headcounts, Board, BoardEntry, SlotHeadcounts};

use khata_core::Session;
use khata_store::TenantStore;

/// Attendance operations bound to one caller and one organization.
pub struct Attendance {
    session: Session,
    store: TenantStore,
}

impl Attendance {
    pub fn new(session: Session, store: TenantStore) -> Self {
        Self { session, store }
    }
}
