use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, Utc};
use khata_core::{MarkedBy, MealCount, MealSlot, MealStatus, RecordId, ScheduleId, UserId};
use khata_store::{MealRecord, MealSchedule};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{Attendance, AttendanceError, AttendanceResult};

/// Menu label stamped on schedules the batch creates on demand.
const DEFAULT_MENU: &str = "Regular Meal";

/// One member's count for one slot in a batch submission.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BatchEntry {
    pub user: UserId,
    pub slot: MealSlot,
    pub count: MealCount,
}

/// What a committed batch did.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BatchOutcome {
    pub day: NaiveDate,
    pub schedules_created: usize,
    pub records_upserted: usize,
}

impl Attendance {
    /// Admin: reconcile one day's attendance in a single atomic batch.
    ///
    /// `date` is truncated to its UTC day; schedules for the slots named in
    /// the batch are created on demand. Each entry full-replaces the
    /// member's record for that slot, so re-submitting the same sheet is a
    /// no-op and a corrected sheet simply wins. A zero count stores a
    /// cancelled record rather than deleting the row, which keeps the audit
    /// trail of who was unmarked.
    ///
    /// Any entry naming an account outside this organization rejects the
    /// whole batch; nothing is applied partially.
    pub fn batch_mark(
        &self,
        date: DateTime<Utc>,
        entries: &[BatchEntry],
    ) -> AttendanceResult<BatchOutcome> {
        self.session.require_admin()?;
        let day = date.date_naive();
        if entries.is_empty() {
            return Ok(BatchOutcome {
                day,
                schedules_created: 0,
                records_upserted: 0,
            });
        }

        let now = Utc::now();
        let outcome = self.store.with_batch_tx(|tx| {
            let mut schedules: BTreeMap<MealSlot, ScheduleId> = BTreeMap::new();
            let mut created = 0usize;
            for entry in entries {
                if schedules.contains_key(&entry.slot) {
                    continue;
                }
                let id = match tx.schedule(day, entry.slot)? {
                    Some(existing) => existing.id,
                    None => {
                        let schedule = MealSchedule {
                            id: ScheduleId::new(),
                            org_id: tx.org(),
                            date: day,
                            slot: entry.slot,
                            menu: Some(DEFAULT_MENU.to_string()),
                            price: Some(Decimal::ZERO),
                        };
                        tx.insert_schedule(&schedule)?;
                        created += 1;
                        schedule.id
                    }
                };
                schedules.insert(entry.slot, id);
            }

            let mut known = BTreeSet::new();
            for entry in entries {
                if known.insert(entry.user) && tx.user(entry.user)?.is_none() {
                    return Err(AttendanceError::NotFound(format!("user {}", entry.user)));
                }
                let status = if entry.count.is_zero() {
                    MealStatus::Cancelled
                } else {
                    MealStatus::Confirmed
                };
                tx.upsert_record(&MealRecord {
                    id: RecordId::new(),
                    user_id: entry.user,
                    schedule_id: schedules[&entry.slot],
                    date: day,
                    slot: entry.slot,
                    count: entry.count,
                    status,
                    marked_by: MarkedBy::Admin,
                    updated_at: now,
                })?;
            }
            Ok(BatchOutcome {
                day,
                schedules_created: created,
                records_upserted: entries.len(),
            })
        })?;
        info!(
            day = %outcome.day,
            records = outcome.records_upserted,
            schedules = outcome.schedules_created,
            "attendance batch applied"
        );
        Ok(outcome)
    }
}
