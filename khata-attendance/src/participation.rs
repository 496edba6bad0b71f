use chrono::{NaiveDate, Utc};
use khata_core::{MarkedBy, MealCount, MealSlot, MealStatus, Period, RecordId, ScheduleId, UserId};
use khata_store::{MealRecord, User};
use serde::Serialize;
use tracing::info;

use crate::{Attendance, AttendanceError, AttendanceResult};

/// One confirmed meal on the board.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BoardEntry {
    pub user: UserId,
    pub slot: MealSlot,
    pub count: MealCount,
}

/// The attendance sheet for one day: who could eat, who is marked.
#[derive(Clone, Debug, Serialize)]
pub struct Board {
    pub day: NaiveDate,
    pub members: Vec<User>,
    pub confirmed: Vec<BoardEntry>,
}

/// Confirmed-record headcounts per slot.
///
/// These count people, not meal units: a member taking a double portion is
/// still one head at the table. Unit sums live in billing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SlotHeadcounts {
    pub breakfast: usize,
    pub lunch: usize,
    pub dinner: usize,
}

impl SlotHeadcounts {
    pub fn total(&self) -> usize {
        self.breakfast + self.lunch + self.dinner
    }
}

/// Folds records into per-slot headcounts; cancelled records do not count.
pub fn slot_headcounts(records: &[MealRecord]) -> SlotHeadcounts {
    let mut counts = SlotHeadcounts::default();
    for record in records {
        if record.status != MealStatus::Confirmed {
            continue;
        }
        match record.slot {
            MealSlot::Breakfast => counts.breakfast += 1,
            MealSlot::Lunch => counts.lunch += 1,
            MealSlot::Dinner => counts.dinner += 1,
        }
    }
    counts
}

impl Attendance {
    /// Member self-service: confirm or cancel the caller's own record for a
    /// published schedule.
    ///
    /// An existing record keeps its count; only status and the marker
    /// change. A missing record is created with count 1 when confirming and
    /// 0 when cancelling; partial counts are the admin batch's business.
    pub fn mark_participation(
        &self,
        schedule: ScheduleId,
        status: MealStatus,
    ) -> AttendanceResult<MealRecord> {
        self.session.require_org()?;
        let user = self.session.user_id;
        let now = Utc::now();

        let record = self.store.with_tx::<_, AttendanceError>(|tx| {
            let schedule = tx
                .schedule_by_id(schedule)?
                .ok_or_else(|| AttendanceError::NotFound(format!("schedule {schedule}")))?;
            let record = match tx.record_for(user, schedule.id)? {
                Some(existing) => MealRecord {
                    status,
                    marked_by: MarkedBy::Member,
                    updated_at: now,
                    ..existing
                },
                None => MealRecord {
                    id: RecordId::new(),
                    user_id: user,
                    schedule_id: schedule.id,
                    date: schedule.date,
                    slot: schedule.slot,
                    count: match status {
                        MealStatus::Confirmed => MealCount::ONE,
                        MealStatus::Cancelled => MealCount::ZERO,
                    },
                    status,
                    marked_by: MarkedBy::Member,
                    updated_at: now,
                },
            };
            tx.upsert_record(&record)?;
            Ok(record)
        })?;
        info!(schedule = %record.schedule_id, status = %status, "participation marked");
        Ok(record)
    }

    /// Admin: the day's attendance sheet, billable members in name order
    /// plus every confirmed meal already marked.
    pub fn board(&self, day: NaiveDate) -> AttendanceResult<Board> {
        self.session.require_admin()?;
        let members = self
            .store
            .users()?
            .into_iter()
            .filter(User::is_billable)
            .collect();
        let confirmed = self
            .store
            .records_in(Period::day(day))?
            .into_iter()
            .filter(|record| record.status == MealStatus::Confirmed)
            .map(|record| BoardEntry {
                user: record.user_id,
                slot: record.slot,
                count: record.count,
            })
            .collect();
        Ok(Board { day, members, confirmed })
    }

    /// Per-slot headcounts for one day, visible to the whole organization.
    pub fn participation(&self, day: NaiveDate) -> AttendanceResult<SlotHeadcounts> {
        self.session.require_org()?;
        let records = self.store.records_in(Period::day(day))?;
        Ok(slot_headcounts(&records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BatchEntry;
    use chrono::{DateTime, NaiveTime};
    use khata_roster::Roster;
    use khata_test_utils::TestOrg;
    use rust_decimal_macros::dec;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 21).unwrap()
    }

    fn at_noon(date: NaiveDate) -> DateTime<Utc> {
        date.and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap())
            .and_utc()
    }

    fn count(raw: rust_decimal::Decimal) -> MealCount {
        MealCount::new(raw).unwrap()
    }

    #[test]
    fn first_confirmation_creates_a_unit_record() {
        let fixture = TestOrg::new();
        let rima = fixture.add_member("Rima", "rima@example.com");
        let admin = Attendance::new(fixture.admin_session(), fixture.store());
        admin
            .batch_mark(
                at_noon(day()),
                &[BatchEntry {
                    user: fixture.admin.id,
                    slot: MealSlot::Lunch,
                    count: count(dec!(1)),
                }],
            )
            .unwrap();
        let schedule = fixture.store().schedule(day(), MealSlot::Lunch).unwrap().unwrap();

        let member = Attendance::new(fixture.session_for(&rima), fixture.store());
        let record = member
            .mark_participation(schedule.id, MealStatus::Confirmed)
            .unwrap();

        assert_eq!(record.count, MealCount::ONE);
        assert_eq!(record.status, MealStatus::Confirmed);
        assert_eq!(record.marked_by, MarkedBy::Member);
    }

    #[test]
    fn cancelling_keeps_the_admin_count() {
        let fixture = TestOrg::new();
        let rima = fixture.add_member("Rima", "rima@example.com");
        let admin = Attendance::new(fixture.admin_session(), fixture.store());
        admin
            .batch_mark(
                at_noon(day()),
                &[BatchEntry { user: rima.id, slot: MealSlot::Dinner, count: count(dec!(2)) }],
            )
            .unwrap();
        let schedule = fixture.store().schedule(day(), MealSlot::Dinner).unwrap().unwrap();

        let member = Attendance::new(fixture.session_for(&rima), fixture.store());
        let record = member
            .mark_participation(schedule.id, MealStatus::Cancelled)
            .unwrap();

        assert_eq!(record.status, MealStatus::Cancelled);
        assert_eq!(record.count, count(dec!(2)));
        assert_eq!(record.marked_by, MarkedBy::Member);
    }

    #[test]
    fn foreign_schedules_read_as_missing() {
        let fixture = TestOrg::new();
        let other = TestOrg::new();
        let rima = fixture.add_member("Rima", "rima@example.com");
        let outsider_admin = Attendance::new(other.admin_session(), other.store());
        outsider_admin
            .batch_mark(
                at_noon(day()),
                &[BatchEntry {
                    user: other.admin.id,
                    slot: MealSlot::Lunch,
                    count: count(dec!(1)),
                }],
            )
            .unwrap();
        let foreign = other.store().schedule(day(), MealSlot::Lunch).unwrap().unwrap();

        let member = Attendance::new(fixture.session_for(&rima), fixture.store());
        let err = member
            .mark_participation(foreign.id, MealStatus::Confirmed)
            .unwrap_err();
        assert!(matches!(err, AttendanceError::NotFound(_)));
    }

    #[test]
    fn board_lists_billable_members_and_confirmed_meals() {
        let fixture = TestOrg::new();
        let rima = fixture.add_member("Rima", "rima@example.com");
        let tarek = fixture.add_member("Tarek", "tarek@example.com");
        Roster::new(fixture.admin_session(), fixture.store())
            .deactivate_member(tarek.id)
            .unwrap();

        let attendance = Attendance::new(fixture.admin_session(), fixture.store());
        attendance
            .batch_mark(
                at_noon(day()),
                &[
                    BatchEntry { user: rima.id, slot: MealSlot::Breakfast, count: count(dec!(1)) },
                    BatchEntry { user: rima.id, slot: MealSlot::Lunch, count: MealCount::ZERO },
                ],
            )
            .unwrap();

        let board = attendance.board(day()).unwrap();
        let names: Vec<&str> = board.members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Asha", "Rima"]);
        assert_eq!(board.confirmed.len(), 1);
        assert_eq!(board.confirmed[0].slot, MealSlot::Breakfast);
    }

    #[test]
    fn headcounts_count_people_not_portions() {
        let fixture = TestOrg::new();
        let rima = fixture.add_member("Rima", "rima@example.com");
        let tarek = fixture.add_member("Tarek", "tarek@example.com");
        let attendance = Attendance::new(fixture.admin_session(), fixture.store());
        attendance
            .batch_mark(
                at_noon(day()),
                &[
                    BatchEntry { user: rima.id, slot: MealSlot::Breakfast, count: count(dec!(2)) },
                    BatchEntry {
                        user: tarek.id,
                        slot: MealSlot::Breakfast,
                        count: count(dec!(0.5)),
                    },
                    BatchEntry { user: rima.id, slot: MealSlot::Lunch, count: MealCount::ZERO },
                ],
            )
            .unwrap();

        let member_view = Attendance::new(fixture.session_for(&rima), fixture.store());
        let counts = member_view.participation(day()).unwrap();
        assert_eq!(counts.breakfast, 2);
        assert_eq!(counts.lunch, 0);
        assert_eq!(counts.dinner, 0);
        assert_eq!(counts.total(), 2);
    }
}
