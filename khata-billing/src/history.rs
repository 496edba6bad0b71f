use khata_core::{MealStatus, Period};
use khata_store::MealRecord;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::rate::period_totals;
use crate::{Billing, BillingResult};

/// A member's own confirmed meals in a period, priced at the shared rate.
#[derive(Clone, Debug, Serialize)]
pub struct MealHistory {
    pub period: Period,
    pub meal_rate: Decimal,
    /// Confirmed records only, oldest first.
    pub records: Vec<MealRecord>,
    pub total_units: Decimal,
    pub total_cost: Decimal,
}

impl Billing {
    /// Member: the caller's own meal history for the period.
    pub fn meal_history(&self, period: Period) -> BillingResult<MealHistory> {
        self.session.require_org()?;
        let meal_rate = period_totals(&self.store, period)?.meal_rate();
        let records: Vec<MealRecord> = self
            .store
            .records_for_user_in(self.session.user_id, period)?
            .into_iter()
            .filter(|record| record.status == MealStatus::Confirmed)
            .collect();
        let total_units: Decimal = records.iter().map(|record| record.count.get()).sum();

        Ok(MealHistory {
            period,
            meal_rate,
            records,
            total_units,
            total_cost: total_units * meal_rate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime, Utc};
    use khata_attendance::{Attendance, BatchEntry};
    use khata_core::{MealCount, MealSlot, UserId};
    use khata_test_utils::TestOrg;
    use rust_decimal_macros::dec;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, d).unwrap()
    }

    fn at_noon(day: NaiveDate) -> chrono::DateTime<Utc> {
        day.and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap()).and_utc()
    }

    fn entry(user: UserId, slot: MealSlot, count: Decimal) -> BatchEntry {
        BatchEntry { user, slot, count: MealCount::new(count).unwrap() }
    }

    #[test]
    fn history_prices_own_confirmed_meals_only() {
        let fixture = TestOrg::new();
        let rima = fixture.add_member("Rima", "rima@example.com");
        let tarek = fixture.add_member("Tarek", "tarek@example.com");
        Billing::new(fixture.admin_session(), fixture.store())
            .add_expense(date(5), "groceries", "bazar", dec!(300))
            .unwrap();
        Attendance::new(fixture.admin_session(), fixture.store())
            .batch_mark(
                at_noon(date(10)),
                &[
                    entry(rima.id, MealSlot::Breakfast, dec!(1)),
                    entry(rima.id, MealSlot::Lunch, dec!(0)),
                    entry(rima.id, MealSlot::Dinner, dec!(1)),
                    entry(tarek.id, MealSlot::Breakfast, dec!(1)),
                ],
            )
            .unwrap();

        let billing = Billing::new(fixture.session_for(&rima), fixture.store());
        let history = billing.meal_history(Period::month_of(date(1))).unwrap();

        // Shared rate over all three confirmed units, not just Rima's.
        assert_eq!(history.meal_rate, dec!(100));
        assert_eq!(history.records.len(), 2);
        assert!(history.records.iter().all(|r| r.user_id == rima.id));
        assert_eq!(history.total_units, dec!(2));
        assert_eq!(history.total_cost, dec!(200));
    }
}
