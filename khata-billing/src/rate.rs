use khata_core::Period;
use khata_store::{StoreResult, TenantStore};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{Billing, BillingResult};

/// The one aggregation pair every rate-bearing view is built from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct PeriodTotals {
    /// Sum of expense amounts dated in the period.
    pub total_expenses: Decimal,
    /// Sum of confirmed meal counts dated in the period, all members.
    pub total_meal_units: Decimal,
}

impl PeriodTotals {
    /// Expenses divided by meal units, or zero for a period nobody ate in.
    /// Unrounded; display layers round.
    pub fn meal_rate(&self) -> Decimal {
        if self.total_meal_units > Decimal::ZERO {
            self.total_expenses / self.total_meal_units
        } else {
            Decimal::ZERO
        }
    }
}

pub(crate) fn period_totals(store: &TenantStore, period: Period) -> StoreResult<PeriodTotals> {
    let total_expenses = store
        .expenses_in(period)?
        .iter()
        .map(|expense| expense.amount)
        .sum();
    let total_meal_units = store
        .records_in(period)?
        .iter()
        .filter(|record| record.is_billable())
        .map(|record| record.count.get())
        .sum();
    Ok(PeriodTotals { total_expenses, total_meal_units })
}

impl Billing {
    /// The aggregation pair for one period, visible to the whole
    /// organization.
    pub fn period_totals(&self, period: Period) -> BillingResult<PeriodTotals> {
        self.session.require_org()?;
        Ok(period_totals(&self.store, period)?)
    }

    /// The floating per-meal-unit cost for one period.
    pub fn meal_rate(&self, period: Period) -> BillingResult<Decimal> {
        Ok(self.period_totals(period)?.meal_rate())
    }
}
