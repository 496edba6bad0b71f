use chrono::{NaiveDate, Utc};
use khata_core::{ExpenseId, Period};
use khata_store::Expense;
use rust_decimal::Decimal;
use tracing::info;

use crate::{Billing, BillingError, BillingResult};

/// Partial replacement for an existing expense; `None` keeps the field.
#[derive(Clone, Debug, Default)]
pub struct ExpenseUpdate {
    pub date: Option<NaiveDate>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub amount: Option<Decimal>,
}

impl Billing {
    /// Admin: record a shared cost. Feeds the meal-rate numerator from its
    /// `date` onward.
    pub fn add_expense(
        &self,
        date: NaiveDate,
        category: &str,
        description: &str,
        amount: Decimal,
    ) -> BillingResult<Expense> {
        self.session.require_admin()?;
        let category = validate_label(category, "category")?;
        let description = validate_label(description, "description")?;
        validate_amount(amount)?;

        let expense = Expense {
            id: ExpenseId::new(),
            org_id: self.store.org(),
            date,
            category,
            description,
            amount,
            created_at: Utc::now(),
        };
        self.store.with_tx(|tx| tx.insert_expense(&expense))?;
        info!(expense = %expense.id, amount = %amount, "expense recorded");
        Ok(expense)
    }

    /// Admin: rewrite parts of an expense.
    pub fn update_expense(&self, id: ExpenseId, update: &ExpenseUpdate) -> BillingResult<Expense> {
        self.session.require_admin()?;
        if let Some(amount) = update.amount {
            validate_amount(amount)?;
        }
        let category = update
            .category
            .as_deref()
            .map(|raw| validate_label(raw, "category"))
            .transpose()?;
        let description = update
            .description
            .as_deref()
            .map(|raw| validate_label(raw, "description"))
            .transpose()?;

        let updated = self.store.with_tx::<_, BillingError>(|tx| {
            let old = tx
                .expense(id)?
                .ok_or_else(|| BillingError::NotFound(format!("expense {id}")))?;
            let row = Expense {
                date: update.date.unwrap_or(old.date),
                category: category.clone().unwrap_or(old.category.clone()),
                description: description.clone().unwrap_or(old.description.clone()),
                amount: update.amount.unwrap_or(old.amount),
                ..old
            };
            tx.update_expense(&row)?;
            Ok(row)
        })?;
        info!(expense = %id, "expense updated");
        Ok(updated)
    }

    /// Admin: delete an expense. Rates for its period change on the next
    /// read; nothing else references it.
    pub fn remove_expense(&self, id: ExpenseId) -> BillingResult<()> {
        self.session.require_admin()?;
        self.store.with_tx(|tx| {
            if tx.delete_expense(id)? {
                Ok(())
            } else {
                Err(BillingError::NotFound(format!("expense {id}")))
            }
        })?;
        info!(expense = %id, "expense deleted");
        Ok(())
    }

    /// Admin: expenses dated in the period, newest first.
    pub fn expenses(&self, period: Period) -> BillingResult<Vec<Expense>> {
        self.session.require_admin()?;
        Ok(self.store.expenses_in(period)?)
    }
}

fn validate_amount(amount: Decimal) -> BillingResult<()> {
    if amount > Decimal::ZERO {
        Ok(())
    } else {
        Err(BillingError::Invalid(format!(
            "expense amount must be positive, got {amount}"
        )))
    }
}

fn validate_label(raw: &str, what: &str) -> BillingResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        Err(BillingError::Invalid(format!("expense {what} must not be empty")))
    } else {
        Ok(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use khata_core::AuthError;
    use khata_test_utils::TestOrg;
    use rust_decimal_macros::dec;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, d).unwrap()
    }

    #[test]
    fn expense_lifecycle_roundtrips() {
        let fixture = TestOrg::new();
        let billing = Billing::new(fixture.admin_session(), fixture.store());

        let expense = billing
            .add_expense(date(3), "groceries", "weekly bazar", dec!(640))
            .unwrap();
        let updated = billing
            .update_expense(
                expense.id,
                &ExpenseUpdate { amount: Some(dec!(700)), ..ExpenseUpdate::default() },
            )
            .unwrap();
        assert_eq!(updated.amount, dec!(700));
        assert_eq!(updated.category, "groceries");

        let listed = billing.expenses(Period::month_of(date(1))).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].amount, dec!(700));

        billing.remove_expense(expense.id).unwrap();
        assert!(billing.expenses(Period::month_of(date(1))).unwrap().is_empty());
    }

    #[test]
    fn non_positive_amounts_are_rejected() {
        let fixture = TestOrg::new();
        let billing = Billing::new(fixture.admin_session(), fixture.store());

        for bad in [dec!(0), dec!(-25)] {
            let err = billing
                .add_expense(date(3), "groceries", "nothing", bad)
                .unwrap_err();
            assert!(matches!(err, BillingError::Invalid(_)));
        }
    }

    #[test]
    fn members_cannot_touch_expenses() {
        let fixture = TestOrg::new();
        let rima = fixture.add_member("Rima", "rima@example.com");
        let billing = Billing::new(fixture.session_for(&rima), fixture.store());

        let err = billing
            .add_expense(date(3), "groceries", "weekly bazar", dec!(100))
            .unwrap_err();
        assert!(matches!(
            err,
            BillingError::Unauthorized(AuthError::AdminRequired)
        ));
    }

    #[test]
    fn missing_expense_reads_as_not_found() {
        let fixture = TestOrg::new();
        let billing = Billing::new(fixture.admin_session(), fixture.store());

        let err = billing.remove_expense(ExpenseId::new()).unwrap_err();
        assert!(matches!(err, BillingError::NotFound(_)));
    }
}
