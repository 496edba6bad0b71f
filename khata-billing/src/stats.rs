use chrono::NaiveDate;
use khata_attendance::{slot_headcounts, SlotHeadcounts};
use khata_core::{Period, TxKind, UserId};
use khata_store::WalletTx;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::rate::{period_totals, PeriodTotals};
use crate::{Billing, BillingError, BillingResult};

/// A wallet running low, surfaced so admins can chase deposits.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LowBalance {
    pub user: UserId,
    pub name: String,
    pub email: String,
    pub balance: Decimal,
}

/// The admin landing view: this month's money and today's kitchen load.
#[derive(Clone, Debug, Serialize)]
pub struct AdminDashboard {
    pub period: Period,
    pub active_members: usize,
    pub today: SlotHeadcounts,
    pub totals: PeriodTotals,
    pub deposits: Decimal,
    /// Period deposits minus period expenses; what the mess fund gained.
    pub available_balance: Decimal,
    pub meal_rate: Decimal,
    pub low_balance: Vec<LowBalance>,
}

/// A member's own landing view.
#[derive(Clone, Debug, Serialize)]
pub struct MemberDashboard {
    pub period: Period,
    pub wallet_balance: Decimal,
    pub meals_consumed: Decimal,
    pub meal_rate: Decimal,
    pub meal_cost: Decimal,
}

/// Organization-wide wallet activity for one period.
#[derive(Clone, Debug, Serialize)]
pub struct WalletOverview {
    pub period: Period,
    /// Newest first by entry date; backdated rows sort where they belong.
    pub transactions: Vec<WalletTx>,
    pub deposited: Decimal,
    /// Sum of active accounts' balances; what the mess owes its members.
    pub system_liability: Decimal,
}

impl Billing {
    /// Admin: active accounts whose balance fell below `threshold`,
    /// highest balance first.
    pub fn low_balance(&self, threshold: Decimal) -> BillingResult<Vec<LowBalance>> {
        self.session.require_admin()?;
        let mut rows: Vec<LowBalance> = self
            .store
            .users()?
            .into_iter()
            .filter(|user| user.is_active && user.wallet_balance < threshold)
            .map(|user| LowBalance {
                user: user.id,
                name: user.name,
                email: user.email,
                balance: user.wallet_balance,
            })
            .collect();
        rows.sort_by(|a, b| b.balance.cmp(&a.balance));
        Ok(rows)
    }

    /// Admin: the dashboard for `today`, monthly aggregates plus today's
    /// headcounts.
    pub fn admin_dashboard(
        &self,
        today: NaiveDate,
        low_balance_threshold: Decimal,
    ) -> BillingResult<AdminDashboard> {
        self.session.require_admin()?;
        let period = Period::month_of(today);
        let totals = period_totals(&self.store, period)?;
        let deposits = self.period_deposits(period)?;
        let today_records = self.store.records_in(Period::day(today))?;
        let active_members = self
            .store
            .users()?
            .iter()
            .filter(|user| user.is_billable())
            .count();

        Ok(AdminDashboard {
            period,
            active_members,
            today: slot_headcounts(&today_records),
            totals,
            deposits,
            available_balance: deposits - totals.total_expenses,
            meal_rate: totals.meal_rate(),
            low_balance: self.low_balance(low_balance_threshold)?,
        })
    }

    /// Member: own balance and this month's consumption at the shared rate.
    pub fn member_dashboard(&self, today: NaiveDate) -> BillingResult<MemberDashboard> {
        self.session.require_org()?;
        let user = self
            .store
            .user(self.session.user_id)?
            .ok_or_else(|| BillingError::NotFound(format!("user {}", self.session.user_id)))?;
        let period = Period::month_of(today);
        let meal_rate = period_totals(&self.store, period)?.meal_rate();
        let meals_consumed: Decimal = self
            .store
            .records_for_user_in(user.id, period)?
            .iter()
            .filter(|record| record.is_billable())
            .map(|record| record.count.get())
            .sum();

        Ok(MemberDashboard {
            period,
            wallet_balance: user.wallet_balance,
            meals_consumed,
            meal_rate,
            meal_cost: meals_consumed * meal_rate,
        })
    }

    /// Admin: all wallet movement in the period plus the liability total.
    pub fn wallet_overview(&self, period: Period) -> BillingResult<WalletOverview> {
        self.session.require_admin()?;
        let mut transactions = self.store.wallet_txs_in(period.into())?;
        transactions.sort_by(|a, b| {
            b.entry_date.cmp(&a.entry_date).then(b.seq.cmp(&a.seq))
        });
        let deposited = transactions
            .iter()
            .filter(|tx| tx.kind == TxKind::Credit)
            .map(|tx| tx.amount)
            .sum();
        let system_liability = self
            .store
            .users()?
            .iter()
            .filter(|user| user.is_active)
            .map(|user| user.wallet_balance)
            .sum();

        Ok(WalletOverview { period, transactions, deposited, system_liability })
    }

    fn period_deposits(&self, period: Period) -> BillingResult<Decimal> {
        Ok(self
            .store
            .wallet_txs_in(period.into())?
            .iter()
            .filter(|tx| tx.kind == TxKind::Credit)
            .map(|tx| tx.amount)
            .sum())
    }
}
