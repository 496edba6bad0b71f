use std::collections::BTreeMap;
use std::fmt;

use khata_core::{Period, TxKind, UserId};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::rate::period_totals;
use crate::{Billing, BillingError, BillingResult};

/// One member's period reckoning.
///
/// `adjusted_balance` is this period's deposits minus this period's meal
/// cost. `wallet_balance` is the lifetime running balance. The two answer
/// different questions and neither is derived from the other.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SettlementRow {
    pub user: UserId,
    pub name: String,
    pub meals_consumed: Decimal,
    pub meal_cost: Decimal,
    pub deposited: Decimal,
    pub adjusted_balance: Decimal,
    pub wallet_balance: Decimal,
}

/// Column sums over the settlement rows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct SettlementTotals {
    pub meals_consumed: Decimal,
    pub meal_cost: Decimal,
    pub deposited: Decimal,
    pub adjusted_balance: Decimal,
}

/// The period settlement sheet, one row per active billable account.
#[derive(Clone, Debug, Serialize)]
pub struct Settlement {
    pub period: Period,
    pub meal_rate: Decimal,
    pub rows: Vec<SettlementRow>,
    pub totals: SettlementTotals,
}

impl Billing {
    /// Admin: settle one period, read-only.
    ///
    /// One shared rate for the whole organization; per active billable
    /// account: confirmed meal units, their cost at that rate, period
    /// deposits, and the deposit-minus-cost delta. No wallet is touched;
    /// settling twice returns the same sheet.
    ///
    /// Inactive accounts get no row, but meals they ate in the period still
    /// sit in the rate denominator since their portions consumed the same
    /// shared expenses.
    pub fn settle(&self, period: Period) -> BillingResult<Settlement> {
        self.session.require_admin()?;
        let meal_rate = period_totals(&self.store, period)?.meal_rate();

        let mut meals: BTreeMap<UserId, Decimal> = BTreeMap::new();
        for record in self.store.records_in(period)? {
            if record.is_billable() {
                *meals.entry(record.user_id).or_default() += record.count.get();
            }
        }
        let mut deposits: BTreeMap<UserId, Decimal> = BTreeMap::new();
        for tx in self.store.wallet_txs_in(period.into())? {
            if tx.kind == TxKind::Credit {
                *deposits.entry(tx.user_id).or_default() += tx.amount;
            }
        }

        let mut rows = Vec::new();
        let mut totals = SettlementTotals::default();
        for user in self.store.users()? {
            if !user.is_billable() {
                continue;
            }
            let meals_consumed = meals.get(&user.id).copied().unwrap_or(Decimal::ZERO);
            let meal_cost = meals_consumed * meal_rate;
            let deposited = deposits.get(&user.id).copied().unwrap_or(Decimal::ZERO);
            let adjusted_balance = deposited - meal_cost;
            totals.meals_consumed += meals_consumed;
            totals.meal_cost += meal_cost;
            totals.deposited += deposited;
            totals.adjusted_balance += adjusted_balance;
            rows.push(SettlementRow {
                user: user.id,
                name: user.name,
                meals_consumed,
                meal_cost,
                deposited,
                adjusted_balance,
                wallet_balance: user.wallet_balance,
            });
        }
        Ok(Settlement { period, meal_rate, rows, totals })
    }
}

impl Settlement {
    /// Renders the export artifact, byte-compatible with existing sheets:
    /// a quoted rate line, a bare header row, one row per member with the
    /// name quoted and numerics bare, an empty line, then the TOTALS row.
    /// Meals carry one decimal place, money two, rounded half away from
    /// zero. No trailing newline.
    pub fn to_csv(&self) -> BillingResult<String> {
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .quote_style(csv::QuoteStyle::Never)
            .from_writer(Vec::new());
        writer
            .write_record([format!("\"Current Meal Rate: {}\"", money(self.meal_rate))])
            .map_err(export_err)?;
        writer
            .write_record([
                "Member Name",
                "Meals Consumed",
                "Calculated Cost",
                "Total Deposited",
                "Adjusted Balance",
            ])
            .map_err(export_err)?;
        for row in &self.rows {
            writer
                .write_record([
                    quoted(&row.name),
                    meals(row.meals_consumed),
                    money(row.meal_cost),
                    money(row.deposited),
                    money(row.adjusted_balance),
                ])
                .map_err(export_err)?;
        }
        writer.write_record([""]).map_err(export_err)?;
        writer
            .write_record([
                "TOTALS".to_string(),
                meals(self.totals.meals_consumed),
                money(self.totals.meal_cost),
                money(self.totals.deposited),
                money(self.totals.adjusted_balance),
            ])
            .map_err(export_err)?;

        let bytes = writer.into_inner().map_err(export_err)?;
        let text = String::from_utf8(bytes).map_err(export_err)?;
        Ok(text.trim_end_matches('\n').to_string())
    }
}

fn export_err(err: impl fmt::Display) -> BillingError {
    BillingError::Export(err.to_string())
}

fn quoted(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn meals(value: Decimal) -> String {
    format!(
        "{:.1}",
        value.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
    )
}

fn money(value: Decimal) -> String {
    format!(
        "{:.2}",
        value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    )
}
