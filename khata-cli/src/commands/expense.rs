use std::fmt::Write as _;

use anyhow::Result;
use chrono::NaiveDate;
use clap::Subcommand;
use khata_billing::{Billing, ExpenseUpdate};
use khata_core::ExpenseId;
use rust_decimal::Decimal;

use super::{month_period, Ctx};

#[derive(Subcommand)]
pub enum ExpenseCmd {
    /// Record a shared cost; it feeds the meal rate from its date onward.
    Add {
        amount: Decimal,
        /// e.g. groceries, gas, staff.
        category: String,
        description: String,
        /// YYYY-MM-DD; defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Expenses for a month, newest first.
    List {
        #[arg(long)]
        month: Option<String>,
    },
    /// Edit an expense; flags left out keep the current value.
    Edit {
        id: ExpenseId,
        #[arg(long)]
        amount: Option<Decimal>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Delete an expense.
    Remove { id: ExpenseId },
}

pub fn run(ctx: &Ctx, cmd: ExpenseCmd) -> Result<()> {
    let (session, store) = ctx.tenant()?;
    let billing = Billing::new(session, store);
    match cmd {
        ExpenseCmd::Add { amount, category, description, date } => {
            let date = date.unwrap_or_else(|| ctx.settings.today());
            let expense = billing.add_expense(date, &category, &description, amount)?;
            ctx.emit(
                &expense,
                format!(
                    "recorded {} for {} on {} ({})",
                    expense.amount, expense.category, expense.date, expense.id
                ),
            )
        }
        ExpenseCmd::List { month } => {
            let period = month_period(&ctx.settings, month.as_deref())?;
            let expenses = billing.expenses(period)?;
            let mut text = String::new();
            for expense in &expenses {
                let _ = writeln!(
                    text,
                    "{} {} {} \"{}\" ({})",
                    expense.date, expense.category, expense.amount, expense.description, expense.id
                );
            }
            if text.is_empty() {
                text.push_str("no expenses");
            }
            ctx.emit(&expenses, text.trim_end().to_string())
        }
        ExpenseCmd::Edit { id, amount, category, description, date } => {
            let update = ExpenseUpdate { date, category, description, amount };
            let expense = billing.update_expense(id, &update)?;
            ctx.emit(
                &expense,
                format!(
                    "updated {}: {} {} on {}",
                    expense.id, expense.category, expense.amount, expense.date
                ),
            )
        }
        ExpenseCmd::Remove { id } => {
            billing.remove_expense(id)?;
            ctx.emit(&id, format!("removed expense {id}"))
        }
    }
}
