use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;
use khata_billing::{Billing, Settlement};
use rust_decimal::Decimal;

use super::{month_period, Ctx};

#[derive(Subcommand)]
pub enum ReportCmd {
    /// The floating meal rate for a month.
    Rate {
        #[arg(long)]
        month: Option<String>,
    },
    /// Month-end settlement sheet; read-only, no wallet is touched.
    Settle {
        #[arg(long)]
        month: Option<String>,
        /// Emit the spreadsheet CSV instead of the summary.
        #[arg(long)]
        csv: bool,
        /// Write the CSV here instead of stdout.
        #[arg(long, value_name = "PATH", requires = "csv")]
        out: Option<PathBuf>,
    },
    /// Admin landing view: this month's money and today's kitchen load.
    Dashboard,
    /// The acting member's own month summary.
    Me,
    /// The acting member's confirmed meals for a month.
    Meals {
        #[arg(long)]
        month: Option<String>,
    },
    /// Active accounts below the balance threshold.
    LowBalance {
        /// Defaults to `low_balance_threshold` from the config.
        #[arg(long)]
        threshold: Option<Decimal>,
    },
}

pub fn run(ctx: &Ctx, cmd: ReportCmd) -> Result<()> {
    let (session, store) = ctx.tenant()?;
    let billing = Billing::new(session, store);
    match cmd {
        ReportCmd::Rate { month } => {
            let period = month_period(&ctx.settings, month.as_deref())?;
            let totals = billing.period_totals(period)?;
            ctx.emit(
                &totals,
                format!(
                    "{}: rate {} ({} spent over {} meal units)",
                    period,
                    totals.meal_rate(),
                    totals.total_expenses,
                    totals.total_meal_units
                ),
            )
        }
        ReportCmd::Settle { month, csv, out } => {
            let period = month_period(&ctx.settings, month.as_deref())?;
            let settlement = billing.settle(period)?;
            if csv {
                let rendered = settlement.to_csv()?;
                match out {
                    Some(path) => {
                        fs::write(&path, &rendered)
                            .with_context(|| format!("writing {}", path.display()))?;
                        println!("wrote {}", path.display());
                    }
                    None => println!("{rendered}"),
                }
                Ok(())
            } else {
                let text = render_settlement(&settlement);
                ctx.emit(&settlement, text)
            }
        }
        ReportCmd::Dashboard => {
            let dashboard =
                billing.admin_dashboard(ctx.settings.today(), ctx.settings.low_balance_threshold)?;
            let mut text = format!(
                "{}: {} active member(s), rate {}\n",
                dashboard.period, dashboard.active_members, dashboard.meal_rate
            );
            let _ = writeln!(
                text,
                "today breakfast {}, lunch {}, dinner {}",
                dashboard.today.breakfast, dashboard.today.lunch, dashboard.today.dinner
            );
            let _ = writeln!(
                text,
                "expenses {}, meal units {}, deposits {}, available {}",
                dashboard.totals.total_expenses,
                dashboard.totals.total_meal_units,
                dashboard.deposits,
                dashboard.available_balance
            );
            let _ = write!(text, "{} account(s) under threshold", dashboard.low_balance.len());
            ctx.emit(&dashboard, text)
        }
        ReportCmd::Me => {
            let me = billing.member_dashboard(ctx.settings.today())?;
            ctx.emit(
                &me,
                format!(
                    "{}: balance {}, {} meal(s) at rate {} = {}",
                    me.period, me.wallet_balance, me.meals_consumed, me.meal_rate, me.meal_cost
                ),
            )
        }
        ReportCmd::Meals { month } => {
            let period = month_period(&ctx.settings, month.as_deref())?;
            let history = billing.meal_history(period)?;
            let mut text = format!(
                "{}: {} unit(s) at rate {} = {}\n",
                history.period, history.total_units, history.meal_rate, history.total_cost
            );
            for record in &history.records {
                let _ = writeln!(text, "{} {} x{}", record.date, record.slot, record.count);
            }
            ctx.emit(&history, text.trim_end().to_string())
        }
        ReportCmd::LowBalance { threshold } => {
            let threshold = threshold.unwrap_or(ctx.settings.low_balance_threshold);
            let rows = billing.low_balance(threshold)?;
            let mut text = String::new();
            for row in &rows {
                let _ = writeln!(text, "{} <{}> balance {}", row.name, row.email, row.balance);
            }
            if text.is_empty() {
                text.push_str(&format!("nobody under {threshold}"));
            }
            ctx.emit(&rows, text.trim_end().to_string())
        }
    }
}

fn render_settlement(settlement: &Settlement) -> String {
    let mut text = format!(
        "{}: rate {}, {} member(s)\n",
        settlement.period,
        settlement.meal_rate,
        settlement.rows.len()
    );
    for row in &settlement.rows {
        let _ = writeln!(
            text,
            "{}: {} meal(s), cost {}, deposited {}, adjusted {}, wallet {}",
            row.name,
            row.meals_consumed,
            row.meal_cost,
            row.deposited,
            row.adjusted_balance,
            row.wallet_balance
        );
    }
    let totals = &settlement.totals;
    let _ = write!(
        text,
        "totals: {} meal(s), cost {}, deposited {}, adjusted {}",
        totals.meals_consumed, totals.meal_cost, totals.deposited, totals.adjusted_balance
    );
    text
}
