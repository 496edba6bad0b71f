use std::fmt::Write as _;

use anyhow::Result;
use chrono::NaiveDate;
use clap::Subcommand;
use khata_billing::Billing;
use khata_core::TxId;
use khata_ledger::{TxUpdate, WalletLedger};
use khata_store::WalletTx;
use rust_decimal::Decimal;

use super::{entry_instant, find_account, month_period, Ctx};

#[derive(Subcommand)]
pub enum WalletCmd {
    /// Credit a member's wallet.
    Deposit {
        email: String,
        amount: Decimal,
        #[arg(long, default_value = "deposit")]
        description: String,
        /// Entry date, YYYY-MM-DD; defaults to now.
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Debit a member's wallet; the balance may go negative.
    Withdraw {
        email: String,
        amount: Decimal,
        #[arg(long, default_value = "withdrawal")]
        description: String,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Point-fix one transaction; flags left out keep the current value.
    EditTx {
        id: TxId,
        #[arg(long)]
        amount: Option<Decimal>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Remove a transaction and reverse its balance effect.
    DeleteTx { id: TxId },
    /// One account's transactions, newest first.
    History {
        /// Defaults to the acting account.
        #[arg(long)]
        email: Option<String>,
        /// Restrict to a month, YYYY-MM.
        #[arg(long)]
        month: Option<String>,
    },
    /// Organization-wide wallet activity for a month.
    Overview {
        #[arg(long)]
        month: Option<String>,
    },
    /// Replay every ledger and report snapshot or balance drift.
    Audit,
    /// Recompute one account's snapshot chain after backdated edits.
    Rebuild { email: String },
}

pub fn run(ctx: &Ctx, cmd: WalletCmd) -> Result<()> {
    let (session, store) = ctx.tenant()?;
    let ledger = WalletLedger::new(session.clone(), store.clone());
    match cmd {
        WalletCmd::Deposit { email, amount, description, date } => {
            let member = find_account(&store, &email)?;
            let tx = ledger.credit(member.id, amount, &description, entry_instant(date))?;
            ctx.emit(
                &tx,
                format!(
                    "credited {} to {}; balance {}",
                    tx.amount, member.email, tx.balance_after
                ),
            )
        }
        WalletCmd::Withdraw { email, amount, description, date } => {
            let member = find_account(&store, &email)?;
            let tx = ledger.debit(member.id, amount, &description, entry_instant(date))?;
            ctx.emit(
                &tx,
                format!(
                    "debited {} from {}; balance {}",
                    tx.amount, member.email, tx.balance_after
                ),
            )
        }
        WalletCmd::EditTx { id, amount, description, date } => {
            let update = TxUpdate {
                amount,
                description,
                entry_date: date.map(|d| entry_instant(Some(d))),
            };
            let tx = ledger.update_transaction(id, &update)?;
            ctx.emit(
                &tx,
                format!(
                    "updated {}: {} {} on {}",
                    tx.id,
                    tx.kind,
                    tx.amount,
                    tx.entry_date.date_naive()
                ),
            )
        }
        WalletCmd::DeleteTx { id } => {
            ledger.delete_transaction(id)?;
            ctx.emit(&id, format!("deleted transaction {id}"))
        }
        WalletCmd::History { email, month } => {
            let user = match email {
                Some(email) => find_account(&store, &email)?.id,
                None => session.user_id,
            };
            let window = month
                .as_deref()
                .map(|raw| month_period(&ctx.settings, Some(raw)))
                .transpose()?
                .map(Into::into);
            let txs = ledger.transactions_for(user, window)?;
            ctx.emit(&txs, render_txs(&txs))
        }
        WalletCmd::Overview { month } => {
            let period = month_period(&ctx.settings, month.as_deref())?;
            let billing = Billing::new(session, store);
            let overview = billing.wallet_overview(period)?;
            let mut text = format!(
                "{}: deposited {}, owed to members {}\n",
                overview.period, overview.deposited, overview.system_liability
            );
            text.push_str(&render_txs(&overview.transactions));
            ctx.emit(&overview, text.trim_end().to_string())
        }
        WalletCmd::Audit => {
            let report = ledger.audit()?;
            let text = if report.is_clean() {
                format!("clean; {} accounts checked", report.users_checked)
            } else {
                format!(
                    "{} balance drift(s), {} stale snapshot(s) across {} accounts",
                    report.balance_drift.len(),
                    report.snapshot_drift.len(),
                    report.users_checked
                )
            };
            ctx.emit(&report, text)
        }
        WalletCmd::Rebuild { email } => {
            let member = find_account(&store, &email)?;
            let outcome = ledger.rebuild_snapshots(member.id)?;
            ctx.emit(
                &outcome,
                format!(
                    "rebuilt {} snapshot(s) for {}; balance {}",
                    outcome.rows_updated, member.email, outcome.final_balance
                ),
            )
        }
    }
}

fn render_txs(txs: &[WalletTx]) -> String {
    let mut text = String::new();
    for tx in txs {
        let _ = writeln!(
            text,
            "{} {} {} \"{}\" balance {} ({})",
            tx.entry_date.date_naive(),
            tx.kind,
            tx.amount,
            tx.description,
            tx.balance_after,
            tx.id
        );
    }
    if text.is_empty() {
        text.push_str("no transactions");
    }
    text.trim_end().to_string()
}
