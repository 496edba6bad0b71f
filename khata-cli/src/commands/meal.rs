use std::fmt::Write as _;

use anyhow::{anyhow, bail, Result};
use chrono::NaiveDate;
use clap::Subcommand;
use khata_attendance::{Attendance, BatchEntry};
use khata_core::{MealCount, MealStatus};
use khata_store::TenantStore;

use super::{entry_instant, find_account, parse_slot, Ctx};

#[derive(Subcommand)]
pub enum MealCmd {
    /// Admin: save one day's attendance sheet in a single transaction.
    ///
    /// Re-running the same sheet replaces counts instead of stacking them.
    Mark {
        /// Day the sheet covers, YYYY-MM-DD; defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Repeated EMAIL:SLOT:COUNT entries, e.g. rafi@x.com:lunch:1.5.
        /// A count of 0 stores a cancelled record.
        #[arg(long = "entry", value_name = "EMAIL:SLOT:COUNT", required = true)]
        entries: Vec<String>,
    },
    /// Confirm your own meal for a scheduled day and slot.
    Confirm {
        slot: String,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Cancel your own meal for a scheduled day and slot.
    Cancel {
        slot: String,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Admin: the day's board of members and confirmed meals.
    Board {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Per-slot headcounts for a day.
    Stats {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

pub fn run(ctx: &Ctx, cmd: MealCmd) -> Result<()> {
    let (session, store) = ctx.tenant()?;
    let attendance = Attendance::new(session, store.clone());
    match cmd {
        MealCmd::Mark { date, entries } => {
            let parsed = entries
                .iter()
                .map(|raw| parse_entry(&store, raw))
                .collect::<Result<Vec<_>>>()?;
            let day = date.unwrap_or_else(|| ctx.settings.today());
            let outcome = attendance.batch_mark(entry_instant(Some(day)), &parsed)?;
            ctx.emit(
                &outcome,
                format!(
                    "saved {} record(s) ({} new schedule(s)) for {}",
                    outcome.records_upserted, outcome.schedules_created, outcome.day
                ),
            )
        }
        MealCmd::Confirm { slot, date } => {
            mark_own(ctx, &attendance, &store, &slot, date, MealStatus::Confirmed)
        }
        MealCmd::Cancel { slot, date } => {
            mark_own(ctx, &attendance, &store, &slot, date, MealStatus::Cancelled)
        }
        MealCmd::Board { date } => {
            let day = date.unwrap_or_else(|| ctx.settings.today());
            let board = attendance.board(day)?;
            let mut text = format!("{}: {} member(s)\n", board.day, board.members.len());
            for entry in &board.confirmed {
                let name = board
                    .members
                    .iter()
                    .find(|member| member.id == entry.user)
                    .map(|member| member.name.as_str())
                    .unwrap_or("(inactive)");
                let _ = writeln!(text, "{} {} x{}", name, entry.slot, entry.count);
            }
            ctx.emit(&board, text.trim_end().to_string())
        }
        MealCmd::Stats { date } => {
            let day = date.unwrap_or_else(|| ctx.settings.today());
            let counts = attendance.participation(day)?;
            ctx.emit(
                &counts,
                format!(
                    "{}: breakfast {}, lunch {}, dinner {} ({} total)",
                    day,
                    counts.breakfast,
                    counts.lunch,
                    counts.dinner,
                    counts.total()
                ),
            )
        }
    }
}

fn mark_own(
    ctx: &Ctx,
    attendance: &Attendance,
    store: &TenantStore,
    slot: &str,
    date: Option<NaiveDate>,
    status: MealStatus,
) -> Result<()> {
    let day = date.unwrap_or_else(|| ctx.settings.today());
    let slot = parse_slot(slot)?;
    let schedule = store
        .schedule(day, slot)?
        .ok_or_else(|| anyhow!("no {slot} scheduled on {day}"))?;
    let record = attendance.mark_participation(schedule.id, status)?;
    ctx.emit(
        &record,
        format!("{} {} on {} (count {})", record.status, slot, day, record.count),
    )
}

fn parse_entry(store: &TenantStore, raw: &str) -> Result<BatchEntry> {
    let mut parts = raw.splitn(3, ':');
    let (Some(email), Some(slot), Some(count)) = (parts.next(), parts.next(), parts.next()) else {
        bail!("entry must be EMAIL:SLOT:COUNT, got {raw:?}");
    };
    let user = find_account(store, email)?;
    let slot = parse_slot(slot)?;
    let count: MealCount = count
        .trim()
        .parse()
        .map_err(|err: String| anyhow!("bad count in {raw:?}: {err}"))?;
    Ok(BatchEntry { user: user.id, slot, count })
}
