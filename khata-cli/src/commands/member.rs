use std::fmt::Write as _;

use anyhow::Result;
use clap::Subcommand;
use khata_roster::{MemberUpdate, Roster};

use super::{find_account, Ctx};

#[derive(Subcommand)]
pub enum MemberCmd {
    /// Add a member with a zero wallet.
    Add { name: String, email: String },
    /// Every account in the organization, name order.
    List,
    /// Edit a member; flags left out keep the current value.
    Update {
        /// Email of the account to edit.
        email: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        new_email: Option<String>,
        #[arg(long)]
        active: Option<bool>,
    },
    /// Disable an account; wallet and history survive.
    Deactivate { email: String },
    /// Delete an account; refused once it has ledger or meal history.
    Remove { email: String },
    /// Rename the acting account.
    SetName { name: String },
}

pub fn run(ctx: &Ctx, cmd: MemberCmd) -> Result<()> {
    let (session, store) = ctx.tenant()?;
    let roster = Roster::new(session, store.clone());
    match cmd {
        MemberCmd::Add { name, email } => {
            let member = roster.add_member(&name, &email)?;
            ctx.emit(
                &member,
                format!("added {} <{}> ({})", member.name, member.email, member.id),
            )
        }
        MemberCmd::List => {
            let members = roster.members()?;
            let mut text = String::new();
            for member in &members {
                let state = if member.is_active { "active" } else { "inactive" };
                let _ = writeln!(
                    text,
                    "{} <{}> {} {} balance {}",
                    member.name, member.email, member.role, state, member.wallet_balance
                );
            }
            ctx.emit(&members, text.trim_end().to_string())
        }
        MemberCmd::Update { email, name, new_email, active } => {
            let current = find_account(&store, &email)?;
            let update = MemberUpdate {
                name: name.unwrap_or(current.name),
                email: new_email.unwrap_or(current.email),
                is_active: active.unwrap_or(current.is_active),
            };
            roster.update_member(current.id, &update)?;
            ctx.emit(
                &update.email,
                format!("updated {} <{}>", update.name, update.email),
            )
        }
        MemberCmd::Deactivate { email } => {
            let member = find_account(&store, &email)?;
            roster.deactivate_member(member.id)?;
            ctx.emit(&member.id, format!("deactivated {}", member.email))
        }
        MemberCmd::Remove { email } => {
            let member = find_account(&store, &email)?;
            roster.remove_member(member.id)?;
            ctx.emit(&member.id, format!("removed {}", member.email))
        }
        MemberCmd::SetName { name } => {
            roster.update_own_name(&name)?;
            let me = roster.profile()?;
            ctx.emit(&me, format!("renamed acting account to {}", me.name))
        }
    }
}
