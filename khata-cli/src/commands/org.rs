use anyhow::{anyhow, Result};
use clap::Subcommand;
use khata_roster::{register_organization, Registration};
use serde_json::json;

use super::Ctx;

#[derive(Subcommand)]
pub enum OrgCmd {
    /// Create an organization with its first admin account.
    Register {
        /// Organization name.
        name: String,
        #[arg(long)]
        admin_name: String,
        /// Used afterwards as `--actor`.
        #[arg(long)]
        admin_email: String,
        /// One of mess, hostel, restaurant.
        #[arg(long)]
        kind: Option<String>,
    },
    /// Show the acting account's organization.
    Show,
}

pub fn run(ctx: &Ctx, cmd: OrgCmd) -> Result<()> {
    match cmd {
        OrgCmd::Register { name, admin_name, admin_email, kind } => {
            let registered = register_organization(
                &ctx.db,
                &Registration {
                    organization_name: name,
                    organization_kind: kind,
                    admin_name,
                    admin_email,
                },
            )?;
            ctx.emit(
                &json!({
                    "organization": registered.organization,
                    "admin": registered.admin,
                }),
                format!(
                    "registered {} ({}); admin {} <{}>",
                    registered.organization.name,
                    registered.organization.kind,
                    registered.admin.name,
                    registered.admin.email
                ),
            )
        }
        OrgCmd::Show => {
            let (_, store) = ctx.tenant()?;
            let org = store
                .organization()?
                .ok_or_else(|| anyhow!("organization row is missing"))?;
            ctx.emit(
                &org,
                format!(
                    "{} ({}), created {}",
                    org.name,
                    org.kind,
                    org.created_at.date_naive()
                ),
            )
        }
    }
}
