use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use khata_core::{MealSlot, Period, Session};
use khata_roster::session_for_email;
use khata_store::{Database, TenantStore, User};
use serde::Serialize;

use crate::settings::Settings;

pub mod expense;
pub mod meal;
pub mod member;
pub mod org;
pub mod report;
pub mod wallet;

/// Everything a handler needs: loaded settings, the database handle and the
/// identity the command runs as.
pub struct Ctx {
    pub settings: Settings,
    pub db: Database,
    pub json: bool,
    actor: Option<String>,
}

impl Ctx {
    pub fn new(settings: Settings, db: Database, json: bool, actor: Option<String>) -> Self {
        let actor = actor.or_else(|| settings.actor.clone());
        Self { settings, db, json, actor }
    }

    /// Session for the acting account, from `--actor` or the config file.
    pub fn session(&self) -> Result<Session> {
        let email = self.actor.as_deref().ok_or_else(|| {
            anyhow!("no acting account; pass --actor <email> or set `actor` in khata.toml")
        })?;
        let (session, _) = session_for_email(&self.db, email)?;
        Ok(session)
    }

    /// The acting session plus the store scoped to its organization.
    pub fn tenant(&self) -> Result<(Session, TenantStore)> {
        let session = self.session()?;
        let org = session.require_org()?;
        let store = self.db.tenant(org);
        Ok((session, store))
    }

    /// Prints pretty JSON in `--json` mode, otherwise the rendered text.
    pub fn emit<T: Serialize>(&self, value: &T, text: String) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            println!("{text}");
        }
        Ok(())
    }
}

/// `YYYY-MM` to its calendar month; absent means the current month.
pub fn month_period(settings: &Settings, raw: Option<&str>) -> Result<Period> {
    match raw {
        Some(raw) => {
            let first = NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d")
                .with_context(|| format!("invalid month {raw:?}, expected YYYY-MM"))?;
            Ok(Period::month_of(first))
        }
        None => Ok(Period::month_of(settings.today())),
    }
}

/// Case-insensitive slot name, so `lunch` works as well as `LUNCH`.
pub fn parse_slot(raw: &str) -> Result<MealSlot> {
    raw.trim()
        .to_ascii_uppercase()
        .parse()
        .map_err(|err: String| anyhow!(err))
}

/// Org-scoped account lookup; other tenants' emails read as missing.
pub fn find_account(store: &TenantStore, email: &str) -> Result<User> {
    store
        .user_by_email(email.trim())?
        .ok_or_else(|| anyhow!("no account for {email} in this organization"))
}

/// UTC midnight of `date` when given, otherwise right now.
pub fn entry_instant(date: Option<NaiveDate>) -> DateTime<Utc> {
    match date {
        Some(date) => date.and_time(NaiveTime::MIN).and_utc(),
        None => Utc::now(),
    }
}
