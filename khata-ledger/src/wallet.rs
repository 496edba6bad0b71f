use chrono::{DateTime, Utc};
use khata_core::{Session, TxId, TxKind, UserId};
use khata_store::{TenantStore, TxWindow, WalletTx};
use rust_decimal::Decimal;
use tracing::info;

use crate::{LedgerError, LedgerResult};

/// Partial replacement for an existing transaction; `None` keeps the field.
#[derive(Clone, Debug, Default)]
pub struct TxUpdate {
    pub amount: Option<Decimal>,
    pub description: Option<String>,
    pub entry_date: Option<DateTime<Utc>>,
}

/// Wallet mutations for one organization.
///
/// The write path is always: read the owner's balance, move it, write it
/// back, and record the row with its `balance_after` snapshot, all inside
/// one immediate transaction. Nothing here is ever applied partially.
pub struct WalletLedger {
    pub(crate) session: Session,
    pub(crate) store: TenantStore,
}

impl WalletLedger {
    pub fn new(session: Session, store: TenantStore) -> Self {
        Self { session, store }
    }

    /// Admin: add money to a member's wallet.
    pub fn credit(
        &self,
        user: UserId,
        amount: Decimal,
        description: &str,
        entry_date: DateTime<Utc>,
    ) -> LedgerResult<WalletTx> {
        self.apply(user, TxKind::Credit, amount, description, entry_date)
    }

    /// Admin: take money out, e.g. a manual correction. The balance may go
    /// negative; members owing the mess at month end is normal.
    pub fn debit(
        &self,
        user: UserId,
        amount: Decimal,
        description: &str,
        entry_date: DateTime<Utc>,
    ) -> LedgerResult<WalletTx> {
        self.apply(user, TxKind::Debit, amount, description, entry_date)
    }

    fn apply(
        &self,
        user: UserId,
        kind: TxKind,
        amount: Decimal,
        description: &str,
        entry_date: DateTime<Utc>,
    ) -> LedgerResult<WalletTx> {
        self.session.require_admin()?;
        let description = validate_description(description)?;
        validate_amount(amount)?;

        let recorded = self.store.with_tx::<_, LedgerError>(|tx| {
            let owner = tx
                .user(user)?
                .ok_or_else(|| LedgerError::NotFound(format!("user {user}")))?;
            let new_balance = owner.wallet_balance + kind.signed(amount);
            tx.set_wallet_balance(user, new_balance)?;
            let mut row = WalletTx {
                seq: 0,
                id: TxId::new(),
                org_id: tx.org(),
                user_id: user,
                kind,
                amount,
                description,
                entry_date,
                balance_after: new_balance,
            };
            row.seq = tx.insert_wallet_tx(&row)?;
            Ok(row)
        })?;
        info!(
            user = %user,
            kind = %kind,
            amount = %amount,
            balance = %recorded.balance_after,
            "wallet transaction recorded"
        );
        Ok(recorded)
    }

    /// Admin: point-fix an existing row.
    ///
    /// The amount difference moves the owner's current balance and this
    /// row's own `balance_after`. Later rows' snapshots are left alone;
    /// that drift is visible to [`WalletLedger::audit`] and repaired only
    /// by an explicit [`WalletLedger::rebuild_snapshots`].
    pub fn update_transaction(&self, id: TxId, update: &TxUpdate) -> LedgerResult<WalletTx> {
        self.session.require_admin()?;
        if let Some(amount) = update.amount {
            validate_amount(amount)?;
        }
        let description = update
            .description
            .as_deref()
            .map(validate_description)
            .transpose()?;

        let updated = self.store.with_tx::<_, LedgerError>(|tx| {
            let old = tx
                .wallet_tx(id)?
                .ok_or_else(|| LedgerError::NotFound(format!("transaction {id}")))?;
            let owner = tx
                .user(old.user_id)?
                .ok_or_else(|| LedgerError::NotFound(format!("user {}", old.user_id)))?;

            let new_amount = update.amount.unwrap_or(old.amount);
            let signed_diff = old.kind.signed(new_amount - old.amount);
            if !signed_diff.is_zero() {
                tx.set_wallet_balance(owner.id, owner.wallet_balance + signed_diff)?;
            }

            let row = WalletTx {
                amount: new_amount,
                description: description.clone().unwrap_or(old.description.clone()),
                entry_date: update.entry_date.unwrap_or(old.entry_date),
                balance_after: old.balance_after + signed_diff,
                ..old
            };
            tx.update_wallet_tx(&row)?;
            Ok(row)
        })?;
        info!(tx = %id, "wallet transaction updated");
        Ok(updated)
    }

    /// Admin: remove a row and reverse its effect on the owner's balance.
    ///
    /// Same non-cascading caveat as [`WalletLedger::update_transaction`]:
    /// snapshots of rows recorded after this one keep their old values.
    pub fn delete_transaction(&self, id: TxId) -> LedgerResult<()> {
        self.session.require_admin()?;
        self.store.with_tx::<_, LedgerError>(|tx| {
            let old = tx
                .wallet_tx(id)?
                .ok_or_else(|| LedgerError::NotFound(format!("transaction {id}")))?;
            let owner = tx
                .user(old.user_id)?
                .ok_or_else(|| LedgerError::NotFound(format!("user {}", old.user_id)))?;
            tx.set_wallet_balance(owner.id, owner.wallet_balance - old.signed_amount())?;
            tx.delete_wallet_tx(id)?;
            Ok(())
        })?;
        info!(tx = %id, "wallet transaction deleted");
        Ok(())
    }

    /// One user's transactions, newest first. Members see only their own;
    /// admins see anyone's.
    pub fn transactions_for(
        &self,
        user: UserId,
        window: Option<TxWindow>,
    ) -> LedgerResult<Vec<WalletTx>> {
        self.session.require_org()?;
        if user != self.session.user_id {
            self.session.require_admin()?;
        }
        Ok(self.store.wallet_txs_for_user(user, window)?)
    }
}

fn validate_amount(amount: Decimal) -> LedgerResult<()> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::Invalid(format!(
            "amount must be positive, got {amount}"
        )));
    }
    Ok(())
}

fn validate_description(raw: &str) -> LedgerResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::Invalid("description must not be empty".to_string()));
    }
    Ok(trimmed.to_string())
}
