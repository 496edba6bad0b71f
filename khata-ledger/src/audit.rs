use khata_core::{TxId, UserId};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};

use crate::wallet::WalletLedger;
use crate::{LedgerError, LedgerResult};

/// A user whose stored balance no longer equals the signed sum of their rows.
///
/// This should never appear; every balance write goes through the ledger in
/// the same transaction as its row.
#[derive(Clone, Debug, Serialize)]
pub struct BalanceDrift {
    pub user_id: UserId,
    pub stored: Decimal,
    pub ledger_sum: Decimal,
    /// `stored - ledger_sum`.
    pub delta: Decimal,
}

/// A `balance_after` snapshot that differs from the sum replayed in `seq`
/// order. Expected after point-fix edits or deletes of earlier rows.
#[derive(Clone, Debug, Serialize)]
pub struct SnapshotDrift {
    pub user_id: UserId,
    pub tx_id: TxId,
    pub seq: i64,
    pub recorded: Decimal,
    pub replayed: Decimal,
}

/// Everything the audit found across one organization.
#[derive(Clone, Debug, Default, Serialize)]
pub struct AuditReport {
    pub users_checked: usize,
    pub balance_drift: Vec<BalanceDrift>,
    pub snapshot_drift: Vec<SnapshotDrift>,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.balance_drift.is_empty() && self.snapshot_drift.is_empty()
    }
}

/// What [`WalletLedger::rebuild_snapshots`] changed.
#[derive(Clone, Debug, Serialize)]
pub struct RebuildOutcome {
    pub rows_updated: usize,
    pub final_balance: Decimal,
    pub balance_changed: bool,
}

impl WalletLedger {
    /// Admin: replay every user's ledger and report both kinds of drift.
    ///
    /// Balance drift is an invariant violation. Snapshot drift is the
    /// documented cost of point-fix edits; it does not affect balances and
    /// is repaired only by [`WalletLedger::rebuild_snapshots`].
    pub fn audit(&self) -> LedgerResult<AuditReport> {
        self.session.require_admin()?;
        let users = self.store.users()?;
        let mut report = AuditReport {
            users_checked: users.len(),
            ..AuditReport::default()
        };
        for user in &users {
            let applied = self.store.wallet_txs_applied(user.id)?;
            let mut running = Decimal::ZERO;
            for tx in &applied {
                running += tx.signed_amount();
                if tx.balance_after != running {
                    report.snapshot_drift.push(SnapshotDrift {
                        user_id: user.id,
                        tx_id: tx.id,
                        seq: tx.seq,
                        recorded: tx.balance_after,
                        replayed: running,
                    });
                }
            }
            if user.wallet_balance != running {
                report.balance_drift.push(BalanceDrift {
                    user_id: user.id,
                    stored: user.wallet_balance,
                    ledger_sum: running,
                    delta: user.wallet_balance - running,
                });
            }
        }
        if report.is_clean() {
            info!(users = report.users_checked, "ledger audit clean");
        } else {
            warn!(
                balance_drift = report.balance_drift.len(),
                snapshot_drift = report.snapshot_drift.len(),
                "ledger audit found drift"
            );
        }
        Ok(report)
    }

    /// Admin: recompute one user's `balance_after` chain in `seq` order and
    /// re-point their stored balance at the final sum.
    pub fn rebuild_snapshots(&self, user: UserId) -> LedgerResult<RebuildOutcome> {
        self.session.require_admin()?;
        let outcome = self.store.with_tx::<_, LedgerError>(|tx| {
            let owner = tx
                .user(user)?
                .ok_or_else(|| LedgerError::NotFound(format!("user {user}")))?;
            let applied = tx.wallet_txs_applied(user)?;
            let mut running = Decimal::ZERO;
            let mut rows_updated = 0usize;
            for row in &applied {
                running += row.signed_amount();
                if row.balance_after != running {
                    tx.set_balance_after(row.seq, running)?;
                    rows_updated += 1;
                }
            }
            let balance_changed = owner.wallet_balance != running;
            if balance_changed {
                tx.set_wallet_balance(user, running)?;
            }
            Ok(RebuildOutcome {
                rows_updated,
                final_balance: running,
                balance_changed,
            })
        })?;
        info!(
            user = %user,
            rows = outcome.rows_updated,
            balance = %outcome.final_balance,
            "wallet snapshots rebuilt"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TxUpdate;
    use chrono::Utc;
    use khata_core::AuthError;
    use khata_test_utils::TestOrg;
    use rust_decimal_macros::dec;

    fn seeded() -> (TestOrg, UserId, WalletLedger) {
        let org = TestOrg::new();
        let member = org.add_member("Rafi", "rafi@example.com").id;
        let ledger = WalletLedger::new(org.admin_session(), org.store());
        (org, member, ledger)
    }

    #[test]
    fn normal_flow_audits_clean() {
        let (_org, member, ledger) = seeded();
        ledger.credit(member, dec!(500), "deposit", Utc::now()).unwrap();
        ledger.debit(member, dec!(120), "correction", Utc::now()).unwrap();
        let report = ledger.audit().unwrap();
        assert!(report.is_clean());
        assert_eq!(report.users_checked, 2);
    }

    #[test]
    fn editing_an_early_row_leaves_later_snapshots_stale() {
        let (_org, member, ledger) = seeded();
        let first = ledger.credit(member, dec!(500), "deposit", Utc::now()).unwrap();
        let second = ledger.credit(member, dec!(200), "deposit", Utc::now()).unwrap();
        ledger
            .update_transaction(
                first.id,
                &TxUpdate {
                    amount: Some(dec!(450)),
                    ..TxUpdate::default()
                },
            )
            .unwrap();

        let report = ledger.audit().unwrap();
        // Balance stays consistent: 450 + 200 both stored and replayed.
        assert!(report.balance_drift.is_empty());
        assert_eq!(report.snapshot_drift.len(), 1);
        let drift = &report.snapshot_drift[0];
        assert_eq!(drift.seq, second.seq);
        assert_eq!(drift.recorded, dec!(700));
        assert_eq!(drift.replayed, dec!(650));
    }

    #[test]
    fn deleting_an_early_row_leaves_later_snapshots_stale() {
        let (_org, member, ledger) = seeded();
        let first = ledger.credit(member, dec!(500), "deposit", Utc::now()).unwrap();
        ledger.credit(member, dec!(200), "deposit", Utc::now()).unwrap();
        ledger.delete_transaction(first.id).unwrap();

        let report = ledger.audit().unwrap();
        assert!(report.balance_drift.is_empty());
        assert_eq!(report.snapshot_drift.len(), 1);
        assert_eq!(report.snapshot_drift[0].recorded, dec!(700));
        assert_eq!(report.snapshot_drift[0].replayed, dec!(200));
    }

    #[test]
    fn rebuild_repairs_snapshot_drift() {
        let (org, member, ledger) = seeded();
        let first = ledger.credit(member, dec!(500), "deposit", Utc::now()).unwrap();
        ledger.credit(member, dec!(200), "deposit", Utc::now()).unwrap();
        ledger.delete_transaction(first.id).unwrap();

        let outcome = ledger.rebuild_snapshots(member).unwrap();
        assert_eq!(outcome.rows_updated, 1);
        assert_eq!(outcome.final_balance, dec!(200));
        assert!(!outcome.balance_changed);

        assert!(ledger.audit().unwrap().is_clean());
        let applied = org.store().wallet_txs_applied(member).unwrap();
        assert_eq!(applied.len(), 1);
        assert_eq!(applied[0].balance_after, dec!(200));
    }

    #[test]
    fn rebuild_of_unknown_user_is_not_found() {
        let (_org, _member, ledger) = seeded();
        assert!(matches!(
            ledger.rebuild_snapshots(UserId::new()),
            Err(LedgerError::NotFound(_))
        ));
    }

    #[test]
    fn members_cannot_audit() {
        let (org, member, ledger) = seeded();
        ledger.credit(member, dec!(10), "deposit", Utc::now()).unwrap();
        let user = org.store().user(member).unwrap().unwrap();
        let member_ledger = WalletLedger::new(org.session_for(&user), org.store());
        assert!(matches!(
            member_ledger.audit(),
            Err(LedgerError::Unauthorized(AuthError::AdminRequired))
        ));
    }
}
