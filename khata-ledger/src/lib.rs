//! Wallet ledger primitives.
//!
//! Every balance mutation in the system goes through [`WalletLedger`]: the
//! stored `wallet_balance` of a user and the signed sum of their transaction
//! rows move together inside one transaction, which is what keeps the ledger
//! invariant procedural rather than hopeful. Edits and deletes are point
//! fixes; [`WalletLedger::audit`] reports the snapshot drift backdated edits
//! can leave behind, and [`WalletLedger::rebuild_snapshots`] repairs it on
//! demand.

mod audit;
mod error;
mod wallet;

pub use audit::{AuditReport, BalanceDrift, RebuildOutcome, SnapshotDrift};
pub use error::{LedgerError, LedgerResult};
pub use wallet::{TxUpdate, WalletLedger};
