//! Property test: the stored wallet balance always equals the signed sum of
//! the surviving transaction rows, under any interleaving of credits,
//! debits, point-fix edits and deletes.

use chrono::Utc;
use khata_core::TxId;
use khata_ledger::{TxUpdate, WalletLedger};
use khata_test_utils::TestOrg;
use proptest::prelude::*;
use rust_decimal::Decimal;

#[derive(Clone, Debug)]
enum Op {
    Credit(u32),
    Debit(u32),
    Update(usize, u32),
    Delete(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1u32..=500_000).prop_map(Op::Credit),
        (1u32..=500_000).prop_map(Op::Debit),
        (0usize..8, 1u32..=500_000).prop_map(|(i, cents)| Op::Update(i, cents)),
        (0usize..8).prop_map(Op::Delete),
    ]
}

fn money(cents: u32) -> Decimal {
    Decimal::new(i64::from(cents), 2)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn stored_balance_equals_signed_sum(ops in proptest::collection::vec(op_strategy(), 1..24)) {
        let org = TestOrg::new();
        let member = org.add_member("Rafi", "rafi@example.com").id;
        let ledger = WalletLedger::new(org.admin_session(), org.store());
        let mut live: Vec<TxId> = Vec::new();

        for op in ops {
            match op {
                Op::Credit(cents) => {
                    let tx = ledger.credit(member, money(cents), "deposit", Utc::now()).unwrap();
                    live.push(tx.id);
                }
                Op::Debit(cents) => {
                    let tx = ledger.debit(member, money(cents), "correction", Utc::now()).unwrap();
                    live.push(tx.id);
                }
                Op::Update(i, cents) if !live.is_empty() => {
                    let id = live[i % live.len()];
                    ledger
                        .update_transaction(id, &TxUpdate {
                            amount: Some(money(cents)),
                            ..TxUpdate::default()
                        })
                        .unwrap();
                }
                Op::Delete(i) if !live.is_empty() => {
                    let id = live.remove(i % live.len());
                    ledger.delete_transaction(id).unwrap();
                }
                // Update/Delete against an empty ledger: nothing to do.
                _ => {}
            }

            let stored = org.store().user(member).unwrap().unwrap().wallet_balance;
            let replayed: Decimal = org
                .store()
                .wallet_txs_applied(member)
                .unwrap()
                .iter()
                .map(|tx| tx.signed_amount())
                .sum();
            prop_assert_eq!(stored, replayed);
        }

        // Snapshot drift is allowed after edits/deletes; balance drift never.
        let report = ledger.audit().unwrap();
        prop_assert!(report.balance_drift.is_empty());
    }
}
