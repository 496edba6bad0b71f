use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Direction of a wallet transaction.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TxKind {
    Credit,
    Debit,
}

impl TxKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TxKind::Credit => "CREDIT",
            TxKind::Debit => "DEBIT",
        }
    }

    /// The stored positive amount with this kind's sign applied.
    pub fn signed(self, amount: Decimal) -> Decimal {
        match self {
            TxKind::Credit => amount,
            TxKind::Debit => -amount,
        }
    }
}

impl fmt::Display for TxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TxKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREDIT" => Ok(TxKind::Credit),
            "DEBIT" => Ok(TxKind::Debit),
            other => Err(format!("unknown transaction kind: {other}")),
        }
    }
}
