use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

entity_id!(
    /// Identifier of an organization, the tenant boundary every row hangs off.
    OrgId
);
entity_id!(
    /// Identifier of a user (member or admin) within an organization.
    UserId
);
entity_id!(
    /// Identifier of a meal schedule, unique per `(org, date, slot)`.
    ScheduleId
);
entity_id!(
    /// Identifier of a per-user meal record under a schedule.
    RecordId
);
entity_id!(
    /// Identifier of a wallet transaction.
    TxId
);
entity_id!(
    /// Identifier of a shared expense.
    ExpenseId
);
