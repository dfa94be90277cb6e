//! Server-assigned identifiers.
//!
//! The backend hands out integer ids for every entity. Each gets its own
//! newtype so a column id can never be passed where a task id is expected.

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                Ok(Self(s.trim().parse()?))
            }
        }

        impl From<u64> for $name {
            fn from(v: u64) -> Self {
                Self(v)
            }
        }
    };
}

define_id!(
    /// Identifier of a project (a board).
    ProjectId
);
define_id!(
    /// Identifier of a column within a project.
    ColumnId
);
define_id!(
    /// Identifier of a task card.
    TaskId
);
define_id!(
    /// Identifier of a user account.
    UserId
);
