//! Identifiers of the stored entities

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Defines a string-backed identifier type
macro_rules! synthetise_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Generate a random identifier
            pub fn random() -> Self {
                Self(Uuid::new_v4().to_hyphenated().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    }
}

synthetise_id!(
    /// Identifies an account
    AccountId
);
synthetise_id!(
    /// Identifies a calendar
    CalendarId
);
synthetise_id!(
    /// Identifies an event
    EventId
);
synthetise_id!(
    /// Identifies an occurrence of an event
    BusytimeId
);
