//! Validated single-character identifiers.
//!
//! Lines, pages and schedules are each addressed by one character from a
//! fixed alphabet. The newtypes here can only hold valid identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Error;

macro_rules! char_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal, $alphabet:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "char", into = "char")]
        pub struct $name(char);

        impl $name {
            /// Characters accepted as identifiers.
            pub const ALPHABET: &'static str = $alphabet;

            /// Creates an identifier, or `None` if `c` is outside the alphabet.
            #[must_use]
            pub fn new(c: char) -> Option<Self> {
                Self::ALPHABET.contains(c).then_some(Self(c))
            }

            /// Returns the identifier character.
            #[must_use]
            pub const fn as_char(self) -> char {
                self.0
            }
        }

        impl TryFrom<char> for $name {
            type Error = Error;

            fn try_from(c: char) -> Result<Self, Self::Error> {
                Self::new(c).ok_or(Error::InvalidIdentifier {
                    kind: $kind,
                    value: c,
                })
            }
        }

        impl From<$name> for char {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

char_id!(
    /// A display line of the sign.
    LineId,
    "line",
    "123456789"
);

char_id!(
    /// A page slot on a line.
    PageId,
    "page",
    "ABCDEFGHIJKLMNOPQRSTUVWXYZ"
);

char_id!(
    /// A schedule slot.
    ScheduleId,
    "schedule",
    "ABCDEFGHIJKLMNOPQRSTUVWXYZ"
);

impl Default for LineId {
    fn default() -> Self {
        Self('1')
    }
}

impl Default for PageId {
    fn default() -> Self {
        Self('A')
    }
}
