use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Declares a `u64` newtype identifier with the usual conversions.
///
/// Identifiers serialize as bare numbers so they can be used directly in
/// backend payloads and query strings.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            #[must_use]
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            /// Returns the underlying u64 value
            #[must_use]
            pub const fn value(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse::<u64>()
                    .map(Self::new)
                    .map_err(|_| ParseIdError {
                        kind: stringify!($name),
                    })
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }
    };
}

define_id!(
    /// Identifier of a question in the shared question bank.
    QuestionId
);
define_id!(
    /// Identifier of an assignment published to a class.
    AssignmentId
);
define_id!(
    /// Identifier of a class the student can join.
    ClassId
);
define_id!(
    /// Identifier of a class announcement.
    AnnouncementId
);
define_id!(
    /// Identifier of the signed-in student.
    UserId
);

/// Error type for parsing an id from a string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: &'static str,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {} from string", self.kind)
    }
}

impl std::error::Error for ParseIdError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_id_displays_bare_number() {
        assert_eq!(QuestionId::new(42).to_string(), "42");
        assert_eq!(format!("{:?}", QuestionId::new(42)), "QuestionId(42)");
    }

    #[test]
    fn assignment_id_parses_with_whitespace() {
        let id: AssignmentId = " 17 ".parse().unwrap();
        assert_eq!(id, AssignmentId::new(17));
    }

    #[test]
    fn class_id_rejects_garbage() {
        let err = "abc".parse::<ClassId>().unwrap_err();
        assert_eq!(err.to_string(), "failed to parse ClassId from string");
    }

    #[test]
    fn ids_serialize_transparently() {
        let json = serde_json::to_string(&AnnouncementId::new(9)).unwrap();
        assert_eq!(json, "9");
        let back: AnnouncementId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, AnnouncementId::new(9));
    }
}
