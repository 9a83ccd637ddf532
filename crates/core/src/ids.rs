//! Typed identifiers for portal entities.
//!
//! Ids are opaque strings rather than raw UUIDs: seeded demo records carry
//! short readable ids (`p1`, `u1`, `cp1`) while records created in-session
//! get fresh v4 UUIDs via `generate()`. The newtypes keep patient, user and
//! plan ids from being mixed up at call sites.
//!
//! Message senders and recipients are weak references that may point at
//! either a [`UserId`] or a [`PatientId`]; [`ParticipantId`] is that union.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps an existing identifier value.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Generates a fresh random identifier.
            pub fn generate() -> Self {
                Self(Uuid::new_v4().simple().to_string())
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }
    };
}

string_id!(
    /// Identifier of a patient record.
    PatientId
);
string_id!(
    /// Identifier of a portal user (clinician, care team member or admin).
    UserId
);
string_id!(
    /// Identifier of a care plan.
    CarePlanId
);
string_id!(
    /// Identifier of a meal plan (shared by reference across care plans).
    MealPlanId
);
string_id!(
    /// Identifier of a two-party message thread.
    ConversationId
);
string_id!(
    /// Identifier of a single message.
    MessageId
);

/// A conversation participant: either a portal user or a patient.
///
/// The underlying id spaces do not overlap in practice, so the union is a
/// plain string compared against both sides.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    /// Wraps an existing identifier value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this participant is the given user.
    pub fn is_user(&self, user: &UserId) -> bool {
        self.0 == user.as_str()
    }

    /// Whether this participant is the given patient.
    pub fn is_patient(&self, patient: &PatientId) -> bool {
        self.0 == patient.as_str()
    }
}

impl std::fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&UserId> for ParticipantId {
    fn from(id: &UserId) -> Self {
        Self(id.as_str().to_owned())
    }
}

impl From<&PatientId> for ParticipantId {
    fn from(id: &PatientId) -> Self {
        Self(id.as_str().to_owned())
    }
}

impl From<&str> for ParticipantId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}
