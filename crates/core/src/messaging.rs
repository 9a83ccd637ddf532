//! Portal users, messages and conversations.
//!
//! A conversation is a two-participant thread between a clinician or care
//! team member and a patient. It carries a denormalized copy of its last
//! message (that copy fixes inbox ordering); unread counts are *not* stored
//! here; the store derives them from message read flags so they cannot
//! drift.

use crate::ids::{ConversationId, MessageId, ParticipantId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role of a portal user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Clinical staff member.
    Clinician,
    /// Care coordinator supporting clinicians.
    CareTeam,
    /// Portal administrator.
    Admin,
}

impl UserRole {
    /// Returns the string representation of this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clinician => "clinician",
            Self::CareTeam => "care_team",
            Self::Admin => "admin",
        }
    }
}

/// A clinician, care team member or administrator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// A single message between two participants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub sender: ParticipantId,
    pub recipient: ParticipantId,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub is_read: bool,
}

/// A two-participant message thread.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub participants: [ParticipantId; 2],
    /// Denormalized copy of the newest message, refreshed on every append.
    pub last_message: Message,
}

impl Conversation {
    /// Whether the given participant is part of this conversation.
    pub fn involves(&self, id: &ParticipantId) -> bool {
        self.participants.iter().any(|p| p == id)
    }

    /// The participant on the other side from `viewer`, if `viewer` is in
    /// this conversation at all.
    pub fn other_participant(&self, viewer: &ParticipantId) -> Option<&ParticipantId> {
        if !self.involves(viewer) {
            return None;
        }
        self.participants.iter().find(|p| *p != viewer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conversation() -> Conversation {
        let last_message = Message {
            id: MessageId::new("msg1"),
            sender: ParticipantId::new("u1"),
            recipient: ParticipantId::new("p1"),
            content: "hello".into(),
            timestamp: Utc::now(),
            is_read: false,
        };
        Conversation {
            id: ConversationId::new("conv1"),
            participants: [ParticipantId::new("u1"), ParticipantId::new("p1")],
            last_message,
        }
    }

    #[test]
    fn other_participant_is_the_far_side() {
        let conv = conversation();
        let viewer = ParticipantId::new("u1");
        let other = conv.other_participant(&viewer).expect("viewer is in thread");
        assert_eq!(other.as_str(), "p1");
    }

    #[test]
    fn other_participant_requires_membership() {
        let conv = conversation();
        let outsider = ParticipantId::new("u9");
        assert!(conv.other_participant(&outsider).is_none());
    }

    #[test]
    fn role_uses_snake_case_on_the_wire() {
        let json = serde_json::to_string(&UserRole::CareTeam).expect("serialize role");
        assert_eq!(json, "\"care_team\"");
    }
}
