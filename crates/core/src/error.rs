use crate::ids::{CarePlanId, ConversationId, ParticipantId, PatientId};

#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("patient not found: {0}")]
    PatientNotFound(PatientId),
    #[error("care plan not found: {0}")]
    CarePlanNotFound(CarePlanId),
    #[error("conversation not found: {0}")]
    ConversationNotFound(ConversationId),
    #[error("{0} is not a participant in this conversation")]
    NotAParticipant(ParticipantId),
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("failed to create session state directory: {0}")]
    SessionDirCreation(std::io::Error),
    #[error("failed to write session marker: {0}")]
    SessionWrite(std::io::Error),
    #[error("failed to clear session marker: {0}")]
    SessionClear(std::io::Error),
    #[error("failed to serialize session marker: {0}")]
    SessionSerialization(serde_json::Error),
}

pub type PortalResult<T> = std::result::Result<T, PortalError>;
