//! Error types for the duel engine

use thiserror::Error;

/// Fieldless classification of a [`DuelError`]
///
/// Callers that only care about the category of a rejection (e.g. to pick an
/// HTTP status or a UI message template) match on this instead of the full error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotYourTurn,
    InvalidPhase,
    CannotAdvance,
    InvalidMove,
    CardNotFound,
    CardNotInExpectedZone,
    CannotPayCost,
    OncePerTurnExhausted,
    InvalidTarget,
    ChainOverflow,
    Unauthorized,
    Conflict,
    GameNotFound,
    Parse,
    Serialization,
    Io,
}

#[derive(Error, Debug)]
pub enum DuelError {
    #[error("Not your turn: {0}")]
    NotYourTurn(String),

    #[error("Invalid phase: {0}")]
    InvalidPhase(String),

    #[error("Cannot advance: {0}")]
    CannotAdvance(String),

    #[error("Invalid move: {0}")]
    InvalidMove(String),

    #[error("Card not found: {0}")]
    CardNotFound(u32),

    #[error("Card {card} is not in the expected zone: {reason}")]
    CardNotInExpectedZone { card: u32, reason: String },

    #[error("Cannot pay cost: {0}")]
    CannotPayCost(String),

    #[error("Once-per-turn limit reached: {0}")]
    OncePerTurnExhausted(String),

    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("Chain resolution exceeded {limit} links")]
    ChainOverflow { limit: usize },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Snapshot conflict: expected version {expected}, found {found}")]
    Conflict { expected: u64, found: u64 },

    #[error("Game not found: {0}")]
    GameNotFound(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DuelError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DuelError::NotYourTurn(_) => ErrorKind::NotYourTurn,
            DuelError::InvalidPhase(_) => ErrorKind::InvalidPhase,
            DuelError::CannotAdvance(_) => ErrorKind::CannotAdvance,
            DuelError::InvalidMove(_) => ErrorKind::InvalidMove,
            DuelError::CardNotFound(_) => ErrorKind::CardNotFound,
            DuelError::CardNotInExpectedZone { .. } => ErrorKind::CardNotInExpectedZone,
            DuelError::CannotPayCost(_) => ErrorKind::CannotPayCost,
            DuelError::OncePerTurnExhausted(_) => ErrorKind::OncePerTurnExhausted,
            DuelError::InvalidTarget(_) => ErrorKind::InvalidTarget,
            DuelError::ChainOverflow { .. } => ErrorKind::ChainOverflow,
            DuelError::Unauthorized(_) => ErrorKind::Unauthorized,
            DuelError::Conflict { .. } => ErrorKind::Conflict,
            DuelError::GameNotFound(_) => ErrorKind::GameNotFound,
            DuelError::Parse(_) => ErrorKind::Parse,
            DuelError::Serialization(_) => ErrorKind::Serialization,
            DuelError::Io(_) => ErrorKind::Io,
        }
    }

    /// Is this a rules rejection (as opposed to an infrastructure failure)?
    pub fn is_rule_violation(&self) -> bool {
        !matches!(
            self.kind(),
            ErrorKind::ChainOverflow
                | ErrorKind::Unauthorized
                | ErrorKind::Conflict
                | ErrorKind::GameNotFound
                | ErrorKind::Parse
                | ErrorKind::Serialization
                | ErrorKind::Io
        )
    }
}

impl From<serde_json::Error> for DuelError {
    fn from(err: serde_json::Error) -> Self {
        DuelError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DuelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_mapping() {
        let err = DuelError::OncePerTurnExhausted("Pot of Plenty".to_string());
        assert_eq!(err.kind(), ErrorKind::OncePerTurnExhausted);
        assert!(err.is_rule_violation());

        let err = DuelError::Conflict { expected: 3, found: 4 };
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(!err.is_rule_violation());
    }

    #[test]
    fn test_error_display_carries_reason() {
        let err = DuelError::InvalidMove("requires tribute".to_string());
        assert_eq!(err.to_string(), "Invalid move: requires tribute");
    }
}
