use thiserror::Error;

use crate::gateway::TransportError;

#[derive(Error, Debug)]
pub enum BrainError {
    #[error("Malformed reading from sensor '{sensor}': {reason}")]
    MalformedReading { sensor: String, reason: String },

    #[error("World state shape mismatch: {0}")]
    StateShape(String),

    #[error("Invalid sensor group: {0}")]
    InvalidGroup(String),

    #[error("Rule load error: {0}")]
    RuleLoad(String),

    #[error("Invalid decision from rule base: {0:?}")]
    InvalidDecision(String),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Connection exhausted after {attempts} attempts")]
    ConnectionExhausted { attempts: u32 },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BrainError {
    /// Errors that end the control loop rather than a single tick.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, BrainError::Transport(_) | BrainError::MalformedReading { .. })
    }
}

pub type Result<T> = std::result::Result<T, BrainError>;
