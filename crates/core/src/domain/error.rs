// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Invalid probe key: {0}")]
    InvalidKey(String),

    #[error("Invalid probe expression: {0}")]
    InvalidExpression(String),

    #[error("Duplicate probe key: {0}")]
    DuplicateKey(String),

    #[error("Registration after execution: {0}")]
    LateRegistration(String),
}

pub type Result<T> = std::result::Result<T, ProbeError>;
