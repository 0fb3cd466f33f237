//! Unified error model
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LumenError {
    /// Not enough history to produce a trustworthy result
    #[error("DATA/insufficient: need at least {required} samples, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("CONFIG/{0}")]
    Config(String),

    #[error("STORE/{0}")]
    Store(String),

    #[error("INPUT/{0}")]
    InvalidInput(String),
}

impl LumenError {
    pub fn insufficient(required: usize, actual: usize) -> Self {
        LumenError::InsufficientData { required, actual }
    }

    /// True when the caller should render a "not enough history yet" state
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, LumenError::InsufficientData { .. })
    }
}

pub type Result<T> = std::result::Result<T, LumenError>;
