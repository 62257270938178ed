use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A record rejected before it reached the database
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("Validation failed: {error_messages:?}")]
pub struct ValidationError {
    pub error_messages: Vec<String>,
}

impl ValidationError {
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            error_messages: vec![message.into()],
        }
    }
}
