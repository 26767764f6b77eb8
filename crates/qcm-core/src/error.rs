use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum QcmError {
    #[error("invalid scoring policy: {0}")]
    InvalidPolicy(String),
}
