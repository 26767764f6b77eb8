use qcm_core::QcmError;
use qcm_ingest::IngestError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Scoring(#[from] QcmError),

    #[error("ingest error: {0}")]
    Ingest(#[from] IngestError),

    #[error("logging init failed: {0}")]
    Logging(String),
}
