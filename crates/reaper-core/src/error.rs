use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReaperError {
    #[error("config invalid: {0}")]
    ConfigInvalid(String),

    #[error("account mismatch: expected {expected}, got {actual}")]
    AccountMismatch { expected: String, actual: String },

    #[error("unknown resource kind: {0}")]
    UnknownKindName(String),

    #[error("property extraction failed: {0}")]
    PropertyExtraction(String),

    #[error("list failed: {0}")]
    ListFailed(String),

    #[error("remove failed: {0}")]
    RemoveFailed(String),

    #[error("run loop stalled: all remaining items are failed\n{0}")]
    FailStall(String),

    #[error("max wait retries exceeded")]
    WaitStall,

    #[error("AWS error: {0}")]
    Aws(String),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
