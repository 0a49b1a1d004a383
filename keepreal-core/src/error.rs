use thiserror::Error;

#[derive(Error, Debug)]
pub enum KeepRealError {
    #[error("Capture is too stale: {age_secs}s old, must be minted within {limit_secs}s of capture")]
    StaleCapture { age_secs: i64, limit_secs: i64 },

    #[error("Hardware violation: no camera detected")]
    NoCameraHardware,

    #[error("Device mismatch: reality proofs require a mobile-class device")]
    DeviceMismatch,

    #[error("Caption is {len} characters, maximum is {max}")]
    CaptionTooLong { len: usize, max: usize },

    #[error("Content upload failed: {0}")]
    UploadFailed(String),

    #[error("Pinning credential missing and mock content store is not allowed")]
    MissingCredentials,

    #[error("Ledger submission failed: {0}")]
    SubmissionFailed(String),

    #[error("Ledger query failed: {0}")]
    QueryFailed(String),

    #[error("Metadata resolution failed for {cid}: {reason}")]
    MetadataResolutionFailed { cid: String, reason: String },

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Cache I/O error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, KeepRealError>;
