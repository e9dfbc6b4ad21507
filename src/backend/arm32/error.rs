use thiserror::Error;

pub type BackendResult<T> = Result<T, BackendError>;

/// Resource errors during instruction selection. These are recorded and
/// reported, but translation continues to produce best-effort output.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BackendError {
    #[error("register spill not supported: {context}")]
    RegisterSpillNotSupported { context: String },

    #[error("argument register misassignment: {context}")]
    ArgRegisterMisassignment { context: String },

    #[error("invalid stack argument addressing: {context}")]
    InvalidStackArgAddressing { context: String },
}
