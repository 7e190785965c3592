use thiserror::Error;

/// Errors that can occur while acquiring, compositing, recording or
/// persisting a dual-view capture.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// Camera acquisition failed entirely. Fatal to the session until retried.
    #[error("camera unavailable: {0}")]
    DeviceUnavailable(String),

    /// Video acquired but the microphone was denied or is missing.
    #[error("microphone permission denied")]
    MicrophoneDenied,

    /// The video track ended while the session was running.
    #[error("camera disconnected")]
    DeviceLost,

    /// None of the preferred container/codec combinations can be opened.
    #[error("no supported encoder among: {0}")]
    EncoderUnsupported(String),

    /// One or both recordings never reported a usable terminal chunk.
    #[error("recording stopped asymmetrically (landscape: {landscape}, portrait: {portrait})")]
    AsymmetricStop { landscape: String, portrait: String },

    #[error("encoding failed: {0}")]
    EncodingFailed(String),

    /// The gateway rejected the record or could not be reached.
    #[error("save failed: {0}")]
    PersistenceFailed(String),

    /// A record failed validation; `field` names the offending field when known.
    #[error("{message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),

    #[error("storage error: {0}")]
    StorageError(String),

    #[error("timeout")]
    Timeout,
}

impl CaptureError {
    pub fn validation(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }
}
