use std::time::Duration;

use image::RgbaImage;

use crate::models::error::CaptureError;
use crate::models::source::AudioFormat;
use crate::models::view::{FrameSize, ViewKind};

/// Invoked exactly once when an encoder has finished, with its terminal
/// chunk (possibly empty) or the reason it could not finalize.
///
/// May fire synchronously inside [`MediaEncoder::stop`] or later from any
/// thread.
pub type CompletionCallback = Box<dyn FnOnce(Result<Vec<u8>, CaptureError>) + Send + 'static>;

/// Parameters for opening one recorder.
#[derive(Debug, Clone, PartialEq)]
pub struct EncoderSpec {
    pub view: ViewKind,
    pub mime_type: String,
    pub size: FrameSize,
    pub frame_rate: u32,
    /// Present when a microphone clone is attached to this recorder.
    pub audio: Option<AudioFormat>,
}

/// Creates recorders for the container/codec combinations it supports.
///
/// Implemented by the built-in [`MatroskaEncoderFactory`](crate::processing::matroska::MatroskaEncoderFactory)
/// and by host bridges to platform recorders.
pub trait EncoderFactory {
    fn is_type_supported(&self, mime_type: &str) -> bool;

    /// Open a recorder. Fails with [`CaptureError::EncoderUnsupported`]
    /// when `spec.mime_type` cannot be produced.
    fn create(&self, spec: &EncoderSpec) -> Result<Box<dyn MediaEncoder>, CaptureError>;
}

/// One independently encoded output stream.
///
/// Data is pulled in fragments with [`take_data`](Self::take_data); the
/// artifact is the concatenation of every fragment followed by the
/// terminal chunk handed to the completion callback.
pub trait MediaEncoder: Send {
    fn mime_type(&self) -> &str;

    fn start(&mut self) -> Result<(), CaptureError>;

    /// Encode one video frame presented at `timestamp` from recording start.
    fn push_video(&mut self, frame: &RgbaImage, timestamp: Duration) -> Result<(), CaptureError>;

    /// Encode interleaved f32 samples that follow the previous ones.
    fn push_audio(&mut self, samples: &[f32]) -> Result<(), CaptureError>;

    /// Encoded bytes produced since the last call.
    fn take_data(&mut self) -> Vec<u8>;

    /// Stop encoding and report completion through `on_complete`.
    fn stop(&mut self, on_complete: CompletionCallback);

    /// Discard everything without completing. Used on rollback and teardown.
    fn abort(&mut self);
}
