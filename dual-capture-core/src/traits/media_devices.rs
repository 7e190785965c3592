use std::future::Future;
use std::sync::Arc;

use image::RgbaImage;

use crate::models::error::CaptureError;
use crate::models::source::SourceStream;
use crate::models::view::FrameSize;

/// What to ask the platform for when acquiring a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaConstraints {
    pub video: bool,
    pub audio: bool,
    pub ideal_size: FrameSize,
}

impl MediaConstraints {
    pub fn video_only(ideal_size: FrameSize) -> Self {
        Self { video: true, audio: false, ideal_size }
    }

    pub fn video_and_audio(ideal_size: FrameSize) -> Self {
        Self { video: true, audio: true, ideal_size }
    }

    pub fn audio_only() -> Self {
        Self { video: false, audio: true, ideal_size: FrameSize::new(0, 0) }
    }
}

/// Platform camera/microphone access.
///
/// Implemented by host integrations (browser bridge, V4L2, AVFoundation…).
/// Acquisition may suspend for an arbitrary time (permission prompts) and
/// may be denied.
pub trait MediaDevices {
    /// Acquire a stream satisfying `constraints`.
    ///
    /// An audio-only request returns a stream whose video track is absent;
    /// callers take its audio track with [`SourceStream::take_audio`].
    fn get_user_media(
        &self,
        constraints: MediaConstraints,
    ) -> impl Future<Output = Result<SourceStream, CaptureError>> + Send;
}

/// Live video track of a source.
pub trait VideoTrack: Send {
    /// Native frame size once known; `None` or an empty size until the
    /// first frame has been decoded.
    fn frame_size(&self) -> Option<FrameSize>;

    /// Most recent decoded frame.
    fn current_frame(&self) -> Option<Arc<RgbaImage>>;

    /// False once the track has ended (device unplugged, permission revoked).
    fn is_live(&self) -> bool;

    /// Stop the track and release the hardware.
    fn stop(&mut self);

    fn label(&self) -> String;
}
