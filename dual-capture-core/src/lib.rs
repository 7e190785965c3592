//! # dual-capture-core
//!
//! Platform-agnostic dual-view capture core library.
//!
//! One live camera (plus optional microphone) source is rendered into two
//! independently zoomable framings, a 16:9 landscape and a 9:16 portrait
//! output, which are captured together as still pairs or as two recordings
//! that start and stop in lockstep. Host integrations implement
//! `MediaDevices`, `DisplayLink` and optionally `EncoderFactory` and plug
//! into the generic `CaptureSession`.
//!
//! ## Architecture
//!
//! ```text
//! dual-capture-core (this crate)
//! ├── traits/       ← MediaDevices, VideoTrack, DisplayLink, EncoderFactory, MediaEncoder, CaptureDelegate, CaptureStore
//! ├── models/       ← CaptureError, SessionState, SessionConfiguration, ViewKind, CapturedPair, SourceStream, etc.
//! ├── processing/   ← FrameCompositor, ZoomController, Matroska/MJPEG encoder, PNG stills, SampleQueue
//! ├── session/      ← CaptureSession (generic orchestrator), DualRenderLoop, RecordingJob, StopBarrier
//! └── storage/      ← ArtifactStager, LocalCaptureList, CaptureSubmitter, download naming
//! ```

pub mod models;
pub mod processing;
pub mod session;
pub mod storage;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use models::capture::{Artifact, CaptureKind, CaptureRecord, CapturedPair, NewCapture, SalvagedRecording};
pub use models::config::SessionConfiguration;
pub use models::error::CaptureError;
pub use models::source::{AudioFeed, AudioFormat, AudioTrack, SourceStream};
pub use models::state::{CaptureMode, MicrophoneStatus, SessionNotice, SessionState, SessionStatus};
pub use models::view::{CropRect, FrameSize, ViewKind};
pub use processing::frame_compositor::{compose, cover_crop, RenderTarget};
pub use processing::matroska::{MatroskaEncoder, MatroskaEncoderFactory};
pub use processing::zoom::{PinchGesture, ZoomController};
pub use session::barrier::StopBarrier;
pub use session::capture_session::CaptureSession;
pub use session::render_loop::DualRenderLoop;
pub use storage::local_store::{LocalCapture, LocalCaptureList};
pub use storage::stager::ArtifactStager;
pub use storage::submission::{CaptureSubmitter, SubmissionError, Submitted};
pub use traits::capture_delegate::CaptureDelegate;
pub use traits::capture_store::CaptureStore;
pub use traits::display_link::{DisplayLink, FrameRequestId, ManualDisplayLink};
pub use traits::encoder::{CompletionCallback, EncoderFactory, EncoderSpec, MediaEncoder};
pub use traits::media_devices::{MediaConstraints, MediaDevices, VideoTrack};
