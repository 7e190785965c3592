use std::time::Duration;

/// Capture session state machine.
///
/// State transitions:
/// ```text
/// idle → acquiring → ready → recording → stopping → ready
///            ↓                   ↓
///    camera unavailable ←── (device lost)
/// ```
/// `CameraUnavailable` is left only by retrying acquisition.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Idle,
    Acquiring,
    Ready,
    Recording { elapsed: Duration },
    Stopping,
    CameraUnavailable(String),
}

impl SessionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    pub fn is_recording(&self) -> bool {
        matches!(self, Self::Recording { .. })
    }

    /// Recording or waiting for both recorders to finish.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Recording { .. } | Self::Stopping)
    }

    pub fn is_camera_unavailable(&self) -> bool {
        matches!(self, Self::CameraUnavailable(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Acquiring => "acquiring",
            Self::Ready => "ready",
            Self::Recording { .. } => "recording",
            Self::Stopping => "stopping",
            Self::CameraUnavailable(_) => "camera-unavailable",
        }
    }
}

/// What the primary action produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureMode {
    #[default]
    Video,
    Photo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MicrophoneStatus {
    /// Not asked for yet (lazy acquisition).
    #[default]
    NotRequested,
    Granted,
    /// Denied or missing; recordings proceed video-only.
    Denied,
}

/// Non-blocking notices a view shows inline.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionNotice {
    MicrophoneDenied,
    CameraUnavailable(String),
    MaxDurationReached(Duration),
}

/// Snapshot of everything a view binds to.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStatus {
    pub state: SessionState,
    pub mode: CaptureMode,
    pub audio_enabled: bool,
    pub microphone: MicrophoneStatus,
    pub landscape_zoom: f64,
    pub portrait_zoom: f64,
    pub recording_elapsed: Option<Duration>,
    pub capture_enabled: bool,
}
