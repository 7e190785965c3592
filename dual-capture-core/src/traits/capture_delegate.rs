use crate::models::capture::{CapturedPair, SalvagedRecording};
use crate::models::error::CaptureError;
use crate::models::state::{SessionNotice, SessionState};

/// Event delegate for capture session notifications.
///
/// All methods are called from whatever context drives the session (the
/// display tick or an awaited session call). Implementations should
/// marshal to the UI thread if needed.
pub trait CaptureDelegate: Send + Sync {
    /// Called when the session state changes.
    fn on_state_changed(&self, state: &SessionState);

    /// Inline, non-blocking notices (microphone denied, camera unavailable,
    /// recording length limit).
    fn on_notice(&self, notice: &SessionNotice);

    /// Called when an operation fails after the session has recovered.
    fn on_error(&self, error: &CaptureError);

    /// Called once per completed photo or recording pair.
    fn on_capture_finished(&self, pair: &CapturedPair);

    /// Called when recordings were cut short by device loss.
    fn on_recording_salvaged(&self, salvage: &SalvagedRecording);
}
