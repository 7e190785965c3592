use std::time::Duration;

use super::view::FrameSize;

/// Container/codec preferences tried in order when opening recorders.
pub const DEFAULT_CODEC_PREFERENCES: [&str; 5] = [
    "video/webm;codecs=vp9,opus",
    "video/webm;codecs=vp8,opus",
    "video/webm",
    "video/x-matroska;codecs=mjpeg,pcm",
    "video/x-matroska",
];

/// Configuration for a capture session.
#[derive(Debug, Clone)]
pub struct SessionConfiguration {
    /// Prefix for download file names.
    pub product_name: String,

    /// Short edge of both render targets in pixels (default: 720, giving
    /// 1280×720 and 720×1280). Clamped to the source's short edge.
    pub output_short_edge: u32,

    /// Source size assumed when the camera never reports dimensions.
    pub fallback_source_size: FrameSize,

    /// How long to wait for usable source dimensions (default: 3s).
    pub source_ready_timeout: Duration,

    /// Resolution requested from the camera.
    pub ideal_camera_size: FrameSize,

    /// Frames per second pushed to each recorder (default: 30).
    pub frame_rate: u32,

    /// Interval at which encoded data is flushed into fragments (default: 250ms).
    pub timeslice: Duration,

    /// How long to wait for both recorders to finish after stop (default: 5s).
    pub stop_timeout: Duration,

    /// Ordered container/codec preferences.
    pub codec_preferences: Vec<String>,

    /// Request the microphone together with the camera instead of on the
    /// first recording (default: false).
    pub eager_microphone: bool,

    /// Stop recordings automatically after this long (None = manual only).
    pub max_recording_duration: Option<Duration>,

    /// Exponential smoothing factor for display zoom, in (0, 1] (default: 0.4).
    pub zoom_smoothing: f64,

    pub initial_landscape_zoom: f64,
    pub initial_portrait_zoom: f64,

    /// JPEG quality for MJPEG frames, 1–100 (default: 85).
    pub jpeg_quality: u8,
}

impl SessionConfiguration {
    pub fn validate(&self) -> Result<(), String> {
        if self.product_name.trim().is_empty() {
            return Err("product name must not be empty".into());
        }
        if self.output_short_edge < 2 {
            return Err(format!("output short edge too small: {}", self.output_short_edge));
        }
        if self.fallback_source_size.is_empty() {
            return Err("fallback source size must be non-zero".into());
        }
        if self.frame_rate == 0 || self.frame_rate > 240 {
            return Err(format!("unsupported frame rate: {}", self.frame_rate));
        }
        if self.timeslice.is_zero() {
            return Err("timeslice must be positive".into());
        }
        if self.codec_preferences.is_empty() {
            return Err("at least one codec preference is required".into());
        }
        if !(self.zoom_smoothing > 0.0 && self.zoom_smoothing <= 1.0) {
            return Err(format!("zoom smoothing out of range: {}", self.zoom_smoothing));
        }
        for zoom in [self.initial_landscape_zoom, self.initial_portrait_zoom] {
            if !(1.0..=3.0).contains(&zoom) {
                return Err(format!("initial zoom out of range: {}", zoom));
            }
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(format!("jpeg quality out of range: {}", self.jpeg_quality));
        }
        Ok(())
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.frame_rate as f64)
    }
}

impl Default for SessionConfiguration {
    fn default() -> Self {
        Self {
            product_name: "FlipCastDuo".into(),
            output_short_edge: 720,
            fallback_source_size: FrameSize::new(1920, 1080),
            source_ready_timeout: Duration::from_secs(3),
            ideal_camera_size: FrameSize::new(1920, 1080),
            frame_rate: 30,
            timeslice: Duration::from_millis(250),
            stop_timeout: Duration::from_secs(5),
            codec_preferences: DEFAULT_CODEC_PREFERENCES.iter().map(|s| s.to_string()).collect(),
            eager_microphone: false,
            max_recording_duration: None,
            zoom_smoothing: 0.4,
            initial_landscape_zoom: 1.0,
            initial_portrait_zoom: 1.4,
            jpeg_quality: 85,
        }
    }
}
