use super::frame_compositor::{clamp_zoom, MAX_ZOOM, MIN_ZOOM};

/// Display zoom snaps to the target once closer than this.
const SNAP_EPSILON: f64 = 1e-3;

/// Zoom change per wheel notch or zoom-in button press.
const ZOOM_STEP: f64 = 0.1;

/// Per-view zoom state.
///
/// `target` is the user's intent, set by gestures. `display` is what gets
/// rendered; it moves toward `target` by exponential smoothing on every
/// [`tick`](Self::tick).
#[derive(Debug, Clone, PartialEq)]
pub struct ZoomController {
    target: f64,
    display: f64,
    smoothing: f64,
}

impl ZoomController {
    /// `smoothing` is the per-tick fraction of the remaining distance
    /// covered (higher is snappier). Clamped to `(0, 1]`.
    pub fn new(initial: f64, smoothing: f64) -> Self {
        let initial = clamp_zoom(initial);
        let smoothing = if smoothing.is_finite() && smoothing > 0.0 { smoothing.min(1.0) } else { 0.4 };
        Self {
            target: initial,
            display: initial,
            smoothing,
        }
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn display(&self) -> f64 {
        self.display
    }

    pub fn is_settled(&self) -> bool {
        self.display == self.target
    }

    pub fn set_target(&mut self, value: f64) {
        self.target = clamp_zoom(value);
    }

    /// Jump both values, bypassing smoothing.
    pub fn reset(&mut self, value: f64) {
        self.target = clamp_zoom(value);
        self.display = self.target;
    }

    /// Advance the display value one step toward the target.
    pub fn tick(&mut self) -> f64 {
        let remaining = self.target - self.display;
        if remaining.abs() < SNAP_EPSILON {
            self.display = self.target;
        } else {
            self.display += remaining * self.smoothing;
        }
        self.display
    }

    /// Mouse wheel: scrolling down (positive delta) zooms out one step.
    pub fn wheel(&mut self, delta_y: f64) {
        if delta_y == 0.0 || !delta_y.is_finite() {
            return;
        }
        let step = if delta_y > 0.0 { -ZOOM_STEP } else { ZOOM_STEP };
        self.set_target(round_tenth(self.target + step));
    }

    /// Zoom-in button: one step in, rounded to a tenth.
    pub fn step_in(&mut self) {
        self.set_target(round_tenth(self.target + ZOOM_STEP));
    }

    /// Double-tap preset cycle: 1.0 → 1.4 → 2.0 → 1.0.
    pub fn cycle_preset(&mut self) {
        let next = if self.target < 1.2 {
            1.4
        } else if self.target < 1.8 {
            2.0
        } else {
            MIN_ZOOM
        };
        self.set_target(next);
    }

    /// Begin a two-finger pinch at the given finger distance.
    pub fn begin_pinch(&self, start_distance: f64) -> Option<PinchGesture> {
        PinchGesture::new(start_distance, self.target)
    }

    /// Apply the current finger distance of an ongoing pinch.
    pub fn update_pinch(&mut self, pinch: &PinchGesture, distance: f64) {
        if let Some(target) = pinch.target_for(distance) {
            self.set_target(target);
        }
    }
}

/// Two-finger pinch anchored at the zoom and distance where it started.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchGesture {
    start_distance: f64,
    start_zoom: f64,
}

impl PinchGesture {
    /// `None` if the start distance cannot anchor a ratio.
    pub fn new(start_distance: f64, start_zoom: f64) -> Option<Self> {
        if !start_distance.is_finite() || start_distance <= 0.0 {
            return None;
        }
        Some(Self {
            start_distance,
            start_zoom: clamp_zoom(start_zoom),
        })
    }

    /// `clamp(start_zoom × distance / start_distance, 1, 3)`.
    pub fn target_for(&self, distance: f64) -> Option<f64> {
        if !distance.is_finite() || distance < 0.0 {
            return None;
        }
        Some((self.start_zoom * distance / self.start_distance).clamp(MIN_ZOOM, MAX_ZOOM))
    }
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
