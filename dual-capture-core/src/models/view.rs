use serde::{Deserialize, Serialize};

/// One of the two output framings derived from the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewKind {
    Landscape,
    Portrait,
}

impl ViewKind {
    pub const BOTH: [ViewKind; 2] = [ViewKind::Landscape, ViewKind::Portrait];

    /// Output aspect ratio (width / height): 16:9 or 9:16.
    pub fn aspect(self) -> f64 {
        match self {
            Self::Landscape => 16.0 / 9.0,
            Self::Portrait => 9.0 / 16.0,
        }
    }

    /// Capitalized label used in download file names.
    pub fn label(self) -> &'static str {
        match self {
            Self::Landscape => "Landscape",
            Self::Portrait => "Portrait",
        }
    }

    /// Output size for a render target whose short edge is `short_edge`
    /// pixels. Both dimensions are rounded to even values for encoders.
    pub fn output_size(self, short_edge: u32) -> FrameSize {
        let short = even(short_edge.max(2));
        let long = even((short as f64 * 16.0 / 9.0).round() as u32);
        match self {
            Self::Landscape => FrameSize::new(long, short),
            Self::Portrait => FrameSize::new(short, long),
        }
    }
}

fn even(v: u32) -> u32 {
    v & !1
}

/// Pixel dimensions of a frame or raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// A frame with a zero dimension is not ready to be drawn from.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn short_edge(&self) -> u32 {
        self.width.min(self.height)
    }

    pub fn aspect(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

/// Sub-rectangle of the source frame, in source pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CropRect {
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn aspect(&self) -> f64 {
        self.width / self.height
    }

    /// Whether the rectangle lies within a `bounds` sized frame, allowing
    /// `eps` of floating-point slack.
    pub fn is_within(&self, bounds: FrameSize, eps: f64) -> bool {
        self.x >= -eps
            && self.y >= -eps
            && self.x + self.width <= bounds.width as f64 + eps
            && self.y + self.height <= bounds.height as f64 + eps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_sizes_follow_aspect() {
        assert_eq!(ViewKind::Landscape.output_size(720), FrameSize::new(1280, 720));
        assert_eq!(ViewKind::Portrait.output_size(720), FrameSize::new(720, 1280));
    }

    #[test]
    fn output_sizes_are_even() {
        let size = ViewKind::Portrait.output_size(481);
        assert_eq!(size.width % 2, 0);
        assert_eq!(size.height % 2, 0);
    }

    #[test]
    fn empty_frame_size() {
        assert!(FrameSize::new(0, 1080).is_empty());
        assert!(!FrameSize::new(1920, 1080).is_empty());
    }
}
