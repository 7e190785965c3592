use image::imageops::{self, FilterType};
use image::RgbaImage;

use crate::models::view::{CropRect, FrameSize, ViewKind};

pub const MIN_ZOOM: f64 = 1.0;
pub const MAX_ZOOM: f64 = 3.0;

/// Clamp a zoom factor to `[MIN_ZOOM, MAX_ZOOM]`. Non-finite values map to 1.0.
pub fn clamp_zoom(zoom: f64) -> f64 {
    if zoom.is_finite() {
        zoom.clamp(MIN_ZOOM, MAX_ZOOM)
    } else {
        MIN_ZOOM
    }
}

/// Centered "cover" crop of `source` matching the aspect of `output`,
/// shrunk by `1 / zoom` around its center.
///
/// Returns `None` while either size has a zero dimension.
pub fn cover_crop(source: FrameSize, output: FrameSize, zoom: f64) -> Option<CropRect> {
    if source.is_empty() || output.is_empty() {
        return None;
    }

    let (sw, sh) = (source.width as f64, source.height as f64);
    let target_aspect = output.aspect();

    // Wider source than target: keep full height, crop the sides.
    let (crop_w, crop_h) = if source.aspect() > target_aspect {
        (sh * target_aspect, sh)
    } else {
        (sw, sw / target_aspect)
    };

    let zoom = clamp_zoom(zoom);
    let width = crop_w / zoom;
    let height = crop_h / zoom;

    Some(CropRect {
        x: (sw - width) / 2.0,
        y: (sh - height) / 2.0,
        width,
        height,
    })
}

/// Off-screen raster holding one view's latest composited frame.
#[derive(Debug, Clone)]
pub struct RenderTarget {
    view: ViewKind,
    image: RgbaImage,
    last_crop: Option<CropRect>,
    frames_composed: u64,
}

impl RenderTarget {
    pub fn new(view: ViewKind, size: FrameSize) -> Self {
        Self {
            view,
            image: RgbaImage::new(size.width, size.height),
            last_crop: None,
            frames_composed: 0,
        }
    }

    pub fn view(&self) -> ViewKind {
        self.view
    }

    pub fn size(&self) -> FrameSize {
        FrameSize::new(self.image.width(), self.image.height())
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Crop used for the most recent successful compose.
    pub fn last_crop(&self) -> Option<CropRect> {
        self.last_crop
    }

    pub fn frames_composed(&self) -> u64 {
        self.frames_composed
    }

    /// Reallocate to `size` (cleared) if it differs from the current size.
    pub fn ensure_size(&mut self, size: FrameSize) {
        if self.size() != size {
            self.image = RgbaImage::new(size.width, size.height);
            self.last_crop = None;
        }
    }
}

/// Draw the zoomed cover crop of `source` into the whole of `target`.
///
/// Leaves `target` untouched and returns `None` when the source has no
/// pixels yet.
pub fn compose(source: &RgbaImage, target: &mut RenderTarget, zoom: f64) -> Option<CropRect> {
    let source_size = FrameSize::new(source.width(), source.height());
    let output = target.size();
    let crop = cover_crop(source_size, output, zoom)?;

    let (x, y, w, h) = pixel_bounds(&crop, source_size);
    let region = imageops::crop_imm(source, x, y, w, h).to_image();
    target.image = if (w, h) == (output.width, output.height) {
        region
    } else {
        imageops::resize(&region, output.width, output.height, FilterType::Triangle)
    };
    target.last_crop = Some(crop);
    target.frames_composed += 1;
    Some(crop)
}

/// Round a fractional crop to whole source pixels, staying inside the frame.
fn pixel_bounds(crop: &CropRect, source: FrameSize) -> (u32, u32, u32, u32) {
    let w = (crop.width.round() as u32).clamp(1, source.width);
    let h = (crop.height.round() as u32).clamp(1, source.height);
    let x = (crop.x.round().max(0.0) as u32).min(source.width - w);
    let y = (crop.y.round().max(0.0) as u32).min(source.height - h);
    (x, y, w, h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use image::Rgba;

    const SOURCES: [(u32, u32); 6] = [(1920, 1080), (1080, 1920), (640, 480), (4000, 3000), (1, 1), (3, 1000)];

    #[test]
    fn crop_is_contained_and_matches_aspect() {
        for (sw, sh) in SOURCES {
            for view in ViewKind::BOTH {
                let source = FrameSize::new(sw, sh);
                let output = view.output_size(720);
                let crop = cover_crop(source, output, 1.0).unwrap();
                assert!(crop.is_within(source, 1e-9), "{crop:?} escapes {source:?}");
                assert_relative_eq!(crop.aspect(), output.aspect(), max_relative = 1e-9);
            }
        }
    }

    #[test]
    fn cover_keeps_full_extent_on_one_axis() {
        let crop = cover_crop(FrameSize::new(1920, 1080), FrameSize::new(720, 1280), 1.0).unwrap();
        assert_relative_eq!(crop.height, 1080.0);
        assert_relative_eq!(crop.width, 607.5);

        let crop = cover_crop(FrameSize::new(1080, 1920), FrameSize::new(1280, 720), 1.0).unwrap();
        assert_relative_eq!(crop.width, 1080.0);
        assert_relative_eq!(crop.height, 607.5);
    }

    #[test]
    fn zoom_shrinks_around_same_center() {
        let source = FrameSize::new(1920, 1080);
        let output = FrameSize::new(1280, 720);
        let base = cover_crop(source, output, 1.0).unwrap();
        for step in 0..=20 {
            let zoom = 1.0 + step as f64 * 0.1;
            let crop = cover_crop(source, output, zoom).unwrap();
            assert_relative_eq!(crop.width, base.width / zoom, max_relative = 1e-12);
            assert_relative_eq!(crop.height, base.height / zoom, max_relative = 1e-12);
            let (cx, cy) = crop.center();
            let (bx, by) = base.center();
            assert_relative_eq!(cx, bx, epsilon = 1e-9);
            assert_relative_eq!(cy, by, epsilon = 1e-9);
        }
    }

    #[test]
    fn zoom_is_clamped() {
        let source = FrameSize::new(1920, 1080);
        let output = FrameSize::new(1280, 720);
        assert_eq!(cover_crop(source, output, 0.5), cover_crop(source, output, 1.0));
        assert_eq!(cover_crop(source, output, 9.0), cover_crop(source, output, 3.0));
        assert_eq!(cover_crop(source, output, f64::NAN), cover_crop(source, output, 1.0));
    }

    #[test]
    fn empty_source_leaves_target_unchanged() {
        let mut target = RenderTarget::new(ViewKind::Landscape, FrameSize::new(16, 9));
        target.image.put_pixel(0, 0, Rgba([9, 9, 9, 255]));
        let empty = RgbaImage::new(0, 0);

        assert!(compose(&empty, &mut target, 1.0).is_none());
        assert_eq!(target.image().get_pixel(0, 0), &Rgba([9, 9, 9, 255]));
        assert_eq!(target.frames_composed(), 0);
    }

    #[test]
    fn compose_fills_target_from_center() {
        // Left half red, right half blue; a portrait crop at 3x sits on the
        // seam, a landscape crop at 1x covers the whole frame.
        let source = RgbaImage::from_fn(160, 90, |x, _| {
            if x < 80 { Rgba([255, 0, 0, 255]) } else { Rgba([0, 0, 255, 255]) }
        });

        let mut landscape = RenderTarget::new(ViewKind::Landscape, FrameSize::new(32, 18));
        let crop = compose(&source, &mut landscape, 1.0).unwrap();
        assert_relative_eq!(crop.width, 160.0);
        assert_eq!(landscape.image().get_pixel(0, 9)[0], 255);
        assert_eq!(landscape.image().get_pixel(31, 9)[2], 255);

        let mut portrait = RenderTarget::new(ViewKind::Portrait, FrameSize::new(18, 32));
        let crop = compose(&source, &mut portrait, 3.0).unwrap();
        assert_relative_eq!(crop.height, 30.0);
        assert_eq!(portrait.size(), FrameSize::new(18, 32));
        assert_eq!(portrait.frames_composed(), 1);
        assert_eq!(portrait.last_crop(), Some(crop));
    }

    #[test]
    fn ensure_size_reallocates_only_on_change() {
        let mut target = RenderTarget::new(ViewKind::Portrait, FrameSize::new(4, 8));
        target.image.put_pixel(0, 0, Rgba([1, 2, 3, 4]));
        target.ensure_size(FrameSize::new(4, 8));
        assert_eq!(target.image().get_pixel(0, 0), &Rgba([1, 2, 3, 4]));
        target.ensure_size(FrameSize::new(8, 16));
        assert_eq!(target.size(), FrameSize::new(8, 16));
    }
}
