use image::RgbaImage;

use crate::models::config::SessionConfiguration;
use crate::models::view::{CropRect, FrameSize, ViewKind};
use crate::processing::frame_compositor::{compose, RenderTarget};
use crate::processing::zoom::ZoomController;
use crate::traits::display_link::{DisplayLink, FrameRequestId};

/// Zoom state and raster of one view.
#[derive(Debug, Clone)]
struct ViewPipeline {
    zoom: ZoomController,
    target: RenderTarget,
}

impl ViewPipeline {
    fn new(view: ViewKind, short_edge: u32, initial_zoom: f64, smoothing: f64) -> Self {
        Self {
            zoom: ZoomController::new(initial_zoom, smoothing),
            target: RenderTarget::new(view, view.output_size(short_edge)),
        }
    }
}

/// Crops used by one compose of both views.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ComposedCrops {
    pub landscape: Option<CropRect>,
    pub portrait: Option<CropRect>,
}

impl ComposedCrops {
    pub fn get(&self, view: ViewKind) -> Option<CropRect> {
        match view {
            ViewKind::Landscape => self.landscape,
            ViewKind::Portrait => self.portrait,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.landscape.is_some() && self.portrait.is_some()
    }
}

/// Per-display-tick driver of both views.
///
/// Holds at most one scheduled display callback. Each tick advances both
/// zoom controllers and then composes the source into both targets.
/// Stopping and restarting keeps zoom and raster state.
#[derive(Debug)]
pub struct DualRenderLoop {
    landscape: ViewPipeline,
    portrait: ViewPipeline,
    scheduled: Option<FrameRequestId>,
    ticks: u64,
}

impl DualRenderLoop {
    pub fn new(config: &SessionConfiguration) -> Self {
        Self {
            landscape: ViewPipeline::new(
                ViewKind::Landscape,
                config.output_short_edge,
                config.initial_landscape_zoom,
                config.zoom_smoothing,
            ),
            portrait: ViewPipeline::new(
                ViewKind::Portrait,
                config.output_short_edge,
                config.initial_portrait_zoom,
                config.zoom_smoothing,
            ),
            scheduled: None,
            ticks: 0,
        }
    }

    fn pipeline(&self, view: ViewKind) -> &ViewPipeline {
        match view {
            ViewKind::Landscape => &self.landscape,
            ViewKind::Portrait => &self.portrait,
        }
    }

    fn pipeline_mut(&mut self, view: ViewKind) -> &mut ViewPipeline {
        match view {
            ViewKind::Landscape => &mut self.landscape,
            ViewKind::Portrait => &mut self.portrait,
        }
    }

    pub fn is_running(&self) -> bool {
        self.scheduled.is_some()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Schedule the first callback. No-op when already running.
    pub fn start<L: DisplayLink + ?Sized>(&mut self, link: &mut L) {
        if self.scheduled.is_none() {
            self.scheduled = Some(link.request_frame());
        }
    }

    /// Cancel the outstanding callback, if any.
    pub fn stop<L: DisplayLink + ?Sized>(&mut self, link: &mut L) {
        if let Some(id) = self.scheduled.take() {
            link.cancel_frame(id);
        }
    }

    /// Consume the outstanding request when its callback fires. False
    /// means the loop was stopped and the callback must be ignored.
    pub fn acknowledge(&mut self) -> bool {
        self.scheduled.take().is_some()
    }

    /// Request the next callback after a tick.
    pub fn reschedule<L: DisplayLink + ?Sized>(&mut self, link: &mut L) {
        self.start(link);
    }

    /// One display tick: both zoom ticks, then both composes. Without a
    /// source frame only the zoom advances.
    pub fn tick(&mut self, source: Option<&RgbaImage>) -> ComposedCrops {
        self.ticks += 1;
        self.landscape.zoom.tick();
        self.portrait.zoom.tick();
        match source {
            Some(frame) => self.compose_now(frame),
            None => ComposedCrops::default(),
        }
    }

    /// Compose both views at their current display zoom without advancing
    /// the zoom. Used for stills and the first recorded frame.
    pub fn compose_now(&mut self, source: &RgbaImage) -> ComposedCrops {
        let landscape_zoom = self.landscape.zoom.display();
        let portrait_zoom = self.portrait.zoom.display();
        ComposedCrops {
            landscape: compose(source, &mut self.landscape.target, landscape_zoom),
            portrait: compose(source, &mut self.portrait.target, portrait_zoom),
        }
    }

    /// Size both targets for a render short edge.
    pub fn resize(&mut self, short_edge: u32) {
        for view in ViewKind::BOTH {
            self.pipeline_mut(view).target.ensure_size(view.output_size(short_edge));
        }
    }

    pub fn target(&self, view: ViewKind) -> &RenderTarget {
        &self.pipeline(view).target
    }

    pub fn target_size(&self, view: ViewKind) -> FrameSize {
        self.pipeline(view).target.size()
    }

    pub fn zoom(&self, view: ViewKind) -> &ZoomController {
        &self.pipeline(view).zoom
    }

    /// Gesture entry point. Changes apply on the next tick.
    pub fn zoom_mut(&mut self, view: ViewKind) -> &mut ZoomController {
        &mut self.pipeline_mut(view).zoom
    }
}
