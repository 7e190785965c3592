use std::sync::Arc;
use std::time::Duration;

use image::RgbaImage;

use crate::models::capture::{Artifact, CaptureKind, CapturedPair, SalvagedRecording};
use crate::models::config::SessionConfiguration;
use crate::models::error::CaptureError;
use crate::models::source::{AudioFormat, SourceStream};
use crate::models::state::{CaptureMode, MicrophoneStatus, SessionNotice, SessionState, SessionStatus};
use crate::models::view::{FrameSize, ViewKind};
use crate::processing::still::{self, PNG_MIME};
use crate::processing::zoom::ZoomController;
use crate::session::barrier::StopBarrier;
use crate::session::recording::RecordingJob;
use crate::session::render_loop::DualRenderLoop;
use crate::traits::capture_delegate::CaptureDelegate;
use crate::traits::display_link::DisplayLink;
use crate::traits::encoder::{EncoderFactory, EncoderSpec};
use crate::traits::media_devices::{MediaConstraints, MediaDevices};

/// Poll interval while waiting for the camera to report its size.
const DIMENSION_POLL: Duration = Duration::from_millis(50);

/// Both recorders of one in-flight recording.
struct ActiveRecording {
    landscape: RecordingJob,
    portrait: RecordingJob,
    /// Display timestamp that maps to presentation time zero. Anchored on
    /// the first tick after start, one frame interval before it.
    epoch: Option<Duration>,
    next_frame_at: Duration,
    last_flush: Duration,
    elapsed: Duration,
    /// Set once stop has been issued to both recorders.
    barrier: Option<StopBarrier>,
}

impl ActiveRecording {
    fn job_mut(&mut self, view: ViewKind) -> &mut RecordingJob {
        match view {
            ViewKind::Landscape => &mut self.landscape,
            ViewKind::Portrait => &mut self.portrait,
        }
    }

    /// Issue stop to both recorders before waiting on either.
    fn issue_stop(&mut self) -> StopBarrier {
        if let Some(barrier) = &self.barrier {
            return barrier.clone();
        }
        let barrier = StopBarrier::new();
        self.landscape.stop(barrier.arrival(ViewKind::Landscape));
        self.portrait.stop(barrier.arrival(ViewKind::Portrait));
        self.barrier = Some(barrier.clone());
        barrier
    }

    fn abort(&mut self) {
        self.landscape.abort();
        self.portrait.abort();
    }
}

/// Dual-view capture session.
///
/// Owns the source stream, the render loop and both recorders. Generic
/// over the platform camera/microphone, the recorder implementation and
/// the display refresh callback:
/// ```text
/// [MediaDevices] → SourceStream ─→ DualRenderLoop ─┬→ landscape target → RecordingJob / PNG
///                       │                          └→ portrait target  → RecordingJob / PNG
///                       └→ AudioTrack ── clone per recorder
/// ```
/// All mutation goes through `&mut self`; the host calls
/// [`on_display_frame`](Self::on_display_frame) from its refresh callback.
pub struct CaptureSession<D: MediaDevices, F: EncoderFactory, L: DisplayLink> {
    devices: D,
    encoders: F,
    link: L,
    config: SessionConfiguration,
    delegate: Option<Arc<dyn CaptureDelegate>>,

    state: SessionState,
    mode: CaptureMode,
    audio_enabled: bool,
    microphone: MicrophoneStatus,

    source: Option<SourceStream>,
    source_size: Option<FrameSize>,
    render: DualRenderLoop,
    recording: Option<ActiveRecording>,
    salvaged: Option<SalvagedRecording>,
}

impl<D: MediaDevices, F: EncoderFactory, L: DisplayLink> CaptureSession<D, F, L> {
    pub fn new(devices: D, encoders: F, link: L, config: SessionConfiguration) -> Result<Self, CaptureError> {
        config.validate().map_err(CaptureError::ConfigurationFailed)?;
        let render = DualRenderLoop::new(&config);
        Ok(Self {
            devices,
            encoders,
            link,
            config,
            delegate: None,
            state: SessionState::Idle,
            mode: CaptureMode::default(),
            audio_enabled: true,
            microphone: MicrophoneStatus::default(),
            source: None,
            source_size: None,
            render,
            recording: None,
            salvaged: None,
        })
    }

    pub fn set_delegate(&mut self, delegate: Arc<dyn CaptureDelegate>) {
        self.delegate = Some(delegate);
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn mode(&self) -> CaptureMode {
        self.mode
    }

    pub fn config(&self) -> &SessionConfiguration {
        &self.config
    }

    pub fn audio_enabled(&self) -> bool {
        self.audio_enabled
    }

    pub fn microphone(&self) -> MicrophoneStatus {
        self.microphone
    }

    /// Detected (or fallback) native source size.
    pub fn source_size(&self) -> Option<FrameSize> {
        self.source_size
    }

    pub fn source(&self) -> Option<&SourceStream> {
        self.source.as_ref()
    }

    pub fn render_loop(&self) -> &DualRenderLoop {
        &self.render
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn zoom(&self, view: ViewKind) -> &ZoomController {
        self.render.zoom(view)
    }

    /// Gesture entry point for one view. Takes effect on the next tick.
    pub fn zoom_mut(&mut self, view: ViewKind) -> &mut ZoomController {
        self.render.zoom_mut(view)
    }

    /// Recording cut short by the most recent device loss, if not yet taken.
    pub fn take_salvaged(&mut self) -> Option<SalvagedRecording> {
        self.salvaged.take()
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            state: self.state.clone(),
            mode: self.mode,
            audio_enabled: self.audio_enabled,
            microphone: self.microphone,
            landscape_zoom: self.render.zoom(ViewKind::Landscape).display(),
            portrait_zoom: self.render.zoom(ViewKind::Portrait).display(),
            recording_elapsed: match &self.state {
                SessionState::Recording { elapsed } => Some(*elapsed),
                _ => None,
            },
            capture_enabled: matches!(self.state, SessionState::Ready | SessionState::Recording { .. }),
        }
    }

    /// Switch between photo and video. Ignored while a recording is in
    /// flight; returns whether the mode is now `mode`.
    pub fn set_mode(&mut self, mode: CaptureMode) -> bool {
        if self.state.is_busy() {
            log::debug!("Ignoring mode switch while {}", self.state.name());
            return self.mode == mode;
        }
        self.mode = mode;
        true
    }

    /// Flip whether the next recording includes the microphone.
    pub fn toggle_audio(&mut self) -> bool {
        self.audio_enabled = !self.audio_enabled;
        self.audio_enabled
    }

    pub fn set_audio_enabled(&mut self, enabled: bool) {
        self.audio_enabled = enabled;
    }

    // --- Acquisition ---

    /// Acquire the camera (and the microphone when configured eagerly),
    /// size both render targets and start the render loop.
    /// Transitions: idle / ready / camera unavailable → acquiring → ready.
    ///
    /// A camera failure leaves the session in `CameraUnavailable`; calling
    /// `acquire` again retries.
    pub async fn acquire(&mut self) -> Result<(), CaptureError> {
        if self.state.is_busy() || matches!(self.state, SessionState::Acquiring) {
            return Err(CaptureError::InvalidState(format!(
                "cannot acquire while {}",
                self.state.name()
            )));
        }

        self.release_source();
        self.set_state(SessionState::Acquiring);

        let ideal = self.config.ideal_camera_size;
        let acquired = if self.config.eager_microphone {
            match self.devices.get_user_media(MediaConstraints::video_and_audio(ideal)).await {
                Ok(stream) => {
                    if stream.has_audio() {
                        self.microphone = MicrophoneStatus::Granted;
                    } else {
                        self.deny_microphone();
                    }
                    Ok(stream)
                }
                Err(e) => {
                    log::warn!("Camera+microphone request failed ({}); retrying video only", e);
                    let stream = self.devices.get_user_media(MediaConstraints::video_only(ideal)).await;
                    if stream.is_ok() {
                        self.deny_microphone();
                    }
                    stream
                }
            }
        } else {
            self.devices.get_user_media(MediaConstraints::video_only(ideal)).await
        };

        let mut stream = match acquired {
            Ok(stream) if stream.has_video() => stream,
            Ok(mut stream) => {
                stream.stop_all();
                return Err(self.camera_unavailable(CaptureError::DeviceUnavailable(
                    "no video track in acquired stream".into(),
                )));
            }
            Err(e) => return Err(self.camera_unavailable(e)),
        };

        let size = match wait_for_dimensions(&mut stream, self.config.source_ready_timeout).await {
            Some(size) => size,
            None => {
                log::warn!(
                    "Source reported no dimensions within {:?}; assuming {}x{}",
                    self.config.source_ready_timeout,
                    self.config.fallback_source_size.width,
                    self.config.fallback_source_size.height
                );
                self.config.fallback_source_size
            }
        };

        let short_edge = self.config.output_short_edge.min(size.short_edge()).max(2);
        self.render.resize(short_edge);
        self.source_size = Some(size);
        self.source = Some(stream);
        self.render.start(&mut self.link);

        log::info!(
            "Source ready at {}x{}; rendering {:?} and {:?}",
            size.width,
            size.height,
            self.render.target_size(ViewKind::Landscape),
            self.render.target_size(ViewKind::Portrait)
        );
        self.set_state(SessionState::Ready);
        Ok(())
    }

    /// Ask for the microphone on its own and attach it to the source.
    async fn request_microphone(&mut self) {
        match self.devices.get_user_media(MediaConstraints::audio_only()).await {
            Ok(mut stream) => match (stream.take_audio(), self.source.as_mut()) {
                (Some(track), Some(source)) => {
                    log::info!("Microphone '{}' attached", track.label());
                    source.attach_audio(track);
                    self.microphone = MicrophoneStatus::Granted;
                    stream.stop_all();
                }
                (track, _) => {
                    if let Some(track) = track {
                        track.end();
                    }
                    stream.stop_all();
                    self.deny_microphone();
                }
            },
            Err(e) => {
                log::warn!("Microphone request failed: {}", e);
                self.deny_microphone();
            }
        }
    }

    fn deny_microphone(&mut self) {
        self.microphone = MicrophoneStatus::Denied;
        log::warn!("Microphone unavailable; recordings will be video-only");
        self.notify(SessionNotice::MicrophoneDenied);
    }

    fn camera_unavailable(&mut self, error: CaptureError) -> CaptureError {
        let reason = error.to_string();
        log::warn!("Camera unavailable: {}", reason);
        self.set_state(SessionState::CameraUnavailable(reason.clone()));
        self.notify(SessionNotice::CameraUnavailable(reason));
        error
    }

    // --- Display tick ---

    /// Host display callback. Ignored unless the session asked for it.
    ///
    /// Detects device loss, advances both views, feeds recorders at the
    /// configured frame rate, flushes their output every timeslice and
    /// enforces the recording length limit.
    pub fn on_display_frame(&mut self, timestamp: Duration) {
        if !self.render.acknowledge() {
            return;
        }
        if !self.source.as_ref().is_some_and(|s| s.is_video_live()) {
            self.handle_device_lost();
            return;
        }

        let frame = self.current_frame();
        let crops = self.render.tick(frame.as_deref());

        if self.state.is_recording() {
            self.advance_recording(timestamp, crops.is_complete());
        }

        self.render.reschedule(&mut self.link);
    }

    fn advance_recording(&mut self, timestamp: Duration, composed: bool) {
        let interval = self.config.frame_interval();
        let timeslice = self.config.timeslice;
        let Some(recording) = self.recording.as_mut() else {
            return;
        };

        let epoch = *recording.epoch.get_or_insert_with(|| timestamp.saturating_sub(interval));
        let pts = timestamp.saturating_sub(epoch);
        let mut failure = None;

        if composed && pts >= recording.next_frame_at {
            for view in ViewKind::BOTH {
                let frame = self.render.target(view).image();
                if let Err(e) = recording.job_mut(view).push_frame(frame, pts) {
                    failure.get_or_insert(e);
                }
            }
            recording.next_frame_at = (recording.next_frame_at + interval).max(pts);
        }

        for view in ViewKind::BOTH {
            if let Err(e) = recording.job_mut(view).drain_audio() {
                failure.get_or_insert(e);
            }
        }

        if pts.saturating_sub(recording.last_flush) >= timeslice {
            recording.landscape.flush();
            recording.portrait.flush();
            recording.last_flush = pts;
        }

        recording.elapsed = pts;
        self.state = SessionState::Recording { elapsed: pts };

        if let Some(error) = failure {
            log::error!("Recorder failed mid-recording: {}", error);
            self.report_error(&error);
            self.issue_stop();
        } else if let Some(limit) = self.config.max_recording_duration {
            if pts >= limit {
                log::info!("Recording reached the {:?} limit; stopping", limit);
                self.notify(SessionNotice::MaxDurationReached(limit));
                self.issue_stop();
            }
        }
    }

    fn handle_device_lost(&mut self) {
        log::error!("Camera track ended while {}", self.state.name());

        if let Some(mut recording) = self.recording.take() {
            let barrier = recording.issue_stop();
            let mut arrived = barrier.take_arrived();
            let salvage = SalvagedRecording {
                landscape: recording.landscape.salvage(arrived.take(ViewKind::Landscape)),
                portrait: recording.portrait.salvage(arrived.take(ViewKind::Portrait)),
                duration: recording.elapsed,
            };
            log::warn!(
                "Salvaged {} of 2 recordings after device loss",
                salvage.landscape.iter().count() + salvage.portrait.iter().count()
            );
            if let Some(ref delegate) = self.delegate {
                delegate.on_recording_salvaged(&salvage);
            }
            self.salvaged = Some(salvage);
        }

        self.report_error(&CaptureError::DeviceLost);
        self.release_source();
        let reason = CaptureError::DeviceLost.to_string();
        self.set_state(SessionState::CameraUnavailable(reason.clone()));
        self.notify(SessionNotice::CameraUnavailable(reason));
    }

    // --- Capture actions ---

    /// Primary capture action: photo in photo mode, start or stop in video
    /// mode. Returns the pair when one was completed.
    pub async fn press_primary(&mut self) -> Result<Option<CapturedPair>, CaptureError> {
        match (self.mode, &self.state) {
            (CaptureMode::Photo, _) => self.capture_photo().map(Some),
            (CaptureMode::Video, SessionState::Recording { .. }) => self.stop_recording().await.map(Some),
            (CaptureMode::Video, _) => self.start_recording().await.map(|_| None),
        }
    }

    /// Compose both views once at their current display zoom and encode
    /// each as PNG. No state change.
    pub fn capture_photo(&mut self) -> Result<CapturedPair, CaptureError> {
        if !self.state.is_ready() {
            return Err(CaptureError::InvalidState(format!(
                "cannot take a photo while {}",
                self.state.name()
            )));
        }
        let frame = self
            .current_frame()
            .ok_or_else(|| CaptureError::DeviceUnavailable("no source frame available".into()))?;

        let crops = self.render.compose_now(&frame);
        if !crops.is_complete() {
            return Err(CaptureError::DeviceUnavailable("source frame has no pixels".into()));
        }

        let mut artifacts = Vec::with_capacity(2);
        for view in ViewKind::BOTH {
            let target = self.render.target(view);
            let data = still::encode_png(target.image()).inspect_err(|e| self.report_error(e))?;
            artifacts.push(Artifact::new(view, data, PNG_MIME, target.size(), crops.get(view)));
        }
        let portrait = artifacts.pop();
        let landscape = artifacts.pop();
        let (Some(landscape), Some(portrait)) = (landscape, portrait) else {
            return Err(CaptureError::EncodingFailed("missing still".into()));
        };

        let pair = CapturedPair::new(CaptureKind::Photo, landscape, portrait, None);
        log::info!(
            "Photo pair {} captured ({} + {} bytes)",
            pair.id,
            pair.landscape.len(),
            pair.portrait.len()
        );
        if let Some(ref delegate) = self.delegate {
            delegate.on_capture_finished(&pair);
        }
        Ok(pair)
    }

    /// Open one recorder per view and start both back-to-back.
    /// Transitions: ready → recording.
    ///
    /// Fails atomically: if either recorder cannot be opened or started,
    /// the other is aborted and the session stays ready.
    pub async fn start_recording(&mut self) -> Result<(), CaptureError> {
        if !self.state.is_ready() {
            return Err(CaptureError::InvalidState(format!(
                "can only start recording from ready state (currently {})",
                self.state.name()
            )));
        }
        if self.mode != CaptureMode::Video {
            return Err(CaptureError::InvalidState("session is in photo mode".into()));
        }

        self.render.start(&mut self.link);

        if self.audio_enabled && self.microphone == MicrophoneStatus::NotRequested {
            self.request_microphone().await;
        }

        let mime_type = self.negotiate_codec().inspect_err(|e| self.report_error(e))?;

        let audio = if self.audio_enabled {
            self.source.as_ref().and_then(|s| s.audio()).filter(|a| a.is_live())
        } else {
            None
        };
        let audio_format: Option<AudioFormat> = audio.map(|a| a.format());

        let mut jobs = Vec::with_capacity(2);
        for view in ViewKind::BOTH {
            let size = self.render.target_size(view);
            let spec = EncoderSpec {
                view,
                mime_type: mime_type.clone(),
                size,
                frame_rate: self.config.frame_rate,
                audio: audio_format,
            };
            match self.encoders.create(&spec) {
                Ok(encoder) => jobs.push(RecordingJob::new(view, encoder, audio.map(|a| a.clone_track()), size)),
                Err(e) => {
                    log::error!("Failed to open {} recorder: {}", view.label(), e);
                    jobs.iter_mut().for_each(RecordingJob::abort);
                    self.report_error(&e);
                    return Err(e);
                }
            }
        }

        for index in 0..jobs.len() {
            if let Err(e) = jobs[index].start() {
                log::error!("Failed to start {} recorder: {}", jobs[index].view().label(), e);
                jobs.iter_mut().for_each(RecordingJob::abort);
                self.report_error(&e);
                return Err(e);
            }
        }

        let (Some(mut portrait), Some(mut landscape)) = (jobs.pop(), jobs.pop()) else {
            return Err(CaptureError::InvalidState("recorders missing".into()));
        };

        // Frame 0 comes from a fresh compose so both recordings open on the
        // same picture.
        if let Some(frame) = self.current_frame() {
            if self.render.compose_now(&frame).is_complete() {
                let pushed = landscape
                    .push_frame(self.render.target(ViewKind::Landscape).image(), Duration::ZERO)
                    .and_then(|_| portrait.push_frame(self.render.target(ViewKind::Portrait).image(), Duration::ZERO));
                if let Err(e) = pushed {
                    landscape.abort();
                    portrait.abort();
                    self.report_error(&e);
                    return Err(e);
                }
            }
        }

        let with_audio = landscape.has_audio() && portrait.has_audio();
        let interval = self.config.frame_interval();
        self.recording = Some(ActiveRecording {
            landscape,
            portrait,
            epoch: None,
            next_frame_at: interval,
            last_flush: Duration::ZERO,
            elapsed: Duration::ZERO,
            barrier: None,
        });

        log::info!(
            "Recording started as {} (audio: {})",
            mime_type,
            if with_audio { "on" } else { "off" }
        );
        self.set_state(SessionState::Recording { elapsed: Duration::ZERO });
        Ok(())
    }

    fn negotiate_codec(&self) -> Result<String, CaptureError> {
        let chosen = self
            .config
            .codec_preferences
            .iter()
            .find(|mime| self.encoders.is_type_supported(mime))
            .cloned();
        match chosen {
            Some(mime) => {
                if self.config.codec_preferences.first() != Some(&mime) {
                    log::warn!("Preferred codecs unsupported; falling back to {}", mime);
                }
                Ok(mime)
            }
            None => Err(CaptureError::EncoderUnsupported(self.config.codec_preferences.join(", "))),
        }
    }

    /// Issue stop to both recorders without waiting.
    /// Transitions: recording → stopping.
    pub fn begin_stop(&mut self) -> Result<(), CaptureError> {
        if !self.state.is_recording() {
            return Err(CaptureError::InvalidState(format!(
                "can only stop from recording state (currently {})",
                self.state.name()
            )));
        }
        self.issue_stop();
        Ok(())
    }

    fn issue_stop(&mut self) {
        if let Some(recording) = self.recording.as_mut() {
            recording.issue_stop();
            self.set_state(SessionState::Stopping);
        }
    }

    /// Wait for both recorders and assemble the pair exactly once.
    /// Transitions: stopping → ready.
    ///
    /// A side that fails, times out or produces no data turns the whole
    /// pair into [`CaptureError::AsymmetricStop`].
    pub async fn finish_recording(&mut self) -> Result<CapturedPair, CaptureError> {
        let barrier = match (&self.state, self.recording.as_ref().and_then(|r| r.barrier.clone())) {
            (SessionState::Stopping, Some(barrier)) => barrier,
            _ => {
                return Err(CaptureError::InvalidState(format!(
                    "no stop in progress (currently {})",
                    self.state.name()
                )))
            }
        };

        let mut outcome = barrier.wait(self.config.stop_timeout).await;
        if !outcome.is_complete() {
            log::warn!("Recorders did not both finish within {:?}", self.config.stop_timeout);
        }

        let Some(mut recording) = self.recording.take() else {
            return Err(CaptureError::InvalidState("recording vanished while stopping".into()));
        };
        let landscape = recording.landscape.finish(outcome.take(ViewKind::Landscape));
        let portrait = recording.portrait.finish(outcome.take(ViewKind::Portrait));
        let duration = recording.elapsed;
        drop(recording);

        self.set_state(SessionState::Ready);

        match (landscape, portrait) {
            (Ok(landscape), Ok(portrait)) => {
                let pair = CapturedPair::new(CaptureKind::Video, landscape, portrait, Some(duration));
                log::info!(
                    "Video pair {} finished after {:?} ({} + {} bytes)",
                    pair.id,
                    duration,
                    pair.landscape.len(),
                    pair.portrait.len()
                );
                if let Some(ref delegate) = self.delegate {
                    delegate.on_capture_finished(&pair);
                }
                Ok(pair)
            }
            (landscape, portrait) => {
                let error = CaptureError::AsymmetricStop {
                    landscape: describe_side(&landscape),
                    portrait: describe_side(&portrait),
                };
                log::error!("{}", error);
                self.report_error(&error);
                Err(error)
            }
        }
    }

    /// Stop both recorders and wait for the pair.
    /// Transitions: recording → stopping → ready.
    pub async fn stop_recording(&mut self) -> Result<CapturedPair, CaptureError> {
        self.begin_stop()?;
        self.finish_recording().await
    }

    // --- Teardown ---

    /// Cancel the render loop, abort unfinished recorders and release every
    /// track. Transitions: any → idle.
    pub fn teardown(&mut self) {
        self.release_all();
        if !self.state.is_idle() {
            self.set_state(SessionState::Idle);
        }
    }

    fn release_all(&mut self) {
        if let Some(mut recording) = self.recording.take() {
            log::warn!("Aborting in-flight recording");
            recording.abort();
        }
        self.release_source();
    }

    fn release_source(&mut self) {
        self.render.stop(&mut self.link);
        if let Some(mut source) = self.source.take() {
            log::debug!("Releasing source {}", source.id());
            source.stop_all();
        }
        // A granted microphone went away with the source's audio track.
        if self.microphone == MicrophoneStatus::Granted {
            self.microphone = MicrophoneStatus::NotRequested;
        }
        self.source_size = None;
    }

    // --- Internal helpers ---

    fn current_frame(&self) -> Option<Arc<RgbaImage>> {
        self.source.as_ref()?.video()?.current_frame()
    }

    fn set_state(&mut self, state: SessionState) {
        if self.state != state {
            log::info!("Capture session: {} → {}", self.state.name(), state.name());
        }
        self.state = state;
        if let Some(ref delegate) = self.delegate {
            delegate.on_state_changed(&self.state);
        }
    }

    fn notify(&self, notice: SessionNotice) {
        if let Some(ref delegate) = self.delegate {
            delegate.on_notice(&notice);
        }
    }

    fn report_error(&self, error: &CaptureError) {
        if let Some(ref delegate) = self.delegate {
            delegate.on_error(error);
        }
    }
}

impl<D: MediaDevices, F: EncoderFactory, L: DisplayLink> Drop for CaptureSession<D, F, L> {
    fn drop(&mut self) {
        self.release_all();
    }
}

fn describe_side(result: &Result<Artifact, String>) -> String {
    match result {
        Ok(artifact) => format!("finished ({} bytes)", artifact.len()),
        Err(reason) => reason.clone(),
    }
}

/// Wait for the video track to report a non-empty size.
async fn wait_for_dimensions(stream: &mut SourceStream, timeout: Duration) -> Option<FrameSize> {
    fn ready(stream: &SourceStream) -> Option<FrameSize> {
        stream.video()?.frame_size().filter(|size| !size.is_empty())
    }

    if let Some(size) = ready(stream) {
        return Some(size);
    }
    tokio::time::timeout(timeout, async move {
        loop {
            tokio::time::sleep(DIMENSION_POLL).await;
            if let Some(size) = ready(stream) {
                return size;
            }
        }
    })
    .await
    .ok()
}
