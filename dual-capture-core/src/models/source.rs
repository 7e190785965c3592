use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::processing::sample_queue::SampleQueue;
use crate::traits::media_devices::VideoTrack;

/// Seconds of audio each track clone buffers between render ticks.
const CONSUMER_BUFFER_SECS: u32 = 5;

/// Interleaved f32 audio format delivered by a microphone track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFormat {
    pub sample_rate: u32,
    pub channels: u16,
}

impl Default for AudioFormat {
    fn default() -> Self {
        Self { sample_rate: 48_000, channels: 1 }
    }
}

#[derive(Debug)]
struct AudioShared {
    label: String,
    format: AudioFormat,
    enabled: AtomicBool,
    ended: AtomicBool,
    consumers: Mutex<Vec<Weak<Mutex<SampleQueue>>>>,
}

/// Microphone track shared between recorders.
///
/// The track obtained from the device only controls the hardware; every
/// recorder works on its own [`AudioTrack::clone_track`], which has an
/// independent sample queue. The `enabled` flag is shared by all clones.
#[derive(Debug)]
pub struct AudioTrack {
    shared: Arc<AudioShared>,
    queue: Option<Arc<Mutex<SampleQueue>>>,
}

/// Producer side of an [`AudioTrack`], held by the device backend.
#[derive(Debug, Clone)]
pub struct AudioFeed {
    shared: Arc<AudioShared>,
}

impl AudioTrack {
    pub fn new(label: impl Into<String>, format: AudioFormat) -> (Self, AudioFeed) {
        let shared = Arc::new(AudioShared {
            label: label.into(),
            format,
            enabled: AtomicBool::new(true),
            ended: AtomicBool::new(false),
            consumers: Mutex::new(Vec::new()),
        });
        let feed = AudioFeed { shared: Arc::clone(&shared) };
        (Self { shared, queue: None }, feed)
    }

    /// New consumer of the same hardware track with its own sample queue.
    pub fn clone_track(&self) -> AudioTrack {
        let format = self.shared.format;
        let queue = Arc::new(Mutex::new(SampleQueue::for_duration(
            format.sample_rate,
            format.channels,
            CONSUMER_BUFFER_SECS,
        )));
        self.shared.consumers.lock().push(Arc::downgrade(&queue));
        AudioTrack {
            shared: Arc::clone(&self.shared),
            queue: Some(queue),
        }
    }

    pub fn label(&self) -> &str {
        &self.shared.label
    }

    pub fn format(&self) -> AudioFormat {
        self.shared.format
    }

    pub fn is_enabled(&self) -> bool {
        self.shared.enabled.load(Ordering::SeqCst)
    }

    /// Mute or unmute. Affects every clone of the track.
    pub fn set_enabled(&self, enabled: bool) {
        self.shared.enabled.store(enabled, Ordering::SeqCst);
    }

    pub fn is_live(&self) -> bool {
        !self.shared.ended.load(Ordering::SeqCst)
    }

    /// Samples queued for this clone since the last call.
    pub fn take_samples(&self) -> Vec<f32> {
        match &self.queue {
            Some(queue) => queue.lock().drain_all(),
            None => Vec::new(),
        }
    }

    /// Samples this clone discarded because it was not drained in time.
    pub fn dropped_samples(&self) -> u64 {
        self.queue.as_ref().map_or(0, |queue| queue.lock().dropped())
    }

    /// End the hardware track for every clone.
    pub fn end(&self) {
        if !self.shared.ended.swap(true, Ordering::SeqCst) {
            log::debug!("Audio track '{}' ended", self.shared.label);
        }
        self.shared.consumers.lock().clear();
    }
}

impl AudioFeed {
    /// Fan `samples` out to every live consumer. Dropped while muted or ended.
    pub fn deliver(&self, samples: &[f32]) {
        if !self.is_active() || !self.shared.enabled.load(Ordering::SeqCst) {
            return;
        }
        let mut consumers = self.shared.consumers.lock();
        consumers.retain(|weak| match weak.upgrade() {
            Some(queue) => {
                queue.lock().push(samples);
                true
            }
            None => false,
        });
    }

    /// False once the track has been ended; the backend should release
    /// the device.
    pub fn is_active(&self) -> bool {
        !self.shared.ended.load(Ordering::SeqCst)
    }
}

/// Live camera (and optionally microphone) capture owned by one session.
pub struct SourceStream {
    id: String,
    video: Option<Box<dyn VideoTrack>>,
    audio: Option<AudioTrack>,
}

impl SourceStream {
    pub fn new(video: Option<Box<dyn VideoTrack>>, audio: Option<AudioTrack>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            video,
            audio,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn video(&self) -> Option<&dyn VideoTrack> {
        self.video.as_deref()
    }

    pub fn audio(&self) -> Option<&AudioTrack> {
        self.audio.as_ref()
    }

    pub fn has_video(&self) -> bool {
        self.video.is_some()
    }

    pub fn has_audio(&self) -> bool {
        self.audio.is_some()
    }

    pub fn is_video_live(&self) -> bool {
        self.video.as_ref().is_some_and(|v| v.is_live())
    }

    /// Detach the audio track, e.g. from an audio-only acquisition.
    pub fn take_audio(&mut self) -> Option<AudioTrack> {
        self.audio.take()
    }

    /// Attach a microphone track, ending any track it replaces.
    pub fn attach_audio(&mut self, track: AudioTrack) {
        if let Some(previous) = self.audio.replace(track) {
            previous.end();
        }
    }

    /// Stop every track. Safe to call more than once.
    pub fn stop_all(&mut self) {
        if let Some(video) = self.video.as_mut() {
            video.stop();
        }
        if let Some(audio) = self.audio.as_ref() {
            audio.end();
        }
    }
}

impl std::fmt::Debug for SourceStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceStream")
            .field("id", &self.id)
            .field("video", &self.video.as_ref().map(|v| v.label()))
            .field("audio", &self.audio.as_ref().map(|a| a.label().to_string()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_receive_independent_copies() {
        let (track, feed) = AudioTrack::new("mic", AudioFormat::default());
        let a = track.clone_track();
        let b = track.clone_track();

        feed.deliver(&[0.5, 0.25]);

        assert_eq!(a.take_samples(), vec![0.5, 0.25]);
        assert_eq!(b.take_samples(), vec![0.5, 0.25]);
        assert!(a.take_samples().is_empty());
        assert!(track.take_samples().is_empty());
    }

    #[test]
    fn muting_affects_every_clone() {
        let (track, feed) = AudioTrack::new("mic", AudioFormat::default());
        let a = track.clone_track();
        let b = track.clone_track();

        a.set_enabled(false);
        assert!(!b.is_enabled());
        feed.deliver(&[1.0]);
        assert!(b.take_samples().is_empty());
    }

    #[test]
    fn ending_stops_delivery() {
        let (track, feed) = AudioTrack::new("mic", AudioFormat::default());
        let clone = track.clone_track();
        track.end();

        assert!(!feed.is_active());
        assert!(!clone.is_live());
        feed.deliver(&[1.0]);
        assert!(clone.take_samples().is_empty());
    }

    #[test]
    fn slow_clone_counts_overflow() {
        let format = AudioFormat { sample_rate: 4, channels: 1 };
        let (track, feed) = AudioTrack::new("mic", format);
        let slow = track.clone_track();
        let fast = track.clone_track();

        // Each clone buffers CONSUMER_BUFFER_SECS of audio: 20 samples here.
        feed.deliver(&[0.0; 15]);
        fast.take_samples();
        feed.deliver(&[0.0; 15]);

        assert_eq!(slow.dropped_samples(), 10);
        assert_eq!(slow.take_samples().len(), 20);
        assert_eq!(fast.dropped_samples(), 0);
        assert_eq!(track.dropped_samples(), 0);
    }

    #[test]
    fn dropped_clone_is_pruned() {
        let (track, feed) = AudioTrack::new("mic", AudioFormat::default());
        let clone = track.clone_track();
        drop(clone);
        feed.deliver(&[1.0]);
        assert!(track.shared.consumers.lock().is_empty());
    }
}
