use std::time::Duration;

use image::RgbaImage;

use crate::models::capture::Artifact;
use crate::models::error::CaptureError;
use crate::models::source::AudioTrack;
use crate::models::view::{FrameSize, ViewKind};
use crate::traits::encoder::{CompletionCallback, MediaEncoder};

/// One view's recorder while a recording is in flight.
///
/// Holds the encoder, the view's own clone of the microphone track and the
/// ordered fragments flushed so far. The artifact is the fragments followed
/// by the encoder's terminal chunk.
pub struct RecordingJob {
    view: ViewKind,
    encoder: Box<dyn MediaEncoder>,
    audio: Option<AudioTrack>,
    size: FrameSize,
    fragments: Vec<Vec<u8>>,
    frames_pushed: u64,
    stop_issued: bool,
    finished: bool,
}

impl RecordingJob {
    pub fn new(view: ViewKind, encoder: Box<dyn MediaEncoder>, audio: Option<AudioTrack>, size: FrameSize) -> Self {
        Self {
            view,
            encoder,
            audio,
            size,
            fragments: Vec::new(),
            frames_pushed: 0,
            stop_issued: false,
            finished: false,
        }
    }

    pub fn view(&self) -> ViewKind {
        self.view
    }

    pub fn has_audio(&self) -> bool {
        self.audio.is_some()
    }

    pub fn frames_pushed(&self) -> u64 {
        self.frames_pushed
    }

    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }

    pub fn start(&mut self) -> Result<(), CaptureError> {
        self.encoder.start()
    }

    pub fn push_frame(&mut self, frame: &RgbaImage, timestamp: Duration) -> Result<(), CaptureError> {
        if self.stop_issued {
            return Ok(());
        }
        self.encoder.push_video(frame, timestamp)?;
        self.frames_pushed += 1;
        Ok(())
    }

    /// Forward whatever the microphone clone queued since the last call.
    pub fn drain_audio(&mut self) -> Result<(), CaptureError> {
        if self.stop_issued {
            return Ok(());
        }
        let Some(track) = self.audio.as_ref() else {
            return Ok(());
        };
        let samples = track.take_samples();
        if samples.is_empty() {
            return Ok(());
        }
        self.encoder.push_audio(&samples)
    }

    /// Move encoded output into the fragment list.
    pub fn flush(&mut self) {
        let data = self.encoder.take_data();
        if !data.is_empty() {
            self.fragments.push(data);
        }
    }

    /// Issue stop. Pending audio is encoded first; the remaining encoder
    /// output arrives as the terminal chunk through `on_complete`.
    pub fn stop(&mut self, on_complete: CompletionCallback) {
        if self.stop_issued {
            return;
        }
        if let Err(e) = self.drain_audio() {
            log::warn!("{} recorder dropped final audio: {}", self.view.label(), e);
        }
        self.stop_issued = true;
        if let Some(dropped) = self.audio.as_ref().map(AudioTrack::dropped_samples).filter(|&n| n > 0) {
            log::warn!("{} recorder lost {} audio samples to overflow", self.view.label(), dropped);
        }
        // Dropping the clone detaches its queue without ending the shared track.
        self.audio = None;
        self.encoder.stop(on_complete);
    }

    /// Assemble the artifact from the completion this side reported.
    ///
    /// `None` means the encoder never completed; it is aborted.
    pub fn finish(&mut self, completion: Option<Result<Vec<u8>, CaptureError>>) -> Result<Artifact, String> {
        self.finished = true;
        match completion {
            None => {
                self.encoder.abort();
                Err("timed out waiting for recorder".into())
            }
            Some(Err(e)) => Err(e.to_string()),
            Some(Ok(tail)) => {
                let data = self.assemble(tail);
                if data.is_empty() {
                    Err("recorder produced no data".into())
                } else {
                    Ok(self.artifact(data))
                }
            }
        }
    }

    /// Best-effort artifact from what was flushed plus any terminal chunk
    /// already reported. `None` if nothing usable exists.
    pub fn salvage(&mut self, completion: Option<Result<Vec<u8>, CaptureError>>) -> Option<Artifact> {
        self.finished = true;
        let tail = match completion {
            Some(Ok(tail)) => tail,
            Some(Err(e)) => {
                log::warn!("{} recorder failed while salvaging: {}", self.view.label(), e);
                Vec::new()
            }
            None => {
                self.flush();
                self.encoder.abort();
                Vec::new()
            }
        };
        let data = self.assemble(tail);
        (!data.is_empty()).then(|| self.artifact(data))
    }

    /// Discard everything. Used on rollback and teardown.
    pub fn abort(&mut self) {
        if !self.finished {
            self.encoder.abort();
            self.finished = true;
        }
        self.fragments.clear();
    }

    fn assemble(&mut self, tail: Vec<u8>) -> Vec<u8> {
        let total = self.fragments.iter().map(Vec::len).sum::<usize>() + tail.len();
        let mut data = Vec::with_capacity(total);
        for fragment in self.fragments.drain(..) {
            data.extend_from_slice(&fragment);
        }
        data.extend_from_slice(&tail);
        data
    }

    fn artifact(&self, data: Vec<u8>) -> Artifact {
        Artifact::new(self.view, data, self.encoder.mime_type().to_string(), self.size, None)
    }
}

impl Drop for RecordingJob {
    fn drop(&mut self) {
        if !self.finished {
            self.encoder.abort();
        }
    }
}
