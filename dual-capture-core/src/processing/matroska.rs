//! Streamable Matroska recorder: MJPEG video plus 16-bit PCM audio.
//!
//! Written in live mode, like browser recorders do: the Segment and every
//! Cluster have unknown size, so bytes can be handed out as soon as they are
//! produced and the concatenation of all fragments is a playable file.
//!
//! Layout:
//! ```text
//! EBML header (DocType "matroska")
//! Segment (unknown size)
//! ├── Info      TimestampScale = 1ms
//! ├── Tracks    1: V_MJPEG   2: A_PCM/INT/LIT (only with audio)
//! ├── Cluster (unknown size)  Timestamp, SimpleBlock…
//! └── Cluster …
//! ```

use std::io::Cursor;
use std::time::Duration;

use image::buffer::ConvertBuffer;
use image::codecs::jpeg::JpegEncoder;
use image::{RgbImage, RgbaImage};

use crate::models::config::SessionConfiguration;
use crate::models::error::CaptureError;
use crate::processing::pcm;
use crate::traits::encoder::{CompletionCallback, EncoderFactory, EncoderSpec, MediaEncoder};

pub const MATROSKA_MIME: &str = "video/x-matroska";

const EBML: u32 = 0x1A45_DFA3;
const EBML_VERSION: u32 = 0x4286;
const EBML_READ_VERSION: u32 = 0x42F7;
const EBML_MAX_ID_LENGTH: u32 = 0x42F2;
const EBML_MAX_SIZE_LENGTH: u32 = 0x42F3;
const DOC_TYPE: u32 = 0x4282;
const DOC_TYPE_VERSION: u32 = 0x4287;
const DOC_TYPE_READ_VERSION: u32 = 0x4285;
const SEGMENT: u32 = 0x1853_8067;
const INFO: u32 = 0x1549_A966;
const TIMESTAMP_SCALE: u32 = 0x2A_D7B1;
const MUXING_APP: u32 = 0x4D80;
const WRITING_APP: u32 = 0x5741;
const TRACKS: u32 = 0x1654_AE6B;
const TRACK_ENTRY: u32 = 0xAE;
const TRACK_NUMBER: u32 = 0xD7;
const TRACK_UID: u32 = 0x73C5;
const TRACK_TYPE: u32 = 0x83;
const FLAG_LACING: u32 = 0x9C;
const CODEC_ID: u32 = 0x86;
const DEFAULT_DURATION: u32 = 0x23_E383;
const VIDEO: u32 = 0xE0;
const PIXEL_WIDTH: u32 = 0xB0;
const PIXEL_HEIGHT: u32 = 0xBA;
const AUDIO: u32 = 0xE1;
const SAMPLING_FREQUENCY: u32 = 0xB5;
const CHANNELS: u32 = 0x9F;
const BIT_DEPTH: u32 = 0x6264;
const CLUSTER: u32 = 0x1F43_B675;
const CLUSTER_TIMESTAMP: u32 = 0xE7;
const SIMPLE_BLOCK: u32 = 0xA3;

/// Size marker for elements whose length is not known when written.
const UNKNOWN_SIZE: [u8; 8] = [0x01, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF];

const VIDEO_TRACK: u64 = 1;
const AUDIO_TRACK: u64 = 2;

/// Block timestamps are i16 offsets from their cluster.
const MAX_CLUSTER_SPAN_MS: i64 = 30_000;

const APP_NAME: &str = concat!("dual-capture-core ", env!("CARGO_PKG_VERSION"));

fn write_id(buf: &mut Vec<u8>, id: u32) {
    let bytes = id.to_be_bytes();
    let skip = match id {
        0..=0xFF => 3,
        0x100..=0xFFFF => 2,
        0x1_0000..=0xFF_FFFF => 1,
        _ => 0,
    };
    buf.extend_from_slice(&bytes[skip..]);
}

/// EBML variable-length size. Length-1 all-ones patterns are reserved for
/// "unknown", so each width holds up to `2^(7w) - 2`.
pub(crate) fn write_size(buf: &mut Vec<u8>, size: u64) {
    let mut width = 1;
    while width < 8 && size >= (1u64 << (7 * width)) - 1 {
        width += 1;
    }
    let marked = size | (1u64 << (7 * width));
    buf.extend_from_slice(&marked.to_be_bytes()[8 - width..]);
}

fn element(buf: &mut Vec<u8>, id: u32, payload: &[u8]) {
    write_id(buf, id);
    write_size(buf, payload.len() as u64);
    buf.extend_from_slice(payload);
}

fn uint_element(buf: &mut Vec<u8>, id: u32, value: u64) {
    let bytes = value.to_be_bytes();
    let skip = (value.leading_zeros() / 8).min(7) as usize;
    element(buf, id, &bytes[skip..]);
}

fn float_element(buf: &mut Vec<u8>, id: u32, value: f64) {
    element(buf, id, &value.to_be_bytes());
}

fn master(buf: &mut Vec<u8>, id: u32, build: impl FnOnce(&mut Vec<u8>)) {
    let mut body = Vec::new();
    build(&mut body);
    element(buf, id, &body);
}

/// EBML header, Segment start, Info and Tracks for `spec`.
pub fn stream_header(spec: &EncoderSpec, track_uid_seed: u64) -> Vec<u8> {
    let mut buf = Vec::with_capacity(256);

    master(&mut buf, EBML, |b| {
        uint_element(b, EBML_VERSION, 1);
        uint_element(b, EBML_READ_VERSION, 1);
        uint_element(b, EBML_MAX_ID_LENGTH, 4);
        uint_element(b, EBML_MAX_SIZE_LENGTH, 8);
        element(b, DOC_TYPE, b"matroska");
        uint_element(b, DOC_TYPE_VERSION, 4);
        uint_element(b, DOC_TYPE_READ_VERSION, 2);
    });

    write_id(&mut buf, SEGMENT);
    buf.extend_from_slice(&UNKNOWN_SIZE);

    master(&mut buf, INFO, |b| {
        uint_element(b, TIMESTAMP_SCALE, 1_000_000);
        element(b, MUXING_APP, APP_NAME.as_bytes());
        element(b, WRITING_APP, APP_NAME.as_bytes());
    });

    master(&mut buf, TRACKS, |b| {
        master(b, TRACK_ENTRY, |t| {
            uint_element(t, TRACK_NUMBER, VIDEO_TRACK);
            uint_element(t, TRACK_UID, track_uid_seed.wrapping_mul(2) | 1);
            uint_element(t, TRACK_TYPE, 1);
            uint_element(t, FLAG_LACING, 0);
            element(t, CODEC_ID, b"V_MJPEG");
            if spec.frame_rate > 0 {
                uint_element(t, DEFAULT_DURATION, 1_000_000_000 / spec.frame_rate as u64);
            }
            master(t, VIDEO, |v| {
                uint_element(v, PIXEL_WIDTH, spec.size.width as u64);
                uint_element(v, PIXEL_HEIGHT, spec.size.height as u64);
            });
        });
        if let Some(audio) = spec.audio {
            master(b, TRACK_ENTRY, |t| {
                uint_element(t, TRACK_NUMBER, AUDIO_TRACK);
                uint_element(t, TRACK_UID, track_uid_seed.wrapping_mul(2).wrapping_add(2) | 2);
                uint_element(t, TRACK_TYPE, 2);
                uint_element(t, FLAG_LACING, 0);
                element(t, CODEC_ID, b"A_PCM/INT/LIT");
                master(t, AUDIO, |a| {
                    float_element(a, SAMPLING_FREQUENCY, audio.sample_rate as f64);
                    uint_element(a, CHANNELS, audio.channels as u64);
                    uint_element(a, BIT_DEPTH, 16);
                });
            });
        }
    });

    buf
}

/// Built-in recorder writing [`MATROSKA_MIME`].
pub struct MatroskaEncoder {
    spec: EncoderSpec,
    jpeg_quality: u8,
    pending: Vec<u8>,
    cluster_start_ms: Option<u64>,
    audio_frames: u64,
    video_frames: u64,
    started: bool,
    finished: bool,
}

impl MatroskaEncoder {
    pub fn new(spec: EncoderSpec, jpeg_quality: u8) -> Self {
        Self {
            spec,
            jpeg_quality: jpeg_quality.clamp(1, 100),
            pending: Vec::new(),
            cluster_start_ms: None,
            audio_frames: 0,
            video_frames: 0,
            started: false,
            finished: false,
        }
    }

    pub fn video_frames(&self) -> u64 {
        self.video_frames
    }

    fn ensure_running(&self) -> Result<(), CaptureError> {
        if !self.started || self.finished {
            return Err(CaptureError::InvalidState(format!(
                "{} recorder is not running",
                self.spec.view.label()
            )));
        }
        Ok(())
    }

    fn write_block(&mut self, track: u64, timestamp_ms: u64, payload: &[u8]) {
        let relative = match self.cluster_start_ms {
            Some(start) if (timestamp_ms as i64 - start as i64).abs() <= MAX_CLUSTER_SPAN_MS => {
                timestamp_ms as i64 - start as i64
            }
            _ => {
                write_id(&mut self.pending, CLUSTER);
                self.pending.extend_from_slice(&UNKNOWN_SIZE);
                uint_element(&mut self.pending, CLUSTER_TIMESTAMP, timestamp_ms);
                self.cluster_start_ms = Some(timestamp_ms);
                0
            }
        };

        let mut block = Vec::with_capacity(payload.len() + 4);
        write_size(&mut block, track);
        block.extend_from_slice(&(relative as i16).to_be_bytes());
        block.push(0x80); // keyframe
        block.extend_from_slice(payload);
        element(&mut self.pending, SIMPLE_BLOCK, &block);
    }

    fn encode_jpeg(&self, frame: &RgbaImage) -> Result<Vec<u8>, CaptureError> {
        let rgb: RgbImage = frame.convert();
        let mut out = Cursor::new(Vec::new());
        JpegEncoder::new_with_quality(&mut out, self.jpeg_quality)
            .encode_image(&rgb)
            .map_err(|e| CaptureError::EncodingFailed(format!("jpeg: {}", e)))?;
        Ok(out.into_inner())
    }
}

impl MediaEncoder for MatroskaEncoder {
    fn mime_type(&self) -> &str {
        &self.spec.mime_type
    }

    fn start(&mut self) -> Result<(), CaptureError> {
        if self.started {
            return Err(CaptureError::InvalidState("recorder already started".into()));
        }
        let seed = uuid::Uuid::new_v4().as_u64_pair().0;
        self.pending.extend_from_slice(&stream_header(&self.spec, seed));
        self.started = true;
        Ok(())
    }

    fn push_video(&mut self, frame: &RgbaImage, timestamp: Duration) -> Result<(), CaptureError> {
        self.ensure_running()?;
        let jpeg = self.encode_jpeg(frame)?;
        self.write_block(VIDEO_TRACK, timestamp.as_millis() as u64, &jpeg);
        self.video_frames += 1;
        Ok(())
    }

    fn push_audio(&mut self, samples: &[f32]) -> Result<(), CaptureError> {
        self.ensure_running()?;
        let Some(format) = self.spec.audio else {
            return Ok(());
        };
        if samples.is_empty() {
            return Ok(());
        }
        let timestamp_ms = pcm::frames_to_millis(self.audio_frames, format.sample_rate);
        let payload = pcm::to_int16_le(samples);
        self.write_block(AUDIO_TRACK, timestamp_ms, &payload);
        self.audio_frames += (samples.len() / format.channels.max(1) as usize) as u64;
        Ok(())
    }

    fn take_data(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.pending)
    }

    fn stop(&mut self, on_complete: CompletionCallback) {
        if let Err(e) = self.ensure_running() {
            on_complete(Err(e));
            return;
        }
        self.finished = true;
        on_complete(Ok(std::mem::take(&mut self.pending)));
    }

    fn abort(&mut self) {
        self.pending.clear();
        self.finished = true;
    }
}

/// Factory for [`MatroskaEncoder`]; accepts `video/x-matroska` with no
/// codecs parameter or with codecs drawn from `mjpeg` and `pcm`.
#[derive(Debug, Clone)]
pub struct MatroskaEncoderFactory {
    pub jpeg_quality: u8,
}

impl Default for MatroskaEncoderFactory {
    fn default() -> Self {
        Self::from(&SessionConfiguration::default())
    }
}

impl From<&SessionConfiguration> for MatroskaEncoderFactory {
    fn from(config: &SessionConfiguration) -> Self {
        Self {
            jpeg_quality: config.jpeg_quality,
        }
    }
}

impl EncoderFactory for MatroskaEncoderFactory {
    fn is_type_supported(&self, mime_type: &str) -> bool {
        let mut parts = mime_type.split(';');
        let essence = parts.next().unwrap_or_default().trim();
        if !essence.eq_ignore_ascii_case(MATROSKA_MIME) {
            return false;
        }
        parts.all(|param| {
            let Some((key, value)) = param.split_once('=') else {
                return false;
            };
            if !key.trim().eq_ignore_ascii_case("codecs") {
                return false;
            }
            value
                .trim()
                .trim_matches('"')
                .split(',')
                .all(|codec| matches!(codec.trim().to_ascii_lowercase().as_str(), "mjpeg" | "pcm"))
        })
    }

    fn create(&self, spec: &EncoderSpec) -> Result<Box<dyn MediaEncoder>, CaptureError> {
        if !self.is_type_supported(&spec.mime_type) {
            return Err(CaptureError::EncoderUnsupported(spec.mime_type.clone()));
        }
        if spec.size.is_empty() {
            return Err(CaptureError::ConfigurationFailed("recorder size must be non-zero".into()));
        }
        Ok(Box::new(MatroskaEncoder::new(spec.clone(), self.jpeg_quality)))
    }
}
