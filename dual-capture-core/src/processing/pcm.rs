//! Float sample conversion helpers for the recorders' PCM track.

/// Convert f32 samples `[-1.0, 1.0]` to 16-bit PCM (little-endian bytes).
///
/// Out-of-range and non-finite values are clamped (NaN becomes silence).
pub fn to_int16_le(samples: &[f32]) -> Vec<u8> {
    let mut data = Vec::with_capacity(samples.len() * 2);
    for &sample in samples {
        let sample = if sample.is_nan() { 0.0 } else { sample.clamp(-1.0, 1.0) };
        let value = (sample * i16::MAX as f32) as i16;
        data.extend_from_slice(&value.to_le_bytes());
    }
    data
}

/// Duration in milliseconds of `frames` sample frames at `sample_rate`.
pub fn frames_to_millis(frames: u64, sample_rate: u32) -> u64 {
    if sample_rate == 0 {
        return 0;
    }
    frames * 1000 / sample_rate as u64
}
