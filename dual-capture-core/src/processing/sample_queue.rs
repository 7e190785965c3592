use std::collections::VecDeque;

/// Bounded FIFO of interleaved audio samples for one track consumer.
///
/// Wrap in `Arc<parking_lot::Mutex<SampleQueue>>` when the producer runs on
/// a device thread. Overflow drops the oldest samples and counts them.
#[derive(Debug)]
pub struct SampleQueue {
    samples: VecDeque<f32>,
    capacity: usize,
    dropped: u64,
}

impl SampleQueue {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
            dropped: 0,
        }
    }

    /// Queue sized for `seconds` of audio at the given format.
    pub fn for_duration(sample_rate: u32, channels: u16, seconds: u32) -> Self {
        Self::new(sample_rate as usize * channels as usize * seconds as usize)
    }

    pub fn push(&mut self, samples: &[f32]) {
        if samples.is_empty() {
            return;
        }

        let samples = if samples.len() > self.capacity {
            self.dropped += (samples.len() - self.capacity) as u64;
            &samples[samples.len() - self.capacity..]
        } else {
            samples
        };

        let overflow = (self.samples.len() + samples.len()).saturating_sub(self.capacity);
        if overflow > 0 {
            self.samples.drain(..overflow);
            self.dropped += overflow as u64;
        }
        self.samples.extend(samples.iter().copied());
    }

    /// Remove and return everything queued.
    pub fn drain_all(&mut self) -> Vec<f32> {
        self.samples.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Total samples discarded because the consumer fell behind.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_then_drain() {
        let mut queue = SampleQueue::new(8);
        queue.push(&[0.1, 0.2, 0.3]);
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.drain_all(), vec![0.1, 0.2, 0.3]);
        assert!(queue.is_empty());
    }

    #[test]
    fn overflow_drops_oldest() {
        let mut queue = SampleQueue::new(4);
        queue.push(&[1.0, 2.0, 3.0, 4.0]);
        queue.push(&[5.0, 6.0]);
        assert_eq!(queue.drain_all(), vec![3.0, 4.0, 5.0, 6.0]);
        assert_eq!(queue.dropped(), 2);
    }

    #[test]
    fn oversize_push_keeps_tail() {
        let mut queue = SampleQueue::new(3);
        queue.push(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(queue.drain_all(), vec![3.0, 4.0, 5.0]);
        assert_eq!(queue.dropped(), 2);
    }

    #[test]
    fn sized_for_duration() {
        let mut queue = SampleQueue::for_duration(48_000, 2, 5);
        queue.push(&vec![0.0; 480_000]);
        assert_eq!(queue.len(), 480_000);
        queue.push(&[1.0]);
        assert_eq!(queue.dropped(), 1);
    }
}
