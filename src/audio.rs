//! Audio sample sources consumed by the strip renderers.

mod wav;

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

pub use wav::WavLoadError;

/// Mono sample source read by the renderers.
///
/// Implementations never fail: regions outside the decoded range, or regions that could not
/// be decoded, read back as silence.
pub trait AudioProvider {
    /// Fill all of `buffer` with samples starting at `start`, zero-filling out-of-range frames.
    fn get_audio(&self, buffer: &mut [f32], start: i64);

    /// Total number of samples in the source.
    fn num_samples(&self) -> u64;

    /// Number of samples decoded so far; equals `num_samples` for fully loaded sources.
    fn decoded_samples(&self) -> u64 {
        self.num_samples()
    }

    /// Sample rate in Hz.
    fn sample_rate(&self) -> u32;
}

/// Shared handle to an audio source.
pub type SharedAudioProvider = Arc<dyn AudioProvider>;

/// Whether two optional providers refer to the same source.
pub(crate) fn same_provider(
    a: Option<&SharedAudioProvider>,
    b: Option<&SharedAudioProvider>,
) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

/// Audio held fully in memory, optionally exposed progressively.
#[derive(Debug)]
pub struct MemoryAudioProvider {
    samples: Arc<[f32]>,
    sample_rate: u32,
    decoded: AtomicU64,
}

impl MemoryAudioProvider {
    /// Wrap fully decoded mono samples.
    pub fn new(samples: impl Into<Arc<[f32]>>, sample_rate: u32) -> Self {
        let samples = samples.into();
        let decoded = AtomicU64::new(samples.len() as u64);
        Self {
            samples,
            sample_rate: sample_rate.max(1),
            decoded,
        }
    }

    /// Wrap samples of which only the first `decoded` are available so far.
    pub fn progressive(samples: impl Into<Arc<[f32]>>, sample_rate: u32, decoded: u64) -> Self {
        let provider = Self::new(samples, sample_rate);
        provider.set_decoded_samples(decoded);
        provider
    }

    /// Build a source of `len` silent samples.
    pub fn silence(len: usize, sample_rate: u32) -> Self {
        Self::new(vec![0.0_f32; len], sample_rate)
    }

    /// Advance the decoded watermark, clamped to the sample count.
    pub fn set_decoded_samples(&self, decoded: u64) {
        let decoded = decoded.min(self.samples.len() as u64);
        self.decoded.store(decoded, Ordering::Release);
    }
}

impl AudioProvider for MemoryAudioProvider {
    fn get_audio(&self, buffer: &mut [f32], start: i64) {
        buffer.fill(0.0);
        let decoded = self.decoded_samples() as i64;
        let end = start.saturating_add(buffer.len() as i64).min(decoded);
        let first = start.max(0);
        if first >= end {
            return;
        }
        let offset = (first - start) as usize;
        let count = (end - first) as usize;
        let source = &self.samples[first as usize..first as usize + count];
        for (dest, &sample) in buffer[offset..offset + count].iter_mut().zip(source) {
            *dest = sanitize(sample);
        }
    }

    fn num_samples(&self) -> u64 {
        self.samples.len() as u64
    }

    fn decoded_samples(&self) -> u64 {
        self.decoded.load(Ordering::Acquire)
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

fn sanitize(sample: f32) -> f32 {
    if sample.is_finite() {
        sample.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}
