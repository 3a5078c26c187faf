use std::f32::consts::PI;
use std::sync::Arc;

use wavestrip::audio::{MemoryAudioProvider, SharedAudioProvider};

/// Sine tone at half amplitude.
pub fn tone(frequency: f32, sample_rate: u32, len: usize) -> SharedAudioProvider {
    Arc::new(MemoryAudioProvider::new(tone_samples(frequency, sample_rate, len), sample_rate))
}

pub fn tone_samples(frequency: f32, sample_rate: u32, len: usize) -> Vec<f32> {
    (0..len)
        .map(|n| 0.5 * (2.0 * PI * frequency * n as f32 / sample_rate as f32).sin())
        .collect()
}

pub fn silence(len: usize, sample_rate: u32) -> SharedAudioProvider {
    Arc::new(MemoryAudioProvider::silence(len, sample_rate))
}

/// Tone of which only the first `decoded` samples are available.
pub fn progressive_tone(
    frequency: f32,
    sample_rate: u32,
    len: usize,
    decoded: u64,
) -> Arc<MemoryAudioProvider> {
    Arc::new(MemoryAudioProvider::progressive(
        tone_samples(frequency, sample_rate, len),
        sample_rate,
        decoded,
    ))
}
