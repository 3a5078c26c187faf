//! Frequency-power blocks derived from raw audio.

use rustfft::num_complex::Complex32;
use tracing::debug;

use super::dft::{DftError, RealDft, hann_window, plan_dft};
use crate::audio::SharedAudioProvider;
use crate::cache::BlockFactory;
use crate::settings::DftBackendKind;

/// Sample rate above which resolution is scaled up.
pub const REFERENCE_SAMPLE_RATE: u64 = 50_000;

/// User-chosen resolution and the effective one after sample-rate scaling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DerivationResolution {
    size_user: u32,
    distance_user: u32,
    size: u32,
    distance: u32,
}

impl DerivationResolution {
    /// Scale `size` and `distance` up by one step per halving needed to bring `sample_rate`
    /// down to at most 50 kHz.
    pub fn for_sample_rate(size: u32, distance: u32, sample_rate: u32) -> Self {
        let mut effective_distance = distance;
        while (sample_rate as u64) >> (effective_distance - distance) > REFERENCE_SAMPLE_RATE {
            effective_distance += 1;
        }
        Self {
            size_user: size,
            distance_user: distance,
            size: size + (effective_distance - distance),
            distance: effective_distance,
        }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn distance(&self) -> u32 {
        self.distance
    }

    pub fn user_size(&self) -> u32 {
        self.size_user
    }

    pub fn user_distance(&self) -> u32 {
        self.distance_user
    }

    /// Values per derived block.
    pub fn bins(&self) -> usize {
        1 << self.size
    }

    /// Samples fed to the transform per block.
    pub fn window_len(&self) -> usize {
        2 << self.size
    }

    /// Samples between the starts of consecutive blocks.
    pub fn hop(&self) -> usize {
        1 << self.distance
    }

    /// Magnitude scale keeping levels independent of window length and sample-rate scaling.
    ///
    /// The leading factor 2 compensates the coherent gain of the Hann window.
    pub fn scale_factor(&self) -> f32 {
        let window = (4 * self.bins()) as f32;
        let upscale = (1u64 << (self.size - self.size_user)) as f32;
        2.0 * 9.0 / window.sqrt() / upscale.sqrt()
    }

    /// Blocks needed to cover `samples`, counting a trailing partial hop.
    pub fn block_count(&self, samples: u64) -> usize {
        let hop = self.hop() as u64;
        (samples.saturating_add(hop - 1) >> self.distance) as usize
    }

    /// Frequency in Hz of value `j` of a derived block.
    pub fn bin_frequency(&self, j: usize, sample_rate: u32) -> f32 {
        (j + 1) as f32 * sample_rate as f32 / self.window_len() as f32
    }
}

/// Produces one power spectrum per hop of audio.
pub struct SpectrumDerivation {
    provider: SharedAudioProvider,
    resolution: DerivationResolution,
    dft: Box<dyn RealDft>,
    window: Vec<f32>,
    input: Vec<f32>,
    output: Vec<Complex32>,
}

impl SpectrumDerivation {
    pub fn new(
        provider: SharedAudioProvider,
        resolution: DerivationResolution,
        backend: DftBackendKind,
    ) -> Result<Self, DftError> {
        let window_len = resolution.window_len();
        let dft = plan_dft(backend, window_len)?;
        debug!(
            size = resolution.size,
            distance = resolution.distance,
            ?backend,
            "Planned spectrum derivation"
        );
        Ok(Self {
            provider,
            resolution,
            dft,
            window: hann_window(window_len),
            input: vec![0.0; window_len],
            output: vec![Complex32::default(); window_len / 2 + 1],
        })
    }

    pub fn resolution(&self) -> DerivationResolution {
        self.resolution
    }

    pub fn provider(&self) -> &SharedAudioProvider {
        &self.provider
    }

    /// Switch to a resolution with the same effective size but a different hop.
    ///
    /// Scratch buffers and the transform plan are kept.
    pub(crate) fn update_hop(&mut self, resolution: DerivationResolution) {
        debug_assert_eq!(resolution.size, self.resolution.size);
        debug!(
            from = self.resolution.distance,
            to = resolution.distance,
            "Changing spectrum hop"
        );
        self.resolution = resolution;
    }

    /// Derive block `index` into `out`, which holds `bins()` values.
    ///
    /// The transform window is centred on the block's first sample.
    pub fn fill_block(&mut self, index: usize, out: &mut [f32]) {
        let bins = self.resolution.bins();
        let start = ((index as i64) << self.resolution.distance) - bins as i64;
        self.provider.get_audio(&mut self.input, start);
        for (sample, weight) in self.input.iter_mut().zip(&self.window) {
            *sample *= weight;
        }
        self.dft.forward(&self.input, &mut self.output);

        let scale = self.resolution.scale_factor();
        for (value, bin) in out.iter_mut().zip(&self.output[1..=bins]) {
            *value = (bin.norm() * scale + 1.0).log10();
        }
    }
}

impl BlockFactory for SpectrumDerivation {
    type Block = Box<[f32]>;

    fn produce_block(&mut self, index: usize) -> Box<[f32]> {
        let mut block = vec![0.0; self.resolution.bins()].into_boxed_slice();
        self.fill_block(index, &mut block);
        block
    }

    fn block_size(&self) -> usize {
        self.resolution.bins() * std::mem::size_of::<f32>()
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::PI;
    use std::sync::Arc;

    use super::*;
    use crate::audio::MemoryAudioProvider;

    fn tone(frequency: f32, sample_rate: u32, len: usize) -> SharedAudioProvider {
        let samples: Vec<f32> = (0..len)
            .map(|n| 0.5 * (2.0 * PI * frequency * n as f32 / sample_rate as f32).sin())
            .collect();
        Arc::new(MemoryAudioProvider::new(samples, sample_rate))
    }

    fn derivation(
        provider: SharedAudioProvider,
        resolution: DerivationResolution,
        backend: DftBackendKind,
    ) -> SpectrumDerivation {
        SpectrumDerivation::new(provider, resolution, backend).unwrap()
    }

    #[test]
    fn resolution_is_unscaled_at_common_rates() {
        for rate in [8_000, 44_100, 48_000, 50_000] {
            let resolution = DerivationResolution::for_sample_rate(8, 8, rate);
            assert_eq!(resolution.size(), 8);
            assert_eq!(resolution.distance(), 8);
        }
    }

    #[test]
    fn resolution_scales_above_reference_rate() {
        let resolution = DerivationResolution::for_sample_rate(8, 6, 96_000);
        assert_eq!(resolution.distance(), 7);
        assert_eq!(resolution.size(), 9);
        let resolution = DerivationResolution::for_sample_rate(8, 6, 192_000);
        assert_eq!(resolution.distance(), 8);
        assert_eq!(resolution.size(), 10);
        assert_eq!(resolution.user_size(), 8);
    }

    #[test]
    fn block_count_rounds_up() {
        let resolution = DerivationResolution::for_sample_rate(8, 4, 44_100);
        assert_eq!(resolution.block_count(0), 0);
        assert_eq!(resolution.block_count(16), 1);
        assert_eq!(resolution.block_count(17), 2);
    }

    #[test]
    fn silence_derives_zeros() {
        let provider: SharedAudioProvider = Arc::new(MemoryAudioProvider::silence(4_096, 44_100));
        let resolution = DerivationResolution::for_sample_rate(6, 5, 44_100);
        let mut derivation = derivation(provider, resolution, DftBackendKind::RustFft);
        let block = derivation.produce_block(3);
        assert_eq!(block.len(), 64);
        assert!(block.iter().all(|&value| value == 0.0));
        assert_eq!(derivation.block_size(), 256);
    }

    #[test]
    fn tone_peaks_near_its_bin() {
        let rate = 8_000;
        let provider = tone(1_000.0, rate, 8_192);
        let resolution = DerivationResolution::for_sample_rate(7, 6, rate);
        let mut derivation = derivation(provider, resolution, DftBackendKind::Radix2);
        let block = derivation.produce_block(40);
        let (peak, _) = block
            .iter()
            .enumerate()
            .fold((0, f32::MIN), |best, (j, &v)| if v > best.1 { (j, v) } else { best });
        let peak_frequency = resolution.bin_frequency(peak, rate);
        assert!((peak_frequency - 1_000.0).abs() <= 32.0, "{peak_frequency}");
        assert!(block.iter().all(|v| v.is_finite() && *v >= 0.0));
    }

    #[test]
    fn fill_block_is_deterministic() {
        let provider = tone(440.0, 22_050, 16_384);
        let resolution = DerivationResolution::for_sample_rate(8, 7, 22_050);
        let mut derivation = derivation(provider, resolution, DftBackendKind::RustFft);
        let first = derivation.produce_block(10);
        derivation.produce_block(50);
        let again = derivation.produce_block(10);
        assert_eq!(first, again);
    }

    #[test]
    fn backends_derive_matching_levels() {
        let provider = tone(700.0, 16_000, 8_192);
        let resolution = DerivationResolution::for_sample_rate(7, 6, 16_000);
        let mut a = derivation(provider.clone(), resolution, DftBackendKind::RustFft);
        let mut b = derivation(provider, resolution, DftBackendKind::Radix2);
        let (x, y) = (a.produce_block(20), b.produce_block(20));
        for (p, q) in x.iter().zip(y.iter()) {
            assert!((p - q).abs() < 1e-3);
        }
    }
}
