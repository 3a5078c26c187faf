//! Spectrogram strip strategy.
//!
//! Each pixel column of a strip shows the derived power spectrum of the audio at that time,
//! with frequency running bottom to top along a [`FrequencyAxis`]. Derived spectra live in a
//! [`DataBlockCache`] shared by all rendering styles; styles only change the palette.

pub mod derivation;
pub mod dft;
pub mod frequency_axis;

use std::any::Any;

use egui::ColorImage;
use tracing::{debug, warn};

pub use derivation::{DerivationResolution, SpectrumDerivation};
pub use dft::{DftError, RealDft};
pub use frequency_axis::FrequencyAxis;

use crate::cache::DataBlockCache;
use crate::render::{
    AudioRenderingStyle, BitmapProvider, ColorScheme, DrawSurface, PixelRect, ProviderState,
};
use crate::settings::{
    ColorSchemeSettings, DERIVATION_DISTANCE_RANGE, DERIVATION_SIZE_RANGE, DftBackendKind,
    SpectrumSettings,
};

/// Palette precision of spectrum color schemes.
pub const SPECTRUM_COLOR_PRECISION: u32 = 12;

const SPECTRUM_MACROBLOCK_EXPONENT: u32 = 10;
const REFERENCE_POSITION_MIN: f32 = 0.01;
const REFERENCE_POSITION_MAX: f32 = 0.99;

/// Derived-block values sampled for one pixel row.
#[derive(Clone, Copy, Debug, PartialEq)]
enum RowSpan {
    /// Blend two neighbouring values.
    Interpolate { lo: usize, hi: usize, t: f32 },
    /// Maximum over an inclusive range of values.
    Peak { lo: usize, hi: usize },
}

impl RowSpan {
    fn sample(self, block: &[f32]) -> f32 {
        match self {
            RowSpan::Interpolate { lo, hi, t } => block[lo] * (1.0 - t) + block[hi] * t,
            RowSpan::Peak { lo, hi } => block[lo..=hi].iter().copied().fold(0.0, f32::max),
        }
    }
}

/// Spectrogram implementation of [`BitmapProvider`].
pub struct SpectrumRenderer {
    state: ProviderState,
    size: u32,
    distance: u32,
    max_frequency: f32,
    reference_position: f32,
    backend: DftBackendKind,
    colors: Vec<ColorScheme>,
    axis: FrequencyAxis,
    cache: Option<DataBlockCache<SpectrumDerivation>>,
    rows: Vec<RowSpan>,
    unsettled: Vec<f32>,
}

impl SpectrumRenderer {
    pub fn new(settings: &SpectrumSettings, colors: &ColorSchemeSettings) -> Self {
        let reference_position = clamp_reference_position(settings.reference_frequency_position);
        let max_frequency = settings.max_frequency.max(1.0);
        let colors = AudioRenderingStyle::ALL
            .iter()
            .map(|&style| ColorScheme::new(SPECTRUM_COLOR_PRECISION, colors.for_style(style)))
            .collect();
        Self {
            state: ProviderState::default(),
            size: clamp_setting(settings.derivation_size, &DERIVATION_SIZE_RANGE, "size"),
            distance: clamp_setting(
                settings.derivation_distance,
                &DERIVATION_DISTANCE_RANGE,
                "distance",
            ),
            max_frequency,
            reference_position,
            backend: settings.dft_backend,
            colors,
            axis: FrequencyAxis::new(max_frequency, reference_position),
            cache: None,
            rows: Vec::new(),
            unsettled: Vec::new(),
        }
    }

    /// User-chosen `(size, distance)` exponents.
    pub fn resolution(&self) -> (u32, u32) {
        (self.size, self.distance)
    }

    /// Effective resolution for the current audio, if any is attached.
    pub fn derivation_resolution(&self) -> Option<DerivationResolution> {
        self.cache.as_ref().map(|cache| cache.factory().resolution())
    }

    pub fn axis(&self) -> &FrequencyAxis {
        &self.axis
    }

    pub fn reference_frequency_position(&self) -> f32 {
        self.reference_position
    }

    /// Number of derived blocks, zero without audio.
    pub fn block_count(&self) -> usize {
        self.cache.as_ref().map_or(0, DataBlockCache::block_count)
    }

    /// Accounted bytes of cached derived spectra.
    pub fn cache_size(&self) -> usize {
        self.cache.as_ref().map_or(0, DataBlockCache::size)
    }

    /// Set the `size` (bins per block, log2) and `distance` (hop, log2) exponents.
    ///
    /// A size change rebuilds the derivation. A distance-only change keeps the transform
    /// plan and scratch buffers but resizes the cache for the new hop.
    pub fn set_resolution(&mut self, size: u32, distance: u32) {
        let size = clamp_setting(size, &DERIVATION_SIZE_RANGE, "size");
        let distance = clamp_setting(distance, &DERIVATION_DISTANCE_RANGE, "distance");
        if (size, distance) == (self.size, self.distance) {
            return;
        }
        let size_changed = size != self.size;
        self.size = size;
        self.distance = distance;
        if size_changed {
            self.recreate_cache();
            return;
        }
        let Some(cache) = self.cache.as_mut() else {
            return;
        };
        let sample_rate = cache.factory().provider().sample_rate();
        let num_samples = cache.factory().provider().num_samples();
        let resolution = DerivationResolution::for_sample_rate(size, distance, sample_rate);
        cache.factory_mut().update_hop(resolution);
        cache.set_block_count(resolution.block_count(num_samples));
    }

    /// Move 1 kHz to `position` (fraction of the strip height from the bottom).
    pub fn set_reference_frequency_position(&mut self, position: f32) {
        let position = clamp_reference_position(position);
        if position == self.reference_position {
            return;
        }
        self.reference_position = position;
        self.update_axis();
    }

    /// Set the highest displayed frequency; it is further capped at the Nyquist frequency.
    pub fn set_max_frequency(&mut self, max_frequency: f32) {
        if !(max_frequency > 0.0) {
            warn!(max_frequency, "Ignoring non-positive maximum frequency");
            return;
        }
        if max_frequency == self.max_frequency {
            return;
        }
        self.max_frequency = max_frequency;
        self.update_axis();
    }

    fn update_axis(&mut self) {
        let nyquist = self
            .state
            .provider()
            .map_or(f32::INFINITY, |provider| provider.sample_rate() as f32 / 2.0);
        self.axis = FrequencyAxis::new(self.max_frequency.min(nyquist), self.reference_position);
    }

    fn recreate_cache(&mut self) {
        self.cache = None;
        let Some(provider) = self.state.provider().cloned() else {
            return;
        };
        let resolution =
            DerivationResolution::for_sample_rate(self.size, self.distance, provider.sample_rate());
        let block_count = resolution.block_count(provider.num_samples());
        match SpectrumDerivation::new(provider, resolution, self.backend) {
            Ok(derivation) => {
                debug!(block_count, "Created spectrum cache");
                self.cache = Some(DataBlockCache::new(
                    block_count,
                    SPECTRUM_MACROBLOCK_EXPONENT,
                    derivation,
                ));
            }
            Err(err) => warn!("Spectrum derivation unavailable: {err}"),
        }
    }

    /// Map every pixel row of a strip `height` pixels tall onto derived-block values.
    fn update_rows(&mut self, height: usize, resolution: DerivationResolution, sample_rate: u32) {
        self.rows.clear();
        let bins = resolution.bins();
        let last = (bins - 1) as f32;
        let per_bin = resolution.window_len() as f32 / sample_rate.max(1) as f32;
        let to_bin = |position: f32| self.axis.frequency_at(position) * per_bin - 1.0;
        for y in 0..height {
            let row = (height - 1 - y) as f32;
            let b0 = to_bin(row / height as f32);
            let b1 = to_bin((row + 1.0) / height as f32);
            let span = if b1 - b0 < 2.0 {
                let centre = (0.5 * (b0 + b1)).clamp(0.0, last);
                let lo = centre.floor() as usize;
                RowSpan::Interpolate {
                    lo,
                    hi: (lo + 1).min(bins - 1),
                    t: centre - lo as f32,
                }
            } else {
                let lo = b0.ceil().clamp(0.0, last) as usize;
                let hi = b1.floor().clamp(0.0, last) as usize;
                RowSpan::Peak { lo, hi: hi.max(lo) }
            };
            self.rows.push(span);
        }
    }
}

impl BitmapProvider for SpectrumRenderer {
    fn state(&self) -> &ProviderState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ProviderState {
        &mut self.state
    }

    fn render(&mut self, bitmap: &mut ColorImage, start: usize, style: AudioRenderingStyle) {
        let [width, height] = bitmap.size;
        let colors = &self.colors[style.index()];
        let silence = colors.get(0.0);
        let Some(cache) = self.cache.as_ref() else {
            bitmap.pixels.fill(silence);
            return;
        };
        let resolution = cache.factory().resolution();
        let sample_rate = cache.factory().provider().sample_rate();
        self.update_rows(height, resolution, sample_rate);

        let Self {
            state,
            colors,
            cache,
            rows,
            unsettled,
            ..
        } = self;
        let Some(cache) = cache.as_mut() else {
            return;
        };
        let colors = &colors[style.index()];
        let samples_per_pixel = state.samples_per_pixel();
        let amplitude = state.amplitude_scale();
        let hop = resolution.hop() as f64;
        // Blocks whose window reaches past the decoded audio are derived but not cached.
        let provider = cache.factory().provider();
        let settled_end = if provider.decoded_samples() >= provider.num_samples() {
            u64::MAX
        } else {
            provider.decoded_samples()
        };
        unsettled.resize(resolution.bins(), 0.0);

        for x in 0..width {
            let sample = (start + x) as f64 * samples_per_pixel;
            let index = (sample / hop) as usize;
            if index >= cache.block_count() {
                for y in 0..height {
                    bitmap.pixels[y * width + x] = silence;
                }
                continue;
            }
            let window_end = ((index as u64) << resolution.distance()) + resolution.bins() as u64;
            let block: &[f32] = if window_end > settled_end {
                cache.factory_mut().fill_block(index, unsettled);
                unsettled.as_slice()
            } else {
                cache.get(index).0
            };
            for (y, span) in rows.iter().enumerate() {
                let value = span.sample(block) * amplitude;
                colors.map(value, &mut bitmap.pixels[y * width + x]);
            }
        }
    }

    fn render_blank(
        &mut self,
        surface: &mut dyn DrawSurface,
        rect: PixelRect,
        style: AudioRenderingStyle,
    ) {
        surface.fill_rectangle(rect, self.colors[style.index()].get(0.0));
    }

    fn age_cache(&mut self, max_size: usize) {
        if let Some(cache) = self.cache.as_mut() {
            cache.age(max_size);
        }
    }

    fn lookahead_samples(&self) -> u64 {
        self.derivation_resolution()
            .map_or(0, |resolution| resolution.bins() as u64)
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn on_set_provider(&mut self) {
        self.recreate_cache();
        self.update_axis();
    }
}

fn clamp_setting(value: u32, range: &std::ops::RangeInclusive<u32>, name: &str) -> u32 {
    let clamped = value.clamp(*range.start(), *range.end());
    if clamped != value {
        warn!(value, clamped, "Clamping spectrum derivation {name}");
    }
    clamped
}

fn clamp_reference_position(position: f32) -> f32 {
    let clamped = if position.is_nan() {
        REFERENCE_POSITION_MIN
    } else {
        position.clamp(REFERENCE_POSITION_MIN, REFERENCE_POSITION_MAX)
    };
    if clamped != position {
        warn!(position, clamped, "Clamping reference frequency position");
    }
    clamped
}
