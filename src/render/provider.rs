use std::any::Any;

use egui::ColorImage;

use super::style::AudioRenderingStyle;
use super::surface::{DrawSurface, PixelRect};
use crate::audio::{SharedAudioProvider, same_provider};

/// Audio source, zoom and amplitude shared by every bitmap provider.
#[derive(Clone)]
pub struct ProviderState {
    provider: Option<SharedAudioProvider>,
    pixel_ms: f64,
    amplitude_scale: f32,
}

impl Default for ProviderState {
    fn default() -> Self {
        Self {
            provider: None,
            pixel_ms: 1.0,
            amplitude_scale: 1.0,
        }
    }
}

impl ProviderState {
    pub fn provider(&self) -> Option<&SharedAudioProvider> {
        self.provider.as_ref()
    }

    /// Horizontal zoom in milliseconds per pixel.
    pub fn milliseconds_per_pixel(&self) -> f64 {
        self.pixel_ms
    }

    pub fn amplitude_scale(&self) -> f32 {
        self.amplitude_scale
    }

    /// Number of audio samples covered by one pixel column.
    pub fn samples_per_pixel(&self) -> f64 {
        self.provider
            .as_ref()
            .map(|provider| self.pixel_ms * provider.sample_rate() as f64 / 1000.0)
            .unwrap_or(0.0)
    }
}

/// Strategy that paints audio into fixed-size bitmap strips.
///
/// The owning [`AudioRenderer`](super::AudioRenderer) forwards provider, zoom and amplitude
/// changes through the provided setters, which update [`ProviderState`]. Strategies read zoom
/// and amplitude from that state while painting; a provider change also calls
/// [`on_set_provider`](Self::on_set_provider) so derived data can be rebuilt.
pub trait BitmapProvider: Any {
    fn state(&self) -> &ProviderState;

    fn state_mut(&mut self) -> &mut ProviderState;

    /// Paint the strip whose first column is absolute pixel column `start`.
    fn render(&mut self, bitmap: &mut ColorImage, start: usize, style: AudioRenderingStyle);

    /// Paint `rect` as if it contained no audio.
    fn render_blank(
        &mut self,
        surface: &mut dyn DrawSurface,
        rect: PixelRect,
        style: AudioRenderingStyle,
    );

    /// Trim any internal cache down to `max_size` bytes.
    fn age_cache(&mut self, _max_size: usize) {}

    /// Samples past the end of a column that still influence how it is painted.
    ///
    /// A strip is only cached once this much audio beyond its last column is decoded.
    fn lookahead_samples(&self) -> u64 {
        0
    }

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn on_set_provider(&mut self) {}

    fn set_provider(&mut self, provider: Option<SharedAudioProvider>) {
        if same_provider(self.state().provider.as_ref(), provider.as_ref()) {
            return;
        }
        self.state_mut().provider = provider;
        self.on_set_provider();
    }

    fn set_milliseconds_per_pixel(&mut self, pixel_ms: f64) {
        if self.state().pixel_ms == pixel_ms {
            return;
        }
        self.state_mut().pixel_ms = pixel_ms;
    }

    fn set_amplitude_scale(&mut self, amplitude_scale: f32) {
        if self.state().amplitude_scale == amplitude_scale {
            return;
        }
        self.state_mut().amplitude_scale = amplitude_scale;
    }
}
