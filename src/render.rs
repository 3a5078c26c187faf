//! Composition of cached bitmap strips onto a drawing surface.
//!
//! [`AudioRenderer`] keeps one [`DataBlockCache`] of fixed-width bitmap strips per rendering
//! style. Strips are produced on demand by the active [`BitmapProvider`] and blitted side by
//! side; anything past the decoded end of the audio is painted blank.

pub mod color_scheme;
pub mod provider;
pub mod style;
pub mod surface;

use egui::{Color32, ColorImage};
use tracing::{debug, warn};

pub use color_scheme::ColorScheme;
pub use provider::{BitmapProvider, ProviderState};
pub use style::AudioRenderingStyle;
pub use surface::{ClipGuard, DrawSurface, ImageSurface, PixelPos, PixelRect};

use crate::audio::{SharedAudioProvider, same_provider};
use crate::cache::{BlockFactory, DataBlockCache};
use crate::settings::DEFAULT_CACHE_MAX_SIZE;
use surface::blank_image;

/// Width in pixels of one cached bitmap strip.
pub const CACHE_BITMAP_WIDTH: usize = 32;

/// Hard cap on each style's bitmap cache, bounding native image resource usage.
pub const MAX_BITMAP_CACHE_SIZE: usize = 0x100_0000;

const BITMAP_MACROBLOCK_EXPONENT: u32 = 8;
const INITIAL_BITMAP_BLOCKS: usize = 256;

/// Produces blank strips of the current renderer height.
struct BitmapFactory {
    width: usize,
    height: usize,
}

impl BlockFactory for BitmapFactory {
    type Block = ColorImage;

    fn produce_block(&mut self, _index: usize) -> ColorImage {
        blank_image(self.width, self.height, Color32::BLACK)
    }

    fn block_size(&self) -> usize {
        self.width * self.height * 4
    }
}

/// Renders audio strips for a scrolling display.
pub struct AudioRenderer {
    pixel_ms: f64,
    pixel_height: usize,
    amplitude_scale: f32,
    bitmaps: Vec<DataBlockCache<BitmapFactory>>,
    cache_bitmap_maxsize: usize,
    cache_renderer_maxsize: usize,
    renderer: Option<Box<dyn BitmapProvider>>,
    provider: Option<SharedAudioProvider>,
}

impl Default for AudioRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioRenderer {
    /// Create a renderer with no strategy or audio attached and the default cache budget.
    pub fn new() -> Self {
        let bitmaps = AudioRenderingStyle::ALL
            .iter()
            .map(|_| {
                DataBlockCache::new(
                    INITIAL_BITMAP_BLOCKS,
                    BITMAP_MACROBLOCK_EXPONENT,
                    BitmapFactory {
                        width: CACHE_BITMAP_WIDTH,
                        height: 1,
                    },
                )
            })
            .collect();
        let mut renderer = Self {
            pixel_ms: 1.0,
            pixel_height: 1,
            amplitude_scale: 1.0,
            bitmaps,
            cache_bitmap_maxsize: 0,
            cache_renderer_maxsize: 0,
            renderer: None,
            provider: None,
        };
        renderer.set_cache_max_size(DEFAULT_CACHE_MAX_SIZE);
        renderer
    }

    pub fn milliseconds_per_pixel(&self) -> f64 {
        self.pixel_ms
    }

    pub fn height(&self) -> usize {
        self.pixel_height
    }

    pub fn amplitude_scale(&self) -> f32 {
        self.amplitude_scale
    }

    /// Byte budget of each per-style bitmap cache.
    pub fn bitmap_cache_budget(&self) -> usize {
        self.cache_bitmap_maxsize
    }

    /// Byte budget handed to the strategy's own cache.
    pub fn renderer_cache_budget(&self) -> usize {
        self.cache_renderer_maxsize
    }

    /// Number of strips addressable for the current audio and zoom.
    pub fn block_count(&self) -> usize {
        self.bitmaps[0].block_count()
    }

    /// Accounted bytes held by the bitmap cache of `style`.
    pub fn bitmap_cache_size(&self, style: AudioRenderingStyle) -> usize {
        self.bitmaps[style.index()].size()
    }

    /// Set horizontal zoom, resizing the strip caches.
    pub fn set_milliseconds_per_pixel(&mut self, pixel_ms: f64) {
        if self.pixel_ms == pixel_ms {
            return;
        }
        if !(pixel_ms > 0.0) {
            warn!(pixel_ms, "Ignoring non-positive zoom");
            return;
        }
        self.pixel_ms = pixel_ms;
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.set_milliseconds_per_pixel(pixel_ms);
        }
        self.reset_block_count();
    }

    /// Set strip height in pixels; previously rendered strips are discarded.
    pub fn set_height(&mut self, pixel_height: usize) {
        let pixel_height = pixel_height.max(1);
        if self.pixel_height == pixel_height {
            return;
        }
        self.pixel_height = pixel_height;
        for cache in &mut self.bitmaps {
            cache.age(0);
            cache.factory_mut().height = pixel_height;
        }
    }

    /// Set vertical amplitude scale; previously rendered strips are discarded.
    pub fn set_amplitude_scale(&mut self, amplitude_scale: f32) {
        if self.amplitude_scale == amplitude_scale {
            return;
        }
        if !(amplitude_scale > 0.0) {
            warn!(amplitude_scale, "Ignoring non-positive amplitude scale");
            return;
        }
        self.amplitude_scale = amplitude_scale;
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.set_amplitude_scale(amplitude_scale);
        }
        self.invalidate();
    }

    /// Swap the strip strategy, returning the previous one.
    pub fn set_renderer(
        &mut self,
        renderer: Option<Box<dyn BitmapProvider>>,
    ) -> Option<Box<dyn BitmapProvider>> {
        let previous = std::mem::replace(&mut self.renderer, renderer);
        self.invalidate();
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.set_provider(self.provider.clone());
            renderer.set_amplitude_scale(self.amplitude_scale);
            renderer.set_milliseconds_per_pixel(self.pixel_ms);
        }
        self.reset_block_count();
        previous
    }

    /// Swap the audio source.
    pub fn set_audio_provider(&mut self, provider: Option<SharedAudioProvider>) {
        if same_provider(self.provider.as_ref(), provider.as_ref()) {
            return;
        }
        self.provider = provider;
        self.invalidate();
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.set_provider(self.provider.clone());
        }
        self.reset_block_count();
    }

    /// Split a total byte budget between the strip caches and the strategy cache.
    pub fn set_cache_max_size(&mut self, max_size: usize) {
        self.cache_bitmap_maxsize = (max_size / 8).min(MAX_BITMAP_CACHE_SIZE);
        self.cache_renderer_maxsize =
            max_size.saturating_sub(self.cache_bitmap_maxsize * AudioRenderingStyle::COUNT);
        debug!(
            bitmap = self.cache_bitmap_maxsize,
            renderer = self.cache_renderer_maxsize,
            "Cache budgets updated"
        );
    }

    /// Run `f` against the active strategy when it is a `T`, then discard rendered strips.
    pub fn with_bitmap_provider<T: BitmapProvider, R>(
        &mut self,
        f: impl FnOnce(&mut T) -> R,
    ) -> Option<R> {
        let renderer = self.renderer.as_mut()?;
        let result = renderer.as_any_mut().downcast_mut::<T>().map(f)?;
        self.invalidate();
        Some(result)
    }

    /// Drop every rendered strip; the strategy's own cache is left alone.
    pub fn invalidate(&mut self) {
        for cache in &mut self.bitmaps {
            cache.age(0);
        }
    }

    /// Paint `length` pixel columns starting at absolute column `start` at `origin`.
    pub fn render(
        &mut self,
        surface: &mut dyn DrawSurface,
        origin: PixelPos,
        start: usize,
        length: i32,
        style: AudioRenderingStyle,
    ) {
        let Some(provider) = self.provider.clone() else {
            return;
        };
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };
        if length <= 0 {
            return;
        }

        let width = CACHE_BITMAP_WIDTH;
        let end = start + length as usize;
        let last_x = origin.x + length;
        let first_bitmap = start / width;
        let first_offset = (start % width) as i32;
        let decoded = provider.decoded_samples();
        let decoded_blocks = num_blocks(decoded, provider.sample_rate(), self.pixel_ms);
        let last_bitmap = decoded_blocks
            .checked_sub(1)
            .map(|last_decoded| (end / width).min(last_decoded));
        // Strips whose source audio may still change are drawn but never cached.
        let settled_blocks = if decoded >= provider.num_samples() {
            usize::MAX
        } else {
            num_complete_blocks(
                decoded.saturating_sub(renderer.lookahead_samples()),
                provider.sample_rate(),
                self.pixel_ms,
            )
        };

        let height = self.pixel_height as i32;
        let clip = PixelRect::new(origin.x, origin.y, length, height);
        let mut surface = ClipGuard::new(surface, clip);
        let cache = &mut self.bitmaps[style.index()];
        let mut x = origin.x - first_offset;
        let mut needs_age = false;

        if let Some(last_bitmap) = last_bitmap {
            for index in first_bitmap..=last_bitmap {
                if index >= settled_blocks {
                    let mut bitmap = blank_image(width, self.pixel_height, Color32::BLACK);
                    renderer.render(&mut bitmap, index * width, style);
                    surface.draw_bitmap(&bitmap, x, origin.y);
                } else {
                    let (bitmap, created) = cache.get(index);
                    if created {
                        renderer.render(bitmap, index * width, style);
                        needs_age = true;
                    }
                    surface.draw_bitmap(bitmap, x, origin.y);
                }
                x += width as i32;
            }
        }

        if x < last_x {
            renderer.render_blank(
                &mut surface,
                PixelRect::new(x - 1, origin.y, last_x - x + 1, height),
                style,
            );
        }

        if needs_age {
            cache.age(self.cache_bitmap_maxsize);
            renderer.age_cache(self.cache_renderer_maxsize);
        }
    }

    fn reset_block_count(&mut self) {
        let Some(provider) = self.provider.as_ref() else {
            return;
        };
        let total = num_blocks(provider.num_samples(), provider.sample_rate(), self.pixel_ms);
        for cache in &mut self.bitmaps {
            cache.set_block_count(total);
        }
    }
}

/// Strips needed to cover `samples` at the given zoom, counting a trailing partial strip.
fn num_blocks(samples: u64, sample_rate: u32, pixel_ms: f64) -> usize {
    strip_span(samples, sample_rate, pixel_ms).ceil() as usize
}

/// Strips lying entirely within the first `samples` samples.
fn num_complete_blocks(samples: u64, sample_rate: u32, pixel_ms: f64) -> usize {
    strip_span(samples, sample_rate, pixel_ms).floor() as usize
}

fn strip_span(samples: u64, sample_rate: u32, pixel_ms: f64) -> f64 {
    if sample_rate == 0 || !(pixel_ms > 0.0) {
        return 0.0;
    }
    let duration_ms = samples as f64 * 1000.0 / sample_rate as f64;
    duration_ms / pixel_ms / CACHE_BITMAP_WIDTH as f64
}
