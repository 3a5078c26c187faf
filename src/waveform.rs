//! Peak/average waveform strip strategy.

use std::any::Any;

use egui::{Color32, ColorImage};

use crate::render::{
    AudioRenderingStyle, BitmapProvider, ColorScheme, DrawSurface, PixelRect, ProviderState,
};
use crate::settings::ColorSchemeSettings;

/// Palette precision of waveform color schemes.
pub const WAVEFORM_COLOR_PRECISION: u32 = 6;

const BACKGROUND: f32 = 0.0;
const PEAK: f32 = 0.4;
const AVERAGE: f32 = 0.7;
const ZERO_LINE: f32 = 1.0;

/// Sample statistics for one pixel column.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct ColumnLevels {
    min: f32,
    max: f32,
    avg_min: f32,
    avg_max: f32,
}

impl ColumnLevels {
    fn from_samples(samples: &[f32]) -> Self {
        let mut levels = Self::default();
        let (mut neg_sum, mut neg_count) = (0.0_f32, 0usize);
        let (mut pos_sum, mut pos_count) = (0.0_f32, 0usize);
        for &sample in samples {
            levels.min = levels.min.min(sample);
            levels.max = levels.max.max(sample);
            if sample < 0.0 {
                neg_sum += sample;
                neg_count += 1;
            } else if sample > 0.0 {
                pos_sum += sample;
                pos_count += 1;
            }
        }
        if neg_count > 0 {
            levels.avg_min = neg_sum / neg_count as f32;
        }
        if pos_count > 0 {
            levels.avg_max = pos_sum / pos_count as f32;
        }
        levels
    }
}

/// Waveform implementation of [`BitmapProvider`].
///
/// Each column shows the sample peaks and the mean of positive and negative samples around a
/// centre zero line. Nothing is derived ahead of time, so there is no cache to age.
pub struct WaveformRenderer {
    state: ProviderState,
    colors: Vec<ColorScheme>,
    samples: Vec<f32>,
}

impl WaveformRenderer {
    pub fn new(colors: &ColorSchemeSettings) -> Self {
        Self {
            state: ProviderState::default(),
            colors: AudioRenderingStyle::ALL
                .iter()
                .map(|&style| ColorScheme::new(WAVEFORM_COLOR_PRECISION, colors.for_style(style)))
                .collect(),
            samples: Vec::new(),
        }
    }

    fn column_levels(&mut self, column: usize) -> ColumnLevels {
        let Some(provider) = self.state.provider() else {
            return ColumnLevels::default();
        };
        let samples_per_pixel = self.state.samples_per_pixel();
        let first = (column as f64 * samples_per_pixel) as i64;
        let last = ((column + 1) as f64 * samples_per_pixel) as i64;
        let count = (last - first).max(1) as usize;
        self.samples.resize(count, 0.0);
        provider.get_audio(&mut self.samples, first);
        ColumnLevels::from_samples(&self.samples)
    }
}

impl BitmapProvider for WaveformRenderer {
    fn state(&self) -> &ProviderState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ProviderState {
        &mut self.state
    }

    fn render(&mut self, bitmap: &mut ColorImage, start: usize, style: AudioRenderingStyle) {
        let [width, height] = bitmap.size;
        let scheme = style.index();
        bitmap.pixels.fill(self.colors[scheme].get(BACKGROUND));
        if width == 0 || height == 0 {
            return;
        }
        let peak = self.colors[scheme].get(PEAK);
        let average = self.colors[scheme].get(AVERAGE);
        let zero = self.colors[scheme].get(ZERO_LINE);

        let mid = height / 2;
        let half = height as f32 / 2.0;
        let amplitude = self.state.amplitude_scale();
        let to_y = |value: f32| -> usize {
            (mid as f32 - value * amplitude * half)
                .round()
                .clamp(0.0, (height - 1) as f32) as usize
        };

        if self.state.provider().is_some() {
            for x in 0..width {
                let levels = self.column_levels(start + x);
                vertical_line(bitmap, x, to_y(levels.max), to_y(levels.min), peak);
                vertical_line(bitmap, x, to_y(levels.avg_max), to_y(levels.avg_min), average);
            }
        }
        bitmap.pixels[mid * width..(mid + 1) * width].fill(zero);
    }

    fn render_blank(
        &mut self,
        surface: &mut dyn DrawSurface,
        rect: PixelRect,
        style: AudioRenderingStyle,
    ) {
        let colors = &self.colors[style.index()];
        let mid = rect.y + rect.height / 2;
        let background = colors.get(BACKGROUND);
        surface.fill_rectangle(
            PixelRect::new(rect.x, rect.y, rect.width, mid - rect.y),
            background,
        );
        surface.fill_rectangle(
            PixelRect::new(rect.x, mid + 1, rect.width, rect.bottom() - mid - 1),
            background,
        );
        surface.fill_rectangle(
            PixelRect::new(rect.x, mid, rect.width, 1),
            colors.get(ZERO_LINE),
        );
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Draw column `x` between rows `top` and `bottom`, inclusive.
fn vertical_line(bitmap: &mut ColorImage, x: usize, top: usize, bottom: usize, color: Color32) {
    let width = bitmap.size[0];
    for y in top.min(bottom)..=top.max(bottom) {
        bitmap.pixels[y * width + x] = color;
    }
}
