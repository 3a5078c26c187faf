use egui::Color32;

use crate::settings::StyleColorSettings;

/// Precomputed palette mapping a normalized value to an RGB color.
///
/// The table holds `2^precision + 1` RGB triples obtained by interpolating the configured
/// hue/saturation/lightness offsets and scales across `[0, 1]`.
#[derive(Clone, Debug)]
pub struct ColorScheme {
    palette: Vec<u8>,
    factor: usize,
}

impl ColorScheme {
    /// Build the palette for one rendering style.
    pub fn new(precision: u32, settings: &StyleColorSettings) -> Self {
        let factor = 1usize << precision;
        let mut palette = Vec::with_capacity(3 * factor + 3);
        for i in 0..=factor {
            let t = i as f32 / factor as f32;
            let hue = settings.hue_offset + t * settings.hue_scale;
            let saturation = settings.saturation_offset + t * settings.saturation_scale;
            let lightness = settings.lightness_offset + t * settings.lightness_scale;
            palette.extend_from_slice(&hsl_to_rgb(hue, saturation, lightness));
        }
        Self { palette, factor }
    }

    /// Write the color for `value` into `pixel`.
    pub fn map(&self, value: f32, pixel: &mut Color32) {
        *pixel = self.get(value);
    }

    /// Color for `value`, clamped into `[0, 1]`.
    pub fn get(&self, value: f32) -> Color32 {
        let offset = self.entry(value) * 3;
        let rgb = &self.palette[offset..offset + 3];
        Color32::from_rgb(rgb[0], rgb[1], rgb[2])
    }

    fn entry(&self, value: f32) -> usize {
        let value = if value.is_nan() {
            0.0
        } else {
            value.clamp(0.0, 1.0)
        };
        ((value * self.factor as f32) as usize).min(self.factor)
    }
}

/// Convert HSL components in `[0, 1]` to 8-bit RGB.
pub(crate) fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> [u8; 3] {
    let h = hue.clamp(0.0, 1.0);
    let s = saturation.clamp(0.0, 1.0);
    let l = lightness.clamp(0.0, 1.0);
    if s <= 0.0 {
        let grey = to_byte(l);
        return [grey, grey, grey];
    }
    let q = if l < 0.5 {
        l * (1.0 + s)
    } else {
        l + s - l * s
    };
    let p = 2.0 * l - q;
    [
        to_byte(hue_channel(p, q, h + 1.0 / 3.0)),
        to_byte(hue_channel(p, q, h)),
        to_byte(hue_channel(p, q, h - 1.0 / 3.0)),
    ]
}

fn hue_channel(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

fn to_byte(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(lightness_offset: f32, lightness_scale: f32) -> StyleColorSettings {
        StyleColorSettings {
            hue_offset: 0.667,
            hue_scale: -0.667,
            saturation_offset: 1.0,
            saturation_scale: 0.0,
            lightness_offset,
            lightness_scale,
        }
    }

    #[test]
    fn palette_has_expected_length() {
        let scheme = ColorScheme::new(4, &settings(0.0, 1.0));
        assert_eq!(scheme.palette.len(), 3 * 16 + 3);
    }

    #[test]
    fn zero_maps_to_black_in_both_accessors() {
        let scheme = ColorScheme::new(6, &settings(0.0, 1.0));
        let mut pixel = Color32::WHITE;
        scheme.map(0.0, &mut pixel);
        assert_eq!(pixel, Color32::from_rgb(0, 0, 0));
        assert_eq!(scheme.get(0.0), pixel);
    }

    #[test]
    fn values_outside_unit_range_clamp() {
        let scheme = ColorScheme::new(6, &settings(0.0, 1.0));
        assert_eq!(scheme.get(-3.0), scheme.get(0.0));
        assert_eq!(scheme.get(7.5), scheme.get(1.0));
        assert_eq!(scheme.get(f32::NAN), scheme.get(0.0));
        assert_eq!(scheme.get(1.0), Color32::WHITE);
    }

    #[test]
    fn hsl_primaries_convert() {
        assert_eq!(hsl_to_rgb(0.0, 1.0, 0.5), [255, 0, 0]);
        assert_eq!(hsl_to_rgb(1.0 / 3.0, 1.0, 0.5), [0, 255, 0]);
        assert_eq!(hsl_to_rgb(2.0 / 3.0, 1.0, 0.5), [0, 0, 255]);
        assert_eq!(hsl_to_rgb(0.2, 0.0, 0.5), [128, 128, 128]);
    }
}
