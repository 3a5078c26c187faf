use serde::{Deserialize, Serialize};

use super::defaults;
use crate::render::AudioRenderingStyle;

/// Hue/saturation/lightness ramp of one rendering style, all in `[0, 1]`.
///
/// Palette index `t` gets `offset + t * scale` for each component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StyleColorSettings {
    pub hue_offset: f32,
    pub hue_scale: f32,
    pub saturation_offset: f32,
    pub saturation_scale: f32,
    pub lightness_offset: f32,
    pub lightness_scale: f32,
}

impl StyleColorSettings {
    /// Build from `[offset, scale]` pairs.
    pub fn new(hue: [f32; 2], saturation: [f32; 2], lightness: [f32; 2]) -> Self {
        Self {
            hue_offset: hue[0],
            hue_scale: hue[1],
            saturation_offset: saturation[0],
            saturation_scale: saturation[1],
            lightness_offset: lightness[0],
            lightness_scale: lightness[1],
        }
    }
}

/// Per-style palettes for one strip strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorSchemeSettings {
    pub normal: StyleColorSettings,
    pub inactive: StyleColorSettings,
    pub active: StyleColorSettings,
    pub selected: StyleColorSettings,
}

impl ColorSchemeSettings {
    /// Dark-to-bright blue/red ramp used by the spectrum display.
    pub fn spectrum_default() -> Self {
        Self {
            normal: defaults::spectrum_normal(),
            inactive: defaults::spectrum_inactive(),
            active: defaults::spectrum_active(),
            selected: defaults::spectrum_selected(),
        }
    }

    /// Constant-hue ramps used by the waveform display.
    pub fn waveform_default() -> Self {
        Self {
            normal: defaults::waveform_normal(),
            inactive: defaults::waveform_inactive(),
            active: defaults::waveform_active(),
            selected: defaults::waveform_selected(),
        }
    }

    pub fn for_style(&self, style: AudioRenderingStyle) -> &StyleColorSettings {
        match style {
            AudioRenderingStyle::Normal => &self.normal,
            AudioRenderingStyle::Inactive => &self.inactive,
            AudioRenderingStyle::Active => &self.active,
            AudioRenderingStyle::Selected => &self.selected,
        }
    }
}
