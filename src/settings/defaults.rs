use super::colors::StyleColorSettings;
use super::spectrum::DftBackendKind;

/// Default total cache budget in bytes.
pub const DEFAULT_CACHE_MAX_SIZE: usize = 128 * 1024 * 1024;

pub(super) fn default_cache_max_size() -> usize {
    DEFAULT_CACHE_MAX_SIZE
}

pub(super) fn default_derivation_size() -> u32 {
    8
}

pub(super) fn default_derivation_distance() -> u32 {
    8
}

pub(super) fn default_max_frequency() -> f32 {
    20_000.0
}

pub(super) fn default_reference_frequency_position() -> f32 {
    0.25
}

pub(super) fn default_dft_backend() -> DftBackendKind {
    DftBackendKind::RustFft
}

pub(super) fn spectrum_normal() -> StyleColorSettings {
    StyleColorSettings::new([0.667, -0.667], [0.7, 0.3], [0.0, 0.9])
}

pub(super) fn spectrum_inactive() -> StyleColorSettings {
    StyleColorSettings::new([0.667, -0.667], [0.3, 0.2], [0.0, 0.6])
}

pub(super) fn spectrum_active() -> StyleColorSettings {
    StyleColorSettings::new([0.583, -0.583], [0.8, 0.2], [0.05, 0.9])
}

pub(super) fn spectrum_selected() -> StyleColorSettings {
    StyleColorSettings::new([0.75, -0.75], [0.7, 0.3], [0.1, 0.85])
}

pub(super) fn waveform_normal() -> StyleColorSettings {
    StyleColorSettings::new([0.33, 0.0], [0.6, 0.2], [0.05, 0.75])
}

pub(super) fn waveform_inactive() -> StyleColorSettings {
    StyleColorSettings::new([0.33, 0.0], [0.2, 0.1], [0.05, 0.5])
}

pub(super) fn waveform_active() -> StyleColorSettings {
    StyleColorSettings::new([0.5, 0.0], [0.6, 0.3], [0.08, 0.8])
}

pub(super) fn waveform_selected() -> StyleColorSettings {
    StyleColorSettings::new([0.6, 0.0], [0.5, 0.3], [0.15, 0.75])
}
