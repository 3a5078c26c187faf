use serde::{Deserialize, Serialize};

use super::defaults::{
    default_derivation_distance, default_derivation_size, default_dft_backend,
    default_max_frequency, default_reference_frequency_position,
};

/// Forward transform implementation used for spectrum derivation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DftBackendKind {
    /// Planned transforms from `rustfft`.
    #[default]
    RustFft,
    /// In-crate iterative radix-2 transform.
    Radix2,
}

/// Resolution and frequency axis of the spectrum display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectrumSettings {
    /// Log2 of the number of frequency bins per derived block.
    #[serde(default = "default_derivation_size")]
    pub derivation_size: u32,
    /// Log2 of the sample hop between derived blocks.
    #[serde(default = "default_derivation_distance")]
    pub derivation_distance: u32,
    /// Highest displayed frequency in Hz.
    #[serde(default = "default_max_frequency")]
    pub max_frequency: f32,
    /// Vertical position of 1 kHz, as a fraction of the strip height from the bottom.
    #[serde(default = "default_reference_frequency_position")]
    pub reference_frequency_position: f32,
    #[serde(default = "default_dft_backend")]
    pub dft_backend: DftBackendKind,
}

impl Default for SpectrumSettings {
    fn default() -> Self {
        Self {
            derivation_size: default_derivation_size(),
            derivation_distance: default_derivation_distance(),
            max_frequency: default_max_frequency(),
            reference_frequency_position: default_reference_frequency_position(),
            dft_backend: default_dft_backend(),
        }
    }
}
