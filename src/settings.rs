//! Render settings as plain values, loadable from TOML.
//!
//! Settings are read once and handed to the renderers; nothing here is live global state.

mod colors;
mod defaults;
mod errors;
mod spectrum;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use colors::{ColorSchemeSettings, StyleColorSettings};
pub use defaults::DEFAULT_CACHE_MAX_SIZE;
pub use errors::ConfigError;
pub use spectrum::{DftBackendKind, SpectrumSettings};

use defaults::default_cache_max_size;

/// Accepted range for [`SpectrumSettings::derivation_size`].
pub const DERIVATION_SIZE_RANGE: std::ops::RangeInclusive<u32> = 4..=16;
/// Accepted range for [`SpectrumSettings::derivation_distance`].
pub const DERIVATION_DISTANCE_RANGE: std::ops::RangeInclusive<u32> = 1..=16;

/// Everything the strip renderers read from configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSettings {
    /// Total cache byte budget shared by strip and spectrum caches.
    #[serde(default = "default_cache_max_size")]
    pub cache_max_size: usize,
    #[serde(default = "ColorSchemeSettings::spectrum_default")]
    pub spectrum_colors: ColorSchemeSettings,
    #[serde(default = "ColorSchemeSettings::waveform_default")]
    pub waveform_colors: ColorSchemeSettings,
    #[serde(default)]
    pub spectrum: SpectrumSettings,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            cache_max_size: default_cache_max_size(),
            spectrum_colors: ColorSchemeSettings::spectrum_default(),
            waveform_colors: ColorSchemeSettings::waveform_default(),
            spectrum: SpectrumSettings::default(),
        }
    }
}

impl RenderSettings {
    /// Reject values the renderers cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let spectrum = &self.spectrum;
        if !DERIVATION_SIZE_RANGE.contains(&spectrum.derivation_size) {
            return Err(invalid(
                "spectrum.derivation_size",
                format!(
                    "{} is outside {:?}",
                    spectrum.derivation_size, DERIVATION_SIZE_RANGE
                ),
            ));
        }
        if !DERIVATION_DISTANCE_RANGE.contains(&spectrum.derivation_distance) {
            return Err(invalid(
                "spectrum.derivation_distance",
                format!(
                    "{} is outside {:?}",
                    spectrum.derivation_distance, DERIVATION_DISTANCE_RANGE
                ),
            ));
        }
        if !(spectrum.max_frequency > 0.0) {
            return Err(invalid(
                "spectrum.max_frequency",
                format!("{} Hz is not positive", spectrum.max_frequency),
            ));
        }
        let position = spectrum.reference_frequency_position;
        if !(position > 0.0 && position < 1.0) {
            return Err(invalid(
                "spectrum.reference_frequency_position",
                format!("{position} is not strictly between 0 and 1"),
            ));
        }
        Ok(())
    }
}

/// Parse and validate settings from TOML text; missing keys take defaults.
pub fn from_toml_str(text: &str) -> Result<RenderSettings, ConfigError> {
    let settings: RenderSettings = toml::from_str(text)?;
    settings.validate()?;
    Ok(settings)
}

/// Load settings from a TOML file, returning defaults when it does not exist.
pub fn load_from_path(path: &Path) -> Result<RenderSettings, ConfigError> {
    if !path.exists() {
        return Ok(RenderSettings::default());
    }
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let settings: RenderSettings =
        toml::from_str(&text).map_err(|source| ConfigError::ParseTomlFile {
            path: path.to_path_buf(),
            source,
        })?;
    settings.validate()?;
    tracing::debug!("Loaded render settings from {}", path.display());
    Ok(settings)
}

/// Write settings as pretty TOML.
pub fn save_to_path(settings: &RenderSettings, path: &Path) -> Result<(), ConfigError> {
    let text = toml::to_string_pretty(settings)?;
    std::fs::write(path, text).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::InvalidValue { field, reason }
}
