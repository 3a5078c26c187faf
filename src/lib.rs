//! Block-cached audio strip rendering for scrolling waveform and spectrum displays.
//!
//! [`render::AudioRenderer`] composes fixed-width bitmap strips onto a [`render::DrawSurface`].
//! Strips come from a [`render::BitmapProvider`] strategy: [`waveform::WaveformRenderer`] or
//! [`spectrum::SpectrumRenderer`]. Both renderer and spectrum strategy keep their products in a
//! size-bounded [`cache::DataBlockCache`].

/// Audio sample sources.
pub mod audio;
/// Macroblock-grouped LRU block cache.
pub mod cache;
/// Tracing subscriber setup.
pub mod logging;
/// Strip composition, palettes and drawing surfaces.
pub mod render;
/// Plain render settings and TOML loading.
pub mod settings;
/// Spectrogram strategy and spectrum derivation.
pub mod spectrum;
/// Waveform strategy.
pub mod waveform;
