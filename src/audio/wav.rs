use std::io::Cursor;
use std::path::{Path, PathBuf};

use hound::SampleFormat;
use thiserror::Error;
use tracing::debug;

use super::MemoryAudioProvider;

#[derive(Debug, Error)]
pub enum WavLoadError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid wav: {source}")]
    Invalid { source: hound::Error },
    #[error("Sample error: {source}")]
    Sample { source: hound::Error },
}

impl MemoryAudioProvider {
    /// Decode a wav file, mixing all channels down to mono.
    pub fn from_wav_path(path: &Path) -> Result<Self, WavLoadError> {
        let bytes = std::fs::read(path).map_err(|source| WavLoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_wav_bytes(&bytes)
    }

    /// Decode in-memory wav data, mixing all channels down to mono.
    pub fn from_wav_bytes(bytes: &[u8]) -> Result<Self, WavLoadError> {
        let mut reader = hound::WavReader::new(Cursor::new(bytes))
            .map_err(|source| WavLoadError::Invalid { source })?;
        let spec = reader.spec();
        let channels = spec.channels.max(1) as usize;
        let interleaved = match spec.sample_format {
            SampleFormat::Float => read_float_samples(&mut reader)?,
            SampleFormat::Int => read_int_samples(&mut reader, spec.bits_per_sample)?,
        };
        let mono = downmix(&interleaved, channels);
        debug!(
            frames = mono.len(),
            channels,
            sample_rate = spec.sample_rate,
            "Decoded wav audio"
        );
        Ok(Self::new(mono, spec.sample_rate))
    }
}

fn read_float_samples(
    reader: &mut hound::WavReader<Cursor<&[u8]>>,
) -> Result<Vec<f32>, WavLoadError> {
    reader
        .samples::<f32>()
        .map(|s| s.map_err(|source| WavLoadError::Sample { source }))
        .collect()
}

fn read_int_samples(
    reader: &mut hound::WavReader<Cursor<&[u8]>>,
    bits_per_sample: u16,
) -> Result<Vec<f32>, WavLoadError> {
    let scale = (1i64 << bits_per_sample.saturating_sub(1)).max(1) as f32;
    reader
        .samples::<i32>()
        .map(|s| {
            s.map(|v| v as f32 / scale)
                .map_err(|source| WavLoadError::Sample { source })
        })
        .collect()
}

fn downmix(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels == 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}
