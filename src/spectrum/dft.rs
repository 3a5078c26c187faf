//! Forward transforms of real-valued sample windows.

use std::f32::consts::PI;
use std::sync::Arc;

use rustfft::num_complex::Complex32;
use rustfft::{Fft, FftPlanner};
use thiserror::Error;

use crate::settings::DftBackendKind;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DftError {
    #[error("DFT length must be a non-zero power of two, got {len}")]
    NotPowerOfTwo { len: usize },
}

/// Forward DFT of a real input of fixed length.
pub trait RealDft {
    /// Number of real input samples.
    fn len(&self) -> usize;

    /// Transform `input` (exactly `len()` samples) into `output`.
    ///
    /// Only the non-redundant half of the spectrum is written: bins `0..=len()/2`.
    fn forward(&mut self, input: &[f32], output: &mut [Complex32]);
}

/// Plan a forward transform of `len` samples using `backend`.
pub fn plan_dft(backend: DftBackendKind, len: usize) -> Result<Box<dyn RealDft>, DftError> {
    if len == 0 || !len.is_power_of_two() {
        return Err(DftError::NotPowerOfTwo { len });
    }
    Ok(match backend {
        DftBackendKind::RustFft => Box::new(RustFftDft::new(len)),
        DftBackendKind::Radix2 => Box::new(Radix2Dft::new(len)),
    })
}

/// Symmetric Hann window of `length` coefficients.
pub fn hann_window(length: usize) -> Vec<f32> {
    if length <= 1 {
        return vec![1.0_f32; length.max(1)];
    }
    let denom = (length - 1) as f32;
    (0..length)
        .map(|n| 0.5_f32 * (1.0 - (2.0 * PI * n as f32 / denom).cos()))
        .collect()
}

/// Planned transform backed by `rustfft`.
pub struct RustFftDft {
    fft: Arc<dyn Fft<f32>>,
    buffer: Vec<Complex32>,
    scratch: Vec<Complex32>,
}

impl RustFftDft {
    pub fn new(len: usize) -> Self {
        let fft = FftPlanner::<f32>::new().plan_fft_forward(len);
        let scratch = vec![Complex32::default(); fft.get_inplace_scratch_len()];
        Self {
            fft,
            buffer: vec![Complex32::default(); len],
            scratch,
        }
    }
}

impl RealDft for RustFftDft {
    fn len(&self) -> usize {
        self.buffer.len()
    }

    fn forward(&mut self, input: &[f32], output: &mut [Complex32]) {
        load_real(&mut self.buffer, input);
        self.fft.process_with_scratch(&mut self.buffer, &mut self.scratch);
        store_half(&self.buffer, output);
    }
}

/// Iterative radix-2 transform with precomputed bit-reversal swaps and twiddles.
pub struct Radix2Dft {
    bit_swaps: Vec<(usize, usize)>,
    twiddles: Vec<Vec<Complex32>>,
    buffer: Vec<Complex32>,
}

impl Radix2Dft {
    /// `len` must be a power of two; use [`plan_dft`] for checked construction.
    pub fn new(len: usize) -> Self {
        Self {
            bit_swaps: build_bit_swaps(len),
            twiddles: build_twiddle_tables(len),
            buffer: vec![Complex32::default(); len],
        }
    }
}

impl RealDft for Radix2Dft {
    fn len(&self) -> usize {
        self.buffer.len()
    }

    fn forward(&mut self, input: &[f32], output: &mut [Complex32]) {
        load_real(&mut self.buffer, input);
        for &(i, j) in &self.bit_swaps {
            self.buffer.swap(i, j);
        }
        for stage in &self.twiddles {
            apply_stage(&mut self.buffer, stage);
        }
        store_half(&self.buffer, output);
    }
}

fn load_real(buffer: &mut [Complex32], input: &[f32]) {
    debug_assert_eq!(buffer.len(), input.len());
    for (cell, &sample) in buffer.iter_mut().zip(input) {
        *cell = Complex32::new(sample, 0.0);
    }
}

fn store_half(buffer: &[Complex32], output: &mut [Complex32]) {
    let half = buffer.len() / 2 + 1;
    debug_assert!(output.len() >= half);
    for (out, bin) in output.iter_mut().zip(&buffer[..half]) {
        *out = *bin;
    }
}

fn build_bit_swaps(len: usize) -> Vec<(usize, usize)> {
    let mut swaps = Vec::new();
    let mut j = 0usize;
    for i in 1..len {
        let mut bit = len >> 1;
        while j & bit != 0 {
            j ^= bit;
            bit >>= 1;
        }
        j ^= bit;
        if i < j {
            swaps.push((i, j));
        }
    }
    swaps
}

fn build_twiddle_tables(len: usize) -> Vec<Vec<Complex32>> {
    let mut tables = Vec::new();
    let mut step = 2usize;
    while step <= len {
        let half = step / 2;
        let angle = -2.0_f32 * PI / step as f32;
        let stage = (0..half)
            .map(|i| {
                let (sin, cos) = (angle * i as f32).sin_cos();
                Complex32::new(cos, sin)
            })
            .collect();
        tables.push(stage);
        step *= 2;
    }
    tables
}

fn apply_stage(buffer: &mut [Complex32], twiddles: &[Complex32]) {
    let half = twiddles.len();
    for chunk in buffer.chunks_exact_mut(half * 2) {
        let (low, high) = chunk.split_at_mut(half);
        for ((u, v), w) in low.iter_mut().zip(high.iter_mut()).zip(twiddles) {
            let t = *v * w;
            *v = *u - t;
            *u += t;
        }
    }
}
