use crate::config::WindowKind;
use crate::error::{ChirpError, Result};
use realfft::num_complex::Complex;
use realfft::{RealFftPlanner, RealToComplex};
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

thread_local! {
    static FFT_PLANNER: RefCell<RealFftPlanner<f64>> = RefCell::new(RealFftPlanner::new());
    static HANN_CACHE: RefCell<HashMap<usize, Vec<f64>>> = RefCell::new(HashMap::new());
}

fn hann_window(size: usize) -> Vec<f64> {
    HANN_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .entry(size)
            .or_insert_with(|| {
                if size < 2 {
                    return vec![1.0; size];
                }
                (0..size)
                    .map(|i| {
                        0.5 * (1.0
                            - (2.0 * std::f64::consts::PI * i as f64 / (size - 1) as f64).cos())
                    })
                    .collect()
            })
            .clone()
    })
}

/// Smallest power of two `>= n` (1 for n = 0), or `None` past `usize`.
pub fn next_pow2(n: usize) -> Option<usize> {
    n.max(1).checked_next_power_of_two()
}

/// Working buffers for magnitude spectra of equal-length, zero-padded segments.
///
/// Owned by a single render call and dropped with it.
pub struct SegmentSpectrum {
    fft: Arc<dyn RealToComplex<f64>>,
    fft_size: usize,
    segment_len: usize,
    window: Option<Vec<f64>>,
    input: Vec<f64>,
    spectrum: Vec<Complex<f64>>,
    scratch: Vec<Complex<f64>>,
}

impl SegmentSpectrum {
    /// `fft_size` must be a power of two of at least 2 and no smaller than `segment_len`.
    pub fn new(fft_size: usize, segment_len: usize, window: WindowKind) -> Result<Self> {
        if fft_size < 2 || !fft_size.is_power_of_two() {
            return Err(ChirpError::DegenerateSignal(format!(
                "DFT size must be a power of two >= 2, got {fft_size}"
            )));
        }
        if segment_len == 0 || segment_len > fft_size {
            return Err(ChirpError::DegenerateSignal(format!(
                "segment length {segment_len} does not fit DFT size {fft_size}"
            )));
        }

        let fft = FFT_PLANNER.with(|p| p.borrow_mut().plan_fft_forward(fft_size));
        let window = match window {
            WindowKind::Rectangular => None,
            WindowKind::Hann => Some(hann_window(segment_len)),
        };
        let input = fft.make_input_vec();
        let spectrum = fft.make_output_vec();
        let scratch = fft.make_scratch_vec();

        Ok(Self {
            fft,
            fft_size,
            segment_len,
            window,
            input,
            spectrum,
            scratch,
        })
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Number of magnitudes produced per segment (the bins below Nyquist).
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    /// Magnitudes of bins `0..fft_size/2` for one segment, written into `out`.
    ///
    /// Shorter segments are zero-padded; longer ones are rejected.
    pub fn magnitudes(&mut self, segment: &[f64], out: &mut Vec<f64>) -> Result<()> {
        if segment.len() > self.segment_len {
            return Err(ChirpError::DegenerateSignal(format!(
                "segment of {} samples exceeds the planned {}",
                segment.len(),
                self.segment_len
            )));
        }

        // process() clobbers its input, so refill every time.
        self.input.fill(0.0);
        match &self.window {
            Some(win) => {
                for (inp, (&s, &w)) in self.input.iter_mut().zip(segment.iter().zip(win.iter())) {
                    *inp = s * w;
                }
            }
            None => self.input[..segment.len()].copy_from_slice(segment),
        }

        self.fft
            .process_with_scratch(&mut self.input, &mut self.spectrum, &mut self.scratch)?;

        out.clear();
        out.extend(self.spectrum[..self.fft_size / 2].iter().map(|c| c.norm()));
        Ok(())
    }
}
