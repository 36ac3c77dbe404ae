//! Linear-to-logarithmic frequency rebinning.
//!
//! Starting at `start_idx`, step `e` (for `e = 0..=last_exp`) takes a run of
//! `2^e · zero_padding` consecutive linear bins, collapses it to one value and
//! writes that value into `2^(last_exp − e)` output cells. Low frequencies get
//! many cells from few bins, high frequencies few cells from many bins, which
//! approximates a log axis. The column is cut at
//! `zero_padding · len_log_unpadded` cells; the cells past that point come from
//! runs that start above Nyquist.

use crate::config::BinReduce;
use crate::dsp::fft::next_pow2;
use crate::error::{ChirpError, Result};

/// Geometry of the log-frequency axis for one render.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LogAxis {
    /// Segment length in samples.
    pub piece_len: usize,
    /// DFT size before zero padding (next power of two of `piece_len`).
    pub fft_size_unpadded: usize,
    pub zero_padding: usize,
    /// Final DFT size.
    pub fft_size: usize,
    pub start_idx: usize,
    pub last_exp: u32,
    /// Column length before zero padding.
    pub len_log_unpadded: usize,
    /// Column length (image height).
    pub len_log: usize,
}

impl LogAxis {
    /// Plan the axis for segments of `piece_len` samples.
    pub fn plan(
        piece_len: usize,
        sample_rate: f64,
        low_freq_hz: f64,
        target_log_len: usize,
    ) -> Result<Self> {
        if piece_len == 0 {
            return Err(ChirpError::DegenerateSignal(
                "segment length rounds to zero".into(),
            ));
        }
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(ChirpError::InvalidInput(format!(
                "sample rate must be positive, got {sample_rate}"
            )));
        }

        let Some(fft_size_unpadded) = next_pow2(piece_len) else {
            return Err(ChirpError::InvalidInput(format!(
                "segment length {piece_len} has no power-of-two DFT size"
            )));
        };
        if fft_size_unpadded < 4 {
            return Err(ChirpError::DegenerateSignal(format!(
                "DFT size {fft_size_unpadded} is too small for a log axis"
            )));
        }
        let len_log_unpadded = column_len(last_exp_for(fft_size_unpadded));

        let zero_padding = zero_padding_for(target_log_len, len_log_unpadded)
            .and_then(|zp| fft_size_unpadded.checked_mul(zp).map(|fft| (zp, fft)));
        let Some((zero_padding, fft_size)) = zero_padding else {
            return Err(ChirpError::InvalidInput(format!(
                "target_log_len {target_log_len} needs a DFT larger than usize"
            )));
        };
        let last_exp = last_exp_for(fft_size);
        let start_idx = (low_freq_hz * fft_size as f64 / sample_rate).floor() as usize;

        if start_idx >= fft_size / 2 {
            log::warn!(
                "log axis starts at {low_freq_hz} Hz, above Nyquist for {sample_rate} Hz; columns will be empty"
            );
        }

        Ok(Self {
            piece_len,
            fft_size_unpadded,
            zero_padding,
            fft_size,
            start_idx,
            last_exp,
            len_log_unpadded,
            len_log: zero_padding * len_log_unpadded,
        })
    }

    /// Linear bin width in Hz.
    pub fn freq_resolution(&self, sample_rate: f64) -> f64 {
        sample_rate / self.fft_size as f64
    }

    /// Lower-edge frequency (Hz) of the linear run feeding output cell `cell`
    /// (cell 0 = lowest frequency). `None` past the end of the column.
    pub fn cell_frequency(&self, cell: usize, sample_rate: f64) -> Option<f64> {
        if cell >= self.len_log {
            return None;
        }
        let mut first_cell = 0usize;
        let mut bin = self.start_idx;
        for e in 0..=self.last_exp {
            let repeat = 1usize << (self.last_exp - e);
            if cell < first_cell + repeat {
                return Some(bin as f64 * self.freq_resolution(sample_rate));
            }
            first_cell += repeat;
            bin += (1usize << e) * self.zero_padding;
        }
        None
    }
}

/// `log2(fft_size / 2) − 1` for a power-of-two `fft_size >= 4`.
fn last_exp_for(fft_size: usize) -> u32 {
    fft_size.trailing_zeros() - 2
}

fn column_len(last_exp: u32) -> usize {
    (1usize << (last_exp + 1)) - 1
}

/// `max(1, 2^floor(log2(target / len_unpadded)))`, or `None` if it does not fit.
fn zero_padding_for(target_log_len: usize, len_log_unpadded: usize) -> Option<usize> {
    if len_log_unpadded == 0 || target_log_len <= len_log_unpadded {
        return Some(1);
    }
    let ratio = target_log_len as f64 / len_log_unpadded as f64;
    let exp = ratio.log2().floor();
    if exp < 1.0 {
        Some(1)
    } else {
        1usize.checked_shl(exp as u32)
    }
}

/// Rebin one linear magnitude spectrum onto a log axis of `len_log` cells.
///
/// Runs that cross `linear.len()` are truncated; runs starting past it yield 0.
/// The walk stops once `len_log` cells are written.
pub fn rebin_log(
    linear: &[f64],
    start_idx: usize,
    last_exp: u32,
    zero_padding: usize,
    len_log: usize,
    reduce: BinReduce,
) -> Vec<f64> {
    let len_log = len_log.min(column_len(last_exp));
    let mut column = Vec::with_capacity(len_log);
    let mut idx = start_idx.min(linear.len());

    for e in 0..=last_exp {
        if column.len() == len_log {
            break;
        }
        let run = (1usize << e).saturating_mul(zero_padding);
        let end = idx.saturating_add(run).min(linear.len());
        let value = reduce_run(&linear[idx..end], reduce);
        let repeat = (1usize << (last_exp - e)).min(len_log - column.len());
        column.extend(std::iter::repeat(value).take(repeat));
        idx = end;
    }

    column
}

fn reduce_run(run: &[f64], reduce: BinReduce) -> f64 {
    if run.is_empty() {
        return 0.0;
    }
    match reduce {
        BinReduce::Peak => run.iter().copied().fold(0.0f64, f64::max),
        BinReduce::Mean => run.iter().sum::<f64>() / run.len() as f64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64).collect()
    }

    #[test]
    fn test_runs_double_and_repeats_halve() {
        let col = rebin_log(&ramp(16), 1, 2, 1, 7, BinReduce::Peak);
        // e=0: bin [1] x4, e=1: bins [2,3] x2, e=2: bins [4..8) x1
        assert_eq!(col, vec![1.0, 1.0, 1.0, 1.0, 3.0, 3.0, 7.0]);

        let col = rebin_log(&ramp(16), 1, 2, 1, 7, BinReduce::Mean);
        assert_eq!(col, vec![1.0, 1.0, 1.0, 1.0, 2.5, 2.5, 5.5]);
    }

    #[test]
    fn test_zero_padding_widens_runs() {
        let col = rebin_log(&ramp(32), 0, 1, 4, 3, BinReduce::Peak);
        // e=0: bins [0..4) x2, e=1: bins [4..12) x1
        assert_eq!(col, vec![3.0, 3.0, 11.0]);
    }

    #[test]
    fn test_truncates_at_nyquist_boundary() {
        let col = rebin_log(&ramp(6), 1, 2, 1, 7, BinReduce::Peak);
        assert_eq!(col, vec![1.0, 1.0, 1.0, 1.0, 3.0, 3.0, 5.0]);

        let col = rebin_log(&ramp(3), 1, 2, 1, 7, BinReduce::Peak);
        assert_eq!(col, vec![1.0, 1.0, 1.0, 1.0, 2.0, 2.0, 0.0]);
    }

    #[test]
    fn test_start_past_end_is_all_zero() {
        let col = rebin_log(&ramp(8), 100, 3, 2, 15, BinReduce::Mean);
        assert_eq!(col.len(), 15);
        assert!(col.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_plan_reference_geometry() {
        // 11040 samples / 40 segments at 4.8 kHz.
        let axis = LogAxis::plan(276, 4800.0, 20.0, 9000).unwrap();
        assert_eq!(axis.fft_size_unpadded, 512);
        assert_eq!(axis.len_log_unpadded, 255);
        assert_eq!(axis.zero_padding, 32);
        assert_eq!(axis.fft_size, 16384);
        assert_eq!(axis.last_exp, 12);
        assert_eq!(axis.len_log, 8160);
        assert_eq!(axis.len_log, axis.zero_padding * axis.len_log_unpadded);
        assert_eq!(axis.start_idx, 68);
        assert!(axis.fft_size.is_power_of_two());
        assert!(axis.fft_size >= axis.piece_len);
    }

    #[test]
    fn test_column_len_matches_plan() {
        let axis = LogAxis::plan(100, 4800.0, 20.0, 500).unwrap();
        let linear = vec![1.0; axis.fft_size / 2];
        let col = rebin_log(
            &linear,
            axis.start_idx,
            axis.last_exp,
            axis.zero_padding,
            axis.len_log,
            BinReduce::Peak,
        );
        assert_eq!(col.len(), axis.len_log);
    }

    #[test]
    fn test_column_stops_before_runs_past_nyquist() {
        let axis = LogAxis::plan(276, 4800.0, 20.0, 9000).unwrap();
        let linear = vec![1.0; axis.fft_size / 2];
        let col = rebin_log(
            &linear,
            axis.start_idx,
            axis.last_exp,
            axis.zero_padding,
            axis.len_log,
            BinReduce::Peak,
        );
        assert_eq!(col.len(), 8160);
        // The top cell is still fed by in-band bins, so no dead band.
        assert_eq!(col[col.len() - 1], 1.0);
    }

    #[test]
    fn test_cut_column_keeps_low_cells() {
        // Full walk is 7 cells; cutting at 5 drops the top run and half the middle one.
        let col = rebin_log(&ramp(16), 1, 2, 1, 5, BinReduce::Peak);
        assert_eq!(col, vec![1.0, 1.0, 1.0, 1.0, 3.0]);
    }

    #[test]
    fn test_oversized_target_is_rejected() {
        assert!(matches!(
            LogAxis::plan(100, 4800.0, 20.0, usize::MAX),
            Err(ChirpError::InvalidInput(_))
        ));
        assert!(matches!(
            LogAxis::plan(usize::MAX >> 1, 4800.0, 20.0, usize::MAX),
            Err(ChirpError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_no_padding_when_target_is_small() {
        let axis = LogAxis::plan(1000, 4800.0, 20.0, 100).unwrap();
        assert_eq!(axis.zero_padding, 1);
        assert_eq!(axis.fft_size, 1024);
    }

    #[test]
    fn test_rejects_degenerate_pieces() {
        assert!(matches!(
            LogAxis::plan(0, 4800.0, 20.0, 9000),
            Err(ChirpError::DegenerateSignal(_))
        ));
        assert!(matches!(
            LogAxis::plan(1, 4800.0, 20.0, 9000),
            Err(ChirpError::DegenerateSignal(_))
        ));
        assert!(LogAxis::plan(3, 4800.0, 20.0, 9000).is_ok());
    }

    #[test]
    fn test_cell_frequency_rises_with_cell() {
        let axis = LogAxis::plan(276, 4800.0, 20.0, 9000).unwrap();
        let res = axis.freq_resolution(4800.0);
        assert_eq!(axis.cell_frequency(0, 4800.0), Some(68.0 * res));
        // First 4096 cells come from the first run.
        assert_eq!(axis.cell_frequency(4095, 4800.0), Some(68.0 * res));
        assert_eq!(axis.cell_frequency(4096, 4800.0), Some(100.0 * res));
        assert_eq!(axis.cell_frequency(axis.len_log, 4800.0), None);
        let top = axis.cell_frequency(axis.len_log - 1, 4800.0).unwrap();
        assert!(top > 100.0 * res);
    }
}
