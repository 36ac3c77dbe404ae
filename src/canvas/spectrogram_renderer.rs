use crate::canvas::colors::{magnitude_to_byte, ColorLut};
use crate::config::SpectrogramParams;
use crate::dsp::fft::SegmentSpectrum;
use crate::dsp::log_bins::{rebin_log, LogAxis};
use crate::error::{ChirpError, Result};
use crate::types::SpectrogramImage;

/// Scalar log-frequency spectrogram before color mapping.
#[derive(Clone, Debug)]
pub struct LogSpectrogram {
    /// One column per segment, in time order. Cell 0 = lowest frequency.
    pub columns: Vec<Vec<f64>>,
    pub axis: LogAxis,
}

/// Segment the strain, take a magnitude spectrum per segment and rebin each
/// onto the log axis.
pub fn compute_log_columns(
    strain: &[f64],
    sample_rate: f64,
    params: &SpectrogramParams,
) -> Result<LogSpectrogram> {
    params.validate()?;
    if strain.is_empty() {
        return Err(ChirpError::InvalidInput("strain is empty".into()));
    }

    // Non-overlapping, left-aligned; the remainder is dropped.
    let piece_len = strain.len() / params.buffer_count;
    let axis = LogAxis::plan(
        piece_len,
        sample_rate,
        params.low_freq_hz,
        params.target_log_len,
    )?;

    log::debug!(
        "spectrogram: {} segments of {} samples, DFT {} (x{} padding), {} log cells",
        params.buffer_count,
        piece_len,
        axis.fft_size,
        axis.zero_padding,
        axis.len_log
    );

    let mut spectrum = SegmentSpectrum::new(axis.fft_size, piece_len, params.window)?;
    let mut linear = Vec::with_capacity(spectrum.bin_count());
    let mut columns = Vec::with_capacity(params.buffer_count);

    for segment in strain.chunks_exact(piece_len).take(params.buffer_count) {
        spectrum.magnitudes(segment, &mut linear)?;
        columns.push(rebin_log(
            &linear,
            axis.start_idx,
            axis.last_exp,
            axis.zero_padding,
            axis.len_log,
            params.reduce,
        ));
    }

    Ok(LogSpectrogram { columns, axis })
}

/// Duplicate every column `duplicate` times, replacing the first half of the
/// copies of each column after the first with the average of it and its predecessor.
pub fn smooth_columns(columns: &[Vec<f64>], duplicate: usize) -> Vec<Vec<f64>> {
    let mut out = Vec::with_capacity(columns.len() * duplicate);
    let blended = duplicate / 2;

    for (i, col) in columns.iter().enumerate() {
        if i == 0 {
            for _ in 0..duplicate {
                out.push(col.clone());
            }
            continue;
        }
        let prev = &columns[i - 1];
        let avg: Vec<f64> = prev
            .iter()
            .zip(col.iter())
            .map(|(&a, &b)| (a + b) / 2.0)
            .collect();
        for _ in 0..blended {
            out.push(avg.clone());
        }
        for _ in blended..duplicate {
            out.push(col.clone());
        }
    }

    out
}

/// Color-map the columns into a planar image: one row per column,
/// `len_log` pixels per row, low frequency first.
pub fn columns_to_planar(
    columns: &[Vec<f64>],
    len_log: usize,
    lut: &ColorLut,
) -> SpectrogramImage {
    let max_mag = columns
        .iter()
        .flat_map(|c| c.iter())
        .copied()
        .fold(0.0f64, f64::max);

    let width = len_log;
    let height = columns.len();
    let mut pixels = vec![0u8; width * height * 4];

    for (row, col) in columns.iter().enumerate() {
        for (cell, &mag) in col.iter().take(width).enumerate() {
            let rgba = lut.apply(magnitude_to_byte(mag, max_mag));
            let idx = (row * width + cell) * 4;
            pixels[idx..idx + 4].copy_from_slice(&rgba);
        }
    }

    SpectrogramImage {
        width: width as u32,
        height: height as u32,
        pixels,
    }
}

/// Rotate 90° counter-clockwise: `dst(x, y) = src(W − 1 − y, x)`.
pub fn rotate_ccw(src: &SpectrogramImage) -> SpectrogramImage {
    let src_w = src.width as usize;
    let src_h = src.height as usize;
    let dst_w = src_h;
    let dst_h = src_w;
    let mut pixels = vec![0u8; src.pixels.len()];

    for y in 0..dst_h {
        let sx = src_w - 1 - y;
        for x in 0..dst_w {
            let s = (x * src_w + sx) * 4;
            let d = (y * dst_w + x) * 4;
            pixels[d..d + 4].copy_from_slice(&src.pixels[s..s + 4]);
        }
    }

    SpectrogramImage {
        width: dst_w as u32,
        height: dst_h as u32,
        pixels,
    }
}

/// Render the strain into a false-color spectrogram with time on the
/// horizontal axis and log frequency on the vertical axis (top = highest).
pub fn render(
    strain: &[f64],
    sample_rate: f64,
    params: &SpectrogramParams,
) -> Result<SpectrogramImage> {
    let log_spec = compute_log_columns(strain, sample_rate, params)?;
    let smoothed = smooth_columns(&log_spec.columns, params.bin_duplicate);
    let lut = ColorLut::for_palette(params.palette);
    let planar = columns_to_planar(&smoothed, log_spec.axis.len_log, &lut);
    Ok(rotate_ccw(&planar))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Palette;

    fn tone(n: usize, freq: f64, sample_rate: f64) -> Vec<f64> {
        (0..n)
            .map(|i| (2.0 * std::f64::consts::PI * freq * i as f64 / sample_rate).sin())
            .collect()
    }

    fn small_params() -> SpectrogramParams {
        SpectrogramParams {
            buffer_count: 8,
            target_log_len: 600,
            palette: Palette::Greyscale,
            ..SpectrogramParams::default()
        }
    }

    #[test]
    fn test_smoothing_inserts_averages() {
        let cols = vec![vec![0.0, 2.0], vec![2.0, 4.0], vec![4.0, 4.0]];
        let out = smooth_columns(&cols, 2);
        assert_eq!(
            out,
            vec![
                vec![0.0, 2.0],
                vec![0.0, 2.0],
                vec![1.0, 3.0],
                vec![2.0, 4.0],
                vec![3.0, 4.0],
                vec![4.0, 4.0],
            ]
        );
        assert_eq!(smooth_columns(&cols, 1), cols);
        assert_eq!(smooth_columns(&cols, 3).len(), 9);
    }

    #[test]
    fn test_rotation_puts_time_on_x_and_high_freq_on_top() {
        // 3 cells of frequency (width) x 2 time rows (height).
        let mut pixels = Vec::new();
        for v in [1u8, 2, 3, 4, 5, 6] {
            pixels.extend_from_slice(&[v, v, v, 255]);
        }
        let planar = SpectrogramImage { width: 3, height: 2, pixels };
        let rotated = rotate_ccw(&planar);
        assert_eq!((rotated.width, rotated.height), (2, 3));
        // Top row = highest frequency cell of each time row.
        assert_eq!(rotated.pixel(0, 0).unwrap()[0], 3);
        assert_eq!(rotated.pixel(1, 0).unwrap()[0], 6);
        // Bottom row = lowest frequency.
        assert_eq!(rotated.pixel(0, 2).unwrap()[0], 1);
        assert_eq!(rotated.pixel(1, 2).unwrap()[0], 4);
    }

    #[test]
    fn test_image_dimensions() {
        let strain = tone(4800, 200.0, 4800.0);
        let params = small_params();
        let log_spec = compute_log_columns(&strain, 4800.0, &params).unwrap();
        assert_eq!(log_spec.columns.len(), 8);
        assert!(log_spec.columns.iter().all(|c| c.len() == log_spec.axis.len_log));

        let img = render(&strain, 4800.0, &params).unwrap();
        assert_eq!(img.width as usize, params.buffer_count * params.bin_duplicate);
        assert_eq!(img.height as usize, log_spec.axis.len_log);
        assert_eq!(img.byte_len(), (img.width * img.height * 4) as usize);
        assert!(img.pixels.chunks_exact(4).all(|p| p[3] == 255));
    }

    #[test]
    fn test_zero_strain_is_uniform_minimum() {
        let strain = vec![0.0; 4000];
        let params = small_params();
        let log_spec = compute_log_columns(&strain, 4800.0, &params).unwrap();
        assert!(log_spec.columns.iter().flatten().all(|&v| v == 0.0));

        let img = render(&strain, 4800.0, &params).unwrap();
        let floor = ColorLut::greyscale().apply(0);
        assert!(img.pixels.chunks_exact(4).all(|p| p == &floor[..]));
    }

    #[test]
    fn test_columns_follow_segment_time_order() {
        // Loud first half, silent second half.
        let mut strain = tone(4000, 300.0, 4800.0);
        for s in strain.iter_mut().skip(2000) {
            *s = 0.0;
        }
        let params = small_params();
        let img = render(&strain, 4800.0, &params).unwrap();
        let column_energy = |x: u32| -> u32 {
            (0..img.height).map(|y| img.pixel(x, y).unwrap()[0] as u32).sum()
        };
        assert!(column_energy(1) > column_energy(img.width - 1));
    }

    #[test]
    fn test_render_is_deterministic() {
        let strain = tone(6000, 440.0, 4800.0);
        let params = SpectrogramParams {
            buffer_count: 10,
            target_log_len: 800,
            ..SpectrogramParams::default()
        };
        let a = render(&strain, 4800.0, &params).unwrap();
        let b = render(&strain, 4800.0, &params).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_rejects_degenerate_configurations() {
        let params = SpectrogramParams {
            buffer_count: 100,
            ..SpectrogramParams::default()
        };
        assert!(matches!(
            render(&[0.5; 50], 4800.0, &params),
            Err(ChirpError::DegenerateSignal(_))
        ));
        assert!(matches!(
            render(&[], 4800.0, &SpectrogramParams::default()),
            Err(ChirpError::InvalidInput(_))
        ));
        let params = SpectrogramParams {
            buffer_count: 0,
            ..SpectrogramParams::default()
        };
        assert!(matches!(
            render(&[0.5; 50], 4800.0, &params),
            Err(ChirpError::InvalidInput(_))
        ));
        let params = SpectrogramParams {
            buffer_count: 10,
            target_log_len: usize::MAX,
            ..SpectrogramParams::default()
        };
        assert!(matches!(
            compute_log_columns(&[0.0; 100], 4800.0, &params),
            Err(ChirpError::InvalidInput(_))
        ));
    }
}
