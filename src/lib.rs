//! Compact-binary gravitational-wave chirp synthesis and spectrogram rendering.
//!
//! [`synthesize_waveform`] turns two masses into time, frequency and strain
//! series; [`render_spectrogram`] turns a strain series into an RGBA image with
//! time on the horizontal axis and log frequency on the vertical axis.

pub mod canvas;
pub mod config;
pub mod dsp;
pub mod error;
pub mod types;

pub use canvas::spectrogram_renderer::{compute_log_columns, LogSpectrogram};
pub use config::{
    BinReduce, ChirpConfig, MergerCutoff, Palette, PhysicalConstants, SpectrogramParams,
    SynthesisParams, WindowKind, MAX_TARGET_LOG_LEN,
};
pub use dsp::log_bins::LogAxis;
pub use error::{ChirpError, Result};
pub use types::{BinaryParameters, ChartPoint, DerivedQuantities, SampleSeries, SpectrogramImage};

/// Synthesize the chirp for two masses (solar masses) with the reference configuration.
pub fn synthesize_waveform(mass1: f64, mass2: f64) -> Result<SampleSeries> {
    synthesize_with(mass1, mass2, &ChirpConfig::default())
}

pub fn synthesize_with(mass1: f64, mass2: f64, config: &ChirpConfig) -> Result<SampleSeries> {
    let binary = BinaryParameters::new(mass1, mass2)?;
    dsp::chirp::synthesize(&binary, &config.constants, &config.synthesis)
}

/// Render a strain series into `buffer_count` time segments with the
/// reference spectrogram parameters.
pub fn render_spectrogram(
    strain: &[f64],
    sample_rate: f64,
    buffer_count: usize,
) -> Result<SpectrogramImage> {
    let params = SpectrogramParams {
        buffer_count,
        ..SpectrogramParams::default()
    };
    canvas::spectrogram_renderer::render(strain, sample_rate, &params)
}

pub fn render_with(series: &SampleSeries, config: &ChirpConfig) -> Result<SpectrogramImage> {
    canvas::spectrogram_renderer::render(&series.strain, series.sample_rate, &config.spectrogram)
}
