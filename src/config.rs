//! Tunable parameters for synthesis and rendering.
//!
//! Every struct defaults to the reference values and deserializes with
//! `#[serde(default)]`, so a partial JSON document only overrides what it names.

use serde::{Deserialize, Serialize};

use crate::error::{ChirpError, Result};

/// Physical constants in SI units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicalConstants {
    /// Gravitational constant (m³ kg⁻¹ s⁻²).
    pub g: f64,
    /// Speed of light (m/s).
    pub c: f64,
    /// One parsec (m).
    pub parsec_m: f64,
    /// One solar mass (kg).
    pub solar_mass_kg: f64,
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self {
            g: 6.67e-11,
            c: 2.998e8,
            parsec_m: 3.086e16,
            solar_mass_kg: 2.0e30,
        }
    }
}

impl PhysicalConstants {
    pub fn validate(&self) -> Result<()> {
        require_positive("g", self.g)?;
        require_positive("c", self.c)?;
        require_positive("parsec_m", self.parsec_m)?;
        require_positive("solar_mass_kg", self.solar_mass_kg)
    }
}

/// Where the power-law inspiral stops and the flat tail begins.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum MergerCutoff {
    /// Kepler frequency at which the two Schwarzschild radii touch, doubled for GW frequency.
    SchwarzschildContact,
    /// A fixed GW frequency in Hz.
    FixedFrequency { hz: f64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisParams {
    /// Distance to the source in megaparsecs.
    pub distance_mpc: f64,
    /// Frequency (Hz) at which the signal enters the detector band.
    pub band_low_hz: f64,
    /// Amplitude rescaling for display.
    pub amplitude_scale: f64,
    pub base_sample_rate: f64,
    pub down_sample: u32,
    /// Duration is rounded up to a multiple of this step (seconds).
    pub duration_step_s: f64,
    /// Extra time appended after rounding (seconds).
    pub guard_margin_s: f64,
    /// Upper bound on the series length; longer inspirals are rejected.
    pub max_sample_count: usize,
    pub merger_cutoff: MergerCutoff,
}

impl Default for SynthesisParams {
    fn default() -> Self {
        Self {
            distance_mpc: 15.0,
            band_low_hz: 30.0,
            amplitude_scale: 1e21,
            base_sample_rate: 48_000.0,
            down_sample: 10,
            duration_step_s: 0.1,
            guard_margin_s: 0.1,
            max_sample_count: 20_000_000,
            merger_cutoff: MergerCutoff::SchwarzschildContact,
        }
    }
}

impl SynthesisParams {
    pub fn sample_rate(&self) -> f64 {
        self.base_sample_rate / self.down_sample as f64
    }

    pub fn validate(&self) -> Result<()> {
        require_positive("distance_mpc", self.distance_mpc)?;
        require_positive("band_low_hz", self.band_low_hz)?;
        require_positive("amplitude_scale", self.amplitude_scale)?;
        require_positive("base_sample_rate", self.base_sample_rate)?;
        require_positive("duration_step_s", self.duration_step_s)?;
        if !self.guard_margin_s.is_finite() || self.guard_margin_s < 0.0 {
            return Err(ChirpError::InvalidInput(format!(
                "guard_margin_s must be finite and non-negative, got {}",
                self.guard_margin_s
            )));
        }
        if self.down_sample == 0 {
            return Err(ChirpError::InvalidInput("down_sample must be at least 1".into()));
        }
        if self.max_sample_count == 0 {
            return Err(ChirpError::InvalidInput("max_sample_count must be at least 1".into()));
        }
        if let MergerCutoff::FixedFrequency { hz } = self.merger_cutoff {
            require_positive("merger_cutoff.hz", hz)?;
        }
        Ok(())
    }
}

/// How a run of linear bins collapses to one log-axis value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinReduce {
    Peak,
    Mean,
}

/// Analysis window applied to each segment before zero padding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowKind {
    Rectangular,
    Hann,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Palette {
    Greyscale,
    Heat,
}

/// Largest accepted `target_log_len`.
pub const MAX_TARGET_LOG_LEN: usize = 1 << 20;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectrogramParams {
    /// Number of time segments (image columns before duplication).
    pub buffer_count: usize,
    /// Desired log-axis length; drives the zero-padding multiplier.
    pub target_log_len: usize,
    /// Output columns per segment.
    pub bin_duplicate: usize,
    /// Frequency (Hz) where the log axis starts.
    pub low_freq_hz: f64,
    pub reduce: BinReduce,
    pub window: WindowKind,
    pub palette: Palette,
}

impl Default for SpectrogramParams {
    fn default() -> Self {
        Self {
            buffer_count: 40,
            target_log_len: 9000,
            bin_duplicate: 2,
            low_freq_hz: 20.0,
            reduce: BinReduce::Peak,
            window: WindowKind::Rectangular,
            palette: Palette::Heat,
        }
    }
}

impl SpectrogramParams {
    pub fn validate(&self) -> Result<()> {
        if self.buffer_count == 0 {
            return Err(ChirpError::InvalidInput("buffer_count must be at least 1".into()));
        }
        if self.bin_duplicate == 0 {
            return Err(ChirpError::InvalidInput("bin_duplicate must be at least 1".into()));
        }
        if self.target_log_len == 0 || self.target_log_len > MAX_TARGET_LOG_LEN {
            return Err(ChirpError::InvalidInput(format!(
                "target_log_len must be in 1..={MAX_TARGET_LOG_LEN}, got {}",
                self.target_log_len
            )));
        }
        if !self.low_freq_hz.is_finite() || self.low_freq_hz < 0.0 {
            return Err(ChirpError::InvalidInput(format!(
                "low_freq_hz must be finite and non-negative, got {}",
                self.low_freq_hz
            )));
        }
        Ok(())
    }
}

/// Complete configuration passed to both the synthesizer and the renderer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChirpConfig {
    pub constants: PhysicalConstants,
    pub synthesis: SynthesisParams,
    pub spectrogram: SpectrogramParams,
}

impl ChirpConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        let config: ChirpConfig = serde_json::from_str(text)
            .map_err(|e| ChirpError::InvalidInput(format!("config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ChirpError::InvalidInput(format!("config: {e}")))
    }

    pub fn validate(&self) -> Result<()> {
        self.constants.validate()?;
        self.synthesis.validate()?;
        self.spectrogram.validate()
    }
}

fn require_positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ChirpError::InvalidInput(format!(
            "{name} must be positive and finite, got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_sample_rate() {
        assert_eq!(SynthesisParams::default().sample_rate(), 4800.0);
    }

    #[test]
    fn test_partial_json_overrides_only_named_fields() {
        let config =
            ChirpConfig::from_json(r#"{ "spectrogram": { "buffer_count": 64 } }"#).unwrap();
        assert_eq!(config.spectrogram.buffer_count, 64);
        assert_eq!(config.spectrogram.bin_duplicate, 2);
        assert_eq!(config.synthesis, SynthesisParams::default());
    }

    #[test]
    fn test_json_roundtrip_keeps_cutoff_policy() {
        let mut config = ChirpConfig::default();
        config.synthesis.merger_cutoff = MergerCutoff::FixedFrequency { hz: 250.0 };
        let text = config.to_json_pretty().unwrap();
        assert_eq!(ChirpConfig::from_json(&text).unwrap(), config);
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut config = ChirpConfig::default();
        config.synthesis.down_sample = 0;
        assert!(matches!(config.validate(), Err(ChirpError::InvalidInput(_))));

        let mut config = ChirpConfig::default();
        config.spectrogram.buffer_count = 0;
        assert!(matches!(config.validate(), Err(ChirpError::InvalidInput(_))));

        let mut config = ChirpConfig::default();
        config.spectrogram.target_log_len = MAX_TARGET_LOG_LEN + 1;
        assert!(matches!(config.validate(), Err(ChirpError::InvalidInput(_))));
        config.spectrogram.target_log_len = MAX_TARGET_LOG_LEN;
        assert!(config.validate().is_ok());

        let mut config = ChirpConfig::default();
        config.synthesis.max_sample_count = 0;
        assert!(matches!(config.validate(), Err(ChirpError::InvalidInput(_))));

        let mut config = ChirpConfig::default();
        config.constants.c = f64::NAN;
        assert!(config.validate().is_err());

        assert!(ChirpConfig::from_json("{ not json").is_err());
    }
}
