use serde::{Deserialize, Serialize};

use crate::error::{ChirpError, Result};

/// The two component masses, in solar masses.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BinaryParameters {
    pub mass1: f64,
    pub mass2: f64,
}

impl BinaryParameters {
    /// Both masses must be positive finite numbers.
    pub fn new(mass1: f64, mass2: f64) -> Result<Self> {
        for (name, m) in [("mass1", mass1), ("mass2", mass2)] {
            if !m.is_finite() || m <= 0.0 {
                return Err(ChirpError::InvalidInput(format!(
                    "{name} must be a positive finite number of solar masses, got {m}"
                )));
            }
        }
        Ok(Self { mass1, mass2 })
    }

    pub fn total_mass(&self) -> f64 {
        self.mass1 + self.mass2
    }

    /// `(m1·m2)^(3/5) / (m1+m2)^(1/5)`, in solar masses.
    pub fn chirp_mass(&self) -> f64 {
        (self.mass1 * self.mass2).powf(3.0 / 5.0) / self.total_mass().powf(1.0 / 5.0)
    }
}

/// Quantities computed once from the masses and the configuration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DerivedQuantities {
    /// Solar masses.
    pub chirp_mass: f64,
    /// Schwarzschild radii (m).
    pub radius1: f64,
    pub radius2: f64,
    pub fcoeff: f64,
    pub hcoeff: f64,
    /// Time to coalescence from entering the band (s).
    pub tau: f64,
    /// GW frequency at which the inspiral is cut off (Hz).
    pub ftouch: f64,
    /// Time before point-mass coalescence at which `ftouch` is reached (s).
    pub tautouch: f64,
    pub sample_rate: f64,
    pub dt: f64,
    /// Simulated duration after rounding and guard margin (s).
    pub duration: f64,
    pub sample_count: usize,
    /// Last sample following the power law; everything after is the flat tail.
    pub last_sample: usize,
    /// Frequency at `last_sample`, held for the tail.
    pub max_freq: f64,
}

/// One point of a chart series.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub time: f64,
    pub value: f64,
}

/// Parallel sample vectors produced by the synthesizer.
#[derive(Clone, Debug)]
pub struct SampleSeries {
    pub time: Vec<f64>,
    pub frequency: Vec<f64>,
    /// Display-scaled amplitude envelope.
    pub amplitude: Vec<f64>,
    /// Accumulated phase (radians).
    pub phase: Vec<f64>,
    pub strain: Vec<f64>,
    pub sample_rate: f64,
    pub derived: DerivedQuantities,
}

impl SampleSeries {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn last_sample(&self) -> usize {
        self.derived.last_sample
    }

    /// True when the merger happens inside the simulated window.
    pub fn has_clamped_tail(&self) -> bool {
        self.derived.last_sample + 1 < self.len()
    }

    pub fn max_time(&self) -> f64 {
        self.time.last().copied().unwrap_or(0.0)
    }

    /// Strain against time.
    pub fn waveform_points(&self) -> Vec<ChartPoint> {
        zip_points(&self.time, &self.strain)
    }

    /// Instantaneous GW frequency against time.
    pub fn frequency_points(&self) -> Vec<ChartPoint> {
        zip_points(&self.time, &self.frequency)
    }
}

fn zip_points(time: &[f64], values: &[f64]) -> Vec<ChartPoint> {
    time.iter()
        .zip(values.iter())
        .map(|(&time, &value)| ChartPoint { time, value })
        .collect()
}

/// RGBA8 image, row-major, row 0 at the top.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpectrogramImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl SpectrogramImage {
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        let p = &self.pixels[idx..idx + 4];
        Some([p[0], p[1], p[2], p[3]])
    }

    pub fn byte_len(&self) -> usize {
        self.pixels.len()
    }

    /// BLAKE3 digest of the dimensions and pixel data, hex encoded.
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.width.to_le_bytes());
        hasher.update(&self.height.to_le_bytes());
        hasher.update(&self.pixels);
        hasher.finalize().to_hex().to_string()
    }
}
