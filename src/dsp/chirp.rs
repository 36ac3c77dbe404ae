//! Leading-order post-Newtonian inspiral waveform.
//!
//! Frequency and amplitude follow the quadrupole power laws
//! `f(τ) = fcoeff · τ^(-3/8)` and `h(τ) = hcoeff · τ^(-1/4)` where `τ` is the
//! time remaining to point-mass coalescence. The law is followed until the
//! merger cutoff; past it the frequency is held and the amplitude is zero.
//! There is no merger or ringdown model, so the tail is a placeholder, not physics.

use std::f64::consts::PI;

use crate::config::{MergerCutoff, PhysicalConstants, SynthesisParams};
use crate::error::{ChirpError, Result};
use crate::types::{BinaryParameters, DerivedQuantities, SampleSeries};

/// Compute every derived quantity without generating samples.
pub fn derive_quantities(
    binary: &BinaryParameters,
    constants: &PhysicalConstants,
    params: &SynthesisParams,
) -> Result<DerivedQuantities> {
    constants.validate()?;
    params.validate()?;

    let PhysicalConstants {
        g,
        c,
        parsec_m,
        solar_mass_kg: msun,
    } = *constants;

    let chirp_mass = binary.chirp_mass();
    let mchirp_kg = chirp_mass * msun;

    let radius1 = schwarzschild_radius(binary.mass1, constants);
    let radius2 = schwarzschild_radius(binary.mass2, constants);

    let fcoeff = frequency_coefficient(mchirp_kg, constants);

    let r = params.distance_mpc * 1e6 * parsec_m;
    let hcoeff = (1.0 / r) * (5.0 * (g * mchirp_kg / c.powi(2)).powi(5) / c).powf(0.25);

    let tau = (fcoeff / params.band_low_hz).powf(8.0 / 3.0);

    let sample_rate = params.sample_rate();
    let dt = 1.0 / sample_rate;

    let step = params.duration_step_s;
    let duration = (tau / step).ceil() * step + params.guard_margin_s;
    let sample_count_f = (sample_rate * duration).floor();
    if !(sample_count_f >= 1.0 && sample_count_f.is_finite()) || !(tau > 0.0) {
        return Err(ChirpError::InvalidInput(format!(
            "masses {} / {} give tau = {tau} s and {sample_count_f} samples",
            binary.mass1, binary.mass2
        )));
    }
    if sample_count_f > params.max_sample_count as f64 {
        return Err(ChirpError::InvalidInput(format!(
            "masses {} / {} need {sample_count_f} samples, more than the limit of {}",
            binary.mass1, binary.mass2, params.max_sample_count
        )));
    }
    let sample_count = sample_count_f as usize;

    let ftouch = match params.merger_cutoff {
        MergerCutoff::SchwarzschildContact => {
            // Kepler's third law at separation r1 + r2, doubled for the GW frequency.
            let m_total_kg = binary.total_mass() * msun;
            2.0 * (1.0 / (2.0 * PI)) * (g * m_total_kg / (radius1 + radius2).powi(3)).sqrt()
        }
        MergerCutoff::FixedFrequency { hz } => hz,
    };
    let tautouch = (fcoeff / ftouch).powf(8.0 / 3.0);

    let raw_last = ((tau - tautouch) / dt).floor();
    if raw_last < 0.0 {
        log::warn!(
            "cutoff frequency {ftouch:.2} Hz is below the band edge {} Hz; tail starts at sample 0",
            params.band_low_hz
        );
    }
    let last_sample = (raw_last.max(0.0) as usize).min(sample_count - 1);
    let max_freq = fcoeff * (tau - last_sample as f64 * dt).powf(-3.0 / 8.0);

    log::debug!(
        "chirp: m1={} m2={} mchirp={chirp_mass:.4} Msun, radii={radius1:.1} m / {radius2:.1} m",
        binary.mass1,
        binary.mass2
    );
    log::debug!(
        "chirp: r={} Mpc, fbandlo={} Hz, tau={tau:.4} s, ftouch={ftouch:.2} Hz, tautouch={tautouch:.3e} s",
        params.distance_mpc,
        params.band_low_hz
    );

    Ok(DerivedQuantities {
        chirp_mass,
        radius1,
        radius2,
        fcoeff,
        hcoeff,
        tau,
        ftouch,
        tautouch,
        sample_rate,
        dt,
        duration,
        sample_count,
        last_sample,
        max_freq,
    })
}

/// Synthesize the time, frequency, amplitude, phase and strain series.
pub fn synthesize(
    binary: &BinaryParameters,
    constants: &PhysicalConstants,
    params: &SynthesisParams,
) -> Result<SampleSeries> {
    let derived = derive_quantities(binary, constants, params)?;
    let n = derived.sample_count;
    let dt = derived.dt;
    let last = derived.last_sample;
    let amp_coeff = derived.hcoeff * params.amplitude_scale;

    let time: Vec<f64> = (0..n).map(|i| i as f64 * dt).collect();

    let mut frequency = vec![derived.max_freq; n];
    let mut amplitude = vec![0.0f64; n];
    for i in 0..=last {
        let remaining = derived.tau - i as f64 * dt;
        frequency[i] = derived.fcoeff * remaining.powf(-3.0 / 8.0);
        amplitude[i] = amp_coeff * remaining.powf(-0.25);
    }

    // Cumulative sum of frequency, then scaled to radians.
    let mut phase = Vec::with_capacity(n);
    let mut acc = 0.0f64;
    for &f in &frequency {
        acc += f;
        phase.push(acc);
    }
    let phase_scale = 2.0 * PI * dt;
    for p in phase.iter_mut() {
        *p *= phase_scale;
    }

    let strain: Vec<f64> = amplitude
        .iter()
        .zip(phase.iter())
        .map(|(&a, &p)| a * p.sin())
        .collect();

    log::debug!(
        "chirp: {n} samples at {} Hz, power law through sample {last}, max freq {:.2} Hz",
        derived.sample_rate,
        derived.max_freq
    );

    Ok(SampleSeries {
        time,
        frequency,
        amplitude,
        phase,
        strain,
        sample_rate: derived.sample_rate,
        derived,
    })
}

/// `2·G·m·Msun / c²` for a mass in solar masses.
pub fn schwarzschild_radius(mass: f64, constants: &PhysicalConstants) -> f64 {
    2.0 * constants.g * mass * constants.solar_mass_kg / constants.c.powi(2)
}

fn frequency_coefficient(mchirp_kg: f64, constants: &PhysicalConstants) -> f64 {
    let PhysicalConstants { g, c, .. } = *constants;
    (1.0 / (8.0 * PI)) * 125f64.powf(1.0 / 8.0) * (c.powi(3) / (g * mchirp_kg)).powf(5.0 / 8.0)
}
