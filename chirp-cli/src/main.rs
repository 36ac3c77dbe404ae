//! Synthesize a chirp for two masses, render its spectrogram and print a summary.
//!
//! Nothing is written to disk; `RUST_LOG=debug` shows the synthesis and render details.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use chirp::canvas::waveform_renderer::{frequency_envelope, waveform_envelope};
use chirp::{render_with, synthesize_with, ChirpConfig};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "chirp-sim")]
#[command(about = "Compact-binary gravitational-wave chirp simulator", long_about = None)]
struct Args {
    /// First mass (solar masses)
    #[arg(value_name = "MASS1", allow_negative_numbers = true)]
    mass1: Option<f64>,

    /// Second mass (solar masses)
    #[arg(value_name = "MASS2", allow_negative_numbers = true)]
    mass2: Option<f64>,

    /// Number of spectrogram time segments (overrides the config)
    #[arg(long, value_name = "N")]
    buffer_count: Option<usize>,

    /// JSON configuration file; missing fields keep their defaults
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Width in points of the waveform and frequency charts
    #[arg(long, value_name = "N", default_value_t = 800)]
    chart_points: usize,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    print_config: bool,
}

fn load_config(args: &Args) -> Result<ChirpConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            ChirpConfig::from_json(&text)
                .with_context(|| format!("invalid config in {}", path.display()))?
        }
        None => ChirpConfig::default(),
    };
    if let Some(n) = args.buffer_count {
        config.spectrogram.buffer_count = n;
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn run(args: &Args, config: &ChirpConfig) -> Result<()> {
    let (Some(mass1), Some(mass2)) = (args.mass1, args.mass2) else {
        bail!("both MASS1 and MASS2 are required");
    };

    let series = synthesize_with(mass1, mass2, config)
        .with_context(|| format!("failed to synthesize {mass1} + {mass2} Msun"))?;
    let d = &series.derived;
    log::info!("synthesized {} samples for {mass1} + {mass2} Msun", series.len());

    println!("Chirp mass:        {:.4} Msun", d.chirp_mass);
    println!("Time to merger:    {:.4} s", d.tau);
    println!("Cutoff frequency:  {:.2} Hz ({:.3e} s before coalescence)", d.ftouch, d.tautouch);
    println!("Sample rate:       {} Hz", d.sample_rate);
    println!("Samples:           {} ({:.2} s)", d.sample_count, series.max_time());
    println!("Power law through: sample {}", d.last_sample);
    println!("Peak frequency:    {:.2} Hz", d.max_freq);
    if !series.has_clamped_tail() {
        println!("Merger falls outside the simulated window");
    }

    let wave = waveform_envelope(&series, args.chart_points);
    let freq = frequency_envelope(&series, args.chart_points);
    println!("Chart points:      {} waveform, {} frequency", wave.len(), freq.len());

    let image = render_with(&series, config).context("failed to render spectrogram")?;
    println!("Spectrogram:       {} x {} RGBA", image.width, image.height);
    println!("Fingerprint:       {}", image.fingerprint());
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let result = load_config(&args).and_then(|config| {
        if args.print_config {
            println!("{}", config.to_json_pretty()?);
            Ok(())
        } else {
            run(&args, &config)
        }
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
