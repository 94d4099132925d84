use std::{error::Error, fs, path::PathBuf};

use array_synth_lib::{
    config::{AngleUnit, EngineConfig, Scale},
    engine::{self, SynthesisResult},
    export,
    params::{Method, RawParameters, RawValue},
    series_chart::pattern_chart,
};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Synthesize excitations for a linear antenna array and report its pattern.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// uniform, schelkunoff, fourier or dolph_chebyshev
    #[arg(short, long)]
    method: Method,

    /// JSON object of raw parameters
    #[arg(short, long)]
    params: Option<PathBuf>,

    /// Extra parameter as key=value; the value may be an expression or a comma separated list
    #[arg(short = 's', long = "set", value_name = "KEY=VALUE")]
    overrides: Vec<String>,

    /// JSON engine configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Unit for angle inputs and printed angles, overriding the configuration
    #[arg(long, value_enum)]
    unit: Option<AngleUnit>,

    /// Write the full result as JSON
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write the sampled pattern as CSV
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Render the pattern to an SVG file
    #[arg(long)]
    plot: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "db")]
    scale: Scale,
}

fn parse_override(text: &str) -> Result<(String, RawValue), String> {
    let (key, value) = text
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", text))?;
    Ok((key.trim().to_owned(), RawValue::from(value.trim())))
}

fn print_summary(result: &SynthesisResult, unit: AngleUnit, digits: usize) {
    let metrics = result.metrics();
    let angle = |x: f64| unit.from_radians(x);

    println!(
        "{} synthesis, N = {}",
        result.method(),
        result.parameters().element_count()
    );
    println!("peak angle: {:.*}", digits, angle(metrics.peak_angle));
    match metrics.half_power_beamwidth {
        Some(hpbw) => println!("HPBW: {:.*}", digits, angle(hpbw)),
        None => println!("HPBW: not resolved on the grid"),
    }
    println!(
        "directivity: {:.*} ({:.*} dB)",
        digits, metrics.directivity, digits, metrics.directivity_db
    );
    if let Some(sll) = metrics.sidelobe_level_db {
        println!("sidelobe level: -{:.*} dB", digits, sll);
    }
    if !metrics.realized_nulls.is_empty() {
        let nulls: Vec<String> = metrics
            .realized_nulls
            .iter()
            .map(|&x| format!("{:.*}", digits, angle(x)))
            .collect();
        println!("nulls: {}", nulls.join(", "));
    }

    println!("\n{:>4} {:>12} {:>12}", "n", "|I_n|", "arg I_n");
    let phases = result.excitation_phases(unit);
    for (n, (x, phase)) in result
        .normalized_excitations()
        .iter()
        .zip(phases.iter())
        .enumerate()
    {
        println!("{:>4} {:>12.*} {:>12.*}", n, digits, x.norm(), digits, phase);
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::default(),
    };
    if let Some(unit) = args.unit {
        config = config.with_angle_unit(unit);
    }

    let mut raw: RawParameters = match &args.params {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => RawParameters::new(),
    };
    for text in args.overrides.iter() {
        let (key, value) = parse_override(text)?;
        raw.insert(&key, value);
    }

    let result = engine::synthesize(args.method, &raw, &config)?;
    print_summary(&result, config.angle_unit, config.precision_digits);

    if let Some(path) = &args.output {
        export::write_json(&result, path)?;
        info!(path = %path.display(), "wrote result");
    }
    if let Some(path) = &args.csv {
        fs::write(
            path,
            export::array_factor_csv(&result, config.angle_unit, config.precision_digits),
        )?;
        info!(path = %path.display(), "wrote pattern");
    }
    if let Some(path) = &args.plot {
        pattern_chart(&result, config.angle_unit, args.scale).render_svg(path, (1024, 640))?;
        info!(path = %path.display(), "wrote plot");
    }

    Ok(())
}
