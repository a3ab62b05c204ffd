//! Command-line fitting of saved point files.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use stackline::config::ConfigError;
use stackline::format::{FitReport, FormatError, PointFile};
use stackline::geometry::{self, clamp_degree};
use stackline::model::{FitKind, FitParams, Point3};
use stackline::{AppConfig, LinePreferences, LogLevel};

#[derive(Parser, Debug)]
#[command(name = "stackline", version)]
#[command(about = "Fit a curve through a saved annotation line", long_about = None)]
struct Args {
    /// JSON point file
    input: PathBuf,

    /// Fit strategy: none, piecewise, polynomial or line3d
    #[arg(short, long)]
    fit: Option<FitKind>,

    /// Polynomial degree
    #[arg(short, long)]
    degree: Option<usize>,

    /// Optical plane written into polynomial fits (default: plane of the last point)
    #[arg(short, long, allow_negative_numbers = true)]
    slice: Option<f64>,

    /// Write the report to this file instead of stdout
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Log verbosity: error, warn, info, debug or trace
    #[arg(short, long)]
    log_level: Option<LogLevel>,

    /// Keep the fit, degree and log level given here as the new defaults
    #[arg(long)]
    save_config: bool,
}

impl Args {
    /// Override configured defaults with the options given on the command line.
    fn apply_to(&self, prefs: &mut LinePreferences) {
        if let Some(fit) = self.fit {
            prefs.fit_kind = fit;
        }
        if let Some(degree) = self.degree {
            prefs.degree = clamp_degree(degree);
        }
        if let Some(level) = self.log_level {
            prefs.log_level = level;
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

fn fit_params(prefs: &LinePreferences, slice: Option<f64>, points: &[Point3]) -> FitParams {
    FitParams {
        degree: clamp_degree(prefs.degree),
        // Default to the plane of the last clicked point, as the viewer does.
        slice: slice
            .or_else(|| points.last().map(|p| p.plane))
            .unwrap_or_default(),
    }
}

fn run(args: &Args, config: &AppConfig) -> Result<(), CliError> {
    if args.save_config {
        let path = config.save_to_default_path()?;
        log::info!("Defaults saved to {:?}", path);
    }

    let file = PointFile::load(&args.input)?;
    let points = file.points.as_slice();

    let kind = config.preferences.fit_kind;
    let params = fit_params(&config.preferences, args.slice, points);

    let fit = geometry::fit(kind, points, &params);
    if fit.is_empty() && kind != FitKind::None {
        log::warn!(
            "No {} fit for {} points (needs at least {})",
            kind,
            points.len(),
            geometry::min_points(kind, &params)
        );
    }

    let report = FitReport::new(kind, params, points, fit);
    match &args.out {
        Some(path) => report.save(path)?,
        None => println!("{}", report.to_json()?),
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    let mut config = AppConfig::load_from_default_path().unwrap_or_default();
    args.apply_to(&mut config.preferences);

    env_logger::Builder::new()
        .filter_level(config.preferences.log_level.to_level_filter())
        .parse_default_env()
        .init();

    match run(&args, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
