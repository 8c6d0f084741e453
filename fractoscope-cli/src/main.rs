mod config;
mod error;
mod export;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};

use fractoscope_core::{ColorScheme, Complex, FractalVariant, ViewState};
use fractoscope_render::Engine;

use config::{parse_complex, Settings};
use error::CliError;

/// Default raster size, matching the interactive viewer's panel.
const DEFAULT_SIZE: u32 = 800;

#[derive(Parser, Debug)]
#[command(name = "fractoscope")]
#[command(about = "Render a Mandelbrot or Julia set view to a PNG file")]
struct Args {
    /// JSON settings file with `view` and `engine` sections.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long, default_value = "fractal.png")]
    output: PathBuf,

    #[arg(long, default_value_t = DEFAULT_SIZE)]
    width: u32,

    #[arg(long, default_value_t = DEFAULT_SIZE)]
    height: u32,

    /// `mandelbrot` or `julia`.
    #[arg(long)]
    variant: Option<FractalVariant>,

    /// `red`, `blue`, `green`, `purple` or `orange`.
    #[arg(long)]
    scheme: Option<ColorScheme>,

    #[arg(long)]
    iterations: Option<u32>,

    /// Pixels per complex-plane unit.
    #[arg(long)]
    zoom: Option<f64>,

    /// View centre as `RE,IM`.
    #[arg(long, value_parser = parse_complex, allow_hyphen_values = true)]
    center: Option<Complex>,

    /// Julia constant as `RE,IM`.
    #[arg(long, value_parser = parse_complex, allow_hyphen_values = true)]
    julia: Option<Complex>,

    /// Worker threads (0 = all hardware threads).
    #[arg(long)]
    threads: Option<usize>,
}

impl Args {
    /// Command-line flags win over the settings file.
    fn apply(&self, settings: &mut Settings) -> Result<(), CliError> {
        let view = &mut settings.view;
        if let Some(variant) = self.variant {
            view.set_variant(variant);
        }
        if let Some(scheme) = self.scheme {
            view.set_color_scheme(scheme);
        }
        if let Some(iterations) = self.iterations {
            view.set_max_iterations(iterations);
            if !view.has_recommended_iterations() {
                warn!(
                    iterations,
                    min = ViewState::MIN_RECOMMENDED_ITERATIONS,
                    max = ViewState::MAX_RECOMMENDED_ITERATIONS,
                    "Iteration bound outside the recommended range"
                );
            }
        }
        if let Some(zoom) = self.zoom {
            view.set_zoom(zoom)?;
        }
        if let Some(center) = self.center {
            view.set_offset(center)?;
        }
        if let Some(c) = self.julia {
            view.set_julia_constant(c)?;
        }
        if let Some(threads) = self.threads {
            settings.engine.threads = threads;
        }
        Ok(())
    }
}

fn run(args: &Args) -> Result<(), CliError> {
    let mut settings = match &args.config {
        Some(path) => config::load(path)?,
        None => Settings::default(),
    };
    args.apply(&mut settings)?;

    let mut engine = Engine::new(settings.engine.clone())?.with_view(settings.view);
    let buffer = engine
        .render_sync(args.width, args.height)?
        .ok_or(CliError::EmptyRaster {
            width: args.width,
            height: args.height,
        })?;
    engine.shutdown();

    export::export_png(&buffer, &settings.view, &args.output)?;
    info!(path = %args.output.display(), "Saved image");
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    info!("Starting Fractoscope export");

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn flags_override_settings() {
        let args = Args::try_parse_from([
            "fractoscope",
            "--variant",
            "julia",
            "--scheme",
            "orange",
            "--iterations",
            "900",
            "--zoom",
            "125",
            "--center",
            "-0.5,0.25",
            "--julia",
            "-0.8,0.156",
            "--threads",
            "2",
        ])
        .unwrap();

        let mut settings = Settings::default();
        args.apply(&mut settings).unwrap();

        let view = settings.view;
        assert_eq!(view.variant(), FractalVariant::Julia);
        assert_eq!(view.color_scheme(), ColorScheme::Orange);
        assert_eq!(view.max_iterations(), 900);
        assert_eq!(view.viewport().zoom(), 125.0);
        assert_eq!(view.viewport().offset(), Complex::new(-0.5, 0.25));
        assert_eq!(view.julia_c(), Complex::new(-0.8, 0.156));
        assert_eq!(settings.engine.threads, 2);
        assert_eq!((args.width, args.height), (800, 800));
    }

    #[test]
    fn invalid_zoom_flag_is_rejected() {
        let args = Args::try_parse_from(["fractoscope", "--zoom=-3"]).unwrap();
        let mut settings = Settings::default();
        assert!(matches!(args.apply(&mut settings), Err(CliError::Core(_))));
    }

    #[test]
    fn out_of_range_iterations_are_kept() {
        let args = Args::try_parse_from(["fractoscope", "--iterations", "5"]).unwrap();
        let mut settings = Settings::default();
        args.apply(&mut settings).unwrap();
        assert_eq!(settings.view.max_iterations(), 5);
        assert!(!settings.view.has_recommended_iterations());
    }

    #[test]
    fn unknown_scheme_fails_to_parse() {
        assert!(Args::try_parse_from(["fractoscope", "--scheme", "teal"]).is_err());
    }

    #[test]
    fn run_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.png");
        let args = Args::try_parse_from([
            "fractoscope",
            "--width",
            "40",
            "--height",
            "30",
            "--threads",
            "2",
            "--output",
            output.to_str().unwrap(),
        ])
        .unwrap();

        run(&args).unwrap();
        let bytes = std::fs::read(&output).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn run_rejects_empty_raster() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("never.png");
        let args = Args::try_parse_from([
            "fractoscope",
            "--width",
            "0",
            "--output",
            output.to_str().unwrap(),
        ])
        .unwrap();
        assert!(matches!(run(&args), Err(CliError::EmptyRaster { .. })));
        assert!(!output.exists());
    }
}
