//! mesh-segment: Command-line interface for normal-constrained segmentation.
//!
//! Loads a JSON input document (vertices, normals, faces with per-corner
//! normal indices), runs a sweep over angle tolerances, and writes one label
//! assignment with death times per tolerance.
//!
//! # Logging
//!
//! Set the `RUST_LOG` environment variable to control log output:
//! - `RUST_LOG=mesh_segment=info` - One line per growth run and sweep
//! - `RUST_LOG=mesh_segment=debug` - Per-radius-step merge counts
//! - `RUST_LOG=mesh_segment::timing=info` - Operation timing
//! - `RUST_LOG=debug` - All debug output
//!
//! # Example
//!
//! ```bash
//! # Reference sweep, results written as JSON
//! mesh-segment segment input.json -o labels.json
//!
//! # Three tolerances given as divisors of pi, with progress
//! mesh-segment segment input.json --theta-divisor 36 --theta-divisor 8 --theta-divisor 2 --progress
//!
//! # Choose a radius range from the data
//! mesh-segment extent input.json
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use mesh_segment::MergeScope;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod commands;
mod input;
mod output;

use commands::{extent, info, init_config, segment};

/// mesh-segment - Region-growing segmentation of surface meshes.
///
/// Partition mesh vertices into regions by sweeping a spatial radius and
/// merging only vertices whose normals agree.
#[derive(Parser)]
#[command(name = "mesh-segment")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format for results
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Suppress all non-error output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Increase output verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for scripting
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ScopeArg {
    /// The query vertex joins its own compatible neighbors
    Closed,
    /// Only the compatible neighbors are merged
    Open,
}

impl From<ScopeArg> for MergeScope {
    fn from(scope: ScopeArg) -> Self {
        match scope {
            ScopeArg::Closed => MergeScope::Closed,
            ScopeArg::Open => MergeScope::Open,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run a segmentation sweep over angle tolerances
    Segment {
        /// Input document (JSON)
        input: PathBuf,

        /// Write labels and death times to this JSON file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Sweep configuration file (TOML); flags override its values
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// First radius
        #[arg(long)]
        eps_min: Option<f64>,

        /// Last radius (inclusive)
        #[arg(long)]
        eps_max: Option<f64>,

        /// Radius increment
        #[arg(long)]
        eps_step: Option<f64>,

        /// Angle tolerance in radians (repeatable)
        #[arg(long, conflicts_with = "theta_divisor")]
        theta: Vec<f64>,

        /// Angle tolerance as a divisor of pi (repeatable)
        #[arg(long)]
        theta_divisor: Vec<f64>,

        /// Which vertices take part in a merge
        #[arg(long)]
        scope: Option<ScopeArg>,

        /// Run tolerances and radius steps on one thread
        #[arg(long)]
        sequential: bool,

        /// Cache compatible neighbors per vertex (faster, more memory)
        #[arg(long)]
        cache_neighbors: bool,

        /// Report progress after every radius step
        #[arg(long)]
        progress: bool,
    },

    /// Report the minimum and maximum distance between vertices
    Extent {
        /// Input document (JSON)
        input: PathBuf,
    },

    /// Display input statistics
    Info {
        /// Input document (JSON)
        input: PathBuf,
    },

    /// Write the reference sweep configuration to a TOML file
    InitConfig {
        /// Output file path
        #[arg(default_value = "sweep.toml")]
        output: PathBuf,
    },
}

/// Initialize the tracing subscriber based on verbosity level.
fn init_tracing(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    // RUST_LOG wins over -v flags
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "warn",
            1 => "mesh_segment=info",
            2 => "mesh_segment=debug",
            _ => "trace",
        };
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    // Nicer panic reports in development builds
    #[cfg(debug_assertions)]
    miette::set_panic_hook();

    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Commands::Segment {
            input,
            output,
            config,
            eps_min,
            eps_max,
            eps_step,
            theta,
            theta_divisor,
            scope,
            sequential,
            cache_neighbors,
            progress,
        } => segment::run(
            &segment::SegmentArgs {
                input,
                output: output.as_ref(),
                config: config.as_ref(),
                eps_min: *eps_min,
                eps_max: *eps_max,
                eps_step: *eps_step,
                theta,
                theta_divisor,
                scope: *scope,
                sequential: *sequential,
                cache_neighbors: *cache_neighbors,
                progress: *progress,
            },
            &cli,
        ),
        Commands::Extent { input } => extent::run(input, &cli),
        Commands::Info { input } => info::run(input, &cli),
        Commands::InitConfig { output } => init_config::run(output, &cli),
    };

    if let Err(e) = &result {
        if !cli.quiet {
            if let Some(seg_err) = e.downcast_ref::<mesh_segment::SegmentError>() {
                eprintln!("{}: {}", "Error".red().bold(), seg_err);
                eprintln!("  {}: {}", "Code".cyan(), seg_err.code());
                eprintln!(
                    "  {}: {}",
                    "Suggestion".green(),
                    seg_err.recovery_suggestion()
                );
                if let Some(location) = seg_err.location() {
                    eprintln!("  {}: {}", "Location".yellow(), location);
                }
            } else {
                eprintln!("{}: {}", "Error".red().bold(), e);
                for cause in e.chain().skip(1) {
                    eprintln!("  {}: {}", "Caused by".yellow(), cause);
                }
            }
        }
        std::process::exit(1);
    }

    Ok(())
}
