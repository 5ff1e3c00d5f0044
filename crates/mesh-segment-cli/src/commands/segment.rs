//! mesh-segment segment command - run a tolerance sweep.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;
use mesh_segment::progress::{Progress, ProgressCallback};
use mesh_segment::{MergeScope, SweepConfig, SweepOutcome, run_sweep_with_progress};
use serde::Serialize;
use tracing::debug;

use crate::{Cli, OutputFormat, ScopeArg, input, output};

/// Flag overrides applied on top of the config file.
pub struct SegmentArgs<'a> {
    pub input: &'a Path,
    pub output: Option<&'a PathBuf>,
    pub config: Option<&'a PathBuf>,
    pub eps_min: Option<f64>,
    pub eps_max: Option<f64>,
    pub eps_step: Option<f64>,
    pub theta: &'a [f64],
    pub theta_divisor: &'a [f64],
    pub scope: Option<ScopeArg>,
    pub sequential: bool,
    pub cache_neighbors: bool,
    pub progress: bool,
}

#[derive(Serialize)]
struct SegmentResult {
    input: String,
    vertices: usize,
    eps_min: f64,
    eps_max: f64,
    eps_step: f64,
    scope: MergeScope,
    sweeps: Vec<SweepResult>,
}

#[derive(Serialize)]
struct SweepResult {
    position: usize,
    theta_max: f64,
    regions: usize,
    singletons: usize,
    merged_vertices: usize,
    largest_region: usize,
    labels: Vec<u32>,
    /// `null` for vertices that never merged.
    death_times: Vec<Option<f64>>,
}

impl From<&SweepOutcome> for SweepResult {
    fn from(outcome: &SweepOutcome) -> Self {
        let summary = outcome.summary();
        Self {
            position: outcome.position,
            theta_max: outcome.theta_max,
            regions: summary.region_count,
            singletons: summary.singleton_count,
            merged_vertices: summary.merged_vertex_count,
            largest_region: summary.largest_region_size,
            labels: outcome.labels().to_vec(),
            death_times: outcome
                .death_times()
                .iter()
                .map(|t| t.is_finite().then_some(*t))
                .collect(),
        }
    }
}

/// Resolve the sweep configuration from an optional file and flags.
fn resolve_config(args: &SegmentArgs<'_>) -> Result<SweepConfig> {
    let mut config = match args.config {
        Some(path) => SweepConfig::from_toml_file(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => SweepConfig::reference(),
    };

    if let Some(v) = args.eps_min {
        config.eps_min = v;
    }
    if let Some(v) = args.eps_max {
        config.eps_max = v;
    }
    if let Some(v) = args.eps_step {
        config.eps_step = v;
    }
    if !args.theta.is_empty() {
        config = config.with_tolerances(args.theta.to_vec());
    }
    if !args.theta_divisor.is_empty() {
        config.theta_max_pi_divisors = Some(args.theta_divisor.to_vec());
    }
    if let Some(scope) = args.scope {
        config.scope = scope.into();
    }
    if args.sequential {
        config.parallel_sweeps = false;
        config.parallel_steps = false;
    }
    if args.cache_neighbors {
        config.cache_neighbors = true;
    }

    config.validate()?;
    debug!(?config, "Resolved sweep configuration");
    Ok(config)
}

pub fn run(args: &SegmentArgs<'_>, cli: &Cli) -> Result<()> {
    let config = resolve_config(args)?;
    let input = input::load(args.input)?;

    output::info(
        &format!(
            "Segmenting {} vertices over {} tolerances...",
            input.vertex_count(),
            config.tolerances().len()
        ),
        cli.format,
        cli.quiet,
    );

    let callback: Option<ProgressCallback> = (args.progress && !cli.quiet).then(|| {
        let callback: ProgressCallback = Box::new(|p: &Progress| {
            eprintln!("  [{:>3}%] {}", p.percent(), p.message);
        });
        callback
    });
    let outcomes = run_sweep_with_progress(&input, &config, callback.as_ref())
        .context("Segmentation failed")?;

    let result = SegmentResult {
        input: args.input.display().to_string(),
        vertices: input.vertex_count(),
        eps_min: config.eps_min,
        eps_max: config.eps_max,
        eps_step: config.eps_step,
        scope: config.scope,
        sweeps: outcomes.iter().map(SweepResult::from).collect(),
    };

    if let Some(path) = args.output {
        let json = serde_json::to_string_pretty(&result)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write result to {:?}", path))?;
    }

    match cli.format {
        OutputFormat::Json => {
            if args.output.is_none() {
                output::print(&result, cli.format, cli.quiet);
            }
        }
        OutputFormat::Text => {
            if !cli.quiet {
                println!("{}", "Segmentation".bold().underline());
                println!("  {}: {}", "Input".cyan(), result.input);
                println!("  {}: {}", "Vertices".cyan(), result.vertices);
                println!(
                    "  {}: {} to {} step {}",
                    "Radius".cyan(),
                    result.eps_min,
                    result.eps_max,
                    result.eps_step
                );
                for sweep in &result.sweeps {
                    println!(
                        "  {} {:>2}  theta {:.4} rad ({:>6.2}°): {} regions, {} singletons, largest {}",
                        "Sweep".cyan(),
                        sweep.position,
                        sweep.theta_max,
                        sweep.theta_max.to_degrees(),
                        sweep.regions,
                        sweep.singletons,
                        sweep.largest_region
                    );
                }
                if let Some(path) = args.output {
                    output::success(
                        &format!("Labels and death times saved to {}", path.display()),
                        cli.format,
                        cli.quiet,
                    );
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args<'a>(theta: &'a [f64], divisors: &'a [f64]) -> SegmentArgs<'a> {
        SegmentArgs {
            input: Path::new("unused.json"),
            output: None,
            config: None,
            eps_min: Some(0.5),
            eps_max: None,
            eps_step: None,
            theta,
            theta_divisor: divisors,
            scope: Some(ScopeArg::Open),
            sequential: true,
            cache_neighbors: false,
            progress: false,
        }
    }

    #[test]
    fn test_flags_override_reference() {
        let config = resolve_config(&args(&[0.1, 0.2], &[])).unwrap();
        assert_eq!(config.eps_min, 0.5);
        assert_eq!(config.eps_max, 20.0);
        assert_eq!(config.tolerances(), vec![0.1, 0.2]);
        assert_eq!(config.scope, MergeScope::Open);
        assert!(!config.parallel_sweeps);
    }

    #[test]
    fn test_divisors_flag() {
        let config = resolve_config(&args(&[], &[4.0])).unwrap();
        assert_eq!(config.tolerances(), vec![std::f64::consts::PI / 4.0]);
    }

    #[test]
    fn test_config_file_then_flags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sweep.toml");
        SweepConfig::new(0.1, 3.0, 0.1, vec![0.3]).save_toml(&path).unwrap();

        let mut a = args(&[], &[]);
        a.config = Some(&path);
        let config = resolve_config(&a).unwrap();
        assert_eq!(config.eps_min, 0.5);
        assert_eq!(config.eps_max, 3.0);
        assert_eq!(config.tolerances(), vec![0.3]);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let mut a = args(&[], &[]);
        a.eps_step = Some(-1.0);
        assert!(resolve_config(&a).is_err());
    }

    #[test]
    fn test_death_times_serialize_as_null() {
        let json = serde_json::to_string(&SweepResult {
            position: 0,
            theta_max: 0.5,
            regions: 2,
            singletons: 1,
            merged_vertices: 2,
            largest_region: 2,
            labels: vec![0, 0, 2],
            death_times: vec![None, Some(1.0), None],
        })
        .unwrap();
        assert!(json.contains("\"death_times\":[null,1.0,null]"));
    }
}
