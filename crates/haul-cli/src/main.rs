//! `haul`: import a survey, plan haul routes until the site balances (or a
//! route limit), print the cut/fill band histogram and write the survey
//! export.
//!
//! Logging goes through `tracing`; set `RUST_LOG` (default `haul=info`).

mod regions;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use haul_core::units::{cubic_meters_to_cubic_yards, feet_to_meters};
use haul_grid::{CutFillBand, GridGraph, RegionSet};
use haul_io::{ImportOptions, export_survey, spawn_import};
use haul_planner::{HaulPlanner, PlannerConfig, PlannerEvent};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Seven-column survey CSV.
    input: PathBuf,

    /// Survey grid spacing in feet.
    #[arg(long, default_value_t = 5.0)]
    grid_size_ft: f64,

    /// Planner configuration (JSON); missing fields take their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Regions a route may not cross (JSON array of named polygons).
    #[arg(long)]
    regions: Option<PathBuf>,

    /// Where to write the survey export.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Stop after this many routes.
    #[arg(long)]
    max_routes: Option<u64>,

    /// RNG seed for a reproducible plan.
    #[arg(long)]
    seed: Option<u64>,

    /// Log progress every this many routes.
    #[arg(long, default_value_t = 500)]
    report_every: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("haul=info")),
        )
        .init();

    let args = Args::parse();
    if !(args.grid_size_ft.is_finite() && args.grid_size_ft > 0.0) {
        bail!("--grid-size-ft must be positive, got {}", args.grid_size_ft);
    }

    let config = planner_config(&args)?;
    let regions = match &args.regions {
        Some(path) => regions::load_regions(path)?,
        None => RegionSet::new(),
    };

    let grid = import(&args.input, args.grid_size_ft)?;
    print_histogram("before", &grid);

    let planned = plan(grid, regions, config, args.report_every.max(1))?;
    print_histogram("after", &planned);

    if let Some(out) = &args.output {
        export_survey(&planned, out).with_context(|| format!("writing {}", out.display()))?;
        info!(path = %out.display(), "survey exported");
    }
    Ok(())
}

fn planner_config(args: &Args) -> Result<PlannerConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading planner config {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("parsing planner config {}", path.display()))?
        }
        None => PlannerConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if args.max_routes.is_some() {
        config.max_routes = args.max_routes;
    }
    config.validate()?;
    Ok(config)
}

fn import(path: &Path, grid_size_ft: f64) -> Result<GridGraph> {
    let options = ImportOptions {
        grid_spacing_m: feet_to_meters(grid_size_ft),
        ..ImportOptions::default()
    };
    let mut last = 0;
    let grid = spawn_import(path, options)
        .context("starting import worker")?
        .wait_with(|pct| {
            if pct >= last + 10 {
                info!(percent = pct, "importing");
                last = pct;
            }
        })
        .with_context(|| format!("importing {}", path.display()))?;
    Ok(grid)
}

fn plan(grid: GridGraph, regions: RegionSet, config: PlannerConfig, every: u64) -> Result<GridGraph> {
    let mut planner = HaulPlanner::new();
    let events = planner.start(grid, regions, config)?;

    for event in events.iter() {
        match event {
            PlannerEvent::Started { entries } => info!(entries, "planning"),
            PlannerEvent::RouteApplied(route) if (route.sequence + 1) % every == 0 => {
                let p = planner.progress();
                info!(
                    routes = p.routes_applied,
                    cut_yd3 = cubic_meters_to_cubic_yards(p.cut_m3),
                    "planning progress"
                );
            }
            PlannerEvent::RouteApplied(_) => {}
            PlannerEvent::Finished(summary) => info!(
                outcome = ?summary.outcome,
                routes = summary.routes_applied,
                cut_yd3 = cubic_meters_to_cubic_yards(summary.cut_m3),
                fill_yd3 = cubic_meters_to_cubic_yards(summary.fill_m3),
                "plan finished"
            ),
            PlannerEvent::Failed(msg) => warn!(error = %msg, "plan failed"),
        }
    }

    match planner.join() {
        Some(result) => Ok(result?.grid),
        None => bail!("planner produced no result"),
    }
}

fn print_histogram(title: &str, grid: &GridGraph) {
    let counts = grid.band_histogram();
    println!("{title}: {} grid points", grid.len());
    for band in CutFillBand::ALL {
        println!("  {:<16} {:>8}", band.label(), counts[band.index()]);
    }
    println!(
        "  remaining cut {:.1} yd³, fill {:.1} yd³",
        cubic_meters_to_cubic_yards(grid.remaining_cut_m3()),
        cubic_meters_to_cubic_yards(grid.remaining_fill_m3()),
    );
}
