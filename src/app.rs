//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and installs tracing
//! - parses CLI arguments
//! - loads and joins the sheets
//! - turns filter flags into a render request
//! - prints reports/plots and writes optional exports

use std::collections::HashMap;

use clap::Parser;
use tracing::{info, warn};

use crate::cli::{Command, FilterArgs, PathsArgs, PlotArgs, SourceArgs, ViewArgs};
use crate::domain::{DateRange, RegionFilter, parse_color_override};
use crate::error::{AppError, CoreError};
use crate::io::SourceCache;
use crate::render::EMPTY_MESSAGE;

pub mod pipeline;

use pipeline::{Dataset, RenderRequest, RunOutput};

/// Entry point for the `rsp` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    let _ = crate::telemetry::init_tracing();

    // We want `rsp` and `rsp -s sale.csv -r rent.csv` to behave like `rsp tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Paths(args) => handle_paths(args),
        Command::Regions(args) => handle_regions(args),
        Command::Plot(args) => handle_plot(args),
        Command::Tui(args) => handle_tui(args),
    }
}

fn handle_paths(args: PathsArgs) -> Result<(), AppError> {
    let (dataset, request) = load_view(&args.view)?;
    let Some(request) = request else {
        println!("{EMPTY_MESSAGE}");
        if args.export.is_some() || args.export_table.is_some() {
            warn!("joined table is empty; nothing exported");
        }
        return Ok(());
    };

    let run = pipeline::run_paths(&dataset, &request)?;
    println!("{}", crate::report::format_paths_summary(&run, &request));

    if let Some(path) = &args.export {
        crate::io::write_outcome_json(path, &run.outcome)?;
        info!(path = %path.display(), "wrote path descriptors");
    }
    if let Some(path) = &args.export_table {
        // `load_view` already rejected a change space without change tables.
        if let Some(table) = dataset.table(request.kind) {
            crate::io::write_joint_csv(path, table)?;
            info!(path = %path.display(), rows = table.len(), "wrote joined table");
        }
    }

    Ok(())
}

fn handle_regions(args: SourceArgs) -> Result<(), AppError> {
    let mut cache = SourceCache::new();
    let dataset = Dataset::load(&mut cache, &args.to_config())?;
    println!("{}", crate::report::format_regions(&dataset));
    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let (dataset, request) = load_view(&args.view)?;
    let Some(request) = request else {
        println!("{EMPTY_MESSAGE}");
        return Ok(());
    };

    let RunOutput { outcome, .. } = pipeline::run_paths(&dataset, &request)?;
    println!("{}", crate::plot::render_ascii_plot(&outcome, args.width, args.height));
    Ok(())
}

fn handle_tui(args: ViewArgs) -> Result<(), AppError> {
    crate::tui::run(args)
}

fn load_view(view: &ViewArgs) -> Result<(Dataset, Option<RenderRequest>), AppError> {
    let mut cache = SourceCache::new();
    let dataset = Dataset::load(&mut cache, &view.source.to_config())?;
    let request = request_from_args(&dataset, &view.filter)?;
    Ok((dataset, request))
}

/// Turn filter flags into a request against `dataset`.
///
/// Unset dates fall back to the span of the selected space, unset regions to
/// the default selection. Returns `Ok(None)` when the selected space has no
/// rows at all (nothing to default the window to).
pub fn request_from_args(dataset: &Dataset, filter: &FilterArgs) -> Result<Option<RenderRequest>, CoreError> {
    let table = dataset.table(filter.space).ok_or(CoreError::ChangeTablesUnavailable)?;

    let regions = if filter.regions.is_empty() {
        dataset.default_filter()
    } else {
        let regions = RegionFilter::new(filter.regions.iter().cloned());
        dataset.check_regions(&regions)?;
        regions
    };

    let mut colors = HashMap::new();
    for raw in &filter.colors {
        let (region, color) = parse_color_override(raw)?;
        colors.insert(region, color);
    }

    // A defaulted bound never crosses an explicit one: `--from` past the data
    // yields an empty window, not an inverted range.
    let span = table.date_span();
    let start = filter
        .from
        .or_else(|| span.map(|s| filter.to.map_or(s.start, |to| s.start.min(to))));
    let end = filter
        .to
        .or_else(|| span.map(|s| filter.from.map_or(s.end, |from| s.end.max(from))));
    let (Some(start), Some(end)) = (start, end) else {
        return Ok(None);
    };

    Ok(Some(RenderRequest {
        kind: filter.space,
        range: DateRange::new(start, end)?,
        regions,
        colors,
        duplicates: filter.duplicates,
    }))
}

/// Rewrite argv so `rsp` defaults to `rsp tui`.
///
/// Rules:
/// - `rsp`                      -> `rsp tui`
/// - `rsp -s a.csv -r b.csv`    -> `rsp tui -s a.csv -r b.csv`
/// - `rsp --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "paths" | "regions" | "plot" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    argv
}
