//! Command-line parsing for the sale/rent path viewer.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! reshape/trajectory code. Source locations can also come from the
//! environment (or a `.env` file), so a configured shell only needs `rsp`.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::app::pipeline::{DEFAULT_ID_COLUMN, SourceConfig};
use crate::domain::{DuplicatePolicy, PairKind};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "rsp", version, about = "Sale/rent index paths per region")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the path summary per region, and optionally export descriptors.
    Paths(PathsArgs),
    /// List the regions and date span of the joined data.
    Regions(SourceArgs),
    /// Draw the paths as an ASCII chart.
    Plot(PlotArgs),
    /// Launch the interactive TUI.
    ///
    /// Same pipeline as `rsp paths`, rendered with Ratatui; the window, regions
    /// and space can be changed without reloading the sheets.
    Tui(ViewArgs),
}

/// Where the sheets are and how to read them.
#[derive(Debug, Args, Clone)]
pub struct SourceArgs {
    /// Sale index sheet (CSV, dates down, regions across).
    #[arg(short = 's', long, value_name = "CSV", env = "RSP_SALE_CSV")]
    pub sale: PathBuf,

    /// Rent index sheet.
    #[arg(short = 'r', long, value_name = "CSV", env = "RSP_RENT_CSV")]
    pub rent: PathBuf,

    /// Sale change (%) sheet. Needs `--rent-change` as well.
    #[arg(long, value_name = "CSV", env = "RSP_SALE_CHANGE_CSV")]
    pub sale_change: Option<PathBuf>,

    /// Rent change (%) sheet. Needs `--sale-change` as well.
    #[arg(long, value_name = "CSV", env = "RSP_RENT_CHANGE_CSV")]
    pub rent_change: Option<PathBuf>,

    /// 0-based physical rows to drop before the header (e.g. `0,2,3`).
    #[arg(long, value_name = "ROWS", value_delimiter = ',', env = "RSP_SKIP_ROWS")]
    pub skip_rows: Vec<usize>,

    /// Name of the date column.
    #[arg(long, default_value = DEFAULT_ID_COLUMN, env = "RSP_ID_COLUMN")]
    pub id_column: String,
}

impl SourceArgs {
    pub fn to_config(&self) -> SourceConfig {
        SourceConfig {
            sale: self.sale.clone(),
            rent: self.rent.clone(),
            sale_change: self.sale_change.clone(),
            rent_change: self.rent_change.clone(),
            skip_rows: self.skip_rows.clone(),
            id_column: self.id_column.clone(),
        }
    }
}

/// What to draw.
#[derive(Debug, Args, Clone)]
pub struct FilterArgs {
    /// First date of the window (inclusive). Defaults to the first date in the data.
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub from: Option<NaiveDate>,

    /// Last date of the window (inclusive). Defaults to the last date in the data.
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub to: Option<NaiveDate>,

    /// Region to include (repeatable). Defaults to the first five regions.
    #[arg(long = "region", value_name = "NAME")]
    pub regions: Vec<String>,

    /// Color override, e.g. `--color North=#ff0000` (repeatable).
    #[arg(long = "color", value_name = "REGION=#RRGGBB")]
    pub colors: Vec<String>,

    /// Plot absolute indices or percentage changes.
    #[arg(long, value_enum, default_value_t = PairKind::Index)]
    pub space: PairKind,

    /// What to do when a region has two rows for the same date.
    #[arg(long, value_enum, default_value_t = DuplicatePolicy::Keep)]
    pub duplicates: DuplicatePolicy,
}

/// Sources plus filters; shared by the viewers.
#[derive(Debug, Args, Clone)]
pub struct ViewArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub filter: FilterArgs,
}

#[derive(Debug, Args, Clone)]
pub struct PathsArgs {
    #[command(flatten)]
    pub view: ViewArgs,

    /// Export the path descriptors (title, axes, paths) to JSON.
    #[arg(long, value_name = "JSON")]
    pub export: Option<PathBuf>,

    /// Export the joined long table of the selected space to CSV.
    #[arg(long = "export-table", value_name = "CSV")]
    pub export_table: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct PlotArgs {
    #[command(flatten)]
    pub view: ViewArgs,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}
