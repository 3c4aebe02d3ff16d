//! Shared "paths pipeline" logic used by both CLI and TUI front-ends.
//!
//! Loading is split from rendering:
//! sheets -> normalize (cached) -> join            once per source load (`Dataset`)
//! filter -> build trajectories -> describe paths  once per request (`run_paths`)
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::{
    ColorToken, DateRange, DuplicatePolicy, JointTable, MetricName, PairKind, RegionFilter, resolve_colors,
};
use crate::error::{CoreError, CoreResult};
use crate::io::{SheetSource, SourceCache};
use crate::render::{RenderOutcome, assemble};
use crate::reshape::join;
use crate::trajectory::{Trajectories, build};

/// How many regions are selected when the caller picks none.
pub const DEFAULT_REGION_COUNT: usize = 5;

/// Label of the identifying column in the weekly index workbook.
pub const DEFAULT_ID_COLUMN: &str = "구분";

/// Where the sheets live and how to read them.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub sale: PathBuf,
    pub rent: PathBuf,
    pub sale_change: Option<PathBuf>,
    pub rent_change: Option<PathBuf>,
    /// 0-based physical rows to drop before the header, applied to every sheet.
    pub skip_rows: Vec<usize>,
    pub id_column: String,
}

impl SourceConfig {
    fn sheet(&self, metric: MetricName, path: &PathBuf) -> SheetSource {
        let label = match metric {
            MetricName::SaleIndex => "sale index",
            MetricName::RentIndex => "rent index",
            MetricName::SaleChangePct => "sale change",
            MetricName::RentChangePct => "rent change",
        };
        SheetSource::new(label, path.clone(), &self.skip_rows)
    }
}

/// Joined base tables, invariant across filter changes.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub indices: Arc<JointTable>,
    pub changes: Option<Arc<JointTable>>,
}

impl Dataset {
    /// Load (or reuse from `cache`) every configured sheet and join them.
    pub fn load(cache: &mut SourceCache, config: &SourceConfig) -> CoreResult<Self> {
        let indices = load_index_table(cache, config)?;
        let changes = load_change_tables(cache, config)?;
        debug!(
            index_rows = indices.len(),
            change_rows = changes.as_ref().map(JointTable::len),
            "dataset loaded"
        );
        Ok(Self {
            indices: Arc::new(indices),
            changes: changes.map(Arc::new),
        })
    }

    pub fn table(&self, kind: PairKind) -> Option<&JointTable> {
        match kind {
            PairKind::Index => Some(self.indices.as_ref()),
            PairKind::Change => self.changes.as_deref(),
        }
    }

    /// Regions in sheet order.
    pub fn regions(&self) -> Vec<String> {
        self.indices.regions()
    }

    pub fn date_span(&self) -> Option<DateRange> {
        self.indices.date_span()
    }

    /// First few regions in sheet order.
    pub fn default_filter(&self) -> RegionFilter {
        RegionFilter::new(self.regions().into_iter().take(DEFAULT_REGION_COUNT))
    }

    /// Reject filters naming regions that are not in the data.
    pub fn check_regions(&self, filter: &RegionFilter) -> CoreResult<()> {
        let known = self.regions();
        match filter.iter().find(|r| !known.iter().any(|k| k == r)) {
            Some(unknown) => Err(CoreError::UnknownRegion(unknown.to_string())),
            None => Ok(()),
        }
    }
}

/// Normalize and join the two index sheets.
pub fn load_index_table(cache: &mut SourceCache, config: &SourceConfig) -> CoreResult<JointTable> {
    let sale = cache.load(
        &config.sheet(MetricName::SaleIndex, &config.sale),
        &config.id_column,
        MetricName::SaleIndex,
    )?;
    let rent = cache.load(
        &config.sheet(MetricName::RentIndex, &config.rent),
        &config.id_column,
        MetricName::RentIndex,
    )?;
    join(&sale, &rent)
}

/// Normalize and join the change sheets, if both are configured.
///
/// `Ok(None)` means the feature is unavailable; a configured sheet that fails
/// to load is still an error.
pub fn load_change_tables(cache: &mut SourceCache, config: &SourceConfig) -> CoreResult<Option<JointTable>> {
    let (sale_path, rent_path) = match (&config.sale_change, &config.rent_change) {
        (Some(s), Some(r)) => (s, r),
        (None, None) => return Ok(None),
        (Some(_), None) | (None, Some(_)) => {
            warn!("only one change sheet configured; change tables disabled");
            return Ok(None);
        }
    };

    let sale = cache.load(
        &config.sheet(MetricName::SaleChangePct, sale_path),
        &config.id_column,
        MetricName::SaleChangePct,
    )?;
    let rent = cache.load(
        &config.sheet(MetricName::RentChangePct, rent_path),
        &config.id_column,
        MetricName::RentChangePct,
    )?;
    join(&sale, &rent).map(Some)
}

/// One filter selection from the UI.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub kind: PairKind,
    pub range: DateRange,
    pub regions: RegionFilter,
    pub colors: HashMap<String, ColorToken>,
    pub duplicates: DuplicatePolicy,
}

impl RenderRequest {
    /// Full date span and the default regions, or `None` when there is no data at all.
    pub fn defaults_for(dataset: &Dataset) -> Option<Self> {
        Some(Self {
            kind: PairKind::Index,
            range: dataset.date_span()?,
            regions: dataset.default_filter(),
            colors: HashMap::new(),
            duplicates: DuplicatePolicy::default(),
        })
    }
}

/// All computed outputs of a single request.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub trajectories: Trajectories,
    pub outcome: RenderOutcome,
    /// Change-space trajectories for the same filter, when change tables exist.
    pub changes: Option<Trajectories>,
}

/// Build trajectories and descriptors for `request`.
pub fn run_paths(dataset: &Dataset, request: &RenderRequest) -> CoreResult<RunOutput> {
    let table = dataset.table(request.kind).ok_or(CoreError::ChangeTablesUnavailable)?;

    let trajectories = build(table, &request.regions, request.range, request.duplicates)?;
    let colors = resolve_colors(&request.regions, &request.colors);
    let outcome = assemble(request.kind, request.range, &trajectories, &request.regions, &colors);

    let changes = match &dataset.changes {
        Some(changes) if request.kind == PairKind::Index => {
            Some(build(changes, &request.regions, request.range, request.duplicates)?)
        }
        _ => None,
    };

    Ok(RunOutput {
        trajectories,
        outcome,
        changes,
    })
}
