//! Shared domain types.
//!
//! These types are kept small and serializable so they can be:
//!
//! - passed between the reshape, join and trajectory stages
//! - exported to JSON for an external chart renderer
//! - reused unchanged by the CLI and TUI front-ends

use std::fmt;

use chrono::NaiveDate;
use clap::ValueEnum;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Which side of the sale/rent pair a metric belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Sale,
    Rent,
}

/// Whether a joined table holds index levels or period-over-period changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PairKind {
    /// Absolute index levels.
    Index,
    /// Percentage change versus the previous period.
    Change,
}

impl PairKind {
    /// The (sale, rent) metrics that make up this pair.
    pub fn metrics(self) -> (MetricName, MetricName) {
        match self {
            PairKind::Index => (MetricName::SaleIndex, MetricName::RentIndex),
            PairKind::Change => (MetricName::SaleChangePct, MetricName::RentChangePct),
        }
    }

    /// Axis labels as (x, y).
    pub fn axis_labels(self) -> (&'static str, &'static str) {
        match self {
            PairKind::Index => ("sale index", "rent index"),
            PairKind::Change => ("sale change %", "rent change %"),
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            PairKind::Index => "index",
            PairKind::Change => "change",
        }
    }
}

/// The metric carried by one normalized sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricName {
    SaleIndex,
    RentIndex,
    SaleChangePct,
    RentChangePct,
}

impl MetricName {
    pub fn side(self) -> Side {
        match self {
            MetricName::SaleIndex | MetricName::SaleChangePct => Side::Sale,
            MetricName::RentIndex | MetricName::RentChangePct => Side::Rent,
        }
    }

    pub fn kind(self) -> PairKind {
        match self {
            MetricName::SaleIndex | MetricName::RentIndex => PairKind::Index,
            MetricName::SaleChangePct | MetricName::RentChangePct => PairKind::Change,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MetricName::SaleIndex => "sale_index",
            MetricName::RentIndex => "rent_index",
            MetricName::SaleChangePct => "sale_change_pct",
            MetricName::RentChangePct => "rent_change_pct",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the trajectory builder treats two points with the same date for one region.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Keep every point; equal dates stay in input order.
    #[default]
    Keep,
    /// Fail the build with `CoreError::DuplicateDate`.
    Reject,
}

/// One (date, region) observation of a single metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub date: NaiveDate,
    pub region: String,
    pub metric_name: MetricName,
    pub value: f64,
}

/// All records normalized from one sheet.
///
/// The metric is kept alongside the records so an empty series still knows
/// what it would have contained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSeries {
    pub metric: MetricName,
    /// Label of the sheet the records came from (used in messages).
    pub source: String,
    pub records: Vec<MetricRecord>,
}

impl MetricSeries {
    pub fn empty(metric: MetricName, source: impl Into<String>) -> Self {
        Self {
            metric,
            source: source.into(),
            records: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A sale-side and rent-side value sharing one (date, region) key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointRecord {
    pub date: NaiveDate,
    pub region: String,
    pub sale: f64,
    pub rent: f64,
}

/// Output of the series joiner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointTable {
    pub kind: PairKind,
    pub records: Vec<JointRecord>,
}

impl JointTable {
    pub fn empty(kind: PairKind) -> Self {
        Self {
            kind,
            records: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct regions in order of first appearance.
    pub fn regions(&self) -> Vec<String> {
        let mut seen: IndexSet<&str> = IndexSet::new();
        for r in &self.records {
            seen.insert(r.region.as_str());
        }
        seen.into_iter().map(str::to_string).collect()
    }

    /// Earliest and latest date in the table, if any.
    pub fn date_span(&self) -> Option<DateRange> {
        let start = self.records.iter().map(|r| r.date).min()?;
        let end = self.records.iter().map(|r| r.date).max()?;
        Some(DateRange { start, end })
    }
}

/// Inclusive date window `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> CoreResult<Self> {
        if start > end {
            return Err(CoreError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ~ {}",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }
}

/// Ordered set of selected regions. Order is selection order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionFilter {
    regions: IndexSet<String>,
}

impl RegionFilter {
    pub fn new<I, S>(regions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            regions: regions.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, region: &str) -> bool {
        self.regions.contains(region)
    }

    /// Selection index of a region (drives the default palette).
    pub fn position(&self, region: &str) -> Option<usize> {
        self.regions.get_index_of(region)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.regions.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Add the region if absent, remove it if present. Returns `true` when added.
    pub fn toggle(&mut self, region: &str) -> bool {
        if self.regions.shift_remove(region) {
            false
        } else {
            self.regions.insert(region.to_string());
            true
        }
    }
}

/// One vertex of a trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    pub date: NaiveDate,
    pub sale: f64,
    pub rent: f64,
}

/// Date-ordered (sale, rent) path of one region plus its landmarks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub region: String,
    pub points: Vec<TrajectoryPoint>,
    pub first: TrajectoryPoint,
    pub last: TrajectoryPoint,
    /// The point right before `last`; `None` with fewer than two points.
    pub second_to_last: Option<TrajectoryPoint>,
}

impl Trajectory {
    /// Build from points already sorted by date. Returns `None` when empty.
    pub fn from_sorted(region: impl Into<String>, points: Vec<TrajectoryPoint>) -> Option<Self> {
        let first = *points.first()?;
        let last = *points.last()?;
        let second_to_last = points.len().checked_sub(2).map(|i| points[i]);
        Some(Self {
            region: region.into(),
            points,
            first,
            last,
            second_to_last,
        })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
