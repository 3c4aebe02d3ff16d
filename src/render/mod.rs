//! Render boundary: what the chart collaborators receive.
//!
//! - one `PathDescriptor` per region trajectory (`descriptor`)
//! - a `RenderOutcome` that is either a titled set of paths or an explicit
//!   empty state (no data after filtering is a normal result, not an error)

use serde::{Deserialize, Serialize};

use crate::domain::{ColorAssignment, DateRange, PairKind, RegionFilter, default_color};
use crate::trajectory::Trajectories;

pub mod descriptor;

pub use descriptor::*;

/// User-facing message for an empty result.
pub const EMPTY_MESSAGE: &str = "No data matches the selected filters. Choose another date range or region.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Axes {
    pub x: String,
    pub y: String,
}

impl Axes {
    pub fn for_kind(kind: PairKind) -> Self {
        let (x, y) = kind.axis_labels();
        Self {
            x: x.to_string(),
            y: y.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RenderOutcome {
    Empty {
        title: String,
    },
    Paths {
        title: String,
        axes: Axes,
        paths: Vec<PathDescriptor>,
    },
}

impl RenderOutcome {
    pub fn title(&self) -> &str {
        match self {
            RenderOutcome::Empty { title } | RenderOutcome::Paths { title, .. } => title.as_str(),
        }
    }

    /// Descriptors to draw; empty for the empty state.
    pub fn paths(&self) -> &[PathDescriptor] {
        match self {
            RenderOutcome::Empty { .. } => &[],
            RenderOutcome::Paths { paths, .. } => paths.as_slice(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, RenderOutcome::Empty { .. })
    }
}

/// Turn built trajectories into the outcome handed to a renderer.
///
/// Regions missing from `colors` fall back to the palette slot of their
/// position in `filter`, so a color never depends on which regions had data.
pub fn assemble(
    kind: PairKind,
    range: DateRange,
    trajectories: &Trajectories,
    filter: &RegionFilter,
    colors: &ColorAssignment,
) -> RenderOutcome {
    let title = chart_title(kind, range);
    if trajectories.is_empty() {
        return RenderOutcome::Empty { title };
    }

    let paths = trajectories
        .values()
        .enumerate()
        .map(|(idx, t)| {
            let color = colors
                .get(&t.region)
                .cloned()
                .unwrap_or_else(|| default_color(filter.position(&t.region).unwrap_or(idx)));
            describe(t, color)
        })
        .collect();

    RenderOutcome::Paths {
        title,
        axes: Axes::for_kind(kind),
        paths,
    }
}
