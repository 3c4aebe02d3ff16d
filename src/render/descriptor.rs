//! Render-agnostic path descriptors.
//!
//! A `PathDescriptor` is everything a chart renderer needs to draw one
//! region's path in sale×rent space. Nothing here filters, sorts or computes:
//! it only reshapes a finished `Trajectory` plus its color.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{ColorToken, DateRange, PairKind, Trajectory, TrajectoryPoint};

/// A point in chart space (`x` = sale value, `y` = rent value).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
}

impl From<&TrajectoryPoint> for Vertex {
    fn from(p: &TrajectoryPoint) -> Self {
        Self { x: p.sale, y: p.rent }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LandmarkKind {
    Start,
    Current,
}

/// A distinguished vertex (path start or current end).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub kind: LandmarkKind,
    pub at: Vertex,
    pub date: NaiveDate,
    /// Text drawn next to the marker, if any.
    pub label: Option<String>,
}

/// Segment from the second-to-last to the last vertex.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirectionSegment {
    pub from: Vertex,
    pub to: Vertex,
}

/// Tooltip content for one vertex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoverLabel {
    pub region: String,
    pub date: NaiveDate,
    pub sale: f64,
    pub rent: f64,
}

impl fmt::Display for HoverLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {} | sale {:.2} | rent {:.2}",
            self.region,
            self.date.format("%Y-%m-%d"),
            self.sale,
            self.rent
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathDescriptor {
    pub region: String,
    pub color: ColorToken,
    pub vertices: Vec<Vertex>,
    pub start: Landmark,
    pub current: Landmark,
    pub direction: Option<DirectionSegment>,
    /// One entry per vertex, same order.
    pub hover: Vec<HoverLabel>,
}

/// Assemble the descriptor for one trajectory.
pub fn describe(trajectory: &Trajectory, color: ColorToken) -> PathDescriptor {
    let vertices = trajectory.points.iter().map(Vertex::from).collect();
    let hover = trajectory
        .points
        .iter()
        .map(|p| HoverLabel {
            region: trajectory.region.clone(),
            date: p.date,
            sale: p.sale,
            rent: p.rent,
        })
        .collect();

    let direction = trajectory.second_to_last.as_ref().map(|prev| DirectionSegment {
        from: Vertex::from(prev),
        to: Vertex::from(&trajectory.last),
    });

    PathDescriptor {
        region: trajectory.region.clone(),
        color,
        vertices,
        start: Landmark {
            kind: LandmarkKind::Start,
            at: Vertex::from(&trajectory.first),
            date: trajectory.first.date,
            label: None,
        },
        current: Landmark {
            kind: LandmarkKind::Current,
            at: Vertex::from(&trajectory.last),
            date: trajectory.last.date,
            label: Some(trajectory.region.clone()),
        },
        direction,
        hover,
    }
}

/// Chart title for the effective date window.
pub fn chart_title(kind: PairKind, range: DateRange) -> String {
    match kind {
        PairKind::Index => format!("Sale/rent index path ({range})"),
        PairKind::Change => format!("Sale/rent change path ({range})"),
    }
}
