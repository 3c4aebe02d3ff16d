//! Plain-text formatting of render outcomes and dataset listings.

use crate::app::pipeline::{Dataset, RenderRequest, RunOutput};
use crate::domain::{DuplicatePolicy, PairKind};
use crate::render::{DirectionSegment, EMPTY_MESSAGE, PathDescriptor};
use crate::trajectory::Trajectories;

/// Title, request line and one row per drawn path.
pub fn format_paths_summary(run: &RunOutput, request: &RenderRequest) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== rsp - {} ===\n", run.outcome.title()));
    out.push_str(&format!(
        "Space: {} | regions: {} | duplicates: {}\n",
        request.kind.display_name(),
        request.regions.len(),
        match request.duplicates {
            DuplicatePolicy::Keep => "keep",
            DuplicatePolicy::Reject => "reject",
        }
    ));
    out.push('\n');

    if run.outcome.is_empty() {
        out.push_str(EMPTY_MESSAGE);
        out.push('\n');
        return out;
    }

    out.push_str(&format_path_table(run.outcome.paths(), request.kind, run.changes.as_ref()));
    out
}

fn format_path_table(paths: &[PathDescriptor], kind: PairKind, changes: Option<&Trajectories>) -> String {
    let mut out = String::new();

    let mut header = format!(
        "{:<16} {:>6} {:<10} {:>18} {:<10} {:>18} {:^3}",
        "region", "points", "start", "(sale, rent)", "current", "(sale, rent)", "dir"
    );
    if changes.is_some() {
        header.push_str(&format!(" {:>18}", "latest change %"));
    }
    out.push_str(header.trim_end());
    out.push('\n');

    let mut rule = format!(
        "{:-<16} {:-<6} {:-<10} {:-<18} {:-<10} {:-<18} {:-<3}",
        "", "", "", "", "", "", ""
    );
    if changes.is_some() {
        rule.push_str(&format!(" {:-<18}", ""));
    }
    out.push_str(&rule);
    out.push('\n');

    for p in paths {
        let mut row = format!(
            "{:<16} {:>6} {:<10} {:>18} {:<10} {:>18} {:^3}",
            truncate(&p.region, 16),
            p.vertices.len(),
            p.start.date.format("%Y-%m-%d"),
            fmt_pair(p.start.at.x, p.start.at.y, kind),
            p.current.date.format("%Y-%m-%d"),
            fmt_pair(p.current.at.x, p.current.at.y, kind),
            direction_arrow(p.direction.as_ref()),
        );
        if let Some(changes) = changes {
            let latest = changes
                .get(&p.region)
                .map(|t| fmt_pair(t.last.sale, t.last.rent, PairKind::Change))
                .unwrap_or_else(|| "n/a".to_string());
            row.push_str(&format!(" {latest:>18}"));
        }
        out.push_str(row.trim_end());
        out.push('\n');
    }

    out
}

/// Region list, date span and table sizes of a loaded dataset.
pub fn format_regions(dataset: &Dataset) -> String {
    let mut out = String::new();
    let regions = dataset.regions();

    match dataset.date_span() {
        Some(span) => out.push_str(&format!("Dates: {span}\n")),
        None => out.push_str("Dates: (no joined rows)\n"),
    }
    out.push_str(&format!("Index rows: {}\n", dataset.indices.len()));
    match &dataset.changes {
        Some(changes) => out.push_str(&format!("Change rows: {}\n", changes.len())),
        None => out.push_str("Change rows: (not loaded)\n"),
    }

    out.push_str(&format!("\nRegions ({}):\n", regions.len()));
    let default_count = dataset.default_filter().len();
    for (idx, region) in regions.iter().enumerate() {
        let marker = if idx < default_count { "*" } else { " " };
        out.push_str(&format!("{marker} {:>3}) {region}\n", idx + 1));
    }
    if !regions.is_empty() {
        out.push_str("(* shown when no --region is given)\n");
    }

    out
}

/// Arrow for the last step of a path, by sign of the sale and rent deltas.
pub fn direction_arrow(direction: Option<&DirectionSegment>) -> &'static str {
    let Some(seg) = direction else {
        return "-";
    };
    let dx = seg.to.x - seg.from.x;
    let dy = seg.to.y - seg.from.y;
    match (dx.partial_cmp(&0.0), dy.partial_cmp(&0.0)) {
        (Some(std::cmp::Ordering::Greater), Some(std::cmp::Ordering::Greater)) => "↗",
        (Some(std::cmp::Ordering::Greater), Some(std::cmp::Ordering::Less)) => "↘",
        (Some(std::cmp::Ordering::Less), Some(std::cmp::Ordering::Greater)) => "↖",
        (Some(std::cmp::Ordering::Less), Some(std::cmp::Ordering::Less)) => "↙",
        (Some(std::cmp::Ordering::Greater), _) => "→",
        (Some(std::cmp::Ordering::Less), _) => "←",
        (_, Some(std::cmp::Ordering::Greater)) => "↑",
        (_, Some(std::cmp::Ordering::Less)) => "↓",
        _ => "·",
    }
}

fn fmt_pair(sale: f64, rent: f64, kind: PairKind) -> String {
    match kind {
        PairKind::Index => format!("{sale:.2}, {rent:.2}"),
        PairKind::Change => format!("{sale:+.2}, {rent:+.2}"),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}
