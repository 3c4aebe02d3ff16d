//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - path segments: one glyph per path (`1`, `2`, ... then `a`, `b`, ...)
//! - start of a path: `+`
//! - current (last) point of a path: `@`

use crate::render::{EMPTY_MESSAGE, PathDescriptor, RenderOutcome, Vertex};

const PATH_GLYPHS: &str = "123456789abcdefghijklmnopqrstuvwxyz";
const START_GLYPH: char = '+';
const CURRENT_GLYPH: char = '@';

/// Render every path of `outcome` onto one grid, with a legend.
pub fn render_ascii_plot(outcome: &RenderOutcome, width: usize, height: usize) -> String {
    let mut out = String::new();
    out.push_str(outcome.title());
    out.push('\n');

    let RenderOutcome::Paths { axes, paths, .. } = outcome else {
        out.push_str(EMPTY_MESSAGE);
        out.push('\n');
        return out;
    };

    let width = width.max(10);
    let height = height.max(5);

    let all = || paths.iter().flat_map(|p| p.vertices.iter());
    let (x_min, x_max) = value_range(all().map(|v| v.x)).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = value_range(all().map(|v| v.y)).unwrap_or((0.0, 1.0));
    let (x_min, x_max) = pad_range(x_min, x_max, 0.05);
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];
    let to_cell = |v: &Vertex| (map_x(v.x, x_min, x_max, width), map_y(v.y, y_min, y_max, height));

    // Lines first, then landmarks on top; current markers win over start markers.
    for (idx, path) in paths.iter().enumerate() {
        draw_path(&mut grid, path, path_glyph(idx), &to_cell);
    }
    for path in paths {
        let (x, y) = to_cell(&path.start.at);
        grid[y][x] = START_GLYPH;
    }
    for path in paths {
        let (x, y) = to_cell(&path.current.at);
        grid[y][x] = CURRENT_GLYPH;
    }

    out.push_str(&format!(
        "x: {} [{x_min:.2}, {x_max:.2}] | y: {} [{y_min:.2}, {y_max:.2}]\n",
        axes.x, axes.y
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    for (idx, path) in paths.iter().enumerate() {
        out.push_str(&format!(
            "{} {} {} {} -> {}\n",
            path_glyph(idx),
            path.region,
            path.color,
            path.start.date.format("%Y-%m-%d"),
            path.current.date.format("%Y-%m-%d"),
        ));
    }
    out.push_str(&format!("{START_GLYPH} start  {CURRENT_GLYPH} current\n"));

    out
}

fn path_glyph(idx: usize) -> char {
    let n = PATH_GLYPHS.chars().count();
    PATH_GLYPHS.chars().nth(idx % n).unwrap_or('*')
}

fn draw_path(
    grid: &mut [Vec<char>],
    path: &PathDescriptor,
    glyph: char,
    to_cell: &impl Fn(&Vertex) -> (usize, usize),
) {
    let mut prev = None;
    for v in &path.vertices {
        let (x, y) = to_cell(v);
        match prev {
            Some((x0, y0)) => draw_line(grid, x0, y0, x, y, glyph),
            None => {
                if grid[y][x] == ' ' {
                    grid[y][x] = glyph;
                }
            }
        }
        prev = Some((x, y));
    }
}

fn value_range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values {
        min = min.min(v);
        max = max.max(v);
    }
    if min.is_finite() && max.is_finite() {
        Some((min, max))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = if span > 0.0 { span * frac } else { min.abs().max(1.0) * frac };
    (min - pad, max + pad)
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham-ish). Only fills blank cells.
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::NaiveDate;

    use super::*;
    use crate::domain::{DateRange, PairKind, RegionFilter, Trajectory, TrajectoryPoint, resolve_colors};
    use crate::render::assemble;
    use crate::trajectory::Trajectories;

    fn point(day: u32, sale: f64, rent: f64) -> TrajectoryPoint {
        TrajectoryPoint {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            sale,
            rent,
        }
    }

    fn outcome(paths: &[(&str, Vec<TrajectoryPoint>)]) -> RenderOutcome {
        let mut trajectories = Trajectories::new();
        for (region, points) in paths {
            let t = Trajectory::from_sorted(*region, points.clone()).unwrap();
            trajectories.insert(region.to_string(), t);
        }
        let filter = RegionFilter::new(paths.iter().map(|(r, _)| *r));
        let range = DateRange::new(point(1, 0.0, 0.0).date, point(8, 0.0, 0.0).date).unwrap();
        assemble(
            PairKind::Index,
            range,
            &trajectories,
            &filter,
            &resolve_colors(&filter, &HashMap::new()),
        )
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let outcome = outcome(&[("North", vec![point(1, 100.0, 100.0), point(8, 110.0, 110.0)])]);

        let txt = render_ascii_plot(&outcome, 10, 5);
        let expected = concat!(
            "Sale/rent index path (2024-01-01 ~ 2024-01-08)\n",
            "x: sale index [99.50, 110.50] | y: rent index [99.50, 110.50]\n",
            "        1@\n",
            "      11  \n",
            "    11    \n",
            "  11      \n",
            "+1        \n",
            "1 North #636efa 2024-01-01 -> 2024-01-08\n",
            "+ start  @ current\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn each_path_gets_its_own_glyph() {
        let outcome = outcome(&[
            ("North", vec![point(1, 100.0, 100.0), point(8, 110.0, 100.0)]),
            ("South", vec![point(1, 100.0, 110.0), point(8, 110.0, 110.0)]),
        ]);
        let txt = render_ascii_plot(&outcome, 20, 6);
        let rows: Vec<&str> = txt.lines().skip(2).take(6).map(str::trim).collect();
        assert!(rows[0].starts_with('+') && rows[0].contains('2') && rows[0].ends_with('@'));
        assert!(rows[5].starts_with('+') && rows[5].contains('1') && rows[5].ends_with('@'));
        assert!(txt.contains("2 South"));
    }

    #[test]
    fn single_point_path_draws_only_current_marker() {
        let outcome = outcome(&[("North", vec![point(1, 100.0, 100.0)])]);
        let txt = render_ascii_plot(&outcome, 10, 5);
        let grid: String = txt.lines().skip(2).take(5).collect();
        assert_eq!(grid.matches('@').count(), 1);
        assert!(!grid.contains('+'));
        assert!(!grid.contains('1'));
    }

    #[test]
    fn empty_outcome_prints_message() {
        let outcome = outcome(&[]);
        let txt = render_ascii_plot(&outcome, 10, 5);
        assert!(txt.ends_with(&format!("{EMPTY_MESSAGE}\n")));
    }
}
