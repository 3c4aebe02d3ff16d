//! Ratatui-based terminal UI.
//!
//! The TUI loads the sheets once, then lets the user move the date window,
//! toggle regions and switch between the index and change spaces. Each change
//! rebuilds trajectories from the already-joined tables; `r` reloads the sheets
//! from disk.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
};
use tracing::debug;

use crate::app::pipeline::{Dataset, RenderRequest, RunOutput, SourceConfig, run_paths};
use crate::cli::ViewArgs;
use crate::domain::{DateRange, PairKind, resolve_colors};
use crate::error::AppError;
use crate::io::SourceCache;
use crate::render::{EMPTY_MESSAGE, PathDescriptor, RenderOutcome};

mod plotters_chart;

use plotters_chart::PathsPlottersChart;

/// Days moved per window key press.
const WINDOW_STEP_DAYS: i64 = 7;

/// Start the TUI.
pub fn run(args: ViewArgs) -> Result<(), AppError> {
    // Load before touching the terminal so load errors print normally.
    let mut app = App::new(&args)?;

    let _guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal =
        Terminal::new(backend).map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    source: SourceConfig,
    cache: SourceCache,
    dataset: Dataset,
    /// All regions of the dataset, in sheet order.
    regions: Vec<String>,
    cursor: usize,
    /// `None` when the joined table is empty.
    request: Option<RenderRequest>,
    run: Option<RunOutput>,
    status: String,
}

impl App {
    fn new(args: &ViewArgs) -> Result<Self, AppError> {
        let source = args.source.to_config();
        let mut cache = SourceCache::new();
        let dataset = Dataset::load(&mut cache, &source)?;
        let request = crate::app::request_from_args(&dataset, &args.filter)?;
        Ok(Self::from_parts(source, cache, dataset, request))
    }

    fn from_parts(source: SourceConfig, cache: SourceCache, dataset: Dataset, request: Option<RenderRequest>) -> Self {
        let mut app = Self {
            source,
            cache,
            regions: dataset.regions(),
            dataset,
            cursor: 0,
            request,
            run: None,
            status: String::new(),
        };
        app.recompute();
        if app.status.is_empty() {
            app.status = format!("{} regions loaded.", app.regions.len());
        }
        app
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100)).map_err(|e| AppError::new(4, format!("Event poll error: {e}")))? {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Apply one key press. Returns `true` to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Down => {
                if self.cursor + 1 < self.regions.len() {
                    self.cursor += 1;
                }
            }
            KeyCode::Char(' ') | KeyCode::Enter => self.toggle_region(),
            KeyCode::Left => self.move_window(-WINDOW_STEP_DAYS, -WINDOW_STEP_DAYS),
            KeyCode::Right => self.move_window(WINDOW_STEP_DAYS, WINDOW_STEP_DAYS),
            KeyCode::Char('[') => self.move_window(-WINDOW_STEP_DAYS, 0),
            KeyCode::Char(']') => self.move_window(WINDOW_STEP_DAYS, 0),
            KeyCode::Char('a') => self.reset_window(),
            KeyCode::Char('s') => self.switch_space(),
            KeyCode::Char('r') => self.reload(),
            _ => {}
        }
        false
    }

    fn toggle_region(&mut self) {
        let Some(region) = self.regions.get(self.cursor).cloned() else {
            return;
        };
        let Some(request) = &mut self.request else {
            return;
        };
        let added = request.regions.toggle(&region);
        self.status = format!("{} {region}", if added { "shown:" } else { "hidden:" });
        self.recompute();
    }

    /// Move the window bounds by the given number of days.
    fn move_window(&mut self, start_days: i64, end_days: i64) {
        let Some(request) = &mut self.request else {
            return;
        };
        let shift = |d: chrono::NaiveDate, days: i64| d.checked_add_signed(chrono::Duration::days(days));
        let (Some(start), Some(end)) = (
            shift(request.range.start, start_days),
            shift(request.range.end, end_days),
        ) else {
            return;
        };

        match DateRange::new(start, end) {
            Ok(range) => {
                request.range = range;
                self.status = format!("window: {range}");
                self.recompute();
            }
            Err(err) => self.status = err.to_string(),
        }
    }

    fn reset_window(&mut self) {
        let Some(request) = &mut self.request else {
            return;
        };
        if let Some(span) = self.dataset.table(request.kind).and_then(|t| t.date_span()) {
            request.range = span;
            self.status = format!("window: {span}");
            self.recompute();
        }
    }

    fn switch_space(&mut self) {
        let Some(request) = &mut self.request else {
            return;
        };
        let next = match request.kind {
            PairKind::Index => PairKind::Change,
            PairKind::Change => PairKind::Index,
        };
        if self.dataset.table(next).is_none() {
            self.status = "Change sheets not configured (--sale-change / --rent-change).".to_string();
            return;
        }
        request.kind = next;
        self.status = format!("space: {}", next.display_name());
        self.recompute();
    }

    /// Drop cached sheets and load them again, keeping the current filters.
    fn reload(&mut self) {
        let paths = [
            Some(&self.source.sale),
            Some(&self.source.rent),
            self.source.sale_change.as_ref(),
            self.source.rent_change.as_ref(),
        ];
        for path in paths.into_iter().flatten() {
            self.cache.invalidate(path);
        }

        match Dataset::load(&mut self.cache, &self.source) {
            Ok(dataset) => {
                self.regions = dataset.regions();
                self.cursor = self.cursor.min(self.regions.len().saturating_sub(1));
                if self.request.is_none() {
                    self.request = RenderRequest::defaults_for(&dataset);
                }
                self.dataset = dataset;
                self.status = "Reloaded sources.".to_string();
                self.recompute();
            }
            Err(err) => self.status = format!("Reload failed: {err}"),
        }
    }

    fn recompute(&mut self) {
        let Some(request) = &self.request else {
            self.run = None;
            return;
        };
        match run_paths(&self.dataset, request) {
            Ok(run) => {
                debug!(paths = run.outcome.paths().len(), "recomputed paths");
                self.run = Some(run);
            }
            Err(err) => {
                self.run = None;
                self.status = err.to_string();
            }
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let title = self
            .run
            .as_ref()
            .map(|r| r.outcome.title().to_string())
            .unwrap_or_else(|| "no data".to_string());

        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("rsp", Style::default().fg(Color::Cyan)),
            Span::raw(format!(" | {title}")),
        ]));

        if let Some(request) = &self.request {
            lines.push(Line::from(Span::styled(
                format!(
                    "space: {} | window: {} | regions: {}/{}",
                    request.kind.display_name(),
                    request.range,
                    request.regions.len(),
                    self.regions.len(),
                ),
                Style::default().fg(Color::Gray),
            )));
        }

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(28)])
            .split(area);

        self.draw_chart(frame, chunks[0]);
        self.draw_regions(frame, chunks[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Paths").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(RenderOutcome::Paths { axes, paths, .. }) = self.run.as_ref().map(|r| &r.outcome) else {
            let msg = Paragraph::new(EMPTY_MESSAGE)
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default());
            frame.render_widget(msg, inner);
            return;
        };

        let Some((x_bounds, y_bounds)) = chart_bounds(paths) else {
            return;
        };

        let (chart_rect, insets) = chart_layout(inner);
        let widget = PathsPlottersChart {
            paths,
            x_bounds,
            y_bounds,
            x_label: &axes.x,
            y_label: &axes.y,
        };

        frame.render_widget(widget, chart_rect);
        if let Some(insets) = insets {
            let labels = AxisLabels {
                x: &axes.x,
                y: &axes.y,
            };
            draw_axis_ticks(frame, inner, chart_rect, insets, x_bounds, y_bounds, labels);
        }
    }

    fn draw_regions(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let colors = self
            .request
            .as_ref()
            .map(|r| resolve_colors(&r.regions, &r.colors))
            .unwrap_or_default();

        let items: Vec<ListItem> = self
            .regions
            .iter()
            .map(|region| match colors.get(region) {
                Some(color) => {
                    let (r, g, b) = color.rgb();
                    ListItem::new(Line::from(vec![
                        Span::styled("■ ", Style::default().fg(Color::Rgb(r, g, b))),
                        Span::raw(region.clone()),
                    ]))
                }
                None => ListItem::new(Line::from(vec![
                    Span::raw("  "),
                    Span::styled(region.clone(), Style::default().fg(Color::DarkGray)),
                ])),
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().title("Regions").borders(Borders::ALL))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        state.select((!self.regions.is_empty()).then_some(self.cursor));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ region  space toggle  ←/→ shift  [/] start  a all  s space  r reload  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Padded x/y bounds over every vertex, or `None` without vertices.
fn chart_bounds(paths: &[PathDescriptor]) -> Option<([f64; 2], [f64; 2])> {
    let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for v in paths.iter().flat_map(|p| &p.vertices) {
        x_min = x_min.min(v.x);
        x_max = x_max.max(v.x);
        y_min = y_min.min(v.y);
        y_max = y_max.max(v.y);
    }
    if !(x_min.is_finite() && x_max.is_finite() && y_min.is_finite() && y_max.is_finite()) {
        return None;
    }
    Some((pad_bounds(x_min, x_max), pad_bounds(y_min, y_max)))
}

fn pad_bounds(min: f64, max: f64) -> [f64; 2] {
    let span = max - min;
    let pad = if span > 0.0 { span * 0.05 } else { min.abs().max(1.0) * 0.05 };
    [min - pad, max + pad]
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

#[derive(Debug, Clone, Copy)]
struct AxisLabels<'a> {
    x: &'a str,
    y: &'a str,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 8,
        right: 2,
        top: 1,
        bottom: 2,
    };

    if inner.width <= insets.left + insets.right + 10 || inner.height <= insets.top + insets.bottom + 5 {
        return (inner, None);
    }

    let rect = Rect {
        x: inner.x + insets.left,
        y: inner.y + insets.top,
        width: inner.width - insets.left - insets.right,
        height: inner.height - insets.top - insets.bottom,
    };

    (rect, Some(insets))
}

fn draw_axis_ticks(
    frame: &mut ratatui::Frame<'_>,
    inner: Rect,
    chart: Rect,
    insets: AxisInsets,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
    labels: AxisLabels<'_>,
) {
    let ticks = 5usize;
    let style = Style::default().fg(Color::Gray);

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let x_val = x_bounds[0] + u * (x_bounds[1] - x_bounds[0]);
        let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
        let label = format!("{x_val:.1}");
        let label_len = label.len() as u16;
        let start = x.saturating_sub((label.len() / 2) as u16);
        let y = chart.y + chart.height;
        if y >= inner.y + inner.height - 1 {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let y_val = y_bounds[0] + u * (y_bounds[1] - y_bounds[0]);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = format!("{y_val:.1}");
        let label_len = label.len() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label.len() as u16);
        if start < inner.x {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    let x_label = Paragraph::new(labels.x.to_string())
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));
    let x_rect = Rect {
        x: chart.x,
        y: chart.y + chart.height + 1,
        width: chart.width,
        height: 1,
    };
    if x_rect.y < inner.y + inner.height {
        frame.render_widget(x_label, x_rect);
    }

    let y_label =
        Paragraph::new(labels.y.to_string()).style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));
    let y_rect = Rect {
        x: inner.x,
        y: inner.y,
        width: chart.width.min(inner.width),
        height: 1,
    };
    frame.render_widget(y_label, y_rect);
}
