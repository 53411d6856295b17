//! Ratatui-based terminal UI.
//!
//! The TUI provides a small form for choosing a start and end date, then
//! renders the resulting historical or forecast table next to a per-tier chart.

use std::io;
use std::time::Duration;

use chrono::NaiveDate;
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
    widgets::{Block, Borders, Cell, Clear, List, ListItem, Paragraph, Row, Table},
};

use crate::app::pipeline::{QueryOutput, QueryService};
use crate::cli::TuiArgs;
use crate::data::{CacheMode, Fetch, SeriesCache};
use crate::domain::{PriceTable, Tier};
use crate::error::AppError;
use crate::report::{FORECAST_NOTICE, fmt_price};

mod plotters_chart;

use plotters_chart::{PriceChart, tier_color};

/// Default window when no dates are given: the last 30 days.
const DEFAULT_WINDOW_DAYS: i64 = 30;

const INPUT_FORMAT: &str = "%Y-%m-%d";

/// Start the TUI.
pub fn run<F: Fetch, C: SeriesCache>(service: QueryService<F, C>, args: TuiArgs) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let today = chrono::Local::now().date_naive();
    let mut app = App::new(service, &args, today);
    app.submit(CacheMode::Use);
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

/// Which date field the form cursor is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Start,
    End,
}

struct App<F, C> {
    service: QueryService<F, C>,
    start_input: String,
    end_input: String,
    selected: Field,
    /// Field value before editing began, restored on Esc.
    editing: Option<String>,
    status: String,
    output: Option<QueryOutput>,
}

impl<F: Fetch, C: SeriesCache> App<F, C> {
    fn new(service: QueryService<F, C>, args: &TuiArgs, today: NaiveDate) -> Self {
        let end = args.end.unwrap_or(today);
        let start = args
            .start
            .unwrap_or_else(|| end - chrono::Duration::days(DEFAULT_WINDOW_DAYS));
        Self {
            service,
            start_input: start.format(INPUT_FORMAT).to_string(),
            end_input: end.format(INPUT_FORMAT).to_string(),
            selected: Field::Start,
            editing: None,
            status: "Press s to submit.".to_string(),
            output: None,
        }
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

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
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

    /// Returns `true` when the app should quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.editing.is_some() {
            self.handle_edit(code);
            return false;
        }

        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Up => self.selected = Field::Start,
            KeyCode::Down => self.selected = Field::End,
            KeyCode::Enter => {
                self.editing = Some(self.input().clone());
                self.status = "Editing date (YYYY-MM-DD). Enter to apply, Esc to cancel.".to_string();
            }
            KeyCode::Char('s') => self.submit(CacheMode::Use),
            KeyCode::Char('r') => self.submit(CacheMode::Refresh),
            _ => {}
        }
        false
    }

    fn handle_edit(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                if let Some(previous) = self.editing.take() {
                    *self.input_mut() = previous;
                }
                self.status = "Date edit canceled.".to_string();
            }
            KeyCode::Enter => {
                self.editing = None;
                let trimmed = self.input().trim().to_string();
                self.status = match NaiveDate::parse_from_str(&trimmed, INPUT_FORMAT) {
                    Ok(_) => "Press s to submit.".to_string(),
                    Err(e) => format!("Invalid date '{trimmed}': {e}"),
                };
            }
            KeyCode::Backspace => {
                self.input_mut().pop();
            }
            KeyCode::Char(c) => {
                if c.is_ascii_digit() || c == '-' {
                    self.input_mut().push(c);
                }
            }
            _ => {}
        }
    }

    fn input(&self) -> &String {
        match self.selected {
            Field::Start => &self.start_input,
            Field::End => &self.end_input,
        }
    }

    fn input_mut(&mut self) -> &mut String {
        match self.selected {
            Field::Start => &mut self.start_input,
            Field::End => &mut self.end_input,
        }
    }

    /// Run the query for the current form values. Errors land in the status
    /// line; the previous table stays on screen.
    fn submit(&mut self, mode: CacheMode) {
        let start = match parse_input("start", &self.start_input) {
            Ok(d) => d,
            Err(msg) => {
                self.status = msg;
                return;
            }
        };
        let end = match parse_input("end", &self.end_input) {
            Ok(d) => d,
            Err(msg) => {
                self.status = msg;
                return;
            }
        };

        match self.service.query_dates(start, end, mode) {
            Ok(output) => {
                self.status = if output.table.is_forecast() {
                    FORECAST_NOTICE.to_string()
                } else {
                    format!(
                        "{} rows ({}) from {}",
                        output.table.rows.len(),
                        output.table.granularity.display_name(),
                        output.dataset.source
                    )
                };
                self.output = Some(output);
            }
            Err(err) => {
                tracing::warn!(error = %err, "query failed");
                self.status = err.to_string();
            }
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(6), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(32), Constraint::Min(0)])
            .split(area);

        let editing_marker = |field: Field| {
            if self.editing.is_some() && self.selected == field {
                "_"
            } else {
                ""
            }
        };
        let items = vec![
            ListItem::new(format!("Start: {}{}", self.start_input, editing_marker(Field::Start))),
            ListItem::new(format!("End:   {}{}", self.end_input, editing_marker(Field::End))),
        ];
        let list = List::new(items)
            .block(Block::default().title("Range").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        state.select(Some(match self.selected {
            Field::Start => 0,
            Field::End => 1,
        }));
        frame.render_stateful_widget(list, chunks[0], &mut state);

        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("gold", Style::default().fg(Color::Yellow)),
            Span::raw(" - gold price trend (INR per gram)"),
        ]));
        if let Some(output) = &self.output {
            let kind = if output.table.is_forecast() { "forecast" } else { "history" };
            lines.push(Line::from(Span::styled(
                format!(
                    "range: {} .. {} | view: {} | {kind}",
                    output.range.start(),
                    output.range.end(),
                    output.table.granularity.display_name(),
                ),
                Style::default().fg(Color::Gray),
            )));
            let series = &output.dataset.series;
            let history = match (series.first_date(), series.last_date()) {
                (Some(first), Some(last)) => format!("{first} .. {last}"),
                _ => "-".to_string(),
            };
            lines.push(Line::from(Span::styled(
                format!("history: {history} | n={}", series.len()),
                Style::default().fg(Color::Gray),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                format!("source: {}", self.service.source()),
                Style::default().fg(Color::Gray),
            )));
        }

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, chunks[1]);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(52), Constraint::Min(0)])
            .split(area);

        self.draw_table(frame, chunks[0]);
        self.draw_chart(frame, chunks[1]);
    }

    fn draw_table(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let Some(output) = &self.output else {
            let block = Block::default().title("Prices").borders(Borders::ALL);
            frame.render_widget(Paragraph::new("No data.").block(block), area);
            return;
        };
        let table = &output.table;

        let title = if table.is_forecast() { "Predicted prices" } else { "Prices" };
        let header_style = Style::default().add_modifier(Modifier::BOLD);
        let mut header = vec![Cell::from(table.granularity.display_name()).style(header_style)];
        header.extend(Tier::ALL.iter().map(|tier| {
            Cell::from(tier.label()).style(header_style.fg(ratatui_color(*tier)))
        }));

        let rows = table.rows.iter().map(|row| {
            let mut cells = vec![Cell::from(table.granularity.format_bucket(row.bucket))];
            cells.extend(Tier::ALL.iter().map(|tier| Cell::from(fmt_price(row.prices.get(*tier)))));
            Row::new(cells)
        });

        let widths = [
            Constraint::Length(10),
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Length(12),
        ];
        let widget = Table::new(rows, widths)
            .header(Row::new(header))
            .block(Block::default().title(title).borders(Borders::ALL));
        frame.render_widget(widget, area);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let legend: Vec<Span> = Tier::ALL
            .iter()
            .flat_map(|tier| {
                [
                    Span::styled(format!(" {} ", tier.label()), Style::default().fg(ratatui_color(*tier))),
                    Span::raw("─"),
                ]
            })
            .collect();
        let block = Block::default().title(Line::from(legend)).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(output) = &self.output else {
            let msg = Paragraph::new("Waiting for data...")
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default());
            frame.render_widget(msg, inner);
            return;
        };

        let (series, x_bounds, y_bounds) = chart_series(&output.table);
        let labels: Vec<String> = output
            .table
            .rows
            .iter()
            .map(|row| output.table.granularity.format_bucket(row.bucket))
            .collect();

        let (chart_rect, insets) = chart_layout(inner);
        let widget = PriceChart {
            series: &series,
            labels: &labels,
            x_bounds,
            y_bounds,
            y_label: "INR/g",
        };

        frame.render_widget(widget, chart_rect);
        if let Some(insets) = insets {
            draw_axis_ticks(frame, inner, chart_rect, insets, &labels, y_bounds);
        }
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  Enter edit  s submit  r refresh  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn parse_input(name: &str, raw: &str) -> Result<NaiveDate, String> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, INPUT_FORMAT)
        .map_err(|e| format!("Invalid {name} date '{trimmed}': {e}"))
}

fn ratatui_color(tier: Tier) -> Color {
    let c = tier_color(tier);
    Color::Rgb(c.0, c.1, c.2)
}

/// One `(row index, price)` line per tier, plus padded bounds.
fn chart_series(table: &PriceTable) -> (Vec<(Tier, Vec<(f64, f64)>)>, [f64; 2], [f64; 2]) {
    let series = Tier::ALL
        .iter()
        .map(|&tier| {
            let points = table
                .rows
                .iter()
                .enumerate()
                .map(|(i, row)| (i as f64, row.prices.get(tier)))
                .collect();
            (tier, points)
        })
        .collect();

    let n = table.rows.len();
    let x_bounds = if n < 2 { [-1.0, 1.0] } else { [0.0, (n - 1) as f64] };

    let (mut y_min, mut y_max) = table.value_range().unwrap_or((0.0, 1.0));
    if !y_min.is_finite() || !y_max.is_finite() || y_max <= y_min {
        y_min -= 1.0;
        y_max += 1.0;
    }
    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);
    let y_bounds = [y_min - pad, y_max + pad];

    (series, x_bounds, y_bounds)
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 9,
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
    labels: &[String],
    y_bounds: [f64; 2],
) {
    let ticks = 5usize;
    let style = Style::default().fg(Color::Gray);

    // X ticks are bucket labels at evenly spaced row indices.
    let x_ticks = ticks.min(labels.len());
    for i in 0..x_ticks {
        let u = if x_ticks < 2 { 0.0 } else { i as f64 / (x_ticks as f64 - 1.0) };
        let idx = (u * (labels.len() - 1) as f64).round() as usize;
        let label = &labels[idx];
        let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
        let label_len = label.len() as u16;
        let start = x
            .saturating_sub(label_len / 2)
            .min((chart.x + chart.width).saturating_sub(label_len));
        let y = chart.y + chart.height;
        if y >= inner.y + inner.height - 1 {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label.as_str()).style(style),
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
        let label = format!("{:.0}", y_val);
        let label_len = label.len() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label_len);
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

    let x_label = Paragraph::new("date")
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

    let y_label = Paragraph::new("INR/g").style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));
    let y_rect = Rect {
        x: inner.x,
        y: inner.y,
        width: insets.left.saturating_sub(1),
        height: 1,
    };
    frame.render_widget(y_label, y_rect);
}
