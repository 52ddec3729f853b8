//! TUI rendering; orchestrates all panes.

pub mod region_list;
pub mod scheme_detail;
pub mod scheme_list;

use chrono::Local;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph},
};

use crate::app::{App, Screen};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, app: &App) {
  let area = f.area();

  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Length(1), // totals
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(area);

  draw_header(f, rows[0]);
  draw_totals(f, rows[1], app);
  draw_body(f, rows[2], app);
  draw_status(f, rows[3], app);
}

/// Colour for a completion percentage.
pub fn percent_color(p: f64) -> Color {
  if p >= 75.0 {
    Color::Green
  } else if p >= 40.0 {
    Color::Yellow
  } else {
    Color::Red
  }
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect) {
  let date = Local::now().format("%Y-%m-%d").to_string();

  let left = Span::styled(
    " jal  [/] search  [r] reload  [q] quit",
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );
  let right = Span::styled(
    format!("{date} "),
    Style::default().fg(Color::DarkGray),
  );

  let left_width = left.content.len() as u16;
  let right_width = right.content.len() as u16;
  let pad = area
    .width
    .saturating_sub(left_width)
    .saturating_sub(right_width);

  let line = Line::from(vec![
    left,
    Span::raw(" ".repeat(pad as usize)),
    right,
  ]);

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(line), inner);
}

fn draw_totals(f: &mut Frame, area: Rect, app: &App) {
  let Some(t) = &app.totals else {
    return;
  };

  let stat = |label: &str, done: u64, total: u64, pct: f64| {
    vec![
      Span::styled(format!(" {label} "), Style::default().fg(Color::Cyan)),
      Span::raw(format!("{done}/{total} ")),
      Span::styled(format!("{pct:.1}%  "), Style::default().fg(percent_color(pct))),
    ]
  };

  let mut spans = vec![Span::styled(
    format!(" {} regions ", t.regions),
    Style::default().add_modifier(Modifier::BOLD),
  )];
  spans.extend(stat(
    "schemes",
    t.fully_completed_schemes,
    t.total_schemes_integrated,
    t.scheme_completion_percent,
  ));
  spans.extend(stat(
    "villages",
    t.fully_completed_villages,
    t.total_villages_integrated,
    t.village_completion_percent,
  ));
  spans.extend(stat(
    "ESR",
    t.fully_completed_esr,
    t.total_esr_integrated,
    t.esr_completion_percent,
  ));
  f.render_widget(Paragraph::new(Line::from(spans)), area);
}

// ─── Body ─────────────────────────────────────────────────────────────────────

fn draw_body(f: &mut Frame, area: Rect, app: &App) {
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
    .split(area);

  region_list::draw(f, cols[0], app);

  match app.screen {
    Screen::SchemeDetail => scheme_detail::draw(f, cols[1], app),
    _ if app.loaded_region.is_some() => scheme_list::draw(f, cols[1], app),
    _ => draw_empty(f, cols[1]),
  }
}

fn draw_empty(f: &mut Frame, area: Rect) {
  let block = Block::default()
    .title(" Schemes ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(
    Paragraph::new(Line::from(vec![Span::styled(
      "Select a region and press Enter.",
      Style::default().fg(Color::DarkGray),
    )])),
    inner,
  );
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
  let (mode_label, hints) = match app.screen {
    _ if app.filter_active => ("SEARCH", "Type to filter  Esc cancel  Enter select"),
    Screen::RegionList => ("REGIONS", "↑↓/jk navigate  Enter schemes  r reload  q quit"),
    Screen::SchemeList => ("SCHEMES", "↑↓/jk navigate  / search  Enter detail  Esc back  q quit"),
    Screen::SchemeDetail => ("DETAIL", "[ prev  ] next  Esc back  q quit"),
  };

  let status = if app.status_msg.is_empty() {
    hints.to_string()
  } else {
    app.status_msg.clone()
  };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default()
      .fg(Color::Black)
      .bg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );
  let hint_span = Span::styled(
    format!("  {status}"),
    Style::default().fg(Color::DarkGray),
  );

  f.render_widget(
    Paragraph::new(Line::from(vec![mode_span, hint_span]))
      .style(Style::default().bg(Color::Black)),
    area,
  );
}
