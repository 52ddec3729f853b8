//! Scheme detail pane: one scheme/block row with its counters.

use jal_core::stats::percent;
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};

use super::{percent_color, scheme_list::status_style};
use crate::app::App;

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let Some(view) = app.cursor_scheme() else {
    return;
  };
  let s = &view.scheme;
  let c = &s.counters;

  let block = Block::default()
    .title(format!(" {} - {} ", s.scheme_id, s.scheme_name))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Cyan));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let label = |text: &str| {
    Span::styled(
      format!("{text:<22}"),
      Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD),
    )
  };
  let field = |name: &str, value: String| Line::from(vec![label(name), Span::raw(value)]);
  let ratio = |name: &str, done: u32, total: u32| {
    let pct = percent(done.into(), total.into());
    Line::from(vec![
      label(name),
      Span::raw(format!("{done}/{total}  ")),
      Span::styled(format!("{pct:.1}%"), Style::default().fg(percent_color(pct))),
    ])
  };

  let (status, status_style) = status_style(view.completion_status);
  let h = &s.hierarchy;
  let mut lines = vec![
    Line::from(vec![label("status"), Span::styled(status, status_style)]),
    field("functional", s.functional_status.as_ref().replace('_', " ")),
    Line::from(""),
    field("region", h.region.clone()),
    field("circle", h.circle.clone()),
    field("division", h.division.clone()),
    field("sub-division", h.sub_division.clone()),
    field("block", h.block.clone()),
  ];
  if let Some(agency) = &s.agency {
    lines.push(field("agency", agency.clone()));
  }
  lines.extend([
    Line::from(""),
    field("villages", c.total_villages.to_string()),
    ratio("  integrated", c.villages_integrated, c.total_villages),
    ratio("  fully completed", c.fully_completed_villages, c.total_villages),
    field("  balance", view.balance_for_full_completion.to_string()),
    field("ESR", c.total_esr.to_string()),
    ratio("  integrated on IoT", c.esr_integrated_on_iot, c.total_esr),
    ratio("  fully completed", c.fully_completed_esr, c.total_esr),
    Line::from(""),
    field("flow meters", c.flow_meters_connected.to_string()),
    field("chlorine analyzers", c.residual_chlorine_analyzer_connected.to_string()),
    field("pressure transmitters", c.pressure_transmitter_connected.to_string()),
    Line::from(""),
    field("updated", s.updated_at.format("%Y-%m-%d %H:%M UTC").to_string()),
  ]);
  if let Some(url) = &s.dashboard_url {
    lines.push(field("dashboard", url.clone()));
  }

  f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}
