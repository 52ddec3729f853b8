//! Region list pane, left panel.

use jal_core::stats::percent;
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState},
};

use super::percent_color;
use crate::app::{App, Screen};

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let focused = app.screen == Screen::RegionList;
  let block = Block::default()
    .title(format!(" Regions ({}) ", app.regions.len()))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(if focused { Color::Cyan } else { Color::DarkGray }));

  let name_width = (area.width as usize).saturating_sub(14).max(8);
  let items: Vec<ListItem> = app
    .regions
    .iter()
    .map(|r| {
      let pct = percent(r.fully_completed_villages, r.total_villages_integrated);
      ListItem::new(Line::from(vec![
        Span::raw(format!("{:<name_width$}", r.region_name)),
        Span::styled(format!("{pct:>6.1}%"), Style::default().fg(percent_color(pct))),
      ]))
    })
    .collect();

  let mut state = ListState::default();
  state.select((!app.regions.is_empty()).then_some(app.region_cursor));

  let highlight = if focused {
    Style::default()
      .bg(Color::Blue)
      .fg(Color::White)
      .add_modifier(Modifier::BOLD)
  } else {
    Style::default().add_modifier(Modifier::BOLD)
  };

  f.render_stateful_widget(
    List::new(items).block(block).highlight_style(highlight),
    area,
    &mut state,
  );
}
