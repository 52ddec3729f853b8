//! Scheme list pane for the selected region, right panel.

use jal_core::scheme::CompletionStatus;
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use crate::app::{App, Screen};

pub fn status_style(status: CompletionStatus) -> (&'static str, Style) {
  match status {
    CompletionStatus::FullyCompleted => ("done", Style::default().fg(Color::Green)),
    CompletionStatus::InProgress => ("partial", Style::default().fg(Color::Yellow)),
    CompletionStatus::NotConnected => ("none", Style::default().fg(Color::Red)),
  }
}

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let filtered = app.filtered_schemes();
  let total = app.schemes.len();
  let region = app.loaded_region.as_deref().unwrap_or_default();

  let title = if app.filter_active || !app.filter.is_empty() {
    format!(" {region}: schemes ({}/{}) ", filtered.len(), total)
  } else {
    format!(" {region}: schemes ({total}) ")
  };

  let focused = app.screen == Screen::SchemeList;
  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(if focused { Color::Cyan } else { Color::DarkGray }));

  let items: Vec<ListItem> = filtered
    .iter()
    .map(|v| {
      let s = &v.scheme;
      let (label, style) = status_style(v.completion_status);
      ListItem::new(Line::from(vec![
        Span::styled(format!("{:<8}", label), style),
        Span::styled(format!("{:<10} ", s.scheme_id), Style::default().fg(Color::DarkGray)),
        Span::raw(s.scheme_name.clone()),
        Span::styled(
          format!("  {} · {}/{}", s.hierarchy.block, s.counters.fully_completed_villages, s.counters.total_villages),
          Style::default().fg(Color::DarkGray),
        ),
      ]))
    })
    .collect();

  let mut inner_area = block.inner(area);
  f.render_widget(block, area);

  if (app.filter_active || !app.filter.is_empty()) && inner_area.height > 2 {
    let filter_area = Rect {
      x:      inner_area.x,
      y:      inner_area.y + inner_area.height - 1,
      width:  inner_area.width,
      height: 1,
    };
    inner_area.height = inner_area.height.saturating_sub(1);

    let filter_text = if app.filter_active {
      format!("/{}_", app.filter)
    } else {
      format!("/{}", app.filter)
    };
    f.render_widget(
      Paragraph::new(filter_text).style(Style::default().fg(Color::Yellow)),
      filter_area,
    );
  }

  let mut state = ListState::default();
  state.select((!filtered.is_empty()).then_some(app.scheme_cursor));

  f.render_stateful_widget(
    List::new(items).highlight_style(
      Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    ),
    inner_area,
    &mut state,
  );
}
