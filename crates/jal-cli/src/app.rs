//! Application state machine and event dispatcher.

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use jal_core::{
  scheme::SchemeView,
  stats::{RegionSummary, Totals},
};

use crate::client::ApiClient;

// ─── Screen ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
  /// Focus on the region list; the right pane previews the region's schemes.
  RegionList,
  /// Focus on the scheme list of the selected region.
  SchemeList,
  /// One scheme/block row in full.
  SchemeDetail,
}

// ─── App ──────────────────────────────────────────────────────────────────────

pub struct App {
  pub screen: Screen,

  pub totals: Option<Totals>,
  pub regions: Vec<RegionSummary>,
  pub region_cursor: usize,

  /// Region whose schemes are loaded into `schemes`.
  pub loaded_region: Option<String>,
  pub schemes: Vec<SchemeView>,

  /// Current fuzzy-filter string over the scheme list.
  pub filter: String,
  /// Whether the user is typing a filter query.
  pub filter_active: bool,
  /// Cursor position within the *filtered* scheme list.
  pub scheme_cursor: usize,

  /// One-line status message shown in the status bar.
  pub status_msg: String,

  pub client: Arc<ApiClient>,
}

impl App {
  pub fn new(client: ApiClient) -> Self {
    Self {
      screen: Screen::RegionList,
      totals: None,
      regions: Vec::new(),
      region_cursor: 0,
      loaded_region: None,
      schemes: Vec::new(),
      filter: String::new(),
      filter_active: false,
      scheme_cursor: 0,
      status_msg: String::new(),
      client: Arc::new(client),
    }
  }

  // ── Data loading ──────────────────────────────────────────────────────────

  /// Fetch region summaries and totals.
  pub async fn load_regions(&mut self) -> anyhow::Result<()> {
    self.status_msg = "Loading regions…".into();
    let result = async {
      let regions = self.client.regions().await?;
      let totals = self.client.totals().await?;
      Ok::<_, anyhow::Error>((regions, totals))
    }
    .await;

    match result {
      Ok((regions, totals)) => {
        self.regions = regions;
        self.totals = Some(totals);
        self.region_cursor = self.region_cursor.min(self.regions.len().saturating_sub(1));
        self.status_msg = String::new();
        Ok(())
      }
      Err(e) => {
        self.status_msg = format!("Error: {e}");
        Err(e)
      }
    }
  }

  /// Load the schemes of the region under the cursor unless already loaded.
  async fn load_schemes(&mut self) {
    let Some(region) = self.cursor_region().map(|r| r.region_name.clone()) else {
      return;
    };
    if self.loaded_region.as_deref() == Some(region.as_str()) {
      return;
    }

    self.status_msg = format!("Loading {region}…");
    match self.client.schemes_in(&region).await {
      Ok(schemes) => {
        self.schemes = schemes;
        self.loaded_region = Some(region);
        self.scheme_cursor = 0;
        self.filter.clear();
        self.status_msg = String::new();
      }
      Err(e) => self.status_msg = format!("Error: {e}"),
    }
  }

  // ── Selection ─────────────────────────────────────────────────────────────

  pub fn cursor_region(&self) -> Option<&RegionSummary> { self.regions.get(self.region_cursor) }

  /// Schemes matching the current filter, best match first.
  pub fn filtered_schemes(&self) -> Vec<&SchemeView> {
    if self.filter.is_empty() {
      return self.schemes.iter().collect();
    }
    let matcher = SkimMatcherV2::default();
    let mut scored: Vec<(i64, &SchemeView)> = self
      .schemes
      .iter()
      .filter_map(|v| {
        let s = &v.scheme;
        let haystack = format!("{} {} {}", s.scheme_id, s.scheme_name, s.hierarchy.block);
        matcher.fuzzy_match(&haystack, &self.filter).map(|score| (score, v))
      })
      .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().map(|(_, v)| v).collect()
  }

  pub fn cursor_scheme(&self) -> Option<&SchemeView> {
    self.filtered_schemes().get(self.scheme_cursor).copied()
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return Ok(false);
    }

    if self.filter_active {
      self.handle_filter_key(key);
      return Ok(true);
    }

    match self.screen {
      Screen::RegionList => self.handle_region_key(key).await,
      Screen::SchemeList => Ok(self.handle_scheme_key(key)),
      Screen::SchemeDetail => Ok(self.handle_detail_key(key)),
    }
  }

  fn handle_filter_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.filter_active = false;
        self.filter.clear();
        self.scheme_cursor = 0;
      }
      KeyCode::Enter => {
        self.filter_active = false;
        self.scheme_cursor = 0;
        if self.filtered_schemes().len() == 1 {
          self.screen = Screen::SchemeDetail;
        }
      }
      KeyCode::Backspace => {
        self.filter.pop();
        self.scheme_cursor = 0;
      }
      KeyCode::Char(c) => {
        self.filter.push(c);
        self.scheme_cursor = 0;
      }
      _ => {}
    }
  }

  async fn handle_region_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    match key.code {
      KeyCode::Char('q') => return Ok(false),

      KeyCode::Down | KeyCode::Char('j') => {
        if self.region_cursor + 1 < self.regions.len() {
          self.region_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.region_cursor = self.region_cursor.saturating_sub(1);
      }

      KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
        self.load_schemes().await;
        if self.loaded_region.is_some() {
          self.screen = Screen::SchemeList;
        }
      }

      KeyCode::Char('r') => {
        self.loaded_region = None;
        self.load_regions().await?;
      }

      _ => {}
    }
    Ok(true)
  }

  fn handle_scheme_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Char('q') => return false,

      KeyCode::Esc | KeyCode::Left | KeyCode::Char('h') => {
        self.screen = Screen::RegionList;
        self.filter.clear();
      }

      KeyCode::Down | KeyCode::Char('j') => {
        if self.scheme_cursor + 1 < self.filtered_schemes().len() {
          self.scheme_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.scheme_cursor = self.scheme_cursor.saturating_sub(1);
      }

      KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
        if self.cursor_scheme().is_some() {
          self.screen = Screen::SchemeDetail;
        }
      }

      KeyCode::Char('/') => {
        self.filter_active = true;
        self.filter.clear();
        self.scheme_cursor = 0;
      }

      _ => {}
    }
    true
  }

  fn handle_detail_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Char('q') => return false,

      KeyCode::Esc | KeyCode::Left | KeyCode::Char('h') => {
        self.screen = Screen::SchemeList;
      }

      // Step through the list without leaving the detail view.
      KeyCode::Char(']') | KeyCode::PageDown => {
        if self.scheme_cursor + 1 < self.filtered_schemes().len() {
          self.scheme_cursor += 1;
        }
      }
      KeyCode::Char('[') | KeyCode::PageUp => {
        self.scheme_cursor = self.scheme_cursor.saturating_sub(1);
      }

      _ => {}
    }
    true
  }
}
