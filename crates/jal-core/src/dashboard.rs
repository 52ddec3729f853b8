//! PI Vision dashboard URL generation.
//!
//! Every region, scheme and village has a kiosk-mode PI Vision display whose
//! context is selected by a `rootpath` query parameter: the element's path in
//! the AF hierarchy, backslash-delimited and percent-encoded as a whole.
//!
//! ```text
//! {base_url}/{display}?{query}&rootpath=%5C%5CDemoAF%5CJJM%5C…%5C{scheme_id}%20-%20{scheme_name}
//! ```
//!
//! Per-region quirks (the AF element name of a region, whether a region's
//! segments are stored in AF with their original spacing) are configuration,
//! not code.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  hierarchy::{Hierarchy, normalize_segment, segment_key},
  scheme::SchemeStatus,
  village::VillageReading,
};

// ─── Configuration ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
  /// PI Vision displays endpoint, without a trailing slash.
  pub base_url:          String,
  /// `{id}/{name}` of the region-level display.
  pub region_display:    String,
  pub scheme_display:    String,
  pub village_display:   String,
  /// Fixed query string placed before `rootpath`.
  pub query:             String,
  /// AF database prefix every path starts with.
  pub root_path:         String,
  /// Region → AF element name. Regions not listed use `Region-{region}`.
  pub region_segments:   BTreeMap<String, String>,
  /// Regions whose hierarchy segments are used exactly as the report spelled
  /// them rather than trimmed and whitespace-collapsed.
  pub verbatim_regions:  Vec<String>,
}

impl Default for DashboardConfig {
  fn default() -> Self {
    Self {
      base_url:         "https://14.99.99.166:18455/PIVision/#/Displays".into(),
      region_display:   "10110/Region_Dashboard".into(),
      scheme_display:   "10108/Scheme_Status_Dashboard_Final".into(),
      village_display:  "10109/Village_Dashboard".into(),
      query:            "hidetoolbar=true&hidesidebar=true&mode=kiosk".into(),
      root_path:        r"\\DemoAF\JJM\JJM\Maharashtra".into(),
      region_segments:  BTreeMap::new(),
      verbatim_regions: Vec::new(),
    }
  }
}

// ─── Targets ─────────────────────────────────────────────────────────────────

/// The element a dashboard URL points at.
#[derive(Debug, Clone, Copy)]
pub enum DashboardTarget<'a> {
  Region {
    region: &'a str,
  },
  Scheme {
    hierarchy:   &'a Hierarchy,
    scheme_id:   &'a str,
    scheme_name: &'a str,
  },
  Village {
    hierarchy:    &'a Hierarchy,
    scheme_id:    &'a str,
    scheme_name:  &'a str,
    village_name: &'a str,
  },
}

impl DashboardConfig {
  /// Build the dashboard URL for `target`.
  pub fn url(&self, target: DashboardTarget<'_>) -> Result<String> {
    let (display, path) = match target {
      DashboardTarget::Region { region } => {
        (&self.region_display, self.region_path(region)?)
      }
      DashboardTarget::Scheme { hierarchy, scheme_id, scheme_name } => {
        (&self.scheme_display, self.scheme_path(hierarchy, scheme_id, scheme_name)?)
      }
      DashboardTarget::Village { hierarchy, scheme_id, scheme_name, village_name } => {
        let mut path = self.scheme_path(hierarchy, scheme_id, scheme_name)?;
        path.push('\\');
        path.push_str(&self.segment(&hierarchy.region, village_name, "village_name")?);
        (&self.village_display, path)
      }
    };

    Ok(format!(
      "{}/{}?{}&rootpath={}",
      self.base_url.trim_end_matches('/'),
      display,
      self.query,
      urlencoding::encode(&path),
    ))
  }

  pub fn region_url(&self, region: &str) -> Result<String> {
    self.url(DashboardTarget::Region { region })
  }

  pub fn scheme_url(&self, scheme: &SchemeStatus) -> Result<String> {
    self.url(DashboardTarget::Scheme {
      hierarchy:   self.source_hierarchy(&scheme.hierarchy, scheme.reported_hierarchy.as_ref()),
      scheme_id:   &scheme.scheme_id,
      scheme_name: &scheme.scheme_name,
    })
  }

  pub fn village_url(&self, reading: &VillageReading) -> Result<String> {
    self.url(DashboardTarget::Village {
      hierarchy:    self.source_hierarchy(&reading.hierarchy, reading.reported_hierarchy.as_ref()),
      scheme_id:    &reading.scheme_id,
      scheme_name:  &reading.scheme_name,
      village_name: &reading.village_name,
    })
  }

  fn is_verbatim(&self, region: &str) -> bool {
    self
      .verbatim_regions
      .iter()
      .any(|r| segment_key(r) == segment_key(region))
  }

  /// The report's own spelling for verbatim regions, when it was captured.
  fn source_hierarchy<'a>(
    &self,
    stored: &'a Hierarchy,
    reported: Option<&'a Hierarchy>,
  ) -> &'a Hierarchy {
    match reported {
      Some(reported) if self.is_verbatim(&stored.region) => reported,
      _ => stored,
    }
  }

  // ── Path assembly ─────────────────────────────────────────────────────

  fn region_path(&self, region: &str) -> Result<String> {
    let name = normalize_segment(region);
    if name.is_empty() {
      return Err(Error::IncompleteHierarchy("region"));
    }
    let element = self
      .region_segments
      .iter()
      .find(|(k, _)| segment_key(k) == segment_key(&name))
      .map(|(_, v)| v.clone())
      .unwrap_or_else(|| format!("Region-{name}"));
    Ok(format!("{}\\{element}", self.root_path))
  }

  fn scheme_path(&self, h: &Hierarchy, scheme_id: &str, scheme_name: &str) -> Result<String> {
    let mut path = self.region_path(&h.region)?;
    for (value, field) in [
      (&h.circle, "circle"),
      (&h.division, "division"),
      (&h.sub_division, "sub_division"),
      (&h.block, "block"),
    ] {
      path.push('\\');
      path.push_str(&self.segment(&h.region, value, field)?);
    }
    let id = self.segment(&h.region, scheme_id, "scheme_id")?;
    let name = self.segment(&h.region, scheme_name, "scheme_name")?;
    path.push_str(&format!("\\{id} - {name}"));
    Ok(path)
  }

  fn segment(&self, region: &str, value: &str, field: &'static str) -> Result<String> {
    if value.trim().is_empty() {
      return Err(Error::IncompleteHierarchy(field));
    }
    Ok(if self.is_verbatim(region) { value.to_owned() } else { normalize_segment(value) })
  }
}

// ─── Reconciliation ──────────────────────────────────────────────────────────

/// How a stored URL compares with the one the generator produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "drift", rename_all = "snake_case")]
pub enum UrlDrift {
  Current,
  Missing,
  Stale { stored: String },
}

pub fn reconcile(stored: Option<&str>, expected: &str) -> UrlDrift {
  match stored.map(str::trim) {
    None | Some("") => UrlDrift::Missing,
    Some(s) if s == expected => UrlDrift::Current,
    Some(s) => UrlDrift::Stale { stored: s.to_owned() },
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn hierarchy() -> Hierarchy {
    Hierarchy {
      region:       "Amravati".into(),
      circle:       "Amravati".into(),
      division:     "Amravati".into(),
      sub_division: "Amravati".into(),
      block:        "Amravati".into(),
    }
  }

  const PREFIX: &str = "https://14.99.99.166:18455/PIVision/#/Displays/10108/Scheme_Status_Dashboard_Final?hidetoolbar=true&hidesidebar=true&mode=kiosk&rootpath=";

  #[test]
  fn scheme_url_percent_encodes_the_whole_path() {
    let cfg = DashboardConfig::default();
    let url = cfg
      .url(DashboardTarget::Scheme {
        hierarchy:   &hierarchy(),
        scheme_id:   "20018548",
        scheme_name: "83 Village RRWSS",
      })
      .unwrap();

    assert_eq!(
      url,
      format!(
        "{PREFIX}%5C%5CDemoAF%5CJJM%5CJJM%5CMaharashtra%5CRegion-Amravati\
         %5CAmravati%5CAmravati%5CAmravati%5CAmravati%5C20018548%20-%2083%20Village%20RRWSS"
      )
    );
  }

  #[test]
  fn segments_are_trimmed_unless_region_is_verbatim() {
    let mut h = hierarchy();
    h.block = " Amravati  Rural ".into();
    let target = DashboardTarget::Scheme {
      hierarchy:   &h,
      scheme_id:   "1",
      scheme_name: "X",
    };

    let cfg = DashboardConfig::default();
    assert!(cfg.url(target).unwrap().contains("%5CAmravati%20Rural%5C1%20-%20X"));

    let cfg = DashboardConfig {
      verbatim_regions: vec!["amravati".into()],
      ..DashboardConfig::default()
    };
    assert!(
      cfg
        .url(target)
        .unwrap()
        .contains("%5C%20Amravati%20%20Rural%20%5C1%20-%20X")
    );
  }

  #[test]
  fn region_segment_override() {
    let mut cfg = DashboardConfig::default();
    cfg
      .region_segments
      .insert("Chhatrapati Sambhajinagar".into(), "Region-CSN".into());

    let url = cfg.region_url("chhatrapati  sambhajinagar").unwrap();
    assert!(url.ends_with("Maharashtra%5CRegion-CSN"), "{url}");
    assert!(url.contains("/10110/Region_Dashboard?"));

    let url = cfg.region_url("Pune").unwrap();
    assert!(url.ends_with("Maharashtra%5CRegion-Pune"), "{url}");
  }

  #[test]
  fn village_url_appends_village_segment() {
    let cfg = DashboardConfig::default();
    let url = cfg
      .url(DashboardTarget::Village {
        hierarchy:    &hierarchy(),
        scheme_id:    "7",
        scheme_name:  "Pipe (Ph-2)",
        village_name: "Wadgaon Bk.",
      })
      .unwrap();
    assert!(url.contains("/10109/Village_Dashboard?"));
    assert!(url.ends_with("%5C7%20-%20Pipe%20%28Ph-2%29%5CWadgaon%20Bk."), "{url}");
  }

  #[test]
  fn blank_segment_is_an_error() {
    let mut h = hierarchy();
    h.division = "  ".into();
    let err = DashboardConfig::default()
      .url(DashboardTarget::Scheme {
        hierarchy:   &h,
        scheme_id:   "1",
        scheme_name: "X",
      })
      .unwrap_err();
    assert!(matches!(err, Error::IncompleteHierarchy("division")));
  }

  #[test]
  fn reconcile_classifies_drift() {
    assert_eq!(reconcile(None, "u"), UrlDrift::Missing);
    assert_eq!(reconcile(Some(" "), "u"), UrlDrift::Missing);
    assert_eq!(reconcile(Some("u"), "u"), UrlDrift::Current);
    assert_eq!(
      reconcile(Some("old"), "u"),
      UrlDrift::Stale { stored: "old".into() }
    );
  }
}
