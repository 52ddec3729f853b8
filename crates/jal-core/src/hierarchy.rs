//! The administrative hierarchy: region → circle → division → sub-division →
//! block.
//!
//! Reports arrive with inconsistent spacing and several spellings of the same
//! region. Everything that enters the store goes through [`normalize_segment`]
//! and [`RegionAliases::canonical`] first, so lookups and aggregation can rely
//! on exact string equality.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ─── Segments ────────────────────────────────────────────────────────────────

/// Trim and collapse internal whitespace runs to a single space.
pub fn normalize_segment(raw: &str) -> String {
  raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Comparison key for a segment: normalised and lowercased.
pub fn segment_key(raw: &str) -> String { normalize_segment(raw).to_lowercase() }

// ─── Regions ─────────────────────────────────────────────────────────────────

/// The six administrative regions the reports are organised by.
pub const CANONICAL_REGIONS: [&str; 6] = [
  "Amravati",
  "Chhatrapati Sambhajinagar",
  "Konkan",
  "Nagpur",
  "Nashik",
  "Pune",
];

/// Resolves alternative spellings of a region name to its canonical form.
#[derive(Debug, Clone)]
pub struct RegionAliases {
  /// `segment_key(alias)` → canonical name.
  map: BTreeMap<String, String>,
}

impl Default for RegionAliases {
  fn default() -> Self {
    let mut aliases = Self { map: BTreeMap::new() };
    for region in CANONICAL_REGIONS {
      aliases.insert(region, region);
    }
    aliases.insert("Aurangabad", "Chhatrapati Sambhajinagar");
    aliases.insert("CS", "Chhatrapati Sambhajinagar");
    aliases.insert("Chh. Sambhajinagar", "Chhatrapati Sambhajinagar");
    aliases.insert("Chhatrapati Sambhaji Nagar", "Chhatrapati Sambhajinagar");
    aliases.insert("Thane", "Konkan");
    aliases
  }
}

impl RegionAliases {
  /// An alias table with no entries; every name maps to its normalised self.
  pub fn empty() -> Self { Self { map: BTreeMap::new() } }

  /// Register `alias` as another spelling of `canonical`.
  pub fn insert(&mut self, alias: &str, canonical: &str) {
    self
      .map
      .insert(segment_key(alias), normalize_segment(canonical));
  }

  /// Builder form of [`insert`](Self::insert).
  pub fn with_alias(mut self, alias: &str, canonical: &str) -> Self {
    self.insert(alias, canonical);
    self
  }

  /// Extend the table from `alias → canonical` pairs (e.g. from config).
  pub fn extend<'a>(&mut self, pairs: impl IntoIterator<Item = (&'a String, &'a String)>) {
    for (alias, canonical) in pairs {
      self.insert(alias, canonical);
    }
  }

  /// The canonical name for `raw`. Unknown regions are returned normalised.
  pub fn canonical(&self, raw: &str) -> String {
    self
      .map
      .get(&segment_key(raw))
      .cloned()
      .unwrap_or_else(|| normalize_segment(raw))
  }

  /// The canonical name for `raw`, only if it is a known spelling.
  pub fn lookup(&self, raw: &str) -> Option<&str> {
    self.map.get(&segment_key(raw)).map(String::as_str)
  }
}

// ─── Hierarchy ───────────────────────────────────────────────────────────────

/// Where a scheme or village sits in the administrative tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Hierarchy {
  pub region:       String,
  pub circle:       String,
  pub division:     String,
  pub sub_division: String,
  pub block:        String,
}

impl Hierarchy {
  /// Normalise every segment and resolve the region alias.
  pub fn normalized(&self, aliases: &RegionAliases) -> Self {
    Self {
      region:       aliases.canonical(&self.region),
      circle:       normalize_segment(&self.circle),
      division:     normalize_segment(&self.division),
      sub_division: normalize_segment(&self.sub_division),
      block:        normalize_segment(&self.block),
    }
  }

  /// Keep the segments as given but take the region from `normalized`.
  pub fn with_region_of(self, normalized: &Hierarchy) -> Self {
    Self { region: normalized.region.clone(), ..self }
  }
}

/// One level of the hierarchy tree served to filter drop-downs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyNode {
  pub name:     String,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub children: Vec<HierarchyNode>,
}

impl HierarchyNode {
  /// Fold flat hierarchy rows into a sorted region → … → block tree.
  /// Blank segments are dropped along with everything below them.
  pub fn build(rows: &[Hierarchy]) -> Vec<HierarchyNode> {
    #[derive(Default)]
    struct Level(BTreeMap<String, Level>);

    let mut root = Level::default();
    for row in rows {
      let mut level = &mut root;
      for segment in [
        &row.region,
        &row.circle,
        &row.division,
        &row.sub_division,
        &row.block,
      ] {
        if segment.trim().is_empty() {
          break;
        }
        level = level.0.entry(segment.clone()).or_default();
      }
    }

    fn into_nodes(level: Level) -> Vec<HierarchyNode> {
      level
        .0
        .into_iter()
        .map(|(name, children)| HierarchyNode {
          name,
          children: into_nodes(children),
        })
        .collect()
    }

    into_nodes(root)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn normalize_collapses_whitespace() {
    assert_eq!(normalize_segment("  Amravati   Circle \t"), "Amravati Circle");
    assert_eq!(normalize_segment(""), "");
  }

  #[test]
  fn aliases_resolve_case_insensitively() {
    let aliases = RegionAliases::default();
    assert_eq!(aliases.canonical(" aurangabad "), "Chhatrapati Sambhajinagar");
    assert_eq!(aliases.canonical("PUNE"), "Pune");
    assert_eq!(aliases.canonical("  New   Region "), "New Region");
    assert_eq!(aliases.lookup("thane"), Some("Konkan"));
    assert_eq!(aliases.lookup("Sheet1"), None);
  }

  #[test]
  fn tree_is_sorted_and_deduplicated() {
    let row = |region: &str, circle: &str, block: &str| Hierarchy {
      region:       region.into(),
      circle:       circle.into(),
      division:     "D".into(),
      sub_division: "SD".into(),
      block:        block.into(),
    };
    let tree = HierarchyNode::build(&[
      row("Pune", "C2", "B1"),
      row("Amravati", "C1", "B1"),
      row("Pune", "C1", "B2"),
      row("Pune", "C1", "B1"),
      row("Pune", "C1", "B1"),
    ]);

    assert_eq!(tree.len(), 2);
    assert_eq!(tree[0].name, "Amravati");
    let pune = &tree[1];
    assert_eq!(pune.children.len(), 2);
    assert_eq!(pune.children[0].name, "C1");
    let blocks = &pune.children[0].children[0].children[0].children;
    assert_eq!(
      blocks.iter().map(|n| n.name.as_str()).collect::<Vec<_>>(),
      ["B1", "B2"]
    );
  }
}
