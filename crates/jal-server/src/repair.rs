//! Dashboard URL reconciliation.
//!
//! Every stored URL is compared with what [`DashboardConfig`] generates for
//! the row today. Missing and stale URLs are rewritten; rows whose hierarchy
//! is incomplete are counted and left alone.

use jal_core::{
  dashboard::{DashboardConfig, UrlDrift, reconcile},
  store::{SchemeQuery, SchemeStore, VillageQuery},
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriftCounts {
  pub checked:    u32,
  pub current:    u32,
  pub missing:    u32,
  pub stale:      u32,
  /// Rows for which no URL can be generated.
  pub incomplete: u32,
  /// Missing + stale URLs actually written (0 on a dry run).
  pub rewritten:  u32,
}

impl DriftCounts {
  /// Tally one row; returns `true` when its URL needs rewriting.
  fn observe(&mut self, drift: &UrlDrift) -> bool {
    self.checked += 1;
    match drift {
      UrlDrift::Current => {
        self.current += 1;
        false
      }
      UrlDrift::Missing => {
        self.missing += 1;
        true
      }
      UrlDrift::Stale { .. } => {
        self.stale += 1;
        true
      }
    }
  }

  fn incomplete(&mut self) {
    self.checked += 1;
    self.incomplete += 1;
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairCounts {
  pub schemes:  DriftCounts,
  pub villages: DriftCounts,
}

pub async fn repair_scheme_urls<S: SchemeStore>(
  store: &S,
  dashboard: &DashboardConfig,
  dry_run: bool,
) -> Result<DriftCounts> {
  let mut counts = DriftCounts::default();
  let schemes = store
    .list_schemes(&SchemeQuery::default())
    .await
    .map_err(Error::store)?;

  for scheme in schemes {
    let expected = match dashboard.scheme_url(&scheme) {
      Ok(url) => url,
      Err(e) => {
        tracing::debug!(scheme_id = %scheme.scheme_id, block = %scheme.hierarchy.block, error = %e, "no dashboard url");
        counts.incomplete();
        continue;
      }
    };
    let drift = reconcile(scheme.dashboard_url.as_deref(), &expected);
    if counts.observe(&drift) && !dry_run {
      if let UrlDrift::Stale { stored } = &drift {
        tracing::debug!(scheme_id = %scheme.scheme_id, %stored, "replacing stale dashboard url");
      }
      if store
        .set_dashboard_url(scheme.key(), expected)
        .await
        .map_err(Error::store)?
      {
        counts.rewritten += 1;
      }
    }
  }
  Ok(counts)
}

pub async fn repair_village_urls<S: SchemeStore>(
  store: &S,
  dashboard: &DashboardConfig,
  dry_run: bool,
) -> Result<DriftCounts> {
  let mut counts = DriftCounts::default();
  let readings = store
    .list_village_readings(&VillageQuery::default())
    .await
    .map_err(Error::store)?;

  for reading in readings {
    let expected = match dashboard.village_url(&reading) {
      Ok(url) => url,
      Err(e) => {
        tracing::debug!(scheme_id = %reading.scheme_id, village = %reading.village_name, error = %e, "no dashboard url");
        counts.incomplete();
        continue;
      }
    };
    let drift = reconcile(reading.dashboard_url.as_deref(), &expected);
    if counts.observe(&drift)
      && !dry_run
      && store
        .set_village_dashboard_url(reading.key(), expected)
        .await
        .map_err(Error::store)?
    {
      counts.rewritten += 1;
    }
  }
  Ok(counts)
}

/// Reconcile scheme and village URLs.
pub async fn repair_all<S: SchemeStore>(
  store: &S,
  dashboard: &DashboardConfig,
  dry_run: bool,
) -> Result<RepairCounts> {
  let counts = RepairCounts {
    schemes:  repair_scheme_urls(store, dashboard, dry_run).await?,
    villages: repair_village_urls(store, dashboard, dry_run).await?,
  };
  tracing::info!(
    dry_run,
    schemes_missing = counts.schemes.missing,
    schemes_stale = counts.schemes.stale,
    villages_missing = counts.villages.missing,
    villages_stale = counts.villages.stale,
    rewritten = counts.schemes.rewritten + counts.villages.rewritten,
    "dashboard urls reconciled"
  );
  Ok(counts)
}

#[cfg(test)]
mod tests {
  use jal_core::{
    hierarchy::Hierarchy,
    scheme::{NewScheme, SchemeCounters, SchemeKey},
    store::WriteMode,
    village::NewVillageReading,
  };
  use jal_store_sqlite::SqliteStore;

  use super::*;

  fn hierarchy(block: &str) -> Hierarchy {
    Hierarchy {
      region:       "Pune".into(),
      circle:       "Pune".into(),
      division:     "Pune".into(),
      sub_division: "Haveli".into(),
      block:        block.into(),
    }
  }

  fn scheme(id: &str, block: &str) -> NewScheme {
    NewScheme {
      scheme_id:         id.into(),
      scheme_name:       format!("Scheme {id}"),
      hierarchy:         hierarchy(block),
      reported_hierarchy: None,
      agency:            None,
      counters:          SchemeCounters::default(),
      functional_status: Default::default(),
    }
  }

  async fn seeded() -> SqliteStore {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let mut no_circle = scheme("S3", "Mulshi");
    no_circle.hierarchy.circle = String::new();
    store
      .import_schemes(
        vec![scheme("S1", "Haveli"), scheme("S2", "Haveli"), no_circle],
        WriteMode::Skip,
      )
      .await
      .unwrap();
    store
      .import_village_readings(
        vec![NewVillageReading {
          scheme_id:     "S1".into(),
          scheme_name:   "Scheme S1".into(),
          village_name:  "Wagholi".into(),
          hierarchy:     hierarchy("Haveli"),
          reported_hierarchy: None,
          population:    Some(1200),
          number_of_esr: Some(1),
          water_values:  vec![],
          lpcd_values:   vec![Some(60.0)],
          day_labels:    vec![None],
        }],
        WriteMode::Skip,
      )
      .await
      .unwrap();
    store
  }

  #[tokio::test]
  async fn dry_run_reports_without_writing() {
    let store = seeded().await;
    let dashboard = DashboardConfig::default();

    let counts = repair_all(&store, &dashboard, true).await.unwrap();
    assert_eq!(counts.schemes.checked, 3);
    assert_eq!(counts.schemes.missing, 2);
    assert_eq!(counts.schemes.incomplete, 1);
    assert_eq!(counts.schemes.rewritten, 0);
    assert_eq!(counts.villages.missing, 1);

    let s1 = store
      .get_scheme(SchemeKey { scheme_id: "S1".into(), block: "Haveli".into() })
      .await
      .unwrap()
      .unwrap();
    assert_eq!(s1.dashboard_url, None);
  }

  #[tokio::test]
  async fn repair_is_idempotent() {
    let store = seeded().await;
    let dashboard = DashboardConfig::default();

    let first = repair_all(&store, &dashboard, false).await.unwrap();
    assert_eq!(first.schemes.rewritten, 2);
    assert_eq!(first.villages.rewritten, 1);

    let second = repair_all(&store, &dashboard, false).await.unwrap();
    assert_eq!(second.schemes.current, 2);
    assert_eq!(second.schemes.rewritten, 0);
    assert_eq!(second.villages.current, 1);
    assert_eq!(second.villages.rewritten, 0);
  }

  #[tokio::test]
  async fn stale_urls_are_replaced() {
    let store = seeded().await;
    let key = SchemeKey { scheme_id: "S2".into(), block: "Haveli".into() };
    store
      .set_dashboard_url(key.clone(), "https://old.example/S2".into())
      .await
      .unwrap();

    let dashboard = DashboardConfig::default();
    let counts = repair_scheme_urls(&store, &dashboard, false).await.unwrap();
    assert_eq!(counts.stale, 1);
    assert_eq!(counts.missing, 1);
    assert_eq!(counts.rewritten, 2);

    let s2 = store.get_scheme(key).await.unwrap().unwrap();
    assert_eq!(s2.dashboard_url, Some(dashboard.scheme_url(&s2).unwrap()));
  }
}
