//! Completion statistics: the numbers behind the dashboard cards and charts.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  scheme::{CompletionStatus, SchemeStatus},
  village::{LPCD_NORM, VillageReading},
};

/// `part / whole` as a percentage rounded to two decimals; 0 when `whole` is 0.
pub fn percent(part: u64, whole: u64) -> f64 {
  if whole == 0 {
    return 0.0;
  }
  (part as f64 * 10_000.0 / whole as f64).round() / 100.0
}

// ─── RegionSummary ───────────────────────────────────────────────────────────

/// Aggregated counts for one region; the content of a `region` row.
/// Counter sums are `u64`; a single scheme row holds `u32` counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionSummary {
  pub region_name:                     String,
  /// Distinct schemes with anything integrated.
  pub total_schemes_integrated:        u64,
  /// Distinct schemes whose every block row is fully completed.
  pub fully_completed_schemes:         u64,
  pub total_villages_integrated:       u64,
  pub fully_completed_villages:        u64,
  pub total_esr_integrated:            u64,
  pub fully_completed_esr:             u64,
  pub partial_esr:                     u64,
  pub flow_meter_integrated:           u64,
  pub rca_integrated:                  u64,
  pub pressure_transmitter_integrated: u64,
  pub updated_at:                      DateTime<Utc>,
}

impl RegionSummary {
  /// Aggregate the scheme rows of one region. Rows from other regions are
  /// ignored.
  pub fn from_schemes(region: &str, schemes: &[SchemeStatus], at: DateTime<Utc>) -> Self {
    // scheme_id → "every block fully completed so far"
    let mut per_scheme: BTreeMap<&str, (bool, bool)> = BTreeMap::new();
    let mut summary = Self {
      region_name:                     region.to_owned(),
      total_schemes_integrated:        0,
      fully_completed_schemes:         0,
      total_villages_integrated:       0,
      fully_completed_villages:        0,
      total_esr_integrated:            0,
      fully_completed_esr:             0,
      partial_esr:                     0,
      flow_meter_integrated:           0,
      rca_integrated:                  0,
      pressure_transmitter_integrated: 0,
      updated_at:                      at,
    };

    for scheme in schemes.iter().filter(|s| s.hierarchy.region == region) {
      let c = &scheme.counters;
      let status = c.completion_status();
      let entry = per_scheme
        .entry(scheme.scheme_id.as_str())
        .or_insert((true, false));
      entry.0 &= status == CompletionStatus::FullyCompleted;
      entry.1 |= status != CompletionStatus::NotConnected;

      summary.total_villages_integrated += u64::from(c.villages_integrated);
      summary.fully_completed_villages += u64::from(c.fully_completed_villages);
      summary.total_esr_integrated += u64::from(c.esr_integrated_on_iot);
      summary.fully_completed_esr += u64::from(c.fully_completed_esr);
      summary.flow_meter_integrated += u64::from(c.flow_meters_connected);
      summary.rca_integrated += u64::from(c.residual_chlorine_analyzer_connected);
      summary.pressure_transmitter_integrated += u64::from(c.pressure_transmitter_connected);
    }

    summary.partial_esr = summary
      .total_esr_integrated
      .saturating_sub(summary.fully_completed_esr);
    summary.total_schemes_integrated =
      per_scheme.values().filter(|(_, integrated)| *integrated).count() as u64;
    summary.fully_completed_schemes =
      per_scheme.values().filter(|(complete, _)| *complete).count() as u64;
    summary
  }

  /// One summary per distinct region among `schemes`, sorted by name.
  pub fn group(schemes: &[SchemeStatus], at: DateTime<Utc>) -> Vec<Self> {
    let regions: BTreeSet<&str> = schemes
      .iter()
      .map(|s| s.hierarchy.region.as_str())
      .collect();
    regions
      .into_iter()
      .map(|region| Self::from_schemes(region, schemes, at))
      .collect()
  }
}

// ─── Totals ──────────────────────────────────────────────────────────────────

/// Dashboard-wide totals across all regions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
  pub regions:                         u32,
  pub total_schemes_integrated:        u64,
  pub fully_completed_schemes:         u64,
  pub total_villages_integrated:       u64,
  pub fully_completed_villages:        u64,
  pub total_esr_integrated:            u64,
  pub fully_completed_esr:             u64,
  pub partial_esr:                     u64,
  pub flow_meter_integrated:           u64,
  pub rca_integrated:                  u64,
  pub pressure_transmitter_integrated: u64,
  pub scheme_completion_percent:       f64,
  pub village_completion_percent:      f64,
  pub esr_completion_percent:          f64,
}

impl Totals {
  pub fn from_regions(regions: &[RegionSummary]) -> Self {
    let mut t = Self {
      regions: regions.len() as u32,
      ..Self::default()
    };
    for r in regions {
      t.total_schemes_integrated += r.total_schemes_integrated;
      t.fully_completed_schemes += r.fully_completed_schemes;
      t.total_villages_integrated += r.total_villages_integrated;
      t.fully_completed_villages += r.fully_completed_villages;
      t.total_esr_integrated += r.total_esr_integrated;
      t.fully_completed_esr += r.fully_completed_esr;
      t.partial_esr += r.partial_esr;
      t.flow_meter_integrated += r.flow_meter_integrated;
      t.rca_integrated += r.rca_integrated;
      t.pressure_transmitter_integrated += r.pressure_transmitter_integrated;
    }
    t.scheme_completion_percent =
      percent(t.fully_completed_schemes, t.total_schemes_integrated);
    t.village_completion_percent =
      percent(t.fully_completed_villages, t.total_villages_integrated);
    t.esr_completion_percent = percent(t.fully_completed_esr, t.total_esr_integrated);
    t
  }
}

// ─── LPCD ────────────────────────────────────────────────────────────────────

/// Supply adequacy across a set of villages, judged on each village's latest
/// reading.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LpcdSummary {
  /// `None` for the all-regions summary.
  pub region:           Option<String>,
  pub villages:         u32,
  pub zero_supply_week: u32,
  pub below_norm:       u32,
  pub at_or_above_norm: u32,
  pub no_readings:      u32,
  /// Share of villages with readings that meet the norm.
  pub adequate_percent: f64,
}

impl LpcdSummary {
  pub fn from_readings(region: Option<String>, readings: &[VillageReading]) -> Self {
    let mut s = Self { region, ..Self::default() };
    for r in readings {
      s.villages += 1;
      if r.flags.consistent_zero_lpcd_for_a_week {
        s.zero_supply_week += 1;
      }
      match r.flags.latest_lpcd {
        Some(v) if v >= LPCD_NORM => s.at_or_above_norm += 1,
        Some(_) => s.below_norm += 1,
        None => s.no_readings += 1,
      }
    }
    s.adequate_percent = percent(
      u64::from(s.at_or_above_norm),
      u64::from(s.at_or_above_norm + s.below_norm),
    );
    s
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;
  use crate::{
    hierarchy::Hierarchy,
    scheme::{FunctionalStatus, SchemeCounters},
    village::LpcdFlags,
  };

  fn ts() -> DateTime<Utc> { Utc.timestamp_opt(0, 0).unwrap() }

  fn scheme(region: &str, id: &str, block: &str, counters: SchemeCounters) -> SchemeStatus {
    SchemeStatus {
      scheme_id: id.into(),
      scheme_name: format!("Scheme {id}"),
      hierarchy: Hierarchy {
        region: region.into(),
        block: block.into(),
        ..Hierarchy::default()
      },
      reported_hierarchy: None,
      agency: None,
      counters,
      functional_status: FunctionalStatus::Functional,
      dashboard_url: None,
      updated_at: ts(),
    }
  }

  fn done(villages: u32, esr: u32) -> SchemeCounters {
    SchemeCounters {
      total_villages: villages,
      villages_integrated: villages,
      fully_completed_villages: villages,
      total_esr: esr,
      esr_integrated_on_iot: esr,
      fully_completed_esr: esr,
      flow_meters_connected: 1,
      ..SchemeCounters::default()
    }
  }

  fn partial() -> SchemeCounters {
    SchemeCounters {
      total_villages: 5,
      villages_integrated: 3,
      fully_completed_villages: 1,
      total_esr: 4,
      esr_integrated_on_iot: 2,
      fully_completed_esr: 1,
      ..SchemeCounters::default()
    }
  }

  #[test]
  fn percent_rounds_and_handles_zero() {
    assert_eq!(percent(1, 3), 33.33);
    assert_eq!(percent(2, 3), 66.67);
    assert_eq!(percent(5, 0), 0.0);
  }

  #[test]
  fn multi_block_scheme_counts_once_and_only_completes_when_all_blocks_do() {
    let rows = vec![
      scheme("Pune", "S1", "B1", done(2, 1)),
      scheme("Pune", "S1", "B2", partial()),
      scheme("Pune", "S2", "B1", done(3, 2)),
      scheme("Pune", "S3", "B1", SchemeCounters { total_villages: 4, ..SchemeCounters::default() }),
      scheme("Nagpur", "S4", "B1", done(1, 1)),
    ];

    let pune = RegionSummary::from_schemes("Pune", &rows, ts());
    assert_eq!(pune.total_schemes_integrated, 2);
    assert_eq!(pune.fully_completed_schemes, 1);
    assert_eq!(pune.total_villages_integrated, 2 + 3 + 3);
    assert_eq!(pune.fully_completed_villages, 2 + 1 + 3);
    assert_eq!(pune.total_esr_integrated, 1 + 2 + 2);
    assert_eq!(pune.fully_completed_esr, 1 + 1 + 2);
    assert_eq!(pune.partial_esr, 1);
    assert_eq!(pune.flow_meter_integrated, 2);

    let grouped = RegionSummary::group(&rows, ts());
    assert_eq!(
      grouped.iter().map(|r| r.region_name.as_str()).collect::<Vec<_>>(),
      ["Nagpur", "Pune"]
    );

    let totals = Totals::from_regions(&grouped);
    assert_eq!(totals.regions, 2);
    assert_eq!(totals.total_schemes_integrated, 3);
    assert_eq!(totals.fully_completed_schemes, 2);
    assert_eq!(totals.scheme_completion_percent, 66.67);
  }

  #[test]
  fn region_sums_do_not_wrap_at_u32_max() {
    let big = SchemeCounters {
      total_villages: 3_000_000_000,
      villages_integrated: 3_000_000_000,
      ..SchemeCounters::default()
    };
    let summary = RegionSummary::from_schemes(
      "Pune",
      &[scheme("Pune", "S1", "Haveli", big), scheme("Pune", "S1", "Mulshi", big)],
      ts(),
    );
    assert_eq!(summary.total_villages_integrated, 6_000_000_000);
    assert_eq!(summary.total_schemes_integrated, 1);

    let totals = Totals::from_regions(&[summary.clone(), summary]);
    assert_eq!(totals.total_villages_integrated, 12_000_000_000);
  }

  #[test]
  fn lpcd_summary_buckets_by_latest_reading() {
    let reading = |latest: Option<f64>, zero_week: bool| VillageReading {
      scheme_id:     "S1".into(),
      scheme_name:   "Scheme".into(),
      village_name:  "V".into(),
      hierarchy:     Hierarchy::default(),
      reported_hierarchy: None,
      population:    None,
      number_of_esr: None,
      water_values:  vec![],
      lpcd_values:   vec![],
      day_labels:    vec![],
      flags:         LpcdFlags {
        consistent_zero_lpcd_for_a_week: zero_week,
        latest_lpcd: latest,
        ..LpcdFlags::default()
      },
      dashboard_url: None,
      updated_at:    ts(),
    };

    let summary = LpcdSummary::from_readings(
      Some("Pune".into()),
      &[
        reading(Some(0.0), true),
        reading(Some(54.0), false),
        reading(Some(55.0), false),
        reading(Some(80.0), false),
        reading(None, false),
      ],
    );
    assert_eq!(summary.villages, 5);
    assert_eq!(summary.zero_supply_week, 1);
    assert_eq!(summary.below_norm, 2);
    assert_eq!(summary.at_or_above_norm, 2);
    assert_eq!(summary.no_readings, 1);
    assert_eq!(summary.adequate_percent, 50.0);
  }
}
