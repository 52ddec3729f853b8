//! Per-village daily water quantity and LPCD readings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  hierarchy::{Hierarchy, RegionAliases, normalize_segment},
};

/// Litres per capita per day regarded as adequate supply.
pub const LPCD_NORM: f64 = 55.0;

/// Number of daily LPCD readings carried per village.
pub const LPCD_DAYS: usize = 7;

/// Number of daily water-quantity readings carried per village.
pub const WATER_DAYS: usize = 6;

/// Composite primary key of a village reading row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VillageKey {
  pub scheme_id:    String,
  pub village_name: String,
}

// ─── Flags ───────────────────────────────────────────────────────────────────

/// Supply-adequacy flags derived from the LPCD readings of one village.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LpcdFlags {
  /// All seven days reported and every one of them zero.
  pub consistent_zero_lpcd_for_a_week: bool,
  pub below_55_lpcd_count:             u32,
  pub above_55_lpcd_count:             u32,
  /// The last reported reading, if any.
  pub latest_lpcd:                     Option<f64>,
}

impl LpcdFlags {
  pub fn from_readings(readings: &[Option<f64>]) -> Self {
    let present: Vec<f64> = readings.iter().flatten().copied().collect();
    Self {
      consistent_zero_lpcd_for_a_week: present.len() == LPCD_DAYS
        && present.iter().all(|v| *v == 0.0),
      below_55_lpcd_count:             present.iter().filter(|v| **v < LPCD_NORM).count() as u32,
      above_55_lpcd_count:             present.iter().filter(|v| **v >= LPCD_NORM).count() as u32,
      latest_lpcd:                     present.last().copied(),
    }
  }
}

// ─── NewVillageReading ───────────────────────────────────────────────────────

/// Input row for the `water_scheme_data` table. Flags are derived on write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewVillageReading {
  pub scheme_id:          String,
  pub scheme_name:        String,
  pub village_name:       String,
  #[serde(flatten)]
  pub hierarchy:          Hierarchy,
  /// The segments as the report spelled them.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub reported_hierarchy: Option<Hierarchy>,
  pub population:         Option<u32>,
  pub number_of_esr:      Option<u32>,
  /// Daily water quantity in ML, oldest first.
  #[serde(default)]
  pub water_values:       Vec<Option<f64>>,
  /// Daily LPCD, oldest first.
  #[serde(default)]
  pub lpcd_values:        Vec<Option<f64>>,
  /// Date label of each LPCD column, as printed in the report header.
  #[serde(default)]
  pub day_labels:         Vec<Option<String>>,
}

impl NewVillageReading {
  pub fn key(&self) -> VillageKey {
    VillageKey {
      scheme_id:    self.scheme_id.clone(),
      village_name: self.village_name.clone(),
    }
  }

  pub fn flags(&self) -> LpcdFlags { LpcdFlags::from_readings(&self.lpcd_values) }

  pub fn normalized(self, aliases: &RegionAliases) -> Self {
    let hierarchy = self.hierarchy.normalized(aliases);
    Self {
      scheme_id: normalize_segment(&self.scheme_id),
      scheme_name: normalize_segment(&self.scheme_name),
      village_name: normalize_segment(&self.village_name),
      reported_hierarchy: Some(
        self
          .reported_hierarchy
          .unwrap_or(self.hierarchy)
          .with_region_of(&hierarchy),
      ),
      hierarchy,
      ..self
    }
  }

  pub fn validate(&self) -> Result<()> {
    if self.scheme_id.trim().is_empty() {
      return Err(Error::invalid("scheme_id", "must not be blank"));
    }
    if self.village_name.trim().is_empty() {
      return Err(Error::invalid("village_name", "must not be blank"));
    }
    if self.lpcd_values.len() > LPCD_DAYS {
      return Err(Error::invalid(
        "lpcd_values",
        format!("at most {LPCD_DAYS} days, got {}", self.lpcd_values.len()),
      ));
    }
    if self.water_values.len() > WATER_DAYS {
      return Err(Error::invalid(
        "water_values",
        format!("at most {WATER_DAYS} days, got {}", self.water_values.len()),
      ));
    }
    let bad = |v: &f64| !v.is_finite() || *v < 0.0;
    if self.lpcd_values.iter().flatten().any(bad) {
      return Err(Error::invalid("lpcd_values", "readings must be non-negative"));
    }
    if self.water_values.iter().flatten().any(bad) {
      return Err(Error::invalid("water_values", "readings must be non-negative"));
    }
    Ok(())
  }
}

// ─── VillageReading ──────────────────────────────────────────────────────────

/// A persisted village reading row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VillageReading {
  pub scheme_id:          String,
  pub scheme_name:        String,
  pub village_name:       String,
  #[serde(flatten)]
  pub hierarchy:          Hierarchy,
  #[serde(skip)]
  pub reported_hierarchy: Option<Hierarchy>,
  pub population:         Option<u32>,
  pub number_of_esr:      Option<u32>,
  pub water_values:       Vec<Option<f64>>,
  pub lpcd_values:        Vec<Option<f64>>,
  pub day_labels:         Vec<Option<String>>,
  #[serde(flatten)]
  pub flags:              LpcdFlags,
  pub dashboard_url:      Option<String>,
  pub updated_at:         DateTime<Utc>,
}

impl VillageReading {
  pub fn key(&self) -> VillageKey {
    VillageKey {
      scheme_id:    self.scheme_id.clone(),
      village_name: self.village_name.clone(),
    }
  }
}
