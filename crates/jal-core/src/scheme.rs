//! Scheme status rows, one per (scheme, block) combination.
//!
//! A scheme spans one or more blocks; each block carries its own completion
//! counters for villages, ESRs and the IoT instruments integrated at them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  hierarchy::{Hierarchy, RegionAliases, normalize_segment, segment_key},
};

// ─── Key ─────────────────────────────────────────────────────────────────────

/// Composite primary key of a scheme status row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SchemeKey {
  pub scheme_id: String,
  pub block:     String,
}

// ─── Status enums ────────────────────────────────────────────────────────────

/// Operational status of a scheme as reported by the field agency.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
  strum::AsRefStr, strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FunctionalStatus {
  Functional,
  Partial,
  NonFunctional,
  #[default]
  Unknown,
}

impl FunctionalStatus {
  /// Lenient parse of the free-text status column in the reports.
  pub fn from_report(raw: &str) -> Self {
    let key: String = segment_key(raw)
      .chars()
      .filter(|c| c.is_ascii_alphanumeric())
      .collect();
    match key.as_str() {
      "functional" | "working" | "yes" => Self::Functional,
      "partial" | "partiallyfunctional" => Self::Partial,
      "nonfunctional" | "notfunctional" | "no" => Self::NonFunctional,
      _ => Self::Unknown,
    }
  }
}

/// How far the IoT integration of a scheme has progressed. Derived from the
/// counters, never stored.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
  strum::AsRefStr, strum::EnumString, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CompletionStatus {
  FullyCompleted,
  InProgress,
  NotConnected,
}

// ─── Counters ────────────────────────────────────────────────────────────────

/// Completion counters reported for a scheme/block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemeCounters {
  pub total_villages:                       u32,
  pub villages_integrated:                  u32,
  pub fully_completed_villages:             u32,
  pub total_esr:                            u32,
  pub esr_integrated_on_iot:                u32,
  pub fully_completed_esr:                  u32,
  pub flow_meters_connected:                u32,
  pub residual_chlorine_analyzer_connected: u32,
  pub pressure_transmitter_connected:       u32,
}

impl SchemeCounters {
  pub fn completion_status(&self) -> CompletionStatus {
    if self.total_villages > 0
      && self.fully_completed_villages >= self.total_villages
      && self.fully_completed_esr >= self.total_esr
    {
      CompletionStatus::FullyCompleted
    } else if self.villages_integrated == 0 && self.esr_integrated_on_iot == 0 {
      CompletionStatus::NotConnected
    } else {
      CompletionStatus::InProgress
    }
  }

  /// Villages still short of full completion.
  pub fn balance_for_full_completion(&self) -> u32 {
    self.total_villages.saturating_sub(self.fully_completed_villages)
  }

  /// ESRs integrated but not yet fully completed.
  pub fn partial_esr(&self) -> u32 {
    self.esr_integrated_on_iot.saturating_sub(self.fully_completed_esr)
  }

  pub fn validate(&self) -> Result<()> {
    let at_most = |field: &'static str, part: u32, whole_name: &str, whole: u32| {
      if part > whole {
        Err(Error::invalid(
          field,
          format!("{part} exceeds {whole_name} ({whole})"),
        ))
      } else {
        Ok(())
      }
    };
    at_most(
      "villages_integrated",
      self.villages_integrated,
      "total_villages",
      self.total_villages,
    )?;
    at_most(
      "fully_completed_villages",
      self.fully_completed_villages,
      "villages_integrated",
      self.villages_integrated,
    )?;
    at_most(
      "esr_integrated_on_iot",
      self.esr_integrated_on_iot,
      "total_esr",
      self.total_esr,
    )?;
    at_most(
      "fully_completed_esr",
      self.fully_completed_esr,
      "esr_integrated_on_iot",
      self.esr_integrated_on_iot,
    )
  }
}

// ─── NewScheme ───────────────────────────────────────────────────────────────

/// Input to [`crate::store::SchemeStore::upsert_scheme`]; `updated_at` and the
/// dashboard URL are always set by the store side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewScheme {
  pub scheme_id:          String,
  pub scheme_name:        String,
  #[serde(flatten)]
  pub hierarchy:          Hierarchy,
  /// The segments as the report spelled them. Filled in by
  /// [`normalized`](Self::normalized).
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub reported_hierarchy: Option<Hierarchy>,
  pub agency:             Option<String>,
  #[serde(flatten)]
  pub counters:           SchemeCounters,
  #[serde(default)]
  pub functional_status:  FunctionalStatus,
}

impl NewScheme {
  pub fn key(&self) -> SchemeKey {
    SchemeKey {
      scheme_id: self.scheme_id.clone(),
      block:     self.hierarchy.block.clone(),
    }
  }

  /// Normalise every text field and resolve the region alias.
  pub fn normalized(self, aliases: &RegionAliases) -> Self {
    let hierarchy = self.hierarchy.normalized(aliases);
    Self {
      scheme_id: normalize_segment(&self.scheme_id),
      scheme_name: normalize_segment(&self.scheme_name),
      reported_hierarchy: Some(
        self
          .reported_hierarchy
          .unwrap_or(self.hierarchy)
          .with_region_of(&hierarchy),
      ),
      hierarchy,
      agency: self
        .agency
        .map(|a| normalize_segment(&a))
        .filter(|a| !a.is_empty()),
      ..self
    }
  }

  pub fn validate(&self) -> Result<()> {
    if self.scheme_id.trim().is_empty() {
      return Err(Error::invalid("scheme_id", "must not be blank"));
    }
    if self.hierarchy.block.trim().is_empty() {
      return Err(Error::invalid("block", "must not be blank"));
    }
    if self.hierarchy.region.trim().is_empty() {
      return Err(Error::invalid("region", "must not be blank"));
    }
    self.counters.validate()
  }
}

// ─── SchemeStatus ────────────────────────────────────────────────────────────

/// A persisted scheme status row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemeStatus {
  pub scheme_id:          String,
  pub scheme_name:        String,
  #[serde(flatten)]
  pub hierarchy:          Hierarchy,
  #[serde(skip)]
  pub reported_hierarchy: Option<Hierarchy>,
  pub agency:             Option<String>,
  #[serde(flatten)]
  pub counters:           SchemeCounters,
  pub functional_status:  FunctionalStatus,
  pub dashboard_url:      Option<String>,
  pub updated_at:         DateTime<Utc>,
}

impl SchemeStatus {
  pub fn key(&self) -> SchemeKey {
    SchemeKey {
      scheme_id: self.scheme_id.clone(),
      block:     self.hierarchy.block.clone(),
    }
  }

  pub fn completion_status(&self) -> CompletionStatus { self.counters.completion_status() }

  /// Attach the derived fields for API consumers.
  pub fn into_view(self) -> SchemeView {
    SchemeView {
      completion_status:           self.counters.completion_status(),
      balance_for_full_completion: self.counters.balance_for_full_completion(),
      scheme:                      self,
    }
  }
}

/// A scheme row together with its derived completion fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemeView {
  #[serde(flatten)]
  pub scheme:                      SchemeStatus,
  pub completion_status:           CompletionStatus,
  pub balance_for_full_completion: u32,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn counters(total: u32, integrated: u32, done: u32, esr: u32, esr_int: u32, esr_done: u32) -> SchemeCounters {
    SchemeCounters {
      total_villages: total,
      villages_integrated: integrated,
      fully_completed_villages: done,
      total_esr: esr,
      esr_integrated_on_iot: esr_int,
      fully_completed_esr: esr_done,
      ..SchemeCounters::default()
    }
  }

  #[test]
  fn completion_status_is_derived_from_counters() {
    assert_eq!(
      counters(4, 4, 4, 3, 3, 3).completion_status(),
      CompletionStatus::FullyCompleted
    );
    assert_eq!(
      counters(4, 4, 4, 3, 3, 2).completion_status(),
      CompletionStatus::InProgress
    );
    assert_eq!(
      counters(4, 0, 0, 3, 0, 0).completion_status(),
      CompletionStatus::NotConnected
    );
    // A scheme with no villages is never "fully completed".
    assert_eq!(
      counters(0, 0, 0, 0, 0, 0).completion_status(),
      CompletionStatus::NotConnected
    );
  }

  #[test]
  fn balance_saturates() {
    assert_eq!(counters(10, 8, 6, 0, 0, 0).balance_for_full_completion(), 4);
    assert_eq!(counters(10, 8, 6, 5, 4, 1).partial_esr(), 3);
  }

  #[test]
  fn validate_rejects_completed_above_total() {
    let err = counters(3, 3, 3, 2, 3, 0).validate().unwrap_err();
    assert!(
      matches!(err, Error::Invalid { field: "esr_integrated_on_iot", .. }),
      "{err}"
    );
    assert!(counters(3, 2, 3, 0, 0, 0).validate().is_err());
    assert!(counters(3, 2, 1, 2, 1, 1).validate().is_ok());
  }

  #[test]
  fn functional_status_parses_report_spellings() {
    assert_eq!(FunctionalStatus::from_report("Functional"), FunctionalStatus::Functional);
    assert_eq!(FunctionalStatus::from_report(" Non-Functional "), FunctionalStatus::NonFunctional);
    assert_eq!(FunctionalStatus::from_report("Partial"), FunctionalStatus::Partial);
    assert_eq!(FunctionalStatus::from_report("??"), FunctionalStatus::Unknown);
  }

  #[test]
  fn normalized_trims_and_resolves_region() {
    let scheme = NewScheme {
      scheme_id:         " 20017891 ".into(),
      scheme_name:       "Retro  Kalamb".into(),
      hierarchy:         Hierarchy {
        region:       " aurangabad".into(),
        circle:       "Circle ".into(),
        division:     "Div".into(),
        sub_division: "Sub".into(),
        block:        " Kalamb ".into(),
      },
      reported_hierarchy: None,
      agency:            Some("  ".into()),
      counters:          SchemeCounters::default(),
      functional_status: FunctionalStatus::Unknown,
    }
    .normalized(&RegionAliases::default())
    .normalized(&RegionAliases::default());

    assert_eq!(scheme.scheme_id, "20017891");
    assert_eq!(scheme.scheme_name, "Retro Kalamb");
    assert_eq!(scheme.hierarchy.region, "Chhatrapati Sambhajinagar");
    assert_eq!(scheme.hierarchy.block, "Kalamb");
    assert_eq!(scheme.agency, None);
    // The second pass must not overwrite the spelling from the report.
    let reported = scheme.reported_hierarchy.expect("reported hierarchy");
    assert_eq!(reported.block, " Kalamb ");
    assert_eq!(reported.circle, "Circle ");
  }
}
