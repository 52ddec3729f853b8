//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings. Enum columns hold the snake_case variant
//! name. Per-day readings are compact JSON arrays. UUIDs are hyphenated
//! lowercase strings.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use jal_core::{
  activity::{Activity, ActivityKind, ImportBatch, ImportKind},
  hierarchy::Hierarchy,
  scheme::{FunctionalStatus, SchemeCounters, SchemeStatus},
  stats::RegionSummary,
  store::ImportCounts,
  village::{LpcdFlags, VillageReading},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

/// Fixed-width so that text ordering matches chronological ordering.
pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339_opts(SecondsFormat::Nanos, true) }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

fn decode_enum<T: FromStr>(kind: &'static str, s: &str) -> Result<T> {
  T::from_str(s).map_err(|_| Error::UnknownVariant {
    kind,
    value: s.to_owned(),
  })
}

// ─── Column lists ────────────────────────────────────────────────────────────

pub const SCHEME_COLUMNS: &str = "scheme_id, scheme_name, region, circle, division,
  sub_division, block, agency, total_villages, villages_integrated,
  fully_completed_villages, total_esr, esr_integrated_on_iot, fully_completed_esr,
  flow_meters_connected, residual_chlorine_analyzer_connected,
  pressure_transmitter_connected, functional_status, dashboard_url, updated_at,
  reported_circle, reported_division, reported_sub_division, reported_block";

pub const REGION_COLUMNS: &str = "region_name, total_schemes_integrated,
  fully_completed_schemes, total_villages_integrated, fully_completed_villages,
  total_esr_integrated, fully_completed_esr, partial_esr, flow_meter_integrated,
  rca_integrated, pressure_transmitter_integrated, updated_at";

pub const VILLAGE_COLUMNS: &str = "scheme_id, scheme_name, village_name, region,
  circle, division, sub_division, block, population, number_of_esr, water_values,
  lpcd_values, day_labels, consistent_zero_lpcd_for_a_week, below_55_lpcd_count,
  above_55_lpcd_count, latest_lpcd, dashboard_url, updated_at, reported_circle,
  reported_division, reported_sub_division, reported_block";

pub const ACTIVITY_COLUMNS: &str =
  "id, session_id, activity_type, description, page, metadata, recorded_at";

pub const IMPORT_COLUMNS: &str = "batch_id, kind, file_name, content_sha256,
  rows_read, inserted, updated, skipped_duplicates, invalid_rows, imported_at";

// ─── Row types ───────────────────────────────────────────────────────────────

/// The four `reported_*` columns starting at `first`. Rows written before the
/// report spelling was captured have them all NULL.
fn reported_from_row(
  row: &rusqlite::Row<'_>,
  first: usize,
  region: &str,
) -> rusqlite::Result<Option<Hierarchy>> {
  let circle: Option<String> = row.get(first)?;
  let division: Option<String> = row.get(first + 1)?;
  let sub_division: Option<String> = row.get(first + 2)?;
  let block: Option<String> = row.get(first + 3)?;
  Ok(match (circle, division, sub_division, block) {
    (Some(circle), Some(division), Some(sub_division), Some(block)) => Some(Hierarchy {
      region: region.to_owned(),
      circle,
      division,
      sub_division,
      block,
    }),
    _ => None,
  })
}

/// A `scheme_status` row; everything except the timestamp and status is
/// already typed by rusqlite.
pub struct RawScheme {
  pub scheme_id:          String,
  pub scheme_name:        String,
  pub hierarchy:          Hierarchy,
  pub reported_hierarchy: Option<Hierarchy>,
  pub agency:             Option<String>,
  pub counters:           SchemeCounters,
  pub functional_status:  String,
  pub dashboard_url:      Option<String>,
  pub updated_at:         String,
}

impl RawScheme {
  /// Read a row selected with [`SCHEME_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    let region: String = row.get(2)?;
    Ok(Self {
      scheme_id:          row.get(0)?,
      scheme_name:        row.get(1)?,
      reported_hierarchy: reported_from_row(row, 20, &region)?,
      hierarchy:          Hierarchy {
        region,
        circle:       row.get(3)?,
        division:     row.get(4)?,
        sub_division: row.get(5)?,
        block:        row.get(6)?,
      },
      agency:             row.get(7)?,
      counters:           SchemeCounters {
        total_villages:                       row.get(8)?,
        villages_integrated:                  row.get(9)?,
        fully_completed_villages:             row.get(10)?,
        total_esr:                            row.get(11)?,
        esr_integrated_on_iot:                row.get(12)?,
        fully_completed_esr:                  row.get(13)?,
        flow_meters_connected:                row.get(14)?,
        residual_chlorine_analyzer_connected: row.get(15)?,
        pressure_transmitter_connected:       row.get(16)?,
      },
      functional_status:  row.get(17)?,
      dashboard_url:      row.get(18)?,
      updated_at:         row.get(19)?,
    })
  }

  pub fn into_scheme(self) -> Result<SchemeStatus> {
    Ok(SchemeStatus {
      scheme_id:          self.scheme_id,
      scheme_name:        self.scheme_name,
      hierarchy:          self.hierarchy,
      reported_hierarchy: self.reported_hierarchy,
      agency:             self.agency,
      counters:           self.counters,
      functional_status:  decode_enum::<FunctionalStatus>(
        "functional status",
        &self.functional_status,
      )?,
      dashboard_url:      self.dashboard_url,
      updated_at:         decode_dt(&self.updated_at)?,
    })
  }
}

pub struct RawRegion {
  pub summary:    RegionSummary,
  pub updated_at: String,
}

impl RawRegion {
  /// Read a row selected with [`REGION_COLUMNS`]. The timestamp is decoded
  /// afterwards in [`into_summary`](Self::into_summary).
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      summary:    RegionSummary {
        region_name:                     row.get(0)?,
        total_schemes_integrated:        row.get(1)?,
        fully_completed_schemes:         row.get(2)?,
        total_villages_integrated:       row.get(3)?,
        fully_completed_villages:        row.get(4)?,
        total_esr_integrated:            row.get(5)?,
        fully_completed_esr:             row.get(6)?,
        partial_esr:                     row.get(7)?,
        flow_meter_integrated:           row.get(8)?,
        rca_integrated:                  row.get(9)?,
        pressure_transmitter_integrated: row.get(10)?,
        updated_at:                      DateTime::<Utc>::UNIX_EPOCH,
      },
      updated_at: row.get(11)?,
    })
  }

  pub fn into_summary(self) -> Result<RegionSummary> {
    Ok(RegionSummary {
      updated_at: decode_dt(&self.updated_at)?,
      ..self.summary
    })
  }
}

pub struct RawVillage {
  pub scheme_id:     String,
  pub scheme_name:   String,
  pub village_name:  String,
  pub hierarchy:     Hierarchy,
  pub reported:      Option<Hierarchy>,
  pub population:    Option<u32>,
  pub number_of_esr: Option<u32>,
  pub water_values:  String,
  pub lpcd_values:   String,
  pub day_labels:    String,
  pub flags:         LpcdFlags,
  pub dashboard_url: Option<String>,
  pub updated_at:    String,
}

impl RawVillage {
  /// Read a row selected with [`VILLAGE_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    let region: String = row.get(3)?;
    Ok(Self {
      scheme_id:     row.get(0)?,
      scheme_name:   row.get(1)?,
      village_name:  row.get(2)?,
      reported:      reported_from_row(row, 19, &region)?,
      hierarchy:     Hierarchy {
        region,
        circle:       row.get(4)?,
        division:     row.get(5)?,
        sub_division: row.get(6)?,
        block:        row.get(7)?,
      },
      population:    row.get(8)?,
      number_of_esr: row.get(9)?,
      water_values:  row.get(10)?,
      lpcd_values:   row.get(11)?,
      day_labels:    row.get(12)?,
      flags:         LpcdFlags {
        consistent_zero_lpcd_for_a_week: row.get(13)?,
        below_55_lpcd_count:             row.get(14)?,
        above_55_lpcd_count:             row.get(15)?,
        latest_lpcd:                     row.get(16)?,
      },
      dashboard_url: row.get(17)?,
      updated_at:    row.get(18)?,
    })
  }

  pub fn into_reading(self) -> Result<VillageReading> {
    Ok(VillageReading {
      scheme_id:     self.scheme_id,
      scheme_name:   self.scheme_name,
      village_name:  self.village_name,
      hierarchy:     self.hierarchy,
      reported_hierarchy: self.reported,
      population:    self.population,
      number_of_esr: self.number_of_esr,
      water_values:  serde_json::from_str(&self.water_values)?,
      lpcd_values:   serde_json::from_str(&self.lpcd_values)?,
      day_labels:    serde_json::from_str(&self.day_labels)?,
      flags:         self.flags,
      dashboard_url: self.dashboard_url,
      updated_at:    decode_dt(&self.updated_at)?,
    })
  }
}

pub struct RawActivity {
  pub id:            String,
  pub session_id:    Option<String>,
  pub activity_type: String,
  pub description:   Option<String>,
  pub page:          Option<String>,
  pub metadata:      Option<String>,
  pub recorded_at:   String,
}

impl RawActivity {
  /// Read a row selected with [`ACTIVITY_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get(0)?,
      session_id:    row.get(1)?,
      activity_type: row.get(2)?,
      description:   row.get(3)?,
      page:          row.get(4)?,
      metadata:      row.get(5)?,
      recorded_at:   row.get(6)?,
    })
  }

  pub fn into_activity(self) -> Result<Activity> {
    Ok(Activity {
      id:            decode_uuid(&self.id)?,
      session_id:    self.session_id,
      activity_type: decode_enum::<ActivityKind>("activity type", &self.activity_type)?,
      description:   self.description,
      page:          self.page,
      metadata:      self
        .metadata
        .as_deref()
        .map(serde_json::from_str)
        .transpose()?,
      recorded_at:   decode_dt(&self.recorded_at)?,
    })
  }
}

pub struct RawImport {
  pub batch_id:       String,
  pub kind:           String,
  pub file_name:      Option<String>,
  pub content_sha256: String,
  pub rows_read:      u32,
  pub counts:         ImportCounts,
  pub invalid_rows:   u32,
  pub imported_at:    String,
}

impl RawImport {
  /// Read a row selected with [`IMPORT_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      batch_id:       row.get(0)?,
      kind:           row.get(1)?,
      file_name:      row.get(2)?,
      content_sha256: row.get(3)?,
      rows_read:      row.get(4)?,
      counts:         ImportCounts {
        inserted:           row.get(5)?,
        updated:            row.get(6)?,
        skipped_duplicates: row.get(7)?,
      },
      invalid_rows:   row.get(8)?,
      imported_at:    row.get(9)?,
    })
  }

  pub fn into_batch(self) -> Result<ImportBatch> {
    Ok(ImportBatch {
      batch_id:       decode_uuid(&self.batch_id)?,
      kind:           decode_enum::<ImportKind>("import kind", &self.kind)?,
      file_name:      self.file_name,
      content_sha256: self.content_sha256,
      rows_read:      self.rows_read,
      counts:         self.counts,
      invalid_rows:   self.invalid_rows,
      imported_at:    decode_dt(&self.imported_at)?,
    })
  }
}
