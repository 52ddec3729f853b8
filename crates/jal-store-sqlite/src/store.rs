//! [`SqliteStore`]: the SQLite implementation of [`SchemeStore`].

use std::{path::Path, sync::Arc};

use chrono::Utc;
use jal_core::{
  activity::{Activity, ImportBatch, NewActivity},
  hierarchy::{Hierarchy, RegionAliases, normalize_segment},
  scheme::{CompletionStatus, NewScheme, SchemeKey, SchemeStatus},
  stats::RegionSummary,
  store::{ImportCounts, SchemeQuery, SchemeStore, VillageQuery, WriteMode, WriteOutcome},
  village::{LpcdFlags, NewVillageReading, VillageKey, VillageReading},
};
use rusqlite::{OptionalExtension as _, types::Value};
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{
    ACTIVITY_COLUMNS, IMPORT_COLUMNS, REGION_COLUMNS, RawActivity, RawImport, RawRegion,
    RawScheme, RawVillage, SCHEME_COLUMNS, VILLAGE_COLUMNS, encode_dt, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── SQL fragments ───────────────────────────────────────────────────────────

const INSERT_SCHEME: &str = "INSERT INTO scheme_status (
    scheme_id, block, scheme_name, region, circle, division, sub_division, agency,
    total_villages, villages_integrated, fully_completed_villages,
    total_esr, esr_integrated_on_iot, fully_completed_esr,
    flow_meters_connected, residual_chlorine_analyzer_connected,
    pressure_transmitter_connected, functional_status, updated_at,
    reported_circle, reported_division, reported_sub_division, reported_block
  ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19,
            ?20, ?21, ?22, ?23)";

// Same positional parameters as INSERT_SCHEME; dashboard_url is left alone.
const UPDATE_SCHEME: &str = "UPDATE scheme_status SET
    scheme_name = ?3, region = ?4, circle = ?5, division = ?6, sub_division = ?7,
    agency = ?8, total_villages = ?9, villages_integrated = ?10,
    fully_completed_villages = ?11, total_esr = ?12, esr_integrated_on_iot = ?13,
    fully_completed_esr = ?14, flow_meters_connected = ?15,
    residual_chlorine_analyzer_connected = ?16, pressure_transmitter_connected = ?17,
    functional_status = ?18, updated_at = ?19, reported_circle = ?20,
    reported_division = ?21, reported_sub_division = ?22, reported_block = ?23
  WHERE scheme_id = ?1 AND block = ?2";

const INSERT_VILLAGE: &str = "INSERT INTO water_scheme_data (
    scheme_id, village_name, scheme_name, region, circle, division, sub_division,
    block, population, number_of_esr, water_values, lpcd_values, day_labels,
    consistent_zero_lpcd_for_a_week, below_55_lpcd_count, above_55_lpcd_count,
    latest_lpcd, updated_at, reported_circle, reported_division,
    reported_sub_division, reported_block
  ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18,
            ?19, ?20, ?21, ?22)";

const UPDATE_VILLAGE: &str = "UPDATE water_scheme_data SET
    scheme_name = ?3, region = ?4, circle = ?5, division = ?6, sub_division = ?7,
    block = ?8, population = ?9, number_of_esr = ?10, water_values = ?11,
    lpcd_values = ?12, day_labels = ?13, consistent_zero_lpcd_for_a_week = ?14,
    below_55_lpcd_count = ?15, above_55_lpcd_count = ?16, latest_lpcd = ?17,
    updated_at = ?18, reported_circle = ?19, reported_division = ?20,
    reported_sub_division = ?21, reported_block = ?22
  WHERE scheme_id = ?1 AND village_name = ?2";

const FULLY_COMPLETED: &str = "(total_villages > 0
  AND fully_completed_villages >= total_villages
  AND fully_completed_esr >= total_esr)";

const NOTHING_INTEGRATED: &str = "(villages_integrated = 0 AND esr_integrated_on_iot = 0)";

fn completion_condition(status: CompletionStatus) -> String {
  match status {
    CompletionStatus::FullyCompleted => FULLY_COMPLETED.to_owned(),
    CompletionStatus::NotConnected => {
      format!("NOT {FULLY_COMPLETED} AND {NOTHING_INTEGRATED}")
    }
    CompletionStatus::InProgress => {
      format!("NOT {FULLY_COMPLETED} AND NOT {NOTHING_INTEGRATED}")
    }
  }
}

/// Make `%`, `_` and `\` match literally in a `LIKE … ESCAPE '\'` pattern.
fn escape_like(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  for c in text.chars() {
    if matches!(c, '%' | '_' | '\\') {
      out.push('\\');
    }
    out.push(c);
  }
  out
}

/// Accumulates a dynamic `WHERE` clause with numbered parameters.
#[derive(Default)]
struct Filters {
  conds: Vec<String>,
  args:  Vec<Value>,
}

impl Filters {
  /// Add a condition; every `?` in `cond` is bound to `value`.
  fn push(&mut self, cond: &str, value: impl Into<Value>) {
    self.args.push(value.into());
    self
      .conds
      .push(cond.replace('?', &format!("?{}", self.args.len())));
  }

  fn push_raw(&mut self, cond: String) { self.conds.push(cond); }

  /// Render `WHERE … ORDER BY … LIMIT … OFFSET …`, binding limit and offset.
  fn finish(mut self, order_by: &str, limit: Option<usize>, offset: Option<usize>) -> (String, Vec<Value>) {
    let where_clause = if self.conds.is_empty() {
      String::new()
    } else {
      format!("WHERE {}", self.conds.join(" AND "))
    };
    self
      .args
      .push(Value::Integer(limit.map_or(-1, |l| l as i64)));
    self
      .args
      .push(Value::Integer(offset.unwrap_or(0) as i64));
    let n = self.args.len();
    (
      format!("{where_clause} ORDER BY {order_by} LIMIT ?{} OFFSET ?{}", n - 1, n),
      self.args,
    )
  }
}

// ─── Row writers ─────────────────────────────────────────────────────────────

fn write_scheme(
  conn: &rusqlite::Connection,
  s:    &NewScheme,
  now:  &str,
  mode: WriteMode,
) -> rusqlite::Result<WriteOutcome> {
  let exists = conn
    .query_row(
      "SELECT 1 FROM scheme_status WHERE scheme_id = ?1 AND block = ?2",
      rusqlite::params![s.scheme_id, s.hierarchy.block],
      |_| Ok(()),
    )
    .optional()?
    .is_some();

  if exists && mode == WriteMode::Skip {
    return Ok(WriteOutcome::Skipped);
  }

  let c = &s.counters;
  let reported = s.reported_hierarchy.as_ref();
  conn.execute(
    if exists { UPDATE_SCHEME } else { INSERT_SCHEME },
    rusqlite::params![
      s.scheme_id,
      s.hierarchy.block,
      s.scheme_name,
      s.hierarchy.region,
      s.hierarchy.circle,
      s.hierarchy.division,
      s.hierarchy.sub_division,
      s.agency,
      c.total_villages,
      c.villages_integrated,
      c.fully_completed_villages,
      c.total_esr,
      c.esr_integrated_on_iot,
      c.fully_completed_esr,
      c.flow_meters_connected,
      c.residual_chlorine_analyzer_connected,
      c.pressure_transmitter_connected,
      s.functional_status.as_ref(),
      now,
      reported.map(|h| &h.circle),
      reported.map(|h| &h.division),
      reported.map(|h| &h.sub_division),
      reported.map(|h| &h.block),
    ],
  )?;

  Ok(if exists { WriteOutcome::Updated } else { WriteOutcome::Inserted })
}

/// A village row with its JSON columns and flags computed up front, so the
/// database closure only does I/O.
struct PreparedVillage {
  row:    NewVillageReading,
  water:  String,
  lpcd:   String,
  labels: String,
  flags:  LpcdFlags,
}

impl PreparedVillage {
  fn new(row: NewVillageReading) -> Result<Self> {
    Ok(Self {
      water:  serde_json::to_string(&row.water_values)?,
      lpcd:   serde_json::to_string(&row.lpcd_values)?,
      labels: serde_json::to_string(&row.day_labels)?,
      flags:  row.flags(),
      row,
    })
  }
}

fn write_village(
  conn: &rusqlite::Connection,
  v:    &PreparedVillage,
  now:  &str,
  mode: WriteMode,
) -> rusqlite::Result<WriteOutcome> {
  let r = &v.row;
  let exists = conn
    .query_row(
      "SELECT 1 FROM water_scheme_data WHERE scheme_id = ?1 AND village_name = ?2",
      rusqlite::params![r.scheme_id, r.village_name],
      |_| Ok(()),
    )
    .optional()?
    .is_some();

  if exists && mode == WriteMode::Skip {
    return Ok(WriteOutcome::Skipped);
  }

  let reported = r.reported_hierarchy.as_ref();
  conn.execute(
    if exists { UPDATE_VILLAGE } else { INSERT_VILLAGE },
    rusqlite::params![
      r.scheme_id,
      r.village_name,
      r.scheme_name,
      r.hierarchy.region,
      r.hierarchy.circle,
      r.hierarchy.division,
      r.hierarchy.sub_division,
      r.hierarchy.block,
      r.population,
      r.number_of_esr,
      v.water,
      v.lpcd,
      v.labels,
      v.flags.consistent_zero_lpcd_for_a_week,
      v.flags.below_55_lpcd_count,
      v.flags.above_55_lpcd_count,
      v.flags.latest_lpcd,
      now,
      reported.map(|h| &h.circle),
      reported.map(|h| &h.division),
      reported.map(|h| &h.sub_division),
      reported.map(|h| &h.block),
    ],
  )?;

  Ok(if exists { WriteOutcome::Updated } else { WriteOutcome::Inserted })
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Jal store backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn:    tokio_rusqlite::Connection,
  aliases: Arc<RegionAliases>,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn, aliases: Arc::new(RegionAliases::default()) };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn, aliases: Arc::new(RegionAliases::default()) };
    store.init_schema().await?;
    Ok(store)
  }

  /// Replace the region alias table used to normalise writes and lookups.
  pub fn with_region_aliases(mut self, aliases: RegionAliases) -> Self {
    self.aliases = Arc::new(aliases);
    self
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  fn prepare_schemes(&self, rows: Vec<NewScheme>) -> Result<Vec<NewScheme>> {
    rows
      .into_iter()
      .enumerate()
      .map(|(index, row)| {
        let row = row.normalized(&self.aliases);
        row
          .validate()
          .map_err(|source| Error::InvalidRow { index, source })?;
        Ok(row)
      })
      .collect()
  }

  fn prepare_villages(&self, rows: Vec<NewVillageReading>) -> Result<Vec<PreparedVillage>> {
    rows
      .into_iter()
      .enumerate()
      .map(|(index, row)| {
        let row = row.normalized(&self.aliases);
        row
          .validate()
          .map_err(|source| Error::InvalidRow { index, source })?;
        PreparedVillage::new(row)
      })
      .collect()
  }

  async fn query_schemes(&self, sql: String, args: Vec<Value>) -> Result<Vec<SchemeStatus>> {
    let raws: Vec<RawScheme> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(args), RawScheme::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawScheme::into_scheme).collect()
  }
}

// ─── SchemeStore impl ────────────────────────────────────────────────────────

impl SchemeStore for SqliteStore {
  type Error = Error;

  // ── Schemes ───────────────────────────────────────────────────────────────

  async fn upsert_scheme(&self, input: NewScheme, mode: WriteMode) -> Result<WriteOutcome> {
    let row = input.normalized(&self.aliases);
    row.validate()?;
    let now = encode_dt(Utc::now());

    let outcome = self
      .conn
      .call(move |conn| Ok(write_scheme(conn, &row, &now, mode)?))
      .await?;
    Ok(outcome)
  }

  async fn import_schemes(&self, rows: Vec<NewScheme>, mode: WriteMode) -> Result<ImportCounts> {
    let rows = self.prepare_schemes(rows)?;
    let now = encode_dt(Utc::now());

    let counts = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut counts = ImportCounts::default();
        for row in &rows {
          counts.add(write_scheme(&tx, row, &now, mode)?);
        }
        tx.commit()?;
        Ok(counts)
      })
      .await?;

    tracing::debug!(
      inserted = counts.inserted,
      updated = counts.updated,
      skipped = counts.skipped_duplicates,
      "scheme batch written"
    );
    Ok(counts)
  }

  async fn get_scheme(&self, key: SchemeKey) -> Result<Option<SchemeStatus>> {
    let scheme_id = normalize_segment(&key.scheme_id);
    let block     = normalize_segment(&key.block);

    let raw: Option<RawScheme> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {SCHEME_COLUMNS} FROM scheme_status
                 WHERE scheme_id = ?1 AND block = ?2 COLLATE NOCASE"
              ),
              rusqlite::params![scheme_id, block],
              RawScheme::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawScheme::into_scheme).transpose()
  }

  async fn schemes_by_id(&self, scheme_id: String) -> Result<Vec<SchemeStatus>> {
    self
      .query_schemes(
        format!(
          "SELECT {SCHEME_COLUMNS} FROM scheme_status WHERE scheme_id = ?1 ORDER BY block"
        ),
        vec![Value::Text(normalize_segment(&scheme_id))],
      )
      .await
  }

  async fn list_schemes(&self, query: &SchemeQuery) -> Result<Vec<SchemeStatus>> {
    let mut filters = Filters::default();
    if let Some(region) = &query.region {
      filters.push("region = ? COLLATE NOCASE", self.aliases.canonical(region));
    }
    for (column, value) in [
      ("circle", &query.circle),
      ("division", &query.division),
      ("sub_division", &query.sub_division),
      ("block", &query.block),
    ] {
      if let Some(value) = value {
        filters.push(&format!("{column} = ? COLLATE NOCASE"), normalize_segment(value));
      }
    }
    if let Some(status) = query.completion {
      filters.push_raw(completion_condition(status));
    }
    if let Some(text) = query.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
      filters.push(
        r"(scheme_id LIKE ? ESCAPE '\' OR scheme_name LIKE ? ESCAPE '\')",
        format!("%{}%", escape_like(text)),
      );
    }

    let (tail, args) = filters.finish(
      "region, circle, division, sub_division, block, scheme_id",
      query.limit,
      query.offset,
    );
    self
      .query_schemes(format!("SELECT {SCHEME_COLUMNS} FROM scheme_status {tail}"), args)
      .await
  }

  async fn hierarchy(&self, region: Option<String>) -> Result<Vec<Hierarchy>> {
    let region = region.map(|r| self.aliases.canonical(&r));

    let rows = self
      .conn
      .call(move |conn| {
        let mut sql = String::from(
          "SELECT DISTINCT region, circle, division, sub_division, block FROM scheme_status",
        );
        if region.is_some() {
          sql.push_str(" WHERE region = ?1 COLLATE NOCASE");
        }
        sql.push_str(" ORDER BY 1, 2, 3, 4, 5");

        let mut stmt = conn.prepare(&sql)?;
        let map_row = |row: &rusqlite::Row<'_>| {
          Ok(Hierarchy {
            region:       row.get(0)?,
            circle:       row.get(1)?,
            division:     row.get(2)?,
            sub_division: row.get(3)?,
            block:        row.get(4)?,
          })
        };
        let rows = match &region {
          Some(r) => stmt.query_map(rusqlite::params![r], map_row)?,
          None => stmt.query_map([], map_row)?,
        }
        .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(rows)
  }

  async fn set_dashboard_url(&self, key: SchemeKey, url: String) -> Result<bool> {
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE scheme_status SET dashboard_url = ?3 WHERE scheme_id = ?1 AND block = ?2",
          rusqlite::params![key.scheme_id, key.block, url],
        )?)
      })
      .await?;
    Ok(changed > 0)
  }

  // ── Regions ───────────────────────────────────────────────────────────────

  async fn refresh_region_summaries(&self) -> Result<Vec<RegionSummary>> {
    let schemes = self.list_schemes(&SchemeQuery::default()).await?;
    let now = Utc::now();
    let summaries = RegionSummary::group(&schemes, now);

    let rows = summaries.clone();
    let now_str = encode_dt(now);
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM region", [])?;
        for r in &rows {
          tx.execute(
            &format!(
              "INSERT INTO region ({REGION_COLUMNS})
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"
            ),
            rusqlite::params![
              r.region_name,
              r.total_schemes_integrated,
              r.fully_completed_schemes,
              r.total_villages_integrated,
              r.fully_completed_villages,
              r.total_esr_integrated,
              r.fully_completed_esr,
              r.partial_esr,
              r.flow_meter_integrated,
              r.rca_integrated,
              r.pressure_transmitter_integrated,
              now_str,
            ],
          )?;
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    tracing::info!(regions = summaries.len(), schemes = schemes.len(), "region summaries refreshed");
    Ok(summaries)
  }

  async fn list_regions(&self) -> Result<Vec<RegionSummary>> {
    let raws: Vec<RawRegion> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare(&format!("SELECT {REGION_COLUMNS} FROM region ORDER BY region_name"))?;
        let rows = stmt
          .query_map([], RawRegion::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRegion::into_summary).collect()
  }

  async fn get_region(&self, name: String) -> Result<Option<RegionSummary>> {
    let name = self.aliases.canonical(&name);

    let raw: Option<RawRegion> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {REGION_COLUMNS} FROM region WHERE region_name = ?1 COLLATE NOCASE"
              ),
              rusqlite::params![name],
              RawRegion::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawRegion::into_summary).transpose()
  }

  // ── Village readings ──────────────────────────────────────────────────────

  async fn import_village_readings(
    &self,
    rows: Vec<NewVillageReading>,
    mode: WriteMode,
  ) -> Result<ImportCounts> {
    let rows = self.prepare_villages(rows)?;
    let now = encode_dt(Utc::now());

    let counts = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut counts = ImportCounts::default();
        for row in &rows {
          counts.add(write_village(&tx, row, &now, mode)?);
        }
        tx.commit()?;
        Ok(counts)
      })
      .await?;

    tracing::debug!(
      inserted = counts.inserted,
      updated = counts.updated,
      skipped = counts.skipped_duplicates,
      "village batch written"
    );
    Ok(counts)
  }

  async fn list_village_readings(&self, query: &VillageQuery) -> Result<Vec<VillageReading>> {
    let mut filters = Filters::default();
    if let Some(region) = &query.region {
      filters.push("region = ? COLLATE NOCASE", self.aliases.canonical(region));
    }
    if let Some(scheme_id) = &query.scheme_id {
      filters.push("scheme_id = ?", normalize_segment(scheme_id));
    }
    if let Some(block) = &query.block {
      filters.push("block = ? COLLATE NOCASE", normalize_segment(block));
    }
    if let Some(min) = query.min_lpcd {
      filters.push("latest_lpcd >= ?", min);
    }
    if let Some(max) = query.max_lpcd {
      filters.push("latest_lpcd <= ?", max);
    }
    if query.zero_week {
      filters.push_raw("consistent_zero_lpcd_for_a_week = 1".to_owned());
    }

    let (tail, args) =
      filters.finish("region, scheme_id, village_name", query.limit, query.offset);
    let sql = format!("SELECT {VILLAGE_COLUMNS} FROM water_scheme_data {tail}");

    let raws: Vec<RawVillage> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(args), RawVillage::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawVillage::into_reading).collect()
  }

  async fn set_village_dashboard_url(&self, key: VillageKey, url: String) -> Result<bool> {
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE water_scheme_data SET dashboard_url = ?3
           WHERE scheme_id = ?1 AND village_name = ?2",
          rusqlite::params![key.scheme_id, key.village_name, url],
        )?)
      })
      .await?;
    Ok(changed > 0)
  }

  // ── Activity & audit ──────────────────────────────────────────────────────

  async fn record_activity(&self, input: NewActivity) -> Result<Activity> {
    let activity = Activity {
      id:            Uuid::new_v4(),
      session_id:    input.session_id,
      activity_type: input.activity_type,
      description:   input.description,
      page:          input.page,
      metadata:      input.metadata,
      recorded_at:   Utc::now(),
    };

    let id_str       = encode_uuid(activity.id);
    let session_id   = activity.session_id.clone();
    let kind_str     = activity.activity_type.as_ref().to_owned();
    let description  = activity.description.clone();
    let page         = activity.page.clone();
    let metadata_str = activity
      .metadata
      .as_ref()
      .map(serde_json::to_string)
      .transpose()?;
    let at_str       = encode_dt(activity.recorded_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!("INSERT INTO activity_log ({ACTIVITY_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
          rusqlite::params![id_str, session_id, kind_str, description, page, metadata_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(activity)
  }

  async fn recent_activity(&self, limit: usize) -> Result<Vec<Activity>> {
    let limit = limit as i64;

    let raws: Vec<RawActivity> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ACTIVITY_COLUMNS} FROM activity_log
           ORDER BY recorded_at DESC, rowid DESC LIMIT ?1"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![limit], RawActivity::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawActivity::into_activity).collect()
  }

  async fn record_import(&self, batch: ImportBatch) -> Result<()> {
    let id_str = encode_uuid(batch.batch_id);
    let kind   = batch.kind.as_ref().to_owned();
    let at_str = encode_dt(batch.imported_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!(
            "INSERT INTO import_batch ({IMPORT_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
          ),
          rusqlite::params![
            id_str,
            kind,
            batch.file_name,
            batch.content_sha256,
            batch.rows_read,
            batch.counts.inserted,
            batch.counts.updated,
            batch.counts.skipped_duplicates,
            batch.invalid_rows,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn find_import_by_hash(&self, content_sha256: String) -> Result<Option<ImportBatch>> {
    let raw: Option<RawImport> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {IMPORT_COLUMNS} FROM import_batch
                 WHERE content_sha256 = ?1 ORDER BY imported_at LIMIT 1"
              ),
              rusqlite::params![content_sha256],
              RawImport::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawImport::into_batch).transpose()
  }
}
