//! Village water-supply report sheets → [`NewVillageReading`].
//!
//! Besides the fixed columns, these sheets carry a run of daily water
//! quantity columns and a run of daily LPCD columns whose headers name the
//! day (`"LPCD 12-Mar"`). Both runs are picked up left to right.

use jal_core::{
  hierarchy::{Hierarchy, RegionAliases},
  village::{LPCD_DAYS, NewVillageReading, WATER_DAYS},
};

use crate::{
  grid::Grid,
  header::{ColumnMap, FieldAliases, contains_phrase, header_texts},
  sheet::{SheetLayout, is_total_row, optional_count_at, raw_text_at, sheet_region, text_at},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WaterField {
  Region,
  Circle,
  SubDivision,
  Division,
  Block,
  SchemeId,
  SchemeName,
  VillageName,
  Population,
  NumberOfEsr,
}

/// Words that mark a per-village LPCD statistic rather than a daily reading.
const LPCD_STAT_WORDS: [&str; 7] = ["below", "above", "zero", "consistent", "count", "average", "avg"];

const WATER_WORDS: [&str; 6] = ["value", "quantity", "qty", "supplied", "ml", "consumption"];

pub(crate) struct WaterSheet {
  columns:    ColumnMap<WaterField>,
  water_cols: Vec<usize>,
  lpcd_cols:  Vec<(usize, Option<String>)>,
  region:     Option<String>,
  aliases:    RegionAliases,
}

impl SheetLayout for WaterSheet {
  type Field = WaterField;
  type Row = NewVillageReading;

  const FIELDS: &'static [FieldAliases<WaterField>] = {
    use WaterField as F;
    &[
      (F::Region, &["region"]),
      (F::Circle, &["circle"]),
      (F::SubDivision, &["sub division", "subdivision"]),
      (F::Division, &["division"]),
      (F::Block, &["block", "taluka"]),
      (F::SchemeId, &["scheme id", "scheme code", "schemeid"]),
      (F::SchemeName, &["scheme name", "name of scheme", "name of the scheme", "scheme"]),
      (F::VillageName, &["village name", "name of village", "village"]),
      (F::Population, &["population"]),
      (F::NumberOfEsr, &["no of esr", "number of esr", "esr"]),
    ]
  };

  const REQUIRED: &'static [(WaterField, &'static str)] =
    &[(WaterField::SchemeId, "scheme id"), (WaterField::VillageName, "village name")];

  fn new(
    sheet: &str,
    grid: &Grid,
    header_row: usize,
    columns: ColumnMap<WaterField>,
    aliases: &RegionAliases,
  ) -> Self {
    let headers = header_texts(grid, header_row);
    let mut water_cols = Vec::new();
    let mut lpcd_cols = Vec::new();

    for col in columns.unclaimed(headers.len()) {
      let h = &headers[col];
      if contains_phrase(h, "lpcd") {
        if lpcd_cols.len() < LPCD_DAYS && !LPCD_STAT_WORDS.iter().any(|w| contains_phrase(h, w)) {
          let raw = grid.cell(header_row, col).text().unwrap_or_default();
          lpcd_cols.push((col, day_label(&raw)));
        }
      } else if contains_phrase(h, "water")
        && WATER_WORDS.iter().any(|w| contains_phrase(h, w))
        && water_cols.len() < WATER_DAYS
      {
        water_cols.push(col);
      }
    }

    Self {
      columns,
      water_cols,
      lpcd_cols,
      region: sheet_region(sheet, aliases),
      aliases: aliases.clone(),
    }
  }

  fn parse_row(&self, grid: &Grid, row: usize) -> Result<Option<NewVillageReading>, String> {
    let col = |f| self.columns.get(f);
    let text = |f| text_at(grid, row, col(f));
    let segment = |f| raw_text_at(grid, row, col(f)).unwrap_or_default();

    let Some(scheme_id) = text(WaterField::SchemeId) else {
      if is_total_row(grid, row) {
        return Ok(None);
      }
      return Err("scheme id is blank".into());
    };
    let Some(village_name) = text(WaterField::VillageName) else {
      return Err("village name is blank".into());
    };

    let reading = |c: usize, what: &str, day: usize| {
      grid
        .cell(row, c)
        .number()
        .map_err(|e| format!("{what} day {}: {e}", day + 1))
    };
    let water_values = self
      .water_cols
      .iter()
      .enumerate()
      .map(|(day, &c)| reading(c, "water", day))
      .collect::<Result<Vec<_>, _>>()?;
    let lpcd_values = self
      .lpcd_cols
      .iter()
      .enumerate()
      .map(|(day, (c, _))| reading(*c, "LPCD", day))
      .collect::<Result<Vec<_>, _>>()?;

    let reading = NewVillageReading {
      scheme_id,
      scheme_name: text(WaterField::SchemeName).unwrap_or_default(),
      village_name,
      hierarchy: Hierarchy {
        region:       text(WaterField::Region)
          .or_else(|| self.region.clone())
          .unwrap_or_default(),
        circle:       segment(WaterField::Circle),
        division:     segment(WaterField::Division),
        sub_division: segment(WaterField::SubDivision),
        block:        segment(WaterField::Block),
      },
      reported_hierarchy: None,
      population: optional_count_at(grid, row, col(WaterField::Population), "population")?,
      number_of_esr: optional_count_at(grid, row, col(WaterField::NumberOfEsr), "number of ESR")?,
      water_values,
      lpcd_values,
      day_labels: self.lpcd_cols.iter().map(|(_, label)| label.clone()).collect(),
    }
    .normalized(&self.aliases);

    reading.validate().map_err(|e| e.to_string())?;
    Ok(Some(reading))
  }
}

/// The day part of an LPCD header: `"LPCD 12-Mar"` → `"12-Mar"`,
/// `"12/03 LPCD"` → `"12/03"`, `"LPCD Value"` → `None`.
fn day_label(raw: &str) -> Option<String> {
  let lower = raw.to_ascii_lowercase();
  let at = lower.find("lpcd")?;
  let tidy = |s: &str| {
    let s = s.trim_matches(|c: char| !c.is_alphanumeric());
    let s = if s.to_ascii_lowercase().starts_with("value") { &s[5..] } else { s };
    let s = s.trim_matches(|c: char| !c.is_alphanumeric());
    (!s.is_empty()).then(|| s.to_owned())
  };
  tidy(&raw[at + 4..]).or_else(|| tidy(&raw[..at]))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{ImportOptions, parse_water_sheets};

  #[test]
  fn day_labels_come_from_lpcd_headers() {
    assert_eq!(day_label("LPCD 12-Mar").as_deref(), Some("12-Mar"));
    assert_eq!(day_label("Lpcd (12/03/2025)").as_deref(), Some("12/03/2025"));
    assert_eq!(day_label("12/03 LPCD").as_deref(), Some("12/03"));
    assert_eq!(day_label("LPCD Value Day 1").as_deref(), Some("Day 1"));
    assert_eq!(day_label("LPCD Value"), None);
  }

  fn parse(rows: Vec<Vec<&'static str>>) -> crate::Parsed<NewVillageReading> {
    parse_water_sheets(
      &[("Pune".to_owned(), Grid::from_text(&rows))],
      &ImportOptions::default(),
      &RegionAliases::default(),
    )
  }

  #[test]
  fn readings_and_labels_are_collected_in_column_order() {
    let parsed = parse(vec![
      vec![
        "Scheme ID", "Scheme Name", "Village Name", "Block", "Population",
        "Water Value Day 1", "Water Value Day 2", "LPCD 1-Mar", "LPCD 2-Mar",
        "LPCD 3-Mar", "Below 55 LPCD Count",
      ],
      vec!["S1", "Big Scheme", " Wagholi ", "Haveli", "1200", "0.5", "-", "40", "NA", "60", "2"],
    ]);

    assert_eq!(parsed.report.invalid_rows(), 0);
    let r = &parsed.rows[0];
    assert_eq!(r.village_name, "Wagholi");
    assert_eq!(r.hierarchy.region, "Pune");
    assert_eq!(r.population, Some(1200));
    assert_eq!(r.water_values, vec![Some(0.5), None]);
    assert_eq!(r.lpcd_values, vec![Some(40.0), None, Some(60.0)]);
    assert_eq!(
      r.day_labels,
      vec![Some("1-Mar".to_owned()), Some("2-Mar".to_owned()), Some("3-Mar".to_owned())]
    );
    let flags = r.flags();
    assert_eq!(flags.below_55_lpcd_count, 1);
    assert_eq!(flags.above_55_lpcd_count, 1);
  }

  #[test]
  fn at_most_seven_lpcd_columns_are_used() {
    let mut header = vec!["Scheme ID", "Village Name", "Scheme Name"];
    header.extend(["LPCD D1", "LPCD D2", "LPCD D3", "LPCD D4", "LPCD D5", "LPCD D6", "LPCD D7", "LPCD D8"]);
    let mut row = vec!["S1", "V", "X"];
    row.extend(["0"; 8]);

    let parsed = parse(vec![header, row]);
    let r = &parsed.rows[0];
    assert_eq!(r.lpcd_values.len(), 7);
    assert!(r.flags().consistent_zero_lpcd_for_a_week);
  }

  #[test]
  fn bad_readings_are_row_errors() {
    let parsed = parse(vec![
      vec!["Scheme ID", "Village Name", "Scheme Name", "LPCD 1-Mar"],
      vec!["S1", "V1", "X", "lots"],
      vec!["", "V2", "X", "10"],
      vec!["", "Total", "", "10"],
      vec!["S1", "V3", "X", "-4"],
    ]);

    assert!(parsed.rows.is_empty());
    let messages: Vec<_> = parsed.report.errors().map(|e| e.message.clone()).collect();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0], "LPCD day 1: expected a number, found \"lots\"");
    assert_eq!(messages[1], "scheme id is blank");
    assert!(messages[2].contains("lpcd_values"), "{}", messages[2]);
    assert_eq!(parsed.report.sheets[0].skipped_rows, 1);
  }
}
