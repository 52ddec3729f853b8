//! Scheme status report sheets → [`NewScheme`].

use jal_core::{
  hierarchy::{Hierarchy, RegionAliases},
  scheme::{FunctionalStatus, NewScheme, SchemeCounters},
};

use crate::{
  grid::Grid,
  header::{ColumnMap, FieldAliases},
  sheet::{SheetLayout, count_at, is_total_row, raw_text_at, sheet_region, text_at},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SchemeField {
  Region,
  Circle,
  SubDivision,
  Division,
  Block,
  SchemeId,
  FunctionalStatus,
  SchemeName,
  Agency,
  FullyCompletedVillages,
  VillagesIntegrated,
  TotalVillages,
  FullyCompletedEsr,
  EsrIntegrated,
  TotalEsr,
  FlowMeters,
  Rca,
  PressureTransmitters,
}

pub(crate) struct SchemeSheet {
  columns: ColumnMap<SchemeField>,
  region:  Option<String>,
  aliases: RegionAliases,
}

impl SheetLayout for SchemeSheet {
  type Field = SchemeField;
  type Row = NewScheme;

  const FIELDS: &'static [FieldAliases<SchemeField>] = {
    use SchemeField as F;
    &[
      (F::Region, &["region"]),
      (F::Circle, &["circle"]),
      (F::SubDivision, &["sub division", "subdivision"]),
      (F::Division, &["division"]),
      (F::Block, &["block", "taluka"]),
      (F::SchemeId, &["scheme id", "scheme code", "schemeid"]),
      (F::FunctionalStatus, &["functional status", "functionality", "scheme functional"]),
      (F::SchemeName, &["scheme name", "name of scheme", "name of the scheme", "scheme"]),
      (F::Agency, &["agency"]),
      (F::FullyCompletedVillages, &[
        "fully completed villages",
        "fully completed village",
        "villages fully completed",
        "completed villages",
      ]),
      (F::VillagesIntegrated, &["villages integrated", "village integrated", "integrated villages"]),
      (F::TotalVillages, &[
        "total villages",
        "total village",
        "no of villages",
        "number of villages",
        "villages",
      ]),
      (F::FullyCompletedEsr, &["fully completed esr", "esr fully completed", "completed esr"]),
      (F::EsrIntegrated, &["esr integrated", "integrated esr"]),
      (F::TotalEsr, &["total esr", "no of esr", "number of esr", "esr"]),
      (F::FlowMeters, &["flow meter", "flow meters"]),
      (F::Rca, &["residual chlorine", "rca", "chlorine analyzer", "chlorine analyser"]),
      (F::PressureTransmitters, &["pressure transmitter", "pressure transmitters"]),
    ]
  };

  const REQUIRED: &'static [(SchemeField, &'static str)] =
    &[(SchemeField::SchemeId, "scheme id"), (SchemeField::Block, "block")];

  fn new(
    sheet: &str,
    _grid: &Grid,
    _header_row: usize,
    columns: ColumnMap<SchemeField>,
    aliases: &RegionAliases,
  ) -> Self {
    Self {
      columns,
      region: sheet_region(sheet, aliases),
      aliases: aliases.clone(),
    }
  }

  fn parse_row(&self, grid: &Grid, row: usize) -> Result<Option<NewScheme>, String> {
    let col = |f| self.columns.get(f);
    let text = |f| text_at(grid, row, col(f));
    let segment = |f| raw_text_at(grid, row, col(f)).unwrap_or_default();
    let count = |f, label: &str| count_at(grid, row, col(f), label);

    let Some(scheme_id) = text(SchemeField::SchemeId) else {
      if is_total_row(grid, row) {
        return Ok(None);
      }
      return Err("scheme id is blank".into());
    };

    let scheme = NewScheme {
      scheme_id,
      scheme_name: text(SchemeField::SchemeName).unwrap_or_default(),
      hierarchy: Hierarchy {
        region:       text(SchemeField::Region)
          .or_else(|| self.region.clone())
          .unwrap_or_default(),
        circle:       segment(SchemeField::Circle),
        division:     segment(SchemeField::Division),
        sub_division: segment(SchemeField::SubDivision),
        block:        segment(SchemeField::Block),
      },
      reported_hierarchy: None,
      agency: text(SchemeField::Agency),
      counters: SchemeCounters {
        total_villages:                       count(SchemeField::TotalVillages, "total villages")?,
        villages_integrated:                  count(SchemeField::VillagesIntegrated, "villages integrated")?,
        fully_completed_villages:             count(SchemeField::FullyCompletedVillages, "fully completed villages")?,
        total_esr:                            count(SchemeField::TotalEsr, "total ESR")?,
        esr_integrated_on_iot:                count(SchemeField::EsrIntegrated, "ESR integrated")?,
        fully_completed_esr:                  count(SchemeField::FullyCompletedEsr, "fully completed ESR")?,
        flow_meters_connected:                count(SchemeField::FlowMeters, "flow meters")?,
        residual_chlorine_analyzer_connected: count(SchemeField::Rca, "residual chlorine analyzers")?,
        pressure_transmitter_connected:       count(SchemeField::PressureTransmitters, "pressure transmitters")?,
      },
      functional_status: text(SchemeField::FunctionalStatus)
        .map(|s| FunctionalStatus::from_report(&s))
        .unwrap_or_default(),
    }
    .normalized(&self.aliases);

    scheme.validate().map_err(|e| e.to_string())?;
    Ok(Some(scheme))
  }
}

#[cfg(test)]
mod tests {
  use jal_core::scheme::CompletionStatus;

  use super::*;
  use crate::{ImportOptions, parse_scheme_sheets};

  const HEADER: [&str; 14] = [
    "Sr. No.",
    "Region",
    "Circle",
    "Division",
    "Sub-Division",
    "Block",
    "Scheme ID",
    "Scheme Name",
    "Total Villages",
    "No. of Villages Integrated",
    "Fully Completed Villages",
    "Total ESR",
    "ESR Integrated on IoT",
    "Fully Completed ESR",
  ];

  fn sheet(rows: Vec<Vec<&'static str>>) -> Vec<(String, Grid)> {
    vec![("Status".to_owned(), Grid::from_text(&rows))]
  }

  #[test]
  fn valid_row_becomes_a_scheme() {
    let parsed = parse_scheme_sheets(
      &sheet(vec![
        vec!["Scheme Status Report as on 01-03-2025"],
        HEADER.to_vec(),
        vec![
          "1", " aurangabad ", "Jalna", "Jalna", "Jalna  East", "Ambad", "20018548",
          "83 Village RRWSS", "83", "40", "12", "10", "6", "2",
        ],
      ]),
      &ImportOptions::default(),
      &RegionAliases::default(),
    );

    assert_eq!(parsed.report.sheets.len(), 1);
    assert_eq!(parsed.report.sheets[0].header_row, 2);
    assert_eq!(parsed.rows.len(), 1);

    let s = &parsed.rows[0];
    assert_eq!(s.scheme_id, "20018548");
    assert_eq!(s.scheme_name, "83 Village RRWSS");
    assert_eq!(s.hierarchy.region, "Chhatrapati Sambhajinagar");
    assert_eq!(s.hierarchy.sub_division, "Jalna East");
    assert_eq!(s.hierarchy.division, "Jalna");
    assert_eq!(s.counters.total_villages, 83);
    assert_eq!(s.counters.villages_integrated, 40);
    assert_eq!(s.counters.fully_completed_villages, 12);
    assert_eq!(s.counters.total_esr, 10);
    assert_eq!(s.counters.esr_integrated_on_iot, 6);
    assert_eq!(s.counters.fully_completed_esr, 2);
    assert_eq!(s.counters.completion_status(), CompletionStatus::InProgress);
  }

  #[test]
  fn bad_rows_are_reported_and_totals_skipped() {
    let parsed = parse_scheme_sheets(
      &sheet(vec![
        HEADER.to_vec(),
        vec!["1", "Pune", "C", "D", "SD", "Haveli", "S1", "A", "5", "2", "1", "3", "1", "0"],
        vec!["2", "Pune", "C", "D", "SD", "Haveli", "S2", "B", "5", "2.5", "1", "3", "1", "0"],
        vec!["3", "Pune", "C", "D", "SD", "Haveli", "S3", "C", "5", "2", "4", "3", "1", "0"],
        vec!["4", "Pune", "C", "D", "SD", "Haveli", "", "D", "5", "2", "1", "3", "1", "0"],
        vec![],
        vec!["", "Grand Total", "", "", "", "", "", "", "15", "6", "6", "9", "3", "0"],
      ]),
      &ImportOptions::default(),
      &RegionAliases::default(),
    );

    let report = &parsed.report.sheets[0];
    assert_eq!(parsed.rows.len(), 1);
    assert_eq!(report.rows_read, 5);
    assert_eq!(report.valid_rows, 1);
    assert_eq!(report.skipped_rows, 1);

    let errors: Vec<_> = parsed.report.errors().map(|e| (e.row, e.message.as_str())).collect();
    assert_eq!(errors.len(), 3);
    assert_eq!(errors[0], (3, "villages integrated: expected a whole number, found 2.5"));
    assert_eq!(errors[1].0, 4);
    assert!(errors[1].1.contains("fully_completed_villages"), "{}", errors[1].1);
    assert_eq!(errors[2], (5, "scheme id is blank"));
    assert_eq!(parsed.report.invalid_rows(), 3);
  }

  #[test]
  fn sheet_name_supplies_missing_region() {
    let header = vec!["Block", "Scheme ID", "Scheme Name", "Total Villages"];
    let parsed = parse_scheme_sheets(
      &[
        ("Thane".to_owned(), Grid::from_text(&[header.clone(), vec!["Alibag", "S1", "X", "3"]])),
        ("Sheet2".to_owned(), Grid::from_text(&[header, vec!["Alibag", "S2", "Y", "3"]])),
      ],
      &ImportOptions::default(),
      &RegionAliases::default(),
    );

    assert_eq!(parsed.rows.len(), 1);
    assert_eq!(parsed.rows[0].hierarchy.region, "Konkan");
    let errors: Vec<_> = parsed.report.errors().collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].sheet, "Sheet2");
  }

  #[test]
  fn total_villages_column_wins_over_a_looser_header_to_its_left() {
    let parsed = parse_scheme_sheets(
      &[(
        "Thane".to_owned(),
        Grid::from_text(&[
          vec!["Block", "Scheme ID", "Scheme Name", "Balance Villages", "Total Villages"],
          vec!["Alibag", "S1", "X", "1", "9"],
        ]),
      )],
      &ImportOptions::default(),
      &RegionAliases::default(),
    );

    assert_eq!(parsed.rows.len(), 1);
    assert_eq!(parsed.rows[0].counters.total_villages, 9);
  }

  #[test]
  fn sheets_without_a_header_or_required_column_are_skipped() {
    let parsed = parse_scheme_sheets(
      &[
        ("Notes".to_owned(), Grid::from_text(&[vec!["Prepared by", "MJP"]])),
        (
          "NoBlock".to_owned(),
          Grid::from_text(&[vec!["Region", "Scheme ID", "Scheme Name", "Total ESR"]]),
        ),
      ],
      &ImportOptions::default(),
      &RegionAliases::default(),
    );

    assert!(parsed.rows.is_empty());
    assert_eq!(parsed.report.skipped_sheets.len(), 2);
    assert_eq!(parsed.report.skipped_sheets[0].reason, "no recognisable header row");
    assert_eq!(parsed.report.skipped_sheets[1].reason, "no block column");
  }
}
