//! Reading `.xlsx` / `.xls` / `.ods` bytes into [`Grid`]s.

use std::io::Cursor;

use calamine::{Data, Range, Reader};

use crate::{
  Error, Result,
  grid::{Cell, Grid},
};

/// Every sheet of the workbook, in workbook order.
pub fn read_workbook(bytes: &[u8]) -> Result<Vec<(String, Grid)>> {
  let mut workbook = calamine::open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;

  let mut sheets = Vec::new();
  for name in workbook.sheet_names() {
    let range = workbook
      .worksheet_range(&name)
      .map_err(|source| Error::Sheet { sheet: name.clone(), source })?;
    sheets.push((name, grid_from_range(&range)));
  }
  tracing::debug!(sheets = sheets.len(), "workbook read");
  Ok(sheets)
}

/// calamine ranges start at the first used cell; pad so that grid
/// coordinates match sheet coordinates.
fn grid_from_range(range: &Range<Data>) -> Grid {
  let (top, left) = range.start().unwrap_or((0, 0));
  let mut rows: Vec<Vec<Cell>> = (0..top).map(|_| Vec::new()).collect();
  for row in range.rows() {
    let mut cells = vec![Cell::Empty; left as usize];
    cells.extend(row.iter().map(cell_from_data));
    rows.push(cells);
  }
  Grid::new(rows)
}

fn cell_from_data(data: &Data) -> Cell {
  match data {
    Data::Empty | Data::Error(_) => Cell::Empty,
    Data::String(s) => Cell::Text(s.clone()),
    Data::Float(f) => Cell::Number(*f),
    Data::Int(i) => Cell::Number(*i as f64),
    Data::Bool(b) => Cell::Bool(*b),
    Data::DateTime(dt) => dt
      .as_datetime()
      .map(Cell::Date)
      .unwrap_or(Cell::Number(dt.as_f64())),
    Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
  }
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;
  use jal_core::{hierarchy::RegionAliases, scheme::CompletionStatus};
  use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

  use super::*;
  use crate::{ImportOptions, parse_scheme_workbook};

  const HEADER: [&str; 13] = [
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

  /// A status sheet whose table starts at B3, plus a notes sheet holding a
  /// date-formatted cell at C2.
  fn status_workbook() -> Vec<u8> {
    let mut workbook = Workbook::new();

    let sheet = workbook.add_worksheet();
    sheet.set_name("Amravati").unwrap();
    for (i, header) in HEADER.iter().enumerate() {
      sheet.write_string(2, 1 + i as u16, *header).unwrap();
    }
    for (i, text) in ["Amravati", "Amravati", "Amravati", "Amravati", " Amravati  Rural "]
      .iter()
      .enumerate()
    {
      sheet.write_string(3, 1 + i as u16, *text).unwrap();
    }
    sheet.write_number(3, 6, 20018548.0).unwrap();
    sheet.write_string(3, 7, "83 Village RRWSS").unwrap();
    for (i, n) in [83.0, 40.0, 12.0, 10.0, 6.0, 2.0].iter().enumerate() {
      sheet.write_number(3, 8 + i as u16, *n).unwrap();
    }

    let notes = workbook.add_worksheet();
    notes.set_name("Notes").unwrap();
    notes.write_string(1, 1, "Report date").unwrap();
    let date = ExcelDateTime::from_ymd(2025, 3, 1).unwrap();
    notes
      .write_datetime_with_format(1, 2, &date, &Format::new().set_num_format("dd/mm/yyyy"))
      .unwrap();

    workbook.save_to_buffer().unwrap()
  }

  #[test]
  fn grid_coordinates_match_sheet_coordinates() {
    let sheets = read_workbook(&status_workbook()).unwrap();
    assert_eq!(
      sheets.iter().map(|(name, _)| name.as_str()).collect::<Vec<_>>(),
      ["Amravati", "Notes"]
    );

    let status = &sheets[0].1;
    assert_eq!(status.cell(0, 0), &Cell::Empty);
    assert_eq!(status.cell(2, 0), &Cell::Empty);
    assert_eq!(status.cell(2, 1), &Cell::Text("Region".into()));
    assert_eq!(status.cell(3, 6), &Cell::Number(20018548.0));
    assert_eq!(status.cell(3, 5), &Cell::Text(" Amravati  Rural ".into()));

    let notes = &sheets[1].1;
    assert_eq!(notes.cell(1, 1), &Cell::Text("Report date".into()));
    let expected = NaiveDate::from_ymd_opt(2025, 3, 1)
      .unwrap()
      .and_hms_opt(0, 0, 0)
      .unwrap();
    assert_eq!(notes.cell(1, 2), &Cell::Date(expected));
  }

  #[test]
  fn scheme_rows_parse_from_a_saved_workbook() {
    let parsed = parse_scheme_workbook(
      &status_workbook(),
      &ImportOptions::default(),
      &RegionAliases::default(),
    )
    .unwrap();

    assert_eq!(parsed.report.sheets.len(), 1);
    assert_eq!(parsed.report.sheets[0].sheet, "Amravati");
    assert_eq!(parsed.report.sheets[0].header_row, 3);
    assert_eq!(parsed.report.skipped_sheets.len(), 1);
    assert_eq!(parsed.report.invalid_rows(), 0);
    assert_eq!(parsed.rows.len(), 1);

    let s = &parsed.rows[0];
    assert_eq!(s.scheme_id, "20018548");
    assert_eq!(s.scheme_name, "83 Village RRWSS");
    assert_eq!(s.hierarchy.region, "Amravati");
    assert_eq!(s.hierarchy.block, "Amravati Rural");
    assert_eq!(
      s.reported_hierarchy.as_ref().map(|h| h.block.as_str()),
      Some(" Amravati  Rural ")
    );
    assert_eq!(s.counters.total_villages, 83);
    assert_eq!(s.counters.villages_integrated, 40);
    assert_eq!(s.counters.fully_completed_villages, 12);
    assert_eq!(s.counters.total_esr, 10);
    assert_eq!(s.counters.esr_integrated_on_iot, 6);
    assert_eq!(s.counters.fully_completed_esr, 2);
    assert_eq!(s.counters.completion_status(), CompletionStatus::InProgress);
  }

  #[test]
  fn garbage_bytes_are_a_workbook_error() {
    let err = read_workbook(b"definitely not a spreadsheet").unwrap_err();
    assert!(matches!(err, Error::Workbook(_)));
  }

  #[test]
  fn data_cells_map_onto_grid_cells() {
    assert_eq!(cell_from_data(&Data::Int(3)), Cell::Number(3.0));
    assert_eq!(cell_from_data(&Data::String("x".into())), Cell::Text("x".into()));
    assert_eq!(cell_from_data(&Data::Empty), Cell::Empty);
  }
}
