//! Excel import for the Jal water-scheme monitor.
//!
//! Turns scheme status workbooks and village water-supply workbooks into
//! [`NewScheme`] and [`NewVillageReading`] rows. Parsing never stops at a bad
//! row: every problem lands in the [`ImportReport`] and the caller decides
//! what to persist.
//!
//! ```text
//! bytes ─ read_workbook ─▶ [(sheet, Grid)] ─ find_header_row ─▶ ColumnMap ─ parse_row ─▶ rows + report
//! ```

mod schemes;
mod sheet;
mod water;

pub mod error;
pub mod grid;
pub mod header;
pub mod report;
pub mod workbook;

use jal_core::{hierarchy::RegionAliases, scheme::NewScheme, village::NewVillageReading};

pub use error::{CellError, Error, Result};
pub use grid::{Cell, Grid};
pub use report::{ImportReport, Parsed, RowError, SheetReport, SkippedSheet};
pub use sheet::ImportOptions;
pub use workbook::read_workbook;

/// Parse every recognisable scheme status sheet in a workbook.
pub fn parse_scheme_workbook(
  bytes: &[u8],
  opts: &ImportOptions,
  aliases: &RegionAliases,
) -> Result<Parsed<NewScheme>> {
  Ok(parse_scheme_sheets(&read_workbook(bytes)?, opts, aliases))
}

pub fn parse_scheme_sheets(
  sheets: &[(String, Grid)],
  opts: &ImportOptions,
  aliases: &RegionAliases,
) -> Parsed<NewScheme> {
  sheet::parse_sheets::<schemes::SchemeSheet>(sheets, opts, aliases)
}

/// Parse every recognisable village water-supply sheet in a workbook.
pub fn parse_water_workbook(
  bytes: &[u8],
  opts: &ImportOptions,
  aliases: &RegionAliases,
) -> Result<Parsed<NewVillageReading>> {
  Ok(parse_water_sheets(&read_workbook(bytes)?, opts, aliases))
}

pub fn parse_water_sheets(
  sheets: &[(String, Grid)],
  opts: &ImportOptions,
  aliases: &RegionAliases,
) -> Parsed<NewVillageReading> {
  sheet::parse_sheets::<water::WaterSheet>(sheets, opts, aliases)
}
