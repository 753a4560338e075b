use std::path::Path;

use polars::prelude::*;
use tracing::{debug, info};

use crate::alignment::{ByPosition, RowAlignment};
use crate::error::Result;
use crate::keys::{ColumnKey, Metric, Year};
use crate::table::{as_f64, Table};

/// Stage 3 over files, rows matched by position.
pub fn calculate_excess_deaths(
    er_file: &Path,
    mortality_file: &Path,
    output_file: &Path,
) -> Result<Table> {
    calculate_excess_deaths_with(er_file, mortality_file, output_file, &ByPosition)
}

pub fn calculate_excess_deaths_with(
    er_file: &Path,
    mortality_file: &Path,
    output_file: &Path,
    alignment: &dyn RowAlignment,
) -> Result<Table> {
    let er = Table::read_csv(er_file)?;
    let mortality = Table::read_csv(mortality_file)?;

    let output = excess_deaths(&er, &mortality, alignment)?;
    output.write_csv(output_file)?;
    info!(
        output = %output_file.display(),
        years = output.width().saturating_sub(1),
        cells = output.height(),
        alignment = alignment.name(),
        "Excess deaths saved"
    );
    Ok(output)
}

/// `ED_<year> = ER_..._<year> * Deaths-<year>` for every year column of `er`.
/// `FID` is carried over from `er`.
pub fn excess_deaths(er: &Table, mortality: &Table, alignment: &dyn RowAlignment) -> Result<Table> {
    let mortality = alignment.align(er, mortality)?;
    let mut frame = DataFrame::new(vec![er.fid()?.clone()])?;

    for column in er.value_columns() {
        let year = Year::from_column_suffix(column.name())?;
        let deaths = mortality.float_column(&ColumnKey::new(Metric::Deaths, year).column_name())?;
        let ratio = as_f64(column)?;

        let name = ColumnKey::new(Metric::ExcessDeaths, year).column_name();
        debug!(source = %column.name(), column = %name, "Computing excess deaths");
        let product = (&ratio * &deaths).with_name(name.into());
        frame.with_column(product.into_series())?;
    }

    Ok(Table::new("excess_deaths", frame))
}
