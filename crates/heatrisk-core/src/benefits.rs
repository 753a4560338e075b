use std::path::Path;

use polars::prelude::*;
use tracing::{debug, info};

use crate::alignment::{ByPosition, RowAlignment};
use crate::error::Result;
use crate::keys::{ColumnKey, Metric, Year};
use crate::table::{as_f64, Table};

/// Deaths avoided per person per heatwave day for the 65-and-over band, scaled by 1e6.
pub const RATE_65_PLUS: f64 = 5.0;
/// Same for the under-65 band.
pub const RATE_UNDER_65: f64 = 0.0127;
const PER_MILLION: f64 = 1e6;

/// Stage 4 over files, rows matched by position.
pub fn calculate_early_warning_benefits(
    heatwave_file: &Path,
    pop65_file: &Path,
    pop_u65_file: &Path,
    output_file: &Path,
) -> Result<Table> {
    calculate_early_warning_benefits_with(
        heatwave_file,
        pop65_file,
        pop_u65_file,
        output_file,
        &ByPosition,
    )
}

pub fn calculate_early_warning_benefits_with(
    heatwave_file: &Path,
    pop65_file: &Path,
    pop_u65_file: &Path,
    output_file: &Path,
    alignment: &dyn RowAlignment,
) -> Result<Table> {
    let heatwave = Table::read_csv(heatwave_file)?;
    let pop65 = Table::read_csv(pop65_file)?;
    let pop_u65 = Table::read_csv(pop_u65_file)?;

    let output = early_warning_benefits(&heatwave, &pop65, &pop_u65, alignment)?;
    output.write_csv(output_file)?;
    info!(
        output = %output_file.display(),
        years = output.width().saturating_sub(1),
        cells = output.height(),
        alignment = alignment.name(),
        "Early warning benefits saved"
    );
    Ok(output)
}

/// For every year column of `heatwave`:
///
/// `Benefit_<year> = Pop65-<year> * days * 5 / 1e6 + PopU65-<year> * days * 0.0127 / 1e6`
pub fn early_warning_benefits(
    heatwave: &Table,
    pop65: &Table,
    pop_u65: &Table,
    alignment: &dyn RowAlignment,
) -> Result<Table> {
    let pop65 = alignment.align(heatwave, pop65)?;
    let pop_u65 = alignment.align(heatwave, pop_u65)?;
    let mut frame = DataFrame::new(vec![heatwave.fid()?.clone()])?;

    for column in heatwave.value_columns() {
        let year = Year::from_column_suffix(column.name())?;
        let older = pop65.float_column(&ColumnKey::new(Metric::Pop65, year).column_name())?;
        let younger = pop_u65.float_column(&ColumnKey::new(Metric::PopU65, year).column_name())?;
        let days = as_f64(column)?;

        let older_benefit = &(&(&older * &days) * RATE_65_PLUS) / PER_MILLION;
        let younger_benefit = &(&(&younger * &days) * RATE_UNDER_65) / PER_MILLION;

        let name = ColumnKey::new(Metric::Benefit, year).column_name();
        debug!(source = %column.name(), column = %name, "Computing early warning benefit");
        let benefit = (&older_benefit + &younger_benefit).with_name(name.into());
        frame.with_column(benefit.into_series())?;
    }

    Ok(Table::new("early_warning_benefits", frame))
}
