use std::path::{Path, PathBuf};

use polars::prelude::*;
use tracing::{debug, info};

use crate::alignment::RowAlignment;
use crate::error::{HeatError, Result};
use crate::heatwave::HEATWAVE_COLUMN;
use crate::keys::{ColumnKey, Metric, Year};
use crate::table::{glob_under, Table};

/// Stage-2 outputs for one (scenario, model) pair, ordered by year.
pub fn heatwave_outputs_for(dir: &Path, scenario: &str, model: &str) -> Result<Vec<(Year, PathBuf)>> {
    let prefix = format!("{scenario}_{model}_");
    let pattern = glob_under(dir, &format!("{}*.csv", glob::Pattern::escape(&prefix)));

    let mut files = Vec::new();
    for entry in glob::glob(&pattern)? {
        let path = entry?;
        let Some(label) = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .and_then(|stem| stem.strip_prefix(&prefix))
        else {
            continue;
        };
        // `<scenario>_<model>_extra_2050.csv` belongs to another model.
        let Ok(year) = label.parse::<Year>() else {
            continue;
        };
        files.push((year, path));
    }

    if files.is_empty() {
        return Err(HeatError::EmptyInput {
            dir: dir.to_path_buf(),
        });
    }
    files.sort();
    Ok(files)
}

/// Gathers the per-year heatwave counts of one (scenario, model) pair into a
/// wide `FID, HeatwaveDays_<year>...` table, the shape the benefit stage reads.
/// The earliest year supplies `FID`; later years are aligned against it.
pub fn collate_heatwave_days(
    dir: &Path,
    scenario: &str,
    model: &str,
    alignment: &dyn RowAlignment,
) -> Result<Table> {
    let files = heatwave_outputs_for(dir, scenario, model)?;

    let mut anchor: Option<Table> = None;
    let mut columns: Vec<Column> = Vec::with_capacity(files.len() + 1);

    for (year, path) in &files {
        let table = Table::read_csv(path)?;
        let table = match anchor.as_ref() {
            Some(anchor) => alignment.align(anchor, &table)?,
            None => {
                columns.push(table.fid()?.clone());
                anchor = Some(table.clone());
                table
            }
        };

        let name = ColumnKey::new(Metric::HeatwaveDays, *year).column_name();
        debug!(source = %path.display(), column = %name, "Collating heatwave days");
        columns.push(table.column(HEATWAVE_COLUMN)?.clone().with_name(name.into()));
    }

    let frame = DataFrame::new(columns)?;
    Ok(Table::new(format!("{scenario}_{model}"), frame))
}

pub fn write_collated_heatwave_days(
    dir: &Path,
    scenario: &str,
    model: &str,
    output_file: &Path,
    alignment: &dyn RowAlignment,
) -> Result<Table> {
    let table = collate_heatwave_days(dir, scenario, model, alignment)?;
    table.write_csv(output_file)?;
    info!(
        output = %output_file.display(),
        scenario,
        model,
        years = table.width().saturating_sub(1),
        "Collated heatwave days saved"
    );
    Ok(table)
}
