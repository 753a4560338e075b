use std::path::{Path, PathBuf};

use polars::prelude::*;
use tracing::{debug, info};

use crate::alignment::ensure_same_height;
use crate::error::{HeatError, Result};
use crate::table::{as_f64, glob_under, Table, FID};

/// Header of the single column in a threshold table.
pub const THRESHOLD_COLUMN: &str = "Percent975";
pub const THRESHOLD_QUANTILE: f64 = 0.975;

/// Stage 1: concatenates every baseline CSV in `baseline_dir` side by side and
/// writes the per-row 97.5th percentile to `output_file`.
pub fn calculate_baseline_threshold(baseline_dir: &Path, output_file: &Path) -> Result<Table> {
    let tables = load_baseline_tables(baseline_dir)?;
    let wide = concat_baseline(&tables)?;
    let threshold = row_percentile(&wide, THRESHOLD_QUANTILE)?;

    threshold.write_csv(output_file)?;
    info!(
        output = %output_file.display(),
        files = tables.len(),
        days = wide.width(),
        cells = threshold.height(),
        "Baseline 97.5th percentile saved"
    );
    Ok(threshold)
}

/// Lists `*.csv` files directly under `dir` in path order.
pub fn baseline_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = glob::glob(&glob_under(dir, "*.csv"))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    files.retain(|path| path.is_file());
    files.sort();

    if files.is_empty() {
        return Err(HeatError::EmptyInput {
            dir: dir.to_path_buf(),
        });
    }
    Ok(files)
}

pub fn load_baseline_tables(dir: &Path) -> Result<Vec<Table>> {
    baseline_files(dir)?
        .iter()
        .map(|path| Table::read_csv(path))
        .collect()
}

/// Joins baseline tables column-wise by row position. Index columns are dropped
/// and the remaining headers are prefixed with the source file stem so equal
/// day names from different files stay distinct.
pub fn concat_baseline(tables: &[Table]) -> Result<Table> {
    let first = tables.first().ok_or_else(|| HeatError::EmptyInput {
        dir: PathBuf::new(),
    })?;

    let mut columns: Vec<Column> = Vec::new();
    for table in tables {
        ensure_same_height(first, table)?;

        let stem = Path::new(table.name())
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| table.name().to_string());

        for column in table.frame().get_columns() {
            if is_index_column(column.name()) {
                continue;
            }
            let name = format!("{stem}/{}", column.name());
            columns.push(column.clone().with_name(name.into()));
        }
        debug!(table = table.name(), "Appended baseline columns");
    }

    if columns.is_empty() {
        return Err(HeatError::MissingColumn {
            table: first.name().to_string(),
            column: "baseline temperature".to_string(),
        });
    }

    Ok(Table::new("baseline", DataFrame::new(columns)?))
}

/// Percentile `q` of every row across all columns of `table`, written to a
/// single `Percent975` column. Null and NaN cells are skipped.
pub fn row_percentile(table: &Table, q: f64) -> Result<Table> {
    let columns = table
        .frame()
        .get_columns()
        .iter()
        .map(as_f64)
        .collect::<Result<Vec<_>>>()?;

    let height = table.height();
    let mut values = Vec::with_capacity(height);
    let mut row = Vec::with_capacity(columns.len());

    for idx in 0..height {
        row.clear();
        row.extend(
            columns
                .iter()
                .filter_map(|column| column.get(idx))
                .filter(|value| !value.is_nan()),
        );
        values.push(percentile_linear(&mut row, q));
    }

    let frame = DataFrame::new(vec![Series::new(THRESHOLD_COLUMN.into(), values).into()])?;
    Ok(Table::new("threshold", frame))
}

/// Linear interpolation between closest ranks, the default convention of
/// common dataframe libraries. Sorts `values` in place.
pub fn percentile_linear(values: &mut [f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);

    let rank = (values.len() - 1) as f64 * q.clamp(0.0, 1.0);
    let lower = rank.floor() as usize;
    let upper = (lower + 1).min(values.len() - 1);
    let fraction = rank - lower as f64;

    Some(values[lower] + fraction * (values[upper] - values[lower]))
}

/// Reads a stage-1 output. A table with exactly one column is accepted under
/// any header.
pub fn load_thresholds(path: &Path) -> Result<Table> {
    let table = Table::read_csv(path)?;
    threshold_values(&table)?;
    Ok(table)
}

pub fn threshold_values(table: &Table) -> Result<Float64Chunked> {
    match table.float_column(THRESHOLD_COLUMN) {
        Ok(values) => Ok(values),
        Err(err) => match table.frame().get_columns() {
            [only] => as_f64(only),
            _ => Err(err),
        },
    }
}

fn is_index_column(name: &str) -> bool {
    name.is_empty() || name == FID || name.starts_with("Unnamed")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn percentile_interpolates_between_ranks() {
        let mut values: Vec<f64> = (1..=10).map(f64::from).collect();
        // rank = 9 * 0.975 = 8.775 -> 9 + 0.775 * (10 - 9)
        assert!(approx(percentile_linear(&mut values, 0.975).unwrap(), 9.775));
    }

    #[test]
    fn percentile_is_order_independent() {
        let mut shuffled = vec![4.0, 1.0, 3.0, 2.0];
        let mut sorted = vec![1.0, 2.0, 3.0, 4.0];
        assert_eq!(
            percentile_linear(&mut shuffled, 0.975),
            percentile_linear(&mut sorted, 0.975)
        );
    }

    #[test]
    fn percentile_of_single_value_is_that_value() {
        assert_eq!(percentile_linear(&mut [21.5], 0.975), Some(21.5));
    }

    #[test]
    fn percentile_of_empty_row_is_none() {
        assert_eq!(percentile_linear(&mut [], 0.975), None);
    }

    #[test]
    fn percentile_bounds() {
        let mut values = vec![3.0, 1.0, 2.0];
        assert_eq!(percentile_linear(&mut values, 0.0), Some(1.0));
        assert_eq!(percentile_linear(&mut values, 1.0), Some(3.0));
    }

    #[test]
    fn index_columns_are_recognised() {
        assert!(is_index_column(""));
        assert!(is_index_column("FID"));
        assert!(is_index_column("Unnamed: 0"));
        assert!(!is_index_column("day_001"));
    }
}
