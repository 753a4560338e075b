use std::path::{Path, PathBuf};

use polars::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::alignment::ensure_same_height;
use crate::error::{HeatError, Result};
use crate::keys::Year;
use crate::table::{as_f64, glob_under, Table, FID};
use crate::threshold::{load_thresholds, threshold_values};

/// Count column of a stage-2 output.
pub const HEATWAVE_COLUMN: &str = "HeatwaveDays";

/// One `future_dir/<scenario>/<model>/<anything><YYYY>.csv` file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FutureLeaf {
    pub scenario: String,
    pub model: String,
    pub year: Year,
    pub path: PathBuf,
}

impl FutureLeaf {
    pub fn from_path(path: &Path) -> Result<Self> {
        let malformed = |reason: &str| HeatError::MalformedFileName {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        };

        let model_dir = path.parent().ok_or_else(|| malformed("missing model directory"))?;
        let scenario_dir = model_dir
            .parent()
            .ok_or_else(|| malformed("missing scenario directory"))?;

        let model = dir_name(model_dir).ok_or_else(|| malformed("model directory has no name"))?;
        let scenario =
            dir_name(scenario_dir).ok_or_else(|| malformed("scenario directory has no name"))?;

        Ok(Self {
            scenario,
            model,
            year: Year::from_file_stem(path)?,
            path: path.to_path_buf(),
        })
    }

    pub fn output_file_name(&self) -> String {
        format!("{}_{}_{}.csv", self.scenario, self.model, self.year)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HeatwaveOutput {
    pub leaf: FutureLeaf,
    pub path: PathBuf,
    pub cells: usize,
}

/// Stage 2: counts, for every future-climate file, the days on which each grid
/// cell reaches its baseline threshold. Writes one table per
/// (scenario, model, year) into `output_dir`.
///
/// A failure partway through leaves the outputs already written in place.
pub fn count_heatwave_days(
    future_dir: &Path,
    threshold_file: &Path,
    output_dir: &Path,
) -> Result<Vec<HeatwaveOutput>> {
    let threshold = load_thresholds(threshold_file)?;
    let leaves = discover_future_leaves(future_dir)?;

    let mut outputs = Vec::with_capacity(leaves.len());
    for leaf in leaves {
        let future = Table::read_csv(&leaf.path)?;
        let counts = count_exceedances(future, &threshold)?;

        let path = output_dir.join(leaf.output_file_name());
        counts.write_csv(&path)?;
        debug!(
            scenario = %leaf.scenario,
            model = %leaf.model,
            year = %leaf.year,
            output = %path.display(),
            "Counted heatwave days"
        );

        outputs.push(HeatwaveOutput {
            cells: counts.height(),
            leaf,
            path,
        });
    }

    info!(
        output_dir = %output_dir.display(),
        files = outputs.len(),
        "Heatwave days results saved"
    );
    Ok(outputs)
}

/// Walks the three-level scenario/model/year tree in path order. Entries that
/// are not directories at the first two levels, and non-CSV leaves, are skipped.
/// A missing directory or a tree without any CSV leaf is `EmptyInput`.
pub fn discover_future_leaves(future_dir: &Path) -> Result<Vec<FutureLeaf>> {
    if !future_dir.is_dir() {
        return Err(HeatError::EmptyInput {
            dir: future_dir.to_path_buf(),
        });
    }

    let mut leaves = Vec::new();
    for entry in glob::glob(&glob_under(future_dir, "*/*/*"))? {
        let path = entry?;
        if !path.is_file() {
            continue;
        }
        if path.extension().and_then(|ext| ext.to_str()) != Some("csv") {
            warn!(path = %path.display(), "Skipping non-CSV file in future climate tree");
            continue;
        }
        leaves.push(FutureLeaf::from_path(&path)?);
    }

    if leaves.is_empty() {
        return Err(HeatError::EmptyInput {
            dir: future_dir.to_path_buf(),
        });
    }

    leaves.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(leaves)
}

/// Per-row count of temperature columns that are greater than or equal to the
/// row's threshold. The first column of `future` is taken as the grid index and
/// renamed to `FID`; thresholds are matched to rows by position.
pub fn count_exceedances(mut future: Table, threshold: &Table) -> Result<Table> {
    future.rename_first_column(FID)?;
    ensure_same_height(threshold, &future)?;

    let limits = threshold_values(threshold)?;
    let temperatures = future
        .value_columns()
        .map(as_f64)
        .collect::<Result<Vec<_>>>()?;

    let counts: Vec<i64> = (0..future.height())
        .map(|idx| match limits.get(idx) {
            Some(limit) => temperatures
                .iter()
                .filter(|day| day.get(idx).is_some_and(|temp| temp >= limit))
                .count() as i64,
            None => 0,
        })
        .collect();

    let frame = DataFrame::new(vec![
        future.fid()?.clone(),
        Series::new(HEATWAVE_COLUMN.into(), counts).into(),
    ])?;
    Ok(Table::new(future.name(), frame))
}

fn dir_name(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
}
