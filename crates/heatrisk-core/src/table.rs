// crates/heatrisk-core/src/table.rs

use std::fs::{self, File};
use std::path::Path;

use polars::prelude::*;
use tracing::debug;

use crate::error::{HeatError, Result};

/// Grid-cell identifier column shared by every FID-bearing table.
pub const FID: &str = "FID";

/// A grid table loaded fully into memory, labelled with where it came from so
/// lookup failures can name the offending file.
#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    frame: DataFrame,
}

impl Table {
    pub fn new(name: impl Into<String>, frame: DataFrame) -> Self {
        Self {
            name: name.into(),
            frame,
        }
    }

    /// Reads a CSV with a header row. Types are inferred from every row, so an
    /// integer-looking prefix does not pin a column that later holds decimals.
    pub fn read_csv(path: &Path) -> Result<Self> {
        let frame = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(None)
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish()?;

        debug!(
            path = %path.display(),
            rows = frame.height(),
            columns = frame.width(),
            "Loaded table"
        );

        Ok(Self::new(path.display().to_string(), frame))
    }

    /// Writes the table as CSV without a row index. The bytes go to a `.tmp`
    /// sibling first and are renamed into place once complete.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp_path = path.with_extension("csv.tmp");
        {
            let mut file = File::create(&tmp_path)?;
            let mut frame = self.frame.clone();
            CsvWriter::new(&mut file)
                .include_header(true)
                .finish(&mut frame)?;
        }
        fs::rename(&tmp_path, path)?;

        debug!(
            path = %path.display(),
            rows = self.frame.height(),
            columns = self.frame.width(),
            "Wrote table"
        );
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn width(&self) -> usize {
        self.frame.width()
    }

    pub fn column(&self, name: &str) -> Result<&Column> {
        self.frame
            .column(name)
            .map_err(|_| HeatError::MissingColumn {
                table: self.name.clone(),
                column: name.to_string(),
            })
    }

    pub fn float_column(&self, name: &str) -> Result<Float64Chunked> {
        as_f64(self.column(name)?)
    }

    pub fn fid(&self) -> Result<&Column> {
        self.column(FID)
    }

    /// Every column other than `FID`, in file order.
    pub fn value_columns(&self) -> impl Iterator<Item = &Column> {
        self.frame
            .get_columns()
            .iter()
            .filter(|column| column.name().as_str() != FID)
    }

    /// Renames the leading column (the unnamed index a dataframe export leaves
    /// behind) to `to`, unless it already carries that name.
    pub fn rename_first_column(&mut self, to: &str) -> Result<()> {
        let first = self
            .frame
            .get_columns()
            .first()
            .map(|column| column.name().to_string())
            .ok_or_else(|| HeatError::MissingColumn {
                table: self.name.clone(),
                column: to.to_string(),
            })?;

        if first != to {
            self.frame.rename(&first, to.into())?;
        }
        Ok(())
    }
}

/// Glob pattern for `pattern` beneath `dir`, with any glob metacharacters in
/// `dir` itself matched literally.
pub fn glob_under(dir: &Path, pattern: &str) -> String {
    Path::new(&glob::Pattern::escape(&dir.to_string_lossy()))
        .join(pattern)
        .to_string_lossy()
        .into_owned()
}

/// Casts any numeric column to `Float64` so integer and float inputs share one code path.
pub fn as_f64(column: &Column) -> Result<Float64Chunked> {
    let cast = column.cast(&DataType::Float64)?;
    Ok(cast.f64()?.clone())
}
