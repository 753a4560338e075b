use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{HeatError, Result};

/// Calendar year carried by a column suffix or a file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Year(u16);

impl Year {
    pub fn new(value: u16) -> Self {
        Self(value)
    }

    /// Text after the last `_` of a column name, or the whole name when it has none.
    pub fn from_column_suffix(column: &str) -> Result<Self> {
        let suffix = column.rsplit('_').next().unwrap_or(column);
        suffix.parse()
    }

    /// Last four characters of the file stem: `scenarioA_modelB_2075.csv` -> 2075.
    pub fn from_file_stem(path: &Path) -> Result<Self> {
        let stem = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| HeatError::MalformedFileName {
                path: path.to_path_buf(),
                reason: "file name is not valid UTF-8".to_string(),
            })?;

        let split = stem
            .char_indices()
            .rev()
            .nth(3)
            .map(|(idx, _)| idx)
            .ok_or_else(|| HeatError::MalformedFileName {
                path: path.to_path_buf(),
                reason: "stem is shorter than four characters".to_string(),
            })?;

        stem[split..]
            .parse()
            .map_err(|_| HeatError::MalformedFileName {
                path: path.to_path_buf(),
                reason: format!("stem does not end in a four-digit year: {stem}"),
            })
    }
}

impl FromStr for Year {
    type Err = HeatError;

    fn from_str(label: &str) -> Result<Self> {
        if label.len() != 4 || !label.bytes().all(|b| b.is_ascii_digit()) {
            return Err(HeatError::InvalidYear {
                label: label.to_string(),
            });
        }
        label
            .parse::<u16>()
            .map(Year)
            .map_err(|_| HeatError::InvalidYear {
                label: label.to_string(),
            })
    }
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.0)
    }
}

/// Per-year quantities that appear as columns in the grid tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Deaths,
    Pop65,
    PopU65,
    ExcessDeaths,
    Benefit,
    HeatwaveDays,
}

impl Metric {
    fn prefix(self) -> &'static str {
        match self {
            Metric::Deaths => "Deaths-",
            Metric::Pop65 => "Pop65-",
            Metric::PopU65 => "PopU65-",
            Metric::ExcessDeaths => "ED_",
            Metric::Benefit => "Benefit_",
            Metric::HeatwaveDays => "HeatwaveDays_",
        }
    }
}

/// A `(metric, year)` pair naming one column of a per-year table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColumnKey {
    pub metric: Metric,
    pub year: Year,
}

impl ColumnKey {
    pub fn new(metric: Metric, year: Year) -> Self {
        Self { metric, year }
    }

    pub fn column_name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.metric.prefix(), self.year)
    }
}
