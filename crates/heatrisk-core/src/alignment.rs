use std::collections::HashMap;

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{HeatError, Result};
use crate::table::Table;

/// Puts the rows of one table into the row order of another before the two
/// are combined column-by-column.
pub trait RowAlignment: Send + Sync {
    fn name(&self) -> &'static str;

    /// Returns `other` with row `i` describing the same grid cell as row `i` of `anchor`.
    fn align(&self, anchor: &Table, other: &Table) -> Result<Table>;
}

/// Trusts that both tables list grid cells in the same order. Only the row
/// counts are checked; equal-length tables in a different order pass through.
#[derive(Debug, Clone, Copy, Default)]
pub struct ByPosition;

impl RowAlignment for ByPosition {
    fn name(&self) -> &'static str {
        "position"
    }

    fn align(&self, anchor: &Table, other: &Table) -> Result<Table> {
        ensure_same_height(anchor, other)?;
        Ok(other.clone())
    }
}

/// Reorders `other` by its `FID` values so they match the anchor's.
#[derive(Debug, Clone, Copy, Default)]
pub struct ByFid;

impl RowAlignment for ByFid {
    fn name(&self) -> &'static str {
        "fid"
    }

    fn align(&self, anchor: &Table, other: &Table) -> Result<Table> {
        let mut index_by_fid: HashMap<String, IdxSize> = HashMap::with_capacity(other.height());
        for (row, fid) in fid_keys(other)?.into_iter().enumerate() {
            let Some(fid) = fid else {
                continue;
            };
            if index_by_fid.insert(fid.clone(), row as IdxSize).is_some() {
                return Err(HeatError::DuplicateKey {
                    table: other.name().to_string(),
                    fid,
                });
            }
        }

        let mut indices = Vec::with_capacity(anchor.height());
        for fid in fid_keys(anchor)? {
            let Some(fid) = fid else {
                return Err(HeatError::UnmatchedKey {
                    table: other.name().to_string(),
                    fid: "<null>".to_string(),
                });
            };
            let row = index_by_fid
                .get(&fid)
                .copied()
                .ok_or_else(|| HeatError::UnmatchedKey {
                    table: other.name().to_string(),
                    fid,
                })?;
            indices.push(row);
        }

        let take = IdxCa::from_vec("row".into(), indices);
        let frame = other.frame().take(&take)?;
        Ok(Table::new(other.name(), frame))
    }
}

/// Strategy selector exposed through the CLI and the pipeline config.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Position,
    Fid,
}

impl Alignment {
    pub fn strategy(self) -> &'static dyn RowAlignment {
        match self {
            Alignment::Position => &ByPosition,
            Alignment::Fid => &ByFid,
        }
    }
}

pub fn ensure_same_height(left: &Table, right: &Table) -> Result<()> {
    if left.height() != right.height() {
        return Err(HeatError::RowCountMismatch {
            left: left.name().to_string(),
            left_rows: left.height(),
            right: right.name().to_string(),
            right_rows: right.height(),
        });
    }
    Ok(())
}

fn fid_keys(table: &Table) -> Result<Vec<Option<String>>> {
    let fid = table.fid()?.cast(&DataType::String)?;
    let keys = fid
        .str()?
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect();
    Ok(keys)
}
