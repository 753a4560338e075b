//! Grid-cell heat-health analysis: baseline heat thresholds, heatwave day
//! counts under future climate, excess deaths, and early-warning benefits.

pub mod alignment;
pub mod benefits;
pub mod collate;
pub mod config;
pub mod error;
pub mod excess_deaths;
pub mod heatwave;
pub mod keys;
pub mod manifest;
pub mod pipeline;
pub mod table;
pub mod threshold;

pub use alignment::{Alignment, ByFid, ByPosition, RowAlignment};
pub use error::{HeatError, Result};
pub use keys::{ColumnKey, Metric, Year};
pub use table::{Table, FID};
