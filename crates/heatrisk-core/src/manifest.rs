use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;

use crate::alignment::Alignment;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Threshold,
    Heatwave,
    Collate,
    ExcessDeaths,
    Benefits,
}

/// One table written during a run. `blake3` covers the exact bytes on disk.
#[derive(Debug, Clone, Serialize)]
pub struct OutputRecord {
    pub stage: Stage,
    pub path: PathBuf,
    pub rows: usize,
    pub columns: usize,
    pub blake3: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunManifest {
    pub generated_at: String,
    pub alignment: Alignment,
    pub outputs: Vec<OutputRecord>,
}

impl RunManifest {
    pub fn new(alignment: Alignment) -> Self {
        Self {
            generated_at: Utc::now().to_rfc3339(),
            alignment,
            outputs: Vec::new(),
        }
    }

    pub fn record(&mut self, stage: Stage, path: &Path, rows: usize, columns: usize) -> Result<()> {
        self.outputs.push(OutputRecord {
            stage,
            path: path.to_path_buf(),
            rows,
            columns,
            blake3: digest_file(path)?,
        });
        Ok(())
    }

    pub fn outputs_for(&self, stage: Stage) -> impl Iterator<Item = &OutputRecord> {
        self.outputs.iter().filter(move |record| record.stage == stage)
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, serde_json::to_vec_pretty(self)?)?;
        Ok(())
    }
}

pub fn digest_file(path: &Path) -> Result<String> {
    let bytes = fs::read(path)?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}
