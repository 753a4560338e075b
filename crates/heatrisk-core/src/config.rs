use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::alignment::Alignment;
use crate::error::Result;

/// Paths for a batch run. Each stage section is optional; the runner executes
/// whichever are present in stage order.
///
/// ```toml
/// alignment = "position"
/// manifest = "outputs/manifest.json"
///
/// [threshold]
/// baseline_dir = "data/baseline"
/// output = "outputs/baseline_percent975.csv"
///
/// [heatwave]
/// future_dir = "data/future"
/// output_dir = "outputs/heatwave_days"
///
/// [[collate]]
/// scenario = "ssp245"
/// model = "ACCESS-CM2"
/// output = "outputs/heatwave_ssp245_ACCESS-CM2.csv"
///
/// [excess_deaths]
/// er = "data/ER.csv"
/// mortality = "data/mortality.csv"
/// output = "outputs/excess_deaths.csv"
///
/// [benefits]
/// heatwave = "outputs/heatwave_ssp245_ACCESS-CM2.csv"
/// pop65 = "data/pop65.csv"
/// pop_u65 = "data/popu65.csv"
/// output = "outputs/early_warning_benefits.csv"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    #[serde(default)]
    pub alignment: Alignment,
    pub manifest: Option<PathBuf>,
    pub threshold: Option<ThresholdConfig>,
    pub heatwave: Option<HeatwaveConfig>,
    #[serde(default)]
    pub collate: Vec<CollateConfig>,
    pub excess_deaths: Option<ExcessDeathsConfig>,
    pub benefits: Option<BenefitsConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThresholdConfig {
    pub baseline_dir: PathBuf,
    pub output: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeatwaveConfig {
    pub future_dir: PathBuf,
    /// Defaults to `threshold.output` when that stage is configured.
    pub threshold: Option<PathBuf>,
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollateConfig {
    pub scenario: String,
    pub model: String,
    /// Defaults to `heatwave.output_dir`.
    pub heatwave_dir: Option<PathBuf>,
    pub output: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExcessDeathsConfig {
    pub er: PathBuf,
    pub mortality: PathBuf,
    pub output: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BenefitsConfig {
    pub heatwave: PathBuf,
    pub pop65: PathBuf,
    pub pop_u65: PathBuf,
    pub output: PathBuf,
}

impl PipelineConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}
