use anyhow::{anyhow, Context, Result};
use tracing::info;

use crate::benefits::calculate_early_warning_benefits_with;
use crate::collate::write_collated_heatwave_days;
use crate::config::PipelineConfig;
use crate::excess_deaths::calculate_excess_deaths_with;
use crate::heatwave::count_heatwave_days;
use crate::manifest::{RunManifest, Stage};
use crate::threshold::calculate_baseline_threshold;

/// Runs the configured stages in order: threshold, heatwave, collate, excess
/// deaths, benefits. Stops at the first failure; files written by earlier
/// stages are left in place.
pub fn run_pipeline(config: &PipelineConfig) -> Result<RunManifest> {
    let alignment = config.alignment.strategy();
    let mut manifest = RunManifest::new(config.alignment);

    if let Some(stage) = &config.threshold {
        let table = calculate_baseline_threshold(&stage.baseline_dir, &stage.output)
            .with_context(|| {
                format!("baseline threshold failed for {}", stage.baseline_dir.display())
            })?;
        manifest.record(Stage::Threshold, &stage.output, table.height(), table.width())?;
    }

    if let Some(stage) = &config.heatwave {
        let threshold_file = stage
            .threshold
            .as_ref()
            .or_else(|| config.threshold.as_ref().map(|threshold| &threshold.output))
            .ok_or_else(|| {
                anyhow!("heatwave.threshold is required when no [threshold] stage is configured")
            })?;

        let outputs = count_heatwave_days(&stage.future_dir, threshold_file, &stage.output_dir)
            .with_context(|| {
                format!("heatwave day count failed for {}", stage.future_dir.display())
            })?;
        for output in &outputs {
            manifest.record(Stage::Heatwave, &output.path, output.cells, 2)?;
        }
    }

    for stage in &config.collate {
        let dir = stage
            .heatwave_dir
            .as_ref()
            .or_else(|| config.heatwave.as_ref().map(|heatwave| &heatwave.output_dir))
            .ok_or_else(|| {
                anyhow!(
                    "collate.heatwave_dir is required for {}/{} when no [heatwave] stage is configured",
                    stage.scenario,
                    stage.model
                )
            })?;

        let table =
            write_collated_heatwave_days(dir, &stage.scenario, &stage.model, &stage.output, alignment)
                .with_context(|| {
                    format!("collation failed for {}/{}", stage.scenario, stage.model)
                })?;
        manifest.record(Stage::Collate, &stage.output, table.height(), table.width())?;
    }

    if let Some(stage) = &config.excess_deaths {
        let table =
            calculate_excess_deaths_with(&stage.er, &stage.mortality, &stage.output, alignment)
                .with_context(|| format!("excess deaths failed for {}", stage.er.display()))?;
        manifest.record(Stage::ExcessDeaths, &stage.output, table.height(), table.width())?;
    }

    if let Some(stage) = &config.benefits {
        let table = calculate_early_warning_benefits_with(
            &stage.heatwave,
            &stage.pop65,
            &stage.pop_u65,
            &stage.output,
            alignment,
        )
        .with_context(|| {
            format!("early warning benefits failed for {}", stage.heatwave.display())
        })?;
        manifest.record(Stage::Benefits, &stage.output, table.height(), table.width())?;
    }

    if let Some(path) = &config.manifest {
        manifest
            .write(path)
            .with_context(|| format!("failed to write run manifest {}", path.display()))?;
    }

    info!(
        outputs = manifest.outputs.len(),
        alignment = alignment.name(),
        "Pipeline run complete"
    );
    Ok(manifest)
}
