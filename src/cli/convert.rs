use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use lnstacks::transform::{StackTransformer, TransformConfig};

use super::config::Config;

/// Convert a single stack with the default group and dataset names
pub fn run(input: PathBuf, config: &Config, parallel: bool) -> Result<()> {
    let settings = &config.conversion;
    let defaults = TransformConfig::default();
    let transform_config = TransformConfig {
        parallel: parallel || settings.parallel.unwrap_or(defaults.parallel),
        batch_frames: settings.batch_frames.unwrap_or(defaults.batch_frames),
        progress_interval: settings
            .progress_interval
            .unwrap_or(defaults.progress_interval),
        ..defaults
    };

    let transformer = StackTransformer::with_config(transform_config);
    let active = transformer.config();
    info!("Input:  {}", input.display());
    info!("Group:  {}", active.tree_path);
    info!("Dataset: {}", active.dataset_path);
    if active.parallel {
        info!("Parallel transform: enabled (batch_frames={})", active.batch_frames);
    }

    let stats = transformer
        .convert(&input)
        .with_context(|| format!("Conversion of {} failed", input.display()))?;

    info!("{}", stats);
    if let Some(report) = &stats.metadata {
        for (field, reason) in &report.skipped {
            info!("  metadata {} skipped: {}", field, reason);
        }
    }

    let notice = format!("Stack {} has been converted", input.display());
    #[cfg(feature = "colorized_output")]
    {
        println!("{}", console::style(notice).green());
    }

    #[cfg(not(feature = "colorized_output"))]
    {
        println!("{}", notice);
    }

    Ok(())
}
