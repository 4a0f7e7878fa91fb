use std::path::PathBuf;

use anyhow::{Context, Result};
use burn::config::Config;
use clap::Args;

use super::{ModelArgs, ModelConfig};

#[derive(Args)]
pub struct InitConfigArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    #[arg(short, long)]
    pub output: PathBuf,
}

pub fn run(args: &InitConfigArgs) -> Result<()> {
    let config = args.model.resolve()?;

    let saved = match &config {
        ModelConfig::Segmentation(config) => config.save(&args.output),
        ModelConfig::Polyp(config) => config.save(&args.output),
    };
    saved.with_context(|| format!("failed to write {}", args.output.display()))?;

    tracing::info!(
        model = config.name(),
        path = %args.output.display(),
        "config written"
    );
    Ok(())
}
