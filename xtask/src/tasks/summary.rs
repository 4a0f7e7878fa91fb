use anyhow::Result;
use clap::Args;

use super::ModelArgs;

#[derive(Args)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub model: ModelArgs,
}

pub fn run(args: &SummaryArgs) -> Result<()> {
    let config = args.model.resolve()?;
    let summary = config.summary()?;

    tracing::info!(
        model = config.name(),
        layers = summary.layers.len(),
        "summarized architecture"
    );
    println!("{summary}");

    Ok(())
}
