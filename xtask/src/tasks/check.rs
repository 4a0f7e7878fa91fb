use std::time::Instant;

use anyhow::{Result, ensure};
use burn::{prelude::*, tensor::Distribution};
use clap::Args;

use super::{ModelArgs, ModelConfig};

#[cfg(not(feature = "wgpu"))]
type CheckBackend = burn::backend::NdArray<f32>;
#[cfg(feature = "wgpu")]
type CheckBackend = burn::backend::Wgpu<f32, i32>;

#[derive(Args)]
pub struct CheckArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    #[arg(short, long, default_value_t = 1)]
    pub batch_size: usize,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

pub fn run(args: &CheckArgs) -> Result<()> {
    let config = args.model.resolve()?;
    let summary = config.summary()?;

    let device = Default::default();
    CheckBackend::seed(args.seed);

    let [height, width, channels] = config.input_shape();
    let images = Tensor::<CheckBackend, 4>::random(
        [args.batch_size, channels, height, width],
        Distribution::Uniform(0.0, 1.0),
        &device,
    );

    tracing::info!(model = config.name(), ?device, "building model");
    let start = Instant::now();
    let (output, num_params) = match &config {
        ModelConfig::Segmentation(config) => {
            let model = config.try_init::<CheckBackend>(&device)?;
            (model.forward(images), model.num_params())
        }
        ModelConfig::Polyp(config) => {
            let model = config.try_init::<CheckBackend>(&device)?;
            (model.forward(images), model.num_params())
        }
    };

    let dims = output.dims();
    let min = output.clone().min().into_scalar();
    let max = output.max().into_scalar();
    tracing::info!(
        output_shape = ?dims,
        min,
        max,
        num_params,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "forward pass finished"
    );

    let [_, _, expected_channels] = summary.output_shape().unwrap_or_default();
    ensure!(
        dims == [args.batch_size, expected_channels, height, width],
        "unexpected output shape {dims:?}"
    );
    ensure!(
        (0.0..=1.0).contains(&min) && (0.0..=1.0).contains(&max),
        "output range [{min}, {max}] is outside [0, 1]"
    );
    ensure!(
        num_params == summary.total_params(),
        "burn reports {num_params} parameters, summary expects {}",
        summary.total_params()
    );

    tracing::info!("check passed");
    Ok(())
}
