use burn::{
    nn::{
        Sigmoid,
        conv::{Conv2d, Conv2dConfig},
    },
    prelude::*,
};

use super::blocks::{
    ConvBlock, ConvBlockConfig, DecoderBlock, DecoderBlockConfig, EncoderBlock, EncoderBlockConfig,
};
use crate::{
    error::{ArchitectureError, check_filters, check_input_shape},
    summary::{ModelSummary, SummaryBuilder},
};

/// Compact U-Net whose depth follows the filter list. Every convolution is
/// batch normalized before its ReLU.
#[derive(Module, Debug)]
pub struct PolypUNet<B: Backend> {
    encoder_blocks: Vec<EncoderBlock<B>>,
    bridge: ConvBlock<B>,
    decoder_blocks: Vec<DecoderBlock<B>>,
    conv_1x1: Conv2d<B>,
    activation: Sigmoid,
}

#[derive(Config, Debug)]
pub struct PolypUNetConfig {
    /// `[height, width, channels]` of the images the model is built for.
    #[config(default = "[256, 256, 3]")]
    pub input_shape: [usize; 3],
    /// One width per encoder stage; the decoder uses them in reverse.
    #[config(default = "vec![16, 32, 48, 64]")]
    pub filters: Vec<usize>,
    #[config(default = "3")]
    pub output_channels: usize,
}

impl PolypUNetConfig {
    pub fn depth(&self) -> usize {
        self.filters.len()
    }

    pub fn validate(&self) -> Result<(), ArchitectureError> {
        check_filters(&self.filters)?;
        check_input_shape(self.input_shape, self.depth())?;

        if self.output_channels == 0 {
            return Err(ArchitectureError::NoOutputChannels);
        }

        Ok(())
    }

    /// Builds the model, panicking on an invalid config. See [Self::try_init].
    pub fn init<B: Backend>(&self, device: &B::Device) -> PolypUNet<B> {
        match self.try_init(device) {
            Ok(model) => model,
            Err(err) => panic!("Invalid polyp U-Net config: {err}"),
        }
    }

    pub fn try_init<B: Backend>(
        &self,
        device: &B::Device,
    ) -> Result<PolypUNet<B>, ArchitectureError> {
        self.validate()?;

        tracing::debug!(
            input_shape = ?self.input_shape,
            filters = ?self.filters,
            output_channels = self.output_channels,
            "building polyp U-Net"
        );

        let mut channels = self.input_shape[2];
        let mut encoder_blocks = Vec::with_capacity(self.depth());
        for &filters in &self.filters {
            let conv_block = ConvBlockConfig::new(channels, filters).with_use_batchnorm(true);
            encoder_blocks.push(EncoderBlockConfig::new(conv_block).init(device));
            channels = filters;
        }

        let bridge = ConvBlockConfig::new(channels, channels)
            .with_use_batchnorm(true)
            .init(device);

        // Skip channels equal the encoder width of the same stage.
        let mut decoder_blocks = Vec::with_capacity(self.depth());
        for &filters in self.filters.iter().rev() {
            decoder_blocks.push(
                DecoderBlockConfig::new(channels, filters, filters)
                    .with_use_batchnorm(true)
                    .init(device),
            );
            channels = filters;
        }

        Ok(PolypUNet {
            encoder_blocks,
            bridge,
            decoder_blocks,
            conv_1x1: Conv2dConfig::new([channels, self.output_channels], [1, 1]).init(device),
            activation: Sigmoid::new(),
        })
    }

    pub fn summary(&self) -> Result<ModelSummary, ArchitectureError> {
        self.validate()?;

        let mut trace = SummaryBuilder::new("polyp_unet", self.input_shape);
        let mut skips = Vec::with_capacity(self.depth());

        for (stage, &filters) in self.filters.iter().enumerate() {
            let block = format!("encoder_blocks.{stage}");
            trace_conv_block(&mut trace, &block, filters);
            skips.push(trace.shape());
            trace.max_pool(format!("{block}.max_pool"));
        }

        let deepest = trace.shape()[2];
        trace_conv_block(&mut trace, "bridge", deepest);

        let decoder = self.filters.iter().rev().zip(skips.iter().rev());
        for (stage, (&filters, &skip)) in decoder.enumerate() {
            let block = format!("decoder_blocks.{stage}");
            trace.upsample(format!("{block}.upsample"));
            trace.concat(format!("{block}.concat"), skip);
            trace_conv_block(&mut trace, &block, filters);
        }

        trace.conv("conv_1x1", self.output_channels, 1, None);
        trace.activation("activation", "sigmoid");

        Ok(trace.finish())
    }
}

fn trace_conv_block(trace: &mut SummaryBuilder, block: &str, filters: usize) {
    for layer in 1..=2 {
        trace.conv(format!("{block}.conv{layer}"), filters, 3, None);
        trace.batch_norm(format!("{block}.norm{layer}"));
        trace.activation(format!("{block}.relu{layer}"), "relu");
    }
}

impl<B: Backend> PolypUNet<B> {
    /// Maps `[batch, channels, height, width]` images to per-pixel
    /// probabilities of shape `[batch, output_channels, height, width]`.
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 4> {
        let mut x = images;
        let mut skips = Vec::with_capacity(self.encoder_blocks.len());

        for block in &self.encoder_blocks {
            let (pooled, skip_features) = block.forward(x);
            skips.push(skip_features);
            x = pooled;
        }

        let mut x = self.bridge.forward(x);

        for (block, skip_features) in self.decoder_blocks.iter().zip(skips.into_iter().rev()) {
            x = block.forward(x, skip_features);
        }

        let x = self.conv_1x1.forward(x);
        self.activation.forward(x)
    }

    pub fn decoder_blocks(&self) -> &[DecoderBlock<B>] {
        &self.decoder_blocks
    }
}
