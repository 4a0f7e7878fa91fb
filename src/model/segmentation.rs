use burn::{
    nn::conv::{Conv2d, Conv2dConfig},
    prelude::*,
    tensor::activation::sigmoid,
};

use super::blocks::{
    ConvBlock, ConvBlockConfig, DecoderBlock, DecoderBlockConfig, EncoderBlock, EncoderBlockConfig,
};
use crate::{
    error::{ArchitectureError, check_input_shape},
    summary::{ModelSummary, SummaryBuilder},
};

/// Filter widths of the four encoder stages followed by the bottleneck.
pub const SEGMENTATION_FILTERS: [usize; 5] = [16, 32, 64, 128, 256];

const DEPTH: usize = 4;

/// Symmetric four-level U-Net: plain ReLU convolutions, nearest-neighbour
/// upsampling and a sigmoid 1x1 head.
#[derive(Module, Debug)]
pub struct SegmentationUNet<B: Backend> {
    encoder_block_1: EncoderBlock<B>,
    encoder_block_2: EncoderBlock<B>,
    encoder_block_3: EncoderBlock<B>,
    encoder_block_4: EncoderBlock<B>,
    bottleneck: ConvBlock<B>,
    decoder_block_1: DecoderBlock<B>,
    decoder_block_2: DecoderBlock<B>,
    decoder_block_3: DecoderBlock<B>,
    decoder_block_4: DecoderBlock<B>,
    conv_1x1: Conv2d<B>,
}

#[derive(Config, Debug)]
pub struct SegmentationUNetConfig {
    /// `[height, width, channels]` of the images the model is built for.
    #[config(default = "[256, 256, 3]")]
    pub input_shape: [usize; 3],
    #[config(default = "3")]
    pub output_channels: usize,
}

impl SegmentationUNetConfig {
    pub fn validate(&self) -> Result<(), ArchitectureError> {
        check_input_shape(self.input_shape, DEPTH)?;

        if self.output_channels == 0 {
            return Err(ArchitectureError::NoOutputChannels);
        }

        Ok(())
    }

    /// Builds the model, panicking on an invalid config. See [Self::try_init].
    pub fn init<B: Backend>(&self, device: &B::Device) -> SegmentationUNet<B> {
        match self.try_init(device) {
            Ok(model) => model,
            Err(err) => panic!("Invalid segmentation U-Net config: {err}"),
        }
    }

    pub fn try_init<B: Backend>(
        &self,
        device: &B::Device,
    ) -> Result<SegmentationUNet<B>, ArchitectureError> {
        self.validate()?;

        let [f1, f2, f3, f4, f5] = SEGMENTATION_FILTERS;
        let input_channels = self.input_shape[2];

        tracing::debug!(
            input_shape = ?self.input_shape,
            filters = ?SEGMENTATION_FILTERS,
            output_channels = self.output_channels,
            "building segmentation U-Net"
        );

        Ok(SegmentationUNet {
            encoder_block_1: EncoderBlockConfig::new(ConvBlockConfig::new(input_channels, f1))
                .init(device),
            encoder_block_2: EncoderBlockConfig::new(ConvBlockConfig::new(f1, f2)).init(device),
            encoder_block_3: EncoderBlockConfig::new(ConvBlockConfig::new(f2, f3)).init(device),
            encoder_block_4: EncoderBlockConfig::new(ConvBlockConfig::new(f3, f4)).init(device),
            bottleneck: ConvBlockConfig::new(f4, f5).init(device),
            decoder_block_1: DecoderBlockConfig::new(f5, f4, f4).init(device),
            decoder_block_2: DecoderBlockConfig::new(f4, f3, f3).init(device),
            decoder_block_3: DecoderBlockConfig::new(f3, f2, f2).init(device),
            decoder_block_4: DecoderBlockConfig::new(f2, f1, f1).init(device),
            conv_1x1: Conv2dConfig::new([f1, self.output_channels], [1, 1]).init(device),
        })
    }

    pub fn summary(&self) -> Result<ModelSummary, ArchitectureError> {
        self.validate()?;

        let mut trace = SummaryBuilder::new("segmentation_unet", self.input_shape);
        let mut skips = Vec::with_capacity(DEPTH);

        for (stage, &filters) in SEGMENTATION_FILTERS[..DEPTH].iter().enumerate() {
            let block = format!("encoder_block_{}", stage + 1);
            trace.conv(format!("{block}.conv1"), filters, 3, Some("relu"));
            trace.conv(format!("{block}.conv2"), filters, 3, Some("relu"));
            skips.push(trace.shape());
            trace.max_pool(format!("{block}.max_pool"));
        }

        trace.conv("bottleneck.conv1", SEGMENTATION_FILTERS[DEPTH], 3, Some("relu"));
        trace.conv("bottleneck.conv2", SEGMENTATION_FILTERS[DEPTH], 3, Some("relu"));

        let decoder = SEGMENTATION_FILTERS[..DEPTH].iter().rev().zip(skips.iter().rev());
        for (stage, (&filters, &skip)) in decoder.enumerate() {
            let block = format!("decoder_block_{}", stage + 1);
            trace.upsample(format!("{block}.upsample"));
            trace.concat(format!("{block}.concat"), skip);
            trace.conv(format!("{block}.conv1"), filters, 3, Some("relu"));
            trace.conv(format!("{block}.conv2"), filters, 3, Some("relu"));
        }

        trace.conv("conv_1x1", self.output_channels, 1, Some("sigmoid"));

        Ok(trace.finish())
    }
}

impl<B: Backend> SegmentationUNet<B> {
    /// Maps `[batch, channels, height, width]` images to per-pixel
    /// probabilities of shape `[batch, output_channels, height, width]`.
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = images;

        let (x, skip_features_1) = self.encoder_block_1.forward(x);
        let (x, skip_features_2) = self.encoder_block_2.forward(x);
        let (x, skip_features_3) = self.encoder_block_3.forward(x);
        let (x, skip_features_4) = self.encoder_block_4.forward(x);

        let x = self.bottleneck.forward(x);

        let x = self.decoder_block_1.forward(x, skip_features_4);
        let x = self.decoder_block_2.forward(x, skip_features_3);
        let x = self.decoder_block_3.forward(x, skip_features_2);
        let x = self.decoder_block_4.forward(x, skip_features_1);

        sigmoid(self.conv_1x1.forward(x))
    }

    pub fn decoder_blocks(&self) -> [&DecoderBlock<B>; DEPTH] {
        [
            &self.decoder_block_1,
            &self.decoder_block_2,
            &self.decoder_block_3,
            &self.decoder_block_4,
        ]
    }
}
