use burn::{
    nn::{
        BatchNorm, BatchNormConfig, Relu,
        conv::{Conv2d, Conv2dConfig},
        pool::MaxPool2d,
    },
    prelude::*,
    tensor::{
        module::interpolate,
        ops::{InterpolateMode, InterpolateOptions},
    },
};
use nn::{PaddingConfig2d, pool::MaxPool2dConfig};

/// Two same-padded 3x3 convolutions, each followed by an optional batch
/// normalization and a ReLU.
#[derive(Module, Debug)]
pub struct ConvBlock<B: Backend> {
    conv1: Conv2d<B>,
    norm1: Option<BatchNorm<B, 2>>,
    conv2: Conv2d<B>,
    norm2: Option<BatchNorm<B, 2>>,
    activation: Relu,
}

impl<B: Backend> ConvBlock<B> {
    pub fn input_channels(&self) -> usize {
        self.conv1.weight.val().dims()[1]
    }

    pub fn num_filters(&self) -> usize {
        self.conv2.weight.val().dims()[0]
    }

    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = self.conv1.forward(x);
        let x = match &self.norm1 {
            Some(norm) => norm.forward(x),
            None => x,
        };
        let x = self.activation.forward(x);

        let x = self.conv2.forward(x);
        let x = match &self.norm2 {
            Some(norm) => norm.forward(x),
            None => x,
        };

        self.activation.forward(x)
    }
}

#[derive(Config, Debug)]
pub struct ConvBlockConfig {
    input_channels: usize,
    num_filters: usize,
    #[config(default = false)]
    use_batchnorm: bool,
}

impl ConvBlockConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> ConvBlock<B> {
        ConvBlock {
            conv1: Conv2dConfig::new([self.input_channels, self.num_filters], [3, 3])
                .with_padding(PaddingConfig2d::Same)
                .init(device),
            norm1: self.init_norm(device),
            conv2: Conv2dConfig::new([self.num_filters, self.num_filters], [3, 3])
                .with_padding(PaddingConfig2d::Same)
                .init(device),
            norm2: self.init_norm(device),
            activation: Relu::new(),
        }
    }

    fn init_norm<B: Backend>(&self, device: &B::Device) -> Option<BatchNorm<B, 2>> {
        self.use_batchnorm
            .then(|| BatchNormConfig::new(self.num_filters).init(device))
    }
}

/// A [ConvBlock] followed by 2x2 max pooling. The pre-pool activations are
/// returned alongside the pooled ones as the skip connection.
#[derive(Module, Debug)]
pub struct EncoderBlock<B: Backend> {
    conv_block: ConvBlock<B>,
    max_pool: MaxPool2d,
}

impl<B: Backend> EncoderBlock<B> {
    pub fn forward(&self, x: Tensor<B, 4>) -> (Tensor<B, 4>, Tensor<B, 4>) {
        let skip_features = self.conv_block.forward(x);
        let x = self.max_pool.forward(skip_features.clone());

        (x, skip_features)
    }
}

#[derive(Config, Debug)]
pub struct EncoderBlockConfig {
    conv_block: ConvBlockConfig,
}

impl EncoderBlockConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> EncoderBlock<B> {
        EncoderBlock {
            conv_block: self.conv_block.init(device),
            max_pool: MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init(),
        }
    }
}

/// Nearest-neighbour 2x upsampling, concatenation with the skip features on the
/// channel axis, then a [ConvBlock].
#[derive(Module, Debug)]
pub struct DecoderBlock<B: Backend> {
    conv_block: ConvBlock<B>,
}

impl<B: Backend> DecoderBlock<B> {
    /// Channels seen by the first convolution, i.e. upsampled plus skip channels.
    pub fn input_channels(&self) -> usize {
        self.conv_block.input_channels()
    }

    pub fn num_filters(&self) -> usize {
        self.conv_block.num_filters()
    }

    pub fn forward(&self, x: Tensor<B, 4>, skip_features: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = upsample_nearest(x);
        let x = Tensor::cat(vec![x, skip_features], 1);

        self.conv_block.forward(x)
    }
}

#[derive(Config, Debug)]
pub struct DecoderBlockConfig {
    input_channels: usize,
    skip_channels: usize,
    num_filters: usize,
    #[config(default = false)]
    use_batchnorm: bool,
}

impl DecoderBlockConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> DecoderBlock<B> {
        DecoderBlock {
            conv_block: ConvBlockConfig::new(
                self.input_channels + self.skip_channels,
                self.num_filters,
            )
            .with_use_batchnorm(self.use_batchnorm)
            .init(device),
        }
    }
}

fn upsample_nearest<B: Backend>(x: Tensor<B, 4>) -> Tensor<B, 4> {
    let [_, _, height, width] = x.dims();

    interpolate(
        x,
        [height * 2, width * 2],
        InterpolateOptions::new(InterpolateMode::Nearest),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::{backend::NdArray, tensor::Distribution};

    type TestBackend = NdArray<f32>;

    fn random_input(shape: [usize; 4]) -> Tensor<TestBackend, 4> {
        Tensor::random(shape, Distribution::Normal(0.0, 1.0), &Default::default())
    }

    #[test]
    fn conv_block_keeps_resolution() {
        let device = Default::default();
        let block = ConvBlockConfig::new(3, 8).init::<TestBackend>(&device);

        let output = block.forward(random_input([2, 3, 16, 12]));

        assert_eq!(output.dims(), [2, 8, 16, 12]);
        // ReLU output
        assert!(output.min().into_scalar() >= 0.0);
    }

    #[test]
    fn conv_block_batchnorm_is_optional() {
        let device = Default::default();
        let plain = ConvBlockConfig::new(4, 8).init::<TestBackend>(&device);
        let normed = ConvBlockConfig::new(4, 8)
            .with_use_batchnorm(true)
            .init::<TestBackend>(&device);

        assert!(plain.norm1.is_none() && plain.norm2.is_none());
        assert!(normed.norm1.is_some() && normed.norm2.is_some());
        // conv weights + biases: 9*4*8 + 8 + 9*8*8 + 8
        assert_eq!(plain.num_params(), 880);
        assert!(normed.num_params() >= plain.num_params() + 2 * 2 * 8);
    }

    #[test]
    fn encoder_block_returns_pooled_and_skip_features() {
        let device = Default::default();
        let block =
            EncoderBlockConfig::new(ConvBlockConfig::new(3, 16)).init::<TestBackend>(&device);

        let (pooled, skip) = block.forward(random_input([1, 3, 32, 32]));

        assert_eq!(pooled.dims(), [1, 16, 16, 16]);
        assert_eq!(skip.dims(), [1, 16, 32, 32]);
    }

    #[test]
    fn decoder_block_concatenates_upsampled_and_skip_channels() {
        let device = Default::default();
        let block = DecoderBlockConfig::new(32, 16, 16).init::<TestBackend>(&device);

        assert_eq!(block.input_channels(), 48);
        assert_eq!(block.num_filters(), 16);

        let output = block.forward(random_input([1, 32, 8, 8]), random_input([1, 16, 16, 16]));

        assert_eq!(output.dims(), [1, 16, 16, 16]);
    }

    #[test]
    fn upsampling_repeats_each_pixel() {
        let device = Default::default();
        let x = Tensor::<TestBackend, 4>::from_floats([[[[1.0, 2.0], [3.0, 4.0]]]], &device);

        let y = upsample_nearest(x);

        assert_eq!(y.dims(), [1, 1, 4, 4]);
        let expected = Tensor::<TestBackend, 4>::from_floats(
            [[[
                [1.0, 1.0, 2.0, 2.0],
                [1.0, 1.0, 2.0, 2.0],
                [3.0, 3.0, 4.0, 4.0],
                [3.0, 3.0, 4.0, 4.0],
            ]]],
            &device,
        );
        y.into_data().assert_eq(&expected.into_data(), true);
    }
}
