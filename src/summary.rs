//! Layer-by-layer summary of an architecture, computed from its config without
//! allocating any tensors.

use core::fmt;

use derive_new::new;

/// What a summarized layer does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    Input,
    Conv2d {
        kernel: usize,
        activation: Option<&'static str>,
    },
    BatchNorm,
    Activation(&'static str),
    MaxPool2d,
    UpSample2d,
    Concatenate,
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => f.write_str("Input"),
            Self::Conv2d {
                kernel,
                activation: Some(activation),
            } => write!(f, "Conv2d {kernel}x{kernel} + {activation}"),
            Self::Conv2d {
                kernel,
                activation: None,
            } => write!(f, "Conv2d {kernel}x{kernel}"),
            Self::BatchNorm => f.write_str("BatchNorm"),
            Self::Activation(name) => write!(f, "Activation {name}"),
            Self::MaxPool2d => f.write_str("MaxPool2d"),
            Self::UpSample2d => f.write_str("UpSample2d"),
            Self::Concatenate => f.write_str("Concatenate"),
        }
    }
}

/// One row of a [ModelSummary]. Shapes are `[height, width, channels]`.
#[derive(new, Debug, Clone, PartialEq, Eq)]
pub struct LayerSummary {
    pub name: String,
    pub kind: LayerKind,
    pub output_shape: [usize; 3],
    pub trainable_params: usize,
    pub non_trainable_params: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSummary {
    pub name: String,
    pub layers: Vec<LayerSummary>,
}

impl ModelSummary {
    pub fn input_shape(&self) -> Option<[usize; 3]> {
        self.layers.first().map(|layer| layer.output_shape)
    }

    pub fn output_shape(&self) -> Option<[usize; 3]> {
        self.layers.last().map(|layer| layer.output_shape)
    }

    pub fn trainable_params(&self) -> usize {
        self.layers.iter().map(|layer| layer.trainable_params).sum()
    }

    /// Batch normalization running statistics.
    pub fn non_trainable_params(&self) -> usize {
        self.layers.iter().map(|layer| layer.non_trainable_params).sum()
    }

    pub fn total_params(&self) -> usize {
        self.trainable_params() + self.non_trainable_params()
    }

    pub fn layer(&self, name: &str) -> Option<&LayerSummary> {
        self.layers.iter().find(|layer| layer.name == name)
    }
}

impl fmt::Display for ModelSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name_width = self
            .layers
            .iter()
            .map(|layer| layer.name.len())
            .max()
            .unwrap_or(0)
            .max("Layer".len());
        let rule = "-".repeat(name_width + 64);

        writeln!(f, "Model: {}", self.name)?;
        writeln!(f, "{rule}")?;
        writeln!(
            f,
            "{:<name_width$}  {:<24}  {:<18}  {:>14}",
            "Layer", "Kind", "Output shape", "Params"
        )?;
        writeln!(f, "{rule}")?;
        for layer in &self.layers {
            let [height, width, channels] = layer.output_shape;
            writeln!(
                f,
                "{:<name_width$}  {:<24}  {:<18}  {:>14}",
                layer.name,
                layer.kind.to_string(),
                format!("({height}, {width}, {channels})"),
                layer.trainable_params + layer.non_trainable_params,
            )?;
        }
        writeln!(f, "{rule}")?;
        writeln!(f, "Total params: {}", self.total_params())?;
        writeln!(f, "Trainable params: {}", self.trainable_params())?;
        write!(f, "Non-trainable params: {}", self.non_trainable_params())
    }
}

/// Walks a topology layer by layer, tracking the running `[height, width,
/// channels]` shape.
#[derive(Debug)]
pub(crate) struct SummaryBuilder {
    name: String,
    layers: Vec<LayerSummary>,
    shape: [usize; 3],
}

impl SummaryBuilder {
    pub(crate) fn new(name: impl Into<String>, input_shape: [usize; 3]) -> Self {
        Self {
            name: name.into(),
            layers: vec![LayerSummary::new(
                "input".to_string(),
                LayerKind::Input,
                input_shape,
                0,
                0,
            )],
            shape: input_shape,
        }
    }

    pub(crate) fn shape(&self) -> [usize; 3] {
        self.shape
    }

    /// Same-padded, stride 1 convolution with bias.
    pub(crate) fn conv(
        &mut self,
        name: impl Into<String>,
        filters: usize,
        kernel: usize,
        activation: Option<&'static str>,
    ) {
        let [height, width, channels] = self.shape;
        let params = kernel * kernel * channels * filters + filters;

        self.push(
            name,
            LayerKind::Conv2d { kernel, activation },
            [height, width, filters],
            params,
            0,
        );
    }

    /// Scale and shift are trained, mean and variance are tracked.
    pub(crate) fn batch_norm(&mut self, name: impl Into<String>) {
        let channels = self.shape[2];
        self.push(
            name,
            LayerKind::BatchNorm,
            self.shape,
            2 * channels,
            2 * channels,
        );
    }

    pub(crate) fn activation(&mut self, name: impl Into<String>, activation: &'static str) {
        self.push(name, LayerKind::Activation(activation), self.shape, 0, 0);
    }

    pub(crate) fn max_pool(&mut self, name: impl Into<String>) {
        let [height, width, channels] = self.shape;
        self.push(
            name,
            LayerKind::MaxPool2d,
            [height / 2, width / 2, channels],
            0,
            0,
        );
    }

    pub(crate) fn upsample(&mut self, name: impl Into<String>) {
        let [height, width, channels] = self.shape;
        self.push(
            name,
            LayerKind::UpSample2d,
            [height * 2, width * 2, channels],
            0,
            0,
        );
    }

    /// Channel-wise concatenation. Config validation guarantees matching
    /// spatial sizes.
    pub(crate) fn concat(&mut self, name: impl Into<String>, skip: [usize; 3]) {
        let [height, width, channels] = self.shape;
        debug_assert_eq!([height, width], [skip[0], skip[1]]);

        self.push(
            name,
            LayerKind::Concatenate,
            [height, width, channels + skip[2]],
            0,
            0,
        );
    }

    pub(crate) fn finish(self) -> ModelSummary {
        ModelSummary {
            name: self.name,
            layers: self.layers,
        }
    }

    fn push(
        &mut self,
        name: impl Into<String>,
        kind: LayerKind,
        output_shape: [usize; 3],
        trainable_params: usize,
        non_trainable_params: usize,
    ) {
        self.shape = output_shape;
        self.layers.push(LayerSummary::new(
            name.into(),
            kind,
            output_shape,
            trainable_params,
            non_trainable_params,
        ));
    }
}
