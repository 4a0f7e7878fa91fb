pub mod check;
pub mod init_config;
pub mod summary;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use burn::config::Config;
use clap::{Args, ValueEnum};
use unet_architectures::{ModelSummary, PolypUNetConfig, SegmentationUNetConfig};

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Architecture {
    /// Symmetric U-Net, filters 16-32-64-128-256
    Segmentation,
    /// Compact batch-normalized U-Net, configurable filters
    Polyp,
}

/// Selects an architecture and overrides parts of its config.
#[derive(Args)]
pub struct ModelArgs {
    #[arg(short, long, value_enum, default_value_t = Architecture::Polyp)]
    pub model: Architecture,

    /// JSON config to start from instead of the defaults
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub height: Option<usize>,

    #[arg(long)]
    pub width: Option<usize>,

    #[arg(long)]
    pub channels: Option<usize>,

    /// Comma separated encoder widths (polyp only), e.g. 16,32,48,64
    #[arg(long, value_delimiter = ',')]
    pub filters: Option<Vec<usize>>,

    #[arg(long)]
    pub output_channels: Option<usize>,
}

pub enum ModelConfig {
    Segmentation(SegmentationUNetConfig),
    Polyp(PolypUNetConfig),
}

impl ModelArgs {
    pub fn resolve(&self) -> Result<ModelConfig> {
        let config = match self.model {
            Architecture::Segmentation => {
                if self.filters.is_some() {
                    bail!("--filters only applies to the polyp model");
                }

                let mut config = match &self.config {
                    Some(path) => load_config::<SegmentationUNetConfig>(path)?,
                    None => SegmentationUNetConfig::new(),
                };
                config.input_shape = self.input_shape(config.input_shape);
                if let Some(output_channels) = self.output_channels {
                    config.output_channels = output_channels;
                }
                ModelConfig::Segmentation(config)
            }
            Architecture::Polyp => {
                let mut config = match &self.config {
                    Some(path) => load_config::<PolypUNetConfig>(path)?,
                    None => PolypUNetConfig::new(),
                };
                config.input_shape = self.input_shape(config.input_shape);
                if let Some(filters) = &self.filters {
                    config.filters = filters.clone();
                }
                if let Some(output_channels) = self.output_channels {
                    config.output_channels = output_channels;
                }
                ModelConfig::Polyp(config)
            }
        };

        config.validate()?;
        Ok(config)
    }

    fn input_shape(&self, [height, width, channels]: [usize; 3]) -> [usize; 3] {
        [
            self.height.unwrap_or(height),
            self.width.unwrap_or(width),
            self.channels.unwrap_or(channels),
        ]
    }
}

impl ModelConfig {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Segmentation(_) => "segmentation",
            Self::Polyp(_) => "polyp",
        }
    }

    pub fn input_shape(&self) -> [usize; 3] {
        match self {
            Self::Segmentation(config) => config.input_shape,
            Self::Polyp(config) => config.input_shape,
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Segmentation(config) => config.validate()?,
            Self::Polyp(config) => config.validate()?,
        }
        Ok(())
    }

    pub fn summary(&self) -> Result<ModelSummary> {
        let summary = match self {
            Self::Segmentation(config) => config.summary()?,
            Self::Polyp(config) => config.summary()?,
        };
        Ok(summary)
    }
}

fn load_config<C: Config>(path: &Path) -> Result<C> {
    C::load(path)
        .map_err(|e| anyhow::anyhow!("{e}"))
        .with_context(|| format!("failed to load config from {}", path.display()))
}
