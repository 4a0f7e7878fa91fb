mod blocks;
#[cfg(feature = "polyp")]
mod polyp;
#[cfg(feature = "segmentation")]
mod segmentation;

pub use blocks::{
    ConvBlock, ConvBlockConfig, DecoderBlock, DecoderBlockConfig, EncoderBlock, EncoderBlockConfig,
};

#[cfg(feature = "polyp")]
pub use polyp::{PolypUNet, PolypUNetConfig};
#[cfg(feature = "segmentation")]
pub use segmentation::{SEGMENTATION_FILTERS, SegmentationUNet, SegmentationUNetConfig};
