//! U-Net encoder-decoder architectures for image segmentation, built on burn.
//!
//! Two variants are provided, each behind the cargo feature of the same name:
//! - `SegmentationUNet` (`segmentation`): a symmetric four-level U-Net with plain ReLU
//!   convolutions and filter widths `[16, 32, 64, 128, 256]`.
//! - `PolypUNet` (`polyp`): a compact U-Net with batch-normalized convolution blocks whose
//!   depth follows a configurable filter list, `[16, 32, 48, 64]` by default.
//!
//! Both map `[batch, channels, height, width]` images to sigmoid probabilities of
//! shape `[batch, 3, height, width]`.

mod error;
pub mod model;
pub mod summary;

pub use error::ArchitectureError;

#[cfg(feature = "polyp")]
pub use model::{PolypUNet, PolypUNetConfig};
#[cfg(feature = "segmentation")]
pub use model::{SegmentationUNet, SegmentationUNetConfig};
pub use summary::{LayerKind, LayerSummary, ModelSummary};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
