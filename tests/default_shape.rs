#![cfg(all(feature = "segmentation", feature = "polyp"))]

use burn::{backend::NdArray, prelude::*, tensor::Distribution};
use unet_architectures::{PolypUNetConfig, SegmentationUNetConfig};

type TestBackend = NdArray<f32>;

fn default_images(device: &<TestBackend as Backend>::Device) -> Tensor<TestBackend, 4> {
    Tensor::random([1, 3, 256, 256], Distribution::Uniform(0.0, 1.0), device)
}

#[test]
fn segmentation_unet_maps_default_images_to_same_size_masks() {
    let device = Default::default();
    let model = SegmentationUNetConfig::new().init::<TestBackend>(&device);

    let output = model.forward(default_images(&device));

    assert_eq!(output.dims(), [1, 3, 256, 256]);
    assert!(output.clone().min().into_scalar() >= 0.0);
    assert!(output.max().into_scalar() <= 1.0);
}

#[test]
fn polyp_unet_maps_default_images_to_same_size_masks() {
    let device = Default::default();
    let model = PolypUNetConfig::new().init::<TestBackend>(&device);

    let output = model.forward(default_images(&device));

    assert_eq!(output.dims(), [1, 3, 256, 256]);
    assert!(output.clone().min().into_scalar() >= 0.0);
    assert!(output.max().into_scalar() <= 1.0);
}

#[test]
fn summaries_agree_with_forward_shapes() {
    let shape = [64, 96, 3];

    let segmentation = SegmentationUNetConfig::new()
        .with_input_shape(shape)
        .summary()
        .unwrap();
    let polyp = PolypUNetConfig::new()
        .with_input_shape(shape)
        .summary()
        .unwrap();

    assert_eq!(segmentation.output_shape(), Some([64, 96, 3]));
    assert_eq!(polyp.output_shape(), Some([64, 96, 3]));
}
