#![cfg(all(feature = "segmentation", feature = "polyp"))]

use burn::config::Config;
use unet_architectures::{PolypUNetConfig, SegmentationUNetConfig};

fn scratch_file(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("unet-architectures-{}-{name}", std::process::id()))
}

#[test]
fn polyp_config_round_trips_through_json() {
    let path = scratch_file("polyp.json");
    let config = PolypUNetConfig::new()
        .with_input_shape([128, 128, 1])
        .with_filters(vec![8, 16, 32])
        .with_output_channels(1);

    config.save(&path).unwrap();
    let loaded = PolypUNetConfig::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded.input_shape, [128, 128, 1]);
    assert_eq!(loaded.filters, vec![8, 16, 32]);
    assert_eq!(loaded.output_channels, 1);
}

#[test]
fn segmentation_config_round_trips_through_json() {
    let path = scratch_file("segmentation.json");
    let config = SegmentationUNetConfig::new().with_input_shape([64, 64, 3]);

    config.save(&path).unwrap();
    let loaded = SegmentationUNetConfig::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded.input_shape, [64, 64, 3]);
    assert_eq!(loaded.output_channels, 3);
}

#[test]
fn default_configs_match_reference_networks() {
    let polyp = PolypUNetConfig::new();
    assert_eq!(polyp.input_shape, [256, 256, 3]);
    assert_eq!(polyp.filters, vec![16, 32, 48, 64]);
    assert_eq!(polyp.output_channels, 3);

    let segmentation = SegmentationUNetConfig::new();
    assert_eq!(segmentation.input_shape, [256, 256, 3]);
    assert_eq!(segmentation.output_channels, 3);
}
