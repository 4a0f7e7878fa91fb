use thiserror::Error;

/// Errors raised while validating an architecture config, before any layer is
/// allocated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArchitectureError {
    #[error("input shape {shape:?} has a zero-sized {dimension} dimension")]
    EmptyDimension {
        shape: [usize; 3],
        dimension: &'static str,
    },

    /// Every max-pooling stage halves the resolution, so the decoder can only
    /// concatenate its skips if nothing is lost to flooring.
    #[error(
        "input {dimension} {size} is not divisible by {divisor} (2^{depth} for {depth} pooling stages)"
    )]
    IndivisibleDimension {
        dimension: &'static str,
        size: usize,
        divisor: usize,
        depth: usize,
    },

    #[error("{depth} pooling stages would shrink any input below one pixel")]
    TooDeep { depth: usize },

    #[error("filter list must contain at least one stage")]
    NoFilters,

    #[error("filter width at stage {stage} must be positive")]
    ZeroFilters { stage: usize },

    #[error("output channels must be positive")]
    NoOutputChannels,
}

/// Checks an `[height, width, channels]` shape against a network with `depth`
/// pooling stages.
pub(crate) fn check_input_shape(shape: [usize; 3], depth: usize) -> Result<(), ArchitectureError> {
    let [height, width, channels] = shape;

    for (dimension, size) in [("height", height), ("width", width), ("channels", channels)] {
        if size == 0 {
            return Err(ArchitectureError::EmptyDimension { shape, dimension });
        }
    }

    let divisor = u32::try_from(depth)
        .ok()
        .and_then(|depth| 1usize.checked_shl(depth))
        .ok_or(ArchitectureError::TooDeep { depth })?;
    for (dimension, size) in [("height", height), ("width", width)] {
        if size % divisor != 0 {
            return Err(ArchitectureError::IndivisibleDimension {
                dimension,
                size,
                divisor,
                depth,
            });
        }
    }

    Ok(())
}

pub(crate) fn check_filters(filters: &[usize]) -> Result<(), ArchitectureError> {
    if filters.is_empty() {
        return Err(ArchitectureError::NoFilters);
    }

    match filters.iter().position(|&width| width == 0) {
        Some(stage) => Err(ArchitectureError::ZeroFilters { stage }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_shapes_divisible_by_depth() {
        assert_eq!(check_input_shape([256, 256, 3], 4), Ok(()));
        assert_eq!(check_input_shape([32, 48, 1], 4), Ok(()));
        assert_eq!(check_input_shape([8, 8, 3], 3), Ok(()));
    }

    #[test]
    fn rejects_indivisible_width() {
        let err = check_input_shape([256, 250, 3], 4).unwrap_err();
        assert_eq!(
            err,
            ArchitectureError::IndivisibleDimension {
                dimension: "width",
                size: 250,
                divisor: 16,
                depth: 4,
            }
        );
        assert_eq!(
            err.to_string(),
            "input width 250 is not divisible by 16 (2^4 for 4 pooling stages)"
        );
    }

    #[test]
    fn rejects_empty_channels() {
        assert!(matches!(
            check_input_shape([16, 16, 0], 4),
            Err(ArchitectureError::EmptyDimension {
                dimension: "channels",
                ..
            })
        ));
    }

    #[test]
    fn rejects_depths_that_overflow_the_divisor() {
        assert_eq!(
            check_input_shape([256, 256, 3], 64),
            Err(ArchitectureError::TooDeep { depth: 64 })
        );
        assert_eq!(
            check_input_shape([256, 256, 3], usize::MAX),
            Err(ArchitectureError::TooDeep { depth: usize::MAX })
        );
        assert!(matches!(
            check_input_shape([256, 256, 3], 9),
            Err(ArchitectureError::IndivisibleDimension { divisor: 512, .. })
        ));
    }

    #[test]
    fn rejects_bad_filter_lists() {
        assert_eq!(check_filters(&[]), Err(ArchitectureError::NoFilters));
        assert_eq!(
            check_filters(&[16, 0, 32]),
            Err(ArchitectureError::ZeroFilters { stage: 1 })
        );
        assert_eq!(check_filters(&[16, 32, 48, 64]), Ok(()));
    }
}
