#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InterpolationError {
    #[error("interpolation requires at least 2 grid points, got {actual}")]
    InsufficientPoints { actual: usize },
    #[error("interpolation input length mismatch: grid={grid}, values={values}")]
    LengthMismatch { grid: usize, values: usize },
    #[error("grid entry must be finite at index {index}, got {value}")]
    NonFiniteGrid { index: usize, value: f64 },
    #[error("grid must be strictly increasing, index {index} has {current} after {previous}")]
    NonIncreasingGrid {
        index: usize,
        previous: f64,
        current: f64,
    },
}

/// Unchecked kernel for callers that already validated `grid`.
pub(crate) fn interpolate_clamped(query: f64, grid: &[f64], values: &[f64]) -> f64 {
    let last = grid.len() - 1;
    if query <= grid[0] {
        return values[0];
    }
    if query >= grid[last] {
        return values[last];
    }

    match grid.binary_search_by(|node| node.total_cmp(&query)) {
        Ok(index) => values[index],
        Err(upper) => {
            let lower = upper - 1;
            let fraction = (query - grid[lower]) / (grid[upper] - grid[lower]);
            values[lower] + (values[upper] - values[lower]) * fraction
        }
    }
}

pub fn validate_grid(grid: &[f64], values: &[f64]) -> Result<(), InterpolationError> {
    if grid.len() < 2 {
        return Err(InterpolationError::InsufficientPoints { actual: grid.len() });
    }
    if grid.len() != values.len() {
        return Err(InterpolationError::LengthMismatch {
            grid: grid.len(),
            values: values.len(),
        });
    }

    for (index, value) in grid.iter().copied().enumerate() {
        if !value.is_finite() {
            return Err(InterpolationError::NonFiniteGrid { index, value });
        }
        if index > 0 && value <= grid[index - 1] {
            return Err(InterpolationError::NonIncreasingGrid {
                index,
                previous: grid[index - 1],
                current: value,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{interpolate_clamped, validate_grid, InterpolationError};

    #[test]
    fn interpolation_clamps_and_interpolates() {
        let grid = [0.0, 1.0, 3.0];
        let values = [1.0, 3.0, 7.0];
        validate_grid(&grid, &values).expect("valid grid");

        assert_eq!(interpolate_clamped(-0.5, &grid, &values), 1.0);
        assert_eq!(interpolate_clamped(4.0, &grid, &values), 7.0);
        assert_eq!(interpolate_clamped(1.0, &grid, &values), 3.0);
        assert!((interpolate_clamped(2.0, &grid, &values) - 5.0).abs() < 1.0e-15);
    }

    #[test]
    fn grid_validation_rejects_bad_axes() {
        let error = validate_grid(&[0.0, 1.0, 0.5], &[1.0, 2.0, 3.0])
            .expect_err("non-increasing grid should fail");
        assert_eq!(
            error,
            InterpolationError::NonIncreasingGrid {
                index: 2,
                previous: 1.0,
                current: 0.5,
            }
        );
        assert_eq!(
            validate_grid(&[0.0], &[1.0]).expect_err("single point"),
            InterpolationError::InsufficientPoints { actual: 1 }
        );
        assert!(matches!(
            validate_grid(&[0.0, 1.0], &[1.0]),
            Err(InterpolationError::LengthMismatch { grid: 2, values: 1 })
        ));
        assert!(matches!(
            validate_grid(&[0.0, f64::NAN], &[1.0, 2.0]),
            Err(InterpolationError::NonFiniteGrid { index: 1, .. })
        ));
    }
}
