use crate::common::constants::PI;

const NEWTON_TOLERANCE: f64 = 1.0e-15;
const NEWTON_MAX_ITERATIONS: usize = 100;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QuadratureError {
    #[error("Gauss-Legendre quadrature requires at least 1 node")]
    NoNodes,
    #[error("Gauss-Legendre interval [{lower}, {upper}] is not finite and increasing")]
    InvalidInterval { lower: f64, upper: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuadratureRule {
    pub nodes: Vec<f64>,
    pub weights: Vec<f64>,
}

/// Gauss-Legendre nodes (ascending) and weights mapped onto `[lower, upper]`.
pub fn gauss_legendre(
    count: usize,
    lower: f64,
    upper: f64,
) -> Result<QuadratureRule, QuadratureError> {
    if count == 0 {
        return Err(QuadratureError::NoNodes);
    }
    if !lower.is_finite() || !upper.is_finite() || upper <= lower {
        return Err(QuadratureError::InvalidInterval { lower, upper });
    }

    let half_width = 0.5 * (upper - lower);
    let midpoint = 0.5 * (upper + lower);
    let mut nodes = vec![0.0; count];
    let mut weights = vec![0.0; count];
    let n = count as f64;

    for root in 0..count.div_ceil(2) {
        let mut x = (PI * (root as f64 + 0.75) / (n + 0.5)).cos();
        for _ in 0..NEWTON_MAX_ITERATIONS {
            let (value, slope) = legendre_with_derivative(count, x);
            let step = value / slope;
            x -= step;
            if step.abs() < NEWTON_TOLERANCE {
                break;
            }
        }
        let (_, derivative) = legendre_with_derivative(count, x);

        let weight = 2.0 / ((1.0 - x * x) * derivative * derivative);
        nodes[root] = midpoint - half_width * x;
        nodes[count - 1 - root] = midpoint + half_width * x;
        weights[root] = half_width * weight;
        weights[count - 1 - root] = half_width * weight;
    }

    Ok(QuadratureRule { nodes, weights })
}

fn legendre_with_derivative(order: usize, x: f64) -> (f64, f64) {
    let mut previous = 1.0;
    let mut current = x;
    if order == 0 {
        return (1.0, 0.0);
    }
    for degree in 2..=order {
        let k = degree as f64;
        let next = ((2.0 * k - 1.0) * x * current - (k - 1.0) * previous) / k;
        previous = current;
        current = next;
    }
    let slope = order as f64 * (x * current - previous) / (x * x - 1.0);
    (current, slope)
}
