/// Trapezoid-rule integral of `values` over an increasing abscissa.
pub fn trapezoid(abscissa: &[f64], values: &[f64]) -> f64 {
    abscissa
        .windows(2)
        .zip(values.windows(2))
        .map(|(x, y)| 0.5 * (y[0] + y[1]) * (x[1] - x[0]))
        .sum()
}

/// Running trapezoid integral starting from `initial` at the first abscissa.
pub fn cumulative_trapezoid(abscissa: &[f64], values: &[f64], initial: f64) -> Vec<f64> {
    let mut output = Vec::with_capacity(abscissa.len());
    let mut running = initial;
    if !abscissa.is_empty() {
        output.push(running);
    }
    for (x, y) in abscissa.windows(2).zip(values.windows(2)) {
        running += 0.5 * (y[0] + y[1]) * (x[1] - x[0]);
        output.push(running);
    }
    output
}

#[cfg(test)]
mod tests {
    use super::{cumulative_trapezoid, trapezoid};

    #[test]
    fn trapezoid_is_exact_for_linear_functions() {
        let xs = [0.0, 0.3, 1.1, 2.0];
        let ys: Vec<f64> = xs.iter().map(|x| 2.0 * x + 1.0).collect();
        assert!((trapezoid(&xs, &ys) - 6.0).abs() < 1.0e-12);
    }

    #[test]
    fn cumulative_trapezoid_matches_total_and_starts_at_initial() {
        let xs = [0.0, 1.0, 2.0, 4.0];
        let ys = [1.0, 1.0, 1.0, 1.0];
        let running = cumulative_trapezoid(&xs, &ys, 0.5);
        assert_eq!(running, vec![0.5, 1.5, 2.5, 4.5]);
    }
}
