//! Formal solution of the plane-parallel transfer equation with a source function
//! that is piecewise linear in monochromatic optical depth.

use super::{check_length, check_positive, AngleGrid, TransferError};
use crate::numerics::cumulative_trapezoid;

#[derive(Debug, Clone, Copy)]
pub struct FormalInput<'a> {
    /// Monochromatic optical depth per model depth, increasing.
    pub tau: &'a [f64],
    /// Thermal source function B(T) per model depth.
    pub thermal: &'a [f64],
    /// Fraction of the source replaced by the mean intensity, per depth.
    pub scattering: Option<&'a [f64]>,
    pub angles: &'a AngleGrid,
}

/// tau_lambda on the Rosseland grid from d tau_lambda = (kappa_lambda / kappa_R) d tau_R.
pub fn monochromatic_depth(
    ln_tau_ross: &[f64],
    ln_kappa_ross: &[f64],
    ln_kappa: &[f64],
) -> Result<Vec<f64>, TransferError> {
    let count = ln_tau_ross.len();
    if count < 2 {
        return Err(TransferError::TooFewDepths { actual: count });
    }
    check_length("Rosseland opacity", count, ln_kappa_ross)?;
    check_length("opacity", count, ln_kappa)?;
    let integrand: Vec<f64> = (0..count)
        .map(|depth| (ln_tau_ross[depth] + ln_kappa[depth] - ln_kappa_ross[depth]).exp())
        .collect();
    let tau = cumulative_trapezoid(ln_tau_ross, &integrand, integrand[0]);
    check_positive("monochromatic optical depth", &tau)?;
    Ok(tau)
}

/// Surface intensity for each `mu` of the angle grid.
pub fn emergent_intensity(input: FormalInput<'_>) -> Result<Vec<f64>, TransferError> {
    let count = input.tau.len();
    if count < 2 {
        return Err(TransferError::TooFewDepths { actual: count });
    }
    check_length("source function", count, input.thermal)?;
    check_positive("optical depth", input.tau)?;
    if let Some(scattering) = input.scattering {
        check_length("scattering fraction", count, scattering)?;
    }

    // A tau = 0 point carrying the top value closes the grid at the surface.
    let mut tau = Vec::with_capacity(count + 1);
    tau.push(0.0);
    tau.extend_from_slice(input.tau);
    let mut source = Vec::with_capacity(count + 1);
    source.push(input.thermal[0]);
    source.extend_from_slice(input.thermal);

    if let Some(scattering) = input.scattering
        && scattering.iter().any(|fraction| *fraction > 0.0)
    {
        let mean = mean_intensity(&tau, &source, input.angles);
        for index in 0..source.len() {
            let fraction = scattering[index.saturating_sub(1)].clamp(0.0, 1.0);
            source[index] = (1.0 - fraction) * source[index] + fraction * mean[index];
        }
    }

    Ok(input
        .angles
        .mu
        .iter()
        .map(|mu| outward(&tau, &source, *mu, 0))
        .collect())
}

/// J at every grid point from one pass of the Lambda operator.
fn mean_intensity(tau: &[f64], source: &[f64], angles: &AngleGrid) -> Vec<f64> {
    (0..tau.len())
        .map(|index| {
            0.5 * angles
                .mu
                .iter()
                .zip(&angles.weights)
                .map(|(mu, weight)| weight * (outward(tau, source, *mu, index) + inward(tau, source, *mu, index)))
                .sum::<f64>()
        })
        .collect()
}

/// Int_0^delta (near + slope u) exp(-u / mu) du / mu.
fn segment(near: f64, far: f64, delta: f64, mu: f64) -> f64 {
    if delta <= 0.0 {
        return 0.0;
    }
    let d = delta / mu;
    let absorbed = -(-d).exp_m1();
    let slope = (far - near) / delta;
    near * absorbed + slope * mu * (absorbed - d * (-d).exp())
}

/// Intensity leaving `tau[from]` toward the surface along `mu`.
fn outward(tau: &[f64], source: &[f64], mu: f64, from: usize) -> f64 {
    let last = tau.len() - 1;
    let mut intensity = 0.0;
    for index in from..last {
        let attenuation = (-(tau[index] - tau[from]) / mu).exp();
        if attenuation == 0.0 {
            return intensity;
        }
        intensity += attenuation * segment(source[index], source[index + 1], tau[index + 1] - tau[index], mu);
    }
    // Linear extrapolation of S below the bottom (diffusion limit).
    let delta = tau[last] - tau[last - 1];
    let slope = if delta > 0.0 {
        (source[last] - source[last - 1]) / delta
    } else {
        0.0
    };
    intensity + (-(tau[last] - tau[from]) / mu).exp() * (source[last] + slope * mu)
}

/// Intensity arriving at `tau[to]` from above along `mu`; nothing enters at the top.
fn inward(tau: &[f64], source: &[f64], mu: f64, to: usize) -> f64 {
    let mut intensity = 0.0;
    for index in (1..=to).rev() {
        let attenuation = (-(tau[to] - tau[index]) / mu).exp();
        if attenuation == 0.0 {
            break;
        }
        intensity += attenuation * segment(source[index], source[index - 1], tau[index] - tau[index - 1], mu);
    }
    intensity
}

#[cfg(test)]
mod tests {
    use super::{emergent_intensity, monochromatic_depth, FormalInput};
    use crate::transfer::AngleGrid;

    fn assert_scalar_close(label: &str, expected: f64, actual: f64, abs_tol: f64, rel_tol: f64) {
        let tolerance = abs_tol.max(rel_tol * expected.abs());
        assert!(
            (expected - actual).abs() <= tolerance,
            "{label}: expected {expected}, got {actual}, tolerance {tolerance}"
        );
    }

    fn tau_grid() -> Vec<f64> {
        (0..80).map(|index| 10f64.powf(-9.0 + 11.0 * index as f64 / 79.0)).collect()
    }

    #[test]
    fn linear_source_obeys_eddington_barbier() {
        let tau = tau_grid();
        let thermal: Vec<f64> = tau.iter().map(|t| 1.0 + 2.0 * t).collect();
        let angles = AngleGrid::gauss(6).expect("angles");
        let intensity = emergent_intensity(FormalInput {
            tau: &tau,
            thermal: &thermal,
            scattering: None,
            angles: &angles,
        })
        .expect("intensity");
        for (mu, value) in angles.mu.iter().zip(&intensity) {
            assert_scalar_close("I(mu)", 1.0 + 2.0 * mu, *value, 0.0, 1.0e-6);
        }
    }

    #[test]
    fn scattering_lowers_the_surface_source() {
        let tau = tau_grid();
        let thermal = vec![1.0; tau.len()];
        let angles = AngleGrid::gauss(6).expect("angles");
        let pure = emergent_intensity(FormalInput {
            tau: &tau,
            thermal: &thermal,
            scattering: None,
            angles: &angles,
        })
        .expect("pure absorption");
        let scattering = vec![0.9; tau.len()];
        let scattered = emergent_intensity(FormalInput {
            tau: &tau,
            thermal: &thermal,
            scattering: Some(&scattering),
            angles: &angles,
        })
        .expect("scattering");
        for (pure, scattered) in pure.iter().zip(&scattered) {
            assert_scalar_close("isothermal LTE", 1.0, *pure, 0.0, 1.0e-9);
            // J = S / 2 at the surface, so one Lambda pass drops the near-surface source.
            assert!(*scattered < *pure);
            assert!(*scattered > 0.5);
        }
    }

    #[test]
    fn monochromatic_depth_scales_with_the_opacity_ratio() {
        let ln_tau: Vec<f64> = (0..40).map(|index| (-12.0 + 0.4 * index as f64)).collect();
        let ln_kappa_ross = vec![0.0; 40];
        let ln_kappa = vec![2.0_f64.ln(); 40];
        let tau = monochromatic_depth(&ln_tau, &ln_kappa_ross, &ln_kappa).expect("depth");
        for (ln_tau, tau) in ln_tau.iter().zip(&tau).skip(1) {
            assert_scalar_close("tau_lambda", 2.0 * ln_tau.exp(), *tau, 0.0, 0.03);
        }
        assert!(tau.windows(2).all(|pair| pair[1] > pair[0]));
    }
}
