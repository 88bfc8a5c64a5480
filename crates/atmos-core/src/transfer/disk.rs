//! Disk integration of the emergent intensity into flux.
//!
//! Each Gauss node mu is an annulus of projected radius sqrt(1 - mu^2); with
//! rotation the annulus is split into `phi_count` sectors whose line-of-sight
//! velocity is v sin i r cos(phi). Macroturbulence is a Gaussian convolution of
//! the resulting flux in velocity space.

use super::{check_length, AngleGrid, TransferError};
use crate::common::constants::{C_LIGHT, PI};
use crate::domain::ExecutionMode;
use crate::numerics::interpolate_clamped;

/// Convolution kernels are cut at this many 1/e half widths.
const KERNEL_HALF_WIDTHS: f64 = 4.0;

#[derive(Debug, Clone, Copy)]
pub struct DiskInput<'a> {
    pub wavelengths_nm: &'a [f64],
    /// Surface intensity indexed `[wavelength][mu]`.
    pub intensity: &'a [Vec<f64>],
    pub angles: &'a AngleGrid,
    pub equatorial_velocity_km_s: f64,
    pub inclination_deg: f64,
    pub phi_count: usize,
    pub macroturbulence_km_s: f64,
    pub mode: ExecutionMode,
}

fn light_speed_km_s() -> f64 {
    C_LIGHT * 1.0e-5
}

/// Flux per wavelength (same units as the intensity times sr).
pub fn integrate_disk(input: DiskInput<'_>) -> Result<Vec<f64>, TransferError> {
    let count = input.wavelengths_nm.len();
    if input.intensity.len() != count {
        return Err(TransferError::LengthMismatch {
            name: "intensity rows",
            expected: count,
            actual: input.intensity.len(),
        });
    }
    for row in input.intensity {
        check_length("intensity angles", input.angles.len(), row)?;
    }

    let v_sin_i = input.equatorial_velocity_km_s * input.inclination_deg.to_radians().sin();
    let flux = if v_sin_i > 0.0 && input.phi_count > 0 {
        rotated_flux(&input, v_sin_i)
    } else {
        input.intensity.iter().map(|row| input.angles.flux(row)).collect()
    };

    if input.macroturbulence_km_s > 0.0 {
        Ok(gaussian_broaden(input.wavelengths_nm, &flux, input.macroturbulence_km_s, input.mode))
    } else {
        Ok(flux)
    }
}

fn rotated_flux(input: &DiskInput<'_>, v_sin_i: f64) -> Vec<f64> {
    let by_mu: Vec<Vec<f64>> = (0..input.angles.len())
        .map(|angle| input.intensity.iter().map(|row| row[angle]).collect())
        .collect();
    let cos_phi: Vec<f64> = (0..input.phi_count)
        .map(|sector| (2.0 * PI * (sector as f64 + 0.5) / input.phi_count as f64).cos())
        .collect();
    let c = light_speed_km_s();

    input.mode.map_range(input.wavelengths_nm.len(), |index| {
        let lambda = input.wavelengths_nm[index];
        let mut flux = 0.0;
        for (angle, (mu, weight)) in input.angles.mu.iter().zip(&input.angles.weights).enumerate() {
            let radius = (1.0 - mu * mu).max(0.0).sqrt();
            let mean: f64 = cos_phi
                .iter()
                .map(|cos_phi| {
                    let velocity = v_sin_i * radius * cos_phi;
                    interpolate_clamped(lambda / (1.0 + velocity / c), input.wavelengths_nm, &by_mu[angle])
                })
                .sum::<f64>()
                / cos_phi.len() as f64;
            flux += weight * mu * mean;
        }
        2.0 * PI * flux
    })
}

/// Convolve `values` with exp(-(v / xi)^2) on a possibly non-uniform axis.
fn gaussian_broaden(wavelengths_nm: &[f64], values: &[f64], xi_km_s: f64, mode: ExecutionMode) -> Vec<f64> {
    let count = wavelengths_nm.len();
    let widths: Vec<f64> = (0..count)
        .map(|index| {
            let lower = wavelengths_nm[index.saturating_sub(1)];
            let upper = wavelengths_nm[(index + 1).min(count - 1)];
            0.5 * (upper - lower)
        })
        .collect();
    let c = light_speed_km_s();

    mode.map_range(count, |index| {
        let center = wavelengths_nm[index];
        let width = center * xi_km_s / c;
        let lower = wavelengths_nm.partition_point(|lambda| *lambda < center - KERNEL_HALF_WIDTHS * width);
        let upper = wavelengths_nm.partition_point(|lambda| *lambda <= center + KERNEL_HALF_WIDTHS * width);
        let (mut weighted, mut norm) = (0.0, 0.0);
        for point in lower..upper {
            let x = (wavelengths_nm[point] - center) / width;
            let kernel = (-x * x).exp() * widths[point];
            weighted += kernel * values[point];
            norm += kernel;
        }
        if norm > 0.0 { weighted / norm } else { values[index] }
    })
}
