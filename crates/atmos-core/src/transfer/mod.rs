//! Emergent intensity and flux: formal solution along each ray, disk
//! integration with rotation and macroturbulence, and the products derived from
//! the emergent spectrum.

pub mod disk;
pub mod formal;
pub mod products;

use serde::Serialize;

use crate::domain::errors::AtmosError;
use crate::numerics::{gauss_legendre, QuadratureError};

pub use disk::{integrate_disk, DiskInput};
pub use formal::{emergent_intensity, monochromatic_depth, FormalInput};
pub use products::{
    band_colors, band_intensities, equivalent_width_pm, gaussian_band_intensity, limb_darkening, line_fwhm_nm,
    recovered_teff, spectral_limb_darkening, BandIntensity, ColorIndex, LimbDarkening, SpectralLimbDarkening,
};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransferError {
    #[error("radiative transfer needs at least 2 depths, got {actual}")]
    TooFewDepths { actual: usize },
    #[error("{name} has {actual} entries, expected {expected}")]
    LengthMismatch {
        name: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("{name} must be positive and finite at index {index}, got {value}")]
    NonPositive {
        name: &'static str,
        index: usize,
        value: f64,
    },
    #[error("angle quadrature failed: {0}")]
    Quadrature(#[from] QuadratureError),
    #[error("limb-darkening fit failed for {target}: {message}")]
    LimbDarkeningFit { target: String, message: String },
}

impl From<TransferError> for AtmosError {
    fn from(error: TransferError) -> Self {
        AtmosError::computation("RT.SOLVE", error.to_string())
    }
}

/// Gauss-Legendre nodes in mu = cos(theta) on (0, 1).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AngleGrid {
    pub mu: Vec<f64>,
    pub weights: Vec<f64>,
}

impl AngleGrid {
    pub fn gauss(count: usize) -> Result<Self, TransferError> {
        let rule = gauss_legendre(count, 0.0, 1.0)?;
        Ok(Self {
            mu: rule.nodes,
            weights: rule.weights,
        })
    }

    pub fn len(&self) -> usize {
        self.mu.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mu.is_empty()
    }

    /// Astrophysical flux 2 pi sum w mu I of one intensity set.
    pub fn flux(&self, intensity: &[f64]) -> f64 {
        2.0 * std::f64::consts::PI
            * self
                .mu
                .iter()
                .zip(&self.weights)
                .zip(intensity)
                .map(|((mu, weight), intensity)| weight * mu * intensity)
                .sum::<f64>()
    }
}

pub(crate) fn check_length(name: &'static str, expected: usize, values: &[f64]) -> Result<(), TransferError> {
    if values.len() == expected {
        Ok(())
    } else {
        Err(TransferError::LengthMismatch {
            name,
            expected,
            actual: values.len(),
        })
    }
}

pub(crate) fn check_positive(name: &'static str, values: &[f64]) -> Result<(), TransferError> {
    match values
        .iter()
        .enumerate()
        .find(|(_, value)| !(value.is_finite() && **value > 0.0))
    {
        Some((index, value)) => Err(TransferError::NonPositive {
            name,
            index,
            value: *value,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::{AngleGrid, TransferError};
    use crate::domain::errors::{AtmosError, AtmosErrorCategory};

    #[test]
    fn angle_weights_integrate_mu_exactly() {
        let angles = AngleGrid::gauss(9).expect("angles");
        assert_eq!(angles.len(), 9);
        assert!(angles.mu.iter().all(|mu| *mu > 0.0 && *mu < 1.0));
        // Isotropic unit intensity carries flux pi.
        assert!((angles.flux(&[1.0; 9]) - std::f64::consts::PI).abs() < 1.0e-12);
    }

    #[test]
    fn transfer_errors_are_computation_errors() {
        let error: AtmosError = TransferError::TooFewDepths { actual: 1 }.into();
        assert_eq!(error.category(), AtmosErrorCategory::ComputationError);
        assert_eq!(error.placeholder(), "RT.SOLVE");
        assert!(AngleGrid::gauss(0).is_err());
    }
}
