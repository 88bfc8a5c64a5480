//! Quantities read off the emergent spectrum: equivalent widths and line widths,
//! broadband colors and intensities, linear limb darkening and the effective
//! temperature the flux implies.

use serde::Serialize;

use super::{AngleGrid, TransferError};
use crate::common::constants::STEFAN_BOLTZMANN;
use crate::common::photometry::{PhotometricBand, COLOR_INDICES};
use crate::domain::config::GaussianFilter;
use crate::numerics::{interpolate_clamped, least_squares, trapezoid, DenseMatrix};

const NM_TO_CM: f64 = 1.0e-7;
const NM_TO_PM: f64 = 1.0e3;
/// Tunable filter half-extent in sigmas.
const FILTER_HALF_WIDTH: f64 = 2.5;
const FILTER_POINTS: usize = 101;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorIndex {
    pub name: &'static str,
    pub value: f64,
}

/// I(mu) = a + b (1 - mu) over one band; `coefficient` is u in I/I(1) = 1 - u (1 - mu).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LimbDarkening {
    pub band: &'static str,
    pub a: f64,
    pub b: f64,
    pub coefficient: f64,
}

/// Transmission-weighted surface intensity of one band, one entry per angle node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BandIntensity {
    pub band: &'static str,
    pub intensity: Vec<f64>,
}

/// Linear limb-darkening coefficient u at each listed wavelength.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpectralLimbDarkening {
    pub wavelengths_nm: Vec<f64>,
    pub coefficients: Vec<f64>,
}

/// Int (1 - F / F_c) d lambda over `window` (nm), in pm.
pub fn equivalent_width_pm(wavelengths_nm: &[f64], flux: &[f64], continuum: &[f64], window: (f64, f64)) -> f64 {
    let (lambda, depression): (Vec<f64>, Vec<f64>) = wavelengths_nm
        .iter()
        .zip(flux.iter().zip(continuum))
        .filter(|(lambda, _)| **lambda >= window.0 && **lambda <= window.1)
        .filter(|(_, (_, continuum))| **continuum > 0.0)
        .map(|(lambda, (flux, continuum))| (*lambda, 1.0 - flux / continuum))
        .unzip();
    trapezoid(&lambda, &depression) * NM_TO_PM
}

/// Full width (nm) at half depth of the deepest point inside `window`; zero
/// when the flux never dips below the continuum.
pub fn line_fwhm_nm(wavelengths_nm: &[f64], flux: &[f64], continuum: &[f64], window: (f64, f64)) -> f64 {
    let (lambda, relative): (Vec<f64>, Vec<f64>) = wavelengths_nm
        .iter()
        .zip(flux.iter().zip(continuum))
        .filter(|(lambda, _)| **lambda >= window.0 && **lambda <= window.1)
        .filter(|(_, (_, continuum))| **continuum > 0.0)
        .map(|(lambda, (flux, continuum))| (*lambda, flux / continuum))
        .unzip();
    let Some((center, minimum)) = relative
        .iter()
        .copied()
        .enumerate()
        .min_by(|left, right| left.1.total_cmp(&right.1))
    else {
        return 0.0;
    };
    if minimum >= 1.0 {
        return 0.0;
    }
    let half = minimum + 0.5 * (1.0 - minimum);
    let crossing = |inner: usize, outer: usize| {
        let (f_inner, f_outer) = (relative[inner], relative[outer]);
        lambda[inner] + (half - f_inner) * (lambda[outer] - lambda[inner]) / (f_outer - f_inner)
    };
    let blue = (1..=center)
        .rev()
        .find(|index| relative[index - 1] >= half)
        .map_or(lambda[0], |index| crossing(index, index - 1));
    let red = (center..relative.len() - 1)
        .find(|index| relative[index + 1] >= half)
        .map_or(lambda[relative.len() - 1], |index| crossing(index, index + 1));
    red - blue
}

/// Transmission-weighted mean of `values` over `band`.
pub fn band_mean(wavelengths_nm: &[f64], values: &[f64], band: PhotometricBand) -> f64 {
    let curve = band.transmission_curve();
    let lambda: Vec<f64> = curve.iter().map(|(lambda, _)| *lambda).collect();
    let weighted: Vec<f64> = curve
        .iter()
        .map(|(lambda, transmission)| transmission * interpolate_clamped(*lambda, wavelengths_nm, values))
        .collect();
    let transmission: Vec<f64> = curve.iter().map(|(_, transmission)| *transmission).collect();
    trapezoid(&lambda, &weighted) / trapezoid(&lambda, &transmission)
}

/// Every color index whose bands the flux covers and whose band fluxes are positive.
pub fn band_colors(wavelengths_nm: &[f64], flux: &[f64]) -> Vec<ColorIndex> {
    COLOR_INDICES
        .iter()
        .filter(|(_, blue, red, _)| band_covered(*blue, wavelengths_nm) && band_covered(*red, wavelengths_nm))
        .filter_map(|(name, blue, red, zero_point)| {
            let blue = band_mean(wavelengths_nm, flux, *blue);
            let red = band_mean(wavelengths_nm, flux, *red);
            (blue > 0.0 && red > 0.0).then(|| ColorIndex {
                name: *name,
                value: -2.5 * (blue / red).log10() + zero_point,
            })
        })
        .collect()
}

fn band_covered(band: PhotometricBand, wavelengths_nm: &[f64]) -> bool {
    let curve = band.transmission_curve();
    curve.first().zip(wavelengths_nm.first()).is_some_and(|((lower, _), first)| lower >= first)
        && curve.last().zip(wavelengths_nm.last()).is_some_and(|((upper, _), last)| upper <= last)
}

/// `intensity[wavelength][mu]` transposed to one spectrum per angle node.
fn spectra_per_angle(angle_count: usize, intensity: &[Vec<f64>]) -> Vec<Vec<f64>> {
    (0..angle_count)
        .map(|angle| intensity.iter().map(|row| row[angle]).collect())
        .collect()
}

/// Band-averaged intensity at every angle node for each band the axis covers.
///
/// `intensity` is indexed `[wavelength][mu]`.
pub fn band_intensities(angles: &AngleGrid, wavelengths_nm: &[f64], intensity: &[Vec<f64>]) -> Vec<BandIntensity> {
    let spectra = spectra_per_angle(angles.len(), intensity);
    PhotometricBand::ALL
        .into_iter()
        .filter(|band| band_covered(*band, wavelengths_nm))
        .map(|band| BandIntensity {
            band: band.as_str(),
            intensity: spectra
                .iter()
                .map(|spectrum| band_mean(wavelengths_nm, spectrum, band))
                .collect(),
        })
        .collect()
}

/// Intensity at every angle node seen through a Gaussian filter, normalized to
/// the filter's area.
pub fn gaussian_band_intensity(
    angles: &AngleGrid,
    wavelengths_nm: &[f64],
    intensity: &[Vec<f64>],
    filter: GaussianFilter,
) -> Vec<f64> {
    let start = filter.center_nm - FILTER_HALF_WIDTH * filter.sigma_nm;
    let step = 2.0 * FILTER_HALF_WIDTH * filter.sigma_nm / (FILTER_POINTS - 1) as f64;
    let lambda: Vec<f64> = (0..FILTER_POINTS).map(|index| start + step * index as f64).collect();
    let weight: Vec<f64> = lambda
        .iter()
        .map(|lambda| (-0.5 * ((lambda - filter.center_nm) / filter.sigma_nm).powi(2)).exp())
        .collect();
    let area = trapezoid(&lambda, &weight);
    spectra_per_angle(angles.len(), intensity)
        .iter()
        .map(|spectrum| {
            let weighted: Vec<f64> = lambda
                .iter()
                .zip(&weight)
                .map(|(lambda, weight)| weight * interpolate_clamped(*lambda, wavelengths_nm, spectrum))
                .collect();
            trapezoid(&lambda, &weighted) / area
        })
        .collect()
}

/// Fit I(mu) = a + b (1 - mu) and return (a, b).
fn fit_linear_law(design: &DenseMatrix, per_mu: &[f64], target: impl FnOnce() -> String) -> Result<(f64, f64), TransferError> {
    let solution = least_squares(design, per_mu).map_err(|error| TransferError::LimbDarkeningFit {
        target: target(),
        message: error.to_string(),
    })?;
    Ok((solution[0], solution[1]))
}

fn linear_law_design(angles: &AngleGrid) -> DenseMatrix {
    DenseMatrix::from_fn(angles.len(), 2, |row, col| if col == 0 { 1.0 } else { 1.0 - angles.mu[row] })
}

fn coefficient(a: f64, b: f64) -> f64 {
    if a != 0.0 { -b / a } else { 0.0 }
}

/// Least-squares linear limb-darkening law per photometric band.
///
/// `intensity` is indexed `[wavelength][mu]`.
pub fn limb_darkening(
    angles: &AngleGrid,
    wavelengths_nm: &[f64],
    intensity: &[Vec<f64>],
) -> Result<Vec<LimbDarkening>, TransferError> {
    let design = linear_law_design(angles);
    band_intensities(angles, wavelengths_nm, intensity)
        .into_iter()
        .map(|band| {
            let (a, b) = fit_linear_law(&design, &band.intensity, || band.band.to_string())?;
            Ok(LimbDarkening {
                band: band.band,
                a,
                b,
                coefficient: coefficient(a, b),
            })
        })
        .collect()
}

/// Linear limb-darkening coefficient at each of `targets` (nm), from intensity
/// `[wavelength][mu]` sampled on `wavelengths_nm`.
pub fn spectral_limb_darkening(
    angles: &AngleGrid,
    wavelengths_nm: &[f64],
    intensity: &[Vec<f64>],
    targets: &[f64],
) -> Result<SpectralLimbDarkening, TransferError> {
    let design = linear_law_design(angles);
    let spectra = spectra_per_angle(angles.len(), intensity);
    let coefficients = targets
        .iter()
        .map(|target| {
            let per_mu: Vec<f64> = spectra
                .iter()
                .map(|spectrum| interpolate_clamped(*target, wavelengths_nm, spectrum))
                .collect();
            let (a, b) = fit_linear_law(&design, &per_mu, || format!("{target} nm"))?;
            Ok(coefficient(a, b))
        })
        .collect::<Result<Vec<f64>, TransferError>>()?;
    Ok(SpectralLimbDarkening {
        wavelengths_nm: targets.to_vec(),
        coefficients,
    })
}

/// (Int F_lambda d lambda / sigma)^(1/4), with F in erg s^-1 cm^-2 cm^-1.
pub fn recovered_teff(wavelengths_nm: &[f64], flux: &[f64]) -> f64 {
    let bolometric = trapezoid(wavelengths_nm, flux) * NM_TO_CM;
    if bolometric > 0.0 {
        (bolometric / STEFAN_BOLTZMANN).powf(0.25)
    } else {
        0.0
    }
}
