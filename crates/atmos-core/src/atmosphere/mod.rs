//! Atmospheric structure: depth grid, temperature laws, reference seeds,
//! hydrostatic integration and the outer iteration that ties them to chemistry
//! and opacity.

pub mod builder;
pub mod hydrostatic;
pub mod reference;
mod reference_data;
pub mod temperature;

use serde::Serialize;

use crate::common::constants::LN10;
use crate::domain::config::DepthGridConfig;

pub use builder::{
    AtmosphereBuilder, AtmosphereModel, BuildDiagnostics, ChemistryStatus, ChemistryPath, ConvergenceResult,
};
pub use hydrostatic::{HydrostaticError, PressureStructure};

/// Rosseland optical depths, equally spaced in log and stored as natural log.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepthGrid {
    ln_tau: Vec<f64>,
}

impl DepthGrid {
    pub fn new(config: &DepthGridConfig) -> Self {
        let step = (config.log10_max - config.log10_min) / (config.count - 1) as f64;
        Self {
            ln_tau: (0..config.count)
                .map(|index| (config.log10_min + step * index as f64) * LN10)
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.ln_tau.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ln_tau.is_empty()
    }

    pub fn ln_tau(&self) -> &[f64] {
        &self.ln_tau
    }

    pub fn tau(&self) -> Vec<f64> {
        self.ln_tau.iter().map(|ln_tau| ln_tau.exp()).collect()
    }
}

/// The converged model atmosphere, one entry per depth.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AtmosphereStructure {
    pub ln_tau: Vec<f64>,
    pub temperature: Vec<f64>,
    pub total_pressure: Vec<f64>,
    pub gas_pressure: Vec<f64>,
    pub radiation_pressure: Vec<f64>,
    pub density: Vec<f64>,
    pub electron_density: Vec<f64>,
    pub mean_molecular_weight: Vec<f64>,
    pub ln_kappa_rosseland: Vec<f64>,
    pub ln_kappa_500: Vec<f64>,
    /// Geometric depth (cm) below the top of the model.
    pub depth_cm: Vec<f64>,
}

impl AtmosphereStructure {
    pub fn depth_count(&self) -> usize {
        self.ln_tau.len()
    }

    /// Linear interpolation of `values` at Rosseland optical depth `tau`.
    pub fn at_tau(&self, values: &[f64], tau: f64) -> f64 {
        crate::numerics::interpolate_clamped(tau.ln(), &self.ln_tau, values)
    }
}
