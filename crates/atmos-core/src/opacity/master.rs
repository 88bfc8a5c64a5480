//! The master opacity table: continuum plus every merged line and band window on
//! one strictly increasing wavelength axis.

use serde::Serialize;

use super::{ln_per_mass, MergeError, OpacityFeature, OpacityTable};
use crate::domain::ExecutionMode;
use crate::numerics::interpolate_clamped;

/// Points closer than this (relative) are the same axis entry.
const AXIS_TOLERANCE: f64 = 1.0e-12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeReport {
    pub inserted: usize,
    pub replaced: bool,
    pub axis_len: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MasterOpacity {
    continuum: OpacityTable,
    /// Continuum ln kappa indexed `[depth][wavelength]` for interpolation.
    continuum_by_depth: Vec<Vec<f64>>,
    features: Vec<OpacityFeature>,
    axis: Vec<f64>,
}

impl MasterOpacity {
    pub fn new(continuum: OpacityTable) -> Self {
        let continuum_by_depth = transpose(&continuum.ln_kappa);
        Self {
            axis: continuum.wavelengths_nm.clone(),
            continuum,
            continuum_by_depth,
            features: Vec::new(),
        }
    }

    pub fn axis(&self) -> &[f64] {
        &self.axis
    }

    pub fn continuum(&self) -> &OpacityTable {
        &self.continuum
    }

    pub fn features(&self) -> &[OpacityFeature] {
        &self.features
    }

    pub fn feature(&self, id: &str) -> Option<&OpacityFeature> {
        self.features.iter().find(|feature| feature.id == id)
    }

    pub fn depth_count(&self) -> usize {
        self.continuum.depth_count()
    }

    /// Insert `feature`'s window into the axis and register its opacity. A feature
    /// with an id already present replaces the old one; axis points are never removed.
    pub fn merge(&mut self, feature: OpacityFeature) -> Result<MergeReport, MergeError> {
        self.check_feature(&feature)?;
        let before = self.axis.len();
        self.axis = union(&self.axis, &feature.wavelengths_nm);
        let replaced = match self.features.iter_mut().find(|existing| existing.id == feature.id) {
            Some(existing) => {
                *existing = feature;
                true
            }
            None => {
                self.features.push(feature);
                false
            }
        };
        Ok(MergeReport {
            inserted: self.axis.len() - before,
            replaced,
            axis_len: self.axis.len(),
        })
    }

    fn check_feature(&self, feature: &OpacityFeature) -> Result<(), MergeError> {
        let points = &feature.wavelengths_nm;
        if points.is_empty() {
            return Err(MergeError::EmptyWindow {
                id: feature.id.clone(),
            });
        }
        for (index, value) in points.iter().enumerate() {
            let ordered = index == 0 || *value > points[index - 1];
            if !(value.is_finite() && *value > 0.0 && ordered) {
                return Err(MergeError::UnorderedWindow {
                    id: feature.id.clone(),
                    index,
                });
            }
        }
        if feature.ln_kappa.len() != points.len() {
            return Err(MergeError::RowMismatch {
                id: feature.id.clone(),
                expected: points.len(),
                actual: feature.ln_kappa.len(),
            });
        }
        if let Some(row) = feature.ln_kappa.iter().find(|row| row.len() != self.depth_count()) {
            return Err(MergeError::DepthMismatch {
                id: feature.id.clone(),
                expected: self.depth_count(),
                actual: row.len(),
            });
        }
        Ok(())
    }

    /// Total opacity (continuum plus every feature covering the point) on the axis.
    pub fn table(&self, mode: ExecutionMode) -> OpacityTable {
        let by_feature: Vec<Vec<Vec<f64>>> = self
            .features
            .iter()
            .map(|feature| transpose(&feature.ln_kappa))
            .collect();
        let ln_kappa = mode.map_range(self.axis.len(), |index| {
            let lambda = self.axis[index];
            (0..self.depth_count())
                .map(|depth| {
                    let mut linear = self.continuum_linear(lambda, depth);
                    for (feature, columns) in self.features.iter().zip(&by_feature) {
                        let (start, end) = feature.span();
                        if lambda >= start && lambda <= end {
                            linear += interpolate_clamped(lambda, &feature.wavelengths_nm, &columns[depth])
                                .exp();
                        }
                    }
                    ln_per_mass(linear, 1.0)
                })
                .collect()
        });
        OpacityTable {
            wavelengths_nm: self.axis.clone(),
            ln_kappa,
        }
    }

    /// Continuum alone, interpolated onto the full axis.
    pub fn continuum_on_axis(&self) -> OpacityTable {
        let ln_kappa = self
            .axis
            .iter()
            .map(|lambda| {
                (0..self.depth_count())
                    .map(|depth| self.continuum_ln(*lambda, depth))
                    .collect()
            })
            .collect();
        OpacityTable {
            wavelengths_nm: self.axis.clone(),
            ln_kappa,
        }
    }

    fn continuum_ln(&self, lambda: f64, depth: usize) -> f64 {
        interpolate_clamped(
            lambda,
            &self.continuum.wavelengths_nm,
            &self.continuum_by_depth[depth],
        )
    }

    fn continuum_linear(&self, lambda: f64, depth: usize) -> f64 {
        self.continuum_ln(lambda, depth).exp()
    }
}

fn transpose(rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let columns = rows.first().map_or(0, Vec::len);
    (0..columns)
        .map(|column| rows.iter().map(|row| row[column]).collect())
        .collect()
}

fn same_point(left: f64, right: f64) -> bool {
    (left - right).abs() <= AXIS_TOLERANCE * left.abs().max(right.abs())
}

/// Sorted union of two strictly increasing sequences.
fn union(axis: &[f64], window: &[f64]) -> Vec<f64> {
    let mut merged = Vec::with_capacity(axis.len() + window.len());
    let (mut left, mut right) = (0, 0);
    while left < axis.len() || right < window.len() {
        let next = match (axis.get(left), window.get(right)) {
            (Some(a), Some(w)) if same_point(*a, *w) => {
                left += 1;
                right += 1;
                *a
            }
            (Some(a), Some(w)) if a < w => {
                left += 1;
                *a
            }
            (Some(_), Some(w)) => {
                right += 1;
                *w
            }
            (Some(a), None) => {
                left += 1;
                *a
            }
            (None, Some(w)) => {
                right += 1;
                *w
            }
            (None, None) => break,
        };
        if merged.last().is_none_or(|last: &f64| !same_point(*last, next)) {
            merged.push(next);
        }
    }
    merged
}
