//! End-to-end runs: build the atmosphere, merge line and band opacity into the
//! master table, solve the transfer problem and collect the derived products.

use serde::Serialize;
use tracing::{debug, info};

use crate::atmosphere::{AtmosphereBuilder, AtmosphereModel, AtmosphereStructure, BuildDiagnostics, ConvergenceResult};
use crate::common::planck::planck_lambda;
use crate::domain::config::{PressureOpacity, ResolvedConfig};
use crate::domain::errors::AtmosResult;
use crate::domain::{CancellationToken, EngineConfig, ExecutionMode, StellarParameters};
use crate::lines::{line_opacity, LineDepth, LineOpacityInput, ResolvedLine};
use crate::opacity::jola::{bands_active, tio_features};
use crate::opacity::{MasterOpacity, MergeReport, OpacityTable};
use crate::registry::SpeciesRegistry;
use crate::transfer::{
    band_colors, band_intensities, emergent_intensity, equivalent_width_pm, gaussian_band_intensity, integrate_disk,
    limb_darkening, line_fwhm_nm, monochromatic_depth, recovered_teff, spectral_limb_darkening, AngleGrid,
    BandIntensity, ColorIndex, DiskInput, FormalInput, LimbDarkening, SpectralLimbDarkening, TransferError,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineReport {
    pub id: String,
    pub center_nm: f64,
    pub doppler_width_nm: f64,
    pub equivalent_width_pm: f64,
    /// Full width at half depth of the disk-integrated profile.
    pub fwhm_nm: f64,
    /// ln N of the absorbing stage per depth (cm^-3).
    pub stage_ln_density: Vec<f64>,
    /// ln N of the lower level per depth (cm^-3).
    pub ln_lower_level: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpectrumReport {
    pub stellar: StellarParameters,
    pub radius_cm: f64,
    pub structure: AtmosphereStructure,
    pub convergence: ConvergenceResult,
    pub diagnostics: BuildDiagnostics,
    pub jola_active: bool,
    pub merges: Vec<MergeReport>,
    pub lines: Vec<LineReport>,
    pub wavelengths_nm: Vec<f64>,
    pub flux: Vec<f64>,
    pub continuum_flux: Vec<f64>,
    pub colors: Vec<ColorIndex>,
    /// Angle nodes the intensities below are sampled at.
    pub mu: Vec<f64>,
    pub band_intensities: Vec<BandIntensity>,
    /// Through `transfer.tunableFilter`, one value per angle node.
    pub tuned_intensity: Option<Vec<f64>>,
    pub limb_darkening: Vec<LimbDarkening>,
    /// Linear coefficient at each continuum wavelength, fit to the continuum-only intensity.
    pub continuum_limb_darkening: SpectralLimbDarkening,
    pub recovered_teff: f64,
    /// Continuum plus every merged feature on the master axis.
    #[serde(skip)]
    pub opacity: OpacityTable,
    #[serde(skip)]
    pub continuum_opacity: OpacityTable,
    /// Surface intensity `[wavelength][mu]` of the full spectrum.
    #[serde(skip)]
    pub intensity: Vec<Vec<f64>>,
}

/// A configured run over the standard species registry.
pub struct Engine {
    registry: SpeciesRegistry,
    resolved: ResolvedConfig,
    cancellation: Option<CancellationToken>,
}

impl Engine {
    pub fn new(config: &EngineConfig) -> AtmosResult<Self> {
        Ok(Self {
            registry: SpeciesRegistry::standard()?,
            resolved: config.resolve()?,
            cancellation: None,
        })
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn registry(&self) -> &SpeciesRegistry {
        &self.registry
    }

    pub fn resolved(&self) -> &ResolvedConfig {
        &self.resolved
    }

    pub fn build_model(&self) -> AtmosResult<AtmosphereModel> {
        let builder = AtmosphereBuilder::new(&self.registry, &self.resolved);
        match &self.cancellation {
            Some(token) => builder.with_cancellation(token.clone()).build(),
            None => builder.build(),
        }
    }

    pub fn run(&self) -> AtmosResult<SpectrumReport> {
        let model = self.build_model()?;
        self.synthesize(&model)
    }

    /// Emergent spectrum of `model` with the configured lines and bands merged in.
    pub fn synthesize(&self, model: &AtmosphereModel) -> AtmosResult<SpectrumReport> {
        let config = &self.resolved.config;
        let mode = config.execution_mode;
        let structure = &model.structure;
        let mut diagnostics = model.diagnostics.clone();

        let resolved_lines = config
            .lines
            .iter()
            .map(|selection| selection.resolve(&self.registry, &model.abundances, &mut diagnostics.clamps))
            .collect::<AtmosResult<Vec<ResolvedLine>>>()?;

        let mut master = MasterOpacity::new(model.continuum.clone());
        let mut merges = Vec::new();
        let jola_active = bands_active(&config.opacity.jola, model.stellar.teff);
        for feature in tio_features(&config.opacity.jola, model.stellar.teff, &model.absorbers) {
            merges.push(master.merge(feature)?);
        }

        let depths: Vec<LineDepth> = (0..structure.depth_count())
            .map(|depth| LineDepth {
                temperature: structure.temperature[depth],
                gas_pressure: structure.gas_pressure[depth],
                electron_density: structure.electron_density[depth],
                density: structure.density[depth],
            })
            .collect();
        let mut line_opacities = Vec::with_capacity(resolved_lines.len());
        for line in &resolved_lines {
            let opacity = line_opacity(LineOpacityInput {
                line,
                registry: &self.registry,
                stages: &model.stages,
                depths: &depths,
                teff: model.stellar.teff,
                mode,
            })?;
            merges.push(master.merge(opacity.feature.clone())?);
            line_opacities.push(opacity);
        }
        debug!(axis = master.axis().len(), features = master.features().len(), "master opacity merged");

        let opacity = master.table(mode);
        let continuum_opacity = master.continuum_on_axis();
        let angles = AngleGrid::gauss(config.transfer.theta_count)?;
        let scale = match config.opacity.pressure_opacity {
            PressureOpacity::Rosseland => &structure.ln_kappa_rosseland,
            PressureOpacity::Reference500 => &structure.ln_kappa_500,
        };
        let scattering_epsilon = config
            .transfer
            .line_scattering
            .then_some(config.transfer.scattering_epsilon);

        let intensity = surface_intensity(SurfaceInput {
            structure,
            ln_kappa_scale: scale,
            opacity: &opacity,
            continuum: &continuum_opacity,
            scattering_epsilon,
            angles: &angles,
            mode,
        })?;
        let continuum_intensity = surface_intensity(SurfaceInput {
            structure,
            ln_kappa_scale: scale,
            opacity: &continuum_opacity,
            continuum: &continuum_opacity,
            scattering_epsilon: None,
            angles: &angles,
            mode,
        })?;

        let wavelengths_nm = opacity.wavelengths_nm.clone();
        let disk = |intensity: &[Vec<f64>]| {
            integrate_disk(DiskInput {
                wavelengths_nm: &wavelengths_nm,
                intensity,
                angles: &angles,
                equatorial_velocity_km_s: config.transfer.rotation.equatorial_velocity_km_s,
                inclination_deg: config.transfer.rotation.inclination_deg,
                phi_count: config.transfer.rotation.phi_count,
                macroturbulence_km_s: config.transfer.macroturbulence_km_s,
                mode,
            })
        };
        let flux = disk(&intensity)?;
        let continuum_flux = disk(&continuum_intensity)?;

        let lines: Vec<LineReport> = resolved_lines
            .iter()
            .zip(line_opacities)
            .map(|(line, opacity)| {
                let window = opacity.feature.span();
                LineReport {
                    id: opacity.feature.id.clone(),
                    center_nm: line.line.wavelength_nm,
                    doppler_width_nm: opacity.doppler_width_nm,
                    equivalent_width_pm: equivalent_width_pm(&wavelengths_nm, &flux, &continuum_flux, window),
                    fwhm_nm: line_fwhm_nm(&wavelengths_nm, &flux, &continuum_flux, window),
                    stage_ln_density: model.stages.stage_slice(line.element.0, line.line.stage),
                    ln_lower_level: opacity.ln_lower_level,
                }
            })
            .collect();
        let colors = band_colors(&wavelengths_nm, &flux);
        let band_intensities = band_intensities(&angles, &wavelengths_nm, &intensity);
        let tuned_intensity = config
            .transfer
            .tunable_filter
            .map(|filter| gaussian_band_intensity(&angles, &wavelengths_nm, &intensity, filter));
        let limb_darkening = limb_darkening(&angles, &wavelengths_nm, &intensity)?;
        let continuum_limb_darkening = spectral_limb_darkening(
            &angles,
            &wavelengths_nm,
            &continuum_intensity,
            &model.continuum.wavelengths_nm,
        )?;
        let recovered_teff = recovered_teff(&wavelengths_nm, &continuum_flux);
        info!(
            lines = lines.len(),
            wavelengths = wavelengths_nm.len(),
            recovered_teff,
            jola = jola_active,
            "spectrum synthesized"
        );

        Ok(SpectrumReport {
            stellar: model.stellar,
            radius_cm: model.stellar.radius(),
            structure: structure.clone(),
            convergence: model.convergence,
            diagnostics,
            jola_active,
            merges,
            lines,
            wavelengths_nm,
            flux,
            continuum_flux,
            colors,
            mu: angles.mu.clone(),
            band_intensities,
            tuned_intensity,
            limb_darkening,
            continuum_limb_darkening,
            recovered_teff,
            opacity,
            continuum_opacity,
            intensity,
        })
    }
}

struct SurfaceInput<'a> {
    structure: &'a AtmosphereStructure,
    ln_kappa_scale: &'a [f64],
    opacity: &'a OpacityTable,
    continuum: &'a OpacityTable,
    /// Thermal coupling of line opacity; `None` for pure absorption.
    scattering_epsilon: Option<f64>,
    angles: &'a AngleGrid,
    mode: ExecutionMode,
}

/// Surface intensity `[wavelength][mu]` on the opacity table's axis.
fn surface_intensity(input: SurfaceInput<'_>) -> Result<Vec<Vec<f64>>, TransferError> {
    let structure = input.structure;
    input
        .mode
        .map_range(input.opacity.wavelength_count(), |index| {
            let lambda = input.opacity.wavelengths_nm[index];
            let ln_kappa = input.opacity.column(index);
            let tau = monochromatic_depth(&structure.ln_tau, input.ln_kappa_scale, ln_kappa)?;
            let thermal: Vec<f64> = structure
                .temperature
                .iter()
                .map(|temperature| planck_lambda(lambda, *temperature))
                .collect();
            let scattering: Option<Vec<f64>> = input.scattering_epsilon.map(|epsilon| {
                ln_kappa
                    .iter()
                    .zip(input.continuum.column(index))
                    .map(|(total, continuum)| (1.0 - epsilon) * (1.0 - (continuum - total).exp()).max(0.0))
                    .collect()
            });
            emergent_intensity(FormalInput {
                tau: &tau,
                thermal: &thermal,
                scattering: scattering.as_deref(),
                angles: input.angles,
            })
        })
        .into_iter()
        .collect()
}
