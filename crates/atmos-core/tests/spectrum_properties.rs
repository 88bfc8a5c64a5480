use atmos_core::domain::config::GaussianFilter;
use atmos_core::domain::{EngineConfig, StellarInput};
use atmos_core::lines::{LineSelection, SpectralLine};
use atmos_core::numerics::trapezoid;
use atmos_core::opacity::{MasterOpacity, OpacityFeature, OpacityTable};
use atmos_core::{Engine, SpectrumReport};

fn assert_scalar_close(label: &str, expected: f64, actual: f64, abs_tol: f64, rel_tol: f64) {
    let tolerance = abs_tol.max(rel_tol * expected.abs());
    assert!(
        (expected - actual).abs() <= tolerance,
        "{label}: expected {expected}, got {actual}, tolerance {tolerance}"
    );
}

fn star(teff: f64, log_g: f64) -> EngineConfig {
    let mut config = EngineConfig {
        stellar: StellarInput {
            teff,
            log_g,
            ..StellarInput::default()
        },
        ..EngineConfig::default()
    };
    config.depth.count = 40;
    config.continuum.count = 160;
    config
}

fn weak_iron_line(a12: f64) -> LineSelection {
    LineSelection::Explicit(SpectralLine {
        label: format!("Fe I weak {a12}"),
        wavelength_nm: 612.0,
        element: "Fe".to_string(),
        stage: 1,
        log_f: -3.0,
        excitation_ev: 2.5,
        lower_weight: 9.0,
        upper_weight: 7.0,
        log_gamma_col: 0.0,
        mass: None,
        abundance_a12: Some(a12),
        microturbulence_km_s: 1.0,
    })
}

/// Index of the model depth closest to tau_Ross = 1.
fn unit_depth(report: &SpectrumReport) -> usize {
    report
        .structure
        .ln_tau
        .iter()
        .enumerate()
        .min_by(|left, right| left.1.abs().total_cmp(&right.1.abs()))
        .map(|(index, _)| index)
        .expect("depths")
}

fn band_integral(table: &OpacityTable, depth: usize, window: (f64, f64)) -> f64 {
    let (lambda, kappa): (Vec<f64>, Vec<f64>) = table
        .wavelengths_nm
        .iter()
        .zip(&table.ln_kappa)
        .filter(|(lambda, _)| **lambda >= window.0 && **lambda <= window.1)
        .map(|(lambda, column)| (*lambda, column[depth].exp()))
        .unzip();
    trapezoid(&lambda, &kappa)
}

#[test]
fn merging_a_feature_twice_changes_nothing() {
    let mut config = star(5_780.0, 4.44);
    config.lines = vec![LineSelection::Catalogue("na-d1".to_string())];
    let engine = Engine::new(&config).expect("engine");
    let model = engine.build_model().expect("model");
    let report = engine.synthesize(&model).expect("spectrum");

    let mut master = MasterOpacity::new(model.continuum.clone());
    let before = master.axis().len();
    let line = OpacityFeature {
        id: "window".to_string(),
        wavelengths_nm: report.opacity.wavelengths_nm[10..20].to_vec(),
        ln_kappa: report.opacity.ln_kappa[10..20].to_vec(),
    };
    let first = master.merge(line.clone()).expect("first merge");
    let once = master.table(config.execution_mode);
    let second = master.merge(line).expect("second merge");
    let twice = master.table(config.execution_mode);

    assert!(first.axis_len >= before);
    assert_eq!(second.inserted, 0);
    assert!(second.replaced);
    assert_eq!(second.axis_len, first.axis_len);
    assert_eq!(once, twice);
    assert_eq!(report.merges.len(), 1);
    assert!(report.merges[0].axis_len > model.continuum.wavelength_count());
}

#[test]
fn weak_line_width_scales_with_abundance() {
    let base = star(5_780.0, 4.44);
    let model = Engine::new(&base).expect("engine").build_model().expect("model");
    let widths: Vec<f64> = [5.0, 5.3, 5.6]
        .iter()
        .map(|a12| {
            let mut config = base.clone();
            config.lines = vec![weak_iron_line(*a12)];
            let report = Engine::new(&config)
                .expect("engine")
                .synthesize(&model)
                .expect("spectrum");
            report.lines[0].equivalent_width_pm
        })
        .collect();
    assert!(widths.iter().all(|width| *width > 0.0), "{widths:?}");
    let step = 10f64.powf(0.3);
    assert_scalar_close("W(5.3) / W(5.0)", step, widths[1] / widths[0], 0.0, 0.02);
    assert_scalar_close("W(5.6) / W(5.3)", step, widths[2] / widths[1], 0.0, 0.02);
}

#[test]
fn solar_flux_recovers_the_effective_temperature() {
    let mut config = star(5_780.0, 4.44);
    config.lines = vec![
        LineSelection::Catalogue("h-alpha".to_string()),
        LineSelection::Catalogue("na-d1".to_string()),
    ];
    let report = Engine::new(&config).expect("engine").run().expect("spectrum");
    assert_scalar_close("recovered Teff", 5_780.0, report.recovered_teff, 0.0, 0.10);

    assert_eq!(report.lines.len(), 2);
    for line in &report.lines {
        assert!(line.equivalent_width_pm > 0.0, "{} has EW {}", line.id, line.equivalent_width_pm);
        assert_eq!(line.stage_ln_density.len(), report.structure.depth_count());
        assert_eq!(line.ln_lower_level.len(), report.structure.depth_count());
    }
    assert!(
        report
            .flux
            .iter()
            .zip(&report.continuum_flux)
            .all(|(flux, continuum)| *flux <= continuum * (1.0 + 1.0e-9))
    );
    assert!(report.colors.iter().any(|color| color.name == "B-V"));
    let v_band = report
        .limb_darkening
        .iter()
        .find(|fit| fit.band == "V")
        .expect("V limb darkening");
    assert!((0.2..1.0).contains(&v_band.coefficient), "u_V = {}", v_band.coefficient);
    assert!(!report.jola_active);

    let json = serde_json::to_value(&report).expect("serialize");
    assert!(json.get("recoveredTeff").is_some());
    assert!(json["structure"].get("gasPressure").is_some());
    assert!(json.get("opacity").is_none());
}

/// u at the continuum wavelength closest to `target_nm`.
fn coefficient_near(report: &SpectrumReport, target_nm: f64) -> f64 {
    let fit = &report.continuum_limb_darkening;
    fit.wavelengths_nm
        .iter()
        .zip(&fit.coefficients)
        .min_by(|left, right| (left.0 - target_nm).abs().total_cmp(&(right.0 - target_nm).abs()))
        .map(|(_, coefficient)| *coefficient)
        .expect("continuum coefficients")
}

#[test]
fn solar_limb_darkening_and_line_widths_are_reported_per_wavelength() {
    let mut config = star(5_780.0, 4.44);
    config.lines = vec![LineSelection::Catalogue("na-d1".to_string())];
    config.transfer.tunable_filter = Some(GaussianFilter {
        center_nm: 550.0,
        sigma_nm: 20.0,
    });
    let engine = Engine::new(&config).expect("engine");
    let model = engine.build_model().expect("model");
    let report = engine.synthesize(&model).expect("spectrum");

    let continuum = &report.continuum_limb_darkening;
    assert_eq!(continuum.wavelengths_nm, model.continuum.wavelengths_nm);
    assert_eq!(continuum.coefficients.len(), model.continuum.wavelength_count());
    let visual = coefficient_near(&report, 500.0);
    assert!((0.2..1.0).contains(&visual), "u(500 nm) = {visual}");
    assert!(coefficient_near(&report, 400.0) > coefficient_near(&report, 1_600.0));

    let theta_count = config.transfer.theta_count;
    assert_eq!(report.mu.len(), theta_count);
    let v_band = report
        .band_intensities
        .iter()
        .find(|band| band.band == "V")
        .expect("V intensities");
    assert_eq!(v_band.intensity.len(), theta_count);
    let tuned = report.tuned_intensity.as_ref().expect("tuned filter intensity");
    assert_eq!(tuned.len(), theta_count);
    assert!(tuned.iter().all(|value| *value > 0.0));

    let sodium = &report.lines[0];
    assert!(
        sodium.fwhm_nm > sodium.doppler_width_nm && sodium.fwhm_nm < 1.0,
        "FWHM {} nm against Doppler width {} nm",
        sodium.fwhm_nm,
        sodium.doppler_width_nm
    );

    let json = serde_json::to_value(&report).expect("serialize");
    assert!(json["lines"][0].get("fwhmNm").is_some());
    assert!(json.get("continuumLimbDarkening").is_some());
}

#[test]
fn titanium_oxide_bands_dominate_a_cool_visible_spectrum() {
    let report = Engine::new(&star(3_600.0, 4.5)).expect("engine").run().expect("spectrum");
    assert!(report.jola_active);
    let depth = unit_depth(&report);
    let window = (500.0, 700.0);
    let with_bands = band_integral(&report.opacity, depth, window);
    let continuum = band_integral(&report.continuum_opacity, depth, window);
    assert!(with_bands > 2.0 * continuum, "bands {with_bands} vs continuum {continuum}");

    let mut config = star(3_600.0, 4.5);
    config.opacity.jola.enabled = false;
    let without = Engine::new(&config).expect("engine").run().expect("spectrum");
    assert!(!without.jola_active);
    assert!(without.merges.is_empty());
    assert_eq!(without.opacity.wavelengths_nm, without.continuum_opacity.wavelengths_nm);
}
