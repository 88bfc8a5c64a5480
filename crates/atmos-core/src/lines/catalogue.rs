//! Built-in line list and the validated form of a line selection.

use serde::{Deserialize, Serialize};

use crate::common::constants::LN10;
use crate::domain::errors::{AtmosError, AtmosResult};
use crate::domain::params::{clamp_recorded, ClampedParameter};
use crate::registry::{ElementId, SpeciesId, SpeciesRegistry};

pub const WAVELENGTH_RANGE_NM: (f64, f64) = (350.0, 1_000.0);
pub const LOG_F_RANGE: (f64, f64) = (-6.0, 1.0);
pub const A12_RANGE: (f64, f64) = (2.0, 11.0);
pub const MICROTURBULENCE_RANGE: (f64, f64) = (0.0, 4.0);
pub const LOG_GAMMA_COL_RANGE: (f64, f64) = (0.0, 1.0);

fn default_weight() -> f64 {
    1.0
}

fn default_microturbulence() -> f64 {
    1.0
}

/// One bound-bound transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpectralLine {
    pub label: String,
    /// Rest wavelength in air (nm).
    pub wavelength_nm: f64,
    pub element: String,
    /// 1 for neutral.
    pub stage: u8,
    pub log_f: f64,
    /// Lower-level excitation above the stage ground (eV).
    #[serde(default)]
    pub excitation_ev: f64,
    #[serde(default = "default_weight")]
    pub lower_weight: f64,
    #[serde(default = "default_weight")]
    pub upper_weight: f64,
    /// log10 enhancement of collisional damping over the van der Waals estimate.
    #[serde(default)]
    pub log_gamma_col: f64,
    /// Absorber mass (amu); the element mass when absent.
    #[serde(default)]
    pub mass: Option<f64>,
    /// A12 used for this line instead of the model abundance.
    #[serde(default)]
    pub abundance_a12: Option<f64>,
    #[serde(default = "default_microturbulence")]
    pub microturbulence_km_s: f64,
}

impl SpectralLine {
    pub fn is_hydrogen(&self) -> bool {
        self.element == "H"
    }

    /// Spontaneous decay rate A_ul (s^-1).
    pub fn natural_decay_rate(&self) -> f64 {
        6.67e13 * (self.lower_weight / self.upper_weight) * 10.0_f64.powf(self.log_f)
            / (self.wavelength_nm * self.wavelength_nm)
    }
}

/// A line requested by catalogue key or given in full.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LineSelection {
    Catalogue(String),
    Explicit(SpectralLine),
}

struct CatalogueEntry {
    key: &'static str,
    label: &'static str,
    wavelength_nm: f64,
    element: &'static str,
    stage: u8,
    log_f: f64,
    excitation_ev: f64,
    lower_weight: f64,
    upper_weight: f64,
    log_gamma_col: f64,
}

#[allow(clippy::too_many_arguments)]
const fn entry(
    key: &'static str,
    label: &'static str,
    wavelength_nm: f64,
    element: &'static str,
    stage: u8,
    log_f: f64,
    excitation_ev: f64,
    weights: (f64, f64),
    log_gamma_col: f64,
) -> CatalogueEntry {
    CatalogueEntry {
        key,
        label,
        wavelength_nm,
        element,
        stage,
        log_f,
        excitation_ev,
        lower_weight: weights.0,
        upper_weight: weights.1,
        log_gamma_col,
    }
}

const CATALOGUE: [CatalogueEntry; 23] = [
    entry("ca-ii-k", "Ca II K", 393.366, "Ca", 2, -0.166, 0.0, (2.0, 4.0), 0.5),
    entry("ca-ii-h", "Ca II H", 396.847, "Ca", 2, -0.482, 0.0, (2.0, 2.0), 0.5),
    entry("fe-i-4046", "Fe I 4046", 404.581, "Fe", 1, -0.674, 1.485, (9.0, 9.0), 0.0),
    entry("sr-ii-4077", "Sr II 4077", 407.771, "Sr", 2, -0.15, 0.0, (2.0, 4.0), 0.5),
    entry("h-delta", "H delta", 410.174, "H", 1, -1.655, 10.199, (8.0, 72.0), 1.0),
    entry("ca-i-4227", "Ca I 4227", 422.673, "Ca", 1, 0.243, 0.0, (1.0, 3.0), 1.0),
    entry("fe-i-4272", "Fe I 4272", 427.176, "Fe", 1, -1.118, 1.485, (9.0, 9.0), 0.0),
    entry("h-gamma", "H gamma", 434.047, "H", 1, -1.350, 10.199, (8.0, 50.0), 1.0),
    entry("fe-i-4383", "Fe I 4383", 438.354, "Fe", 1, -0.75, 1.485, (9.0, 11.0), 0.0),
    entry("he-i-4388", "He I 4388", 438.793, "He", 1, -1.364, 21.218, (3.0, 5.0), 0.0),
    entry("he-i-4471", "He I 4471", 447.147, "He", 1, -0.986, 20.964, (9.0, 15.0), 0.0),
    entry("mg-ii-4481", "Mg II 4481", 448.113, "Mg", 2, -0.02, 8.864, (10.0, 14.0), 0.0),
    entry("ba-ii-4554", "Ba II 4554", 455.403, "Ba", 2, -0.13, 0.0, (2.0, 4.0), 0.5),
    entry("h-beta", "H beta", 486.128, "H", 1, -0.914, 10.199, (8.0, 32.0), 1.0),
    entry("mg-b2", "Mg I b2", 517.268, "Mg", 1, -0.867, 2.712, (3.0, 3.0), 1.0),
    entry("mg-b1", "Mg I b1", 518.362, "Mg", 1, -0.867, 2.717, (5.0, 3.0), 1.0),
    entry("fe-i-5270", "Fe I 5270", 526.954, "Fe", 1, -2.36, 0.859, (11.0, 9.0), 0.0),
    entry("he-i-5876", "He I 5876", 587.562, "He", 1, -0.21, 20.964, (9.0, 15.0), 0.0),
    entry("na-d2", "Na I D2", 588.995, "Na", 1, -0.193, 0.0, (2.0, 4.0), 1.0),
    entry("na-d1", "Na I D1", 589.592, "Na", 1, -0.495, 0.0, (2.0, 2.0), 1.0),
    entry("h-alpha", "H alpha", 656.282, "H", 1, -0.193, 10.199, (8.0, 18.0), 1.0),
    entry("li-i-6708", "Li I 6708", 670.78, "Li", 1, -0.13, 0.0, (2.0, 6.0), 0.5),
    entry("ca-ii-8542", "Ca II 8542", 854.209, "Ca", 2, -1.14, 1.700, (6.0, 4.0), 0.5),
];

/// Catalogue keys in wavelength order.
pub fn catalogue_keys() -> impl Iterator<Item = &'static str> {
    CATALOGUE.iter().map(|entry| entry.key)
}

/// Look up a catalogue line by key (case-insensitive).
pub fn catalogue_line(key: &str) -> AtmosResult<SpectralLine> {
    CATALOGUE
        .iter()
        .find(|entry| entry.key.eq_ignore_ascii_case(key))
        .map(|entry| SpectralLine {
            label: entry.label.to_string(),
            wavelength_nm: entry.wavelength_nm,
            element: entry.element.to_string(),
            stage: entry.stage,
            log_f: entry.log_f,
            excitation_ev: entry.excitation_ev,
            lower_weight: entry.lower_weight,
            upper_weight: entry.upper_weight,
            log_gamma_col: entry.log_gamma_col,
            mass: None,
            abundance_a12: None,
            microturbulence_km_s: default_microturbulence(),
        })
        .ok_or_else(|| AtmosError::lookup("LINE.CATALOGUE", format!("unknown line '{key}'")))
}

/// A line whose species is resolved in the registry and whose inputs are in range.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedLine {
    pub line: SpectralLine,
    #[serde(skip)]
    pub element: ElementId,
    #[serde(skip)]
    pub species: SpeciesId,
    /// Absorber mass (amu).
    pub mass: f64,
    /// ln of the factor applied to the stage population by an abundance override.
    pub ln_abundance_scale: f64,
}

impl ResolvedLine {
    pub fn id(&self) -> String {
        format!("{} {:.3}", self.line.label, self.line.wavelength_nm)
    }
}

impl LineSelection {
    pub fn line(&self) -> AtmosResult<SpectralLine> {
        match self {
            Self::Catalogue(key) => catalogue_line(key),
            Self::Explicit(line) => Ok(line.clone()),
        }
    }

    /// Resolve against the registry, clamping soft limits into `clamps`.
    ///
    /// `abundances` are the model's number abundances relative to H.
    pub fn resolve(
        &self,
        registry: &SpeciesRegistry,
        abundances: &[f64],
        clamps: &mut Vec<ClampedParameter>,
    ) -> AtmosResult<ResolvedLine> {
        let mut line = self.line()?;
        let element = registry.require_element(&line.element)?;
        let species = registry.stage(element, line.stage).ok_or_else(|| {
            AtmosError::lookup(
                "LINE.SPECIES",
                format!("{} has no ionization stage {}", line.element, line.stage),
            )
        })?;

        let fields = [
            ("wavelength", line.wavelength_nm),
            ("logF", line.log_f),
            ("excitation", line.excitation_ev),
            ("lowerWeight", line.lower_weight),
            ("upperWeight", line.upper_weight),
            ("logGammaCol", line.log_gamma_col),
            ("microturbulence", line.microturbulence_km_s),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(AtmosError::input_validation(
                    "INPUT.LINE",
                    format!("{}: {name} must be finite, got {value}", line.label),
                ));
            }
        }
        if line.lower_weight <= 0.0 || line.upper_weight <= 0.0 {
            return Err(AtmosError::input_validation(
                "INPUT.LINE",
                format!("{}: statistical weights must be positive", line.label),
            ));
        }

        let label = line.label.clone();
        let mut clamp = |name: &str, value: f64, range: (f64, f64)| {
            clamp_recorded(&format!("{label}.{name}"), value, range.0, range.1, clamps)
        };
        line.wavelength_nm = clamp("wavelength", line.wavelength_nm, WAVELENGTH_RANGE_NM);
        line.log_f = clamp("logF", line.log_f, LOG_F_RANGE);
        line.log_gamma_col = clamp("logGammaCol", line.log_gamma_col, LOG_GAMMA_COL_RANGE);
        line.microturbulence_km_s =
            clamp("microturbulence", line.microturbulence_km_s, MICROTURBULENCE_RANGE);
        line.abundance_a12 = line.abundance_a12.map(|a12| clamp("a12", a12, A12_RANGE));

        let model_a12 = abundances
            .get(element.0)
            .map(|abundance| 12.0 + abundance.log10())
            .ok_or_else(|| {
                AtmosError::internal(
                    "LINE.ABUNDANCE",
                    format!("no abundance for element {}", line.element),
                )
            })?;
        let ln_abundance_scale = line
            .abundance_a12
            .map_or(0.0, |a12| LN10 * (a12 - model_a12));
        let mass = line
            .mass
            .filter(|mass| mass.is_finite() && *mass > 0.0)
            .unwrap_or(registry.element(element).mass);

        Ok(ResolvedLine {
            line,
            element,
            species,
            mass,
            ln_abundance_scale,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{catalogue_keys, catalogue_line, LineSelection, SpectralLine};
    use crate::domain::errors::AtmosErrorCategory;
    use crate::registry::{AbundanceOffsets, SpeciesRegistry};

    #[test]
    fn catalogue_is_sorted_unique_and_in_range() {
        let keys: Vec<&str> = catalogue_keys().collect();
        assert!(keys.len() >= 20);
        let mut previous = 0.0;
        for key in &keys {
            let line = catalogue_line(key).expect("catalogue line");
            assert!(line.wavelength_nm > previous, "{key} out of order");
            assert!((350.0..=1_000.0).contains(&line.wavelength_nm));
            previous = line.wavelength_nm;
        }
        let unique: std::collections::BTreeSet<&str> = keys.iter().copied().collect();
        assert_eq!(unique.len(), keys.len());
    }

    #[test]
    fn selections_deserialize_from_key_or_object() {
        let selections: Vec<LineSelection> = serde_json::from_str(
            r#"["na-d2", {"label":"test","wavelengthNm":500.0,"element":"Fe","stage":1,"logF":-2.0}]"#,
        )
        .expect("parse");
        assert_eq!(selections[0], LineSelection::Catalogue("na-d2".to_string()));
        match &selections[1] {
            LineSelection::Explicit(line) => {
                assert_eq!(line.lower_weight, 1.0);
                assert_eq!(line.microturbulence_km_s, 1.0);
                assert!(line.abundance_a12.is_none());
            }
            other => panic!("expected explicit line, got {other:?}"),
        }
    }

    #[test]
    fn resolve_clamps_and_records_out_of_range_inputs() {
        let registry = SpeciesRegistry::standard().expect("registry");
        let abundances = registry.abundances(AbundanceOffsets::default());
        let selection = LineSelection::Explicit(SpectralLine {
            label: "wide".to_string(),
            wavelength_nm: 1_200.0,
            element: "Fe".to_string(),
            stage: 1,
            log_f: -8.0,
            excitation_ev: 1.0,
            lower_weight: 1.0,
            upper_weight: 1.0,
            log_gamma_col: 0.0,
            mass: None,
            abundance_a12: Some(12.5),
            microturbulence_km_s: 1.0,
        });
        let mut clamps = Vec::new();
        let resolved = selection.resolve(&registry, &abundances, &mut clamps).expect("resolve");
        assert_eq!(resolved.line.wavelength_nm, 1_000.0);
        assert_eq!(resolved.line.log_f, -6.0);
        assert_eq!(resolved.line.abundance_a12, Some(11.0));
        let names: Vec<&str> = clamps.iter().map(|clamp| clamp.name.as_str()).collect();
        assert_eq!(names, vec!["wide.wavelength", "wide.logF", "wide.a12"]);
        assert!(resolved.ln_abundance_scale > 0.0);
        assert!((resolved.mass - 55.845).abs() < 0.1);
    }

    #[test]
    fn unknown_keys_and_stages_fail_fast() {
        let registry = SpeciesRegistry::standard().expect("registry");
        let abundances = registry.abundances(AbundanceOffsets::default());
        let mut clamps = Vec::new();
        let error = LineSelection::Catalogue("h-omega".to_string())
            .resolve(&registry, &abundances, &mut clamps)
            .expect_err("unknown key");
        assert_eq!(error.category(), AtmosErrorCategory::LookupError);

        let mut line = catalogue_line("na-d2").expect("na");
        line.stage = 9;
        let error = LineSelection::Explicit(line)
            .resolve(&registry, &abundances, &mut clamps)
            .expect_err("no such stage");
        assert_eq!(error.placeholder(), "LINE.SPECIES");
    }
}
