//! Immutable catalogue of chemical species shared read-only by every kernel.
//!
//! Built once per process from the static element and molecule tables. Every
//! species is addressable by a dense [`SpeciesId`], by display name ("Fe II",
//! "H-", "TiO") and by its [`CompositionSignature`].

pub mod elements;
pub mod molecules;

use std::collections::HashMap;

use crate::common::constants::{LN10, THETA_SCALE};
use crate::domain::errors::AtmosError;
use crate::numerics::interpolation::interpolate_clamped;
use crate::numerics::{least_squares, polynomial, DenseMatrix, LuError};

use elements::{ALPHA_ELEMENTS, ELEMENT_TABLE};
use molecules::{ln_dissociation_constant, MOLECULE_TABLE};

/// Temperatures (K) at which partition functions are tabulated.
pub const PARTITION_TEMPERATURES: [f64; 5] = [130.0, 500.0, 3_000.0, 8_000.0, 10_000.0];

/// Degree of the log10 K(theta) polynomial fitted for each molecule.
pub const MOLECULE_FIT_DEGREE: usize = 4;
const MOLECULE_FIT_SAMPLES: usize = 40;
const MOLECULE_FIT_THETA_MIN: f64 = 0.42;
const MOLECULE_FIT_THETA_MAX: f64 = 4.2;

const ROMAN_STAGES: [&str; 4] = ["I", "II", "III", "IV"];
const MAX_STAGES: usize = 4;
const HYDROGEN_ANION_BINDING_EV: f64 = 0.754;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpeciesId(pub usize);

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistryError {
    #[error("unknown element symbol '{symbol}'")]
    UnknownElement { symbol: String },
    #[error("unknown species '{name}'")]
    UnknownSpecies { name: String },
    #[error("species '{name}' registered twice")]
    DuplicateSpecies { name: String },
    #[error("equilibrium-constant fit failed for '{name}': {source}")]
    MoleculeFit {
        name: String,
        #[source]
        source: LuError,
    },
}

impl From<RegistryError> for AtmosError {
    fn from(error: RegistryError) -> Self {
        match error {
            RegistryError::UnknownElement { .. } | RegistryError::UnknownSpecies { .. } => {
                AtmosError::lookup("REGISTRY.LOOKUP", error.to_string())
            }
            RegistryError::DuplicateSpecies { .. } | RegistryError::MoleculeFit { .. } => {
                AtmosError::internal("REGISTRY.BUILD", error.to_string())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub symbol: &'static str,
    pub atomic_number: u8,
    pub mass: f64,
    pub ionization_ev: &'static [f64],
    pub solar_a12: f64,
    /// Stage I, II, ... species of this element.
    pub stages: Vec<SpeciesId>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SpeciesKind {
    /// `stage` is 1 for neutrals.
    Atomic { element: ElementId, stage: u8 },
    NegativeIon { element: ElementId, binding_ev: f64 },
    Molecule {
        dissociation_ev: f64,
        /// log10 K as a polynomial in theta = 5040 / T, ascending powers.
        log10_k: [f64; MOLECULE_FIT_DEGREE + 1],
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompositionSignature {
    pub constituents: Vec<(ElementId, u8)>,
    pub charge: i8,
}

impl CompositionSignature {
    pub fn new(mut constituents: Vec<(ElementId, u8)>, charge: i8) -> Self {
        constituents.sort();
        Self {
            constituents,
            charge,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Species {
    pub name: String,
    pub kind: SpeciesKind,
    pub signature: CompositionSignature,
    /// Mass in amu.
    pub mass: f64,
    /// ln U at [`PARTITION_TEMPERATURES`].
    pub ln_partition: [f64; 5],
    /// Next lower ionization stage (ions) or the neutral parent (anions).
    pub parent: Option<SpeciesId>,
}

impl Species {
    pub fn charge(&self) -> i8 {
        self.signature.charge
    }

    pub fn atom_count(&self) -> u32 {
        self.signature
            .constituents
            .iter()
            .map(|(_, count)| u32::from(*count))
            .sum()
    }

    pub fn ln_partition_at(&self, temperature: f64) -> f64 {
        ln_partition_at(&self.ln_partition, temperature)
    }

    pub fn is_molecule(&self) -> bool {
        matches!(self.kind, SpeciesKind::Molecule { .. })
    }
}

/// Piecewise-linear ln U in T, clamped outside the tabulated range.
pub fn ln_partition_at(nodes: &[f64; 5], temperature: f64) -> f64 {
    interpolate_clamped(temperature, &PARTITION_TEMPERATURES, nodes)
}

/// ln K from fitted log10 K(theta) coefficients, theta clamped to the fit range.
pub fn ln_k_from_fit(log10_k: &[f64; MOLECULE_FIT_DEGREE + 1], temperature: f64) -> f64 {
    let theta = (THETA_SCALE / temperature).clamp(MOLECULE_FIT_THETA_MIN, MOLECULE_FIT_THETA_MAX);
    LN10 * polynomial(log10_k, theta)
}

#[derive(Debug, Clone, PartialEq)]
pub struct MoleculeFitResidual {
    pub name: String,
    /// Largest |log10 K_fit - log10 K_exact| over the fit samples.
    pub max_residual_dex: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegistryBuild {
    pub registry: SpeciesRegistry,
    pub fit_residuals: Vec<MoleculeFitResidual>,
}

/// Logarithmic abundance offsets applied on top of the solar scale.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AbundanceOffsets {
    /// [M/H], applied to every element heavier than He.
    pub log_z: f64,
    pub log_he_fe: f64,
    /// Added to carbon only.
    pub log_c_o: f64,
    pub log_alpha_fe: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesRegistry {
    elements: Vec<Element>,
    species: Vec<Species>,
    molecules: Vec<SpeciesId>,
    hydrogen_anion: SpeciesId,
    by_name: HashMap<String, SpeciesId>,
    by_signature: HashMap<CompositionSignature, SpeciesId>,
    by_symbol: HashMap<&'static str, ElementId>,
}

impl SpeciesRegistry {
    /// Build the standard registry and return the molecular fit diagnostics.
    pub fn build() -> Result<RegistryBuild, RegistryError> {
        let mut builder = RegistryBuilder::default();

        for record in ELEMENT_TABLE {
            let element_id = ElementId(builder.elements.len());
            builder.by_symbol.insert(record.symbol, element_id);
            builder.elements.push(Element {
                symbol: record.symbol,
                atomic_number: record.atomic_number,
                mass: record.mass,
                ionization_ev: record.ionization_ev,
                solar_a12: record.solar_a12,
                stages: Vec::new(),
            });

            let stage_count = (record.ionization_ev.len() + 1).min(MAX_STAGES);
            let mut previous = None;
            for stage_index in 0..stage_count {
                let ln_partition = match record.log10_partition.get(stage_index) {
                    Some([at_theta_one, at_theta_half]) => {
                        atomic_partition_nodes(*at_theta_one, *at_theta_half)
                    }
                    None => [0.0; 5],
                };
                let id = builder.push(Species {
                    name: format!("{} {}", record.symbol, ROMAN_STAGES[stage_index]),
                    kind: SpeciesKind::Atomic {
                        element: element_id,
                        stage: stage_index as u8 + 1,
                    },
                    signature: CompositionSignature::new(
                        vec![(element_id, 1)],
                        stage_index as i8,
                    ),
                    mass: record.mass,
                    ln_partition,
                    parent: previous,
                })?;
                builder.elements[element_id.0].stages.push(id);
                previous = Some(id);
            }
        }

        let hydrogen = builder.element_id("H")?;
        let hydrogen_neutral = builder.elements[hydrogen.0].stages[0];
        let hydrogen_anion = builder.push(Species {
            name: "H-".to_string(),
            kind: SpeciesKind::NegativeIon {
                element: hydrogen,
                binding_ev: HYDROGEN_ANION_BINDING_EV,
            },
            signature: CompositionSignature::new(vec![(hydrogen, 1)], -1),
            mass: builder.elements[hydrogen.0].mass,
            ln_partition: [0.0; 5],
            parent: Some(hydrogen_neutral),
        })?;

        let mut fit_residuals = Vec::with_capacity(MOLECULE_TABLE.len());
        let mut molecule_ids = Vec::with_capacity(MOLECULE_TABLE.len());
        for record in MOLECULE_TABLE {
            let first = builder.element_id(record.first)?;
            let second = builder.element_id(record.second)?;
            let first_product = builder.elements[first.0].stages[record.charge as usize];
            let second_product = builder.elements[second.0].stages[0];
            let ln_partition = record.partition.map(f64::ln);

            let first_mass = builder.elements[first.0].mass;
            let second_mass = builder.elements[second.0].mass;
            let reduced_mass = first_mass * second_mass / (first_mass + second_mass);

            let first_nodes = builder.species[first_product.0].ln_partition;
            let second_nodes = builder.species[second_product.0].ln_partition;
            let exact = |theta: f64| {
                let temperature = THETA_SCALE / theta;
                ln_dissociation_constant(
                    temperature,
                    reduced_mass,
                    ln_partition_at(&first_nodes, temperature),
                    ln_partition_at(&second_nodes, temperature),
                    ln_partition_at(&ln_partition, temperature),
                    record.dissociation_ev,
                ) / LN10
            };
            let (log10_k, max_residual_dex) =
                fit_log10_k(exact).map_err(|source| RegistryError::MoleculeFit {
                    name: record.name.to_string(),
                    source,
                })?;
            tracing::trace!(
                molecule = record.name,
                max_residual_dex,
                "fitted dissociation constant"
            );
            fit_residuals.push(MoleculeFitResidual {
                name: record.name.to_string(),
                max_residual_dex,
            });

            let mut constituents = vec![(first, 1), (second, 1)];
            if first == second {
                constituents = vec![(first, 2)];
            }
            let id = builder.push(Species {
                name: record.name.to_string(),
                kind: SpeciesKind::Molecule {
                    dissociation_ev: record.dissociation_ev,
                    log10_k,
                },
                signature: CompositionSignature::new(constituents, record.charge),
                mass: first_mass + second_mass,
                ln_partition,
                parent: None,
            })?;
            molecule_ids.push(id);
        }

        let registry = SpeciesRegistry {
            elements: builder.elements,
            species: builder.species,
            molecules: molecule_ids,
            hydrogen_anion,
            by_name: builder.by_name,
            by_signature: builder.by_signature,
            by_symbol: builder.by_symbol,
        };
        tracing::debug!(
            elements = registry.elements.len(),
            species = registry.species.len(),
            "species registry built"
        );

        Ok(RegistryBuild {
            registry,
            fit_residuals,
        })
    }

    /// The standard registry without fit diagnostics.
    pub fn standard() -> Result<Self, RegistryError> {
        Self::build().map(|build| build.registry)
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn element(&self, id: ElementId) -> &Element {
        &self.elements[id.0]
    }

    pub fn element_by_symbol(&self, symbol: &str) -> Option<ElementId> {
        self.by_symbol.get(symbol).copied()
    }

    pub fn require_element(&self, symbol: &str) -> Result<ElementId, RegistryError> {
        self.element_by_symbol(symbol)
            .ok_or_else(|| RegistryError::UnknownElement {
                symbol: symbol.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    pub fn species(&self) -> &[Species] {
        &self.species
    }

    pub fn entry(&self, id: SpeciesId) -> &Species {
        &self.species[id.0]
    }

    /// Stage `stage` (1 = neutral) of `element`, if tracked.
    pub fn stage(&self, element: ElementId, stage: u8) -> Option<SpeciesId> {
        let index = usize::from(stage).checked_sub(1)?;
        self.elements.get(element.0)?.stages.get(index).copied()
    }

    pub fn by_name(&self, name: &str) -> Option<SpeciesId> {
        self.by_name.get(name).copied()
    }

    pub fn require_species(&self, name: &str) -> Result<SpeciesId, RegistryError> {
        self.by_name(name)
            .ok_or_else(|| RegistryError::UnknownSpecies {
                name: name.to_string(),
            })
    }

    pub fn by_signature(&self, signature: &CompositionSignature) -> Option<SpeciesId> {
        self.by_signature.get(signature).copied()
    }

    pub fn molecules(&self) -> &[SpeciesId] {
        &self.molecules
    }

    pub fn hydrogen_anion(&self) -> SpeciesId {
        self.hydrogen_anion
    }

    /// ln of the dissociation constant (dyn/cm^2) of a molecule at `temperature`,
    /// evaluated from the fitted polynomial with theta clamped to the fit range.
    pub fn ln_dissociation_constant(&self, molecule: SpeciesId, temperature: f64) -> Option<f64> {
        match &self.species[molecule.0].kind {
            SpeciesKind::Molecule { log10_k, .. } => Some(ln_k_from_fit(log10_k, temperature)),
            _ => None,
        }
    }

    /// Number abundance of each element relative to hydrogen, with offsets applied.
    pub fn abundances(&self, offsets: AbundanceOffsets) -> Vec<f64> {
        self.elements
            .iter()
            .map(|element| {
                let mut a12 = element.solar_a12;
                if element.atomic_number == 2 {
                    a12 += offsets.log_he_fe;
                }
                if element.atomic_number > 2 {
                    a12 += offsets.log_z;
                }
                if element.symbol == "C" {
                    a12 += offsets.log_c_o;
                }
                if ALPHA_ELEMENTS.contains(&element.symbol) {
                    a12 += offsets.log_alpha_fe;
                }
                10.0_f64.powf(a12 - 12.0)
            })
            .collect()
    }
}

#[derive(Default)]
struct RegistryBuilder {
    elements: Vec<Element>,
    species: Vec<Species>,
    by_name: HashMap<String, SpeciesId>,
    by_signature: HashMap<CompositionSignature, SpeciesId>,
    by_symbol: HashMap<&'static str, ElementId>,
}

impl RegistryBuilder {
    fn push(&mut self, species: Species) -> Result<SpeciesId, RegistryError> {
        let id = SpeciesId(self.species.len());
        if self.by_name.contains_key(&species.name)
            || self.by_signature.contains_key(&species.signature)
        {
            return Err(RegistryError::DuplicateSpecies { name: species.name });
        }
        self.by_name.insert(species.name.clone(), id);
        self.by_signature.insert(species.signature.clone(), id);
        self.species.push(species);
        Ok(id)
    }

    fn element_id(&self, symbol: &str) -> Result<ElementId, RegistryError> {
        self.by_symbol
            .get(symbol)
            .copied()
            .ok_or_else(|| RegistryError::UnknownElement {
                symbol: symbol.to_string(),
            })
    }
}

/// ln U nodes from log10 U at theta = 1 and theta = 0.5: constant below 5040 K,
/// linear in T toward the theta = 0.5 value above it.
fn atomic_partition_nodes(log10_theta_one: f64, log10_theta_half: f64) -> [f64; 5] {
    let cool = LN10 * log10_theta_one;
    let hot = LN10 * log10_theta_half;
    PARTITION_TEMPERATURES.map(|temperature| {
        if temperature <= THETA_SCALE {
            cool
        } else {
            let fraction = ((temperature - THETA_SCALE) / THETA_SCALE).min(1.0);
            cool + (hot - cool) * fraction
        }
    })
}

fn fit_log10_k(
    exact: impl Fn(f64) -> f64,
) -> Result<([f64; MOLECULE_FIT_DEGREE + 1], f64), LuError> {
    let step = (MOLECULE_FIT_THETA_MAX - MOLECULE_FIT_THETA_MIN) / (MOLECULE_FIT_SAMPLES - 1) as f64;
    let thetas: Vec<f64> = (0..MOLECULE_FIT_SAMPLES)
        .map(|index| MOLECULE_FIT_THETA_MIN + step * index as f64)
        .collect();
    let targets: Vec<f64> = thetas.iter().map(|theta| exact(*theta)).collect();

    let design = DenseMatrix::from_fn(MOLECULE_FIT_SAMPLES, MOLECULE_FIT_DEGREE + 1, |row, col| {
        thetas[row].powi(col as i32)
    });
    let solution = least_squares(&design, &targets)?;

    let mut coefficients = [0.0; MOLECULE_FIT_DEGREE + 1];
    coefficients.copy_from_slice(&solution);
    let max_residual = thetas
        .iter()
        .zip(&targets)
        .map(|(theta, target)| (polynomial(&coefficients, *theta) - target).abs())
        .fold(0.0, f64::max);

    Ok((coefficients, max_residual))
}

#[cfg(test)]
mod tests {
    use super::{
        AbundanceOffsets, CompositionSignature, RegistryError, SpeciesKind, SpeciesRegistry,
    };
    use crate::common::constants::LN10;

    #[test]
    fn every_ion_has_its_lower_stage_as_parent() {
        let registry = SpeciesRegistry::standard().expect("registry");
        for species in registry.species() {
            if let SpeciesKind::Atomic { element, stage } = species.kind {
                if stage == 1 {
                    assert!(species.parent.is_none());
                    continue;
                }
                let parent = species.parent.expect("ion parent");
                assert_eq!(registry.stage(element, stage - 1), Some(parent));
                assert_eq!(registry.entry(parent).charge() + 1, species.charge());
            }
        }
    }

    #[test]
    fn molecule_constituents_are_diatomic_and_resolvable() {
        let build = SpeciesRegistry::build().expect("registry");
        let registry = &build.registry;
        assert_eq!(registry.molecules().len(), 18);
        for id in registry.molecules() {
            let molecule = registry.entry(*id);
            assert_eq!(molecule.atom_count(), 2, "{}", molecule.name);
            let constituent_mass: f64 = molecule
                .signature
                .constituents
                .iter()
                .map(|(element, count)| registry.element(*element).mass * f64::from(*count))
                .sum();
            assert!((constituent_mass - molecule.mass).abs() < 1.0e-9);
        }
        for residual in &build.fit_residuals {
            assert!(
                residual.max_residual_dex < 0.2,
                "{} fit residual {}",
                residual.name,
                residual.max_residual_dex
            );
        }
    }

    #[test]
    fn lookups_by_name_and_signature_agree() {
        let registry = SpeciesRegistry::standard().expect("registry");
        let iron = registry.element_by_symbol("Fe").expect("iron");
        let fe_ii = registry.by_name("Fe II").expect("Fe II");
        assert_eq!(
            registry.by_signature(&CompositionSignature::new(vec![(iron, 1)], 1)),
            Some(fe_ii)
        );
        let carbon = registry.element_by_symbol("C").expect("carbon");
        let oxygen = registry.element_by_symbol("O").expect("oxygen");
        let co = registry.by_name("CO").expect("CO");
        assert_eq!(
            registry.by_signature(&CompositionSignature::new(vec![(oxygen, 1), (carbon, 1)], 0)),
            Some(co)
        );
        assert_eq!(registry.entry(registry.hydrogen_anion()).charge(), -1);
        assert_eq!(
            registry.require_species("Xx IX"),
            Err(RegistryError::UnknownSpecies {
                name: "Xx IX".to_string()
            })
        );
    }

    #[test]
    fn fitted_constant_tracks_direct_evaluation() {
        let registry = SpeciesRegistry::standard().expect("registry");
        let h2 = registry.by_name("H2").expect("H2");
        let ln_k = registry.ln_dissociation_constant(h2, 3_000.0).expect("molecule");
        assert!((ln_k / LN10 - 4.39).abs() < 0.2, "log10 K={}", ln_k / LN10);
        let fe_i = registry.by_name("Fe I").expect("Fe I");
        assert!(registry.ln_dissociation_constant(fe_i, 3_000.0).is_none());
    }

    #[test]
    fn abundance_offsets_scale_selected_groups() {
        let registry = SpeciesRegistry::standard().expect("registry");
        let solar = registry.abundances(AbundanceOffsets::default());
        let poor = registry.abundances(AbundanceOffsets {
            log_z: -1.0,
            log_alpha_fe: 0.4,
            ..AbundanceOffsets::default()
        });
        let index = |symbol: &str| registry.element_by_symbol(symbol).expect("element").0;
        assert_eq!(solar[index("H")], 1.0);
        assert_eq!(poor[index("H")], solar[index("H")]);
        assert_eq!(poor[index("He")], solar[index("He")]);
        assert!((poor[index("Fe")] / solar[index("Fe")] - 0.1).abs() < 1.0e-12);
        let mg_ratio = poor[index("Mg")] / solar[index("Mg")];
        assert!((mg_ratio - 10.0_f64.powf(-0.6)).abs() < 1.0e-12);
    }

    #[test]
    fn partition_nodes_follow_theta_anchors() {
        let registry = SpeciesRegistry::standard().expect("registry");
        let fe_i = registry.entry(registry.by_name("Fe I").expect("Fe I"));
        assert!((fe_i.ln_partition_at(2_500.0) - 1.43 * LN10).abs() < 1.0e-12);
        assert!(fe_i.ln_partition_at(12_000.0) > fe_i.ln_partition_at(4_000.0));
        let h_ii = registry.entry(registry.by_name("H II").expect("H II"));
        assert_eq!(h_ii.ln_partition_at(9_000.0), 0.0);
    }
}
