//! Per-depth number densities of every continuum and band absorber.

use serde::Serialize;

use crate::common::constants::BOLTZMANN;
use crate::ionization::StagePopulationTable;
use crate::registry::{ElementId, RegistryError, SpeciesId, SpeciesRegistry};

/// Number densities (cm^-3) at one depth. "Ground" entries are N / U, the
/// population per unit statistical weight of the ground level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepthAbsorbers {
    pub temperature: f64,
    /// Mass density (g/cm^3).
    pub density: f64,
    pub electron_density: f64,
    pub electron_pressure: f64,
    pub hydrogen_neutral: f64,
    pub hydrogen_ion: f64,
    pub helium_neutral: f64,
    pub molecular_hydrogen: f64,
    pub titanium_oxide: f64,
    pub hydrogen_ground: f64,
    pub helium_ground: f64,
    pub carbon_i_ground: f64,
    pub magnesium_ii_ground: f64,
    pub aluminium_i_ground: f64,
    pub iron_i_ground: f64,
}

/// Thermodynamic state and populations at one depth.
#[derive(Debug, Clone, Copy)]
pub struct AbsorberInput<'a> {
    pub stages: &'a StagePopulationTable,
    pub depth: usize,
    pub temperature: f64,
    pub density: f64,
    pub electron_density: f64,
    /// ln N(H2), or a large negative number when molecules are not solved.
    pub ln_molecular_hydrogen: f64,
    pub ln_titanium_oxide: f64,
}

/// Registry handles of the absorbers, resolved once per build.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbsorberSpecies {
    hydrogen: ElementId,
    helium: ElementId,
    carbon: ElementId,
    magnesium: ElementId,
    aluminium: ElementId,
    iron: ElementId,
    molecular_hydrogen: SpeciesId,
    titanium_oxide: SpeciesId,
}

impl AbsorberSpecies {
    pub fn resolve(registry: &SpeciesRegistry) -> Result<Self, RegistryError> {
        Ok(Self {
            hydrogen: registry.require_element("H")?,
            helium: registry.require_element("He")?,
            carbon: registry.require_element("C")?,
            magnesium: registry.require_element("Mg")?,
            aluminium: registry.require_element("Al")?,
            iron: registry.require_element("Fe")?,
            molecular_hydrogen: registry.require_species("H2")?,
            titanium_oxide: registry.require_species("TiO")?,
        })
    }

    pub const fn molecular_hydrogen(&self) -> SpeciesId {
        self.molecular_hydrogen
    }

    pub const fn titanium_oxide(&self) -> SpeciesId {
        self.titanium_oxide
    }

    pub fn depth_absorbers(
        &self,
        registry: &SpeciesRegistry,
        input: AbsorberInput<'_>,
    ) -> DepthAbsorbers {
        let temperature = input.temperature;
        let density = |element: ElementId, stage: u8| {
            input.stages.ln_density(element.0, stage, input.depth).exp()
        };
        let ground = |element: ElementId, stage: u8| {
            let ln_partition = registry
                .stage(element, stage)
                .map_or(0.0, |id| registry.entry(id).ln_partition_at(temperature));
            (input.stages.ln_density(element.0, stage, input.depth) - ln_partition).exp()
        };

        DepthAbsorbers {
            temperature,
            density: input.density,
            electron_density: input.electron_density,
            electron_pressure: input.electron_density * BOLTZMANN * temperature,
            hydrogen_neutral: density(self.hydrogen, 1),
            hydrogen_ion: density(self.hydrogen, 2),
            helium_neutral: density(self.helium, 1),
            molecular_hydrogen: input.ln_molecular_hydrogen.exp(),
            titanium_oxide: input.ln_titanium_oxide.exp(),
            hydrogen_ground: ground(self.hydrogen, 1),
            helium_ground: ground(self.helium, 1),
            carbon_i_ground: ground(self.carbon, 1),
            magnesium_ii_ground: ground(self.magnesium, 2),
            aluminium_i_ground: ground(self.aluminium, 1),
            iron_i_ground: ground(self.iron, 1),
        }
    }
}
