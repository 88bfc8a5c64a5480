//! Fast closed-form estimate of the electron and neutral-atom pressures, used to
//! seed the full equilibrium solve.
//!
//! Electron pressure comes from a Newton iteration over first ionizations of every
//! element; neutral pressures then follow from each element's conservation, with
//! the dominant couplings (H/H2/H-, C/O through CO, N through N2) solved as
//! quadratics.

use crate::ionization::ln_saha_pressure_factor;
use crate::registry::{SpeciesKind, SpeciesRegistry};

const MIN_ESTIMATE_TEMPERATURE: f64 = 1_200.0;
const ELECTRON_ITERATIONS: usize = 15;
const ELECTRON_TOLERANCE: f64 = 1.0e-3;
const PRESSURE_FLOOR: f64 = 1.0e-300;

#[derive(Debug, Clone, PartialEq)]
pub struct GasEstimate {
    pub electron_pressure: f64,
    /// Neutral-atom partial pressure per element (dyn/cm^2).
    pub atom_pressures: Vec<f64>,
    /// Pressure of hydrogen nuclei in all forms.
    pub hydrogen_nuclei_pressure: f64,
}

/// Estimate the gas composition at (`temperature`, `gas_pressure`).
///
/// `abundances` are number abundances relative to hydrogen, one per element.
pub fn estimate(
    registry: &SpeciesRegistry,
    abundances: &[f64],
    temperature: f64,
    gas_pressure: f64,
) -> GasEstimate {
    let temperature = temperature.max(MIN_ESTIMATE_TEMPERATURE);
    let total: f64 = abundances.iter().sum();
    let fractions: Vec<f64> = abundances.iter().map(|value| value / total).collect();

    let ionization: Vec<f64> = registry
        .elements()
        .iter()
        .map(|element| match (element.stages.first(), element.stages.get(1)) {
            (Some(neutral), Some(ion)) => ln_saha_pressure_factor(
                temperature,
                element.ionization_ev[0],
                registry.entry(*neutral).ln_partition_at(temperature),
                registry.entry(*ion).ln_partition_at(temperature),
            )
            .exp(),
            _ => 0.0,
        })
        .collect();

    let hydrogen = registry.element_by_symbol("H").map_or(0, |id| id.0);
    let inverse_h2 = inverse_constant(registry, "H2", temperature);
    let anion = registry.entry(registry.hydrogen_anion());
    let hydrogen_neutral = registry.elements()[hydrogen].stages[0];
    let anion_factor = (-ln_saha_pressure_factor(
        temperature,
        match anion.kind {
            SpeciesKind::NegativeIon { binding_ev, .. } => binding_ev,
            _ => 0.0,
        },
        anion.ln_partition_at(temperature),
        registry.entry(hydrogen_neutral).ln_partition_at(temperature),
    ))
    .exp();

    // Molecular hydrogen with every other element left atomic.
    let hydrogen_fraction = fractions[hydrogen];
    let neutral_h = 2.0 * hydrogen_fraction * gas_pressure
        / (1.0 + (1.0 + 8.0 * hydrogen_fraction * gas_pressure * inverse_h2).sqrt());
    let h2_pressure = neutral_h * neutral_h * inverse_h2;

    let donor_sum: f64 = fractions.iter().zip(&ionization).map(|(f, phi)| f * phi).sum();
    let mut electron_pressure = (gas_pressure * donor_sum).sqrt().min(0.5 * gas_pressure);
    for _ in 0..ELECTRON_ITERATIONS {
        let nuclei = gas_pressure + h2_pressure - electron_pressure;
        let (first, second) = fractions.iter().zip(&ionization).fold(
            (0.0, 0.0),
            |(first, second), (fraction, phi)| {
                let denominator = phi + electron_pressure;
                (
                    first + fraction * phi / denominator,
                    second + fraction * phi / (denominator * denominator),
                )
            },
        );
        let step = (nuclei * first - electron_pressure) / (1.0 + first + nuclei * second);
        let mut next = electron_pressure + step;
        if next <= 0.0 {
            next = 0.5 * electron_pressure;
        }
        let settled = (next - electron_pressure).abs() < ELECTRON_TOLERANCE * electron_pressure;
        electron_pressure = next;
        if settled {
            break;
        }
    }
    let electron_pressure = electron_pressure.max(PRESSURE_FLOOR);
    let nuclei = (gas_pressure + h2_pressure - electron_pressure).max(PRESSURE_FLOOR);

    let mut atom_pressures: Vec<f64> = fractions
        .iter()
        .zip(&ionization)
        .map(|(fraction, phi)| fraction * nuclei / (1.0 + phi / electron_pressure))
        .collect();

    let linear = 1.0 + ionization[hydrogen] / electron_pressure + anion_factor * electron_pressure;
    let hydrogen_nuclei = hydrogen_fraction * nuclei;
    atom_pressures[hydrogen] = 2.0 * hydrogen_nuclei
        / (linear + (linear * linear + 8.0 * inverse_h2 * hydrogen_nuclei).sqrt());

    if let (Some(carbon), Some(oxygen)) = (
        registry.element_by_symbol("C"),
        registry.element_by_symbol("O"),
    ) {
        let inverse_co = inverse_constant(registry, "CO", temperature);
        let carbon_linear = 1.0 + ionization[carbon.0] / electron_pressure;
        let oxygen_linear = 1.0 + ionization[oxygen.0] / electron_pressure;
        let carbon_nuclei = fractions[carbon.0] * nuclei;
        let oxygen_nuclei = fractions[oxygen.0] * nuclei;
        let middle = inverse_co * (carbon_nuclei + oxygen_nuclei) + carbon_linear * oxygen_linear;
        let product = inverse_co * inverse_co * carbon_nuclei * oxygen_nuclei;
        let co = 2.0 * inverse_co * carbon_nuclei * oxygen_nuclei
            / (middle + (middle * middle - 4.0 * product).max(0.0).sqrt());
        atom_pressures[carbon.0] = (carbon_nuclei - co).max(PRESSURE_FLOOR) / carbon_linear;
        atom_pressures[oxygen.0] = (oxygen_nuclei - co).max(PRESSURE_FLOOR) / oxygen_linear;
    }

    if let Some(nitrogen) = registry.element_by_symbol("N") {
        let inverse_n2 = inverse_constant(registry, "N2", temperature);
        let linear = 1.0 + ionization[nitrogen.0] / electron_pressure;
        let nitrogen_nuclei = fractions[nitrogen.0] * nuclei;
        atom_pressures[nitrogen.0] = 2.0 * nitrogen_nuclei
            / (linear + (linear * linear + 8.0 * inverse_n2 * nitrogen_nuclei).sqrt());
    }

    for pressure in &mut atom_pressures {
        *pressure = pressure.max(PRESSURE_FLOOR);
    }

    GasEstimate {
        electron_pressure,
        atom_pressures,
        hydrogen_nuclei_pressure: hydrogen_nuclei,
    }
}

/// 1 / K for a named molecule, or 0 when it is not tracked.
fn inverse_constant(registry: &SpeciesRegistry, name: &str, temperature: f64) -> f64 {
    registry
        .by_name(name)
        .and_then(|id| registry.ln_dissociation_constant(id, temperature))
        .map_or(0.0, |ln_k| (-ln_k).exp())
}
