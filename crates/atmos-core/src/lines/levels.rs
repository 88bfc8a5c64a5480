use crate::common::constants::BOLTZMANN_EV;

/// ln N of the lower level from the stage density by Boltzmann excitation.
pub fn ln_level_density(
    ln_stage_density: f64,
    statistical_weight: f64,
    excitation_ev: f64,
    ln_partition: f64,
    temperature: f64,
) -> f64 {
    ln_stage_density + statistical_weight.ln() - excitation_ev / (BOLTZMANN_EV * temperature) - ln_partition
}
