//! Diatomic molecules: dissociation energies (Allen's Astrophysical Quantities)
//! and partition functions from Barklem & Collet (2016).

use crate::common::constants::{AMU, BOLTZMANN, BOLTZMANN_EV, PI, PLANCK};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoleculeRecord {
    pub name: &'static str,
    pub first: &'static str,
    pub second: &'static str,
    /// Net charge; a charged molecule dissociates into an ion of `first`.
    pub charge: i8,
    pub dissociation_ev: f64,
    /// Q at the registry partition-function temperatures.
    pub partition: [f64; 5],
}

const fn molecule(
    name: &'static str,
    first: &'static str,
    second: &'static str,
    dissociation_ev: f64,
    partition: [f64; 5],
) -> MoleculeRecord {
    MoleculeRecord {
        name,
        first,
        second,
        charge: 0,
        dissociation_ev,
        partition,
    }
}

pub const MOLECULE_TABLE: [MoleculeRecord; 18] = [
    molecule("H2", "H", "H", 4.4781, [8.83429e-1, 3.12970, 2.22684e1, 1.24852e2, 1.94871e2]),
    MoleculeRecord {
        name: "H2+",
        first: "H",
        second: "H",
        charge: 1,
        dissociation_ev: 2.6507,
        partition: [3.40918, 1.21361e1, 1.16205e2, 7.56297e2, 1.18728e3],
    },
    molecule("C2", "C", "C", 6.296, [2.53157e1, 2.08677e2, 6.75852e3, 6.15554e4, 1.07544e5]),
    molecule("CH", "C", "H", 3.465, [3.13181e1, 1.03985e2, 9.04412e2, 6.99662e3, 1.22732e4]),
    molecule("CO", "C", "O", 11.092, [4.73391e1, 1.81659e2, 1.71706e3, 9.67381e3, 1.50689e4]),
    molecule("CN", "C", "N", 7.76, [9.62592e1, 3.69706e2, 3.65207e3, 2.59277e4, 4.43257e4]),
    molecule("N2", "N", "N", 9.759, [2.28805e1, 8.76988e1, 7.89979e2, 4.32734e3, 6.68047e3]),
    molecule("NH", "N", "H", 3.47, [1.76430e1, 6.50991e1, 5.20090e2, 3.35774e3, 5.85785e3]),
    molecule("NO", "N", "O", 6.497, [1.38024e2, 7.06108e2, 8.21159e3, 4.97309e4, 7.94214e4]),
    molecule("O2", "O", "O", 5.116, [9.78808e1, 3.70966e2, 4.34427e3, 3.30098e4, 5.76869e4]),
    molecule("OH", "O", "H", 4.392, [2.54704e1, 8.07652e1, 5.77700e2, 3.11647e3, 5.02698e3]),
    molecule("MgH", "Mg", "H", 1.34, [3.22349e1, 1.24820e2, 1.69231e3, 1.72862e4, 3.16394e4]),
    molecule("SiO", "Si", "O", 8.26, [1.25136e2, 4.95316e2, 6.63653e3, 4.56577e4, 8.57529e4]),
    molecule("CaH", "Ca", "H", 1.70, [4.34133e1, 1.69692e2, 2.33105e3, 2.24220e4, 4.33139e4]),
    molecule("CaO", "Ca", "O", 4.8, [2.03667e2, 8.94430e2, 2.08874e4, 5.21424e5, 1.08355e6]),
    molecule("TiO", "Ti", "O", 6.87, [5.04547e2, 3.27426e3, 6.43969e4, 5.28755e5, 9.61395e5]),
    molecule("VO", "V", "O", 6.4, [6.62935e2, 2.70111e3, 4.15856e4, 3.57467e5, 6.53298e5]),
    molecule("FeO", "Fe", "O", 4.20, [1.85254e3, 7.52666e3, 1.23649e5, 9.55089e5, 1.58411e6]),
];

/// Natural log of the dissociation constant K = P_A P_B / P_AB (dyn/cm^2).
///
/// `ln_partition_first`/`ln_partition_second` are the partition functions of the
/// dissociation products at `temperature`; `reduced_mass` is in amu.
pub fn ln_dissociation_constant(
    temperature: f64,
    reduced_mass: f64,
    ln_partition_first: f64,
    ln_partition_second: f64,
    ln_partition_molecule: f64,
    dissociation_ev: f64,
) -> f64 {
    let kt = BOLTZMANN * temperature;
    let translational = 1.5 * (2.0 * PI * reduced_mass * AMU * kt / (PLANCK * PLANCK)).ln();
    translational + kt.ln() + ln_partition_first + ln_partition_second
        - ln_partition_molecule
        - dissociation_ev / (BOLTZMANN_EV * temperature)
}

#[cfg(test)]
mod tests {
    use super::{ln_dissociation_constant, MOLECULE_TABLE};
    use crate::common::constants::LN10;

    #[test]
    fn partition_functions_increase_with_temperature() {
        for record in MOLECULE_TABLE {
            for pair in record.partition.windows(2) {
                assert!(pair[1] > pair[0], "{} partition must increase", record.name);
            }
        }
    }

    #[test]
    fn hydrogen_molecule_constant_matches_tabulated_magnitude() {
        // log10 K_p(H2) at 3000 K is about 4.39 in dyn/cm^2 units.
        let ln_k = ln_dissociation_constant(
            3_000.0,
            0.5 * 1.007,
            2.0_f64.ln(),
            2.0_f64.ln(),
            2.22684e1_f64.ln(),
            4.4781,
        );
        let log10_k = ln_k / LN10;
        assert!((log10_k - 4.39).abs() < 0.01, "log10 K={log10_k}");
    }
}
