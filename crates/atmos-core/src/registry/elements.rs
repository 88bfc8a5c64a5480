//! Static atomic data: masses, ionization energies, partition functions and the
//! Grevesse & Sauval (1998) solar abundance scale.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementRecord {
    pub symbol: &'static str,
    pub atomic_number: u8,
    /// Atomic mass (amu).
    pub mass: f64,
    /// Successive ionization energies (eV) for I -> II, II -> III, ...
    pub ionization_ev: &'static [f64],
    /// log10 partition function per stage I..III at theta = 1.0 and theta = 0.5.
    pub log10_partition: [[f64; 2]; 3],
    pub solar_a12: f64,
}

const fn record(
    symbol: &'static str,
    atomic_number: u8,
    mass: f64,
    ionization_ev: &'static [f64],
    log10_partition: [[f64; 2]; 3],
    solar_a12: f64,
) -> ElementRecord {
    ElementRecord {
        symbol,
        atomic_number,
        mass,
        ionization_ev,
        log10_partition,
        solar_a12,
    }
}

pub const ELEMENT_TABLE: [ElementRecord; 36] = [
    record("H", 1, 1.007, &[13.598434], [[0.30, 0.30], [0.0, 0.0], [0.0, 0.0]], 12.00),
    record(
        "He",
        2,
        4.002,
        &[24.587388, 54.417763],
        [[0.0, 0.0], [0.30, 0.30], [0.0, 0.0]],
        10.93,
    ),
    record(
        "Li",
        3,
        6.938,
        &[5.391715, 75.640094, 122.454354],
        [[0.32, 0.49], [0.0, 0.0], [0.30103, 0.30103]],
        1.10,
    ),
    record(
        "Be",
        4,
        9.012,
        &[9.322699, 18.211153, 153.896198, 217.718577],
        [[0.01, 0.13], [0.30, 0.30], [0.0, 0.0]],
        1.40,
    ),
    record(
        "B",
        5,
        10.806,
        &[8.298019, 25.15483, 37.93058, 259.3715],
        [[0.78, 0.78], [0.0, 0.0], [0.30103, 0.30103]],
        2.55,
    ),
    record(
        "C",
        6,
        12.0096,
        &[11.2603, 24.3845, 47.88778, 64.49351],
        [[0.97, 1.0], [0.78, 0.78], [0.0, 0.0]],
        8.52,
    ),
    record(
        "N",
        7,
        14.006,
        &[14.53413, 29.60125, 47.4453, 77.4735],
        [[0.61, 0.66], [0.95, 0.97], [0.77815, 0.77815]],
        7.92,
    ),
    record(
        "O",
        8,
        15.999,
        &[13.618054, 35.12111, 54.93554, 77.4135],
        [[0.94, 0.97], [0.60, 0.61], [0.95424, 0.95424]],
        8.83,
    ),
    record(
        "F",
        9,
        18.998,
        &[17.42282, 34.97081, 62.708, 87.175],
        [[0.75, 0.77], [0.92, 0.94], [0.60206, 0.60206]],
        4.56,
    ),
    record(
        "Ne",
        10,
        20.1797,
        &[21.56454, 40.96296, 63.42331, 97.19],
        [[0.0, 0.0], [0.73, 0.75], [0.95424, 0.95424]],
        8.08,
    ),
    record(
        "Na",
        11,
        22.989,
        &[5.1390767, 47.28636, 71.62, 98.936],
        [[0.31, 0.60], [0.0, 0.0], [0.77815, 0.77815]],
        6.33,
    ),
    record(
        "Mg",
        12,
        24.304,
        &[7.646235, 15.035267, 80.1436, 109.2654],
        [[0.01, 0.15], [0.31, 0.31], [0.0, 0.0]],
        7.58,
    ),
    record(
        "Al",
        13,
        26.981,
        &[5.9857684, 18.82855, 28.44764, 119.9924],
        [[0.77, 0.81], [0.0, 0.01], [0.30103, 0.30103]],
        6.47,
    ),
    record(
        "Si",
        14,
        28.084,
        &[8.151683, 16.345845, 33.493, 45.14179],
        [[0.98, 1.04], [0.76, 0.77], [0.0, 0.0]],
        7.55,
    ),
    record(
        "P",
        15,
        30.973,
        &[10.486686, 19.76949, 30.20264, 51.44387],
        [[0.65, 0.79], [0.91, 0.94], [0.77815, 0.77815]],
        5.45,
    ),
    record(
        "S",
        16,
        32.059,
        &[10.36001, 23.33788, 34.856, 47.222],
        [[0.91, 0.94], [0.62, 0.72], [0.95424, 0.95424]],
        7.33,
    ),
    record(
        "Cl",
        17,
        35.446,
        &[12.967632, 23.81364, 39.8, 53.24],
        [[0.72, 0.75], [0.89, 0.92], [0.60206, 0.60206]],
        5.50,
    ),
    record(
        "Ar",
        18,
        39.948,
        &[15.7596112, 27.62967, 40.735, 59.58],
        [[0.0, 0.0], [0.69, 0.71], [0.95424, 0.95424]],
        6.40,
    ),
    record(
        "K",
        19,
        39.0983,
        &[4.34066354, 31.625, 45.8031, 60.917],
        [[0.34, 0.60], [0.0, 0.0], [0.77815, 0.77815]],
        5.12,
    ),
    record(
        "Ca",
        20,
        40.078,
        &[6.1131552, 11.871718, 50.91315, 67.273],
        [[0.07, 0.55], [0.34, 0.54], [0.0, 0.0]],
        6.36,
    ),
    record(
        "Sc",
        21,
        44.955,
        &[6.56149, 12.79977, 24.756838, 73.4894],
        [[1.08, 1.49], [1.36, 1.52], [1.0, 1.0]],
        3.17,
    ),
    record(
        "Ti",
        22,
        47.867,
        &[6.82812, 13.5755, 27.49171, 43.26717],
        [[1.48, 1.88], [1.75, 1.92], [1.32222, 1.32222]],
        5.02,
    ),
    record(
        "V",
        23,
        50.942,
        &[6.746187, 14.62, 29.311, 46.709],
        [[1.62, 2.03], [1.64, 1.89], [1.44716, 1.44716]],
        4.00,
    ),
    record(
        "Cr",
        24,
        51.9961,
        &[6.76651, 16.486305, 30.96, 49.16],
        [[1.02, 1.51], [0.86, 1.22], [1.39794, 1.39794]],
        5.67,
    ),
    record(
        "Mn",
        25,
        54.938,
        &[7.4340377, 15.63999, 33.668, 51.2],
        [[0.81, 1.16], [0.89, 1.13], [0.77815, 0.77815]],
        5.39,
    ),
    record(
        "Fe",
        26,
        55.845,
        &[7.9024678, 16.1992, 30.651, 54.91],
        [[1.43, 1.74], [1.63, 1.80], [1.39794, 1.39794]],
        7.50,
    ),
    record(
        "Co",
        27,
        58.933,
        &[7.88101, 17.084, 33.5, 51.27],
        [[1.52, 1.76], [0.0, 0.0], [1.44716, 1.44716]],
        4.92,
    ),
    record(
        "Ni",
        28,
        58.6934,
        &[7.639877, 18.168837, 35.19, 54.9],
        [[1.47, 1.60], [1.02, 1.28], [1.32222, 1.32222]],
        6.25,
    ),
    record(
        "Cu",
        29,
        63.546,
        &[7.72638, 20.29239, 36.841, 57.38],
        [[0.36, 0.58], [0.01, 0.18], [1.0, 1.0]],
        4.21,
    ),
    record(
        "Zn",
        30,
        65.38,
        &[9.394197, 17.96439, 39.723, 59.573],
        [[0.0, 0.03], [0.30, 0.30], [0.0, 0.0]],
        4.60,
    ),
    record(
        "Rb",
        37,
        85.4678,
        &[4.177128, 27.28954, 39.247, 52.2],
        [[0.36, 0.70], [0.0, 0.0], [0.77815, 0.77815]],
        2.60,
    ),
    record(
        "Sr",
        38,
        87.62,
        &[5.6948672, 11.030276, 42.88353, 56.28],
        [[0.10, 0.70], [0.34, 0.53], [0.0, 0.0]],
        2.97,
    ),
    record(
        "Y",
        39,
        88.905,
        &[6.21726, 12.224, 20.52441, 60.607],
        [[1.08, 1.50], [1.18, 1.41], [1.0, 1.0]],
        2.24,
    ),
    record(
        "Zr",
        40,
        91.224,
        &[6.6339, 13.13, 23.17, 34.41836],
        [[1.53, 1.99], [1.66, 1.91], [1.32222, 1.32222]],
        2.60,
    ),
    record(
        "Ba",
        56,
        137.327,
        &[5.211664, 10.003826, 35.84, 47.03],
        [[0.36, 0.92], [0.62, 0.85], [0.0, 0.0]],
        2.13,
    ),
    record(
        "La",
        57,
        138.905,
        &[5.5769, 11.18492, 19.1773, 49.95],
        [[1.41, 1.85], [1.47, 1.71], [1.0, 1.0]],
        1.17,
    ),
];

/// Elements enhanced by an [alpha/Fe] offset.
pub const ALPHA_ELEMENTS: [&str; 8] = ["O", "Ne", "Mg", "Si", "S", "Ar", "Ca", "Ti"];

#[cfg(test)]
mod tests {
    use super::ELEMENT_TABLE;

    #[test]
    fn element_table_is_ordered_and_physical() {
        for pair in ELEMENT_TABLE.windows(2) {
            assert!(pair[1].atomic_number > pair[0].atomic_number);
            // Ar/K and Co/Ni are the real mass inversions in the table's range.
            let inverted = matches!((pair[0].symbol, pair[1].symbol), ("Ar", "K") | ("Co", "Ni"));
            assert!(
                pair[1].mass > pair[0].mass || inverted,
                "{} -> {} masses decrease",
                pair[0].symbol,
                pair[1].symbol
            );
        }
        for element in ELEMENT_TABLE {
            assert!(!element.ionization_ev.is_empty());
            for pair in element.ionization_ev.windows(2) {
                assert!(
                    pair[1] > pair[0],
                    "{} ionization energies must increase",
                    element.symbol
                );
            }
            assert!(element.solar_a12 <= 12.0);
        }
    }
}
