//! Bessell UxBxBVRI and Bessell & Brett JHK filter transmission curves.
//!
//! Wavelengths are in nm, transmissions are normalized to a peak of 1.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhotometricBand {
    Ux,
    Bx,
    B,
    V,
    R,
    I,
    H,
    J,
    K,
}

impl PhotometricBand {
    pub const ALL: [PhotometricBand; 9] = [
        Self::Ux,
        Self::Bx,
        Self::B,
        Self::V,
        Self::R,
        Self::I,
        Self::H,
        Self::J,
        Self::K,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ux => "Ux",
            Self::Bx => "Bx",
            Self::B => "B",
            Self::V => "V",
            Self::R => "R",
            Self::I => "I",
            Self::H => "H",
            Self::J => "J",
            Self::K => "K",
        }
    }

    pub fn transmission_curve(self) -> &'static [(f64, f64)] {
        match self {
            Self::Ux => &UX_BAND,
            Self::Bx => &BX_BAND,
            Self::B => &B_BAND,
            Self::V => &V_BAND,
            Self::R => &R_BAND,
            Self::I => &I_BAND,
            Self::H => &H_BAND,
            Self::J => &J_BAND,
            Self::K => &K_BAND,
        }
    }
}

/// Color index definitions: (name, bluer band, redder band, Vega zero point).
pub const COLOR_INDICES: [(&str, PhotometricBand, PhotometricBand, f64); 7] = [
    ("Ux-Bx", PhotometricBand::Ux, PhotometricBand::Bx, 0.49),
    ("B-V", PhotometricBand::B, PhotometricBand::V, -0.58),
    ("V-R", PhotometricBand::V, PhotometricBand::R, 0.11),
    ("V-I", PhotometricBand::V, PhotometricBand::I, -0.51),
    ("R-I", PhotometricBand::R, PhotometricBand::I, -0.62),
    ("V-K", PhotometricBand::V, PhotometricBand::K, -3.17),
    ("J-K", PhotometricBand::J, PhotometricBand::K, -1.54),
];

const UX_BAND: [(f64, f64); 25] = [
    (300.0, 0.0), (305.0, 0.016), (310.0, 0.068), (315.0, 0.167),
    (320.0, 0.287), (325.0, 0.423), (330.0, 0.56), (335.0, 0.673),
    (340.0, 0.772), (345.0, 0.841), (350.0, 0.905), (355.0, 0.943),
    (360.0, 0.981), (365.0, 0.993), (370.0, 1.0), (375.0, 0.989),
    (380.0, 0.916), (385.0, 0.804), (390.0, 0.625), (395.0, 0.423),
    (400.0, 0.238), (405.0, 0.114), (410.0, 0.051), (415.0, 0.019),
    (420.0, 0.0),
];

const BX_BAND: [(f64, f64); 21] = [
    (360.0, 0.0), (370.0, 0.026), (380.0, 0.12), (390.0, 0.523),
    (400.0, 0.875), (410.0, 0.956), (420.0, 1.0), (430.0, 0.998),
    (440.0, 0.972), (450.0, 0.901), (460.0, 0.793), (470.0, 0.694),
    (480.0, 0.587), (490.0, 0.47), (500.0, 0.362), (510.0, 0.263),
    (520.0, 0.169), (530.0, 0.107), (540.0, 0.049), (550.0, 0.01),
    (560.0, 0.0),
];

const B_BAND: [(f64, f64); 21] = [
    (360.0, 0.0), (370.0, 0.03), (380.0, 0.134), (390.0, 0.567),
    (400.0, 0.92), (410.0, 0.978), (420.0, 1.0), (430.0, 0.978),
    (440.0, 0.935), (450.0, 0.853), (460.0, 0.74), (470.0, 0.64),
    (480.0, 0.536), (490.0, 0.424), (500.0, 0.325), (510.0, 0.235),
    (520.0, 0.15), (530.0, 0.095), (540.0, 0.043), (550.0, 0.009),
    (560.0, 0.0),
];

const V_BAND: [(f64, f64); 24] = [
    (470.0, 0.0), (480.0, 0.03), (490.0, 0.163), (500.0, 0.458),
    (510.0, 0.78), (520.0, 0.967), (530.0, 1.0), (540.0, 0.973),
    (550.0, 0.898), (560.0, 0.792), (570.0, 0.684), (580.0, 0.574),
    (590.0, 0.461), (600.0, 0.359), (610.0, 0.27), (620.0, 0.197),
    (630.0, 0.135), (640.0, 0.081), (650.0, 0.045), (660.0, 0.025),
    (670.0, 0.017), (680.0, 0.013), (690.0, 0.009), (700.0, 0.0),
];

const R_BAND: [(f64, f64); 24] = [
    (550.0, 0.0), (560.0, 0.23), (570.0, 0.74), (580.0, 0.91),
    (590.0, 0.98), (600.0, 1.0), (610.0, 0.98), (620.0, 0.96),
    (630.0, 0.93), (640.0, 0.9), (650.0, 0.86), (660.0, 0.81),
    (670.0, 0.78), (680.0, 0.72), (690.0, 0.67), (700.0, 0.61),
    (710.0, 0.56), (720.0, 0.51), (730.0, 0.46), (740.0, 0.4),
    (750.0, 0.35), (800.0, 0.14), (850.0, 0.03), (900.0, 0.0),
];

const I_BAND: [(f64, f64); 23] = [
    (700.0, 0.0), (710.0, 0.024), (720.0, 0.232), (730.0, 0.555),
    (740.0, 0.785), (750.0, 0.91), (760.0, 0.965), (770.0, 0.985),
    (780.0, 0.99), (790.0, 0.995), (800.0, 1.0), (810.0, 1.0),
    (820.0, 0.99), (830.0, 0.98), (840.0, 0.95), (850.0, 0.91),
    (860.0, 0.86), (870.0, 0.75), (880.0, 0.56), (890.0, 0.33),
    (900.0, 0.15), (910.0, 0.03), (920.0, 0.0),
];

const H_BAND: [(f64, f64); 25] = [
    (1460.0, 0.0), (1480.0, 0.15), (1500.0, 0.44), (1520.0, 0.86),
    (1540.0, 0.94), (1550.0, 0.96), (1560.0, 0.98), (1580.0, 0.95),
    (1600.0, 0.99), (1610.0, 0.99), (1620.0, 0.99), (1640.0, 0.99),
    (1660.0, 0.99), (1670.0, 0.99), (1680.0, 0.99), (1690.0, 0.99),
    (1700.0, 0.99), (1710.0, 0.97), (1720.0, 0.95), (1740.0, 0.87),
    (1760.0, 0.84), (1780.0, 0.71), (1800.0, 0.52), (1820.0, 0.02),
    (1840.0, 0.0),
];

const J_BAND: [(f64, f64); 25] = [
    (1040.0, 0.0), (1060.0, 0.02), (1080.0, 0.11), (1100.0, 0.42),
    (1120.0, 0.32), (1140.0, 0.47), (1160.0, 0.63), (1180.0, 0.73),
    (1190.0, 0.75), (1200.0, 0.77), (1210.0, 0.79), (1220.0, 0.81),
    (1230.0, 0.82), (1240.0, 0.83), (1250.0, 0.85), (1260.0, 0.88),
    (1280.0, 0.94), (1300.0, 0.91), (1320.0, 0.79), (1340.0, 0.68),
    (1360.0, 0.04), (1380.0, 0.11), (1400.0, 0.07), (1420.0, 0.03),
    (1440.0, 0.0),
];

const K_BAND: [(f64, f64); 25] = [
    (1940.0, 0.0), (1960.0, 0.12), (1980.0, 0.2), (2000.0, 0.3),
    (2020.0, 0.55), (2040.0, 0.74), (2060.0, 0.55), (2080.0, 0.77),
    (2100.0, 0.85), (2120.0, 0.9), (2140.0, 0.94), (2160.0, 0.94),
    (2180.0, 0.95), (2200.0, 0.94), (2220.0, 0.96), (2240.0, 0.98),
    (2260.0, 0.97), (2280.0, 0.96), (2300.0, 0.91), (2320.0, 0.88),
    (2340.0, 0.84), (2380.0, 0.75), (2400.0, 0.64), (2440.0, 0.01),
    (2480.0, 0.0),
];

#[cfg(test)]
mod tests {
    use super::PhotometricBand;

    #[test]
    fn transmission_curves_are_increasing_and_normalized() {
        for band in PhotometricBand::ALL {
            let curve = band.transmission_curve();
            assert!(curve.len() > 10, "{} curve too short", band.as_str());
            for pair in curve.windows(2) {
                assert!(pair[1].0 > pair[0].0, "{} not increasing", band.as_str());
            }
            let peak = curve.iter().map(|(_, t)| *t).fold(0.0_f64, f64::max);
            assert!(peak > 0.9 && peak <= 1.0, "{} peak {peak}", band.as_str());
        }
    }
}
