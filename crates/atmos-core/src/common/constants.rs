//! Physical constants in cgs units shared by every kernel.
//!
//! Kernels take their constants from here instead of carrying local literals.

pub const PI: f64 = std::f64::consts::PI;
pub const LN10: f64 = std::f64::consts::LN_10;
pub const LOG10E: f64 = std::f64::consts::LOG10_E;

/// Speed of light (cm/s).
pub const C_LIGHT: f64 = 2.997_924_58e10;
/// Speed of light (nm/s).
pub const C_LIGHT_NM: f64 = 2.997_924_58e17;
/// Planck constant (erg s).
pub const PLANCK: f64 = 6.626_069_57e-27;
/// Boltzmann constant (erg/K).
pub const BOLTZMANN: f64 = 1.380_648_8e-16;
/// Boltzmann constant (eV/K).
pub const BOLTZMANN_EV: f64 = 8.617_332_4e-5;
/// Electron volt (erg).
pub const EV: f64 = 1.602_176_565e-12;
/// Atomic mass unit (g).
pub const AMU: f64 = 1.660_538_92e-24;
/// Electron mass (g).
pub const ELECTRON_MASS: f64 = 9.109_382_91e-28;
/// Elementary charge (esu).
pub const ELECTRON_CHARGE: f64 = 4.803_204_25e-10;
/// Stefan-Boltzmann constant (erg/cm2/s/K4).
pub const STEFAN_BOLTZMANN: f64 = 5.670_373e-5;
/// Newtonian gravitational constant (cgs).
pub const GRAVITATION: f64 = 6.673_84e-8;
pub const SOLAR_MASS: f64 = 1.989_1e33;
pub const SOLAR_RADIUS: f64 = 6.955e10;
/// Radiation constant 4 sigma / c.
pub const RADIATION_DENSITY: f64 = 4.0 * STEFAN_BOLTZMANN / C_LIGHT;
/// Classical line absorption constant pi e^2 / (m_e c) (cm2/s).
pub const PI_E2_OVER_MC: f64 = PI * ELECTRON_CHARGE * ELECTRON_CHARGE / (ELECTRON_MASS * C_LIGHT);
/// hc in eV nm.
pub const HC_EV_NM: f64 = 1_239.841_93;
/// Thomson cross section (cm2).
pub const THOMSON_CROSS_SECTION: f64 = 0.6648e-24;
/// 5040 K eV, the theta = 5040 / T scale.
pub const THETA_SCALE: f64 = 5_040.0;
