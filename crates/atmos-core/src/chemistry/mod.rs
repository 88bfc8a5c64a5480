//! Gas-phase chemistry: a fast estimator and the full equilibrium solver.

pub mod gas;
pub mod gasest;

pub use gas::{solve, ChemicalEquilibriumContext, ChemicalState, GasError, GasSeed};
pub use gasest::{estimate, GasEstimate};
