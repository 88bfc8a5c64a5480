//! One-dimensional plane-parallel LTE model atmospheres and spectrum synthesis.

pub mod atmosphere;
pub mod chemistry;
pub mod common;
pub mod domain;
pub mod ionization;
pub mod lines;
pub mod numerics;
pub mod opacity;
pub mod registry;
pub mod synthesis;
pub mod transfer;

pub use domain::{AtmosError, AtmosErrorCategory, AtmosResult, EngineConfig, ExecutionMode};
pub use synthesis::{Engine, LineReport, SpectrumReport};
