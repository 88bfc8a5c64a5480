pub mod config;
pub mod errors;
pub mod params;

use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

pub use config::EngineConfig;
pub use errors::{AtmosError, AtmosErrorCategory, AtmosResult};
pub use params::{ClampedParameter, StellarInput, StellarParameters};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    #[default]
    Serial,
    Parallel,
}

impl ExecutionMode {
    pub const fn is_parallel(self) -> bool {
        matches!(self, Self::Parallel)
    }

    /// Evaluate `kernel` for every index in `0..count`, preserving index order.
    ///
    /// Each call must be independent; results are gathered before returning.
    pub fn map_range<T, F>(self, count: usize, kernel: F) -> Vec<T>
    where
        T: Send,
        F: Fn(usize) -> T + Sync + Send,
    {
        match self {
            Self::Serial => (0..count).map(kernel).collect(),
            Self::Parallel => {
                use rayon::prelude::*;

                (0..count).into_par_iter().map(kernel).collect()
            }
        }
    }
}

/// Stages of the structure build, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineStage {
    SeedGuess,
    InnerElectronConverge,
    ChemistrySolve,
    OpacityBuild,
    PressureIntegrate,
    DepthScaleBuild,
    Converged,
}

impl EngineStage {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SeedGuess => "SEED",
            Self::InnerElectronConverge => "NE",
            Self::ChemistrySolve => "GAS",
            Self::OpacityBuild => "OPACITY",
            Self::PressureIntegrate => "HSE",
            Self::DepthScaleBuild => "DEPTH",
            Self::Converged => "DONE",
        }
    }
}

impl Display for EngineStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

/// Shared cancellation flag, polled between outer iterations.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
