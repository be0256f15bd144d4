//! Lifecycle management for Physics-Lab experiments.
//!
//! A [`Lab`] ties together the save directory, the element catalogue and the
//! [`ExperimentStack`] of open files. Experiments are opened through
//! [`Lab::open`] with one of the [`OpenMode`]s, edited through the returned
//! [`Experiment`] handle, then saved and exited. [`Lab::scope`] and
//! [`Lab::with_experiment`] wrap that sequence around a closure.
//!
//! ```no_run
//! use plab::{Lab, LabConfig, OpenMode, ScopeOptions};
//! use plab_sav::{ExperimentType, Pin, WireColor};
//!
//! # fn main() -> plab::Result<()> {
//! let lab = Lab::new(LabConfig::from_env()?)?;
//! lab.scope(OpenMode::create("T1", ExperimentType::Circuit), ScopeOptions::default(), |exp| {
//!     exp.set_element_xyz(true, None)?;
//!     let a = exp.create_element("Logic Input", 0.0, 0.0, 0.0)?;
//!     let b = exp.create_element("Logic Output", 1.0, 0.0, 0.0)?;
//!     exp.connect(Pin::new(a, 0), Pin::new(b, 0), WireColor::Blue)?;
//!     Ok(())
//! })?;
//! lab.shutdown();
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod experiment;
pub mod remote;
pub mod sav_file;
pub mod scope;
pub mod stack;

use std::path::PathBuf;
use std::sync::Arc;

use plab_sav::Catalogue;

pub use config::LabConfig;
pub use error::{LabError, Result};
pub use experiment::{Experiment, OpenMode};
pub use remote::{Category, ExperimentSource};
pub use scope::ScopeOptions;
pub use stack::ExperimentStack;

/// Process-wide state shared by every open experiment.
///
/// Cloning is cheap; clones share the stack and the catalogue.
#[derive(Debug, Clone)]
pub struct Lab {
    config: Arc<LabConfig>,
    stack: ExperimentStack,
    catalogue: Arc<Catalogue>,
}

impl Lab {
    /// Create the lab, making sure the save directory exists.
    ///
    /// Open experiments are tracked on [`ExperimentStack::global`], so labs
    /// created this way never open the same file twice.
    pub fn new(config: LabConfig) -> Result<Self> {
        Self::with_stack(config, ExperimentStack::global())
    }

    /// Like [`Lab::new`], but track open experiments on `stack`.
    pub fn with_stack(mut config: LabConfig, stack: ExperimentStack) -> Result<Self> {
        std::fs::create_dir_all(&config.sav_dir)?;
        config.sav_dir = config::normalize(&config.sav_dir)?;
        log::debug!("Using save directory {}", config.sav_dir.display());
        Ok(Self {
            config: Arc::new(config),
            stack,
            catalogue: Arc::new(Catalogue::builtin().clone()),
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(LabConfig::from_env()?)
    }

    /// Replace the element catalogue, e.g. to register extra models.
    pub fn with_catalogue(mut self, catalogue: Catalogue) -> Self {
        self.catalogue = Arc::new(catalogue);
        self
    }

    pub fn config(&self) -> &LabConfig {
        &self.config
    }

    pub fn stack(&self) -> &ExperimentStack {
        &self.stack
    }

    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    pub fn open(&self, mode: OpenMode<'_>) -> Result<Experiment> {
        let (path, document) = experiment::resolve(self, mode)?;
        Experiment::new(self, path, document)
    }

    /// Tear the lab down, returning the paths that were still open on its
    /// stack. For the global stack that includes other labs' experiments.
    pub fn shutdown(self) -> Vec<PathBuf> {
        let leftover = self.stack.drain();
        for path in &leftover {
            log::warn!("Experiment still open at shutdown: {}", path.display());
        }
        leftover
    }
}
