use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use once_cell::sync::Lazy;

use crate::error::{LabError, Result};

static GLOBAL: Lazy<ExperimentStack> = Lazy::new(ExperimentStack::new);

/// Registry of the save files that currently have an open [`crate::Experiment`].
///
/// Clones share the same registry. Every check-and-update happens under one
/// lock, so two handles can never open the same path.
#[derive(Debug, Clone, Default)]
pub struct ExperimentStack {
    open: Arc<Mutex<Vec<PathBuf>>>,
}

impl ExperimentStack {
    /// A fresh registry, shared only with its own clones.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry.
    pub fn global() -> Self {
        GLOBAL.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<PathBuf>> {
        self.open.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record `path` as open, failing with `AlreadyOpen` if it already is.
    pub fn push(&self, path: &Path) -> Result<()> {
        let mut open = self.lock();
        if open.iter().any(|p| p == path) {
            return Err(LabError::AlreadyOpen(path.to_path_buf()));
        }
        open.push(path.to_path_buf());
        Ok(())
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.lock().iter().any(|p| p == path)
    }

    pub fn remove(&self, path: &Path) -> bool {
        let mut open = self.lock();
        match open.iter().position(|p| p == path) {
            Some(i) => {
                open.remove(i);
                true
            }
            None => false,
        }
    }

    /// Empty the registry, returning the paths that were still open.
    pub fn drain(&self) -> Vec<PathBuf> {
        std::mem::take(&mut *self.lock())
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
