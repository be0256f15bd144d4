use std::path::PathBuf;

use plab_sav::SavError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LabError {
    #[error(transparent)]
    Sav(#[from] SavError),

    #[error("No experiment named '{name}' in {}", dir.display())]
    ExperimentNotFound { name: String, dir: PathBuf },

    #[error("Save file does not exist: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("An experiment named '{0}' already exists")]
    AlreadyExists(String),

    #[error("Experiment is already open: {}", .0.display())]
    AlreadyOpen(PathBuf),

    #[error("Experiment has already been exited: {}", .0.display())]
    Closed(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Remote experiment source failed: {0:#}")]
    Remote(anyhow::Error),
}

pub type Result<T> = std::result::Result<T, LabError>;
