use std::path::{Path, PathBuf};

use assert_fs::TempDir;
use plab::{ExperimentStack, Lab, LabConfig};
use plab_sav::identifier::SAV_EXTENSION;
use walkdir::WalkDir;

/// Lab whose save directory is `dir`, with a stack of its own so tests
/// running in parallel do not see each other's experiments.
#[allow(unused)]
pub fn lab_in(dir: &TempDir) -> Lab {
    Lab::with_stack(LabConfig::new(dir.path()), ExperimentStack::new())
        .expect("lab should initialise")
}

/// Lab on the process-wide stack.
#[allow(unused)]
pub fn global_lab_in(dir: &TempDir) -> Lab {
    Lab::new(LabConfig::new(dir.path())).expect("lab should initialise")
}

/// Every `.sav` file directly under `dir`, sorted.
#[allow(unused)]
pub fn sav_files<P: AsRef<Path>>(dir: P) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.extension().is_some_and(|ext| ext == SAV_EXTENSION))
        .collect()
}
