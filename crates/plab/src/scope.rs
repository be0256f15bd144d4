use std::path::PathBuf;

use plab_sav::ExperimentType;

use crate::error::Result;
use crate::experiment::{Experiment, OpenMode};
use crate::{sav_file, Lab};

/// What a scoped experiment does around the caller's closure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeOptions {
    /// Remove every element and wire before the closure runs.
    pub clear_elements: bool,
    /// Delete the save file on exit instead of writing it.
    pub delete: bool,
    /// Save on a successful exit.
    pub write: bool,
    /// Also write the save here.
    pub extra_path: Option<PathBuf>,
}

impl Default for ScopeOptions {
    fn default() -> Self {
        Self {
            clear_elements: false,
            delete: false,
            write: true,
            extra_path: None,
        }
    }
}

impl Lab {
    /// Open an experiment, run `f` on it, then exit.
    ///
    /// If `f` succeeds and did not exit the experiment itself, it is saved
    /// (unless `options` say otherwise) before exiting. If `f` fails nothing
    /// is saved. The stack entry is released in every case.
    pub fn scope<T>(
        &self,
        mode: OpenMode<'_>,
        options: ScopeOptions,
        f: impl FnOnce(&mut Experiment) -> Result<T>,
    ) -> Result<T> {
        let mut experiment = self.open(mode)?;
        if options.clear_elements {
            experiment.clear_elements()?;
        }

        let value = match f(&mut experiment) {
            Ok(value) => value,
            Err(err) => {
                if experiment.is_open() {
                    log::debug!(
                        "Leaving {} without saving: {err}",
                        experiment.path().display()
                    );
                    experiment.exit(false)?;
                }
                return Err(err);
            }
        };

        if experiment.is_open() {
            let saved = if options.write && !options.delete {
                experiment.save(options.extra_path.as_deref())
            } else {
                Ok(())
            };
            experiment.exit(options.delete)?;
            saved?;
        }
        Ok(value)
    }

    /// Scoped access to the experiment called `name`, creating it (as
    /// `experiment_type`) if no save has that name yet.
    pub fn with_experiment<T>(
        &self,
        name: &str,
        experiment_type: ExperimentType,
        options: ScopeOptions,
        f: impl FnOnce(&mut Experiment) -> Result<T>,
    ) -> Result<T> {
        let mode = match sav_file::search_by_name(&self.config().sav_dir, name) {
            Some(path) => OpenMode::LoadByPath(path),
            None => OpenMode::create(name, experiment_type),
        };
        self.scope(mode, options, f)
    }
}
