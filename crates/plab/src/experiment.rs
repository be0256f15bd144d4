use std::path::{Path, PathBuf};

use plab_sav::identifier::{SAV_EXTENSION, new_sav_file_name};
use plab_sav::{
    CoordinateMode, Element, ElementId, ExperimentGraph, ExperimentType,
    InstrumentSettings, Pin, Position, SaveDocument, Wire, WireColor,
};

use crate::error::{LabError, Result};
use crate::remote::{self, Category, ExperimentSource};
use crate::sav_file;
use crate::Lab;

/// How [`Lab::open`] finds or creates the experiment.
pub enum OpenMode<'a> {
    /// Start a blank experiment. An existing experiment with the same name is
    /// an error unless `force` is set, in which case its file and preview
    /// image are deleted first.
    CreateNew {
        name: String,
        experiment_type: ExperimentType,
        force: bool,
    },
    /// Open the save in the lab directory whose `InternalName` matches.
    LoadByName(String),
    LoadByPath(PathBuf),
    /// Download a published experiment; it is saved as `<content_id>.sav`.
    LoadRemote {
        content_id: String,
        category: Category,
        source: &'a dyn ExperimentSource,
    },
}

impl OpenMode<'_> {
    pub fn create(name: impl Into<String>, experiment_type: ExperimentType) -> Self {
        OpenMode::CreateNew {
            name: name.into(),
            experiment_type,
            force: false,
        }
    }

    pub fn by_name(name: impl Into<String>) -> Self {
        OpenMode::LoadByName(name.into())
    }

    pub fn by_path(path: impl Into<PathBuf>) -> Self {
        OpenMode::LoadByPath(path.into())
    }
}

pub(crate) fn resolve(lab: &Lab, mode: OpenMode<'_>) -> Result<(PathBuf, SaveDocument)> {
    let sav_dir = &lab.config().sav_dir;
    match mode {
        OpenMode::CreateNew {
            name,
            experiment_type,
            force,
        } => {
            if let Some(existing) = sav_file::search_by_name(sav_dir, &name) {
                if !force {
                    return Err(LabError::AlreadyExists(name));
                }
                if lab.stack().contains(&existing) {
                    return Err(LabError::AlreadyOpen(existing));
                }
                log::info!("Overwriting experiment '{name}' at {}", existing.display());
                sav_file::remove_with_preview(&existing)?;
            }
            let mut document = SaveDocument::new(experiment_type);
            document.entitle(&name);
            Ok((sav_dir.join(new_sav_file_name()), document))
        }
        OpenMode::LoadByName(name) => {
            let path = sav_file::search_by_name(sav_dir, &name).ok_or_else(|| {
                LabError::ExperimentNotFound {
                    name,
                    dir: sav_dir.clone(),
                }
            })?;
            let document = sav_file::read_document(&path)?;
            Ok((path, document))
        }
        OpenMode::LoadByPath(path) => {
            let path = crate::config::normalize(&path)?;
            let document = sav_file::read_document(&path)?;
            Ok((path, document))
        }
        OpenMode::LoadRemote {
            content_id,
            category,
            source,
        } => {
            let path = sav_dir.join(format!("{content_id}.{SAV_EXTENSION}"));
            if lab.stack().contains(&path) {
                return Err(LabError::AlreadyOpen(path));
            }
            let document = remote::fetch_document(source, &content_id, category)?;
            Ok((path, document))
        }
    }
}

/// An open experiment, registered on the lab's [`crate::ExperimentStack`].
///
/// Dropping the handle without calling [`Experiment::exit`] releases the
/// stack entry but does not save.
pub struct Experiment {
    path: PathBuf,
    document: SaveDocument,
    graph: ExperimentGraph,
    lab: Lab,
    element_xyz: bool,
    open: bool,
}

impl Experiment {
    pub(crate) fn new(lab: &Lab, path: PathBuf, document: SaveDocument) -> Result<Self> {
        let path = crate::config::normalize(&path)?;
        let graph = document.decode(lab.catalogue())?;
        lab.stack().push(&path)?;
        log::info!(
            "Opened {} experiment {}",
            graph.experiment_type(),
            path.display()
        );
        Ok(Self {
            path,
            document,
            graph,
            lab: lab.clone(),
            element_xyz: false,
            open: true,
        })
    }

    fn ensure_open(&self) -> Result<()> {
        if self.open {
            Ok(())
        } else {
            Err(LabError::Closed(self.path.clone()))
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn experiment_type(&self) -> ExperimentType {
        self.graph.experiment_type()
    }

    pub fn name(&self) -> Option<&str> {
        self.document.internal_name()
    }

    pub fn document(&self) -> &SaveDocument {
        &self.document
    }

    pub fn graph(&self) -> &ExperimentGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> Result<&mut ExperimentGraph> {
        self.ensure_open()?;
        Ok(&mut self.graph)
    }

    pub fn entitle(&mut self, name: &str) -> Result<&mut Self> {
        self.ensure_open()?;
        self.document.entitle(name);
        Ok(self)
    }

    pub fn set_description<S: AsRef<str>>(&mut self, lines: &[S]) -> Result<&mut Self> {
        self.ensure_open()?;
        self.document.set_description(lines);
        Ok(self)
    }

    /// Interpret element coordinates of this experiment in grid units.
    ///
    /// Circuit only. `origin`, in native units, is where grid `(0, 0, 0)` lies.
    pub fn set_element_xyz(&mut self, enabled: bool, origin: Option<Position>) -> Result<()> {
        self.ensure_open()?;
        self.graph
            .experiment_type()
            .require(ExperimentType::Circuit)?;
        if let Some(origin) = origin {
            self.graph.set_grid_origin(origin)?;
        }
        self.element_xyz = enabled;
        Ok(())
    }

    /// Mode applied when a call does not name one.
    pub fn coordinate_mode(&self) -> CoordinateMode {
        if self.element_xyz {
            CoordinateMode::Grid
        } else {
            self.lab.config().coordinate_mode
        }
    }

    pub fn create_element(&mut self, name: &str, x: f64, y: f64, z: f64) -> Result<ElementId> {
        let mode = self.coordinate_mode();
        self.create_element_in(name, x, y, z, mode)
    }

    pub fn create_element_in(
        &mut self,
        name: &str,
        x: f64,
        y: f64,
        z: f64,
        mode: CoordinateMode,
    ) -> Result<ElementId> {
        self.ensure_open()?;
        Ok(self
            .graph
            .create_element(self.lab.catalogue(), name, x, y, z, mode)?)
    }

    pub fn create_instrument(
        &mut self,
        x: f64,
        y: f64,
        z: f64,
        settings: InstrumentSettings,
    ) -> Result<ElementId> {
        self.ensure_open()?;
        let mode = self.coordinate_mode();
        Ok(self
            .graph
            .create_instrument(self.lab.catalogue(), x, y, z, mode, settings)?)
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.graph.element(id)
    }

    pub fn element_by_identifier(&self, identifier: &str) -> Option<ElementId> {
        self.graph.elements().find_by_identifier(identifier)
    }

    /// Elements at `(x, y, z)` in this experiment's current coordinate mode.
    pub fn elements_at(&self, x: f64, y: f64, z: f64) -> Result<Vec<&Element>> {
        Ok(self.graph.elements_at(x, y, z, self.coordinate_mode())?)
    }

    pub fn move_element(&mut self, id: ElementId, x: f64, y: f64, z: f64) -> Result<()> {
        self.ensure_open()?;
        let mode = self.coordinate_mode();
        Ok(self.graph.move_element(id, x, y, z, mode)?)
    }

    pub fn remove_element(&mut self, id: ElementId) -> Result<Element> {
        self.ensure_open()?;
        Ok(self.graph.remove_element(id)?)
    }

    pub fn clear_elements(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.graph.clear_elements();
        Ok(())
    }

    pub fn connect(&mut self, a: Pin, b: Pin, color: WireColor) -> Result<Wire> {
        self.ensure_open()?;
        Ok(self.graph.connect(a, b, color)?)
    }

    pub fn disconnect(&mut self, wire: &Wire) -> Result<bool> {
        self.ensure_open()?;
        Ok(self.graph.disconnect(wire)?)
    }

    pub fn clear_wires(&mut self) -> Result<()> {
        self.ensure_open()?;
        Ok(self.graph.clear_wires()?)
    }

    /// Encode and write the experiment to its path, and also to `extra_path`
    /// when given. The experiment stays open.
    pub fn save(&mut self, extra_path: Option<&Path>) -> Result<()> {
        self.ensure_open()?;
        self.document.encode(&self.graph)?;
        sav_file::write_document(&self.path, &self.document)?;
        if let Some(extra) = extra_path {
            sav_file::write_document(extra, &self.document)?;
        }
        log::info!(
            "Saved {} ({} element(s), {} wire(s))",
            self.path.display(),
            self.graph.elements().len(),
            self.graph.wires().len()
        );
        Ok(())
    }

    /// Close the experiment, optionally deleting its file and preview image.
    pub fn exit(&mut self, delete: bool) -> Result<()> {
        self.ensure_open()?;
        self.open = false;
        self.lab.stack().remove(&self.path);
        log::info!("Exited {}", self.path.display());
        if delete {
            sav_file::remove_with_preview(&self.path)?;
        }
        Ok(())
    }
}

impl Drop for Experiment {
    fn drop(&mut self) {
        if self.open && self.lab.stack().remove(&self.path) {
            log::debug!("Released {} without exit", self.path.display());
        }
    }
}
