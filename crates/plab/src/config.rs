use std::path::{Component, Path, PathBuf};

use plab_sav::CoordinateMode;

use crate::error::Result;

/// Overrides the directory save files are read from and written to.
pub const SAV_DIR_ENV: &str = "PLAB_SAV_DIR";

/// Default coordinate mode for element placement: `native` or `grid`.
pub const COORDINATE_MODE_ENV: &str = "PLAB_COORDINATE_MODE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabConfig {
    pub sav_dir: PathBuf,
    pub coordinate_mode: CoordinateMode,
}

impl LabConfig {
    pub fn new(sav_dir: impl Into<PathBuf>) -> Self {
        Self {
            sav_dir: sav_dir.into(),
            coordinate_mode: CoordinateMode::default(),
        }
    }

    pub fn from_env() -> Result<Self> {
        let sav_dir = match std::env::var_os(SAV_DIR_ENV) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => default_sav_dir()?,
        };
        let coordinate_mode = match std::env::var(COORDINATE_MODE_ENV) {
            Ok(mode) => mode.parse()?,
            Err(_) => CoordinateMode::default(),
        };
        Ok(Self {
            sav_dir: absolute(&sav_dir)?,
            coordinate_mode,
        })
    }

    pub fn with_sav_dir(mut self, sav_dir: impl Into<PathBuf>) -> Self {
        self.sav_dir = sav_dir.into();
        self
    }

    pub fn with_coordinate_mode(mut self, mode: CoordinateMode) -> Self {
        self.coordinate_mode = mode;
        self
    }
}

/// Where the simulator keeps its saves on this platform.
///
/// On Windows this is the app's own save folder; elsewhere saves go to
/// `physicsLabSav` under the working directory.
pub fn default_sav_dir() -> Result<PathBuf> {
    if cfg!(windows) {
        let home = dirs::home_dir().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine home directory",
            )
        })?;
        Ok(home
            .join("AppData")
            .join("LocalLow")
            .join("CIVITAS")
            .join("Quantum Physics")
            .join("Circuit"))
    } else {
        absolute(Path::new("physicsLabSav"))
    }
}

pub(crate) fn absolute(path: &Path) -> Result<PathBuf> {
    Ok(std::path::absolute(path)?)
}

/// Absolute form of `path` with `.`, `..` and symlinks resolved.
///
/// Files that do not exist yet resolve through their parent directory; if
/// that is missing too, `..` components are folded lexically.
pub(crate) fn normalize(path: &Path) -> Result<PathBuf> {
    let path = absolute(path)?;
    if let Ok(real) = path.canonicalize() {
        return Ok(real);
    }
    if let (Some(parent), Some(name)) = (path.parent(), path.file_name()) {
        if let Ok(parent) = parent.canonicalize() {
            return Ok(parent.join(name));
        }
    }
    let mut folded = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                folded.pop();
            }
            other => folded.push(other),
        }
    }
    Ok(folded)
}
