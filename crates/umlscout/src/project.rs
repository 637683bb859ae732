//! Project root validation and title metadata

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::core::ScanError;
use crate::dialects::{Dialect, DialectId};

/// The subset of a `.uproject` descriptor the title needs
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct UnrealDescriptor {
    engine_association: Option<String>,
}

/// A validated project directory
#[derive(Debug, Clone)]
pub struct ProjectRoot {
    path: PathBuf,
    dialect: DialectId,
}

impl ProjectRoot {
    /// Check the preconditions a dialect places on a project root
    ///
    /// # Errors
    /// - [`ScanError::MissingProjectRoot`] if `path` is not a directory
    /// - [`ScanError::MissingExpectedMarker`] if the dialect's marker entry is absent
    pub fn open(path: impl AsRef<Path>, dialect: &Dialect) -> Result<Self, ScanError> {
        let path = path.as_ref();
        if !path.is_dir() {
            return Err(ScanError::missing_root(path));
        }
        if let Some(marker) = dialect.required_marker {
            if !path.join(marker).exists() {
                return Err(ScanError::missing_marker(path, format!("{}/", marker)));
            }
        }
        info!(root = %path.display(), dialect = %dialect.id, "Project root validated");
        Ok(Self {
            path: path.to_path_buf(),
            dialect: dialect.id,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory that holds the sources: the marker directory when the dialect has one
    pub fn source_dir(&self) -> PathBuf {
        match Dialect::get(self.dialect).required_marker {
            Some(marker) => self.path.join(marker),
            None => self.path.clone(),
        }
    }

    /// Diagram title derived from the project
    pub fn title(&self) -> String {
        match self.dialect {
            DialectId::Unreal => self.unreal_title(),
            DialectId::Cpp | DialectId::CSharp => self.dir_name(),
        }
    }

    fn dir_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Project".to_string())
    }

    fn unreal_title(&self) -> String {
        let search = std::iter::once(self.path.as_path()).chain(self.path.parent());
        let descriptor = search.filter_map(find_uproject).next();

        let (name, version) = match descriptor {
            Some(file) => {
                let name = file
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "Project".to_string());
                let version = read_descriptor(&file)
                    .engine_association
                    .filter(|v| !v.is_empty())
                    .unwrap_or_else(|| "Unknown".to_string());
                (name, version)
            }
            None => {
                debug!(root = %self.path.display(), "No .uproject descriptor found");
                ("Project".to_string(), "Unknown".to_string())
            }
        };
        format!("{} - Unreal Engine {}", name, version)
    }
}

/// First `*.uproject` in `dir`, by file name
fn find_uproject(dir: &Path) -> Option<PathBuf> {
    let entries = fs::read_dir(dir).ok()?;
    let mut candidates: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("uproject"))
        })
        .collect();
    candidates.sort();
    candidates.into_iter().next()
}

fn read_descriptor(path: &Path) -> UnrealDescriptor {
    let parsed = fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|text| serde_json::from_str(&text).map_err(|e| e.to_string()));
    match parsed {
        Ok(descriptor) => descriptor,
        Err(error) => {
            warn!(file = %path.display(), %error, "Unreadable .uproject descriptor");
            UnrealDescriptor::default()
        }
    }
}
