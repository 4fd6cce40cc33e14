use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Formula -> short molecule name for one project (e.g. `"C3H4O3" -> "EC"`).
pub type ProjectNames = BTreeMap<String, String>;

/// Persistent store of molecule names, keyed by project.
///
/// The registry is an explicit value: it is loaded once, passed by reference
/// to whatever needs names, mutated through its methods, and written back
/// only when [`NameRegistry::save`] is called.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NameRegistry {
    projects: BTreeMap<String, ProjectNames>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let content = std::fs::read_to_string(path).map_err(|e| RegistryError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let registry: NameRegistry =
            serde_json::from_str(&content).map_err(|e| RegistryError::Json {
                path: path.to_string_lossy().to_string(),
                source: e,
            })?;
        debug!(
            "Loaded name registry with {} project(s) from {:?}",
            registry.projects.len(),
            path
        );
        Ok(registry)
    }

    /// Loads the registry at `path`, or starts an empty one if no file exists yet.
    ///
    /// Any other failure (unreadable file, malformed JSON) is still an error.
    pub fn load_or_empty(path: &Path) -> Result<Self, RegistryError> {
        if path.exists() {
            Self::load(path)
        } else {
            info!("No name registry at {:?}, starting an empty one.", path);
            Ok(Self::new())
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), RegistryError> {
        let io_err = |e| RegistryError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(io_err)?;
            }
        }
        let content = serde_json::to_string_pretty(self).map_err(|e| RegistryError::Json {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        std::fs::write(path, content).map_err(io_err)?;
        debug!("Saved name registry to {:?}", path);
        Ok(())
    }

    pub fn project(&self, project: &str) -> Option<&ProjectNames> {
        self.projects.get(project)
    }

    pub fn projects(&self) -> impl Iterator<Item = (&str, &ProjectNames)> {
        self.projects.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn name_for(&self, project: &str, formula: &str) -> Option<&str> {
        self.projects
            .get(project)
            .and_then(|names| names.get(formula))
            .map(String::as_str)
    }

    /// Sets the short name of `formula` within `project`, creating the project
    /// if needed. Returns the previous name, if any.
    pub fn set_name(&mut self, project: &str, formula: &str, name: &str) -> Option<String> {
        self.projects
            .entry(project.to_string())
            .or_default()
            .insert(formula.to_string(), name.to_string())
    }

    /// Replaces the whole name table of `project`.
    pub fn insert_project(&mut self, project: &str, names: ProjectNames) -> Option<ProjectNames> {
        self.projects.insert(project.to_string(), names)
    }

    pub fn remove_project(&mut self, project: &str) -> Option<ProjectNames> {
        self.projects.remove(project)
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("JSON error for '{path}': {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
}
