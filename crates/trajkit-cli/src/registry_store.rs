use crate::error::{CliError, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use trajkit::core::topology::registry::NameRegistry;

const REGISTRY_FILE: &str = "registry.json";
const PATH_CONFIG_FILE: &str = "registry-path.conf";

/// Locates, loads and saves the on-disk name registry.
///
/// The registry lives in the platform data directory unless a custom
/// location was stored with [`RegistryStore::set_custom_path`].
#[derive(Debug)]
pub struct RegistryStore {
    path: PathBuf,
}

impl RegistryStore {
    pub fn new() -> Result<Self> {
        let path = Self::determine_registry_path()?;
        debug!("Registry store initialized with path: {:?}", &path);
        Ok(Self::at(path))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the registry, starting empty when the file does not exist yet.
    pub fn load(&self) -> Result<NameRegistry> {
        NameRegistry::load_or_empty(&self.path).map_err(|e| CliError::parsing(&self.path, e))
    }

    pub fn save(&self, registry: &NameRegistry) -> Result<()> {
        registry
            .save(&self.path)
            .map_err(|e| CliError::writing(&self.path, e))
    }

    pub fn set_custom_path(path: &Path) -> Result<()> {
        Self::write_custom_path(&Self::get_path_config_file()?, path)
    }

    pub fn reset_path() -> Result<()> {
        if let Ok(config_path) = Self::get_path_config_file() {
            if config_path.exists() {
                fs::remove_file(config_path)?;
            }
        }
        Ok(())
    }

    fn write_custom_path(config_path: &Path, path: &Path) -> Result<()> {
        let text = path.to_str().ok_or_else(|| {
            CliError::Argument(format!("Registry path is not valid UTF-8: {:?}", path))
        })?;
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(config_path, text).map_err(CliError::from)
    }

    fn read_custom_path(config_path: &Path) -> Result<Option<PathBuf>> {
        if !config_path.exists() {
            return Ok(None);
        }
        let custom_path_str = fs::read_to_string(config_path)?.trim().to_string();
        if custom_path_str.is_empty() {
            warn!("Custom registry path file is empty, falling back to default path.");
            Ok(None)
        } else {
            Ok(Some(PathBuf::from(custom_path_str)))
        }
    }

    fn determine_registry_path() -> Result<PathBuf> {
        let custom = match Self::get_path_config_file() {
            Ok(config_path) => Self::read_custom_path(&config_path)?,
            Err(_) => None,
        };
        match custom {
            Some(path) => Ok(path),
            None => Self::get_default_registry_path(),
        }
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("org", "trajkit", "trajkit")
    }

    fn get_path_config_file() -> Result<PathBuf> {
        Self::project_dirs()
            .map(|dirs| dirs.config_dir().join(PATH_CONFIG_FILE))
            .ok_or_else(|| {
                CliError::Registry("Could not determine config directory path.".to_string())
            })
    }

    fn get_default_registry_path() -> Result<PathBuf> {
        Self::project_dirs()
            .map(|dirs| dirs.data_dir().join(REGISTRY_FILE))
            .ok_or_else(|| {
                CliError::Registry("Could not determine default data directory path.".to_string())
            })
    }
}
