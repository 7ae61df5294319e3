use std::{
    collections::HashSet,
    path::{Path, PathBuf},
    sync::{LazyLock, RwLock},
};

use documented::{Documented, DocumentedFields};
use nubuild_utils::{
    fs::{read_optional, write_file},
    path::xdg_config_home,
};
use serde::{Deserialize, Serialize};
use toml_edit::DocumentMut;
use tracing::{debug, info};

use crate::{
    annotations::{annotate_toml_array_of_tables, annotate_toml_table},
    error::{ConfigError, Result},
    repository::{default_repositories, Repository},
};

/// Executable used when no NuGet path is configured.
pub const DEFAULT_NUGET_EXE: &str = ".nuget\\NuGet.exe";

/// Global nubuild configuration.
#[derive(Clone, Debug, Default, Deserialize, Serialize, Documented, DocumentedFields)]
pub struct Config {
    /// Path to the NuGet command line executable.
    /// Relative paths are resolved by the operating system from the step's workspace.
    /// Default: .nuget\NuGet.exe
    pub nuget_exe: Option<String>,

    /// NuGet repositories that restore steps can refer to by name.
    #[serde(default)]
    pub repositories: Vec<Repository>,
}

pub static CONFIG_PATH: LazyLock<RwLock<PathBuf>> = LazyLock::new(|| {
    RwLock::new(match std::env::var("NUBUILD_CONFIG") {
        Ok(path_str) => PathBuf::from(path_str),
        Err(_) => xdg_config_home().join("nubuild").join("config.toml"),
    })
});

/// Returns the currently selected configuration file path.
pub fn config_path() -> PathBuf {
    CONFIG_PATH
        .read()
        .map(|path| path.clone())
        .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
}

/// Points subsequent [`Config::load`] calls at `path`.
pub fn set_config_path(path: PathBuf) {
    let mut guard = CONFIG_PATH
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = path;
}

impl Config {
    pub fn default_config() -> Self {
        Self {
            nuget_exe: Some(DEFAULT_NUGET_EXE.to_string()),
            repositories: default_repositories(),
        }
    }

    /// Loads the configuration from the selected configuration file.
    /// If the file does not exist, the default configuration is used.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = match read_optional(path)? {
            Some(content) => toml::from_str(&content)?,
            None => {
                debug!(
                    "config file {} not found, using defaults",
                    path.display()
                );
                Self::default_config()
            }
        };

        config.resolve()?;

        Ok(config)
    }

    /// Validates the repositories: names must be non-empty and unique and URLs well formed.
    pub fn resolve(&mut self) -> Result<()> {
        let mut seen_repos = HashSet::new();

        for repo in &self.repositories {
            repo.validate()?;
            if !seen_repos.insert(repo.name.as_str()) {
                return Err(ConfigError::DuplicateRepositoryName(repo.name.clone()));
            }
        }

        Ok(())
    }

    /// Returns the NuGet executable to launch.
    ///
    /// `NUBUILD_NUGET_EXE` takes precedence over the configured value, which in turn falls back
    /// to [`DEFAULT_NUGET_EXE`].
    pub fn nuget_exe(&self) -> String {
        if let Ok(env_exe) = std::env::var("NUBUILD_NUGET_EXE") {
            if !env_exe.is_empty() {
                return env_exe;
            }
        }
        self.nuget_exe
            .clone()
            .unwrap_or_else(|| DEFAULT_NUGET_EXE.to_string())
    }

    /// Looks a repository up by exact name.
    pub fn get_repository(&self, name: &str) -> Option<&Repository> {
        self.repositories.iter().find(|repo| repo.name == name)
    }

    pub fn to_annotated_document(&self) -> Result<DocumentMut> {
        let toml_string = toml::to_string_pretty(self)?;
        let mut doc = toml_string.parse::<DocumentMut>()?;

        let header = r#"# nubuild configuration
# Restore steps refer to the repositories below by name.

"#;
        doc.as_table_mut().decor_mut().set_prefix(header);

        annotate_toml_table::<Config>(doc.as_table_mut(), true)?;

        if let Some(repositories) = doc
            .get_mut("repositories")
            .and_then(|item| item.as_array_of_tables_mut())
        {
            annotate_toml_array_of_tables::<Repository>(repositories)?;
        }

        Ok(doc)
    }
}

/// Writes an annotated default configuration to the selected configuration path.
pub fn generate_default_config() -> Result<PathBuf> {
    let config_path = config_path();

    if config_path.exists() {
        return Err(ConfigError::ConfigAlreadyExists(
            config_path.display().to_string(),
        ));
    }

    let annotated_doc = Config::default_config().to_annotated_document()?;
    write_file(&config_path, &annotated_doc.to_string())?;
    info!(
        "Default configuration file generated with documentation at: {}",
        config_path.display()
    );
    Ok(config_path)
}
