use documented::{Documented, DocumentedFields};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ConfigError, Result};

/// A NuGet repository that restore steps fetch packages from.
///
/// Credentials for private feeds belong in a NuGet configuration file, not here.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Documented, DocumentedFields)]
pub struct Repository {
    /// Unique name that restore steps use to refer to this repository.
    pub name: String,

    /// Feed URL (or local feed directory) passed to NuGet as `-Source`.
    pub url: String,
}

impl Repository {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }

    /// Checks that the repository has a name and a usable source.
    ///
    /// Local feeds are plain paths, so only values that look like URLs (contain `://`) are
    /// parsed.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::EmptyRepositoryName);
        }
        if self.url.trim().is_empty() {
            return Err(ConfigError::EmptyRepositoryUrl(self.name.clone()));
        }
        if self.url.contains("://") && Url::parse(&self.url).is_err() {
            return Err(ConfigError::InvalidRepositoryUrl {
                name: self.name.clone(),
                url: self.url.clone(),
            });
        }
        Ok(())
    }
}

pub fn default_repositories() -> Vec<Repository> {
    vec![Repository::new(
        "nuget.org",
        "https://api.nuget.org/v3/index.json",
    )]
}
