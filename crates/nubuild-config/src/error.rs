use miette::Diagnostic;
use nubuild_utils::error::{FileSystemError, PathError, UtilsError};
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("TOML serialization error: {0}")]
    #[diagnostic(
        code(nubuild_config::toml_serialize),
        help("Check your configuration structure for invalid values")
    )]
    TomlSerError(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    #[diagnostic(
        code(nubuild_config::toml_deserialize),
        help("Check your TOML syntax and structure")
    )]
    TomlDeError(#[from] toml::de::Error),

    #[error("Configuration file already exists: {0}")]
    #[diagnostic(
        code(nubuild_config::already_exists),
        help("Remove the existing file or use a different location")
    )]
    ConfigAlreadyExists(String),

    #[error("Build plan not found: {0}")]
    #[diagnostic(
        code(nubuild_config::plan_not_found),
        help("Run 'nubuild defplan' to create a build plan, or pass its path explicitly")
    )]
    PlanNotFound(String),

    #[error("Repository name cannot be empty")]
    #[diagnostic(
        code(nubuild_config::empty_repository_name),
        help("Give every [[repositories]] entry a unique name")
    )]
    EmptyRepositoryName,

    #[error("Repository '{0}' has an empty URL")]
    #[diagnostic(
        code(nubuild_config::empty_repository_url),
        help("Set the url field to a NuGet feed URL or a local feed directory")
    )]
    EmptyRepositoryUrl(String),

    #[error("Invalid URL for repository '{name}': {url}")]
    #[diagnostic(
        code(nubuild_config::invalid_repository_url),
        help("Use a full URL such as https://api.nuget.org/v3/index.json")
    )]
    InvalidRepositoryUrl { name: String, url: String },

    #[error("Duplicate repository name: {0}")]
    #[diagnostic(
        code(nubuild_config::duplicate_repo),
        help("Each repository must have a unique name")
    )]
    DuplicateRepositoryName(String),

    #[error("Invalid build step #{index}: {reason}")]
    #[diagnostic(
        code(nubuild_config::invalid_step),
        help("Check the step's fields in your build plan")
    )]
    InvalidStep { index: usize, reason: String },

    #[error("IO error: {0}")]
    #[diagnostic(code(nubuild_config::io))]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Utils(#[from] UtilsError),

    #[error("Failed to parse TOML: {0}")]
    #[diagnostic(code(nubuild_config::toml))]
    Toml(#[from] toml_edit::TomlError),

    #[error("Encountered unexpected TOML item: {0}")]
    #[diagnostic(code(nubuild_config::unexpected_toml_item))]
    UnexpectedTomlItem(String),

    #[error("Failed to annotate first table in array: {0}")]
    #[diagnostic(code(nubuild_config::annotate_first_table))]
    AnnotateFirstTable(String),
}

impl From<PathError> for ConfigError {
    fn from(err: PathError) -> Self {
        Self::Utils(UtilsError::Path(err))
    }
}

impl From<FileSystemError> for ConfigError {
    fn from(err: FileSystemError) -> Self {
        Self::Utils(UtilsError::FileSystem(err))
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
