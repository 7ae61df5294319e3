//! Error types for nubuild-core.

use miette::Diagnostic;
use nubuild_config::error::ConfigError;
use nubuild_utils::error::{FileSystemError, PathError, UtilsError};
use thiserror::Error;

/// Core error type for nubuild step runs.
#[derive(Error, Diagnostic, Debug)]
pub enum NubuildError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    FileSystemError(#[from] FileSystemError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    PathError(#[from] PathError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Utils(#[from] UtilsError),

    #[error("Error while {action}")]
    #[diagnostic(
        code(nubuild::io),
        help("Check that the NuGet executable exists and is runnable")
    )]
    IoError {
        action: String,
        #[source]
        source: std::io::Error,
    },

    #[error("NuGet repository '{0}' not found")]
    #[diagnostic(
        code(nubuild::repository_not_found),
        help("Run 'nubuild repositories' to list the configured repositories")
    )]
    RepositoryNotFound(String),

    #[error("No NuGet packages were created.")]
    #[diagnostic(
        code(nubuild::no_packages_created),
        help("Check that the nuspec pattern matches files in the workspace")
    )]
    NoPackagesCreated,

    #[error("{failed} {} occurred while creating NuGet packages.", error_noun(.failed))]
    #[diagnostic(code(nubuild::pack_failed), help("See the NuGet output above for details"))]
    PackFailed { failed: usize },

    #[error("No NuGet packages were restored.")]
    #[diagnostic(code(nubuild::no_packages_restored))]
    NoPackagesRestored,

    #[error("There were errors while restoring NuGet packages.")]
    #[diagnostic(code(nubuild::restore_failed), help("See the NuGet output above for details"))]
    RestoreFailed,

    #[error("Operation cancelled")]
    #[diagnostic(code(nubuild::cancelled))]
    Cancelled,

    #[error("Thread lock poison error")]
    #[diagnostic(
        code(nubuild::poison),
        help("This is an internal error, please report it")
    )]
    PoisonError,

    #[error("{0}")]
    #[diagnostic(code(nubuild::error))]
    Custom(String),
}

fn error_noun(count: &usize) -> &'static str {
    if *count == 1 {
        "error"
    } else {
        "errors"
    }
}

impl<T> From<std::sync::PoisonError<T>> for NubuildError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        Self::PoisonError
    }
}

/// Trait for adding context to IO errors.
pub trait ErrorContext<T> {
    fn with_context<C>(self, context: C) -> std::result::Result<T, NubuildError>
    where
        C: FnOnce() -> String;
}

impl<T> ErrorContext<T> for std::io::Result<T> {
    fn with_context<C>(self, context: C) -> std::result::Result<T, NubuildError>
    where
        C: FnOnce() -> String,
    {
        self.map_err(|err| NubuildError::IoError {
            action: context(),
            source: err,
        })
    }
}
