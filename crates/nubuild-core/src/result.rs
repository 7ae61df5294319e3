use serde::Serialize;

/// Outcome of running NuGet for a single file or project.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OperationResult {
    /// The nuspec file or project path NuGet ran against.
    pub target: String,
    pub success: bool,
}

impl OperationResult {
    pub fn new(target: impl Into<String>, success: bool) -> Self {
        Self {
            target: target.into(),
            success,
        }
    }
}
