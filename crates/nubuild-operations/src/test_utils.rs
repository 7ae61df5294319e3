use std::{collections::HashMap, path::Path, sync::Arc};

use nubuild_config::{config::Config, repository::Repository};
use nubuild_core::testing::ScriptedLauncher;
use nubuild_events::CollectorSink;

use crate::StepContext;

pub fn test_config() -> Config {
    Config {
        nuget_exe: Some("nuget".to_string()),
        repositories: vec![
            Repository::new("nuget.org", "https://api.nuget.org/v3/index.json"),
            Repository::new("internal", "https://nuget.internal/v3/index.json"),
        ],
    }
}

/// Context over `workspace` with a fixed variable set, so tests never see the host environment.
pub fn test_context(
    workspace: &Path,
    launcher: Arc<ScriptedLauncher>,
    events: Arc<CollectorSink>,
) -> StepContext {
    StepContext::new(test_config(), workspace, events)
        .with_env(HashMap::from([(
            "BUILD_NUMBER".to_string(),
            "7".to_string(),
        )]))
        .with_launcher(launcher)
}

pub fn touch(workspace: &Path, relative: &str) {
    let path = workspace.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, "<package />").unwrap();
}
