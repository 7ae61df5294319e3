use std::path::{Path, PathBuf};

use documented::{Documented, DocumentedFields};
use nubuild_utils::fs::{read_optional, write_file};
use serde::{Deserialize, Serialize};
use toml_edit::{DocumentMut, Item};
use tracing::{info, warn};

use crate::{
    annotations::annotate_toml_table,
    error::{ConfigError, Result},
    verbosity::{effective_verbosity, is_known_verbosity, VERBOSITIES},
};

/// File name looked up in the workspace when no build plan path is given.
pub const PLAN_FILE_NAME: &str = "nubuild.toml";

/// An ordered list of NuGet steps to run against a workspace.
#[derive(Clone, Debug, Default, Deserialize, Serialize, Documented, DocumentedFields)]
pub struct BuildPlan {
    /// Settings applied to every step that does not set them itself.
    pub defaults: Option<StepDefaults>,

    /// Steps, run in order. The first failing step aborts the plan.
    #[serde(default)]
    pub steps: Vec<StepSpec>,
}

/// Default settings for all steps.
#[derive(Clone, Debug, Default, Deserialize, Serialize, Documented, DocumentedFields)]
pub struct StepDefaults {
    /// NuGet verbosity: Normal, Quiet or Detailed.
    pub verbosity: Option<String>,
}

/// A single step of a build plan, selected by its `type` key.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StepSpec {
    Pack(PackStep),
    Restore(RestoreStep),
}

/// Runs `nuget pack` for every nuspec file matching a pattern.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Documented, DocumentedFields)]
pub struct PackStep {
    /// Fail the step when the pattern matches no nuspec file.
    #[serde(default)]
    pub fail_if_no_packages_are_created: bool,

    /// NuGet verbosity: Normal, Quiet or Detailed.
    pub verbosity: Option<String>,

    /// Comma-separated Ant-style patterns selecting nuspec files in the workspace.
    pub nuspec_pattern: String,

    /// Directory the packages are written to, relative to the workspace unless absolute.
    #[serde(default = "default_output_directory")]
    pub output_directory: String,
}

/// Runs `nuget restore` for one project against a named repository.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Documented, DocumentedFields)]
pub struct RestoreStep {
    /// Name of a repository from the global configuration.
    pub repository: String,

    /// NuGet verbosity: Normal, Quiet or Detailed.
    pub verbosity: Option<String>,

    /// Project, solution or packages.config to restore, relative to the workspace unless absolute.
    pub project_path: String,
}

fn default_output_directory() -> String {
    ".".to_string()
}

impl StepSpec {
    pub fn kind(&self) -> &'static str {
        match self {
            StepSpec::Pack(_) => "pack",
            StepSpec::Restore(_) => "restore",
        }
    }

    pub fn verbosity(&self) -> Option<&str> {
        match self {
            StepSpec::Pack(step) => step.verbosity.as_deref(),
            StepSpec::Restore(step) => step.verbosity.as_deref(),
        }
    }

    fn verbosity_mut(&mut self) -> &mut Option<String> {
        match self {
            StepSpec::Pack(step) => &mut step.verbosity,
            StepSpec::Restore(step) => &mut step.verbosity,
        }
    }

    /// Checks the fields that can be checked without a workspace.
    ///
    /// Repository names are resolved when the step runs.
    pub fn validate(&self, index: usize) -> Result<()> {
        let invalid = |reason: &str| {
            ConfigError::InvalidStep {
                index,
                reason: reason.to_string(),
            }
        };

        match self {
            StepSpec::Pack(step) => {
                if step.nuspec_pattern.trim().is_empty() {
                    return Err(invalid("pack step needs a nuspec_pattern"));
                }
            }
            StepSpec::Restore(step) => {
                if step.repository.trim().is_empty() {
                    return Err(invalid("restore step needs a repository"));
                }
                if step.project_path.trim().is_empty() {
                    return Err(invalid("restore step needs a project_path"));
                }
            }
        }

        if let Some(verbosity) = effective_verbosity(self.verbosity()) {
            if !is_known_verbosity(verbosity) {
                warn!(
                    "step #{} uses verbosity '{}', which is not one of {}; passing it to NuGet as is",
                    index,
                    verbosity,
                    VERBOSITIES.join(", ")
                );
            }
        }

        Ok(())
    }
}

impl BuildPlan {
    /// Loads and validates a build plan.
    pub fn load(path: &Path) -> Result<Self> {
        let content = read_optional(path)?
            .ok_or_else(|| ConfigError::PlanNotFound(path.display().to_string()))?;
        let plan: BuildPlan = toml::from_str(&content)?;
        plan.validate()?;
        Ok(plan)
    }

    /// Returns the plan path for `workspace` when none is given explicitly.
    pub fn default_path(workspace: &Path) -> PathBuf {
        workspace.join(PLAN_FILE_NAME)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(verbosity) = self
            .defaults
            .as_ref()
            .and_then(|d| effective_verbosity(d.verbosity.as_deref()))
        {
            if !is_known_verbosity(verbosity) {
                warn!(
                    "default verbosity '{}' is not one of {}; passing it to NuGet as is",
                    verbosity,
                    VERBOSITIES.join(", ")
                );
            }
        }

        for (idx, step) in self.steps.iter().enumerate() {
            step.validate(idx + 1)?;
        }
        Ok(())
    }

    /// Returns the steps with defaults applied.
    pub fn resolved_steps(&self) -> Vec<StepSpec> {
        let default_verbosity = self.defaults.as_ref().and_then(|d| d.verbosity.clone());

        self.steps
            .iter()
            .cloned()
            .map(|mut step| {
                let verbosity = step.verbosity_mut();
                if verbosity.is_none() {
                    verbosity.clone_from(&default_verbosity);
                }
                step
            })
            .collect()
    }

    pub fn default_plan() -> Self {
        Self {
            defaults: Some(StepDefaults {
                verbosity: Some("Normal".to_string()),
            }),
            steps: vec![
                StepSpec::Restore(RestoreStep {
                    repository: "nuget.org".to_string(),
                    verbosity: None,
                    project_path: "src/App.sln".to_string(),
                }),
                StepSpec::Pack(PackStep {
                    fail_if_no_packages_are_created: true,
                    verbosity: None,
                    nuspec_pattern: "**/*.nuspec".to_string(),
                    output_directory: "artifacts/${BUILD_NUMBER}".to_string(),
                }),
            ],
        }
    }

    pub fn to_annotated_document(&self) -> Result<DocumentMut> {
        let toml_string = toml::to_string_pretty(self)?;
        let mut doc = toml_string.parse::<DocumentMut>()?;

        let header = r#"# nubuild build plan
# Run `nubuild run` in the workspace to execute the steps below in order.
#
# Step format:
#   [[steps]]
#   type = "restore"                    # nuget restore <project_path> -Source <repository url>
#   repository = "nuget.org"            # name from the global config
#   project_path = "src/App.sln"
#
#   [[steps]]
#   type = "pack"                       # nuget pack <nuspec> -OutputDirectory <dir>
#   nuspec_pattern = "**/*.nuspec"      # comma-separated Ant patterns
#   output_directory = "out"
#   fail_if_no_packages_are_created = true
#
# String values may use $VAR or ${VAR}; WORKSPACE, the process environment and
# `--define KEY=VALUE` values are available.

"#;
        doc.as_table_mut().decor_mut().set_prefix(header);

        annotate_toml_table::<BuildPlan>(doc.as_table_mut(), true)?;

        if let Some(Item::Table(defaults_table)) = doc.get_mut("defaults") {
            annotate_toml_table::<StepDefaults>(defaults_table, false)?;
        }

        Ok(doc)
    }
}

/// Writes an annotated example build plan to `path`.
pub fn generate_default_plan(path: &Path) -> Result<()> {
    if path.exists() {
        return Err(ConfigError::ConfigAlreadyExists(path.display().to_string()));
    }

    let annotated_doc = BuildPlan::default_plan().to_annotated_document()?;
    write_file(path, &annotated_doc.to_string())?;
    info!("Example build plan generated at: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_parse_steps_in_order() {
        let toml_str = r#"
[[steps]]
type = "restore"
repository = "internal"
project_path = "src/App.sln"

[[steps]]
type = "pack"
nuspec_pattern = "**/*.nuspec"
output_directory = "out"
fail_if_no_packages_are_created = true
"#;
        let plan: BuildPlan = toml::from_str(toml_str).unwrap();
        assert_eq!(plan.steps.len(), 2);

        assert_eq!(
            plan.steps[0],
            StepSpec::Restore(RestoreStep {
                repository: "internal".to_string(),
                verbosity: None,
                project_path: "src/App.sln".to_string(),
            })
        );
        assert_eq!(
            plan.steps[1],
            StepSpec::Pack(PackStep {
                fail_if_no_packages_are_created: true,
                verbosity: None,
                nuspec_pattern: "**/*.nuspec".to_string(),
                output_directory: "out".to_string(),
            })
        );
    }

    #[test]
    fn test_pack_step_defaults() {
        let toml_str = r#"
[[steps]]
type = "pack"
nuspec_pattern = "*.nuspec"
"#;
        let plan: BuildPlan = toml::from_str(toml_str).unwrap();
        let StepSpec::Pack(step) = &plan.steps[0] else {
            panic!("expected a pack step");
        };
        assert!(!step.fail_if_no_packages_are_created);
        assert_eq!(step.output_directory, ".");
    }

    #[test]
    fn test_unknown_step_type_is_rejected() {
        let toml_str = r#"
[[steps]]
type = "push"
"#;
        assert!(toml::from_str::<BuildPlan>(toml_str).is_err());
    }

    #[test]
    fn test_defaults_applied() {
        let toml_str = r#"
[defaults]
verbosity = "Quiet"

[[steps]]
type = "pack"
nuspec_pattern = "*.nuspec"

[[steps]]
type = "restore"
repository = "nuget.org"
project_path = "App.sln"
verbosity = "Detailed"
"#;
        let plan: BuildPlan = toml::from_str(toml_str).unwrap();
        let resolved = plan.resolved_steps();

        assert_eq!(resolved[0].verbosity(), Some("Quiet"));
        assert_eq!(resolved[1].verbosity(), Some("Detailed"));
    }

    #[test]
    fn test_validate_rejects_missing_fields() {
        let plan = BuildPlan {
            defaults: None,
            steps: vec![
                StepSpec::Pack(PackStep {
                    fail_if_no_packages_are_created: false,
                    verbosity: None,
                    nuspec_pattern: "*.nuspec".to_string(),
                    output_directory: "out".to_string(),
                }),
                StepSpec::Restore(RestoreStep {
                    repository: "nuget.org".to_string(),
                    verbosity: None,
                    project_path: " ".to_string(),
                }),
            ],
        };

        assert!(matches!(
            plan.validate(),
            Err(ConfigError::InvalidStep { index: 2, .. })
        ));
    }

    #[test]
    fn test_validate_passes_unknown_verbosity() {
        let step = StepSpec::Pack(PackStep {
            fail_if_no_packages_are_created: false,
            verbosity: Some("Chatty".to_string()),
            nuspec_pattern: "*.nuspec".to_string(),
            output_directory: "out".to_string(),
        });
        assert!(step.validate(1).is_ok());
    }

    #[test]
    fn test_load_missing_plan() {
        let dir = tempdir().unwrap();
        let result = BuildPlan::load(&BuildPlan::default_path(dir.path()));
        assert!(matches!(result, Err(ConfigError::PlanNotFound(_))));
    }

    #[test]
    fn test_generated_plan_loads_back() {
        let dir = tempdir().unwrap();
        let path = BuildPlan::default_path(dir.path());

        generate_default_plan(&path).unwrap();
        let plan = BuildPlan::load(&path).unwrap();
        assert_eq!(plan.steps, BuildPlan::default_plan().steps);

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("# nubuild build plan"));

        assert!(matches!(
            generate_default_plan(&path),
            Err(ConfigError::ConfigAlreadyExists(_))
        ));
    }
}
