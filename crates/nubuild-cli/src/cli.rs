use clap::{ArgAction, Parser, Subcommand, ValueHint};

use crate::utils::parse_define;

#[derive(Parser)]
#[command(
    author,
    version,
    about,
    help_template = "{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}",
    arg_required_else_help = true
)]
pub struct Args {
    /// Set output verbosity
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress outputs
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output as json
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Provide custom config file
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<String>,

    /// Workspace the steps run in (default: current directory)
    #[arg(short, long, global = true, value_hint = ValueHint::DirPath)]
    pub workspace: Option<String>,

    /// Define a macro variable, overriding the environment
    #[arg(
        short = 'D',
        long = "define",
        value_name = "KEY=VALUE",
        value_parser = parse_define,
        global = true
    )]
    pub defines: Vec<(String, String)>,

    /// Print the NuGet commands instead of running them
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create NuGet packages from nuspec files in the workspace
    #[command(arg_required_else_help = true)]
    Pack {
        /// Comma-separated Ant patterns selecting nuspec files, e.g. '**/*.nuspec'
        #[arg(required = true)]
        nuspec_pattern: String,

        /// Directory the packages are written to
        #[arg(short, long, default_value = ".", value_hint = ValueHint::DirPath)]
        output_directory: String,

        /// Fail when the pattern matches no nuspec file
        #[arg(short, long)]
        fail_if_no_packages_are_created: bool,

        /// NuGet verbosity (Normal, Quiet or Detailed)
        #[arg(long)]
        verbosity: Option<String>,
    },

    /// Restore the NuGet packages of a project or solution
    #[command(arg_required_else_help = true)]
    Restore {
        /// Project, solution or packages.config to restore
        #[arg(required = true, value_hint = ValueHint::FilePath)]
        project_path: String,

        /// Name of a configured repository
        #[arg(short, long, default_value = "nuget.org")]
        repository: String,

        /// NuGet verbosity (Normal, Quiet or Detailed)
        #[arg(long)]
        verbosity: Option<String>,
    },

    /// Run the steps of a build plan in order
    Run {
        /// Build plan file (default: nubuild.toml in the workspace)
        #[arg(value_hint = ValueHint::FilePath)]
        plan: Option<String>,
    },

    /// List the configured NuGet repositories
    #[clap(name = "repositories", visible_alias = "repos")]
    Repositories,

    /// List the known NuGet verbosity levels
    Verbosities,

    /// Print the configuration file to stdout
    Config,

    /// Generate a default configuration file
    #[clap(name = "defconfig")]
    DefConfig,

    /// Generate an example build plan
    #[clap(name = "defplan")]
    DefPlan {
        /// Where to write the plan (default: nubuild.toml in the workspace)
        #[arg(value_hint = ValueHint::FilePath)]
        path: Option<String>,
    },

    /// View env
    Env,
}
