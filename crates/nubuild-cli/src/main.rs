use std::path::Path;

use clap::Parser;
use cli::{Args, Commands};
use list::{list_repositories, list_verbosities};
use logging::setup_logging;
use nubuild_config::{
    config::{config_path, generate_default_config, set_config_path, Config},
    plan::{generate_default_plan, BuildPlan},
};
use nubuild_core::{cancel::CancellationToken, NubuildResult};
use nubuild_operations::context::WORKSPACE_VAR;
use nubuild_utils::{fs::read_optional, path::resolve_path};
use steps::{pack_request, restore_request, resolve_workspace, run_request, RunSettings, StepRequest};
use tracing::{info, warn};
use utils::{disable_color, print_json};

mod cli;
mod list;
mod logging;
mod progress;
mod steps;
mod utils;

/// Cancels the run on ctrl-c so interrupted NuGet processes are not retried.
fn watch_ctrl_c(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Received interrupt, cancelling...");
            cancel.cancel();
        }
    });
}

fn print_config(path: &Path) -> NubuildResult<()> {
    let content = match read_optional(path)? {
        Some(content) => content,
        None => {
            warn!("Config file {} not found", path.display());
            Config::default_config()
                .to_annotated_document()?
                .to_string()
        }
    };
    info!("{}", content);
    Ok(())
}

async fn handle_cli() -> NubuildResult<()> {
    let args = Args::parse();

    setup_logging(&args);

    if args.no_color {
        disable_color();
    }

    if let Some(ref c) = args.config {
        set_config_path(resolve_path(c)?);
    }

    let request = match args.command {
        Commands::DefConfig => {
            generate_default_config()?;
            return Ok(());
        }
        Commands::DefPlan { path } => {
            let path = match path {
                Some(path) => resolve_path(&path)?,
                None => BuildPlan::default_path(&resolve_workspace(args.workspace.as_deref())?),
            };
            generate_default_plan(&path)?;
            return Ok(());
        }
        Commands::Config => return print_config(&config_path()),
        Commands::Verbosities => return list_verbosities(args.json),
        Commands::Repositories => {
            let config = Config::load()?;
            return list_repositories(&config, args.json);
        }
        Commands::Env => {
            let config = Config::load()?;
            let workspace = resolve_workspace(args.workspace.as_deref())?;

            info!("NUBUILD_CONFIG={}", config_path().display());
            info!("NUBUILD_NUGET_EXE={}", config.nuget_exe());
            info!("{}={}", WORKSPACE_VAR, workspace.display());
            for (key, value) in &args.defines {
                info!("{}={}", key, value);
            }
            return Ok(());
        }
        Commands::Pack {
            nuspec_pattern,
            output_directory,
            fail_if_no_packages_are_created,
            verbosity,
        } => {
            pack_request(
                nuspec_pattern,
                output_directory,
                fail_if_no_packages_are_created,
                verbosity,
            )?
        }
        Commands::Restore {
            project_path,
            repository,
            verbosity,
        } => restore_request(project_path, repository, verbosity)?,
        Commands::Run { plan } => StepRequest::Plan(plan),
    };

    let config = Config::load()?;
    let cancel = CancellationToken::new();
    watch_ctrl_c(cancel.clone());

    let settings = RunSettings {
        workspace: resolve_workspace(args.workspace.as_deref())?,
        defines: args.defines,
        dry_run: args.dry_run,
        render_events: !args.json,
        cancel,
    };

    let output = run_request(config, settings, request).await?;
    if args.json {
        print_json(&output)?;
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))
    .ok();

    if let Err(err) = handle_cli().await {
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(1);
    }
}
