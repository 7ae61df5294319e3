use nu_ansi_term::Color::{Cyan, Green};
use nubuild_config::{
    config::Config,
    verbosity::VERBOSITIES,
};
use nubuild_core::NubuildResult;
use tabled::{
    builder::Builder,
    settings::{themes::BorderCorrection, Panel, Style},
};
use tracing::info;

use crate::utils::{print_json, Colored};

pub fn list_repositories(config: &Config, json: bool) -> NubuildResult<()> {
    if json {
        return print_json(&config.repositories);
    }

    if config.repositories.is_empty() {
        info!("No repositories configured.");
        return Ok(());
    }

    let mut builder = Builder::new();
    builder.push_record(["Name", "URL"]);
    for repo in &config.repositories {
        builder.push_record([
            Colored(Cyan, &repo.name).to_string(),
            repo.url.clone(),
        ]);
    }

    let table = builder
        .build()
        .with(Panel::header("NuGet Repositories"))
        .with(Style::rounded())
        .with(BorderCorrection {})
        .to_string();

    info!("\n{table}");
    Ok(())
}

pub fn list_verbosities(json: bool) -> NubuildResult<()> {
    if json {
        return print_json(&VERBOSITIES);
    }

    for (idx, verbosity) in VERBOSITIES.iter().enumerate() {
        if idx == 0 {
            info!("{} (default)", Colored(Green, verbosity));
        } else {
            info!("{}", verbosity);
        }
    }
    Ok(())
}
