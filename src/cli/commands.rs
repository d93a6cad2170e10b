//! Command dispatch

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::services::SummaryOptions;
use crate::application::OutputFormat;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_dir, global_config_path, local_config_path, Settings};
use crate::domain::SchemaPolicy;
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};
use crate::infrastructure::InfraError;

/// Run the parsed command line.
pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let dir = local_dir(cli)?;
    debug!("local config dir: {}", dir.display());

    match &cli.command {
        Some(Commands::Summarize {
            file,
            format,
            policy,
            output: target,
        }) => {
            let container = ServiceContainer::new(Settings::load(Some(&dir))?);
            cmd_summarize(&container, file, *format, *policy, target.as_deref())
        }
        Some(Commands::Check { file }) => {
            let container = ServiceContainer::new(Settings::load(Some(&dir))?);
            cmd_check(&container, file)
        }
        Some(Commands::Tree { file }) => {
            let container = ServiceContainer::new(Settings::load(Some(&dir))?);
            output::info(&container.summary.tree(file)?);
            Ok(())
        }
        Some(Commands::Config { command }) => cmd_config(command, &dir),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Ok(()),
    }
}

fn local_dir(cli: &Cli) -> CliResult<PathBuf> {
    match &cli.dir {
        Some(dir) if !dir.is_dir() => Err(CliError::InvalidArgs(format!(
            "not a directory: {}",
            dir.display()
        ))),
        Some(dir) => Ok(dir.clone()),
        None => std::env::current_dir()
            .map_err(|e| CliError::from(InfraError::io("resolve current directory", e))),
    }
}

#[instrument(skip(container))]
fn cmd_summarize(
    container: &ServiceContainer,
    file: &Path,
    format: Option<OutputFormat>,
    policy: Option<SchemaPolicy>,
    target: Option<&Path>,
) -> CliResult<()> {
    let rendered = container
        .summary
        .summarize_to_string(file, SummaryOptions { policy, format })?;

    match target {
        Some(path) => {
            container.summary.write_output(path, &rendered)?;
            output::action("Wrote", &path.display());
        }
        None => output::info(&rendered),
    }
    Ok(())
}

#[instrument(skip(container))]
fn cmd_check(container: &ServiceContainer, file: &Path) -> CliResult<()> {
    let groups = container.summary.check(file)?;
    if groups.is_empty() {
        output::success("all groups share their seed's shape");
        return Ok(());
    }

    for group in &groups {
        output::header(&format!("{} / group {}", group.section, group.group));
        for divergence in &group.divergences {
            output::failure(divergence);
        }
    }
    Err(CliError::SchemaDivergence {
        groups: groups.len(),
    })
}

fn cmd_config(command: &ConfigCommands, dir: &Path) -> CliResult<()> {
    match command {
        ConfigCommands::Show { local } => {
            let settings = if *local {
                match Settings::load_local_only(dir)? {
                    Some(settings) => settings,
                    None => {
                        output::warning(&format!(
                            "no local config at {}",
                            local_config_path(dir).display()
                        ));
                        return Ok(());
                    }
                }
            } else {
                Settings::load(Some(dir))?
            };
            output::info(&settings.to_toml()?);
            Ok(())
        }
        ConfigCommands::Init { global } => {
            let path = if *global {
                global_config_path().ok_or_else(|| {
                    CliError::InvalidArgs("cannot determine global config directory".into())
                })?
            } else {
                local_config_path(dir)
            };
            let fs = RealFileSystem;
            if fs.exists(&path) {
                return Err(CliError::InvalidArgs(format!(
                    "config already exists: {}",
                    path.display()
                )));
            }
            fs.ensure_parent(&path)
                .map_err(|e| InfraError::io(format!("create parent of {}", path.display()), e))?;
            fs.write(&path, &Settings::template())
                .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
            output::action("Created", &path.display());
            Ok(())
        }
        ConfigCommands::Path => {
            match global_config_dir() {
                Some(global) => output::action(
                    "Global",
                    &global.join("datasummary.toml").display(),
                ),
                None => output::warning("no global config directory on this platform"),
            }
            output::action("Local", &local_config_path(dir).display());
            Ok(())
        }
    }
}
