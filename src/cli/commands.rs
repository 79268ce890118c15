//! Command dispatch

use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::cli::args::{BuildArgs, Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{find_in, leaf_paths, NodeId, TreeNode, TreeNodeConvert};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    dispatch(cli, &|dir| Settings::load(Some(dir)))
}

/// Loads the base settings for the directory of a record file.
type SettingsLoader<'a> = &'a dyn Fn(&Path) -> ApplicationResult<Settings>;

fn dispatch(cli: &Cli, load: SettingsLoader) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Tree { args, single }) => cmd_tree(&container(args, load)?, args, *single),
        Some(Commands::Roots { args }) => cmd_roots(&container(args, load)?, args),
        Some(Commands::Leaves { args }) => cmd_leaves(&container(args, load)?, args),
        Some(Commands::Path { args, id }) => cmd_path(&container(args, load)?, args, id),
        Some(Commands::Show { args, id }) => cmd_show(&container(args, load)?, args, id),
        Some(Commands::Config { command }) => cmd_config(command),
        Some(Commands::Completion { shell }) => {
            cmd_completion(*shell);
            Ok(())
        }
        None => Err(CliError::Usage("no command given, see --help".into())),
    }
}

/// Directory holding the record file, used to find the local config.
fn records_dir(file: &Path) -> &Path {
    match file.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}

/// Put the per-run flags of `args` over already loaded settings.
#[instrument(level = "debug", skip(settings))]
pub fn apply_overrides(mut settings: Settings, args: &BuildArgs) -> CliResult<Settings> {
    if let Some(depth) = args.max_depth {
        settings.max_depth = Some(depth);
    }
    if let Some(id) = &args.root_parent_id {
        settings.root_parent_id = id.clone();
        settings.root_sentinel = true;
    }
    if args.no_sentinel {
        settings.root_sentinel = false;
    }
    if let Some(table) = &args.table {
        if table.trim().is_empty() {
            return Err(CliError::InvalidArgs("--table must not be blank".into()));
        }
        settings.records_table = table.clone();
    }
    debug!("resolved settings: {:?}", settings);
    Ok(settings)
}

fn container(args: &BuildArgs, load: SettingsLoader) -> CliResult<ServiceContainer> {
    let base = load(records_dir(&args.file))?;
    Ok(ServiceContainer::new(apply_overrides(base, args)?))
}

/// One line per leaf, leaf first: `leaf <- parent <- root`.
fn leaf_lines(roots: &[TreeNode]) -> Vec<String> {
    leaf_paths(roots)
        .iter()
        .map(|path| path.iter().rev().join(" <- "))
        .collect()
}

#[instrument(level = "debug", skip(services))]
fn cmd_tree(services: &ServiceContainer, args: &BuildArgs, single: bool) -> CliResult<()> {
    if single {
        let root = services.forest_service.load_single(&args.file)?;
        output::info(&root.to_tree_string());
    } else {
        let roots = services.forest_service.load_forest(&args.file)?;
        output::info(&roots.to_tree_string());
    }
    Ok(())
}

#[instrument(level = "debug", skip(services))]
fn cmd_roots(services: &ServiceContainer, args: &BuildArgs) -> CliResult<()> {
    let roots = services.forest_service.load_forest(&args.file)?;
    if roots.is_empty() {
        output::warning(&format!("no records in {}", args.file.display()));
    }
    for root in &roots {
        output::info(root);
    }
    Ok(())
}

#[instrument(level = "debug", skip(services))]
fn cmd_leaves(services: &ServiceContainer, args: &BuildArgs) -> CliResult<()> {
    let roots = services.forest_service.load_forest(&args.file)?;
    for line in leaf_lines(&roots) {
        output::info(&line);
    }
    Ok(())
}

#[instrument(level = "debug", skip(services))]
fn cmd_path(services: &ServiceContainer, args: &BuildArgs, id: &NodeId) -> CliResult<()> {
    let roots = services.forest_service.load_forest(&args.file)?;
    let chain = services.forest_service.locate(&roots, id)?;
    for (depth, node) in chain.iter().enumerate() {
        output::info(&format!("{}{}", "  ".repeat(depth), node));
    }
    Ok(())
}

#[instrument(level = "debug", skip(services))]
fn cmd_show(services: &ServiceContainer, args: &BuildArgs, id: &NodeId) -> CliResult<()> {
    let roots = services.forest_service.load_forest(&args.file)?;
    let node =
        find_in(&roots, id).ok_or_else(|| ApplicationError::NodeNotFound(id.to_string()))?;
    output::header(node);
    for (key, value) in node.attributes() {
        output::field(key, value);
    }
    Ok(())
}

fn cmd_config(command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show { dir } => {
            let settings = Settings::load(dir.as_deref())?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path { dir } => {
            let dir = dir.as_deref().unwrap_or_else(|| Path::new("."));
            let dir = std::fs::canonicalize(dir)
                .map_err(|e| InfraError::io(format!("resolve {}", dir.display()), e))?;
            match global_config_path() {
                Some(path) => output::field("global", &describe(&path)),
                None => output::field("global", "unavailable"),
            }
            output::field("local", &describe(&local_config_path(&dir)));
        }
    }
    Ok(())
}

fn describe(path: &Path) -> String {
    if path.exists() {
        path.display().to_string()
    } else {
        format!("{} (missing)", path.display())
    }
}

fn cmd_completion(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}
