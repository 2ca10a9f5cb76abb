//! Command dispatch: maps parsed arguments onto the dictionary service

use std::io;

use clap::CommandFactory;
use clap_complete::generate;
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::ApplicationError;
use crate::cli::args::{Cli, Commands, ConfigCommands, LanguageCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::cli::tree_view;
use crate::config::{global_config_dir, global_config_path, Settings};
use crate::domain::{ActorId, ItemId, Language, Translation};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        Some(Commands::Config { command }) => _config(cli, command),
        Some(command) => {
            let container = container(cli)?;
            dispatch(&container, command)
        }
        None => Err(CliError::Usage(
            "no command given, see `dictree --help`".to_string(),
        )),
    }
}

fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(store) = &cli.store {
        settings.store_path = store.clone();
    }
    debug!("store_path: {}", settings.store_path.display());
    Ok(settings)
}

fn container(cli: &Cli) -> CliResult<ServiceContainer> {
    Ok(ServiceContainer::new(load_settings(cli)?))
}

fn dispatch(container: &ServiceContainer, command: &Commands) -> CliResult<()> {
    match command {
        Commands::List { flat } => _list(container, *flat),
        Commands::Get { id } => _get(container, *id),
        Commands::Create {
            key,
            parent,
            lang,
            text,
        } => {
            let initial = match (lang, text) {
                (Some(lang), Some(text)) => Some(Translation::new(lang.as_str(), text.as_str())),
                _ => None,
            };
            _create(container, key, *parent, initial)
        }
        Commands::Rename { id, key } => _rename(container, *id, key),
        Commands::Translate { id, translations } => _translate(container, *id, translations),
        Commands::Delete { id, actor } => _delete(container, *id, *actor),
        Commands::Language { command } => _language(container, command),
        Commands::Config { .. } | Commands::Completion { .. } => Ok(()),
    }
}

/// Positive id required for addressing an existing item.
fn item_id(raw: i64) -> CliResult<ItemId> {
    ItemId::from_raw(raw).ok_or_else(|| CliError::InvalidArgs(format!("invalid item id: {raw}")))
}

#[instrument(skip(container))]
fn _list(container: &ServiceContainer, flat: bool) -> CliResult<()> {
    let entries = container.dictionary.list_tree()?;
    if entries.is_empty() {
        output::info("(empty)");
        return Ok(());
    }
    if flat {
        for line in tree_view::flat_lines(&entries) {
            output::info(&line);
        }
    } else {
        for tree in tree_view::build_trees(&entries) {
            output::info(&tree);
        }
    }
    Ok(())
}

#[instrument(skip(container))]
fn _get(container: &ServiceContainer, id: i64) -> CliResult<()> {
    let item = container.dictionary.get(item_id(id)?)?;
    output::header(&item);
    output::detail(&format!("correlation: {}", item.correlation));
    if let Some(parent) = item.parent {
        output::detail(&format!("parent: {parent}"));
    }
    output::detail(&format!(
        "updated: {}",
        item.updated_at.format("%Y-%m-%d %H:%M:%S")
    ));
    for (language, text) in item.translations.iter() {
        output::detail(&format!("{language}: {text}"));
    }
    Ok(())
}

#[instrument(skip(container))]
fn _create(
    container: &ServiceContainer,
    key: &str,
    parent: i64,
    initial: Option<Translation>,
) -> CliResult<()> {
    let item = container
        .dictionary
        .create(key, ItemId::from_raw(parent), initial)?;
    output::action("Created", &item);
    Ok(())
}

#[instrument(skip(container))]
fn _rename(container: &ServiceContainer, id: i64, key: &str) -> CliResult<()> {
    let item = container.dictionary.rename(item_id(id)?, key)?;
    output::action("Renamed", &item);
    Ok(())
}

#[instrument(skip(container))]
fn _translate(container: &ServiceContainer, id: i64, translations: &[Translation]) -> CliResult<()> {
    let item = container
        .dictionary
        .upsert_translations(item_id(id)?, translations.to_vec())?;
    let languages = translations.iter().map(|t| &t.language).unique().join(", ");
    output::action("Translated", &format!("{item} [{languages}]"));
    Ok(())
}

#[instrument(skip(container))]
fn _delete(container: &ServiceContainer, id: i64, actor: i64) -> CliResult<()> {
    match container.dictionary.delete(item_id(id)?, ActorId(actor)) {
        Ok(report) => {
            output::success(&format!(
                "Deleted {} item(s) under #{}",
                report.removed.len(),
                report.requested
            ));
            Ok(())
        }
        Err(e @ ApplicationError::PartialDelete { .. }) => {
            if let ApplicationError::PartialDelete {
                removed, surviving, ..
            } = &e
            {
                output::warning(&format!("removed: {}", removed.iter().join(", ")));
                for id in surviving {
                    output::failure(&format!("still present: #{id}"));
                }
            }
            Err(e.into())
        }
        Err(e) => Err(e.into()),
    }
}

#[instrument(skip(container))]
fn _language(container: &ServiceContainer, command: &LanguageCommands) -> CliResult<()> {
    match command {
        LanguageCommands::List => {
            for language in container.dictionary.languages()? {
                output::info(&format!("{}\t{}", language.id, language.name));
            }
        }
        LanguageCommands::Add { iso, name } => {
            container
                .dictionary
                .add_language(Language::new(iso.as_str(), name.as_str()))?;
            output::action("Added language", iso);
        }
    }
    Ok(())
}

#[instrument(skip(cli))]
fn _config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = load_settings(cli)?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::detail(&format!("global: {}", path.display())),
                None => output::detail("global: (no config directory)"),
            }
            if let Some(path) = &cli.config {
                output::detail(&format!("explicit: {}", path.display()));
            }
            let settings = load_settings(cli)?;
            output::detail(&format!("store: {}", settings.store_path.display()));
        }
        ConfigCommands::Init { force } => {
            let (Some(dir), Some(path)) = (global_config_dir(), global_config_path()) else {
                return Err(CliError::Usage(
                    "cannot determine config directory".to_string(),
                ));
            };
            if path.exists() && !force {
                return Err(CliError::Usage(format!(
                    "{} exists, use --force to overwrite",
                    path.display()
                )));
            }
            std::fs::create_dir_all(&dir).map_err(|e| InfraError::io(dir.display().to_string(), e))?;
            std::fs::write(&path, Settings::template())
                .map_err(|e| InfraError::io(path.display().to_string(), e))?;
            output::action("Created", &path.display());
        }
    }
    Ok(())
}
