//! `chatbot-studio`: edit, version and publish chatbot configurations

mod edit;
mod logging;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use studio_core::{Studio, StudioConfig};
use studio_model::{ChatbotId, Configuration, DeploymentSurface, VersionId, VersioningEngine};
use studio_store::CommitOutcome;

use crate::edit::DraftEdits;

fn id_arg() -> Arg {
    Arg::new("id")
        .required(true)
        .help("Configuration id")
}

fn edit_args(command: Command, rename: bool) -> Command {
    let command = if rename {
        command.arg(Arg::new("name").long("name").help("New display name"))
    } else {
        command
    };
    command
        .arg(Arg::new("description").long("description").help("New description"))
        .arg(Arg::new("website").long("website").help("Website the chatbot runs on"))
        .arg(
            Arg::new("surface")
                .long("surface")
                .value_parser(value_parser!(DeploymentSurface))
                .help("Deployment surface: popover, fullpage or popup-center"),
        )
        .arg(
            Arg::new("domain")
                .long("domain")
                .help("Custom domain serving the loader (empty to clear)"),
        )
        .arg(
            Arg::new("set")
                .long("set")
                .action(ArgAction::Append)
                .value_name("PATH=VALUE")
                .help("Presentation field, e.g. colors.primary=#16a34a"),
        )
}

fn build_cli() -> Command {
    Command::new("chatbot-studio")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Versioned chatbot configuration studio")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Path to a TOML config file"),
        )
        .arg(
            Arg::new("cache-dir")
                .long("cache-dir")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Directory of the local cache"),
        )
        .arg(
            Arg::new("remote")
                .long("remote")
                .global(true)
                .help("Base URL of the remote configuration store"),
        )
        .arg(
            Arg::new("author")
                .long("author")
                .global(true)
                .help("Author written into version records"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .global(true)
                .default_value("info")
                .help("Log filter when RUST_LOG is unset"),
        )
        .arg(
            Arg::new("json-logs")
                .long("json-logs")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON"),
        )
        .subcommand(
            Command::new("list").about("List configurations").arg(
                Arg::new("json")
                    .long("json")
                    .action(ArgAction::SetTrue)
                    .help("Output as JSON"),
            ),
        )
        .subcommand(edit_args(
            Command::new("create")
                .about("Create a draft with default values")
                .arg(Arg::new("name").required(true).help("Display name")),
            false,
        ))
        .subcommand(Command::new("show").about("Print a configuration").arg(id_arg()))
        .subcommand(edit_args(
            Command::new("save")
                .about("Apply edits and save a new version")
                .arg(id_arg())
                .arg(
                    Arg::new("message")
                        .short('m')
                        .long("message")
                        .default_value("")
                        .help("Description of the changes"),
                ),
            true,
        ))
        .subcommand(Command::new("publish").about("Publish the current version").arg(id_arg()))
        .subcommand(Command::new("versions").about("Show version history").arg(id_arg()))
        .subcommand(
            Command::new("rollback")
                .about("Restore a recorded version as a new save")
                .arg(id_arg())
                .arg(Arg::new("version").required(true).help("Version record id")),
        )
        .subcommand(
            Command::new("duplicate")
                .about("Copy a configuration under a new id")
                .arg(id_arg())
                .arg(Arg::new("name").long("name").help("Name of the copy")),
        )
        .subcommand(Command::new("delete").about("Delete a configuration").arg(id_arg()))
        .subcommand(
            Command::new("import")
                .about("Import a JSON or YAML configuration document")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            Command::new("export")
                .about("Export a configuration document")
                .arg(id_arg())
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .value_parser(value_parser!(PathBuf))
                        .help("Write to a file instead of stdout"),
                ),
        )
        .subcommand(Command::new("embed").about("Print the embed snippet").arg(id_arg()))
        .subcommand(Command::new("preview").about("Print the preview URL").arg(id_arg()))
        .subcommand(Command::new("pull").about("Mirror the remote store into the local cache"))
}

fn load_config(matches: &ArgMatches) -> Result<StudioConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => StudioConfig::load(path)?,
        None => StudioConfig::default(),
    };
    if let Some(dir) = matches.get_one::<PathBuf>("cache-dir") {
        config = config.with_cache_dir(dir.clone());
    }
    if let Some(remote) = matches.get_one::<String>("remote") {
        config = config.with_remote(remote.clone());
    }
    if let Some(author) = matches.get_one::<String>("author") {
        config = config.with_author(author.clone());
    }
    config.validate()?;
    Ok(config)
}

fn edits_from(args: &ArgMatches) -> DraftEdits {
    let text = |key: &str| args.get_one::<String>(key).cloned();
    DraftEdits {
        name: text("name"),
        description: text("description"),
        website: text("website"),
        surface: args.get_one::<DeploymentSurface>("surface").copied(),
        custom_domain: text("domain"),
        presentation: args
            .get_many::<String>("set")
            .map(|values| values.cloned().collect())
            .unwrap_or_default(),
    }
}

fn id_from(args: &ArgMatches) -> ChatbotId {
    ChatbotId::from_raw(args.get_one::<String>("id").cloned().unwrap_or_default())
}

fn print_summary(config: &Configuration) {
    let state = VersioningEngine::state(config);
    println!(
        "{}  {}  v{}  {:?}  {}",
        config.id,
        config.name,
        config.current_version,
        state,
        if config.persistence_state.is_remote() {
            "remote"
        } else {
            "local-only"
        }
    );
}

fn print_outcome(outcome: &CommitOutcome) {
    println!(
        "saved {} as version {} ({})",
        outcome.config.id, outcome.record.version, outcome.location
    );
    if let Some(warning) = &outcome.warning {
        eprintln!("warning: remote store did not accept the save, kept locally: {warning}");
    }
}

async fn run(matches: &ArgMatches) -> Result<()> {
    let mut studio = Studio::open(load_config(matches)?)?;

    match matches.subcommand() {
        Some(("list", args)) => {
            let configs = studio.list()?;
            if args.get_flag("json") {
                let wire = configs
                    .iter()
                    .map(Configuration::to_wire)
                    .collect::<Result<Vec<_>, _>>()?;
                println!("{}", serde_json::to_string_pretty(&wire)?);
            } else {
                configs.iter().for_each(print_summary);
            }
        }
        Some(("create", args)) => {
            let name = args.get_one::<String>("name").cloned().unwrap_or_default();
            let mut config = studio.create(&name)?;
            let edits = DraftEdits {
                name: None,
                ..edits_from(args)
            };
            if !edits.is_empty() {
                edits.apply(&mut config)?;
                studio.store().stage(&config)?;
            }
            print_summary(&config);
        }
        Some(("show", args)) => {
            let config = studio.get(&id_from(args))?;
            println!("{}", serde_json::to_string_pretty(&config.to_wire()?)?);
        }
        Some(("save", args)) => {
            let mut config = studio.get(&id_from(args))?;
            edits_from(args).apply(&mut config)?;
            let message = args.get_one::<String>("message").cloned().unwrap_or_default();
            let outcome = studio.save(&config, &message).await?;
            print_outcome(&outcome);
        }
        Some(("publish", args)) => {
            let config = studio.get(&id_from(args))?;
            let outcome = studio.publish(&config).await?;
            print_outcome(&outcome);
            println!("published version {}", outcome.record.version);
        }
        Some(("versions", args)) => {
            for record in studio.history(&id_from(args))? {
                println!(
                    "{}  {:<6}  {}  {}  {}{}",
                    record.id,
                    record.version,
                    record.created_at.to_rfc3339(),
                    record.created_by,
                    record.changes,
                    if record.is_published { "  [published]" } else { "" }
                );
            }
        }
        Some(("rollback", args)) => {
            let version = VersionId::from_raw(args.get_one::<String>("version").cloned().unwrap_or_default());
            let outcome = studio.rollback(&id_from(args), &version).await?;
            print_outcome(&outcome);
        }
        Some(("duplicate", args)) => {
            let name = args.get_one::<String>("name").map(String::as_str);
            let copy = studio.duplicate(&id_from(args), name)?;
            print_summary(&copy);
        }
        Some(("delete", args)) => {
            let removed = studio.delete(&id_from(args)).await?;
            println!("deleted {} ({})", removed.id, removed.name);
        }
        Some(("import", args)) => {
            let path = args
                .get_one::<PathBuf>("file")
                .context("import needs a file")?;
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let config = studio.import(&text)?;
            print_summary(&config);
        }
        Some(("export", args)) => {
            let document = studio.export(&id_from(args))?;
            match args.get_one::<PathBuf>("output") {
                Some(path) => std::fs::write(path, document)
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => println!("{document}"),
            }
        }
        Some(("embed", args)) => println!("{}", studio.embed_code(&id_from(args))?),
        Some(("preview", args)) => println!("{}", studio.preview_url(&id_from(args))?),
        Some(("pull", _)) => {
            let report = studio.pull().await?;
            println!("pulled: {} updated, {} kept newer local copy", report.updated, report.skipped);
        }
        _ => {}
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = build_cli().get_matches();

    let level = matches
        .get_one::<String>("log-level")
        .map_or("info", String::as_str);
    logging::init(level, matches.get_flag("json-logs"))?;

    if let Err(err) = run(&matches).await {
        tracing::error!(error = %err, "command failed");
        return Err(err);
    }
    Ok(())
}
