//! `wsctx` - inspect and switch the active workspace

mod config;
mod output;

use anyhow::Context as _;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use config::AppConfig;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use wsctx_client::HttpWorkspaceService;
use wsctx_model::{NewWorkspace, WorkspaceId};
use wsctx_store::{FilePersistence, PersistenceAdapter, RemoteWorkspaceService, WorkspaceStore};

fn json_flag() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Output as JSON")
}

fn cli() -> Command {
    Command::new("wsctx")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Workspace context switcher")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Path to config.toml"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log debug output to stderr"),
        )
        .subcommand(
            Command::new("list")
                .about("List workspaces, marking the active one")
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("current")
                .about("Show the active workspace")
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("switch")
                .about("Switch the active workspace")
                .arg(
                    Arg::new("id")
                        .required_unless_present("personal")
                        .conflicts_with("personal")
                        .help("Workspace id"),
                )
                .arg(
                    Arg::new("personal")
                        .long("personal")
                        .action(ArgAction::SetTrue)
                        .help("Switch to the personal workspace"),
                )
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("create")
                .about("Create a shared workspace and switch to it")
                .arg(
                    Arg::new("name")
                        .long("name")
                        .required(true)
                        .help("Display name"),
                )
                .arg(Arg::new("description").long("description").help("Description"))
                .arg(Arg::new("logo-url").long("logo-url").help("Logo URL"))
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("permissions")
                .about("Show capability flags for the active workspace")
                .arg(json_flag()),
        )
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn open_store(config: &AppConfig) -> anyhow::Result<WorkspaceStore> {
    let remote = HttpWorkspaceService::new(&config.api).context("invalid api configuration")?;
    let state_path = config.state_path();
    tracing::debug!("Using state file {}", state_path.display());

    let store = WorkspaceStore::new(
        Arc::new(remote) as Arc<dyn RemoteWorkspaceService>,
        Arc::new(FilePersistence::new(state_path)) as Arc<dyn PersistenceAdapter>,
        config.store.clone(),
    );
    store.init().await;
    Ok(store)
}

fn print_json(value: &serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(matches: ArgMatches) -> anyhow::Result<()> {
    let config = AppConfig::load(matches.get_one::<PathBuf>("config").map(PathBuf::as_path))?;
    let kind = config.store.kind;
    let store = open_store(&config).await?;

    match matches.subcommand() {
        Some(("list", args)) => {
            let state = store.state();
            if args.get_flag("json") {
                print_json(&output::list_json(&state))?;
            } else {
                print!("{}", output::render_list(&state, kind));
            }
        }
        Some(("current", args)) => {
            let active = store.active();
            if args.get_flag("json") {
                print_json(&output::active_json(&active))?;
            } else {
                println!("{}", output::describe(&active, kind));
            }
        }
        Some(("switch", args)) => {
            let target = args.get_one::<String>("id").map(|id| WorkspaceId::new(id.as_str()));
            let active = store
                .switch_to(target)
                .await
                .with_context(|| format!("failed to switch {}", kind.label().to_lowercase()))?;
            if args.get_flag("json") {
                print_json(&output::active_json(&active))?;
            } else {
                println!("Switched to {}", output::describe(&active, kind));
            }
        }
        Some(("create", args)) => {
            let mut data = NewWorkspace::new(
                args.get_one::<String>("name")
                    .map(String::as_str)
                    .unwrap_or_default(),
            );
            data.description = args.get_one::<String>("description").cloned();
            data.logo_url = args.get_one::<String>("logo-url").cloned();

            match store.create(data).await {
                Ok(active) => {
                    if args.get_flag("json") {
                        print_json(&output::active_json(&active))?;
                    } else {
                        println!("Created and switched to {}", output::describe(&active, kind));
                    }
                }
                Err(e) => {
                    if let Some(created) = e.created_workspace() {
                        eprintln!(
                            "{} {} was created but is not active; run `wsctx switch {}`",
                            kind.label(),
                            created.name,
                            created.id_str().unwrap_or_default()
                        );
                    }
                    return Err(e)
                        .context(format!("failed to create {}", kind.label().to_lowercase()));
                }
            }
        }
        Some(("permissions", args)) => {
            let state = store.state();
            let perms = state.permissions();
            if args.get_flag("json") {
                print_json(&serde_json::to_value(perms)?)?;
            } else {
                println!("{}", output::describe(&state.active, kind));
                print!("{}", output::render_permissions(&perms));
            }
        }
        _ => {}
    }

    store.dispose();
    Ok(())
}

#[tokio::main]
async fn main() {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("verbose"));

    if let Err(e) = run(matches).await {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
