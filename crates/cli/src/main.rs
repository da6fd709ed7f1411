// FILE: crates/cli/src/main.rs

use anyhow::{Context, Result};
use chaptercast_config::{Config, ConfigManager};
use chaptercast_core::{RoomId, VoiceTarget};
use chaptercast_library::{DirectoryCatalog, LoftyMetadataProvider};
use chaptercast_player::{Ports, SessionRegistry, TransportController, TransportSettings};
use clap::{value_parser, Arg, ArgMatches, Command};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

mod commands;
mod host;
mod player;

const SWEEP_PERIOD: Duration = Duration::from_secs(60);

fn build_cli() -> Command {
    Command::new("chaptercast")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Chapter-by-chapter audiobook player for voice rooms")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("DIR")
                .help("Directory holding config.toml")
                .value_parser(value_parser!(PathBuf))
                .global(true),
        )
        .arg(
            Arg::new("library")
                .short('l')
                .long("library")
                .value_name("DIR")
                .help("Library root (overrides the config file)")
                .value_parser(value_parser!(PathBuf))
                .global(true),
        )
        .subcommand(Command::new("library").about("List books and series in the library"))
        .subcommand(
            Command::new("chapters")
                .about("List the chapters of a book")
                .arg(
                    Arg::new("book")
                        .required(true)
                        .value_name("BOOK")
                        .help("Book number (N or N.M) or book directory"),
                ),
        )
        .subcommand(
            Command::new("play")
                .about("Start an interactive player session")
                .arg(
                    Arg::new("room")
                        .long("room")
                        .value_name("ID")
                        .help("Room to play in")
                        .value_parser(value_parser!(u64))
                        .default_value("1"),
                )
                .arg(
                    Arg::new("target")
                        .long("target")
                        .value_name("ID")
                        .help("Voice target to join")
                        .value_parser(value_parser!(u64))
                        .default_value("1"),
                ),
        )
        .subcommand(
            Command::new("config")
                .about("Inspect or create the configuration file")
                .subcommand(Command::new("show").about("Print the effective configuration"))
                .subcommand(Command::new("init").about("Write a default config file"))
                .subcommand(Command::new("path").about("Print the config file location")),
        )
}

fn load_config(matches: &ArgMatches) -> Result<(ConfigManager, Config)> {
    let manager = match matches.get_one::<PathBuf>("config") {
        Some(dir) => ConfigManager::with_directory(dir.clone()),
        None => ConfigManager::new().context("Failed to locate config directory")?,
    };
    let mut config = manager
        .load_with_env_overrides()
        .with_context(|| format!("Failed to load {}", manager.config_path().display()))?;
    if let Some(root) = matches.get_one::<PathBuf>("library") {
        config.library.root = root.clone();
    }
    Ok((manager, config))
}

async fn play(config: &Config, room: RoomId, target: VoiceTarget) -> Result<()> {
    let ports = Ports {
        voice: Arc::new(host::LoopbackVoice::default()),
        media: Arc::new(host::ClockedMediaFactory::new()),
        metadata: Arc::new(LoftyMetadataProvider::new()),
        catalog: Arc::new(DirectoryCatalog::from_config(&config.library)),
        notifier: Arc::new(host::ConsoleNotifier::new(config.app.display_name.clone())),
    };
    let controller = TransportController::new(
        ports,
        Arc::new(SessionRegistry::new()),
        TransportSettings::from_config(config),
    );

    let sweeper = controller.spawn_idle_sweeper(SWEEP_PERIOD);
    let result = player::run(&controller, room, target).await;
    if let Some(sweeper) = sweeper {
        sweeper.abort();
    }
    result
}

async fn chapters(config: &Config, selection: &str) -> Result<()> {
    let path = PathBuf::from(selection);
    if path.is_dir() {
        return commands::list_chapters(config, &path).await;
    }
    let entries = commands::scan(config).await?;
    let book = commands::resolve_book(&entries, selection)
        .with_context(|| format!("No book '{}' in the library", selection))?;
    commands::list_chapters(config, &book).await
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = build_cli().get_matches();
    let (manager, config) = load_config(&matches)?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.app.log_level.to_string()),
    )
    .init();
    log::debug!("config: {}", manager.config_path().display());

    match matches.subcommand() {
        Some(("library", _)) => commands::list_library(&config).await,
        Some(("chapters", sub_matches)) => {
            let book = sub_matches
                .get_one::<String>("book")
                .ok_or_else(|| anyhow::anyhow!("Book is required"))?;
            chapters(&config, book).await
        }
        Some(("play", sub_matches)) => {
            let room = sub_matches.get_one::<u64>("room").copied().unwrap_or(1);
            let target = sub_matches.get_one::<u64>("target").copied().unwrap_or(1);
            play(&config, RoomId::new(room), VoiceTarget::new(target)).await
        }
        Some(("config", sub_matches)) => match sub_matches.subcommand() {
            Some(("show", _)) => commands::show_config(&manager, &config),
            Some(("init", _)) => commands::init_config(&manager),
            Some(("path", _)) => {
                println!("{}", manager.config_path().display());
                Ok(())
            }
            _ => commands::show_config(&manager, &config),
        },
        _ => {
            build_cli().print_help()?;
            Ok(())
        }
    }
}
