//! Binary entrypoint for the Duskhollow CLI.
//!
//! Commands:
//! - `play [--session <id>]` - interactive game loop, persisted to the session store
//! - `validate [--world <dir>]` - load the world documents and report what they contain
//! - `init [--force]` - write a starter `config.toml`
//! - `sessions list|purge|delete <id>` - inspect and clean up the session store
//!
//! See the library crate docs for module-level details: `duskhollow::`.
use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use duskhollow::config::Config;
use duskhollow::game::{
    self, rank_for, ActionResult, GameProcessor, GameState, SessionStore, SessionStoreBuilder, WorldSource,
};
use duskhollow::metrics;

#[derive(Parser)]
#[command(name = "duskhollow")]
#[command(about = "A horror text adventure interpreter")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Play interactively
    Play {
        /// Resume an existing session instead of starting a new one
        #[arg(short, long)]
        session: Option<String>,
    },
    /// Load the world documents and report any integrity errors
    Validate {
        /// World directory (overrides game.world_dir)
        #[arg(short, long)]
        world: Option<String>,
    },
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Manage persisted sessions
    Sessions {
        #[command(subcommand)]
        action: SessionAction,
    },
}

#[derive(Subcommand)]
enum SessionAction {
    /// List live session ids
    List,
    /// Remove expired sessions
    Purge,
    /// Delete one session
    Delete { id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Init { force } = cli.command {
        init_logging(&None, cli.verbose);
        if !force && tokio::fs::try_exists(&cli.config).await? {
            return Err(anyhow!("{} already exists (use --force to overwrite)", cli.config));
        }
        Config::create_default(&cli.config).await?;
        info!("Configuration file created at {}", cli.config);
        return Ok(());
    }

    // A missing config file falls back to defaults for every other command.
    let config = match Config::load(&cli.config).await {
        Ok(config) => Some(config),
        Err(e) => {
            if tokio::fs::try_exists(&cli.config).await.unwrap_or(false) {
                return Err(e);
            }
            None
        }
    };
    init_logging(&config, cli.verbose);
    if config.is_none() {
        warn!("No config at {}; using defaults", cli.config);
    }
    let config = config.unwrap_or_default();

    match cli.command {
        Commands::Init { .. } => {}
        Commands::Validate { world } => {
            let dir = world.unwrap_or_else(|| config.game.world_dir.clone());
            let world = WorldSource::Directory(dir.clone().into()).load()?;
            println!(
                "World at {} is valid: {} rooms, {} objects, {} initial flags, start room '{}'.",
                dir,
                world.rooms.len(),
                world.objects.len(),
                world.initial_flags.len(),
                world.start_room
            );
        }
        Commands::Sessions { action } => {
            let store = open_store(&config)?;
            match action {
                SessionAction::List => {
                    let ids = store.list_session_ids()?;
                    if ids.is_empty() {
                        println!("No sessions.");
                    }
                    for id in ids {
                        match store.load_session(&id)? {
                            Some(state) => println!(
                                "{}  room={} score={} turns={} expires={}",
                                state.session_id,
                                state.current_room,
                                state.score,
                                state.turn_count,
                                state.expires_at.format("%Y-%m-%dT%H:%M:%SZ")
                            ),
                            None => println!("{}  (expired, purged)", id),
                        }
                    }
                }
                SessionAction::Purge => {
                    let purged = store.purge_expired(chrono::Utc::now())?;
                    println!("Purged {} expired sessions.", purged);
                }
                SessionAction::Delete { id } => {
                    if store.delete_session(id.trim())? {
                        println!("Deleted session {}.", id.trim());
                    } else {
                        println!("No session {}.", id.trim());
                    }
                }
            }
        }
        Commands::Play { session } => {
            let world = game::world::init(&WorldSource::Directory(config.game.world_dir.clone().into()))?;
            let processor = GameProcessor::from_config(Arc::clone(&world), &config.game);
            let store = open_store(&config)?;
            play(&config, &processor, &store, session).await?;
        }
    }

    Ok(())
}

fn open_store(config: &Config) -> Result<SessionStore> {
    Ok(SessionStoreBuilder::new(&config.storage.session_db_path)
        .ttl_hours(config.game.session_ttl_hours)
        .open()?)
}

fn render(result: &ActionResult) -> String {
    let mut out = result.message.clone();
    for note in &result.notifications {
        out.push('\n');
        out.push_str(note);
    }
    out
}

async fn play(config: &Config, processor: &GameProcessor, store: &SessionStore, session: Option<String>) -> Result<()> {
    let mut stdout = tokio::io::stdout();
    let mut state: GameState = match session {
        Some(id) => {
            let id = duskhollow::validation::validate_session_id(&id)?;
            let mut state = store
                .load_session(&id)?
                .ok_or_else(|| anyhow!("no live session {}", id))?;
            let look = processor.process(&mut state, "look");
            stdout.write_all(format!("{}\n", render(&look)).as_bytes()).await?;
            state
        }
        None => {
            let (state, intro) = processor.start_session(store)?;
            stdout
                .write_all(format!("Welcome to {}.\n\n{}\n", config.game.name, render(&intro)).as_bytes())
                .await?;
            state
        }
    };
    info!("playing session {}", state.session_id);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        stdout.write_all(b"\n> ").await?;
        stdout.flush().await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let trimmed = line.trim();
        if trimmed.eq_ignore_ascii_case("quit") || trimmed.eq_ignore_ascii_case("q") {
            break;
        }
        let result = processor.process(&mut state, trimmed);
        store.touch(&mut state)?;
        stdout.write_all(format!("{}\n", render(&result)).as_bytes()).await?;
    }

    stdout
        .write_all(
            format!(
                "\nYou leave with {} points ({}). Resume with: duskhollow play --session {}\n",
                state.score,
                rank_for(state.score),
                state.session_id
            )
            .as_bytes(),
        )
        .await?;
    let stats = metrics::snapshot();
    info!(
        "session {} closed: {} commands, {} failed, {} unknown, {} restored",
        state.session_id, stats.commands_total, stats.commands_failed, stats.unknown_commands, stats.snapshots_restored
    );
    Ok(())
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity overrides the configured level
    let level = match (verbosity, config) {
        (0, Some(cfg)) => cfg.logging.level_filter(),
        (0, None) => log::LevelFilter::Info,
        (1, _) => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(level);

    let log_file = config
        .as_ref()
        .and_then(|cfg| cfg.logging.file.as_ref())
        .and_then(|path| std::fs::OpenOptions::new().create(true).append(true).open(path).ok());

    match log_file {
        Some(file) => {
            let file = std::sync::Mutex::new(file);
            // Only mirror to the console when attached to a terminal; the game
            // transcript owns stdout otherwise.
            let is_tty = atty::is(atty::Stream::Stderr);
            builder.format(move |fmt, record| {
                let line = format!(
                    "{} [{}] {}",
                    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
                    record.level(),
                    record.args()
                );
                if let Ok(mut guard) = file.lock() {
                    let _ = writeln!(guard, "{}", line);
                }
                if is_tty {
                    writeln!(fmt, "{}", line)
                } else {
                    Ok(())
                }
            });
        }
        None => {
            builder.format(|fmt, record| {
                writeln!(
                    fmt,
                    "{} [{}] {}",
                    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
                    record.level(),
                    record.args()
                )
            });
        }
    }
    let _ = builder.try_init();
}
