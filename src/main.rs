//! # YARG Main Entry Point
//!
//! Runs a headless game driven by the autoplay bot and prints the message log.

use clap::Parser;
use log::{info, warn};
use std::path::PathBuf;
use yarg::{
    config, Autoplay, BotCommand, GameSession, GenerationConfig, RadiusFov, TurnState, YargError,
    YargResult,
};

/// Command line arguments for YARG.
#[derive(Parser, Debug)]
#[command(name = "yarg")]
#[command(about = "Turn-based dungeon crawler simulation, played by a bot")]
#[command(version)]
struct Args {
    /// Random seed for dungeon generation
    #[arg(short, long)]
    seed: Option<u64>,

    /// Maximum number of bot inputs before stopping
    #[arg(short, long, default_value_t = 1000)]
    turns: u32,

    /// Generation configuration as JSON
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Resume from a save file instead of starting a new game
    #[arg(long)]
    load: Option<PathBuf>,

    /// Write the final game state to this file
    #[arg(long)]
    save: Option<PathBuf>,

    /// Number of log messages to print at the end (0 prints all)
    #[arg(long, default_value_t = config::MESSAGE_WINDOW)]
    messages: usize,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> YargResult<()> {
    let args = Args::parse();

    initialize_logging(&args.log_level);
    info!("Starting YARG v{}", yarg::VERSION);

    let mut session = start_session(&args)?;
    play(&mut session, args.turns)?;
    print_report(&session, args.messages);

    if let Some(path) = &args.save {
        session.save_to_file(path)?;
    }
    Ok(())
}

/// Initializes `env_logger`; `RUST_LOG` takes precedence over `--log-level`.
fn initialize_logging(log_level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();
}

fn start_session(args: &Args) -> YargResult<GameSession> {
    if let Some(path) = &args.load {
        match GameSession::load_from_file(path) {
            Ok(session) => return Ok(session),
            Err(YargError::SaveNotFound(missing)) => {
                warn!("No save at {}, starting a new game", missing.display());
            }
            Err(err) => return Err(err),
        }
    }

    let mut config = match &args.config {
        Some(path) => GenerationConfig::from_json_file(path)?,
        None => GenerationConfig::new(args.seed.unwrap_or_else(rand::random)),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    info!("Generating dungeon with seed {}", config.seed);
    GameSession::new(config)
}

fn play(session: &mut GameSession, max_inputs: u32) -> YargResult<()> {
    let mut fov = RadiusFov::new(config::FOV_RADIUS);
    let origin = session.player_position();
    fov.recompute(&mut session.grid, origin);
    let mut bot = Autoplay::new();

    for _ in 0..max_inputs {
        let Some(command) = bot.next_command(session, &fov) else {
            break;
        };

        let outcome = match command {
            BotCommand::Intent(intent) => session.handle_intent(intent, &fov)?,
            BotCommand::Pointer(pointer) => session.handle_pointer(pointer, &fov)?,
        };
        if outcome.fov_recompute {
            let origin = session.player_position();
            fov.recompute(&mut session.grid, origin);
        }
        if outcome.exit {
            break;
        }
    }
    Ok(())
}

fn print_report(session: &GameSession, window: usize) {
    let messages = match window {
        0 => session.log.messages(),
        count => session.log.recent(count),
    };
    for message in messages {
        println!("{}", message.text);
    }

    let stats = &session.statistics;
    println!();
    println!(
        "Floor {} after {} turns ({})",
        session.depth,
        session.turn_number,
        if session.states.current() == TurnState::PlayerDead {
            "dead"
        } else {
            "alive"
        }
    );
    if let Some(sheet) = session.character_sheet() {
        println!(
            "Level {} ({}/{} xp), HP {}, attack {}, defense {}",
            sheet.level,
            sheet.experience,
            sheet.experience_to_level,
            session
                .player_entity()
                .and_then(|player| player.fighter.as_ref())
                .map(|fighter| fighter.hp)
                .unwrap_or(0),
            sheet.power,
            sheet.defense
        );
    }
    println!(
        "Enemies defeated: {}, items collected: {}, items used: {}, deepest floor: {}",
        stats.enemies_defeated, stats.items_collected, stats.items_used, stats.max_depth_reached
    );
}
