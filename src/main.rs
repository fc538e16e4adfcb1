//! Connect6 engine over a line-based text protocol
//!
//! Commands arrive on stdin, replies go to stdout and logs to stderr.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info, warn};

use connect6::board::{Move, Stone, CENTER};
use connect6::config::EngineConfig;
use connect6::engine::{Engine, MoveResult};
use connect6::error::EngineError;
use connect6::protocol::{parse_command, Command, HELP};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Iterative deepening cap
    #[arg(long)]
    depth: Option<i8>,

    /// Seconds per move
    #[arg(long)]
    time: Option<f64>,

    /// Transposition table entries
    #[arg(long)]
    tt_capacity: Option<usize>,

    /// Name reported by the `name` command
    #[arg(long, default_value = "connect6")]
    name: String,
}

fn main() {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, log_level),
    );
    builder
        .format(|buf, record| {
            writeln!(buf, "[{}] {}: {}", record.level(), record.target(), record.args())
        })
        .write_style(env_logger::WriteStyle::Never)
        .target(env_logger::Target::Stderr);
    builder.init();

    if let Err(e) = run(args) {
        log::error!("Fatal error: {e:#}");
        std::process::exit(1);
    }
}

fn initial_config(args: &Args) -> Result<EngineConfig> {
    let mut config = EngineConfig::default();
    if let Some(depth) = args.depth {
        config
            .set_option("searchDepthLimit", &depth.to_string())
            .context("--depth")?;
    }
    if let Some(time) = args.time {
        config
            .set_option("timeLimitSeconds", &time.to_string())
            .context("--time")?;
    }
    if let Some(capacity) = args.tt_capacity {
        config
            .set_option("transpositionTableCapacity", &capacity.to_string())
            .context("--tt-capacity")?;
    }
    Ok(config)
}

fn run(args: Args) -> Result<()> {
    let config = initial_config(&args)?;
    info!(
        "{} starting: depth {}, {:.1}s per move, table {} entries",
        args.name,
        config.search_depth_limit,
        config.time_limit.as_secs_f64(),
        config.tt_capacity
    );
    let mut session = Session {
        engine: Engine::new(config),
        name: args.name,
        out: io::stdout().lock(),
    };

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("failed to read stdin")?;
        if line.trim().is_empty() {
            continue;
        }
        debug!("<< {line}");
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(e) => {
                warn!("rejected line '{}': {e:#}", line.trim());
                session.reply(&format!("error: {e:#}"))?;
                continue;
            }
        };
        if !session.handle(command)? {
            break;
        }
    }
    info!("{} shutting down", session.name);
    Ok(())
}

struct Session<W: Write> {
    engine: Engine,
    name: String,
    out: W,
}

impl<W: Write> Session<W> {
    fn reply(&mut self, text: &str) -> Result<()> {
        writeln!(self.out, "{text}").context("failed to write reply")?;
        self.out.flush().context("failed to flush stdout")
    }

    /// Returns `false` once the loop should stop.
    fn handle(&mut self, command: Command) -> Result<bool> {
        match command {
            Command::Quit => return Ok(false),
            Command::Name => {
                let reply = format!("name {}", self.name);
                self.reply(&reply)?;
            }
            Command::Help => self.reply(HELP)?,
            Command::Print => {
                let board = self.engine.position().board().to_string();
                self.reply(board.trim_end())?;
            }
            Command::Ignored => {}
            Command::Black(mv) => self.place(Stone::Black, mv)?,
            Command::White(mv) => self.place(Stone::White, mv)?,
            Command::Next => self.respond()?,
            Command::Move(mv) => {
                if let Err(e) = self.engine.play(mv) {
                    self.reply(&format!("error: {e}"))?;
                } else if let Some(winner) = self.engine.winner() {
                    info!("{winner} completed six with {mv}");
                } else {
                    self.respond()?;
                }
            }
            Command::New(color) => {
                self.engine.new_game(color);
                if color == Stone::Black {
                    let opening = Move::single(CENTER);
                    self.engine.place(Stone::Black, opening)?;
                    self.reply(&format!("move {opening}"))?;
                }
            }
            Command::Depth(level) => {
                self.engine.apply_depth_command(level);
                let config = self.engine.config();
                let reply = format!(
                    "Time limit: {}s, Depth: {}",
                    config.time_limit.as_secs(),
                    config.search_depth_limit
                );
                self.reply(&reply)?;
            }
            Command::SetOption { name, value } => {
                if let Err(e) = self.engine.set_option(&name, &value) {
                    warn!("{e}");
                    self.reply(&format!("error: {e}"))?;
                }
            }
        }
        Ok(true)
    }

    fn place(&mut self, color: Stone, mv: Move) -> Result<()> {
        if let Err(e) = self.engine.place(color, mv) {
            self.reply(&format!("error: {e}"))?;
        }
        Ok(())
    }

    /// Search for the side to move, play the result and announce it.
    fn respond(&mut self) -> Result<()> {
        match self.engine.go() {
            Ok(result) => {
                log_result(&result);
                self.reply(&format!("move {}", result.best_move))
            }
            Err(EngineError::NoLegalMove) => {
                info!("board is full, game drawn");
                self.reply("draw")
            }
            Err(e) => self.reply(&format!("error: {e}")),
        }
    }
}

fn log_result(result: &MoveResult) {
    debug!(
        "{} via {:?}: score {}, depth {}, {} nodes ({} quiescence), {:.0}% first-move cutoffs, {} ms",
        result.best_move,
        result.source,
        result.score,
        result.stats.depth_completed,
        result.stats.nodes,
        result.stats.qs_nodes,
        result.stats.first_move_rate(),
        result.time_ms
    );
}
