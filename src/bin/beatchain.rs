#![forbid(unsafe_code)]
//! Interactive shell over an in-memory BeatChain ledger.

use beatchain::cli::{Command, Outcome, Reply, Session, Tone, HELP};
use beatchain::config::{load_config, load_config_from, Config};
use beatchain::Ledger;
use clap::{Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

const LOGO: &str = r#"
╔═══════════════════════════════════════════╗
║          ♪  B E A T C H A I N  ♪          ║
║      single-node proof-of-work ledger     ║
╚═══════════════════════════════════════════╝
"#;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to ./beatchain.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Leading zero hex digits required of a sealed block
    #[arg(long, global = true)]
    difficulty: Option<u32>,
    /// Amount credited to whoever seals a block
    #[arg(long, global = true)]
    reward: Option<f64>,
    /// Threads used to search for a nonce
    #[arg(long, global = true)]
    workers: Option<usize>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Read commands from stdin until `quit` (default)
    Session,
    /// Submit, seal, validate, tamper and validate again
    Demo,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    apply_overrides(&mut config, &cli);

    let ledger = Ledger::from_config(&config)?;
    info!(
        "Ledger ready (difficulty = {}, reward = {}, workers = {})",
        ledger.difficulty(),
        ledger.reward(),
        ledger.seal_options().workers
    );
    let mut session = Session::new(ledger);

    match cli.command.unwrap_or(Commands::Session) {
        Commands::Session => interactive(&mut session)?,
        Commands::Demo => demo(&mut session)?,
    }
    Ok(())
}

fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(difficulty) = cli.difficulty {
        config.ledger.difficulty = difficulty;
    }
    if let Some(reward) = cli.reward {
        config.ledger.reward = reward;
    }
    if let Some(workers) = cli.workers {
        config.miner.workers = workers;
    }
}

fn interactive(session: &mut Session) -> io::Result<()> {
    println!("{}", LOGO.bright_magenta());
    println!("{}", "Type 'help' for the list of commands.".yellow());

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        print!("{} ", "beat>".bright_cyan().bold());
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            println!();
            return Ok(());
        }

        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("{}", e.to_string().red());
                continue;
            }
        };

        match run(session, command) {
            Outcome::Continue(reply) => print_reply(&reply),
            Outcome::Quit => return Ok(()),
        }
    }
}

fn demo(session: &mut Session) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", LOGO.bright_magenta());
    let script = [
        "submit alice bob 10 lunch",
        "pending",
        "mine alice",
        "chain",
        "pending",
        "validate",
        "tamper 1 0 free lunch",
        "validate",
    ];
    for line in script {
        println!("{} {}", "beat>".bright_cyan().bold(), line);
        if let Some(command) = Command::parse(line)? {
            if let Outcome::Continue(reply) = run(session, command) {
                print_reply(&reply);
            }
        }
    }
    Ok(())
}

/// Execute with a spinner while a seal is in progress.
fn run(session: &mut Session, command: Command) -> Outcome {
    if !matches!(command, Command::Mine { .. }) {
        return session.execute(command);
    }

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.yellow} {msg} [{elapsed}]") {
        spinner.set_style(style);
    }
    spinner.set_message(format!(
        "Sealing at difficulty {}...",
        session.ledger().difficulty()
    ));
    spinner.enable_steady_tick(Duration::from_millis(100));
    let outcome = session.execute(command);
    spinner.finish_and_clear();
    outcome
}

fn print_reply(reply: &Reply) {
    let text = match reply.tone {
        Tone::Success => format!("✅ {}", reply.text).green(),
        Tone::Warning => format!("⚠️  {}", reply.text).yellow(),
        Tone::Error => format!("❌ {}", reply.text).red(),
        Tone::Info if reply.text == HELP => reply.text.bright_white(),
        Tone::Info => reply.text.normal(),
    };
    println!("{}", text);
}
