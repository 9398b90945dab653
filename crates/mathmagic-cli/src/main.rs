use clap::{Parser, Subcommand};

mod commands;
mod logging;
mod terminal;

#[derive(Parser)]
#[command(name = "mathmagic", version, about = "Math Magic addition drill")]
struct Cli {
    /// Defaults to `play`
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play the drill in this terminal
    Play(commands::play::PlayArgs),
    /// Configuration inspection
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Run a headless session with a scripted learner
    Simulate(commands::simulate::SimulateArgs),
}

fn main() {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Commands::Play(commands::play::PlayArgs::default()));
    let result = match command {
        Commands::Play(args) => commands::play::run(args),
        Commands::Config { action } => commands::config::run(action),
        Commands::Simulate(args) => commands::simulate::run(args),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
