use std::path::PathBuf;

use clap::Subcommand;
use mathmagic_core::DrillConfig;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show {
        /// Configuration file to load instead of the defaults
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Get a config value
    Get {
        /// Config key (e.g. "study.target", "recall.deadline_ms")
        key: String,
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show { config } => {
            let config = DrillConfig::load_or_default(config.as_deref())?;
            print!("{}", config.to_toml_string()?);
        }
        ConfigAction::Get { key, config } => {
            let config = DrillConfig::load_or_default(config.as_deref())?;
            println!("{}", config.get(&key)?);
        }
    }
    Ok(())
}
