//! `regtrim config` — locate, show and validate classifier configs.

use std::path::{Path, PathBuf};

use clap::Subcommand;
use log::info;
use regtrim_classifier::ClassifierConfig;

use crate::CliError;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Parse and validate a classifier config file
    #[command(after_help = "\
Examples:
  regtrim config validate classifier.toml")]
    Validate {
        /// Path to the classifier TOML file
        file: PathBuf,
    },

    /// Print the config `resolve` would use, as TOML
    #[command(after_help = "\
Examples:
  regtrim config show
  regtrim config show --config classifier.toml
  regtrim config show > ~/.config/regtrim/classifier.toml")]
    Show {
        /// Config file (default: <config dir>/regtrim/classifier.toml, else built-in)
        #[arg(long, env = "REGTRIM_CONFIG")]
        config: Option<PathBuf>,
    },
}

pub fn cmd_config(cmd: ConfigCommands) -> Result<(), CliError> {
    match cmd {
        ConfigCommands::Validate { file } => cmd_config_validate(&file),
        ConfigCommands::Show { config } => cmd_config_show(config.as_deref()),
    }
}

/// `<config dir>/regtrim/classifier.toml`, when the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("regtrim").join("classifier.toml"))
}

/// Config from an explicit path, else the per-user file when present, else
/// the built-in corrections.
pub fn load_config(explicit: Option<&Path>) -> Result<ClassifierConfig, CliError> {
    let path = match explicit {
        Some(p) => Some(p.to_path_buf()),
        None => default_config_path().filter(|p| p.is_file()),
    };
    match path {
        Some(path) => {
            info!("using config {}", path.display());
            read_config(&path)
        }
        None => {
            info!("using built-in config");
            Ok(ClassifierConfig::builtin())
        }
    }
}

fn read_config(path: &Path) -> Result<ClassifierConfig, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::input(format!("cannot read {}: {e}", path.display())))?;
    ClassifierConfig::from_toml(&text).map_err(CliError::classify)
}

fn cmd_config_validate(file: &Path) -> Result<(), CliError> {
    let config = read_config(file)?;
    let le = &config.limited_edition;
    println!(
        "ok: {} overrides, limited edition {} ({} at {}, {} listed plates)",
        config.overrides.len(),
        le.label,
        le.variant,
        le.price,
        le.plates.len(),
    );
    Ok(())
}

fn cmd_config_show(explicit: Option<&Path>) -> Result<(), CliError> {
    let config = load_config(explicit)?;
    let text = toml::to_string_pretty(&config)
        .map_err(|e| CliError::general(format!("TOML serialization error: {e}")))?;
    print!("{text}");
    Ok(())
}
