//! Config CLI commands.

use std::path::{Path, PathBuf};

use clap::Subcommand;

use crate::config::template::{create_config_file, generate_config_template};
use crate::config::{CONFIG_ENV_VAR, config_paths, default_config_path, find_config_file};
use crate::error::ZoneSnapError;

/// Config management commands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum ConfigCommands {
    /// Write a starter configuration file.
    ///
    /// The file contains a default halves layout, a thirds layout and every
    /// hotkey, drag and state-tracking option with its default value.
    #[command(
        name = "init",
        after_long_help = r#"Examples:
  zonesnap config init              # Create config at default location
  zonesnap config init --force      # Overwrite existing config
  zonesnap config init --path ~/zones.jsonc
  zonesnap config init --stdout     # Print template to stdout"#
    )]
    Init {
        /// Overwrite existing configuration file if it exists.
        #[arg(long, short)]
        force: bool,

        /// Custom path for the configuration file.
        /// If not specified, uses ~/.config/zonesnap/config.jsonc
        #[arg(long, short, value_name = "PATH")]
        path: Option<PathBuf>,

        /// Print the configuration template to stdout instead of writing to a file.
        #[arg(long)]
        stdout: bool,
    },

    /// Show where the configuration file is looked up and which one is used.
    Path,
}

/// Execute config subcommands.
///
/// # Errors
///
/// Returns an error if the configuration file cannot be written.
pub fn execute(cmd: &ConfigCommands, custom: Option<&Path>) -> Result<(), ZoneSnapError> {
    match cmd {
        ConfigCommands::Init { force, path, stdout } => {
            if *stdout {
                println!("{}", generate_config_template());
                Ok(())
            } else {
                let target = path.clone().or_else(|| custom.map(Path::to_path_buf));
                init_config(*force, target).map(|path| {
                    println!("Configuration file created at: {}", path.display());
                })
            }
        }
        ConfigCommands::Path => {
            show_config_path(custom);
            Ok(())
        }
    }
}

/// Writes the template and returns the path written.
fn init_config(force: bool, custom_path: Option<PathBuf>) -> Result<PathBuf, ZoneSnapError> {
    let config_path = custom_path
        .or_else(default_config_path)
        .unwrap_or_else(|| PathBuf::from("config.jsonc"));

    if config_path.exists() && !force {
        return Err(ZoneSnapError::InvalidArguments(format!(
            "Configuration file already exists at: {}\nUse --force to overwrite.",
            config_path.display()
        )));
    }

    create_config_file(&config_path)?;
    tracing::debug!(path = %config_path.display(), "configuration template written");
    Ok(config_path)
}

fn show_config_path(custom: Option<&Path>) {
    if let Some(path) = custom {
        println!("Using --config: {}", path.display());
        return;
    }

    if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
        println!("Using {CONFIG_ENV_VAR}: {}", Path::new(&path).display());
        return;
    }

    println!("Configuration file search paths (in priority order):\n");

    let active = find_config_file();
    for (i, path) in config_paths().iter().enumerate() {
        let marker = if active.as_ref() == Some(path) {
            " (active)"
        } else if path.exists() {
            " (exists)"
        } else {
            ""
        };
        println!("  {}. {}{}", i + 1, path.display(), marker);
    }

    if active.is_none() {
        println!("\nNo configuration file found.");
        println!("Run 'zonesnap config init' to create one.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;

    #[test]
    fn test_init_writes_loadable_template() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.jsonc");

        let written = init_config(false, Some(path.clone())).unwrap();
        assert_eq!(written, path);
        assert!(Settings::load(&path).is_ok());
    }

    #[test]
    fn test_init_refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.jsonc");
        std::fs::write(&path, "{}").unwrap();

        assert!(matches!(
            init_config(false, Some(path.clone())),
            Err(ZoneSnapError::InvalidArguments(_))
        ));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");

        init_config(true, Some(path.clone())).unwrap();
        assert!(Settings::load(&path).is_ok());
    }
}
