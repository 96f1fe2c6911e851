//! CLI command definitions using Clap.
//!
//! - `zones` - resolve layouts against a monitor list
//! - `config_cmd` - configuration file management

use std::io;
use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Generator, Shell, generate};

use crate::error::ZoneSnapError;
use crate::schema;

pub mod config_cmd;
pub mod zones;

pub use config_cmd::ConfigCommands;

/// Application version from Cargo.toml.
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// ZoneSnap CLI - inspect zone layouts and manage the configuration.
#[derive(Parser, Debug)]
#[command(name = "zonesnap")]
#[command(author, version = APP_VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a custom configuration file.
    ///
    /// Overrides the `ZONESNAP_CONFIG` variable and the default search paths.
    /// Supports JSONC format (JSON with comments).
    #[arg(long, short, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log at debug level. `ZONESNAP_LOG` takes precedence when set.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum Commands {
    /// Resolve zones to pixel rectangles.
    ///
    /// Resolves the configured layouts against a monitor list and prints
    /// every zone with its number and overlay label.
    #[command(after_long_help = r#"Examples:
  zonesnap zones                          # Active layout on a 1920x1080 monitor
  zonesnap zones --layout thirds          # Another layout
  zonesnap zones --monitors displays.json # Monitors from a JSON file
  zonesnap zones --json                   # JSON output"#)]
    Zones {
        /// JSON file with a list of monitors (`bounds`, `work_area`, `is_primary`).
        #[arg(long, short, value_name = "FILE")]
        monitors: Option<PathBuf>,

        /// Layout to resolve instead of the startup layout.
        #[arg(long, short, value_name = "NAME")]
        layout: Option<String>,

        /// Output in JSON format instead of a table.
        #[arg(long, short)]
        json: bool,
    },

    /// List the configured layouts.
    Layouts,

    /// List hotkey bindings and monitor keys.
    Hotkeys {
        /// Output in JSON format instead of tables.
        #[arg(long, short)]
        json: bool,
    },

    /// Load and validate the configuration file.
    Check,

    /// Configuration file management commands.
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Output the configuration JSON Schema.
    ///
    /// Can be redirected to a file for use with editors that support JSON
    /// Schema validation.
    Schema,

    /// Generate shell completions.
    ///
    /// Usage:
    ///   eval "$(zonesnap completions --shell zsh)"
    ///   zonesnap completions --shell fish > ~/.config/fish/completions/zonesnap.fish
    Completions {
        /// The shell to generate completions for.
        #[arg(long, short, value_enum)]
        shell: Shell,
    },
}

impl Cli {
    #[must_use]
    pub fn config_path(&self) -> Option<&Path> { self.config.as_deref() }

    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or the command
    /// fails.
    pub fn execute(&self) -> Result<(), ZoneSnapError> {
        if let Some(path) = self.config_path()
            && !path.exists()
        {
            return Err(ZoneSnapError::InvalidArguments(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        match &self.command {
            Commands::Zones { monitors, layout, json } => {
                zones::show_zones(self.config_path(), monitors.as_deref(), layout.as_deref(), *json)
            }
            Commands::Layouts => zones::show_layouts(self.config_path()),
            Commands::Hotkeys { json } => zones::show_hotkeys(self.config_path(), *json),
            Commands::Check => zones::check(self.config_path()),
            Commands::Config(cmd) => config_cmd::execute(cmd, self.config_path()),

            Commands::Schema => {
                println!("{}", schema::print_schema());
                Ok(())
            }

            Commands::Completions { shell } => {
                Self::print_completions(*shell);
                Ok(())
            }
        }
    }

    /// Print shell completions to stdout.
    fn print_completions<G: Generator>(generator: G) {
        let mut cmd = Self::command();
        generate(generator, &mut cmd, "zonesnap", &mut io::stdout());
    }
}
