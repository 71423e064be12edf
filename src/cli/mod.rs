//! Command-line front-end.
//!
//! [`Cli`] holds the clap definitions; [`CliController`] turns a parsed
//! command into calls on the install services, pulling default paths from
//! the settings file and passing them in explicitly.

pub mod controller;

pub use controller::CliController;

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};

/// Install and uninstall Hades modpacks
#[derive(Parser, Debug)]
#[command(name = "modpack-manager", author, version, about)]
pub struct Cli {
    /// Directory holding settings and the trusted importer list
    #[arg(long, global = true, default_value = "Modpack Manager Data")]
    pub config_dir: Utf8PathBuf,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show which modpack is installed
    Status {
        /// Hades, Content or Mods folder (defaults to the configured path)
        #[arg(long)]
        hades: Option<Utf8PathBuf>,
    },

    /// Install a modpack and run its modimporter
    Install {
        /// Modpack zip path, or a modpack name in the modpack folder
        /// (defaults to the selected modpack)
        modpack: Option<String>,

        /// Hades, Content or Mods folder (defaults to the configured path)
        #[arg(long)]
        hades: Option<Utf8PathBuf>,

        /// Uninstall whatever is installed first
        #[arg(long)]
        replace: bool,
    },

    /// Remove the installed modpack and rerun modimporter
    Uninstall {
        /// Hades, Content or Mods folder (defaults to the configured path)
        #[arg(long)]
        hades: Option<Utf8PathBuf>,
    },

    /// Check that a zip is a usable modpack
    Validate {
        modpack: String,
    },

    /// List the mods inside a modpack
    Units {
        modpack: String,
    },

    /// List modpacks in the modpack folder
    List,

    /// Show or change saved settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Maintain the trusted modimporter list
    Trust {
        #[command(subcommand)]
        action: TrustAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the current settings
    Show,
    /// Remember the Hades folder
    SetHadesPath { path: Utf8PathBuf },
    /// Remember the folder modpacks are listed from
    SetModpackFolder { path: Utf8PathBuf },
    /// Select the modpack `install` uses by default
    Select { modpack: String },
}

#[derive(Subcommand, Debug)]
pub enum TrustAction {
    /// Hash every script in a folder and write the trusted list
    Build {
        /// Folder of vetted modimporter.py versions
        dir: Utf8PathBuf,
        /// Where to write the list
        output: Utf8PathBuf,
    },
}
