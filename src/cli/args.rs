use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

/// Command line arguments for LensCtl
#[derive(Parser, Debug)]
#[command(
    name = "lensctl",
    version = env!("CARGO_PKG_VERSION"),
    about = "Control motorized lens adapters over Telnet",
    long_about = "Drives focus and aperture of a motorized lens adapter reachable through a Telnet serial bridge, keeping the connection alive and reconnecting transparently when it drops."
)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress log output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Configured device to talk to
    #[arg(short, long, global = true)]
    pub device: Option<String>,

    /// Adapter host, overriding the configured device
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Adapter port, overriding the configured device
    #[arg(long, global = true)]
    pub port: Option<u16>,

    /// Skip aperture init and focus learning on connect
    #[arg(long, global = true)]
    pub no_init: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    pub output: OutputFormat,

    /// Command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Read or move focus
    Focus(MotorArgs),
    /// Read or move aperture
    Aperture(MotorArgs),
    /// Read the adapter serial number
    Serial,
    /// Read the adapter library version
    Version,
    /// Read extended lens information
    LensInfo,
    /// Check whether a lens is attached
    LensPresent,
    /// Read every identification and position value
    Info,
    /// Send a raw request line and print the reported value
    Raw {
        /// Request text, without line terminator
        request: String,
    },
    /// Configuration management commands
    Config(ConfigArgs),
    /// Display lensctl version information
    About,
}

/// Output format options
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output
    Json,
    /// Table output
    Table,
}

/// Focus or aperture arguments
#[derive(ClapArgs, Debug)]
pub struct MotorArgs {
    #[command(subcommand)]
    pub action: MotorAction,
}

/// Focus or aperture subcommands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum MotorAction {
    /// Read the current position
    Get,
    /// Move to a position; -1 and 0 select the mechanical stops
    Set {
        #[arg(allow_negative_numbers = true)]
        value: i64,
    },
}

/// Configuration management arguments
#[derive(ClapArgs, Debug)]
pub struct ConfigArgs {
    /// Configuration subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Configuration subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,
    /// Create a project configuration with an example device
    Init {
        /// Directory to create .lensctl/ in (default: current directory)
        path: Option<String>,
    },
    /// List device configurations
    Devices,
}
