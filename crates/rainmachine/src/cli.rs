//! Clap derive structures for the `rainmachine` CLI.
//!
//! Defines the command tree, global flags, and shared types. Kept free of
//! crate-internal imports so `build.rs` can render man pages from it.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// rainmachine -- control RainMachine irrigation controllers
#[derive(Debug, Parser)]
#[command(
    name = "rainmachine",
    version,
    about = "Control RainMachine irrigation controllers from the command line",
    long_about = "Talks to a RainMachine controller directly on the LAN, or to every\n\
        controller linked to a cloud account through the remote relay.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Configuration profile to use
    #[arg(long, short = 'p', env = "RAINMACHINE_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Controller host on the LAN (overrides profile)
    #[arg(long, short = 'H', env = "RAINMACHINE_HOST", global = true, conflicts_with = "email")]
    pub host: Option<String>,

    /// Controller port on the LAN
    #[arg(long, env = "RAINMACHINE_PORT", global = true)]
    pub port: Option<u16>,

    /// Use plain HTTP for LAN controllers
    #[arg(long, global = true)]
    pub no_ssl: bool,

    /// Cloud account email (overrides profile)
    #[arg(long, short = 'e', env = "RAINMACHINE_EMAIL", global = true)]
    pub email: Option<String>,

    /// Environment variable holding the password
    #[arg(long, global = true)]
    pub password_env: Option<String>,

    /// Controller MAC address when several are registered
    #[arg(long, short = 'm', env = "RAINMACHINE_MAC", global = true)]
    pub mac: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "RAINMACHINE_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Request timeout in seconds (overrides profile and defaults)
    #[arg(long, env = "RAINMACHINE_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one identifier per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Find a controller on the local network
    Discover(DiscoverArgs),

    /// List the controllers reachable with the current credentials
    #[command(alias = "ls")]
    Controllers,

    /// Show API, hardware and software versions
    Versions,

    /// Manage watering programs
    #[command(alias = "prog")]
    Programs(ProgramsArgs),

    /// Manage zones
    #[command(alias = "z")]
    Zones(ZonesArgs),

    /// Watering history, queue and global controls
    #[command(alias = "w")]
    Watering(WateringArgs),

    /// Diagnostics and device log
    Diag(DiagArgs),

    /// Device name, network and system settings
    Provision(ProvisionArgs),

    /// Watering restrictions and rain delay
    Restrictions(RestrictionsArgs),

    /// Daily watering statistics
    Stats(StatsArgs),

    /// Firmware updates and reboot
    Machine(MachineArgs),

    /// Weather data parsers
    Parsers(ParsersArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Discover ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DiscoverArgs {
    /// Seconds to wait for a reply
    #[arg(long, default_value = "5")]
    pub wait: u64,
}

// ── Programs ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ProgramsArgs {
    #[command(subcommand)]
    pub command: ProgramsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ProgramsCommand {
    /// List programs
    #[command(alias = "ls")]
    List {
        /// Include inactive programs
        #[arg(long, short = 'a')]
        all: bool,
    },

    /// Show one program
    Get { uid: u32 },

    /// Start a program now
    Start { uid: u32 },

    /// Stop a running program
    Stop { uid: u32 },

    /// Activate a program
    Enable { uid: u32 },

    /// Deactivate a program
    Disable { uid: u32 },

    /// Show upcoming program start times
    Next,

    /// List programs that are watering right now
    Running,
}

// ── Zones ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ZonesArgs {
    #[command(subcommand)]
    pub command: ZonesCommand,
}

#[derive(Debug, Subcommand)]
pub enum ZonesCommand {
    /// List zones
    #[command(alias = "ls")]
    List {
        /// Include inactive zones
        #[arg(long, short = 'a')]
        all: bool,

        /// Fetch extended properties too
        #[arg(long, short = 'd')]
        details: bool,
    },

    /// Show one zone
    Get {
        uid: u32,

        /// Fetch extended properties too
        #[arg(long, short = 'd')]
        details: bool,
    },

    /// Water a zone
    Start {
        uid: u32,

        /// Run time in seconds
        #[arg(long, short = 's', default_value = "300")]
        seconds: u32,
    },

    /// Stop watering a zone
    Stop { uid: u32 },

    /// Activate a zone
    Enable { uid: u32 },

    /// Deactivate a zone
    Disable { uid: u32 },

    /// List zones that are watering right now
    Running,
}

// ── Watering ─────────────────────────────────────────────────────────

/// Shared date window for history queries.
#[derive(Debug, Args)]
pub struct DateWindow {
    /// First day (YYYY-MM-DD, default today)
    #[arg(long)]
    pub date: Option<String>,

    /// Number of days
    #[arg(long, default_value = "2")]
    pub days: u32,
}

#[derive(Debug, Args)]
pub struct WateringArgs {
    #[command(subcommand)]
    pub command: WateringCommand,
}

#[derive(Debug, Subcommand)]
pub enum WateringCommand {
    /// Watering log
    Log {
        #[command(flatten)]
        window: DateWindow,

        /// Include per-zone detail
        #[arg(long, short = 'd')]
        details: bool,
    },

    /// Past runs with the weather values used
    Runs {
        #[command(flatten)]
        window: DateWindow,
    },

    /// Queued and running watering
    Queue,

    /// Pause all watering
    Pause {
        /// Pause length in seconds
        seconds: u32,
    },

    /// Resume paused watering
    Unpause,

    /// Stop all watering
    StopAll,

    /// Flow sensor readings
    Flowmeter,
}

// ── Diagnostics ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DiagArgs {
    #[command(subcommand)]
    pub command: DiagCommand,
}

#[derive(Debug, Subcommand)]
pub enum DiagCommand {
    /// Current diagnostic state
    Show,
    /// Device system log
    Log,
}

// ── Provisioning ─────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ProvisionArgs {
    #[command(subcommand)]
    pub command: ProvisionCommand,
}

#[derive(Debug, Subcommand)]
pub enum ProvisionCommand {
    /// System and location settings
    Settings,
    /// Device name
    Name,
    /// Rename the device
    SetName { name: String },
    /// Network settings
    Wifi,
}

// ── Restrictions ─────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct RestrictionsArgs {
    #[command(subcommand)]
    pub command: RestrictionsCommand,
}

#[derive(Debug, Subcommand)]
pub enum RestrictionsCommand {
    /// Restrictions in effect right now
    Current,
    /// Hourly restriction windows
    Hourly,
    /// Remaining rain delay
    Raindelay,
    /// Delay all watering for a number of days (0 clears)
    SetRaindelay { days: u32 },
    /// Restrictions that apply to every program
    Global,
    /// Update global restrictions from a JSON file
    SetGlobal {
        /// JSON object with the fields to change
        #[arg(long, short = 'F')]
        from_file: PathBuf,
    },
}

// ── Stats ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct StatsArgs {
    #[command(subcommand)]
    pub command: StatsCommand,
}

#[derive(Debug, Subcommand)]
pub enum StatsCommand {
    /// Statistics for one day
    Day {
        /// Day (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Forecast for the coming days
    Upcoming {
        /// Include per-program detail
        #[arg(long, short = 'd')]
        details: bool,
    },
}

// ── Machine ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct MachineArgs {
    #[command(subcommand)]
    pub command: MachineCommand,
}

#[derive(Debug, Subcommand)]
pub enum MachineCommand {
    /// Firmware update state (checks first where supported)
    UpdateStatus,
    /// Ask the controller to look for new firmware
    UpdateCheck,
    /// Install pending firmware
    Update,
    /// Reboot the controller
    Reboot,
}

// ── Parsers ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ParsersArgs {
    #[command(subcommand)]
    pub command: ParsersCommand,
}

#[derive(Debug, Subcommand)]
pub enum ParsersCommand {
    /// List weather parsers
    #[command(alias = "ls")]
    List,
    /// Push weather data from a JSON file
    PostData {
        #[arg(long, short = 'F')]
        from_file: PathBuf,
    },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,
    /// Show the effective configuration (passwords masked)
    Show,
    /// Store a profile's password in the system keyring
    SetPassword {
        /// Profile to store the password for (default: active profile)
        #[arg(long)]
        for_profile: Option<String>,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
