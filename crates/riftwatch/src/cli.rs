//! Clap derive structures for the `riftwatch` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// riftwatch -- League client companion
#[derive(Debug, Parser)]
#[command(
    name = "riftwatch",
    version,
    about = "Automate and inspect the League of Legends client from the command line",
    long_about = "Talks to the local League client over its loopback API.\n\n\
        Finds the running client through its lockfile or process list,\n\
        watches the connection, and runs match automation (auto-accept,\n\
        auto-pick, auto-ban) plus one-shot profile and lobby actions.",
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
    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "RIFTWATCH_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Client API port (skips discovery; requires --token)
    #[arg(long, env = "RIFTWATCH_PORT", global = true, requires = "token")]
    pub port: Option<u16>,

    /// Client API auth token (skips discovery; requires --port)
    #[arg(long, env = "RIFTWATCH_TOKEN", global = true, hide_env_values = true, requires = "port")]
    pub token: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "RIFTWATCH_OUTPUT",
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

    /// Request timeout in milliseconds (overrides the config)
    #[arg(long, env = "RIFTWATCH_TIMEOUT", global = true)]
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
    /// Plain text, one value per line (scripting)
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
    /// Check whether the League client is reachable
    #[command(alias = "st")]
    Status,

    /// Follow the connection and run match automation until Ctrl-C
    Watch(WatchArgs),

    /// Run the JSON-lines relay over stdin/stdout
    Serve,

    /// Accept the pending ready check
    Accept,

    /// Decline the pending ready check
    Decline,

    /// Lock in a champion for your current pick
    Pick {
        /// Champion name or alias (fuzzy)
        champion: String,
    },

    /// Ban a champion for your current ban
    Ban {
        /// Champion name or alias (fuzzy)
        champion: String,

        /// Ban even if a teammate picked or hovered it
        #[arg(long)]
        no_protect: bool,
    },

    /// Appear online or offline in chat
    Chat {
        #[arg(value_enum)]
        mode: ChatMode,
    },

    /// View and customize your profile
    Profile(ProfileArgs),

    /// Champion-select lobby actions
    Lobby(LobbyArgs),

    /// Client information and control
    Client(ClientArgs),

    /// Friend list management
    Friends(FriendsArgs),

    /// Recent match history
    History(HistoryArgs),

    /// Ranked standings with next-division estimates
    Ranked,

    /// Estimate games needed to reach the next division (offline)
    RankCalc(RankCalcArgs),

    /// Manage saved accounts
    #[command(alias = "acc")]
    Accounts(AccountsArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Watch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Accept ready checks automatically
    #[arg(long)]
    pub accept: bool,

    /// Champion to auto-pick
    #[arg(long, value_name = "CHAMPION")]
    pub pick: Option<String>,

    /// Champion to auto-ban
    #[arg(long, value_name = "CHAMPION")]
    pub ban: Option<String>,

    /// Allow auto-ban to ban a teammate's champion
    #[arg(long, requires = "ban")]
    pub no_protect: bool,

    /// Appear offline in chat while watching
    #[arg(long)]
    pub offline: bool,
}

// ── Chat ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ChatMode {
    Online,
    Offline,
}

// ── Profile ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub command: ProfileCommand,
}

#[derive(Debug, Subcommand)]
pub enum ProfileCommand {
    /// Show the logged-in summoner
    Show,

    /// Change the summoner icon
    Icon {
        /// Profile icon id
        #[arg(allow_negative_numbers = true)]
        id: i64,
    },

    /// Change the profile background to a skin splash
    Background {
        /// Skin id
        #[arg(allow_negative_numbers = true)]
        skin_id: i64,
    },

    /// Set the chat status message
    Status {
        /// Message (empty clears it)
        message: String,
    },

    /// Change your Riot ID
    RiotId {
        /// Game name (3-16 characters)
        game_name: String,
        /// Tag line (3-5 letters or digits, leading '#' optional)
        tag_line: String,
    },

    /// Remove all displayed challenge badges
    Badges,
}

// ── Lobby / Client / Friends ─────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LobbyArgs {
    #[command(subcommand)]
    pub command: LobbyCommand,
}

#[derive(Debug, Subcommand)]
pub enum LobbyCommand {
    /// Show your teammates' Riot IDs and a pregame lookup link
    Reveal,

    /// Leave champion select
    Dodge,
}

#[derive(Debug, Args)]
pub struct ClientArgs {
    #[command(subcommand)]
    pub command: ClientCommand,
}

#[derive(Debug, Subcommand)]
pub enum ClientCommand {
    /// Game version, platform, and region
    Info,

    /// Restart the client UX
    Restart,
}

#[derive(Debug, Args)]
pub struct FriendsArgs {
    #[command(subcommand)]
    pub command: FriendsCommand,
}

#[derive(Debug, Subcommand)]
pub enum FriendsCommand {
    /// Remove every friend
    Purge,
}

// ── Stats ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// Number of games (1-200)
    #[arg(long, short = 'n', default_value = "20")]
    pub count: u32,

    /// Player id (defaults to the logged-in summoner)
    #[arg(long)]
    pub puuid: Option<String>,
}

#[derive(Debug, Args)]
pub struct RankCalcArgs {
    /// Tier, e.g. gold
    pub tier: String,

    /// Division: I, II, III, or IV
    pub division: String,

    /// Current league points
    pub lp: u32,

    /// Win rate in percent
    pub winrate: f64,
}

// ── Accounts ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AccountsArgs {
    #[command(subcommand)]
    pub command: AccountsCommand,
}

#[derive(Debug, Subcommand)]
pub enum AccountsCommand {
    /// List saved accounts
    #[command(alias = "ls")]
    List,

    /// Save an account, or update a saved one
    Add {
        username: String,

        /// Server label, e.g. EUW
        #[arg(long)]
        server: Option<String>,

        /// Riot ID as name#tag
        #[arg(long)]
        riot_id: Option<String>,

        /// Prompt for a password to store with the account
        #[arg(long)]
        password: bool,
    },

    /// Delete a saved account
    #[command(alias = "rm")]
    Remove { username: String },

    /// Launch the Riot Client for a saved account
    Login {
        username: String,

        /// Wait up to this many seconds for the League client to come up
        #[arg(long, value_name = "SECS")]
        wait: Option<u64>,
    },
}

// ── Config & Completions ─────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display the resolved configuration
    Show,

    /// Print the config file path
    Path,

    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
