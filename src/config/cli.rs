use crate::config::toml_config::ShimConfig;
use crate::domain::model::FriendFlags;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "steamworks-shim")]
#[command(about = "Loads the Steamworks binding for this platform and drives its callbacks")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// App id to initialize with (falls back to steam_appid.txt)
    #[arg(long)]
    pub app_id: Option<u32>,

    /// Directory holding the per-platform redistributables
    #[arg(long)]
    pub dist_dir: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print the library selected for this OS/architecture
    Platform,
    /// Check whether the app must be relaunched through Steam
    RestartCheck,
    /// List friends and verify their persona names
    Friends {
        #[arg(long, value_enum, default_value = "immediate")]
        flags: FriendFilter,
        #[arg(long)]
        json: bool,
    },
    /// Screenshot hooking and library import
    Screenshot {
        #[arg(long)]
        hook: Option<bool>,
        #[arg(long)]
        trigger: bool,
        #[arg(long, requires_all = ["width", "height"])]
        add: Option<PathBuf>,
        #[arg(long)]
        thumbnail: Option<PathBuf>,
        #[arg(long)]
        width: Option<i32>,
        #[arg(long)]
        height: Option<i32>,
    },
    /// Run the callback pump and log every callback
    Pump {
        #[arg(long, default_value = "10")]
        seconds: u64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FriendFilter {
    Immediate,
    Blocked,
    Requested,
    Clan,
    All,
}

impl From<FriendFilter> for FriendFlags {
    fn from(filter: FriendFilter) -> Self {
        match filter {
            FriendFilter::Immediate => FriendFlags::IMMEDIATE,
            FriendFilter::Blocked => FriendFlags::BLOCKED,
            FriendFilter::Requested => {
                FriendFlags::FRIENDSHIP_REQUESTED | FriendFlags::REQUESTING_FRIENDSHIP
            }
            FriendFilter::Clan => FriendFlags::CLAN_MEMBER,
            FriendFilter::All => FriendFlags::ALL,
        }
    }
}

impl CliConfig {
    /// Command line flags take precedence over the file.
    pub fn apply_to(&self, config: &mut ShimConfig) {
        if let Some(app_id) = self.app_id {
            config.steam.app_id = Some(app_id);
        }
        if let Some(dist_dir) = &self.dist_dir {
            config.steam.dist_dir = Some(dist_dir.clone());
        }
    }
}
