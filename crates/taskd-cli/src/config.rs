//! Command-line and environment configuration.
//!
//! `.env` is loaded before parsing, so every `env = ...` below can also come
//! from there.

use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use taskd_core::app::AutoCompleteConfig;
use taskd_core::domain::{Role, UserId};

pub const DEFAULT_DATABASE_URL: &str = "memory://taskdb";

#[derive(Debug, Parser)]
#[command(name = "taskd", version, about = "Task service with background auto-completion")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP service and the auto-completion workers
    Serve(ServeArgs),
    /// Issue a bearer token signed with the configured secret
    Token(TokenArgs),
}

#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Store connection string (`memory://<name>`)
    #[arg(long, env = "DATABASE_URL", default_value = DEFAULT_DATABASE_URL)]
    pub database_url: String,

    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: String,

    /// Open tasks older than this are completed automatically
    #[arg(long, env = "AUTO_COMPLETE_MINUTES", default_value_t = 10)]
    pub auto_complete_minutes: u32,

    #[arg(long, default_value_t = 3)]
    pub workers: usize,

    #[arg(long, default_value_t = 60)]
    pub scan_interval_secs: u64,

    #[arg(long, default_value_t = 100)]
    pub queue_capacity: usize,
}

impl ServeArgs {
    pub fn auto_complete(&self) -> AutoCompleteConfig {
        AutoCompleteConfig {
            tick: Duration::from_secs(self.scan_interval_secs),
            workers: self.workers,
            queue_capacity: self.queue_capacity,
            ..AutoCompleteConfig::with_window_minutes(self.auto_complete_minutes)
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct TokenArgs {
    /// Subject of the token; a fresh id is minted when omitted
    #[arg(long)]
    pub user: Option<UserId>,

    #[arg(long, value_enum, default_value_t = RoleArg::User)]
    pub role: RoleArg,

    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RoleArg {
    User,
    Admin,
}

impl From<RoleArg> for Role {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::User => Role::User,
            RoleArg::Admin => Role::Admin,
        }
    }
}
