use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Top-level parser for the `semillero` admin binary.
#[derive(Debug, Parser)]
#[command(name = "semillero", version, about = "Semillero enrollment backend tools")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// TOML config file; `SEMILLERO_*` variables override its keys.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Skip file logging setup.
    #[arg(long, global = true)]
    pub no_log: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print core liveness and version.
    Ping,
    /// Open the database and apply pending migrations.
    Migrate,
    /// Register a login principal.
    CreateUser(CreateUserArgs),
    /// Enable or disable a principal.
    SetActive(SetActiveArgs),
    /// Issue a bearer token for a principal.
    IssueToken(UserArgs),
    /// Revoke one bearer token.
    RevokeToken(TokenArgs),
    /// Resolve a bearer token to its acting identity.
    Whoami(TokenArgs),
    /// Print the audit history of one record as JSON.
    History(HistoryArgs),
}

#[derive(Debug, Args)]
pub struct CreateUserArgs {
    pub username: String,
    /// One of admin, administrative_monitor, academic_monitor, professor, student.
    #[arg(long)]
    pub role: String,
}

#[derive(Debug, Args)]
pub struct SetActiveArgs {
    pub user_id: String,
    #[arg(long, action = clap::ArgAction::Set)]
    pub active: bool,
}

#[derive(Debug, Args)]
pub struct UserArgs {
    pub user_id: String,
}

#[derive(Debug, Args)]
pub struct TokenArgs {
    pub token: String,
}

#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// Entity tag, e.g. `enrollment` or `academic_monitor`.
    pub entity_type: String,
    pub id: String,
    #[arg(short, long)]
    pub limit: Option<u32>,
}
