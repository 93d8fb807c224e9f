//! Administrative command line for the enrollment backend.
//!
//! # Responsibility
//! - Bootstrap config, logging and the migrated database.
//! - Manage login principals and inspect audit history.

mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use log::info;
use semillero_core::db::schema_version;
use semillero_core::repo::audit_repo::{AuditLog, SqliteAuditLog};
use semillero_core::repo::auth_repo::{AuthRepository, SqliteAuthRepository};
use semillero_core::{
    core_version, open_db, parse_role, ping, AppConfig, ConfigError, DbError, EntityType,
    RepoError,
};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::process::ExitCode;
use uuid::Uuid;

#[derive(Debug)]
enum CliError {
    Config(ConfigError),
    Db(DbError),
    Repo(RepoError),
    Usage(String),
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Usage(message) => write!(f, "{message}"),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Usage(_) => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<DbError> for CliError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<RepoError> for CliError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("semillero error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    if let Commands::Ping = cli.command {
        println!("semillero_core ping={}", ping());
        println!("semillero_core version={}", core_version());
        return Ok(());
    }

    let config = AppConfig::load(cli.config.as_deref())?;
    if !cli.no_log {
        let base = std::env::current_dir()
            .map_err(|err| CliError::Usage(format!("cannot resolve working directory: {err}")))?;
        config.init_logging(&base)?;
    }
    let conn = open_db(&config.database_path)?;

    match cli.command {
        Commands::Ping => {}
        Commands::Migrate => {
            let version = schema_version(&conn)?;
            info!("event=cli_migrate module=cli status=ok schema_version={version}");
            println!(
                "database={} schema_version={version}",
                config.database_path.display()
            );
        }
        Commands::CreateUser(args) => {
            let role = parse_role(&args.role).map_err(|err| CliError::Usage(err.to_string()))?;
            let account = SqliteAuthRepository::try_new(&conn)?.create_user(&args.username, role)?;
            println!("user_id={} username={} role={}", account.id, account.username, account.role);
        }
        Commands::SetActive(args) => {
            let user_id = parse_uuid(&args.user_id)?;
            SqliteAuthRepository::try_new(&conn)?.set_active(user_id, args.active)?;
            println!("user_id={user_id} active={}", args.active);
        }
        Commands::IssueToken(args) => {
            let user_id = parse_uuid(&args.user_id)?;
            let token = SqliteAuthRepository::try_new(&conn)?.issue_token(user_id)?;
            println!("{token}");
        }
        Commands::RevokeToken(args) => {
            let revoked = SqliteAuthRepository::try_new(&conn)?.revoke_token(&args.token)?;
            println!("revoked={revoked}");
        }
        Commands::Whoami(args) => {
            let actor = SqliteAuthRepository::try_new(&conn)?
                .authenticate(&args.token)?
                .ok_or_else(|| CliError::Usage("token is unknown or inactive".to_string()))?;
            println!("user_id={} role={}", actor.user_id, actor.role);
        }
        Commands::History(args) => {
            let entity_type = EntityType::parse(&args.entity_type).ok_or_else(|| {
                CliError::Usage(format!("unknown entity type `{}`", args.entity_type))
            })?;
            let id = parse_uuid(&args.id)?;
            let entries =
                SqliteAuditLog::try_new(&conn)?.list_entries(entity_type, id, args.limit)?;
            let rendered = serde_json::to_string_pretty(&entries)
                .map_err(|err| CliError::Usage(format!("cannot render history: {err}")))?;
            println!("{rendered}");
        }
    }
    Ok(())
}

fn parse_uuid(value: &str) -> Result<Uuid, CliError> {
    Uuid::parse_str(value.trim()).map_err(|_| CliError::Usage(format!("invalid uuid `{value}`")))
}
