use std::env;

use guildkeep_core::{AppError, AppResult};
use tracing_subscriber::EnvFilter;

/// Work requested on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapCommand {
    /// Run migrations, seed the standard plan and verify role references.
    Apply,
    /// Run migrations only.
    Migrate,
    /// Check that stored system roles satisfy the standard plan's references.
    Verify,
}

impl BootstrapCommand {
    fn parse(argument: Option<&str>, verify_only: bool) -> AppResult<Self> {
        match argument {
            None | Some("apply") if verify_only => Ok(Self::Verify),
            None | Some("apply") => Ok(Self::Apply),
            Some("migrate") => Ok(Self::Migrate),
            Some("verify") => Ok(Self::Verify),
            Some(other) => Err(AppError::Validation(format!(
                "unknown command '{other}', expected 'apply', 'migrate' or 'verify'"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    pub command: BootstrapCommand,
    pub database_url: String,
    pub max_connections: u32,
}

impl BootstrapConfig {
    pub fn load() -> AppResult<Self> {
        let verify_only = env::var("BOOTSTRAP_VERIFY_ONLY")
            .unwrap_or_else(|_| "false".to_owned())
            .eq_ignore_ascii_case("true");
        let command = BootstrapCommand::parse(env::args().nth(1).as_deref(), verify_only)?;

        Ok(Self {
            command,
            database_url: required_env("DATABASE_URL")?,
            max_connections: parse_env_u32("DATABASE_MAX_CONNECTIONS", 5)?,
        })
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> AppResult<String> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn parse_env_u32(name: &str, default: u32) -> AppResult<u32> {
    match env::var(name) {
        Ok(value) => value.parse::<u32>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        Err(_) => Ok(default),
    }
}
