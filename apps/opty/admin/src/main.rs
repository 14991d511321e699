//! Opty Admin
//!
//! Promote users to supervisor, demote them again, and list supervisors.
//! Each invocation opens one MongoDB connection, runs one command and exits
//! with status 0 on success or 1 on failure.

use clap::Parser;
use clap::error::ErrorKind;
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_users::{MongoUserRepository, RoleService};
use std::process::ExitCode;
use tracing::info;

mod commands;
mod config;

use commands::Command;
use config::Config;

#[derive(Debug, Parser)]
#[command(name = "opty-admin")]
#[command(about = "Manage supervisor roles of Opty users")]
#[command(after_help = "Environment Variables:
  MONGODB_URL       MongoDB connection string
  MONGODB_DB_NAME   Database name (or MONGODB_DATABASE)")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// `--help` and `--version` are not failures
fn is_informational(err: &clap::Error) -> bool {
    matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion)
}

#[tokio::main]
async fn main() -> eyre::Result<ExitCode> {
    install_color_eyre();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if is_informational(&e) => e.exit(),
        Err(e) => {
            e.print()?;
            return Ok(ExitCode::FAILURE);
        }
    };

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    info!("Connecting to MongoDB at {}", config.mongodb.redacted_url());
    let client = database::mongodb::connect_from_config(&config.mongodb)
        .await
        .map_err(|e| eyre::eyre!("Database connection failed: {}", e))?;

    let repository = MongoUserRepository::new(client.database(config.mongodb.database()));
    let service = RoleService::new(repository);

    let report = commands::run(&service, cli.command).await;
    for line in &report.lines {
        println!("{line}");
    }

    client.shutdown().await;

    Ok(if report.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_promote_requires_email() {
        let err = Cli::try_parse_from(["opty-admin", "promote"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        assert!(!is_informational(&err));
    }

    #[test]
    fn test_missing_command_is_a_failure() {
        let err = Cli::try_parse_from(["opty-admin"]).unwrap_err();
        assert!(!is_informational(&err));
    }

    #[test]
    fn test_help_is_informational() {
        let err = Cli::try_parse_from(["opty-admin", "--help"]).unwrap_err();
        assert!(is_informational(&err));
    }

    #[test]
    fn test_parses_commands() {
        let cli = Cli::try_parse_from(["opty-admin", "demote", "ana@example.com"]).unwrap();
        assert!(matches!(cli.command, Command::Demote { ref email } if email == "ana@example.com"));

        let cli = Cli::try_parse_from(["opty-admin", "list"]).unwrap();
        assert!(matches!(cli.command, Command::List));
    }
}
