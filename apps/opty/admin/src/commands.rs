//! Role commands, rendered as printable lines

use clap::Subcommand;
use domain_users::{Role, RoleChange, RoleService, User, UserError, UserRepository};

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Promote a user to supervisor
    Promote {
        /// Email of the account
        email: String,
    },

    /// Demote a supervisor to a regular user
    Demote {
        /// Email of the account
        email: String,
    },

    /// List all supervisors
    List,
}

/// What a command printed and whether it succeeded
#[derive(Debug)]
pub struct Report {
    pub success: bool,
    pub lines: Vec<String>,
}

impl Report {
    fn ok(lines: Vec<String>) -> Self {
        Self {
            success: true,
            lines,
        }
    }

    fn failed(line: String) -> Self {
        Self {
            success: false,
            lines: vec![line],
        }
    }
}

pub async fn run<R: UserRepository>(service: &RoleService<R>, command: Command) -> Report {
    match command {
        Command::Promote { email } => match service.promote(&email).await {
            Ok(change) => role_report(&email, Role::Supervisor, change),
            Err(e) => error_report(&email, e),
        },
        Command::Demote { email } => match service.demote(&email).await {
            Ok(change) => role_report(&email, Role::User, change),
            Err(e) => error_report(&email, e),
        },
        Command::List => match service.list_supervisors().await {
            Ok(supervisors) => Report::ok(supervisor_lines(&supervisors)),
            Err(e) => Report::failed(format!("Error: {e}")),
        },
    }
}

fn role_label(role: Role) -> &'static str {
    match role {
        Role::Supervisor => "supervisor",
        Role::User => "regular user",
    }
}

fn role_report(email: &str, role: Role, change: RoleChange) -> Report {
    match change {
        RoleChange::Unchanged(_) => Report::ok(vec![format!(
            "User \"{email}\" is already a {}.",
            role_label(role)
        )]),
        RoleChange::Changed(user) => {
            let verb = if role == Role::Supervisor {
                "promoted"
            } else {
                "demoted"
            };
            Report::ok(vec![
                format!("Successfully {verb} \"{email}\" to {}!", role_label(role)),
                format!("   Name: {}", user.name),
                format!("   Supabase ID: {}", user.supabase_id),
            ])
        }
    }
}

fn error_report(email: &str, error: UserError) -> Report {
    match error {
        UserError::NotFound(_) => Report::failed(format!("User with email \"{email}\" not found.")),
        other => Report::failed(format!("Error: {other}")),
    }
}

fn supervisor_lines(supervisors: &[User]) -> Vec<String> {
    if supervisors.is_empty() {
        return vec!["No supervisors found in the system.".to_string()];
    }

    let mut lines = vec![
        format!("Supervisors ({}):", supervisors.len()),
        "=".repeat(80),
    ];
    for supervisor in supervisors {
        let status = if supervisor.is_active {
            "Active"
        } else {
            "Inactive"
        };
        lines.push(format!("  • {} ({})", supervisor.name, supervisor.email));
        lines.push(format!("    Status: {status}"));
        lines.push(format!("    Created: {}", supervisor.created_at));
        lines.push(String::new());
    }
    lines
}
