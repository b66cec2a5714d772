//! Command line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ignite_domain::HttpMethod;

/// Ignite: session-aware client for the Ignite API.
#[derive(Parser, Debug)]
#[command(name = "ignite", version)]
#[command(about = "Signs in, keeps the session fresh and issues authenticated requests")]
pub struct Cli {
    /// Settings file. Defaults to the platform config directory.
    #[arg(long, env = "IGNITE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Overrides the API base URL for this invocation.
    #[arg(long)]
    pub base_url: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// What to do.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Signs in and stores the session.
    SignIn {
        /// Account e-mail.
        #[arg(long)]
        email: String,
        /// Account password.
        #[arg(long, env = "IGNITE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Ends the stored session.
    SignOut,
    /// Shows the signed-in user.
    Whoami,
    /// Issues an authenticated GET and prints the body.
    Get {
        /// Path relative to the base URL, e.g. `/history`.
        path: String,
    },
    /// Issues an authenticated request and prints the body.
    Request {
        /// HTTP method.
        method: HttpMethod,
        /// Path relative to the base URL.
        path: String,
        /// JSON body.
        #[arg(long)]
        body: Option<String>,
    },
}
