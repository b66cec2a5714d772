//! Ignite - command line client for the Ignite API.
//!
//! Wires the reqwest transport, the file session store and the client
//! settings into a [`SessionManager`](ignite_application::SessionManager)
//! and exposes its operations as subcommands.

mod cli;
mod commands;

pub use cli::{Cli, Command};
pub use commands::{App, run};
