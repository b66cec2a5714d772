//! Subcommand execution.

use std::io::Write;
use std::sync::Arc;

use anyhow::Context;
use ignite_application::{
    AuthenticatedClient, ClientError, RefreshConfig, SessionManager, SignInInput,
    SignOutRegistration,
};
use ignite_domain::{ApiRequest, ApiResponse, ClientSettings, RequestBody};
use ignite_infrastructure::{FileTokenStore, ReqwestTransport, SettingsRepository, session_dir};

use crate::cli::{Cli, Command};

type Session = SessionManager<ReqwestTransport, FileTokenStore>;

/// A restored session ready to run commands.
pub struct App {
    session: Session,
    _registration: SignOutRegistration,
}

impl App {
    /// Builds the client stack for `settings` and restores the stored
    /// session, if any.
    ///
    /// # Errors
    ///
    /// Fails if the base URL is invalid, no data directory is known or the
    /// stored session cannot be read.
    pub async fn open(settings: &ClientSettings) -> anyhow::Result<Self> {
        let dir = session_dir(settings)
            .context("could not determine a data directory; set IGNITE_DATA_DIR")?;
        let transport = Arc::new(ReqwestTransport::from_settings(settings)?);
        let store = Arc::new(FileTokenStore::in_dir(&dir));

        let config = RefreshConfig::default().with_timeout(settings.refresh_timeout());
        let client = AuthenticatedClient::new(transport, Arc::clone(&store), config);
        let session = SessionManager::new(client, store);
        let registration = session.attach();
        session
            .restore()
            .await
            .context("failed to read the stored session")?;

        tracing::debug!(base_url = %settings.base_url, dir = %dir.display(), "client ready");
        Ok(Self {
            session,
            _registration: registration,
        })
    }

    /// Returns the session use case.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Runs one subcommand, writing its output to `out`.
    ///
    /// # Errors
    ///
    /// Returns the client error, with a user-facing explanation attached.
    pub async fn execute(&self, command: Command, out: &mut impl Write) -> anyhow::Result<()> {
        match command {
            Command::SignIn { email, password } => {
                let user = self
                    .session
                    .sign_in(SignInInput { email, password })
                    .await
                    .map_err(explain)?;
                writeln!(out, "Signed in as {} <{}>", user.name, user.email)?;
            }
            Command::SignOut => {
                self.session.sign_out().await.map_err(explain)?;
                writeln!(out, "Signed out")?;
            }
            Command::Whoami => match self.session.current_user() {
                Some(user) => writeln!(out, "{} <{}>", user.name, user.email)?,
                None => writeln!(out, "Not signed in")?,
            },
            Command::Get { path } => {
                let response = self.session.client().get(&path).await.map_err(explain)?;
                print_body(&response, out)?;
            }
            Command::Request { method, path, body } => {
                let mut request = ApiRequest::new(method, path);
                if let Some(raw) = body {
                    let value: serde_json::Value =
                        serde_json::from_str(&raw).context("--body is not valid JSON")?;
                    request = request.with_body(RequestBody::Json(value));
                }
                let response = self.session.client().send(request).await.map_err(explain)?;
                print_body(&response, out)?;
            }
        }
        Ok(())
    }
}

/// Loads settings, opens the session and runs the parsed command.
///
/// # Errors
///
/// Returns any configuration, storage or request failure.
pub async fn run(cli: Cli, out: &mut impl Write) -> anyhow::Result<()> {
    let repository = cli
        .config
        .map_or_else(SettingsRepository::new, SettingsRepository::at);
    let mut settings = repository
        .load_with_env()
        .await
        .context("failed to load settings")?;
    if let Some(base_url) = cli.base_url {
        settings.base_url = base_url;
    }

    let app = App::open(&settings).await?;
    app.execute(cli.command, out).await
}

fn explain(error: ClientError) -> anyhow::Error {
    let hint = error.user_message();
    if hint == error.to_string() {
        anyhow::Error::new(error)
    } else {
        anyhow::Error::new(error).context(hint)
    }
}

fn print_body(response: &ApiResponse, out: &mut impl Write) -> anyhow::Result<()> {
    if response.body.is_empty() {
        return Ok(());
    }
    match response.decode::<serde_json::Value>() {
        Ok(value) => writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?,
        Err(_) => writeln!(out, "{}", response.text())?,
    }
    Ok(())
}
