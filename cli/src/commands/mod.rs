//! Command handlers.

mod auth;
mod projects;
mod seed;
mod showcase;
mod slides;
mod upload;

use std::{path::Path, sync::Arc};

use anyhow::{anyhow, Result};
use chrono::Utc;
use studio_shared::{
    auth::{require_session, Session},
    supabase::SupabaseStore,
    StudioError,
};

use crate::{
    cli::{Cli, Commands},
    utils::SessionFile,
};

const LOGIN_HINT: &str = "not signed in or session expired; run `studio-cli login` first";

/// Remote store plus the locally persisted session.
pub struct Context {
    /// Remote catalog store.
    pub store: Arc<SupabaseStore>,
    /// Session persisted by `login`.
    pub sessions: SessionFile,
}

impl Context {
    /// Connects using the environment configuration.
    pub fn connect(session_file: &Path) -> Result<Self> {
        Ok(Self {
            store: Arc::new(SupabaseStore::from_env()?),
            sessions: SessionFile::new(session_file),
        })
    }

    /// Route guard for write commands: sends subsequent requests as the
    /// signed-in administrator.
    pub fn authorize(&self) -> Result<Session> {
        let stored = self.sessions.load()?;
        let session = require_session(stored.as_ref(), Utc::now())
            .map_err(|_| anyhow!(LOGIN_HINT))?
            .clone();
        self.store
            .set_access_token(Some(session.access_token.clone()));
        Ok(session)
    }
}

/// Runs the parsed command.
pub async fn run(cli: Cli) -> Result<()> {
    let session_file = cli.session_file;
    let result = match cli.command {
        Commands::Login {
            email,
            password,
        } => auth::login(&session_file, &email, password).await,
        Commands::Logout => auth::logout(&session_file).await,
        Commands::Whoami => auth::whoami(&session_file),
        Commands::Projects {
            command,
        } => projects::run(&session_file, command).await,
        Commands::Showcase {
            width,
            json,
        } => showcase::run(&session_file, width, json).await,
        Commands::Slides {
            command,
        } => slides::run(&session_file, command).await,
        Commands::Upload {
            file,
        } => upload::run(&file).await,
        Commands::Seed {
            file,
        } => seed::run(&session_file, file.as_deref()).await,
    };
    result.map_err(with_login_hint)
}

/// The store refusing our token reads better as a login prompt.
fn with_login_hint(err: anyhow::Error) -> anyhow::Error {
    match err.downcast_ref::<StudioError>() {
        Some(StudioError::AuthRequired) => err.context(LOGIN_HINT),
        _ => err,
    }
}
