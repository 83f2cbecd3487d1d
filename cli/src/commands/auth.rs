use std::{env, path::Path};

use anyhow::Result;
use chrono::Utc;
use serde::Serialize;
use studio_shared::{auth::SupabaseAuth, config::SupabaseConfig};

use crate::utils::{print_json, resolve_password, SessionFile, ADMIN_PASSWORD_ENV};

#[derive(Serialize)]
struct WhoAmI {
    email: Option<String>,
    expires_at: String,
    expired: bool,
}

pub async fn login(session_file: &Path, email: &str, password: Option<String>) -> Result<()> {
    let password = resolve_password(password, env::var(ADMIN_PASSWORD_ENV).ok())?;
    let auth = SupabaseAuth::new(SupabaseConfig::from_env()?)?;
    let session = auth.sign_in(email.trim(), &password).await?;
    let sessions = SessionFile::new(session_file);
    sessions.save(&session)?;
    tracing::info!(
        "session stored at {} (expires {})",
        sessions.path().display(),
        session.expires_at
    );
    Ok(())
}

pub async fn logout(session_file: &Path) -> Result<()> {
    let sessions = SessionFile::new(session_file);
    let Some(session) = sessions.load()? else {
        tracing::info!("no stored session");
        return Ok(());
    };
    let auth = SupabaseAuth::new(SupabaseConfig::from_env()?)?;
    auth.restore(Some(session));
    auth.sign_out().await?;
    sessions.clear()
}

pub fn whoami(session_file: &Path) -> Result<()> {
    match SessionFile::new(session_file).load()? {
        Some(session) => print_json(&WhoAmI {
            email: session.user_email.clone(),
            expires_at: session.expires_at.to_rfc3339(),
            expired: session.is_expired(Utc::now()),
        }),
        None => {
            println!("not signed in");
            Ok(())
        },
    }
}
