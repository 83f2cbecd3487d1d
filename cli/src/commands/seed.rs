use std::{fs, path::Path};

use anyhow::{Context as _, Result};
use studio_shared::{
    repository::{ProjectRepository, RefreshPolicy},
    seed::{builtin_catalog, parse_catalog, seed_catalog},
};

use super::Context;
use crate::utils::print_json;

pub async fn run(session_file: &Path, file: Option<&Path>) -> Result<()> {
    let catalog = match file {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            parse_catalog(&raw)?
        },
        None => builtin_catalog()?,
    };

    let ctx = Context::connect(session_file)?;
    ctx.authorize()?;
    // One refresh at the end instead of one per inserted row.
    let repo = ProjectRepository::with_policy(ctx.store.clone(), RefreshPolicy::Deferred);
    let report = seed_catalog(&repo, &catalog).await?;
    repo.refresh_if_stale().await?;
    print_json(&report)
}
