//! Idempotent catalog seeding.
//!
//! Categories are created on first reference; a project whose title already
//! exists is skipped, so the seeder can be re-run against a live store.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
    repository::ProjectRepository, store::StudioStore, Category, GalleryImage, ProjectDraft,
    Result, StudioError,
};

const BUILTIN_CATALOG: &str = include_str!("seed_catalog.json");

/// One catalog entry to seed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedProject {
    /// Natural key: an existing project with this title is skipped.
    pub title: String,
    /// Category name; created when missing.
    pub category: String,
    /// Free-form place name.
    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub location: String,
    /// Completion year.
    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub year: i32,
    /// Cover image URL.
    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub image: String,
    /// Accepts bare URLs as well as `{url, featured}` objects.
    #[serde(default, deserialize_with = "crate::gallery::deserialize_gallery")]
    pub gallery: Vec<GalleryImage>,
    /// Long-form text.
    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub description: String,
    /// Whether the cover is showcased.
    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub featured: bool,
    /// Explicit position; appended when absent.
    #[serde(default)]
    pub display_order: Option<i64>,
}

/// Summary of a seeding run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    /// Categories inserted by this run.
    pub categories_created: usize,
    /// Projects inserted by this run.
    pub projects_created: usize,
    /// Projects left alone because the title already existed.
    pub projects_skipped: usize,
    /// `(title, reason)` for rows the store refused.
    pub failures: Vec<(String, String)>,
}

/// The studio's launch portfolio.
pub fn builtin_catalog() -> Result<Vec<SeedProject>> {
    parse_catalog(BUILTIN_CATALOG)
}

/// Parses a catalog file (a JSON array of entries).
pub fn parse_catalog(json: &str) -> Result<Vec<SeedProject>> {
    serde_json::from_str(json)
        .map_err(|err| StudioError::Config(format!("invalid seed catalog: {err}")))
}

/// Writes `entries` through the repository.
///
/// Rejected rows are collected in the report and seeding continues; an
/// unavailable store or a missing session aborts.
pub async fn seed_catalog<S: StudioStore>(
    repo: &ProjectRepository<S>,
    entries: &[SeedProject],
) -> Result<SeedReport> {
    let mut report = SeedReport::default();
    let mut categories: HashMap<String, Category> = HashMap::new();

    for entry in entries {
        let name = entry.category.trim();
        if categories.contains_key(name) {
            continue;
        }
        let existing = repo.store().find_category_by_name(name).await?;
        let category = match existing {
            Some(category) => category,
            None => match repo.ensure_category(name).await {
                Ok(category) => {
                    report.categories_created += 1;
                    category
                },
                Err(StudioError::ValidationRejected(reason)) => {
                    tracing::warn!("category {name} rejected: {reason}");
                    report.failures.push((name.to_string(), reason));
                    continue;
                },
                Err(err) => return Err(err),
            },
        };
        categories.insert(name.to_string(), category);
    }

    for entry in entries {
        if repo
            .store()
            .find_project_by_title(&entry.title)
            .await?
            .is_some()
        {
            tracing::info!("skipping existing project: {}", entry.title);
            report.projects_skipped += 1;
            continue;
        }
        let Some(category) = categories.get(entry.category.trim()) else {
            report.failures.push((entry.title.clone(), "category unavailable".to_string()));
            continue;
        };

        let draft = ProjectDraft {
            title: entry.title.clone(),
            description: entry.description.clone(),
            year: entry.year,
            location: entry.location.clone(),
            image: entry.image.clone(),
            gallery: entry.gallery.clone(),
            category_id: category.id.clone(),
            featured: entry.featured,
            display_order: entry.display_order,
        };
        match repo.create(draft).await {
            Ok(_) => report.projects_created += 1,
            Err(StudioError::ValidationRejected(reason)) => {
                tracing::warn!("project {} rejected: {reason}", entry.title);
                report.failures.push((entry.title.clone(), reason));
            },
            Err(err) => return Err(err),
        }
    }

    tracing::info!(
        "seeding complete: {} categories, {} projects created, {} skipped",
        report.categories_created,
        report.projects_created,
        report.projects_skipped
    );
    Ok(report)
}
