//! Session persistence and output helpers shared by the commands.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Serialize;
use studio_shared::{auth::Session, showcase::DisplayItem, GalleryImage, HeroSlide, Project};

/// Plain gallery URLs first, then the featured ones.
pub fn build_gallery(plain: &[String], featured: &[String]) -> Vec<GalleryImage> {
    let plain = plain.iter().map(|url| (url, false));
    let featured = featured.iter().map(|url| (url, true));
    plain
        .chain(featured)
        .map(|(url, featured)| (url.trim(), featured))
        .filter(|(url, _)| !url.is_empty())
        .map(|(url, featured)| GalleryImage::new(url, featured))
        .collect()
}

/// Environment variable consulted when `login` gets no `--password`.
pub const ADMIN_PASSWORD_ENV: &str = "STUDIO_ADMIN_PASSWORD";

/// The `--password` flag wins; otherwise the environment value. Blank values
/// count as absent.
pub fn resolve_password(flag: Option<String>, env_value: Option<String>) -> Result<String> {
    flag.into_iter()
        .chain(env_value)
        .find(|password| !password.is_empty())
        .with_context(|| format!("no password given; pass --password or set {ADMIN_PASSWORD_ENV}"))
}

/// Session persisted between CLI runs as pretty JSON.
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    /// Session file at `path`; nothing is read until [`Self::load`].
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
        }
    }

    /// Where the session lives.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored session, or `None` when the file does not exist.
    pub fn load(&self) -> Result<Option<Session>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        let session = serde_json::from_str(&raw)
            .with_context(|| format!("invalid session file {}", self.path.display()))?;
        Ok(Some(session))
    }

    /// Writes `session`, creating parent directories as needed.
    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(session)?)
            .with_context(|| format!("failed to write {}", self.path.display()))
    }

    /// Removes the file; a missing file is fine.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => {
                Err(err).with_context(|| format!("failed to remove {}", self.path.display()))
            },
        }
    }
}

/// Prints `value` as pretty JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// One-line summary of a project for listings.
pub fn format_project_row(project: &Project) -> String {
    format!(
        "{:>5}  {:<12}  {}{}  [{}]  {} ({})  {} gallery",
        project.display_order,
        project.id,
        project.title,
        if project.featured { " *" } else { "" },
        project.category_name().unwrap_or("-"),
        project.location,
        project.year,
        project.gallery.len()
    )
}

/// One-line summary of a hero slide.
pub fn format_slide_row(slide: &HeroSlide) -> String {
    format!(
        "{:>5}  {:<12}  {}{}",
        slide.display_order,
        slide.id,
        slide.image_url,
        slide
            .caption
            .as_deref()
            .map(|caption| format!("  \"{caption}\""))
            .unwrap_or_default()
    )
}

/// Plain-text rendering of masonry columns.
pub fn format_columns(columns: &[Vec<DisplayItem>]) -> String {
    let mut out = String::new();
    for (index, column) in columns.iter().enumerate() {
        out.push_str(&format!("column {index}:\n"));
        for item in column {
            out.push_str(&format!("  {}  ({})\n", item.url, item.project_title));
        }
    }
    out
}
