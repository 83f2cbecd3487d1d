//! Domain model and catalog pipeline for the studio portfolio site.
//!
//! Everything the site renders flows through here: persisted rows are decoded
//! into [`Project`]s with normalized galleries, ordered by `display_order`,
//! held by a [`repository::ProjectRepository`] snapshot, and then projected
//! into the "selected works" columns and the lightbox.

use serde::{Deserialize, Deserializer, Serialize};

pub mod error;
pub mod gallery;
pub mod hero;
pub mod lightbox;
pub mod portfolio;
pub mod repository;
pub mod seed;
pub mod showcase;
pub mod store;

#[cfg(not(target_arch = "wasm32"))]
pub mod auth;
#[cfg(not(target_arch = "wasm32"))]
pub mod config;
#[cfg(not(target_arch = "wasm32"))]
pub mod media;
#[cfg(not(target_arch = "wasm32"))]
pub mod supabase;

pub use error::{Result, StudioError};

/// Reads an explicit `null` as the field's default. The hosted tables return
/// `null` for unset nullable columns, and one such row must not fail a load.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// A project category. Referenced by id from [`Project::category_id`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Store-assigned id.
    pub id: String,
    /// Display name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// URL-safe key derived from the name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub slug: String,
}

/// Category payload before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCategory {
    /// Display name, trimmed.
    pub name: String,
    /// Derived with [`slugify`].
    pub slug: String,
}

impl NewCategory {
    /// Builds a category whose slug is derived from `name`.
    pub fn from_name(name: &str) -> Self {
        let name = name.trim().to_string();
        Self {
            slug: slugify(&name),
            name,
        }
    }
}

/// Lowercases `name` and joins its whitespace-separated words with `-`.
pub fn slugify(name: &str) -> String {
    name.split_whitespace()
        .map(|word| word.to_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

/// One supplementary image attached to a project.
///
/// `featured` puts the image on the "selected works" surface regardless of
/// the owning project's own flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryImage {
    /// Public image URL.
    pub url: String,
    /// Shown on the "selected works" surface.
    #[serde(default)]
    pub featured: bool,
}

impl GalleryImage {
    /// Builds an entry from its parts.
    pub fn new(url: impl Into<String>, featured: bool) -> Self {
        Self {
            url: url.into(),
            featured,
        }
    }
}

// 完整项目数据模型（含分类 join）
/// A portfolio project as rendered by the site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Store-assigned id.
    pub id: String,
    /// Project name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    /// Long-form text shown in the detail view.
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    /// Completion year; `0` when unknown.
    #[serde(default, deserialize_with = "null_as_default")]
    pub year: i32,
    /// Free-form place name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: String,
    /// Cover image URL.
    #[serde(default, deserialize_with = "null_as_default")]
    pub image: String,
    /// Normalized gallery, in stored order.
    #[serde(default, deserialize_with = "gallery::deserialize_gallery")]
    pub gallery: Vec<GalleryImage>,
    /// Owning category; empty when the row has none.
    #[serde(default, deserialize_with = "null_as_default")]
    pub category_id: String,
    /// Joined category row, present when the store query embeds it.
    #[serde(rename = "categories", default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    /// Shows the cover on the "selected works" surface.
    #[serde(default, deserialize_with = "null_as_default")]
    pub featured: bool,
    /// Sort key for every listing; ties keep store order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub display_order: i64,
}

impl Project {
    /// Category name from the joined row, if any.
    pub fn category_name(&self) -> Option<&str> {
        self.category.as_ref().map(|category| category.name.as_str())
    }
}

/// Fields an administrator submits to create a project.
///
/// `display_order` left as `None` is assigned `max + 1` by the repository.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProjectDraft {
    /// Project name; the store refuses a blank one.
    pub title: String,
    /// Long-form text.
    pub description: String,
    /// Completion year.
    pub year: i32,
    /// Free-form place name.
    pub location: String,
    /// Cover image URL.
    pub image: String,
    /// Gallery entries in display order.
    pub gallery: Vec<GalleryImage>,
    /// Id of an existing category.
    pub category_id: String,
    /// Whether the cover is showcased.
    pub featured: bool,
    /// Explicit position; `None` appends after the last project.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_order: Option<i64>,
}

/// Partial project update; absent fields are left untouched by the store.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProjectPatch {
    /// New title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New year.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    /// New location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// New cover image URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Replaces the whole gallery.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gallery: Option<Vec<GalleryImage>>,
    /// Moves the project to another category.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    /// New cover showcase flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
    /// New position.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_order: Option<i64>,
}

impl ProjectPatch {
    /// True when no field would change.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Applies the present fields onto `project`.
    pub fn apply_to(&self, project: &mut Project) {
        if let Some(title) = &self.title {
            project.title = title.clone();
        }
        if let Some(description) = &self.description {
            project.description = description.clone();
        }
        if let Some(year) = self.year {
            project.year = year;
        }
        if let Some(location) = &self.location {
            project.location = location.clone();
        }
        if let Some(image) = &self.image {
            project.image = image.clone();
        }
        if let Some(gallery) = &self.gallery {
            project.gallery = gallery.clone();
        }
        if let Some(category_id) = &self.category_id {
            project.category_id = category_id.clone();
        }
        if let Some(featured) = self.featured {
            project.featured = featured;
        }
        if let Some(display_order) = self.display_order {
            project.display_order = display_order;
        }
    }
}

/// A background image of the home page slideshow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroSlide {
    /// Store-assigned id.
    pub id: String,
    /// Background image URL.
    #[serde(default, deserialize_with = "null_as_default")]
    pub image_url: String,
    /// Optional overlay text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    /// Slideshow position.
    #[serde(default, deserialize_with = "null_as_default")]
    pub display_order: i64,
}

/// Fields submitted to append a hero slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroSlideDraft {
    /// Background image URL.
    pub image_url: String,
    /// Optional overlay text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

/// Stable sort by `display_order`; equal keys keep arrival order.
pub fn sort_by_display_order<T>(items: &mut [T], key: impl Fn(&T) -> i64) {
    items.sort_by_key(|item| key(item));
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn slugify_lowercases_and_hyphenates() {
        assert_eq!(slugify("Residential"), "residential");
        assert_eq!(slugify("  Urban   Planning "), "urban-planning");
    }

    #[test]
    fn project_row_with_join_and_legacy_gallery_decodes() {
        let row = json!({
            "id": "p-1",
            "title": "Serenity Residence",
            "description": "A sanctuary.",
            "year": 2024,
            "location": "Kyoto, Japan",
            "image": "cover.jpg",
            "gallery": ["g1.jpg", "{\"url\":\"g2.jpg\",\"featured\":true}"],
            "category_id": "c-1",
            "categories": { "id": "c-1", "name": "Residential", "slug": "residential" },
            "featured": true,
            "display_order": 1
        });

        let project: Project = serde_json::from_value(row).expect("decode project");
        assert_eq!(project.category_name(), Some("Residential"));
        assert_eq!(project.gallery, vec![
            GalleryImage::new("g1.jpg", false),
            GalleryImage::new("g2.jpg", true),
        ]);
    }

    #[test]
    fn project_row_with_null_gallery_decodes_to_empty() {
        let row = json!({ "id": "p-2", "title": "Bare", "gallery": null });
        let project: Project = serde_json::from_value(row).expect("decode project");
        assert!(project.gallery.is_empty());
        assert_eq!(project.display_order, 0);
    }

    #[test]
    fn null_columns_decode_as_defaults() {
        let row = json!({
            "id": "s-1",
            "image_url": null,
            "caption": null,
            "display_order": null
        });
        let slide: HeroSlide = serde_json::from_value(row).expect("decode slide");
        assert_eq!(slide.image_url, "");
        assert_eq!(slide.caption, None);
        assert_eq!(slide.display_order, 0);

        let row = json!({ "id": "c-9", "name": "Legacy", "slug": null });
        let category: Category = serde_json::from_value(row).expect("decode category");
        assert_eq!(category.slug, "");
    }

    #[test]
    fn patch_serializes_only_present_fields() {
        let patch = ProjectPatch {
            title: Some("New".to_string()),
            featured: Some(false),
            ..ProjectPatch::default()
        };
        let value = serde_json::to_value(&patch).expect("serialize patch");
        assert_eq!(value, json!({ "title": "New", "featured": false }));
        assert!(!patch.is_empty());
        assert!(ProjectPatch::default().is_empty());
    }

    #[test]
    fn display_order_sort_is_stable() {
        let mut items = vec![("b", 2), ("a", 1), ("c", 2), ("d", 1)];
        sort_by_display_order(&mut items, |item| item.1);
        let names: Vec<_> = items.iter().map(|item| item.0).collect();
        assert_eq!(names, vec!["a", "d", "b", "c"]);
    }
}
