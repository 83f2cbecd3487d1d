//! The persisted-store seam and an in-process implementation.
//!
//! [`StudioStore`] mirrors the query surface of the hosted database: list with
//! a fixed ordering, find by a natural key, insert returning the created row,
//! partial update and delete by id. [`MemoryStore`] implements it over plain
//! JSON rows so legacy gallery shapes can live next to current ones, exactly
//! as they do in the hosted tables.

use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Mutex, MutexGuard, PoisonError,
};

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::{
    slugify, sort_by_display_order, Category, HeroSlide, HeroSlideDraft, NewCategory, Project,
    ProjectDraft, ProjectPatch, Result, StudioError,
};

/// Category table name.
pub const CATEGORIES_TABLE: &str = "categories";
/// Project table name.
pub const PROJECTS_TABLE: &str = "projects";
/// Hero slide table name.
pub const HERO_SLIDES_TABLE: &str = "hero_slides";

/// Query surface of the persisted store.
#[async_trait]
pub trait StudioStore: Send + Sync {
    /// All categories, sorted by name ascending.
    async fn list_categories(&self) -> Result<Vec<Category>>;
    /// Matches on the slug derived from `name`, so names that differ only in
    /// case or spacing resolve to the same row.
    async fn find_category_by_name(&self, name: &str) -> Result<Option<Category>>;
    /// Inserts a category and returns the stored row.
    async fn insert_category(&self, category: &NewCategory) -> Result<Category>;

    /// All projects joined with their category, sorted by `display_order`.
    async fn list_projects(&self) -> Result<Vec<Project>>;
    /// Project with exactly this title, if any.
    async fn find_project_by_title(&self, title: &str) -> Result<Option<Project>>;
    /// Highest project `display_order`; `None` on an empty table.
    async fn max_project_display_order(&self) -> Result<Option<i64>>;
    /// Inserts the draft as-is; the server assigns the id.
    async fn insert_project(&self, draft: &ProjectDraft) -> Result<Project>;
    /// Partial update of project `id`.
    async fn update_project(&self, id: &str, patch: &ProjectPatch) -> Result<()>;
    /// Deletes project `id`.
    async fn delete_project(&self, id: &str) -> Result<()>;

    /// All hero slides, sorted by `display_order`.
    async fn list_hero_slides(&self) -> Result<Vec<HeroSlide>>;
    /// Highest hero slide `display_order`; `None` when there are none.
    async fn max_hero_slide_display_order(&self) -> Result<Option<i64>>;
    /// Inserts a slide at `display_order`.
    async fn insert_hero_slide(&self, draft: &HeroSlideDraft, display_order: i64)
        -> Result<HeroSlide>;
    /// Deletes hero slide `id`.
    async fn delete_hero_slide(&self, id: &str) -> Result<()>;
    /// Moves hero slide `id` to `display_order`.
    async fn update_hero_slide_order(&self, id: &str, display_order: i64) -> Result<()>;
}

#[derive(Default)]
struct MemoryTables {
    categories: Vec<Category>,
    projects: Vec<Value>,
    hero_slides: Vec<HeroSlide>,
}

/// In-process store. Project rows are kept as raw JSON objects.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<MemoryTables>,
    next_id: AtomicU64,
    unavailable: AtomicBool,
}

impl MemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// While set, every call fails with [`StudioError::StoreUnavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Inserts a project row verbatim, bypassing draft serialization.
    ///
    /// Used to load rows carrying legacy gallery encodings. A missing `id`
    /// is assigned.
    pub fn insert_raw_project(&self, mut row: Map<String, Value>) -> String {
        let id = match row.get("id").and_then(Value::as_str) {
            Some(id) => id.to_string(),
            None => {
                let id = self.next_id("proj");
                row.insert("id".to_string(), Value::String(id.clone()));
                id
            },
        };
        self.lock().projects.push(Value::Object(row));
        id
    }

    /// Number of stored project rows.
    pub fn project_count(&self) -> usize {
        self.lock().projects.len()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryTables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_id(&self, prefix: &str) -> String {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        format!("{prefix}-{n}")
    }

    fn ensure_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StudioError::StoreUnavailable("memory store offline".to_string()));
        }
        Ok(())
    }

    fn decode_project(row: &Value, categories: &[Category]) -> Result<Project> {
        let mut row = row.clone();
        if let Value::Object(map) = &mut row {
            let category = map
                .get("category_id")
                .and_then(Value::as_str)
                .and_then(|id| categories.iter().find(|category| category.id == id));
            if let Some(category) = category {
                map.insert("categories".to_string(), to_json(category)?);
            }
        }
        serde_json::from_value(row)
            .map_err(|err| StudioError::StoreUnavailable(format!("undecodable project row: {err}")))
    }

    fn validate_category_ref(tables: &MemoryTables, category_id: &str) -> Result<()> {
        if category_id.is_empty() || tables.categories.iter().any(|c| c.id == category_id) {
            return Ok(());
        }
        Err(StudioError::ValidationRejected(format!(
            "category_id {category_id} does not reference a category"
        )))
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|err| StudioError::ValidationRejected(err.to_string()))
}

fn row_id(row: &Value) -> Option<&str> {
    row.get("id").and_then(Value::as_str)
}

fn row_display_order(row: &Value) -> i64 {
    row.get("display_order")
        .and_then(Value::as_i64)
        .unwrap_or(0)
}

#[async_trait]
impl StudioStore for MemoryStore {
    async fn list_categories(&self) -> Result<Vec<Category>> {
        self.ensure_available()?;
        let mut categories = self.lock().categories.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn find_category_by_name(&self, name: &str) -> Result<Option<Category>> {
        self.ensure_available()?;
        let slug = slugify(name);
        Ok(self
            .lock()
            .categories
            .iter()
            .find(|category| category.slug == slug)
            .cloned())
    }

    async fn insert_category(&self, category: &NewCategory) -> Result<Category> {
        self.ensure_available()?;
        if category.name.trim().is_empty() {
            return Err(StudioError::ValidationRejected("category name is required".to_string()));
        }
        let mut tables = self.lock();
        if tables.categories.iter().any(|c| c.slug == category.slug) {
            return Err(StudioError::ValidationRejected(format!(
                "duplicate category slug: {}",
                category.slug
            )));
        }
        let created = Category {
            id: self.next_id("cat"),
            name: category.name.clone(),
            slug: category.slug.clone(),
        };
        tables.categories.push(created.clone());
        Ok(created)
    }

    async fn list_projects(&self) -> Result<Vec<Project>> {
        self.ensure_available()?;
        let tables = self.lock();
        let mut rows = tables.projects.clone();
        sort_by_display_order(&mut rows, row_display_order);
        rows.iter()
            .map(|row| Self::decode_project(row, &tables.categories))
            .collect()
    }

    async fn find_project_by_title(&self, title: &str) -> Result<Option<Project>> {
        self.ensure_available()?;
        let tables = self.lock();
        tables
            .projects
            .iter()
            .find(|row| row.get("title").and_then(Value::as_str) == Some(title))
            .map(|row| Self::decode_project(row, &tables.categories))
            .transpose()
    }

    async fn max_project_display_order(&self) -> Result<Option<i64>> {
        self.ensure_available()?;
        Ok(self.lock().projects.iter().map(row_display_order).max())
    }

    async fn insert_project(&self, draft: &ProjectDraft) -> Result<Project> {
        self.ensure_available()?;
        if draft.title.trim().is_empty() {
            return Err(StudioError::ValidationRejected("title is required".to_string()));
        }
        let mut tables = self.lock();
        Self::validate_category_ref(&tables, &draft.category_id)?;

        let mut row = match to_json(draft)? {
            Value::Object(map) => map,
            _ => return Err(StudioError::ValidationRejected("draft is not an object".to_string())),
        };
        row.insert("id".to_string(), Value::String(self.next_id("proj")));
        row.entry("display_order").or_insert(Value::from(0));
        let row = Value::Object(row);
        let created = Self::decode_project(&row, &tables.categories)?;
        tables.projects.push(row);
        Ok(created)
    }

    async fn update_project(&self, id: &str, patch: &ProjectPatch) -> Result<()> {
        self.ensure_available()?;
        let mut tables = self.lock();
        if let Some(category_id) = &patch.category_id {
            Self::validate_category_ref(&tables, category_id)?;
        }
        if patch.title.as_deref().is_some_and(|title| title.trim().is_empty()) {
            return Err(StudioError::ValidationRejected("title is required".to_string()));
        }
        let Value::Object(fields) = to_json(patch)? else {
            return Err(StudioError::ValidationRejected("patch is not an object".to_string()));
        };
        let row = tables
            .projects
            .iter_mut()
            .find(|row| row_id(row) == Some(id))
            .ok_or_else(|| StudioError::not_found("project", id))?;
        if let Value::Object(map) = row {
            map.extend(fields);
        }
        Ok(())
    }

    async fn delete_project(&self, id: &str) -> Result<()> {
        self.ensure_available()?;
        let mut tables = self.lock();
        let before = tables.projects.len();
        tables.projects.retain(|row| row_id(row) != Some(id));
        if tables.projects.len() == before {
            return Err(StudioError::not_found("project", id));
        }
        Ok(())
    }

    async fn list_hero_slides(&self) -> Result<Vec<HeroSlide>> {
        self.ensure_available()?;
        let mut slides = self.lock().hero_slides.clone();
        sort_by_display_order(&mut slides, |slide| slide.display_order);
        Ok(slides)
    }

    async fn max_hero_slide_display_order(&self) -> Result<Option<i64>> {
        self.ensure_available()?;
        Ok(self
            .lock()
            .hero_slides
            .iter()
            .map(|slide| slide.display_order)
            .max())
    }

    async fn insert_hero_slide(
        &self,
        draft: &HeroSlideDraft,
        display_order: i64,
    ) -> Result<HeroSlide> {
        self.ensure_available()?;
        if draft.image_url.trim().is_empty() {
            return Err(StudioError::ValidationRejected("image_url is required".to_string()));
        }
        let slide = HeroSlide {
            id: self.next_id("slide"),
            image_url: draft.image_url.clone(),
            caption: draft.caption.clone(),
            display_order,
        };
        self.lock().hero_slides.push(slide.clone());
        Ok(slide)
    }

    async fn delete_hero_slide(&self, id: &str) -> Result<()> {
        self.ensure_available()?;
        let mut tables = self.lock();
        let before = tables.hero_slides.len();
        tables.hero_slides.retain(|slide| slide.id != id);
        if tables.hero_slides.len() == before {
            return Err(StudioError::not_found("hero slide", id));
        }
        Ok(())
    }

    async fn update_hero_slide_order(&self, id: &str, display_order: i64) -> Result<()> {
        self.ensure_available()?;
        let mut tables = self.lock();
        let slide = tables
            .hero_slides
            .iter_mut()
            .find(|slide| slide.id == id)
            .ok_or_else(|| StudioError::not_found("hero slide", id))?;
        slide.display_order = display_order;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{MemoryStore, StudioStore};
    use crate::{GalleryImage, NewCategory, ProjectDraft, ProjectPatch, StudioError};

    fn draft(title: &str, order: i64) -> ProjectDraft {
        ProjectDraft {
            title: title.to_string(),
            display_order: Some(order),
            ..ProjectDraft::default()
        }
    }

    #[tokio::test]
    async fn projects_are_listed_by_display_order_with_join() {
        let store = MemoryStore::new();
        let category = store
            .insert_category(&NewCategory::from_name("Cultural"))
            .await
            .expect("insert category");
        for (title, order) in [("c", 3), ("a", 1), ("b", 2)] {
            let mut draft = draft(title, order);
            draft.category_id = category.id.clone();
            store.insert_project(&draft).await.expect("insert project");
        }

        let projects = store.list_projects().await.expect("list projects");
        let titles: Vec<_> = projects.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b", "c"]);
        assert_eq!(projects[0].category_name(), Some("Cultural"));
    }

    #[tokio::test]
    async fn raw_rows_with_legacy_gallery_are_normalized_on_read() {
        let store = MemoryStore::new();
        let row = json!({
            "title": "Legacy",
            "gallery": [r#"{"url":"https://x","featured":true}"#, "https://y"],
            "display_order": 1
        });
        let serde_json::Value::Object(row) = row else {
            unreachable!("literal is an object");
        };
        store.insert_raw_project(row);

        let projects = store.list_projects().await.expect("list projects");
        assert_eq!(projects[0].gallery, vec![
            GalleryImage::new("https://x", true),
            GalleryImage::new("https://y", false),
        ]);
    }

    #[tokio::test]
    async fn insert_rejects_missing_title_and_unknown_category() {
        let store = MemoryStore::new();
        let err = store
            .insert_project(&draft("  ", 1))
            .await
            .expect_err("blank title must be rejected");
        assert!(matches!(err, StudioError::ValidationRejected(_)));

        let mut draft = draft("Orphan", 1);
        draft.category_id = "cat-404".to_string();
        let err = store
            .insert_project(&draft)
            .await
            .expect_err("unknown category must be rejected");
        assert!(matches!(err, StudioError::ValidationRejected(_)));
    }

    #[tokio::test]
    async fn update_merges_only_present_fields() {
        let store = MemoryStore::new();
        let created = store
            .insert_project(&ProjectDraft {
                location: "Oslo".to_string(),
                ..draft("Museum", 4)
            })
            .await
            .expect("insert project");

        store
            .update_project(&created.id, &ProjectPatch {
                featured: Some(true),
                ..ProjectPatch::default()
            })
            .await
            .expect("update project");

        let projects = store.list_projects().await.expect("list projects");
        assert!(projects[0].featured);
        assert_eq!(projects[0].location, "Oslo");
        assert_eq!(projects[0].display_order, 4);
    }

    #[tokio::test]
    async fn delete_of_unknown_id_is_not_found() {
        let store = MemoryStore::new();
        let err = store
            .delete_project("proj-missing")
            .await
            .expect_err("missing id");
        assert_eq!(err, StudioError::not_found("project", "proj-missing"));
    }

    #[tokio::test]
    async fn offline_store_fails_every_call() {
        let store = MemoryStore::new();
        store.set_unavailable(true);
        assert!(matches!(
            store.list_categories().await,
            Err(StudioError::StoreUnavailable(_))
        ));
        store.set_unavailable(false);
        assert!(store.list_categories().await.is_ok());
    }
}
