//! The project/category cache every page renders from.

use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard,
};

use crate::{
    sort_by_display_order, store::StudioStore, Category, NewCategory, Project, ProjectDraft,
    ProjectPatch, Result, StudioError,
};

/// An immutable view of the catalog. Consumers hold it through an `Arc` and
/// never mutate it; a new snapshot replaces it wholesale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogSnapshot {
    /// Sorted by name.
    pub categories: Vec<Category>,
    /// Sorted by `display_order`; ties keep store order.
    pub projects: Vec<Project>,
    /// Bumped on every replacement, including local removals.
    pub revision: u64,
}

impl CatalogSnapshot {
    /// Project by id.
    pub fn project(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|project| project.id == id)
    }

    /// Looks a category up by slug, then by case-insensitive name.
    pub fn category(&self, key: &str) -> Option<&Category> {
        let key = key.trim();
        self.categories
            .iter()
            .find(|category| category.slug == key)
            .or_else(|| {
                self.categories
                    .iter()
                    .find(|category| category.name.eq_ignore_ascii_case(key))
            })
    }
}

/// When a successful write resynchronizes the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshPolicy {
    /// Refetch right after each create/update.
    #[default]
    Immediate,
    /// Only mark the cache stale; the caller batches with
    /// [`ProjectRepository::refresh_if_stale`].
    Deferred,
}

/// Result of a [`ProjectRepository::load_all`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// The load replaced the snapshot.
    Applied(Arc<CatalogSnapshot>),
    /// A newer load finished first; this response was discarded.
    Superseded,
}

#[derive(Default)]
struct RepositoryState {
    snapshot: Arc<CatalogSnapshot>,
    applied_seq: u64,
    last_error: Option<String>,
}

/// Cached catalog over a [`StudioStore`].
pub struct ProjectRepository<S> {
    store: Arc<S>,
    policy: RefreshPolicy,
    state: RwLock<RepositoryState>,
    next_seq: AtomicU64,
    stale: AtomicBool,
}

impl<S: StudioStore> ProjectRepository<S> {
    /// Repository refreshing after every write.
    pub fn new(store: Arc<S>) -> Self {
        Self::with_policy(store, RefreshPolicy::default())
    }

    /// Repository with an explicit [`RefreshPolicy`].
    pub fn with_policy(store: Arc<S>, policy: RefreshPolicy) -> Self {
        Self {
            store,
            policy,
            state: RwLock::new(RepositoryState::default()),
            next_seq: AtomicU64::new(0),
            stale: AtomicBool::new(true),
        }
    }

    /// Underlying store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// The last successfully loaded catalog.
    pub fn snapshot(&self) -> Arc<CatalogSnapshot> {
        Arc::clone(&self.read_state().snapshot)
    }

    /// Project by id from the current snapshot.
    pub fn project(&self, id: &str) -> Option<Project> {
        self.read_state().snapshot.project(id).cloned()
    }

    /// Message of the most recent failed load, cleared by the next success.
    pub fn last_error(&self) -> Option<String> {
        self.read_state().last_error.clone()
    }

    /// True after a write whose refresh has not happened yet.
    pub fn is_stale(&self) -> bool {
        self.stale.load(Ordering::SeqCst)
    }

    /// Fetches categories and projects and swaps the snapshot in one step.
    ///
    /// On failure the previous snapshot stays in place and the error message
    /// is kept for [`Self::last_error`]. Responses that arrive after a newer
    /// load has been applied are dropped.
    pub async fn load_all(&self) -> Result<LoadOutcome> {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let fetched = self.fetch_catalog().await;

        let mut state = self.write_state();
        if seq <= state.applied_seq {
            tracing::debug!(
                "discarding catalog load #{seq}; #{} already applied",
                state.applied_seq
            );
            return Ok(LoadOutcome::Superseded);
        }

        match fetched {
            Ok((categories, mut projects)) => {
                sort_by_display_order(&mut projects, |project| project.display_order);
                let snapshot = Arc::new(CatalogSnapshot {
                    categories,
                    projects,
                    revision: state.snapshot.revision + 1,
                });
                tracing::info!(
                    "catalog loaded: {} projects, {} categories",
                    snapshot.projects.len(),
                    snapshot.categories.len()
                );
                state.snapshot = Arc::clone(&snapshot);
                state.applied_seq = seq;
                state.last_error = None;
                self.stale.store(false, Ordering::SeqCst);
                Ok(LoadOutcome::Applied(snapshot))
            },
            Err(err) => {
                let message = err.to_string();
                tracing::warn!("catalog load #{seq} failed: {message}");
                state.last_error = Some(message.clone());
                Err(match err {
                    StudioError::StoreUnavailable(_) => err,
                    _ => StudioError::StoreUnavailable(message),
                })
            },
        }
    }

    async fn fetch_catalog(&self) -> Result<(Vec<Category>, Vec<Project>)> {
        let categories = self.store.list_categories().await?;
        let projects = self.store.list_projects().await?;
        Ok((categories, projects))
    }

    /// Explicit invalidation: resynchronize with the store now.
    pub async fn refresh(&self) -> Result<LoadOutcome> {
        self.load_all().await
    }

    /// Refreshes only when a deferred write left the cache stale.
    pub async fn refresh_if_stale(&self) -> Result<Option<LoadOutcome>> {
        if !self.is_stale() {
            return Ok(None);
        }
        self.load_all().await.map(Some)
    }

    /// Inserts a project, assigning `max(display_order) + 1` when the draft
    /// has no order.
    ///
    /// The max read and the insert are two round trips, so concurrent
    /// creators can be handed the same order value. The store then decides
    /// their relative position.
    pub async fn create(&self, mut draft: ProjectDraft) -> Result<Project> {
        if draft.display_order.is_none() {
            let max = self.store.max_project_display_order().await?;
            draft.display_order = Some(max.unwrap_or(0) + 1);
        }
        let created = self.store.insert_project(&draft).await?;
        tracing::info!(
            "created project {} ({}) at display_order {}",
            created.id,
            created.title,
            created.display_order
        );
        self.after_write().await;
        Ok(created)
    }

    /// Applies `patch` to project `id`, then refreshes per policy.
    pub async fn update(&self, id: &str, patch: &ProjectPatch) -> Result<()> {
        self.store.update_project(id, patch).await?;
        tracing::info!("updated project {id}");
        self.after_write().await;
        Ok(())
    }

    /// Deletes in the store, then drops the project from the snapshot
    /// without refetching.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.store.delete_project(id).await?;
        tracing::info!("deleted project {id}");

        let mut state = self.write_state();
        let mut snapshot = CatalogSnapshot::clone(&state.snapshot);
        snapshot.projects.retain(|project| project.id != id);
        snapshot.revision += 1;
        state.snapshot = Arc::new(snapshot);
        // Loads issued before the delete would bring the row back.
        state.applied_seq = state.applied_seq.max(self.next_seq.load(Ordering::SeqCst));
        Ok(())
    }

    /// Returns the category named `name`, creating it (with a derived slug)
    /// when the store has none.
    pub async fn ensure_category(&self, name: &str) -> Result<Category> {
        let name = name.trim();
        if let Some(existing) = self.store.find_category_by_name(name).await? {
            return Ok(existing);
        }
        let created = self
            .store
            .insert_category(&NewCategory::from_name(name))
            .await?;
        tracing::info!("created category {} ({})", created.name, created.slug);
        self.after_write().await;
        Ok(created)
    }

    async fn after_write(&self) {
        self.stale.store(true, Ordering::SeqCst);
        if self.policy == RefreshPolicy::Deferred {
            return;
        }
        // The write went through; a failed resync only leaves the error state.
        if let Err(err) = self.load_all().await {
            tracing::warn!("refresh after write failed: {err}");
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, RepositoryState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, RepositoryState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
