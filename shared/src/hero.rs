//! Home page slideshow: slide storage and the auto-advancing carousel.

use std::sync::{Arc, PoisonError, RwLock};

use crate::{store::StudioStore, HeroSlide, HeroSlideDraft, Result};

/// Delay between two automatic slide changes.
pub const HERO_ADVANCE_INTERVAL_MS: u64 = 5_000;

#[derive(Default)]
struct SlideState {
    slides: Arc<Vec<HeroSlide>>,
    last_error: Option<String>,
}

/// Cache of hero slides over a [`StudioStore`].
pub struct HeroSlideRepository<S> {
    store: Arc<S>,
    state: RwLock<SlideState>,
}

impl<S: StudioStore> HeroSlideRepository<S> {
    /// Empty cache; call [`Self::load_all`] to fill it.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            state: RwLock::new(SlideState::default()),
        }
    }

    /// Slides in `display_order`.
    pub fn slides(&self) -> Arc<Vec<HeroSlide>> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&state.slides)
    }

    /// Message of the last failed load, cleared by the next success.
    pub fn last_error(&self) -> Option<String> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.last_error.clone()
    }

    /// Fetches every slide in display order and replaces the cache.
    pub async fn load_all(&self) -> Result<Arc<Vec<HeroSlide>>> {
        let fetched = self.store.list_hero_slides().await;
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        match fetched {
            Ok(mut slides) => {
                crate::sort_by_display_order(&mut slides, |slide| slide.display_order);
                state.slides = Arc::new(slides);
                state.last_error = None;
                Ok(Arc::clone(&state.slides))
            },
            Err(err) => {
                tracing::warn!("hero slides load failed: {err}");
                state.last_error = Some(err.to_string());
                Err(err)
            },
        }
    }

    /// Appends a slide at `max(display_order) + 1` and adds it locally.
    ///
    /// Same non-atomic max-then-insert as project creation.
    pub async fn add(&self, draft: &HeroSlideDraft) -> Result<HeroSlide> {
        let order = self.store.max_hero_slide_display_order().await?.unwrap_or(0) + 1;
        let created = self.store.insert_hero_slide(draft, order).await?;
        tracing::info!("added hero slide {} at display_order {order}", created.id);

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let mut slides = Vec::clone(&state.slides);
        slides.push(created.clone());
        state.slides = Arc::new(slides);
        Ok(created)
    }

    /// Deletes the slide and drops it locally without refetching.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.store.delete_hero_slide(id).await?;
        tracing::info!("deleted hero slide {id}");

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let mut slides = Vec::clone(&state.slides);
        slides.retain(|slide| slide.id != id);
        state.slides = Arc::new(slides);
        Ok(())
    }

    /// Moves a slide, then refetches so the new order is reflected.
    pub async fn update_order(&self, id: &str, display_order: i64) -> Result<()> {
        self.store.update_hero_slide_order(id, display_order).await?;
        tracing::info!("moved hero slide {id} to display_order {display_order}");
        if let Err(err) = self.load_all().await {
            tracing::warn!("refresh after reorder failed: {err}");
        }
        Ok(())
    }
}

/// Which slide is showing and which one it is covering.
///
/// The previous slide stays rendered underneath while the current one is
/// revealed on top of it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeroCarousel {
    previous: usize,
    current: usize,
}

impl HeroCarousel {
    /// Starts on the first slide.
    pub fn new() -> Self {
        Self::default()
    }

    /// Slide fading out.
    pub fn previous(&self) -> usize {
        self.previous
    }

    /// Slide on screen.
    pub fn current(&self) -> usize {
        self.current
    }

    /// Whether a timer should run at all.
    pub fn should_auto_advance(slide_count: usize) -> bool {
        slide_count > 1
    }

    /// One timer tick. Returns `false` when there is nothing to advance to.
    pub fn advance(&mut self, slide_count: usize) -> bool {
        if !Self::should_auto_advance(slide_count) {
            return false;
        }
        let current = self.current.min(slide_count - 1);
        self.previous = current;
        self.current = (current + 1) % slide_count;
        true
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{HeroCarousel, HeroSlideRepository};
    use crate::{store::MemoryStore, HeroSlideDraft, StudioError};

    fn slide(url: &str) -> HeroSlideDraft {
        HeroSlideDraft {
            image_url: url.to_string(),
            caption: None,
        }
    }

    #[tokio::test]
    async fn add_assigns_increasing_order_and_appends() {
        let repo = HeroSlideRepository::new(Arc::new(MemoryStore::new()));
        let first = repo.add(&slide("1.jpg")).await.expect("add first");
        let second = repo.add(&slide("2.jpg")).await.expect("add second");

        assert_eq!(first.display_order, 1);
        assert_eq!(second.display_order, 2);
        assert_eq!(repo.slides().len(), 2);
    }

    #[tokio::test]
    async fn reorder_refetches_in_new_order() {
        let repo = HeroSlideRepository::new(Arc::new(MemoryStore::new()));
        let first = repo.add(&slide("1.jpg")).await.expect("add first");
        repo.add(&slide("2.jpg")).await.expect("add second");

        repo.update_order(&first.id, 10).await.expect("reorder");
        let urls: Vec<_> = repo
            .slides()
            .iter()
            .map(|slide| slide.image_url.clone())
            .collect();
        assert_eq!(urls, vec!["2.jpg", "1.jpg"]);
    }

    #[tokio::test]
    async fn delete_removes_locally_and_failed_load_keeps_slides() {
        let store = Arc::new(MemoryStore::new());
        let repo = HeroSlideRepository::new(Arc::clone(&store));
        let first = repo.add(&slide("1.jpg")).await.expect("add first");
        repo.add(&slide("2.jpg")).await.expect("add second");
        repo.delete(&first.id).await.expect("delete");
        assert_eq!(repo.slides().len(), 1);

        store.set_unavailable(true);
        let err = repo.load_all().await.expect_err("offline");
        assert!(matches!(err, StudioError::StoreUnavailable(_)));
        assert_eq!(repo.slides().len(), 1);
        assert!(repo.last_error().is_some());
    }

    #[test]
    fn carousel_cycles_and_tracks_previous() {
        let mut carousel = HeroCarousel::new();
        assert!(carousel.advance(3));
        assert_eq!((carousel.previous(), carousel.current()), (0, 1));
        carousel.advance(3);
        carousel.advance(3);
        assert_eq!((carousel.previous(), carousel.current()), (2, 0));
    }

    #[test]
    fn carousel_holds_with_one_slide_or_none() {
        let mut carousel = HeroCarousel::new();
        assert!(!carousel.advance(1));
        assert!(!carousel.advance(0));
        assert_eq!(carousel, HeroCarousel::new());
    }
}
