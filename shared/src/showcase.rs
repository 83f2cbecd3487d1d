//! The "selected works" surface: which images appear, and in which column.

use serde::{Deserialize, Serialize};

use crate::Project;

/// Where a display item's image comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "index")]
pub enum ImageSource {
    /// The project's cover image.
    Cover,
    /// Position in the project's normalized gallery.
    Gallery(usize),
}

/// One image on the "selected works" surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayItem {
    /// Owning project id.
    pub project_id: String,
    /// Owning project title, for captions.
    pub project_title: String,
    /// Image URL.
    pub url: String,
    /// Which image of the project this is.
    pub source: ImageSource,
}

/// Collects showcase images in a single pass over `projects`.
///
/// A featured project contributes its cover (when it has one); any project
/// contributes each gallery image flagged as featured, whatever the project's
/// own flag says.
pub fn select_featured(projects: &[Project]) -> Vec<DisplayItem> {
    let mut items = Vec::new();
    for project in projects {
        if project.featured && !project.image.trim().is_empty() {
            items.push(DisplayItem {
                project_id: project.id.clone(),
                project_title: project.title.clone(),
                url: project.image.clone(),
                source: ImageSource::Cover,
            });
        }
        for (index, image) in project.gallery.iter().enumerate() {
            if image.featured {
                items.push(DisplayItem {
                    project_id: project.id.clone(),
                    project_title: project.title.clone(),
                    url: image.url.clone(),
                    source: ImageSource::Gallery(index),
                });
            }
        }
    }
    items
}

/// Round-robin bucketing: item `i` lands in column `i % columns`.
///
/// Order is preserved inside each column. Heights are not balanced.
pub fn distribute_columns<T: Clone>(items: &[T], columns: usize) -> Vec<Vec<T>> {
    let columns = columns.max(1);
    let mut buckets = vec![Vec::with_capacity(items.len().div_ceil(columns)); columns];
    for (index, item) in items.iter().enumerate() {
        buckets[index % columns].push(item.clone());
    }
    buckets
}

/// Viewport widths (px) at which one more column is added.
pub const COLUMN_BREAKPOINTS: [u32; 3] = [640, 1024, 1536];

/// Column count for a viewport `width` in pixels.
pub fn columns_for_width(width: u32) -> usize {
    1 + COLUMN_BREAKPOINTS
        .iter()
        .filter(|breakpoint| width >= **breakpoint)
        .count()
}

/// Masonry columns that are only rebuilt when they would change: the width
/// crosses a breakpoint, or a different item list is supplied.
#[derive(Debug, Default)]
pub struct MasonryLayout {
    items: Vec<DisplayItem>,
    columns: Vec<Vec<DisplayItem>>,
    column_count: usize,
    rebuilds: usize,
}

impl MasonryLayout {
    /// Lays `items` out for a viewport of `width` pixels.
    pub fn new(items: Vec<DisplayItem>, width: u32) -> Self {
        let mut layout = Self {
            items,
            ..Self::default()
        };
        layout.rebuild(columns_for_width(width));
        layout
    }

    /// Returns `true` if the columns were recomputed.
    pub fn resize(&mut self, width: u32) -> bool {
        let column_count = columns_for_width(width);
        if column_count == self.column_count {
            return false;
        }
        self.rebuild(column_count);
        true
    }

    /// Returns `true` if the columns were recomputed.
    pub fn set_items(&mut self, items: Vec<DisplayItem>) -> bool {
        if items == self.items {
            return false;
        }
        self.items = items;
        self.rebuild(self.column_count);
        true
    }

    /// Current columns, left to right.
    pub fn columns(&self) -> &[Vec<DisplayItem>] {
        &self.columns
    }

    /// Number of columns in use.
    pub fn column_count(&self) -> usize {
        self.column_count
    }

    /// How many times the columns were recomputed.
    pub fn rebuilds(&self) -> usize {
        self.rebuilds
    }

    fn rebuild(&mut self, column_count: usize) {
        self.column_count = column_count;
        self.columns = distribute_columns(&self.items, column_count);
        self.rebuilds += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GalleryImage;

    fn project(id: &str, featured: bool, image: &str, gallery: Vec<GalleryImage>) -> Project {
        Project {
            id: id.to_string(),
            title: id.to_uppercase(),
            description: String::new(),
            year: 2024,
            location: String::new(),
            image: image.to_string(),
            gallery,
            category_id: String::new(),
            category: None,
            featured,
            display_order: 0,
        }
    }

    #[test]
    fn featured_cover_and_featured_gallery_images_are_selected() {
        let projects = vec![
            project("a", true, "a.jpg", vec![GalleryImage::new("a1.jpg", false)]),
            project("b", false, "b.jpg", vec![GalleryImage::new("b1.jpg", true)]),
        ];

        let items = select_featured(&projects);
        let urls: Vec<_> = items.iter().map(|item| item.url.as_str()).collect();
        assert_eq!(urls, vec!["a.jpg", "b1.jpg"]);
        assert_eq!(items[0].source, ImageSource::Cover);
        assert_eq!(items[1].source, ImageSource::Gallery(0));
        assert_eq!(items[1].project_id, "b");
    }

    #[test]
    fn featured_project_without_cover_contributes_only_gallery() {
        let projects = vec![project("c", true, " ", vec![
            GalleryImage::new("c1.jpg", true),
            GalleryImage::new("c2.jpg", false),
            GalleryImage::new("c3.jpg", true),
        ])];

        let urls: Vec<_> = select_featured(&projects)
            .into_iter()
            .map(|item| item.url)
            .collect();
        assert_eq!(urls, vec!["c1.jpg", "c3.jpg"]);
    }

    #[test]
    fn round_robin_bucketing_keeps_order_within_columns() {
        let items: Vec<usize> = (0..7).collect();
        let columns = distribute_columns(&items, 3);
        assert_eq!(columns, vec![vec![0, 3, 6], vec![1, 4], vec![2, 5]]);
    }

    #[test]
    fn zero_columns_collapses_to_one() {
        let columns = distribute_columns(&["x", "y"], 0);
        assert_eq!(columns, vec![vec!["x", "y"]]);
    }

    #[test]
    fn breakpoints_map_width_to_columns() {
        assert_eq!(columns_for_width(375), 1);
        assert_eq!(columns_for_width(640), 2);
        assert_eq!(columns_for_width(1023), 2);
        assert_eq!(columns_for_width(1280), 3);
        assert_eq!(columns_for_width(1920), 4);
    }

    #[test]
    fn layout_rebuilds_only_on_breakpoint_or_item_change() {
        let projects = vec![project("a", true, "a.jpg", vec![GalleryImage::new("a1.jpg", true)])];
        let mut layout = MasonryLayout::new(select_featured(&projects), 1100);
        assert_eq!(layout.column_count(), 3);
        assert_eq!(layout.rebuilds(), 1);

        assert!(!layout.resize(1200));
        assert!(layout.resize(700));
        assert_eq!(layout.column_count(), 2);
        assert_eq!(layout.columns()[0].len(), 1);

        assert!(!layout.set_items(select_featured(&projects)));
        assert!(layout.set_items(Vec::new()));
        assert_eq!(layout.rebuilds(), 3);
    }
}
