//! Portfolio page filtering.

use crate::Project;

/// Category label that disables category filtering.
pub const ALL_CATEGORIES: &str = "All";

/// Portfolio page filter: category plus free-text search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortfolioFilter {
    /// Category name or slug; `None` or [`ALL_CATEGORIES`] matches everything.
    pub category: Option<String>,
    /// Case-insensitive substring of the title or the location.
    pub search: Option<String>,
}

impl PortfolioFilter {
    /// Whether `project` passes both the category and search filters.
    pub fn matches(&self, project: &Project) -> bool {
        self.matches_category(project) && self.matches_search(project)
    }

    /// Keeps `display_order` order.
    pub fn apply<'a>(&self, projects: &'a [Project]) -> Vec<&'a Project> {
        projects
            .iter()
            .filter(|project| self.matches(project))
            .collect()
    }

    fn matches_category(&self, project: &Project) -> bool {
        let wanted = match self.category.as_deref().map(str::trim) {
            None | Some("") => return true,
            Some(wanted) if wanted.eq_ignore_ascii_case(ALL_CATEGORIES) => return true,
            Some(wanted) => wanted,
        };
        project.category.as_ref().is_some_and(|category| {
            category.name.eq_ignore_ascii_case(wanted) || category.slug.eq_ignore_ascii_case(wanted)
        })
    }

    fn matches_search(&self, project: &Project) -> bool {
        let Some(query) = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|query| !query.is_empty())
        else {
            return true;
        };
        let query = query.to_lowercase();
        project.title.to_lowercase().contains(&query)
            || project.location.to_lowercase().contains(&query)
    }
}

#[cfg(test)]
mod tests {
    use super::{PortfolioFilter, ALL_CATEGORIES};
    use crate::{Category, Project};

    fn project(title: &str, location: &str, category: &str) -> Project {
        Project {
            id: title.to_lowercase(),
            title: title.to_string(),
            description: String::new(),
            year: 2024,
            location: location.to_string(),
            image: String::new(),
            gallery: Vec::new(),
            category_id: crate::slugify(category),
            category: Some(Category {
                id: crate::slugify(category),
                name: category.to_string(),
                slug: crate::slugify(category),
            }),
            featured: false,
            display_order: 0,
        }
    }

    fn catalog() -> Vec<Project> {
        vec![
            project("Serenity Residence", "Kyoto, Japan", "Residential"),
            project("Urban Heights", "New York, USA", "Commercial"),
            project("Desert Retreat", "Arizona, USA", "Residential"),
        ]
    }

    fn titles(found: Vec<&Project>) -> Vec<&str> {
        found
            .into_iter()
            .map(|project| project.title.as_str())
            .collect()
    }

    #[test]
    fn empty_filter_and_all_keep_everything() {
        let projects = catalog();
        assert_eq!(PortfolioFilter::default().apply(&projects).len(), 3);
        let all = PortfolioFilter {
            category: Some(ALL_CATEGORIES.to_string()),
            search: Some("  ".to_string()),
        };
        assert_eq!(all.apply(&projects).len(), 3);
    }

    #[test]
    fn category_matches_name_or_slug() {
        let projects = catalog();
        let filter = PortfolioFilter {
            category: Some("residential".to_string()),
            search: None,
        };
        assert_eq!(titles(filter.apply(&projects)), vec![
            "Serenity Residence",
            "Desert Retreat"
        ]);
    }

    #[test]
    fn search_covers_title_and_location_case_insensitively() {
        let projects = catalog();
        let filter = PortfolioFilter {
            category: None,
            search: Some("usa".to_string()),
        };
        assert_eq!(titles(filter.apply(&projects)), vec!["Urban Heights", "Desert Retreat"]);

        let combined = PortfolioFilter {
            category: Some("Residential".to_string()),
            search: Some("KYOTO".to_string()),
        };
        assert_eq!(titles(combined.apply(&projects)), vec!["Serenity Residence"]);
    }
}
