//! Focus state of the full-screen project viewer.

use std::collections::HashSet;

use crate::Project;

/// How long the exit transition keeps the outgoing project around.
pub const CLOSE_TRANSITION_MS: i64 = 300;

/// Cover first, then gallery URLs; exact duplicates and empty URLs removed,
/// first occurrence wins.
pub fn project_images(project: &Project) -> Vec<&str> {
    let mut seen = HashSet::new();
    std::iter::once(project.image.as_str())
        .chain(project.gallery.iter().map(|image| image.url.as_str()))
        .filter(|url| !url.is_empty() && seen.insert(*url))
        .collect()
}

fn wrap_next(index: usize, len: usize) -> usize {
    (index + 1) % len
}

fn wrap_prev(index: usize, len: usize) -> usize {
    (index + len - 1) % len
}

/// Keys the viewer reacts to while open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightboxKey {
    /// Close the viewer.
    Escape,
    /// Previous image.
    ArrowLeft,
    /// Next image.
    ArrowRight,
}

impl LightboxKey {
    /// Maps a DOM `KeyboardEvent.key` value.
    pub fn from_key_name(name: &str) -> Option<Self> {
        match name {
            "Escape" => Some(Self::Escape),
            "ArrowLeft" => Some(Self::ArrowLeft),
            "ArrowRight" => Some(Self::ArrowRight),
            _ => None,
        }
    }
}

/// Full-screen image viewer state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Lightbox {
    current_project: Option<Project>,
    current_image_index: usize,
    is_open: bool,
    closed_at_ms: Option<i64>,
}

impl Lightbox {
    /// A closed viewer with no project.
    pub fn new() -> Self {
        Self::default()
    }

    /// Project being shown, kept briefly after close for the exit transition.
    pub fn current_project(&self) -> Option<&Project> {
        self.current_project.as_ref()
    }

    /// Position in [`project_images`] of the current project.
    pub fn current_image_index(&self) -> usize {
        self.current_image_index
    }

    /// Whether the viewer is visible.
    pub fn is_open(&self) -> bool {
        self.is_open
    }

    /// URL of the image on screen.
    pub fn current_image(&self) -> Option<&str> {
        let project = self.current_project.as_ref()?;
        project_images(project)
            .get(self.current_image_index)
            .copied()
    }

    /// Shows `project` from its first image.
    pub fn open(&mut self, project: Project) {
        self.current_project = Some(project);
        self.current_image_index = 0;
        self.is_open = true;
        self.closed_at_ms = None;
    }

    /// Hides the viewer. The project stays readable until [`Self::settle`]
    /// runs after [`CLOSE_TRANSITION_MS`].
    pub fn close(&mut self, now_ms: i64) {
        if !self.is_open {
            return;
        }
        self.is_open = false;
        self.closed_at_ms = Some(now_ms);
    }

    /// Drops the outgoing project once the exit transition has elapsed.
    pub fn settle(&mut self, now_ms: i64) {
        if let Some(closed_at) = self.closed_at_ms {
            if now_ms - closed_at >= CLOSE_TRANSITION_MS {
                self.current_project = None;
                self.current_image_index = 0;
                self.closed_at_ms = None;
            }
        }
    }

    /// Moves to the following project in `projects`, wrapping around.
    pub fn next_project(&mut self, projects: &[Project]) {
        self.step_project(projects, wrap_next);
    }

    /// Moves to the preceding project in `projects`, wrapping around.
    pub fn prev_project(&mut self, projects: &[Project]) {
        self.step_project(projects, wrap_prev);
    }

    /// Next image of the current project, wrapping around.
    pub fn next_image(&mut self) {
        self.step_image(wrap_next);
    }

    /// Previous image of the current project, wrapping around.
    pub fn prev_image(&mut self) {
        self.step_image(wrap_prev);
    }

    /// Escape closes; arrows move between projects. Ignored while closed.
    pub fn handle_key(&mut self, key: LightboxKey, projects: &[Project], now_ms: i64) {
        if !self.is_open {
            return;
        }
        match key {
            LightboxKey::Escape => self.close(now_ms),
            LightboxKey::ArrowRight => self.next_project(projects),
            LightboxKey::ArrowLeft => self.prev_project(projects),
        }
    }

    fn step_project(&mut self, projects: &[Project], step: fn(usize, usize) -> usize) {
        let Some(current) = self.current_project.as_ref() else {
            return;
        };
        if projects.is_empty() {
            return;
        }
        // A project deleted under the viewer restarts navigation at the top.
        let target = match projects.iter().position(|project| project.id == current.id) {
            Some(index) => step(index, projects.len()),
            None => 0,
        };
        self.current_project = Some(projects[target].clone());
        self.current_image_index = 0;
    }

    fn step_image(&mut self, step: fn(usize, usize) -> usize) {
        let Some(project) = self.current_project.as_ref() else {
            return;
        };
        let len = project_images(project).len();
        if len == 0 {
            return;
        }
        self.current_image_index = step(self.current_image_index.min(len - 1), len);
    }
}
