//! Command tree parsed by clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Command-line interface of the studio CMS.
#[derive(Parser)]
#[command(name = "studio-cli", version, about = "Studio portfolio content management")]
pub struct Cli {
    /// Where the signed-in session is kept between runs.
    #[arg(long, global = true, default_value = "./data/session.json")]
    pub session_file: PathBuf,
    /// Command to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Sign in with an administrator account.
    Login {
        /// Account email.
        #[arg(long)]
        email: String,
        /// Account password; read from `STUDIO_ADMIN_PASSWORD` when omitted.
        #[arg(long)]
        password: Option<String>,
    },
    /// Sign out and forget the stored session.
    Logout,
    /// Show the stored session.
    Whoami,
    /// Project CRUD.
    Projects {
        /// Project action.
        #[command(subcommand)]
        command: ProjectCommands,
    },
    /// Preview the "selected works" masonry columns.
    Showcase {
        /// Viewport width in pixels used to pick the column count.
        #[arg(long, default_value_t = 1280)]
        width: u32,
        /// Print JSON instead of a column listing.
        #[arg(long)]
        json: bool,
    },
    /// Hero slideshow management.
    Slides {
        /// Slide action.
        #[command(subcommand)]
        command: SlideCommands,
    },
    /// Upload an image to the media host and print its URL.
    Upload {
        /// Local image file.
        file: PathBuf,
    },
    /// Seed categories and projects (existing titles are skipped).
    Seed {
        /// JSON catalog file; defaults to the built-in launch portfolio.
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

/// Project actions.
#[derive(Subcommand)]
pub enum ProjectCommands {
    /// List projects in display order.
    List {
        /// Category name or slug (`All` for every category).
        #[arg(long)]
        category: Option<String>,
        /// Match title or location, case-insensitively.
        #[arg(long)]
        search: Option<String>,
        /// Print JSON instead of one row per project.
        #[arg(long)]
        json: bool,
    },
    /// Print one project as JSON.
    Show {
        /// Project id.
        id: String,
    },
    /// Create a project.
    Create(CreateProjectArgs),
    /// Update selected fields of a project.
    Update(UpdateProjectArgs),
    /// Delete a project.
    Delete {
        /// Project id.
        id: String,
    },
}

/// Fields of a new project.
#[derive(Args)]
pub struct CreateProjectArgs {
    /// Project title.
    #[arg(long)]
    pub title: String,
    /// Category name; created when it does not exist yet.
    #[arg(long)]
    pub category: String,
    /// Long-form description.
    #[arg(long, default_value = "")]
    pub description: String,
    /// Completion year.
    #[arg(long)]
    pub year: i32,
    /// Free-form place name.
    #[arg(long, default_value = "")]
    pub location: String,
    /// Cover image URL.
    #[arg(long, conflicts_with = "image_file")]
    pub image: Option<String>,
    /// Local cover image, uploaded to the media host first.
    #[arg(long)]
    pub image_file: Option<PathBuf>,
    /// Gallery image URL (repeatable).
    #[arg(long = "gallery")]
    pub gallery: Vec<String>,
    /// Gallery image URL shown in the selected works (repeatable).
    #[arg(long = "featured-gallery")]
    pub featured_gallery: Vec<String>,
    /// Showcase the cover on the home page.
    #[arg(long)]
    pub featured: bool,
    /// Explicit position; defaults to after the last project.
    #[arg(long)]
    pub display_order: Option<i64>,
}

/// Fields to change on an existing project.
#[derive(Args)]
pub struct UpdateProjectArgs {
    /// Project id.
    pub id: String,
    /// New title.
    #[arg(long)]
    pub title: Option<String>,
    /// Category name; created when it does not exist yet.
    #[arg(long)]
    pub category: Option<String>,
    /// New description.
    #[arg(long)]
    pub description: Option<String>,
    /// New completion year.
    #[arg(long)]
    pub year: Option<i32>,
    /// New place name.
    #[arg(long)]
    pub location: Option<String>,
    /// New cover image URL.
    #[arg(long, conflicts_with = "image_file")]
    pub image: Option<String>,
    /// Local cover image, uploaded to the media host first.
    #[arg(long)]
    pub image_file: Option<PathBuf>,
    /// Replaces the gallery when any gallery flag is given (repeatable).
    #[arg(long = "gallery")]
    pub gallery: Vec<String>,
    /// Featured gallery image URL (repeatable).
    #[arg(long = "featured-gallery")]
    pub featured_gallery: Vec<String>,
    /// Empty the gallery.
    #[arg(long, conflicts_with_all = ["gallery", "featured_gallery"])]
    pub clear_gallery: bool,
    /// Showcase the cover on the home page.
    #[arg(long)]
    pub featured: Option<bool>,
    /// New position in every listing.
    #[arg(long)]
    pub display_order: Option<i64>,
}

/// Hero slide actions.
#[derive(Subcommand)]
pub enum SlideCommands {
    /// List slides in display order.
    List {
        /// Print JSON instead of one row per slide.
        #[arg(long)]
        json: bool,
    },
    /// Append a slide.
    Add {
        /// Image URL.
        #[arg(long, conflicts_with = "image_file", required_unless_present = "image_file")]
        image_url: Option<String>,
        /// Local image, uploaded to the media host first.
        #[arg(long)]
        image_file: Option<PathBuf>,
        /// Overlay text.
        #[arg(long)]
        caption: Option<String>,
    },
    /// Delete a slide.
    Delete {
        /// Slide id.
        id: String,
    },
    /// Move a slide to a new display order.
    Reorder {
        /// Slide id.
        id: String,
        /// New position.
        #[arg(long)]
        display_order: i64,
    },
}
