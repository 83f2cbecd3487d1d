use std::path::Path;

use anyhow::{bail, Context as _, Result};
use studio_shared::{
    media::{upload_file, CloudinaryUploader},
    portfolio::PortfolioFilter,
    repository::ProjectRepository,
    supabase::SupabaseStore,
    ProjectDraft, ProjectPatch,
};

use super::Context;
use crate::{
    cli::{CreateProjectArgs, ProjectCommands, UpdateProjectArgs},
    utils::{build_gallery, format_project_row, print_json},
};

pub async fn run(session_file: &Path, command: ProjectCommands) -> Result<()> {
    let ctx = Context::connect(session_file)?;
    let repo = ProjectRepository::new(ctx.store.clone());

    match command {
        ProjectCommands::List {
            category,
            search,
            json,
        } => {
            repo.load_all().await?;
            let snapshot = repo.snapshot();
            let filter = PortfolioFilter {
                category,
                search,
            };
            let projects = filter.apply(&snapshot.projects);
            if json {
                return print_json(&projects);
            }
            for project in &projects {
                println!("{}", format_project_row(project));
            }
            tracing::info!("{} of {} projects", projects.len(), snapshot.projects.len());
            Ok(())
        },
        ProjectCommands::Show {
            id,
        } => {
            repo.load_all().await?;
            match repo.project(&id) {
                Some(project) => print_json(&project),
                None => bail!("project not found: {id}"),
            }
        },
        ProjectCommands::Create(args) => {
            ctx.authorize()?;
            create(&repo, args).await
        },
        ProjectCommands::Update(args) => {
            ctx.authorize()?;
            update(&repo, args).await
        },
        ProjectCommands::Delete {
            id,
        } => {
            ctx.authorize()?;
            repo.delete(&id).await?;
            tracing::info!("project {id} deleted");
            Ok(())
        },
    }
}

async fn resolve_image(image: Option<String>, image_file: Option<&Path>) -> Result<Option<String>> {
    match image_file {
        Some(path) => {
            let uploader = CloudinaryUploader::from_env()?;
            let url = upload_file(&uploader, path)
                .await
                .with_context(|| format!("failed to upload {}", path.display()))?;
            Ok(Some(url))
        },
        None => Ok(image),
    }
}

async fn create(repo: &ProjectRepository<SupabaseStore>, args: CreateProjectArgs) -> Result<()> {
    let category = repo.ensure_category(&args.category).await?;
    let image = resolve_image(args.image, args.image_file.as_deref())
        .await?
        .unwrap_or_default();

    let draft = ProjectDraft {
        title: args.title,
        description: args.description,
        year: args.year,
        location: args.location,
        image,
        gallery: build_gallery(&args.gallery, &args.featured_gallery),
        category_id: category.id,
        featured: args.featured,
        display_order: args.display_order,
    };
    let created = repo.create(draft).await?;
    let shown = repo.project(&created.id).unwrap_or(created);
    print_json(&shown)
}

async fn update(repo: &ProjectRepository<SupabaseStore>, args: UpdateProjectArgs) -> Result<()> {
    let category_id = match args.category.as_deref() {
        Some(name) => Some(repo.ensure_category(name).await?.id),
        None => None,
    };
    let gallery = if args.clear_gallery {
        Some(Vec::new())
    } else if args.gallery.is_empty() && args.featured_gallery.is_empty() {
        None
    } else {
        Some(build_gallery(&args.gallery, &args.featured_gallery))
    };

    let patch = ProjectPatch {
        title: args.title,
        description: args.description,
        year: args.year,
        location: args.location,
        image: resolve_image(args.image, args.image_file.as_deref()).await?,
        gallery,
        category_id,
        featured: args.featured,
        display_order: args.display_order,
    };
    if patch.is_empty() {
        bail!("nothing to update for project {}", args.id);
    }

    repo.update(&args.id, &patch).await?;
    match repo.project(&args.id) {
        Some(project) => print_json(&project),
        None => {
            tracing::warn!("project {} updated but not visible in the refreshed catalog", args.id);
            Ok(())
        },
    }
}
