use std::path::Path;

use anyhow::{Context as _, Result};
use studio_shared::{
    hero::HeroSlideRepository,
    media::{upload_file, CloudinaryUploader},
    HeroSlideDraft,
};

use super::Context;
use crate::{
    cli::SlideCommands,
    utils::{format_slide_row, print_json},
};

pub async fn run(session_file: &Path, command: SlideCommands) -> Result<()> {
    let ctx = Context::connect(session_file)?;
    let repo = HeroSlideRepository::new(ctx.store.clone());

    match command {
        SlideCommands::List {
            json,
        } => {
            let slides = repo.load_all().await?;
            if json {
                return print_json(slides.as_slice());
            }
            for slide in slides.iter() {
                println!("{}", format_slide_row(slide));
            }
            Ok(())
        },
        SlideCommands::Add {
            image_url,
            image_file,
            caption,
        } => {
            ctx.authorize()?;
            let image_url = match image_file {
                Some(path) => {
                    let uploader = CloudinaryUploader::from_env()?;
                    upload_file(&uploader, &path)
                        .await
                        .with_context(|| format!("failed to upload {}", path.display()))?
                },
                None => image_url.unwrap_or_default(),
            };
            let slide = repo
                .add(&HeroSlideDraft {
                    image_url,
                    caption: caption.filter(|caption| !caption.trim().is_empty()),
                })
                .await?;
            print_json(&slide)
        },
        SlideCommands::Delete {
            id,
        } => {
            ctx.authorize()?;
            repo.delete(&id).await?;
            tracing::info!("hero slide {id} deleted");
            Ok(())
        },
        SlideCommands::Reorder {
            id,
            display_order,
        } => {
            ctx.authorize()?;
            repo.update_order(&id, display_order).await?;
            for slide in repo.slides().iter() {
                println!("{}", format_slide_row(slide));
            }
            Ok(())
        },
    }
}
