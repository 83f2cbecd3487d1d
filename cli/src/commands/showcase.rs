use std::path::Path;

use anyhow::Result;
use serde::Serialize;
use studio_shared::{
    repository::ProjectRepository,
    showcase::{select_featured, DisplayItem, MasonryLayout},
};

use super::Context;
use crate::utils::{format_columns, print_json};

#[derive(Serialize)]
struct ShowcaseResponse<'a> {
    width: u32,
    column_count: usize,
    total: usize,
    columns: &'a [Vec<DisplayItem>],
}

pub async fn run(session_file: &Path, width: u32, json: bool) -> Result<()> {
    let ctx = Context::connect(session_file)?;
    let repo = ProjectRepository::new(ctx.store.clone());
    repo.load_all().await?;

    let items = select_featured(&repo.snapshot().projects);
    let total = items.len();
    let layout = MasonryLayout::new(items, width);
    if json {
        return print_json(&ShowcaseResponse {
            width,
            column_count: layout.column_count(),
            total,
            columns: layout.columns(),
        });
    }
    print!("{}", format_columns(layout.columns()));
    tracing::info!("{total} images in {} columns", layout.column_count());
    Ok(())
}
