use std::path::Path;

use anyhow::Result;
use studio_shared::media::{upload_file, CloudinaryUploader};

pub async fn run(file: &Path) -> Result<()> {
    let uploader = CloudinaryUploader::from_env()?;
    let url = upload_file(&uploader, file).await?;
    println!("{url}");
    Ok(())
}
