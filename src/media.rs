//! Uploaded post images: validation and storage under the media root.

use image::ImageFormat;
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use rocket::fs::TempFile;
use rocket::tokio::{self, fs, io::AsyncReadExt};
use std::io;
use std::path::Path;

/// Subdirectory of the media root holding post images.
const POSTS_DIR: &str = "posts";

const SUFFIX_LEN: usize = 7;

/// Reads a whole upload into memory. An empty file input yields `None`.
pub async fn read_upload(file: &TempFile<'_>) -> io::Result<Option<Vec<u8>>> {
    if file.len() == 0 {
        return Ok(None);
    }
    let reader = file.open().await?;
    tokio::pin!(reader);
    let mut bytes = Vec::with_capacity(file.len() as usize);
    reader.read_to_end(&mut bytes).await?;
    Ok(Some(bytes))
}

/// Returns the format of `bytes` when they hold a decodable image.
pub fn inspect(bytes: &[u8]) -> Option<ImageFormat> {
    let format = image::guess_format(bytes).ok()?;
    image::load_from_memory_with_format(bytes, format).ok()?;
    Some(format)
}

/// Builds `<stem>_<random>.<ext>`, keeping only filename-safe characters of the stem.
pub fn file_name(stem: Option<&str>, format: ImageFormat) -> String {
    let stem: String = stem
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .take(64)
        .collect();
    let stem = if stem.is_empty() { "image".to_string() } else { stem };
    let suffix: String = thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SUFFIX_LEN)
        .map(char::from)
        .collect();
    let extension = format.extensions_str().first().copied().unwrap_or("img");
    format!("{}_{}.{}", stem, suffix, extension)
}

/// Writes an image under the media root and returns its path relative to it.
pub async fn save(media_root: &Path, name: &str, bytes: &[u8]) -> io::Result<String> {
    let dir = media_root.join(POSTS_DIR);
    fs::create_dir_all(&dir).await?;
    fs::write(dir.join(name), bytes).await?;
    Ok(format!("{}/{}", POSTS_DIR, name))
}

/// Public URL of a stored media file.
pub fn url(relative: &str) -> String {
    format!("/media/{}", relative)
}
