//! Page and image files in the download directory

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Separator that stands in for `/` in file names
const PATH_SEPARATOR: &str = "_-_";

/// Turns a URL path into a flat file stem
///
/// Leading slashes are dropped and every remaining `/` becomes `_-_`. The
/// site root flattens to `index`.
///
/// # Examples
///
/// ```
/// use domain_trawler::output::flatten_path;
///
/// assert_eq!(flatten_path("/recipes/food/views/cake"), "recipes_-_food_-_views_-_cake");
/// assert_eq!(flatten_path("/"), "index");
/// ```
pub fn flatten_path(path: &str) -> String {
    let flat = path.trim_start_matches('/').replace('/', PATH_SEPARATOR);
    if flat.is_empty() {
        "index".to_string()
    } else {
        flat
    }
}

/// File extension for an image path: the text after its last `.`
///
/// Falls back to `bin` when there is no dot in the final path segment.
pub fn image_extension(image_path: &str) -> &str {
    match image_path.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() && !ext.contains('/') => ext,
        _ => "bin",
    }
}

/// Writes pages and images under one directory
#[derive(Debug, Clone)]
pub struct PageWriter {
    dir: PathBuf,
}

impl PageWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Location of the HTML file for a page path
    pub fn page_file(&self, path: &str) -> PathBuf {
        self.dir.join(format!("{}.html", flatten_path(path)))
    }

    /// Location of the image file for a page path
    pub fn image_file(&self, path: &str, image_path: &str) -> PathBuf {
        self.dir.join(format!(
            "{}.{}",
            flatten_path(path),
            image_extension(image_path)
        ))
    }

    /// Writes a page body as UTF-8 text, returning the bytes written
    ///
    /// Invalid UTF-8 in the body is replaced rather than rejected.
    pub fn write_page(&self, path: &str, body: &[u8]) -> io::Result<usize> {
        let text = String::from_utf8_lossy(body);
        fs::write(self.page_file(path), text.as_bytes())?;
        Ok(text.len())
    }

    /// Writes an image next to its page
    ///
    /// Returns `false` without touching the file if it already exists.
    pub fn write_image(&self, path: &str, image_path: &str, bytes: &[u8]) -> io::Result<bool> {
        let file = self.image_file(path, image_path);
        if file.exists() {
            return Ok(false);
        }
        fs::write(file, bytes)?;
        Ok(true)
    }
}
