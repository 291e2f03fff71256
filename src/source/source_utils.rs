use std::path::{Path, PathBuf};

use crate::error::Result;

/// Extensions accepted in a training-set directory
pub const TRAINING_EXTENSIONS: [&str; 3] = ["jpg", "pgm", "png"];

/// Training images: jpg, pgm or png, case-insensitive
pub fn is_training_image(path: &Path) -> bool {
    path.extension().is_some_and(|ext| {
        let ext = ext.to_string_lossy().to_lowercase();
        TRAINING_EXTENSIONS.contains(&ext.as_str())
    })
}

/// Any image format the decoder understands, for incoming frames
pub fn is_image_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| {
        let ext = ext.to_string_lossy().to_lowercase();
        matches!(
            ext.as_str(),
            "jpg" | "jpeg" | "png" | "pgm" | "bmp" | "gif" | "webp" | "tiff" | "tif"
        )
    })
}

/// Collect files under `dir` (non-recursive) accepted by `filter`, sorted by path.
pub fn collect_files_from_dir(dir: &Path, filter: fn(&Path) -> bool) -> Result<Vec<PathBuf>> {
    let mut paths = vec![];
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && filter(&path) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}
