use std::path::PathBuf;

use crate::error::Result;

use super::source_utils::{collect_files_from_dir, is_image_file};
use super::{ATTR_FILENAME, Item, ItemSource, Source};

/// Reads frame files from disk and hands them out as host items.
#[derive(Debug)]
pub struct SourceLoader {
    current_idx: usize,
    frames: Vec<PathBuf>,
    len: usize,
}

impl SourceLoader {
    pub fn new(source: &Source) -> Result<Self> {
        let frames = match source {
            Source::ImagePath(path) => {
                if is_image_file(path) {
                    vec![path.clone()]
                } else {
                    vec![]
                }
            }
            Source::Directory(dir_path) => collect_files_from_dir(dir_path, is_image_file)?,
            Source::ImagePathVec(paths) => {
                paths.iter().filter(|p| is_image_file(p)).cloned().collect()
            }
        };
        let len = frames.len();

        Ok(Self {
            current_idx: 0,
            frames,
            len,
        })
    }

    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Iterator for SourceLoader {
    type Item = Item;

    /// Read the next frame file (in lazy loading manner)
    fn next(&mut self) -> Option<Self::Item> {
        while self.current_idx < self.len {
            let idx = self.current_idx;
            let path = &self.frames[idx];
            self.current_idx += 1;

            match std::fs::read(path) {
                Ok(content) => {
                    let file_name = path
                        .file_name()
                        .unwrap_or_default()
                        .to_string_lossy()
                        .into_owned();
                    return Some(
                        Item::new(idx as u64, content).with_attribute(ATTR_FILENAME, file_name),
                    );
                }
                Err(e) => {
                    tracing::error!("Failed to read frame: {:?}. Error: {}", path, e);
                }
            }
        }
        None
    }
}

impl ItemSource for SourceLoader {
    fn next_item(&mut self) -> Option<Item> {
        self.next()
    }

    fn len_hint(&self) -> Option<usize> {
        Some(self.len - self.current_idx)
    }
}
