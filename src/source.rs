// -- submodules
mod loader;
mod source_utils;
mod training_set;

pub use loader::SourceLoader;
pub use source_utils::{collect_files_from_dir, is_image_file, is_training_image};
pub use training_set::{TrainingSample, TrainingSet, parse_label};

// -- external imports
use std::collections::{BTreeMap, VecDeque};
use std::path::PathBuf;

/// Item attribute holding the file name an item was read from
pub const ATTR_FILENAME: &str = "filename";

/// One unit of work handed over by the host: an encoded image plus attributes.
#[derive(Debug, Clone, Default)]
pub struct Item {
    /// Host-assigned identifier
    pub id: u64,
    /// Encoded image bytes
    pub content: Vec<u8>,
    /// Key/value attributes travelling with the item
    pub attributes: BTreeMap<String, String>,
}

impl Item {
    pub fn new(id: u64, content: Vec<u8>) -> Self {
        Self {
            id,
            content,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Short name for log lines
    pub fn display_name(&self) -> String {
        match self.attribute(ATTR_FILENAME) {
            Some(name) => name.to_string(),
            None => format!("item_{}", self.id),
        }
    }
}

/// Pull-based supply of items from the host.
pub trait ItemSource {
    /// Next pending item, or `None` once the queue is drained.
    fn next_item(&mut self) -> Option<Item>;

    /// Number of pending items, when known up front.
    fn len_hint(&self) -> Option<usize> {
        None
    }
}

/// In-memory item queue
#[derive(Debug, Default)]
pub struct VecItemSource {
    items: VecDeque<Item>,
}

impl VecItemSource {
    pub fn new(items: Vec<Item>) -> Self {
        Self {
            items: items.into(),
        }
    }

    /// Wrap raw encoded images, numbering them from 0
    pub fn from_bytes(contents: Vec<Vec<u8>>) -> Self {
        Self::new(
            contents
                .into_iter()
                .enumerate()
                .map(|(idx, content)| Item::new(idx as u64, content))
                .collect(),
        )
    }
}

impl ItemSource for VecItemSource {
    fn next_item(&mut self) -> Option<Item> {
        self.items.pop_front()
    }

    fn len_hint(&self) -> Option<usize> {
        Some(self.items.len())
    }
}

/// Where incoming frames come from when run outside a host
#[derive(Debug, Clone)]
pub enum Source {
    /// Path to a single image file
    ImagePath(PathBuf),

    /// Path to directory containing multiple images
    Directory(PathBuf),

    /// List of image paths
    ImagePathVec(Vec<PathBuf>),
}

impl From<PathBuf> for Source {
    fn from(path: PathBuf) -> Self {
        if path.is_dir() {
            Source::Directory(path)
        } else {
            Source::ImagePath(path)
        }
    }
}

impl From<&str> for Source {
    fn from(path: &str) -> Self {
        Source::from(PathBuf::from(path))
    }
}

impl From<Vec<PathBuf>> for Source {
    fn from(paths: Vec<PathBuf>) -> Self {
        Source::ImagePathVec(paths)
    }
}
