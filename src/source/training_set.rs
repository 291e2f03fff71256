use image::GrayImage;
use std::path::{Path, PathBuf};

use crate::convert::open_gray;
use crate::error::{AppError, Result};

use super::source_utils::{collect_files_from_dir, is_training_image};

/// A labeled grayscale face image
#[derive(Debug, Clone)]
pub struct TrainingSample {
    /// File the sample was read from
    pub path: PathBuf,
    /// Decoded 8-bit grayscale image
    pub image: GrayImage,
    /// Identity label parsed from the file name
    pub label: i32,
}

/// Labeled training images read from one flat directory.
///
/// Files are named `<label>-<anything>.<ext>` with ext in jpg/pgm/png.
#[derive(Debug, Clone)]
pub struct TrainingSet {
    dir: PathBuf,
    samples: Vec<TrainingSample>,
}

impl TrainingSet {
    /// Load every training image under `dir`.
    ///
    /// # Errors
    ///
    /// Returns `AppError` if:
    /// - The directory cannot be listed (`Io`)
    /// - It holds no jpg/pgm/png file (`EmptyTrainingSet`)
    /// - Any file name lacks an integer label prefix (`Labeling`)
    /// - Any file cannot be decoded (`ImageLoad`)
    ///
    /// Loading is fail-fast: one bad file rejects the whole set.
    pub fn load(dir: &Path) -> Result<Self> {
        let paths = collect_files_from_dir(dir, is_training_image)?;
        if paths.is_empty() {
            return Err(AppError::EmptyTrainingSet(dir.to_path_buf()));
        }

        // labels first, so a misnamed file is reported before any decode work
        let labels = paths
            .iter()
            .map(|p| label_from_path(p))
            .collect::<Result<Vec<i32>>>()?;

        let mut samples = Vec::with_capacity(paths.len());
        for (path, label) in paths.into_iter().zip(labels) {
            let image = open_gray(&path)?;
            tracing::debug!(
                "[Training] {:?} -> label {}",
                path.file_name().unwrap_or_default(),
                label
            );
            samples.push(TrainingSample { path, image, label });
        }

        Ok(Self {
            dir: dir.to_path_buf(),
            samples,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn samples(&self) -> &[TrainingSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Images in load order, parallel to [`TrainingSet::labels`]
    pub fn images(&self) -> Vec<&GrayImage> {
        self.samples.iter().map(|s| &s.image).collect()
    }

    /// Labels in load order, parallel to [`TrainingSet::images`]
    pub fn labels(&self) -> Vec<i32> {
        self.samples.iter().map(|s| s.label).collect()
    }

    /// Number of distinct identities
    pub fn num_classes(&self) -> usize {
        let mut labels = self.labels();
        labels.sort_unstable();
        labels.dedup();
        labels.len()
    }
}

/// Parse the identity label from the part of a file name before its first hyphen.
pub fn parse_label(file_name: &str) -> std::result::Result<i32, String> {
    let (prefix, _) = file_name
        .split_once('-')
        .ok_or_else(|| "file name has no '-' separated label prefix".to_string())?;
    prefix
        .parse::<i32>()
        .map_err(|e| format!("label prefix {prefix:?} is not an integer: {e}"))
}

fn label_from_path(path: &Path) -> Result<i32> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    parse_label(&file_name).map_err(|reason| AppError::Labeling {
        path: path.to_path_buf(),
        reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use tempfile::TempDir;

    fn write_face(dir: &Path, name: &str, shade: u8) {
        GrayImage::from_pixel(8, 8, Luma([shade]))
            .save(dir.join(name))
            .unwrap();
    }

    #[test]
    fn test_parse_label() {
        assert_eq!(parse_label("7-sample.png"), Ok(7));
        assert_eq!(parse_label("12-a-b-c.jpg"), Ok(12));
        assert_eq!(parse_label("0-.pgm"), Ok(0));
        assert!(parse_label("sample.png").is_err());
        assert!(parse_label("7.png").is_err());
        assert!(parse_label("x7-sample.png").is_err());
        assert!(parse_label("-7-sample.png").is_err());
    }

    #[test]
    fn test_load_labels_match_file_prefixes() {
        let temp_dir = TempDir::new().unwrap();
        write_face(temp_dir.path(), "1-alice-a.png", 10);
        write_face(temp_dir.path(), "1-alice-b.png", 20);
        write_face(temp_dir.path(), "2-bob.PNG", 200);
        write_face(temp_dir.path(), "42-carol.jpg", 120);
        std::fs::write(temp_dir.path().join("readme.txt"), "not a face").unwrap();

        let set = TrainingSet::load(temp_dir.path()).unwrap();

        assert_eq!(set.len(), 4);
        assert_eq!(set.images().len(), set.labels().len());
        assert_eq!(set.num_classes(), 3);
        for sample in set.samples() {
            let name = sample.path.file_name().unwrap().to_string_lossy();
            assert_eq!(Ok(sample.label), parse_label(&name));
            assert_eq!(sample.image.dimensions(), (8, 8));
        }
    }

    #[test]
    fn test_load_single_file_label() {
        let temp_dir = TempDir::new().unwrap();
        write_face(temp_dir.path(), "7-sample.png", 99);

        let set = TrainingSet::load(temp_dir.path()).unwrap();
        assert_eq!(set.labels(), vec![7]);
        assert_eq!(set.dir(), temp_dir.path());
    }

    #[test]
    fn test_load_unlabeled_file_fails_whole_set() {
        let temp_dir = TempDir::new().unwrap();
        write_face(temp_dir.path(), "7-sample.png", 99);
        write_face(temp_dir.path(), "sample.png", 99);

        let err = TrainingSet::load(temp_dir.path()).unwrap_err();
        match err {
            AppError::Labeling { path, .. } => assert!(path.ends_with("sample.png")),
            other => panic!("Expected Labeling error, got {other:?}"),
        }
    }

    #[test]
    fn test_load_empty_dir() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("1-notes.txt"), "ignored").unwrap();

        let err = TrainingSet::load(temp_dir.path()).unwrap_err();
        assert!(matches!(err, AppError::EmptyTrainingSet(_)));
    }

    #[test]
    fn test_load_corrupt_image() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("3-broken.png"), b"not a png").unwrap();

        let err = TrainingSet::load(temp_dir.path()).unwrap_err();
        assert!(matches!(err, AppError::ImageLoad(_)));
    }
}
