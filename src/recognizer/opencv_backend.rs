use image::GrayImage;
use opencv::core::{Mat, Ptr, Vector};
use opencv::face::{EigenFaceRecognizer, FisherFaceRecognizer, LBPHFaceRecognizer};
use opencv::prelude::*;
use std::sync::Mutex;

use crate::algorithm::Algorithm;
use crate::convert::mat::gray_to_mat;
use crate::error::{AppError, Result};
use crate::source::TrainingSet;

use super::{Recognizer, VisionBackend};

/// LBPH parameters, OpenCV defaults except for the threshold
#[derive(Debug, Clone, Copy)]
pub struct LbphParams {
    pub radius: i32,
    pub neighbors: i32,
    pub grid_x: i32,
    pub grid_y: i32,
    pub threshold: f64,
}

impl Default for LbphParams {
    fn default() -> Self {
        Self {
            radius: 1,
            neighbors: 8,
            grid_x: 8,
            grid_y: 8,
            threshold: f64::MAX,
        }
    }
}

/// Fits `opencv::face` recognizers.
#[derive(Debug, Clone, Default)]
pub struct OpenCvBackend {
    /// Number of components kept by Fisher/Eigen (0 = all)
    pub num_components: i32,
    pub lbph: LbphParams,
}

enum Model {
    Fisher(Ptr<FisherFaceRecognizer>),
    Eigen(Ptr<EigenFaceRecognizer>),
    Lbph(Ptr<LBPHFaceRecognizer>),
}

/// A trained OpenCV face recognizer.
///
/// Native calls are serialised through a mutex; the binding types are not `Sync`.
pub struct OpenCvRecognizer {
    algorithm: Algorithm,
    model: Mutex<Model>,
}

impl std::fmt::Debug for OpenCvRecognizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenCvRecognizer")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

fn train_err(e: opencv::Error) -> AppError {
    AppError::Train(e.to_string())
}

impl OpenCvBackend {
    fn create(&self, algorithm: Algorithm) -> opencv::Result<Model> {
        // one model per selector, no fall-through
        let model = match algorithm {
            Algorithm::Fisher => {
                Model::Fisher(FisherFaceRecognizer::create(self.num_components, f64::MAX)?)
            }
            Algorithm::Eigen => {
                Model::Eigen(EigenFaceRecognizer::create(self.num_components, f64::MAX)?)
            }
            Algorithm::Lbph => Model::Lbph(LBPHFaceRecognizer::create(
                self.lbph.radius,
                self.lbph.neighbors,
                self.lbph.grid_x,
                self.lbph.grid_y,
                self.lbph.threshold,
            )?),
        };
        Ok(model)
    }
}

impl VisionBackend for OpenCvBackend {
    fn train(
        &self,
        algorithm: Algorithm,
        training_set: &TrainingSet,
    ) -> Result<Box<dyn Recognizer>> {
        if training_set.is_empty() {
            return Err(AppError::EmptyTrainingSet(training_set.dir().to_path_buf()));
        }
        if algorithm == Algorithm::Fisher && training_set.num_classes() < 2 {
            return Err(AppError::Train(
                "Fisher needs samples of at least two identities".to_string(),
            ));
        }

        let mut images = Vector::<Mat>::with_capacity(training_set.len());
        for image in training_set.images() {
            images.push(gray_to_mat(image)?);
        }
        let labels: Vector<i32> = training_set.labels().into_iter().collect();

        let mut model = self.create(algorithm).map_err(train_err)?;
        match &mut model {
            Model::Fisher(m) => m.train(&images, &labels),
            Model::Eigen(m) => m.train(&images, &labels),
            Model::Lbph(m) => m.train(&images, &labels),
        }
        .map_err(train_err)?;

        tracing::info!(
            "Trained {} recognizer on {} images ({} identities)",
            algorithm,
            training_set.len(),
            training_set.num_classes()
        );

        Ok(Box::new(OpenCvRecognizer {
            algorithm,
            model: Mutex::new(model),
        }))
    }
}

impl Recognizer for OpenCvRecognizer {
    fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    fn predict(&self, image: &GrayImage) -> Result<i32> {
        let face = gray_to_mat(image)?;
        let model = self
            .model
            .lock()
            .map_err(|_| AppError::Predict("recognizer lock poisoned".to_string()))?;
        match &*model {
            Model::Fisher(m) => m.predict_label(&face),
            Model::Eigen(m) => m.predict_label(&face),
            Model::Lbph(m) => m.predict_label(&face),
        }
        .map_err(|e| AppError::Predict(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use std::path::Path;
    use tempfile::TempDir;

    /// Label 1 has vertical stripes on a dark base, label 2 horizontal stripes
    /// on a bright base, so both intensity and texture separate the classes.
    fn write_faces(dir: &Path) {
        for variant in 0..3u32 {
            let dark = GrayImage::from_fn(16, 16, |x, _| {
                Luma([if (x + variant) % 4 < 2 { 20 } else { 80 }])
            });
            dark.save(dir.join(format!("1-face{variant}.png"))).unwrap();

            let bright = GrayImage::from_fn(16, 16, |_, y| {
                Luma([if (y + variant) % 4 < 2 { 170 } else { 240 }])
            });
            bright.save(dir.join(format!("2-face{variant}.png"))).unwrap();
        }
    }

    #[test]
    fn test_mat_conversion_keeps_pixels() {
        use crate::convert::mat::mat_to_gray;

        let img = GrayImage::from_fn(5, 3, |x, y| Luma([(x * 40 + y) as u8]));
        let mat = gray_to_mat(&img).unwrap();
        assert_eq!((mat.rows(), mat.cols()), (3, 5));
        assert_eq!(mat_to_gray(&mat).unwrap(), img);
    }

    #[test]
    fn test_every_algorithm_recognises_training_faces() {
        let temp_dir = TempDir::new().unwrap();
        write_faces(temp_dir.path());
        let set = TrainingSet::load(temp_dir.path()).unwrap();
        let backend = OpenCvBackend::default();

        for algorithm in [Algorithm::Fisher, Algorithm::Eigen, Algorithm::Lbph] {
            let recognizer = backend.train(algorithm, &set).unwrap();
            assert_eq!(recognizer.algorithm(), algorithm);
            for sample in set.samples() {
                assert_eq!(recognizer.predict(&sample.image).unwrap(), sample.label);
            }
        }
    }

    #[test]
    fn test_lbph_accepts_other_sizes_unlike_subspace_models() {
        let temp_dir = TempDir::new().unwrap();
        write_faces(temp_dir.path());
        let set = TrainingSet::load(temp_dir.path()).unwrap();
        let backend = OpenCvBackend::default();

        // label 2 texture, twice the training size
        let larger = GrayImage::from_fn(32, 32, |_, y| {
            Luma([if y % 4 < 2 { 170 } else { 240 }])
        });

        let lbph = backend.train(Algorithm::Lbph, &set).unwrap();
        assert_eq!(lbph.predict(&larger).unwrap(), 2);

        for algorithm in [Algorithm::Fisher, Algorithm::Eigen] {
            let recognizer = backend.train(algorithm, &set).unwrap();
            assert!(matches!(
                recognizer.predict(&larger),
                Err(AppError::Predict(_))
            ));
        }
    }
}
