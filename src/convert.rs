// -- external imports
use image::{DynamicImage, GrayImage, ImageFormat};
use std::io::Cursor;
use std::path::Path;

use crate::error::{AppError, Result};

// -- public API

/// Decode an encoded image byte stream (format guessed from its header).
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage> {
    if bytes.is_empty() {
        return Err(AppError::Decode("empty image stream".to_string()));
    }
    image::load_from_memory(bytes).map_err(|e| AppError::Decode(e.to_string()))
}

/// Decode an encoded image byte stream into 8-bit grayscale.
pub fn decode_gray(bytes: &[u8]) -> Result<GrayImage> {
    decode_image(bytes).map(|img| img.into_luma8())
}

/// Open an image file from disk as 8-bit grayscale.
pub fn open_gray(path: &Path) -> Result<GrayImage> {
    image::open(path)
        .map(|img| img.into_luma8())
        .map_err(|e| AppError::ImageLoad(format!("{:?}: {}", path, e)))
}

/// Encode an image as lossless PNG bytes.
pub fn to_png_bytes(image: &DynamicImage) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, ImageFormat::Png)
        .map_err(|e| AppError::Encode(e.to_string()))?;
    Ok(buffer.into_inner())
}

/// Encode a grayscale image as lossless PNG bytes.
pub fn gray_to_png_bytes(image: &GrayImage) -> Result<Vec<u8>> {
    to_png_bytes(&DynamicImage::ImageLuma8(image.clone()))
}

/// Conversions between `image` buffers and OpenCV matrices
#[cfg(feature = "opencv")]
pub mod mat {
    use image::GrayImage;
    use opencv::core::{CV_8UC1, Mat, Scalar};
    use opencv::prelude::*;

    use crate::error::{AppError, Result};

    /// Copy a grayscale image into a freshly allocated CV_8UC1 matrix.
    pub fn gray_to_mat(image: &GrayImage) -> Result<Mat> {
        let (width, height) = image.dimensions();
        let mut mat = Mat::new_rows_cols_with_default(
            height as i32,
            width as i32,
            CV_8UC1,
            Scalar::all(0.0),
        )
        .map_err(|e| AppError::Decode(e.to_string()))?;
        mat.data_bytes_mut()
            .map_err(|e| AppError::Decode(e.to_string()))?
            .copy_from_slice(image.as_raw());
        Ok(mat)
    }

    /// Copy a continuous CV_8UC1 matrix back into a grayscale image.
    pub fn mat_to_gray(mat: &Mat) -> Result<GrayImage> {
        if mat.typ() != CV_8UC1 {
            return Err(AppError::Decode(format!(
                "expected CV_8UC1 matrix, got type {}",
                mat.typ()
            )));
        }
        let width = mat.cols() as u32;
        let height = mat.rows() as u32;
        let data = mat
            .data_bytes()
            .map_err(|e| AppError::Decode(e.to_string()))?
            .to_vec();
        GrayImage::from_raw(width, height, data)
            .ok_or_else(|| AppError::Decode("matrix buffer size mismatch".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn gradient(width: u32, height: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, y| Luma([((x * 7 + y * 13) % 256) as u8]))
    }

    #[test]
    fn test_png_round_trip_is_pixel_identical() {
        let original = gradient(37, 21);
        let bytes = gray_to_png_bytes(&original).unwrap();
        let decoded = decode_gray(&bytes).unwrap();

        assert_eq!(decoded.dimensions(), original.dimensions());
        assert_eq!(decoded.as_raw(), original.as_raw());
    }

    #[test]
    fn test_decode_color_as_gray() {
        let rgb = image::RgbImage::from_pixel(4, 3, image::Rgb([255, 255, 255]));
        let bytes = to_png_bytes(&DynamicImage::ImageRgb8(rgb)).unwrap();
        let gray = decode_gray(&bytes).unwrap();

        assert_eq!(gray.dimensions(), (4, 3));
        assert!(gray.pixels().all(|p| p.0[0] == 255));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(decode_gray(b""), Err(AppError::Decode(_))));
        assert!(matches!(
            decode_gray(b"definitely not an image"),
            Err(AppError::Decode(_))
        ));
    }

    #[test]
    fn test_open_gray_missing_file() {
        let err = open_gray(Path::new("/nonexistent/1-face.png")).unwrap_err();
        assert!(matches!(err, AppError::ImageLoad(_)));
    }
}
