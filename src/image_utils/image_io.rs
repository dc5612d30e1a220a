use crate::error::DetectionError;
use ab_glyph::FontVec;
use image::imageops::{self, FilterType};
use image::{self, RgbImage, RgbaImage};
use std::path::Path;

const IMAGE_EXTENSIONS: [&str; 7] = ["jpg", "jpeg", "png", "bmp", "gif", "webp", "tiff"];

pub fn read_image_as_rgba8(filepath: &Path) -> Result<RgbaImage, DetectionError> {
    Ok(image::open(filepath)?.into_rgba8())
}

/// Stretches an image onto a square canvas of the model's input size, the same way the image
/// is drawn into a fixed-size canvas before its pixels are read back.
pub fn resize_to_model_input(image: &RgbaImage, input_size: u32) -> RgbaImage {
    imageops::resize(image, input_size, input_size, FilterType::Triangle)
}

pub fn save_rgb_image(image: &RgbImage, filepath: &Path) -> Result<(), DetectionError> {
    image.save(filepath)?;
    Ok(())
}

/// Loads a TrueType or OpenType font for drawing labels.
pub fn read_font(filepath: &Path) -> Result<FontVec, DetectionError> {
    let data = std::fs::read(filepath)?;
    FontVec::try_from_vec(data).map_err(|e| {
        DetectionError::InvalidInput(format!("Cannot load font {:?}: {}", filepath, e))
    })
}

/// True when the path has an extension the image crate is expected to decode.
pub fn has_image_extension(filepath: &Path) -> bool {
    filepath
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn resize_gives_square_canvas() {
        let img = RgbaImage::from_pixel(30, 10, Rgba([255, 0, 0, 255]));
        let resized = resize_to_model_input(&img, 16);
        assert_eq!(resized.dimensions(), (16, 16));
        assert_eq!(resized.get_pixel(8, 8), &Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn round_trip_through_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pool.png");
        let mut rgb = RgbImage::new(3, 2);
        rgb.put_pixel(1, 1, image::Rgb([0, 0, 255]));
        save_rgb_image(&rgb, &path).unwrap();

        let read_back = read_image_as_rgba8(&path).unwrap();
        assert_eq!(read_back.dimensions(), (3, 2));
        assert_eq!(read_back.get_pixel(1, 1), &Rgba([0, 0, 255, 255]));
        assert_eq!(read_back.get_pixel(0, 0), &Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn missing_file_is_an_error() {
        let result = read_image_as_rgba8(Path::new("./does/not/exist.png"));
        assert!(result.is_err());
    }

    #[test]
    fn non_font_file_is_invalid_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not_a_font.ttf");
        std::fs::write(&path, b"pool").unwrap();
        assert!(matches!(
            read_font(&path),
            Err(DetectionError::InvalidInput(_))
        ));
        assert!(matches!(
            read_font(&dir.path().join("missing.ttf")),
            Err(DetectionError::Io(_))
        ));
    }

    #[test]
    fn image_extensions() {
        assert!(has_image_extension(Path::new("a/b/pool.JPG")));
        assert!(has_image_extension(Path::new("pool.png")));
        assert!(!has_image_extension(Path::new("classes.txt")));
        assert!(!has_image_extension(Path::new("no_extension")));
    }
}
