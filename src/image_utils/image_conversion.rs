use crate::error::DetectionError;
use ndarray::Array4;

/// Converts an interleaved RGBA pixel buffer into a normalized channel-planar tensor.
///
/// `dims` is `[batch, channels, height, width]` and must be `[1, 3, height, width]`. The pixel
/// buffer is read in raster order, the alpha byte of each pixel is dropped, and every value is
/// divided by 255 so the tensor holds all red values, then all green, then all blue, each in
/// [0, 1].
pub fn convert_rgba_pixels_to_array4(
    pixels: &[u8],
    dims: [usize; 4],
) -> Result<Array4<f32>, DetectionError> {
    let [batch, channels, height, width] = dims;
    if batch != 1 || channels != 3 {
        return Err(DetectionError::InvalidInput(format!(
            "Expected tensor dimensions [1, 3, height, width], got {:?}.",
            dims
        )));
    }
    if pixels.len() % 4 != 0 {
        return Err(DetectionError::InvalidInput(format!(
            "Pixel buffer length ({}) is not a multiple of 4.",
            pixels.len()
        )));
    }
    if pixels.len() / 4 != height * width {
        return Err(DetectionError::InvalidInput(format!(
            "Pixel buffer holds {} pixels but the tensor needs {}x{} = {}.",
            pixels.len() / 4,
            height,
            width,
            height * width
        )));
    }
    Ok(Array4::from_shape_fn(
        (batch, channels, height, width),
        |(_, channel, row, col)| f32::from(pixels[(row * width + col) * 4 + channel]) / 255.,
    ))
}
