use crate::annotations::bounding_box::BoundingBoxGeometry;
use crate::annotations::detection::Detection;
use crate::error::DetectionError;
use ndarray::ArrayView4;

/// The one capability the detector needs from an inference backend: given a normalized
/// `[1, 3, S, S]` tensor, return the model's output as a flat buffer.
///
/// Backends are free to fail; failures are passed back to the caller as they are.
pub trait InferenceEngine {
    fn run(&mut self, input_array: ArrayView4<f32>) -> Result<Vec<f32>, DetectionError>;
}

/// Defines a trait that all object detection models must follow.
pub trait ObjectDetectionModel<T: BoundingBoxGeometry> {
    /// run_inference takes a view into a model-sized input tensor along with the size of the
    /// image it was made from, so detections come back in original-image pixels.
    fn run_inference(
        &mut self,
        input_array: ArrayView4<f32>,
        original_width: u32,
        original_height: u32,
    ) -> Result<Vec<Detection<T>>, DetectionError>;
}
