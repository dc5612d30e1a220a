use crate::annotations::bounding_box::BoundingBox;
use crate::annotations::detection::Detection;
use crate::config::DetectorConfig;
use crate::error::DetectionError;
use crate::image_utils::image_conversion::convert_rgba_pixels_to_array4;
use crate::object_detection::object_detection_model::{InferenceEngine, ObjectDetectionModel};
use crate::object_detection::object_detection_utils::{
    non_maximum_suppression, non_maximum_suppression_per_category,
};
use crate::object_detection::ort_inference_session::OrtInferenceSession;
use crate::object_detection::yolo_output::{OutputLayout, decode_yolo_output};
use log::debug;
use ndarray::ArrayView4;
use std::path::Path;

/// A YOLO detector: preprocessing, an inference engine, output decoding and NMS, run strictly
/// in that order.
///
/// The detector holds no per-image state. Each call works on its own buffers and either
/// returns the full list of detections or an error, never a partial list.
pub struct YoloDetector<E: InferenceEngine> {
    engine: E,
    config: DetectorConfig,
}

impl YoloDetector<OrtInferenceSession> {
    /// Loads an ONNX model from disk.
    pub fn from_onnx_file(
        model_path: &Path,
        config: DetectorConfig,
    ) -> Result<Self, DetectionError> {
        config.validate()?;
        let engine =
            OrtInferenceSession::new(model_path, &config.input_name, &config.output_name)?;
        Ok(YoloDetector { engine, config })
    }
}

impl<E: InferenceEngine> YoloDetector<E> {
    pub fn new(engine: E, config: DetectorConfig) -> Result<Self, DetectionError> {
        config.validate()?;
        Ok(YoloDetector { engine, config })
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Runs the whole pipeline on a model-sized RGBA pixel buffer.
    ///
    /// `pixels` must hold `input_size * input_size` RGBA pixels. Detections are scaled to
    /// `original_width` x `original_height`, the size of the image the canvas was drawn from.
    pub fn detect_pixels(
        &mut self,
        pixels: &[u8],
        original_width: u32,
        original_height: u32,
    ) -> Result<Vec<Detection<BoundingBox>>, DetectionError> {
        let size = self.config.input_size;
        let input_array = convert_rgba_pixels_to_array4(pixels, [1, 3, size, size])?;
        self.run_inference(input_array.view(), original_width, original_height)
    }

    /// Decodes and deduplicates a raw model output without running the engine.
    pub fn postprocess(
        &self,
        output: &[f32],
        original_width: u32,
        original_height: u32,
    ) -> Result<Vec<Detection<BoundingBox>>, DetectionError> {
        let layout = OutputLayout {
            grid_size: self.config.grid_size,
            num_classes: self.config.num_classes(),
            model_input_size: self.config.input_size,
            original_width,
            original_height,
        };
        let candidates = decode_yolo_output(
            output,
            &layout,
            &self.config.class_names,
            self.config.confidence_threshold,
        )?;
        let candidate_count = candidates.len();
        let detections = if self.config.per_category_nms {
            non_maximum_suppression_per_category(candidates, self.config.iou_threshold)
        } else {
            non_maximum_suppression(candidates, self.config.iou_threshold)
        };
        debug!(
            "{} candidates above confidence {}, {} left after NMS at IoU {}",
            candidate_count,
            self.config.confidence_threshold,
            detections.len(),
            self.config.iou_threshold
        );
        Ok(detections)
    }
}

impl<E: InferenceEngine> ObjectDetectionModel<BoundingBox> for YoloDetector<E> {
    fn run_inference(
        &mut self,
        input_array: ArrayView4<f32>,
        original_width: u32,
        original_height: u32,
    ) -> Result<Vec<Detection<BoundingBox>>, DetectionError> {
        let size = self.config.input_size;
        if input_array.shape() != [1, 3, size, size] {
            return Err(DetectionError::InvalidInput(format!(
                "Expected an input tensor of shape [1, 3, {}, {}], got {:?}.",
                size,
                size,
                input_array.shape()
            )));
        }
        let output = self.engine.run(input_array)?;
        self.postprocess(&output, original_width, original_height)
    }
}
