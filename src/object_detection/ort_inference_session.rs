use crate::error::DetectionError;
use crate::object_detection::object_detection_model::InferenceEngine;
use log::debug;
use ndarray::ArrayView4;
use ort::inputs;
use ort::session::Session;
use ort::value::TensorRef;
use std::path::Path;

/// An onnxruntime inference session.
///
/// The detector only ever talks to the model through one named input and one named output,
/// so those names are all this wrapper needs beyond the session itself.
pub struct OrtInferenceSession {
    session: Session,
    input_name: String,
    output_name: String,
}

impl OrtInferenceSession {
    pub fn new(model_path: &Path, input_name: &str, output_name: &str) -> ort::Result<Self> {
        let session = Session::builder()?.commit_from_file(model_path)?;
        Ok(Self {
            session,
            input_name: input_name.to_string(),
            output_name: output_name.to_string(),
        })
    }
}

impl InferenceEngine for OrtInferenceSession {
    fn run(&mut self, input_array: ArrayView4<f32>) -> Result<Vec<f32>, DetectionError> {
        let outputs = self.session.run(inputs![
            self.input_name.as_str() => TensorRef::from_array_view(input_array)?
        ])?;
        let Some(output) = outputs.get(self.output_name.as_str()) else {
            return Err(DetectionError::InferenceFailure(format!(
                "Model produced no output named {:?}.",
                self.output_name
            )));
        };
        let output = output.try_extract_array::<f32>()?;
        debug!("Model output shape: {:?}", output.shape());
        Ok(output.iter().copied().collect())
    }
}
