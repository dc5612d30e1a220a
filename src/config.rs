use crate::error::DetectionError;
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub const DEFAULT_INPUT_SIZE: usize = 640;
pub const DEFAULT_GRID_SIZE: usize = 8400;
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.5;
pub const DEFAULT_IOU_THRESHOLD: f32 = 0.7;

/// Settings for one detector. Every field has a default, so a JSON config file only needs the
/// fields it changes.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct DetectorConfig {
    /// Side length of the square model input.
    pub input_size: usize,
    /// Number of anchors the model predicts a box for.
    pub grid_size: usize,
    /// Number of class score channels in the output. Falls back to the class table length.
    pub num_classes: Option<usize>,
    pub class_names: Vec<String>,
    pub confidence_threshold: f32,
    pub iou_threshold: f32,
    /// Only suppress overlapping boxes of the same category.
    pub per_category_nms: bool,
    pub input_name: String,
    pub output_name: String,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        DetectorConfig {
            input_size: DEFAULT_INPUT_SIZE,
            grid_size: DEFAULT_GRID_SIZE,
            num_classes: None,
            class_names: vec!["pool".to_string()],
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            iou_threshold: DEFAULT_IOU_THRESHOLD,
            per_category_nms: false,
            input_name: "images".to_string(),
            output_name: "output0".to_string(),
        }
    }
}

impl DetectorConfig {
    pub fn from_json_file(filepath: &Path) -> Result<Self, DetectionError> {
        let reader = BufReader::new(File::open(filepath)?);
        let config: DetectorConfig = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes.unwrap_or(self.class_names.len())
    }

    /// Expected length of the flat model output.
    pub fn output_len(&self) -> usize {
        (self.num_classes() + 4) * self.grid_size
    }

    pub fn validate(&self) -> Result<(), DetectionError> {
        for (name, value) in [("input_size", self.input_size), ("grid_size", self.grid_size)] {
            if value == 0 {
                return Err(DetectionError::InvalidConfig(format!(
                    "{} must be greater than 0.",
                    name
                )));
            }
        }
        if self.num_classes() == 0 {
            return Err(DetectionError::InvalidConfig(
                "At least one class is required.".to_string(),
            ));
        }
        for (name, value) in [
            ("confidence_threshold", self.confidence_threshold),
            ("iou_threshold", self.iou_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(DetectionError::InvalidConfig(format!(
                    "{} must be within [0, 1], got {}.",
                    name, value
                )));
            }
        }
        Ok(())
    }
}
