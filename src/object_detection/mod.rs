pub mod object_detection_model;
pub mod object_detection_utils;
pub mod ort_inference_session;
pub mod yolo_detector;
pub mod yolo_output;
