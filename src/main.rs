mod annotations;
mod config;
mod error;
mod image_utils;
mod object_detection;

use annotations::bounding_box::BoundingBox;
use annotations::detection::Detection;
use clap::Parser;
use config::DetectorConfig;
use error::DetectionError;
use image::DynamicImage;
use image_utils::drawing::draw_detections;
use ab_glyph::FontVec;
use image_utils::image_io::{
    has_image_extension, read_font, read_image_as_rgba8, resize_to_model_input, save_rgb_image,
};
use log::{error, info, warn};
use object_detection::object_detection_model::InferenceEngine;
use object_detection::object_detection_utils::read_classes_txt_file;
use object_detection::yolo_detector::YoloDetector;
use std::error::Error;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Detects objects in images with a YOLO ONNX model and prints the detections as JSON.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// ONNX model file.
    #[arg(long, value_name = "FILE")]
    model: PathBuf,

    /// Image file, or a directory that is searched recursively for images.
    #[arg(long, value_name = "PATH")]
    input: PathBuf,

    /// Class names, one per line. Overrides the class table of the config file.
    #[arg(long, value_name = "FILE")]
    classes: Option<PathBuf>,

    /// JSON detector config.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Confidence threshold (0.0 - 1.0).
    #[arg(long, value_name = "THRESHOLD")]
    confidence: Option<f32>,

    /// NMS IoU threshold (0.0 - 1.0).
    #[arg(long, value_name = "THRESHOLD")]
    iou: Option<f32>,

    /// Directory to save images with the detections drawn on.
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Stroke width of the drawn boxes, in pixels.
    #[arg(long, default_value = "3")]
    line_width: u32,

    /// TrueType/OpenType font for the box labels. Without it only the boxes are drawn.
    #[arg(long, value_name = "FILE")]
    font: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = build_config(&args)?;
    if !args.model.exists() {
        return Err(format!(
            "Model path does not exist, or cannot be read: {:?}",
            args.model
        )
        .into());
    }
    info!(
        "Loading {:?} ({} classes, {} output values, confidence {}, IoU {})",
        args.model,
        config.num_classes(),
        config.output_len(),
        config.confidence_threshold,
        config.iou_threshold
    );
    let mut detector = YoloDetector::from_onnx_file(&args.model, config)?;

    if let Some(output_dir) = &args.output_dir {
        std::fs::create_dir_all(output_dir)?;
    }
    let font = args.font.as_deref().map(read_font).transpose()?;

    let images = collect_images(&args.input)?;
    let mut failures = 0;
    for image_path in &images {
        match detect_image(&mut detector, image_path, &args, font.as_ref()) {
            Ok(detections) => {
                info!("{:?}: {} detections", image_path, detections.len());
                for detection in &detections {
                    info!("  {}", detection);
                }
                println!("{}", serde_json::to_string_pretty(&detections)?);
            }
            Err(e) => {
                error!("{:?}: {}", image_path, e);
                failures += 1;
            }
        }
    }
    if failures > 0 {
        return Err(format!("{} of {} images failed", failures, images.len()).into());
    }
    Ok(())
}

fn build_config(args: &Args) -> Result<DetectorConfig, DetectionError> {
    let mut config = match &args.config {
        Some(path) => DetectorConfig::from_json_file(path)?,
        None => DetectorConfig::default(),
    };
    if let Some(classes) = &args.classes {
        config.class_names = read_classes_txt_file(classes)?;
    }
    if let Some(confidence) = args.confidence {
        config.confidence_threshold = confidence;
    }
    if let Some(iou) = args.iou {
        config.iou_threshold = iou;
    }
    config.validate()?;
    Ok(config)
}

fn collect_images(input: &Path) -> Result<Vec<PathBuf>, DetectionError> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    if !input.is_dir() {
        return Err(DetectionError::InvalidInput(format!(
            "Input path does not exist, or cannot be read: {:?}",
            input
        )));
    }
    let mut images = Vec::new();
    for entry in WalkDir::new(input).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if entry.file_type().is_file() && has_image_extension(entry.path()) {
            images.push(entry.into_path());
        }
    }
    Ok(images)
}

/// One independent detection cycle: load, draw into the model canvas, detect, and optionally
/// save an annotated copy of the original image.
fn detect_image<E: InferenceEngine>(
    detector: &mut YoloDetector<E>,
    image_path: &Path,
    args: &Args,
    font: Option<&FontVec>,
) -> Result<Vec<Detection<BoundingBox>>, DetectionError> {
    let image = read_image_as_rgba8(image_path)?;
    let (width, height) = image.dimensions();
    let input_size = u32::try_from(detector.config().input_size)
        .map_err(|e| DetectionError::InvalidConfig(e.to_string()))?;
    let canvas = resize_to_model_input(&image, input_size);
    let detections = detector.detect_pixels(canvas.as_raw(), width, height)?;

    if let Some(output_dir) = &args.output_dir {
        let mut annotated = DynamicImage::ImageRgba8(image).into_rgb8();
        draw_detections(&mut annotated, &detections, args.line_width, font);
        let file_name = image_path
            .file_stem()
            .map(|stem| format!("{}_detections.png", stem.to_string_lossy()))
            .unwrap_or_else(|| "detections.png".to_string());
        save_rgb_image(&annotated, &output_dir.join(file_name))?;
    }
    Ok(detections)
}
