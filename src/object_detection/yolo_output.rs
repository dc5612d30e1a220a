use crate::annotations::bounding_box::{BoundingBox, BoundingBoxGeometry};
use crate::annotations::detection::Detection;
use crate::error::DetectionError;
use itertools::izip;
use ndarray::{ArrayView2, Axis, s};

/// Shape of a raw YOLO detection head output and the image it should be mapped back onto.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OutputLayout {
    /// Number of anchors, the length of every channel.
    pub grid_size: usize,
    pub num_classes: usize,
    /// Side length of the square model input the geometry is expressed in.
    pub model_input_size: usize,
    pub original_width: u32,
    pub original_height: u32,
}

/// Decodes the dense per-anchor output of a YOLO detection head.
///
/// The output is channel-major: `[cx, cy, w, h, class_0, .., class_{n-1}]`, each channel
/// `grid_size` long. For every anchor the highest class score wins (the lowest class index on
/// ties). Anchors scoring below `confidence` are dropped, the rest are converted to corner
/// boxes and rescaled from model input pixels to original image pixels.
///
/// Candidates come back in anchor order, not confidence order.
pub fn decode_yolo_output(
    output: &[f32],
    layout: &OutputLayout,
    class_names: &[String],
    confidence: f32,
) -> Result<Vec<Detection<BoundingBox>>, DetectionError> {
    if layout.num_classes == 0 {
        return Err(DetectionError::InvalidInput(
            "Model output must have at least one class channel.".to_string(),
        ));
    }
    if layout.model_input_size == 0 {
        return Err(DetectionError::InvalidInput(
            "Model input size must be greater than 0.".to_string(),
        ));
    }
    let channels = layout.num_classes + 4;
    let expected_len = channels * layout.grid_size;
    if output.len() != expected_len {
        return Err(DetectionError::InvalidInput(format!(
            "Model output has {} values, expected ({} classes + 4) x {} anchors = {}.",
            output.len(),
            layout.num_classes,
            layout.grid_size,
            expected_len
        )));
    }
    let output = ArrayView2::from_shape((channels, layout.grid_size), output)
        .map_err(|e| DetectionError::InvalidInput(e.to_string()))?;

    let x_scale = layout.original_width as f32 / layout.model_input_size as f32;
    let y_scale = layout.original_height as f32 / layout.model_input_size as f32;
    let class_scores = output.slice(s![4.., ..]);

    let mut detections: Vec<Detection<BoundingBox>> = Vec::new();
    for (anchor, (&cx, &cy, &w, &h)) in izip!(
        output.row(0),
        output.row(1),
        output.row(2),
        output.row(3)
    )
    .enumerate()
    {
        let (class_id, prob) = best_class(class_scores.index_axis(Axis(1), anchor).iter());
        if prob < confidence {
            continue;
        }
        let label = match class_names.get(class_id) {
            Some(v) => v.clone(),
            None => class_id.to_string(),
        };
        let mut bbox = BoundingBox::from_center(cx, cy, w, h, label);
        scale_box(&mut bbox, x_scale, y_scale);
        detections.push(Detection {
            annotation: bbox,
            confidence: prob,
        });
    }
    Ok(detections)
}

/// Left-to-right scan with a strict comparison, so the first maximum is kept.
///
/// The scan is seeded with class 0 at a score of 0.0: a NaN score never wins, and an anchor
/// whose scores are all negative or NaN comes back as class 0 with a score of 0.0.
fn best_class<'a>(scores: impl Iterator<Item = &'a f32>) -> (usize, f32) {
    scores
        .copied()
        .enumerate()
        .fold((0, 0.0), |accum, item| if item.1 > accum.1 { item } else { accum })
}

fn scale_box(bbox: &mut BoundingBox, x_scale: f32, y_scale: f32) {
    *bbox.left_mut() *= x_scale;
    *bbox.right_mut() *= x_scale;
    *bbox.top_mut() *= y_scale;
    *bbox.bottom_mut() *= y_scale;
}
