use crate::annotations::bounding_box::BoundingBoxGeometry;
use crate::annotations::detection::Detection;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Reads a file with the class names into a vector so that the class ids which come out of
/// the model can be given meaning. Blank lines are skipped.
pub fn read_classes_txt_file(filepath: &Path) -> io::Result<Vec<String>> {
    let mut class_names = Vec::new();
    for line in BufReader::new(File::open(filepath)?).lines() {
        let line = line?;
        let name = line.trim();
        if !name.is_empty() {
            class_names.push(name.to_string());
        }
    }
    Ok(class_names)
}

/// Non maximum suppression is a way of removing duplicate detections.
///
/// Greedy and class-agnostic: detections are visited from most to least confident, each
/// surviving detection is kept, and every later detection whose IoU with it is at least
/// `iou_threshold` is dropped. No two survivors overlap by `iou_threshold` or more, and the
/// output is ordered by descending confidence.
pub fn non_maximum_suppression<T: BoundingBoxGeometry>(
    detections: Vec<Detection<T>>,
    iou_threshold: f32,
) -> Vec<Detection<T>> {
    greedy_suppression(detections, iou_threshold, |_, _| true)
}

/// Same as [`non_maximum_suppression`], except that a detection only suppresses detections of
/// its own category.
pub fn non_maximum_suppression_per_category<T: BoundingBoxGeometry>(
    detections: Vec<Detection<T>>,
    iou_threshold: f32,
) -> Vec<Detection<T>> {
    greedy_suppression(detections, iou_threshold, |a: &T, b: &T| {
        a.category() == b.category()
    })
}

fn greedy_suppression<T: BoundingBoxGeometry>(
    mut detections: Vec<Detection<T>>,
    iou_threshold: f32,
    competes: impl Fn(&T, &T) -> bool,
) -> Vec<Detection<T>> {
    // sort_by is stable, so equal confidences keep their incoming order.
    detections.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    let mut detections_to_remove: Vec<bool> = vec![false; detections.len()];
    for (current_index, current_det) in detections.iter().enumerate() {
        if detections_to_remove[current_index] {
            continue;
        }
        for (other_index, other_det) in detections[current_index + 1..].iter().enumerate() {
            let other_index = current_index + other_index + 1;
            if detections_to_remove[other_index] {
                continue;
            }
            if !competes(&current_det.annotation, &other_det.annotation) {
                continue;
            }
            let iou = current_det
                .annotation
                .intersection_over_union(&other_det.annotation);
            if iou >= iou_threshold {
                detections_to_remove[other_index] = true;
            }
        }
    }
    let mut drop_iter = detections_to_remove.into_iter();
    detections.retain(|_| !drop_iter.next().unwrap_or(false));
    detections
}
