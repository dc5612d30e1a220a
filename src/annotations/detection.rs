use crate::annotations::bounding_box::BoundingBoxGeometry;
use serde::Serialize;
use std::fmt;

/// A detection is what is produced as output from an object detection model.
///
/// A detection is any annotation combined with a confidence score: the model's score for the
/// winning class at the anchor the annotation was decoded from.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Detection<T: BoundingBoxGeometry> {
    pub annotation: T,
    pub confidence: f32,
}

impl<T: BoundingBoxGeometry + fmt::Display> fmt::Display for Detection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.2})", self.annotation, self.confidence)
    }
}
