use serde::Serialize;
use std::fmt;

/// A struct representing a bounding box.
///
/// A bounding box is the rectangle a detection model draws around an object, paired with the
/// category of that object. Coordinates are in pixels of the original image, with the left side
/// of the image at x=0 and the top of the image at y=0.
///
/// Decoded boxes are not guaranteed to have left <= right or top <= bottom, so the corners are
/// stored exactly as decoded and all of the area math tolerates inverted boxes.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BoundingBox {
    left: f32,
    top: f32,
    right: f32,
    bottom: f32,
    category: String,
}

impl BoundingBox {
    pub fn new(left: f32, top: f32, right: f32, bottom: f32, category: String) -> Self {
        BoundingBox {
            left,
            top,
            right,
            bottom,
            category,
        }
    }

    /// Builds a box from a center point and a size.
    pub fn from_center(
        center_x: f32,
        center_y: f32,
        width: f32,
        height: f32,
        category: String,
    ) -> Self {
        BoundingBox::new(
            center_x - width / 2.0,
            center_y - height / 2.0,
            center_x + width / 2.0,
            center_y + height / 2.0,
            category,
        )
    }
}

/// Geometry shared by every annotation that has a rectangle in it.
pub trait BoundingBoxGeometry {
    fn left(&self) -> f32;
    fn top(&self) -> f32;
    fn right(&self) -> f32;
    fn bottom(&self) -> f32;
    fn left_mut(&mut self) -> &mut f32;
    fn top_mut(&mut self) -> &mut f32;
    fn right_mut(&mut self) -> &mut f32;
    fn bottom_mut(&mut self) -> &mut f32;
    fn category(&self) -> &str;

    /// Raw width times height. Negative when exactly one axis is inverted.
    fn area(&self) -> f32 {
        (self.right() - self.left()) * (self.bottom() - self.top())
    }

    fn center(&self) -> (f32, f32) {
        (
            (self.left() + self.right()) / 2.0,
            (self.top() + self.bottom()) / 2.0,
        )
    }

    fn as_xyxy(&self) -> (f32, f32, f32, f32) {
        (self.left(), self.top(), self.right(), self.bottom())
    }

    /// Area of the overlap rectangle. Each box's extents are put in order first, so an
    /// inverted box overlaps the same region as its upright twin. The overlap width and height
    /// are clamped to zero separately, so boxes that do not touch have no intersection.
    fn intersection_area<U: BoundingBoxGeometry + ?Sized>(&self, other: &U) -> f32 {
        let (self_left, self_right) = ordered(self.left(), self.right());
        let (self_top, self_bottom) = ordered(self.top(), self.bottom());
        let (other_left, other_right) = ordered(other.left(), other.right());
        let (other_top, other_bottom) = ordered(other.top(), other.bottom());
        let left = self_left.max(other_left);
        let top = self_top.max(other_top);
        let right = self_right.min(other_right);
        let bottom = self_bottom.min(other_bottom);
        (right - left).max(0.0) * (bottom - top).max(0.0)
    }

    /// Intersection over union. A non-positive union gives 0.0 rather than NaN or a
    /// sign-flipped ratio.
    fn intersection_over_union<U: BoundingBoxGeometry + ?Sized>(&self, other: &U) -> f32 {
        let intersection = self.intersection_area(other);
        let union = self.area() + other.area() - intersection;
        if union > 0.0 {
            intersection / union
        } else {
            0.0
        }
    }
}

fn ordered(a: f32, b: f32) -> (f32, f32) {
    if a <= b { (a, b) } else { (b, a) }
}

impl BoundingBoxGeometry for BoundingBox {
    fn left(&self) -> f32 {
        self.left
    }

    fn top(&self) -> f32 {
        self.top
    }

    fn right(&self) -> f32 {
        self.right
    }

    fn bottom(&self) -> f32 {
        self.bottom
    }

    fn left_mut(&mut self) -> &mut f32 {
        &mut self.left
    }

    fn top_mut(&mut self) -> &mut f32 {
        &mut self.top
    }

    fn right_mut(&mut self) -> &mut f32 {
        &mut self.right
    }

    fn bottom_mut(&mut self) -> &mut f32 {
        &mut self.bottom
    }

    fn category(&self) -> &str {
        &self.category
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BoundingBox {{ left: {}, top: {}, right: {}, bottom: {}, category: {} }}",
            self.left, self.top, self.right, self.bottom, self.category
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn bbox(left: f32, top: f32, right: f32, bottom: f32) -> BoundingBox {
        BoundingBox::new(left, top, right, bottom, "pool".to_string())
    }

    fn random_box(rng: &mut StdRng) -> BoundingBox {
        let x = rng.random_range(0.0..100.0_f32);
        let y = rng.random_range(0.0..100.0_f32);
        let w = rng.random_range(-10.0..50.0_f32);
        let h = rng.random_range(-10.0..50.0_f32);
        bbox(x, y, x + w, y + h)
    }

    #[test]
    fn from_center_converts_to_corners() {
        let b = BoundingBox::from_center(50.0, 40.0, 20.0, 10.0, "pool".to_string());
        assert_eq!(b.as_xyxy(), (40.0, 35.0, 60.0, 45.0));
        assert_eq!(b.center(), (50.0, 40.0));
    }

    #[test]
    fn inverted_boxes_are_accepted() {
        let b = bbox(10.0, 10.0, 5.0, 20.0);
        assert_relative_eq!(b.area(), -50.0);
    }

    #[test]
    fn iou_of_identical_boxes_is_one() {
        let b = bbox(1.0, 2.0, 11.0, 7.0);
        assert_relative_eq!(b.intersection_over_union(&b.clone()), 1.0);
    }

    #[test]
    fn iou_of_disjoint_boxes_is_zero() {
        let a = bbox(0.0, 0.0, 1.0, 1.0);
        let b = bbox(2.0, 2.0, 3.0, 3.0);
        assert_eq!(a.intersection_area(&b), 0.0);
        assert_eq!(a.intersection_over_union(&b), 0.0);
    }

    #[test]
    fn disjoint_on_one_axis_only_has_no_intersection() {
        // Overlaps on x, separated on y. Both overlap extents negative would multiply to a
        // positive area without clamping.
        let a = bbox(0.0, 0.0, 10.0, 10.0);
        let b = bbox(20.0, 20.0, 30.0, 30.0);
        assert_eq!(a.intersection_area(&b), 0.0);
        let c = bbox(5.0, 20.0, 15.0, 30.0);
        assert_eq!(a.intersection_area(&c), 0.0);
    }

    #[test]
    fn partial_overlap() {
        let a = bbox(0.0, 0.0, 4.0, 4.0);
        let b = bbox(2.0, 2.0, 6.0, 6.0);
        assert_relative_eq!(a.intersection_area(&b), 4.0);
        assert_relative_eq!(a.intersection_over_union(&b), 4.0 / 28.0);
    }

    #[test]
    fn iou_of_identical_inverted_boxes_is_one() {
        let b = bbox(10.0, 10.0, 0.0, 0.0);
        assert_relative_eq!(b.area(), 100.0);
        assert_relative_eq!(b.intersection_area(&b.clone()), 100.0);
        assert_relative_eq!(b.intersection_over_union(&b.clone()), 1.0);
    }

    #[test]
    fn inverted_box_overlaps_like_its_upright_twin() {
        let inverted = bbox(4.0, 4.0, 0.0, 0.0);
        let other = bbox(2.0, 2.0, 6.0, 6.0);
        assert_relative_eq!(inverted.intersection_area(&other), 4.0);
        assert_relative_eq!(inverted.intersection_over_union(&other), 4.0 / 28.0);
    }

    #[test]
    fn degenerate_boxes_give_zero_not_nan() {
        let point = bbox(3.0, 3.0, 3.0, 3.0);
        assert_eq!(point.intersection_over_union(&point.clone()), 0.0);
    }

    #[test]
    fn iou_is_symmetric() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..500 {
            let a = random_box(&mut rng);
            let b = random_box(&mut rng);
            assert_eq!(a.intersection_over_union(&b), b.intersection_over_union(&a));
        }
    }

    #[test]
    fn iou_of_well_formed_boxes_is_in_unit_range() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..500 {
            let x = rng.random_range(0.0..100.0_f32);
            let y = rng.random_range(0.0..100.0_f32);
            let a = bbox(x, y, x + rng.random_range(0.1..50.0), y + rng.random_range(0.1..50.0));
            let b = random_box(&mut rng);
            let b = bbox(
                b.left().min(b.right()),
                b.top().min(b.bottom()),
                b.left().max(b.right()),
                b.top().max(b.bottom()),
            );
            let iou = a.intersection_over_union(&b);
            assert!((0.0..=1.0 + 1e-6).contains(&iou), "iou out of range: {iou}");
        }
    }
}
