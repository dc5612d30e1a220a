use crate::annotations::bounding_box::BoundingBoxGeometry;
use crate::annotations::detection::Detection;
use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;

pub const BOX_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
pub const LABEL_FONT_SIZE: f32 = 20.0;
/// Gap between the bottom of a label and the top of its box.
const LABEL_GAP: i32 = 5;

/// `"<category> <confidence>"`, with the confidence to two decimals.
pub fn label_text<T: BoundingBoxGeometry>(detection: &Detection<T>) -> String {
    format!(
        "{} {:.2}",
        detection.annotation.category(),
        detection.confidence
    )
}

/// Strokes a rectangle for every detection onto the image, and writes its label above it when
/// a font is given.
///
/// Corners are normalized and clipped to the image first, and boxes that end up empty are
/// skipped. Thicker strokes grow inwards. Labels that would leave the top of the image are
/// pushed down to row 0.
pub fn draw_detections<T: BoundingBoxGeometry>(
    image: &mut RgbImage,
    detections: &[Detection<T>],
    thickness: u32,
    font: Option<&FontVec>,
) {
    let (width, height) = image.dimensions();
    for detection in detections {
        let Some((left, top, right, bottom)) = clip_to_image(&detection.annotation, width, height)
        else {
            continue;
        };
        for inset in 0..thickness {
            let (l, t) = (left + inset, top + inset);
            if l + inset > right || t + inset > bottom {
                break;
            }
            let w = right - l - inset + 1;
            let h = bottom - t - inset + 1;
            draw_hollow_rect_mut(image, Rect::at(l as i32, t as i32).of_size(w, h), BOX_COLOR);
        }
        if let Some(font) = font {
            let (x, y) = label_origin(left, top);
            draw_text_mut(
                image,
                BOX_COLOR,
                x,
                y,
                PxScale::from(LABEL_FONT_SIZE),
                font,
                &label_text(detection),
            );
        }
    }
}

/// Top-left corner of the label for a box whose clipped top-left corner is `(left, top)`.
fn label_origin(left: u32, top: u32) -> (i32, i32) {
    let y = top as i32 - LABEL_FONT_SIZE as i32 - LABEL_GAP;
    (left as i32, y.max(0))
}

/// Pixel-inclusive corners of a box inside a `width` x `height` image, if any part is visible.
fn clip_to_image<T: BoundingBoxGeometry>(
    annotation: &T,
    width: u32,
    height: u32,
) -> Option<(u32, u32, u32, u32)> {
    if width == 0 || height == 0 {
        return None;
    }
    let (x1, y1, x2, y2) = annotation.as_xyxy();
    if [x1, y1, x2, y2].iter().any(|v| !v.is_finite()) {
        return None;
    }
    let (left, right) = (x1.min(x2), x1.max(x2));
    let (top, bottom) = (y1.min(y2), y1.max(y2));
    let max_x = (width - 1) as f32;
    let max_y = (height - 1) as f32;
    if right < 0.0 || bottom < 0.0 || left > max_x || top > max_y {
        return None;
    }
    Some((
        left.max(0.0).round() as u32,
        top.max(0.0).round() as u32,
        right.min(max_x).round() as u32,
        bottom.min(max_y).round() as u32,
    ))
}
