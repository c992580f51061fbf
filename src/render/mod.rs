//! Annotation of detection results
//!
//! Drawing never touches the input frame: each call copies it into an
//! `image` buffer, draws there and hands back a new [`Frame`]. Luma input is
//! promoted to RGB so the colored marks stay visible; RGBA stays RGBA and
//! marks are drawn opaque.

/// 5x7 bitmap font for the watermark
pub mod font;

use image::{GenericImage, Rgb, RgbImage, Rgba, RgbaImage};
use imageproc::drawing::{draw_hollow_circle_mut, draw_line_segment_mut};

use crate::models::{Frame, Point};

/// Outline color
pub const MARK_COLOR: [u8; 3] = [0, 255, 0];
/// Watermark color
pub const TEXT_COLOR: [u8; 3] = [255, 0, 0];
/// Baseline-left corner of the watermark
pub const WATERMARK_ORIGIN: (i32, i32) = (50, 50);
/// Font pixel size of the watermark
pub const WATERMARK_SCALE: u32 = 4;

enum Canvas {
    Rgb(RgbImage),
    Rgba(RgbaImage),
}

impl Canvas {
    fn from_frame(frame: &Frame) -> Option<Self> {
        match frame.channels() {
            4 => frame.to_rgba_image().map(Canvas::Rgba),
            _ => frame.to_rgb_image().map(Canvas::Rgb),
        }
    }

    fn into_frame(self) -> Frame {
        match self {
            Canvas::Rgb(img) => Frame::new(img.width() as usize, img.height() as usize, 3, img.into_raw()),
            Canvas::Rgba(img) => Frame::new(img.width() as usize, img.height() as usize, 4, img.into_raw()),
        }
    }

    /// Paint marks with the layout's opaque colors
    fn paint(&mut self, marks: &[Mark<'_>]) {
        match self {
            Canvas::Rgb(img) => {
                for m in marks {
                    apply(img, m, Rgb(MARK_COLOR), Rgb(TEXT_COLOR));
                }
            }
            Canvas::Rgba(img) => {
                for m in marks {
                    apply(img, m, rgba(MARK_COLOR), rgba(TEXT_COLOR));
                }
            }
        }
    }
}

fn rgba(c: [u8; 3]) -> Rgba<u8> {
    Rgba([c[0], c[1], c[2], 255])
}

/// One primitive drawing operation
#[derive(Debug, Clone)]
enum Mark<'a> {
    Circle { center: Point, radius: i32 },
    Cross { center: Point, arm: i32 },
    Polyline { points: &'a [Point] },
    Text { text: &'a str },
}

/// Nearest and farthest canvas distance from `p`
///
/// `None` when `p` lies more than one canvas span (width + height) outside
/// the canvas; such marks are not drawn.
fn reach(width: u32, height: u32, p: Point) -> Option<(f64, f64)> {
    let (w, h) = (width as f64, height as f64);
    let span = w + h;
    let (x, y) = (p.x as f64, p.y as f64);
    if x < -span || y < -span || x > w + span || y > h + span {
        return None;
    }
    let (right, bottom) = (w - 1.0, h - 1.0);
    let near = (-x).max(x - right).max(0.0).hypot((-y).max(y - bottom).max(0.0));
    let far = x.abs().max((x - right).abs()).hypot(y.abs().max((y - bottom).abs()));
    Some((near, far))
}

fn apply<I>(img: &mut I, mark: &Mark<'_>, line: I::Pixel, text: I::Pixel)
where
    I: GenericImage,
    I::Pixel: 'static,
{
    let (w, h) = img.dimensions();
    match mark {
        Mark::Circle { center, radius } => {
            let Some((near, far)) = reach(w, h, *center) else {
                return;
            };
            // Circles that miss the canvas entirely are skipped
            let r = *radius as f64;
            if r + 1.0 < near || r > far + 1.0 {
                return;
            }
            // Thickness 2
            for r in [*radius, *radius + 1] {
                draw_hollow_circle_mut(img, (center.x, center.y), r, line);
            }
        }
        Mark::Cross { center, arm } => {
            let Some((_, far)) = reach(w, h, *center) else {
                return;
            };
            let (cx, cy) = (center.x as f32, center.y as f32);
            let a = (*arm as f64).min(far + 1.0) as f32;
            for o in [0.0, 1.0] {
                draw_line_segment_mut(img, (cx - a, cy + o), (cx + a, cy + o), line);
                draw_line_segment_mut(img, (cx + o, cy - a), (cx + o, cy + a), line);
            }
        }
        Mark::Polyline { points } => {
            for (i, p) in points.iter().enumerate() {
                let q = points[(i + 1) % points.len()];
                if reach(w, h, *p).is_none() || reach(w, h, q).is_none() {
                    continue;
                }
                for o in [0.0, 1.0] {
                    draw_line_segment_mut(
                        img,
                        (p.x as f32 + o, p.y as f32),
                        (q.x as f32 + o, q.y as f32),
                        line,
                    );
                }
            }
        }
        Mark::Text { text: label } => {
            let (x, y) = WATERMARK_ORIGIN;
            font::draw_text_mut(img, label, x, y, WATERMARK_SCALE, text);
        }
    }
}

/// Draw the packed circle `[center, (radius, 0)]`, its crosshair and the watermark
///
/// Returns an unchanged copy when the frame is invalid or fewer than two
/// points are given. Extra points after the first two are ignored.
pub fn annotate_circle(frame: &Frame, edges: &[Point], watermark: &str) -> Frame {
    if edges.len() < 2 {
        return frame.clone();
    }
    let Some(mut canvas) = Canvas::from_frame(frame) else {
        return frame.clone();
    };

    let center = edges[0];
    let radius = edges[1].x;
    let mut marks = Vec::with_capacity(3);
    if radius > 0 {
        marks.push(Mark::Circle { center, radius });
    }
    if radius / 3 > 0 {
        marks.push(Mark::Cross {
            center,
            arm: radius / 3,
        });
    }
    marks.push(Mark::Text { text: watermark });
    canvas.paint(&marks);
    canvas.into_frame()
}

/// Draw a dense boundary as a closed polyline, a crosshair at its centroid and the watermark
pub fn annotate_trace(frame: &Frame, edges: &[Point], watermark: &str) -> Frame {
    if edges.len() < 2 {
        return frame.clone();
    }
    let Some(mut canvas) = Canvas::from_frame(frame) else {
        return frame.clone();
    };

    let n = edges.len() as f64;
    let (sx, sy) = edges
        .iter()
        .fold((0.0f64, 0.0f64), |(sx, sy), p| (sx + p.x as f64, sy + p.y as f64));
    let (mx, my) = (sx / n, sy / n);
    let center = Point::new(mx.round() as i32, my.round() as i32);
    let mean_r = edges
        .iter()
        .map(|p| ((p.x as f64 - mx).powi(2) + (p.y as f64 - my).powi(2)).sqrt())
        .sum::<f64>()
        / n;
    let arm = (mean_r / 3.0).round() as i32;

    let mut marks = vec![Mark::Polyline { points: edges }];
    if arm > 0 {
        marks.push(Mark::Cross { center, arm });
    }
    marks.push(Mark::Text { text: watermark });
    canvas.paint(&marks);
    canvas.into_frame()
}

#[cfg(test)]
mod tests {
    use super::*;

    const GREEN: [u8; 3] = MARK_COLOR;
    const RED: [u8; 3] = TEXT_COLOR;

    fn px(frame: &Frame, x: usize, y: usize) -> Vec<u8> {
        frame.pixel(x, y).unwrap().to_vec()
    }

    #[test]
    fn test_gray_is_promoted_and_circle_drawn() {
        let frame = Frame::filled(200, 200, 1, 90);
        let edges = [Point::new(120, 120), Point::new(30, 0)];
        let out = annotate_circle(&frame, &edges, "EYE_TRACKING_OK");

        assert_eq!(out.channels(), 3);
        assert_eq!((out.width(), out.height()), (200, 200));
        assert_eq!(px(&out, 150, 120), GREEN.to_vec());
        assert_eq!(px(&out, 120, 90), GREEN.to_vec());
        // Crosshair arm of radius/3
        assert_eq!(px(&out, 128, 120), GREEN.to_vec());
        assert_eq!(px(&out, 120, 112), GREEN.to_vec());
        assert_eq!(px(&out, 140, 120), vec![90, 90, 90]);
        // Top-left of 'E', 4x scale, baseline at y=50
        assert_eq!(px(&out, 50, 22), RED.to_vec());
        assert_eq!(px(&out, 50, 50), vec![90, 90, 90]);
        // Input untouched
        assert_eq!(frame.channels(), 1);
    }

    #[test]
    fn test_rgba_keeps_alpha_channel_with_opaque_marks() {
        let frame = Frame::filled(100, 100, 4, 0);
        let out = annotate_circle(&frame, &[Point::new(50, 70), Point::new(20, 0)], "OK");
        assert_eq!(out.channels(), 4);
        assert_eq!(px(&out, 70, 70), vec![0, 255, 0, 255]);
        assert_eq!(px(&out, 5, 5), vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_short_edges_and_invalid_frames_pass_through() {
        let frame = Frame::filled(60, 40, 3, 17);
        assert_eq!(annotate_circle(&frame, &[], "X"), frame);
        assert_eq!(annotate_circle(&frame, &[Point::new(1, 1)], "X"), frame);
        assert_eq!(annotate_trace(&frame, &[Point::new(1, 1)], "X"), frame);

        let bad = Frame::new(4, 4, 3, vec![1, 2, 3]);
        assert_eq!(annotate_circle(&bad, &[Point::new(1, 1), Point::new(2, 0)], "X"), bad);
    }

    #[test]
    fn test_marks_clip_at_edges() {
        let frame = Frame::filled(40, 30, 3, 0);
        let out = annotate_circle(&frame, &[Point::new(-10, 35), Point::new(100, 0)], "CLIPPED");
        assert_eq!(out.as_bytes().len(), frame.as_bytes().len());
    }

    #[test]
    fn test_extreme_packed_values_do_not_overflow() {
        let frame = Frame::filled(20, 20, 3, 0);
        let label_only = annotate_circle(&frame, &[Point::new(5, 5), Point::new(0, 0)], "X");
        let far_away = [
            [Point::new(i32::MAX, i32::MIN), Point::new(30, 0)],
            [Point::new(i32::MIN, 5), Point::new(i32::MAX, 0)],
        ];
        for edges in &far_away {
            assert_eq!(annotate_circle(&frame, edges, "X"), label_only, "{edges:?}");
        }

        // The circle cannot touch the canvas; the crosshair arm is cut to it
        let out = annotate_circle(&frame, &[Point::new(5, 5), Point::new(i32::MAX, 0)], "X");
        assert_eq!((out.width(), out.height()), (20, 20));
        assert_eq!(px(&out, 19, 5), GREEN.to_vec());
        assert_eq!(px(&out, 15, 15), vec![0, 0, 0]);
    }

    #[test]
    fn test_circle_crossing_from_outside_is_drawn() {
        let frame = Frame::filled(40, 40, 3, 0);
        let out = annotate_circle(&frame, &[Point::new(-20, 20), Point::new(30, 0)], "");
        assert_eq!(px(&out, 10, 20), GREEN.to_vec());
    }

    #[test]
    fn test_trace_skips_far_away_points() {
        let frame = Frame::filled(50, 50, 3, 0);
        let points = [
            Point::new(10, 10),
            Point::new(30, 10),
            Point::new(i32::MAX, i32::MAX),
        ];
        let out = annotate_trace(&frame, &points, "");
        assert_eq!(out.as_bytes().len(), frame.as_bytes().len());
        assert_eq!(px(&out, 20, 10), GREEN.to_vec());
    }

    #[test]
    fn test_trace_polyline_is_closed() {
        let frame = Frame::filled(100, 100, 3, 0);
        let square = [
            Point::new(60, 60),
            Point::new(80, 60),
            Point::new(80, 80),
            Point::new(60, 80),
        ];
        let out = annotate_trace(&frame, &square, "");
        assert_eq!(px(&out, 70, 60), GREEN.to_vec());
        // Closing segment from the last point back to the first
        assert_eq!(px(&out, 60, 70), GREEN.to_vec());
        assert_eq!(px(&out, 70, 70), GREEN.to_vec());
        assert_eq!(px(&out, 65, 65), vec![0, 0, 0]);
    }
}
