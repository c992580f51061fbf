use crate::detector::connected_components::find_components;
use crate::models::{BinaryMask, Circle, Point, PointF};
use crate::utils::geometry::{circularity, closed_arc_length, min_enclosing_circle, polygon_area};

/// Clockwise 8-neighborhood (y grows downward), starting west
const DIRS: [(i32, i32); 8] = [
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
];

fn dir_index(dx: i32, dy: i32) -> usize {
    DIRS.iter()
        .position(|&d| d == (dx, dy))
        .unwrap_or(0)
}

/// Ordered outer boundary of one foreground component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contour {
    /// Boundary pixels in clockwise tracing order
    pub points: Vec<Point>,
}

impl Contour {
    /// Area enclosed by the boundary polygon
    pub fn area(&self) -> f64 {
        polygon_area(&self.points)
    }

    /// Closed boundary length
    pub fn perimeter(&self) -> f64 {
        closed_arc_length(&self.points)
    }

    /// `4*pi*area / perimeter^2`
    pub fn circularity(&self) -> f64 {
        circularity(self.area(), self.perimeter())
    }

    /// Smallest circle containing the boundary
    pub fn enclosing_circle(&self) -> Circle {
        min_enclosing_circle(&self.points)
    }

    /// Mean of the boundary pixels
    pub fn centroid(&self) -> Option<PointF> {
        if self.points.is_empty() {
            return None;
        }
        let n = self.points.len() as f64;
        let (sx, sy) = self
            .points
            .iter()
            .fold((0.0f64, 0.0f64), |(sx, sy), p| (sx + p.x as f64, sy + p.y as f64));
        Some(PointF::new((sx / n) as f32, (sy / n) as f32))
    }
}

/// One Moore-neighbor step: next boundary pixel and its backtrack direction
fn step(mask: &BinaryMask, cur: Point, back: usize) -> Option<(Point, usize)> {
    for i in 1..=8 {
        let d = (back + i) % 8;
        let cand = Point::new(cur.x + DIRS[d].0, cur.y + DIRS[d].1);
        if mask.get_signed(cand.x, cand.y) {
            let prev = (d + 7) % 8;
            let bx = cur.x + DIRS[prev].0 - cand.x;
            let by = cur.y + DIRS[prev].1 - cand.y;
            return Some((cand, dir_index(bx, by)));
        }
    }
    None
}

/// Trace the outer boundary starting from a component's top-left pixel
pub fn trace_boundary(mask: &BinaryMask, start: Point, pixel_count: usize) -> Contour {
    let mut points = vec![start];

    // The west neighbor of the top-left pixel is always background
    let Some((first_next, first_back)) = step(mask, start, 0) else {
        return Contour { points };
    };

    let max_steps = 8 * pixel_count.max(1) + 16;
    let mut cur = first_next;
    let mut back = first_back;
    for _ in 0..max_steps {
        let Some((next, next_back)) = step(mask, cur, back) else {
            break;
        };
        if cur == start && next == first_next {
            break;
        }
        points.push(cur);
        cur = next;
        back = next_back;
    }

    Contour { points }
}

/// Outer boundaries of every component not nested inside another's hole
///
/// Contours come back in raster order of their top-left pixel, top to
/// bottom. Border-following tracers that scan from the last row list them
/// bottom to top instead, so callers that take the first match can differ
/// when several blobs qualify.
pub fn find_external_contours(mask: &BinaryMask) -> Vec<Contour> {
    find_components(mask)
        .into_iter()
        .filter(|c| c.external)
        .map(|c| {
            let start = Point::new(c.start.0 as i32, c.start.1 as i32);
            trace_boundary(mask, start, c.pixel_count)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect_mask(w: usize, h: usize, x0: usize, y0: usize, x1: usize, y1: usize) -> BinaryMask {
        let mut mask = BinaryMask::new(w, h);
        for y in y0..=y1 {
            for x in x0..=x1 {
                mask.set(x, y, true);
            }
        }
        mask
    }

    #[test]
    fn test_trace_rectangle() {
        let mask = rect_mask(10, 10, 2, 3, 6, 5);
        let contours = find_external_contours(&mask);
        assert_eq!(contours.len(), 1);
        let c = &contours[0];
        // 5x3 block: perimeter pixels = 2*5 + 2*1 = 12
        assert_eq!(c.points.len(), 12);
        assert_eq!(c.points[0], Point::new(2, 3));
        assert_eq!(c.points[1], Point::new(3, 3));
        assert_eq!(c.area(), 8.0);
        assert_eq!(c.perimeter(), 12.0);
    }

    #[test]
    fn test_single_pixel_and_pair() {
        let mut mask = BinaryMask::new(5, 5);
        mask.set(2, 2, true);
        let c = find_external_contours(&mask);
        assert_eq!(c[0].points, vec![Point::new(2, 2)]);
        assert_eq!(c[0].area(), 0.0);

        mask.set(3, 2, true);
        let c = find_external_contours(&mask);
        assert_eq!(c[0].points, vec![Point::new(2, 2), Point::new(3, 2)]);
    }

    #[test]
    fn test_nested_component_is_skipped() {
        let mut mask = rect_mask(12, 12, 1, 1, 10, 10);
        for y in 3..=8 {
            for x in 3..=8 {
                mask.set(x, y, false);
            }
        }
        mask.set(5, 5, true);
        let contours = find_external_contours(&mask);
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].points[0], Point::new(1, 1));
    }

    #[test]
    fn test_disk_is_circular() {
        let (w, h) = (80, 80);
        let mut mask = BinaryMask::new(w, h);
        for y in 0..h {
            for x in 0..w {
                let dx = x as f32 - 40.0;
                let dy = y as f32 - 40.0;
                if dx * dx + dy * dy <= 20.0 * 20.0 {
                    mask.set(x, y, true);
                }
            }
        }
        let contours = find_external_contours(&mask);
        assert_eq!(contours.len(), 1);
        let c = &contours[0];
        assert!(c.circularity() > 0.8, "circularity {}", c.circularity());
        let circle = c.enclosing_circle();
        assert!((circle.center.x - 40.0).abs() < 1.0);
        assert!((circle.center.y - 40.0).abs() < 1.0);
        assert!((circle.radius - 20.0).abs() < 1.0);
        let centroid = c.centroid().unwrap();
        assert!((centroid.x - 40.0).abs() < 1.0);
    }

    #[test]
    fn test_contours_listed_top_to_bottom() {
        let mut mask = rect_mask(20, 20, 2, 12, 5, 15);
        for y in 3..=6 {
            for x in 10..=13 {
                mask.set(x, y, true);
            }
        }
        let contours = find_external_contours(&mask);
        assert_eq!(contours.len(), 2);
        assert!(contours[0].points.iter().all(|p| p.y <= 6));
        assert!(contours[1].points.iter().all(|p| p.y >= 12));
    }

    #[test]
    fn test_contour_touching_border() {
        let mask = rect_mask(6, 6, 0, 0, 5, 5);
        let contours = find_external_contours(&mask);
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].area(), 25.0);
    }
}
