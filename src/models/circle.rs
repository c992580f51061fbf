use super::point::{Point, PointF};

/// Candidate circle produced while searching for the pupil
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Circle {
    /// Circle center
    pub center: PointF,
    /// Circle radius
    pub radius: f32,
}

impl Circle {
    /// Create a new circle
    pub fn new(cx: f32, cy: f32, radius: f32) -> Self {
        Self {
            center: PointF::new(cx, cy),
            radius,
        }
    }

    /// Map a circle found on a downscaled image back to original coordinates
    pub fn rescale(&self, factor: f32) -> Self {
        Self {
            center: self.center.scale(factor),
            radius: self.radius * factor,
        }
    }

    /// True when `p` lies inside or on the circle (with a small tolerance)
    pub fn contains(&self, p: &PointF) -> bool {
        let dx = (p.x - self.center.x) as f64;
        let dy = (p.y - self.center.y) as f64;
        let r = self.radius as f64;
        dx * dx + dy * dy <= r * r + 1e-3 * (1.0 + r)
    }
}

/// Encode a circle as the packed two-point result `[center, (radius, 0)]`
pub fn pack_circle(circle: &Circle) -> Vec<Point> {
    let center = circle.center.round();
    let radius = circle.radius.round() as i32;
    vec![center, Point::new(radius, 0)]
}

/// Decode a packed result; `None` unless it holds exactly two points
pub fn unpack_circle(edges: &[Point]) -> Option<(Point, i32)> {
    match edges {
        [center, radius] => Some((*center, radius.x)),
        _ => None,
    }
}
