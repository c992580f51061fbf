/// Integer point in pixel coordinates
///
/// Also used as the second element of a packed `(radius, 0)` result, see
/// [`crate::models::circle::pack_circle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    /// X coordinate
    pub x: i32,
    /// Y coordinate
    pub y: i32,
}

impl Point {
    /// Create a new point
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Convert to a floating point location
    pub fn to_f32(self) -> PointF {
        PointF::new(self.x as f32, self.y as f32)
    }
}

/// 2D point with floating point coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointF {
    /// X coordinate
    pub x: f32,
    /// Y coordinate
    pub y: f32,
}

impl PointF {
    /// Create a new point
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Calculate distance to another point
    pub fn distance(&self, other: &PointF) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Scale both coordinates
    pub fn scale(&self, factor: f32) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }

    /// Round to the nearest integer point
    pub fn round(&self) -> Point {
        Point::new(self.x.round() as i32, self.y.round() as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_and_distance() {
        let p = PointF::new(2.4, 7.6);
        assert_eq!(p.round(), Point::new(2, 8));
        assert_eq!(PointF::new(0.0, 0.0).distance(&PointF::new(3.0, 4.0)), 5.0);
        assert_eq!(Point::new(3, -1).to_f32(), PointF::new(3.0, -1.0));
    }
}
