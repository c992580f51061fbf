/// Geometry helpers for contour scoring: area, arc length, circularity,
/// convex hull and minimum enclosing circle
use crate::models::{Circle, Point};

/// Polygon area via the shoelace formula (always non-negative)
pub fn polygon_area(points: &[Point]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut twice = 0i64;
    for i in 0..points.len() {
        let a = points[i];
        let b = points[(i + 1) % points.len()];
        twice += a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64;
    }
    (twice as f64).abs() * 0.5
}

/// Length of the closed polyline through `points`
pub fn closed_arc_length(points: &[Point]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    let mut length = 0.0;
    for i in 0..points.len() {
        let a = points[i];
        let b = points[(i + 1) % points.len()];
        let dx = (b.x - a.x) as f64;
        let dy = (b.y - a.y) as f64;
        length += (dx * dx + dy * dy).sqrt();
    }
    length
}

/// Shape score `4*pi*area / perimeter^2` (1.0 for a perfect circle)
pub fn circularity(area: f64, perimeter: f64) -> f64 {
    if perimeter <= 0.0 {
        return 0.0;
    }
    4.0 * std::f64::consts::PI * area / (perimeter * perimeter)
}

fn cross(o: Point, a: Point, b: Point) -> i64 {
    (a.x - o.x) as i64 * (b.y - o.y) as i64 - (a.y - o.y) as i64 * (b.x - o.x) as i64
}

/// Convex hull (Andrew's monotone chain), counter-clockwise, no duplicates
pub fn convex_hull(points: &[Point]) -> Vec<Point> {
    let mut pts: Vec<Point> = points.to_vec();
    pts.sort_by(|a, b| (a.x, a.y).cmp(&(b.x, b.y)));
    pts.dedup();
    if pts.len() < 3 {
        return pts;
    }

    let mut hull: Vec<Point> = Vec::with_capacity(pts.len() * 2);
    for &p in &pts {
        while hull.len() >= 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0 {
            hull.pop();
        }
        hull.push(p);
    }
    let lower_len = hull.len() + 1;
    for &p in pts.iter().rev().skip(1) {
        while hull.len() >= lower_len && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0 {
            hull.pop();
        }
        hull.push(p);
    }
    hull.pop();
    hull
}

#[derive(Clone, Copy)]
struct Disc {
    x: f64,
    y: f64,
    r2: f64,
}

impl Disc {
    fn contains(&self, p: (f64, f64)) -> bool {
        let dx = p.0 - self.x;
        let dy = p.1 - self.y;
        dx * dx + dy * dy <= self.r2 + 1e-7 * (1.0 + self.r2)
    }

    fn from_two(a: (f64, f64), b: (f64, f64)) -> Self {
        let x = (a.0 + b.0) * 0.5;
        let y = (a.1 + b.1) * 0.5;
        let dx = a.0 - x;
        let dy = a.1 - y;
        Self { x, y, r2: dx * dx + dy * dy }
    }

    fn from_three(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> Self {
        let bx = b.0 - a.0;
        let by = b.1 - a.1;
        let cx = c.0 - a.0;
        let cy = c.1 - a.1;
        let d = 2.0 * (bx * cy - by * cx);
        if d.abs() < 1e-12 {
            // Collinear: the widest pair spans the rest
            let candidates = [Self::from_two(a, b), Self::from_two(a, c), Self::from_two(b, c)];
            return candidates
                .into_iter()
                .fold(candidates[0], |best, d| if d.r2 > best.r2 { d } else { best });
        }
        let b2 = bx * bx + by * by;
        let c2 = cx * cx + cy * cy;
        let ux = (cy * b2 - by * c2) / d;
        let uy = (bx * c2 - cx * b2) / d;
        Self {
            x: a.0 + ux,
            y: a.1 + uy,
            r2: ux * ux + uy * uy,
        }
    }
}

/// Smallest circle enclosing every point (Welzl, run on the convex hull)
pub fn min_enclosing_circle(points: &[Point]) -> Circle {
    let hull = convex_hull(points);
    let pts: Vec<(f64, f64)> = hull.iter().map(|p| (p.x as f64, p.y as f64)).collect();
    let Some(&first) = pts.first() else {
        return Circle::default();
    };

    let mut disc = Disc {
        x: first.0,
        y: first.1,
        r2: 0.0,
    };
    for i in 1..pts.len() {
        if disc.contains(pts[i]) {
            continue;
        }
        disc = Disc {
            x: pts[i].0,
            y: pts[i].1,
            r2: 0.0,
        };
        for j in 0..i {
            if disc.contains(pts[j]) {
                continue;
            }
            disc = Disc::from_two(pts[i], pts[j]);
            for k in 0..j {
                if !disc.contains(pts[k]) {
                    disc = Disc::from_three(pts[i], pts[j], pts[k]);
                }
            }
        }
    }

    Circle::new(disc.x as f32, disc.y as f32, disc.r2.sqrt() as f32)
}
