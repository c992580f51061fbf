/// Connected components of a binary mask
/// Foreground is 8-connected, background 4-connected, so a diagonal gap
/// in a ring never leaks its hole into the surrounding background.
use crate::models::BinaryMask;

/// Union-Find with path halving
pub(crate) struct UnionFind {
    parent: Vec<u32>,
}

impl UnionFind {
    /// `n` singleton sets
    pub(crate) fn new(n: usize) -> Self {
        Self {
            parent: (0..n as u32).collect(),
        }
    }

    /// Root of `x`, halving the path on the way up
    pub(crate) fn find(&mut self, x: u32) -> u32 {
        let mut x = x;
        while self.parent[x as usize] != x {
            let grand = self.parent[self.parent[x as usize] as usize];
            self.parent[x as usize] = grand;
            x = grand;
        }
        x
    }

    /// Merge the sets of `x` and `y`; the smaller root survives
    pub(crate) fn union(&mut self, x: u32, y: u32) {
        let root_x = self.find(x);
        let root_y = self.find(y);
        if root_x != root_y {
            let (lo, hi) = if root_x < root_y { (root_x, root_y) } else { (root_y, root_x) };
            self.parent[hi as usize] = lo;
        }
    }
}

/// One foreground component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Component {
    /// First pixel in raster order (top-most, then left-most)
    pub start: (usize, usize),
    /// Pixel count
    pub pixel_count: usize,
    /// True when the component is not enclosed by a hole of another one
    pub external: bool,
}

/// Label foreground components, returned in raster order of their start pixel
pub fn find_components(mask: &BinaryMask) -> Vec<Component> {
    let width = mask.width();
    let height = mask.height();
    if width == 0 || height == 0 {
        return Vec::new();
    }

    // Label 0 = background
    let mut labels = vec![0u32; width * height];
    let mut uf = UnionFind::new(1);
    let mut next_label = 1u32;

    // First pass: provisional labels from already visited neighbors
    for y in 0..height {
        for x in 0..width {
            if !mask.get(x, y) {
                continue;
            }

            let mut neighbors = [0u32; 4];
            let mut n = 0;
            if x > 0 && labels[y * width + x - 1] != 0 {
                neighbors[n] = labels[y * width + x - 1];
                n += 1;
            }
            if y > 0 {
                let up = (y - 1) * width;
                if x > 0 && labels[up + x - 1] != 0 {
                    neighbors[n] = labels[up + x - 1];
                    n += 1;
                }
                if labels[up + x] != 0 {
                    neighbors[n] = labels[up + x];
                    n += 1;
                }
                if x + 1 < width && labels[up + x + 1] != 0 {
                    neighbors[n] = labels[up + x + 1];
                    n += 1;
                }
            }

            let idx = y * width + x;
            if n == 0 {
                labels[idx] = next_label;
                uf.parent.push(next_label);
                next_label += 1;
            } else {
                let min_label = neighbors[..n].iter().copied().min().unwrap_or(0);
                labels[idx] = min_label;
                for &l in &neighbors[..n] {
                    if l != min_label {
                        uf.union(min_label, l);
                    }
                }
            }
        }
    }

    let outside = outside_background(mask);

    // Second pass: resolve roots, collect components in raster order
    let mut slot_of_root = vec![usize::MAX; next_label as usize];
    let mut components: Vec<Component> = Vec::new();
    for y in 0..height {
        for x in 0..width {
            let label = labels[y * width + x];
            if label == 0 {
                continue;
            }
            let root = uf.find(label) as usize;
            if slot_of_root[root] == usize::MAX {
                slot_of_root[root] = components.len();
                // Pixel above the top-left pixel belongs to the surrounding region
                let external = y == 0 || outside[(y - 1) * width + x];
                components.push(Component {
                    start: (x, y),
                    pixel_count: 0,
                    external,
                });
            }
            components[slot_of_root[root]].pixel_count += 1;
        }
    }

    components
}

/// Background pixels 4-connected to the image border
fn outside_background(mask: &BinaryMask) -> Vec<bool> {
    let width = mask.width();
    let height = mask.height();
    let mut outside = vec![false; width * height];
    let mut stack: Vec<(usize, usize)> = Vec::new();

    let seed = |x: usize, y: usize, outside: &mut Vec<bool>, stack: &mut Vec<(usize, usize)>| {
        let idx = y * width + x;
        if !mask.get(x, y) && !outside[idx] {
            outside[idx] = true;
            stack.push((x, y));
        }
    };

    for x in 0..width {
        seed(x, 0, &mut outside, &mut stack);
        seed(x, height - 1, &mut outside, &mut stack);
    }
    for y in 0..height {
        seed(0, y, &mut outside, &mut stack);
        seed(width - 1, y, &mut outside, &mut stack);
    }

    while let Some((x, y)) = stack.pop() {
        if x > 0 {
            seed(x - 1, y, &mut outside, &mut stack);
        }
        if x + 1 < width {
            seed(x + 1, y, &mut outside, &mut stack);
        }
        if y > 0 {
            seed(x, y - 1, &mut outside, &mut stack);
        }
        if y + 1 < height {
            seed(x, y + 1, &mut outside, &mut stack);
        }
    }

    outside
}
