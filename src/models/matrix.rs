/// Packed binary mask produced by thresholding (`true` = foreground)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryMask {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl BinaryMask {
    /// Create an all-background mask
    pub fn new(width: usize, height: usize) -> Self {
        let bytes_needed = (width * height).div_ceil(8);
        Self {
            width,
            height,
            data: vec![0; bytes_needed],
        }
    }

    /// Mask width
    pub fn width(&self) -> usize {
        self.width
    }

    /// Mask height
    pub fn height(&self) -> usize {
        self.height
    }

    /// Get bit at (x, y); out of range reads as background
    pub fn get(&self, x: usize, y: usize) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let index = y * self.width + x;
        (self.data[index / 8] >> (index % 8)) & 1 == 1
    }

    /// Signed lookup used by boundary tracing
    pub fn get_signed(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 {
            return false;
        }
        self.get(x as usize, y as usize)
    }

    /// Set bit at (x, y)
    pub fn set(&mut self, x: usize, y: usize, value: bool) {
        if x >= self.width || y >= self.height {
            return;
        }
        let index = y * self.width + x;
        let (byte_index, bit_index) = (index / 8, index % 8);
        if value {
            self.data[byte_index] |= 1 << bit_index;
        } else {
            self.data[byte_index] &= !(1 << bit_index);
        }
    }

    /// Number of foreground pixels
    pub fn count_foreground(&self) -> usize {
        self.data.iter().map(|b| b.count_ones() as usize).sum()
    }
}

impl Default for BinaryMask {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_mask() {
        let mut mask = BinaryMask::new(5, 3);
        mask.set(3, 2, true);
        assert!(mask.get(3, 2));
        assert!(mask.get_signed(3, 2));
        assert!(!mask.get_signed(-1, 2));
        assert_eq!(mask.count_foreground(), 1);

        mask.set(3, 2, false);
        assert_eq!(mask.count_foreground(), 0);
    }

    #[test]
    fn test_out_of_bounds() {
        let mut mask = BinaryMask::new(8, 8);
        mask.set(10, 10, true);
        assert!(!mask.get(10, 10));
        assert_eq!(mask.count_foreground(), 0);
    }
}
