/// Integer recentering of a frame around a detected point
use rayon::prelude::*;

use crate::models::{Frame, Point};

/// Offset that moves `center` onto `(width/2, height/2)`
pub fn centering_offset(width: usize, height: usize, center: Point) -> (i64, i64) {
    (
        (width / 2) as i64 - center.x as i64,
        (height / 2) as i64 - center.y as i64,
    )
}

/// Shift a frame by `(dx, dy)`; vacated pixels are zero
pub fn shift_frame(frame: &Frame, dx: i64, dy: i64) -> Frame {
    if !frame.is_valid() {
        return frame.clone();
    }
    let (w, h, c) = (frame.width(), frame.height(), frame.channels());
    let src = frame.as_bytes();
    let row_bytes = w * c;
    let mut out = vec![0u8; src.len()];

    // Destination column range that maps inside the source
    let x_lo = dx.clamp(0, w as i64) as usize;
    let x_hi = (w as i64 + dx).clamp(0, w as i64) as usize;

    out.par_chunks_mut(row_bytes)
        .enumerate()
        .for_each(|(y, row)| {
            let sy = y as i64 - dy;
            if sy < 0 || sy >= h as i64 || x_lo >= x_hi {
                return;
            }
            let sx = (x_lo as i64 - dx) as usize;
            let len = (x_hi - x_lo) * c;
            let src_start = sy as usize * row_bytes + sx * c;
            row[x_lo * c..x_lo * c + len].copy_from_slice(&src[src_start..src_start + len]);
        });

    Frame::new(w, h, c, out)
}

/// New frame with `center` moved to the frame center; a copy when `center` is `None`
pub fn translate_to_center(frame: &Frame, center: Option<Point>) -> Frame {
    match center {
        Some(p) if frame.is_valid() => {
            let (dx, dy) = centering_offset(frame.width(), frame.height(), p);
            shift_frame(frame, dx, dy)
        }
        _ => frame.clone(),
    }
}
