/// Circle type and the packed `[center, (radius, 0)]` encoding
pub mod circle;
/// Owned interleaved pixel buffer
pub mod frame;
/// Bit-packed binary mask
pub mod matrix;
/// Integer and floating point coordinates
pub mod point;

pub use circle::{Circle, pack_circle, unpack_circle};
pub use frame::Frame;
pub use matrix::BinaryMask;
pub use point::{Point, PointF};
