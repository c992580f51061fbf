//! Utility functions for image processing
//!
//! This module provides the numeric building blocks of pupil detection:
//! - Grayscale conversion (RGB/RGBA to luminance, alpha over white)
//! - Area-averaging downscale to a working resolution
//! - Elliptical grayscale morphology (opening)
//! - Gaussian blur
//! - Binarization (inverse threshold and Otsu's method)
//! - Geometry (contour area, arc length, enclosing circles)

/// Threshold images into binary masks
pub mod binarization;
/// Separable Gaussian blur
pub mod blur;
/// Contour and circle geometry
pub mod geometry;
/// Color to luminance conversion
pub mod grayscale;
/// Elliptical grayscale morphology
pub mod morphology;
/// Area-averaging downscale
pub mod resize;
