//! Tuning knobs for every detection strategy
//!
//! Defaults are the tuned constants. `from_env` variants apply `PUPIL_*`
//! overrides; the environment is read once per process and bad values fall
//! back to the defaults.

use std::sync::OnceLock;

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    parse_env(name).unwrap_or(default)
}

/// Threshold-sweep parameters
#[derive(Debug, Clone, PartialEq)]
pub struct SweepConfig {
    /// Longest side allowed before area downscaling
    pub max_working_dim: usize,
    /// Lowest threshold tried, regardless of the image minimum
    pub threshold_floor: u8,
    /// Threshold increment between levels
    pub threshold_step: u8,
    /// Last threshold tried (inclusive)
    pub threshold_ceiling: u8,
    /// Contours smaller than this are ignored
    pub min_area: f64,
    /// Contours less circular than this are ignored
    pub min_circularity: f64,
    /// Minimum radius is `rows / min_radius_divisor`
    pub min_radius_divisor: f32,
    /// Maximum radius is `rows / max_radius_divisor`
    pub max_radius_divisor: f32,
    /// Opening kernel diameter is `rows / kernel_divisor` before clamping
    pub kernel_divisor: usize,
    /// Smallest opening kernel
    pub kernel_min: usize,
    /// Largest opening kernel
    pub kernel_max: usize,
    /// Gaussian kernel size applied after the opening
    pub blur_size: usize,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            max_working_dim: 600,
            threshold_floor: 5,
            threshold_step: 5,
            threshold_ceiling: 200,
            min_area: 20.0,
            min_circularity: 0.60,
            min_radius_divisor: 40.0,
            max_radius_divisor: 2.5,
            kernel_divisor: 15,
            kernel_min: 7,
            kernel_max: 21,
            // sigma 0.8, whose kernel already spans five taps
            blur_size: 3,
        }
    }
}

impl SweepConfig {
    /// Defaults with `PUPIL_*` environment overrides applied
    pub fn from_env() -> Self {
        static CACHED: OnceLock<SweepConfig> = OnceLock::new();
        CACHED
            .get_or_init(|| {
                let d = Self::default();
                Self {
                    max_working_dim: env_or("PUPIL_MAX_DIM", d.max_working_dim),
                    threshold_floor: env_or("PUPIL_THRESHOLD_FLOOR", d.threshold_floor),
                    threshold_step: env_or("PUPIL_THRESHOLD_STEP", d.threshold_step).max(1),
                    threshold_ceiling: env_or("PUPIL_THRESHOLD_CEILING", d.threshold_ceiling),
                    min_area: env_or("PUPIL_MIN_AREA", d.min_area),
                    min_circularity: env_or("PUPIL_MIN_CIRCULARITY", d.min_circularity)
                        .clamp(0.0, 1.0),
                    blur_size: env_or("PUPIL_BLUR_SIZE", d.blur_size),
                    ..d
                }
            })
            .clone()
    }

    /// Radius window `[floor(rows/min_div), floor(rows/max_div)]`
    pub fn radius_bounds(&self, rows: usize) -> (f32, f32) {
        let min_r = (rows as f32 / self.min_radius_divisor).floor();
        let max_r = (rows as f32 / self.max_radius_divisor).floor();
        (min_r, max_r)
    }
}

/// Circle-transform parameters
#[derive(Debug, Clone, PartialEq)]
pub struct HoughConfig {
    /// Longest side allowed before area downscaling
    pub max_working_dim: usize,
    /// Gaussian kernel size applied before edge detection
    pub blur_size: usize,
    /// Canny hysteresis low threshold
    pub canny_low: f32,
    /// Canny hysteresis high threshold
    pub canny_high: f32,
    /// Minimum radius is `rows / min_radius_divisor`
    pub min_radius_divisor: f32,
    /// Maximum radius is `rows / max_radius_divisor`
    pub max_radius_divisor: f32,
    /// Minimum summed votes (3x3 neighborhood) for a center
    pub min_votes: u32,
    /// Fraction of the circumference that must be backed by edge pixels
    pub min_support: f32,
}

impl Default for HoughConfig {
    fn default() -> Self {
        Self {
            max_working_dim: 600,
            blur_size: 5,
            canny_low: 30.0,
            canny_high: 90.0,
            min_radius_divisor: 40.0,
            max_radius_divisor: 2.5,
            min_votes: 20,
            min_support: 0.35,
        }
    }
}

impl HoughConfig {
    /// Defaults with `PUPIL_HOUGH_*` environment overrides applied
    pub fn from_env() -> Self {
        static CACHED: OnceLock<HoughConfig> = OnceLock::new();
        CACHED
            .get_or_init(|| {
                let d = Self::default();
                Self {
                    max_working_dim: env_or("PUPIL_MAX_DIM", d.max_working_dim),
                    canny_low: env_or("PUPIL_HOUGH_CANNY_LOW", d.canny_low),
                    canny_high: env_or("PUPIL_HOUGH_CANNY_HIGH", d.canny_high),
                    min_votes: env_or("PUPIL_HOUGH_MIN_VOTES", d.min_votes),
                    min_support: env_or("PUPIL_HOUGH_MIN_SUPPORT", d.min_support),
                    ..d
                }
            })
            .clone()
    }

    /// Radius window `[floor(rows/min_div), floor(rows/max_div)]`
    pub fn radius_bounds(&self, rows: usize) -> (usize, usize) {
        let min_r = (rows as f32 / self.min_radius_divisor).floor().max(1.0) as usize;
        let max_r = (rows as f32 / self.max_radius_divisor).floor() as usize;
        (min_r, max_r)
    }
}

/// Dense contour-trace parameters
#[derive(Debug, Clone, PartialEq)]
pub struct TraceConfig {
    /// Gaussian kernel size applied before thresholding
    pub blur_size: usize,
    /// Upper bound on the Otsu threshold; keeps mid-gray regions out
    pub dark_ceiling: u8,
    /// Contours smaller than this are ignored
    pub min_area: f64,
    /// Contours covering more than this share of the frame are ignored
    pub max_area_ratio: f64,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            blur_size: 5,
            dark_ceiling: 70,
            min_area: 20.0,
            max_area_ratio: 0.5,
        }
    }
}

impl TraceConfig {
    /// Defaults with `PUPIL_TRACE_*` environment overrides applied
    pub fn from_env() -> Self {
        static CACHED: OnceLock<TraceConfig> = OnceLock::new();
        CACHED
            .get_or_init(|| {
                let d = Self::default();
                Self {
                    dark_ceiling: env_or("PUPIL_TRACE_DARK_CEILING", d.dark_ceiling),
                    min_area: env_or("PUPIL_TRACE_MIN_AREA", d.min_area),
                    ..d
                }
            })
            .clone()
    }
}

/// Configuration for all strategies
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DetectorConfig {
    /// Threshold-sweep parameters
    pub sweep: SweepConfig,
    /// Circle-transform parameters
    pub hough: HoughConfig,
    /// Contour-trace parameters
    pub trace: TraceConfig,
}

impl DetectorConfig {
    /// Defaults with environment overrides for every strategy
    pub fn from_env() -> Self {
        Self {
            sweep: SweepConfig::from_env(),
            hough: HoughConfig::from_env(),
            trace: TraceConfig::from_env(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sweep_defaults() {
        let c = SweepConfig::default();
        assert_eq!(c.max_working_dim, 600);
        assert_eq!((c.threshold_floor, c.threshold_step, c.threshold_ceiling), (5, 5, 200));
        assert_eq!(c.radius_bounds(600), (15.0, 240.0));
        assert_eq!(c.radius_bounds(100), (2.0, 40.0));
    }

    #[test]
    fn test_hough_radius_bounds() {
        let c = HoughConfig::default();
        assert_eq!(c.radius_bounds(600), (15, 240));
        assert_eq!(c.radius_bounds(10), (1, 4));
    }

    #[test]
    fn test_parse_env_rejects_garbage() {
        assert_eq!(parse_env::<u8>("PUPIL_TEST_UNSET_VARIABLE"), None);
        assert_eq!(env_or("PUPIL_TEST_UNSET_VARIABLE", 7usize), 7);
    }
}
