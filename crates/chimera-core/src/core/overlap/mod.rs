//! Overlap between the 1D Gaussian densities of two atoms.
//!
//! Each atom is represented by a normal density along the line joining the two
//! centres, with the atom radius as standard deviation. The overlap is the area
//! under the pointwise minimum of the two densities: 1 for identical Gaussians,
//! tending to 0 as the centres separate.
//!
//! The minimum has a kink wherever the densities cross, so the real line is
//! split there (and around each centre) before integrating; on smooth pieces
//! the quadrature error estimate is reliable.

pub mod format;
pub mod quadrature;

pub use quadrature::Integral;
use quadrature::{QuadratureSettings, integrate_piecewise};

/// Radius used for the radius-insensitive baseline overlap.
pub const FIXED_RADIUS: f64 = 1.5;

const NORM_PDF_FACTOR: f64 = 0.398_942_280_401_432_7; // 1 / sqrt(2 * pi)

/// Crossings further than this many standard deviations from both centres lie
/// where both densities underflow, so they are not worth a breakpoint.
const CROSSING_REACH_SD: f64 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlapCalculator {
    settings: QuadratureSettings,
}

impl Default for OverlapCalculator {
    fn default() -> Self {
        let tol = f64::EPSILON.powf(0.25);
        Self {
            settings: QuadratureSettings::new(tol, tol),
        }
    }
}

impl OverlapCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: QuadratureSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &QuadratureSettings {
        &self.settings
    }

    /// `∫ min(N(0, sd1), N(dist, sd2)) dx` over the real line.
    pub fn overlap(&self, dist: f64, sd1: f64, sd2: f64) -> Integral {
        let points = breakpoints(dist, sd1, sd2);
        integrate_piecewise(|x| min_density(x, dist, sd1, sd2), &points, &self.settings)
    }

    pub fn fixed_overlap(&self, dist: f64) -> Integral {
        self.overlap(dist, FIXED_RADIUS, FIXED_RADIUS)
    }
}

/// Solutions of `N(x; 0, sd1) = N(x; dist, sd2)`, a quadratic in `x` that
/// degenerates to a linear equation for equal widths.
fn density_crossings(dist: f64, sd1: f64, sd2: f64) -> Vec<f64> {
    let a = 1.0 / (2.0 * sd2 * sd2) - 1.0 / (2.0 * sd1 * sd1);
    let b = -dist / (sd2 * sd2);
    let c = dist * dist / (2.0 * sd2 * sd2) + (sd2 / sd1).ln();

    if a == 0.0 {
        return if b == 0.0 { Vec::new() } else { vec![-c / b] };
    }
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return Vec::new();
    }
    let q = -0.5 * (b + disc.sqrt().copysign(b));
    if q == 0.0 {
        vec![-b / (2.0 * a)]
    } else {
        vec![q / a, c / q]
    }
}

/// Sorted, distinct split points: the density crossings, both centres, and
/// one and three standard deviations either side of each centre.
fn breakpoints(dist: f64, sd1: f64, sd2: f64) -> Vec<f64> {
    let reach = CROSSING_REACH_SD * sd1.max(sd2);
    let (lo, hi) = (dist.min(0.0) - reach, dist.max(0.0) + reach);

    let mut points: Vec<f64> = density_crossings(dist, sd1, sd2)
        .into_iter()
        .filter(|&x| x > lo && x < hi)
        .collect();
    points.extend([
        0.0,
        dist,
        -sd1,
        sd1,
        dist - sd2,
        dist + sd2,
        -3.0 * sd1,
        3.0 * sd1,
        dist - 3.0 * sd2,
        dist + 3.0 * sd2,
    ]);
    points.sort_by(f64::total_cmp);
    points.dedup();
    points
}

#[inline]
fn min_density(x: f64, mu2: f64, sd1: f64, sd2: f64) -> f64 {
    let first = (-(x * x) / (2.0 * sd1 * sd1)).exp() / sd1;
    let shifted = x - mu2;
    let second = (-(shifted * shifted) / (2.0 * sd2 * sd2)).exp() / sd2;
    NORM_PDF_FACTOR * first.min(second)
}
