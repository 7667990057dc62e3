//! Utility maths functions
//!
//! Geometry used by the automaton guards lives here. All functions are pure.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Return the euclidian distance between two points in 3D.
///
/// The z component is included even for planar motion.
pub fn euclidean_distance<T>(point_0: &[T; 3], point_1: &[T; 3]) -> T
where
    T: Float,
{
    point_0
        .iter()
        .zip(point_1.iter())
        .fold(T::zero(), |sum, (a, b)| sum + (*b - *a).powi(2))
        .sqrt()
}

/// Absolute difference between two headings in degrees.
///
/// No wrapping is performed, so headings either side of the +/-180 boundary give a large delta
/// even when they are physically close. See [`wrapped_angle_delta_deg`] for the wrapped variant.
pub fn angle_delta<T>(a: T, b: T) -> T
where
    T: Float,
{
    (a - b).abs()
}

/// Smallest unsigned angle between two headings in degrees, accounting for wrapping.
///
/// The result is in the range [0, 180].
pub fn wrapped_angle_delta_deg<T>(a: T, b: T) -> T
where
    T: Float,
{
    let full = T::from(360.0).unwrap();

    let c = rem_euclid(a - b, full);
    let d = rem_euclid(b - a, full);

    c.min(d)
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
///
/// Due to floating point round-off the result can equal `rhs.abs()` when `lhs` is much smaller
/// than `rhs` in magnitude and negative.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float,
{
    let r = lhs % rhs;
    if r < T::zero() {
        r + rhs.abs()
    } else {
        r
    }
}

/// Map a heading in degrees into the range (-180, 180].
pub fn normalise_heading_deg<T>(heading: T) -> T
where
    T: Float,
{
    let half = T::from(180.0).unwrap();
    let full = T::from(360.0).unwrap();

    let h = rem_euclid(heading + half, full) - half;

    // rem_euclid gives [-180, 180), shift the lower bound across
    if h <= -half {
        h + full
    } else {
        h
    }
}

/// Returns true if every element of the point is finite.
pub fn is_finite_point<T>(point: &[T]) -> bool
where
    T: Float,
{
    point.iter().all(|v| v.is_finite())
}
