use nalgebra::{Vector2, Vector3};

/// Computes the angle in radians between the two directions `a` and `b`. Neither vector has to be normalized.
/// The dot product of the unit vectors is clamped to `[-1, 1]` before calling `acos`, because rounding can push it
/// slightly outside of that range for (anti)parallel vectors. If either vector is zero, the result is NaN.
///
/// # Example
/// ```
/// # use plumb_core::geometry::angle_between;
/// # use plumb_core::nalgebra::Vector3;
/// let angle = angle_between(&Vector3::new(0.0, 0.0, 2.0), &Vector3::new(1.0, 0.0, 1.0));
/// assert!((angle - std::f64::consts::FRAC_PI_4).abs() < 1e-12);
/// ```
pub fn angle_between(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    let cos = a.normalize().dot(&b.normalize());
    cos.clamp(-1.0, 1.0).acos()
}

/// Projects `point` onto the XY plane by dropping its z coordinate
pub fn project_xy(point: &Vector3<f64>) -> Vector2<f64> {
    Vector2::new(point.x, point.y)
}

pub(crate) fn is_finite_non_zero(v: &Vector3<f64>) -> bool {
    v.iter().all(|c| c.is_finite()) && v.norm_squared() > 0.0
}
