use nalgebra::{Vector2, Vector3};

use super::{GeometryError, EPSILON};

/// A circle in the XY plane, used for horizontal cross-sections of a structure. The radius is never negative.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "CircleFields"))]
pub struct Circle {
    center: Vector2<f64>,
    radius: f64,
}

impl Circle {
    /// Creates a new circle from the given `center` and `radius`
    ///
    /// # Panics
    ///
    /// If `radius` is negative or NaN
    pub fn new(center: Vector2<f64>, radius: f64) -> Self {
        if !(radius >= 0.0) {
            panic!("Circle radius must be >= 0, got {}", radius);
        }
        Self { center, radius }
    }

    /// Computes the circumcircle of the three points `a`, `b` and `c`. The center is the intersection of the
    /// perpendicular bisectors of `ab` and `ac`, obtained by solving the resulting 2x2 linear system with Cramer's
    /// rule. Fails with [CollinearPoints](GeometryError::CollinearPoints) if the determinant of the system is below
    /// [EPSILON](super::EPSILON) in magnitude.
    ///
    /// ```
    /// # use plumb_core::geometry::Circle;
    /// # use plumb_core::nalgebra::Vector2;
    /// let circle = Circle::through_points(
    ///     &Vector2::new(1.0, 0.0),
    ///     &Vector2::new(0.0, 1.0),
    ///     &Vector2::new(-1.0, 0.0),
    /// ).unwrap();
    /// assert!(circle.center().norm() < 1e-6);
    /// assert!((circle.radius() - 1.0).abs() < 1e-6);
    /// ```
    pub fn through_points(
        a: &Vector2<f64>,
        b: &Vector2<f64>,
        c: &Vector2<f64>,
    ) -> Result<Self, GeometryError> {
        let a1 = 2.0 * (b.x - a.x);
        let b1 = 2.0 * (b.y - a.y);
        let c1 = a.norm_squared() - b.norm_squared();

        let a2 = 2.0 * (c.x - a.x);
        let b2 = 2.0 * (c.y - a.y);
        let c2 = a.norm_squared() - c.norm_squared();

        let determinant = a1 * b2 - a2 * b1;
        if !(determinant.abs() >= EPSILON) {
            return Err(GeometryError::CollinearPoints);
        }

        let center = Vector2::new(
            (b1 * c2 - b2 * c1) / determinant,
            (c1 * a2 - c2 * a1) / determinant,
        );
        let radius = (center - a).norm();
        Ok(Self { center, radius })
    }

    pub fn center(&self) -> &Vector2<f64> {
        &self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// The center of this circle lifted to 3D at the given height
    pub fn center_at(&self, height: f64) -> Vector3<f64> {
        Vector3::new(self.center.x, self.center.y, height)
    }

    /// Signed distance from `point` to the circle line: negative inside the circle, positive outside
    pub fn distance(&self, point: &Vector2<f64>) -> f64 {
        (self.center - point).norm() - self.radius
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct CircleFields {
    center: Vector2<f64>,
    radius: f64,
}

#[cfg(feature = "serde")]
impl std::convert::TryFrom<CircleFields> for Circle {
    type Error = GeometryError;

    fn try_from(fields: CircleFields) -> Result<Self, Self::Error> {
        if !(fields.radius >= 0.0 && fields.radius.is_finite()) {
            return Err(GeometryError::InvalidRadius(fields.radius));
        }
        Ok(Circle::new(fields.center, fields.radius))
    }
}
