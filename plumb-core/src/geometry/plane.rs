use nalgebra::Vector3;

use super::{is_finite_non_zero, GeometryError, EPSILON};

/// Minimum absolute z-component of the unit normal for a plane to count as horizontal. `0.9` corresponds to a
/// slope of roughly 25.8 degrees; this is a tuning value for ground detection, use
/// [is_horizontal_with](Plane::is_horizontal_with) to pick a different one.
pub const HORIZONTAL_NORMAL_THRESHOLD: f64 = 0.9;

/// An infinite plane given by a point on the plane and a normal vector. The normal does not have to be normalized,
/// but it is never zero, also not when the plane is deserialized.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "PlaneFields"))]
pub struct Plane {
    point: Vector3<f64>,
    normal: Vector3<f64>,
}

impl Plane {
    /// Creates a new plane through `point` with the given `normal`. Returns an error if the normal is zero or not
    /// finite.
    pub fn new(point: Vector3<f64>, normal: Vector3<f64>) -> Result<Self, GeometryError> {
        if !is_finite_non_zero(&normal) {
            return Err(GeometryError::InvalidNormal([normal.x, normal.y, normal.z]));
        }
        Ok(Self { point, normal })
    }

    /// Creates the horizontal plane `z = height`
    pub fn horizontal(height: f64) -> Self {
        Self {
            point: Vector3::new(0.0, 0.0, height),
            normal: Vector3::z(),
        }
    }

    /// Creates the plane through the three points `a`, `b` and `c`. The normal is `(b - a) x (c - a)`, anchored
    /// at `a`. Fails with [CollinearPoints](GeometryError::CollinearPoints) if the sine of the angle between the
    /// two edge vectors is below [EPSILON](super::EPSILON), which includes the case of repeated points.
    ///
    /// ```
    /// # use plumb_core::geometry::*;
    /// # use plumb_core::nalgebra::Vector3;
    /// let plane = Plane::from_points(
    ///     &Vector3::new(0.0, 0.0, 1.0),
    ///     &Vector3::new(1.0, 0.0, 1.0),
    ///     &Vector3::new(0.0, 1.0, 1.0),
    /// ).unwrap();
    /// assert!(plane.is_horizontal());
    ///
    /// let collinear = Plane::from_points(
    ///     &Vector3::new(0.0, 0.0, 0.0),
    ///     &Vector3::new(1.0, 1.0, 1.0),
    ///     &Vector3::new(2.0, 2.0, 2.0),
    /// );
    /// assert_eq!(collinear, Err(GeometryError::CollinearPoints));
    /// ```
    pub fn from_points(
        a: &Vector3<f64>,
        b: &Vector3<f64>,
        c: &Vector3<f64>,
    ) -> Result<Self, GeometryError> {
        let ab = b - a;
        let ac = c - a;
        let normal = ab.cross(&ac);
        if !(normal.norm() > EPSILON * ab.norm() * ac.norm()) {
            return Err(GeometryError::CollinearPoints);
        }
        Self::new(*a, normal)
    }

    /// The point that anchors this plane
    pub fn point(&self) -> &Vector3<f64> {
        &self.point
    }

    /// The normal vector as it was given at construction, not necessarily of unit length
    pub fn normal(&self) -> &Vector3<f64> {
        &self.normal
    }

    pub fn unit_normal(&self) -> Vector3<f64> {
        self.normal.normalize()
    }

    /// Unsigned distance from `point` to this plane: `|n·p - n·p0| / |n|`
    pub fn distance(&self, point: &Vector3<f64>) -> f64 {
        (self.normal.dot(point) - self.normal.dot(&self.point)).abs() / self.normal.norm()
    }

    /// Is this plane horizontal, i.e. is the absolute z-component of its unit normal at least
    /// [HORIZONTAL_NORMAL_THRESHOLD]?
    pub fn is_horizontal(&self) -> bool {
        self.is_horizontal_with(HORIZONTAL_NORMAL_THRESHOLD)
    }

    /// Like [is_horizontal](Plane::is_horizontal), but with a custom threshold for the z-component of the unit
    /// normal
    pub fn is_horizontal_with(&self, threshold: f64) -> bool {
        self.unit_normal().z.abs() >= threshold
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct PlaneFields {
    point: Vector3<f64>,
    normal: Vector3<f64>,
}

#[cfg(feature = "serde")]
impl std::convert::TryFrom<PlaneFields> for Plane {
    type Error = GeometryError;

    fn try_from(fields: PlaneFields) -> Result<Self, Self::Error> {
        Plane::new(fields.point, fields.normal)
    }
}
