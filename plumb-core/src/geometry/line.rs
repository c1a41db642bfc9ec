use nalgebra::Vector3;

use super::{is_finite_non_zero, GeometryError, Plane, EPSILON};

/// An infinite line given by a point on the line and a unit direction vector. Deserialized directions are
/// normalized as well.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "LineFields"))]
pub struct Line {
    point: Vector3<f64>,
    direction: Vector3<f64>,
}

impl Line {
    /// Creates a new line through `point` along `direction`. The direction is normalized. Returns an error if it
    /// is zero or not finite.
    pub fn new(point: Vector3<f64>, direction: Vector3<f64>) -> Result<Self, GeometryError> {
        if !is_finite_non_zero(&direction) {
            return Err(GeometryError::InvalidDirection([
                direction.x,
                direction.y,
                direction.z,
            ]));
        }
        Ok(Self {
            point,
            direction: direction.normalize(),
        })
    }

    /// The vertical line through `point`
    pub fn vertical(point: Vector3<f64>) -> Self {
        Self {
            point,
            direction: Vector3::z(),
        }
    }

    /// Creates the line through `a` and `b`, anchored at `a` and pointing along `a - b`. Fails with
    /// [CoincidentPoints](GeometryError::CoincidentPoints) if the two points are closer than
    /// [EPSILON](super::EPSILON) to each other.
    pub fn through_points(a: &Vector3<f64>, b: &Vector3<f64>) -> Result<Self, GeometryError> {
        let direction = a - b;
        if !(direction.norm() >= EPSILON) {
            return Err(GeometryError::CoincidentPoints);
        }
        Self::new(*a, direction)
    }

    pub fn point(&self) -> &Vector3<f64> {
        &self.point
    }

    /// The unit direction of this line
    pub fn direction(&self) -> &Vector3<f64> {
        &self.direction
    }

    /// Returns `point + t * direction`
    pub fn point_at(&self, t: f64) -> Vector3<f64> {
        self.point + self.direction * t
    }

    /// Perpendicular distance from `point` to this line. The squared distance is clamped at zero before taking the
    /// square root, since `|v|² - t²` can come out slightly negative for points on the line.
    ///
    /// ```
    /// # use plumb_core::geometry::Line;
    /// # use plumb_core::nalgebra::Vector3;
    /// let line = Line::new(Vector3::new(1.0, 1.0, 0.0), Vector3::new(0.0, 0.0, 4.0)).unwrap();
    /// assert_eq!(line.distance(&Vector3::new(1.0, 3.0, 10.0)), 2.0);
    /// ```
    pub fn distance(&self, point: &Vector3<f64>) -> f64 {
        let v = point - self.point;
        let t = v.dot(&self.direction);
        (v.norm_squared() - t * t).max(0.0).sqrt()
    }
}

/// Computes the point where `line` crosses `plane`. Fails with
/// [ParallelLinePlane](GeometryError::ParallelLinePlane) if the line is (nearly) parallel to the plane, i.e. the
/// absolute dot product of the unit plane normal and the line direction is below [EPSILON](super::EPSILON).
///
/// ```
/// # use plumb_core::geometry::*;
/// # use plumb_core::nalgebra::Vector3;
/// let line = Line::new(Vector3::new(1.0, 2.0, 0.0), Vector3::new(0.0, 1.0, 1.0)).unwrap();
/// let crossing = intersect_line_plane(&line, &Plane::horizontal(3.0)).unwrap();
/// assert!((crossing - Vector3::new(1.0, 5.0, 3.0)).norm() < 1e-12);
///
/// let horizontal_line = Line::new(Vector3::zeros(), Vector3::x()).unwrap();
/// assert_eq!(
///     intersect_line_plane(&horizontal_line, &Plane::horizontal(3.0)),
///     Err(GeometryError::ParallelLinePlane)
/// );
/// ```
pub fn intersect_line_plane(line: &Line, plane: &Plane) -> Result<Vector3<f64>, GeometryError> {
    let normal = plane.unit_normal();
    let denominator = normal.dot(line.direction());
    if denominator.abs() < EPSILON {
        return Err(GeometryError::ParallelLinePlane);
    }
    let t = normal.dot(&(plane.point() - line.point())) / denominator;
    Ok(line.point_at(t))
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct LineFields {
    point: Vector3<f64>,
    direction: Vector3<f64>,
}

#[cfg(feature = "serde")]
impl std::convert::TryFrom<LineFields> for Line {
    type Error = GeometryError;

    fn try_from(fields: LineFields) -> Result<Self, Self::Error> {
        Line::new(fields.point, fields.direction)
    }
}
