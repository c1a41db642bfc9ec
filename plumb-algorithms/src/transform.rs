use plumb_core::{
    geometry::{GeometryError, Line, EPSILON},
    nalgebra::{Matrix4, Point3, Vector3},
};

/// Homogeneous transformation that moves a reference point to the origin and rotates an axis direction onto the
/// positive z-axis. Used to express a tilted structure in the frame of its own axis.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AxisTransform {
    matrix: Matrix4<f64>,
}

impl AxisTransform {
    /// Builds the transform `Ry * Rz * T`, where `T` translates `reference` to the origin, `Rz` rotates the
    /// horizontal part of `axis` onto the x-axis and `Ry` tilts the result onto the z-axis.
    ///
    /// Returns `None` if `axis` is zero or already parallel to the z-axis (in either orientation), since there is
    /// no rotation to apply in that case.
    ///
    /// ```
    /// # use plumb_algorithms::transform::AxisTransform;
    /// # use plumb_core::nalgebra::Vector3;
    /// let reference = Vector3::new(1.0, 2.0, 3.0);
    /// let transform = AxisTransform::build(&reference, &Vector3::new(1.0, 0.0, 1.0)).unwrap();
    /// let moved = transform.apply(&[reference, reference + Vector3::new(1.0, 0.0, 1.0)]);
    /// assert!(moved[0].norm() < 1e-12);
    /// assert!((moved[1] - Vector3::new(0.0, 0.0, 2.0_f64.sqrt())).norm() < 1e-12);
    ///
    /// assert!(AxisTransform::build(&reference, &Vector3::new(0.0, 0.0, -2.0)).is_none());
    /// ```
    pub fn build(reference: &Vector3<f64>, axis: &Vector3<f64>) -> Option<Self> {
        let u = axis.try_normalize(EPSILON)?;
        if u.x.abs() < EPSILON && u.y.abs() < EPSILON {
            return None;
        }
        let h = (u.x * u.x + u.y * u.y).sqrt();

        #[rustfmt::skip]
        let ry = Matrix4::new(
            u.z, 0.0, -h,  0.0,
            0.0, 1.0, 0.0, 0.0,
            h,   0.0, u.z, 0.0,
            0.0, 0.0, 0.0, 1.0,
        );
        #[rustfmt::skip]
        let rz = Matrix4::new(
            u.x / h,  u.y / h, 0.0, 0.0,
            -u.y / h, u.x / h, 0.0, 0.0,
            0.0,      0.0,     1.0, 0.0,
            0.0,      0.0,     0.0, 1.0,
        );
        let translation = Matrix4::new_translation(&(-reference));

        Some(Self {
            matrix: ry * rz * translation,
        })
    }

    /// Transform into the frame of `line`: the point of the line becomes the origin and its direction the z-axis
    pub fn from_line(line: &Line) -> Option<Self> {
        Self::build(line.point(), line.direction())
    }

    pub fn matrix(&self) -> &Matrix4<f64> {
        &self.matrix
    }

    /// Applies this transform to a single point
    pub fn transform_point(&self, point: &Vector3<f64>) -> Vector3<f64> {
        self.matrix.transform_point(&Point3::from(*point)).coords
    }

    /// Returns the transformed copies of `points`
    pub fn apply(&self, points: &[Vector3<f64>]) -> Vec<Vector3<f64>> {
        points
            .iter()
            .map(|point| self.transform_point(point))
            .collect()
    }

    pub fn apply_in_place(&self, points: &mut [Vector3<f64>]) {
        for point in points.iter_mut() {
            *point = self.transform_point(point);
        }
    }

    /// Maps transformed points back into the original frame. Fails with
    /// [SingularMatrix](GeometryError::SingularMatrix) if the matrix can not be inverted.
    pub fn apply_inverse(&self, points: &[Vector3<f64>]) -> Result<Vec<Vector3<f64>>, GeometryError> {
        let inverse = self
            .matrix
            .try_inverse()
            .ok_or(GeometryError::SingularMatrix)?;
        Ok(points
            .iter()
            .map(|point| inverse.transform_point(&Point3::from(*point)).coords)
            .collect())
    }
}
