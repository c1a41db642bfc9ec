use nalgebra::Vector3;

/// 3D axis-aligned bounding box of a set of points
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AABB {
    min: Vector3<f64>,
    max: Vector3<f64>,
}

impl AABB {
    /// The degenerate AABB that contains only `point`
    pub fn from_point(point: &Vector3<f64>) -> Self {
        Self {
            min: *point,
            max: *point,
        }
    }

    /// Returns the smallest AABB containing all `points`, or `None` if there are no points
    /// ```
    /// # use plumb_core::math::AABB;
    /// # use plumb_core::nalgebra::Vector3;
    /// let points = [Vector3::new(1.0, -2.0, 0.5), Vector3::new(-1.0, 4.0, 3.0)];
    /// let bounds = AABB::from_points(&points).unwrap();
    /// assert_eq!(*bounds.min(), Vector3::new(-1.0, -2.0, 0.5));
    /// assert_eq!(*bounds.max(), Vector3::new(1.0, 4.0, 3.0));
    /// assert!(AABB::from_points(&[]).is_none());
    /// ```
    pub fn from_points(points: &[Vector3<f64>]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        Some(
            rest.iter()
                .fold(Self::from_point(first), |bounds, point| {
                    bounds.extend_with_point(point)
                }),
        )
    }

    pub fn min(&self) -> &Vector3<f64> {
        &self.min
    }

    pub fn max(&self) -> &Vector3<f64> {
        &self.max
    }

    /// Returns the extent of this AABB. The extent is the size between the minimum and maximum position of this AABB
    pub fn extent(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// The vertical range `(min.z, max.z)` covered by this AABB
    pub fn height_range(&self) -> (f64, f64) {
        (self.min.z, self.max.z)
    }

    /// Returns a copy of this AABB, extended so that it contains `point`
    pub fn extend_with_point(&self, point: &Vector3<f64>) -> Self {
        Self {
            min: self.min.inf(point),
            max: self.max.sup(point),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extend_with_point() {
        let bounds = AABB::from_point(&Vector3::zeros()).extend_with_point(&Vector3::new(1.0, 1.0, 1.0));
        let extended = bounds.extend_with_point(&Vector3::new(2.0, -1.0, 0.5));
        assert_eq!(*extended.min(), Vector3::new(0.0, -1.0, 0.0));
        assert_eq!(*extended.max(), Vector3::new(2.0, 1.0, 1.0));
        assert_eq!(extended.extend_with_point(&Vector3::new(2.0, -1.0, 0.5)), extended);
    }

    #[test]
    fn test_height_range_and_extent() {
        let bounds = AABB::from_points(&[
            Vector3::new(0.0, 0.0, -3.0),
            Vector3::new(1.0, 2.0, 7.0),
            Vector3::new(0.5, 0.5, 0.5),
        ])
        .unwrap();
        assert_eq!(bounds.height_range(), (-3.0, 7.0));
        assert_eq!(bounds.extent(), Vector3::new(1.0, 2.0, 10.0));
    }
}
