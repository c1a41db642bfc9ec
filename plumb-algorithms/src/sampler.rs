use std::f64::consts::PI;

use plumb_core::{
    geometry::{intersect_line_plane, Circle, GeometryError, Line, Plane},
    nalgebra::Vector3,
};

/// Default vertical padding that [PrimitiveSampler::sample_line] adds below and above the requested height range
pub const DEFAULT_LINE_PADDING: f64 = 30.0;

/// Generates point sets along fitted primitives, mostly for visualizing fit results next to the input points
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PrimitiveSampler {
    /// How far the sampled line extends below the minimum and above the maximum height
    pub padding: f64,
}

impl Default for PrimitiveSampler {
    fn default() -> Self {
        Self {
            padding: DEFAULT_LINE_PADDING,
        }
    }
}

impl PrimitiveSampler {
    pub fn with_padding(padding: f64) -> Self {
        Self { padding }
    }

    /// Returns `count` points evenly spaced on `circle` at the given height. The `i`-th point sits at the angle
    /// `2π * i / count`, starting on the positive x-side of the center.
    ///
    /// ```
    /// # use plumb_algorithms::sampler::PrimitiveSampler;
    /// # use plumb_core::geometry::Circle;
    /// # use plumb_core::nalgebra::Vector2;
    /// let circle = Circle::new(Vector2::new(1.0, 1.0), 2.0);
    /// let points = PrimitiveSampler::default().sample_circle(&circle, 4.0, 8);
    /// assert_eq!(points.len(), 8);
    /// assert!(points.iter().all(|p| p.z == 4.0));
    /// ```
    pub fn sample_circle(&self, circle: &Circle, height: f64, count: usize) -> Vec<Vector3<f64>> {
        let center = circle.center();
        (0..count)
            .map(|i| {
                let angle = 2.0 * PI * (i as f64) / (count as f64);
                Vector3::new(
                    center.x + circle.radius() * angle.cos(),
                    center.y + circle.radius() * angle.sin(),
                    height,
                )
            })
            .collect()
    }

    /// Samples `line` between the horizontal planes at `z_min - padding` and `z_max + padding`. Points are spaced
    /// `(z_max - z_min) / count` apart along the line, starting at the lower crossing; point `i` is emitted while
    /// `z_min - padding + i * step` stays below the height of the upper crossing.
    ///
    /// Returns an empty set if `count` is zero or `z_max <= z_min`, and
    /// [ParallelLinePlane](GeometryError::ParallelLinePlane) if the line is horizontal.
    pub fn sample_line(
        &self,
        line: &Line,
        z_min: f64,
        z_max: f64,
        count: usize,
    ) -> Result<Vec<Vector3<f64>>, GeometryError> {
        if count == 0 || !(z_max > z_min) {
            return Ok(vec![]);
        }
        let lower_z = z_min - self.padding;
        let lower = intersect_line_plane(line, &Plane::horizontal(lower_z))?;
        let upper = intersect_line_plane(line, &Plane::horizontal(z_max + self.padding))?;
        let direction = (upper - lower).normalize();
        let step = (z_max - z_min) / (count as f64);

        let mut points = vec![];
        let mut index = 0_usize;
        while lower_z + (index as f64) * step < upper.z {
            points.push(lower + direction * ((index as f64) * step));
            index += 1;
        }
        Ok(points)
    }
}
