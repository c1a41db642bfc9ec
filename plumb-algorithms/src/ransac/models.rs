use plumb_core::{
    geometry::{project_xy, Circle, GeometryError, Line, Plane},
    nalgebra::Vector3,
};

use super::ConsensusModel;

/// Default upper bound for the radius of fitted circles. Cross-sections of the structures plumb is built for are
/// small compared to the scan, so bigger circles are almost always spurious fits through unrelated points.
pub const DEFAULT_MAX_RADIUS: f64 = 25.0;

/// Fits a [Plane] through three sampled points
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaneModel;

impl ConsensusModel for PlaneModel {
    type Model = Plane;
    const SAMPLE_SIZE: usize = 3;

    fn from_sample(&self, sample: &[Vector3<f64>]) -> Result<Plane, GeometryError> {
        Plane::from_points(&sample[0], &sample[1], &sample[2])
    }

    fn distance(&self, plane: &Plane, point: &Vector3<f64>) -> f64 {
        plane.distance(point)
    }
}

/// Fits a [Circle] through three sampled points after projecting them onto the XY plane. Candidates with a radius
/// above `max_radius` are rejected.
///
/// Points are scored by their signed distance to the circle, so everything inside a candidate (negative distance)
/// counts as support. Set `absolute_residual` to score by `|distance|` instead, which only accepts points close to
/// the circle line.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CircleModel {
    pub max_radius: f64,
    pub absolute_residual: bool,
}

impl CircleModel {
    pub fn with_max_radius(max_radius: f64) -> Self {
        Self {
            max_radius,
            ..Default::default()
        }
    }

    /// Scores points by `|distance|` instead of the signed distance
    pub fn absolute(mut self) -> Self {
        self.absolute_residual = true;
        self
    }
}

impl Default for CircleModel {
    fn default() -> Self {
        Self {
            max_radius: DEFAULT_MAX_RADIUS,
            absolute_residual: false,
        }
    }
}

impl ConsensusModel for CircleModel {
    type Model = Circle;
    const SAMPLE_SIZE: usize = 3;

    fn from_sample(&self, sample: &[Vector3<f64>]) -> Result<Circle, GeometryError> {
        let circle = Circle::through_points(
            &project_xy(&sample[0]),
            &project_xy(&sample[1]),
            &project_xy(&sample[2]),
        )?;
        if circle.radius() > self.max_radius {
            return Err(GeometryError::RadiusTooLarge {
                radius: circle.radius(),
                max_radius: self.max_radius,
            });
        }
        Ok(circle)
    }

    fn distance(&self, circle: &Circle, point: &Vector3<f64>) -> f64 {
        let distance = circle.distance(&project_xy(point));
        if self.absolute_residual {
            distance.abs()
        } else {
            distance
        }
    }
}

/// Fits a [Line] through two sampled points
#[derive(Debug, Clone, Copy, Default)]
pub struct LineModel;

impl ConsensusModel for LineModel {
    type Model = Line;
    const SAMPLE_SIZE: usize = 2;

    fn from_sample(&self, sample: &[Vector3<f64>]) -> Result<Line, GeometryError> {
        Line::through_points(&sample[0], &sample[1])
    }

    fn distance(&self, line: &Line, point: &Vector3<f64>) -> f64 {
        line.distance(point)
    }
}
