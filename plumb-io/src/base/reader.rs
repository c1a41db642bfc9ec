use anyhow::Result;
use plumb_core::nalgebra::Vector3;

/// Base trait for all types that support reading point data
pub trait PointReader {
    /// Read up to `count` points from this `PointReader`. Returns fewer points if the source ends early.
    fn read(&mut self, count: usize) -> Result<Vec<Vector3<f64>>> {
        let mut points = vec![];
        self.read_into(&mut points, count)?;
        Ok(points)
    }
    /// Read up to `count` points from this `PointReader` and append them to `points`. On success, returns the
    /// number of points that were read.
    fn read_into(&mut self, points: &mut Vec<Vector3<f64>>, count: usize) -> Result<usize>;

    /// Total number of points in the source, if it is known without reading everything
    fn point_count(&self) -> Option<usize>;
}
