use anyhow::Result;
use plumb_core::nalgebra::Vector3;

/// Base trait for all types that support writing point data
pub trait PointWriter {
    /// Write the given points to the associated `PointWriter`.
    fn write(&mut self, points: &[Vector3<f64>]) -> Result<()>;
    /// Flush this `PointWriter`, ensuring that all points are written to their destination
    fn flush(&mut self) -> Result<()>;
}
