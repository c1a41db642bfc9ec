use thiserror::Error;

/// Reasons why a primitive could not be constructed from, or intersected with, the given inputs. All of these
/// are local conditions: the consensus search discards the offending sample and carries on, other callers get the
/// error back and decide themselves.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("normal vector of a plane must be non-zero and finite, got {0:?}")]
    InvalidNormal([f64; 3]),
    #[error("direction vector of a line must be non-zero and finite, got {0:?}")]
    InvalidDirection([f64; 3]),
    #[error("circle radius must be a non-negative, finite number, got {0}")]
    InvalidRadius(f64),
    #[error("the two sample points coincide")]
    CoincidentPoints,
    #[error("the sample points are collinear")]
    CollinearPoints,
    #[error("circle radius {radius} exceeds the maximum radius {max_radius}")]
    RadiusTooLarge { radius: f64, max_radius: f64 },
    #[error("line and plane are parallel and have no intersection point")]
    ParallelLinePlane,
    #[error("transform matrix is singular and can't be inverted")]
    SingularMatrix,
}
