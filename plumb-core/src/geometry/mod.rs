mod error;
pub use self::error::*;

mod plane;
pub use self::plane::*;

mod line;
pub use self::line::*;

mod circle;
pub use self::circle::*;

mod vector;
pub use self::vector::*;

/// Tolerance below which a determinant, cross product or dot product is considered zero when constructing or
/// intersecting primitives
pub const EPSILON: f64 = 1.0e-8;
