#![warn(clippy::all)]
//! Algorithms that fit geometric primitives to point clouds.
//!
//! plumb contains a random sample consensus engine for planes, circles and lines, together with the building blocks
//! that are needed to reconstruct the axis of a vertical structure from a scan.

// Random sample consensus search for planes, circles and lines, serial and in parallel. Returns the best model
// together with the inlier and outlier indices.
pub mod ransac;
// Point sets along fitted primitives, e.g. for visualizing a fitted circle or axis.
pub mod sampler;
// Splits a point cloud into horizontal bands of fixed height.
pub mod section;
// Reconstruction of the axis, sections and tilt of a tower-like structure.
pub mod tower;
// Homogeneous transform into the frame of an axis.
pub mod transform;
