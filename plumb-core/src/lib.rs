#![warn(clippy::all)]

//! Core geometric types for fitting primitives to point cloud data
//!
//! plumb works on plain in-memory point sequences (`&[Vector3<f64>]`). This crate provides the primitives that
//! the consensus search in `plumb-algorithms` fits to such sequences: [Plane](crate::geometry::Plane),
//! [Line](crate::geometry::Line) and [Circle](crate::geometry::Circle), their distance functions and a few vector
//! utilities. The [math](crate::math) module contains an axis-aligned bounding box for point sets.

pub extern crate nalgebra;

/// Planes, lines, circles and the distance and intersection functions between them and points
pub mod geometry;
/// Useful mathematical tools when working with point cloud data
pub mod math;
