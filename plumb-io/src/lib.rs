#![warn(clippy::all)]
//! Readers and writers for point cloud files.
//!
//! Points are plain `Vector3<f64>` positions. Currently ascii files (CSV, XYZ and similar text formats) are
//! supported through [ascii::AsciiReader] and [ascii::AsciiWriter]. [base::read_all] and [base::write_all] pick
//! the column delimiter from the file extension.

pub mod ascii;
pub mod base;
