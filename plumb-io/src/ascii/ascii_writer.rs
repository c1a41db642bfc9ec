use anyhow::{bail, Context, Result};
use plumb_core::nalgebra::Vector3;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::PointDataType;
use crate::base::PointWriter;

/// Formatting options of ascii writers
pub trait AsciiFormat {
    fn set_delimiter(&mut self, delimiter: &str);
    fn set_precision(&mut self, precision: usize);
}

/// `PointWriter` implementation for ascii files
pub struct AsciiWriter<T: Write> {
    writer: T,
    delimiter: String,
    precision: usize,
    color: [u8; 3],
    parse_layout: Vec<PointDataType>,
}

impl AsciiWriter<BufWriter<File>> {
    /// Creates a new `AsciiWriter` by opening the file at the given `path`.
    /// This functions just wraps a `BufWriter` around a `File` and uses [`AsciiWriter::from_write`].
    ///
    /// # Examples
    /// ```no_run
    /// use std::path::Path;
    /// use anyhow::Result;
    /// use plumb_io::ascii::AsciiWriter;
    /// fn main() -> Result<()> {
    ///     let path = Path::new("output.csv");
    ///     let writer = AsciiWriter::from_path(path, "xyzRGB")?;
    ///     Ok(())
    /// }
    /// ```
    ///
    /// # Errors
    ///
    /// If `path` cannot be created or overwritten, an error is returned.
    ///
    /// If `format` contains unrecognized literals, an error is returned.
    pub fn from_path<P: AsRef<Path>>(path: P, format: &str) -> Result<Self> {
        let file = BufWriter::new(File::create(path)?);
        Self::from_write(file, format)
    }
}

impl<T: Write> AsciiWriter<T> {
    /// Creates a new `AsciiWriter` from the given `write`.
    /// The `format` string slice coordinates the content of each column:
    /// - x → x coordinate
    /// - y → y coordinate
    /// - z → z coordinate
    /// - R → red channel of the constant color
    /// - G → green channel of the constant color
    /// - B → blue channel of the constant color
    ///
    /// Coordinates are written with 6 decimals and columns are separated by `,` unless configured otherwise
    /// through [AsciiFormat]. The color defaults to black.
    ///
    /// # Errors
    ///
    /// If `format` contains unrecognized literals or the skip literal `s`, an error is returned.
    pub fn from_write(write: T, format: &str) -> Result<Self> {
        let parse_layout = PointDataType::get_parse_layout(format)?;
        if parse_layout.contains(&PointDataType::Skip) {
            bail!(
                "FormatError format literal 's' in format string '{}' can't be written.",
                format
            );
        }
        Ok(Self {
            writer: write,
            delimiter: String::from(","),
            precision: 6,
            color: [0, 0, 0],
            parse_layout,
        })
    }

    /// Sets the constant color that is written to the `R`, `G` and `B` columns
    pub fn set_color(&mut self, color: [u8; 3]) {
        self.color = color;
    }

    /// Returns the wrapped writer. Call [flush](PointWriter::flush) first
    pub fn into_inner(self) -> T {
        self.writer
    }

    fn write_point(&mut self, point: &Vector3<f64>) -> Result<()> {
        for (index, data_type) in self.parse_layout.iter().enumerate() {
            if index > 0 {
                self.writer.write_all(self.delimiter.as_bytes())?;
            }
            match data_type {
                PointDataType::CoordinateX => {
                    write!(self.writer, "{:.*}", self.precision, point.x)?;
                }
                PointDataType::CoordinateY => {
                    write!(self.writer, "{:.*}", self.precision, point.y)?;
                }
                PointDataType::CoordinateZ => {
                    write!(self.writer, "{:.*}", self.precision, point.z)?;
                }
                PointDataType::ColorR => write!(self.writer, "{}", self.color[0])?,
                PointDataType::ColorG => write!(self.writer, "{}", self.color[1])?,
                PointDataType::ColorB => write!(self.writer, "{}", self.color[2])?,
                PointDataType::Skip => unreachable!("Skip is rejected by from_write"),
            }
        }
        self.writer.write_all(b"\n")?;
        Ok(())
    }
}

impl<T: Write> AsciiFormat for AsciiWriter<T> {
    fn set_delimiter(&mut self, delimiter: &str) {
        self.delimiter = String::from(delimiter);
    }
    fn set_precision(&mut self, precision: usize) {
        self.precision = precision;
    }
}

impl<T: Write> PointWriter for AsciiWriter<T> {
    fn write(&mut self, points: &[Vector3<f64>]) -> Result<()> {
        for point in points {
            self.write_point(point)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush().context("Flush failed")
    }
}
