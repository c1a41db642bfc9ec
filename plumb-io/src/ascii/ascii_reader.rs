use anyhow::{bail, Context, Result};
use itertools::{EitherOrBoth::*, Itertools};
use plumb_core::nalgebra::Vector3;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::{generate_parse_error, split_columns, PointDataType};
use crate::base::PointReader;

/// `PointReader` implementation for ascii files
pub struct AsciiReader<T: BufRead> {
    reader: T,
    delimiter: String,
    parse_layout: Vec<PointDataType>,
    line_number: usize,
    line: String,
}

impl<T: BufRead> AsciiReader<T> {
    /// Creates a new `AsciiReader` that reads from `read`.
    /// The `format` string slice coordinates the interpretation of each column:
    /// - s → skip this column
    /// - x → x coordinate
    /// - y → y coordinate
    /// - z → z coordinate
    /// - R, G, B → color channels, ignored when reading
    ///
    /// Columns are separated by `delimiter`; pass [WHITESPACE](super::WHITESPACE) to split at any whitespace.
    /// Columns after the last format literal are ignored, blank lines are skipped.
    ///
    /// # Examples
    ///
    /// ```
    /// # use std::io::Cursor;
    /// # use plumb_io::{ascii::AsciiReader, base::PointReader};
    /// let data = "7,1.0,2.0,3.0\n8,4.0,5.0,6.0\n";
    /// let mut reader = AsciiReader::from_read(Cursor::new(data), "sxyz", ",").unwrap();
    /// let points = reader.read(10).unwrap();
    /// assert_eq!(points.len(), 2);
    /// assert_eq!(points[1].z, 6.0);
    /// ```
    ///
    /// # Errors
    ///
    /// If `format` contains unrecognized literals, or does not contain each of `x`, `y` and `z` exactly once, an
    /// error is returned.
    pub fn from_read(read: T, format: &str, delimiter: &str) -> Result<Self> {
        let parse_layout = PointDataType::get_parse_layout(format)?;
        for coordinate in &[
            PointDataType::CoordinateX,
            PointDataType::CoordinateY,
            PointDataType::CoordinateZ,
        ] {
            let occurrences = parse_layout
                .iter()
                .filter(|data_type| *data_type == coordinate)
                .count();
            if occurrences != 1 {
                bail!(
                    "FormatError format string '{}' must contain '{}' exactly once.",
                    format,
                    coordinate.literal()
                );
            }
        }

        Ok(Self {
            reader: read,
            delimiter: delimiter.to_string(),
            parse_layout,
            line_number: 0,
            line: String::new(),
        })
    }

    fn get_point(
        line: &str,
        delimiter: &str,
        parse_layout: &[PointDataType],
    ) -> Result<Vector3<f64>> {
        let mut position = Vector3::zeros();
        for pair in split_columns(line, delimiter).zip_longest(parse_layout) {
            match pair {
                Both(value_str, data_type) => match data_type {
                    PointDataType::CoordinateX => {
                        position.x = parse_coordinate(value_str)
                            .with_context(|| generate_parse_error(data_type))?;
                    }
                    PointDataType::CoordinateY => {
                        position.y = parse_coordinate(value_str)
                            .with_context(|| generate_parse_error(data_type))?;
                    }
                    PointDataType::CoordinateZ => {
                        position.z = parse_coordinate(value_str)
                            .with_context(|| generate_parse_error(data_type))?;
                    }
                    PointDataType::Skip
                    | PointDataType::ColorR
                    | PointDataType::ColorG
                    | PointDataType::ColorB => {}
                },
                Left(_) => continue,
                Right(_) => {
                    bail!("Input format string expected more items in the line. Found End-of-Line.")
                }
            }
        }
        Ok(position)
    }
}

impl AsciiReader<BufReader<File>> {
    /// Creates a new `AsciiReader` by opening the file at the given `path`. See [AsciiReader::from_read]
    pub fn from_path<P: AsRef<Path>>(path: P, format: &str, delimiter: &str) -> Result<Self> {
        let file = BufReader::new(File::open(path)?);
        Self::from_read(file, format, delimiter)
    }
}

impl<T: BufRead> PointReader for AsciiReader<T> {
    fn read_into(&mut self, points: &mut Vec<Vector3<f64>>, count: usize) -> Result<usize> {
        let mut num_read = 0;
        while num_read < count {
            self.line.clear();
            if self.reader.read_line(&mut self.line)? == 0 {
                break;
            }
            self.line_number += 1;
            let line = self.line.trim();
            if line.is_empty() {
                continue;
            }
            let point = Self::get_point(line, &self.delimiter, &self.parse_layout)
                .with_context(|| format!("Invalid point in line {}", self.line_number))?;
            points.push(point);
            num_read += 1;
        }
        Ok(num_read)
    }

    fn point_count(&self) -> Option<usize> {
        None
    }
}

fn parse_coordinate(value_str: &str) -> Result<f64> {
    value_str
        .parse::<f64>()
        .map_err(|_| anyhow::anyhow!("ParseError expected f64 found '{}'.", value_str))
}
