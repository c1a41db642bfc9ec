use anyhow::{bail, Context, Result};
use plumb_core::nalgebra::Vector3;
use std::path::Path;

mod reader;
pub use self::reader::*;

mod writer;
pub use self::writer::*;

use crate::ascii::{AsciiFormat, AsciiReader, AsciiWriter, WHITESPACE};

/// Returns the column delimiter for the ascii file at `path`, based on its extension. `csv` files are comma
/// separated, `txt`, `xyz` and `pts` files are whitespace separated. Other extensions are an error.
pub fn delimiter_for_path<P: AsRef<Path>>(path: P) -> Result<&'static str> {
    let extension = path
        .as_ref()
        .extension()
        .and_then(|extension| extension.to_str())
        .map(|extension| extension.to_ascii_lowercase());
    match extension.as_deref() {
        Some("csv") => Ok(","),
        Some("txt") | Some("xyz") | Some("pts") => Ok(WHITESPACE),
        Some(other) => bail!("Unsupported point cloud file extension '{}'", other),
        None => bail!(
            "Can't determine the file type of {}, it has no extension",
            path.as_ref().display()
        ),
    }
}

/// Try to read all points in the given point cloud file. The first three columns of every line are read as the
/// x, y and z coordinates, further columns are ignored. The delimiter is chosen by [delimiter_for_path].
pub fn read_all<P: AsRef<Path>>(path: P) -> Result<Vec<Vector3<f64>>> {
    let delimiter = delimiter_for_path(path.as_ref())?;
    let mut reader = AsciiReader::from_path(path.as_ref(), "xyz", delimiter).context(format!(
        "Could not create appropriate reader for point cloud file {}",
        path.as_ref().display()
    ))?;
    // ascii files don't know their point count, so this reads until the end of the file
    let num_points = reader.point_count().unwrap_or(usize::MAX);
    reader.read(num_points).context(format!(
        "Could not read point cloud file {}",
        path.as_ref().display()
    ))
}

/// Writes all `points` into the file at `path`. Rows are `x, y, z` followed by three constant color columns, with
/// the delimiter chosen by [delimiter_for_path]. The color is black, see [write_all_with_color].
pub fn write_all<P: AsRef<Path>>(points: &[Vector3<f64>], path: P) -> Result<()> {
    write_all_with_color(points, path, [0, 0, 0])
}

/// Same as [write_all], but fills the color columns with `color`
pub fn write_all_with_color<P: AsRef<Path>>(
    points: &[Vector3<f64>],
    path: P,
    color: [u8; 3],
) -> Result<()> {
    let delimiter = delimiter_for_path(path.as_ref())?;
    let mut writer = AsciiWriter::from_path(path.as_ref(), "xyzRGB").context(format!(
        "Could not create appropriate writer for point cloud file {}",
        path.as_ref().display()
    ))?;
    writer.set_delimiter(delimiter);
    writer.set_color(color);
    writer.write(points).context("Failed to write points")?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delimiter_for_path() -> Result<()> {
        assert_eq!(delimiter_for_path("scan.csv")?, ",");
        assert_eq!(delimiter_for_path("dir/scan.CSV")?, ",");
        assert_eq!(delimiter_for_path("scan.xyz")?, WHITESPACE);
        assert_eq!(delimiter_for_path("scan.txt")?, WHITESPACE);
        assert_eq!(delimiter_for_path("scan.pts")?, WHITESPACE);
        assert!(delimiter_for_path("scan.las").is_err());
        assert!(delimiter_for_path("scan").is_err());
        Ok(())
    }
}
