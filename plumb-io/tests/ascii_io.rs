use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use assert_approx_eq::assert_approx_eq;
use plumb_core::nalgebra::Vector3;
use plumb_io::{
    ascii::{AsciiFormat, AsciiReader, AsciiWriter, WHITESPACE},
    base::{read_all, write_all, write_all_with_color, PointReader, PointWriter},
};

fn temp_path(name: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!("plumb_io_{}_{}", std::process::id(), name));
    path
}

fn test_points() -> Vec<Vector3<f64>> {
    (0..25)
        .map(|i| {
            let t = f64::from(i);
            Vector3::new(t * 0.5 - 3.0, (t * 0.7).sin() * 10.0, t * t / 7.0)
        })
        .collect()
}

fn assert_points_eq(expected: &[Vector3<f64>], actual: &[Vector3<f64>]) {
    assert_eq!(expected.len(), actual.len());
    for (expected, actual) in expected.iter().zip(actual.iter()) {
        assert_approx_eq!(expected.x, actual.x, 1e-6);
        assert_approx_eq!(expected.y, actual.y, 1e-6);
        assert_approx_eq!(expected.z, actual.z, 1e-6);
    }
}

#[test]
fn write_and_read_csv() -> Result<()> {
    let path = temp_path("points.csv");
    let points = test_points();
    write_all(&points, &path)?;

    let content = fs::read_to_string(&path)?;
    let first_line = content.lines().next().unwrap();
    assert_eq!(first_line, "-3.000000,0.000000,0.000000,0,0,0");

    let read_back = read_all(&path)?;
    fs::remove_file(&path)?;
    assert_points_eq(&points, &read_back);
    Ok(())
}

#[test]
fn write_and_read_xyz() -> Result<()> {
    let path = temp_path("points.xyz");
    let points = test_points();
    write_all(&points, &path)?;

    let content = fs::read_to_string(&path)?;
    assert!(!content.contains(','));
    assert_eq!(content.lines().count(), points.len());

    let read_back = read_all(&path)?;
    fs::remove_file(&path)?;
    assert_points_eq(&points, &read_back);
    Ok(())
}

#[test]
fn colored_xyz_file() -> Result<()> {
    let path = temp_path("colored.xyz");
    let points = test_points();
    write_all_with_color(&points, &path, [200, 100, 0])?;

    let content = fs::read_to_string(&path)?;
    for line in content.lines() {
        let columns = line.split_whitespace().collect::<Vec<_>>();
        assert_eq!(columns.len(), 6);
        assert_eq!(columns[3..], ["200", "100", "0"]);
    }

    let read_back = read_all(&path)?;
    fs::remove_file(&path)?;
    assert_points_eq(&points, &read_back);
    Ok(())
}

#[test]
fn custom_format_round_trip() -> Result<()> {
    let path = temp_path("custom.txt");
    let points = test_points();
    {
        let mut writer = AsciiWriter::from_path(&path, "RzyxGB")?;
        writer.set_delimiter("\t");
        writer.set_precision(9);
        writer.set_color([10, 20, 30]);
        writer.write(&points)?;
        writer.flush()?;
    }

    let mut reader = AsciiReader::from_path(&path, "szyx", WHITESPACE)?;
    let read_back = reader.read(usize::MAX)?;
    fs::remove_file(&path)?;
    assert_points_eq(&points, &read_back);
    Ok(())
}

#[test]
fn unknown_extension_is_rejected() {
    let path = temp_path("points.las");
    assert!(write_all(&test_points(), &path).is_err());
    assert!(read_all(&path).is_err());
    assert!(!path.exists());
}

#[test]
fn missing_file_is_reported() {
    let path = temp_path("does_not_exist.csv");
    let error = read_all(&path).unwrap_err();
    assert!(format!("{}", error).contains("does_not_exist.csv"));
}
