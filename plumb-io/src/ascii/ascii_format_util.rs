use anyhow::{bail, Result};
use itertools::Either;

/// Delimiter value that splits columns at any run of whitespace
pub const WHITESPACE: &str = " ";

// This enum maps the columns of an ascii file to the point data they hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PointDataType {
    Skip,
    CoordinateX,
    CoordinateY,
    CoordinateZ,
    ColorR, //U8
    ColorG, //U8
    ColorB, //U8
}

impl std::fmt::Display for PointDataType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl PointDataType {
    //s - skip this column
    //x - x coordinate
    //y - y coordinate
    //z - z coordinate
    //R - red channel of RGB color
    //G - green channel of RGB color
    //B - blue channel of RGB color
    pub(crate) fn get_parse_layout(format: &str) -> Result<Vec<PointDataType>> {
        let mut parse_layout = Vec::<PointDataType>::new();
        for character in format.chars() {
            match character {
                's' => parse_layout.push(PointDataType::Skip),
                'x' => parse_layout.push(PointDataType::CoordinateX),
                'y' => parse_layout.push(PointDataType::CoordinateY),
                'z' => parse_layout.push(PointDataType::CoordinateZ),
                'R' => parse_layout.push(PointDataType::ColorR),
                'G' => parse_layout.push(PointDataType::ColorG),
                'B' => parse_layout.push(PointDataType::ColorB),
                _ => {
                    bail!(
                        "FormatError can't interpret format literal '{}' in format string '{}'.",
                        character,
                        format
                    );
                }
            }
        }
        Ok(parse_layout)
    }

    pub(crate) fn literal(&self) -> char {
        match self {
            PointDataType::Skip => 's',
            PointDataType::CoordinateX => 'x',
            PointDataType::CoordinateY => 'y',
            PointDataType::CoordinateZ => 'z',
            PointDataType::ColorR => 'R',
            PointDataType::ColorG => 'G',
            PointDataType::ColorB => 'B',
        }
    }
}

/// Splits `line` into its columns. A blank delimiter splits at whitespace, any other delimiter is matched exactly
/// and the columns are trimmed.
pub(crate) fn split_columns<'a>(
    line: &'a str,
    delimiter: &'a str,
) -> impl Iterator<Item = &'a str> + 'a {
    if delimiter.trim().is_empty() {
        Either::Left(line.split_whitespace())
    } else {
        Either::Right(line.split(delimiter).map(str::trim))
    }
}

pub(crate) fn generate_parse_error(datatype: &PointDataType) -> String {
    format!(
        "ParseError at parsing {} for format literal '{}'.",
        datatype,
        datatype.literal()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_layout() -> Result<()> {
        assert_eq!(
            PointDataType::get_parse_layout("sxyzRGB")?,
            vec![
                PointDataType::Skip,
                PointDataType::CoordinateX,
                PointDataType::CoordinateY,
                PointDataType::CoordinateZ,
                PointDataType::ColorR,
                PointDataType::ColorG,
                PointDataType::ColorB,
            ]
        );
        Ok(())
    }

    #[test]
    #[should_panic(expected = "FormatError can't interpret format literal")]
    fn test_error_format_unrecognized_literal() {
        PointDataType::get_parse_layout("xyzQ").unwrap();
    }

    #[test]
    fn test_split_columns() {
        let columns = split_columns("1.0, 2.5 ,-3", ",").collect::<Vec<_>>();
        assert_eq!(columns, vec!["1.0", "2.5", "-3"]);

        let columns = split_columns("  1.0\t2.5   -3 ", WHITESPACE).collect::<Vec<_>>();
        assert_eq!(columns, vec!["1.0", "2.5", "-3"]);

        let columns = split_columns("1;;2", ";").collect::<Vec<_>>();
        assert_eq!(columns, vec!["1", "", "2"]);
    }
}
