use plumb_core::nalgebra::Vector3;

/// Which band boundaries a point may sit on to belong to that band
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BandBounds {
    /// `start <= z <= start + interval`. A point exactly on the boundary between two bands belongs to both
    Closed,
    /// `start <= z < start + interval`. Every point belongs to at most one band
    HalfOpen,
}

impl Default for BandBounds {
    fn default() -> Self {
        BandBounds::Closed
    }
}

impl BandBounds {
    fn contains(&self, start: f64, end: f64, z: f64) -> bool {
        match self {
            BandBounds::Closed => z >= start && z <= end,
            BandBounds::HalfOpen => z >= start && z < end,
        }
    }
}

/// The points of one horizontal band of a point cloud
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    /// Height of the lower boundary of the band
    pub height: f64,
    pub points: Vec<Vector3<f64>>,
}

/// Splits `points` into horizontal bands of height `interval`. The first band starts at `z_min`, the following ones
/// at `z_min + i * interval` for as long as the start does not exceed `z_max`. Every band is returned, including
/// empty ones, in order of increasing height. Which points on band boundaries are included is controlled by
/// `bounds`; with [BandBounds::Closed] a point that sits exactly on a shared boundary shows up in both bands.
///
/// # Panics
///
/// If `interval` is not a positive, finite number
///
/// # Examples
///
/// ```
/// # use plumb_core::nalgebra::Vector3;
/// # use plumb_algorithms::section::*;
/// let points = vec![
///     Vector3::new(0.0, 0.0, 0.2),
///     Vector3::new(0.0, 0.0, 0.5),
///     Vector3::new(0.0, 0.0, 0.9),
/// ];
/// let bands = sections(&points, 0.5, 0.0, 1.0, BandBounds::Closed);
/// assert_eq!(bands.len(), 3);
/// assert_eq!(bands[0].points.len(), 2);
/// assert_eq!(bands[1].points.len(), 2);
/// assert!(bands[2].points.is_empty());
/// ```
pub fn sections(
    points: &[Vector3<f64>],
    interval: f64,
    z_min: f64,
    z_max: f64,
    bounds: BandBounds,
) -> Vec<Section> {
    if !(interval > 0.0 && interval.is_finite()) {
        panic!(
            "Section interval must be a positive, finite number, got {}",
            interval
        );
    }

    let mut bands = vec![];
    let mut index = 0_u32;
    loop {
        let start = z_min + f64::from(index) * interval;
        if !(start <= z_max) {
            break;
        }
        let end = start + interval;
        let band_points = points
            .iter()
            .filter(|point| bounds.contains(start, end, point.z))
            .copied()
            .collect();
        bands.push(Section {
            height: start,
            points: band_points,
        });
        index += 1;
    }
    bands
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(heights: &[f64]) -> Vec<Vector3<f64>> {
        heights
            .iter()
            .enumerate()
            .map(|(i, z)| Vector3::new(i as f64, 0.0, *z))
            .collect()
    }

    fn membership(bands: &[Section], point: &Vector3<f64>) -> usize {
        bands
            .iter()
            .filter(|band| band.points.contains(point))
            .count()
    }

    #[test]
    fn test_every_point_lands_in_a_band() {
        let points = column(&[0.0, 0.1, 0.3, 0.25, 0.74, 0.99, 1.0, 1.5, 1.75, 2.0]);
        let bands = sections(&points, 0.25, 0.0, 2.0, BandBounds::Closed);
        assert_eq!(bands.len(), 9);
        for point in &points {
            assert!(membership(&bands, point) >= 1, "{:?} is in no band", point);
        }
    }

    #[test]
    fn test_boundary_points_are_in_two_bands() {
        let points = column(&[0.25, 0.5, 1.75, 0.3]);
        let bands = sections(&points, 0.25, 0.0, 2.0, BandBounds::Closed);
        assert_eq!(membership(&bands, &points[0]), 2);
        assert_eq!(membership(&bands, &points[1]), 2);
        assert_eq!(membership(&bands, &points[2]), 2);
        assert_eq!(membership(&bands, &points[3]), 1);
        assert!(bands[0].points.contains(&points[0]));
        assert!(bands[1].points.contains(&points[0]));
    }

    #[test]
    fn test_half_open_bands_do_not_overlap() {
        let points = column(&[0.0, 0.25, 0.5, 0.6, 1.0]);
        let bands = sections(&points, 0.25, 0.0, 1.0, BandBounds::HalfOpen);
        assert_eq!(bands.len(), 5);
        for point in &points {
            assert_eq!(membership(&bands, point), 1);
        }
        assert_eq!(bands[4].points, vec![points[4]]);
    }

    #[test]
    fn test_band_heights() {
        let bands = sections(&[], 0.5, -1.0, 1.0, BandBounds::Closed);
        let heights = bands.iter().map(|band| band.height).collect::<Vec<_>>();
        assert_eq!(heights, vec![-1.0, -0.5, 0.0, 0.5, 1.0]);
        assert!(bands.iter().all(|band| band.points.is_empty()));
    }

    #[test]
    fn test_inverted_range_has_no_bands() {
        let points = column(&[1.0]);
        assert!(sections(&points, 0.5, 2.0, 1.0, BandBounds::Closed).is_empty());
    }

    #[test]
    #[should_panic]
    fn test_zero_interval_panics() {
        sections(&column(&[1.0]), 0.0, 0.0, 1.0, BandBounds::Closed);
    }
}
