//! Reconstruction of a vertical structure (tower, pole, pylon) from a scan that also contains the ground.
//!
//! The pipeline strips horizontal ground planes, slices the remaining structure into height bands, fits a circle
//! to every band and fits the axis of the structure through the circle centers. The tilt of the structure is the
//! angle between that axis and the vertical.

use log::{debug, info, warn};
use plumb_core::{
    geometry::{angle_between, Circle, GeometryError, Line, Plane},
    math::AABB,
    nalgebra::Vector3,
};
use rand::Rng;
use thiserror::Error;

use crate::{
    ransac::{CircleModel, ConsensusModel, FitError, LineModel, PlaneModel, RansacEngine, RansacParams},
    sampler::PrimitiveSampler,
    section::{sections, BandBounds},
    transform::AxisTransform,
};

/// All tunables of [reconstruct]
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TowerParams {
    /// Consensus search for ground planes
    pub ground: RansacParams,
    /// Upper limit for the number of ground planes that are stripped
    pub max_ground_planes: usize,
    /// Height of one section band
    pub section_interval: f64,
    pub band_bounds: BandBounds,
    /// Bands with fewer points are not fitted
    pub min_section_points: usize,
    /// Consensus search for the circle of each band
    pub circle: RansacParams,
    /// Circles with a larger radius are rejected as degenerate
    pub max_radius: f64,
    /// Consensus search for the axis through the circle centers
    pub axis: RansacParams,
}

impl Default for TowerParams {
    fn default() -> Self {
        Self {
            ground: RansacParams::new(3000, 0.3),
            max_ground_planes: 10,
            section_interval: 0.1,
            band_bounds: BandBounds::default(),
            min_section_points: 10,
            circle: RansacParams::new(500, 0.05),
            max_radius: crate::ransac::DEFAULT_MAX_RADIUS,
            axis: RansacParams::new(500, 0.05),
        }
    }
}

/// Errors of [reconstruct]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReconstructionError {
    #[error("consensus search failed")]
    Fit(#[from] FitError),
    #[error("section interval must be a positive, finite number, got {0}")]
    InvalidInterval(f64),
    #[error("no points are left after removing the ground")]
    EmptyStructure,
    #[error("found {found} usable sections, at least {needed} are needed to fit an axis")]
    TooFewSections { found: usize, needed: usize },
}

/// The circle fitted to one section band
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SectionCircle {
    /// Lower boundary of the band
    pub height: f64,
    pub circle: Circle,
    pub inlier_count: usize,
    /// Number of points in the band
    pub point_count: usize,
}

impl SectionCircle {
    /// Center of the circle, placed at the height of its band
    pub fn center(&self) -> Vector3<f64> {
        self.circle.center_at(self.height)
    }
}

/// Result of [reconstruct]
#[derive(Debug, Clone)]
pub struct TowerReconstruction {
    /// The stripped ground planes, in the order they were found
    pub ground_planes: Vec<Plane>,
    /// Inliers of all ground planes
    pub ground: Vec<Vector3<f64>>,
    /// Everything that is not ground
    pub structure: Vec<Vector3<f64>>,
    /// Lowest and highest z-coordinate of the structure
    pub height_range: (f64, f64),
    pub circles: Vec<SectionCircle>,
    /// The axis of the structure, oriented upwards
    pub axis: Line,
    /// Number of circle centers within the axis threshold
    pub axis_inliers: usize,
    /// Angle between the axis and the vertical in radians
    pub tilt: f64,
    /// Moves the structure into the frame of its axis. `None` if the axis is exactly vertical
    pub transform: Option<AxisTransform>,
}

impl TowerReconstruction {
    pub fn tilt_degrees(&self) -> f64 {
        self.tilt.to_degrees()
    }

    /// Circle centers at the heights of their bands
    pub fn centers(&self) -> Vec<Vector3<f64>> {
        self.circles.iter().map(SectionCircle::center).collect()
    }

    /// Samples `count` points along the axis over the height range of the structure
    pub fn axis_points(
        &self,
        sampler: &PrimitiveSampler,
        count: usize,
    ) -> Result<Vec<Vector3<f64>>, GeometryError> {
        let (z_min, z_max) = self.height_range;
        sampler.sample_line(&self.axis, z_min, z_max, count)
    }

    /// The structure expressed in the frame of its axis, or `None` if the axis is vertical
    pub fn transformed_structure(&self) -> Option<Vec<Vector3<f64>>> {
        self.transform
            .as_ref()
            .map(|transform| transform.apply(&self.structure))
    }
}

/// Runs the whole reconstruction on `points`:
///
/// 1. Fit a plane; as long as it is horizontal, move its inliers to the ground and repeat on the rest
/// 2. Split the remaining structure into bands of `params.section_interval`
/// 3. Fit a circle to every band with at least `params.min_section_points` points
/// 4. Fit a line through the circle centers and measure its angle to the vertical
///
/// All consensus searches use [fit_par](RansacEngine::fit_par) of `engine`. Bands where no circle can be fitted
/// are skipped with a warning. A `section_interval` that is not positive and finite fails with
/// [InvalidInterval](ReconstructionError::InvalidInterval) before any fit runs.
pub fn reconstruct<R: Rng>(
    engine: &mut RansacEngine<R>,
    points: &[Vector3<f64>],
    params: &TowerParams,
) -> Result<TowerReconstruction, ReconstructionError> {
    if !(params.section_interval > 0.0 && params.section_interval.is_finite()) {
        return Err(ReconstructionError::InvalidInterval(params.section_interval));
    }
    let (ground_planes, ground, structure) = strip_ground(engine, points, params)?;
    let bounds = AABB::from_points(&structure).ok_or(ReconstructionError::EmptyStructure)?;
    let height_range = bounds.height_range();
    info!(
        "{} ground points in {} planes, {} structure points between z={:.3} and z={:.3}",
        ground.len(),
        ground_planes.len(),
        structure.len(),
        height_range.0,
        height_range.1
    );

    let circles = fit_sections(engine, &structure, height_range, params)?;
    if circles.len() < LineModel::SAMPLE_SIZE {
        return Err(ReconstructionError::TooFewSections {
            found: circles.len(),
            needed: LineModel::SAMPLE_SIZE,
        });
    }

    let centers = circles.iter().map(SectionCircle::center).collect::<Vec<_>>();
    let axis_fit = engine.fit_par(&LineModel, &centers, &params.axis)?;
    let axis = upwards(axis_fit.model);
    let tilt = angle_between(&Vector3::z(), axis.direction());
    info!(
        "axis through {:?} along {:?}, {} of {} centers, tilt {:.4} degrees",
        axis.point(),
        axis.direction(),
        axis_fit.inlier_count,
        centers.len(),
        tilt.to_degrees()
    );

    Ok(TowerReconstruction {
        ground_planes,
        ground,
        structure,
        height_range,
        circles,
        transform: AxisTransform::from_line(&axis),
        axis,
        axis_inliers: axis_fit.inlier_count,
        tilt,
    })
}

type GroundSplit = (Vec<Plane>, Vec<Vector3<f64>>, Vec<Vector3<f64>>);

fn strip_ground<R: Rng>(
    engine: &mut RansacEngine<R>,
    points: &[Vector3<f64>],
    params: &TowerParams,
) -> Result<GroundSplit, ReconstructionError> {
    let mut planes = vec![];
    let mut ground = vec![];
    let mut structure = points.to_vec();

    while planes.len() < params.max_ground_planes && structure.len() >= PlaneModel::SAMPLE_SIZE {
        let fit = match engine.fit_par(&PlaneModel, &structure, &params.ground) {
            Ok(fit) => fit,
            Err(FitError::NoModel { .. }) => break,
            Err(why) => return Err(why.into()),
        };
        if !fit.model.is_horizontal() {
            debug!(
                "plane with normal {:?} is not horizontal, ground is done",
                fit.model.unit_normal()
            );
            break;
        }
        info!(
            "ground plane {}: {} points, normal {:?}",
            planes.len(),
            fit.inlier_count,
            fit.model.unit_normal()
        );
        ground.extend(fit.inlier_points(&structure));
        structure = fit.outlier_points(&structure);
        planes.push(fit.model);
    }

    Ok((planes, ground, structure))
}

fn fit_sections<R: Rng>(
    engine: &mut RansacEngine<R>,
    structure: &[Vector3<f64>],
    (z_min, z_max): (f64, f64),
    params: &TowerParams,
) -> Result<Vec<SectionCircle>, ReconstructionError> {
    let model = CircleModel::with_max_radius(params.max_radius);
    let bands = sections(
        structure,
        params.section_interval,
        z_min,
        z_max,
        params.band_bounds,
    );
    let band_count = bands.len();

    let mut circles = vec![];
    for band in bands {
        if band.points.len() < params.min_section_points {
            debug!(
                "section at z={:.3} has only {} points, skipping",
                band.height,
                band.points.len()
            );
            continue;
        }
        let fit = match engine.fit_par(&model, &band.points, &params.circle) {
            Ok(fit) => fit,
            Err(why @ FitError::NoModel { .. }) | Err(why @ FitError::InsufficientPoints { .. }) => {
                warn!("no circle in section at z={:.3}: {}", band.height, why);
                continue;
            }
            Err(why) => return Err(why.into()),
        };
        circles.push(SectionCircle {
            height: band.height,
            circle: fit.model,
            inlier_count: fit.inlier_count,
            point_count: band.points.len(),
        });
    }

    info!("fitted circles to {} of {} sections", circles.len(), band_count);
    Ok(circles)
}

fn upwards(line: Line) -> Line {
    if line.direction().z >= 0.0 {
        return line;
    }
    Line::new(*line.point(), -line.direction()).unwrap_or(line)
}
