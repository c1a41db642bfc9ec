use std::fmt::Debug;

use log::{debug, trace};
use plumb_core::{geometry::GeometryError, nalgebra::Vector3};
use rand::{rngs::SmallRng, Rng, SeedableRng};
use rayon::prelude::*;
use thiserror::Error;

mod models;
pub use self::models::*;

mod shared_best;
use self::shared_best::SharedBest;

/// Number of workers that [RansacEngine::fit_par] splits the iteration budget over, unless configured otherwise
pub const DEFAULT_WORKERS: usize = 10;

/// A kind of primitive that can be fitted with the consensus search of [RansacEngine]. Implementors describe how
/// many points a minimal sample has, how to build a candidate from such a sample and how far a point is from a
/// candidate.
pub trait ConsensusModel: Sync {
    /// The fitted primitive
    type Model: Clone + Debug + Send;
    /// Number of points needed to build one candidate
    const SAMPLE_SIZE: usize;

    /// Builds a candidate from exactly `SAMPLE_SIZE` points. Samples are drawn with replacement, so `sample` can
    /// contain the same point more than once; such degenerate samples must be rejected with an error.
    fn from_sample(&self, sample: &[Vector3<f64>]) -> Result<Self::Model, GeometryError>;

    /// Distance between `point` and `model`. Points with a distance `<= epsilon` are inliers, which for a signed
    /// distance includes every point on the negative side
    fn distance(&self, model: &Self::Model, point: &Vector3<f64>) -> f64;
}

/// Parameters of a single consensus search
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RansacParams {
    /// Number of candidates to draw
    pub iterations: usize,
    /// Maximum distance from a candidate for a point to count as an inlier
    pub epsilon: f64,
}

impl RansacParams {
    pub fn new(iterations: usize, epsilon: f64) -> Self {
        Self {
            iterations,
            epsilon,
        }
    }

    fn validate(&self, sample_size: usize, num_points: usize) -> Result<(), FitError> {
        if num_points < sample_size {
            return Err(FitError::InsufficientPoints {
                needed: sample_size,
                got: num_points,
            });
        }
        if !(self.epsilon > 0.0 && self.epsilon.is_finite()) {
            return Err(FitError::InvalidEpsilon(self.epsilon));
        }
        Ok(())
    }
}

/// Errors of a consensus search
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    #[error("at least {needed} points are required to fit this model, got {got}")]
    InsufficientPoints { needed: usize, got: usize },
    #[error("inlier distance threshold must be a positive number, got {0}")]
    InvalidEpsilon(f64),
    /// Every one of the `iterations` samples was degenerate, so there is no model at all. This is different from a
    /// model with few inliers, which is returned as a regular [FitResult].
    #[error("none of the {iterations} samples produced a valid model")]
    NoModel { iterations: usize },
}

/// The outcome of a successful consensus search
#[derive(Debug, Clone)]
pub struct FitResult<M> {
    /// The candidate with the most inliers
    pub model: M,
    pub inlier_count: usize,
    /// Indices of all input points within `epsilon` of `model`, in input order
    pub inliers: Vec<usize>,
    /// Indices of all other input points, in input order
    pub outliers: Vec<usize>,
}

impl<M> FitResult<M> {
    /// Collects the inlier points from `points`, which must be the slice that was fitted
    pub fn inlier_points(&self, points: &[Vector3<f64>]) -> Vec<Vector3<f64>> {
        self.inliers.iter().map(|&index| points[index]).collect()
    }

    /// Collects the outlier points from `points`, which must be the slice that was fitted
    pub fn outlier_points(&self, points: &[Vector3<f64>]) -> Vec<Vector3<f64>> {
        self.outliers.iter().map(|&index| points[index]).collect()
    }
}

/// Random sample consensus search for planes, circles and lines (or any other [ConsensusModel]).
///
/// The engine owns its random number generator, which is seeded once at construction. Repeated fits with the same
/// engine therefore continue one random sequence instead of reseeding, and an engine created with
/// [seeded](RansacEngine::seeded) replays the same sequence of fits exactly (for [fit](RansacEngine::fit)).
///
/// # Examples
///
/// ```
/// # use plumb_core::nalgebra::Vector3;
/// # use plumb_algorithms::ransac::*;
/// let mut points = vec![];
/// // generate some inliers
/// for i in 0..200 {
///     points.push(Vector3::new(0.0, f64::from(i), f64::from(i * i)));
/// }
/// // generate an outlier
/// points.push(Vector3::new(9.0, 0.0, 0.0));
///
/// let mut engine = RansacEngine::seeded(42);
/// let result = engine
///     .fit(&PlaneModel, &points, &RansacParams::new(100, 0.5))
///     .unwrap();
/// assert_eq!(result.inlier_count, 200);
/// assert_eq!(result.outliers, vec![200]);
/// ```
pub struct RansacEngine<R = SmallRng> {
    rng: R,
    workers: usize,
}

impl RansacEngine<SmallRng> {
    /// Creates an engine whose random sequence is fully determined by `seed`
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(SmallRng::seed_from_u64(seed))
    }

    /// Creates an engine seeded from operating system entropy
    pub fn from_entropy() -> Self {
        Self::with_rng(SmallRng::from_entropy())
    }
}

impl<R: Rng> RansacEngine<R> {
    /// Creates an engine that draws its samples from `rng`
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            workers: DEFAULT_WORKERS,
        }
    }

    /// Sets the number of workers used by [fit_par](RansacEngine::fit_par)
    ///
    /// # Panics
    ///
    /// If `workers` is zero
    pub fn with_workers(mut self, workers: usize) -> Self {
        if workers == 0 {
            panic!("RansacEngine needs at least one worker");
        }
        self.workers = workers;
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Runs the consensus search for `model` over `points` on the calling thread. Draws `params.iterations`
    /// minimal samples, uniformly and with replacement, skips degenerate ones and keeps the candidate with the most
    /// inliers. Of several candidates with the same inlier count, the first one wins. The returned [FitResult]
    /// partitions all `points` against the winning model.
    ///
    /// # Errors
    ///
    /// [InsufficientPoints](FitError::InsufficientPoints) if `points` has fewer than `M::SAMPLE_SIZE` entries,
    /// [InvalidEpsilon](FitError::InvalidEpsilon) if `params.epsilon` is not positive. In both cases no sample is
    /// drawn. [NoModel](FitError::NoModel) if every sample was degenerate.
    pub fn fit<M: ConsensusModel>(
        &mut self,
        model: &M,
        points: &[Vector3<f64>],
        params: &RansacParams,
    ) -> Result<FitResult<M::Model>, FitError> {
        params.validate(M::SAMPLE_SIZE, points.len())?;

        let mut best: Option<(usize, M::Model)> = None;
        let mut sample = Vec::with_capacity(M::SAMPLE_SIZE);
        for iteration in 0..params.iterations {
            let candidate = match draw_candidate(model, points, &mut self.rng, &mut sample) {
                Ok(candidate) => candidate,
                Err(why) => {
                    trace!("iteration {}: skipping degenerate sample ({})", iteration, why);
                    continue;
                }
            };
            let score = count_inliers(model, &candidate, points, params.epsilon);
            let is_better = match &best {
                Some((best_score, _)) => score > *best_score,
                None => true,
            };
            if is_better {
                debug!(
                    "iteration {}: {} inliers, model: {:?}",
                    iteration, score, candidate
                );
                best = Some((score, candidate));
            }
        }

        let (_, best_model) = best.ok_or(FitError::NoModel {
            iterations: params.iterations,
        })?;
        Ok(partition(model, best_model, points, params.epsilon))
    }

    /// Parallel version of [fit](RansacEngine::fit). The iteration budget is split evenly over
    /// [workers](RansacEngine::workers) tasks on the rayon thread pool, each with its own random number generator
    /// seeded from the engine's one. Workers share the best model found so far; a worker replaces it whenever one
    /// of its candidates has strictly more inliers. Which of several equally good models is returned is not
    /// deterministic, the inlier count of the result is the maximum over all candidates.
    ///
    /// # Errors
    ///
    /// Same as [fit](RansacEngine::fit)
    pub fn fit_par<M: ConsensusModel>(
        &mut self,
        model: &M,
        points: &[Vector3<f64>],
        params: &RansacParams,
    ) -> Result<FitResult<M::Model>, FitError> {
        params.validate(M::SAMPLE_SIZE, points.len())?;

        let shares = split_iterations(params.iterations, self.workers);
        let seeds = shares.iter().map(|_| self.rng.gen()).collect::<Vec<u64>>();
        let shared_best = SharedBest::new();

        shares
            .into_par_iter()
            .zip(seeds.into_par_iter())
            .enumerate()
            .for_each(|(worker, (share, seed))| {
                let mut rng = SmallRng::seed_from_u64(seed);
                let mut sample = Vec::with_capacity(M::SAMPLE_SIZE);
                let mut local_best = None;
                for iteration in 0..share {
                    let candidate = match draw_candidate(model, points, &mut rng, &mut sample) {
                        Ok(candidate) => candidate,
                        Err(why) => {
                            trace!(
                                "worker {}, iteration {}: skipping degenerate sample ({})",
                                worker,
                                iteration,
                                why
                            );
                            continue;
                        }
                    };
                    let score = count_inliers(model, &candidate, points, params.epsilon);
                    if local_best.map_or(false, |best| score <= best) {
                        continue;
                    }
                    local_best = Some(score);
                    if shared_best.offer(score, candidate.clone()) {
                        debug!(
                            "worker {}, iteration {}: {} inliers, model: {:?}",
                            worker, iteration, score, candidate
                        );
                    }
                }
            });

        let (_, best_model) = shared_best.into_inner().ok_or(FitError::NoModel {
            iterations: params.iterations,
        })?;
        Ok(partition(model, best_model, points, params.epsilon))
    }
}

/// Draws a minimal sample into `sample` and builds a candidate from it. Always consumes exactly
/// `M::SAMPLE_SIZE` random indices, degenerate or not.
fn draw_candidate<M: ConsensusModel, R: Rng>(
    model: &M,
    points: &[Vector3<f64>],
    rng: &mut R,
    sample: &mut Vec<Vector3<f64>>,
) -> Result<M::Model, GeometryError> {
    sample.clear();
    for _ in 0..M::SAMPLE_SIZE {
        sample.push(points[rng.gen_range(0..points.len())]);
    }
    model.from_sample(sample)
}

fn is_inlier<M: ConsensusModel>(
    model: &M,
    candidate: &M::Model,
    point: &Vector3<f64>,
    epsilon: f64,
) -> bool {
    model.distance(candidate, point) <= epsilon
}

fn count_inliers<M: ConsensusModel>(
    model: &M,
    candidate: &M::Model,
    points: &[Vector3<f64>],
    epsilon: f64,
) -> usize {
    points
        .iter()
        .filter(|point| is_inlier(model, candidate, point, epsilon))
        .count()
}

fn partition<M: ConsensusModel>(
    model: &M,
    best_model: M::Model,
    points: &[Vector3<f64>],
    epsilon: f64,
) -> FitResult<M::Model> {
    let (inliers, outliers): (Vec<usize>, Vec<usize>) =
        (0..points.len()).partition(|&index| is_inlier(model, &best_model, &points[index], epsilon));
    FitResult {
        model: best_model,
        inlier_count: inliers.len(),
        inliers,
        outliers,
    }
}

/// Splits `iterations` into `workers` shares that differ by at most one and sum up to `iterations`
fn split_iterations(iterations: usize, workers: usize) -> Vec<usize> {
    let share = iterations / workers;
    let remainder = iterations % workers;
    (0..workers)
        .map(|worker| if worker < remainder { share + 1 } else { share })
        .collect()
}

#[cfg(test)]
mod tests {
    use plumb_core::geometry::{Line, Plane};
    use plumb_core::nalgebra::Vector2;
    use rand::RngCore;

    use super::*;

    fn setup_point_cloud() -> Vec<Vector3<f64>> {
        (2..2002)
            .map(|p| {
                // plane points (z = 1)
                let mut point = Vector3::new(p as f64, (p * p) as f64, 1.0);
                // points on the z-axis for the line
                if p % 5 == 0 {
                    point = Vector3::new(0.0, 0.0, (p * p) as f64);
                }
                point
            })
            .collect()
    }

    fn setup_circle_section() -> Vec<Vector3<f64>> {
        let center = Vector2::new(3.0, -1.0);
        let on_circle = (0..100).map(|i| {
            let angle = 2.0 * std::f64::consts::PI * f64::from(i) / 100.0;
            Vector3::new(
                center.x + 2.0 * angle.cos(),
                center.y + 2.0 * angle.sin(),
                f64::from(i) * 0.01,
            )
        });
        let inside = (0..20).map(|i| {
            let angle = 2.0 * std::f64::consts::PI * f64::from(i) / 20.0;
            Vector3::new(
                center.x + 0.5 * angle.cos(),
                center.y + 0.5 * angle.sin(),
                0.5,
            )
        });
        on_circle.chain(inside).collect()
    }

    /// Points near the plane `z = 0` with deterministic noise and a few points far above it
    fn setup_noisy_plane() -> Vec<Vector3<f64>> {
        (0..500)
            .map(|i| {
                let x = f64::from(i % 25);
                let y = f64::from(i / 25);
                let noise = 0.05 * (f64::from(i) * 1.7).sin();
                if i % 10 == 0 {
                    Vector3::new(x, y, 3.0 + noise * 20.0)
                } else {
                    Vector3::new(x, y, noise)
                }
            })
            .collect()
    }

    fn assert_plane_result(result: &FitResult<Plane>) {
        assert_eq!(result.inlier_count, 1600);
        assert_eq!(result.inliers.len(), 1600);
        assert_eq!(result.outliers.len(), 400);
        for i in 0..2000 {
            if i % 5 != 3 {
                assert!(result.inliers.contains(&i));
            } else {
                assert!(result.outliers.contains(&i));
            }
        }
        assert!(result.model.is_horizontal());
    }

    fn assert_line_result(result: &FitResult<Line>) {
        assert_eq!(result.inlier_count, 400);
        for i in 0..2000 {
            if i % 5 == 3 {
                assert!(result.inliers.contains(&i));
            }
        }
        assert!((result.model.direction().z.abs() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_ransac_plane_serial() {
        let points = setup_point_cloud();
        let result = RansacEngine::seeded(1)
            .fit(&PlaneModel, &points, &RansacParams::new(300, 0.1))
            .unwrap();
        assert_plane_result(&result);
    }

    #[test]
    fn test_ransac_plane_par() {
        let points = setup_point_cloud();
        let result = RansacEngine::seeded(2)
            .fit_par(&PlaneModel, &points, &RansacParams::new(300, 0.1))
            .unwrap();
        assert_plane_result(&result);
    }

    #[test]
    fn test_ransac_line_serial() {
        let points = setup_point_cloud();
        let result = RansacEngine::seeded(3)
            .fit(&LineModel, &points, &RansacParams::new(1000, 0.1))
            .unwrap();
        assert_line_result(&result);
    }

    #[test]
    fn test_ransac_line_par() {
        let points = setup_point_cloud();
        let result = RansacEngine::seeded(4)
            .fit_par(&LineModel, &points, &RansacParams::new(1000, 0.1))
            .unwrap();
        assert_line_result(&result);
    }

    #[test]
    fn test_ransac_circle_serial_and_par() {
        let points = setup_circle_section();
        let params = RansacParams::new(200, 0.01);
        let mut engine = RansacEngine::seeded(5);
        for result in vec![
            engine.fit(&CircleModel::default(), &points, &params).unwrap(),
            engine
                .fit_par(&CircleModel::default(), &points, &params)
                .unwrap(),
        ] {
            // the inner ring lies inside the circle and counts as support
            assert_eq!(result.inlier_count, 120);
            assert!(result.outliers.is_empty());
            assert!((result.model.center() - Vector2::new(3.0, -1.0)).norm() < 1e-6);
            assert!((result.model.radius() - 2.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_ransac_circle_absolute_residual() {
        let points = setup_circle_section();
        let params = RansacParams::new(200, 0.01);
        let model = CircleModel::default().absolute();
        let mut engine = RansacEngine::seeded(5);
        for result in vec![
            engine.fit(&model, &points, &params).unwrap(),
            engine.fit_par(&model, &points, &params).unwrap(),
        ] {
            assert_eq!(result.inlier_count, 100);
            assert_eq!(result.inliers, (0..100).collect::<Vec<_>>());
            assert_eq!(result.outliers, (100..120).collect::<Vec<_>>());
            assert!((result.model.radius() - 2.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_points_inside_circle_are_inliers() {
        let mut points = (0..12)
            .map(|i| {
                let angle = 2.0 * std::f64::consts::PI * f64::from(i) / 12.0;
                Vector3::new(angle.cos(), angle.sin(), 0.0)
            })
            .collect::<Vec<_>>();
        points.extend(vec![Vector3::new(0.0, 0.0, 0.0); 10]);

        let result = RansacEngine::seeded(13)
            .fit(&CircleModel::default(), &points, &RansacParams::new(500, 0.1))
            .unwrap();
        assert_eq!(result.inlier_count, 22);
        assert!(result.model.center().norm() < 1e-6);
        assert!((result.model.radius() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_inlier_and_outlier_points() {
        let points = setup_circle_section();
        let result = RansacEngine::seeded(6)
            .fit(
                &CircleModel::default().absolute(),
                &points,
                &RansacParams::new(200, 0.01),
            )
            .unwrap();
        assert_eq!(result.inlier_points(&points), points[..100].to_vec());
        assert_eq!(result.outlier_points(&points), points[100..].to_vec());
    }

    #[test]
    fn test_too_few_points_fail_before_sampling() {
        let points = vec![Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0)];
        let params = RansacParams::new(100, 0.1);
        let mut engine = RansacEngine::seeded(7);
        let expected = Err(FitError::InsufficientPoints { needed: 3, got: 2 });
        assert_eq!(engine.fit(&PlaneModel, &points, &params).map(|r| r.model), expected);
        assert_eq!(
            engine
                .fit_par(&CircleModel::default(), &points, &params)
                .map(|r| r.model),
            Err(FitError::InsufficientPoints { needed: 3, got: 2 })
        );
        assert_eq!(
            engine.fit(&LineModel, &points[..1], &params).map(|r| r.model),
            Err(FitError::InsufficientPoints { needed: 2, got: 1 })
        );
    }

    #[test]
    fn test_non_positive_epsilon_is_rejected() {
        let points = setup_point_cloud();
        let mut engine = RansacEngine::seeded(8);
        for epsilon in &[0.0, -1.0, f64::NAN] {
            let result = engine.fit(&LineModel, &points, &RansacParams::new(10, *epsilon));
            assert!(matches!(result, Err(FitError::InvalidEpsilon(_))));
        }
    }

    #[test]
    fn test_only_degenerate_samples_yield_no_model() {
        let same_point = vec![Vector3::new(1.0, 2.0, 3.0); 50];
        let collinear = (0..50)
            .map(|i| Vector3::new(f64::from(i), f64::from(i), 0.0))
            .collect::<Vec<_>>();
        let params = RansacParams::new(64, 0.1);
        let mut engine = RansacEngine::seeded(9);

        assert_eq!(
            engine.fit(&LineModel, &same_point, &params).map(|r| r.model),
            Err(FitError::NoModel { iterations: 64 })
        );
        assert_eq!(
            engine.fit_par(&PlaneModel, &collinear, &params).map(|r| r.model),
            Err(FitError::NoModel { iterations: 64 })
        );
        assert_eq!(
            engine
                .fit(&CircleModel::default(), &collinear, &params)
                .map(|r| r.model),
            Err(FitError::NoModel { iterations: 64 })
        );
    }

    #[test]
    fn test_zero_iterations_yield_no_model() {
        let points = setup_point_cloud();
        let result = RansacEngine::seeded(10).fit_par(&PlaneModel, &points, &RansacParams::new(0, 0.1));
        assert_eq!(
            result.map(|r| r.model),
            Err(FitError::NoModel { iterations: 0 })
        );
    }

    #[test]
    fn test_best_count_never_decreases_with_more_iterations() {
        let points = setup_noisy_plane();
        let mut previous = 0;
        for iterations in &[1, 2, 3, 5, 8, 13, 21, 34, 55, 89, 144] {
            let count = match RansacEngine::seeded(11).fit(
                &PlaneModel,
                &points,
                &RansacParams::new(*iterations, 0.02),
            ) {
                Ok(result) => result.inlier_count,
                Err(FitError::NoModel { .. }) => 0,
                Err(other) => panic!("Unexpected error {}", other),
            };
            assert!(
                count >= previous,
                "{} iterations found {} inliers, fewer iterations found {}",
                iterations,
                count,
                previous
            );
            previous = count;
        }
        assert!(previous > 0);
    }

    #[test]
    fn test_same_seed_replays_same_fit() {
        let points = setup_noisy_plane();
        let params = RansacParams::new(40, 0.02);
        let first = RansacEngine::seeded(12)
            .fit(&PlaneModel, &points, &params)
            .unwrap();
        let second = RansacEngine::seeded(12)
            .fit(&PlaneModel, &points, &params)
            .unwrap();
        assert_eq!(first.model, second.model);
        assert_eq!(first.inliers, second.inliers);
    }

    /// Replays a fixed list of sample indices into a point cloud of four points. Index `i` is encoded as
    /// `i << 62`, which `gen_range(0..4)` maps back to `i`.
    struct ScriptedIndices {
        indices: Vec<u64>,
        position: usize,
    }

    impl ScriptedIndices {
        fn new(indices: &[u64]) -> Self {
            Self {
                indices: indices.to_vec(),
                position: 0,
            }
        }
    }

    impl RngCore for ScriptedIndices {
        fn next_u32(&mut self) -> u32 {
            (self.next_u64() >> 32) as u32
        }

        fn next_u64(&mut self) -> u64 {
            let index = self.indices[self.position % self.indices.len()];
            self.position += 1;
            index << 62
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            for chunk in dest.chunks_mut(8) {
                let bytes = self.next_u64().to_le_bytes();
                chunk.copy_from_slice(&bytes[..chunk.len()]);
            }
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    #[test]
    fn test_first_of_equal_candidates_wins() {
        let points = vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
        ];
        let params = RansacParams::new(2, 0.1);

        // line through points 0 and 1, then line through points 0 and 2, both with two inliers
        let along_x = RansacEngine::with_rng(ScriptedIndices::new(&[0, 1, 0, 2]))
            .fit(&LineModel, &points, &params)
            .unwrap();
        assert_eq!(along_x.inliers, vec![0, 1]);
        assert!((along_x.model.direction().x.abs() - 1.0).abs() < 1e-12);

        let along_y = RansacEngine::with_rng(ScriptedIndices::new(&[0, 2, 0, 1]))
            .fit(&LineModel, &points, &params)
            .unwrap();
        assert_eq!(along_y.inliers, vec![0, 2]);
        assert!((along_y.model.direction().y.abs() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_split_iterations() {
        assert_eq!(split_iterations(10, 3), vec![4, 3, 3]);
        assert_eq!(split_iterations(2, 4), vec![1, 1, 0, 0]);
        assert_eq!(split_iterations(1000, 10), vec![100; 10]);
    }

    #[test]
    #[should_panic]
    fn test_zero_workers_panics() {
        let _ = RansacEngine::seeded(0).with_workers(0);
    }
}
