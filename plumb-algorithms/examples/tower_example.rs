use plumb_algorithms::{
    ransac::RansacEngine,
    sampler::PrimitiveSampler,
    tower::{reconstruct, TowerParams},
};
use plumb_core::nalgebra::Vector3;
use rand::Rng;
use rayon::iter::{IntoParallelIterator, ParallelIterator};

fn main() -> () {
    //generate a scan of a pole that leans 2 degrees towards x, standing on flat ground
    let lean = 2.0_f64.to_radians().tan();
    let points: Vec<Vector3<f64>> = (0..20000)
        .into_par_iter()
        .map(|p| {
            let mut rng = rand::thread_rng();
            //ground points
            if p % 3 == 0 {
                return Vector3::new(
                    rng.gen_range(-10.0..10.0),
                    rng.gen_range(-10.0..10.0),
                    rng.gen_range(-0.02..0.02),
                );
            }
            //pole surface with radius 0.4
            let z = rng.gen_range(0.5..15.0);
            let angle = rng.gen_range(0.0..std::f64::consts::TAU);
            Vector3::new(
                lean * z + 0.4 * angle.cos(),
                0.4 * angle.sin(),
                z,
            )
        })
        .collect();
    println!("done generating pointcloud");

    let mut engine = RansacEngine::seeded(2024);
    let result = match reconstruct(&mut engine, &points, &TowerParams::default()) {
        Ok(result) => result,
        Err(why) => {
            println!("reconstruction failed: {}", why);
            return;
        }
    };
    println!(
        "{} ground points, {} structure points",
        result.ground.len(),
        result.structure.len()
    );
    println!("{} section circles", result.circles.len());
    println!("axis: {:?}", result.axis);
    println!("tilt angle: {:.3} degrees", result.tilt_degrees());

    if let Ok(axis_points) = result.axis_points(&PrimitiveSampler::default(), 500) {
        println!("sampled {} points along the axis", axis_points.len());
    }
}
