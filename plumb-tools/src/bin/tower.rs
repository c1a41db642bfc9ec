use std::{
    fs::{self, File},
    io::BufReader,
    path::{Path, PathBuf},
    str::FromStr,
    time::Instant,
};

use anyhow::{bail, Context, Result};
use clap::{App, Arg, ArgMatches};
use log::{info, warn};
use plumb_algorithms::{
    ransac::{RansacEngine, DEFAULT_WORKERS},
    sampler::PrimitiveSampler,
    tower::{reconstruct, TowerParams},
};
use plumb_core::nalgebra::Vector3;
use plumb_io::base::{read_all, write_all_with_color};

struct Args {
    pub input_file: PathBuf,
    pub output_dir: PathBuf,
    pub config_file: Option<PathBuf>,
    pub seed: Option<u64>,
    pub interval: Option<f64>,
    pub epsilon: Option<f64>,
    pub workers: usize,
    pub axis_samples: usize,
    pub circle_samples: usize,
    pub transform: bool,
    pub circles: bool,
}

fn parse_value<T: FromStr>(matches: &ArgMatches, name: &str) -> Result<Option<T>>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    matches
        .value_of(name)
        .map(|value| {
            value
                .parse::<T>()
                .with_context(|| format!("Invalid value '{}' for {}", value, name))
        })
        .transpose()
}

fn get_args() -> Result<Args> {
    let matches = App::new("plumb tower")
        .version("0.1")
        .author("plumb contributors")
        .about("Separates the ground from a scanned tower, fits circles to its sections and reports the tilt of its axis")
        .arg(
            Arg::with_name("INPUT")
                .short("i")
                .long("input")
                .takes_value(true)
                .value_name("INPUT")
                .help("Input point cloud file (.csv, .txt, .xyz or .pts)")
                .required(true),
        )
        .arg(
            Arg::with_name("OUTPUT")
                .short("o")
                .long("output")
                .takes_value(true)
                .value_name("OUTDIR")
                .help("Directory for the result point sets, created if it does not exist")
                .required(true),
        )
        .arg(
            Arg::with_name("CONFIG")
                .short("c")
                .long("config")
                .takes_value(true)
                .value_name("CONFIG")
                .help("JSON file with reconstruction parameters. Missing entries keep their defaults"),
        )
        .arg(
            Arg::with_name("SEED")
                .long("seed")
                .takes_value(true)
                .help("Seed for the random sampling. Runs with the same seed and one worker are reproducible"),
        )
        .arg(
            Arg::with_name("INTERVAL")
                .long("interval")
                .takes_value(true)
                .help("Height of one section band"),
        )
        .arg(
            Arg::with_name("EPSILON")
                .long("epsilon")
                .takes_value(true)
                .help("Inlier threshold for the circle and axis fits"),
        )
        .arg(
            Arg::with_name("WORKERS")
                .long("workers")
                .takes_value(true)
                .help("Number of parallel workers per consensus search"),
        )
        .arg(
            Arg::with_name("AXIS_SAMPLES")
                .long("axis-samples")
                .takes_value(true)
                .help("Number of steps along the axis in axis.csv (default 500)"),
        )
        .arg(
            Arg::with_name("CIRCLE_SAMPLES")
                .long("circle-samples")
                .takes_value(true)
                .help("Number of points per circle_<i>.csv (default 300)"),
        )
        .arg(
            Arg::with_name("TRANSFORM")
                .long("transform")
                .help("Also write the structure transformed into the frame of its axis to transformed.csv"),
        )
        .arg(
            Arg::with_name("CIRCLES")
                .long("circles")
                .help("Also write the fitted circle of every section to circle_<i>.csv"),
        )
        .get_matches();

    let input_file = PathBuf::from(matches.value_of("INPUT").context("No input file given")?);
    let output_dir = PathBuf::from(matches.value_of("OUTPUT").context("No output directory given")?);
    let workers = parse_value(&matches, "WORKERS")?.unwrap_or(DEFAULT_WORKERS);
    if workers == 0 {
        bail!("At least one worker is required");
    }

    Ok(Args {
        input_file,
        output_dir,
        config_file: matches.value_of("CONFIG").map(PathBuf::from),
        seed: parse_value(&matches, "SEED")?,
        interval: parse_value(&matches, "INTERVAL")?,
        epsilon: parse_value(&matches, "EPSILON")?,
        workers,
        axis_samples: parse_value(&matches, "AXIS_SAMPLES")?.unwrap_or(500),
        circle_samples: parse_value(&matches, "CIRCLE_SAMPLES")?.unwrap_or(300),
        transform: matches.is_present("TRANSFORM"),
        circles: matches.is_present("CIRCLES"),
    })
}

fn load_params(args: &Args) -> Result<TowerParams> {
    let mut params = match &args.config_file {
        Some(path) => {
            let file = BufReader::new(File::open(path).context(format!(
                "Could not open config file {}",
                path.display()
            ))?);
            serde_json::from_reader(file)
                .context(format!("Invalid config file {}", path.display()))?
        }
        None => TowerParams::default(),
    };
    if let Some(interval) = args.interval {
        if !(interval > 0.0 && interval.is_finite()) {
            bail!("The section interval must be a positive, finite number, got {}", interval);
        }
        params.section_interval = interval;
    }
    if let Some(epsilon) = args.epsilon {
        params.circle.epsilon = epsilon;
        params.axis.epsilon = epsilon;
    }
    Ok(params)
}

const GROUND_COLOR: [u8; 3] = [139, 90, 43];
const STRUCTURE_COLOR: [u8; 3] = [160, 160, 160];
const CENTER_COLOR: [u8; 3] = [220, 20, 20];
const AXIS_COLOR: [u8; 3] = [20, 60, 220];
const CIRCLE_COLOR: [u8; 3] = [20, 180, 60];

fn write_points(dir: &Path, name: &str, points: &[Vector3<f64>], color: [u8; 3]) -> Result<()> {
    let path = dir.join(name);
    write_all_with_color(points, &path, color)?;
    info!("wrote {} points to {}", points.len(), path.display());
    Ok(())
}

fn main() -> Result<()> {
    pretty_env_logger::init();
    let args = get_args()?;
    let params = load_params(&args)?;

    let t_start = Instant::now();
    let points = read_all(&args.input_file)?;
    info!(
        "read {} points from {} in {:.2}s",
        points.len(),
        args.input_file.display(),
        t_start.elapsed().as_secs_f64()
    );

    let engine = match args.seed {
        Some(seed) => RansacEngine::seeded(seed),
        None => RansacEngine::from_entropy(),
    };
    let mut engine = engine.with_workers(args.workers);

    let t_start = Instant::now();
    let result = reconstruct(&mut engine, &points, &params).context("Reconstruction failed")?;
    info!("reconstruction took {:.2}s", t_start.elapsed().as_secs_f64());

    fs::create_dir_all(&args.output_dir).context(format!(
        "Could not create output directory {}",
        args.output_dir.display()
    ))?;
    let out = args.output_dir.as_path();
    let sampler = PrimitiveSampler::default();

    write_points(out, "ground.csv", &result.ground, GROUND_COLOR)?;
    write_points(out, "structure.csv", &result.structure, STRUCTURE_COLOR)?;
    write_points(out, "centers.csv", &result.centers(), CENTER_COLOR)?;
    write_points(
        out,
        "axis.csv",
        &result.axis_points(&sampler, args.axis_samples)?,
        AXIS_COLOR,
    )?;

    if args.circles {
        for (index, section) in result.circles.iter().enumerate() {
            let circle_points =
                sampler.sample_circle(&section.circle, section.height, args.circle_samples);
            write_points(
                out,
                &format!("circle_{}.csv", index),
                &circle_points,
                CIRCLE_COLOR,
            )?;
        }
    }

    if args.transform {
        if let Some(transform) = &result.transform {
            info!("axis transform:{}", transform.matrix());
        }
        match result.transformed_structure() {
            Some(transformed) => {
                write_points(out, "transformed.csv", &transformed, STRUCTURE_COLOR)?
            }
            None => warn!("the axis is vertical, skipping transformed.csv"),
        }
    }

    println!("sections:   {}", result.circles.len());
    println!("axis point: {:?}", result.axis.point());
    println!("axis dir:   {:?}", result.axis.direction());
    println!("tilt angle: {:.4} degrees", result.tilt_degrees());

    Ok(())
}
