use std::{path::PathBuf, time::Instant};

use anyhow::{Context, Result};
use clap::{App, Arg};
use plumb_core::math::AABB;
use plumb_io::base::read_all;

struct Args {
    pub input_file: PathBuf,
}

fn get_args() -> Result<Args> {
    let matches = App::new("plumb info")
        .version("0.1")
        .author("plumb contributors")
        .about("Prints the number of points and the bounding box of the given point cloud file")
        .arg(
            Arg::with_name("INPUT")
                .short("i")
                .long("input")
                .takes_value(true)
                .value_name("INPUT")
                .help("Input point cloud file (.csv, .txt, .xyz or .pts)")
                .required(true),
        )
        .get_matches();

    let input_file = PathBuf::from(matches.value_of("INPUT").context("No input file given")?);

    Ok(Args { input_file })
}

fn main() -> Result<()> {
    pretty_env_logger::init();
    let args = get_args()?;

    let t_start = Instant::now();
    let points = read_all(&args.input_file)?;
    println!("plumb info report for {}", args.input_file.display());
    println!("\tPoints:                 {}", points.len());

    if let Some(bounds) = AABB::from_points(&points) {
        let (min, max, extent) = (bounds.min(), bounds.max(), bounds.extent());
        println!("\tX:                      {}  {}", min.x, max.x);
        println!("\tY:                      {}  {}", min.y, max.y);
        println!("\tZ:                      {}  {}", min.z, max.z);
        println!(
            "\tExtent:                 {}  {}  {}",
            extent.x, extent.y, extent.z
        );
    }
    log::info!("Took {:.2}s", t_start.elapsed().as_secs_f64());

    Ok(())
}
