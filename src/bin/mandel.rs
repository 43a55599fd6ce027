extern crate clap;
extern crate env_logger;
extern crate image;
extern crate mandelcalc;
extern crate num;
extern crate num_cpus;

use clap::{App, Arg, ArgMatches};
use failure::Error;
use image::pnm::PNMEncoder;
use image::pnm::{PNMSubtype, SampleEncoding};
use image::ColorType;
use log::info;
use mandelcalc::{
    BatchCalculator, BlockSizes, LineCalculator, MandelCalculator, NaiveCalculator, ThreadedCalculator,
    Viewport,
};
use num::Complex;
use std::fmt::Display;
use std::fs::File;
use std::ops::RangeInclusive;
use std::path::Path;
use std::str::FromStr;
use std::time::Instant;

/// Splits "left<sep>right" and parses both sides.
fn parse_pair<T: FromStr>(s: &str, separator: char) -> Option<(T, T)> {
    let (left, right) = s.split_once(separator)?;
    Some((left.trim().parse().ok()?, right.trim().parse().ok()?))
}

/// "re,im" as a point on the complex plane.
fn parse_complex(s: &str) -> Option<Complex<f64>> {
    parse_pair(s, ',').map(|(re, im)| Complex::new(re, im))
}

fn complex_validator(what: &'static str) -> impl Fn(String) -> Result<(), String> {
    move |s| match parse_complex(&s) {
        Some(_) => Ok(()),
        None => Err(format!("Could not parse {} corner, expected RE,IM", what)),
    }
}

fn range_validator<T>(
    what: &'static str,
    range: RangeInclusive<T>,
) -> impl Fn(String) -> Result<(), String>
where
    T: FromStr + PartialOrd + Display,
{
    move |s| match s.parse::<T>() {
        Ok(n) if range.contains(&n) => Ok(()),
        Ok(_) => Err(format!(
            "{} must be between {} and {}",
            what,
            range.start(),
            range.end()
        )),
        Err(_) => Err(format!("Could not parse {}", what.to_lowercase())),
    }
}

const OUTPUT: &str = "output";
const SIZE: &str = "size";
const ITERATIONS: &str = "iterations";
const CALCULATOR: &str = "calculator";
const THREADS: &str = "threads";
const LEFTLOWER: &str = "leftlower";
const RIGHTUPPER: &str = "rightupper";

const CALCULATORS: &[&str] = &["line", "batch", "naive", "threaded"];

fn args<'a>() -> ArgMatches<'a> {
    let max_threads = num_cpus::get();

    App::new("mandel")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Mandelbrot escape-time renderer")
        .arg(
            Arg::with_name(OUTPUT)
                .required(true)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .help("Output file (binary PGM)"),
        )
        .arg(
            Arg::with_name(SIZE)
                .required(false)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("1024")
                .validator(range_validator("Image size", 1usize..=16384))
                .help("Width and height of the output image"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .required(false)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("100")
                .validator(range_validator("Iteration count", 1u32..=1_000_000))
                .help("Iteration limit per pixel"),
        )
        .arg(
            Arg::with_name(CALCULATOR)
                .required(false)
                .long(CALCULATOR)
                .short("c")
                .takes_value(true)
                .possible_values(CALCULATORS)
                .default_value("line")
                .help("Calculator implementation"),
        )
        .arg(
            Arg::with_name(THREADS)
                .required(false)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .validator(range_validator("Thread count", 1usize..=max_threads))
                .help("Number of threads for the threaded calculator (default: one per CPU)"),
        )
        .arg(
            Arg::with_name(LEFTLOWER)
                .required(false)
                .long(LEFTLOWER)
                .short("l")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("-2.0,-1.5")
                .validator(complex_validator("left lower"))
                .help("Left lower corner of the complex region"),
        )
        .arg(
            Arg::with_name(RIGHTUPPER)
                .required(false)
                .long(RIGHTUPPER)
                .short("r")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("1.0,1.5")
                .validator(complex_validator("right upper"))
                .help("Right upper corner of the complex region"),
        )
        .get_matches()
}

fn build(
    name: &str,
    size: usize,
    limit: u32,
    viewport: Viewport,
    threads: usize,
) -> Result<Box<dyn MandelCalculator>, Error> {
    if name == "batch" && !BlockSizes::default().tiles(size) {
        return Err(failure::format_err!(
            "The batch calculator needs a size divisible by {}",
            BlockSizes::default().outer()
        ));
    }

    let calculator: Box<dyn MandelCalculator> = match name {
        "batch" => Box::new(BatchCalculator::with_viewport(size, limit, viewport)?),
        "naive" => Box::new(NaiveCalculator::with_viewport(size, limit, viewport)?),
        "threaded" => Box::new(ThreadedCalculator::with_viewport(
            size, limit, viewport, threads,
        )?),
        _ => Box::new(LineCalculator::with_viewport(size, limit, viewport)?),
    };
    Ok(calculator)
}

/// Scales counts into 0..=255 so the limit renders white.
fn grayscale(raw: &[u32], limit: u32) -> Vec<u8> {
    raw.iter()
        .map(|count| ((u64::from(*count) * 255) / u64::from(limit.max(1))) as u8)
        .collect()
}

fn write_image(outfile: &str, pixels: &[u8], bounds: (usize, usize)) -> Result<(), Error> {
    let path = Path::new(outfile);
    let output = File::create(&path)?;
    let mut encoder =
        PNMEncoder::new(output).with_subtype(PNMSubtype::Graymap(SampleEncoding::Binary));
    encoder.encode(pixels, bounds.0 as u32, bounds.1 as u32, ColorType::Gray(8))?;
    Ok(())
}

fn run(matches: &ArgMatches) -> Result<(), Error> {
    let size = usize::from_str(matches.value_of(SIZE).unwrap_or("1024"))?;
    let limit = u32::from_str(matches.value_of(ITERATIONS).unwrap_or("100"))?;
    let threads = match matches.value_of(THREADS) {
        Some(t) => usize::from_str(t)?,
        None => num_cpus::get(),
    };
    let leftlower = parse_complex(matches.value_of(LEFTLOWER).unwrap_or_default())
        .ok_or_else(|| failure::err_msg("Error parsing left lower point"))?;
    let rightupper = parse_complex(matches.value_of(RIGHTUPPER).unwrap_or_default())
        .ok_or_else(|| failure::err_msg("Error parsing right upper point"))?;
    let viewport = Viewport::fit(size, size, leftlower, rightupper)?;

    let mut calculator = build(
        matches.value_of(CALCULATOR).unwrap_or("line"),
        size,
        limit,
        viewport,
        threads,
    )?;

    let started = Instant::now();
    let name = calculator.name();
    let raw = calculator.calculate();
    info!("{} finished {}x{} in {:?}", name, size, size, started.elapsed());

    let output = matches.value_of(OUTPUT).unwrap_or_default();
    write_image(output, &grayscale(raw, limit), (size, size))?;
    info!("wrote {}", output);
    Ok(())
}

fn main() {
    env_logger::init();
    let matches = args();
    if let Err(e) = run(&matches) {
        eprintln!("Render failure: {}", e);
        std::process::exit(1);
    }
}
