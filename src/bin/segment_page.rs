//! Segment a cleaned page image into layout regions and text lines.
//!
//! Usage:
//!   cargo run --release --bin segment_page -- page.png --x-height 18
//!   cargo run --release --bin segment_page -- page.png --x-height 18 \
//!       --segments segments.json --output layout.json --labels labels.png
//!
//! Options:
//!   --x-height N         x-height of the body text in pixels (required)
//!   --half-resolution    process the page at half resolution
//!   --segments FILE      JSON array of separator segments
//!   --deskew             estimate the shear from vertical segments and undo it on
//!                        the segments only; the input image must already be deskewed
//!   --output FILE        write the layout JSON there instead of stdout
//!   --labels FILE        write the 16-bit line label image (PNG)

use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::time::Instant;

use image::imageops::{self, FilterType};
use layout_oxide::config::LayoutConfig;
use layout_oxide::export::write_json;
use layout_oxide::geometry::{deskew_segments, estimate_deskew_angle, Segment};
use layout_oxide::pipeline::PageSegmenter;

struct SegmentArgs {
    image: PathBuf,
    x_height: u32,
    half_resolution: bool,
    segments: Option<PathBuf>,
    deskew: bool,
    output: Option<PathBuf>,
    labels: Option<PathBuf>,
}

impl SegmentArgs {
    fn from_args() -> Result<Self, String> {
        let args: Vec<String> = std::env::args().collect();
        let mut image = None;
        let mut x_height = None;
        let mut half_resolution = false;
        let mut segments = None;
        let mut deskew = false;
        let mut output = None;
        let mut labels = None;

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--x-height" => {
                    i += 1;
                    let value = args.get(i).ok_or("--x-height expects a value")?;
                    x_height = Some(value.parse::<u32>().map_err(|e| format!("Invalid x-height {}: {}", value, e))?);
                },
                "--half-resolution" => half_resolution = true,
                "--deskew" => deskew = true,
                "--segments" => {
                    i += 1;
                    segments = Some(PathBuf::from(args.get(i).ok_or("--segments expects a file")?));
                },
                "--output" | "-o" => {
                    i += 1;
                    output = Some(PathBuf::from(args.get(i).ok_or("--output expects a file")?));
                },
                "--labels" => {
                    i += 1;
                    labels = Some(PathBuf::from(args.get(i).ok_or("--labels expects a file")?));
                },
                other if other.starts_with('-') => return Err(format!("Unknown option {}", other)),
                other => image = Some(PathBuf::from(other)),
            }
            i += 1;
        }

        Ok(Self {
            image: image.ok_or("Missing input image")?,
            x_height: x_height.ok_or("Missing --x-height")?,
            half_resolution,
            segments,
            deskew,
            output,
            labels,
        })
    }
}

fn load_segments(path: &Path) -> Result<Vec<Segment>, Box<dyn std::error::Error>> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

fn run(args: &SegmentArgs) -> Result<(), Box<dyn std::error::Error>> {
    let start = Instant::now();
    let mut page = image::open(&args.image)?.to_luma8();
    let (width, height) = page.dimensions();

    let mut segments = match &args.segments {
        Some(path) => load_segments(path)?,
        None => Vec::new(),
    };
    if args.deskew {
        let angle = estimate_deskew_angle(&segments, width, LayoutConfig::new(args.x_height, false).angle_tolerance);
        log::info!("Deskew angle: {:.2}", angle);
        deskew_segments(&mut segments, angle);
    }

    if args.half_resolution {
        page = imageops::resize(&page, width / 2, height / 2, FilterType::Triangle);
        for s in &mut segments {
            s.scale(0.5);
        }
    }

    let config = LayoutConfig::new(args.x_height, args.half_resolution);
    let mut layout = PageSegmenter::new(config).segment(&page, &segments)?;

    if args.half_resolution {
        layout.tree.scale(2.0);
        layout.labels = imageops::resize(&layout.labels, width, height, FilterType::Nearest);
    }

    match &args.output {
        Some(path) => write_json(&layout.tree, BufWriter::new(File::create(path)?))?,
        None => write_json(&layout.tree, io::stdout().lock())?,
    }
    if let Some(path) = &args.labels {
        layout.labels.save(path)?;
    }

    eprintln!(
        "{} regions, {} lines, {} basins in {:.2}s",
        layout.tree.len(),
        layout.line_count(),
        layout.label_count,
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

fn main() {
    env_logger::init();

    let args = match SegmentArgs::from_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Usage: segment_page <image> --x-height N [--half-resolution] [--segments FILE] [--deskew] [--output FILE] [--labels FILE]");
            eprintln!("  --deskew corrects the segments only; pass an already deskewed image");
            std::process::exit(2);
        },
    };

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
