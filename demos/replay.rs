//! Replay recorded tag detections through the tracker.
//!
//! Usage:
//!     cargo run --example replay -- demos/data/sample_frames.json
//!     cargo run --example replay -- frames.json --config tracker.json --width 1280 --height 720
//!
//! Each frame in the input file is a list of detections. A detection carries
//! `id` and `center` plus either the four `corners` reported by the marker
//! detector or a precomputed `angle` in degrees. One `id,x,y,theta` line is
//! printed per filtered pose, the same line the robot link consumes.

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use serde::Deserialize;

use tagtrack_rs::{FrameSize, Measurement, Tracker, TrackerConfig};

#[derive(Debug, Parser)]
#[command(name = "replay", about = "Smooth recorded tag detections")]
struct Args {
    /// JSON file with a list of frames
    input: PathBuf,

    /// Optional tracker configuration (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Frame width in pixels, used to mirror x
    #[arg(long, default_value_t = 640)]
    width: u32,

    /// Frame height in pixels, used to mirror y
    #[arg(long, default_value_t = 480)]
    height: u32,

    /// Print poses as JSON instead of wire lines
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Deserialize)]
struct FrameData {
    detections: Vec<DetectionData>,
}

#[derive(Debug, Deserialize)]
struct DetectionData {
    id: i64,
    center: [f64; 2],
    #[serde(default)]
    corners: Option<[[f64; 2]; 4]>,
    #[serde(default)]
    angle: Option<f64>,
}

impl DetectionData {
    fn to_measurement(&self) -> tagtrack_rs::Result<Measurement> {
        match (&self.corners, self.angle) {
            (Some(corners), _) => Measurement::from_corners(self.id, self.center, corners),
            (None, Some(angle)) => Measurement::new(self.id, self.center, angle),
            (None, None) => Err(tagtrack_rs::Error::InvalidMeasurement(format!(
                "tag {}: needs either corners or angle",
                self.id
            ))),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => TrackerConfig::from_path(path)?,
        None => TrackerConfig::default(),
    };
    let mut tracker = Tracker::new(config)?;
    let frame_size = FrameSize::new(args.width, args.height);

    let content = fs::read_to_string(&args.input)?;
    let frames: Vec<FrameData> = serde_json::from_str(&content)?;
    log::info!("replaying {} frames from {:?}", frames.len(), args.input);

    for (index, frame) in frames.iter().enumerate() {
        let mut measurements = Vec::with_capacity(frame.detections.len());
        for detection in &frame.detections {
            match detection.to_measurement() {
                Ok(m) => measurements.push(m),
                Err(err) => log::warn!("frame {}: skipping detection: {}", index, err),
            }
        }

        for pose in tracker.update(&measurements) {
            if args.json {
                println!("{}", serde_json::to_string(&pose)?);
            } else {
                println!("{}", pose.to_wire(frame_size));
            }
        }
    }

    log::info!(
        "done after {} frames, {} tags still tracked",
        tracker.frame_count(),
        tracker.current_track_count()
    );
    Ok(())
}
