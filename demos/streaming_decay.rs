//! Streaming decay demo
//!
//! A simulated rotating scanner publishes frames from one thread while a
//! render loop ticks the pipeline and "draws" the buffer from another:
//! - frames carry intensity, packed RGB and normals
//! - old sweeps decay after `--decay` seconds
//! - the color source can be forced from the command line
//!
//! Run with: `cargo run --bin streaming_decay -- --decay 0.5 --source rgb`

use anyhow::Result;
use clap::{Parser, ValueEnum};
use decaycloud_core::{
    ColorSource, DisplayObserver, Point3f, PointCloudMessage, Property, RenderSink,
};
use decaycloud_display::{DisplayConfig, PointBuffer, PointCloudPipeline};
use log::info;
use rand::Rng;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(about = "Stream simulated scans through a decaying point cloud display")]
struct Args {
    /// Seconds each frame stays visible (0 keeps only the latest)
    #[arg(short, long, default_value_t = 0.5)]
    decay: f32,

    /// Force a color source instead of the catalog default
    #[arg(short, long, value_enum)]
    source: Option<Source>,

    /// Points per simulated frame
    #[arg(short, long, default_value_t = 2_000)]
    points: usize,

    /// Frames published per second
    #[arg(long, default_value_t = 20)]
    rate: u32,

    /// Demo length in seconds
    #[arg(long, default_value_t = 3)]
    seconds: u64,
}

#[derive(Copy, Clone, ValueEnum)]
enum Source {
    Intensity,
    Rgb,
    Normals,
    Curvature,
}

impl From<Source> for ColorSource {
    fn from(source: Source) -> Self {
        match source {
            Source::Intensity => ColorSource::Intensity,
            Source::Rgb => ColorSource::ColorRgb,
            Source::Normals => ColorSource::NormalSphere,
            Source::Curvature => ColorSource::Curvature,
        }
    }
}

struct LogObserver;

impl DisplayObserver for LogObserver {
    fn property_changed(&self, property: Property) {
        info!("Property changed: {:?}", property);
    }

    fn channels_changed(&self, sources: &[ColorSource]) {
        let labels: Vec<&str> = sources.iter().map(ColorSource::label).collect();
        log::debug!("Available color sources: {}", labels.join(", "));
    }
}

/// One sweep of a scanner rotating about z, `phase` in radians
fn simulate_sweep(rng: &mut impl Rng, phase: f32, count: usize, stamp: f64) -> PointCloudMessage {
    let mut points = Vec::with_capacity(count);
    let mut intensity = Vec::with_capacity(count);
    let mut rgb = Vec::with_capacity(count);
    let (mut nx, mut ny, mut nz) = (Vec::new(), Vec::new(), Vec::new());

    for i in 0..count {
        let angle = phase + i as f32 / count as f32 * 0.5;
        let range = 5.0 + rng.gen_range(-0.05f32..0.05);
        let height = rng.gen_range(-0.5f32..0.5);
        points.push(Point3f::new(angle.cos() * range, angle.sin() * range, height));

        // Occasional garbage returns above the auto-range cap
        let value: f32 = if rng.gen_bool(0.01) { 9000.0 } else { rng.gen_range(0.0..1000.0) };
        intensity.push(value);

        let r = (angle.cos() * 0.5 + 0.5) * 255.0;
        let b = (angle.sin() * 0.5 + 0.5) * 255.0;
        rgb.push(f32::from_bits(((r as u32) << 16) | 0x80 << 8 | b as u32));

        nx.push(-angle.cos());
        ny.push(-angle.sin());
        nz.push(0.0);
    }

    PointCloudMessage::new("laser", points)
        .with_stamp(stamp)
        .with_channel("intensity", intensity)
        .with_channel("rgb", rgb)
        .with_channel("nx", nx)
        .with_channel("ny", ny)
        .with_channel("nz", nz)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = DisplayConfig::default().with_decay_time(args.decay);
    if let Some(source) = args.source {
        config = config.with_color_source(source.into());
    }
    info!("Display config:\n{}", config.to_json()?);

    let pipeline = Arc::new(
        PointCloudPipeline::new(PointBuffer::new(), config).with_observer(Arc::new(LogObserver)),
    );
    let run_for = Duration::from_secs(args.seconds);
    let start = Instant::now();

    let producer = {
        let pipeline = Arc::clone(&pipeline);
        let period = Duration::from_secs_f64(1.0 / f64::from(args.rate.max(1)));
        let count = args.points;
        thread::spawn(move || {
            let mut rng = rand::thread_rng();
            let mut phase = 0.0f32;
            while start.elapsed() < run_for {
                let sweep = simulate_sweep(&mut rng, phase, count, start.elapsed().as_secs_f64());
                for diagnostic in pipeline.submit_frame(sweep) {
                    log::warn!("Frame diagnostic: {:?}", diagnostic);
                }
                phase += 0.5;
                thread::sleep(period);
            }
        })
    };

    let mut last = Instant::now();
    let mut ticks = 0usize;
    while start.elapsed() < run_for {
        thread::sleep(Duration::from_millis(16));
        let now = Instant::now();
        let summary = pipeline.tick(now.duration_since(last).as_secs_f32());
        last = now;
        ticks += 1;

        // Stand-in for the draw call: read the buffer under the render scope
        let (drawn, mean_red) = pipeline.render().scope(|sink| {
            let total: f32 = sink.points().map(|p| p.color[0]).sum();
            let drawn = sink.len();
            (drawn, if drawn > 0 { total / drawn as f32 } else { 0.0 })
        });

        if ticks % 30 == 0 {
            let bounds = pipeline.config().bounds;
            info!(
                "frames={} points={} evicted={} mean_red={:.3} bounds=({:.1}, {:.1})",
                pipeline.frame_count(),
                drawn,
                summary.evicted,
                mean_red,
                bounds.min(),
                bounds.max()
            );
        }
    }

    producer
        .join()
        .map_err(|_| anyhow::anyhow!("producer thread panicked"))?;

    info!(
        "Done after {} ticks, {} frames retained, color source {:?}",
        ticks,
        pipeline.frame_count(),
        pipeline.config().color_source
    );
    Ok(())
}
