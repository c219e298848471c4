//! Ember demo binary.
//!
//! Renders one of the preset scenes and writes the final frame as a PPM
//! image. The window/GL display of a full application is out of scope
//! here; this sink keeps the last published frame instead.

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use ember_core::ScenePreset;
use ember_math::{Color, Vec3};
use ember_render::{
    Camera, PixelSink, ProgressSink, RenderConfig, RenderDriver, RenderMode, ToneMapper,
};
use log::info;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::time::Duration;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Sequential,
    RandomPixel,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ToneMapArg {
    Reinhard,
    Exposure,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PresetArg {
    CornellBox,
    Hexagon,
}

/// Offline Monte Carlo path tracer.
#[derive(Parser, Debug)]
#[command(name = "ember", version, about)]
struct Args {
    #[arg(long, default_value_t = 640)]
    width: u32,
    #[arg(long, default_value_t = 480)]
    height: u32,
    /// Vertical field of view in degrees.
    #[arg(long = "fov", default_value_t = 90.0)]
    fov_y_deg: f32,
    #[arg(long, default_value_t = 5)]
    max_depth: u32,
    #[arg(long, default_value_t = 1)]
    rays_per_sample: u32,
    #[arg(long, default_value_t = 32)]
    light_subsamples: u32,
    #[arg(long, value_enum, default_value_t = ModeArg::Sequential)]
    mode: ModeArg,
    /// Worker threads; 0 uses every logical CPU.
    #[arg(long, default_value_t = 0)]
    threads: usize,
    /// Master seed for reproducible single-threaded runs.
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, value_enum, default_value_t = ToneMapArg::Reinhard)]
    tone_mapper: ToneMapArg,
    #[arg(long, default_value_t = 2.2)]
    gamma: f64,
    #[arg(long, default_value_t = 1.0)]
    exposure: f64,
    /// Background radiance as "r,g,b".
    #[arg(long, value_parser = parse_color, default_value = "0,0,0")]
    background: Color,
    #[arg(long, value_enum, default_value_t = PresetArg::CornellBox)]
    scene: PresetArg,
    /// Cornell box edge length.
    #[arg(long, default_value_t = 10.0)]
    room_size: f32,
    /// Preview mode: raw albedo, no lighting.
    #[arg(long)]
    unlit: bool,
    /// Stop a random-pixel render after this many seconds.
    #[arg(long)]
    seconds: Option<f32>,
    /// Output image (PPM).
    #[arg(long, default_value = "render.ppm")]
    output: PathBuf,
}

fn parse_color(s: &str) -> Result<Color, String> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 3 {
        return Err(format!("expected r,g,b, got '{s}'"));
    }
    let mut channels = [0.0f64; 3];
    for (slot, part) in channels.iter_mut().zip(&parts) {
        *slot = part
            .trim()
            .parse()
            .map_err(|e| format!("bad channel '{part}': {e}"))?;
    }
    Ok(Color::from_array(channels))
}

/// Keeps the most recent published frame for the final image write.
#[derive(Default)]
struct FrameStore {
    width: u32,
    height: u32,
    bytes: Vec<u8>,
}

impl PixelSink for FrameStore {
    fn publish(&mut self, width: u32, height: u32, bytes: &[u8]) -> std::io::Result<()> {
        self.width = width;
        self.height = height;
        self.bytes.clear();
        self.bytes.extend_from_slice(bytes);
        Ok(())
    }
}

struct LogProgress;

impl ProgressSink for LogProgress {
    fn report(&mut self, fps: f32, elapsed_s: f32) {
        info!("fps: {fps:.1} - time: {elapsed_s:.1}s");
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let preset = match args.scene {
        PresetArg::CornellBox => ScenePreset::CornellBox {
            length: args.room_size,
            width: args.room_size,
            height: args.room_size,
        },
        PresetArg::Hexagon => ScenePreset::Hexagon,
    };

    let config = RenderConfig {
        width: args.width,
        height: args.height,
        fov_y_deg: args.fov_y_deg,
        max_depth: args.max_depth,
        rays_per_sample: args.rays_per_sample,
        light_subsamples: args.light_subsamples,
        mode: match args.mode {
            ModeArg::Sequential => RenderMode::Sequential,
            ModeArg::RandomPixel => RenderMode::RandomPixel,
        },
        threads: args.threads,
        seed: args.seed,
        tone_mapper: match args.tone_mapper {
            ToneMapArg::Reinhard => ToneMapper::Reinhard,
            ToneMapArg::Exposure => ToneMapper::Exposure,
        },
        gamma: args.gamma,
        exposure: args.exposure,
        background: args.background,
        scene_preset: preset,
        unlit: args.unlit,
    };

    if config.mode == RenderMode::RandomPixel && args.seconds.is_none() {
        bail!("random-pixel mode runs forever; pass --seconds to bound it");
    }

    let mut scene = preset.build();
    scene.background = config.background;
    scene.prepare().context("scene preparation failed")?;

    let (eye, target) = preset.recommended_view();
    let mut camera = Camera::new(config.width, config.height, config.fov_y_deg);
    camera.set_view(eye, target, Vec3::Y);

    let driver = RenderDriver::new(config)?;
    if let Some(seconds) = args.seconds {
        let quit = driver.quit_flag();
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_secs_f32(seconds));
            quit.store(true, Ordering::Relaxed);
        });
    }

    let mut frame = FrameStore::default();
    driver.render(&scene, &camera, &mut frame, &mut LogProgress)?;

    write_ppm(&args.output, frame.width, frame.height, &frame.bytes)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    info!("wrote {}", args.output.display());
    Ok(())
}

fn write_ppm(path: &PathBuf, width: u32, height: u32, rgba: &[u8]) -> std::io::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "P3")?;
    writeln!(writer, "{width} {height}")?;
    writeln!(writer, "255")?;
    for pixel in rgba.chunks(4) {
        writeln!(writer, "{} {} {}", pixel[0], pixel[1], pixel[2])?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("0.2,0.3,0.4").unwrap(), Color::new(0.2, 0.3, 0.4));
        assert_eq!(parse_color(" 1 , 0 , 0 ").unwrap(), Color::new(1.0, 0.0, 0.0));
        assert!(parse_color("1,2").is_err());
        assert!(parse_color("a,b,c").is_err());
    }

    #[test]
    fn test_args_parse_defaults() {
        let args = Args::parse_from(["ember"]);
        assert_eq!(args.width, 640);
        assert_eq!(args.height, 480);
        assert_eq!(args.light_subsamples, 32);
        assert!(args.seed.is_none());
    }
}
