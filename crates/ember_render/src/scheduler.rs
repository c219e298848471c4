//! Parallel pixel-sampling scheduler and frame loop.
//!
//! Workers are plain OS threads sharing the prepared scene read-only.
//! Sample accumulation goes through the atomic [`PixelBuffer`]; the
//! tone-mapped [`DisplayBuffer`] is published to the pixel sink on a
//! fixed cadence by the thread that called [`RenderDriver::render`].

use crate::buffer::{DisplayBuffer, PixelBuffer};
use crate::camera::Camera;
use crate::config::{ConfigError, RenderConfig, RenderMode};
use crate::integrator::Integrator;
use crate::tonemap::tone_map;
use ember_core::rng::{gen_f32, split_mix64};
use ember_core::{Scene, SceneError, Xorshift128Plus};
use ember_math::Color;
use log::{debug, info};
use std::ops::Range;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Minimum delay between frame publications.
pub const PUBLISH_INTERVAL: Duration = Duration::from_millis(100);

/// Receives published frames (a window, an encoder, a test buffer).
pub trait PixelSink {
    /// `bytes` is row-major RGBA8 with top-left origin.
    fn publish(&mut self, width: u32, height: u32, bytes: &[u8]) -> std::io::Result<()>;
}

/// Receives render progress, once per publication.
pub trait ProgressSink {
    fn report(&mut self, fps: f32, elapsed_s: f32);
}

/// Discards progress reports.
impl ProgressSink for () {
    fn report(&mut self, _fps: f32, _elapsed_s: f32) {}
}

/// Render failures surfaced to the caller.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error("pixel sink failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Owns a validated configuration and drives renders with it.
pub struct RenderDriver {
    config: RenderConfig,
    quit: Arc<AtomicBool>,
}

impl RenderDriver {
    /// Validates the configuration up front; nothing is spawned yet.
    pub fn new(config: RenderConfig) -> Result<Self, RenderError> {
        config.validate()?;
        Ok(Self {
            config,
            quit: Arc::new(AtomicBool::new(false)),
        })
    }

    #[inline]
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Cooperative cancellation handle. Setting it stops every worker at
    /// its next sample boundary; `render` then joins them and returns.
    pub fn quit_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.quit)
    }

    /// Render `scene` through `camera`, publishing frames into `sink`.
    ///
    /// In sequential mode this returns once every worker has walked its
    /// band. In random-pixel mode it refines forever until the quit flag
    /// is set (or the sink fails). The scene must already be prepared.
    pub fn render(
        &self,
        scene: &Scene,
        camera: &Camera,
        sink: &mut dyn PixelSink,
        progress: &mut dyn ProgressSink,
    ) -> Result<(), RenderError> {
        if scene.objects().is_empty() {
            return Err(SceneError::Empty.into());
        }

        let width = camera.width();
        let height = camera.height();
        let pixels = PixelBuffer::new(width, height);
        let display = DisplayBuffer::new(width, height);
        let integrator = Integrator::new(scene, self.config.light_subsamples);

        let thread_count = self.config.effective_threads();
        let mut seed_state = self.config.seed.unwrap_or_else(rand::random);
        let seeds: Vec<u64> = (0..thread_count)
            .map(|_| split_mix64(&mut seed_state))
            .collect();

        info!(
            "rendering {width}x{height} with {thread_count} workers ({:?} mode)",
            self.config.mode
        );

        let workers_done = AtomicUsize::new(0);
        let start = Instant::now();
        let mut sink_failure: Option<std::io::Error> = None;

        std::thread::scope(|scope| {
            for (id, &seed) in seeds.iter().enumerate() {
                let worker = Worker {
                    integrator: &integrator,
                    camera,
                    config: &self.config,
                    pixels: &pixels,
                    display: &display,
                    quit: &self.quit,
                };
                let band = band_for(id, thread_count, height);
                let done = &workers_done;
                scope.spawn(move || {
                    worker.run(Xorshift128Plus::new(seed), band);
                    done.fetch_add(1, Ordering::Release);
                });
            }

            // Frame loop: publish at the configured cadence until the
            // workers finish or someone pulls the quit flag.
            let mut last_publish = Instant::now();
            loop {
                let finished = workers_done.load(Ordering::Acquire) == thread_count;
                if finished || self.quit.load(Ordering::Relaxed) {
                    break;
                }

                if last_publish.elapsed() >= PUBLISH_INTERVAL {
                    let delta = last_publish.elapsed().as_secs_f32();
                    last_publish = Instant::now();

                    let bytes = display.snapshot();
                    if let Err(error) = sink.publish(width, height, &bytes) {
                        self.quit.store(true, Ordering::Relaxed);
                        sink_failure = Some(error);
                        break;
                    }
                    progress.report(1.0 / delta.max(1e-6), start.elapsed().as_secs_f32());
                }

                std::thread::sleep(Duration::from_millis(5));
            }
        });

        if let Some(error) = sink_failure {
            return Err(error.into());
        }

        // Workers are joined; push the frame they finished on.
        let bytes = display.snapshot();
        sink.publish(width, height, &bytes)?;
        progress.report(0.0, start.elapsed().as_secs_f32());
        debug!(
            "render done: {} samples in {:.2}s",
            pixels.total_samples(),
            start.elapsed().as_secs_f32()
        );
        Ok(())
    }
}

/// Contiguous row band owned by worker `id` in sequential mode.
fn band_for(id: usize, count: usize, height: u32) -> Range<u32> {
    let start = (id as u64 * height as u64 / count as u64) as u32;
    let end = ((id as u64 + 1) * height as u64 / count as u64) as u32;
    start..end
}

/// Everything one render thread needs, borrowed from the driver.
struct Worker<'a> {
    integrator: &'a Integrator<'a>,
    camera: &'a Camera,
    config: &'a RenderConfig,
    pixels: &'a PixelBuffer,
    display: &'a DisplayBuffer,
    quit: &'a AtomicBool,
}

impl Worker<'_> {
    fn run(&self, mut rng: Xorshift128Plus, band: Range<u32>) {
        match self.config.mode {
            RenderMode::Sequential => {
                'rows: for y in band {
                    for x in 0..self.camera.width() {
                        if self.quit.load(Ordering::Relaxed) {
                            break 'rows;
                        }
                        self.sample_pixel(x, y, &mut rng);
                    }
                }
            }
            RenderMode::RandomPixel => {
                let width = self.camera.width();
                let height = self.camera.height();
                while !self.quit.load(Ordering::Relaxed) {
                    let x = ((gen_f32(&mut rng) * width as f32) as u32).min(width - 1);
                    let y = ((gen_f32(&mut rng) * height as f32) as u32).min(height - 1);
                    self.sample_pixel(x, y, &mut rng);
                }
            }
        }
    }

    /// One pixel sample: trace `rays_per_sample` camera rays, accumulate,
    /// and refresh the pixel's display value.
    fn sample_pixel(&self, x: u32, y: u32, rng: &mut Xorshift128Plus) {
        let index = self.pixels.index(x, y);

        for _ in 0..self.config.rays_per_sample {
            let (sx, sy) = if self.config.unlit {
                (0.5, 0.5)
            } else {
                (gen_f32(rng), gen_f32(rng))
            };
            let ray = self.camera.pixel_ray(x as f32 + sx, y as f32 + sy);

            let color = if self.config.unlit {
                self.integrator.trace_unlit(&ray)
            } else {
                self.integrator
                    .trace(&ray, rng, self.config.max_depth, Color::ONE)
            };
            self.pixels.add_sample(index, color);
        }

        let mean = self.pixels.mean(index);
        let rgba = tone_map(
            mean,
            self.config.tone_mapper,
            self.config.gamma,
            self.config.exposure,
        );
        self.display.set_pixel(index, rgba);
    }
}
