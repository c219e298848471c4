//! Ember render - the Monte Carlo rendering engine.
//!
//! Drives the path integrator over an image:
//!
//! - **Camera**: pinhole pixel-to-ray mapping
//! - **Integrator**: recursive path tracing with next-event estimation
//! - **Buffers**: atomic accumulation and the RGBA8 display buffer
//! - **Scheduler**: parallel workers, frame publication, progress

mod buffer;
mod camera;
mod config;
mod integrator;
mod sampling;
mod scheduler;
mod tonemap;

pub use buffer::{scrub_nan, DisplayBuffer, PixelBuffer};
pub use camera::Camera;
pub use config::{ConfigError, RenderConfig, RenderMode, ToneMapper};
pub use integrator::Integrator;
pub use sampling::{reflect, uniform_hemisphere};
pub use scheduler::{
    PixelSink, ProgressSink, RenderDriver, RenderError, PUBLISH_INTERVAL,
};
pub use tonemap::tone_map;
