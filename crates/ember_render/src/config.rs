//! Render configuration, validated once at startup.

use ember_core::ScenePreset;
use ember_math::Color;
use thiserror::Error;

/// How workers pick pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Rows are split into bands, each walked exactly once. Deterministic
    /// with fixed per-worker seeds.
    Sequential,
    /// Progressive refinement: workers sample random pixels until told to
    /// quit.
    RandomPixel,
}

/// HDR-to-display operator applied before the gamma curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToneMapper {
    /// `c / (c + 1)`
    Reinhard,
    /// `1 - exp(-c * exposure)`
    Exposure,
}

/// Rejected configuration values.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("image dimensions must be positive, got {width}x{height}")]
    ZeroResolution { width: u32, height: u32 },
    #[error("vertical fov must be in (0, 180) degrees, got {0}")]
    InvalidFov(f32),
    #[error("max_depth must be at least 1")]
    ZeroDepth,
    #[error("rays_per_sample must be at least 1")]
    ZeroRaysPerSample,
    #[error("gamma must be positive, got {0}")]
    InvalidGamma(f64),
}

/// Everything the renderer needs to know up front. Nothing here is
/// mutable during a render.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    pub fov_y_deg: f32,
    /// Integrator recursion cap (>= 1).
    pub max_depth: u32,
    /// Camera rays per pixel sample.
    pub rays_per_sample: u32,
    /// Shadow-ray count per light in the direct estimator.
    pub light_subsamples: u32,
    pub mode: RenderMode,
    /// Worker count; 0 selects the number of logical CPUs.
    pub threads: usize,
    /// Master seed. `None` seeds from entropy, which forfeits
    /// reproducibility.
    pub seed: Option<u64>,
    pub tone_mapper: ToneMapper,
    pub gamma: f64,
    pub exposure: f64,
    pub background: Color,
    pub scene_preset: ScenePreset,
    /// Skip lighting entirely and return raw surface albedo. Useful as a
    /// fast preview of scene composition.
    pub unlit: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            fov_y_deg: 90.0,
            max_depth: 5,
            rays_per_sample: 1,
            light_subsamples: 32,
            mode: RenderMode::Sequential,
            threads: 0,
            seed: None,
            tone_mapper: ToneMapper::Reinhard,
            gamma: 2.2,
            exposure: 1.0,
            background: Color::ZERO,
            scene_preset: ScenePreset::CornellBox {
                length: 10.0,
                width: 10.0,
                height: 10.0,
            },
            unlit: false,
        }
    }
}

impl RenderConfig {
    /// Reject configurations the renderer cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::ZeroResolution {
                width: self.width,
                height: self.height,
            });
        }
        if !(self.fov_y_deg > 0.0 && self.fov_y_deg < 180.0) {
            return Err(ConfigError::InvalidFov(self.fov_y_deg));
        }
        if self.max_depth < 1 {
            return Err(ConfigError::ZeroDepth);
        }
        if self.rays_per_sample < 1 {
            return Err(ConfigError::ZeroRaysPerSample);
        }
        if self.gamma <= 0.0 {
            return Err(ConfigError::InvalidGamma(self.gamma));
        }
        Ok(())
    }

    /// Worker count after resolving the 0 = auto convention.
    pub fn effective_threads(&self) -> usize {
        if self.threads > 0 {
            self.threads
        } else {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        }
    }
}
