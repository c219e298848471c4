//! HDR to display conversion.

use crate::config::ToneMapper;
use ember_math::Color;

/// Compress a linear mean color into display RGBA8.
///
/// The operator runs per channel, followed by the gamma curve; the
/// result is clamped into `[0, 255]` with alpha fixed at 255.
pub fn tone_map(mean: Color, mapper: ToneMapper, gamma: f64, exposure: f64) -> [u8; 4] {
    let mapped = match mapper {
        ToneMapper::Reinhard => mean / (mean + Color::ONE),
        ToneMapper::Exposure => Color::ONE - (-mean * exposure).exp(),
    };
    let corrected = mapped.powf(1.0 / gamma);

    let to_byte = |v: f64| (v * 255.0).round().clamp(0.0, 255.0) as u8;
    [
        to_byte(corrected.x),
        to_byte(corrected.y),
        to_byte(corrected.z),
        255,
    ]
}
