//! Accumulation and display buffers shared by the render workers.

use ember_math::Color;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

/// Replace non-finite channels with zero. A single NaN sample would
/// otherwise poison its pixel for the rest of the render.
#[inline]
pub fn scrub_nan(color: Color) -> Color {
    Color::new(
        if color.x.is_finite() { color.x } else { 0.0 },
        if color.y.is_finite() { color.y } else { 0.0 },
        if color.z.is_finite() { color.z } else { 0.0 },
    )
}

/// Per-pixel radiance accumulator with sample counts.
///
/// Channels are f64 bit patterns inside `AtomicU64`, added with a
/// compare-exchange loop, so concurrent workers in random-pixel mode
/// never lose a sample. Counts use plain atomic increments.
pub struct PixelBuffer {
    width: u32,
    height: u32,
    accum: Vec<[AtomicU64; 3]>,
    counts: Vec<AtomicU64>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        let pixels = (width * height) as usize;
        Self {
            width,
            height,
            accum: (0..pixels)
                .map(|_| [AtomicU64::new(0), AtomicU64::new(0), AtomicU64::new(0)])
                .collect(),
            counts: (0..pixels).map(|_| AtomicU64::new(0)).collect(),
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn index(&self, x: u32, y: u32) -> usize {
        (y * self.width + x) as usize
    }

    /// Add one sample to a pixel and bump its count.
    pub fn add_sample(&self, index: usize, color: Color) {
        let color = scrub_nan(color);
        let cell = &self.accum[index];
        for (channel, value) in [color.x, color.y, color.z].into_iter().enumerate() {
            atomic_f64_add(&cell[channel], value);
        }
        self.counts[index].fetch_add(1, Ordering::Relaxed);
    }

    /// Mean color of a pixel; black while it has no samples.
    pub fn mean(&self, index: usize) -> Color {
        let count = self.counts[index].load(Ordering::Relaxed);
        if count == 0 {
            return Color::ZERO;
        }
        let cell = &self.accum[index];
        Color::new(
            f64::from_bits(cell[0].load(Ordering::Relaxed)),
            f64::from_bits(cell[1].load(Ordering::Relaxed)),
            f64::from_bits(cell[2].load(Ordering::Relaxed)),
        ) / count as f64
    }

    #[inline]
    pub fn sample_count(&self, index: usize) -> u64 {
        self.counts[index].load(Ordering::Relaxed)
    }

    /// Samples accumulated over the whole image.
    pub fn total_samples(&self) -> u64 {
        self.counts.iter().map(|c| c.load(Ordering::Relaxed)).sum()
    }
}

fn atomic_f64_add(cell: &AtomicU64, value: f64) {
    let mut current = cell.load(Ordering::Relaxed);
    loop {
        let next = (f64::from_bits(current) + value).to_bits();
        match cell.compare_exchange_weak(current, next, Ordering::SeqCst, Ordering::Relaxed) {
            Ok(_) => break,
            Err(actual) => current = actual,
        }
    }
}

/// Tone-mapped RGBA8 frame, written by workers and snapshotted by the
/// frame loop.
///
/// Each pixel is one packed `AtomicU32` with relaxed ordering: readers
/// may see an older frame but never a torn pixel.
pub struct DisplayBuffer {
    width: u32,
    height: u32,
    pixels: Vec<AtomicU32>,
}

impl DisplayBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: (0..(width * height) as usize)
                .map(|_| AtomicU32::new(pack([0, 0, 0, 255])))
                .collect(),
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn set_pixel(&self, index: usize, rgba: [u8; 4]) {
        self.pixels[index].store(pack(rgba), Ordering::Relaxed);
    }

    /// Copy the current frame into row-major RGBA8 bytes, top-left
    /// origin.
    pub fn snapshot(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 4);
        for pixel in &self.pixels {
            bytes.extend_from_slice(&pixel.load(Ordering::Relaxed).to_le_bytes());
        }
        bytes
    }
}

#[inline]
fn pack(rgba: [u8; 4]) -> u32 {
    u32::from_le_bytes(rgba)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_zero_count_pixel_is_black() {
        let buffer = PixelBuffer::new(2, 2);
        assert_eq!(buffer.mean(0), Color::ZERO);
        assert_eq!(buffer.sample_count(0), 0);
    }

    #[test]
    fn test_mean_divides_by_count() {
        let buffer = PixelBuffer::new(2, 2);
        let index = buffer.index(1, 0);
        buffer.add_sample(index, Color::new(1.0, 2.0, 3.0));
        buffer.add_sample(index, Color::new(3.0, 2.0, 1.0));

        assert_eq!(buffer.sample_count(index), 2);
        assert_eq!(buffer.mean(index), Color::new(2.0, 2.0, 2.0));
    }

    #[test]
    fn test_nan_samples_become_zero() {
        let buffer = PixelBuffer::new(1, 1);
        buffer.add_sample(0, Color::new(f64::NAN, 1.0, f64::INFINITY));
        assert_eq!(buffer.mean(0), Color::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_concurrent_adds_lose_nothing() {
        let buffer = Arc::new(PixelBuffer::new(1, 1));
        let threads = 8;
        let per_thread = 1_000;

        std::thread::scope(|scope| {
            for _ in 0..threads {
                let buffer = Arc::clone(&buffer);
                scope.spawn(move || {
                    for _ in 0..per_thread {
                        buffer.add_sample(0, Color::ONE);
                    }
                });
            }
        });

        let expected = (threads * per_thread) as u64;
        assert_eq!(buffer.sample_count(0), expected);
        assert_eq!(buffer.mean(0), Color::ONE);
    }

    #[test]
    fn test_display_snapshot_layout() {
        let display = DisplayBuffer::new(2, 1);
        display.set_pixel(0, [1, 2, 3, 255]);
        display.set_pixel(1, [4, 5, 6, 255]);

        let bytes = display.snapshot();
        assert_eq!(bytes, vec![1, 2, 3, 255, 4, 5, 6, 255]);
    }
}
