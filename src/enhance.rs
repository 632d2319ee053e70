//! Pre-OCR image enhancement.
//!
//! Burned-in subtitles are usually light text with a dark outline over busy
//! video. The enhancer pushes such crops toward high-contrast grayscale:
//!
//! 1. a light Gaussian blur to smooth out compression blocks,
//! 2. a contrast boost followed by a brightness boost,
//! 3. luma grayscale with gamma correction.
//!
//! The transform is a pure function of the input and the
//! [`EnhanceOptions`]. It is not idempotent: a second pass compounds the
//! contrast and gamma curves.
//!
//! # Example
//!
//! ```
//! use hardsub::{EnhanceOptions, FrameBuffer, enhance};
//!
//! let crop = FrameBuffer::filled(32, 8, [255, 255, 255, 255]);
//! let enhanced = enhance(&crop, &EnhanceOptions::default());
//! assert_eq!(enhanced.as_image().get_pixel(0, 0).0, [255, 255, 255, 255]);
//! ```

use image::imageops;

use crate::frame::FrameBuffer;

/// ITU-R BT.601 luma weights for red, green and blue.
const LUMA_WEIGHTS: [f32; 3] = [0.299, 0.587, 0.114];

/// Constants for the enhancement pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnhanceOptions {
    /// Gaussian blur sigma in pixels. `0.0` disables the blur.
    pub blur_sigma: f32,
    /// Contrast factor (2.0 = 200%).
    pub contrast: f32,
    /// Brightness factor (1.2 = 120%).
    pub brightness: f32,
    /// Gamma exponent applied to normalized luma.
    pub gamma: f32,
}

impl Default for EnhanceOptions {
    fn default() -> Self {
        Self {
            blur_sigma: 1.0,
            contrast: 2.0,
            brightness: 1.2,
            gamma: 0.5,
        }
    }
}

/// Run the full enhancement pipeline on a crop.
///
/// The result has the same dimensions as the input, equal R, G and B
/// channels, and the input's alpha channel.
pub fn enhance(frame: &FrameBuffer, options: &EnhanceOptions) -> FrameBuffer {
    let source = frame.as_image();
    let mut image = if options.blur_sigma > 0.0 {
        imageops::blur(source, options.blur_sigma)
    } else {
        source.clone()
    };

    let levels = tone_table(options);
    for (pixel, original) in image.pixels_mut().zip(source.pixels()) {
        let [red, green, blue, _] = pixel.0;
        let luma = LUMA_WEIGHTS[0] * levels[red as usize]
            + LUMA_WEIGHTS[1] * levels[green as usize]
            + LUMA_WEIGHTS[2] * levels[blue as usize];
        let value = gamma_correct(luma, options.gamma);
        pixel.0 = [value, value, value, original.0[3]];
    }

    FrameBuffer::new(image)
}

/// Precompute contrast then brightness for every 8-bit level.
///
/// Each stage clamps to the 8-bit range, like successive canvas filters.
fn tone_table(options: &EnhanceOptions) -> [f32; 256] {
    let mut table = [0.0_f32; 256];
    for (level, slot) in table.iter_mut().enumerate() {
        let normalized = level as f32 / 255.0;
        let contrasted = ((normalized - 0.5) * options.contrast + 0.5).clamp(0.0, 1.0);
        let brightened = (contrasted * options.brightness).clamp(0.0, 1.0);
        *slot = brightened * 255.0;
    }
    table
}

fn gamma_correct(luma: f32, gamma: f32) -> u8 {
    let normalized = (luma / 255.0).clamp(0.0, 1.0);
    (255.0 * normalized.powf(gamma)).round() as u8
}
