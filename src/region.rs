//! Frame regions.
//!
//! A [`Region`] is the rectangle of the source frame that is searched for
//! subtitle text. It is fixed for the duration of an extraction run. The
//! frame extractor does not read the whole region: it trims 10% off the top
//! and the bottom ([`Region::text_band`]) to keep the crop on the text line
//! and away from the selection border.

use std::{fmt, fs, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::HardsubError;

/// Fraction of the region height dropped from the top and from the bottom
/// before cropping.
pub const TEXT_BAND_MARGIN: f64 = 0.1;

/// Padding, in pixels, added around a rectangle drawn by the user.
pub const SELECTION_PADDING: u32 = 5;

/// A pixel rectangle in source-frame coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width in pixels (never zero).
    pub width: u32,
    /// Height in pixels (never zero).
    pub height: u32,
}

impl Region {
    /// Create a region, rejecting empty rectangles.
    ///
    /// # Errors
    ///
    /// Returns [`HardsubError::InvalidParameter`] if `width` or `height` is
    /// zero.
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Result<Self, HardsubError> {
        if width == 0 || height == 0 {
            return Err(HardsubError::InvalidParameter(format!(
                "region must have a non-zero size (got {width}x{height})"
            )));
        }
        Ok(Self {
            x,
            y,
            width,
            height,
        })
    }

    /// The region covering a whole `width` × `height` frame.
    ///
    /// # Errors
    ///
    /// Returns [`HardsubError::InvalidParameter`] for a zero-sized frame.
    pub fn full_frame(width: u32, height: u32) -> Result<Self, HardsubError> {
        Self::new(0, 0, width, height)
    }

    /// Build a region from two corners of a drag selection.
    ///
    /// The corners may be given in any order. The normalized rectangle is
    /// padded by [`SELECTION_PADDING`] on every side and then clamped to the
    /// frame.
    pub fn from_selection(
        start: (f64, f64),
        end: (f64, f64),
        frame_width: u32,
        frame_height: u32,
    ) -> Result<Self, HardsubError> {
        let left = start.0.min(end.0).max(0.0);
        let top = start.1.min(end.1).max(0.0);
        let width = (end.0 - start.0).abs();
        let height = (end.1 - start.1).abs();

        let padding = SELECTION_PADDING as f64;
        let padded = Self::new(
            (left - padding).max(0.0) as u32,
            (top - padding).max(0.0) as u32,
            (width + padding * 2.0).round() as u32,
            (height + padding * 2.0).round() as u32,
        )?;
        padded.clamp_to(frame_width, frame_height)
    }

    /// Clamp the region so it lies inside a `frame_width` × `frame_height`
    /// frame.
    ///
    /// # Errors
    ///
    /// Returns [`HardsubError::InvalidParameter`] if the region starts
    /// outside the frame, since nothing of it would remain.
    pub fn clamp_to(&self, frame_width: u32, frame_height: u32) -> Result<Self, HardsubError> {
        if self.x >= frame_width || self.y >= frame_height {
            return Err(HardsubError::InvalidParameter(format!(
                "region {self} lies outside the {frame_width}x{frame_height} frame"
            )));
        }
        Self::new(
            self.x,
            self.y,
            self.width.min(frame_width - self.x),
            self.height.min(frame_height - self.y),
        )
    }

    /// The sub-rectangle actually handed to OCR.
    ///
    /// Keeps the full width and drops `height × 0.1` (floored) from the top
    /// and from the bottom. Regions too small to lose anything are returned
    /// unchanged.
    pub fn text_band(&self) -> Self {
        let margin = (self.height as f64 * TEXT_BAND_MARGIN).floor() as u32;
        Self {
            x: self.x,
            y: self.y + margin,
            width: self.width,
            height: self.height - margin * 2,
        }
    }

    /// Read a region from a JSON file.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self, HardsubError> {
        let content = fs::read_to_string(path)?;
        let region: Region = serde_json::from_str(&content)?;
        Self::new(region.x, region.y, region.width, region.height)
    }

    /// Write the region to a pretty-printed JSON file.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<(), HardsubError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{} {}x{}", self.x, self.y, self.width, self.height)
    }
}

/// Parses `x,y,width,height`.
impl FromStr for Region {
    type Err = HardsubError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = value.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(HardsubError::InvalidParameter(format!(
                "expected region as x,y,width,height (got {value:?})"
            )));
        }

        let mut numbers = [0_u32; 4];
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            *slot = part.parse().map_err(|_| {
                HardsubError::InvalidParameter(format!("invalid region component {part:?}"))
            })?;
        }

        Self::new(numbers[0], numbers[1], numbers[2], numbers[3])
    }
}
