//! Sample time generation.
//!
//! A [`SampleSchedule`] describes which timestamps of a video are inspected
//! during an extraction run: `0, step, 2·step, …` for every value strictly
//! below the whole-second part of the duration. The schedule is restartable;
//! each call to [`SampleSchedule::iter`] yields a fresh [`SampleTimes`].
//!
//! # Example
//!
//! ```
//! use hardsub::SampleSchedule;
//!
//! let schedule = SampleSchedule::new(3.7, 1.0)?;
//! let times: Vec<f64> = schedule.iter().collect();
//! assert_eq!(times, vec![0.0, 1.0, 2.0]);
//! # Ok::<(), hardsub::HardsubError>(())
//! ```

use std::iter::FusedIterator;

use crate::error::HardsubError;

/// The fixed sampling plan for one video.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleSchedule {
    step: f64,
    limit: f64,
    count: u64,
}

impl SampleSchedule {
    /// Build a schedule for a video of `duration` seconds sampled every
    /// `step` seconds.
    ///
    /// # Errors
    ///
    /// Returns [`HardsubError::InvalidParameter`] if either value is not a
    /// finite number greater than zero.
    pub fn new(duration: f64, step: f64) -> Result<Self, HardsubError> {
        if !duration.is_finite() || duration <= 0.0 {
            return Err(HardsubError::InvalidParameter(format!(
                "duration must be a finite number of seconds greater than zero (got {duration})"
            )));
        }
        if !step.is_finite() || step <= 0.0 {
            return Err(HardsubError::InvalidParameter(format!(
                "frame step must be a finite number of seconds greater than zero (got {step})"
            )));
        }

        let limit = duration.floor();
        let mut count = (limit / step).ceil() as u64;
        // Float rounding in the division can overshoot by one sample.
        while count > 0 && (count - 1) as f64 * step >= limit {
            count -= 1;
        }

        Ok(Self { step, limit, count })
    }

    /// The interval between samples, in seconds.
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Number of sample points in the schedule.
    pub fn len(&self) -> u64 {
        self.count
    }

    /// Returns `true` for videos shorter than one second.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Exclusive upper bound of the sample times (`floor(duration)`).
    pub fn limit(&self) -> f64 {
        self.limit
    }

    /// Iterate the sample times from the beginning.
    pub fn iter(&self) -> SampleTimes {
        SampleTimes {
            step: self.step,
            next: 0,
            count: self.count,
        }
    }
}

impl IntoIterator for &SampleSchedule {
    type Item = f64;
    type IntoIter = SampleTimes;

    fn into_iter(self) -> SampleTimes {
        self.iter()
    }
}

/// Lazy iterator over the sample times of a [`SampleSchedule`].
///
/// Times are computed as `index × step` rather than by repeated addition so
/// that long videos do not accumulate drift.
#[derive(Debug, Clone)]
pub struct SampleTimes {
    step: f64,
    next: u64,
    count: u64,
}

impl Iterator for SampleTimes {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        if self.next >= self.count {
            return None;
        }
        let time = self.next as f64 * self.step;
        self.next += 1;
        Some(time)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.count - self.next) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SampleTimes {}

impl FusedIterator for SampleTimes {}
