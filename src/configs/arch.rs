use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::Result;

/// The sample space of the channel multipliers, `[start, end)` walked in `step` increments.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelRange {
    pub start: f32,
    pub end: f32,
    pub step: f32,
}

impl ChannelRange {
    /// Returns how many multipliers the range holds.
    ///
    /// Zero when the range is empty, a bound is not finite or the step is not a positive number.
    pub fn len(&self) -> usize {
        let Self { start, end, step } = *self;
        if step.is_nan() || step <= 0. || !start.is_finite() || !end.is_finite() {
            return 0;
        }

        // absorbs the rounding of `start + i * step` so that `end` itself is never produced
        let steps = (f64::from(end) - f64::from(start)) / f64::from(step) - 1e-4;
        if steps <= 0. { 0 } else { steps.ceil() as usize }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the `index`th multiplier, `None` past the end of the range.
    pub fn get(&self, index: usize) -> Option<f32> {
        (index < self.len()).then(|| self.start + index as f32 * self.step)
    }

    /// Walks every multiplier in the range without collecting them.
    pub fn grid(&self) -> impl Iterator<Item = f32> + '_ {
        (0..self.len()).map(|i| self.start + i as f32 * self.step)
    }
}

/// The sample spaces of the architectural parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleSpace {
    pub channel: ChannelRange,
    pub kernelsize: Vec<usize>,
}

/// The configuration of a single architecture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchConfig {
    pub n_classes: usize,
    pub sample_space: SampleSpace,
    /// Draws the channels and kernel sizes from `sample_space` instead of using the baseline.
    #[serde(default)]
    pub sample: bool,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl ArchConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_is_half_open() {
        let range = ChannelRange {
            start: 0.2,
            end: 2.0,
            step: 0.2,
        };

        let grid: Vec<_> = range.grid().collect();
        assert_eq!(range.len(), 9);
        assert_eq!(grid.len(), 9);
        assert!((grid[0] - 0.2).abs() < 1e-6);
        assert!((grid[8] - 1.8).abs() < 1e-5);
    }

    #[test]
    fn degenerate_ranges_are_empty() {
        let empty = ChannelRange {
            start: 1.0,
            end: 1.0,
            step: 0.1,
        };
        let backwards = ChannelRange {
            start: 0.0,
            end: 1.0,
            step: -0.5,
        };
        let nan = ChannelRange {
            start: 0.0,
            end: 1.0,
            step: f32::NAN,
        };

        assert!(empty.is_empty());
        assert!(backwards.is_empty());
        assert!(nan.is_empty());
        assert_eq!(nan.grid().count(), 0);
    }

    #[test]
    fn tiny_steps_are_not_materialized() {
        let range = ChannelRange {
            start: 0.0,
            end: 1.0,
            step: 1e-10,
        };

        assert!(range.len() > 9_000_000_000);
        assert_eq!(range.get(0), Some(0.0));
        assert!(range.get(range.len() - 1).is_some());
        assert_eq!(range.get(range.len()), None);
    }

    #[test]
    fn parses_with_defaults() {
        let cfg = ArchConfig::from_json(
            r#"{
                "n_classes": 1000,
                "sample_space": {
                    "channel": { "start": 0.5, "end": 1.5, "step": 0.25 },
                    "kernelsize": [3, 5, 7]
                }
            }"#,
        )
        .unwrap();

        assert_eq!(cfg.n_classes, 1000);
        assert_eq!(cfg.sample_space.kernelsize, [3, 5, 7]);
        assert!(!cfg.sample);
        assert_eq!(cfg.version, None);
        assert_eq!(cfg.seed, None);
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(ArchConfig::from_json(r#"{ "n_classes": -1 }"#).is_err());
    }
}
