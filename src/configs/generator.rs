use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use super::ArchConfig;
use crate::Result;

/// The configuration of a batch of generated architectures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(flatten)]
    pub arch: ArchConfig,
    /// The input placeholder's shape, `[batch, height, width, channels]`.
    #[serde(default = "default_input_shape")]
    pub input_shape: [usize; 4],
    /// How many architectures to draw.
    #[serde(default = "default_count")]
    pub count: usize,
}

fn default_input_shape() -> [usize; 4] {
    [1, 224, 224, 3]
}

fn default_count() -> usize {
    1
}

impl GeneratorConfig {
    pub fn new(arch: ArchConfig) -> Self {
        Self {
            arch,
            input_shape: default_input_shape(),
            count: default_count(),
        }
    }

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
    fn flattens_the_arch_config() {
        let cfg = GeneratorConfig::from_json(
            r#"{
                "n_classes": 10,
                "sample": true,
                "seed": 3,
                "count": 4,
                "input_shape": [1, 32, 32, 3],
                "sample_space": {
                    "channel": { "start": 0.5, "end": 1.0, "step": 0.25 },
                    "kernelsize": [3]
                }
            }"#,
        )
        .unwrap();

        assert_eq!(cfg.count, 4);
        assert_eq!(cfg.input_shape, [1, 32, 32, 3]);
        assert!(cfg.arch.sample);
        assert_eq!(cfg.arch.seed, Some(3));
    }

    #[test]
    fn defaults_to_a_single_imagenet_input() {
        let cfg = GeneratorConfig::from_json(
            r#"{
                "n_classes": 1000,
                "sample_space": {
                    "channel": { "start": 1.0, "end": 1.0, "step": 0.1 },
                    "kernelsize": []
                }
            }"#,
        )
        .unwrap();

        assert_eq!(cfg, GeneratorConfig::new(cfg.arch.clone()));
    }
}
