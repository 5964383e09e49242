//! Position sizing configuration.

use serde::{Deserialize, Serialize};

/// Knobs for the confidence-scaled position sizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SizingConfig {
    /// Base position as a fraction of current capital.
    #[serde(default = "default_base_fraction")]
    pub base_fraction: f64,
    /// Lower clamp as a fraction of current capital.
    #[serde(default = "default_min_fraction")]
    pub min_fraction: f64,
    /// Upper clamp as a fraction of current capital. Must not exceed
    /// `safety_limits.max_position_size_pct`; the tighter of the two wins.
    #[serde(default = "default_max_fraction")]
    pub max_fraction: f64,
    /// Baseline confidence threshold for admitting a signal.
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            base_fraction: default_base_fraction(),
            min_fraction: default_min_fraction(),
            max_fraction: default_max_fraction(),
            min_confidence: default_min_confidence(),
        }
    }
}

const fn default_base_fraction() -> f64 {
    0.25
}

const fn default_min_fraction() -> f64 {
    0.05
}

const fn default_max_fraction() -> f64 {
    0.10
}

const fn default_min_confidence() -> f64 {
    0.55
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizing_defaults_are_ordered() {
        let config = SizingConfig::default();
        assert!(config.min_fraction <= config.max_fraction);
        assert!(config.min_confidence > 0.0 && config.min_confidence < 1.0);
    }
}
