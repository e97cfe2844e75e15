//! Engine resource limits.
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const MAX_GRID_POINTS_ENV: &str = "SDSIM_MAX_GRID_POINTS";
/// Every slot keeps one `f64` per grid point, so a run needs roughly
/// `8 * points * slots` bytes for its series.
pub const DEFAULT_MAX_GRID_POINTS: usize = 250_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Runs whose time grid would exceed this many points are refused
    /// before any evaluation.
    pub max_grid_points: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { max_grid_points: DEFAULT_MAX_GRID_POINTS }
    }
}

impl EngineConfig {
    /// Defaults, overridden by `SDSIM_MAX_GRID_POINTS` when it holds a
    /// positive integer.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(raw) = lookup(MAX_GRID_POINTS_ENV) {
            match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => config.max_grid_points = n,
                _ => warn!(
                    event = "config.ignored",
                    key = MAX_GRID_POINTS_ENV,
                    value = %raw,
                    "expected a positive integer; keeping default"
                ),
            }
        }
        config
    }

    pub fn with_max_grid_points(mut self, max_grid_points: usize) -> Self {
        self.max_grid_points = max_grid_points;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, DEFAULT_MAX_GRID_POINTS)]
    #[case(Some("5000"), 5000)]
    #[case(Some(" 42 "), 42)]
    #[case(Some("0"), DEFAULT_MAX_GRID_POINTS)]
    #[case(Some("lots"), DEFAULT_MAX_GRID_POINTS)]
    #[case(Some("-3"), DEFAULT_MAX_GRID_POINTS)]
    fn test_env_override(#[case] raw: Option<&str>, #[case] expected: usize) {
        let config = EngineConfig::from_lookup(|_| raw.map(str::to_string));
        assert_eq!(config.max_grid_points, expected);
    }

    #[test]
    fn test_deserialize_partial() {
        let config: EngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
    }
}
