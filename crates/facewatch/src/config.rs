//! Library configuration, loaded from environment variables.

use std::path::PathBuf;

/// Downscale applied to frames before detection.
pub const DEFAULT_RESIZE_FACTOR: f32 = 0.25;

/// Euclidean distance ceiling for a positive match between
/// L2-normalized embeddings.
pub const DEFAULT_MATCH_THRESHOLD: f32 = 1.10;

/// Timeout for each reference-image fetch.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;

/// Registry configuration. `FACEWATCH_*` environment variables override
/// the defaults; CLI flags override both.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory containing the ONNX model files. `None` resolves via
    /// the platform cache (downloading on first use).
    pub model_dir: Option<PathBuf>,
    /// Frame downscale factor in (0, 1].
    pub resize_factor: f32,
    /// Match threshold (Euclidean distance).
    pub match_threshold: f32,
    /// HTTP timeout for reference-image fetches, in seconds.
    pub http_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model_dir: None,
            resize_factor: DEFAULT_RESIZE_FACTOR,
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Load configuration from `FACEWATCH_*` environment variables.
    pub fn from_env() -> Self {
        Self {
            model_dir: std::env::var("FACEWATCH_MODEL_DIR").map(PathBuf::from).ok(),
            resize_factor: checked_resize_factor(env_f32(
                "FACEWATCH_RESIZE_FACTOR",
                DEFAULT_RESIZE_FACTOR,
            )),
            match_threshold: env_f32("FACEWATCH_MATCH_THRESHOLD", DEFAULT_MATCH_THRESHOLD),
            http_timeout_secs: env_u64("FACEWATCH_HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

/// Clamp a resize factor to its valid range (0, 1], falling back to the
/// default (with a warning) when out of range.
pub fn checked_resize_factor(factor: f32) -> f32 {
    if factor > 0.0 && factor <= 1.0 {
        factor
    } else {
        tracing::warn!(factor, default = DEFAULT_RESIZE_FACTOR, "resize factor out of (0, 1], using default");
        DEFAULT_RESIZE_FACTOR
    }
}

fn env_f32(key: &str, default: f32) -> f32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.resize_factor, DEFAULT_RESIZE_FACTOR);
        assert_eq!(config.match_threshold, DEFAULT_MATCH_THRESHOLD);
        assert!(config.model_dir.is_none());
    }

    #[test]
    fn test_checked_resize_factor_accepts_valid() {
        assert_eq!(checked_resize_factor(0.5), 0.5);
        assert_eq!(checked_resize_factor(1.0), 1.0);
    }

    #[test]
    fn test_checked_resize_factor_rejects_invalid() {
        assert_eq!(checked_resize_factor(0.0), DEFAULT_RESIZE_FACTOR);
        assert_eq!(checked_resize_factor(-1.0), DEFAULT_RESIZE_FACTOR);
        assert_eq!(checked_resize_factor(4.0), DEFAULT_RESIZE_FACTOR);
        assert_eq!(checked_resize_factor(f32::NAN), DEFAULT_RESIZE_FACTOR);
    }
}
