//! Service configuration from environment variables.

use geoid::Interpolation;
use std::path::PathBuf;

/// Grid locations tried when `GEOID_PATH` is not set.
pub const DEFAULT_GEOID_PATHS: &[&str] = &[
    "/usr/local/share/GeographicLib/geoids/egm96-5.pgm",
    "/usr/share/GeographicLib/geoids/egm96-5.pgm",
];

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 8080;

/// Runtime configuration for the geoid service.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    /// Candidate grid files, tried in order.
    pub geoid_paths: Vec<PathBuf>,
    /// HTTP server port.
    pub port: u16,
    /// Interpolation used when a request does not name one.
    pub default_method: Interpolation,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            geoid_paths: DEFAULT_GEOID_PATHS.iter().map(PathBuf::from).collect(),
            port: DEFAULT_PORT,
            default_method: Interpolation::default(),
        }
    }
}

impl ServiceConfig {
    /// Read the configuration from the process environment.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `GEOID_PATH` | `:`-separated candidate grid files | GeographicLib install dirs |
    /// | `GEOID_PORT` | HTTP server port | 8080 |
    /// | `GEOID_METHOD` | Default interpolation (`linear` or `cubic`) | `linear` |
    ///
    /// Unparseable values are logged and replaced by their default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(paths) = lookup("GEOID_PATH") {
            let paths: Vec<PathBuf> = paths
                .split(':')
                .filter(|p| !p.trim().is_empty())
                .map(|p| PathBuf::from(p.trim()))
                .collect();
            if !paths.is_empty() {
                config.geoid_paths = paths;
            }
        }

        if let Some(port) = lookup("GEOID_PORT") {
            match port.trim().parse() {
                Ok(port) => config.port = port,
                Err(_) => tracing::warn!(
                    value = %port,
                    default = DEFAULT_PORT,
                    "Invalid GEOID_PORT, using default"
                ),
            }
        }

        if let Some(method) = lookup("GEOID_METHOD") {
            match method.trim().parse() {
                Ok(method) => config.default_method = method,
                Err(e) => tracing::warn!(
                    value = %method,
                    error = %e,
                    "Invalid GEOID_METHOD, using linear"
                ),
            }
        }

        config
    }
}
