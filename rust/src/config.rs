//! Configuration for the A* scheduler.

use pyo3::prelude::*;

/// Heuristic names accepted by [`SearchConfig::heuristic`].
pub const HEURISTIC_CRITICAL_PATH: &str = "critical_path";
pub const HEURISTIC_ZERO: &str = "zero";
pub const VALID_HEURISTICS: [&str; 2] = [HEURISTIC_CRITICAL_PATH, HEURISTIC_ZERO];

/// Search configuration: processor count, heuristic choice and budgets.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchConfig {
    /// Number of identical processors (must be at least 1)
    #[pyo3(get, set)]
    pub num_processors: usize,
    /// Heuristic: "critical_path" (remaining critical-path work) or "zero" (uniform cost)
    #[pyo3(get, set)]
    pub heuristic: String,
    /// Abort after this many expansions (None = unlimited)
    #[pyo3(get, set)]
    pub max_expansions: Option<u64>,
    /// Abort after this much wall-clock time in milliseconds (None = unlimited)
    #[pyo3(get, set)]
    pub time_limit_ms: Option<u64>,
    /// Verbosity level: 0=silent, 1=progress, 2=expansions, 3=debug
    #[pyo3(get, set)]
    pub verbosity: u8,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            num_processors: 1,
            heuristic: HEURISTIC_CRITICAL_PATH.to_string(),
            max_expansions: None,
            time_limit_ms: None,
            verbosity: 0,
        }
    }
}

impl SearchConfig {
    /// Default configuration for `num_processors` processors.
    pub fn with_processors(num_processors: usize) -> Self {
        Self {
            num_processors,
            ..Self::default()
        }
    }

    /// Check everything except the heuristic name.
    pub fn validate_processors(&self) -> Result<(), String> {
        if self.num_processors == 0 {
            return Err("num_processors must be at least 1".to_string());
        }
        Ok(())
    }

    /// Check the configuration, returning a description of the first problem.
    pub fn validate(&self) -> Result<(), String> {
        self.validate_processors()?;
        if !VALID_HEURISTICS.contains(&self.heuristic.as_str()) {
            return Err(format!(
                "unknown heuristic {:?} (expected one of {:?})",
                self.heuristic, VALID_HEURISTICS
            ));
        }
        Ok(())
    }
}

#[pymethods]
impl SearchConfig {
    #[new]
    #[pyo3(signature = (
        num_processors=None,
        heuristic=None,
        max_expansions=None,
        time_limit_ms=None,
        verbosity=None
    ))]
    fn new(
        num_processors: Option<usize>,
        heuristic: Option<String>,
        max_expansions: Option<u64>,
        time_limit_ms: Option<u64>,
        verbosity: Option<u8>,
    ) -> Self {
        let defaults = Self::default();
        Self {
            num_processors: num_processors.unwrap_or(defaults.num_processors),
            heuristic: heuristic.unwrap_or(defaults.heuristic),
            max_expansions,
            time_limit_ms,
            verbosity: verbosity.unwrap_or(defaults.verbosity),
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "SearchConfig(num_processors={}, heuristic={:?}, max_expansions={:?}, \
             time_limit_ms={:?}, verbosity={})",
            self.num_processors,
            self.heuristic,
            self.max_expansions,
            self.time_limit_ms,
            self.verbosity
        )
    }
}
