use std::collections::BTreeMap;

/// Peak acceptance thresholds for one activity context.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PeakParams {
    /// Minimum magnitude a peak has to exceed
    pub height: f64,
    /// Minimum number of samples between two accepted peaks
    pub distance: usize,
}

/// Thresholds applied to any context without a table entry.
///
/// An unregistered context is not an error: it silently counts with this
/// pair. Callers relying on stricter thresholds have to register them.
pub const DEFAULT_PARAMS: PeakParams = PeakParams {
    height: 0.5,
    distance: 30,
};

/// Immutable context → thresholds table passed into the step counter.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContextParams(BTreeMap<String, PeakParams>);

impl ContextParams {
    /// Table pre-seeded with the built-in walking/jogging/stairs entries.
    pub fn new() -> Self {
        Self::empty()
            .with_context(
                "walking",
                PeakParams {
                    height: 0.5,
                    distance: 30,
                },
            )
            .with_context(
                "jogging",
                PeakParams {
                    height: 1.0,
                    distance: 20,
                },
            )
            .with_context(
                "stairs",
                PeakParams {
                    height: 0.4,
                    distance: 35,
                },
            )
    }

    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    /// Add or override the entry for `label`.
    pub fn with_context(mut self, label: impl Into<String>, params: PeakParams) -> Self {
        self.0.insert(label.into(), params);
        self
    }

    /// Thresholds for `label`, falling back to [`DEFAULT_PARAMS`] for any
    /// unknown context.
    pub fn get(&self, label: &str) -> PeakParams {
        self.0.get(label).copied().unwrap_or(DEFAULT_PARAMS)
    }
}

impl Default for ContextParams {
    fn default() -> Self {
        Self::new()
    }
}
