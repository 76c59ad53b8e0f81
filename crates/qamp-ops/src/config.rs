//! Serializable amplification settings.
//!
//! ```json
//! { "iterations": 3, "flag_index": 0, "schedule": { "kind": "standard" } }
//! ```
//!
//! A custom schedule carries its own phases and ignores `iterations`:
//!
//! ```json
//! { "schedule": { "kind": "custom", "phases": [{ "marked": 3.14, "start": 1.57 }] } }
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::amplification::{ReflectionPhases, optimal_iterations};
use crate::error::{OpError, OpResult};

/// How the phase schedule is chosen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Schedule {
    /// Every phase is `π`.
    #[default]
    Standard,
    /// Explicit, validated phases.
    Custom {
        /// One pair per iteration.
        phases: ReflectionPhases,
    },
}

/// Settings for an amplification run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmplificationConfig {
    /// Iteration count for the standard schedule; derived from the target
    /// fraction when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iterations: Option<i64>,
    /// Phase schedule.
    pub schedule: Schedule,
    /// Position of the flag qubit in the search register.
    pub flag_index: usize,
}

impl AmplificationConfig {
    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> OpResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> OpResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Resolve the phase schedule.
    ///
    /// `target_fraction` is the marked share of the start state; it is only
    /// consulted for a standard schedule without an explicit iteration count.
    pub fn phases(&self, target_fraction: Option<f64>) -> OpResult<ReflectionPhases> {
        let phases = match (&self.schedule, self.iterations, target_fraction) {
            (Schedule::Custom { phases }, _, _) => phases.clone(),
            (Schedule::Standard, Some(n), _) => ReflectionPhases::try_standard(n)?,
            (Schedule::Standard, None, Some(fraction)) => {
                ReflectionPhases::standard(optimal_iterations(fraction)?)
            }
            (Schedule::Standard, None, None) => return Err(OpError::MissingIterationCount),
        };
        debug!(
            iterations = phases.iterations(),
            standard = phases.is_standard(),
            "resolved phase schedule"
        );
        Ok(phases)
    }
}
