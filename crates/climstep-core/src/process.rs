//! The contract between the timestepping engine and pluggable processes.

use crate::calendar::TimeRecord;
use crate::errors::ClimstepResult;
use crate::state::{FloatValue, ModelState, VariableMap};
use ndarray::ArrayD;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::sync::Arc;

/// Type alias for a process wrapped in an Arc for shared ownership.
pub type P = Arc<dyn Process>;

/// How a process contributes to the state update.
///
/// Exactly one role per process, fixed at construction. A process cannot be
/// in an inconsistent multi-role configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessRole {
    /// Produces tendencies that are added to the state during the merge.
    Explicit,
    /// Reserved for a generic implicit solver. Implicit processes are
    /// accepted at registration but currently have no state effect.
    Implicit,
    /// Produces an instantaneous partial replacement of the state, applied
    /// after all tendencies have been merged.
    Adjustment,
}

impl Display for ProcessRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessRole::Explicit => write!(f, "explicit"),
            ProcessRole::Implicit => write!(f, "implicit"),
            ProcessRole::Adjustment => write!(f, "adjustment"),
        }
    }
}

/// Everything a process hands back from one `compute` call.
///
/// Updates are buffered by the engine: nothing touches the model state until
/// every explicit process in the step has computed successfully and all
/// output shapes have been validated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessUpdate {
    /// Per-variable change to apply for this step, added elementwise to the
    /// state. Variables not named here receive a zero contribution.
    pub tendencies: VariableMap,
    /// Derived quantities produced as a side effect (fluxes, rates, ...).
    /// Not part of the state, but eligible for time-averaging.
    pub diagnostics: VariableMap,
    /// Partial replacement state produced by adjustment processes. Only the
    /// variables named here are overwritten.
    pub adjusted: VariableMap,
}

impl ProcessUpdate {
    /// An update contributing nothing.
    pub fn none() -> Self {
        Self::default()
    }

    /// An update carrying only tendencies.
    pub fn from_tendencies(tendencies: VariableMap) -> Self {
        Self {
            tendencies,
            ..Self::default()
        }
    }

    /// An update carrying only an adjusted partial state.
    pub fn from_adjusted(adjusted: VariableMap) -> Self {
        Self {
            adjusted,
            ..Self::default()
        }
    }

    /// Attach a single tendency.
    pub fn with_tendency(mut self, name: &str, values: ArrayD<FloatValue>) -> Self {
        self.tendencies.insert(name.to_string(), values);
        self
    }

    /// Attach a single diagnostic.
    pub fn with_diagnostic(mut self, name: &str, values: ArrayD<FloatValue>) -> Self {
        self.diagnostics.insert(name.to_string(), values);
        self
    }

    /// Does this update carry a tendency for the given variable?
    ///
    /// A missing tendency is an intentional zero contribution, so the merge
    /// asks this question explicitly instead of trapping a failed lookup.
    pub fn has_tendency(&self, name: &str) -> bool {
        self.tendencies.contains_key(name)
    }
}

/// A pluggable component contributing to the state change each step.
///
/// Processes are registered once at model construction and persist for the
/// model's lifetime. They own no state themselves: each step they receive a
/// read-only view of the current state and the time record, and return their
/// contribution as a [`ProcessUpdate`].
///
/// Depending on [`Process::role`], after `compute` returns the update is
/// expected to carry tendencies (explicit), an adjusted partial state
/// (adjustment), or nothing yet specified (implicit, reserved).
#[typetag::serde]
pub trait Process: std::fmt::Debug + Send + Sync {
    /// The role this process plays in the state update.
    fn role(&self) -> ProcessRole;

    /// Compute this process's contribution for the current step.
    ///
    /// Tendency arrays must match the shape of the corresponding state
    /// variable; the engine fails the step on any mismatch rather than
    /// broadcasting.
    fn compute(&self, state: &ModelState, time: &TimeRecord) -> ClimstepResult<ProcessUpdate>;
}
