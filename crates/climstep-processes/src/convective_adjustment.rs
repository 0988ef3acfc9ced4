//! Convective adjustment
//!
//! An adjustment-role process that instantaneously removes convective
//! instability from a one-dimensional column profile. Wherever the decrease
//! between adjacent levels exceeds a critical value, the offending pair is
//! mixed in a mean-preserving way until the whole column is stable, so the
//! column total is conserved up to rounding.

use climstep_core::calendar::TimeRecord;
use climstep_core::errors::{ClimstepError, ClimstepResult};
use climstep_core::process::{Process, ProcessRole, ProcessUpdate};
use climstep_core::state::{FloatValue, ModelState, VariableMap};
use log::debug;
use ndarray::{Array1, Ix1};
use serde::{Deserialize, Serialize};

/// Stability slack; gaps within this of the critical value count as stable.
const STABILITY_TOLERANCE: FloatValue = 1e-10;

/// Parameters for the convective adjustment process
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvectiveAdjustmentParameters {
    /// Largest allowed decrease between adjacent levels, surface to top
    /// unit: K
    pub critical_lapse: FloatValue,
}

/// Mean-preserving convective adjustment of a column profile
///
/// The column is ordered surface to top. Levels `k` and `k + 1` are unstable
/// when `column[k] - column[k + 1]` exceeds the critical lapse; the pair is
/// then reset symmetrically about its mean so the gap equals the critical
/// value exactly. Sweeps repeat until no pair is unstable.
///
/// When the profile is already stable the process contributes nothing, so
/// the state is left byte-identical rather than rewritten.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvectiveAdjustment {
    variable: String,
    parameters: ConvectiveAdjustmentParameters,
}

impl ConvectiveAdjustment {
    pub fn from_parameters(variable: &str, parameters: ConvectiveAdjustmentParameters) -> Self {
        Self {
            variable: variable.to_string(),
            parameters,
        }
    }

    /// Run stabilising sweeps over a copy of the column.
    ///
    /// Returns `None` when the column was already stable.
    fn adjust(&self, column: &Array1<FloatValue>) -> ClimstepResult<Option<Array1<FloatValue>>> {
        let critical = self.parameters.critical_lapse;
        let n = column.len();
        let mut adjusted = column.clone();
        let mut touched = false;

        // Each sweep damps the largest instability geometrically, so the
        // bound is generous; hitting it means the parameters are unusable.
        let max_sweeps = 100 * n.max(1);
        for _ in 0..max_sweeps {
            let mut changed = false;
            for k in 0..n.saturating_sub(1) {
                let gap = adjusted[k] - adjusted[k + 1];
                if gap > critical + STABILITY_TOLERANCE {
                    let mean = 0.5 * (adjusted[k] + adjusted[k + 1]);
                    adjusted[k] = mean + 0.5 * critical;
                    adjusted[k + 1] = mean - 0.5 * critical;
                    changed = true;
                    touched = true;
                }
            }
            if !changed {
                return Ok(if touched { Some(adjusted) } else { None });
            }
        }
        Err(ClimstepError::Process(format!(
            "convective adjustment of '{}' did not stabilise within {} sweeps",
            self.variable, max_sweeps
        )))
    }
}

#[typetag::serde]
impl Process for ConvectiveAdjustment {
    fn role(&self) -> ProcessRole {
        ProcessRole::Adjustment
    }

    fn compute(&self, state: &ModelState, _time: &TimeRecord) -> ClimstepResult<ProcessUpdate> {
        let current = state.get(&self.variable).ok_or_else(|| {
            ClimstepError::Process(format!(
                "adjustment target '{}' is not a state variable",
                self.variable
            ))
        })?;
        let column = current
            .clone()
            .into_dimensionality::<Ix1>()
            .map_err(|_| {
                ClimstepError::Process(format!(
                    "convective adjustment requires a 1-d column, '{}' has shape {:?}",
                    self.variable,
                    current.shape()
                ))
            })?;

        match self.adjust(&column)? {
            Some(adjusted) => {
                let mut map = VariableMap::new();
                map.insert(self.variable.clone(), adjusted.into_dyn());
                Ok(ProcessUpdate::from_adjusted(map))
            }
            None => {
                debug!("column '{}' already stable, no adjustment", self.variable);
                Ok(ProcessUpdate::none())
            }
        }
    }
}
