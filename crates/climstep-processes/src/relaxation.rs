//! Newtonian relaxation
//!
//! An explicit process that relaxes a state variable toward a prescribed
//! equilibrium field on a fixed timescale. Commonly used as a stand-in for
//! radiative damping of a temperature field.

use climstep_core::calendar::TimeRecord;
use climstep_core::constants::SECONDS_PER_DAY;
use climstep_core::errors::{ClimstepError, ClimstepResult};
use climstep_core::process::{Process, ProcessRole, ProcessUpdate};
use climstep_core::state::{FloatValue, ModelState};
use ndarray::ArrayD;
use serde::{Deserialize, Serialize};

/// Parameters for the Newtonian relaxation process
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelaxationParameters {
    /// Relaxation timescale
    /// unit: s
    pub tau: FloatValue,
}

/// Newtonian relaxation of one state variable
///
/// Each step the process produces the tendency
///
/// $$ \Delta x = \frac{x_{eq} - x}{\tau} \, \Delta t $$
///
/// where $x_{eq}$ is the prescribed equilibrium field, $\tau$ the relaxation
/// timescale and $\Delta t$ the model timestep. It also publishes the
/// instantaneous relaxation rate (per day) as a diagnostic named
/// `<variable>dot`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewtonianRelaxation {
    variable: String,
    equilibrium: ArrayD<FloatValue>,
    parameters: RelaxationParameters,
}

impl NewtonianRelaxation {
    /// Create a new relaxation process for the named variable.
    pub fn from_parameters(
        variable: &str,
        equilibrium: ArrayD<FloatValue>,
        parameters: RelaxationParameters,
    ) -> Self {
        Self {
            variable: variable.to_string(),
            equilibrium,
            parameters,
        }
    }

    fn rate(&self, current: &ArrayD<FloatValue>) -> ArrayD<FloatValue> {
        (&self.equilibrium - current) / self.parameters.tau
    }
}

#[typetag::serde]
impl Process for NewtonianRelaxation {
    fn role(&self) -> ProcessRole {
        ProcessRole::Explicit
    }

    fn compute(&self, state: &ModelState, time: &TimeRecord) -> ClimstepResult<ProcessUpdate> {
        let current = state.get(&self.variable).ok_or_else(|| {
            ClimstepError::Process(format!(
                "relaxation target '{}' is not a state variable",
                self.variable
            ))
        })?;
        if current.shape() != self.equilibrium.shape() {
            return Err(ClimstepError::Process(format!(
                "equilibrium field for '{}' has shape {:?}, state has {:?}",
                self.variable,
                self.equilibrium.shape(),
                current.shape()
            )));
        }

        let rate = self.rate(current);
        let tendency = &rate * time.timestep();

        Ok(ProcessUpdate::from_tendencies(
            [(self.variable.clone(), tendency)].into_iter().collect(),
        )
        .with_diagnostic(&format!("{}dot", self.variable), rate * SECONDS_PER_DAY))
    }
}
