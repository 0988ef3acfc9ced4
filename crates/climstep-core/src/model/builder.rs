//! Model builder for constructing models from processes and initial state.

use crate::calendar::TimeRecord;
use crate::errors::{ClimstepError, ClimstepResult};
use crate::process::{Process, ProcessRole, P};
use crate::state::{FloatValue, ModelState};
use log::warn;
use ndarray::ArrayD;
use std::sync::Arc;

use super::runtime::Model;

/// Number of steps per calendar year used when none is configured.
const DEFAULT_STEPS_PER_YEAR: u32 = 90;

/// Build a new model from a set of named processes and an initial state.
///
/// The builder freezes the state's variable set and the process registry
/// order; both are fixed for the model's lifetime. Validation happens at
/// [`ModelBuilder::build`], which fails on duplicate names or an invalid
/// calendar configuration.
pub struct ModelBuilder {
    processes: Vec<(String, P)>,
    state: Vec<(String, ArrayD<FloatValue>)>,
    num_steps_per_year: u32,
}

impl Default for ModelBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelBuilder {
    /// Create a new model builder with default settings.
    pub fn new() -> Self {
        Self {
            processes: vec![],
            state: vec![],
            num_steps_per_year: DEFAULT_STEPS_PER_YEAR,
        }
    }

    /// Define a state variable with its initial values.
    ///
    /// The array's shape is fixed from here on; every tendency or adjustment
    /// for this variable must match it.
    pub fn with_state_variable(&mut self, name: &str, values: ArrayD<FloatValue>) -> &mut Self {
        self.state.push((name.to_string(), values));
        self
    }

    /// Register a process under a unique name.
    ///
    /// Processes are invoked in registration order within each role class.
    pub fn with_process(&mut self, name: &str, process: Arc<dyn Process>) -> &mut Self {
        self.processes.push((name.to_string(), process));
        self
    }

    /// Set the number of steps the model takes per calendar year.
    ///
    /// Controls the timestep length and the day-of-year granularity.
    pub fn with_num_steps_per_year(&mut self, num_steps_per_year: u32) -> &mut Self {
        self.num_steps_per_year = num_steps_per_year;
        self
    }

    /// Validate the configuration and build the model.
    pub fn build(&self) -> ClimstepResult<Model> {
        let time = TimeRecord::new(self.num_steps_per_year)?;

        let mut state = ModelState::empty();
        for (name, values) in &self.state {
            state.define(name, values.clone())?;
        }

        let mut processes: Vec<(String, P)> = Vec::with_capacity(self.processes.len());
        for (name, process) in &self.processes {
            if processes.iter().any(|(n, _)| n == name) {
                return Err(ClimstepError::DuplicateProcess(name.clone()));
            }
            if process.role() == ProcessRole::Implicit {
                // Reserved slot: accepted, but inert until a solver exists.
                warn!(
                    "process '{}' is implicit; no implicit solver is implemented, \
                     so it will have no effect on the state",
                    name
                );
            }
            processes.push((name.clone(), process.clone()));
        }

        Ok(Model::new(processes, state, time))
    }
}
