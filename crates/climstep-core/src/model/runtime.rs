//! Model struct and the step-forward / integration loops.

use crate::calendar::TimeRecord;
use crate::constants::DAYS_PER_YEAR;
use crate::errors::{ClimstepError, ClimstepResult};
use crate::process::{ProcessRole, ProcessUpdate, P};
use crate::state::{ModelState, VariableMap};
use log::{debug, info, warn};
use ndarray::ArrayD;
use serde::{Deserialize, Serialize};

/// A time-dependent model: an ordered registry of processes acting on a
/// shared state, stepped forward on a leap-free calendar.
///
/// The state is owned exclusively by the model. Processes read it and return
/// buffered updates; only the merge inside [`Model::step_forward`] writes to
/// it. Process invocation order within each role class follows registration
/// order and is stable across runs, which matters when a later process reads
/// diagnostics written by an earlier one in the same step.
#[derive(Debug, Serialize, Deserialize)]
pub struct Model {
    /// The ordered process registry. Order is part of the model's contract.
    processes: Vec<(String, P)>,
    state: ModelState,
    /// Derived quantities from the most recent process computations.
    diagnostics: VariableMap,
    time: TimeRecord,
    /// Running mean of state and diagnostics over the most recent
    /// `integrate_*` call.
    time_average: VariableMap,
}

impl Model {
    pub(crate) fn new(processes: Vec<(String, P)>, state: ModelState, time: TimeRecord) -> Self {
        Self {
            processes,
            state,
            diagnostics: VariableMap::new(),
            time,
            time_average: VariableMap::new(),
        }
    }

    /// The current model state.
    pub fn state(&self) -> &ModelState {
        &self.state
    }

    /// Diagnostics as of the most recent step.
    pub fn diagnostics(&self) -> &VariableMap {
        &self.diagnostics
    }

    /// The calendar/time record.
    pub fn time(&self) -> &TimeRecord {
        &self.time
    }

    /// Time-averaged state and diagnostics from the most recent
    /// `integrate_*` call.
    pub fn time_average(&self) -> &VariableMap {
        &self.time_average
    }

    /// Registered process names, in invocation order.
    pub fn process_names(&self) -> impl Iterator<Item = &str> {
        self.processes.iter().map(|(n, _)| n.as_str())
    }

    /// Change the timestep, given a number of steps per calendar year.
    ///
    /// Resets the time record: all elapsed-time counters return to zero.
    pub fn set_timestep(&mut self, num_steps_per_year: u32) -> ClimstepResult<()> {
        self.time = TimeRecord::new(num_steps_per_year)?;
        Ok(())
    }

    /// Advance the model by one timestep.
    ///
    /// In fixed order: invoke every explicit process and buffer its update;
    /// record implicit processes (reserved slot, no solver yet) and
    /// adjustment processes; validate then merge all buffered tendencies
    /// into the state; compute and apply adjustments in registry order; and
    /// finally advance the calendar.
    ///
    /// If any process fails, or any buffered tendency has the wrong shape,
    /// the step aborts before the state or the clock is touched. An error
    /// from an adjustment process aborts after the tendency merge, since
    /// adjustments act on the merged state.
    pub fn step_forward(&mut self) -> ClimstepResult<()> {
        let mut explicit_updates: Vec<(String, ProcessUpdate)> = vec![];
        let mut adjustment_indexes: Vec<usize> = vec![];

        for (index, (name, process)) in self.processes.iter().enumerate() {
            match process.role() {
                ProcessRole::Explicit => {
                    let update = process.compute(&self.state, &self.time).map_err(|source| {
                        ClimstepError::ProcessFailed {
                            process: name.clone(),
                            source: Box::new(source),
                        }
                    })?;
                    explicit_updates.push((name.clone(), update));
                }
                ProcessRole::Implicit => {
                    // Reserved extension point for a generic implicit solver.
                    debug!("implicit process '{}' has no solver, skipping", name);
                }
                ProcessRole::Adjustment => adjustment_indexes.push(index),
            }
        }

        // Validate the whole buffered update set before mutating anything,
        // so a malformed tendency cannot leave a partially applied step.
        for (name, update) in &explicit_updates {
            for variable in self.state.names() {
                if let Some(tendency) = update.tendencies.get(variable) {
                    self.state.check_shape(name, variable, tendency)?;
                }
            }
        }

        // Merge: add each process's tendency for each state variable, in
        // registry order. A missing tendency is a zero contribution.
        let variables: Vec<String> = self.state.names().map(str::to_string).collect();
        for (name, update) in &explicit_updates {
            for variable in &variables {
                if let Some(tendency) = update.tendencies.get(variable.as_str()) {
                    self.state.apply_tendency(name, variable, tendency)?;
                }
            }
        }
        for (_, update) in explicit_updates {
            for (name, values) in update.diagnostics {
                self.diagnostics.insert(name, values);
            }
        }

        // Adjustment processes change the state instantaneously. Each one
        // replaces only the variables it names; the last writer wins for a
        // variable touched by more than one adjustment.
        for index in adjustment_indexes {
            let (name, process) = &self.processes[index];
            let update = process.compute(&self.state, &self.time).map_err(|source| {
                ClimstepError::ProcessFailed {
                    process: name.clone(),
                    source: Box::new(source),
                }
            })?;
            self.state.merge_adjusted(name, &update.adjusted)?;
            for (diag_name, values) in update.diagnostics {
                self.diagnostics.insert(diag_name, values);
            }
        }

        self.time.advance();
        Ok(())
    }

    /// Timestep the model forward a specified number of years.
    ///
    /// The year count is converted to a whole number of steps (truncated).
    /// Over the call a running mean of every state variable and every
    /// diagnostic present at the start of the call is accumulated and
    /// exposed through [`Model::time_average`]; diagnostics first produced
    /// mid-run are picked up from the next call on.
    ///
    /// Requesting zero steps is a no-op: the average is reset to zeros for
    /// the tracked variables and nothing else changes.
    ///
    /// A failed step aborts the whole call; there is no recovery within an
    /// integration.
    pub fn integrate_years(&mut self, years: f64) -> ClimstepResult<()> {
        let num_steps = self.time.num_steps_per_year() as f64 * years;
        let num_steps = if num_steps > 0.0 {
            num_steps.trunc() as u64
        } else {
            0
        };

        info!(
            "Integrating for {} steps, {} days, or {} years.",
            num_steps,
            years * DAYS_PER_YEAR,
            years
        );

        let mut average: VariableMap = VariableMap::new();
        for (name, values) in self.state.iter() {
            average.insert(name.to_string(), ArrayD::zeros(values.raw_dim()));
        }
        for (name, values) in &self.diagnostics {
            average
                .entry(name.clone())
                .or_insert_with(|| ArrayD::zeros(values.raw_dim()));
        }

        if num_steps == 0 {
            warn!("integration over zero steps requested; model is unchanged");
            self.time_average = average;
            return Ok(());
        }

        for _ in 0..num_steps {
            self.step_forward()?;
            for (name, total) in average.iter_mut() {
                // State takes precedence if a diagnostic shares its name.
                if let Some(values) = self.state.get(name) {
                    *total += values;
                } else if let Some(values) = self.diagnostics.get(name) {
                    *total += values;
                }
            }
        }
        for total in average.values_mut() {
            *total /= num_steps as f64;
        }
        self.time_average = average;

        info!(
            "Total elapsed time is {} years.",
            self.time.days_elapsed() / DAYS_PER_YEAR
        );
        Ok(())
    }

    /// Timestep the model forward a specified number of days.
    ///
    /// Purely a unit conversion around [`Model::integrate_years`].
    pub fn integrate_days(&mut self, days: f64) -> ClimstepResult<()> {
        self.integrate_years(days / DAYS_PER_YEAR)
    }
}
