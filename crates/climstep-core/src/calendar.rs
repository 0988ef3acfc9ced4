//! Calendar-aware time bookkeeping for discrete forward timestepping.

use crate::constants::{SECONDS_PER_DAY, SECONDS_PER_YEAR};
use crate::errors::{ClimstepError, ClimstepResult};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Tracks model time across a run of discrete forward timesteps.
///
/// The record is created (or reset) from a number of steps per calendar year
/// and advanced exactly once per model step. Elapsed days are accumulated by
/// a fixed per-step increment rather than recomputed from the step counter,
/// so year boundaries stay exactly aligned to `num_steps_per_year` steps at
/// the cost of a slightly approximate calendar-day grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeRecord {
    /// Length of one step [s]. Invariant: `timestep * num_steps_per_year == SECONDS_PER_YEAR`.
    timestep: f64,
    /// Length of one step [days].
    timestep_days: f64,
    num_steps_per_year: u32,
    /// Position within the current calendar year, in `[0, num_steps_per_year)`.
    day_of_year_index: u32,
    /// Monotonic step counter since model creation.
    steps: u64,
    days_elapsed: f64,
    years_elapsed: u64,
    /// Calendar-day offset of each step within a year, length `num_steps_per_year`.
    days_of_year: Array1<f64>,
}

impl TimeRecord {
    /// Create a fresh time record, deriving the timestep from the number of
    /// steps per calendar year.
    ///
    /// All counters start at zero. The day grid is built as evenly spaced
    /// offsets from 0 up to (but not including) [`DAYS_PER_YEAR`]; when
    /// `num_steps_per_year` does not divide the year evenly the grid is
    /// approximate and deliberately not recalibrated.
    pub fn new(num_steps_per_year: u32) -> ClimstepResult<Self> {
        if num_steps_per_year == 0 {
            return Err(ClimstepError::InvalidStepsPerYear(num_steps_per_year));
        }
        let timestep = SECONDS_PER_YEAR / num_steps_per_year as f64;
        let timestep_days = timestep / SECONDS_PER_DAY;
        let days_of_year =
            Array1::from_iter((0..num_steps_per_year).map(|i| i as f64 * timestep_days));

        Ok(Self {
            timestep,
            timestep_days,
            num_steps_per_year,
            day_of_year_index: 0,
            steps: 0,
            days_elapsed: 0.0,
            years_elapsed: 0,
            days_of_year,
        })
    }

    /// Advance the record by one step.
    ///
    /// Called exactly once per `step_forward`. Rolls the calendar over into a
    /// new year once every `num_steps_per_year` steps.
    pub fn advance(&mut self) {
        self.steps += 1;
        self.days_elapsed += self.timestep_days;
        if self.day_of_year_index >= self.num_steps_per_year - 1 {
            // Back to Jan. 1
            self.day_of_year_index = 0;
            self.years_elapsed += 1;
        } else {
            self.day_of_year_index += 1;
        }
    }

    /// Length of one step [s].
    pub fn timestep(&self) -> f64 {
        self.timestep
    }

    /// Length of one step [days].
    pub fn timestep_days(&self) -> f64 {
        self.timestep_days
    }

    pub fn num_steps_per_year(&self) -> u32 {
        self.num_steps_per_year
    }

    pub fn day_of_year_index(&self) -> u32 {
        self.day_of_year_index
    }

    /// Total steps taken since model creation.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Time since model creation [days].
    pub fn days_elapsed(&self) -> f64 {
        self.days_elapsed
    }

    /// Completed calendar years since model creation.
    pub fn years_elapsed(&self) -> u64 {
        self.years_elapsed
    }

    /// Calendar-day offset of the current step within the year.
    pub fn day_of_year(&self) -> f64 {
        self.days_of_year[self.day_of_year_index as usize]
    }

    /// The full day-of-year grid, length `num_steps_per_year`.
    pub fn days_of_year(&self) -> &Array1<f64> {
        &self.days_of_year
    }
}
