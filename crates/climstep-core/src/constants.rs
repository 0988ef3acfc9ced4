//! Calendar constants.
//!
//! These are collaborators of the timestepping core, not owned by it: every
//! process and every time conversion in the model uses the same calendar.
//! The calendar is leap-free; a year is a fixed number of mean solar days.

/// Length of a mean solar day [s].
pub const SECONDS_PER_DAY: f64 = 24.0 * 60.0 * 60.0;

/// Length of the tropical year [days].
pub const DAYS_PER_YEAR: f64 = 365.2422;

/// Length of the tropical year [s].
pub const SECONDS_PER_YEAR: f64 = SECONDS_PER_DAY * DAYS_PER_YEAR;
