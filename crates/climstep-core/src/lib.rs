pub mod calendar;
pub mod constants;
pub mod errors;
mod example_processes;
pub mod model;
pub mod process;
pub mod state;
