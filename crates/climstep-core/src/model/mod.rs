//! A model combines a set of named processes with the state they act on.
//!
//! Each step the model invokes every registered process according to its
//! role, merges the resulting tendencies into the state in a fixed order,
//! applies any adjustments and then advances the calendar. The integration
//! drivers wrap this step in a loop and maintain a running time-average of
//! the state and diagnostics over the call.
//!
//! Process invocation order within a role follows registration order. The
//! registry is an explicit ordered sequence, so the ordering contract is a
//! visible part of the API rather than an incidental property of a map type.

mod builder;
mod runtime;

#[cfg(test)]
mod tests;

// Public re-exports
pub use builder::ModelBuilder;
pub use runtime::Model;
