mod averaging;
mod failures;

use crate::model::{Model, ModelBuilder};
use crate::state::FloatValue;
use ndarray::array;

/// A model with one scalar-ish column variable and no processes.
pub(crate) fn bare_model(num_steps_per_year: u32, initial: FloatValue) -> Model {
    ModelBuilder::new()
        .with_num_steps_per_year(num_steps_per_year)
        .with_state_variable("Ts", array![initial].into_dyn())
        .build()
        .unwrap()
}
