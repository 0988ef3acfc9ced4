//! Model state and the per-step variable maps produced by processes.

use crate::errors::{ClimstepError, ClimstepResult};
use ndarray::ArrayD;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The float type used for all state and diagnostic arrays.
pub type FloatValue = f64;

/// A mapping from variable name to array, used for tendencies, diagnostics
/// and adjusted-state maps.
///
/// An absent key always means "no contribution for that variable".
pub type VariableMap = HashMap<String, ArrayD<FloatValue>>;

/// The model's prognostic state: a mapping from variable name to an array of
/// fixed shape.
///
/// The set of variable names is frozen when the model is built; no process
/// may add or remove variables during a run. The state is owned exclusively
/// by the model. Processes read it through a shared reference and change it
/// only via the tendency merge or an adjustment, both of which go through
/// the shape-checked methods here.
///
/// Variables are held as an ordered sequence so that iteration order is
/// deterministic and follows definition order, which keeps the merge order
/// reproducible across runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelState {
    variables: Vec<(String, ArrayD<FloatValue>)>,
}

impl Default for ModelState {
    fn default() -> Self {
        Self::empty()
    }
}

impl ModelState {
    pub fn empty() -> Self {
        Self { variables: vec![] }
    }

    /// Define a new state variable.
    ///
    /// Only the model builder defines variables; after the model is built
    /// the key set never changes.
    pub(crate) fn define(
        &mut self,
        name: &str,
        values: ArrayD<FloatValue>,
    ) -> ClimstepResult<()> {
        if self.contains(name) {
            return Err(ClimstepError::DuplicateVariable(name.to_string()));
        }
        self.variables.push((name.to_string(), values));
        Ok(())
    }

    /// Get the array for a variable, if defined.
    pub fn get(&self, name: &str) -> Option<&ArrayD<FloatValue>> {
        self.variables
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Test if the state contains a variable with the given name.
    pub fn contains(&self, name: &str) -> bool {
        self.variables.iter().any(|(n, _)| n == name)
    }

    /// Variable names in definition order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(|(n, _)| n.as_str())
    }

    /// Iterate over `(name, values)` pairs in definition order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArrayD<FloatValue>)> {
        self.variables.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Check that `values` has the same shape as the named state variable.
    ///
    /// Used to validate a whole buffered update before anything is committed,
    /// so a malformed process output leaves the state untouched.
    pub(crate) fn check_shape(
        &self,
        process: &str,
        name: &str,
        values: &ArrayD<FloatValue>,
    ) -> ClimstepResult<()> {
        let current = self.get(name).ok_or_else(|| ClimstepError::UnknownVariable {
            process: process.to_string(),
            variable: name.to_string(),
        })?;
        if current.shape() != values.shape() {
            return Err(ClimstepError::ShapeMismatch {
                process: process.to_string(),
                variable: name.to_string(),
                expected: current.shape().to_vec(),
                actual: values.shape().to_vec(),
            });
        }
        Ok(())
    }

    /// Add a tendency elementwise, in place.
    pub(crate) fn apply_tendency(
        &mut self,
        process: &str,
        name: &str,
        tendency: &ArrayD<FloatValue>,
    ) -> ClimstepResult<()> {
        self.check_shape(process, name, tendency)?;
        let (_, values) = self
            .variables
            .iter_mut()
            .find(|(n, _)| n == name)
            .expect("checked above");
        *values += tendency;
        Ok(())
    }

    /// Replace the variables named in `adjusted` with the given arrays.
    ///
    /// Adjustments are instantaneous (non-rate) changes. The map must only
    /// name existing state variables with matching shapes; variables it does
    /// not name are left as-is.
    pub(crate) fn merge_adjusted(
        &mut self,
        process: &str,
        adjusted: &VariableMap,
    ) -> ClimstepResult<()> {
        for (name, values) in adjusted {
            self.check_shape(process, name, values)?;
        }
        for (name, values) in adjusted {
            let (_, current) = self
                .variables
                .iter_mut()
                .find(|(n, _)| n == name)
                .expect("checked above");
            current.assign(values);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn state_with_temperature() -> ModelState {
        let mut state = ModelState::empty();
        state
            .define("Ts", array![288.0, 290.0].into_dyn())
            .unwrap();
        state
    }

    #[test]
    fn define_rejects_duplicates() {
        let mut state = state_with_temperature();
        let result = state.define("Ts", array![0.0, 0.0].into_dyn());
        assert!(matches!(result, Err(ClimstepError::DuplicateVariable(_))));
    }

    #[test]
    fn apply_tendency_adds_elementwise() {
        let mut state = state_with_temperature();
        state
            .apply_tendency("test", "Ts", &array![1.0, -1.0].into_dyn())
            .unwrap();
        assert_eq!(state.get("Ts").unwrap(), &array![289.0, 289.0].into_dyn());
    }

    #[test]
    fn apply_tendency_rejects_shape_mismatch() {
        let mut state = state_with_temperature();
        let result = state.apply_tendency("test", "Ts", &array![1.0, 2.0, 3.0].into_dyn());
        assert!(matches!(result, Err(ClimstepError::ShapeMismatch { .. })));
        // Untouched on failure
        assert_eq!(state.get("Ts").unwrap(), &array![288.0, 290.0].into_dyn());
    }

    #[test]
    fn merge_adjusted_replaces_only_named_variables() {
        let mut state = state_with_temperature();
        state.define("q", array![0.5, 0.5].into_dyn()).unwrap();

        let mut adjusted = VariableMap::new();
        adjusted.insert("Ts".to_string(), array![0.0, 0.0].into_dyn());
        state.merge_adjusted("test", &adjusted).unwrap();

        assert_eq!(state.get("Ts").unwrap(), &array![0.0, 0.0].into_dyn());
        assert_eq!(state.get("q").unwrap(), &array![0.5, 0.5].into_dyn());
    }

    #[test]
    fn merge_adjusted_rejects_unknown_variable_without_committing() {
        let mut state = state_with_temperature();
        let mut adjusted = VariableMap::new();
        adjusted.insert("Ts".to_string(), array![0.0, 0.0].into_dyn());
        adjusted.insert("unknown".to_string(), array![0.0].into_dyn());

        let result = state.merge_adjusted("test", &adjusted);
        assert!(matches!(result, Err(ClimstepError::UnknownVariable { .. })));
        assert_eq!(state.get("Ts").unwrap(), &array![288.0, 290.0].into_dyn());
    }
}
