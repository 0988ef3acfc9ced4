#![allow(dead_code)]

//! Small processes used by the engine's own tests.

use crate::calendar::TimeRecord;
use crate::errors::{ClimstepError, ClimstepResult};
use crate::process::{Process, ProcessRole, ProcessUpdate};
use crate::state::{FloatValue, ModelState, VariableMap};
use ndarray::ArrayD;
use serde::{Deserialize, Serialize};

/// Explicit process producing the same tendency for one variable every step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ConstantTendency {
    pub variable: String,
    pub tendency: ArrayD<FloatValue>,
}

#[typetag::serde]
impl Process for ConstantTendency {
    fn role(&self) -> ProcessRole {
        ProcessRole::Explicit
    }

    fn compute(&self, _state: &ModelState, _time: &TimeRecord) -> ClimstepResult<ProcessUpdate> {
        Ok(ProcessUpdate::none().with_tendency(&self.variable, self.tendency.clone()))
    }
}

/// Explicit process producing a constant diagnostic and no tendencies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ConstantDiagnostic {
    pub name: String,
    pub values: ArrayD<FloatValue>,
}

#[typetag::serde]
impl Process for ConstantDiagnostic {
    fn role(&self) -> ProcessRole {
        ProcessRole::Explicit
    }

    fn compute(&self, _state: &ModelState, _time: &TimeRecord) -> ClimstepResult<ProcessUpdate> {
        Ok(ProcessUpdate::none().with_diagnostic(&self.name, self.values.clone()))
    }
}

/// Adjustment process resetting one variable to zero each step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ZeroingAdjustment {
    pub variable: String,
}

#[typetag::serde]
impl Process for ZeroingAdjustment {
    fn role(&self) -> ProcessRole {
        ProcessRole::Adjustment
    }

    fn compute(&self, state: &ModelState, _time: &TimeRecord) -> ClimstepResult<ProcessUpdate> {
        let current = state
            .get(&self.variable)
            .ok_or_else(|| ClimstepError::UnknownVariable {
                process: "ZeroingAdjustment".to_string(),
                variable: self.variable.clone(),
            })?;
        let mut adjusted = VariableMap::new();
        adjusted.insert(self.variable.clone(), ArrayD::zeros(current.raw_dim()));
        Ok(ProcessUpdate::from_adjusted(adjusted))
    }
}

/// Implicit-role process. Inert until a generic implicit solver exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct InertImplicit {}

#[typetag::serde]
impl Process for InertImplicit {
    fn role(&self) -> ProcessRole {
        ProcessRole::Implicit
    }

    fn compute(&self, _state: &ModelState, _time: &TimeRecord) -> ClimstepResult<ProcessUpdate> {
        Ok(ProcessUpdate::none())
    }
}

/// Process whose `compute` always fails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct FailingProcess {
    pub role: ProcessRole,
    pub message: String,
}

#[typetag::serde]
impl Process for FailingProcess {
    fn role(&self) -> ProcessRole {
        self.role
    }

    fn compute(&self, _state: &ModelState, _time: &TimeRecord) -> ClimstepResult<ProcessUpdate> {
        Err(ClimstepError::Process(self.message.clone()))
    }
}

/// Explicit process reporting a tendency whose shape is under its control,
/// for exercising the merge engine's shape checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ShapedTendency {
    pub variable: String,
    pub shape: Vec<usize>,
    pub value: FloatValue,
}

#[typetag::serde]
impl Process for ShapedTendency {
    fn role(&self) -> ProcessRole {
        ProcessRole::Explicit
    }

    fn compute(&self, _state: &ModelState, _time: &TimeRecord) -> ClimstepResult<ProcessUpdate> {
        let tendency = ArrayD::from_elem(self.shape.clone(), self.value);
        Ok(ProcessUpdate::none().with_tendency(&self.variable, tendency))
    }
}
