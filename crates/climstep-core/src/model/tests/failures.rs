//! Failure semantics: aborted steps must not leave a partially applied state.

use crate::errors::ClimstepError;
use crate::example_processes::{ConstantTendency, FailingProcess, ShapedTendency};
use crate::model::ModelBuilder;
use crate::process::ProcessRole;
use ndarray::array;
use std::sync::Arc;

#[test]
fn failed_explicit_process_aborts_the_step_with_state_unchanged() {
    let mut model = ModelBuilder::new()
        .with_state_variable("Ts", array![7.0].into_dyn())
        .with_process(
            "warming",
            Arc::new(ConstantTendency {
                variable: "Ts".to_string(),
                tendency: array![1.0].into_dyn(),
            }),
        )
        .with_process(
            "broken",
            Arc::new(FailingProcess {
                role: ProcessRole::Explicit,
                message: "physics exploded".to_string(),
            }),
        )
        .build()
        .unwrap();

    let result = model.step_forward();
    match result {
        Err(ClimstepError::ProcessFailed { process, .. }) => assert_eq!(process, "broken"),
        other => panic!("expected ProcessFailed, got {:?}", other),
    }
    // Tendencies from the earlier process were buffered, never committed.
    assert_eq!(model.state().get("Ts").unwrap(), &array![7.0].into_dyn());
    assert_eq!(model.time().steps(), 0);
}

#[test]
fn tendency_shape_mismatch_aborts_before_any_commit() {
    let mut model = ModelBuilder::new()
        .with_state_variable("Ts", array![1.0, 2.0].into_dyn())
        .with_process(
            "good",
            Arc::new(ConstantTendency {
                variable: "Ts".to_string(),
                tendency: array![1.0, 1.0].into_dyn(),
            }),
        )
        .with_process(
            "bad shape",
            Arc::new(ShapedTendency {
                variable: "Ts".to_string(),
                shape: vec![3],
                value: 1.0,
            }),
        )
        .build()
        .unwrap();

    let result = model.step_forward();
    assert!(matches!(result, Err(ClimstepError::ShapeMismatch { .. })));
    assert_eq!(
        model.state().get("Ts").unwrap(),
        &array![1.0, 2.0].into_dyn()
    );
    assert_eq!(model.time().steps(), 0);
}

#[test]
fn failed_adjustment_aborts_without_advancing_time() {
    let mut model = ModelBuilder::new()
        .with_state_variable("Ts", array![7.0].into_dyn())
        .with_process(
            "broken adjustment",
            Arc::new(FailingProcess {
                role: ProcessRole::Adjustment,
                message: "no convergence".to_string(),
            }),
        )
        .build()
        .unwrap();

    let result = model.step_forward();
    assert!(matches!(result, Err(ClimstepError::ProcessFailed { .. })));
    assert_eq!(model.time().steps(), 0);
}

#[test]
fn integration_aborts_on_the_first_failed_step() {
    let mut model = ModelBuilder::new()
        .with_num_steps_per_year(10)
        .with_state_variable("Ts", array![0.0].into_dyn())
        .with_process(
            "broken",
            Arc::new(FailingProcess {
                role: ProcessRole::Explicit,
                message: "nope".to_string(),
            }),
        )
        .build()
        .unwrap();

    assert!(model.integrate_years(1.0).is_err());
    assert_eq!(model.time().steps(), 0);
}
