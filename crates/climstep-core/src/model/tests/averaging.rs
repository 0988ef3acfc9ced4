//! Integration drivers and the time-average accumulator.

use crate::constants::DAYS_PER_YEAR;
use crate::example_processes::{ConstantDiagnostic, ConstantTendency};
use crate::model::{Model, ModelBuilder};
use ndarray::array;
use std::sync::Arc;

use super::bare_model;

#[test]
fn integrate_years_takes_truncated_whole_steps() {
    let mut model = bare_model(90, 288.0);
    model.integrate_years(0.5).unwrap();
    assert_eq!(model.time().steps(), 45);

    let mut model = bare_model(90, 288.0);
    model.integrate_years(2.0).unwrap();
    assert_eq!(model.time().steps(), 180);
    assert_eq!(model.time().years_elapsed(), 2);
    assert_eq!(model.time().day_of_year_index(), 0);
}

#[test]
fn average_of_a_constant_state_is_the_constant() {
    let mut model = bare_model(8, 2.0);
    model.integrate_years(1.0).unwrap();
    assert_eq!(
        model.time_average().get("Ts").unwrap(),
        &array![2.0].into_dyn()
    );
}

#[test]
fn average_of_a_linearly_increasing_state() {
    // With x starting at -1 and a unit tendency, the post-step samples are
    // exactly 0, 1, ..., n-1, so the mean is (n - 1) / 2.
    let n = 4u32;
    let mut model = ModelBuilder::new()
        .with_num_steps_per_year(n)
        .with_state_variable("x", array![-1.0].into_dyn())
        .with_process(
            "increment",
            Arc::new(ConstantTendency {
                variable: "x".to_string(),
                tendency: array![1.0].into_dyn(),
            }),
        )
        .build()
        .unwrap();

    model.integrate_years(1.0).unwrap();
    assert_eq!(
        model.time_average().get("x").unwrap(),
        &array![(n as f64 - 1.0) / 2.0].into_dyn()
    );
}

#[test]
fn zero_step_integration_is_a_guarded_no_op() {
    let mut model = bare_model(90, 288.0);
    model.integrate_years(0.0).unwrap();
    assert_eq!(model.time().steps(), 0);
    // The accumulator is reset, not divided.
    assert_eq!(
        model.time_average().get("Ts").unwrap(),
        &array![0.0].into_dyn()
    );

    // A fraction of a year too small for a single step behaves the same.
    model.integrate_years(0.001).unwrap();
    assert_eq!(model.time().steps(), 0);
}

#[test]
fn diagnostics_join_the_average_from_the_next_call_on() {
    let mut model = ModelBuilder::new()
        .with_num_steps_per_year(4)
        .with_state_variable("Ts", array![288.0].into_dyn())
        .with_process(
            "flux",
            Arc::new(ConstantDiagnostic {
                name: "OLR".to_string(),
                values: array![240.0, 241.0].into_dyn(),
            }),
        )
        .build()
        .unwrap();

    // No diagnostics exist when the first call starts.
    model.integrate_years(1.0).unwrap();
    assert!(model.time_average().get("OLR").is_none());
    assert!(model.diagnostics().get("OLR").is_some());

    // They are part of the tracked union from the second call.
    model.integrate_years(1.0).unwrap();
    assert_eq!(
        model.time_average().get("OLR").unwrap(),
        &array![240.0, 241.0].into_dyn()
    );
}

#[test]
fn integrate_days_is_exactly_integrate_years() {
    fn build() -> Model {
        ModelBuilder::new()
            .with_num_steps_per_year(36)
            .with_state_variable("Ts", array![10.0, 20.0].into_dyn())
            .with_process(
                "warming",
                Arc::new(ConstantTendency {
                    variable: "Ts".to_string(),
                    tendency: array![0.25, -0.5].into_dyn(),
                }),
            )
            .build()
            .unwrap()
    }

    let days = 500.0;
    let mut by_days = build();
    let mut by_years = build();
    by_days.integrate_days(days).unwrap();
    by_years.integrate_years(days / DAYS_PER_YEAR).unwrap();

    assert_eq!(by_days.time(), by_years.time());
    assert_eq!(by_days.state(), by_years.state());
    assert_eq!(
        by_days.time_average().get("Ts").unwrap(),
        by_years.time_average().get("Ts").unwrap()
    );
}
