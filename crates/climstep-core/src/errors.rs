use thiserror::Error;

/// Error type for invalid operations.
#[derive(Error, Debug)]
pub enum ClimstepError {
    #[error("num_steps_per_year must be a positive integer, got {0}")]
    InvalidStepsPerYear(u32),
    #[error("a process named '{0}' is already registered")]
    DuplicateProcess(String),
    #[error("a state variable named '{0}' is already defined")]
    DuplicateVariable(String),
    #[error("process '{process}' wrote to '{variable}', which is not a state variable")]
    UnknownVariable { process: String, variable: String },
    #[error("process '{process}' produced '{variable}' with shape {actual:?}, expected {expected:?}")]
    ShapeMismatch {
        process: String,
        variable: String,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },
    #[error("process '{process}' failed: {source}")]
    ProcessFailed {
        process: String,
        #[source]
        source: Box<ClimstepError>,
    },
    #[error("{0}")]
    Process(String),
}

/// Convenience type for `Result<T, ClimstepError>`.
pub type ClimstepResult<T> = Result<T, ClimstepError>;
