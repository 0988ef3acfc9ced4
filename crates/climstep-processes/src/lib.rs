//! Concrete physical processes for the climstep timestepping core.

pub mod convective_adjustment;
pub mod relaxation;

pub use convective_adjustment::{ConvectiveAdjustment, ConvectiveAdjustmentParameters};
pub use relaxation::{NewtonianRelaxation, RelaxationParameters};
