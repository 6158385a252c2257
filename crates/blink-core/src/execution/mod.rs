//! Execution of action components
//!
//! [`machine`] holds the pure transition function; [`session`] owns a loaded
//! blink and performs the effects the machine asks for.

pub mod machine;
pub mod session;

pub use machine::{
    transition, Effect, ExecutionEvent, ExecutionState, Transition, DEFAULT_ERROR_MESSAGE,
};
pub use session::{Blink, BlinkContext};
