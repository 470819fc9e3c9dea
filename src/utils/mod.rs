//! Utilities module
//!
//! Contains error handling, the time source abstraction, and logging helpers

pub mod clock;
pub mod error;
pub mod logging;
