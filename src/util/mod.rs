//! Utilities: bounded network retry and deadline enforcement.

pub mod retry;
pub mod timeout;
