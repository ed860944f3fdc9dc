//! Testing utilities and mock implementations
//!
//! Lets the router be exercised without a completion endpoint or a trace
//! backend.

pub mod mocks;

pub use mocks::*;
