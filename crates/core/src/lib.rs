//! Core traits and types for the roller racer simulation crates.
//!
//! This crate defines the shared abstractions that solvers and vehicle models
//! build on:
//!
//! - [`DynamicSystem`]: a system that writes its state derivative into a
//!   caller-provided buffer
//! - [`StepIntegrable`]: a state that can be advanced along a derivative
//! - [`Observer`]: receives solver events and optionally returns control actions
//! - [`Snapshot`]: a captured time and state pair

mod observer;
mod step;
mod system;

pub use observer::Observer;
pub use step::{DerivativeOf, StepIntegrable};
pub use system::{DynamicSystem, Snapshot};
