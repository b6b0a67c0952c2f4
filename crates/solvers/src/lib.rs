//! Numerical solvers for the roller racer simulation.
//!
//! - [`linear`]: small dense linear systems, solved by Gaussian elimination
//!   with partial pivoting in a reusable workspace
//! - [`transient`]: fixed-step time integration of a
//!   [`DynamicSystem`](roller_core::DynamicSystem) with a swappable
//!   [`Method`](transient::Method)

pub mod linear;
pub mod transient;
