//! Age solvers.
//!
//! - `single`: closed-form age from one parent/daughter count pair
//! - `average`: representative age of a ratio batch with first-order uncertainty

pub mod average;
pub mod single;

pub use average::*;
pub use single::*;
