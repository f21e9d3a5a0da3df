//! Decay-law primitives.
//!
//! - `registry`: the nine tabulated isotopic systems and their decay constants
//! - `law`: pure functions of the exponential decay law (ratio <-> age)

pub mod law;
pub mod registry;

pub use law::*;
pub use registry::*;
