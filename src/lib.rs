//! Polya: a Blackboard fact database for nonlinear arithmetic inequality
//! proving.
//!
//! Reasoning modules assert `TermComparison`s against a shared
//! [`blackboard::Blackboard`]; the Blackboard maintains every comparison
//! known between indexed terms under a monotone saturation model and
//! raises [`error::PolyaError::Contradiction`] the moment the asserted facts
//! become jointly unsatisfiable — the success condition for a proof search
//! built on top of it.

pub mod blackboard;
pub mod error;
pub mod geometry;
pub mod module;
pub mod rational;
pub mod term;

pub use blackboard::Blackboard;
pub use error::{PolyaError, PolyaResult};
pub use module::Module;
pub use term::prelude::*;

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::blackboard::Blackboard;
    pub use crate::error::{PolyaError, PolyaResult};
    pub use crate::geometry::{ComparisonRange, Halfplane};
    pub use crate::module::Module;
    pub use crate::rational::{rat, Extended, Rat};
    pub use crate::term::prelude::*;
}
