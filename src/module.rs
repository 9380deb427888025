//! The reasoning-module interface (§9 "Dynamic dispatch over modules").
//!
//! Concrete reasoning modules (polyhedral projection, multiplicative
//! reasoning, congruence/function axioms, builtin axioms, axiom
//! instantiation, ...) are out of scope for the core — they're external
//! collaborators the saturation driver invokes in a round-robin loop until
//! none of them report new information. This trait is the seam between the
//! driver and those collaborators.

use crate::blackboard::Blackboard;
use crate::error::PolyaResult;

/// A reasoning module the external saturation driver holds in its ordered
/// collection and invokes round-robin.
pub trait Module {
    /// Consult the Blackboard's pending updates (via `has_new_info`/
    /// `get_new_info`) and assert whatever new facts follow. Returns
    /// whether any new fact was actually asserted, so the driver can decide
    /// whether another saturation round is warranted.
    fn update_blackboard(&mut self, blackboard: &mut Blackboard) -> PolyaResult<bool>;

    /// A heuristic weight used by case-splitting drivers to choose which
    /// module's preferred split to explore first; higher means more
    /// promising. Modules with no opinion return 0.
    fn get_split_weight(&self, blackboard: &Blackboard) -> i64;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::prelude::*;

    struct NoOp;
    impl Module for NoOp {
        fn update_blackboard(&mut self, _blackboard: &mut Blackboard) -> PolyaResult<bool> {
            Ok(false)
        }
        fn get_split_weight(&self, _blackboard: &Blackboard) -> i64 {
            0
        }
    }

    #[test]
    fn noop_module_reports_no_progress() {
        let mut bb = Blackboard::new();
        let mut m = NoOp;
        assert_eq!(m.update_blackboard(&mut bb).unwrap(), false);
        assert_eq!(m.get_split_weight(&bb), 0);
    }

    #[test]
    fn module_trait_object_is_usable_dynamically() {
        let mut modules: Vec<Box<dyn Module>> = vec![Box::new(NoOp)];
        let mut bb = Blackboard::new();
        for m in modules.iter_mut() {
            m.update_blackboard(&mut bb).unwrap();
        }
        let _ = Term::var("x");
    }
}
