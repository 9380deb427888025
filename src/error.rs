use thiserror::Error;

/// Errors raised by the Blackboard.
///
/// Every other "failure" in the core is absence of information: queries
/// return `false` or `ComparisonRange::empty()` rather than an `Err`. Only
/// these two shapes ever propagate out of the public API.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolyaError {
    /// An assertion is inconsistent with facts already on the Blackboard,
    /// a clause has been reduced to zero literals, or `assert_comparison`
    /// was called on a fact whose negation already holds.
    ///
    /// A driver should treat this as the primary successful termination
    /// signal of the prover, not as a bug.
    #[error("Contradiction: {message}")]
    Contradiction { message: String },

    /// An untyped term reached `term_name`, an internal invariant (I1–I4)
    /// was violated, or an unrecognized comparison discriminant was
    /// dispatched on. Indicates a caller bug; not recoverable within the
    /// core.
    #[error("Structural error: {message}")]
    Structural { message: String },
}

impl PolyaError {
    pub fn contradiction(message: impl Into<String>) -> Self {
        PolyaError::Contradiction { message: message.into() }
    }

    pub fn structural(message: impl Into<String>) -> Self {
        PolyaError::Structural { message: message.into() }
    }

    /// True for `Contradiction`; the sense in which the prover "succeeds".
    pub fn is_contradiction(&self) -> bool {
        matches!(self, PolyaError::Contradiction { .. })
    }
}

/// Result type used throughout the Blackboard.
pub type PolyaResult<T> = Result<T, PolyaError>;
