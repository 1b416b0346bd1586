/// Validation and degeneracy failures raised by the hypothesis tests.
///
/// Public operations return `anyhow::Result`; these values travel inside the
/// `anyhow::Error` and can be recovered with `downcast_ref::<HypothesisTestError>()`.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum HypothesisTestError {
    #[display("need at least two groups, got {found}")]
    InsufficientGroups { found: usize },
    #[display("group {index} is empty")]
    EmptySample { index: usize },
    #[display("group {index} has {found} observations, expected {expected}")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },
    #[display("degenerate input: {reason}")]
    Degenerate { reason: &'static str },
}
