//! Error taxonomy (spec.md §7). Almost every failure mode in this crate
//! is recoverable — a skipped input, an unparsable class, an
//! unresolvable entry-point spec, even an entirely empty entry-point set
//! — and is reported as a `tracing::warn!` rather than surfaced as a
//! typed error. `AnalysisError` exists only for the one condition
//! spec.md marks fatal, where continuing would produce a silently wrong
//! call graph rather than an incomplete one.

use std::fmt;

/// Fatal conditions that abort an analysis run before a result is
/// produced. Every other error in this crate (malformed class bytes,
/// unreadable archive entries, unresolved entry-point specs, an empty
/// entry-point set) is recoverable and is logged rather than returned.
#[derive(Debug)]
pub(crate) enum AnalysisError {
    /// The extends/implements graph has a cycle; every query this crate
    /// runs over the hierarchy assumes a DAG. `participant` is one FQN
    /// on the cycle, not necessarily the first one encountered.
    HierarchyCycle { participant: String },
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::HierarchyCycle { participant } => write!(
                f,
                "type hierarchy contains a cycle involving {participant}"
            ),
        }
    }
}

impl std::error::Error for AnalysisError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hierarchy_cycle_display_names_the_participant() {
        let err = AnalysisError::HierarchyCycle {
            participant: "a/A".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "type hierarchy contains a cycle involving a/A"
        );
    }
}
