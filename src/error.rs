//! Morph diagnostics.

use thiserror::Error;

/// Non-fatal conditions raised while mutating weights or blending.
///
/// Every variant is recoverable by design: the offending mutation or
/// species contribution is skipped and the rest of the operation proceeds.
/// Hosts decide whether to log, ignore, or escalate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MorphError {
    /// Weight index outside the species range.
    #[error("weight index {index} out of range ({len} species)")]
    IndexOutOfRange { index: usize, len: usize },

    /// Bulk weight update whose length does not match the species count.
    #[error("expected {expected} weights, got {got}")]
    LengthMismatch { expected: usize, got: usize },

    /// Species slot registered without vertex data.
    #[error("species {index} ({label:?}) has no mesh assigned")]
    MissingSource { index: usize, label: String },

    /// Species vertex count differs from the reference topology.
    #[error("species {index} ({label:?}) has {actual} vertices, expected {expected}")]
    TopologyMismatch {
        index: usize,
        label: String,
        expected: usize,
        actual: usize,
    },
}

/// Outcome of one morph pass.
///
/// Issues are advisory; the pass itself always runs to completion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MorphReport {
    /// Species skipped during the pass, in species order.
    pub issues: Vec<MorphError>,
    /// Number of species that contributed to the working buffer.
    pub contributing: usize,
    /// Whether the working buffer was rewritten by this pass.
    ///
    /// False when the pass was deferred or when every positively weighted
    /// species was excluded and the previous buffer was kept.
    pub applied: bool,
}

impl MorphReport {
    /// Returns true if no species was skipped abnormally.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MorphError::TopologyMismatch {
            index: 2,
            label: "macaque".to_string(),
            expected: 1024,
            actual: 512,
        };
        assert_eq!(
            err.to_string(),
            "species 2 (\"macaque\") has 512 vertices, expected 1024"
        );
    }

    #[test]
    fn test_report_is_clean() {
        let mut report = MorphReport {
            applied: true,
            contributing: 2,
            ..Default::default()
        };
        assert!(report.is_clean());

        report.issues.push(MorphError::MissingSource {
            index: 0,
            label: "human".to_string(),
        });
        assert!(!report.is_clean());
    }
}
