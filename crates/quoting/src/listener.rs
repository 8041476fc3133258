// ABOUTME: Observer interface for normalization events, injected into the Normalizer.
// ABOUTME: All callbacks are optional; Detector names the heuristic that fired.

use std::fmt;

use crate::error::QuotingError;

/// The quoting heuristics, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Detector {
    Outlook,
    Hotmail,
    Misc,
    Forwarded,
}

impl fmt::Display for Detector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Detector::Outlook => "outlook",
            Detector::Hotmail => "hotmail",
            Detector::Misc => "misc",
            Detector::Forwarded => "forwarded",
        };
        write!(f, "{}", s)
    }
}

/// Receives events while a [`Normalizer`](crate::Normalizer) runs.
///
/// Every method has an empty default, so listeners implement only what
/// they care about.
pub trait QuotingListener: Send + Sync {
    /// A detector found its marker.
    fn on_marker(&self, _detector: Detector) {}

    /// The fusion pass merged `_count` blockquotes into their predecessors.
    fn on_fused(&self, _count: usize) {}

    /// The fusion pass hit a sibling chain it could not merge.
    fn on_inconsistency(&self, _error: &QuotingError) {}
}
