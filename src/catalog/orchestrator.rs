//! Candidate list resolution
//!
//! Walks classifier candidates in the order given and keeps the first one
//! the resolver can place in the catalog.

use tracing::debug;

use super::{resolve, Catalog};
use crate::models::{Candidate, CatalogEntry};

/// Resolve the first candidate that matches a catalog entry
///
/// Returns the entry together with that candidate's confidence. Candidates are
/// never re-sorted; the caller's order is trusted.
pub fn resolve_best<'a>(
    catalog: &'a Catalog,
    candidates: &[Candidate],
) -> Option<(&'a CatalogEntry, f64)> {
    for (rank, candidate) in candidates.iter().enumerate() {
        if let Some(entry) = resolve(catalog, &candidate.label) {
            debug!(
                "Candidate #{} '{}' ({:.2}) resolved to '{}'",
                rank + 1,
                candidate.label,
                candidate.confidence,
                entry.name
            );
            return Some((entry, candidate.confidence));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::test_support::catalog;

    #[test]
    fn test_skips_unresolvable_candidates() {
        let catalog = catalog(&["pizza"]);
        let candidates = vec![Candidate::new("blah", 0.9), Candidate::new("pizza", 0.5)];

        let (entry, confidence) = resolve_best(&catalog, &candidates).unwrap();
        assert_eq!(entry.name, "pizza");
        assert_eq!(confidence, 0.5);
    }

    #[test]
    fn test_first_resolvable_candidate_wins() {
        let catalog = catalog(&["sushi", "sashimi"]);
        let candidates = vec![Candidate::new("sashimi", 0.4), Candidate::new("sushi", 0.4)];

        let (entry, _) = resolve_best(&catalog, &candidates).unwrap();
        assert_eq!(entry.name, "sashimi");
    }

    #[test]
    fn test_input_order_is_not_resorted() {
        let catalog = catalog(&["ramen", "pho"]);
        let candidates = vec![Candidate::new("pho", 0.2), Candidate::new("ramen", 0.7)];

        let (entry, confidence) = resolve_best(&catalog, &candidates).unwrap();
        assert_eq!(entry.name, "pho");
        assert_eq!(confidence, 0.2);
    }

    #[test]
    fn test_none_when_nothing_resolves() {
        let catalog = catalog(&["pizza"]);
        let candidates = vec![Candidate::new("blah", 0.9), Candidate::new("xyz", 0.1)];
        assert!(resolve_best(&catalog, &candidates).is_none());
    }

    #[test]
    fn test_empty_candidate_list() {
        let catalog = catalog(&["pizza"]);
        assert!(resolve_best(&catalog, &[]).is_none());
    }
}
