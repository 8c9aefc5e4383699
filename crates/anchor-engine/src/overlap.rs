//! Resolves competing claims on the same raw text
//!
//! Quotations are admitted in caller priority order. Each anchored match
//! claims its raw range; a later match overlapping a claimed range is
//! clipped to what remains or dropped, depending on the policy.

use crate::config::OverlapPolicy;
use std::ops::Range;

/// Result of claiming one raw range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    /// Unclaimed pieces of the requested range, ascending
    pub granted: Vec<Range<usize>>,
    /// Whether any part of the request was already claimed
    pub clipped: bool,
}

impl Claim {
    /// The request overlapped earlier claims and nothing was granted
    pub fn is_suppressed(&self) -> bool {
        self.clipped && self.granted.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClaimLedger {
    policy: OverlapPolicy,
    claimed: Vec<Range<usize>>, // Sorted, disjoint, non-adjacent
}

impl ClaimLedger {
    pub fn new(policy: OverlapPolicy) -> Self {
        Self {
            policy,
            claimed: Vec::new(),
        }
    }

    pub fn claimed(&self) -> &[Range<usize>] {
        &self.claimed
    }

    pub fn claim(&mut self, request: Range<usize>) -> Claim {
        if request.start >= request.end {
            return Claim {
                granted: Vec::new(),
                clipped: false,
            };
        }

        let first = self.claimed.partition_point(|c| c.end <= request.start);
        let blocking = self.claimed[first..]
            .iter()
            .take_while(|c| c.start < request.end);

        let mut granted = Vec::new();
        let mut cursor = request.start;
        let mut clipped = false;
        for taken in blocking {
            clipped = true;
            if taken.start > cursor {
                granted.push(cursor..taken.start);
            }
            cursor = cursor.max(taken.end);
        }
        if cursor < request.end {
            granted.push(cursor..request.end);
        }

        if clipped && self.policy == OverlapPolicy::Drop {
            return Claim {
                granted: Vec::new(),
                clipped,
            };
        }

        if !granted.is_empty() {
            self.insert(request);
        }
        Claim { granted, clipped }
    }

    fn insert(&mut self, range: Range<usize>) {
        let first = self.claimed.partition_point(|c| c.end < range.start);
        let last = self.claimed.partition_point(|c| c.start <= range.end);
        let merged = if first < last {
            self.claimed[first].start.min(range.start)..self.claimed[last - 1].end.max(range.end)
        } else {
            range
        };
        self.claimed.splice(first..last, std::iter::once(merged));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_first_claim_is_granted_whole() {
        let mut ledger = ClaimLedger::new(OverlapPolicy::Clip);
        let claim = ledger.claim(10..20);
        assert_eq!(claim.granted, vec![10..20]);
        assert!(!claim.clipped);
    }

    #[test]
    fn test_disjoint_claims_coexist() {
        let mut ledger = ClaimLedger::new(OverlapPolicy::Clip);
        ledger.claim(10..20);
        let claim = ledger.claim(30..40);
        assert_eq!(claim.granted, vec![30..40]);
        assert_eq!(ledger.claimed(), &[10..20, 30..40]);
    }

    #[test]
    fn test_partial_overlap_is_clipped() {
        let mut ledger = ClaimLedger::new(OverlapPolicy::Clip);
        ledger.claim(10..20);
        let claim = ledger.claim(15..30);
        assert_eq!(claim.granted, vec![20..30]);
        assert!(claim.clipped);
        assert_eq!(ledger.claimed(), &[10..30]);
    }

    #[test]
    fn test_straddling_claim_keeps_both_sides() {
        let mut ledger = ClaimLedger::new(OverlapPolicy::Clip);
        ledger.claim(10..20);
        ledger.claim(30..40);
        let claim = ledger.claim(5..45);
        assert_eq!(claim.granted, vec![5..10, 20..30, 40..45]);
        assert_eq!(ledger.claimed(), &[5..45]);
    }

    #[test]
    fn test_contained_claim_is_suppressed() {
        let mut ledger = ClaimLedger::new(OverlapPolicy::Clip);
        ledger.claim(10..40);
        let claim = ledger.claim(15..25);
        assert!(claim.is_suppressed());
        assert_eq!(ledger.claimed(), &[10..40]);
    }

    #[test]
    fn test_adjacent_claims_do_not_overlap() {
        let mut ledger = ClaimLedger::new(OverlapPolicy::Drop);
        ledger.claim(10..20);
        let claim = ledger.claim(20..30);
        assert_eq!(claim.granted, vec![20..30]);
        assert!(!claim.clipped);
        assert_eq!(ledger.claimed(), &[10..30]);
    }

    #[test]
    fn test_drop_policy_rejects_any_overlap() {
        let mut ledger = ClaimLedger::new(OverlapPolicy::Drop);
        ledger.claim(10..20);
        let claim = ledger.claim(19..40);
        assert!(claim.is_suppressed());
        assert_eq!(ledger.claimed(), &[10..20]);
    }

    #[test]
    fn test_empty_request_claims_nothing() {
        let mut ledger = ClaimLedger::new(OverlapPolicy::Clip);
        let claim = ledger.claim(7..7);
        assert!(claim.granted.is_empty());
        assert!(!claim.is_suppressed());
        assert!(ledger.claimed().is_empty());
    }
}
