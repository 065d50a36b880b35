/// Team Match Engine: Team Distribution Utilities
///
/// Pure counting over member profiles. Sorted containers and input-order
/// tie breaking for determinism.

use std::collections::BTreeMap;

use crate::domain::{Domain, MemberProfile};

/// Where a strength is best held across the team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BestOccurrence {
    pub member_id: String,
    pub strength_name: String,
    pub rank: u32,
}

// ---------------------------------------------------------------------------
// Domain distribution
// ---------------------------------------------------------------------------

/// Count of top-`k` strengths per domain across the team.
/// Every domain is present in the map, zero if unrepresented.
pub fn domain_counts(members: &[MemberProfile], k: usize) -> BTreeMap<Domain, i64> {
    let mut counts: BTreeMap<Domain, i64> = Domain::ALL.iter().map(|d| (*d, 0)).collect();
    for member in members {
        for ranked in member.top_strengths(k) {
            *counts.entry(ranked.strength.domain).or_insert(0) += 1;
        }
    }
    counts
}

// ---------------------------------------------------------------------------
// Redundancy
// ---------------------------------------------------------------------------

/// Strength name → ids of members holding it in their top-`k`,
/// in member input order.
pub fn strength_holders(
    members: &[MemberProfile],
    k: usize,
) -> BTreeMap<String, Vec<String>> {
    let mut holders: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for member in members {
        for ranked in member.top_strengths(k) {
            holders
                .entry(ranked.strength.name.clone())
                .or_default()
                .push(member.member_id.clone());
        }
    }
    holders
}

// ---------------------------------------------------------------------------
// Best occurrence
// ---------------------------------------------------------------------------

/// Best-ranked occurrence of any strength accepted by `accept`.
/// Lower rank wins; ties go to the earlier member.
pub fn best_occurrence_where<F>(members: &[MemberProfile], accept: F) -> Option<BestOccurrence>
where
    F: Fn(&str) -> bool,
{
    let mut best: Option<BestOccurrence> = None;
    for member in members {
        for ranked in &member.strengths {
            if !accept(&ranked.strength.name) {
                continue;
            }
            let better = match &best {
                Some(b) => ranked.rank < b.rank,
                None => true,
            };
            if better {
                best = Some(BestOccurrence {
                    member_id: member.member_id.clone(),
                    strength_name: ranked.strength.name.clone(),
                    rank: ranked.rank,
                });
            }
        }
    }
    best
}

/// Best-ranked occurrence of `strength_name` across the team.
pub fn best_occurrence(members: &[MemberProfile], strength_name: &str) -> Option<BestOccurrence> {
    best_occurrence_where(members, |name| name == strength_name)
}
