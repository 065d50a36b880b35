//! Score drift: determinism verification and result comparison.
//!
//! All numeric values are fixed-point i64 (SCALE = 10_000).
//! No float arithmetic anywhere.

use std::collections::BTreeMap;

use team_match_engine::domain::{
    ArchetypeProfile, FactorKind, GapPriority, MatchScoreResult, MemberProfile, ScoringConstants,
};
use team_match_engine::engine::aggregate;
use team_match_engine::hashing::canonical_hash;
use team_match_engine::EngineError;

/// Score the same inputs twice and assert identical canonical hashes.
/// Panics on mismatch; returns the hash otherwise.
pub fn verify_determinism(
    members: &[MemberProfile],
    archetype: &ArchetypeProfile,
    constants: &ScoringConstants,
) -> Result<String, EngineError> {
    let hash1 = canonical_hash(&aggregate(members, archetype, constants)?);
    let hash2 = canonical_hash(&aggregate(members, archetype, constants)?);

    if hash1 != hash2 {
        panic!(
            "DETERMINISM FAILURE: two scoring runs produced different hashes.\n\
             Run 1: {}\n\
             Run 2: {}",
            hash1, hash2
        );
    }
    Ok(hash1)
}

/// Per-factor movement between two results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactorDrift {
    pub kind: FactorKind,
    pub score_a: i64,
    pub score_b: i64,
    pub score_delta: i64,
    pub contribution_delta: i64,
}

/// A gap present in both results whose priority changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reprioritized {
    pub strength_name: String,
    pub from: GapPriority,
    pub to: GapPriority,
}

/// Structured comparison of two results. All numeric fields are i64.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreDrift {
    pub total_a: i64,
    pub total_b: i64,
    pub total_delta: i64,
    pub factors: Vec<FactorDrift>,
    /// Gaps in `a` that `b` no longer has.
    pub gaps_closed: Vec<String>,
    /// Gaps in `b` that `a` did not have.
    pub gaps_opened: Vec<String>,
    pub reprioritized: Vec<Reprioritized>,
}

impl ScoreDrift {
    pub fn is_unchanged(&self) -> bool {
        self.total_delta == 0
            && self.factors.iter().all(|f| f.score_delta == 0)
            && self.gaps_closed.is_empty()
            && self.gaps_opened.is_empty()
            && self.reprioritized.is_empty()
    }
}

/// Compare `a` (before) with `b` (after).
pub fn compare_results(a: &MatchScoreResult, b: &MatchScoreResult) -> ScoreDrift {
    let factors = FactorKind::ALL
        .iter()
        .map(|kind| {
            let fa = a.factors.get(*kind);
            let fb = b.factors.get(*kind);
            FactorDrift {
                kind: *kind,
                score_a: fa.score,
                score_b: fb.score,
                score_delta: fb.score - fa.score,
                contribution_delta: fb.contribution - fa.contribution,
            }
        })
        .collect();

    let gaps_a: BTreeMap<&str, GapPriority> = a
        .gaps
        .iter()
        .map(|g| (g.strength_name.as_str(), g.priority))
        .collect();
    let gaps_b: BTreeMap<&str, GapPriority> = b
        .gaps
        .iter()
        .map(|g| (g.strength_name.as_str(), g.priority))
        .collect();

    let gaps_closed = gaps_a
        .keys()
        .filter(|name| !gaps_b.contains_key(*name))
        .map(|name| name.to_string())
        .collect();
    let gaps_opened = gaps_b
        .keys()
        .filter(|name| !gaps_a.contains_key(*name))
        .map(|name| name.to_string())
        .collect();

    let mut reprioritized = Vec::new();
    for (name, from) in &gaps_a {
        if let Some(to) = gaps_b.get(name) {
            if from != to {
                reprioritized.push(Reprioritized {
                    strength_name: name.to_string(),
                    from: *from,
                    to: *to,
                });
            }
        }
    }

    ScoreDrift {
        total_a: a.total_score,
        total_b: b.total_score,
        total_delta: b.total_score - a.total_score,
        factors,
        gaps_closed,
        gaps_opened,
        reprioritized,
    }
}
