/// Team Match Engine: Aggregator
///
/// Top-level orchestrator. Validates inputs once, delegates sub-scores to
/// `factors`, gaps to `gaps`, and checks result invariants before returning.

use crate::arithmetic::{checked_add, round_to_units};
use crate::domain::{
    ArchetypeProfile, FactorBreakdown, MatchScoreResult, MemberProfile, ScoringConstants,
};
use crate::error::EngineError;
use crate::factors::compute_factors;
use crate::gaps::analyze;
use crate::invariants::{validate_constants, validate_inputs, validate_result};

/// Scoring engine bound to one validated set of constants.
#[derive(Debug, Clone, Default)]
pub struct MatchEngine {
    constants: ScoringConstants,
}

impl MatchEngine {
    /// Create an engine. Fails with `InvalidInput` on inconsistent constants.
    pub fn new(constants: ScoringConstants) -> Result<Self, EngineError> {
        validate_constants(&constants)?;
        Ok(Self { constants })
    }

    pub fn constants(&self) -> &ScoringConstants {
        &self.constants
    }

    /// Score `members` against `archetype`.
    pub fn score(
        &self,
        members: &[MemberProfile],
        archetype: &ArchetypeProfile,
    ) -> Result<MatchScoreResult, EngineError> {
        aggregate(members, archetype, &self.constants)
    }
}

/// Compute the full match score:
///   1. Validate constants and inputs (InvalidInput on failure)
///   2. Run the five factor calculators
///   3. Sum weighted contributions, round, clamp to [0, 100]
///   4. Analyze gaps and recommendations
///   5. Validate result invariants
pub fn aggregate(
    members: &[MemberProfile],
    archetype: &ArchetypeProfile,
    constants: &ScoringConstants,
) -> Result<MatchScoreResult, EngineError> {
    validate_constants(constants)?;
    validate_inputs(members, archetype)?;

    let factors = compute_factors(members, archetype, constants);
    let total_score = total_score(&factors);
    let analysis = analyze(members, archetype, &factors, constants);

    let result = MatchScoreResult {
        total_score,
        factors,
        gaps: analysis.gaps,
        recommendations: analysis.recommendations,
    };
    validate_result(&result);

    tracing::debug!(
        target: "team_match::engine",
        archetype = %archetype.id,
        members = members.len(),
        total_score = result.total_score,
        gaps = result.gaps.len(),
        "match_score.computed"
    );
    Ok(result)
}

/// Weighted sum of all contributions (penalty already negative),
/// rounded to whole points and clamped to [0, 100].
pub fn total_score(factors: &FactorBreakdown) -> i64 {
    let sum = factors
        .iter()
        .fold(0, |acc, f| checked_add(acc, f.contribution));
    round_to_units(sum).clamp(0, 100)
}
