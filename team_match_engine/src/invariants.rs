/// Team Match Engine: Invariant Checks
///
/// Input checks return `EngineError::InvalidInput` and run once at the
/// public boundary. Result checks are hard-fail: a breach after scoring
/// means the kernel itself is broken.

use std::collections::BTreeSet;

use crate::arithmetic::{validate_member_id, MAX_SCORE, SCALE};
use crate::domain::{
    ArchetypeProfile, FactorKind, GapPriority, MatchScoreResult, MemberProfile, RankDecay,
    ScoringConstants,
};
use crate::error::EngineError;

pub const MIN_TEAM_SIZE: usize = 2;
pub const MAX_TEAM_SIZE: usize = 10;

// ---------------------------------------------------------------------------
// Input validation (boundary)
// ---------------------------------------------------------------------------

/// Team size within [MIN_TEAM_SIZE, MAX_TEAM_SIZE].
pub fn validate_team_size(size: usize) -> Result<(), EngineError> {
    if !(MIN_TEAM_SIZE..=MAX_TEAM_SIZE).contains(&size) {
        return Err(EngineError::InvalidInput(format!(
            "team size {} outside [{}, {}]",
            size, MIN_TEAM_SIZE, MAX_TEAM_SIZE
        )));
    }
    Ok(())
}

/// Size, format and distinctness of a member id list.
pub fn validate_member_ids<S: AsRef<str>>(ids: &[S]) -> Result<(), EngineError> {
    validate_team_size(ids.len())?;
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    for id in ids {
        let id = id.as_ref();
        validate_member_id(id)?;
        if !seen.insert(id) {
            return Err(EngineError::InvalidInput(format!(
                "duplicate member ID {:?}",
                id
            )));
        }
    }
    Ok(())
}

/// Everything the factor calculators assume about their inputs.
pub fn validate_inputs(
    members: &[MemberProfile],
    archetype: &ArchetypeProfile,
) -> Result<(), EngineError> {
    let ids: Vec<&str> = members.iter().map(|m| m.member_id.as_str()).collect();
    validate_member_ids(&ids)?;
    for member in members {
        validate_profile(member)?;
    }
    validate_archetype(archetype)
}

/// Ranks >= 1 and unique, each strength held once.
pub fn validate_profile(member: &MemberProfile) -> Result<(), EngineError> {
    let mut ranks: BTreeSet<u32> = BTreeSet::new();
    let mut names: BTreeSet<&str> = BTreeSet::new();
    for ranked in &member.strengths {
        if ranked.rank == 0 {
            return Err(EngineError::InvalidInput(format!(
                "member {:?}: rank must be >= 1 for {:?}",
                member.member_id, ranked.strength.name
            )));
        }
        if !ranks.insert(ranked.rank) {
            return Err(EngineError::InvalidInput(format!(
                "member {:?}: duplicate rank {}",
                member.member_id, ranked.rank
            )));
        }
        if !names.insert(ranked.strength.name.as_str()) {
            return Err(EngineError::InvalidInput(format!(
                "member {:?}: strength {:?} listed twice",
                member.member_id, ranked.strength.name
            )));
        }
    }
    Ok(())
}

/// Weights in (0, SCALE], unique ideal strengths, a consistent size range.
pub fn validate_archetype(archetype: &ArchetypeProfile) -> Result<(), EngineError> {
    let invalid = |msg: String| {
        Err(EngineError::InvalidInput(format!(
            "archetype {:?}: {}",
            archetype.id, msg
        )))
    };

    if archetype.ideal_strengths.is_empty() {
        return invalid("no ideal strengths".to_string());
    }
    let mut names: BTreeSet<&str> = BTreeSet::new();
    for ideal in &archetype.ideal_strengths {
        if ideal.weight <= 0 || ideal.weight > SCALE {
            return invalid(format!(
                "weight {} for {:?} outside (0, {}]",
                ideal.weight, ideal.strength.name, SCALE
            ));
        }
        if !names.insert(ideal.strength.name.as_str()) {
            return invalid(format!("ideal strength {:?} listed twice", ideal.strength.name));
        }
    }
    for (trait_name, weight) in &archetype.culture_weights {
        if *weight <= 0 || *weight > SCALE {
            return invalid(format!(
                "culture weight {} for {:?} outside (0, {}]",
                weight, trait_name, SCALE
            ));
        }
    }

    let r = archetype.ideal_team_size;
    let ordered = r.min <= r.sweet_spot && r.sweet_spot <= r.max;
    if !ordered || r.min < MIN_TEAM_SIZE || r.max > MAX_TEAM_SIZE {
        return invalid(format!(
            "ideal team size min={} sweet_spot={} max={} must satisfy {} <= min <= sweet_spot <= max <= {}",
            r.min, r.sweet_spot, r.max, MIN_TEAM_SIZE, MAX_TEAM_SIZE
        ));
    }
    Ok(())
}

/// Scoring constants are internally consistent.
pub fn validate_constants(constants: &ScoringConstants) -> Result<(), EngineError> {
    let invalid = |msg: String| Err(EngineError::InvalidInput(format!("scoring constants: {}", msg)));
    let w = &constants.weights;

    if w.positive_sum() != SCALE {
        return invalid(format!(
            "positive factor weights sum to {}, expected {}",
            w.positive_sum(),
            SCALE
        ));
    }
    for kind in FactorKind::ALL {
        let weight = w.for_kind(kind);
        if !(0..=SCALE).contains(&weight) {
            return invalid(format!("{} weight {} outside [0, {}]", kind.as_str(), weight, SCALE));
        }
    }
    if constants.top_k == 0 {
        return invalid("top_k must be >= 1".to_string());
    }
    if let RankDecay::Table { weights } = &constants.rank_decay {
        if weights.first() != Some(&SCALE) {
            return invalid(format!("rank decay table must start at {}", SCALE));
        }
        if weights.iter().any(|v| *v <= 0) || weights.windows(2).any(|p| p[1] > p[0]) {
            return invalid("rank decay table must be positive and non-increasing".to_string());
        }
    }
    for (name, value) in [
        ("covered_threshold", constants.covered_threshold),
        ("high_weight_threshold", constants.high_weight_threshold),
        ("presence_share", constants.presence_share),
    ] {
        if !(0..=SCALE).contains(&value) {
            return invalid(format!("{} {} outside [0, {}]", name, value, SCALE));
        }
    }
    for (name, value) in [
        ("missing_critical_cap_points", constants.missing_critical_cap_points),
        ("size_edge_points", constants.size_edge_points),
        ("size_step_points", constants.size_step_points),
    ] {
        if !(0..=100).contains(&value) {
            return invalid(format!("{} {} outside [0, 100]", name, value));
        }
    }
    if constants.redundancy_ceiling < 1 {
        return invalid("redundancy_ceiling must be >= 1".to_string());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Result invariants (hard-fail)
// ---------------------------------------------------------------------------

/// Run all result checks. Panics on the first failure.
pub fn validate_result(result: &MatchScoreResult) {
    if let Err(msg) = try_validate_result(result) {
        panic!("Invariant violation: {}", msg);
    }
}

/// Non-panicking variant of `validate_result`.
pub fn try_validate_result(result: &MatchScoreResult) -> Result<(), String> {
    try_check_factor_bounds(result)?;
    try_check_total_bounds(result)?;
    try_check_contribution_signs(result)?;
    try_check_critical_gaps_uncovered(result)?;
    try_check_gap_order(result)?;
    try_check_recommendation_count(result)?;
    Ok(())
}

fn try_check_factor_bounds(result: &MatchScoreResult) -> Result<(), String> {
    for f in result.factors.iter() {
        if !(0..=MAX_SCORE).contains(&f.score) {
            return Err(format!(
                "[INVARIANT:factor_bounds] {} score {} outside [0, {}]",
                f.kind.as_str(),
                f.score,
                MAX_SCORE
            ));
        }
    }
    Ok(())
}

fn try_check_total_bounds(result: &MatchScoreResult) -> Result<(), String> {
    if !(0..=100).contains(&result.total_score) {
        return Err(format!(
            "[INVARIANT:total_bounds] total score {} outside [0, 100]",
            result.total_score
        ));
    }
    Ok(())
}

fn try_check_contribution_signs(result: &MatchScoreResult) -> Result<(), String> {
    for f in result.factors.iter() {
        let wrong_sign = if f.kind.is_penalty() {
            f.contribution > 0
        } else {
            f.contribution < 0
        };
        if wrong_sign {
            return Err(format!(
                "[INVARIANT:contribution_sign] {} contribution {} has the wrong sign",
                f.kind.as_str(),
                f.contribution
            ));
        }
    }
    Ok(())
}

/// Every critical gap has zero coverage in the coverage details.
fn try_check_critical_gaps_uncovered(result: &MatchScoreResult) -> Result<(), String> {
    let Some(entries) = result.factors.coverage_entries() else {
        return Ok(());
    };
    for gap in result.gaps.iter().filter(|g| g.priority == GapPriority::Critical) {
        let covered = entries
            .iter()
            .any(|e| e.strength_name == gap.strength_name && e.value > 0);
        if covered {
            return Err(format!(
                "[INVARIANT:critical_gap_coverage] critical gap {:?} has nonzero coverage",
                gap.strength_name
            ));
        }
    }
    Ok(())
}

fn try_check_gap_order(result: &MatchScoreResult) -> Result<(), String> {
    for pair in result.gaps.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        let ordered = a
            .priority
            .cmp(&b.priority)
            .then_with(|| b.weight.cmp(&a.weight))
            .then_with(|| a.strength_name.cmp(&b.strength_name))
            .is_le();
        if !ordered {
            return Err(format!(
                "[INVARIANT:gap_order] {:?} sorted before {:?}",
                a.strength_name, b.strength_name
            ));
        }
    }
    Ok(())
}

fn try_check_recommendation_count(result: &MatchScoreResult) -> Result<(), String> {
    let actionable = result
        .gaps
        .iter()
        .filter(|g| g.priority != GapPriority::Optional)
        .count();
    if actionable != result.recommendations.len() {
        return Err(format!(
            "[INVARIANT:recommendations] {} actionable gaps but {} recommendations",
            actionable,
            result.recommendations.len()
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Domain, IdealStrength, RankedStrength, StrengthRef, TeamSizeRange};
    use std::collections::BTreeMap;

    fn archetype() -> ArchetypeProfile {
        ArchetypeProfile {
            id: "lab".into(),
            name: "Lab".into(),
            ideal_strengths: vec![IdealStrength {
                strength: StrengthRef::new("learner", Domain::Thinking),
                weight: 8_000,
            }],
            critical_domains: Default::default(),
            culture_weights: BTreeMap::new(),
            ideal_team_size: TeamSizeRange {
                min: 2,
                sweet_spot: 4,
                max: 6,
            },
        }
    }

    #[test]
    fn member_ids_size_and_duplicates() {
        assert!(validate_member_ids(&["a", "b"]).is_ok());
        assert!(validate_member_ids(&["a"]).is_err());
        assert!(validate_member_ids(&["a", "a"]).is_err());
        assert!(validate_member_ids(&["a", "b c"]).is_err());
        let eleven: Vec<String> = (0..11).map(|i| format!("m{}", i)).collect();
        assert!(validate_member_ids(&eleven).is_err());
    }

    #[test]
    fn profile_rank_rules() {
        let s = StrengthRef::new("focus", Domain::Doing);
        let dup = MemberProfile::new(
            "a",
            vec![
                RankedStrength { strength: s.clone(), rank: 1 },
                RankedStrength { strength: StrengthRef::new("learner", Domain::Thinking), rank: 1 },
            ],
        );
        assert!(validate_profile(&dup).is_err());
        let zero = MemberProfile::new("a", vec![RankedStrength { strength: s, rank: 0 }]);
        assert!(validate_profile(&zero).is_err());
    }

    #[test]
    fn archetype_rules() {
        assert!(validate_archetype(&archetype()).is_ok());

        let mut bad_weight = archetype();
        bad_weight.ideal_strengths[0].weight = 0;
        assert!(validate_archetype(&bad_weight).is_err());

        let mut bad_range = archetype();
        bad_range.ideal_team_size.sweet_spot = 8;
        assert!(validate_archetype(&bad_range).is_err());

        let mut empty = archetype();
        empty.ideal_strengths.clear();
        assert!(validate_archetype(&empty).is_err());
    }

    #[test]
    fn default_constants_are_valid() {
        assert!(validate_constants(&ScoringConstants::default()).is_ok());

        let mut c = ScoringConstants::default();
        c.weights.culture_fit = 3_000;
        assert!(validate_constants(&c).is_err());

        let mut c = ScoringConstants::default();
        c.rank_decay = RankDecay::Table { weights: vec![10_000, 12_000] };
        assert!(validate_constants(&c).is_err());
    }
}
