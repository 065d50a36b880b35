/// Team Match Engine: Factor Calculators
///
/// ALL sub-score logic lives here. Five independent pure functions,
/// each `(members, archetype, constants) -> FactorResult`.
/// All math is pure integer. Inputs are validated by the caller.

use crate::arithmetic::{
    apply_weight, checked_add, checked_mul, clamp_score, fraction_to_score, points, rank_weight,
    ratio, MAX_SCORE, SCALE,
};
use crate::distribution::{best_occurrence, best_occurrence_where, domain_counts, strength_holders};
use crate::domain::{
    ArchetypeProfile, CoverageEntry, Domain, FactorBreakdown, FactorDetails, FactorKind,
    FactorResult, MemberProfile, ScoringConstants, SharedStrength, TraitEntry,
};
use crate::reference::{expresses, is_expressible};

// ---------------------------------------------------------------------------
// Public dispatcher
// ---------------------------------------------------------------------------

/// Run all five calculators.
pub fn compute_factors(
    members: &[MemberProfile],
    archetype: &ArchetypeProfile,
    constants: &ScoringConstants,
) -> FactorBreakdown {
    FactorBreakdown {
        strength_coverage: strength_coverage(members, archetype, constants),
        domain_balance: domain_balance(members, archetype, constants),
        culture_fit: culture_fit(members, archetype, constants),
        team_size: team_size_fit(members, archetype, constants),
        redundancy_penalty: redundancy_penalty(members, archetype, constants),
    }
}

fn factor(
    kind: FactorKind,
    score: i64,
    constants: &ScoringConstants,
    details: FactorDetails,
) -> FactorResult {
    let score = clamp_score(score);
    let weight = constants.weights.for_kind(kind);
    let magnitude = apply_weight(score, weight);
    FactorResult {
        kind,
        score,
        weight,
        contribution: if kind.is_penalty() { -magnitude } else { magnitude },
        details: Some(details),
    }
}

// ---------------------------------------------------------------------------
// Strength coverage
// ---------------------------------------------------------------------------

/// Per ideal strength: who covers it best and the rank weight achieved.
pub fn coverage_entries(
    members: &[MemberProfile],
    archetype: &ArchetypeProfile,
    constants: &ScoringConstants,
) -> Vec<CoverageEntry> {
    archetype
        .ideal_strengths
        .iter()
        .map(|ideal| {
            let best = best_occurrence(members, &ideal.strength.name);
            let value = best
                .as_ref()
                .map(|b| rank_weight(b.rank, &constants.rank_decay))
                .unwrap_or(0);
            CoverageEntry {
                strength_name: ideal.strength.name.clone(),
                domain: ideal.strength.domain,
                weight: ideal.weight,
                covered_by: best.as_ref().map(|b| b.member_id.clone()),
                best_rank: best.as_ref().map(|b| b.rank),
                value,
            }
        })
        .collect()
}

/// Rank-weighted coverage of the archetype's ideal strengths, normalized
/// by the sum achieved if every ideal strength were held at rank 1.
pub fn strength_coverage(
    members: &[MemberProfile],
    archetype: &ArchetypeProfile,
    constants: &ScoringConstants,
) -> FactorResult {
    let entries = coverage_entries(members, archetype, constants);

    let mut achieved: i64 = 0;
    let mut possible: i64 = 0;
    for e in &entries {
        achieved = checked_add(achieved, checked_mul(e.value, e.weight));
        possible = checked_add(possible, checked_mul(SCALE, e.weight));
    }

    let score = fraction_to_score(ratio(achieved, possible));
    factor(
        FactorKind::StrengthCoverage,
        score,
        constants,
        FactorDetails::StrengthCoverage { entries },
    )
}

// ---------------------------------------------------------------------------
// Domain balance
// ---------------------------------------------------------------------------

/// Presence of critical domains blended with evenness across them.
/// A missing critical domain caps the score.
pub fn domain_balance(
    members: &[MemberProfile],
    archetype: &ArchetypeProfile,
    constants: &ScoringConstants,
) -> FactorResult {
    let counts = domain_counts(members, constants.top_k);

    // Without critical domains, evenness is judged across all domains.
    let targets: Vec<Domain> = if archetype.critical_domains.is_empty() {
        Domain::ALL.to_vec()
    } else {
        archetype.critical_domains.iter().copied().collect()
    };
    let count_of = |d: &Domain| counts.get(d).copied().unwrap_or(0);

    let missing_critical: Vec<Domain> = archetype
        .critical_domains
        .iter()
        .filter(|d| count_of(d) == 0)
        .copied()
        .collect();

    let presence_ratio = if archetype.critical_domains.is_empty() {
        SCALE
    } else {
        let covered = (targets.len() - missing_critical.len()) as i64;
        ratio(covered, targets.len() as i64)
    };

    let balance_ratio = if targets.len() <= 1 {
        SCALE
    } else {
        let total: i64 = targets.iter().map(count_of).sum();
        let min = targets.iter().map(count_of).min().unwrap_or(0);
        ratio(checked_mul(min, targets.len() as i64), total).min(SCALE)
    };

    let blended = checked_add(
        apply_weight(presence_ratio, constants.presence_share),
        apply_weight(balance_ratio, SCALE - constants.presence_share),
    );
    let mut score = fraction_to_score(blended);
    if !missing_critical.is_empty() {
        score = score.min(points(constants.missing_critical_cap_points));
    }

    factor(
        FactorKind::DomainBalance,
        score,
        constants,
        FactorDetails::DomainBalance {
            counts,
            missing_critical,
            presence_ratio,
            balance_ratio,
        },
    )
}

// ---------------------------------------------------------------------------
// Culture fit
// ---------------------------------------------------------------------------

/// Best rank-weighted expression of each archetype culture trait,
/// normalized against the best achievable: every trait some catalog
/// strength expresses, held at rank 1.
pub fn culture_fit(
    members: &[MemberProfile],
    archetype: &ArchetypeProfile,
    constants: &ScoringConstants,
) -> FactorResult {
    let mut traits: Vec<TraitEntry> = Vec::with_capacity(archetype.culture_weights.len());
    let mut achieved: i64 = 0;
    let mut possible: i64 = 0;

    for (trait_name, weight) in &archetype.culture_weights {
        let best = best_occurrence_where(members, |name| expresses(name, trait_name));
        let value = best
            .as_ref()
            .map(|b| rank_weight(b.rank, &constants.rank_decay))
            .unwrap_or(0);
        achieved = checked_add(achieved, checked_mul(value, *weight));
        if is_expressible(trait_name) {
            possible = checked_add(possible, checked_mul(SCALE, *weight));
        }
        traits.push(TraitEntry {
            trait_name: trait_name.clone(),
            weight: *weight,
            value,
            strength_name: best.as_ref().map(|b| b.strength_name.clone()),
            member_id: best.map(|b| b.member_id),
        });
    }

    // No culture expectations anyone could meet: nothing to miss.
    let score = if possible == 0 {
        MAX_SCORE
    } else {
        fraction_to_score(ratio(achieved, possible))
    };

    factor(
        FactorKind::CultureFit,
        score,
        constants,
        FactorDetails::CultureFit { traits },
    )
}

// ---------------------------------------------------------------------------
// Team size
// ---------------------------------------------------------------------------

/// Peak at the sweet spot, linear decay to the edge score at the range
/// boundary, then a fixed step per member outside the range.
pub fn team_size_fit(
    members: &[MemberProfile],
    archetype: &ArchetypeProfile,
    constants: &ScoringConstants,
) -> FactorResult {
    let range = archetype.ideal_team_size;
    let score = size_score(members.len(), range.min, range.sweet_spot, range.max, constants);

    factor(
        FactorKind::TeamSize,
        score,
        constants,
        FactorDetails::TeamSize {
            size: members.len(),
            min: range.min,
            sweet_spot: range.sweet_spot,
            max: range.max,
        },
    )
}

fn size_score(
    size: usize,
    min: usize,
    sweet_spot: usize,
    max: usize,
    constants: &ScoringConstants,
) -> i64 {
    let (size, min, sweet, max) = (size as i64, min as i64, sweet_spot as i64, max as i64);
    let edge = points(constants.size_edge_points);
    let step = points(constants.size_step_points);

    if size == sweet {
        return MAX_SCORE;
    }
    let (distance, span, outside) = if size < sweet {
        (sweet - size, sweet - min, min - size)
    } else {
        (size - sweet, max - sweet, size - max)
    };

    if outside > 0 {
        return clamp_score(edge - checked_mul(step, outside));
    }
    // Inside the range, so span >= distance > 0.
    clamp_score(MAX_SCORE - checked_mul(MAX_SCORE - edge, distance) / span)
}

// ---------------------------------------------------------------------------
// Redundancy penalty
// ---------------------------------------------------------------------------

/// Excess holders of shared top-K strengths, saturating at the ceiling.
/// The score is the penalty magnitude; its contribution is negative.
pub fn redundancy_penalty(
    members: &[MemberProfile],
    _archetype: &ArchetypeProfile,
    constants: &ScoringConstants,
) -> FactorResult {
    let shared: Vec<SharedStrength> = strength_holders(members, constants.top_k)
        .into_iter()
        .filter(|(_, holders)| holders.len() > 1)
        .map(|(strength_name, holders)| SharedStrength {
            excess: holders.len() as i64 - 1,
            strength_name,
            holders,
        })
        .collect();
    let excess: i64 = shared.iter().map(|s| s.excess).sum();

    let score = if constants.redundancy_ceiling <= 0 {
        0
    } else {
        (checked_mul(excess, MAX_SCORE) / constants.redundancy_ceiling).min(MAX_SCORE)
    };

    factor(
        FactorKind::RedundancyPenalty,
        score,
        constants,
        FactorDetails::Redundancy { shared, excess },
    )
}
