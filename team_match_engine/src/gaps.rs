/// Team Match Engine: Gap Analyzer
///
/// Derives missing and weakly covered ideal strengths from the coverage
/// details, assigns a priority and renders reason, impact and
/// recommendation text. Advisory only: never fails, never mutates inputs.

use crate::arithmetic::{checked_mul, SCALE};
use crate::domain::{
    ArchetypeProfile, CoverageEntry, FactorBreakdown, GapPriority, MemberProfile,
    ScoringConstants, StrengthGap,
};
use crate::factors::coverage_entries;

/// Gaps in priority order plus one recommendation per critical or
/// recommended gap.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GapAnalysis {
    pub gaps: Vec<StrengthGap>,
    pub recommendations: Vec<String>,
}

/// Analyze coverage gaps for `archetype`.
///
/// Coverage is read from `factors`; it is recomputed from `members` only
/// when the coverage factor carries no details.
pub fn analyze(
    members: &[MemberProfile],
    archetype: &ArchetypeProfile,
    factors: &FactorBreakdown,
    constants: &ScoringConstants,
) -> GapAnalysis {
    let recomputed;
    let entries: &[CoverageEntry] = match factors.coverage_entries() {
        Some(entries) => entries,
        None => {
            recomputed = coverage_entries(members, archetype, constants);
            &recomputed
        }
    };

    let total_weight = archetype.total_ideal_weight();
    let mut gaps: Vec<StrengthGap> = entries
        .iter()
        .filter(|e| e.value < constants.covered_threshold)
        .map(|e| build_gap(e, archetype, constants, total_weight))
        .collect();

    gaps.sort_by(|a, b| {
        a.priority
            .cmp(&b.priority)
            .then_with(|| b.weight.cmp(&a.weight))
            .then_with(|| a.strength_name.cmp(&b.strength_name))
    });

    let recommendations = gaps.iter().filter_map(recommendation_for).collect();

    GapAnalysis {
        gaps,
        recommendations,
    }
}

/// Priority rules:
///   critical    : critical domain, nobody holds it
///   recommended : weak in a critical domain or at high weight,
///                 or absent at high weight
///   optional    : everything else
pub fn classify(entry: &CoverageEntry, critical_domain: bool, constants: &ScoringConstants) -> GapPriority {
    let uncovered = entry.value == 0;
    let high_weight = entry.weight >= constants.high_weight_threshold;

    if uncovered && critical_domain {
        GapPriority::Critical
    } else if (!uncovered && (critical_domain || high_weight)) || (uncovered && high_weight) {
        GapPriority::Recommended
    } else {
        GapPriority::Optional
    }
}

fn build_gap(
    entry: &CoverageEntry,
    archetype: &ArchetypeProfile,
    constants: &ScoringConstants,
    total_weight: i64,
) -> StrengthGap {
    let critical_domain = archetype.critical_domains.contains(&entry.domain);
    let priority = classify(entry, critical_domain, constants);
    let at_stake = coverage_points_at_stake(entry, total_weight);

    let reason = match (&entry.covered_by, entry.best_rank) {
        (Some(member), Some(rank)) => format!(
            "{} is only held at rank {} (by {}).",
            entry.strength_name, rank, member
        ),
        _ => format!("No team member has {}.", entry.strength_name),
    };

    let impact = if priority == GapPriority::Critical {
        format!(
            "The {} domain is critical for {} and is left uncovered; {} coverage points are lost.",
            entry.domain, archetype.name, at_stake
        )
    } else {
        format!(
            "Up to {} strength-coverage points are not being earned.",
            at_stake
        )
    };

    StrengthGap {
        strength_name: entry.strength_name.clone(),
        domain: entry.domain,
        weight: entry.weight,
        priority,
        best_rank: entry.best_rank,
        covered_by: entry.covered_by.clone(),
        reason,
        impact,
    }
}

/// Whole coverage points recoverable if the strength were held at rank 1.
fn coverage_points_at_stake(entry: &CoverageEntry, total_weight: i64) -> i64 {
    if total_weight <= 0 {
        return 0;
    }
    let lost_fraction = checked_mul(SCALE - entry.value, entry.weight) / total_weight;
    checked_mul(lost_fraction, 100) / SCALE
}

fn recommendation_for(gap: &StrengthGap) -> Option<String> {
    match gap.priority {
        GapPriority::Critical => Some(format!(
            "Add or develop a member with {} to cover the {} domain.",
            gap.strength_name, gap.domain
        )),
        GapPriority::Recommended => Some(match (&gap.covered_by, gap.best_rank) {
            (Some(member), Some(rank)) => format!(
                "Develop {} further: {} holds it only at rank {}.",
                gap.strength_name, member, rank
            ),
            _ => format!(
                "Consider adding a member with {} to strengthen {} coverage.",
                gap.strength_name, gap.domain
            ),
        }),
        GapPriority::Optional => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Domain;

    fn entry(name: &str, weight: i64, rank: Option<u32>, value: i64) -> CoverageEntry {
        CoverageEntry {
            strength_name: name.into(),
            domain: Domain::Thinking,
            weight,
            covered_by: rank.map(|_| "m1".to_string()),
            best_rank: rank,
            value,
        }
    }

    #[test]
    fn classify_rules() {
        let c = ScoringConstants::default();
        let absent_low = entry("a", 2_000, None, 0);
        let absent_high = entry("b", 8_000, None, 0);
        let weak_low = entry("c", 2_000, Some(5), 2_000);

        assert_eq!(classify(&absent_low, true, &c), GapPriority::Critical);
        assert_eq!(classify(&absent_high, true, &c), GapPriority::Critical);
        assert_eq!(classify(&absent_high, false, &c), GapPriority::Recommended);
        assert_eq!(classify(&absent_low, false, &c), GapPriority::Optional);
        assert_eq!(classify(&weak_low, true, &c), GapPriority::Recommended);
        assert_eq!(classify(&weak_low, false, &c), GapPriority::Optional);
    }

    #[test]
    fn points_at_stake() {
        let absent = entry("a", 5_000, None, 0);
        assert_eq!(coverage_points_at_stake(&absent, 10_000), 50);
        let weak = entry("b", 10_000, Some(4), 2_500);
        assert_eq!(coverage_points_at_stake(&weak, 20_000), 37);
    }
}
