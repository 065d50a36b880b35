/// Scoring property tests: determinism, bounds, monotonicity and the
/// reference team scenarios, run against the public kernel API.

use std::collections::BTreeMap;

use team_match_engine::arithmetic::MAX_SCORE;
use team_match_engine::domain::{
    ArchetypeProfile, Domain, GapPriority, IdealStrength, MemberProfile, RankDecay,
    RankedStrength, ScoringConstants, TeamSizeRange,
};
use team_match_engine::engine::{aggregate, MatchEngine};
use team_match_engine::hashing::canonical_hash;
use team_match_engine::reference::{catalog, strength};

fn member(id: &str, names: &[&str]) -> MemberProfile {
    MemberProfile::new(
        id,
        names
            .iter()
            .enumerate()
            .map(|(i, n)| RankedStrength {
                strength: strength(n).unwrap_or_else(|| panic!("unknown strength {}", n)),
                rank: i as u32 + 1,
            })
            .collect(),
    )
}

fn archetype(
    ideal: &[&str],
    critical: &[Domain],
    culture: &[(&str, i64)],
    size: (usize, usize, usize),
) -> ArchetypeProfile {
    ArchetypeProfile {
        id: "archetype".into(),
        name: "Archetype".into(),
        ideal_strengths: ideal
            .iter()
            .map(|n| IdealStrength {
                strength: strength(n).unwrap(),
                weight: 10_000,
            })
            .collect(),
        critical_domains: critical.iter().copied().collect(),
        culture_weights: culture
            .iter()
            .map(|(t, w)| (t.to_string(), *w))
            .collect::<BTreeMap<_, _>>(),
        ideal_team_size: TeamSizeRange {
            min: size.0,
            sweet_spot: size.1,
            max: size.2,
        },
    }
}

fn product_archetype() -> ArchetypeProfile {
    archetype(
        &["analytical", "strategic", "focus", "empathy", "activator"],
        &[Domain::Thinking, Domain::Doing],
        &[("rigor", 10_000)],
        (2, 4, 6),
    )
}

/// Deterministic team of `size` members drawn round-robin from the catalog.
fn generated_team(size: usize, offset: usize) -> Vec<MemberProfile> {
    let all = catalog();
    (0..size)
        .map(|i| {
            let names: Vec<&str> = (0..5)
                .map(|j| all[(offset + i * 3 + j) % all.len()].name.as_str())
                .collect();
            member(&format!("m{}", i), &names)
        })
        .collect()
}

#[test]
fn repeated_scoring_is_bit_identical() {
    let team = generated_team(5, 7);
    let a = product_archetype();
    let engine = MatchEngine::default();

    let r1 = engine.score(&team, &a).unwrap();
    let r2 = engine.score(&team, &a).unwrap();
    assert_eq!(r1, r2);
    assert_eq!(canonical_hash(&r1), canonical_hash(&r2));
}

#[test]
fn every_score_is_in_bounds() {
    let a = product_archetype();
    let engine = MatchEngine::default();
    for size in 2..=10 {
        for offset in 0..24 {
            let result = engine.score(&generated_team(size, offset), &a).unwrap();
            for f in result.factors.iter() {
                assert!((0..=MAX_SCORE).contains(&f.score), "{:?}", f);
            }
            assert!((0..=100).contains(&result.total_score));
        }
    }
}

#[test]
fn covering_a_missing_strength_never_lowers_coverage() {
    let a = product_archetype();
    let engine = MatchEngine::default();
    let before = vec![member("a", &["analytical", "focus"]), member("b", &["strategic"])];
    let mut after = before.clone();
    after.push(member("c", &["empathy"]));

    let r_before = engine.score(&before, &a).unwrap();
    let r_after = engine.score(&after, &a).unwrap();
    assert!(
        r_after.factors.strength_coverage.contribution
            >= r_before.factors.strength_coverage.contribution
    );
    assert!(r_after.factors.strength_coverage.score > r_before.factors.strength_coverage.score);
}

#[test]
fn duplicating_a_top_strength_never_lowers_the_penalty() {
    let a = product_archetype();
    let engine = MatchEngine::default();
    let base = vec![
        member("a", &["focus", "learner"]),
        member("b", &["analytical", "empathy"]),
        member("c", &["harmony", "command"]),
    ];
    let duplicated = vec![
        member("a", &["focus", "learner"]),
        member("b", &["analytical", "empathy"]),
        member("c", &["focus", "command"]),
    ];
    let p_base = engine.score(&base, &a).unwrap().factors.redundancy_penalty.score;
    let p_dup = engine.score(&duplicated, &a).unwrap().factors.redundancy_penalty.score;
    assert!(p_dup >= p_base);
    assert!(p_dup > 0);
}

#[test]
fn critical_gaps_have_zero_coverage() {
    let a = product_archetype();
    let engine = MatchEngine::default();
    let mut saw_critical = false;
    for size in 2..=6 {
        for offset in 0..24 {
            let result = engine.score(&generated_team(size, offset), &a).unwrap();
            let entries = result.factors.coverage_entries().unwrap();
            for gap in result.gaps.iter().filter(|g| g.priority == GapPriority::Critical) {
                saw_critical = true;
                let entry = entries
                    .iter()
                    .find(|e| e.strength_name == gap.strength_name)
                    .unwrap();
                assert_eq!(entry.value, 0);
                assert!(entry.covered_by.is_none());
            }
        }
    }
    assert!(saw_critical);
}

#[test]
fn complementary_pair_scores_near_maximum() {
    // Gentle decay so that rank 2-3 coverage still counts almost fully.
    let constants = ScoringConstants {
        rank_decay: RankDecay::Table {
            weights: vec![10_000, 9_500, 9_000, 8_500, 8_000],
        },
        ..ScoringConstants::default()
    };
    let a = archetype(
        &["analytical", "strategic", "focus", "empathy", "activator"],
        &[Domain::Thinking, Domain::Doing],
        &[("rigor", 10_000)],
        (2, 2, 4),
    );
    let team = [
        member("a", &["analytical", "strategic", "focus"]),
        member("b", &["empathy", "activator"]),
    ];

    let result = aggregate(&team, &a, &constants).unwrap();
    assert_eq!(result.factors.strength_coverage.score, 960_000);
    assert_eq!(result.factors.team_size.score, MAX_SCORE);
    assert_eq!(result.factors.redundancy_penalty.score, 0);
    assert_eq!(result.factors.redundancy_penalty.contribution, 0);
    assert!(result.gaps.is_empty());
    assert!(result.total_score >= 90, "total {}", result.total_score);
}

#[test]
fn shared_top_strength_hits_the_redundancy_ceiling() {
    let a = archetype(&["learner", "empathy", "activator"], &[], &[], (3, 5, 7));
    let seconds = ["learner", "empathy", "activator", "strategic", "harmony"];

    let duplicated: Vec<MemberProfile> = seconds
        .iter()
        .enumerate()
        .map(|(i, s)| member(&format!("m{}", i), &["achiever", *s]))
        .collect();
    let tops = ["achiever", "arranger", "deliberative", "discipline", "responsibility"];
    let distinct: Vec<MemberProfile> = seconds
        .iter()
        .zip(tops.iter())
        .enumerate()
        .map(|(i, (s, t))| member(&format!("m{}", i), &[*t, *s]))
        .collect();

    let engine = MatchEngine::default();
    let dup = engine.score(&duplicated, &a).unwrap();
    let uniq = engine.score(&distinct, &a).unwrap();

    assert_eq!(dup.factors.redundancy_penalty.score, MAX_SCORE);
    assert_eq!(uniq.factors.redundancy_penalty.score, 0);
    assert_eq!(dup.factors.strength_coverage, uniq.factors.strength_coverage);
    assert!(uniq.total_score - dup.total_score >= 10);
}
