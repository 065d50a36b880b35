/// Team Match Engine: Core Domain Types
///
/// Pure data. Scoring logic lives in `factors`, `gaps` and `engine`.
/// All numeric values: i64 fixed-point (SCALE = 10_000).

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

// ── Strength Profile Model ─────────────────────────────────────────

/// Coarse category a strength belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Thinking,
    Doing,
    Motivating,
    Feeling,
}

impl Domain {
    pub const ALL: [Domain; 4] = [
        Domain::Thinking,
        Domain::Doing,
        Domain::Motivating,
        Domain::Feeling,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Thinking => "thinking",
            Domain::Doing => "doing",
            Domain::Motivating => "motivating",
            Domain::Feeling => "feeling",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies a strength by its stable key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StrengthRef {
    pub name: String,
    pub domain: Domain,
}

impl StrengthRef {
    pub fn new(name: &str, domain: Domain) -> Self {
        Self {
            name: name.to_string(),
            domain,
        }
    }
}

/// A strength held by a member at a given rank (1 = strongest).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RankedStrength {
    pub strength: StrengthRef,
    pub rank: u32,
}

/// One person's strength snapshot. Owned by the caller; never mutated here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemberProfile {
    pub member_id: String,
    pub strengths: Vec<RankedStrength>,
}

impl MemberProfile {
    pub fn new(member_id: &str, strengths: Vec<RankedStrength>) -> Self {
        Self {
            member_id: member_id.to_string(),
            strengths,
        }
    }

    /// The member's `k` best-ranked strengths, strongest first.
    pub fn top_strengths(&self, k: usize) -> Vec<&RankedStrength> {
        let mut sorted: Vec<&RankedStrength> = self.strengths.iter().collect();
        sorted.sort_by_key(|s| s.rank);
        sorted.truncate(k);
        sorted
    }

    /// Rank at which this member holds `strength_name`, if at all.
    pub fn rank_of(&self, strength_name: &str) -> Option<u32> {
        self.strengths
            .iter()
            .find(|s| s.strength.name == strength_name)
            .map(|s| s.rank)
    }
}

/// An archetype's desired strength with its weight in (0, SCALE].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdealStrength {
    pub strength: StrengthRef,
    pub weight: i64,
}

/// Ideal head-count range with a single sweet spot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TeamSizeRange {
    pub min: usize,
    pub sweet_spot: usize,
    pub max: usize,
}

/// Project/team archetype. Immutable reference data, looked up by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArchetypeProfile {
    pub id: String,
    pub name: String,
    pub ideal_strengths: Vec<IdealStrength>,
    pub critical_domains: BTreeSet<Domain>,
    pub culture_weights: BTreeMap<String, i64>,
    pub ideal_team_size: TeamSizeRange,
}

impl ArchetypeProfile {
    /// Sum of all ideal-strength weights (fixed-point).
    pub fn total_ideal_weight(&self) -> i64 {
        self.ideal_strengths.iter().map(|s| s.weight).sum()
    }
}

// ── Factor Results ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorKind {
    StrengthCoverage,
    DomainBalance,
    CultureFit,
    TeamSize,
    RedundancyPenalty,
}

impl FactorKind {
    pub const ALL: [FactorKind; 5] = [
        FactorKind::StrengthCoverage,
        FactorKind::DomainBalance,
        FactorKind::CultureFit,
        FactorKind::TeamSize,
        FactorKind::RedundancyPenalty,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FactorKind::StrengthCoverage => "strength_coverage",
            FactorKind::DomainBalance => "domain_balance",
            FactorKind::CultureFit => "culture_fit",
            FactorKind::TeamSize => "team_size",
            FactorKind::RedundancyPenalty => "redundancy_penalty",
        }
    }

    /// The penalty factor is subtracted rather than added.
    pub fn is_penalty(&self) -> bool {
        matches!(self, FactorKind::RedundancyPenalty)
    }
}

/// Coverage of one ideal strength by the team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageEntry {
    pub strength_name: String,
    pub domain: Domain,
    pub weight: i64,
    pub covered_by: Option<String>,
    pub best_rank: Option<u32>,
    /// Rank weight of the best occurrence; 0 when nobody holds it.
    pub value: i64,
}

/// Best team expression of one archetype culture trait.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitEntry {
    pub trait_name: String,
    pub weight: i64,
    pub value: i64,
    pub strength_name: Option<String>,
    pub member_id: Option<String>,
}

/// A strength held in the top-K of more than one member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedStrength {
    pub strength_name: String,
    pub holders: Vec<String>,
    pub excess: i64,
}

/// Factor-specific explanation payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FactorDetails {
    StrengthCoverage {
        entries: Vec<CoverageEntry>,
    },
    DomainBalance {
        counts: BTreeMap<Domain, i64>,
        missing_critical: Vec<Domain>,
        presence_ratio: i64,
        balance_ratio: i64,
    },
    CultureFit {
        traits: Vec<TraitEntry>,
    },
    TeamSize {
        size: usize,
        min: usize,
        sweet_spot: usize,
        max: usize,
    },
    Redundancy {
        shared: Vec<SharedStrength>,
        excess: i64,
    },
}

/// One weighted factor of the match score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactorResult {
    pub kind: FactorKind,
    /// 0..=MAX_SCORE. For the penalty factor this is the penalty magnitude.
    pub score: i64,
    pub weight: i64,
    /// `score * weight / SCALE`, negative for the penalty factor.
    pub contribution: i64,
    pub details: Option<FactorDetails>,
}

/// Exactly the five named factors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactorBreakdown {
    pub strength_coverage: FactorResult,
    pub domain_balance: FactorResult,
    pub culture_fit: FactorResult,
    pub team_size: FactorResult,
    pub redundancy_penalty: FactorResult,
}

impl FactorBreakdown {
    pub fn iter(&self) -> impl Iterator<Item = &FactorResult> {
        [
            &self.strength_coverage,
            &self.domain_balance,
            &self.culture_fit,
            &self.team_size,
            &self.redundancy_penalty,
        ]
        .into_iter()
    }

    pub fn get(&self, kind: FactorKind) -> &FactorResult {
        match kind {
            FactorKind::StrengthCoverage => &self.strength_coverage,
            FactorKind::DomainBalance => &self.domain_balance,
            FactorKind::CultureFit => &self.culture_fit,
            FactorKind::TeamSize => &self.team_size,
            FactorKind::RedundancyPenalty => &self.redundancy_penalty,
        }
    }

    /// Per-strength coverage details, when the coverage factor carries them.
    pub fn coverage_entries(&self) -> Option<&[CoverageEntry]> {
        match &self.strength_coverage.details {
            Some(FactorDetails::StrengthCoverage { entries }) => Some(entries.as_slice()),
            _ => None,
        }
    }
}

// ── Gaps and Results ───────────────────────────────────────────────

/// Declaration order is sort order: critical gaps come first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapPriority {
    Critical,
    Recommended,
    Optional,
}

/// An ideal strength the team does not adequately cover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrengthGap {
    pub strength_name: String,
    pub domain: Domain,
    pub weight: i64,
    pub priority: GapPriority,
    pub best_rank: Option<u32>,
    pub covered_by: Option<String>,
    pub reason: String,
    pub impact: String,
}

/// Full output of one scoring pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchScoreResult {
    /// Whole points, 0..=100.
    pub total_score: i64,
    pub factors: FactorBreakdown,
    pub gaps: Vec<StrengthGap>,
    /// Advisory only.
    pub recommendations: Vec<String>,
}

// ── Scoring Constants ──────────────────────────────────────────────

/// Aggregator weights. The four positive weights sum to SCALE;
/// the redundancy weight is subtracted on top.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FactorWeights {
    pub strength_coverage: i64,
    pub domain_balance: i64,
    pub culture_fit: i64,
    pub team_size: i64,
    pub redundancy_penalty: i64,
}

impl Default for FactorWeights {
    fn default() -> Self {
        Self {
            strength_coverage: 4_000,
            domain_balance: 2_000,
            culture_fit: 2_000,
            team_size: 2_000,
            redundancy_penalty: 1_500,
        }
    }
}

impl FactorWeights {
    pub fn for_kind(&self, kind: FactorKind) -> i64 {
        match kind {
            FactorKind::StrengthCoverage => self.strength_coverage,
            FactorKind::DomainBalance => self.domain_balance,
            FactorKind::CultureFit => self.culture_fit,
            FactorKind::TeamSize => self.team_size,
            FactorKind::RedundancyPenalty => self.redundancy_penalty,
        }
    }

    pub fn positive_sum(&self) -> i64 {
        self.strength_coverage + self.domain_balance + self.culture_fit + self.team_size
    }
}

/// Rank → contribution policy. See `arithmetic::rank_weight`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RankDecay {
    /// `SCALE / rank`.
    Reciprocal,
    /// Explicit values for ranks 1..=N, reciprocal tail beyond.
    Table { weights: Vec<i64> },
}

/// All scoring thresholds. Loaded from configuration by the runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringConstants {
    pub weights: FactorWeights,
    /// Strengths per member counted for domain balance and redundancy.
    pub top_k: usize,
    pub rank_decay: RankDecay,
    /// Coverage value at or above which an ideal strength is not a gap.
    pub covered_threshold: i64,
    /// Archetype weight at or above which a strength counts as high-weight.
    pub high_weight_threshold: i64,
    /// Share of the domain-balance score driven by critical-domain presence.
    pub presence_share: i64,
    /// Domain-balance ceiling (whole points) when a critical domain is missing.
    pub missing_critical_cap_points: i64,
    /// Team-size score (whole points) at the edge of the ideal range.
    pub size_edge_points: i64,
    /// Team-size points lost per member outside the ideal range.
    pub size_step_points: i64,
    /// Total excess holders at which the redundancy penalty saturates.
    pub redundancy_ceiling: i64,
}

impl Default for ScoringConstants {
    fn default() -> Self {
        Self {
            weights: FactorWeights::default(),
            top_k: 5,
            rank_decay: RankDecay::Reciprocal,
            covered_threshold: 3_000,
            high_weight_threshold: 6_000,
            presence_share: 6_000,
            missing_critical_cap_points: 40,
            size_edge_points: 70,
            size_step_points: 15,
            redundancy_ceiling: 4,
        }
    }
}
