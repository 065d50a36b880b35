//! Membership store: the persistence seam the runtime consumes.
//!
//! The scoring kernel never touches storage; everything it needs is
//! resolved through `MembershipStore` first. `InMemoryStore` is the
//! reference implementation used by tests and local tooling.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use team_match_engine::domain::{ArchetypeProfile, MemberProfile};
use team_match_engine::engine::MatchEngine;
use team_match_engine::invariants::{validate_archetype, validate_member_ids, validate_profile};
use team_match_engine::EngineError;

use crate::config::{builtin_archetypes, ConfigError};
use crate::scoring::compute_match_score;

/// Acknowledgement of a persisted membership change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitReceipt {
    pub team_id: String,
    pub member_ids: Vec<String>,
    /// Total score (whole points) of the committed membership.
    pub new_score: i64,
}

/// Resolves profiles and persists membership.
///
/// Implementations report unknown ids as `NotFound`, access failures as
/// `Unauthorized` and retryable backend failures as
/// `TransientComputeFailure`.
#[async_trait]
pub trait MembershipStore: Send + Sync {
    /// Profiles for `member_ids`. Order of the returned list is not
    /// significant; callers re-align by id.
    async fn resolve_member_profiles(
        &self,
        member_ids: &[String],
    ) -> Result<Vec<MemberProfile>, EngineError>;

    async fn resolve_archetype(&self, archetype_id: &str) -> Result<ArchetypeProfile, EngineError>;

    /// Replace the membership of `team_id` with `member_ids`.
    async fn commit_membership(
        &self,
        team_id: &str,
        member_ids: &[String],
    ) -> Result<CommitReceipt, EngineError>;
}

// ---------------------------------------------------------------------------
// In-memory implementation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamRecord {
    pub archetype_id: String,
    pub member_ids: Vec<String>,
    pub score: Option<i64>,
}

/// Thread-safe map-backed store. Commits are scored with the store's own
/// engine so the receipt carries the real score.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    engine: MatchEngine,
    profiles: RwLock<BTreeMap<String, MemberProfile>>,
    archetypes: RwLock<BTreeMap<String, ArchetypeProfile>>,
    teams: RwLock<BTreeMap<String, TeamRecord>>,
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

impl InMemoryStore {
    pub fn new(engine: MatchEngine) -> Self {
        Self {
            engine,
            ..Self::default()
        }
    }

    /// Store preloaded with the bundled archetype catalog.
    pub fn with_builtin_archetypes(engine: MatchEngine) -> Result<Self, ConfigError> {
        let store = Self::new(engine);
        for archetype in builtin_archetypes()? {
            store.insert_archetype(archetype)?;
        }
        Ok(store)
    }

    pub fn engine(&self) -> &MatchEngine {
        &self.engine
    }

    pub fn insert_profile(&self, profile: MemberProfile) -> Result<(), EngineError> {
        validate_profile(&profile)?;
        write(&self.profiles).insert(profile.member_id.clone(), profile);
        Ok(())
    }

    pub fn insert_archetype(&self, archetype: ArchetypeProfile) -> Result<(), EngineError> {
        validate_archetype(&archetype)?;
        write(&self.archetypes).insert(archetype.id.clone(), archetype);
        Ok(())
    }

    /// Register a team. Its membership is taken as-is; no score until the
    /// first commit.
    pub fn register_team(
        &self,
        team_id: &str,
        archetype_id: &str,
        member_ids: Vec<String>,
    ) -> Result<(), EngineError> {
        validate_member_ids(&member_ids)?;
        if !read(&self.archetypes).contains_key(archetype_id) {
            return Err(EngineError::NotFound(format!("archetype {:?}", archetype_id)));
        }
        write(&self.teams).insert(
            team_id.to_string(),
            TeamRecord {
                archetype_id: archetype_id.to_string(),
                member_ids,
                score: None,
            },
        );
        Ok(())
    }

    pub fn team(&self, team_id: &str) -> Option<TeamRecord> {
        read(&self.teams).get(team_id).cloned()
    }
}

#[async_trait]
impl MembershipStore for InMemoryStore {
    async fn resolve_member_profiles(
        &self,
        member_ids: &[String],
    ) -> Result<Vec<MemberProfile>, EngineError> {
        let profiles = read(&self.profiles);
        member_ids
            .iter()
            .map(|id| {
                profiles
                    .get(id)
                    .cloned()
                    .ok_or_else(|| EngineError::NotFound(format!("member {:?}", id)))
            })
            .collect()
    }

    async fn resolve_archetype(&self, archetype_id: &str) -> Result<ArchetypeProfile, EngineError> {
        read(&self.archetypes)
            .get(archetype_id)
            .cloned()
            .ok_or_else(|| EngineError::NotFound(format!("archetype {:?}", archetype_id)))
    }

    async fn commit_membership(
        &self,
        team_id: &str,
        member_ids: &[String],
    ) -> Result<CommitReceipt, EngineError> {
        let archetype_id = read(&self.teams)
            .get(team_id)
            .map(|team| team.archetype_id.clone())
            .ok_or_else(|| EngineError::NotFound(format!("team {:?}", team_id)))?;

        let result = compute_match_score(self, member_ids, &archetype_id, &self.engine).await?;

        let mut teams = write(&self.teams);
        let team = teams
            .get_mut(team_id)
            .ok_or_else(|| EngineError::CommitConflict(format!("team {:?} removed during commit", team_id)))?;
        team.member_ids = member_ids.to_vec();
        team.score = Some(result.total_score);

        tracing::info!(
            target: "team_match::store",
            team = team_id,
            members = member_ids.len(),
            score = result.total_score,
            "membership.committed"
        );
        Ok(CommitReceipt {
            team_id: team_id.to_string(),
            member_ids: member_ids.to_vec(),
            new_score: result.total_score,
        })
    }
}
