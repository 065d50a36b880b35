//! Store-backed scoring entry point.

use std::collections::BTreeMap;

use team_match_engine::domain::{MatchScoreResult, MemberProfile};
use team_match_engine::engine::MatchEngine;
use team_match_engine::invariants::validate_member_ids;
use team_match_engine::EngineError;

use crate::store::MembershipStore;

/// Resolve `member_ids` and `archetype_id` through `store`, then score.
///
/// Ids are checked for size, format and duplicates before the store is
/// touched. Store failures propagate unchanged; the kernel itself never
/// fails transiently.
pub async fn compute_match_score<S>(
    store: &S,
    member_ids: &[String],
    archetype_id: &str,
    engine: &MatchEngine,
) -> Result<MatchScoreResult, EngineError>
where
    S: MembershipStore + ?Sized,
{
    validate_member_ids(member_ids)?;

    let archetype = store.resolve_archetype(archetype_id).await?;
    let resolved = store.resolve_member_profiles(member_ids).await?;
    let members = align_profiles(member_ids, resolved)?;

    let result = engine.score(&members, &archetype)?;
    tracing::debug!(
        target: "team_match::scoring",
        archetype = archetype_id,
        members = member_ids.len(),
        total_score = result.total_score,
        "match_score.resolved"
    );
    Ok(result)
}

/// Put resolved profiles back into request order. A profile the store
/// did not return is `NotFound`.
fn align_profiles(
    member_ids: &[String],
    resolved: Vec<MemberProfile>,
) -> Result<Vec<MemberProfile>, EngineError> {
    let mut by_id: BTreeMap<String, MemberProfile> = resolved
        .into_iter()
        .map(|p| (p.member_id.clone(), p))
        .collect();
    member_ids
        .iter()
        .map(|id| {
            by_id
                .remove(id)
                .ok_or_else(|| EngineError::NotFound(format!("member {:?}", id)))
        })
        .collect()
}
