//! What-if simulation: session-scoped membership editing with
//! generation-guarded recomputation.
//!
//! Every mutation is issued synchronously (`begin_*`: validation and a
//! generation bump) and completed asynchronously (`finish`). Only the most
//! recently issued recompute of the current session is ever applied;
//! anything older is discarded on completion.
//!
//! Concurrency: one std Mutex around the engine state, never held across
//! an await. The engine is Send + Sync and is shared via Arc.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use team_match_engine::arithmetic::validate_member_id;
use team_match_engine::domain::MatchScoreResult;
use team_match_engine::engine::MatchEngine;
use team_match_engine::invariants::{validate_member_ids, validate_team_size, MAX_TEAM_SIZE, MIN_TEAM_SIZE};
use team_match_engine::EngineError;

use crate::drift::compare_results;
use crate::scoring::compute_match_score;
use crate::store::{CommitReceipt, MembershipStore};

/// One applied membership edit. A plain add has no `removed`; a plain
/// remove has no `added`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapRecord {
    pub removed: Option<String>,
    pub added: Option<String>,
    /// Index in the simulated member list the edit happened at.
    pub position: usize,
    /// Total score change (whole points) caused by this edit.
    pub score_delta: i64,
}

/// Snapshot of an active simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationSession {
    pub session_id: u64,
    pub original_members: Vec<String>,
    pub simulated_members: Vec<String>,
    pub original_score: i64,
    /// Last successfully applied result. Stays put while a recompute is
    /// pending or after one fails.
    pub latest_result: Option<MatchScoreResult>,
    pub pending_swaps: Vec<SwapRecord>,
    pub generation: u64,
    pub recompute_pending: bool,
}

impl SimulationSession {
    /// Score the next delta is measured against.
    pub fn baseline_score(&self) -> i64 {
        self.latest_result
            .as_ref()
            .map(|r| r.total_score)
            .unwrap_or(self.original_score)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Swap { remove: String, add: String },
    Add(String),
    Remove(String),
    Undo,
}

impl Mutation {
    fn name(&self) -> &'static str {
        match self {
            Mutation::Swap { .. } => "swap",
            Mutation::Add(_) => "add",
            Mutation::Remove(_) => "remove",
            Mutation::Undo => "undo",
        }
    }
}

/// An issued, not yet completed recompute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecomputeTicket {
    session_id: u64,
    generation: u64,
    mutation: Mutation,
    proposed: Vec<String>,
    position: usize,
}

impl RecomputeTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn mutation(&self) -> &Mutation {
        &self.mutation
    }

    pub fn proposed_members(&self) -> &[String] {
        &self.proposed
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecomputeOutcome {
    /// The result became the session's latest result.
    Applied {
        generation: u64,
        total_score: i64,
        score_delta: i64,
    },
    /// A newer mutation (or a cancel) overtook this one; nothing changed.
    Superseded { generation: u64 },
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct EngineState {
    committed_members: Vec<String>,
    session: Option<SimulationSession>,
    last_session_id: u64,
    apply_in_flight: bool,
}

pub struct SimulationEngine<S: MembershipStore> {
    store: Arc<S>,
    engine: MatchEngine,
    team_id: String,
    archetype_id: String,
    state: Mutex<EngineState>,
}

/// Clears the apply flag if the apply future is dropped mid-commit.
/// A completed commit disarms it and clears the flag itself, in the same
/// critical section that settles the session.
struct ApplyInFlight<'a> {
    state: &'a Mutex<EngineState>,
    armed: bool,
}

impl ApplyInFlight<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for ApplyInFlight<'_> {
    fn drop(&mut self) {
        if self.armed {
            lock(self.state).apply_in_flight = false;
        }
    }
}

fn lock(state: &Mutex<EngineState>) -> MutexGuard<'_, EngineState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn rejected(reason: String) -> EngineError {
    EngineError::InvalidInput(reason)
}

impl<S: MembershipStore> SimulationEngine<S> {
    pub fn new(
        store: Arc<S>,
        engine: MatchEngine,
        team_id: &str,
        archetype_id: &str,
        committed_members: Vec<String>,
    ) -> Self {
        Self {
            store,
            engine,
            team_id: team_id.to_string(),
            archetype_id: archetype_id.to_string(),
            state: Mutex::new(EngineState {
                committed_members,
                session: None,
                last_session_id: 0,
                apply_in_flight: false,
            }),
        }
    }

    pub fn team_id(&self) -> &str {
        &self.team_id
    }

    pub fn is_active(&self) -> bool {
        lock(&self.state).session.is_some()
    }

    pub fn snapshot(&self) -> Option<SimulationSession> {
        lock(&self.state).session.clone()
    }

    pub fn committed_members(&self) -> Vec<String> {
        lock(&self.state).committed_members.clone()
    }

    /// Generation of the active session, if any.
    pub fn generation(&self) -> Option<u64> {
        lock(&self.state).session.as_ref().map(|s| s.generation)
    }

    /// Open a session over `original_members`. Only valid while inactive.
    pub fn start(
        &self,
        original_members: Vec<String>,
        original_score: i64,
    ) -> Result<SimulationSession, EngineError> {
        validate_member_ids(&original_members).map_err(|err| self.reject("start", err))?;

        let mut state = lock(&self.state);
        if state.session.is_some() {
            return Err(self.reject("start", rejected("simulation already active".to_string())));
        }
        state.last_session_id += 1;
        let session = SimulationSession {
            session_id: state.last_session_id,
            simulated_members: original_members.clone(),
            original_members,
            original_score,
            latest_result: None,
            pending_swaps: Vec::new(),
            generation: 0,
            recompute_pending: false,
        };
        state.session = Some(session.clone());

        tracing::info!(
            target: "team_match::simulation",
            team = %self.team_id,
            session = session.session_id,
            members = session.original_members.len(),
            "simulation.started"
        );
        Ok(session)
    }

    /// Discard the session, if any. Returns whether one was active.
    pub fn cancel(&self) -> bool {
        let discarded = lock(&self.state).session.take();
        if let Some(session) = &discarded {
            tracing::info!(
                target: "team_match::simulation",
                team = %self.team_id,
                session = session.session_id,
                generation = session.generation,
                "simulation.cancelled"
            );
        }
        discarded.is_some()
    }

    // -- issue ------------------------------------------------------------

    pub fn begin_swap(&self, remove_id: &str, add_id: &str) -> Result<RecomputeTicket, EngineError> {
        validate_member_id(remove_id)
            .and_then(|_| validate_member_id(add_id))
            .map_err(|err| self.reject("swap", err))?;
        self.issue(Mutation::Swap {
            remove: remove_id.to_string(),
            add: add_id.to_string(),
        })
    }

    pub fn begin_add(&self, member_id: &str) -> Result<RecomputeTicket, EngineError> {
        validate_member_id(member_id).map_err(|err| self.reject("add", err))?;
        self.issue(Mutation::Add(member_id.to_string()))
    }

    pub fn begin_remove(&self, member_id: &str) -> Result<RecomputeTicket, EngineError> {
        validate_member_id(member_id).map_err(|err| self.reject("remove", err))?;
        self.issue(Mutation::Remove(member_id.to_string()))
    }

    pub fn begin_undo(&self) -> Result<RecomputeTicket, EngineError> {
        self.issue(Mutation::Undo)
    }

    fn issue(&self, mutation: Mutation) -> Result<RecomputeTicket, EngineError> {
        let op = mutation.name();
        let mut guard = lock(&self.state);
        let state = &mut *guard;

        if state.apply_in_flight {
            return Err(self.reject(op, rejected("apply in flight".to_string())));
        }
        let Some(session) = state.session.as_mut() else {
            return Err(self.reject(op, rejected("no active simulation".to_string())));
        };
        let (proposed, position) =
            propose(&session.simulated_members, &session.pending_swaps, &mutation)
                .map_err(|err| self.reject(op, err))?;

        session.generation += 1;
        session.recompute_pending = true;

        tracing::debug!(
            target: "team_match::simulation",
            session = session.session_id,
            generation = session.generation,
            operation = op,
            "simulation.recompute_issued"
        );
        Ok(RecomputeTicket {
            session_id: session.session_id,
            generation: session.generation,
            mutation,
            proposed,
            position,
        })
    }

    // -- complete ---------------------------------------------------------

    fn is_current(&self, ticket: &RecomputeTicket) -> bool {
        lock(&self.state)
            .session
            .as_ref()
            .is_some_and(|s| s.session_id == ticket.session_id && s.generation == ticket.generation)
    }

    /// Score the ticket's proposed membership and, if the ticket is still
    /// the newest of the current session, make it the latest result.
    ///
    /// A failed recompute leaves the session as it was apart from clearing
    /// the pending flag.
    pub async fn finish(&self, ticket: RecomputeTicket) -> Result<RecomputeOutcome, EngineError> {
        if !self.is_current(&ticket) {
            tracing::debug!(
                target: "team_match::simulation",
                generation = ticket.generation,
                "simulation.recompute_skipped"
            );
            return Ok(RecomputeOutcome::Superseded { generation: ticket.generation });
        }

        let computed = compute_match_score(
            self.store.as_ref(),
            &ticket.proposed,
            &self.archetype_id,
            &self.engine,
        )
        .await;

        let mut state = lock(&self.state);
        let Some(session) = state
            .session
            .as_mut()
            .filter(|s| s.session_id == ticket.session_id && s.generation == ticket.generation)
        else {
            tracing::debug!(
                target: "team_match::simulation",
                generation = ticket.generation,
                "simulation.recompute_discarded"
            );
            return Ok(RecomputeOutcome::Superseded { generation: ticket.generation });
        };
        session.recompute_pending = false;

        let result = match computed {
            Ok(result) => result,
            Err(err) => {
                tracing::warn!(
                    target: "team_match::simulation",
                    session = session.session_id,
                    generation = ticket.generation,
                    operation = ticket.mutation.name(),
                    error = %err,
                    retryable = err.is_retryable(),
                    "simulation.recompute_failed"
                );
                return Err(err);
            }
        };

        let score_delta = match &session.latest_result {
            Some(previous) => {
                let drift = compare_results(previous, &result);
                tracing::debug!(
                    target: "team_match::simulation",
                    gaps_opened = drift.gaps_opened.len(),
                    gaps_closed = drift.gaps_closed.len(),
                    "simulation.drift"
                );
                drift.total_delta
            }
            None => result.total_score - session.baseline_score(),
        };

        let RecomputeTicket { mutation, proposed, position, generation, .. } = ticket;
        match mutation {
            Mutation::Undo => {
                session.pending_swaps.pop();
            }
            Mutation::Swap { remove, add } => session.pending_swaps.push(SwapRecord {
                removed: Some(remove),
                added: Some(add),
                position,
                score_delta,
            }),
            Mutation::Add(id) => session.pending_swaps.push(SwapRecord {
                removed: None,
                added: Some(id),
                position,
                score_delta,
            }),
            Mutation::Remove(id) => session.pending_swaps.push(SwapRecord {
                removed: Some(id),
                added: None,
                position,
                score_delta,
            }),
        }
        session.simulated_members = proposed;
        let total_score = result.total_score;
        session.latest_result = Some(result);

        tracing::info!(
            target: "team_match::simulation",
            session = session.session_id,
            generation,
            total_score,
            score_delta,
            swaps = session.pending_swaps.len(),
            "simulation.recompute_applied"
        );
        Ok(RecomputeOutcome::Applied { generation, total_score, score_delta })
    }

    // -- combined forms ---------------------------------------------------

    pub async fn swap_member(&self, remove_id: &str, add_id: &str) -> Result<RecomputeOutcome, EngineError> {
        let ticket = self.begin_swap(remove_id, add_id)?;
        self.finish(ticket).await
    }

    pub async fn add_member(&self, member_id: &str) -> Result<RecomputeOutcome, EngineError> {
        let ticket = self.begin_add(member_id)?;
        self.finish(ticket).await
    }

    pub async fn remove_member(&self, member_id: &str) -> Result<RecomputeOutcome, EngineError> {
        let ticket = self.begin_remove(member_id)?;
        self.finish(ticket).await
    }

    pub async fn undo_last_swap(&self) -> Result<RecomputeOutcome, EngineError> {
        let ticket = self.begin_undo()?;
        self.finish(ticket).await
    }

    // -- apply ------------------------------------------------------------

    /// Commit the simulated membership through the store.
    ///
    /// On success the simulated set becomes the committed set and the
    /// session ends. On failure the session is left untouched and the error
    /// surfaces as `CommitConflict`, except `Unauthorized`.
    pub async fn apply(&self) -> Result<CommitReceipt, EngineError> {
        let (session_id, members) = {
            let mut guard = lock(&self.state);
            let state = &mut *guard;
            let Some(session) = state.session.as_ref() else {
                return Err(self.reject("apply", rejected("no active simulation".to_string())));
            };
            if state.apply_in_flight {
                return Err(self.reject("apply", rejected("apply already in flight".to_string())));
            }
            if session.latest_result.is_none() {
                return Err(self.reject(
                    "apply",
                    rejected("no simulation result has been computed".to_string()),
                ));
            }
            state.apply_in_flight = true;
            (session.session_id, session.simulated_members.clone())
        };
        let in_flight = ApplyInFlight { state: &self.state, armed: true };

        let committed = self.store.commit_membership(&self.team_id, &members).await;
        in_flight.disarm();

        let mut state = lock(&self.state);
        state.apply_in_flight = false;
        match committed {
            Ok(receipt) => {
                state.committed_members = members;
                if state.session.as_ref().is_some_and(|s| s.session_id == session_id) {
                    state.session = None;
                }
                tracing::info!(
                    target: "team_match::simulation",
                    team = %self.team_id,
                    session = session_id,
                    new_score = receipt.new_score,
                    "simulation.applied"
                );
                Ok(receipt)
            }
            Err(err) => {
                tracing::warn!(
                    target: "team_match::simulation",
                    team = %self.team_id,
                    session = session_id,
                    error = %err,
                    "simulation.apply_failed"
                );
                Err(match err {
                    EngineError::Unauthorized(_) | EngineError::CommitConflict(_) => err,
                    other => EngineError::CommitConflict(other.to_string()),
                })
            }
        }
    }

    fn reject(&self, operation: &str, err: EngineError) -> EngineError {
        tracing::warn!(
            target: "team_match::simulation",
            team = %self.team_id,
            operation,
            error = %err,
            "simulation.rejected"
        );
        err
    }
}

/// Membership after `mutation`, and the position it touches.
fn propose(
    simulated: &[String],
    swaps: &[SwapRecord],
    mutation: &Mutation,
) -> Result<(Vec<String>, usize), EngineError> {
    let position_of = |id: &str| simulated.iter().position(|m| m == id);
    let mut proposed = simulated.to_vec();

    let position = match mutation {
        Mutation::Swap { remove, add } => {
            if remove == add {
                return Err(rejected(format!("cannot swap {:?} with itself", remove)));
            }
            let position = position_of(remove)
                .ok_or_else(|| rejected(format!("{:?} is not in the simulated team", remove)))?;
            if position_of(add).is_some() {
                return Err(rejected(format!("{:?} is already in the simulated team", add)));
            }
            proposed[position] = add.clone();
            position
        }
        Mutation::Add(id) => {
            if position_of(id).is_some() {
                return Err(rejected(format!("{:?} is already in the simulated team", id)));
            }
            if simulated.len() >= MAX_TEAM_SIZE {
                return Err(rejected(format!("team already has {} members", MAX_TEAM_SIZE)));
            }
            proposed.push(id.clone());
            simulated.len()
        }
        Mutation::Remove(id) => {
            let position = position_of(id)
                .ok_or_else(|| rejected(format!("{:?} is not in the simulated team", id)))?;
            if simulated.len() <= MIN_TEAM_SIZE {
                return Err(rejected(format!("team cannot drop below {} members", MIN_TEAM_SIZE)));
            }
            proposed.remove(position);
            position
        }
        Mutation::Undo => {
            let last = swaps
                .last()
                .ok_or_else(|| rejected("nothing to undo".to_string()))?;
            match (&last.removed, &last.added) {
                (Some(removed), Some(added)) => {
                    let position = position_of(added)
                        .ok_or_else(|| rejected(format!("{:?} is no longer simulated", added)))?;
                    proposed[position] = removed.clone();
                    position
                }
                (None, Some(added)) => {
                    let position = position_of(added)
                        .ok_or_else(|| rejected(format!("{:?} is no longer simulated", added)))?;
                    proposed.remove(position);
                    position
                }
                (Some(removed), None) => {
                    let position = last.position.min(proposed.len());
                    proposed.insert(position, removed.clone());
                    position
                }
                (None, None) => return Err(rejected("empty swap record".to_string())),
            }
        }
    };

    validate_team_size(proposed.len())?;
    Ok((proposed, position))
}
