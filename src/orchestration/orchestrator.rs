use crate::catalog::SourceCatalog;
use crate::compile::{Compiler, InputFingerprint, PortfolioInput, PortfolioOutput};
use crate::engine::ExposureError;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tracing::{debug, info};

/// A recomputation request registered against a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub session_id: String,
    pub generation: u64,
    pub fingerprint: InputFingerprint,
}

/// Output of a recompute together with how it was obtained.
#[derive(Debug, Clone)]
pub struct Recomputed {
    pub fingerprint: InputFingerprint,
    pub output: Arc<PortfolioOutput>,
    pub cache_hit: bool,
}

/// Sessions kept when no explicit bound is configured.
pub const DEFAULT_MAX_SESSIONS: usize = 1024;

#[derive(Debug, Default)]
struct SessionState {
    generation: u64,
    last_used: u64,
    last: Option<(InputFingerprint, Arc<PortfolioOutput>)>,
}

#[derive(Debug, Default)]
struct SessionTable {
    states: HashMap<String, SessionState>,
    /// Bumped on every submit; orders sessions by recency.
    clock: u64,
}

impl SessionTable {
    fn evict_least_recent(&mut self) {
        let oldest = self
            .states
            .iter()
            .min_by_key(|(_, state)| state.last_used)
            .map(|(id, _)| id.clone());
        if let Some(id) = oldest {
            self.states.remove(&id);
            debug!(session = %id, "Evicted least recently used session");
        }
    }
}

/// Recompute-on-change wrapper around the pure compiler.
///
/// Each session keeps a generation counter and the last completed output. A
/// compile started before a newer submission is discarded on completion, and an
/// input identical to the last completed one is answered from the cache. At most
/// `max_sessions` sessions are kept; a new session evicts the least recently
/// submitted one.
pub struct Orchestrator {
    catalog: Arc<dyn SourceCatalog>,
    max_sessions: usize,
    sessions: Mutex<SessionTable>,
}

impl Orchestrator {
    pub fn new(catalog: Arc<dyn SourceCatalog>) -> Self {
        Self {
            catalog,
            max_sessions: DEFAULT_MAX_SESSIONS,
            sessions: Mutex::new(SessionTable::default()),
        }
    }

    /// Bound the number of live sessions, at least one.
    pub fn with_max_sessions(mut self, max_sessions: usize) -> Self {
        self.max_sessions = max_sessions.max(1);
        self
    }

    pub fn max_sessions(&self) -> usize {
        self.max_sessions
    }

    fn sessions(&self) -> MutexGuard<'_, SessionTable> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a new input for a session, superseding every earlier ticket.
    pub fn submit(
        &self,
        session_id: &str,
        input: &PortfolioInput,
    ) -> Result<Ticket, OrchestrationError> {
        let fingerprint = InputFingerprint::of(input)?;
        let mut sessions = self.sessions();
        sessions.clock += 1;
        let now = sessions.clock;

        if !sessions.states.contains_key(session_id)
            && sessions.states.len() >= self.max_sessions
        {
            sessions.evict_least_recent();
        }

        let state = sessions.states.entry(session_id.to_string()).or_default();
        state.generation += 1;
        state.last_used = now;

        Ok(Ticket {
            session_id: session_id.to_string(),
            generation: state.generation,
            fingerprint,
        })
    }

    /// Last completed output of the session, if it was computed from the same input.
    pub fn cached(&self, ticket: &Ticket) -> Option<Arc<PortfolioOutput>> {
        let sessions = self.sessions();
        let (fingerprint, output) = sessions.states.get(&ticket.session_id)?.last.as_ref()?;
        (*fingerprint == ticket.fingerprint).then(|| Arc::clone(output))
    }

    /// Record a finished compile, or discard it when a newer ticket exists.
    ///
    /// A session forgotten or evicted while the compile ran is reported as unknown.
    pub fn complete(
        &self,
        ticket: &Ticket,
        output: PortfolioOutput,
    ) -> Result<Arc<PortfolioOutput>, OrchestrationError> {
        let mut sessions = self.sessions();
        let Some(state) = sessions.states.get_mut(&ticket.session_id) else {
            return Err(OrchestrationError::UnknownSession(ticket.session_id.clone()));
        };

        if state.generation != ticket.generation {
            debug!(
                session = %ticket.session_id,
                generation = ticket.generation,
                latest = state.generation,
                "Discarding stale recompute"
            );
            return Err(OrchestrationError::Superseded {
                session_id: ticket.session_id.clone(),
                generation: ticket.generation,
                latest: state.generation,
            });
        }

        let output = Arc::new(output);
        state.last = Some((ticket.fingerprint.clone(), Arc::clone(&output)));
        Ok(output)
    }

    /// Recompute a session's view from a fresh input snapshot.
    pub async fn recompute(
        &self,
        session_id: &str,
        input: PortfolioInput,
    ) -> Result<Recomputed, OrchestrationError> {
        let ticket = self.submit(session_id, &input)?;

        if let Some(output) = self.cached(&ticket) {
            debug!(session = %session_id, fingerprint = %ticket.fingerprint, "Recompute cache hit");
            return Ok(Recomputed {
                fingerprint: ticket.fingerprint,
                output,
                cache_hit: true,
            });
        }

        let catalog = Arc::clone(&self.catalog);
        let output =
            tokio::task::spawn_blocking(move || Compiler::compile(&input, catalog.as_ref()))
                .await
                .map_err(|e| OrchestrationError::Join(e.to_string()))??;

        let output = self.complete(&ticket, output)?;
        info!(session = %session_id, generation = ticket.generation, "Session recomputed");

        Ok(Recomputed {
            fingerprint: ticket.fingerprint,
            output,
            cache_hit: false,
        })
    }

    /// Drop all state of a session. Returns whether the session existed.
    pub fn forget(&self, session_id: &str) -> bool {
        self.sessions().states.remove(session_id).is_some()
    }

    pub fn session_count(&self) -> usize {
        self.sessions().states.len()
    }

    /// Latest generation of a session, zero if unknown.
    pub fn generation(&self, session_id: &str) -> u64 {
        self.sessions()
            .states
            .get(session_id)
            .map(|state| state.generation)
            .unwrap_or(0)
    }
}

#[derive(Debug, Error)]
pub enum OrchestrationError {
    #[error("recompute {generation} of session {session_id} superseded by {latest}")]
    Superseded {
        session_id: String,
        generation: u64,
        latest: u64,
    },
    #[error("unknown session {0}")]
    UnknownSession(String),
    #[error("fingerprint error: {0}")]
    Fingerprint(#[from] serde_json::Error),
    #[error(transparent)]
    Exposure(#[from] ExposureError),
    #[error("compile task failed: {0}")]
    Join(String),
}
