//! Session-scoped recomputation around the pure compile pipeline.

pub mod orchestrator;

pub use orchestrator::{
    OrchestrationError, Orchestrator, Recomputed, Ticket, DEFAULT_MAX_SESSIONS,
};
