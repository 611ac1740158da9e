//! Dialogue orchestration for Retiro
//!
//! The core of the sales agent: turns one inbound chat message into a durable
//! message record, a bounded tool-calling dialogue with the model, the
//! execution of requested CRM actions, and exactly one outbound reply.
//!
//! - `actions` — the fixed, typed catalog of operations the model may invoke
//! - `executor` — deterministic server-side implementations of those actions
//! - `prompt` — system prompt and history assembly
//! - `orchestrator` — the per-message pipeline and two-pass model protocol

pub mod actions;
pub mod executor;
pub mod orchestrator;
pub mod prompt;

pub use actions::AgentAction;
pub use executor::{ActionExecutor, ActionOutcome};
pub use orchestrator::{DialogueOrchestrator, InboundMessage, OrchestratorSettings};
