//! Broker runtime: orchestration and lifecycle.
//!
//! The public API of this module is the [`Orchestrator`] (built with an
//! [`OrchestratorBuilder`]), the [`ConsentGate`] collaborator trait and the
//! host lifecycle types.
//!
//! Internal modules:
//! - `orchestrator`: owns the slots, consent / remove-ads / foreground wiring, shutdown;
//! - `builder`: validates the configuration and wires slots, bus and subscribers;
//! - `consent`: consent gate trait and the watch-backed [`ConsentFlag`];
//! - `lifecycle`: [`AppState`] and [`ForegroundOutcome`].

mod builder;
mod consent;
mod lifecycle;
mod orchestrator;

pub use builder::OrchestratorBuilder;
pub use consent::{ConsentFlag, ConsentGate};
pub use lifecycle::{AppState, ForegroundOutcome};
pub use orchestrator::Orchestrator;
