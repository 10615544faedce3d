//! Host lifecycle signals relayed to the app-open slot.

use crate::error::ShowError;

/// Foreground state of the host application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Foreground,
    Background,
}

/// What the orchestrator did with a lifecycle transition.
#[derive(Debug, Clone, PartialEq)]
pub enum ForegroundOutcome {
    /// Nothing to do (background, cold start, auto-show off, no app-open slot).
    Ignored,
    /// An app-open ad is being presented.
    Presented,
    /// The app-open slot refused to show; a reload may have been started.
    Refused(ShowError),
}
