//! Content resolution state machine
//!
//! Tracks how a single file node's local content is resolved during a pass.
//!
//! ```text
//!                  ┌────────────────┐  reuse   ┌──────────┐
//!             ┌──► │ CacheHitFresh  │ ───────► │ Resolved │
//!             │    └────────────────┘          └──────────┘
//! ┌────────────┐   ┌────────────────┐               ▲
//! │ Unresolved │─► │ CacheHitStale  │ ──┐           │ stored
//! └────────────┘   └────────────────┘   ▼           │
//!             │                     ┌───────────┐  ┌─────────────┐
//!             └───────────────────► │ CacheMiss │─►│ Downloading │
//!                                   └───────────┘  └─────────────┘
//!
//! Every non-terminal state may also move to Failed.
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use super::errors::DomainError;

/// Resolution state of a file node's content
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentState {
    #[default]
    Unresolved,
    /// Cached entry exists and its digest matches the node
    CacheHitFresh,
    /// Cached entry exists but was written for another digest
    CacheHitStale,
    /// No usable cached entry
    CacheMiss,
    /// Fetching the bytes from the remote
    Downloading,
    /// Local file reference is attached to the node
    Resolved,
    /// Resolution failed; the node is published without content
    Failed(String),
}

impl ContentState {
    /// Returns the state name as a string (without failure details)
    pub fn name(&self) -> &'static str {
        match self {
            ContentState::Unresolved => "Unresolved",
            ContentState::CacheHitFresh => "CacheHitFresh",
            ContentState::CacheHitStale => "CacheHitStale",
            ContentState::CacheMiss => "CacheMiss",
            ContentState::Downloading => "Downloading",
            ContentState::Resolved => "Resolved",
            ContentState::Failed(_) => "Failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ContentState::Resolved | ContentState::Failed(_))
    }

    /// Checks if a transition is valid
    ///
    /// Valid transitions:
    /// - Unresolved -> CacheHitFresh, CacheHitStale, CacheMiss
    /// - CacheHitFresh -> Resolved
    /// - CacheHitStale -> CacheMiss
    /// - CacheMiss -> Downloading
    /// - Downloading -> Resolved
    /// - any non-terminal state -> Failed
    pub fn can_transition_to(&self, target: &ContentState) -> bool {
        if self.is_terminal() {
            return false;
        }

        if matches!(target, ContentState::Failed(_)) {
            return true;
        }

        matches!(
            (self, target),
            (ContentState::Unresolved, ContentState::CacheHitFresh)
                | (ContentState::Unresolved, ContentState::CacheHitStale)
                | (ContentState::Unresolved, ContentState::CacheMiss)
                | (ContentState::CacheHitFresh, ContentState::Resolved)
                | (ContentState::CacheHitStale, ContentState::CacheMiss)
                | (ContentState::CacheMiss, ContentState::Downloading)
                | (ContentState::Downloading, ContentState::Resolved)
        )
    }

    /// Attempts to move to `target`
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidState` if the transition is not allowed.
    pub fn transition_to(&mut self, target: ContentState) -> Result<(), DomainError> {
        if !self.can_transition_to(&target) {
            return Err(DomainError::InvalidState {
                from: self.name().to_string(),
                to: target.name().to_string(),
            });
        }
        *self = target;
        Ok(())
    }

    /// Moves to `Failed` with the given reason
    pub fn fail(&mut self, reason: impl Into<String>) -> Result<(), DomainError> {
        self.transition_to(ContentState::Failed(reason.into()))
    }
}

impl fmt::Display for ContentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentState::Unresolved => write!(f, "unresolved"),
            ContentState::CacheHitFresh => write!(f, "cache hit (fresh)"),
            ContentState::CacheHitStale => write!(f, "cache hit (stale)"),
            ContentState::CacheMiss => write!(f, "cache miss"),
            ContentState::Downloading => write!(f, "downloading"),
            ContentState::Resolved => write!(f, "resolved"),
            ContentState::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}
