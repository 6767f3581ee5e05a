// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jason Ish

//! Arbitration of the single in-flight generation.
//!
//! Every generation draws a fresh token from one shared counter, whether it
//! came from a typed message, a slash command, or a background shortcut.
//! Whoever holds the highest token owns the conversation; results carrying an
//! older token are dropped on arrival without comment.

/// Identifies one generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestToken(u64);

/// What became of a finished request once checked against current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Resolution {
    /// Token still current; apply the result.
    Current,
    /// A newer request superseded this one; drop silently.
    Stale,
    /// The user canceled while it was in flight; drop without appending.
    Canceled,
}

/// Tracks the single "current" generation slot.
#[derive(Debug, Default)]
pub(crate) struct GenerationState {
    current: u64,
    generating: bool,
    cancel_requested: bool,
}

impl GenerationState {
    /// Start a new generation, superseding whatever was in flight.
    pub(crate) fn begin(&mut self) -> RequestToken {
        self.current += 1;
        self.generating = true;
        self.cancel_requested = false;
        RequestToken(self.current)
    }

    pub(crate) fn is_generating(&self) -> bool {
        self.generating
    }

    /// True while `token` still owns the slot and no cancel has landed.
    /// Multi-step flows check this between steps so a superseded or canceled
    /// loop stops early.
    pub(crate) fn is_current(&self, token: RequestToken) -> bool {
        token.0 == self.current && !self.cancel_requested
    }

    /// Request cancellation of the in-flight generation. The local effect is
    /// immediate; the remote call is the caller's best-effort follow-up.
    /// Returns false when nothing was in flight.
    pub(crate) fn cancel(&mut self) -> bool {
        if !self.generating {
            return false;
        }
        self.cancel_requested = true;
        self.generating = false;
        true
    }

    /// Invalidate the slot without starting a new generation, so an in-flight
    /// result cannot land in state that was rebuilt under it (used by /clear).
    pub(crate) fn invalidate(&mut self) {
        self.current += 1;
        self.generating = false;
        self.cancel_requested = false;
    }

    /// Check a finished request against current state and settle the slot.
    pub(crate) fn resolve(&mut self, token: RequestToken) -> Resolution {
        if token.0 != self.current {
            return Resolution::Stale;
        }
        if self.cancel_requested {
            return Resolution::Canceled;
        }
        self.generating = false;
        Resolution::Current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_are_monotonic() {
        let mut state = GenerationState::default();
        let a = state.begin();
        let b = state.begin();
        let c = state.begin();
        assert!(a < b && b < c);
    }

    #[test]
    fn test_superseded_request_resolves_stale() {
        let mut state = GenerationState::default();
        let first = state.begin();
        let second = state.begin();

        assert_eq!(state.resolve(first), Resolution::Stale);
        // The stale arrival must not disturb the current request.
        assert!(state.is_generating());
        assert_eq!(state.resolve(second), Resolution::Current);
        assert!(!state.is_generating());
    }

    #[test]
    fn test_cancel_then_late_resolve() {
        let mut state = GenerationState::default();
        let token = state.begin();

        assert!(state.cancel());
        assert!(!state.is_generating());
        assert_eq!(state.resolve(token), Resolution::Canceled);
    }

    #[test]
    fn test_cancel_without_generation_is_noop() {
        let mut state = GenerationState::default();
        assert!(!state.cancel());
    }

    #[test]
    fn test_begin_resets_cancel_flag() {
        let mut state = GenerationState::default();
        let first = state.begin();
        state.cancel();

        let second = state.begin();
        assert!(state.is_current(second));
        assert!(!state.is_current(first));
        assert_eq!(state.resolve(second), Resolution::Current);
    }

    #[test]
    fn test_invalidate_orphans_in_flight_token() {
        let mut state = GenerationState::default();
        let token = state.begin();
        state.invalidate();

        assert!(!state.is_generating());
        assert_eq!(state.resolve(token), Resolution::Stale);
    }
}
