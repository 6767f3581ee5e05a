// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jason Ish

//! Reentrant suppression of the front end's auto-scroll.
//!
//! Batch transcript rewrites and nested generation flows each take a hold;
//! the UI keeps auto-scroll off while any hold is alive. Holds release on
//! drop, so early returns and failures cannot leave suppression stuck.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Shared suppression counter. Cheap to clone.
#[derive(Clone, Debug, Default)]
pub struct ScrollSuppressor {
    depth: Arc<AtomicUsize>,
}

impl ScrollSuppressor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a hold, suppressing auto-scroll until it drops.
    pub fn hold(&self) -> ScrollHold {
        self.depth.fetch_add(1, Ordering::SeqCst);
        ScrollHold {
            depth: Arc::clone(&self.depth),
        }
    }

    /// True while at least one hold is alive.
    pub fn is_suppressed(&self) -> bool {
        self.depth.load(Ordering::SeqCst) > 0
    }

    #[cfg(test)]
    pub(crate) fn depth(&self) -> usize {
        self.depth.load(Ordering::SeqCst)
    }
}

/// RAII hold on the suppression counter.
pub struct ScrollHold {
    depth: Arc<AtomicUsize>,
}

impl Drop for ScrollHold {
    fn drop(&mut self) {
        self.depth.fetch_sub(1, Ordering::SeqCst);
    }
}
