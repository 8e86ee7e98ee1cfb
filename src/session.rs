//! Per-widget session state shared between the orchestrator and flow instances

use crate::{ButtonError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
struct SessionState {
    checkout_open: AtomicBool,
    can_render_top: AtomicBool,
}

/// Handle to the session state of one button widget
///
/// Clones share the same state. Two widgets on the same page hold distinct
/// sessions and never observe each other's checkout.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    state: Arc<SessionState>,
}

impl SessionContext {
    /// Create a fresh session
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a checkout as open, failing if one already is
    pub fn try_open_checkout(&self) -> Result<()> {
        self.state
            .checkout_open
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(|_| ButtonError::CheckoutAlreadyOpen)
    }

    /// Release the open checkout
    pub fn release_checkout(&self) {
        self.state.checkout_open.store(false, Ordering::Release);
    }

    /// Whether a checkout is currently open
    pub fn is_checkout_open(&self) -> bool {
        self.state.checkout_open.load(Ordering::Acquire)
    }

    /// Cached result of the top-window render check
    pub fn can_render_top(&self) -> bool {
        self.state.can_render_top.load(Ordering::Acquire)
    }

    /// Cache the result of the top-window render check
    pub fn set_can_render_top(&self, can_render_top: bool) {
        self.state
            .can_render_top
            .store(can_render_top, Ordering::Release);
    }
}
