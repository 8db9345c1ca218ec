use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

//===========================================================================//

/// Decides when the run loop should hand control back to the command loop.
pub trait RunControl {
    /// Called once per round of memory ticks; returns false to stop.
    fn keep_running(&mut self) -> bool;
}

impl<C: RunControl + ?Sized> RunControl for &mut C {
    fn keep_running(&mut self) -> bool {
        (**self).keep_running()
    }
}

//===========================================================================//

/// A run control that stops once cancelled.  Clones share the same flag, so
/// one clone can be handed to another thread (or a signal handler) to stop a
/// run in progress.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Returns a new token that has not been cancelled.
    pub fn new() -> CancelToken {
        CancelToken::default()
    }

    /// Stops any run using this token (or a clone of it).
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Returns true if [CancelToken::cancel] has been called.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl RunControl for CancelToken {
    fn keep_running(&mut self) -> bool {
        !self.is_cancelled()
    }
}

//===========================================================================//

/// A run control that stops after a fixed number of rounds.  The budget
/// refills when it runs out, so every run gets the full limit.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TickLimit {
    limit: u64,
    remaining: u64,
}

impl TickLimit {
    /// Returns a control that allows `limit` rounds.
    pub fn new(limit: u64) -> TickLimit {
        TickLimit { limit, remaining: limit }
    }

    /// Returns the number of rounds still allowed.
    pub fn remaining(&self) -> u64 {
        self.remaining
    }
}

impl RunControl for TickLimit {
    fn keep_running(&mut self) -> bool {
        if self.remaining == 0 {
            self.remaining = self.limit;
            return false;
        }
        self.remaining -= 1;
        true
    }
}

//===========================================================================//


//===========================================================================//
