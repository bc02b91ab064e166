//! Frame tickets: stale animation-frame callbacks must not tick a session
//!
//! Every scheduled frame carries the generation it was requested in. Starting
//! or leaving a game bumps the generation, so callbacks already in flight are
//! dropped when they arrive.

/// Token handed to a scheduled frame callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTicket(u64);

#[derive(Debug, Clone, Default)]
pub struct FrameGuard {
    generation: u64,
    /// Host handle of the outstanding request (rAF id on the web)
    pending: Option<i32>,
}

impl FrameGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticket for the next frame request
    pub fn ticket(&self) -> FrameTicket {
        FrameTicket(self.generation)
    }

    /// Remember the handle of the request just made
    pub fn arm(&mut self, handle: i32) {
        self.pending = Some(handle);
    }

    /// Whether a callback carrying `ticket` may run; consumes the pending handle
    pub fn accepts(&mut self, ticket: FrameTicket) -> bool {
        if ticket.0 != self.generation {
            log::debug!("Dropping stale frame (gen {} != {})", ticket.0, self.generation);
            return false;
        }
        self.pending = None;
        true
    }

    /// Invalidate every outstanding ticket
    ///
    /// Returns the pending handle so the caller can cancel it with the host.
    pub fn invalidate(&mut self) -> Option<i32> {
        self.generation = self.generation.wrapping_add(1);
        self.pending.take()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stale_ticket_rejected() {
        let mut guard = FrameGuard::new();
        let old = guard.ticket();
        guard.arm(7);
        assert_eq!(guard.invalidate(), Some(7));
        assert!(!guard.accepts(old));
        assert!(guard.accepts(guard.ticket()));
    }

    #[test]
    fn test_accept_clears_pending() {
        let mut guard = FrameGuard::new();
        guard.arm(3);
        assert!(guard.accepts(guard.ticket()));
        assert_eq!(guard.invalidate(), None);
    }
}
