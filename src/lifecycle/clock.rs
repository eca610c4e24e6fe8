//! Frame clock abstraction
//!
//! A clock delivers at most one callback per request. Schedulers hold the
//! outstanding request so teardown can cancel it synchronously.

/// Handle for one outstanding frame callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRequest(pub i32);

/// Source of per-display-refresh callbacks
pub trait FrameClock {
    /// Ask for one callback on the next frame; `None` if the clock is gone
    fn request_frame(&mut self) -> Option<FrameRequest>;

    /// Withdraw a request that has not fired yet
    fn cancel_frame(&mut self, request: FrameRequest);
}

/// Clock driven by hand: the caller decides when a frame "fires".
///
/// Used by the native demo and by tests, where it doubles as a spy on
/// subscriptions.
#[derive(Debug, Default)]
pub struct ManualClock {
    next_id: i32,
    pending: Option<FrameRequest>,
    requests: u32,
    cancels: u32,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Option<FrameRequest> {
        self.pending
    }

    /// Consume the outstanding request, as if its callback were delivered
    pub fn fire(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn requests(&self) -> u32 {
        self.requests
    }

    pub fn cancels(&self) -> u32 {
        self.cancels
    }
}

impl FrameClock for ManualClock {
    fn request_frame(&mut self) -> Option<FrameRequest> {
        self.next_id += 1;
        let request = FrameRequest(self.next_id);
        self.pending = Some(request);
        self.requests += 1;
        Some(request)
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        if self.pending == Some(request) {
            self.pending = None;
            self.cancels += 1;
        }
    }
}

/// Clock handle that stays inspectable after its scheduler is dropped
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub(crate) struct SharedClock(pub std::rc::Rc<std::cell::RefCell<ManualClock>>);

#[cfg(test)]
impl FrameClock for SharedClock {
    fn request_frame(&mut self) -> Option<FrameRequest> {
        self.0.borrow_mut().request_frame()
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        self.0.borrow_mut().cancel_frame(request);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_fire_and_cancel() {
        let mut clock = ManualClock::new();
        assert!(!clock.fire());

        let req = clock.request_frame().unwrap();
        assert_eq!(clock.pending(), Some(req));
        assert!(clock.fire());
        assert!(!clock.fire());

        let req = clock.request_frame().unwrap();
        clock.cancel_frame(req);
        assert_eq!(clock.pending(), None);
        assert_eq!(clock.cancels(), 1);
        // Stale cancel is ignored
        clock.cancel_frame(req);
        assert_eq!(clock.cancels(), 1);
        assert_eq!(clock.requests(), 2);
    }
}
