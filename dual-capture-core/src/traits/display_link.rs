/// Handle of one scheduled display callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRequestId(pub u64);

/// Host display refresh callback (vsync, `requestAnimationFrame`, a timer).
///
/// The session asks for one callback at a time; the host answers by
/// calling [`CaptureSession::on_display_frame`](crate::session::capture_session::CaptureSession::on_display_frame)
/// once the frame is due.
pub trait DisplayLink: Send {
    fn request_frame(&mut self) -> FrameRequestId;

    /// Cancel a request that has not fired yet. Unknown ids are ignored.
    fn cancel_frame(&mut self, id: FrameRequestId);
}

/// Display link for hosts that drive ticks themselves, e.g. from a
/// `tokio::time::interval`. Tracks the one outstanding request.
#[derive(Debug, Default)]
pub struct ManualDisplayLink {
    next_id: u64,
    pending: Option<FrameRequestId>,
    requested: u64,
    cancelled: u64,
}

impl ManualDisplayLink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request waiting to be answered, if any.
    pub fn pending(&self) -> Option<FrameRequestId> {
        self.pending
    }

    pub fn requested(&self) -> u64 {
        self.requested
    }

    pub fn cancelled(&self) -> u64 {
        self.cancelled
    }
}

impl DisplayLink for ManualDisplayLink {
    fn request_frame(&mut self) -> FrameRequestId {
        self.next_id += 1;
        self.requested += 1;
        let id = FrameRequestId(self.next_id);
        self.pending = Some(id);
        id
    }

    fn cancel_frame(&mut self, id: FrameRequestId) {
        if self.pending == Some(id) {
            self.pending = None;
            self.cancelled += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_single_outstanding_request() {
        let mut link = ManualDisplayLink::new();
        let first = link.request_frame();
        let second = link.request_frame();
        assert_ne!(first, second);
        assert_eq!(link.pending(), Some(second));

        link.cancel_frame(first);
        assert_eq!(link.pending(), Some(second));
        link.cancel_frame(second);
        assert_eq!(link.pending(), None);
        assert_eq!((link.requested(), link.cancelled()), (2, 1));
    }
}
