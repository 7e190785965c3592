use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::models::error::CaptureError;
use crate::models::view::ViewKind;
use crate::traits::encoder::CompletionCallback;

type Completion = Result<Vec<u8>, CaptureError>;

#[derive(Debug, Default)]
struct Slots {
    landscape: Option<Completion>,
    portrait: Option<Completion>,
}

impl Slots {
    fn slot(&mut self, view: ViewKind) -> &mut Option<Completion> {
        match view {
            ViewKind::Landscape => &mut self.landscape,
            ViewKind::Portrait => &mut self.portrait,
        }
    }

    fn is_complete(&self) -> bool {
        self.landscape.is_some() && self.portrait.is_some()
    }
}

/// What each side reported by the time the barrier was released.
///
/// A `None` side never completed within the timeout.
#[derive(Debug, Default)]
pub struct BarrierOutcome {
    pub landscape: Option<Completion>,
    pub portrait: Option<Completion>,
}

impl BarrierOutcome {
    pub fn is_complete(&self) -> bool {
        self.landscape.is_some() && self.portrait.is_some()
    }

    pub fn take(&mut self, view: ViewKind) -> Option<Completion> {
        match view {
            ViewKind::Landscape => self.landscape.take(),
            ViewKind::Portrait => self.portrait.take(),
        }
    }
}

/// Joins the two recorders' completion callbacks behind one wait.
///
/// Each side gets a [`CompletionCallback`] from [`arrival`](Self::arrival);
/// the callbacks may fire synchronously, later, or from another thread.
/// Only the first completion per side is kept.
#[derive(Debug, Clone, Default)]
pub struct StopBarrier {
    slots: Arc<Mutex<Slots>>,
    notify: Arc<Notify>,
}

impl StopBarrier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arrival(&self, view: ViewKind) -> CompletionCallback {
        let slots = Arc::clone(&self.slots);
        let notify = Arc::clone(&self.notify);
        Box::new(move |result| {
            {
                let mut slots = slots.lock();
                let slot = slots.slot(view);
                if slot.is_some() {
                    log::warn!("{} recorder completed twice; ignoring", view.label());
                    return;
                }
                *slot = Some(result);
            }
            notify.notify_one();
        })
    }

    pub fn is_complete(&self) -> bool {
        self.slots.lock().is_complete()
    }

    /// Wait until both sides have arrived or `timeout` elapses, then hand
    /// out whatever arrived.
    pub async fn wait(&self, timeout: Duration) -> BarrierOutcome {
        let deadline = tokio::time::Instant::now() + timeout;
        while !self.is_complete() {
            // notify_one stores a permit, so an arrival between the check
            // and this await is not lost.
            if tokio::time::timeout_at(deadline, self.notify.notified()).await.is_err() {
                break;
            }
        }
        self.take_arrived()
    }

    /// Hand out whatever has arrived so far without waiting.
    pub fn take_arrived(&self) -> BarrierOutcome {
        let mut slots = self.slots.lock();
        BarrierOutcome {
            landscape: slots.landscape.take(),
            portrait: slots.portrait.take(),
        }
    }
}
